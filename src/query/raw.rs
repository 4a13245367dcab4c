/// Ordered multi-valued query parameters, as decoded by the transport layer.
///
/// Insertion order is preserved so that the same request always compiles to
/// a structurally identical plan. No URL decoding happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuery {
    params: Vec<(String, Vec<String>)>,
}

impl RawQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one `name=value` pair; repeated names accumulate values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some((_, values)) = self.params.iter_mut().find(|(n, _)| *n == name) {
            values.push(value);
        } else {
            self.params.push((name, vec![value]));
        }
    }

    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut q = Self::new();
        for (k, v) in pairs {
            q.append(k, v);
        }
        q
    }

    /// All raw values supplied for a parameter, in arrival order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    /// The first raw value supplied for a parameter.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }
}
