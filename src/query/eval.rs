//! Filter-tree evaluation over canonical `bson` documents.
//!
//! This is the reference interpretation of the backend-agnostic tree, used
//! by the in-memory store. Dotted paths traverse nested documents; an array
//! along the path matches if any element matches, which is how the backing
//! document store treats array fields like `genres`.

use crate::query::types::{CmpOp, Filter, MAX_SORT_FIELDS, Order, SortSpec};
use bson::{Bson, Document};
use std::cmp::Ordering;

pub fn eval_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Cmp { path, op, value } => {
            let found = path_values(doc, path);
            match op {
                CmpOp::Eq => found.iter().any(|v| bson_eq(v, value)),
                // Matches documents where no value equals, including
                // documents missing the field entirely.
                CmpOp::Ne => !found.iter().any(|v| bson_eq(v, value)),
                CmpOp::Gte => found
                    .iter()
                    .any(|v| matches!(compare_bson(v, value), Ordering::Greater | Ordering::Equal)),
                CmpOp::Lte => found
                    .iter()
                    .any(|v| matches!(compare_bson(v, value), Ordering::Less | Ordering::Equal)),
            }
        }
        Filter::In { path, values } => {
            path_values(doc, path).iter().any(|v| values.iter().any(|w| bson_eq(v, w)))
        }
        Filter::Nin { path, values } => {
            !path_values(doc, path).iter().any(|v| values.iter().any(|w| bson_eq(v, w)))
        }
        Filter::Match { path, needle } => path_values(doc, path).into_iter().any(|v| {
            if let Bson::String(s) = v { matches_partial(s, needle) } else { false }
        }),
    }
}

// Numeric values compare by value across Int32/Int64/Double, the way the
// backing document store does; everything else is exact.
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    let numeric =
        |x: &Bson| matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_));
    if numeric(a) && numeric(b) {
        compare_bson(a, b) == Ordering::Equal
    } else {
        a == b
    }
}

fn matches_partial(haystack: &str, needle: &str) -> bool {
    let mut builder = regex::RegexBuilder::new(&regex::escape(needle));
    builder.case_insensitive(true);
    if let Ok(re) = builder.build() { re.is_match(haystack) } else { false }
}

/// All values a dotted path resolves to, fanning out through arrays.
#[must_use]
pub fn path_values<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let parts: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    collect_from_doc(doc, &parts, &mut out);
    out
}

/// The first value a dotted path resolves to, if any.
#[must_use]
pub fn first_path_value<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let parts: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    collect_from_doc(doc, &parts, &mut out);
    out.into_iter().next()
}

fn collect_from_doc<'a>(doc: &'a Document, parts: &[&str], out: &mut Vec<&'a Bson>) {
    if let Some((head, rest)) = parts.split_first()
        && let Some(value) = doc.get(*head)
    {
        collect_from_bson(value, rest, out);
    }
}

fn collect_from_bson<'a>(value: &'a Bson, parts: &[&str], out: &mut Vec<&'a Bson>) {
    match value {
        Bson::Array(items) => {
            for item in items {
                collect_from_bson(item, parts, out);
            }
        }
        Bson::Document(d) if !parts.is_empty() => collect_from_doc(d, parts, out),
        _ => {
            if parts.is_empty() {
                out.push(value);
            }
        }
    }
}

/// Multi-key document ordering for the sort spec. Documents missing a sort
/// field order before documents that have it.
pub fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = first_path_value(a, &s.field);
        let vb = first_path_value(b, &s.field);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if matches!(s.order, Order::Asc) { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    fn is_num(x: &Bson) -> bool {
        matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
    }
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(x: &Bson) -> f64 {
        match x {
            Bson::Int32(i) => f64::from(*i),
            Bson::Int64(i) => *i as f64,
            Bson::Double(f) => *f,
            _ => f64::NAN,
        }
    }
    if is_num(a) && is_num(b) {
        return as_f64(a).total_cmp(&as_f64(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null => 0,
        Bson::Boolean(_) => 1,
        Bson::Int32(_) => 2,
        Bson::Int64(_) => 3,
        Bson::Double(_) => 4,
        Bson::String(_) => 5,
        Bson::Array(_) => 6,
        Bson::Document(_) => 7,
        Bson::DateTime(_) => 8,
        _ => 9,
    }
}

/// Copies the requested paths out of a document, preserving nesting.
/// Sibling nested paths (`persons.id`, `persons.name`) merge into one
/// output subtree; arrays of subdocuments are projected element-wise.
#[must_use]
pub fn project_fields(doc: &Document, paths: &[String]) -> Document {
    let split: Vec<Vec<&str>> = paths.iter().map(|p| p.split('.').collect()).collect();
    project_doc(doc, &split)
}

fn project_doc(doc: &Document, paths: &[Vec<&str>]) -> Document {
    let mut out = Document::new();
    let mut heads: Vec<&str> = Vec::new();
    for p in paths {
        if let Some(head) = p.first().copied()
            && !heads.contains(&head)
        {
            heads.push(head);
        }
    }
    for head in heads {
        let Some(value) = doc.get(head) else { continue };
        let rests: Vec<Vec<&str>> = paths
            .iter()
            .filter(|p| p.first() == Some(&head))
            .map(|p| p[1..].to_vec())
            .collect();
        // A bare path wins over nested siblings: the whole field is copied.
        if rests.iter().any(Vec::is_empty) {
            out.insert(head, value.clone());
            continue;
        }
        match value {
            Bson::Document(sub) => {
                let projected = project_doc(sub, &rests);
                if !projected.is_empty() {
                    out.insert(head, Bson::Document(projected));
                }
            }
            Bson::Array(items) => {
                let mut arr = Vec::new();
                for item in items {
                    if let Bson::Document(sub) = item {
                        let projected = project_doc(sub, &rests);
                        if !projected.is_empty() {
                            arr.push(Bson::Document(projected));
                        }
                    }
                }
                if !arr.is_empty() {
                    out.insert(head, Bson::Array(arr));
                }
            }
            // Scalar under a nested path request: nothing to copy.
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn movie_doc() -> Document {
        doc! {
            "id": 101,
            "name": "The Long Road",
            "year": 2021,
            "rating": { "kp": 7.4, "imdb": 7.1 },
            "genres": [ { "name": "drama" }, { "name": "road movie" } ],
            "persons": [
                { "id": 1, "name": "Ann Lee", "profession": "director" },
                { "id": 2, "name": "Bo Chan", "profession": "actor" },
            ],
        }
    }

    #[test]
    fn nested_paths_resolve_through_arrays() {
        let d = movie_doc();
        let names: Vec<&Bson> = path_values(&d, "genres.name");
        assert_eq!(names.len(), 2);
        assert_eq!(first_path_value(&d, "rating.kp"), Some(&Bson::Double(7.4)));
        assert!(path_values(&d, "genres.missing").is_empty());
        assert!(path_values(&d, "name.nope").is_empty());
    }

    #[test]
    fn range_band_and_set_eval() {
        let d = movie_doc();
        let band = Filter::And(vec![
            Filter::Cmp { path: "year".into(), op: CmpOp::Gte, value: Bson::Int64(2020) },
            Filter::Cmp { path: "year".into(), op: CmpOp::Lte, value: Bson::Int64(2022) },
        ]);
        assert!(eval_filter(&d, &band));
        assert!(!eval_filter(&d, &Filter::Not(Box::new(band))));
        let in_set = Filter::In {
            path: "persons.id".into(),
            values: vec![Bson::Int64(2), Bson::Int64(9)],
        };
        assert!(eval_filter(&d, &in_set));
    }

    #[test]
    fn ne_and_nin_match_missing_fields() {
        let d = doc! {"id": 1};
        let ne = Filter::Cmp {
            path: "type".into(),
            op: CmpOp::Ne,
            value: Bson::String("movie".into()),
        };
        assert!(eval_filter(&d, &ne));
        let nin = Filter::Nin { path: "type".into(), values: vec![Bson::String("movie".into())] };
        assert!(eval_filter(&d, &nin));
    }

    #[test]
    fn numeric_comparison_crosses_bson_int_widths() {
        let d = doc! {"year": Bson::Int32(2021)};
        let f = Filter::Cmp { path: "year".into(), op: CmpOp::Gte, value: Bson::Int64(2021) };
        assert!(eval_filter(&d, &f));
    }

    #[test]
    fn partial_match_is_case_insensitive_substring() {
        let d = movie_doc();
        for needle in ["drama", "DRAMA", "road mov"] {
            let f = Filter::Match { path: "genres.name".into(), needle: needle.into() };
            assert!(eval_filter(&d, &f), "{needle}");
        }
        let f = Filter::Match { path: "genres.name".into(), needle: "horror".into() };
        assert!(!eval_filter(&d, &f));
        // The needle is escaped; regex metacharacters are literal text.
        let f = Filter::Match { path: "genres.name".into(), needle: "dr.ma".into() };
        assert!(!eval_filter(&d, &f));
    }

    #[test]
    fn projection_merges_sibling_nested_paths() {
        let d = movie_doc();
        let p = project_fields(
            &d,
            &["name".into(), "persons.id".into(), "persons.name".into(), "rating.kp".into()],
        );
        assert_eq!(p.get_str("name").unwrap(), "The Long Road");
        assert!(p.get("year").is_none());
        let persons = p.get_array("persons").unwrap();
        assert_eq!(persons.len(), 2);
        let first = persons[0].as_document().unwrap();
        assert!(first.get("id").is_some() && first.get("name").is_some());
        assert!(first.get("profession").is_none());
        assert_eq!(p.get_document("rating").unwrap().get_f64("kp").unwrap(), 7.4);
        assert!(p.get_document("rating").unwrap().get("imdb").is_none());
    }

    #[test]
    fn whole_field_projection_wins_over_nested() {
        let d = movie_doc();
        let p = project_fields(&d, &["rating".into(), "rating.kp".into()]);
        assert!(p.get_document("rating").unwrap().get("imdb").is_some());
    }

    #[test]
    fn sort_orders_by_spec_with_direction() {
        let a = doc! {"year": 2020, "name": "a"};
        let b = doc! {"year": 2022, "name": "b"};
        let asc = [SortSpec { field: "year".into(), order: Order::Asc }];
        let desc = [SortSpec { field: "year".into(), order: Order::Desc }];
        assert_eq!(compare_docs(&a, &b, &asc), Ordering::Less);
        assert_eq!(compare_docs(&a, &b, &desc), Ordering::Greater);
    }
}
