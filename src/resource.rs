//! Static resource descriptors: which fields of each document type may be
//! filtered, sorted, and projected, and with which scalar kind.
//!
//! Descriptors are data only. They are built once at startup and shared
//! read-only across requests; no runtime schema scanning happens anywhere.

use crate::config::CatalogConfig;
use crate::errors::ApiError;
use crate::query::{Order, SortSpec};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Scalar kind of a filterable field. Determines which coercer runs on raw
/// query values and whether a bare value means equality or partial match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Date,
    String,
    /// Free-text field: a bare filter value is a partial, case-insensitive
    /// substring match instead of exact equality.
    Text,
}

/// What a client-supplied field path is being used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUse {
    Filter,
    Sort,
    Project,
}

impl fmt::Display for FieldUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Project => "project",
        })
    }
}

/// Immutable metadata for one queryable document type.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: String,
    collection: String,
    filterable: HashMap<String, FieldKind>,
    sortable: HashSet<String>,
    projectable: HashSet<String>,
    default_projection: Vec<String>,
    default_sort: Vec<SortSpec>,
    default_limit: u64,
    max_limit: u64,
}

impl ResourceDescriptor {
    #[must_use]
    pub fn new(name: &str, collection: &str, config: &CatalogConfig) -> Self {
        Self {
            name: name.to_string(),
            collection: collection.to_string(),
            filterable: HashMap::new(),
            sortable: HashSet::new(),
            projectable: HashSet::new(),
            default_projection: Vec::new(),
            default_sort: Vec::new(),
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    /// Declares a filterable field path with its scalar kind.
    pub fn filter(&mut self, path: &str, kind: FieldKind) {
        self.filterable.insert(path.to_string(), kind);
    }

    /// Declares a sortable field path.
    pub fn sort(&mut self, path: &str) {
        self.sortable.insert(path.to_string());
    }

    /// Declares a projectable top-level field. Declaration order defines the
    /// default projection.
    pub fn project(&mut self, path: &str) {
        if self.projectable.insert(path.to_string()) {
            self.default_projection.push(path.to_string());
        }
    }

    /// Declares a nested path addressable in `fields=`, without adding it to
    /// the default projection (its parent object already covers it).
    pub fn project_nested(&mut self, path: &str) {
        self.projectable.insert(path.to_string());
    }

    pub fn default_sort_by(&mut self, path: &str, order: Order) {
        self.default_sort.push(SortSpec { field: path.to_string(), order });
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    #[must_use]
    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }

    #[must_use]
    pub fn default_projection(&self) -> Vec<String> {
        self.default_projection.clone()
    }

    #[must_use]
    pub fn default_sort(&self) -> Vec<SortSpec> {
        self.default_sort.clone()
    }

    /// Scalar kind of a declared filterable path, or `None` when the path is
    /// not declared for filtering.
    #[must_use]
    pub fn filter_kind(&self, path: &str) -> Option<FieldKind> {
        self.filterable.get(path).copied()
    }

    /// Membership check against the declared path set for the given use.
    ///
    /// Exact, case-sensitive match; dotted nested paths must be declared
    /// verbatim. Anything undeclared is rejected so clients can never reach
    /// internal fields or smuggle backend operators through field names.
    ///
    /// # Errors
    /// `ApiError::UnknownField` when the path is not declared for `usage`.
    pub fn validate(&self, path: &str, usage: FieldUse) -> Result<(), ApiError> {
        let known = match usage {
            FieldUse::Filter => self.filterable.contains_key(path),
            FieldUse::Sort => self.sortable.contains(path),
            FieldUse::Project => self.projectable.contains(path),
        };
        if known {
            Ok(())
        } else {
            Err(ApiError::UnknownField { field: path.to_string(), usage })
        }
    }
}

/// The built-in catalog resources: movie, person, review.
#[must_use]
pub fn builtin(config: &CatalogConfig) -> Vec<ResourceDescriptor> {
    vec![movie(config), person(config), review(config)]
}

fn movie(config: &CatalogConfig) -> ResourceDescriptor {
    let mut d = ResourceDescriptor::new("movie", "movies", config);

    d.filter("id", FieldKind::Number);
    d.filter("name", FieldKind::Text);
    d.filter("alternativeName", FieldKind::Text);
    d.filter("enName", FieldKind::Text);
    d.filter("names.name", FieldKind::Text);
    d.filter("type", FieldKind::String);
    d.filter("typeNumber", FieldKind::Number);
    d.filter("status", FieldKind::String);
    d.filter("year", FieldKind::Number);
    d.filter("movieLength", FieldKind::Number);
    d.filter("ratingMpaa", FieldKind::String);
    d.filter("ageRating", FieldKind::Number);
    d.filter("rating.kp", FieldKind::Number);
    d.filter("rating.imdb", FieldKind::Number);
    d.filter("rating.tmdb", FieldKind::Number);
    d.filter("rating.filmCritics", FieldKind::Number);
    d.filter("votes.kp", FieldKind::Number);
    d.filter("votes.imdb", FieldKind::Number);
    d.filter("genres.name", FieldKind::Text);
    d.filter("countries.name", FieldKind::Text);
    d.filter("persons.id", FieldKind::Number);
    d.filter("persons.name", FieldKind::Text);
    d.filter("persons.profession", FieldKind::String);
    d.filter("persons.enProfession", FieldKind::String);
    d.filter("premiere.world", FieldKind::Date);
    d.filter("premiere.russia", FieldKind::Date);
    d.filter("premiere.digital", FieldKind::Date);
    d.filter("top10", FieldKind::Number);
    d.filter("top250", FieldKind::Number);

    for path in [
        "id",
        "name",
        "year",
        "typeNumber",
        "movieLength",
        "ageRating",
        "rating.kp",
        "rating.imdb",
        "votes.kp",
        "votes.imdb",
        "premiere.world",
        "premiere.russia",
        "top10",
        "top250",
    ] {
        d.sort(path);
    }

    for path in [
        "id",
        "externalId",
        "name",
        "alternativeName",
        "enName",
        "names",
        "type",
        "typeNumber",
        "year",
        "description",
        "shortDescription",
        "slogan",
        "status",
        "facts",
        "rating",
        "votes",
        "movieLength",
        "ratingMpaa",
        "ageRating",
        "logo",
        "poster",
        "backdrop",
        "genres",
        "countries",
        "persons",
        "premiere",
        "budget",
        "fees",
        "top10",
        "top250",
    ] {
        d.project(path);
    }
    for path in [
        "rating.kp",
        "rating.imdb",
        "votes.kp",
        "votes.imdb",
        "premiere.world",
        "premiere.russia",
        "persons.id",
        "persons.name",
        "genres.name",
        "countries.name",
    ] {
        d.project_nested(path);
    }

    d.default_sort_by("id", Order::Asc);
    d
}

fn person(config: &CatalogConfig) -> ResourceDescriptor {
    let mut d = ResourceDescriptor::new("person", "persons", config);

    d.filter("id", FieldKind::Number);
    d.filter("name", FieldKind::Text);
    d.filter("enName", FieldKind::Text);
    d.filter("sex", FieldKind::String);
    d.filter("growth", FieldKind::Number);
    d.filter("age", FieldKind::Number);
    d.filter("birthday", FieldKind::Date);
    d.filter("death", FieldKind::Date);
    d.filter("countAwards", FieldKind::Number);
    d.filter("profession.value", FieldKind::Text);
    d.filter("movies.id", FieldKind::Number);
    d.filter("movies.name", FieldKind::Text);
    d.filter("movies.enProfession", FieldKind::String);

    for path in ["id", "name", "growth", "age", "birthday", "death", "countAwards"] {
        d.sort(path);
    }

    for path in [
        "id",
        "name",
        "enName",
        "photo",
        "sex",
        "growth",
        "birthday",
        "death",
        "age",
        "countAwards",
        "profession",
        "movies",
    ] {
        d.project(path);
    }
    for path in ["profession.value", "movies.id", "movies.name"] {
        d.project_nested(path);
    }

    d.default_sort_by("id", Order::Asc);
    d
}

fn review(config: &CatalogConfig) -> ResourceDescriptor {
    let mut d = ResourceDescriptor::new("review", "reviews", config);

    d.filter("id", FieldKind::Number);
    d.filter("movieId", FieldKind::Number);
    d.filter("title", FieldKind::Text);
    d.filter("type", FieldKind::String);
    d.filter("review", FieldKind::Text);
    d.filter("date", FieldKind::Date);
    d.filter("author", FieldKind::Text);
    d.filter("authorId", FieldKind::Number);
    d.filter("userRating", FieldKind::Number);

    for path in ["id", "movieId", "date", "userRating", "authorId"] {
        d.sort(path);
    }

    for path in
        ["id", "movieId", "title", "type", "review", "date", "author", "authorId", "userRating"]
    {
        d.project(path);
    }

    d.default_sort_by("id", Order::Asc);
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_descriptor() -> ResourceDescriptor {
        movie(&CatalogConfig::default())
    }

    #[test]
    fn declared_filter_paths_validate() {
        let d = movie_descriptor();
        for path in ["id", "year", "rating.kp", "genres.name", "premiere.world"] {
            assert!(d.validate(path, FieldUse::Filter).is_ok(), "{path}");
        }
    }

    #[test]
    fn undeclared_paths_are_rejected_per_use() {
        let d = movie_descriptor();
        assert!(matches!(
            d.validate("bogusField", FieldUse::Filter),
            Err(ApiError::UnknownField { field, usage: FieldUse::Filter }) if field == "bogusField"
        ));
        // Filterable but not sortable.
        assert!(d.validate("genres.name", FieldUse::Filter).is_ok());
        assert!(d.validate("genres.name", FieldUse::Sort).is_err());
        // Case-sensitive exact match, no wildcard expansion.
        assert!(d.validate("Year", FieldUse::Filter).is_err());
        assert!(d.validate("rating.*", FieldUse::Filter).is_err());
    }

    #[test]
    fn default_projection_keeps_declaration_order() {
        let d = movie_descriptor();
        let proj = d.default_projection();
        assert_eq!(proj.first().map(String::as_str), Some("id"));
        assert!(proj.contains(&"rating".to_string()));
        // Nested aliases are addressable but not part of the default set.
        assert!(!proj.contains(&"rating.kp".to_string()));
        assert!(d.validate("rating.kp", FieldUse::Project).is_ok());
    }

    #[test]
    fn limits_come_from_config() {
        let config = CatalogConfig { default_limit: 25, max_limit: 100 };
        let d = movie(&config);
        assert_eq!(d.default_limit(), 25);
        assert_eq!(d.max_limit(), 100);
    }
}
