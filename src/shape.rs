//! Version-specific response shaping: canonical documents into the output
//! shape of one API version.
//!
//! One static table per (resource, version) pair replaces the older
//! generation's parallel DTO structs. Each output field either copies a
//! canonical path or derives a value from the document; missing sources are
//! omitted, never an error. Shaping copies — the canonical document is
//! untouched, so any number of versions can shape the same document
//! concurrently.

use crate::errors::ApiError;
use crate::query::first_path_value;
use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1_3,
    V1_4,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.3" => Ok(Self::V1_3),
            "1.4" => Ok(Self::V1_4),
            other => Err(ApiError::UnknownVersion(other.to_string())),
        }
    }
}

#[derive(Clone, Copy)]
enum FieldSource {
    /// Copy the value at a canonical path, possibly under a new name.
    Path(&'static str),
    /// Compute the value from the whole canonical document.
    Derive(fn(&Document) -> Option<Bson>),
}

struct ShapeField {
    name: &'static str,
    source: FieldSource,
}

const fn copy(name: &'static str) -> ShapeField {
    ShapeField { name, source: FieldSource::Path(name) }
}

const fn derive(name: &'static str, f: fn(&Document) -> Option<Bson>) -> ShapeField {
    ShapeField { name, source: FieldSource::Derive(f) }
}

static MOVIE_V1_4: &[ShapeField] = &[
    copy("id"),
    copy("externalId"),
    copy("name"),
    copy("alternativeName"),
    copy("enName"),
    copy("names"),
    copy("type"),
    copy("typeNumber"),
    copy("year"),
    copy("description"),
    copy("shortDescription"),
    copy("slogan"),
    copy("status"),
    copy("facts"),
    copy("rating"),
    copy("votes"),
    copy("movieLength"),
    copy("ratingMpaa"),
    copy("ageRating"),
    copy("logo"),
    copy("poster"),
    copy("backdrop"),
    copy("genres"),
    copy("countries"),
    copy("persons"),
    copy("premiere"),
    copy("budget"),
    copy("fees"),
    copy("top10"),
    copy("top250"),
    derive("isSeries", movie_is_series),
];

// The 1.3 movie payload predates the nested vendor-number objects: rating
// and votes are flat numbers, and the newer catalog fields are absent.
static MOVIE_V1_3: &[ShapeField] = &[
    copy("id"),
    copy("externalId"),
    copy("name"),
    copy("alternativeName"),
    copy("enName"),
    copy("names"),
    copy("type"),
    copy("year"),
    copy("description"),
    copy("shortDescription"),
    copy("slogan"),
    copy("status"),
    derive("rating", movie_rating_kp),
    derive("votes", movie_votes_kp),
    copy("movieLength"),
    copy("ratingMpaa"),
    copy("ageRating"),
    copy("poster"),
    copy("backdrop"),
    copy("genres"),
    copy("countries"),
    copy("persons"),
    copy("premiere"),
    copy("budget"),
    copy("fees"),
];

static PERSON_V1_4: &[ShapeField] = &[
    copy("id"),
    copy("name"),
    copy("enName"),
    copy("photo"),
    copy("sex"),
    copy("growth"),
    copy("birthday"),
    copy("death"),
    copy("age"),
    copy("countAwards"),
    copy("profession"),
    copy("movies"),
];

// 1.3 carried a single profession string instead of the value-object list.
static PERSON_V1_3: &[ShapeField] = &[
    copy("id"),
    copy("name"),
    copy("enName"),
    copy("photo"),
    copy("sex"),
    copy("growth"),
    copy("birthday"),
    copy("death"),
    copy("age"),
    derive("profession", person_first_profession),
];

static REVIEW_V1_4: &[ShapeField] = &[
    copy("id"),
    copy("movieId"),
    copy("title"),
    copy("type"),
    copy("review"),
    copy("date"),
    copy("author"),
    copy("authorId"),
    copy("userRating"),
];

static REVIEW_V1_3: &[ShapeField] = &[
    copy("id"),
    copy("movieId"),
    copy("title"),
    copy("type"),
    copy("review"),
    copy("date"),
    copy("author"),
];

fn shape_for(resource: &str, version: ApiVersion) -> Option<&'static [ShapeField]> {
    match (resource, version) {
        ("movie", ApiVersion::V1_4) => Some(MOVIE_V1_4),
        ("movie", ApiVersion::V1_3) => Some(MOVIE_V1_3),
        ("person", ApiVersion::V1_4) => Some(PERSON_V1_4),
        ("person", ApiVersion::V1_3) => Some(PERSON_V1_3),
        ("review", ApiVersion::V1_4) => Some(REVIEW_V1_4),
        ("review", ApiVersion::V1_3) => Some(REVIEW_V1_3),
        _ => None,
    }
}

fn movie_is_series(doc: &Document) -> Option<Bson> {
    doc.get_str("type")
        .ok()
        .map(|t| Bson::Boolean(matches!(t, "tv-series" | "animated-series")))
}

fn movie_rating_kp(doc: &Document) -> Option<Bson> {
    first_path_value(doc, "rating.kp").cloned()
}

fn movie_votes_kp(doc: &Document) -> Option<Bson> {
    first_path_value(doc, "votes.kp").cloned()
}

fn person_first_profession(doc: &Document) -> Option<Bson> {
    first_path_value(doc, "profession.value").cloned()
}

/// Shapes one canonical document for a resource and version. Resources
/// without a registered shape (custom descriptors) pass through with output
/// rendering only.
#[must_use]
pub fn shape_document(resource: &str, version: ApiVersion, doc: &Document) -> Document {
    let Some(fields) = shape_for(resource, version) else {
        return render_document(doc);
    };
    let mut out = Document::new();
    for field in fields {
        let value = match field.source {
            FieldSource::Path(path) => doc.get(path).cloned(),
            FieldSource::Derive(f) => f(doc),
        };
        if let Some(v) = value {
            out.insert(field.name, render_value(v));
        }
    }
    out
}

// Output rendering: instants become RFC 3339 strings so the JSON payload
// never carries extended-JSON date wrappers.
fn render_value(value: Bson) -> Bson {
    match value {
        Bson::DateTime(dt) => match DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()) {
            Some(ts) => Bson::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Bson::DateTime(dt),
        },
        Bson::Document(d) => Bson::Document(render_document(&d)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(render_value).collect()),
        other => other,
    }
}

fn render_document(doc: &Document) -> Document {
    let mut out = Document::new();
    for (k, v) in doc {
        out.insert(k.clone(), render_value(v.clone()));
    }
    out
}

/// The success payload for a find request: one page of shaped documents
/// plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct DocsResponse {
    pub docs: Vec<Document>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}
