//! Query orchestrator: one raw query into one complete, validated plan.
//!
//! Stages run strictly in order — projection, sort, filter, pagination —
//! and the first failure aborts the whole build. No partial plan is ever
//! handed to storage.

use crate::errors::ApiError;
use crate::query::compile::compile_filter;
use crate::query::pagination::plan_pagination;
use crate::query::raw::RawQuery;
use crate::query::types::{MAX_SORT_FIELDS, Order, QueryPlan, SortSpec};
use crate::resource::{FieldUse, ResourceDescriptor};

/// Builds the complete query plan for `resource` from `raw`.
///
/// # Errors
/// The first validation failure from any stage, unchanged.
pub fn build_plan(resource: &ResourceDescriptor, raw: &RawQuery) -> Result<QueryPlan, ApiError> {
    let projection = parse_projection(resource, raw)?;
    let sort = parse_sort(resource, raw)?;
    let filter = compile_filter(resource, raw)?;
    let page = plan_pagination(resource, raw)?;
    Ok(QueryPlan { filter, sort, projection, page })
}

/// `fields=a,b,c`, each entry validated for projection. Absent means the
/// resource's full default projection, never an empty one.
fn parse_projection(
    resource: &ResourceDescriptor,
    raw: &RawQuery,
) -> Result<Vec<String>, ApiError> {
    let Some(values) = raw.get("fields") else {
        return Ok(resource.default_projection());
    };
    let mut fields = Vec::new();
    for value in values {
        for entry in value.split(',') {
            resource.validate(entry, FieldUse::Project)?;
            if !fields.iter().any(|f| f == entry) {
                fields.push(entry.to_string());
            }
        }
    }
    Ok(fields)
}

/// `sort=-year,name`: comma-separated, `-` prefix for descending, each
/// entry validated for sorting. Absent falls back to the resource default.
fn parse_sort(resource: &ResourceDescriptor, raw: &RawQuery) -> Result<Vec<SortSpec>, ApiError> {
    let Some(values) = raw.get("sort") else {
        return Ok(resource.default_sort());
    };
    let mut sort = Vec::new();
    for value in values {
        for entry in value.split(',') {
            let (field, order) = match entry.strip_prefix('-') {
                Some(rest) => (rest, Order::Desc),
                None => (entry, Order::Asc),
            };
            resource.validate(field, FieldUse::Sort)?;
            sort.push(SortSpec { field: field.to_string(), order });
        }
    }
    if sort.len() > MAX_SORT_FIELDS {
        log::warn!("sort spec too long: {} fields, using first {MAX_SORT_FIELDS}", sort.len());
        sort.truncate(MAX_SORT_FIELDS);
    }
    Ok(sort)
}
