//! Pagination planner: page/limit parameters into skip/limit with bounds
//! enforcement.

use crate::errors::ApiError;
use crate::query::raw::RawQuery;
use crate::resource::ResourceDescriptor;
use serde::{Deserialize, Serialize};

/// The paging slice of a query plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

/// Computes the page request from `page`/`limit` parameters.
///
/// `page` defaults to 1 and must be ≥ 1. `limit` defaults to the resource's
/// configured default and must be ≥ 1; a limit above the resource maximum is
/// clamped, not rejected — oversized limits are a resource-protection
/// concern, not a client mistake.
///
/// # Errors
/// `ApiError::InvalidPagination` when either parameter is not a positive
/// integer.
pub fn plan_pagination(
    resource: &ResourceDescriptor,
    raw: &RawQuery,
) -> Result<PageRequest, ApiError> {
    let page = match raw.first("page") {
        Some(value) => parse_positive("page", value)?,
        None => 1,
    };
    let limit = match raw.first("limit") {
        Some(value) => parse_positive("limit", value)?.min(resource.max_limit()),
        None => resource.default_limit(),
    };
    Ok(PageRequest { page, limit, skip: (page - 1) * limit })
}

/// Total pages once the storage collaborator has reported the total count.
#[must_use]
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 { 0 } else { total.div_ceil(limit) }
}

fn parse_positive(param: &'static str, value: &str) -> Result<u64, ApiError> {
    match value.parse::<u64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ApiError::InvalidPagination { param, value: value.to_string() }),
    }
}
