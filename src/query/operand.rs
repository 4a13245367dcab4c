//! Operator parser: the surface syntax of one filter parameter value.
//!
//! Priority is fixed: negation prefix, then range, then set, then bare
//! value. A value mixing range and set punctuation is malformed rather than
//! silently reinterpreted.

use crate::errors::ApiError;
use crate::query::coerce::{coerce_date, coerce_number};
use crate::query::types::{MAX_IN_SET, ParsedOperand};
use crate::resource::FieldKind;
use bson::Bson;

/// Parses one raw filter value for a field of the given kind.
///
/// # Errors
/// `InvalidNumber` / `InvalidDate` from scalar coercion, `InvalidRangeBound`
/// for an uncoercible range endpoint, `MalformedFilterValue` for ambiguous
/// or empty syntax.
pub fn parse_operand(kind: FieldKind, field: &str, raw: &str) -> Result<ParsedOperand, ApiError> {
    let (negated, body) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if body.is_empty() {
        return Err(malformed(field, raw));
    }

    match kind {
        FieldKind::Number | FieldKind::Date => parse_scalar(kind, field, raw, body, negated),
        FieldKind::String | FieldKind::Text => parse_textual(kind, field, body, negated),
    }
}

fn parse_scalar(
    kind: FieldKind,
    field: &str,
    raw: &str,
    body: &str,
    negated: bool,
) -> Result<ParsedOperand, ApiError> {
    let range = split_range(body);
    let has_set = body.contains(',');
    if range.is_some() && has_set {
        return Err(malformed(field, raw));
    }

    if let Some((lo, hi)) = range {
        let low = coerce_scalar(kind, field, lo)
            .map_err(|_| range_bound(field, lo))?;
        let high = coerce_scalar(kind, field, hi)
            .map_err(|_| range_bound(field, hi))?;
        return Ok(ParsedOperand::Range { low, high, negated });
    }

    if has_set {
        let values = coerce_set(body, field, raw, |elem| coerce_scalar(kind, field, elem))?;
        return Ok(set_operand(values, negated));
    }

    let value = coerce_scalar(kind, field, body)?;
    Ok(if negated { ParsedOperand::Ne(value) } else { ParsedOperand::Eq(value) })
}

fn parse_textual(
    kind: FieldKind,
    field: &str,
    body: &str,
    negated: bool,
) -> Result<ParsedOperand, ApiError> {
    // `-` and `.` are ordinary characters in string values; ranges never
    // apply here.
    if body.contains(',') {
        let values = coerce_set(body, field, body, |elem| Ok(Bson::String(elem.to_string())))?;
        return Ok(set_operand(values, negated));
    }
    let op = match (kind, negated) {
        // Bare positive value on a free-text field: partial match.
        (FieldKind::Text, false) => ParsedOperand::Match(body.to_string()),
        // Negation always inverts exact equality semantics.
        (_, true) => ParsedOperand::Ne(Bson::String(body.to_string())),
        (_, false) => ParsedOperand::Eq(Bson::String(body.to_string())),
    };
    Ok(op)
}

/// `low-high` with exactly one `-` and both sides non-empty. A leading `-`
/// is an operand sign, not a separator, so `-5` falls through to bare
/// coercion.
fn split_range(s: &str) -> Option<(&str, &str)> {
    let mut hyphens = s.match_indices('-');
    let (idx, _) = hyphens.next()?;
    if hyphens.next().is_some() {
        return None;
    }
    if idx == 0 || idx + 1 == s.len() {
        return None;
    }
    Some((&s[..idx], &s[idx + 1..]))
}

fn coerce_set<F>(body: &str, field: &str, raw: &str, mut coerce: F) -> Result<Vec<Bson>, ApiError>
where
    F: FnMut(&str) -> Result<Bson, ApiError>,
{
    let mut values = Vec::new();
    for elem in body.split(',') {
        if elem.is_empty() {
            return Err(malformed(field, raw));
        }
        values.push(coerce(elem)?);
        if values.len() > MAX_IN_SET {
            return Err(malformed(field, raw));
        }
    }
    Ok(values)
}

fn coerce_scalar(kind: FieldKind, field: &str, raw: &str) -> Result<Bson, ApiError> {
    match kind {
        FieldKind::Number => coerce_number(field, raw),
        FieldKind::Date => coerce_date(field, raw),
        FieldKind::String | FieldKind::Text => Ok(Bson::String(raw.to_string())),
    }
}

fn set_operand(values: Vec<Bson>, negated: bool) -> ParsedOperand {
    if negated { ParsedOperand::Nin(values) } else { ParsedOperand::In(values) }
}

fn malformed(field: &str, value: &str) -> ApiError {
    ApiError::MalformedFilterValue { field: field.to_string(), value: value.to_string() }
}

fn range_bound(field: &str, bound: &str) -> ApiError {
    ApiError::InvalidRangeBound { field: field.to_string(), value: bound.to_string() }
}
