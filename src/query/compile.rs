//! Filter compiler: every non-reserved query parameter becomes one field
//! predicate; predicates are AND-combined into the filter tree.

use crate::errors::ApiError;
use crate::query::operand::parse_operand;
use crate::query::raw::RawQuery;
use crate::query::types::{CmpOp, Filter, ParsedOperand};
use crate::resource::{FieldKind, FieldUse, ResourceDescriptor};
use bson::Bson;

/// Parameter names owned by the orchestrator, never candidate filter
/// fields. `query` belongs to the separate free-text search mode.
pub const RESERVED_PARAMS: &[&str] = &["page", "limit", "sort", "fields", "query"];

/// Compiles the non-reserved parameters of `raw` into a filter tree.
///
/// Unknown fields fail instead of being dropped: a silently ignored filter
/// would return a wrong result set without telling the caller anything.
///
/// # Errors
/// `UnknownField` plus everything the operator parser can fail with.
pub fn compile_filter(
    resource: &ResourceDescriptor,
    raw: &RawQuery,
) -> Result<Filter, ApiError> {
    let mut predicates = Vec::new();
    for (name, values) in raw.iter() {
        if RESERVED_PARAMS.contains(&name) {
            continue;
        }
        let kind = resource.filter_kind(name).ok_or_else(|| ApiError::UnknownField {
            field: name.to_string(),
            usage: FieldUse::Filter,
        })?;
        let operand = match values {
            [single] => parse_operand(kind, name, single)?,
            many => merge_repeated(kind, name, many)?,
        };
        predicates.push(lower(name, operand));
    }
    Ok(if predicates.is_empty() { Filter::True } else { Filter::And(predicates) })
}

/// A field repeated with several raw values merges into one member-of-set
/// predicate. Operator punctuation inside repeated values has no defined
/// meaning (there is no cross-value OR), so it is malformed.
fn merge_repeated(kind: FieldKind, field: &str, values: &[String]) -> Result<ParsedOperand, ApiError> {
    let mut members = Vec::with_capacity(values.len());
    for value in values {
        match parse_operand(kind, field, value)? {
            ParsedOperand::Eq(v) => members.push(v),
            ParsedOperand::Match(s) => members.push(Bson::String(s)),
            _ => {
                return Err(ApiError::MalformedFilterValue {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }
    }
    Ok(ParsedOperand::In(members))
}

/// Lowers a parsed operand to tree leaves. Ranges become `Gte AND Lte`;
/// negated ranges wrap that in `Not`.
fn lower(path: &str, operand: ParsedOperand) -> Filter {
    let path = path.to_string();
    match operand {
        ParsedOperand::Eq(value) => Filter::Cmp { path, op: CmpOp::Eq, value },
        ParsedOperand::Ne(value) => Filter::Cmp { path, op: CmpOp::Ne, value },
        ParsedOperand::In(values) => Filter::In { path, values },
        ParsedOperand::Nin(values) => Filter::Nin { path, values },
        ParsedOperand::Match(needle) => Filter::Match { path, needle },
        ParsedOperand::Range { low, high, negated } => {
            let band = Filter::And(vec![
                Filter::Cmp { path: path.clone(), op: CmpOp::Gte, value: low },
                Filter::Cmp { path, op: CmpOp::Lte, value: high },
            ]);
            if negated { Filter::Not(Box::new(band)) } else { band }
        }
    }
}
