use crate::query::pagination::PageRequest;
use bson::Bson;
use serde::{Deserialize, Serialize};

// Guard rails against abusive query shapes
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// One filter parameter's surface syntax, parsed into an operator tag and
/// typed operand(s). Request-scoped; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOperand {
    Eq(Bson),
    Ne(Bson),
    Range { low: Bson, high: Bson, negated: bool },
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    /// Partial, case-insensitive substring match on a free-text field.
    Match(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gte,
    Lte,
}

/// Backend-agnostic filter expression tree. Leaves carry declared field
/// paths only; the compiler never constructs a leaf for an undeclared path.
/// The storage collaborator owns the operator spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Not(Box<Filter>),
    Cmp { path: String, op: CmpOp, value: Bson },
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    Match { path: String, needle: String },
}

/// The complete, validated instruction set handed to storage: filter, sort,
/// projection, and pagination. Built once per request, then immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub filter: Filter,
    pub sort: Vec<SortSpec>,
    pub projection: Vec<String>,
    pub page: PageRequest,
}
