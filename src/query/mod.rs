// Submodules for separation of concerns
mod coerce;
mod compile;
mod eval;
mod operand;
mod pagination;
mod plan;
mod raw;
mod types;

// Public API re-exports
pub use coerce::{coerce_date, coerce_number};
pub use compile::{RESERVED_PARAMS, compile_filter};
pub use eval::{compare_docs, eval_filter, first_path_value, path_values, project_fields};
pub use operand::parse_operand;
pub use pagination::{PageRequest, plan_pagination, total_pages};
pub use plan::build_plan;
pub use raw::RawQuery;
pub use types::{CmpOp, Filter, Order, ParsedOperand, QueryPlan, SortSpec};
