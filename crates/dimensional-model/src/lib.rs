//! `dimensional-model` defines the data-warehouse concepts consumed by the filter relations
//! engine and the function-call translator:
//! - attributes (columns, optionally bucketed to a date granularity) and measures
//! - filters, identified by a stable `guid`, including multi-level cascading filters
//! - the JAQL fragments each filter produces for the query layer

mod attribute;
mod error;
mod filter;
mod jaql;

pub use attribute::{Aggregation, Attribute, AttributeType, Granularity, Measure};
pub use error::ModelError;
pub use filter::{
    find_filter_by_guid, get_filter_compare_id, Filter, FilterConfig, FilterKind,
    LogicalOperator, NumericCondition, RankingDirection, RelativeDirection, TextOperator,
};

/// Generates a new filter guid.
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
