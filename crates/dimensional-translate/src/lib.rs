//! Translation between JSON function-call descriptions and dimensional filters.
//!
//! A call such as `{"function": "filterFactory.members", "args": ["DM.Commerce.Gender",
//! ["Female"]]}` is resolved against a [`DataSchema`] into a [`dimensional_model::Filter`].
//! Relations are described with `filterFactory.logic.and|or` calls. Any call can also be
//! rendered back into a source snippet with [`function_call_to_code`].

mod call;
mod code;
mod config;
mod error;
mod filters;
mod relations;

pub use call::{resolve_attribute, FunctionCall};
pub use code::function_call_to_code;
pub use config::{DataColumn, DataSchema, DataTable, DataType, TranslationSettings};
pub use error::{TranslationError, TranslationResult};
pub use filters::{translate_filter, translate_filters_json, translate_measure};
pub use relations::translate_filter_relations_json;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{DataColumn, DataSchema, DataTable, DataType};

    pub(crate) fn commerce_schema() -> DataSchema {
        let column = |name: &str, data_type| DataColumn {
            name: name.to_string(),
            data_type,
        };
        DataSchema {
            tables: vec![DataTable {
                name: "Commerce".to_string(),
                columns: vec![
                    column("Gender", DataType::Text),
                    column("Condition", DataType::Text),
                    column("Category", DataType::Text),
                    column("Revenue", DataType::Numeric),
                    column("Date", DataType::Datetime),
                ],
            }],
        }
    }
}
