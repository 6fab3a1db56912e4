use serde::{Deserialize, Serialize};

/// Options controlling how function calls are translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslationSettings {
    /// Leading segment of attribute paths (`DM.Commerce.Gender`).
    pub model_prefix: String,
    /// Match table and column names ignoring ASCII case.
    pub case_insensitive_names: bool,
    /// Drop surplus arguments with a warning instead of reporting an arity error.
    pub ignore_extra_args: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            model_prefix: "DM".to_string(),
            case_insensitive_names: false,
            ignore_extra_args: false,
        }
    }
}

impl TranslationSettings {
    pub(crate) fn names_match(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive_names {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Numeric,
    Datetime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<DataColumn>,
}

/// Catalog of tables and columns that attribute paths resolve against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSchema {
    #[serde(default)]
    pub tables: Vec<DataTable>,
}

impl DataSchema {
    pub fn find_column<'a>(
        &'a self,
        table: &str,
        column: &str,
        settings: &TranslationSettings,
    ) -> Option<(&'a DataTable, &'a DataColumn)> {
        let table = self
            .tables
            .iter()
            .find(|t| settings.names_match(&t.name, table))?;
        let column = table
            .columns
            .iter()
            .find(|c| settings.names_match(&c.name, column))?;
        Some((table, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: TranslationSettings =
            serde_json::from_value(json!({ "ignoreExtraArgs": true })).unwrap();
        assert_eq!(
            settings,
            TranslationSettings {
                ignore_extra_args: true,
                ..TranslationSettings::default()
            }
        );
        assert_eq!(settings.model_prefix, "DM");
    }

    #[test]
    fn schema_lookup_respects_case_setting() {
        let schema: DataSchema = serde_json::from_value(json!({
            "tables": [{
                "name": "Commerce",
                "columns": [{ "name": "Gender", "dataType": "text" }]
            }]
        }))
        .unwrap();

        let strict = TranslationSettings::default();
        assert!(schema.find_column("commerce", "gender", &strict).is_none());

        let relaxed = TranslationSettings {
            case_insensitive_names: true,
            ..TranslationSettings::default()
        };
        let (table, column) = schema.find_column("commerce", "gender", &relaxed).unwrap();
        assert_eq!(table.name, "Commerce");
        assert_eq!(column.data_type, DataType::Text);
    }
}
