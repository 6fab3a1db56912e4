use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Kind of data an attribute exposes to the query engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    Text,
    Numeric,
    /// A datetime column bucketed to a [`Granularity`].
    DateLevel,
}

impl AttributeType {
    /// JAQL `datatype` value.
    pub fn jaql_datatype(self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::Numeric => "numeric",
            AttributeType::DateLevel => "datetime",
        }
    }

    pub fn from_jaql_datatype(value: &str) -> Result<Self, ModelError> {
        match value {
            "text" => Ok(AttributeType::Text),
            "numeric" => Ok(AttributeType::Numeric),
            "datetime" => Ok(AttributeType::DateLevel),
            other => Err(ModelError::UnsupportedAttributeType(other.to_string())),
        }
    }
}

/// Date bucketing level for datetime attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    MinutesRoundTo30,
    MinutesRoundTo15,
    Minutes,
    Seconds,
}

impl Granularity {
    pub const ALL: [Granularity; 10] = [
        Granularity::Years,
        Granularity::Quarters,
        Granularity::Months,
        Granularity::Weeks,
        Granularity::Days,
        Granularity::Hours,
        Granularity::MinutesRoundTo30,
        Granularity::MinutesRoundTo15,
        Granularity::Minutes,
        Granularity::Seconds,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Years => "Years",
            Granularity::Quarters => "Quarters",
            Granularity::Months => "Months",
            Granularity::Weeks => "Weeks",
            Granularity::Days => "Days",
            Granularity::Hours => "Hours",
            Granularity::MinutesRoundTo30 => "MinutesRoundTo30",
            Granularity::MinutesRoundTo15 => "MinutesRoundTo15",
            Granularity::Minutes => "Minutes",
            Granularity::Seconds => "Seconds",
        }
    }

    /// JAQL `level` value. Rounded minute levels share `minutes` and differ by
    /// [`Self::jaql_bucket`].
    pub fn jaql_level(self) -> &'static str {
        match self {
            Granularity::Years => "years",
            Granularity::Quarters => "quarters",
            Granularity::Months => "months",
            Granularity::Weeks => "weeks",
            Granularity::Days => "days",
            Granularity::Hours => "hours",
            Granularity::MinutesRoundTo30
            | Granularity::MinutesRoundTo15
            | Granularity::Minutes => "minutes",
            Granularity::Seconds => "seconds",
        }
    }

    pub fn jaql_bucket(self) -> Option<&'static str> {
        match self {
            Granularity::MinutesRoundTo30 => Some("30"),
            Granularity::MinutesRoundTo15 => Some("15"),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::InvalidGranularity(s.to_string()))
    }
}

/// A column of the data model, addressed by its JAQL expression (`[Table.Column]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub expression: String,
    pub attribute_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        expression: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            attribute_type,
            granularity: None,
        }
    }

    pub fn text(table: &str, column: &str) -> Self {
        Self::new(column, column_expression(table, column), AttributeType::Text)
    }

    pub fn numeric(table: &str, column: &str) -> Self {
        Self::new(column, column_expression(table, column), AttributeType::Numeric)
    }

    /// A datetime column bucketed to `granularity`.
    ///
    /// The display name carries the level (`Date.Years`) while the expression stays the
    /// column's, so filters on different levels of the same column remain distinguishable
    /// only through the granularity.
    pub fn date_level(table: &str, column: &str, granularity: Granularity) -> Self {
        Self {
            name: format!("{column}.{granularity}"),
            expression: column_expression(table, column),
            attribute_type: AttributeType::DateLevel,
            granularity: Some(granularity),
        }
    }

    /// The base JAQL element (`title`, `dim`, `datatype`, and `level` for datetime levels).
    pub fn jaql_element(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = serde_json::Map::new();
        out.insert("title".to_string(), self.name.clone().into());
        out.insert("dim".to_string(), self.expression.clone().into());
        out.insert(
            "datatype".to_string(),
            self.attribute_type.jaql_datatype().into(),
        );
        if let Some(granularity) = self.granularity {
            out.insert("level".to_string(), granularity.jaql_level().into());
            if let Some(bucket) = granularity.jaql_bucket() {
                out.insert("bucket".to_string(), bucket.into());
            }
        }
        out
    }
}

fn column_expression(table: &str, column: &str) -> String {
    format!("[{table}.{column}]")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    Sum,
    Average,
    Min,
    Max,
    Count,
    CountDistinct,
}

impl Aggregation {
    pub fn jaql_agg(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Average => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "countduplicates",
        }
    }
}

/// An aggregated attribute, used by ranking filters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: String,
    pub attribute: Attribute,
    pub aggregation: Aggregation,
}

impl Measure {
    pub fn new(attribute: Attribute, aggregation: Aggregation) -> Self {
        let name = format!("{} {}", aggregation.jaql_agg(), attribute.name);
        Self {
            name,
            attribute,
            aggregation,
        }
    }

    pub fn jaql_element(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = self.attribute.jaql_element();
        out.insert("title".to_string(), self.name.clone().into());
        out.insert("agg".to_string(), self.aggregation.jaql_agg().into());
        out
    }
}
