//! JAQL fragments produced by filters.
//!
//! A filter renders as `{ "jaql": { title, dim, datatype, level?, filter } }`. Cascading
//! filters render as an array with one such fragment per level.

use serde_json::{json, Map, Value};

use crate::{Filter, FilterKind, NumericCondition, RankingDirection, RelativeDirection};

impl Filter {
    /// Full JAQL fragment for this filter.
    pub fn jaql(&self) -> Value {
        if let FilterKind::Cascading { levels } = &self.kind {
            return Value::Array(levels.iter().map(Filter::jaql).collect());
        }

        let mut element = self.attribute.jaql_element();
        element.insert("filter".to_string(), self.filter_jaql());
        json!({ "jaql": Value::Object(element) })
    }

    /// The `filter` member of this filter's JAQL element.
    pub fn filter_jaql(&self) -> Value {
        match &self.kind {
            FilterKind::Members {
                members,
                exclude_members,
            } => {
                if *exclude_members {
                    json!({ "exclude": { "members": members } })
                } else if members.is_empty() {
                    json!({ "all": true })
                } else {
                    json!({ "members": members })
                }
            }
            FilterKind::Exclude { filter } => json!({ "exclude": filter.filter_jaql() }),
            FilterKind::Numeric { condition } => numeric_jaql(condition),
            FilterKind::Text { operator, value } => {
                let mut out = Map::new();
                out.insert(operator.jaql_key().to_string(), value.clone().into());
                Value::Object(out)
            }
            FilterKind::DateRange { from, to } => {
                let mut out = Map::new();
                if let Some(from) = from {
                    out.insert("from".to_string(), from.clone().into());
                }
                if let Some(to) = to {
                    out.insert("to".to_string(), to.clone().into());
                }
                Value::Object(out)
            }
            FilterKind::RelativeDate {
                offset,
                count,
                direction,
                anchor,
            } => {
                let mut body = Map::new();
                body.insert("offset".to_string(), (*offset).into());
                body.insert("count".to_string(), (*count).into());
                if let Some(anchor) = anchor {
                    body.insert("anchor".to_string(), anchor.clone().into());
                }
                let key = match direction {
                    RelativeDirection::Last => "last",
                    RelativeDirection::Next => "next",
                };
                json!({ key: Value::Object(body) })
            }
            FilterKind::Ranking {
                measure,
                count,
                direction,
            } => {
                let key = match direction {
                    RankingDirection::Top => "top",
                    RankingDirection::Bottom => "bottom",
                };
                json!({ key: count, "by": Value::Object(measure.jaql_element()) })
            }
            FilterKind::Logical { operator, filters } => {
                let key = operator.as_str().to_ascii_lowercase();
                let parts: Vec<Value> = filters.iter().map(Filter::filter_jaql).collect();
                json!({ key: parts })
            }
            FilterKind::Cascading { levels } => {
                Value::Array(levels.iter().map(Filter::filter_jaql).collect())
            }
        }
    }
}

fn numeric_jaql(condition: &NumericCondition) -> Value {
    match *condition {
        NumericCondition::Equals(v) => json!({ "equals": v }),
        NumericCondition::DoesntEqual(v) => json!({ "doesntEqual": v }),
        NumericCondition::GreaterThan(v) => json!({ "fromNotEqual": v }),
        NumericCondition::GreaterThanOrEqual(v) => json!({ "from": v }),
        NumericCondition::LessThan(v) => json!({ "toNotEqual": v }),
        NumericCondition::LessThanOrEqual(v) => json!({ "to": v }),
        NumericCondition::Between { from, to } => json!({ "from": from, "to": to }),
        NumericCondition::BetweenNotEqual { from, to } => {
            json!({ "fromNotEqual": from, "toNotEqual": to })
        }
    }
}
