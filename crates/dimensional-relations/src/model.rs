//! The filter relations model authored in Fusion dashboards.
//!
//! Besides plain identifiers and logical expressions it has two node kinds the rule tree
//! does not: brackets, which only affect how grouping is displayed, and cascading
//! identifiers, which name every level of one cascading filter.

use dimensional_model::{find_filter_by_guid, Filter, LogicalOperator};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::cascade::{and_chain, find_cascading_filter_by_levels};
use crate::jaql::FilterRelationsJaql;
use crate::types::{FilterRelationsRuleNode, FilterRelationsRules};
use crate::{RelationsError, RelationsResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIdentifier {
    pub instance_id: String,
}

impl ModelIdentifier {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
        }
    }
}

impl Serialize for ModelIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Identifier", 2)?;
        state.serialize_field("type", "Identifier")?;
        state.serialize_field("instanceId", &self.instance_id)?;
        state.end()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterRelationsModel {
    Identifier(ModelIdentifier),
    CascadingIdentifier {
        levels: Vec<ModelIdentifier>,
    },
    /// Parenthesized sub-expression.
    Bracket {
        value: Box<FilterRelationsModel>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<FilterRelationsModel>,
        right: Box<FilterRelationsModel>,
    },
}

impl FilterRelationsModel {
    pub fn identifier(instance_id: impl Into<String>) -> Self {
        FilterRelationsModel::Identifier(ModelIdentifier::new(instance_id))
    }

    pub fn cascading<S: Into<String>>(levels: impl IntoIterator<Item = S>) -> Self {
        FilterRelationsModel::CascadingIdentifier {
            levels: levels.into_iter().map(ModelIdentifier::new).collect(),
        }
    }

    pub fn bracket(value: Self) -> Self {
        FilterRelationsModel::Bracket {
            value: Box::new(value),
        }
    }

    pub fn logical(operator: LogicalOperator, left: Self, right: Self) -> Self {
        FilterRelationsModel::LogicalExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Parses an untyped model node. Nodes are recognized by shape; a `type` member, when
    /// present, is ignored.
    pub fn from_json(value: &Value) -> RelationsResult<Self> {
        let Some(obj) = value.as_object() else {
            return Err(RelationsError::broken_model(value));
        };

        if let Some(instance_id) = obj.get("instanceId").and_then(Value::as_str) {
            return Ok(Self::identifier(instance_id));
        }
        if let Some(levels) = obj.get("levels").and_then(Value::as_array) {
            let levels = levels
                .iter()
                .map(|level| {
                    level
                        .get("instanceId")
                        .and_then(Value::as_str)
                        .map(ModelIdentifier::new)
                        .ok_or_else(|| RelationsError::broken_model(level))
                })
                .collect::<RelationsResult<Vec<_>>>()?;
            if levels.is_empty() {
                return Err(RelationsError::broken_model(value));
            }
            return Ok(FilterRelationsModel::CascadingIdentifier { levels });
        }
        if let Some(inner) = obj.get("value") {
            return Ok(Self::bracket(Self::from_json(inner)?));
        }
        if let (Some(operator), Some(left), Some(right)) =
            (obj.get("operator"), obj.get("left"), obj.get("right"))
        {
            let operator = match operator.as_str() {
                Some("AND") => LogicalOperator::And,
                Some("OR") => LogicalOperator::Or,
                _ => return Err(RelationsError::broken_model(value)),
            };
            return Ok(Self::logical(
                operator,
                Self::from_json(left)?,
                Self::from_json(right)?,
            ));
        }

        Err(RelationsError::broken_model(value))
    }
}

impl Serialize for FilterRelationsModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(tag = "type")]
        enum Tagged<'a> {
            CascadingIdentifier {
                levels: &'a [ModelIdentifier],
            },
            BracketNode {
                value: &'a FilterRelationsModel,
            },
            LogicalExpression {
                operator: LogicalOperator,
                left: &'a FilterRelationsModel,
                right: &'a FilterRelationsModel,
            },
        }

        match self {
            FilterRelationsModel::Identifier(id) => id.serialize(serializer),
            FilterRelationsModel::CascadingIdentifier { levels } => {
                Tagged::CascadingIdentifier { levels }.serialize(serializer)
            }
            FilterRelationsModel::Bracket { value } => {
                Tagged::BracketNode { value }.serialize(serializer)
            }
            FilterRelationsModel::LogicalExpression {
                operator,
                left,
                right,
            } => Tagged::LogicalExpression {
                operator: *operator,
                left,
                right,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FilterRelationsModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Converts a Fusion model into a rule tree.
///
/// Brackets are unwrapped. A cascading identifier becomes a leaf referencing the cascading
/// filter in `filters` whose levels it names; no such filter is an error.
pub fn convert_filter_relations_model_to_relation_rules(
    model: Option<&FilterRelationsModel>,
    filters: &[Filter],
) -> RelationsResult<FilterRelationsRules> {
    model
        .map(|node| model_node_to_rule(node, filters))
        .transpose()
}

fn model_node_to_rule(
    node: &FilterRelationsModel,
    filters: &[Filter],
) -> RelationsResult<FilterRelationsRuleNode> {
    match node {
        FilterRelationsModel::Identifier(id) => {
            Ok(FilterRelationsRuleNode::id(id.instance_id.clone()))
        }
        FilterRelationsModel::CascadingIdentifier { levels } => {
            let level_guids: Vec<&str> = levels.iter().map(|l| l.instance_id.as_str()).collect();
            find_cascading_filter_by_levels(filters, &level_guids)
                .map(|filter| FilterRelationsRuleNode::id(filter.guid()))
                .ok_or_else(|| RelationsError::CascadingFilterNotFound {
                    level_guids: level_guids.iter().map(|g| g.to_string()).collect(),
                })
        }
        FilterRelationsModel::Bracket { value } => model_node_to_rule(value, filters),
        FilterRelationsModel::LogicalExpression {
            operator,
            left,
            right,
        } => Ok(FilterRelationsRuleNode::rule(
            model_node_to_rule(left, filters)?,
            model_node_to_rule(right, filters)?,
            *operator,
        )),
    }
}

/// Converts a rule tree into a Fusion model. Leaves referencing a cascading filter expand to
/// a cascading identifier listing its levels.
pub fn filter_relation_rules_to_filter_relations_model(
    rules: &FilterRelationsRules,
    filters: &[Filter],
) -> Option<FilterRelationsModel> {
    rules.as_ref().map(|node| rule_to_model_node(node, filters))
}

fn rule_to_model_node(node: &FilterRelationsRuleNode, filters: &[Filter]) -> FilterRelationsModel {
    match node {
        FilterRelationsRuleNode::Id(id) => match find_filter_by_guid(filters, &id.instanceid) {
            Some(filter) if filter.is_cascading() => {
                FilterRelationsModel::cascading(filter.levels().iter().map(Filter::guid))
            }
            _ => FilterRelationsModel::identifier(id.instanceid.clone()),
        },
        FilterRelationsRuleNode::Rule(rule) => FilterRelationsModel::logical(
            rule.operator,
            rule_to_model_node(&rule.left, filters),
            rule_to_model_node(&rule.right, filters),
        ),
    }
}

/// Converts a Fusion model into wire relations. Cascading identifiers become the AND chain
/// of their levels.
pub fn convert_filter_relations_model_to_jaql(
    model: Option<&FilterRelationsModel>,
) -> RelationsResult<Option<FilterRelationsJaql>> {
    model.map(model_node_to_jaql).transpose()
}

fn model_node_to_jaql(node: &FilterRelationsModel) -> RelationsResult<FilterRelationsJaql> {
    match node {
        FilterRelationsModel::Identifier(id) => Ok(FilterRelationsJaql::id(id.instance_id.clone())),
        FilterRelationsModel::CascadingIdentifier { levels } => {
            and_chain(levels.iter().map(|l| l.instance_id.clone())).ok_or_else(|| {
                RelationsError::BrokenFilterRelationsModel(
                    "cascading identifier without levels".to_string(),
                )
            })
        }
        FilterRelationsModel::Bracket { value } => model_node_to_jaql(value),
        FilterRelationsModel::LogicalExpression {
            operator,
            left,
            right,
        } => Ok(FilterRelationsJaql::rule(
            model_node_to_jaql(left)?,
            model_node_to_jaql(right)?,
            *operator,
        )),
    }
}
