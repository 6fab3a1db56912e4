use dimensional_model::{Filter, LogicalOperator};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cascade::{filter_leaf_jaql, find_filter_by_guid_or_level, is_same_cascade};
use crate::diff::add_filter_to_relations;
use crate::split::{combine_filters_and_relations, split_filters_and_relations};
use crate::types::{
    is_filter_relations_json, FilterRelations, FilterRelationsNode, FilterRelationsRuleNode,
    FilterRelationsRules, FiltersOrRelations,
};
use crate::{RelationsError, RelationsResult};

/// Filter relations as carried by query metadata: leaves are `{ "instanceid": guid }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FilterRelationsJaql {
    Id {
        instanceid: String,
    },
    Rule {
        left: Box<FilterRelationsJaql>,
        right: Box<FilterRelationsJaql>,
        operator: LogicalOperator,
    },
}

impl FilterRelationsJaql {
    pub fn id(instanceid: impl Into<String>) -> Self {
        FilterRelationsJaql::Id {
            instanceid: instanceid.into(),
        }
    }

    pub fn rule(left: Self, right: Self, operator: LogicalOperator) -> Self {
        FilterRelationsJaql::Rule {
            left: Box::new(left),
            right: Box::new(right),
            operator,
        }
    }

    /// Parses an untyped wire node, rejecting anything that is neither a leaf nor an AND/OR
    /// node with both children.
    pub fn from_json(value: &Value) -> RelationsResult<Self> {
        if let Some(instanceid) = value.get("instanceid").and_then(Value::as_str) {
            return Ok(Self::id(instanceid));
        }
        if !is_filter_relations_json(value) {
            return Err(RelationsError::unknown_node(value));
        }

        let operator = match value["operator"].as_str() {
            Some("AND") => LogicalOperator::And,
            Some("OR") => LogicalOperator::Or,
            _ => return Err(RelationsError::unknown_node(value)),
        };
        let left = Self::from_json(&value["left"])?;
        let right = Self::from_json(&value["right"])?;
        Ok(Self::rule(left, right, operator))
    }
}

impl<'de> Deserialize<'de> for FilterRelationsJaql {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl From<&FilterRelationsRuleNode> for FilterRelationsJaql {
    fn from(node: &FilterRelationsRuleNode) -> Self {
        match node {
            FilterRelationsRuleNode::Id(id) => FilterRelationsJaql::id(id.instanceid.clone()),
            FilterRelationsRuleNode::Rule(rule) => FilterRelationsJaql::rule(
                (&rule.left).into(),
                (&rule.right).into(),
                rule.operator,
            ),
        }
    }
}

impl From<&FilterRelationsJaql> for FilterRelationsRuleNode {
    fn from(node: &FilterRelationsJaql) -> Self {
        match node {
            FilterRelationsJaql::Id { instanceid } => {
                FilterRelationsRuleNode::id(instanceid.clone())
            }
            FilterRelationsJaql::Rule {
                left,
                right,
                operator,
            } => FilterRelationsRuleNode::rule(
                left.as_ref().into(),
                right.as_ref().into(),
                *operator,
            ),
        }
    }
}

/// Wire relations for a rule tree. Cascading leaves expand to the AND chain of their levels,
/// matching how the query layer flattens cascading filters into level filters.
pub fn filter_relation_rules_to_jaql(
    rules: &FilterRelationsRules,
    filters: &[Filter],
) -> Option<FilterRelationsJaql> {
    rules.as_ref().map(|node| rule_node_to_jaql(node, filters))
}

fn rule_node_to_jaql(node: &FilterRelationsRuleNode, filters: &[Filter]) -> FilterRelationsJaql {
    match node {
        FilterRelationsRuleNode::Id(id) => filters
            .iter()
            .find(|filter| filter.guid() == id.instanceid)
            .map(filter_leaf_jaql)
            .unwrap_or_else(|| FilterRelationsJaql::id(id.instanceid.clone())),
        FilterRelationsRuleNode::Rule(rule) => FilterRelationsJaql::rule(
            rule_node_to_jaql(&rule.left, filters),
            rule_node_to_jaql(&rule.right, filters),
            rule.operator,
        ),
    }
}

/// Wire relations for a public filter value; `None` when it carries no AND/OR structure.
pub fn get_filter_relations_jaql(input: &FiltersOrRelations) -> Option<FilterRelationsJaql> {
    let split = split_filters_and_relations(Some(input));
    match &split.relations {
        Some(FilterRelationsRuleNode::Rule(_)) => {
            filter_relation_rules_to_jaql(&split.relations, &split.filters)
        }
        _ => None,
    }
}

/// Overlays `filters` onto wire relations received from the server.
///
/// Returns `filters` untouched when there are no relations or when highlights are present:
/// highlight and filter nodes share the `instanceid` namespace and cannot be told apart here.
/// A leaf that resolves to no filter (directly or as a cascading level) is an error. Filters
/// the wire tree never references are ANDed at the root, in `filters` order.
pub fn get_filter_relations_from_jaql(
    filters: &[Filter],
    highlights: &[Filter],
    jaql: Option<&FilterRelationsJaql>,
) -> RelationsResult<FiltersOrRelations> {
    let Some(jaql) = jaql else {
        return Ok(FiltersOrRelations::Filters(filters.to_vec()));
    };
    if !highlights.is_empty() {
        log::debug!(
            "skipping filter relations reconstruction: {} highlight(s) present",
            highlights.len()
        );
        return Ok(FiltersOrRelations::Filters(filters.to_vec()));
    }

    let relations = match resolve_jaql_node(jaql, filters)? {
        FilterRelationsNode::Filter(_) => {
            return Ok(FiltersOrRelations::Filters(filters.to_vec()))
        }
        FilterRelationsNode::Relations(relations) => FiltersOrRelations::Relations(*relations),
    };

    let referenced = split_filters_and_relations(Some(&relations));
    let unreferenced: Vec<&Filter> = filters
        .iter()
        .filter(|filter| !referenced.filters.iter().any(|r| r.guid() == filter.guid()))
        .collect();
    if unreferenced.is_empty() {
        return Ok(relations);
    }

    let mut all_filters = referenced.filters;
    let mut rules = referenced.relations;
    for filter in unreferenced {
        log::debug!("filter {} missing from wire relations, adding at the root", filter.guid());
        rules = add_filter_to_relations(filter, &rules);
        all_filters.push(filter.clone());
    }
    combine_filters_and_relations(&all_filters, &rules)
}

fn resolve_jaql_node(
    node: &FilterRelationsJaql,
    filters: &[Filter],
) -> RelationsResult<FilterRelationsNode> {
    match node {
        FilterRelationsJaql::Id { instanceid } => find_filter_by_guid_or_level(filters, instanceid)
            .map(|filter| FilterRelationsNode::Filter(filter.clone()))
            .ok_or_else(|| RelationsError::UnknownFilterInFilterRelations {
                filter_guid: instanceid.clone(),
            }),
        FilterRelationsJaql::Rule {
            left,
            right,
            operator,
        } => {
            let left = resolve_jaql_node(left, filters)?;
            let right = resolve_jaql_node(right, filters)?;
            if let (FilterRelationsNode::Filter(l), FilterRelationsNode::Filter(r)) =
                (&left, &right)
            {
                if is_same_cascade(l, r, *operator) {
                    log::trace!("collapsing levels of cascading filter {}", l.guid());
                    return Ok(left);
                }
            }
            Ok(FilterRelationsNode::Relations(Box::new(FilterRelations {
                left,
                right,
                operator: *operator,
            })))
        }
    }
}
