use dimensional_model::{Filter, LogicalOperator};
use serde::{Deserialize, Serialize};

/// A binary AND/OR tree over filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterRelations {
    pub left: FilterRelationsNode,
    pub right: FilterRelationsNode,
    pub operator: LogicalOperator,
}

impl FilterRelations {
    pub fn new(
        left: impl Into<FilterRelationsNode>,
        right: impl Into<FilterRelationsNode>,
        operator: LogicalOperator,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            operator,
        }
    }
}

/// `left AND right`.
pub fn and(
    left: impl Into<FilterRelationsNode>,
    right: impl Into<FilterRelationsNode>,
) -> FilterRelations {
    FilterRelations::new(left, right, LogicalOperator::And)
}

/// `left OR right`.
pub fn or(
    left: impl Into<FilterRelationsNode>,
    right: impl Into<FilterRelationsNode>,
) -> FilterRelations {
    FilterRelations::new(left, right, LogicalOperator::Or)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterRelationsNode {
    Relations(Box<FilterRelations>),
    Filter(Filter),
}

impl From<Filter> for FilterRelationsNode {
    fn from(value: Filter) -> Self {
        FilterRelationsNode::Filter(value)
    }
}

impl From<FilterRelations> for FilterRelationsNode {
    fn from(value: FilterRelations) -> Self {
        FilterRelationsNode::Relations(Box::new(value))
    }
}

/// Public filter shape: a flat list (implicitly ANDed) or a relations tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FiltersOrRelations {
    Filters(Vec<Filter>),
    Relations(FilterRelations),
}

impl Default for FiltersOrRelations {
    fn default() -> Self {
        FiltersOrRelations::Filters(Vec::new())
    }
}

impl From<Vec<Filter>> for FiltersOrRelations {
    fn from(value: Vec<Filter>) -> Self {
        FiltersOrRelations::Filters(value)
    }
}

impl From<FilterRelations> for FiltersOrRelations {
    fn from(value: FilterRelations) -> Self {
        FiltersOrRelations::Relations(value)
    }
}

impl FiltersOrRelations {
    pub fn as_filters(&self) -> Option<&[Filter]> {
        match self {
            FiltersOrRelations::Filters(filters) => Some(filters),
            FiltersOrRelations::Relations(_) => None,
        }
    }

    pub fn as_relations(&self) -> Option<&FilterRelations> {
        match self {
            FiltersOrRelations::Filters(_) => None,
            FiltersOrRelations::Relations(relations) => Some(relations),
        }
    }
}

/// Leaf of a rule tree: a reference to a filter by guid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRelationsRuleIdNode {
    pub instanceid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRelationsRule {
    pub left: FilterRelationsRuleNode,
    pub right: FilterRelationsRuleNode,
    pub operator: LogicalOperator,
}

/// Node of the internal rule tree, which mirrors [`FilterRelations`] but references filters
/// by guid only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterRelationsRuleNode {
    Rule(Box<FilterRelationsRule>),
    Id(FilterRelationsRuleIdNode),
}

impl FilterRelationsRuleNode {
    pub fn id(instanceid: impl Into<String>) -> Self {
        FilterRelationsRuleNode::Id(FilterRelationsRuleIdNode {
            instanceid: instanceid.into(),
        })
    }

    pub fn rule(
        left: FilterRelationsRuleNode,
        right: FilterRelationsRuleNode,
        operator: LogicalOperator,
    ) -> Self {
        FilterRelationsRuleNode::Rule(Box::new(FilterRelationsRule {
            left,
            right,
            operator,
        }))
    }

    pub fn instanceid(&self) -> Option<&str> {
        match self {
            FilterRelationsRuleNode::Id(node) => Some(&node.instanceid),
            FilterRelationsRuleNode::Rule(_) => None,
        }
    }

    /// Guids referenced by the tree, left to right. Repeats are kept.
    pub fn instanceids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_instanceids(self, &mut out);
        out
    }
}

fn collect_instanceids<'a>(node: &'a FilterRelationsRuleNode, out: &mut Vec<&'a str>) {
    match node {
        FilterRelationsRuleNode::Id(id) => out.push(&id.instanceid),
        FilterRelationsRuleNode::Rule(rule) => {
            collect_instanceids(&rule.left, out);
            collect_instanceids(&rule.right, out);
        }
    }
}

/// Rule tree root. `None` means "no relations".
pub type FilterRelationsRules = Option<FilterRelationsRuleNode>;

pub fn is_filter_relations(value: &FiltersOrRelations) -> bool {
    matches!(value, FiltersOrRelations::Relations(_))
}

/// Shape check for untyped payloads: `operator` is `AND`/`OR` and both children are present.
pub fn is_filter_relations_json(value: &serde_json::Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let operator_ok = matches!(
        obj.get("operator").and_then(serde_json::Value::as_str),
        Some("AND" | "OR")
    );
    operator_ok && obj.contains_key("left") && obj.contains_key("right")
}

/// True when the rule tree is a single leaf, i.e. carries no AND/OR structure.
pub fn is_trivial_single_node_relations(rules: &FilterRelationsRules) -> bool {
    matches!(rules, Some(FilterRelationsRuleNode::Id(_)))
}

pub fn is_relations_rule_id_node(node: &FilterRelationsRuleNode) -> bool {
    matches!(node, FilterRelationsRuleNode::Id(_))
}

pub fn is_relations_rule(node: &FilterRelationsRuleNode) -> bool {
    matches!(node, FilterRelationsRuleNode::Rule(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_shape_check_requires_operator_and_both_children() {
        assert!(is_filter_relations_json(&json!({
            "left": { "instanceid": "a" },
            "right": { "instanceid": "b" },
            "operator": "OR"
        })));
        assert!(!is_filter_relations_json(&json!({
            "left": { "instanceid": "a" },
            "operator": "OR"
        })));
        assert!(!is_filter_relations_json(&json!({
            "left": { "instanceid": "a" },
            "right": { "instanceid": "b" },
            "operator": "XOR"
        })));
        assert!(!is_filter_relations_json(&json!([])));
    }

    #[test]
    fn trivial_single_node_detection() {
        assert!(!is_trivial_single_node_relations(&None));
        assert!(is_trivial_single_node_relations(&Some(
            FilterRelationsRuleNode::id("a")
        )));
        let rule = FilterRelationsRuleNode::rule(
            FilterRelationsRuleNode::id("a"),
            FilterRelationsRuleNode::id("b"),
            LogicalOperator::And,
        );
        assert!(is_relations_rule(&rule));
        assert!(!is_relations_rule_id_node(&rule));
        assert!(!is_trivial_single_node_relations(&Some(rule)));
    }

    #[test]
    fn rule_tree_serde_uses_wire_keys() {
        let rule = FilterRelationsRuleNode::rule(
            FilterRelationsRuleNode::id("a"),
            FilterRelationsRuleNode::rule(
                FilterRelationsRuleNode::id("b"),
                FilterRelationsRuleNode::id("c"),
                LogicalOperator::Or,
            ),
            LogicalOperator::And,
        );
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "left": { "instanceid": "a" },
                "right": {
                    "left": { "instanceid": "b" },
                    "right": { "instanceid": "c" },
                    "operator": "OR"
                },
                "operator": "AND"
            })
        );
        let decoded: FilterRelationsRuleNode = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, rule);
        assert_eq!(decoded.instanceids(), vec!["a", "b", "c"]);
    }
}
