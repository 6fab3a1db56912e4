use dimensional_model::{Filter, LogicalOperator};

use crate::types::{FilterRelationsRuleNode, FilterRelationsRules};

/// A single change between two filter lists, keyed by guid.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterAction {
    Add(Filter),
    Remove(Filter),
}

/// Guid set difference between two filter lists.
///
/// Removals (in `prev` order) come first, then additions (in `next` order). Reordering
/// produces no actions.
pub fn diff_filters(prev: &[Filter], next: &[Filter]) -> Vec<FilterAction> {
    let removed = prev
        .iter()
        .filter(|p| !next.iter().any(|n| n.config.guid == p.config.guid))
        .cloned()
        .map(FilterAction::Remove);
    let added = next
        .iter()
        .filter(|n| !prev.iter().any(|p| p.config.guid == n.config.guid))
        .cloned()
        .map(FilterAction::Add);
    removed.chain(added).collect()
}

/// Reconciles a rule tree with an edited filter list.
///
/// A list without relations stays without relations. Otherwise removed filters are excised
/// from the tree and added filters are ANDed at the root.
pub fn calculate_new_relations(
    prev_filters: &[Filter],
    prev_relations: &FilterRelationsRules,
    new_filters: &[Filter],
) -> FilterRelationsRules {
    if prev_relations.is_none() {
        return None;
    }

    diff_filters(prev_filters, new_filters)
        .into_iter()
        .fold(prev_relations.clone(), |relations, action| {
            log::debug!("applying filter relations action {action:?}");
            match action {
                FilterAction::Add(filter) => add_filter(&filter, relations),
                FilterAction::Remove(filter) => remove_filter(&filter, relations),
            }
        })
}

/// Grafts `filter` onto the root: `relations AND filter`, or the sole leaf when empty.
pub fn add_filter_to_relations(
    filter: &Filter,
    relations: &FilterRelationsRules,
) -> FilterRelationsRules {
    add_filter(filter, relations.clone())
}

fn add_filter(filter: &Filter, relations: FilterRelationsRules) -> FilterRelationsRules {
    let leaf = FilterRelationsRuleNode::id(filter.config.guid.clone());
    Some(match relations {
        None => leaf,
        Some(existing) => FilterRelationsRuleNode::rule(existing, leaf, LogicalOperator::And),
    })
}

/// Removes every leaf referencing `filter`, collapsing nodes left with a single child.
pub fn remove_filter_from_relations(
    filter: &Filter,
    relations: &FilterRelationsRules,
) -> FilterRelationsRules {
    remove_filter(filter, relations.clone())
}

fn remove_filter(filter: &Filter, relations: FilterRelationsRules) -> FilterRelationsRules {
    relations.and_then(|node| remove_guid(&filter.config.guid, node))
}

fn remove_guid(guid: &str, node: FilterRelationsRuleNode) -> Option<FilterRelationsRuleNode> {
    match node {
        FilterRelationsRuleNode::Id(id) if id.instanceid == guid => None,
        FilterRelationsRuleNode::Id(id) => Some(FilterRelationsRuleNode::Id(id)),
        FilterRelationsRuleNode::Rule(rule) => {
            let rule = *rule;
            let left = remove_guid(guid, rule.left);
            let right = remove_guid(guid, rule.right);
            match (left, right) {
                (Some(left), Some(right)) => {
                    Some(FilterRelationsRuleNode::rule(left, right, rule.operator))
                }
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            }
        }
    }
}

/// Points every leaf referencing `old_filter` at `new_filter`, keeping the tree shape.
pub fn get_relations_with_replaced_filter(
    relations: &FilterRelationsRules,
    old_filter: &Filter,
    new_filter: &Filter,
) -> FilterRelationsRules {
    relations
        .as_ref()
        .map(|node| replace_guid(node, &old_filter.config.guid, &new_filter.config.guid))
}

fn replace_guid(node: &FilterRelationsRuleNode, old: &str, new: &str) -> FilterRelationsRuleNode {
    match node {
        FilterRelationsRuleNode::Id(id) if id.instanceid == old => FilterRelationsRuleNode::id(new),
        FilterRelationsRuleNode::Id(id) => FilterRelationsRuleNode::Id(id.clone()),
        FilterRelationsRuleNode::Rule(rule) => FilterRelationsRuleNode::rule(
            replace_guid(&rule.left, old, new),
            replace_guid(&rule.right, old, new),
            rule.operator,
        ),
    }
}
