use dimensional_model::{find_filter_by_guid, Filter};
use std::collections::HashSet;

use crate::types::{
    FilterRelations, FilterRelationsNode, FilterRelationsRuleNode, FilterRelationsRules,
    FiltersOrRelations,
};
use crate::{RelationsError, RelationsResult};

/// A public filter value taken apart into its flat filter list and guid-keyed rule tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitFiltersAndRelations {
    pub filters: Vec<Filter>,
    pub relations: FilterRelationsRules,
}

/// Splits a flat-or-tree filter value into filters and a rule tree.
///
/// Filters are collected in traversal order; a guid seen twice keeps its first filter.
pub fn split_filters_and_relations(input: Option<&FiltersOrRelations>) -> SplitFiltersAndRelations {
    match input {
        None => SplitFiltersAndRelations::default(),
        Some(FiltersOrRelations::Filters(filters)) => SplitFiltersAndRelations {
            filters: filters.clone(),
            relations: None,
        },
        Some(FiltersOrRelations::Relations(relations)) => {
            let mut collector = FilterCollector::default();
            let rule = collector.visit_relations(relations);
            SplitFiltersAndRelations {
                filters: collector.filters,
                relations: Some(rule),
            }
        }
    }
}

#[derive(Default)]
struct FilterCollector {
    seen: HashSet<String>,
    filters: Vec<Filter>,
}

impl FilterCollector {
    fn visit_node(&mut self, node: &FilterRelationsNode) -> FilterRelationsRuleNode {
        match node {
            FilterRelationsNode::Filter(filter) => {
                if self.seen.insert(filter.config.guid.clone()) {
                    self.filters.push(filter.clone());
                }
                FilterRelationsRuleNode::id(filter.config.guid.clone())
            }
            FilterRelationsNode::Relations(relations) => self.visit_relations(relations),
        }
    }

    fn visit_relations(&mut self, relations: &FilterRelations) -> FilterRelationsRuleNode {
        let left = self.visit_node(&relations.left);
        let right = self.visit_node(&relations.right);
        FilterRelationsRuleNode::rule(left, right, relations.operator)
    }
}

/// Rebuilds the public filter value from filters and a rule tree.
///
/// Missing or single-leaf relations collapse to the flat filter list.
pub fn combine_filters_and_relations(
    filters: &[Filter],
    relations: &FilterRelationsRules,
) -> RelationsResult<FiltersOrRelations> {
    let rule = match relations {
        Some(FilterRelationsRuleNode::Rule(rule)) => rule,
        // No relations, or a single leaf.
        None | Some(FilterRelationsRuleNode::Id(_)) => {
            return Ok(FiltersOrRelations::Filters(filters.to_vec()))
        }
    };

    let left = combine_node(filters, &rule.left)?;
    let right = combine_node(filters, &rule.right)?;
    Ok(FiltersOrRelations::Relations(FilterRelations {
        left,
        right,
        operator: rule.operator,
    }))
}

fn combine_node(
    filters: &[Filter],
    node: &FilterRelationsRuleNode,
) -> RelationsResult<FilterRelationsNode> {
    match node {
        FilterRelationsRuleNode::Id(id) => find_filter_by_guid(filters, &id.instanceid)
            .map(|filter| FilterRelationsNode::Filter(filter.clone()))
            .ok_or_else(|| RelationsError::UnknownFilterInFilterRelations {
                filter_guid: id.instanceid.clone(),
            }),
        FilterRelationsRuleNode::Rule(rule) => {
            let left = combine_node(filters, &rule.left)?;
            let right = combine_node(filters, &rule.right)?;
            Ok(FilterRelationsNode::Relations(Box::new(FilterRelations {
                left,
                right,
                operator: rule.operator,
            })))
        }
    }
}

/// The flat filter list of a flat-or-tree filter value.
pub fn get_filters_array(input: Option<&FiltersOrRelations>) -> Vec<Filter> {
    split_filters_and_relations(input).filters
}
