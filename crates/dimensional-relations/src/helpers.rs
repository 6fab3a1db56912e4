//! Functional-update helpers over flat-or-tree filter values.
//!
//! Each helper returns a new value of the same shape as its input: flat lists stay flat,
//! and trees keep the grouping of untouched filters. A tree reduced to a single filter
//! collapses to a flat list.

use dimensional_model::Filter;

use crate::diff::{calculate_new_relations, get_relations_with_replaced_filter};
use crate::split::{combine_filters_and_relations, split_filters_and_relations};
use crate::types::{FilterRelations, FilterRelationsNode, FiltersOrRelations};
use crate::RelationsResult;

/// Appends `filter`; in a tree it is ANDed at the root.
pub fn with_added_filter(
    input: &FiltersOrRelations,
    filter: Filter,
) -> RelationsResult<FiltersOrRelations> {
    with_added_filters(input, vec![filter])
}

pub fn with_added_filters(
    input: &FiltersOrRelations,
    filters: Vec<Filter>,
) -> RelationsResult<FiltersOrRelations> {
    with_edited_filters(input, |current| current.extend(filters))
}

/// Drops the filter with `filter`'s guid.
pub fn without_filter(
    input: &FiltersOrRelations,
    filter: &Filter,
) -> RelationsResult<FiltersOrRelations> {
    without_guids(input, &[filter.guid()])
}

pub fn without_filters(
    input: &FiltersOrRelations,
    filters: &[Filter],
) -> RelationsResult<FiltersOrRelations> {
    let guids: Vec<&str> = filters.iter().map(Filter::guid).collect();
    without_guids(input, &guids)
}

/// Drops every filter whose guid is listed.
pub fn without_guids(
    input: &FiltersOrRelations,
    guids: &[&str],
) -> RelationsResult<FiltersOrRelations> {
    with_edited_filters(input, |current| {
        current.retain(|filter| !guids.contains(&filter.guid()))
    })
}

/// Swaps `old_filter` for `new_filter` at the same position, in the list and in the tree.
/// Without `old_filter` the input is returned unchanged.
pub fn with_replaced_filter(
    input: &FiltersOrRelations,
    old_filter: &Filter,
    new_filter: Filter,
) -> RelationsResult<FiltersOrRelations> {
    let split = split_filters_and_relations(Some(input));
    let relations = get_relations_with_replaced_filter(&split.relations, old_filter, &new_filter);
    let filters: Vec<Filter> = split
        .filters
        .into_iter()
        .map(|filter| {
            if filter.guid() == old_filter.guid() {
                new_filter.clone()
            } else {
                filter
            }
        })
        .collect();
    combine_filters_and_relations(&filters, &relations)
}

/// First filter matching `predicate`, in list order or left-to-right through the tree.
pub fn find_filter<F>(input: &FiltersOrRelations, mut predicate: F) -> Option<&Filter>
where
    F: FnMut(&Filter) -> bool,
{
    match input {
        FiltersOrRelations::Filters(filters) => filters.iter().find(|filter| predicate(filter)),
        FiltersOrRelations::Relations(relations) => find_in_relations(relations, &mut predicate),
    }
}

fn find_in_relations<'a, F>(relations: &'a FilterRelations, predicate: &mut F) -> Option<&'a Filter>
where
    F: FnMut(&Filter) -> bool,
{
    find_in_node(&relations.left, predicate).or_else(|| find_in_node(&relations.right, predicate))
}

fn find_in_node<'a, F>(node: &'a FilterRelationsNode, predicate: &mut F) -> Option<&'a Filter>
where
    F: FnMut(&Filter) -> bool,
{
    match node {
        FilterRelationsNode::Filter(filter) => predicate(filter).then_some(filter),
        FilterRelationsNode::Relations(relations) => find_in_relations(relations, predicate),
    }
}

fn with_edited_filters(
    input: &FiltersOrRelations,
    edit: impl FnOnce(&mut Vec<Filter>),
) -> RelationsResult<FiltersOrRelations> {
    let split = split_filters_and_relations(Some(input));
    let mut filters = split.filters.clone();
    edit(&mut filters);
    let relations = calculate_new_relations(&split.filters, &split.relations, &filters);
    combine_filters_and_relations(&filters, &relations)
}
