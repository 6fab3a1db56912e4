//! `dimensional-relations` combines dimensional filters with AND/OR logic.
//!
//! Callers hold either a flat filter list (implicitly ANDed) or a [`FilterRelations`] tree
//! whose leaves are filters. Internally the tree is taken apart into the filter list and a
//! guid-keyed rule tree, edited structurally, and put back together. Three external tree
//! shapes are supported:
//! - the public [`FiltersOrRelations`] value,
//! - the [`FilterRelationsJaql`] wire tree exchanged with the query service,
//! - the [`FilterRelationsModel`] authored in Fusion dashboards.
//!
//! Cascading filters are a single leaf in every shape. No function mutates its inputs.

mod cascade;
mod diff;
mod error;
mod helpers;
mod jaql;
mod merge;
mod model;
mod split;
mod types;

pub use cascade::{find_cascading_filter_by_levels, find_filter_by_guid_or_level};
pub use diff::{
    add_filter_to_relations, calculate_new_relations, diff_filters,
    get_relations_with_replaced_filter, remove_filter_from_relations, FilterAction,
};
pub use error::{RelationsError, RelationsResult};
pub use helpers::{
    find_filter, with_added_filter, with_added_filters, with_replaced_filter, without_filter,
    without_filters, without_guids,
};
pub use jaql::{
    filter_relation_rules_to_jaql, get_filter_relations_from_jaql, get_filter_relations_jaql,
    FilterRelationsJaql,
};
pub use merge::{merge_filters, merge_filters_or_filter_relations};
pub use model::{
    convert_filter_relations_model_to_jaql, convert_filter_relations_model_to_relation_rules,
    filter_relation_rules_to_filter_relations_model, FilterRelationsModel, ModelIdentifier,
};
pub use split::{
    combine_filters_and_relations, get_filters_array, split_filters_and_relations,
    SplitFiltersAndRelations,
};
pub use types::{
    and, is_filter_relations, is_filter_relations_json, is_relations_rule,
    is_relations_rule_id_node, is_trivial_single_node_relations, or, FilterRelations,
    FilterRelationsNode, FilterRelationsRule, FilterRelationsRuleIdNode, FilterRelationsRuleNode,
    FilterRelationsRules, FiltersOrRelations,
};
