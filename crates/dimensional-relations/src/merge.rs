use dimensional_model::{get_filter_compare_id, Filter};

use crate::diff::calculate_new_relations;
use crate::split::{combine_filters_and_relations, split_filters_and_relations};
use crate::types::{is_filter_relations, FiltersOrRelations};
use crate::RelationsResult;

/// Upserts `target` into `source` by compare id.
///
/// A target filter replaces the filter with the same compare id in place; otherwise it is
/// appended. Identity is the filtered attribute (and granularity), not the guid.
pub fn merge_filters(source: &[Filter], target: &[Filter]) -> Vec<Filter> {
    let mut merged = source.to_vec();
    for filter in target {
        let compare_id = get_filter_compare_id(filter);
        let existing = merged
            .iter()
            .position(|existing| get_filter_compare_id(existing) == compare_id);
        match existing {
            Some(idx) => merged[idx] = filter.clone(),
            None => merged.push(filter.clone()),
        }
    }
    merged
}

/// Merges two flat-or-tree filter values.
///
/// Without relations on either side this is [`merge_filters`]. Otherwise the filters are
/// merged and the relations of `source` are reconciled against the merged list.
///
/// When `source` is flat and `target` carries relations, `target`'s relations are the ones
/// reconciled, so the result keeps `target`'s tree instead of coming back flat.
pub fn merge_filters_or_filter_relations(
    source: Option<&FiltersOrRelations>,
    target: Option<&FiltersOrRelations>,
) -> RelationsResult<FiltersOrRelations> {
    let has_relations = |value: Option<&FiltersOrRelations>| value.is_some_and(is_filter_relations);
    if !has_relations(source) && !has_relations(target) {
        let source = source.and_then(FiltersOrRelations::as_filters).unwrap_or(&[]);
        let target = target.and_then(FiltersOrRelations::as_filters).unwrap_or(&[]);
        return Ok(FiltersOrRelations::Filters(merge_filters(source, target)));
    }

    let source = split_filters_and_relations(source);
    let target = split_filters_and_relations(target);
    let merged_filters = merge_filters(&source.filters, &target.filters);

    let base = if source.relations.is_some() {
        &source
    } else {
        &target
    };
    let merged_relations = calculate_new_relations(&base.filters, &base.relations, &merged_filters);
    combine_filters_and_relations(&merged_filters, &merged_relations)
}
