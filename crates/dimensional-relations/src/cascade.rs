//! Cascading filters are one leaf in rule trees and public relations, one
//! `CascadingIdentifier` in the Fusion model, and an AND chain of their level guids on the
//! JAQL wire.

use dimensional_model::{Filter, LogicalOperator};

use crate::jaql::FilterRelationsJaql;

/// Finds the cascading filter whose level guids are exactly `level_guids`, in any order.
pub fn find_cascading_filter_by_levels<'a, S: AsRef<str>>(
    filters: &'a [Filter],
    level_guids: &[S],
) -> Option<&'a Filter> {
    filters.iter().find(|filter| {
        let levels = filter.levels();
        filter.is_cascading()
            && levels.len() == level_guids.len()
            && levels
                .iter()
                .all(|level| level_guids.iter().any(|g| g.as_ref() == level.guid()))
    })
}

/// Resolves a guid to a filter, falling back to the cascading filter owning a level with
/// that guid.
pub fn find_filter_by_guid_or_level<'a>(filters: &'a [Filter], guid: &str) -> Option<&'a Filter> {
    filters
        .iter()
        .find(|filter| filter.guid() == guid)
        .or_else(|| {
            filters
                .iter()
                .find(|filter| filter.levels().iter().any(|level| level.guid() == guid))
        })
}

/// Wire form of a leaf: the filter's own guid, or for cascading filters the left-deep AND
/// chain of its level guids.
pub(crate) fn filter_leaf_jaql(filter: &Filter) -> FilterRelationsJaql {
    and_chain(filter.levels().iter().map(|level| level.guid().to_string()))
        .unwrap_or_else(|| FilterRelationsJaql::id(filter.guid()))
}

/// `((g1 AND g2) AND g3) …`; `None` for no guids.
pub(crate) fn and_chain(guids: impl IntoIterator<Item = String>) -> Option<FilterRelationsJaql> {
    guids.into_iter().map(FilterRelationsJaql::id).reduce(|left, right| {
        FilterRelationsJaql::rule(left, right, LogicalOperator::And)
    })
}

/// True when an AND of `left` and `right` is just two levels of the same cascading filter.
pub(crate) fn is_same_cascade(left: &Filter, right: &Filter, operator: LogicalOperator) -> bool {
    operator == LogicalOperator::And && left.is_cascading() && left.guid() == right.guid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimensional_model::Attribute;
    use pretty_assertions::assert_eq;

    fn level(column: &str, guid: &str) -> Filter {
        Filter::members(Attribute::text("Geo", column), ["x"]).with_guid(guid)
    }

    fn cascade() -> Filter {
        Filter::cascading(vec![
            level("Country", "l1"),
            level("State", "l2"),
            level("City", "l3"),
        ])
        .unwrap()
        .with_guid("cascade")
    }

    #[test]
    fn finds_cascade_by_exact_level_set() {
        let filters = vec![level("Zip", "z"), cascade()];
        assert_eq!(
            find_cascading_filter_by_levels(&filters, &["l3", "l1", "l2"]).map(Filter::guid),
            Some("cascade")
        );
        assert_eq!(find_cascading_filter_by_levels(&filters, &["l1", "l2"]), None);
        assert_eq!(
            find_cascading_filter_by_levels(&filters, &["l1", "l2", "zz"]),
            None
        );
    }

    #[test]
    fn resolves_level_guid_to_owning_cascade() {
        let filters = vec![level("Zip", "z"), cascade()];
        assert_eq!(
            find_filter_by_guid_or_level(&filters, "l2").map(Filter::guid),
            Some("cascade")
        );
        assert_eq!(
            find_filter_by_guid_or_level(&filters, "z").map(Filter::guid),
            Some("z")
        );
        assert_eq!(find_filter_by_guid_or_level(&filters, "nope"), None);
    }

    #[test]
    fn cascade_leaf_expands_to_left_deep_and_chain() {
        assert_eq!(
            filter_leaf_jaql(&cascade()),
            FilterRelationsJaql::rule(
                FilterRelationsJaql::rule(
                    FilterRelationsJaql::id("l1"),
                    FilterRelationsJaql::id("l2"),
                    LogicalOperator::And,
                ),
                FilterRelationsJaql::id("l3"),
                LogicalOperator::And,
            )
        );
        assert_eq!(
            filter_leaf_jaql(&level("Zip", "z")),
            FilterRelationsJaql::id("z")
        );
    }
}
