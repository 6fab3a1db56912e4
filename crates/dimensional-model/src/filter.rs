use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Attribute, Measure, ModelError};

/// Identity and state flags shared by every filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Stable identity. Relation trees reference filters by this value only.
    #[serde(default = "crate::new_guid")]
    pub guid: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            guid: crate::new_guid(),
            disabled: false,
            locked: false,
        }
    }
}

/// Boolean connective used both inside logical filters and by filter relation trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericCondition {
    Equals(f64),
    DoesntEqual(f64),
    GreaterThan(f64),
    GreaterThanOrEqual(f64),
    LessThan(f64),
    LessThanOrEqual(f64),
    Between { from: f64, to: f64 },
    BetweenNotEqual { from: f64, to: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOperator {
    Contains,
    DoesntContain,
    StartsWith,
    DoesntStartWith,
    EndsWith,
    DoesntEndWith,
    Equals,
    DoesntEqual,
    Like,
}

impl TextOperator {
    pub fn jaql_key(self) -> &'static str {
        match self {
            TextOperator::Contains => "contains",
            TextOperator::DoesntContain => "doesntContain",
            TextOperator::StartsWith => "startsWith",
            TextOperator::DoesntStartWith => "doesntStartWith",
            TextOperator::EndsWith => "endsWith",
            TextOperator::DoesntEndWith => "doesntEndWith",
            TextOperator::Equals => "equals",
            TextOperator::DoesntEqual => "doesntEqual",
            TextOperator::Like => "like",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelativeDirection {
    Last,
    Next,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankingDirection {
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterKind {
    Members {
        members: Vec<String>,
        #[serde(default, rename = "excludeMembers")]
        exclude_members: bool,
    },
    /// Inverts the wrapped filter.
    Exclude { filter: Box<Filter> },
    Numeric { condition: NumericCondition },
    Text {
        operator: TextOperator,
        value: String,
    },
    /// ISO-8601 bounds; a missing bound is open.
    DateRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },
    RelativeDate {
        offset: i64,
        count: u32,
        direction: RelativeDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<String>,
    },
    Ranking {
        measure: Measure,
        count: u32,
        direction: RankingDirection,
    },
    /// Several conditions on the same attribute combined with AND/OR.
    Logical {
        operator: LogicalOperator,
        filters: Vec<Filter>,
    },
    /// One filter per hierarchy level, applied as a single logical filter.
    Cascading { levels: Vec<Filter> },
}

/// A filter on a single attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFilter")]
pub struct Filter {
    #[serde(default)]
    pub config: FilterConfig,
    pub attribute: Attribute,
    #[serde(flatten)]
    pub kind: FilterKind,
}

/// Wire shape of [`Filter`] before the kind is validated.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    #[serde(default)]
    config: FilterConfig,
    attribute: Attribute,
    #[serde(flatten)]
    kind: FilterKind,
}

impl TryFrom<RawFilter> for Filter {
    type Error = ModelError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        match &raw.kind {
            FilterKind::Cascading { levels } if levels.is_empty() => {
                return Err(ModelError::EmptyCascadingFilter)
            }
            FilterKind::Logical { filters, .. } if filters.is_empty() => {
                return Err(ModelError::EmptyLogicalFilter)
            }
            _ => {}
        }
        Ok(Self {
            config: raw.config,
            attribute: raw.attribute,
            kind: raw.kind,
        })
    }
}

impl Filter {
    pub fn new(attribute: Attribute, kind: FilterKind) -> Self {
        Self {
            config: FilterConfig::default(),
            attribute,
            kind,
        }
    }

    pub fn members<S: Into<String>>(
        attribute: Attribute,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            attribute,
            FilterKind::Members {
                members: members.into_iter().map(Into::into).collect(),
                exclude_members: false,
            },
        )
    }

    pub fn excluded_members<S: Into<String>>(
        attribute: Attribute,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            attribute,
            FilterKind::Members {
                members: members.into_iter().map(Into::into).collect(),
                exclude_members: true,
            },
        )
    }

    pub fn exclude(filter: Filter) -> Self {
        let attribute = filter.attribute.clone();
        Self::new(
            attribute,
            FilterKind::Exclude {
                filter: Box::new(filter),
            },
        )
    }

    pub fn numeric(attribute: Attribute, condition: NumericCondition) -> Self {
        Self::new(attribute, FilterKind::Numeric { condition })
    }

    pub fn text(attribute: Attribute, operator: TextOperator, value: impl Into<String>) -> Self {
        Self::new(
            attribute,
            FilterKind::Text {
                operator,
                value: value.into(),
            },
        )
    }

    pub fn date_range(attribute: Attribute, from: Option<String>, to: Option<String>) -> Self {
        Self::new(attribute, FilterKind::DateRange { from, to })
    }

    pub fn relative_date(
        attribute: Attribute,
        offset: i64,
        count: u32,
        direction: RelativeDirection,
        anchor: Option<String>,
    ) -> Self {
        Self::new(
            attribute,
            FilterKind::RelativeDate {
                offset,
                count,
                direction,
                anchor,
            },
        )
    }

    pub fn ranking(
        attribute: Attribute,
        measure: Measure,
        count: u32,
        direction: RankingDirection,
    ) -> Self {
        Self::new(
            attribute,
            FilterKind::Ranking {
                measure,
                count,
                direction,
            },
        )
    }

    /// Combines filters on the same attribute. The attribute is taken from the first filter.
    pub fn logical(operator: LogicalOperator, filters: Vec<Filter>) -> Result<Self, ModelError> {
        let attribute = filters
            .first()
            .map(|f| f.attribute.clone())
            .ok_or(ModelError::EmptyLogicalFilter)?;
        Ok(Self::new(attribute, FilterKind::Logical { operator, filters }))
    }

    /// Builds a cascading filter. Its attribute is the first level's attribute.
    pub fn cascading(levels: Vec<Filter>) -> Result<Self, ModelError> {
        let attribute = levels
            .first()
            .map(|f| f.attribute.clone())
            .ok_or(ModelError::EmptyCascadingFilter)?;
        Ok(Self::new(attribute, FilterKind::Cascading { levels }))
    }

    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.config.guid = guid.into();
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.config.locked = locked;
        self
    }

    pub fn guid(&self) -> &str {
        &self.config.guid
    }

    pub fn is_cascading(&self) -> bool {
        matches!(self.kind, FilterKind::Cascading { .. })
    }

    /// Level filters of a cascading filter; empty for every other kind.
    pub fn levels(&self) -> &[Filter] {
        match &self.kind {
            FilterKind::Cascading { levels } => levels,
            _ => &[],
        }
    }

    /// Returns a copy carrying a freshly generated guid.
    #[must_use]
    pub fn with_new_guid(&self) -> Self {
        self.clone().with_guid(crate::new_guid())
    }
}

/// Key deciding whether two filters target the same thing when merging.
///
/// The attribute expression plus, for datetime levels, the granularity name (`Years`, not the
/// JAQL level), so rounded minute levels stay distinct. Cascading filters join the compare
/// ids of their levels with `-`.
pub fn get_filter_compare_id(filter: &Filter) -> String {
    if let FilterKind::Cascading { levels } = &filter.kind {
        return levels
            .iter()
            .map(get_filter_compare_id)
            .collect::<Vec<_>>()
            .join("-");
    }

    let attribute = &filter.attribute;
    match attribute.granularity {
        Some(granularity) => format!("{}{}", attribute.expression, granularity),
        None => attribute.expression.clone(),
    }
}

pub fn find_filter_by_guid<'a>(filters: &'a [Filter], guid: &str) -> Option<&'a Filter> {
    filters.iter().find(|f| f.config.guid == guid)
}
