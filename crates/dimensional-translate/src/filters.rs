use dimensional_model::{
    Aggregation, Filter, FilterKind, LogicalOperator, Measure, NumericCondition, RankingDirection,
    RelativeDirection, TextOperator,
};
use serde_json::Value;

use crate::call::{Args, FunctionCall};
use crate::config::{DataSchema, TranslationSettings};
use crate::{TranslationError, TranslationResult};

const FILTER_FACTORY: &str = "filterFactory.";
const MEASURE_FACTORY: &str = "measureFactory.";

/// Translates each call into a filter.
///
/// Every failing call contributes its error; the filters are returned only when all calls
/// translate.
pub fn translate_filters_json(
    calls: &[FunctionCall],
    schema: &DataSchema,
    settings: &TranslationSettings,
) -> Result<Vec<Filter>, Vec<TranslationError>> {
    let mut filters = Vec::with_capacity(calls.len());
    let mut errors = Vec::new();
    for call in calls {
        match translate_filter(call, schema, settings) {
            Ok(filter) => filters.push(filter),
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(filters)
    } else {
        Err(errors)
    }
}

/// Translates a single `filterFactory.*` call.
pub fn translate_filter(
    call: &FunctionCall,
    schema: &DataSchema,
    settings: &TranslationSettings,
) -> TranslationResult<Filter> {
    log::debug!("translating `{}`", call.function);
    let Some(name) = call.function.strip_prefix(FILTER_FACTORY) else {
        return Err(unknown_function(call));
    };
    let args = |min, max| Args::new(call, min, max, schema, settings);

    match name {
        "members" => {
            let args = args(2, 3)?;
            let filter = Filter::members(args.attribute(0)?, args.members(1)?);
            apply_config(&args, 2, filter)
        }
        "exclude" => {
            let args = args(1, 2)?;
            let inner = translate_filter(&args.call(0)?, schema, settings)?;
            apply_config(&args, 1, Filter::exclude(inner))
        }
        "equals" | "doesntEqual" => {
            let args = args(2, 3)?;
            let attribute = args.attribute(0)?;
            let filter = match args.get(1) {
                Some(Value::String(value)) => {
                    let operator = if name == "equals" {
                        TextOperator::Equals
                    } else {
                        TextOperator::DoesntEqual
                    };
                    Filter::text(attribute, operator, value.clone())
                }
                _ => {
                    let value = args.number(1)?;
                    let condition = if name == "equals" {
                        NumericCondition::Equals(value)
                    } else {
                        NumericCondition::DoesntEqual(value)
                    };
                    Filter::numeric(attribute, condition)
                }
            };
            apply_config(&args, 2, filter)
        }
        "greaterThan" | "greaterThanOrEqual" | "lessThan" | "lessThanOrEqual" => {
            let args = args(2, 3)?;
            let value = args.number(1)?;
            let condition = match name {
                "greaterThan" => NumericCondition::GreaterThan(value),
                "greaterThanOrEqual" => NumericCondition::GreaterThanOrEqual(value),
                "lessThan" => NumericCondition::LessThan(value),
                _ => NumericCondition::LessThanOrEqual(value),
            };
            apply_config(&args, 2, Filter::numeric(args.attribute(0)?, condition))
        }
        "between" | "betweenNotEqual" => {
            let args = args(3, 4)?;
            let (from, to) = (args.number(1)?, args.number(2)?);
            let condition = if name == "between" {
                NumericCondition::Between { from, to }
            } else {
                NumericCondition::BetweenNotEqual { from, to }
            };
            apply_config(&args, 3, Filter::numeric(args.attribute(0)?, condition))
        }
        "contains" | "doesntContain" | "startsWith" | "doesntStartWith" | "endsWith"
        | "doesntEndWith" | "like" => {
            let args = args(2, 3)?;
            let operator = match name {
                "contains" => TextOperator::Contains,
                "doesntContain" => TextOperator::DoesntContain,
                "startsWith" => TextOperator::StartsWith,
                "doesntStartWith" => TextOperator::DoesntStartWith,
                "endsWith" => TextOperator::EndsWith,
                "doesntEndWith" => TextOperator::DoesntEndWith,
                _ => TextOperator::Like,
            };
            let filter = Filter::text(args.attribute(0)?, operator, args.string(1)?);
            apply_config(&args, 2, filter)
        }
        "dateRange" => {
            let args = args(1, 4)?;
            let filter = Filter::date_range(
                args.attribute(0)?,
                args.optional_string(1)?,
                args.optional_string(2)?,
            );
            apply_config(&args, 3, filter)
        }
        "dateFrom" | "dateTo" => {
            let args = args(2, 3)?;
            let bound = Some(args.string(1)?);
            let (from, to) = if name == "dateFrom" {
                (bound, None)
            } else {
                (None, bound)
            };
            apply_config(&args, 2, Filter::date_range(args.attribute(0)?, from, to))
        }
        "dateRelativeFrom" | "dateRelativeTo" => {
            let args = args(3, 5)?;
            let direction = if name == "dateRelativeFrom" {
                RelativeDirection::Next
            } else {
                RelativeDirection::Last
            };
            let filter = Filter::relative_date(
                args.attribute(0)?,
                args.integer(1)?,
                args.count(2)?,
                direction,
                args.optional_string(3)?,
            );
            apply_config(&args, 4, filter)
        }
        "topRanking" | "bottomRanking" => {
            let args = args(3, 4)?;
            let measure = translate_measure(&args.call(1)?, schema, settings)?;
            let direction = if name == "topRanking" {
                RankingDirection::Top
            } else {
                RankingDirection::Bottom
            };
            let filter = Filter::ranking(args.attribute(0)?, measure, args.count(2)?, direction);
            apply_config(&args, 3, filter)
        }
        "union" | "intersection" => {
            let args = args(1, 2)?;
            let operator = if name == "union" {
                LogicalOperator::Or
            } else {
                LogicalOperator::And
            };
            let filter = Filter::logical(operator, nested_filters(&args, 0)?)?;
            apply_config(&args, 1, filter)
        }
        "cascading" => {
            let args = args(1, 2)?;
            let filter = Filter::cascading(nested_filters(&args, 0)?)?;
            apply_config(&args, 1, filter)
        }
        _ => Err(unknown_function(call)),
    }
}

/// Translates a `measureFactory.*` call: `(attributePath, name?)`.
pub fn translate_measure(
    call: &FunctionCall,
    schema: &DataSchema,
    settings: &TranslationSettings,
) -> TranslationResult<Measure> {
    let aggregation = match call.function.strip_prefix(MEASURE_FACTORY) {
        Some("sum") => Aggregation::Sum,
        Some("average") => Aggregation::Average,
        Some("min") => Aggregation::Min,
        Some("max") => Aggregation::Max,
        Some("count") => Aggregation::Count,
        Some("countDistinct") => Aggregation::CountDistinct,
        _ => {
            return Err(TranslationError::UnknownMeasureFunction {
                function: call.function.clone(),
            })
        }
    };
    let args = Args::new(call, 1, 2, schema, settings)?;
    let mut measure = Measure::new(args.attribute(0)?, aggregation);
    if let Some(name) = args.optional_string(1)? {
        measure.name = name;
    }
    Ok(measure)
}

fn nested_filters(args: &Args<'_>, index: usize) -> TranslationResult<Vec<Filter>> {
    args.calls(index)?
        .iter()
        .map(|call| translate_filter(call, args.schema, args.settings))
        .collect()
}

/// Applies the optional trailing `{guid, disabled, locked, excludeMembers}` argument.
fn apply_config(args: &Args<'_>, index: usize, mut filter: Filter) -> TranslationResult<Filter> {
    let Some(config) = args.get(index) else {
        return Ok(filter);
    };
    let Some(config) = config.as_object() else {
        return Err(args.invalid(index, "expected a filter config object"));
    };

    for (key, value) in config {
        match (key.as_str(), value) {
            ("guid", Value::String(guid)) => filter.config.guid = guid.clone(),
            ("disabled", Value::Bool(disabled)) => filter.config.disabled = *disabled,
            ("locked", Value::Bool(locked)) => filter.config.locked = *locked,
            ("excludeMembers", Value::Bool(exclude)) => match &mut filter.kind {
                FilterKind::Members {
                    exclude_members, ..
                } => *exclude_members = *exclude,
                _ => return Err(args.invalid(index, "excludeMembers only applies to members")),
            },
            _ => {
                log::warn!(
                    "ignoring filter config key `{key}` of `{}`",
                    args.function()
                );
            }
        }
    }
    Ok(filter)
}

fn unknown_function(call: &FunctionCall) -> TranslationError {
    TranslationError::UnknownFunction {
        function: call.function.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::commerce_schema;
    use dimensional_model::{Attribute, Granularity};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn call(value: Value) -> FunctionCall {
        serde_json::from_value(value).unwrap()
    }

    fn translate(value: Value) -> TranslationResult<Filter> {
        translate_filter(&call(value), &commerce_schema(), &TranslationSettings::default())
    }

    #[test]
    fn members_with_config() {
        let filter = translate(json!({
            "function": "filterFactory.members",
            "args": [
                "DM.Commerce.Gender",
                ["Female", "Male"],
                { "guid": "g1", "excludeMembers": true }
            ]
        }))
        .unwrap();
        assert_eq!(
            filter,
            Filter::excluded_members(Attribute::text("Commerce", "Gender"), ["Female", "Male"])
                .with_guid("g1")
        );
    }

    #[test]
    fn equals_picks_text_or_numeric_by_value() {
        let text = translate(json!({
            "function": "filterFactory.equals",
            "args": ["DM.Commerce.Gender", "Female"]
        }))
        .unwrap();
        assert_eq!(
            text.kind,
            FilterKind::Text {
                operator: TextOperator::Equals,
                value: "Female".to_string()
            }
        );

        let numeric = translate(json!({
            "function": "filterFactory.doesntEqual",
            "args": ["DM.Commerce.Revenue", 10]
        }))
        .unwrap();
        assert_eq!(
            numeric.kind,
            FilterKind::Numeric {
                condition: NumericCondition::DoesntEqual(10.0)
            }
        );
    }

    #[test]
    fn between_and_comparisons() {
        let filter = translate(json!({
            "function": "filterFactory.betweenNotEqual",
            "args": ["DM.Commerce.Revenue", 1.5, 9]
        }))
        .unwrap();
        assert_eq!(
            filter.kind,
            FilterKind::Numeric {
                condition: NumericCondition::BetweenNotEqual { from: 1.5, to: 9.0 }
            }
        );

        let err = translate(json!({
            "function": "filterFactory.lessThan",
            "args": ["DM.Commerce.Revenue", "ten"]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidArgument {
                function: "filterFactory.lessThan".to_string(),
                index: 1,
                reason: "expected a number".to_string()
            }
        );
    }

    #[test]
    fn date_filters() {
        let range = translate(json!({
            "function": "filterFactory.dateRange",
            "args": ["DM.Commerce.Date.Days", null, "2021-12-31"]
        }))
        .unwrap();
        assert_eq!(
            range.kind,
            FilterKind::DateRange {
                from: None,
                to: Some("2021-12-31".to_string())
            }
        );
        assert_eq!(range.attribute.granularity, Some(Granularity::Days));

        let relative = translate(json!({
            "function": "filterFactory.dateRelativeTo",
            "args": ["DM.Commerce.Date.Months", 0, 6, "2022-01-01"]
        }))
        .unwrap();
        assert_eq!(
            relative.kind,
            FilterKind::RelativeDate {
                offset: 0,
                count: 6,
                direction: RelativeDirection::Last,
                anchor: Some("2022-01-01".to_string())
            }
        );
    }

    #[test]
    fn ranking_uses_nested_measure() {
        let filter = translate(json!({
            "function": "filterFactory.topRanking",
            "args": [
                "DM.Commerce.Gender",
                {
                    "function": "measureFactory.sum",
                    "args": ["DM.Commerce.Revenue", "Total Revenue"]
                },
                5
            ]
        }))
        .unwrap();
        let FilterKind::Ranking {
            measure,
            count,
            direction,
        } = filter.kind
        else {
            panic!("expected ranking filter");
        };
        assert_eq!(measure.name, "Total Revenue");
        assert_eq!(measure.aggregation, Aggregation::Sum);
        assert_eq!(count, 5);
        assert_eq!(direction, RankingDirection::Top);

        let err = translate(json!({
            "function": "filterFactory.bottomRanking",
            "args": [
                "DM.Commerce.Gender",
                { "function": "measureFactory.median", "args": ["DM.Commerce.Revenue"] },
                5
            ]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            TranslationError::UnknownMeasureFunction {
                function: "measureFactory.median".to_string()
            }
        );
    }

    #[test]
    fn union_and_cascading_nest_filters() {
        let union = translate(json!({
            "function": "filterFactory.union",
            "args": [[
                { "function": "filterFactory.startsWith", "args": ["DM.Commerce.Gender", "F"] },
                { "function": "filterFactory.endsWith", "args": ["DM.Commerce.Gender", "e"] }
            ]]
        }))
        .unwrap();
        assert!(matches!(
            &union.kind,
            FilterKind::Logical { operator: LogicalOperator::Or, filters } if filters.len() == 2
        ));

        let cascade = translate(json!({
            "function": "filterFactory.cascading",
            "args": [[
                {
                    "function": "filterFactory.members",
                    "args": ["DM.Commerce.Date.Years", ["2021-01-01T00:00:00"]]
                },
                {
                    "function": "filterFactory.members",
                    "args": ["DM.Commerce.Date.Months", ["2021-03-01T00:00:00"]]
                }
            ], { "guid": "cascade" }]
        }))
        .unwrap();
        assert_eq!(cascade.guid(), "cascade");
        assert_eq!(cascade.levels().len(), 2);

        let empty = translate(json!({ "function": "filterFactory.cascading", "args": [[]] }));
        assert_eq!(
            empty,
            Err(TranslationError::Model(dimensional_model::ModelError::EmptyCascadingFilter))
        );
    }

    #[test]
    fn collects_every_failing_call() {
        let calls = vec![
            call(json!({
                "function": "filterFactory.members",
                "args": ["DM.Commerce.Gender", ["Female"]]
            })),
            call(json!({ "function": "filterFactory.sparkle", "args": [] })),
            call(json!({
                "function": "filterFactory.contains",
                "args": ["DM.Commerce.Nope", "x"]
            })),
        ];
        let errors =
            translate_filters_json(&calls, &commerce_schema(), &TranslationSettings::default())
                .unwrap_err();
        assert_eq!(
            errors,
            vec![
                TranslationError::UnknownFunction {
                    function: "filterFactory.sparkle".to_string()
                },
                TranslationError::UnknownAttribute {
                    path: "DM.Commerce.Nope".to_string()
                },
            ]
        );

        let ok =
            translate_filters_json(&calls[..1], &commerce_schema(), &TranslationSettings::default())
                .unwrap();
        assert_eq!(ok.len(), 1);
    }
}
