use dimensional_model::{Attribute, Filter, Granularity, LogicalOperator};
use dimensional_relations::{
    and, combine_filters_and_relations, convert_filter_relations_model_to_jaql,
    convert_filter_relations_model_to_relation_rules,
    filter_relation_rules_to_filter_relations_model, get_filter_relations_from_jaql, or,
    split_filters_and_relations, FilterRelationsModel, FilterRelationsRuleNode,
    FiltersOrRelations, RelationsError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn date_cascade() -> Filter {
    Filter::cascading(vec![
        Filter::members(
            Attribute::date_level("Commerce", "Date", Granularity::Years),
            ["2021-01-01T00:00:00"],
        )
        .with_guid("years"),
        Filter::members(
            Attribute::date_level("Commerce", "Date", Granularity::Months),
            ["2021-03-01T00:00:00"],
        )
        .with_guid("months"),
    ])
    .unwrap()
    .with_guid("date-cascade")
}

fn gender() -> Filter {
    Filter::members(Attribute::text("Commerce", "Gender"), ["Female"]).with_guid("gender")
}

fn age() -> Filter {
    Filter::members(Attribute::text("Commerce", "Age Range"), ["18-24"]).with_guid("age")
}

fn fusion_fixture() -> serde_json::Value {
    json!({
        "type": "LogicalExpression",
        "operator": "AND",
        "left": {
            "type": "BracketNode",
            "value": {
                "type": "LogicalExpression",
                "operator": "OR",
                "left": { "type": "Identifier", "instanceId": "gender" },
                "right": { "type": "Identifier", "instanceId": "age" }
            }
        },
        "right": {
            "type": "CascadingIdentifier",
            "levels": [
                { "type": "Identifier", "instanceId": "months" },
                { "type": "Identifier", "instanceId": "years" }
            ]
        }
    })
}

#[test]
fn fusion_model_becomes_public_relations() {
    let filters = vec![gender(), age(), date_cascade()];
    let model: FilterRelationsModel = serde_json::from_value(fusion_fixture()).unwrap();

    let rules = convert_filter_relations_model_to_relation_rules(Some(&model), &filters).unwrap();
    assert_eq!(
        rules,
        Some(FilterRelationsRuleNode::rule(
            FilterRelationsRuleNode::rule(
                FilterRelationsRuleNode::id("gender"),
                FilterRelationsRuleNode::id("age"),
                LogicalOperator::Or,
            ),
            FilterRelationsRuleNode::id("date-cascade"),
            LogicalOperator::And,
        ))
    );
    assert_eq!(
        combine_filters_and_relations(&filters, &rules).unwrap(),
        FiltersOrRelations::from(and(or(gender(), age()), date_cascade()))
    );
}

#[test]
fn public_relations_become_fusion_model() {
    let input = FiltersOrRelations::from(or(date_cascade(), gender()));
    let split = split_filters_and_relations(Some(&input));
    let model = filter_relation_rules_to_filter_relations_model(&split.relations, &split.filters);
    assert_eq!(
        serde_json::to_value(&model).unwrap(),
        json!({
            "type": "LogicalExpression",
            "operator": "OR",
            "left": {
                "type": "CascadingIdentifier",
                "levels": [
                    { "type": "Identifier", "instanceId": "years" },
                    { "type": "Identifier", "instanceId": "months" }
                ]
            },
            "right": { "type": "Identifier", "instanceId": "gender" }
        })
    );
}

#[test]
fn fusion_model_to_wire_and_back_to_filters() {
    let filters = vec![gender(), age(), date_cascade()];
    let model: FilterRelationsModel = serde_json::from_value(fusion_fixture()).unwrap();

    let jaql = convert_filter_relations_model_to_jaql(Some(&model)).unwrap();
    assert_eq!(
        serde_json::to_value(&jaql).unwrap(),
        json!({
            "left": {
                "left": { "instanceid": "gender" },
                "right": { "instanceid": "age" },
                "operator": "OR"
            },
            "right": {
                "left": { "instanceid": "months" },
                "right": { "instanceid": "years" },
                "operator": "AND"
            },
            "operator": "AND"
        })
    );

    assert_eq!(
        get_filter_relations_from_jaql(&filters, &[], jaql.as_ref()).unwrap(),
        FiltersOrRelations::from(and(or(gender(), age()), date_cascade()))
    );
}

#[test]
fn stale_cascading_identifier_is_a_translatable_error() {
    let filters = vec![gender(), age()];
    let model: FilterRelationsModel = serde_json::from_value(fusion_fixture()).unwrap();
    let err = convert_filter_relations_model_to_relation_rules(Some(&model), &filters).unwrap_err();

    assert_eq!(
        err,
        RelationsError::CascadingFilterNotFound {
            level_guids: vec!["months".to_string(), "years".to_string()]
        }
    );
    assert!(err.is_translatable());
    assert_eq!(err.interpolation()["levelGuids"], "months, years");
}

#[test]
fn malformed_fusion_payload_fails_to_deserialize() {
    let result: Result<FilterRelationsModel, _> = serde_json::from_value(json!({
        "type": "LogicalExpression",
        "operator": "AND",
        "left": { "type": "Identifier", "instanceId": "gender" },
        "right": { "type": "Mystery" }
    }));
    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("broken filter relations model"));
}
