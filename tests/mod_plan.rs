use bson::Bson;
use cinequery::config::CatalogConfig;
use cinequery::errors::ApiError;
use cinequery::query::{
    CmpOp, Filter, Order, PageRequest, QueryPlan, RawQuery, SortSpec, build_plan, parse_operand,
};
use cinequery::resource::{self, FieldKind, FieldUse};

fn movie() -> cinequery::resource::ResourceDescriptor {
    resource::builtin(&CatalogConfig::default()).remove(0)
}

#[test]
fn operator_surface_syntax() {
    use cinequery::query::ParsedOperand;
    assert_eq!(
        parse_operand(FieldKind::Number, "year", "5-10").unwrap(),
        ParsedOperand::Range { low: Bson::Int64(5), high: Bson::Int64(10), negated: false }
    );
    assert!(matches!(
        parse_operand(FieldKind::Number, "year", "!5-10").unwrap(),
        ParsedOperand::Range { negated: true, .. }
    ));
    assert_eq!(
        parse_operand(FieldKind::Number, "year", "1,2,3").unwrap(),
        ParsedOperand::In(vec![Bson::Int64(1), Bson::Int64(2), Bson::Int64(3)])
    );
    assert!(matches!(
        parse_operand(FieldKind::Number, "year", "1,2-3"),
        Err(ApiError::MalformedFilterValue { .. })
    ));
}

#[test]
fn full_movie_query_builds_the_expected_plan() {
    let raw = RawQuery::from_pairs([
        ("year", "2020-2022"),
        ("genres.name", "drama"),
        ("sort", "-year"),
        ("fields", "name,year"),
        ("page", "2"),
        ("limit", "10"),
    ]);
    let plan = build_plan(&movie(), &raw).unwrap();
    let expected = QueryPlan {
        filter: Filter::And(vec![
            Filter::And(vec![
                Filter::Cmp { path: "year".into(), op: CmpOp::Gte, value: Bson::Int64(2020) },
                Filter::Cmp { path: "year".into(), op: CmpOp::Lte, value: Bson::Int64(2022) },
            ]),
            Filter::Match { path: "genres.name".into(), needle: "drama".into() },
        ]),
        sort: vec![SortSpec { field: "year".into(), order: Order::Desc }],
        projection: vec!["name".into(), "year".into()],
        page: PageRequest { page: 2, limit: 10, skip: 10 },
    };
    assert_eq!(plan, expected);
}

#[test]
fn building_twice_yields_structurally_equal_plans() {
    let raw = RawQuery::from_pairs([
        ("year", "2020-2022"),
        ("genres.name", "drama"),
        ("persons.id", "1,2"),
        ("sort", "-year,name"),
        ("page", "3"),
    ]);
    assert_eq!(build_plan(&movie(), &raw).unwrap(), build_plan(&movie(), &raw).unwrap());
}

#[test]
fn unknown_filter_field_aborts_plan_construction() {
    let raw = RawQuery::from_pairs([("bogusField", "1")]);
    match build_plan(&movie(), &raw) {
        Err(ApiError::UnknownField { field, usage }) => {
            assert_eq!(field, "bogusField");
            assert_eq!(usage, FieldUse::Filter);
        }
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn date_filters_use_strict_calendar_parsing() {
    let raw = RawQuery::from_pairs([("premiere.world", "29.02.2021")]);
    assert!(matches!(
        build_plan(&movie(), &raw),
        Err(ApiError::InvalidDate { field, value }) if field == "premiere.world" && value == "29.02.2021"
    ));
    let raw = RawQuery::from_pairs([("premiere.world", "05.09.2021")]);
    assert!(build_plan(&movie(), &raw).is_ok());
}

#[test]
fn oversized_limit_clamps_inside_the_plan() {
    let raw = RawQuery::from_pairs([("limit", "99999")]);
    let plan = build_plan(&movie(), &raw).unwrap();
    assert_eq!(plan.page.limit, 250);
}

#[test]
fn validation_error_payloads_are_client_facing() {
    let raw = RawQuery::from_pairs([("page", "0")]);
    let err = build_plan(&movie(), &raw).unwrap_err();
    assert_eq!(err.status_code(), 400);
    let payload = err.to_payload();
    assert_eq!(payload["kind"], "InvalidPagination");
    assert_eq!(payload["field"], "page");
    assert!(payload["message"].as_str().unwrap().contains('0'));
}
