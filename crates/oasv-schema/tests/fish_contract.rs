//! Integration test: request and response contracts of the fish registry
//! document at `specs/fish.openapi.yaml`.
//!
//! Exercises the full flow (load, resolve, locate, validate) the way a
//! service calls it: operation id, method, concrete path, raw payload.

use std::path::PathBuf;

use oasv_core::{ResolveError, SchemaLoadError, ValidationOutcome, ViolationKind};
use oasv_schema::{HttpMethod, OpenApiValidator, ValidatorOptions};
use serde_json::json;

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn validator() -> OpenApiValidator {
    OpenApiValidator::from_file(repo_root().join("specs/fish.openapi.yaml"))
        .expect("fixture document loads")
}

fn kinds(outcome: &ValidationOutcome) -> Vec<ViolationKind> {
    outcome.violations().iter().map(|v| v.kind).collect()
}

fn paths(outcome: &ValidationOutcome) -> Vec<String> {
    outcome.violations().iter().map(|v| v.path.to_string()).collect()
}

const CARP: &str = r#"{ "id": 1, "weight": 3.5, "age": 4, "typeName": "Carp", "habitatDepth": 12, "scaleColor": "gold" }"#;

#[test]
fn test_fixture_summary() {
    let v = validator();
    let doc = v.document();
    assert_eq!(doc.title(), Some("Fish Registry API"));
    assert_eq!(doc.version(), Some("1.2.0"));
    assert_eq!(doc.path_count(), 8);
    assert_eq!(doc.operation_count(), 11);
    assert!(doc.component("Tank").is_some());
}

#[test]
fn test_valid_carp_request() {
    let outcome = validator()
        .validate_request("createCarp", "POST", "/Carp", CARP)
        .unwrap();
    assert!(outcome.is_valid(), "{outcome}");
}

#[test]
fn test_request_body_ref_resolves() {
    let outcome = validator()
        .validate_request("updateCarp", "PUT", "/Carp/7", r#"{ "weight": 1, "age": 2 }"#)
        .unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::MissingRequiredProperty]);
    assert_eq!(paths(&outcome), vec!["typeName"]);
}

#[test]
fn test_single_missing_weight_in_collection() {
    let payload = json!({
        "carps": [{ "age": 4, "typeName": "Carp" }],
        "mackerels": []
    });
    let outcome = validator()
        .validate_response_value("getFishLists", "GET", "/list", &payload, 200)
        .unwrap();

    assert_eq!(kinds(&outcome), vec![ViolationKind::MissingRequiredProperty]);
    assert!(paths(&outcome)[0].ends_with(".weight"));
    assert_eq!(paths(&outcome)[0], "carps[0].weight");
}

#[test]
fn test_partial_failure_isolated_to_element() {
    let payload = format!(
        "[{CARP}, {{ \"weight\": -2, \"age\": 4, \"typeName\": \"Carp\", \"scaleColor\": \"\" }}, {CARP}]"
    );
    let outcome = validator()
        .validate_response("searchCarp", "GET", "/Carp/search", &payload, 200)
        .unwrap();

    assert_eq!(
        kinds(&outcome),
        vec![ViolationKind::ValueOutOfRange, ViolationKind::LengthOutOfRange]
    );
    assert!(paths(&outcome).iter().all(|p| p.starts_with("[1]")));
}

#[test]
fn test_literal_route_declared_first_wins() {
    let v = validator();
    let located = v.locate("GET", "/Carp/search").unwrap();
    assert_eq!(located.template, "/Carp/search");
    assert_eq!(located.operation.operation_id.as_deref(), Some("searchCarp"));
}

#[test]
fn test_path_resolution_cases() {
    let v = validator();
    assert_eq!(v.locate("GET", "/Carp/42").unwrap().template, "/Carp/{id}");
    assert!(matches!(
        v.locate("GET", "/Carp/42/extra"),
        Err(ResolveError::PathNotFound { .. })
    ));
    assert!(matches!(
        v.locate("GET", "/carp/42"),
        Err(ResolveError::PathNotFound { .. })
    ));
    assert_eq!(
        v.locate("put", "/tanks/3/fish").unwrap().method,
        HttpMethod::Put
    );
}

#[test]
fn test_discriminator_selects_mackerel() {
    let payload = r#"{ "weight": 1, "age": 2, "typeName": "Mackerel", "gillSize": 600, "habitatDepth": -1 }"#;
    let outcome = validator()
        .validate_request("createFish", "POST", "/fish", payload)
        .unwrap();

    // Only the Mackerel rules apply: habitatDepth belongs to Carp.
    assert_eq!(kinds(&outcome), vec![ViolationKind::ValueOutOfRange]);
    assert_eq!(paths(&outcome), vec!["gillSize"]);
}

#[test]
fn test_unmapped_discriminator_value() {
    let payload = r#"{ "weight": 1, "age": 2, "typeName": "Shark" }"#;
    let outcome = validator()
        .validate_request("createFish", "POST", "/fish", payload)
        .unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::OneOfNoMatch]);
}

#[test]
fn test_missing_discriminator_and_fallback() {
    let payload = r#"{ "weight": 1, "age": 2 }"#;
    let v = validator();
    let outcome = v.validate_request("createFish", "POST", "/fish", payload).unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::MissingDiscriminator]);

    // Both variants require typeName, so trying every branch still fails.
    let lenient = v.with_options(ValidatorOptions {
        one_of_fallback: true,
        ..ValidatorOptions::default()
    });
    let outcome = lenient
        .validate_request("createFish", "POST", "/fish", payload)
        .unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::OneOfNoMatch]);
}

#[test]
fn test_minimum_zero_bound() {
    let v = validator();
    for (weight, valid) in [("-5", false), ("0", true), ("0.01", true), ("750", true)] {
        let payload = format!(r#"{{ "weight": {weight}, "age": 1, "typeName": "Mackerel" }}"#);
        let outcome = v
            .validate_request("createMackerel", "POST", "/Mackerel", &payload)
            .unwrap();
        assert_eq!(outcome.is_valid(), valid, "weight {weight}: {outcome}");
        if !valid {
            assert_eq!(kinds(&outcome), vec![ViolationKind::ValueOutOfRange]);
            assert_eq!(paths(&outcome), vec!["weight"]);
        }
    }
}

#[test]
fn test_response_range_and_default_fallback() {
    let v = validator();

    // "4XX" resolves through components/responses to application/problem+json.
    let outcome = v
        .validate_response("createCarp", "POST", "/Carp", r#"{ "message": 5 }"#, 422)
        .unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::TypeMismatch]);
    assert_eq!(paths(&outcome), vec!["message"]);

    // "default" catches anything not listed.
    let outcome = v
        .validate_response("deleteMackerel", "DELETE", "/Mackerel/9", "{}", 500)
        .unwrap();
    assert_eq!(kinds(&outcome), vec![ViolationKind::MissingRequiredProperty]);

    // 204 declares no body: nothing is inspected.
    let outcome = v
        .validate_response("deleteMackerel", "DELETE", "/Mackerel/9", "", 204)
        .unwrap();
    assert!(outcome.is_valid());

    // No key for 500 and no default: valid.
    let outcome = v
        .validate_response("createCarp", "POST", "/Carp", "not json", 500)
        .unwrap();
    assert!(outcome.is_valid());
}

#[test]
fn test_recursive_tank_with_nullable_and_residents() {
    let payload = json!({
        "label": "north pond",
        "water": "fresh",
        "pumpsOn": null,
        "residents": [
            { "weight": 1, "age": 1, "typeName": "Carp" },
            { "weight": 2, "age": 1, "typeName": "Mackerel", "salinity": -3 }
        ],
        "parent": {
            "label": "reservoir",
            "water": "brackish",
            "parent": { "label": "a label that is far too long for a tank" }
        }
    });
    let outcome = validator()
        .validate_request_value("stockTank", "PUT", "/tanks/1/fish", &payload)
        .unwrap();

    assert_eq!(
        paths(&outcome),
        vec!["residents[1].salinity", "parent.water", "parent.parent.label"]
    );
    assert_eq!(
        kinds(&outcome),
        vec![
            ViolationKind::ValueOutOfRange,
            ViolationKind::EnumViolation,
            ViolationKind::LengthOutOfRange
        ]
    );
}

#[test]
fn test_operation_id_mismatch() {
    let err = validator()
        .validate_request("createMackerel", "POST", "/Carp", CARP)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::OperationIdMismatch {
            method: "POST".into(),
            template: "/Carp".into(),
            expected: "createMackerel".into(),
            actual: "createCarp".into(),
        }
    );
}

#[test]
fn test_unsupported_method() {
    let err = validator()
        .validate_request("createCarp", "BREW", "/Carp", CARP)
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedMethod { .. }));
}

#[test]
fn test_validation_is_idempotent() {
    let v = validator();
    let payload = r#"{ "weight": -1, "age": 101, "typeName": "Carp", "scaleColor": 3 }"#;
    let first = v.validate_request("createCarp", "POST", "/Carp", payload).unwrap();
    let second = v.validate_request("createCarp", "POST", "/Carp", payload).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.violations().len(), 3);
}

#[test]
fn test_missing_document_is_not_found() {
    let err = OpenApiValidator::from_file(repo_root().join("specs/missing.yaml")).unwrap_err();
    assert!(matches!(err, SchemaLoadError::NotFound { .. }));
}

#[test]
fn test_dangling_ref_in_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r##"{
            "openapi": "3.0.3",
            "paths": { "/x": { "post": {
                "requestBody": { "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Ghost" }
                } } },
                "responses": {}
            } } }
        }"##,
    )
    .unwrap();

    match OpenApiValidator::from_file(&path).unwrap_err() {
        SchemaLoadError::Invalid { problems, .. } => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].contains("Ghost"), "{problems:?}");
        }
        other => panic!("expected Invalid, got: {other}"),
    }
}

#[test]
fn test_yaml_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "openapi: [3.0\npaths: {").unwrap();
    assert!(matches!(
        OpenApiValidator::from_file(&path).unwrap_err(),
        SchemaLoadError::Parse { .. }
    ));
}
