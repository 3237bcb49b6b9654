//! Route-level behaviour of the requirements middlewares, driven through a
//! middleware chain against the rule sets in `tests/fixtures`.

use requisite_core::{HandlerFn, HttpRequest, HttpResponse, MiddlewareChain, handler};
use requisite_validation::{OptionsOverrides, PredicateRegistry, Requirements, validate};
use serde_json::{Value, json};

fn fixtures() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

fn success() -> HandlerFn {
    handler(|_req| async { HttpResponse::ok().with_json(&json!({ "success": true })) })
}

fn chain(key: &str) -> MiddlewareChain {
    MiddlewareChain::new()
        .with(Requirements::mount(fixtures(), OptionsOverrides::new()))
        .with(validate(key))
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::new("GET".to_string(), path.to_string())
}

fn with_body(req: HttpRequest, body: Value) -> HttpRequest {
    req.with_json(&body).unwrap()
}

/// `GET /test` guarded by `route.simple_get`
async fn simple(req: HttpRequest) -> (u16, Value) {
    let response = chain("route.simple_get").apply(req, success()).await.unwrap();
    (response.status, response.json().unwrap())
}

/// `GET /test/:id` guarded by `route.fancy_get`
async fn fancy(id: &str, body: Option<Value>) -> (u16, Value) {
    let mut req = get(&format!("/test/{id}")).with_param("id", id);
    if let Some(body) = body {
        req = with_body(req, body);
    }
    let response = chain("route.fancy_get").apply(req, success()).await.unwrap();
    (response.status, response.json().unwrap())
}

fn error(message: &str) -> Value {
    json!({ "error": message })
}

fn ok() -> (u16, Value) {
    (200, json!({ "success": true }))
}

// =============================================================================
// Request parameters
// =============================================================================

#[tokio::test]
async fn test_required_param_missing_default_message() {
    assert_eq!(simple(get("/test")).await, (400, error("missing_firstName_parameter")));
}

#[tokio::test]
async fn test_required_param_empty_default_message() {
    let req = with_body(get("/test"), json!({ "firstName": "" }));
    assert_eq!(simple(req).await, (400, error("bad_request")));
}

#[tokio::test]
async fn test_param_not_alpha_default_message() {
    let req = with_body(get("/test"), json!({ "firstName": "John42" }));
    assert_eq!(simple(req).await, (400, error("bad_request")));
}

#[tokio::test]
async fn test_custom_messages() {
    let cases = [
        (json!({ "firstName": "John" }), "lastName_is_required"),
        (json!({ "firstName": "John", "lastName": "" }), "lastName_is_empty"),
        (json!({ "firstName": "John", "lastName": "Doe42" }), "lastName_must_be_alpha"),
    ];

    for (body, message) in cases {
        assert_eq!(simple(with_body(get("/test"), body)).await, (400, error(message)));
    }
}

#[tokio::test]
async fn test_parameter_keyword_with_pattern() {
    let req = with_body(
        get("/test"),
        json!({ "firstName": "John", "lastName": "Doe", "data": "FooBar" }),
    );
    assert_eq!(simple(req).await, (400, error("wrong_data")));

    let req = with_body(
        get("/test"),
        json!({ "firstName": "John", "lastName": "Doe", "data": "042.jd" }),
    );
    assert_eq!(simple(req).await, ok());
}

#[tokio::test]
async fn test_parameter_keyword_with_integer() {
    let req = with_body(
        get("/test"),
        json!({ "firstName": "John", "lastName": "Doe", "license": 42 }),
    );
    assert_eq!(simple(req).await, ok());

    let req = with_body(
        get("/test"),
        json!({ "firstName": "John", "lastName": "Doe", "license": 41 }),
    );
    assert_eq!(simple(req).await, (400, error("license_not_divisble_by_2")));
}

#[tokio::test]
async fn test_array_values() {
    let cases = [
        (json!([1, 2, 3]), ok()),
        (json!("[4,5]"), ok()),
        (json!("[1,2,\"x\"]"), (400, error("ids_must_be_array_of_int"))),
        (json!("[]"), (400, error("bad_request"))),
        (json!("not json"), (400, error("ids_must_be_array"))),
    ];

    for (ids, expected) in cases {
        let req = with_body(
            get("/test"),
            json!({ "firstName": "John", "lastName": "Doe", "ids": ids }),
        );
        assert_eq!(simple(req).await, expected);
    }
}

#[tokio::test]
async fn test_form_encoded_body() {
    let req = get("/test")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(b"firstName=John&lastName=Doe42".to_vec());
    assert_eq!(simple(req).await, (400, error("lastName_must_be_alpha")));
}

// =============================================================================
// Scopes
// =============================================================================

#[tokio::test]
async fn test_headers_scope_ignores_body() {
    let req = with_body(
        get("/test"),
        json!({ "firstName": "John", "lastName": "Doe", "x-auth": "42" }),
    );
    assert_eq!(simple(req).await, ok());
}

#[tokio::test]
async fn test_headers_scope_validation() {
    let body = json!({ "firstName": "John", "lastName": "Doe" });

    let req = with_body(get("/test"), body.clone()).with_header("x-auth", "auth42");
    assert_eq!(simple(req).await, (400, error("bad_request")));

    let req = with_body(get("/test"), body).with_header("X-Auth", "authentication");
    assert_eq!(simple(req).await, ok());
}

#[tokio::test]
async fn test_params_scope_validation() {
    let body = json!({ "firstName": "John", "lastName": "Doe" });

    assert_eq!(fancy("foo", Some(body.clone())).await, (400, error("id_must_be_integer")));
    assert_eq!(fancy("42", Some(body)).await, ok());
}

// =============================================================================
// Inheritance
// =============================================================================

#[tokio::test]
async fn test_required_is_not_inherited() {
    assert_eq!(fancy("42", None).await, (400, error("missing_lastName_parameter")));
}

#[tokio::test]
async fn test_inherited_predicates() {
    let cases = [
        (json!({ "firstName": "" }), "bad_request"),
        (json!({ "firstName": "John42" }), "bad_request"),
        (json!({ "firstName": "John", "lastName": "Doe42" }), "lastName_must_be_alpha"),
    ];

    for (body, message) in cases {
        assert_eq!(fancy("42", Some(body)).await, (400, error(message)));
    }

    assert_eq!(
        fancy("42", Some(json!({ "firstName": "John", "lastName": "Doe" }))).await,
        ok()
    );
}

#[tokio::test]
async fn test_local_predicate_overrides_inherited() {
    let body = json!({ "firstName": "John", "lastName": "Doe", "age": 24 });
    assert_eq!(fancy("42", Some(body)).await, ok());

    let body = json!({ "firstName": "John", "lastName": "Doe", "age": "foobar" });
    assert_eq!(fancy("42", Some(body)).await, (403, error("bad_request")));
}

// =============================================================================
// Mounting and configuration
// =============================================================================

#[tokio::test]
async fn test_validate_requires_mount() {
    let err = MiddlewareChain::new()
        .with(validate("route.simple_get"))
        .apply(get("/test"), success())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_option_overrides() {
    let overrides = OptionsOverrides::new()
        .json_error_key("reason")
        .default_error_code(422)
        .default_error_message("invalid_request");
    let chain = MiddlewareChain::new()
        .with(Requirements::mount(fixtures(), overrides))
        .with(validate("route.simple_get"));

    let req = with_body(get("/test"), json!({ "firstName": "John42" }));
    let response = chain.apply(req, success()).await.unwrap();
    assert_eq!(response.status, 422);
    assert_eq!(response.json::<Value>().unwrap(), json!({ "reason": "invalid_request" }));

    // Mounting with overrides leaves other mounts on defaults
    let req = with_body(get("/test"), json!({ "firstName": "John42" }));
    assert_eq!(simple(req).await, (400, error("bad_request")));
}

#[tokio::test]
async fn test_custom_error_keys() {
    let store = requisite_validation::MemoryRuleStore::new()
        .with_collection(
            "route",
            json!({ "get": { "name": { "isAlpha": { "msg": "%@_letters_only", "status": 409 } } } }),
        )
        .unwrap();
    let chain = MiddlewareChain::new()
        .with(Requirements::mount_store(
            std::sync::Arc::new(store),
            OptionsOverrides::new().error_message_key("msg").error_code_key("status"),
        ))
        .with(validate("route.get"));

    let req = with_body(get("/"), json!({ "name": "n4me" }));
    let response = chain.apply(req, success()).await.unwrap();
    assert_eq!(response.status, 409);
    assert_eq!(response.json::<Value>().unwrap(), error("name_letters_only"));
}

#[tokio::test]
async fn test_custom_registry() {
    let registry = PredicateRegistry::with_defaults()
        .with("isAlpha", |value, _| value.chars().all(|c| c.is_alphabetic() || c == '-'));
    let chain = MiddlewareChain::new()
        .with(Requirements::mount(fixtures(), OptionsOverrides::new()).with_registry(registry))
        .with(validate("route.simple_get"));

    let req = with_body(get("/test"), json!({ "firstName": "Jean-Luc", "lastName": "Picard" }));
    let response = chain.apply(req, success()).await.unwrap();
    assert_eq!(response.status, 200);
}

// =============================================================================
// TOML collections in nested folders
// =============================================================================

const API_KEY: &str = "6f1c2a7e-8d3b-4f5a-9c0e-1b2d3e4f5a6b";

async fn order(key: &str, body: Value, api_key: Option<&str>) -> (u16, Value) {
    let mut req = with_body(get("/orders"), body);
    if let Some(api_key) = api_key {
        req = req.with_header("X-Api-Key", api_key);
    }
    let response = chain(key).apply(req, success()).await.unwrap();
    (response.status, response.json().unwrap())
}

#[tokio::test]
async fn test_toml_collection() {
    let valid = json!({ "sku": "ABC-1234", "quantity": 3, "items": ["a1", "b2"] });
    assert_eq!(order("shop.orders.create", valid.clone(), Some(API_KEY)).await, ok());

    assert_eq!(
        order("shop.orders.create", json!({}), Some(API_KEY)).await,
        (422, error("sku_is_required"))
    );
    assert_eq!(
        order("shop.orders.create", json!({ "sku": "abc", "quantity": 1 }), Some(API_KEY)).await,
        (400, error("invalid_sku"))
    );
    assert_eq!(
        order("shop.orders.create", json!({ "sku": "ABC-1234", "quantity": 100 }), Some(API_KEY)).await,
        (400, error("quantity_out_of_range"))
    );
    assert_eq!(
        order("shop.orders.create", json!({ "sku": "ABC-1234", "quantity": 1, "items": "[]" }), Some(API_KEY)).await,
        (400, error("bad_request"))
    );
    assert_eq!(
        order("shop.orders.create", valid.clone(), None).await,
        (401, error("unauthorized"))
    );
    assert_eq!(
        order("shop.orders.create", valid, Some("not-a-uuid")).await,
        (401, error("unauthorized"))
    );
}

#[tokio::test]
async fn test_toml_inheritance() {
    assert_eq!(order("shop.orders.update", json!({}), None).await, ok());
    assert_eq!(
        order("shop.orders.update", json!({ "quantity": 0 }), None).await,
        (400, error("quantity_out_of_range"))
    );
}

#[tokio::test]
async fn test_unknown_rule_set_is_server_error() {
    let err = chain("route.missing_get")
        .apply(get("/test"), success())
        .await
        .unwrap_err();
    assert!(err.is_server_error());
}
