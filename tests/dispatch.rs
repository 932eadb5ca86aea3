//! End-to-end dispatch tests over a live server.

use std::time::Duration;

use flecha::{int, json, no_body, str, DomainError, Method, PathSpec, Route, Router, Segment, ServerConfig};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json as value, Value};

mod common;

fn user_path() -> PathSpec {
    PathSpec::build([Segment::from("users"), int("userId").into()]).unwrap()
}

fn users_router() -> Router {
    let get_user = Route::get(user_path(), |req| async move {
        match req.path_params.int("userId") {
            Some(1) => Ok(value!({ "id": 1, "name": "dodo" })),
            _ => Err(DomainError::not_found_with("x")),
        }
    });

    let household = Route::get(
        PathSpec::build([
            Segment::from("users"),
            int("userId").into(),
            "households".into(),
            str("householdId").into(),
        ])
        .unwrap(),
        |req| async move { Ok::<_, DomainError>(req.path_params) },
    );

    Router::new().with_route(get_user).with_route(household)
}

fn assert_cors(res: &reqwest::Response) {
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_get_success_envelope() {
    let server = common::spawn(users_router()).await;
    let res = common::client().get(server.url("/users/1")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(&res);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "data": { "id": 1, "name": "dodo" } }));
}

#[tokio::test]
async fn test_get_domain_error_envelope() {
    let server = common::spawn(users_router()).await;
    let res = common::client().get(server.url("/users/2")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Not Found - x" }));
}

#[tokio::test]
async fn test_invalid_path_parameter() {
    let server = common::spawn(users_router()).await;
    let res = common::client()
        .get(server.url("/users/1289ads8922"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Invalid url path" }));
}

#[tokio::test]
async fn test_mixed_params_are_typed() {
    let server = common::spawn(users_router()).await;
    let res = common::client()
        .get(server.url("/users/123456/households/cks52c26a00009c0y5f16fy9z"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        value!({ "data": { "userId": 123456, "householdId": "cks52c26a00009c0y5f16fy9z" } })
    );
}

#[tokio::test]
async fn test_percent_encoded_string_param() {
    let server = common::spawn(users_router()).await;
    let res = common::client()
        .get(server.url("/users/7/households/%40dodo"))
        .send()
        .await
        .unwrap();

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["householdId"], "@dodo");
}

#[tokio::test]
async fn test_unmatched_path_is_not_found_envelope() {
    let server = common::spawn(users_router()).await;
    let res = common::client().get(server.url("/nowhere")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Not Found" }));
}

#[tokio::test]
async fn test_wrong_method_is_envelope() {
    let server = common::spawn(users_router()).await;
    let res = common::client().delete(server.url("/users/1")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Method Not Allowed" }));
}

#[derive(Debug, Deserialize)]
struct Rename {
    name: String,
}

fn rename_router() -> Router {
    let rename = Route::put(
        user_path(),
        json::<Rename>(),
        |req| async move {
            if req.body.name == "taken" {
                return Err(DomainError::conflict_with("name in use"));
            }
            Ok(value!({ "id": req.path_params.int("userId"), "name": req.body.name }))
        },
    );

    let ping = Route::post(PathSpec::build(["ping"]).unwrap(), no_body(), |_req| async {
        Ok::<_, DomainError>("pong")
    });

    Router::new().with_route(rename).with_route(ping)
}

#[tokio::test]
async fn test_body_route_success() {
    let server = common::spawn(rename_router()).await;
    let res = common::client()
        .put(server.url("/users/5"))
        .json(&value!({ "name": "kiwi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "data": { "id": 5, "name": "kiwi" } }));
}

#[tokio::test]
async fn test_body_validation_failure() {
    let server = common::spawn(rename_router()).await;
    let res = common::client()
        .put(server.url("/users/5"))
        .json(&value!({ "nickname": "kiwi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    let issues = body["error"].as_array().expect("issue list");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["code"], "invalid_type");
}

#[tokio::test]
async fn test_missing_body_is_required() {
    let server = common::spawn(rename_router()).await;
    let res = common::client().put(server.url("/users/5")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"][0]["code"], "required");
}

#[tokio::test]
async fn test_conflict_from_handler() {
    let server = common::spawn(rename_router()).await;
    let res = common::client()
        .put(server.url("/users/5"))
        .json(&value!({ "name": "taken" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Conflict" }));
}

#[tokio::test]
async fn test_no_body_route() {
    let server = common::spawn(rename_router()).await;
    let client = common::client();

    let ok = client.post(server.url("/ping")).send().await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body, value!({ "data": "pong" }));

    let rejected = client.post(server.url("/ping")).body("{}").send().await.unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let mut config = ServerConfig::default();
    config.limits.body_limit_bytes = 16;

    let server = common::spawn_with(rename_router(), config).await;
    let res = common::client()
        .put(server.url("/users/5"))
        .json(&value!({ "name": "a name that is far longer than sixteen bytes" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, value!({ "error": "Payload Too Large" }));
}

#[tokio::test]
async fn test_internal_error_is_sanitized() {
    let router = Router::new().with_route(Route::get(user_path(), |_req| async {
        Err::<(), _>(DomainError::other_with_cause(
            "loading user row",
            std::io::Error::new(std::io::ErrorKind::Other, "socket reset"),
        ))
    }));

    let server = common::spawn(router).await;
    let res = common::client().get(server.url("/users/1")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = res.text().await.unwrap();
    assert!(!text.contains("socket"));
    assert!(!text.contains("user row"));
}

#[tokio::test]
async fn test_concurrent_requests_do_not_block_each_other() {
    let slow = Route::get(PathSpec::build(["slow"]).unwrap(), |_req| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok::<_, DomainError>("slow")
    });
    let fast = Route::get(PathSpec::build(["fast"]).unwrap(), |_req| async {
        Ok::<_, DomainError>("fast")
    });

    let server = common::spawn(Router::new().with_route(slow).with_route(fast)).await;
    let client = common::client();

    let slow_req = tokio::spawn({
        let client = client.clone();
        let url = server.url("/slow");
        async move { client.get(url).send().await.unwrap().status() }
    });

    let started = std::time::Instant::now();
    let fast_res = client.get(server.url("/fast")).send().await.unwrap();
    assert_eq!(fast_res.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(300));

    assert_eq!(slow_req.await.unwrap(), StatusCode::OK);
}

#[test]
fn test_activation_rejects_duplicate_routes() {
    let route = || Route::get(user_path(), |_req| async { Ok::<_, DomainError>(()) });
    let router = Router::new().with_route(route()).with_route(route());

    let err = flecha::HttpServer::new(&router, ServerConfig::default()).err().unwrap();
    assert_eq!(err.to_string(), "GET /users/:userId is registered more than once");
    assert_eq!(router.routes()[0].method(), Method::Get);
}
