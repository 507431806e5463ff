use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::CustomerStatus;
use crate::test_support;

#[tokio::test]
async fn customer_crud_flow() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let payload = json!({
        "name": "Acme Corp",
        "email": "contact@acme.test",
        "address": "1 Main St",
        "website": "https://acme.test",
        "status": "signed",
        "contract_date": "2024-03-01"
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create customer");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["slug"], "acme-corp");
    assert_eq!(body["data"]["photo"], "no-photo.jpg");
    assert_eq!(body["data"]["status"], "signed");
    assert_eq!(body["data"]["contract_date"], "2024-03-01T00:00:00Z");
    let customer_id = body["data"]["id"].as_str().expect("customer id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/customers/{customer_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get customer");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["name"], "Acme Corp");

    // Renaming recomputes the slug.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/customers/{customer_id}"),
            Some(&token),
            Some(json!({"name": "Acme Holdings", "status": "current"})),
        ))
        .await
        .expect("update customer");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["slug"], "acme-holdings");
    assert_eq!(body["data"]["status"], "current");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/customers/{customer_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete customer");

    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/customers/{customer_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get customer");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_customer_name_conflicts() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());
    test_support::insert_customer(ctx.state.db(), "Acme Corp", CustomerStatus::Current).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(json!({
                "name": "Acme Corp",
                "email": "contact@acme.test",
                "address": "1 Main St"
            })),
        ))
        .await
        .expect("create customer");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_invalid_payload() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(json!({
                "name": "Bad Email Inc",
                "email": "not-an-email",
                "address": "1 Main St"
            })),
        ))
        .await
        .expect("create customer");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(json!({
                "name": "Bad Date Inc",
                "email": "contact@baddate.test",
                "address": "1 Main St",
                "contract_date": "not-a-date"
            })),
        ))
        .await
        .expect("create customer");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_sorts_selects_and_paginates() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    test_support::insert_customer(ctx.state.db(), "Alpha", CustomerStatus::Current).await;
    test_support::insert_customer(ctx.state.db(), "Bravo", CustomerStatus::Current).await;
    test_support::insert_customer(ctx.state.db(), "Charlie", CustomerStatus::Signed).await;
    test_support::insert_customer(ctx.state.db(), "Delta", CustomerStatus::Expired).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/customers?status=current",
            Some(&token),
            None,
        ))
        .await
        .expect("list customers");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["count"], 2);
    assert_eq!(body["pagination"], json!({}));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/customers?status[in]=current,signed&sort=name",
            Some(&token),
            None,
        ))
        .await
        .expect("list customers");

    let body = test_support::read_json(response).await;
    assert_eq!(body["count"], 3);
    let names: Vec<&str> =
        body["data"].as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/customers?select=name,status&sort=-name&page=1&limit=3",
            Some(&token),
            None,
        ))
        .await
        .expect("list customers");

    let body = test_support::read_json(response).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["pagination"]["next"], json!({"page": 2, "limit": 3}));
    assert!(body["pagination"].get("prev").is_none());
    let first = &body["data"][0];
    assert_eq!(first["name"], "Delta");
    assert!(first.get("id").is_some());
    assert!(first.get("email").is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/customers?select=name&sort=-name&page=2&limit=3",
            Some(&token),
            None,
        ))
        .await
        .expect("list customers");

    let body = test_support::read_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["pagination"]["prev"], json!({"page": 1, "limit": 3}));
    assert!(body["pagination"].get("next").is_none());
    assert_eq!(body["data"][0]["name"], "Alpha");
}

#[tokio::test]
async fn list_rejects_unknown_filter_field() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/customers?favourite_color=blue",
            Some(&token),
            None,
        ))
        .await
        .expect("list customers");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
