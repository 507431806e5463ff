use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{CustomerStatus, ProjectStatus};
use crate::test_support;

#[tokio::test]
async fn nested_create_and_list_scope_to_customer() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let acme = test_support::insert_customer(ctx.state.db(), "Acme", CustomerStatus::Current).await;
    let other =
        test_support::insert_customer(ctx.state.db(), "Other", CustomerStatus::Signed).await;
    test_support::insert_project(ctx.state.db(), &other.id, "Other Project", ProjectStatus::Drafted)
        .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/customers/{}/projects", acme.id),
            Some(&token),
            Some(json!({"title": "Website Redesign", "status": "in_progress"})),
        ))
        .await
        .expect("create project");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["data"]["slug"], "website-redesign");
    assert_eq!(body["data"]["customer_id"], acme.id.as_str());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/customers/{}/projects", acme.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list projects");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Website Redesign");
}

#[tokio::test]
async fn nested_create_requires_existing_customer() {
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
            "/api/v1/customers/missing-id/projects",
            Some(&token),
            Some(json!({"title": "Orphan Project"})),
        ))
        .await
        .expect("create project");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn top_level_list_expands_customer() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let acme = test_support::insert_customer(ctx.state.db(), "Acme", CustomerStatus::Current).await;
    test_support::insert_project(ctx.state.db(), &acme.id, "Website Redesign", ProjectStatus::Drafted)
        .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/projects", Some(&token), None))
        .await
        .expect("list projects");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["count"], 1);
    let record = &body["data"][0];
    assert_eq!(record["customer"]["name"], "Acme");
    assert_eq!(record["customer"]["status"], "current");
    assert_eq!(record["customer_id"], acme.id.as_str());
}

#[tokio::test]
async fn get_update_delete_project() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let acme = test_support::insert_customer(ctx.state.db(), "Acme", CustomerStatus::Current).await;
    let project = test_support::insert_project(
        ctx.state.db(),
        &acme.id,
        "Website Redesign",
        ProjectStatus::Drafted,
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/projects/{}", project.id),
            Some(&token),
            None,
        ))
        .await
        .expect("get project");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["customer"]["name"], "Acme");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/projects/{}", project.id),
            Some(&token),
            Some(json!({"title": "App Build", "status": "completed"})),
        ))
        .await
        .expect("update project");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["slug"], "app-build");
    assert_eq!(body["data"]["status"], "completed");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/projects/{}", project.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete project");

    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/projects/{}", project.id),
            Some(&token),
            None,
        ))
        .await
        .expect("get project");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_customer_cascades_to_projects() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "user@example.com", "Plain User", "password-1")
            .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let acme = test_support::insert_customer(ctx.state.db(), "Acme", CustomerStatus::Current).await;
    let project = test_support::insert_project(
        ctx.state.db(),
        &acme.id,
        "Website Redesign",
        ProjectStatus::Drafted,
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/customers/{}", acme.id),
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
            &format!("/api/v1/projects/{}", project.id),
            Some(&token),
            None,
        ))
        .await
        .expect("get project");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
