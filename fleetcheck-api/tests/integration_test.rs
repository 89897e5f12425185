/// Integration tests for the FleetCheck API
///
/// These tests verify the full system works end-to-end:
/// - Bootstrap and login flows
/// - Tenant isolation (cross-tenant reads look like missing rows)
/// - Role enforcement on mutations
/// - The inspection state machine
/// - Issue lifecycle and one-way resolution
/// - Pagination metadata
///
/// All tests need a PostgreSQL database (`DATABASE_URL`) and are ignored by
/// default; run them with `cargo test -- --ignored`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{send_json, TestContext, TEST_PASSWORD};
use fleetcheck_shared::models::user::UserRole;
use serde_json::json;
use tower::Service as _;

/// Requests without a token are rejected with a uniform 401
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = send_json(&ctx, "GET", "/api/v1/vehicles", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    ctx.cleanup().await.unwrap();
}

/// Bootstrap succeeds exactly once; repeats get 409
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_bootstrap_only_once() {
    let ctx = TestContext::new().await.unwrap();

    // The context already created a company, so the system counts as
    // bootstrapped and any attempt must conflict.
    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/bootstrap",
        None,
        Some(json!({
            "company_name": "Late Fleet",
            "full_name": "Late Admin",
            "email": "late@example.com",
            "password": "Sup3rSecret!pass"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "System has already been bootstrapped");

    ctx.cleanup().await.unwrap();
}

/// Wrong password and unknown email fail identically
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_login_failures_are_uniform() {
    let ctx = TestContext::new().await.unwrap();

    let (wrong_status, wrong_body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": ctx.admin.email,
            "password": "not-the-password"
        })),
    )
    .await;

    let (unknown_status, unknown_body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": "nobody@example.com",
            "password": "not-the-password"
        })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // An attacker cannot tell the two cases apart
    assert_eq!(wrong_body["message"], unknown_body["message"]);

    ctx.cleanup().await.unwrap();
}

/// Valid credentials return an access/refresh token pair
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_login_returns_token_pair() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": ctx.admin.email,
            "password": TEST_PASSWORD
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());

    ctx.cleanup().await.unwrap();
}

/// Forgot-password answers generically whether or not the account exists
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_forgot_password_is_generic() {
    let ctx = TestContext::new().await.unwrap();

    let (known_status, known_body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/forgot-password",
        None,
        Some(json!({ "email": ctx.admin.email })),
    )
    .await;

    let (unknown_status, unknown_body) = send_json(
        &ctx,
        "POST",
        "/api/v1/auth/forgot-password",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known_body["message"], unknown_body["message"]);

    ctx.cleanup().await.unwrap();
}

/// A vehicle from another tenant reads as 404, never 403
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_cross_tenant_vehicle_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let (other_company, _, other_token) = ctx.other_company().await.unwrap();

    // Created in the context's own company
    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(json!({
            "name": "Truck 7",
            "license_plate": "TRK-0007"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

    // Visible to its own tenant
    let (status, _) = send_json(
        &ctx,
        "GET",
        &format!("/api/v1/vehicles/{}", vehicle_id),
        Some(&ctx.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Invisible to the other tenant, as if it did not exist
    let (status, body) = send_json(
        &ctx,
        "GET",
        &format!("/api/v1/vehicles/{}", vehicle_id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    common::delete_company(&ctx.db, other_company.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Drivers cannot create vehicles
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_driver_cannot_create_vehicle() {
    let ctx = TestContext::new().await.unwrap();
    let (_, driver_token) = ctx.user_with_role(UserRole::Driver).await.unwrap();

    let (status, _) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&driver_token),
        Some(json!({
            "name": "Van 1",
            "license_plate": "VAN-0001"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Duplicate license plates within a tenant conflict
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_duplicate_license_plate_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let body = json!({
        "name": "Truck 1",
        "license_plate": "DUP-0001"
    });

    let (status, _) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        response["message"],
        "A vehicle with this license plate already exists"
    );

    ctx.cleanup().await.unwrap();
}

/// Pagination metadata matches the row count
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_pagination_metadata() {
    let ctx = TestContext::new().await.unwrap();

    for i in 0..25 {
        let (status, _) = send_json(
            &ctx,
            "POST",
            "/api/v1/vehicles",
            Some(&ctx.token),
            Some(json!({
                "name": format!("Vehicle {}", i),
                "license_plate": format!("PAG-{:04}", i)
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(
        &ctx,
        "GET",
        "/api/v1/vehicles?page=2&limit=10",
        Some(&ctx.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["totalItems"], 25);
    assert_eq!(body["pagination"]["itemsPerPage"], 10);

    ctx.cleanup().await.unwrap();
}

/// Sets up a vehicle, a template with one item, and a pending inspection
async fn seed_inspection(ctx: &TestContext) -> (String, String, String) {
    let (status, body) = send_json(
        ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(json!({
            "name": "Inspected Truck",
            "license_plate": format!("INS-{}", &uuid::Uuid::new_v4().to_string()[..8])
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        ctx,
        "POST",
        "/api/v1/templates",
        Some(&ctx.token),
        Some(json!({
            "name": "Daily walkaround",
            "items": [
                { "label": "Tires OK?", "input_type": "yes_no" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let template_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        ctx,
        "POST",
        "/api/v1/inspections",
        Some(&ctx.token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "template_id": template_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let inspection_id = body["data"]["id"].as_str().unwrap().to_string();

    (vehicle_id, template_id, inspection_id)
}

/// Completed inspections reject further updates and answers
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_completed_inspection_is_frozen() {
    let ctx = TestContext::new().await.unwrap();
    let (_, _, inspection_id) = seed_inspection(&ctx).await;

    let (status, _) = send_json(
        &ctx,
        "PATCH",
        &format!("/api/v1/inspections/{}", inspection_id),
        Some(&ctx.token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Further status changes bounce
    let (status, body) = send_json(
        &ctx,
        "PATCH",
        &format!("/api/v1/inspections/{}", inspection_id),
        Some(&ctx.token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Completed inspections cannot be modified");

    // So do late answers
    let (status, _) = send_json(
        &ctx,
        "POST",
        &format!("/api/v1/inspections/{}/answers", inspection_id),
        Some(&ctx.token),
        Some(json!({
            "answers": [
                { "item_id": uuid::Uuid::new_v4(), "value_bool": true }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Submitting answers moves a pending inspection to in_progress
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_answers_advance_pending_inspection() {
    let ctx = TestContext::new().await.unwrap();
    let (_, template_id, inspection_id) = seed_inspection(&ctx).await;

    // Grab the checklist item ID from the template detail
    let (status, body) = send_json(
        &ctx,
        "GET",
        &format!("/api/v1/templates/{}", template_id),
        Some(&ctx.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &ctx,
        "POST",
        &format!("/api/v1/inspections/{}/answers", inspection_id),
        Some(&ctx.token),
        Some(json!({
            "answers": [
                { "item_id": item_id, "value_bool": true }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &ctx,
        "GET",
        &format!("/api/v1/inspections/{}", inspection_id),
        Some(&ctx.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["answers"].as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

/// Drivers can file issues but not resolve them
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_driver_cannot_resolve_issue() {
    let ctx = TestContext::new().await.unwrap();
    let (_, driver_token) = ctx.user_with_role(UserRole::Driver).await.unwrap();

    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(json!({
            "name": "Issue Truck",
            "license_plate": "ISS-0001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/issues",
        Some(&driver_token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "severity": "medium",
            "description": "Brakes feel soft"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let issue_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &ctx,
        "PATCH",
        &format!("/api/v1/issues/{}/resolve", issue_id),
        Some(&driver_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin can, and only once
    let (status, _) = send_json(
        &ctx,
        "PATCH",
        &format!("/api/v1/issues/{}/resolve", issue_id),
        Some(&ctx.token),
        Some(json!({ "resolution_notes": "Bled the brakes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &ctx,
        "PATCH",
        &format!("/api/v1/issues/{}/resolve", issue_id),
        Some(&ctx.token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Issue is already resolved");

    ctx.cleanup().await.unwrap();
}

/// Filing an issue notifies the tenant's managers in-app
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_issue_notifies_managers() {
    let ctx = TestContext::new().await.unwrap();
    let (_, driver_token) = ctx.user_with_role(UserRole::Driver).await.unwrap();

    let (status, body) = send_json(
        &ctx,
        "POST",
        "/api/v1/vehicles",
        Some(&ctx.token),
        Some(json!({
            "name": "Notify Truck",
            "license_plate": "NTF-0001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &ctx,
        "POST",
        "/api/v1/issues",
        Some(&driver_token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "severity": "critical",
            "description": "Engine overheating"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Fan-out runs on a background task
    common::wait_for(
        || async {
            let (_, body) = send_json(
                &ctx,
                "GET",
                "/api/v1/notifications/unread-count",
                Some(&ctx.token),
                None,
            )
            .await;
            body["data"]["unread"].as_i64().unwrap_or(0) > 0
        },
        5,
    )
    .await
    .unwrap();

    ctx.cleanup().await.unwrap();
}

/// CSV export carries the right headers
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_inspection_csv_export() {
    let ctx = TestContext::new().await.unwrap();
    seed_inspection(&ctx).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/inspections/export/csv")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));

    let disposition = response.headers().get("content-disposition").unwrap();
    assert!(disposition.to_str().unwrap().contains("inspections_"));

    ctx.cleanup().await.unwrap();
}

/// The auth limiter cuts off repeated login attempts from one client
#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_auth_rate_limit() {
    let ctx = TestContext::new().await.unwrap();

    let mut limited = false;
    for _ in 0..6 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.77")
            .body(Body::from(
                json!({
                    "email": "nobody@example.com",
                    "password": "wrong"
                })
                .to_string(),
            ))
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            assert!(response.headers().contains_key("retry-after"));
            limited = true;
            break;
        }
    }

    assert!(limited, "Expected a 429 within six attempts");

    ctx.cleanup().await.unwrap();
}
