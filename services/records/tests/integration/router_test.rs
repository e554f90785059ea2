use axum::http::StatusCode;
use bson::doc;
use serde_json::{Value, json};

use pelfish_records_schema::{records, users};
use pelfish_testing::auth::{TEST_LOGIN_TOKEN, session_cookie};
use pelfish_testing::fixture::RecordFixture;
use pelfish_testing::store::MemoryStore;

use crate::helpers::{ReportsDown, TEST_USER_ID, signed_in_store, test_server};

const REPORTS: [&str; 4] = [
    "/api/admin/reports/biodiversity",
    "/api/admin/reports/geographic-stats",
    "/api/admin/reports/threat-distribution",
    "/api/admin/reports/user-activity",
];

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_probes() {
    let store = MemoryStore::new();
    let server = test_server(&store);

    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();

    store.fail_all();
    server
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_anonymous_report_requests_without_store_access() {
    let store = MemoryStore::new();
    let server = test_server(&store);

    for path in REPORTS {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "error": "Unauthorized" }));
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn should_reject_unknown_session_tokens() {
    let store = signed_in_store();
    let server = test_server(&store);
    let (name, value) = session_cookie("stale-token");

    let response = server
        .get("/api/admin/reports/threat-distribution")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_describe_current_session() {
    let server = test_server(&signed_in_store());

    let anonymous: Value = server.get("/api/session").await.json();
    assert_eq!(anonymous, json!({ "user": null }));

    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);
    let signed_in: Value = server.get("/api/session").add_header(name, value).await.json();
    assert_eq!(signed_in["user"]["_id"], TEST_USER_ID);
    assert_eq!(signed_in["user"]["name"], "Ana Reyes");
    assert_eq!(signed_in["user"]["email"], "ana@example.org");
}

#[tokio::test]
async fn should_authenticate_user_with_null_emails() {
    let store = MemoryStore::new().with(
        users::COLLECTION,
        [doc! {
            "_id": "u-null",
            "emails": null,
            "services": { "resume": { "loginTokens": [ { "hashedToken": "tok" } ] } },
        }],
    );
    let server = test_server(&store);
    let (name, value) = session_cookie("tok");

    server
        .get("/api/admin/reports/threat-distribution")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    let session: Value = server.get("/api/session").add_header(name, value).await.json();
    assert_eq!(session["user"]["_id"], "u-null");
    assert_eq!(session["user"]["email"], Value::Null);
    assert_eq!(session["user"]["name"], "Unknown User");
}

#[tokio::test]
async fn should_clear_session_cookie_on_logout() {
    let server = test_server(&MemoryStore::new());

    let response = server.post("/auth/logout").await;

    response.assert_status(StatusCode::NO_CONTENT);
    let cookie = response.header("set-cookie");
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("meteor_login_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
}

// ── Report contracts ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_wrap_reports_in_success_envelope() {
    let store = signed_in_store().with(
        records::COLLECTION,
        [
            RecordFixture::new("r1").threat("Harmless").environment("Marine").build(),
            RecordFixture::new("r2").threat("Harmless").build(),
        ],
    );
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    for path in REPORTS {
        let body: Value = server
            .get(path)
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(body["success"], true, "{path}");
        assert!(body["data"].is_object() || body["data"].is_array(), "{path}");
    }

    let threat: Value = server
        .get("/api/admin/reports/threat-distribution")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(
        threat,
        json!({
            "success": true,
            "data": [{ "threat": "Harmless", "count": 2, "percentage": "100.00" }],
            "total": 2,
        })
    );

    let bio: Value = server
        .get("/api/admin/reports/biodiversity")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(bio["data"]["totalSpecies"], 2);
    assert_eq!(bio["data"]["threatSummary"]["harmless"], 2);
    assert_eq!(
        bio["data"]["byEnvironment"],
        json!([{ "environment": "Marine", "count": 1 }])
    );
}

#[tokio::test]
async fn should_name_failed_report() {
    let store = ReportsDown(signed_in_store());
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    let expected = [
        "Failed to fetch biodiversity statistics",
        "Failed to fetch geographic statistics",
        "Failed to fetch threat distribution",
        "Failed to fetch user activity statistics",
    ];
    for (path, message) in REPORTS.into_iter().zip(expected) {
        let response = server
            .get(path)
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": message }));
    }
}

#[tokio::test]
async fn should_treat_failed_session_lookup_as_anonymous() {
    let store = signed_in_store();
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);
    store.fail_all();

    let session: Value = server
        .get("/api/session")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(session, json!({ "user": null }));

    server
        .get("/api/admin/reports/biodiversity")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_answer_cors_preflight_on_api_routes() {
    let server = test_server(&MemoryStore::new());

    let response = server
        .method(axum::http::Method::OPTIONS, "/api/admin/record")
        .add_header(
            axum::http::header::ORIGIN,
            axum::http::HeaderValue::from_static("https://dashboard.example.org"),
        )
        .add_header(
            axum::http::header::ACCESS_CONTROL_REQUEST_METHOD,
            axum::http::HeaderValue::from_static("PATCH"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert_eq!(response.header("access-control-max-age"), "86400");
}
