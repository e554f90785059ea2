use axum::http::StatusCode;
use bson::Bson;
use serde_json::{Value, json};

use pelfish_records_schema::records;
use pelfish_testing::auth::{TEST_LOGIN_TOKEN, session_cookie};
use pelfish_testing::fixture::RecordFixture;

use crate::helpers::{TEST_USER_ID, at, signed_in_store, test_server};

fn stored(store: &pelfish_testing::store::MemoryStore, id: &str) -> bson::Document {
    store
        .documents(records::COLLECTION)
        .into_iter()
        .find(|d| d.get_str("_id").ok() == Some(id))
        .unwrap()
}

// ── Reads ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_active_records_newest_first_without_images() {
    let store = signed_in_store().with(
        records::COLLECTION,
        [
            RecordFixture::new("old").created(at(2025, 1, 1)).image("a").build(),
            RecordFixture::new("new").created(at(2026, 1, 1)).image("b").build(),
            RecordFixture::new("gone").created(at(2026, 2, 1)).inactive().build(),
        ],
    );
    let server = test_server(&store);

    let body: Value = server.get("/api/admin/record").await.json();

    assert_eq!(body["status"], "Success");
    let list = body["response"].as_array().unwrap();
    let ids: Vec<&str> = list.iter().map(|r| r["_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["new", "old"]);
    assert!(list.iter().all(|r| r.get("image").is_none()));
    assert_eq!(list[0]["created"], "2026-01-01T08:00:00.000Z");
}

#[tokio::test]
async fn should_get_single_record_with_image_or_404() {
    let store = signed_in_store().with(
        records::COLLECTION,
        [RecordFixture::new("r1").image("img").markers(&[[13.4, 121.2]]).build()],
    );
    let server = test_server(&store);

    let body: Value = server.get("/api/admin/record/r1").await.json();
    assert_eq!(body["response"]["image"], "img");

    let markers: Value = server.get("/api/admin/record/r1/markers").await.json();
    assert_eq!(
        markers["response"],
        json!({ "_id": "r1", "markers": [[13.4, 121.2]] })
    );

    let missing = server.get("/api/admin/record/nope").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    missing.assert_json(&json!({ "error": "Record not found" }));
}

// ── Writes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_session_for_writes() {
    let store = signed_in_store().with(records::COLLECTION, [RecordFixture::new("r1").build()]);
    let server = test_server(&store);
    let calls = store.calls();

    server
        .post("/api/admin/record/upload")
        .json(&json!([{ "name": "Tilapia" }]))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .patch("/api/admin/record/r1/active")
        .json(&json!({ "isActive": false }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/admin/record/delete")
        .json(&json!({ "_id": "r1" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(store.calls(), calls);
    assert_eq!(store.documents(records::COLLECTION).len(), 1);
}

#[tokio::test]
async fn should_upload_records_as_active_and_owned() {
    let store = signed_in_store();
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    let body: Value = server
        .post("/api/admin/record/upload")
        .add_header(name, value)
        .json(&json!([
            { "name": "Tilapia", "threat": "Harmless", "isActive": false },
            { "name": "Milkfish", "max": 180.0, "markers": [[13.4, 121.2]] },
        ]))
        .await
        .json();

    assert_eq!(body["status"], "Success");
    assert_eq!(body["message"], "2 records successfully added");
    let ids: Vec<String> = body["insertedIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids.len(), 2);

    for id in &ids {
        let doc = stored(&store, id);
        assert_eq!(doc.get("isActive"), Some(&Bson::Boolean(true)));
        assert_eq!(doc.get_str("createdBy").unwrap(), TEST_USER_ID);
        assert!(doc.get_datetime("created").is_ok());
        assert!(doc.get_datetime("createdAt").is_ok());
    }
    assert_eq!(stored(&store, &ids[0]).get_str("name").unwrap(), "Tilapia");
}

#[tokio::test]
async fn should_soft_delete_and_restore() {
    let store = signed_in_store().with(
        records::COLLECTION,
        [RecordFixture::new("r1").threat("Harmless").build()],
    );
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    let body: Value = server
        .patch("/api/admin/record/r1/active")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "isActive": false }))
        .await
        .json();
    assert_eq!(body["message"], "Record deactivated");

    let doc = stored(&store, "r1");
    assert_eq!(doc.get("isActive"), Some(&Bson::Boolean(false)));
    assert_eq!(doc.get_str("updatedBy").unwrap(), TEST_USER_ID);

    let threat: Value = server
        .get("/api/admin/reports/threat-distribution")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(threat["total"], 0);

    server
        .patch("/api/admin/record/r1/active")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "isActive": true }))
        .await
        .assert_status_ok();
    let threat: Value = server
        .get("/api/admin/reports/threat-distribution")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(threat["total"], 1);

    let missing = server
        .patch("/api/admin/record/nope/active")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "isActive": false }))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);

    let no_flag = server
        .patch("/api/admin/record/r1/active")
        .add_header(name, value)
        .json(&json!({}))
        .await;
    no_flag.assert_status(StatusCode::BAD_REQUEST);
    no_flag.assert_json(&json!({ "error": "isActive is required" }));
}

#[tokio::test]
async fn should_update_record_and_markers() {
    let store = signed_in_store().with(
        records::COLLECTION,
        [RecordFixture::new("r1").name("Tilapia").image("img").build()],
    );
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    server
        .post("/api/admin/record/update")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "_id": "r1", "description": "Cichlid" }))
        .await
        .assert_status_ok();
    let doc = stored(&store, "r1");
    assert_eq!(doc.get_str("name").unwrap(), "Tilapia");
    assert_eq!(doc.get_str("description").unwrap(), "Cichlid");
    assert!(doc.get_datetime("updatedAt").is_ok());

    server
        .post("/api/admin/record/update-marker")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "_id": "r1", "markers": [[1.5, 2.5]] }))
        .await
        .assert_status_ok();
    let markers = stored(&store, "r1").get_array("markers").unwrap().clone();
    assert_eq!(
        markers,
        vec![Bson::Array(vec![Bson::Double(1.5), Bson::Double(2.5)])]
    );

    let no_id = server
        .post("/api/admin/record/update")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "name": "x" }))
        .await;
    no_id.assert_status(StatusCode::BAD_REQUEST);
    no_id.assert_json(&json!({ "error": "_id is required" }));

    server
        .post("/api/admin/record/update-marker")
        .add_header(name, value)
        .json(&json!({ "_id": "nope", "markers": [] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_hard_delete_once() {
    let store = signed_in_store().with(records::COLLECTION, [RecordFixture::new("r1").build()]);
    let server = test_server(&store);
    let (name, value) = session_cookie(TEST_LOGIN_TOKEN);

    server
        .post("/api/admin/record/delete")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "_id": "r1" }))
        .await
        .assert_status_ok();
    assert!(store.documents(records::COLLECTION).is_empty());

    server
        .post("/api/admin/record/delete")
        .add_header(name, value)
        .json(&json!({ "_id": "r1" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
