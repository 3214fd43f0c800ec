//! HTTP tests: routes, status codes and JSON shapes.

use actix_web::{test, web::Data, App};
use async_trait::async_trait;
use exp_ledger::api::{self, AppData};
use exp_ledger::{ExtractionBackend, ProcessingError, UploadedImage};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Echoes the received filenames back as one player per image.
struct EchoBackend {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl ExtractionBackend for EchoBackend {
    async fn extract(&self, images: Vec<UploadedImage>) -> Result<Value, ProcessingError> {
        let names: Vec<String> = images.iter().map(|i| i.filename.clone()).collect();
        self.seen.lock().unwrap().extend(names.iter().cloned());
        let processed: Vec<Value> = names
            .iter()
            .map(|n| json!({ "filename": n, "player_count": 1, "players": [{ "nickname": "Astra", "exp": 100 }] }))
            .collect();
        Ok(json!({
            "success": true,
            "processed_images": processed,
            "aggregated_players": [{ "nickname": "Astra", "totalEXP": 100 * names.len() as u64, "appearances": names.len(), "images": names }],
        }))
    }
}

const BOUNDARY: &str = "----expledgerboundary";

fn multipart_body(files: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for f in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n--{BOUNDARY}--\r\n"
    ));
    body.into_bytes()
}

fn app_data() -> Data<AppData> {
    Data::new(AppData::new(Arc::new(EchoBackend {
        seen: Mutex::new(Vec::new()),
    })))
}

macro_rules! app {
    ($data:expr) => {
        test::init_service(App::new().app_data($data.clone()).configure(api::configure)).await
    };
}

#[actix_web::test]
async fn health_reports_ok() {
    let data = app_data();
    let app = app!(data);
    let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp["ok"], true);
}

#[actix_web::test]
async fn upload_then_toggle_view_and_filter() {
    let data = app_data();
    let app = app!(data);

    let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/sessions").to_request()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["view"], "session");

    for files in [&["a.png", "b.png"][..], &["c.png"][..]] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/uploads"))
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(files))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["skipped_records"], json!([]));
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/sessions/{id}/view"))
        .set_json(json!({ "view": "cumulative" }))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["view"], "cumulative");
    assert_eq!(snap["statistics"]["total_exp"], 300);
    assert_eq!(snap["statistics"]["total_images"], 3);
    assert_eq!(snap["players"][0]["appearances"], 3);
    assert_eq!(snap["session_images"], 1);

    let req = test::TestRequest::put()
        .uri(&format!("/api/sessions/{id}/filter"))
        .set_json(json!({ "term": "zz" }))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["players"], json!([]));

    // One-off query does not change the stored filter
    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{id}?view=session&q=astra"))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["view"], "session");
    assert_eq!(snap["players"][0]["total_exp"], 100);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/sessions/{id}/filter"))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["filter"], "");
    assert_eq!(snap["view"], "cumulative");
    assert_eq!(snap["players"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn clear_requires_confirmation() {
    let data = app_data();
    let app = app!(data);
    let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/sessions").to_request()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{id}/clear"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{id}/clear"))
        .set_json(json!({ "confirm": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn unknown_session_is_404_and_empty_upload_is_400() {
    let data = app_data();
    let app = app!(data);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/sessions").to_request()).await;
    let id = created["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{id}/uploads"))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(&[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No images provided");
}

#[actix_web::test]
async fn goal_calculator() {
    let data = app_data();
    let app = app!(data);
    let req = test::TestRequest::get()
        .uri("/api/goal?current=19B&goal=20B")
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["result"]["needed_text"], "1.0B");

    let req = test::TestRequest::get()
        .uri("/api/goal?current=5M&goal=1M")
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["result"].is_null());
}
