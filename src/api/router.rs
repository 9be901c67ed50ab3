//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`; CORS is open to any origin so the
//! browser dashboard can be served from anywhere.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::endpoints::symptoms::MAX_PHOTO_BYTES;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Headroom for the description field and multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/health-connect-data", post(endpoints::wearable::sync))
        .route("/clinical-data", post(endpoints::clinical::record))
        .route(
            "/journal",
            post(endpoints::journal::create).get(endpoints::journal::list),
        )
        .route("/journal/:id", get(endpoints::journal::get_one))
        .route(
            "/symptom-analysis",
            post(endpoints::symptoms::analyze)
                .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/symptoms", get(endpoints::symptoms::list))
        .route("/state", get(endpoints::state::current))
        .route("/ws/health-data", get(websocket::ws_upgrade))
        .with_state(ctx)
        // Scores change every tick; never serve them from a cache.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use tower::ServiceExt;

    use crate::classifier::testing::classifier_replying;
    use crate::core_state::testing::{core_with, test_core};

    const BOUNDARY: &str = "care-companion-test-boundary";

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// `(name, file_name, bytes)` per part.
    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/symptom-analysis")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok_and_disables_caching() {
        let (core, _tmp) = test_core();
        let response = api_router(core).oneshot(get("/api/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["connected_clients"], 0);
        assert_eq!(json["classifier_configured"], false);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (core, _tmp) = test_core();
        let response = api_router(core).oneshot(get("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let (core, _tmp) = test_core();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/journal")
            .header("Origin", "http://dashboard.local")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = api_router(core).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    // ── Wearable / clinical ──────────────────────────────────

    #[tokio::test]
    async fn wearable_sync_updates_state() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/health-connect-data", serde_json::json!({ "hrv": 62 }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "data received and state updated");
        assert_eq!(core.patient().snapshot().wearable_metric, 62.0);
    }

    #[tokio::test]
    async fn negative_wearable_is_rejected_before_state() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/health-connect-data", serde_json::json!({ "hrv": -5 }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(core.patient().snapshot().wearable_metric, 40.0);
    }

    #[tokio::test]
    async fn malformed_wearable_body_is_client_error() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/health-connect-data", serde_json::json!({ "bpm": 70 }));
        let response = api_router(core).oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn clinical_data_updates_biomarker() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/clinical-data", serde_json::json!({ "biomarker_level": 2.5 }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "clinical data updated");
        assert_eq!(core.patient().snapshot().clinical_biomarker, 2.5);
    }

    #[tokio::test]
    async fn zero_biomarker_is_accepted() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/clinical-data", serde_json::json!({ "biomarker_level": 0 }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(core.patient().snapshot().clinical_biomarker, 0.0);
    }

    #[tokio::test]
    async fn negative_biomarker_is_rejected_before_state() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/clinical-data", serde_json::json!({ "biomarker_level": -1 }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
        assert_eq!(core.patient().snapshot().clinical_biomarker, 10.0);
    }

    #[tokio::test]
    async fn out_of_range_biomarker_never_reaches_state() {
        let (core, _tmp) = test_core();
        let req = Request::builder()
            .method("POST")
            .uri("/api/clinical-data")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"biomarker_level": 1e400}"#))
            .unwrap();
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(core.patient().snapshot().clinical_biomarker, 10.0);
    }

    // ── Journal ──────────────────────────────────────────────

    #[tokio::test]
    async fn journal_post_classifies_persists_and_smooths() {
        let (core, _tmp) = core_with(classifier_replying(
            r#"{"analysis":"Hopeful","sentiment_score":-1.0,"encouragement":"Lovely."}"#,
        ));
        let req = json_request("POST", "/api/journal", serde_json::json!({ "content": "Felt strong today" }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["content"], "Felt strong today");
        assert_eq!(json["ai_analysis"], "Hopeful");
        assert_eq!(json["ai_encouragement"], "Lovely.");
        assert_eq!(json["sentiment_score"], -1.0);
        assert_eq!(json["classified_by"], "model");

        let smoothed = core.patient().snapshot().smoothed_sentiment;
        assert!((smoothed - -0.2).abs() < 1e-12);

        let conn = core.open_db().unwrap();
        assert_eq!(crate::db::list_journal_entries(&conn).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn journal_without_classifier_stores_fallback() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/journal", serde_json::json!({ "content": "Tired." }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ai_analysis"], "Entry saved.");
        assert_eq!(json["sentiment_score"], 0.1);
        assert_eq!(json["classified_by"], "fallback:not_configured");

        let smoothed = core.patient().snapshot().smoothed_sentiment;
        assert!((smoothed - 0.02).abs() < 1e-12);
    }

    #[tokio::test]
    async fn blank_journal_is_rejected_and_not_stored() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/journal", serde_json::json!({ "content": "   " }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let conn = core.open_db().unwrap();
        assert!(crate::db::list_journal_entries(&conn).unwrap().is_empty());
        assert_eq!(core.patient().snapshot().smoothed_sentiment, 0.0);
    }

    #[tokio::test]
    async fn journal_get_lists_newest_first() {
        let (core, _tmp) = test_core();
        for text in ["first", "second"] {
            let req = json_request("POST", "/api/journal", serde_json::json!({ "content": text }));
            let response = api_router(core.clone()).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = api_router(core).oneshot(get("/api/journal")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["content"], "second");
        assert_eq!(entries[1]["content"], "first");
    }

    #[tokio::test]
    async fn journal_insert_failure_leaves_sentiment_untouched() {
        let (core, _tmp) = test_core();
        core.patient().apply_journal_sentiment(Some(1.0));
        core.open_db()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_journal BEFORE INSERT ON journal_entries
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let req = json_request("POST", "/api/journal", serde_json::json!({ "content": "Rough night" }));
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let smoothed = core.patient().snapshot().smoothed_sentiment;
        assert!((smoothed - 0.2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn journal_get_by_id() {
        let (core, _tmp) = test_core();
        let req = json_request("POST", "/api/journal", serde_json::json!({ "content": "Walked twice" }));
        let created = body_json(api_router(core.clone()).oneshot(req).await.unwrap()).await;
        let id = created["id"].as_i64().unwrap();

        let response = api_router(core.clone())
            .oneshot(get(&format!("/api/journal/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["content"], "Walked twice");

        let response = api_router(core).oneshot(get("/api/journal/9999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    // ── Symptoms ─────────────────────────────────────────────

    #[tokio::test]
    async fn symptom_analysis_stores_report_and_rescores() {
        let (core, _tmp) = core_with(classifier_replying(
            "```json\n{\"severity\":\"Severe\",\"advice\":\"Seek care now.\"}\n```",
        ));
        let req = multipart_request(&[
            ("description", None, &b"Red streaks spreading from the wound"[..]),
            ("photo", Some("wound.jpg"), &b"\xff\xd8\xff\xe0fake-jpeg"[..]),
        ]);
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["severity"], "Severe");
        assert_eq!(json["advice"], "Seek care now.");
        assert_eq!(json["classified_by"], "model");
        // One severe report at age zero.
        assert!((json["symptom_score"].as_f64().unwrap() - 5.0).abs() < 1e-6);
        assert!((core.patient().snapshot().symptom_score - 5.0).abs() < 1e-6);

        let response = api_router(core).oneshot(get("/api/symptoms")).await.unwrap();
        let json = body_json(response).await;
        let reports = json.as_array().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["photo_path"], "wound.jpg");
        assert_eq!(reports[0]["severity"], "Severe");
    }

    #[tokio::test]
    async fn symptom_without_classifier_is_moderate_fallback() {
        let (core, _tmp) = test_core();
        let req = multipart_request(&[("description", None, &b"Mild headache"[..])]);
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["severity"], "Moderate");
        assert_eq!(json["classified_by"], "fallback:not_configured");
        assert!((core.patient().snapshot().symptom_score - 2.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn symptom_missing_description_is_rejected() {
        let (core, _tmp) = test_core();
        let req = multipart_request(&[("photo", Some("a.png"), &b"png"[..])]);
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(core.patient().snapshot().symptom_score, 0.0);
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let (core, _tmp) = test_core();
        let photo = vec![0u8; MAX_PHOTO_BYTES + 1];
        let req = multipart_request(&[
            ("description", None, &b"Swelling"[..]),
            ("photo", Some("big.jpg"), photo.as_slice()),
        ]);
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let conn = core.open_db().unwrap();
        assert!(crate::db::list_symptom_reports(&conn, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn symptom_list_respects_limit() {
        let (core, _tmp) = test_core();
        for _ in 0..3 {
            let req = multipart_request(&[("description", None, &b"Nausea"[..])]);
            api_router(core.clone()).oneshot(req).await.unwrap();
        }
        let response = api_router(core).oneshot(get("/api/symptoms?limit=2")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unreadable_history_fails_and_keeps_symptom_score() {
        let (core, _tmp) = test_core();
        let now = chrono::Utc::now();
        core.patient().apply_symptom_history_at(
            &[crate::scoring::decay::tests::report_at(now, "Severe")],
            now,
            7,
        );
        core.open_db()
            .unwrap()
            .execute(
                "INSERT INTO symptom_reports (timestamp, description, severity)
                 VALUES ('not-a-time', 'legacy row', 'Mild')",
                [],
            )
            .unwrap();

        let req = multipart_request(&[("description", None, &b"Dizzy"[..])]);
        let response = api_router(core.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(core.patient().snapshot().symptom_score, 5.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_symptoms_all_count_toward_score() {
        let (core, _tmp) = test_core();
        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let app = api_router(core.clone());
                tokio::spawn(async move {
                    let req = multipart_request(&[("description", None, &b"Cramps"[..])]);
                    app.oneshot(req).await.unwrap().status()
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }

        // Three Moderate fallbacks at age ~0; the last store saw all of them.
        let score = core.patient().snapshot().symptom_score;
        assert!((score - 7.5).abs() < 1e-3, "score = {score}");
    }

    // ── State ────────────────────────────────────────────────

    #[tokio::test]
    async fn state_matches_broadcast_payload() {
        let (core, _tmp) = test_core();
        core.patient().apply_wearable(50.0);
        core.patient().apply_biomarker(2.5);

        let response = api_router(core.clone()).oneshot(get("/api/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;

        let expected = crate::broadcast::build_payload(&core.patient().snapshot());
        assert_eq!(json["progress_score"], expected.progress_score);
        assert_eq!(json["insight"], expected.insight);
        assert_eq!(json["hrv"], 50.0);
        assert_eq!(json["components"]["biomarker"], 100.0);
    }
}
