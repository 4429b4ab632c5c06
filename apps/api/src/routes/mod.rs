pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::workflow::handlers;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/file",
            put(handlers::handle_select_file).delete(handlers::handle_clear_file),
        )
        .route("/api/v1/sessions/:id/analyze", post(handlers::handle_analyze))
        .route("/api/v1/sessions/:id/rebuild", post(handlers::handle_rebuild))
        .route("/api/v1/sessions/:id/back", post(handlers::handle_back))
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/sessions/:id/document",
            get(handlers::handle_download_document),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::models::fixtures::backend_analysis;
    use crate::analysis::models::AnalysisResult;
    use crate::analysis::requester::ResumeAnalyzer;
    use crate::config::Config;
    use crate::errors::RequestError;
    use crate::rebuild::document::RebuiltDocument;
    use crate::rebuild::requester::ResumeRewriter;
    use crate::upload::FilePayload;
    use crate::workflow::store::SessionStore;

    const JOB: &str = "Senior Backend Engineer, Go, Kubernetes";

    /// Replays queued outcomes and counts calls. Optionally parks each call until released.
    #[derive(Default)]
    struct FakeModel {
        analyses: Mutex<VecDeque<Result<AnalysisResult, RequestError>>>,
        rewrites: Mutex<VecDeque<Result<RebuiltDocument, RequestError>>>,
        analyze_calls: AtomicUsize,
        rewrite_calls: AtomicUsize,
        gate: Option<(Notify, Notify)>,
    }

    impl FakeModel {
        fn gated() -> Self {
            Self {
                gate: Some((Notify::new(), Notify::new())),
                ..Self::default()
            }
        }

        fn queue_analysis(&self, outcome: Result<AnalysisResult, RequestError>) {
            self.analyses.lock().unwrap().push_back(outcome);
        }

        fn queue_rewrite(&self, outcome: Result<RebuiltDocument, RequestError>) {
            self.rewrites.lock().unwrap().push_back(outcome);
        }

        async fn pass_gate(&self) {
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
        }
    }

    #[async_trait]
    impl ResumeAnalyzer for FakeModel {
        async fn analyze(
            &self,
            _document: &FilePayload,
            _job_description: &str,
        ) -> Result<AnalysisResult, RequestError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            self.pass_gate().await;
            self.analyses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(RequestError::EmptyResponse))
        }
    }

    #[async_trait]
    impl ResumeRewriter for FakeModel {
        async fn rewrite(
            &self,
            _document: &FilePayload,
            _job_description: &str,
            _analysis: &AnalysisResult,
        ) -> Result<RebuiltDocument, RequestError> {
            self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
            self.pass_gate().await;
            self.rewrites
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(RequestError::EmptyResponse))
        }
    }

    fn app(model: Arc<FakeModel>) -> Router {
        build_router(AppState {
            config: Config::for_tests(),
            sessions: SessionStore::new(),
            analyzer: model.clone(),
            rewriter: model,
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method("POST").uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload(session: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "resume-optimizer-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/sessions/{session}/file"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send_json(app, post("/api/v1/sessions", None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["view"]["screen"], "upload");
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn upload_pdf(app: &Router, session: &str) {
        let pdf = vec![b'%'; 2 * 1000 * 1000];
        let (status, body) = send_json(app, upload(session, "resume.pdf", "application/pdf", &pdf)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    async fn analyzed_session(app: &Router, model: &FakeModel) -> String {
        let session = new_session(app).await;
        upload_pdf(app, &session).await;
        model.queue_analysis(Ok(backend_analysis()));
        let (status, _) = send_json(
            app,
            post(
                &format!("/api/v1/sessions/{session}/analyze"),
                Some(json!({ "job_description": JOB })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        session
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Arc::new(FakeModel::default()));
        let (status, body) = send_json(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_scenario_a_dashboard_shows_score_and_missing_keyword() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;

        let (_, before) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(before["view"]["data"]["selected_file"]["size_label"], "1.91 MB");

        model.queue_analysis(Ok(backend_analysis()));
        let (status, body) = send_json(
            &app,
            post(
                &format!("/api/v1/sessions/{session}/analyze"),
                Some(json!({ "job_description": JOB })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(model.analyze_calls.load(Ordering::SeqCst), 1);
        assert_eq!(body["view"]["screen"], "results");
        let dashboard = &body["view"]["data"];
        assert_eq!(dashboard["overall_score_label"], "72%");
        assert_eq!(dashboard["missing_keywords"], json!(["Kubernetes"]));
        assert_eq!(dashboard["ats_simulation"]["keywords"][1]["status"], "MISSING");
        assert_eq!(dashboard["is_rebuilding"], false);
    }

    #[tokio::test]
    async fn test_scenario_b_oversized_png_rejected_without_request() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = new_session(&app).await;

        let png = vec![0u8; 6 * 1000 * 1000];
        let (status, body) = send_json(&app, upload(&session, "cv.png", "image/png", &png)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "File size must be less than 5MB.");

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "upload");
        assert!(view["view"]["data"]["selected_file"].is_null());
        assert_eq!(view["view"]["data"]["reading"], false);

        // nothing selected, so analysis is refused before any remote call
        let (status, _) = send_json(
            &app,
            post(
                &format!("/api/v1/sessions/{session}/analyze"),
                Some(json!({ "job_description": JOB })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_file_keeps_previous_selection() {
        let app = app(Arc::new(FakeModel::default()));
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;

        let (status, body) =
            send_json(&app, upload(&session, "cv.docx", "application/msword", b"doc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please upload a PDF, JPG, or PNG file.");

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["data"]["selected_file"]["name"], "resume.pdf");
    }

    #[tokio::test]
    async fn test_empty_job_description_is_rejected_inline() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;

        let (status, body) = send_json(
            &app,
            post(
                &format!("/api/v1/sessions/{session}/analyze"),
                Some(json!({ "job_description": "   " })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(model.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_returns_to_upload_with_notice() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;
        model.queue_analysis(Err(RequestError::Schema("missing field".to_string())));

        let (status, body) = send_json(
            &app,
            post(
                &format!("/api/v1/sessions/{session}/analyze"),
                Some(json!({ "job_description": JOB })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(body["error"]["message"], "Analysis failed. Please try again.");

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "upload");
        assert!(view["view"]["data"]["selected_file"].is_null());
        assert_eq!(view["notice"]["reason"], "schema");
    }

    #[tokio::test]
    async fn test_scenario_c_rebuild_preview_and_download() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = analyzed_session(&app, &model).await;

        let markdown = "# Summary\nBackend engineer shipping Go services.\n\n## Experience\n- Cut p99 latency 40%\n";
        model.queue_rewrite(Ok(RebuiltDocument::new(markdown)));
        let (status, body) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["screen"], "rebuilt");
        assert_eq!(body["view"]["data"]["markdown"], markdown);
        assert_eq!(body["view"]["data"]["download_name"], "optimized-resume.md");

        let response = app
            .clone()
            .oneshot(get(&format!("/api/v1/sessions/{session}/document")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"optimized-resume.md\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], markdown.as_bytes());
    }

    #[tokio::test]
    async fn test_rebuild_failure_keeps_results() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = analyzed_session(&app, &model).await;
        model.queue_rewrite(Err(RequestError::MissingCredential));

        let (status, body) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["message"], "Rebuild failed. Please try again.");

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "results");
        assert_eq!(view["view"]["data"]["overall_score_label"], "72%");
        assert_eq!(view["view"]["data"]["is_rebuilding"], false);
        assert_eq!(view["notice"]["reason"], "configuration");

        let (status, _) = send(&app, get(&format!("/api/v1/sessions/{session}/document"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_rebuild_refused_outside_results() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = new_session(&app).await;
        let (status, _) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(model.rewrite_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_rebuild_while_busy_is_refused() {
        let model = Arc::new(FakeModel::gated());
        let app = app(model.clone());

        // the gated analyzer needs releasing once for the setup analysis
        let setup = {
            let app = app.clone();
            let model = model.clone();
            tokio::spawn(async move { analyzed_session(&app, &model).await })
        };
        let (entered, release) = model.gate.as_ref().unwrap();
        entered.notified().await;
        release.notify_one();
        let session = setup.await.unwrap();

        model.queue_rewrite(Ok(RebuiltDocument::new("# Summary")));
        let first = {
            let app = app.clone();
            let uri = format!("/api/v1/sessions/{session}/rebuild");
            tokio::spawn(async move { send_json(&app, post(&uri, None)).await })
        };
        entered.notified().await;

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "rebuilding");
        assert_eq!(view["view"]["data"]["is_rebuilding"], true);

        let (status, body) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "A rebuild is already in progress.");

        release.notify_one();
        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(model.rewrite_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_late_analysis_after_reset_is_discarded() {
        let model = Arc::new(FakeModel::gated());
        let app = app(model.clone());
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;
        model.queue_analysis(Ok(backend_analysis()));

        let pending = {
            let app = app.clone();
            let uri = format!("/api/v1/sessions/{session}/analyze");
            tokio::spawn(async move {
                send_json(&app, post(&uri, Some(json!({ "job_description": JOB })))).await
            })
        };
        let (entered, release) = model.gate.as_ref().unwrap();
        entered.notified().await;

        let (status, view) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/reset"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["view"]["screen"], "upload");

        release.notify_one();
        let (status, _) = pending.await.unwrap();
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "upload");
        assert!(view["view"]["data"]["selected_file"].is_null());
    }

    #[tokio::test]
    async fn test_reset_and_back_navigation() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = analyzed_session(&app, &model).await;
        model.queue_rewrite(Ok(RebuiltDocument::new("# Summary")));
        send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)).await;

        let (status, view) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/back"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["view"]["screen"], "results");

        let (_, view) =
            send_json(&app, post(&format!("/api/v1/sessions/{session}/reset"), None)).await;
        assert_eq!(view["view"]["screen"], "upload");
        assert!(view["view"]["data"]["selected_file"].is_null());
        assert!(view.get("notice").is_none());
    }

    async fn wait_for_screen(app: &Router, session: &str, screen: &str) -> Value {
        for _ in 0..100 {
            let (_, view) = send_json(app, get(&format!("/api/v1/sessions/{session}"))).await;
            if view["view"]["screen"] == screen {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session never reached the {screen} screen");
    }

    #[tokio::test]
    async fn test_rebuild_completes_after_client_disconnects() {
        let model = Arc::new(FakeModel::gated());
        let app = app(model.clone());
        let (entered, release) = model.gate.as_ref().unwrap();

        let setup = {
            let app = app.clone();
            let model = model.clone();
            tokio::spawn(async move { analyzed_session(&app, &model).await })
        };
        entered.notified().await;
        release.notify_one();
        let session = setup.await.unwrap();

        model.queue_rewrite(Err(RequestError::Remote("503".to_string())));
        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            send_json(&app, post(&format!("/api/v1/sessions/{session}/rebuild"), None)),
        )
        .await;
        assert!(dropped.is_err(), "rebuild should still be waiting on the model");

        entered.notified().await;
        release.notify_one();

        let view = wait_for_screen(&app, &session, "results").await;
        assert_eq!(view["view"]["data"]["is_rebuilding"], false);
        assert_eq!(view["notice"]["reason"], "network");

        model.queue_rewrite(Ok(RebuiltDocument::new("# Summary")));
        let retry = {
            let app = app.clone();
            let uri = format!("/api/v1/sessions/{session}/rebuild");
            tokio::spawn(async move { send_json(&app, post(&uri, None)).await })
        };
        entered.notified().await;
        release.notify_one();
        let (status, body) = retry.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["screen"], "rebuilt");
    }

    #[tokio::test]
    async fn test_analysis_completes_after_client_disconnects() {
        let model = Arc::new(FakeModel::gated());
        let app = app(model.clone());
        let session = new_session(&app).await;
        upload_pdf(&app, &session).await;
        model.queue_analysis(Ok(backend_analysis()));

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            send_json(
                &app,
                post(
                    &format!("/api/v1/sessions/{session}/analyze"),
                    Some(json!({ "job_description": JOB })),
                ),
            ),
        )
        .await;
        assert!(dropped.is_err());

        let (entered, release) = model.gate.as_ref().unwrap();
        entered.notified().await;
        release.notify_one();

        let view = wait_for_screen(&app, &session, "results").await;
        assert_eq!(view["view"]["data"]["overall_score_label"], "72%");
    }

    #[tokio::test]
    async fn test_malformed_analyze_body_uses_error_envelope() {
        let app = app(Arc::new(FakeModel::default()));
        let session = new_session(&app).await;
        let uri = format!("/api/v1/sessions/{session}/analyze");

        let (status, body) = send_json(&app, post(&uri, Some(json!({ "job": "Go" })))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send_json(&app, post(&uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_on_wrong_screen_conflicts_before_type_check() {
        let model = Arc::new(FakeModel::default());
        let app = app(model.clone());
        let session = analyzed_session(&app, &model).await;

        let (status, body) =
            send_json(&app, upload(&session, "cv.docx", "application/msword", b"doc")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (_, view) = send_json(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(view["view"]["screen"], "results");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app(Arc::new(FakeModel::default()));
        let (status, body) = send_json(
            &app,
            get("/api/v1/sessions/00000000-0000-0000-0000-000000000000"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let app = app(Arc::new(FakeModel::default()));
        let session = new_session(&app).await;
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/sessions/{session}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, get(&format!("/api/v1/sessions/{session}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
