pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::documents::handlers as documents;
use crate::recruiting::handlers as recruiting;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless API
        .route(
            "/api/v1/job-descriptions",
            post(recruiting::handle_generate_job_description),
        )
        .route("/api/v1/matches", post(recruiting::handle_match_resume))
        .route("/api/v1/emails", post(recruiting::handle_generate_email))
        .route(
            "/api/v1/emails/batch",
            post(recruiting::handle_generate_batch_emails),
        )
        .route(
            "/api/v1/documents/extract",
            post(documents::handle_extract),
        )
        // Original paths, kept for existing clients
        .route(
            "/generate-jd",
            post(recruiting::handle_generate_job_description),
        )
        .route("/match-resume", post(recruiting::handle_match_resume))
        .route("/generate-email", post(recruiting::handle_generate_email))
        .route(
            "/generate-batch-emails",
            post(recruiting::handle_generate_batch_emails),
        )
        // Session workflow
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(sessions::handle_store_job_description),
        )
        .route(
            "/api/v1/sessions/:id/job-description/generate",
            post(sessions::handle_generate_job_description),
        )
        .route(
            "/api/v1/sessions/:id/job-description/upload",
            post(sessions::handle_upload_job_description),
        )
        .route(
            "/api/v1/sessions/:id/resumes",
            post(sessions::handle_analyze_resumes),
        )
        .route("/api/v1/sessions/:id/emails", post(sessions::handle_batch_emails))
        .route(
            "/api/v1/sessions/:id/emails/:candidate_name",
            post(sessions::handle_regenerate_email),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::documents::tests::docx_bytes;
    use crate::documents::{DOCX_MIME, MSWORD_MIME};
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::LlmClient;

    const BOUNDARY: &str = "recruiter-test-boundary";
    const JD_TEXT: &str = "**Job Title:** Senior Cloud Solutions Architect\n\n## Required Qualifications\n- AWS, Kubernetes, Terraform, Python";

    fn app_with(backend: &Arc<ScriptedBackend>) -> Router {
        let llm: LlmClient = backend.client();
        build_router(AppState::new(Config::for_tests(), llm))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    /// `(file_name, content_type, bytes)` parts, all under the `file` field.
    fn multipart_request(uri: &str, files: &[(&str, &str, Vec<u8>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn resume_docx(name: &str) -> Vec<u8> {
        docx_bytes(&[
            name,
            "Cloud engineer with eight years of AWS and Terraform experience.",
            "Built Kubernetes platforms for payment systems.",
        ])
    }

    fn match_reply(name: &str, score: u32) -> String {
        json!({
            "candidate_name": name,
            "candidate_email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "match_score": score,
            "summary_remark": format!("{name} has relevant cloud experience."),
            "missing_skills": ["Multi-cloud governance"]
        })
        .to_string()
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, "/api/v1/sessions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await["id"].as_str().unwrap().to_string()
    }

    async fn store_jd(app: &Router, id: &str) {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/v1/sessions/{id}/job-description"),
                json!({ "job_description": JD_TEXT }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let response = app_with(&backend)
            .oneshot(empty_request(Method::GET, "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm_configured"], true);
    }

    #[tokio::test]
    async fn test_generate_jd_alias() {
        let backend = ScriptedBackend::with_replies([
            r###"{"job_description": "## Job Summary\nShip things."}"###,
        ]);
        let response = app_with(&backend)
            .oneshot(json_request(
                Method::POST,
                "/generate-jd",
                json!({
                    "job_title": "Platform Engineer",
                    "years_of_experience": 3,
                    "must_have_skills": "Rust, Kubernetes",
                    "company_name": "Acme",
                    "employment_type": "Full-time",
                    "industry": "Logistics",
                    "location": "Remote"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await["job_description"],
            "## Job Summary\nShip things."
        );
    }

    #[tokio::test]
    async fn test_match_requires_both_texts() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let response = app_with(&backend)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/matches",
                json!({ "jd_text": JD_TEXT, "resume_text": "  " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["code"], "VALIDATION_ERROR");
        assert!(backend.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_with_detail() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        backend.push_failure("quota exhausted");
        let response = app_with(&backend)
            .oneshot(json_request(
                Method::POST,
                "/match-resume",
                json!({ "jd_text": JD_TEXT, "resume_text": "Jamie Doe, designer." }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("quota exhausted"));
    }

    #[tokio::test]
    async fn test_single_email_endpoint() {
        let backend = ScriptedBackend::with_replies([
            r#"{"subject": "Next steps", "body": "Dear Ann,\n\nLet's talk."}"#,
        ]);
        let response = app_with(&backend)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/emails",
                json!({
                    "candidate_name": "Ann",
                    "job_title": "Platform Engineer",
                    "match_score": 88,
                    "remark": "Great fit.",
                    "missing_skills": []
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["subject"], "Next steps");
        assert!(body["body"].as_str().unwrap().ends_with("The Hiring Team"));
    }

    #[tokio::test]
    async fn test_batch_email_endpoint_keeps_request_order() {
        let backend = ScriptedBackend::with_replies([r#"{"emails": [
            {"candidate_name": "Bo", "subject": "B", "body": "Dear Bo"},
            {"candidate_name": "Ann", "subject": "A", "body": "Dear Ann"}
        ]}"#]);
        let response = app_with(&backend)
            .oneshot(json_request(
                Method::POST,
                "/generate-batch-emails",
                json!({
                    "job_title": "Platform Engineer",
                    "candidates": [
                        {"candidate_name": "Ann", "match_score": 90, "remark": "Great."},
                        {"candidate_name": "Bo", "match_score": 30, "remark": "Junior."}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body[0]["candidate_name"], "Ann");
        assert_eq!(body[1]["candidate_name"], "Bo");
    }

    #[tokio::test]
    async fn test_extract_endpoint_statuses() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let app = app_with(&backend);

        let ok = app
            .clone()
            .oneshot(multipart_request(
                "/api/v1/documents/extract",
                &[("jd.docx", DOCX_MIME, docx_bytes(&["Platform Engineer"]))],
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(read_json(ok).await["text"], "Platform Engineer");

        let legacy = app
            .clone()
            .oneshot(multipart_request(
                "/api/v1/documents/extract",
                &[("jd.doc", MSWORD_MIME, b"binary".to_vec())],
            ))
            .await
            .unwrap();
        assert_eq!(legacy.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let broken = app
            .oneshot(multipart_request(
                "/api/v1/documents/extract",
                &[("jd.docx", DOCX_MIME, b"not a zip".to_vec())],
            ))
            .await
            .unwrap();
        assert_eq!(broken.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let response = app_with(&backend)
            .oneshot(empty_request(
                Method::GET,
                "/api/v1/sessions/7f0c1f7e-8a7b-4c55-9d3e-0f5c2b1a9e10",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analysis_requires_job_description() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let app = app_with(&backend);
        let id = create_session(&app).await;
        let response = app
            .oneshot(multipart_request(
                &format!("/api/v1/sessions/{id}/resumes"),
                &[("ann.docx", DOCX_MIME, resume_docx("Ann Lee"))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_workflow_end_to_end() {
        let backend = ScriptedBackend::with_replies([match_reply("Ann Lee", 62), match_reply("Bo Park", 91)]);
        let app = app_with(&backend);
        let id = create_session(&app).await;
        store_jd(&app, &id).await;

        // Two usable resumes, one unsupported file, one with too little text.
        let response = app
            .clone()
            .oneshot(multipart_request(
                &format!("/api/v1/sessions/{id}/resumes"),
                &[
                    ("ann.docx", DOCX_MIME, resume_docx("Ann Lee")),
                    ("photo.png", "image/png", b"\x89PNG".to_vec()),
                    ("short.docx", DOCX_MIME, docx_bytes(&["Too short"])),
                    ("bo.docx", DOCX_MIME, resume_docx("Bo Park")),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["analyzed"], 2);
        assert_eq!(body["skipped"].as_array().unwrap().len(), 2);
        let candidates = body["session"]["candidates"].as_array().unwrap();
        assert_eq!(candidates[0]["candidate_name"], "Bo Park");
        assert_eq!(candidates[0]["rank"], 1);
        assert_eq!(candidates[0]["source_file"], "bo.docx");
        assert_eq!(candidates[1]["candidate_name"], "Ann Lee");
        assert_eq!(body["session"]["job_title"], "Senior Cloud Solutions Architect");

        // Batch emails for both candidates.
        backend.push_reply(
            r#"{"emails": [
                {"candidate_name": "Ann Lee", "subject": "Batch Ann", "body": "Dear Ann"},
                {"candidate_name": "Bo Park", "subject": "Batch Bo", "body": "Dear Bo"}
            ]}"#,
        );
        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, &format!("/api/v1/sessions/{id}/emails")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await["job_title"],
            "Senior Cloud Solutions Architect"
        );

        // Regenerating one email overwrites the batch draft.
        backend.push_reply(r#"{"subject": "Fresh Ann", "body": "Dear Ann, again"}"#);
        let response = app
            .clone()
            .oneshot(empty_request(
                Method::POST,
                &format!("/api/v1/sessions/{id}/emails/ann%20lee"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["candidate_name"], "Ann Lee");

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        let body = read_json(response).await;
        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates[0]["email"]["subject"], "Batch Bo");
        assert_eq!(candidates[1]["email"]["subject"], "Fresh Ann");

        // Teardown.
        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app
            .oneshot(empty_request(Method::GET, &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_match_skips_only_that_resume() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        backend.push_failure("model overloaded");
        backend.push_reply(&match_reply("Bo Park", 70));
        let app = app_with(&backend);
        let id = create_session(&app).await;
        store_jd(&app, &id).await;

        let response = app
            .oneshot(multipart_request(
                &format!("/api/v1/sessions/{id}/resumes"),
                &[
                    ("ann.docx", DOCX_MIME, resume_docx("Ann Lee")),
                    ("bo.docx", DOCX_MIME, resume_docx("Bo Park")),
                ],
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["analyzed"], 1);
        assert_eq!(body["skipped"][0]["file_name"], "ann.docx");
        assert_eq!(body["session"]["candidates"][0]["candidate_name"], "Bo Park");
    }

    #[tokio::test]
    async fn test_resume_length_gate_boundary() {
        let backend = ScriptedBackend::with_replies([match_reply("Fifty", 55)]);
        let app = app_with(&backend);
        let id = create_session(&app).await;
        store_jd(&app, &id).await;

        let response = app
            .oneshot(multipart_request(
                &format!("/api/v1/sessions/{id}/resumes"),
                &[
                    ("short.docx", DOCX_MIME, docx_bytes(&[&"a".repeat(49)])),
                    ("exact.docx", DOCX_MIME, docx_bytes(&[&"a".repeat(50)])),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["analyzed"], 1);
        assert_eq!(body["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(body["skipped"][0]["file_name"], "short.docx");
        assert_eq!(
            body["skipped"][0]["reason"],
            "Could not extract sufficient text."
        );
        assert_eq!(backend.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_only_first_ten_resumes_processed() {
        let replies: Vec<String> = (0..10).map(|i| match_reply(&format!("Candidate {i}"), 50)).collect();
        let backend = ScriptedBackend::with_replies(replies);
        let app = app_with(&backend);
        let id = create_session(&app).await;
        store_jd(&app, &id).await;

        let files: Vec<(String, Vec<u8>)> = (0..12)
            .map(|i| (format!("cv{i}.docx"), resume_docx(&format!("Candidate {i}"))))
            .collect();
        let parts: Vec<(&str, &str, Vec<u8>)> = files
            .iter()
            .map(|(name, data)| (name.as_str(), DOCX_MIME, data.clone()))
            .collect();

        let response = app
            .oneshot(multipart_request(&format!("/api/v1/sessions/{id}/resumes"), &parts))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["analyzed"], 10);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(backend.prompts().len(), 10);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_emails_intact() {
        let backend = ScriptedBackend::with_replies([match_reply("Ann Lee", 85)]);
        let app = app_with(&backend);
        let id = create_session(&app).await;
        store_jd(&app, &id).await;
        app.clone()
            .oneshot(multipart_request(
                &format!("/api/v1/sessions/{id}/resumes"),
                &[("ann.docx", DOCX_MIME, resume_docx("Ann Lee"))],
            ))
            .await
            .unwrap();

        backend.push_reply(r#"{"subject": "Kept", "body": "Dear Ann"}"#);
        app.clone()
            .oneshot(empty_request(
                Method::POST,
                &format!("/api/v1/sessions/{id}/emails/Ann%20Lee"),
            ))
            .await
            .unwrap();

        // The batch reply omits Ann, so the whole batch fails.
        backend.push_reply(r#"{"emails": []}"#);
        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, &format!("/api/v1/sessions/{id}/emails")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .oneshot(empty_request(Method::GET, &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["candidates"][0]["email"]["subject"], "Kept");
    }

    #[tokio::test]
    async fn test_regenerate_unknown_candidate_is_404() {
        let backend = ScriptedBackend::with_replies(Vec::<String>::new());
        let app = app_with(&backend);
        let id = create_session(&app).await;
        let response = app
            .oneshot(empty_request(
                Method::POST,
                &format!("/api/v1/sessions/{id}/emails/Nobody"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
