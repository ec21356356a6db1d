pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as upload;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Upload API
        .route("/api/upload-cv", post(upload::handle_upload_cv))
        // Match API
        .route("/api/match-jobs", post(matching::handle_match_jobs))
        .route("/api/corpus", get(matching::handle_corpus_status))
        .route("/api/corpus/reload", post(matching::handle_corpus_reload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::extractor::TermExtractor;
    use crate::extraction::vocabulary::{Vocabulary, DEFAULT_QUALIFICATIONS, DEFAULT_SKILLS};
    use crate::matching::corpus::{CorpusHandle, JobCorpus};
    use crate::matching::scorer::CoverageScorer;
    use crate::storage::LocalDocumentStore;

    const BOUNDARY: &str = "XBOUNDARYX";

    const JOBS_CSV: &str = "\
id,title,company,skills,qualifications
a,Data Analyst,Acme,\"Python, SQL\",BSc
b,Python Developer,Snake Co,Python,
c,Office Manager,Desk Ltd,,
";

    struct Harness {
        router: Router,
        dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        harness_with(&[])
    }

    fn harness_with(overrides: &[(&'static str, &str)]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("jobs.csv");
        std::fs::write(&dataset, JOBS_CSV).unwrap();
        let upload_dir = dir.path().join("uploads");

        let mut vars: HashMap<&str, String> = HashMap::from([
            ("JOBS_DATASET_PATH", dataset.display().to_string()),
            ("UPLOAD_DIR", upload_dir.display().to_string()),
            ("PREVIEW_CHARS", "40".to_string()),
        ]);
        for (key, value) in overrides {
            vars.insert(*key, value.to_string());
        }
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let extractor = TermExtractor::new(
            Vocabulary::new("skills", DEFAULT_SKILLS).unwrap(),
            Vocabulary::new("qualifications", DEFAULT_QUALIFICATIONS).unwrap(),
        )
        .unwrap();
        let corpus = JobCorpus::load(&config.jobs_dataset_path).unwrap();

        let state = AppState {
            extractor: Arc::new(extractor),
            corpus: CorpusHandle::new(corpus),
            scorer: Arc::new(CoverageScorer::new(config.score_weights, config.default_top_n)),
            store: Arc::new(LocalDocumentStore::new(upload_dir)),
            config,
        };

        Harness {
            router: build_router(state),
            dir,
        }
    }

    fn multipart_body(field: &str, filename: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    fn upload_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload-cv")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn uploaded_files(dir: &Path) -> usize {
        std::fs::read_dir(dir.join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "justapply-api");
        assert_eq!(body["jobs_loaded"], 3);
        assert_eq!(body["storage"], "local");
    }

    #[tokio::test]
    async fn test_upload_extracts_terms_and_stores_file() {
        let h = harness();
        let cv = "Jane Doe\nPython and SQL developer\nBSc Computer Science, going places";
        let (status, body) = send(&h.router, upload_request(multipart_body("file", "cv.txt", cv))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["skills"], json!(["python", "sql"]));
        assert_eq!(body["qualifications"], json!(["bsc"]));
        assert_eq!(body["original_name"], "cv.txt");
        assert_eq!(body["text_preview"], "Jane Doe\nPython and SQL developer\nBSc Co");
        assert!(body["local_path"].as_str().unwrap().ends_with("-cv.txt"));
        assert_eq!(uploaded_files(h.dir.path()), 1);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_bad_request() {
        let h = harness();
        let (status, body) =
            send(&h.router, upload_request(multipart_body("resume", "cv.txt", "Python"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_with_empty_filename_is_bad_request() {
        let h = harness();
        let (status, body) = send(&h.router, upload_request(multipart_body("file", "", "Python"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty filename");
    }

    #[tokio::test]
    async fn test_blank_document_is_rejected_and_not_stored() {
        let h = harness();
        let (status, body) =
            send(&h.router, upload_request(multipart_body("file", "cv.txt", "  \n\t "))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "EMPTY_DOCUMENT");
        assert_eq!(uploaded_files(h.dir.path()), 0);
    }

    #[tokio::test]
    async fn test_legacy_doc_upload_is_unsupported() {
        let h = harness();
        let (status, body) =
            send(&h.router, upload_request(multipart_body("file", "cv.doc", "binary"))).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_content_type_is_error_payload() {
        let h = harness();
        let request = json_request("POST", "/api/upload-cv", json!({ "file": "cv.txt" }));
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_payload_too_large() {
        let h = harness_with(&[("MAX_UPLOAD_BYTES", "256")]);
        let cv = "Python ".repeat(200);
        let (status, body) = send(&h.router, upload_request(multipart_body("file", "cv.txt", &cv))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(uploaded_files(h.dir.path()), 0);
    }

    #[tokio::test]
    async fn test_match_ranks_corpus() {
        let h = harness();
        let request = json_request(
            "POST",
            "/api/match-jobs",
            json!({ "skills": ["Python"], "qualifications": [], "top_n": 2 }),
        );
        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::OK);
        let jobs = body["jobs"].as_array().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0]["id"], "b");
        assert_eq!(jobs[0]["title"], "Python Developer");
        assert_eq!(jobs[0]["company"], "Snake Co");
        assert_eq!(jobs[0]["skill_score"], 1.0);
        assert_eq!(jobs[0]["total_score"], 0.5);
        assert_eq!(jobs[1]["id"], "a");
        assert_eq!(jobs[1]["skill_score"], 0.5);
        assert_eq!(body["metadata"]["total_jobs_loaded"], 3);
        assert_eq!(body["metadata"]["jobs_with_matches"], 2);
        assert_eq!(body["metadata"]["top_n"], 2);
    }

    #[tokio::test]
    async fn test_match_without_terms_is_error_payload() {
        let h = harness();
        let request = json_request("POST", "/api/match-jobs", json!({ "skills": [], "qualifications": [] }));
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_match_body_is_error_payload() {
        let h = harness();
        for payload in [json!({ "skills": "Python" }), json!({ "skills": null })] {
            let request = json_request("POST", "/api/match-jobs", payload);
            let (status, body) = send(&h.router, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "VALIDATION_ERROR");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_match_body_that_is_not_json_is_error_payload() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/api/match-jobs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("skills=Python"))
            .unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_dataset() {
        let h = harness();
        std::fs::write(
            h.dir.path().join("jobs.csv"),
            "title,skills\nRust Engineer,Rust\nGo Engineer,Go\n",
        )
        .unwrap();

        let (status, body) = send(&h.router, json_request("POST", "/api/corpus/reload", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_jobs_loaded"], 2);

        let request = Request::builder().uri("/api/corpus").body(Body::empty()).unwrap();
        let (_, body) = send(&h.router, request).await;
        assert_eq!(body["total_jobs_loaded"], 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_corpus() {
        let h = harness();
        std::fs::write(h.dir.path().join("jobs.csv"), "title,skills\n,Rust\n").unwrap();

        let (status, body) = send(&h.router, json_request("POST", "/api/corpus/reload", json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "CORPUS_UNAVAILABLE");

        let request = Request::builder().uri("/api/corpus").body(Body::empty()).unwrap();
        let (_, body) = send(&h.router, request).await;
        assert_eq!(body["total_jobs_loaded"], 3);
    }
}
