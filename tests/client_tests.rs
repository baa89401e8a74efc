/// REST client tests against a throwaway `tiny_http` backend.
///
/// Each test starts a server on an ephemeral port that answers a fixed
/// script of responses and reports back what it received.
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use scorelens::api::types::ExportRequest;
use scorelens::api::{ApiClient, ApiError, DEFAULT_DETAIL};
use scorelens::filter::FilterConditions;
use tiny_http::{Response, Server};

/// A request as the mock backend saw it.
struct Seen {
    method: String,
    url: String,
    body: String,
    content_type: Option<String>,
}

fn mock(script: Vec<(u16, &'static str)>) -> (ApiClient, mpsc::Receiver<Seen>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in script {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut received = String::new();
            let _ = request.as_reader().read_to_string(&mut received);
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.to_string());
            let _ = tx.send(Seen {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: received,
                content_type,
            });
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });

    let client = ApiClient::new(&format!("http://localhost:{port}/"), Duration::from_secs(5));
    (client, rx)
}

const RECORDS: &str = r#"{"status": "success", "data": [
    {"id": 1, "created_at": "2025-01-15 10:00:00", "accuracy_score": 85,
     "completeness_score": 80, "relevance_score": 90, "clarity_score": 75,
     "total_score": 82.5, "feedback": "ok"}
]}"#;

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[test]
fn list_scores_sends_only_present_filter_fields() {
    let (client, seen) = mock(vec![(200, RECORDS)]);
    let filter = FilterConditions {
        min_total_score: Some(60.0),
        keyword: Some("steps".to_string()),
        ..Default::default()
    };

    let records = client.list_scores(&filter).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[0].total_score, 82.5);

    let req = seen.recv().unwrap();
    assert_eq!(req.method, "GET");
    assert!(req.url.starts_with("/api/scores?"), "{}", req.url);
    assert!(req.url.contains("min_total_score=60"));
    assert!(req.url.contains("keyword=steps"));
    assert!(!req.url.contains("max_total_score"));
}

#[test]
fn invalid_filter_is_not_sent() {
    let (client, _seen) = mock(vec![]);
    let filter = FilterConditions {
        min_total_score: Some(90.0),
        max_total_score: Some(10.0),
        ..Default::default()
    };
    assert!(matches!(client.list_scores(&filter), Err(ApiError::Filter(_))));
}

#[test]
fn out_of_range_record_is_rejected() {
    let (client, _seen) = mock(vec![(
        200,
        r#"[{"id": 1, "created_at": "2025-01-15", "accuracy_score": 120,
             "completeness_score": 80, "relevance_score": 90, "clarity_score": 75,
             "total_score": 82.5}]"#,
    )]);
    let err = client.list_scores(&FilterConditions::default()).unwrap_err();
    assert!(matches!(err, ApiError::InvalidRecord(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn backend_detail_surfaces_verbatim() {
    let (client, _seen) = mock(vec![(400, r#"{"detail": "开始日期不能晚于结束日期"}"#)]);
    let err = client.list_scores(&FilterConditions::default()).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "开始日期不能晚于结束日期");
}

#[test]
fn error_without_detail_uses_default_message() {
    let (client, _seen) = mock(vec![(502, "Bad Gateway")]);
    let err = client.list_files().unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), DEFAULT_DETAIL);
}

#[test]
fn success_status_with_error_body_is_rejected() {
    let (client, seen) = mock(vec![(200, r#"{"status": "error", "message": "file is in use"}"#)]);
    let err = client.delete_file("12").unwrap_err();
    match err {
        ApiError::Rejected { detail, .. } => assert_eq!(detail, "file is in use"),
        other => panic!("expected Rejected, got {other:?}"),
    }
    let req = seen.recv().unwrap();
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.url, "/api/files/12");
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500));
    let err = client.list_files().unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
    assert_eq!(err.status(), None);
}

// ---------------------------------------------------------------------------
// Files and export
// ---------------------------------------------------------------------------

#[test]
fn list_files_accepts_bare_arrays() {
    let (client, _seen) = mock(vec![(
        200,
        r#"[{"file_id": "a1", "file_name": "faq.pdf", "file_type": "pdf", "file_size": 1024}]"#,
    )]);
    let files = client.list_files().unwrap();
    assert_eq!(files[0].id, "a1");
    assert_eq!(files[0].filename, "faq.pdf");
    assert_eq!(files[0].filesize, Some(1024));
}

#[test]
fn upload_sends_multipart_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "question and answer").unwrap();

    let (client, seen) = mock(vec![(
        200,
        r#"{"status": "success", "data": {"id": 5, "filename": "notes.txt"}}"#,
    )]);
    let file = client.upload_file(&path).unwrap();
    assert_eq!(file.id, "5");

    let req = seen.recv().unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.url, "/api/upload");
    assert!(req.content_type.unwrap().starts_with("multipart/form-data; boundary="));
    assert!(req.body.contains(r#"name="file"; filename="notes.txt""#));
    assert!(req.body.contains("question and answer"));
}

#[test]
fn process_passes_file_id_as_query() {
    let (client, seen) = mock(vec![(
        200,
        r#"{"status": "success", "segments_count": 12, "task_id": "t-1"}"#,
    )]);
    let result = client.process_file("5").unwrap();
    assert_eq!(result.segments_count, Some(12));
    assert_eq!(result.task_id.as_deref(), Some("t-1"));
    assert_eq!(seen.recv().unwrap().url, "/api/split?file_id=5");
}

#[test]
fn export_posts_json_body() {
    let (client, seen) = mock(vec![(
        200,
        r#"{"status": "success", "data": {"export_path": "exports/alpaca.json", "total_qa_pairs": 40}}"#,
    )]);
    let artifact = client.export_dataset(&ExportRequest::default()).unwrap();
    assert_eq!(artifact.export_path, "exports/alpaca.json");

    let body: serde_json::Value = serde_json::from_str(&seen.recv().unwrap().body).unwrap();
    assert_eq!(body, serde_json::json!({"format": "alpaca", "include_metadata": true}));
}

// ---------------------------------------------------------------------------
// Saved filters
// ---------------------------------------------------------------------------

#[test]
fn list_filters_keeps_good_entries() {
    let (client, _seen) = mock(vec![(
        200,
        r#"{"success": true, "data": [
            {"id": 1, "name": "high", "filter_conditions": "{\"min_total_score\": 80}"},
            {"id": 2, "name": "bad", "filter_conditions": "oops"}
        ]}"#,
    )]);
    let list = client.list_filters().unwrap();
    assert_eq!(list.filters.len(), 1);
    assert_eq!(list.filters[0].conditions.min_total_score, Some(80.0));
    assert_eq!(list.rejected.len(), 1);
}

#[test]
fn save_filter_sends_conditions_as_json_string() {
    let (client, seen) = mock(vec![(200, r#"{"success": true}"#)]);
    let conditions = FilterConditions {
        min_clarity_score: Some(55.0),
        ..Default::default()
    };
    client.save_filter("clear answers", &conditions).unwrap();

    let body: serde_json::Value = serde_json::from_str(&seen.recv().unwrap().body).unwrap();
    assert_eq!(body["name"], "clear answers");
    let encoded = body["filter_conditions"].as_str().unwrap();
    assert_eq!(FilterConditions::from_json(encoded).unwrap(), conditions);
}

#[test]
fn failed_save_reports_detail() {
    let (client, _seen) = mock(vec![(200, r#"{"success": false, "detail": "name already exists"}"#)]);
    let err = client
        .save_filter("dup", &FilterConditions::default())
        .unwrap_err();
    assert!(err.to_string().ends_with("name already exists"));
}
