//! End-to-end tests for seal_file(): hash a real file, register it with a
//! wiremock seal service and check what lands in the seal log.

use std::path::PathBuf;

use sealfile::api::SealClient;
use sealfile::seal::{seal_file, SealReceipt};
use sealfile::seal_log::SealLog;
use sealfile::{Config, SealError};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let p = self.dir.path().join(name);
        std::fs::write(&p, contents).unwrap();
        p
    }

    fn log(&self) -> SealLog {
        SealLog::new(self.dir.path().join("seallog.csv"))
    }

    /// Settings file as the operator would write it, loaded the normal way.
    fn config(&self, server: &MockServer) -> Config {
        let cfg = self.write(
            "sealfile.cfg",
            format!("apikey: test-key\nbaseurl: {}/register\ntimeout: 5\n", server.uri()).as_bytes(),
        );
        Config::load(&cfg).unwrap()
    }
}

async fn run_seal(config: Config, log: SealLog, file: PathBuf) -> Result<SealReceipt, SealError> {
    tokio::task::spawn_blocking(move || {
        let client = SealClient::new(&config)?;
        seal_file(&client, &log, &file)
    })
    .await
    .unwrap()
}

fn ok_body(id: &str) -> serde_json::Value {
    serde_json::json!({
        "maxSupportedAPIVersion": 6,
        "minSupportedAPIVersion": 6,
        "documents": [{ "retrievalId": id }],
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn hello_file_is_sealed_and_logged() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let file = ws.write("demo.txt", b"hello");

    Mock::given(method("POST"))
        .and(body_string_contains(format!("hashes={HELLO_SHA256}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("r-1")))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = run_seal(ws.config(&server), ws.log(), file.clone())
        .await
        .unwrap();
    assert_eq!(receipt.digest.to_hex(), HELLO_SHA256);
    assert_eq!(receipt.retrieval_id, "r-1");

    let text = std::fs::read_to_string(ws.log().path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let expected_suffix = format!(",r-1,{}", file.display());
    assert!(
        lines[0].ends_with(&expected_suffix),
        "row {:?} should end with {:?}",
        lines[0],
        expected_suffix
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_seals_append() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let a = ws.write("a.txt", b"alpha");
    let b = ws.write("b.txt", b"beta");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("r-same")))
        .expect(2)
        .mount(&server)
        .await;

    let first = run_seal(ws.config(&server), ws.log(), a).await.unwrap();
    let second = run_seal(ws.config(&server), ws.log(), b).await.unwrap();
    assert_ne!(first.digest, second.digest);

    let rows = ws.log().entries().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0][2].ends_with("a.txt"));
    assert!(rows[1][2].ends_with("b.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_registration_writes_no_log_entry() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let file = ws.write("demo.txt", b"hello");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = run_seal(ws.config(&server), ws.log(), file).await.unwrap_err();
    assert!(matches!(err, SealError::Status { status: 503 }));
    assert!(!ws.log().path().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_input_file_aborts_before_registering() {
    let server = MockServer::start().await;
    let ws = Workspace::new();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("never")))
        .expect(0)
        .mount(&server)
        .await;

    let missing = ws.dir.path().join("absent.txt");
    let err = run_seal(ws.config(&server), ws.log(), missing).await.unwrap_err();
    assert!(matches!(err, SealError::Io { .. }));
    assert!(ws.log().entries().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_retrieval_id_writes_no_log_entry() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let file = ws.write("demo.txt", b"hello");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("")))
        .mount(&server)
        .await;

    let err = run_seal(ws.config(&server), ws.log(), file).await.unwrap_err();
    assert!(matches!(err, SealError::EmptyRetrievalId));
    assert!(!ws.log().path().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn log_failure_keeps_the_retrieval_id() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let file = ws.write("demo.txt", b"hello");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("r-kept")))
        .expect(1)
        .mount(&server)
        .await;

    let log = SealLog::new(ws.dir.path().join("missing-dir").join("seallog.csv"));
    let err = run_seal(ws.config(&server), log, file).await.unwrap_err();
    match &err {
        SealError::LogAppend { retrieval_id, .. } => assert_eq!(retrieval_id, "r-kept"),
        other => panic!("expected LogAppend, got {other:?}"),
    }
    assert!(err.to_string().contains("r-kept"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn non_utf8_file_name_is_rejected_before_registering() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let server = MockServer::start().await;
    let ws = Workspace::new();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("never")))
        .expect(0)
        .mount(&server)
        .await;

    let file = ws.dir.path().join(OsStr::from_bytes(b"bad\xff.txt"));
    let err = run_seal(ws.config(&server), ws.log(), file).await.unwrap_err();
    assert!(matches!(err, SealError::NonUtf8Path(_)));
    assert!(!ws.log().path().exists());
}
