//! End-to-end crawls against a mock reading room.

use std::path::{Path, PathBuf};
use std::time::Duration;

use foia_harvest::schedule::run_periodically;
use foia_harvest::{
    CandidateLink, DateKey, HarvestConfig, HarvestError, HarvestResult, Harvester, LinkOutcome,
    PageTextExtractor,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────── helpers ───────────────────────

/// Treats the downloaded file as plain text.
struct BodyAsText;

impl PageTextExtractor for BodyAsText {
    fn first_page_text(&self, path: &Path) -> HarvestResult<String> {
        Ok(String::from_utf8_lossy(&std::fs::read(path)?).into_owned())
    }
}

struct Unreadable;

impl PageTextExtractor for Unreadable {
    fn first_page_text(&self, path: &Path) -> HarvestResult<String> {
        Err(HarvestError::EmptyPdf(path.to_path_buf()))
    }
}

fn fixed_today() -> DateKey {
    DateKey::new(2030, 1).unwrap()
}

const PAGE_0: &str = r#"
<html><body>
  <nav><a href="/foia">FOIA</a><a href="/foia/contact-center">Contact Center Info</a></nav>
  <ul>
    <li><a href="/files/may.pdf">Contact Center Traveler Complaints Report May 2020</a></li>
    <li><a href="/files/report_septermber.pdf">Contact Center Traveler Complaints Report Septermber</a></li>
    <li><a href="/files/undated.pdf">Contact Center Traveler Complaints Report</a></li>
    <li><a href="/files/annual.pdf">Annual FOIA Report May 2020</a></li>
  </ul>
</body></html>
"#;

const PAGE_1: &str = r#"
<html><body>
  <ul>
    <li><a href="files/june.pdf">Contact Center Traveler Complaints Report June 2021</a></li>
    <li><a href="/files/undated-copy.pdf">Contact Center Report</a></li>
  </ul>
</body></html>
"#;

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/foia/readingroom"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_doc(server: &MockServer, doc_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(doc_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

fn config(server: &MockServer, dir: &TempDir, pages: u32) -> HarvestConfig {
    let mut cfg = HarvestConfig {
        base_url: format!("{}/foia/readingroom", server.uri()),
        output_dir: dir.path().join("pdfs"),
        file_prefix: "report".into(),
        pages,
        timeout_ms: 5_000,
        max_retries: 0,
        ..HarvestConfig::default()
    };
    cfg.title_overrides.insert(
        format!("{}/files/report_septermber.pdf", server.uri()),
        "September 2019".into(),
    );
    cfg
}

fn output_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ─────────────────────── tests ───────────────────────

#[tokio::test]
async fn test_full_crawl_then_idempotent_rerun() {
    let server = MockServer::start().await;
    mount_page(&server, "0", PAGE_0).await;
    mount_page(&server, "1", PAGE_1).await;

    mount_doc(&server, "/files/may.pdf", "May report", 1).await;
    mount_doc(&server, "/files/report_septermber.pdf", "September report", 1).await;
    mount_doc(&server, "/foia/files/june.pdf", "June report", 1).await;
    // Undated documents are fetched on every run to learn their month.
    mount_doc(&server, "/files/undated.pdf", "Reporting period: 04/2018", 2).await;
    mount_doc(&server, "/files/undated-copy.pdf", "Period 04/2018 (reissued)", 2).await;
    mount_doc(&server, "/files/annual.pdf", "never fetched", 0).await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 2))
        .unwrap()
        .with_extractor(BodyAsText)
        .with_clock(fixed_today);

    let first = harvester.run().await.unwrap();
    assert_eq!(first.pages_checked, 2);
    assert_eq!(first.candidates, 5);
    assert_eq!(first.saved, 3);
    assert_eq!(first.fallback_saved, 1);
    assert_eq!(first.fallback_discarded, 1);
    assert_eq!(first.defaulted_dates, 0);

    let out = dir.path().join("pdfs");
    assert_eq!(
        output_files(&out),
        vec![
            "report-2018-04.pdf",
            "report-2019-09.pdf",
            "report-2020-05.pdf",
            "report-2021-06.pdf",
        ]
    );
    assert_eq!(
        std::fs::read_to_string(out.join("report-2018-04.pdf")).unwrap(),
        "Reporting period: 04/2018"
    );

    let second = harvester.run().await.unwrap();
    assert_eq!(second.files_written(), 0);
    assert_eq!(second.already_present, 3);
    assert_eq!(second.fallback_discarded, 2);
    assert_eq!(output_files(&out).len(), 4);
}

#[tokio::test]
async fn test_unreadable_document_files_under_current_month() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        r#"<a href="/files/odd.pdf">Contact Center Complaints</a>"#,
    )
    .await;
    mount_doc(&server, "/files/odd.pdf", "garbage", 1).await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 1))
        .unwrap()
        .with_extractor(Unreadable)
        .with_clock(fixed_today);

    let summary = harvester.run().await.unwrap();
    assert_eq!(summary.fallback_saved, 1);
    assert_eq!(summary.defaulted_dates, 1);
    assert_eq!(
        output_files(&dir.path().join("pdfs")),
        vec!["report-2030-01.pdf"]
    );
}

#[tokio::test]
async fn test_filter_skips_without_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 1)).unwrap();

    let html_link = CandidateLink {
        visible_text: "Contact Center Traveler Complaints Report May 2020".into(),
        target_url: "/files/may.html".into(),
    };
    let other_pdf = CandidateLink {
        visible_text: "Budget Report May 2020".into(),
        target_url: "/files/budget.pdf".into(),
    };

    assert_eq!(
        harvester.process_link(&html_link).await.unwrap(),
        LinkOutcome::Filtered
    );
    assert_eq!(
        harvester.process_link(&other_pdf).await.unwrap(),
        LinkOutcome::Filtered
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_destination_skips_download() {
    let server = MockServer::start().await;
    mount_doc(&server, "/files/may.pdf", "new copy", 0).await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 1)).unwrap();
    harvester.naming().ensure_dir().unwrap();
    let dest = harvester.naming().destination(DateKey::new(2020, 5).unwrap());
    std::fs::write(&dest, "old copy").unwrap();

    let link = CandidateLink {
        visible_text: "Contact Center Traveler Complaints Report May 2020".into(),
        target_url: "/files/may.pdf".into(),
    };
    assert_eq!(
        harvester.process_link(&link).await.unwrap(),
        LinkOutcome::AlreadyPresent(dest.clone())
    );
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old copy");
}

#[tokio::test]
async fn test_listing_failure_halts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foia/readingroom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 3)).unwrap();
    let err = harvester.run().await.unwrap_err();
    assert!(matches!(err, HarvestError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_document_failure_halts_run() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        r#"<a href="/files/gone.pdf">Contact Center Report March 2022</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 1)).unwrap();
    let err = harvester.run().await.unwrap_err();
    assert!(matches!(err, HarvestError::Status { status: 404, .. }));
    assert!(output_files(&dir.path().join("pdfs")).is_empty());
}

#[tokio::test]
async fn test_stop_on_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "0", PAGE_1).await;
    mount_page(&server, "1", "<html><body><p>No results</p></body></html>").await;
    mount_doc(&server, "/foia/files/june.pdf", "June report", 1).await;
    mount_doc(&server, "/files/undated-copy.pdf", "Period 04/2018", 1).await;

    let dir = TempDir::new().unwrap();
    let mut cfg = config(&server, &dir, 10);
    cfg.stop_on_empty_page = true;
    let harvester = Harvester::new(cfg).unwrap().with_extractor(BodyAsText);

    let summary = harvester.run().await.unwrap();
    assert_eq!(summary.pages_checked, 2);
    assert_eq!(summary.files_written(), 2);
}

#[tokio::test]
async fn test_periodic_mode_runs_then_stops() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        r#"<a href="/files/may.pdf">Contact Center Report May 2020</a>"#,
    )
    .await;
    mount_doc(&server, "/files/may.pdf", "May report", 1).await;

    let dir = TempDir::new().unwrap();
    let harvester = Harvester::new(config(&server, &dir, 1)).unwrap();

    let runs = run_periodically(
        &harvester,
        Duration::from_secs(3600),
        tokio::time::sleep(Duration::from_millis(500)),
    )
    .await;

    assert_eq!(runs, 1);
    let saved: PathBuf = dir.path().join("pdfs/report-2020-05.pdf");
    assert!(saved.exists());
}
