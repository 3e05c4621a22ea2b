//! Integration tests for the harvester
//!
//! These tests use wiremock to serve sequence pages and run the full
//! seed, crawl and compact cycle end-to-end.

use oeis_ripple::config::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};
use oeis_ripple::crawler::{crawl, seed};
use oeis_ripple::output::{compact, load_dataset_statistics};
use oeis_ripple::state::FailureStage;
use oeis_ripple::storage::{FrontierStore, FsRecordStore, RecordStore};
use oeis_ripple::{FrontierError, HarvestError, Identifier};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at `base_url` with outputs under `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 4,
            request_timeout_secs: 5,
            progress_interval: 1,
        },
        source: SourceConfig {
            base_url: base_url.to_string(),
            seed_index_path: "/wiki/Index".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            data_dir: dir.join("data").display().to_string(),
            frontier_path: dir.join("list.json").display().to_string(),
            compiled_path: dir.join("compiled.json").display().to_string(),
        },
    }
}

/// A sequence page with the given terms and cross-references
fn sequence_page(terms: &str, name: &str, crossrefs: &[&str]) -> String {
    let anchors: Vec<String> = crossrefs
        .iter()
        .map(|id| format!(r#"<a href="/{}">{}</a>"#, id, id))
        .collect();
    format!(
        r#"<html><body><table><tr>
        <td align="left" valign="top">{}</td>
        </tr></table>
        <tt>{}</tt>
        <div class="Seq SeqK">nonn,easy</div>
        <div class="Seq SeqY">Cf. {}.</div>
        </body></html>"#,
        name,
        terms,
        anchors.join(", ")
    )
}

async fn mount_page(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn ids(tokens: &[&str]) -> BTreeSet<Identifier> {
    tokens
        .iter()
        .map(|t| Identifier::from_token(t).expect("valid identifier"))
        .collect()
}

#[tokio::test]
async fn test_seed_crawl_compact_cycle() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), tmp.path());

    // Seed index referencing one sequence
    Mock::given(method("GET"))
        .and(path("/wiki/Index"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/A000045">Fibonacci</a></body></html>"#),
        )
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "A000045",
        sequence_page(
            "0, 1, 1, 2, 3, 5, 8",
            "Fibonacci numbers: F(n) = F(n-1) + F(n-2) with F(0) = 0 and F(1) = 1.",
            &["A000032", "A000108"],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "A000032",
        sequence_page("2, 1, 3, 4, 7", "Lucas numbers beginning at 2.", &["A000045"]),
    )
    .await;
    mount_page(
        &mock_server,
        "A000108",
        sequence_page(
            "1, 1, 2, 5, 14, 42",
            "Catalan numbers: C(n) = binomial(2n,n)/(n+1).",
            &[],
        ),
    )
    .await;

    let seeded = seed(&config, false).await.expect("Seed failed");
    assert_eq!(seeded, 1);

    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.rounds.len(), 2);
    assert_eq!(report.total_succeeded(), 3);
    assert_eq!(report.total_failed(), 0);

    let frontier = FrontierStore::new(&config.output.frontier_path);
    assert_eq!(
        frontier.load().expect("Failed to load frontier"),
        ids(&["A000032", "A000045", "A000108"])
    );

    let store = FsRecordStore::open(Path::new(&config.output.data_dir)).expect("Failed to open store");
    assert_eq!(store.list().expect("Failed to list").len(), 3);

    let record: serde_json::Value = serde_json::from_slice(
        &std::fs::read(store.path_for(&Identifier::from_token("A000045").unwrap()))
            .expect("Failed to read record"),
    )
    .expect("Record is not JSON");
    assert_eq!(record["id"], "A000045");
    assert_eq!(record["sequence"][6], 8);
    assert_eq!(record["keywords"][1], "easy");

    let compacted = compact(
        Path::new(&config.output.data_dir),
        Path::new(&config.output.compiled_path),
    )
    .expect("Compaction failed");
    assert_eq!(compacted, 3);

    let compiled: Vec<serde_json::Value> = serde_json::from_slice(
        &std::fs::read(&config.output.compiled_path).expect("Failed to read archive"),
    )
    .expect("Archive is not JSON");
    let order: Vec<&str> = compiled
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(order, vec!["A000032", "A000045", "A000108"]);
}

#[tokio::test]
async fn test_second_run_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), tmp.path());

    // Each page may be requested once across both runs
    Mock::given(method("GET"))
        .and(path("/A000001"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sequence_page(
            "1, 1, 1, 2",
            "Number of groups of order n.",
            &["A000002"],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/A000002"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sequence_page(
            "1, 2, 2, 1",
            "Kolakoski sequence of ones and twos.",
            &[],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let frontier = FrontierStore::new(&config.output.frontier_path);
    frontier
        .initialize(&ids(&["A000001"]), false)
        .expect("Failed to write frontier");

    let first = crawl(&config).await.expect("First crawl failed");
    assert_eq!(first.total_succeeded(), 2);

    let second = crawl(&config).await.expect("Second crawl failed");
    assert_eq!(second.total_succeeded(), 0);
    assert_eq!(second.total_skipped(), 2);
    assert_eq!(second.rounds.len(), 1);
}

#[tokio::test]
async fn test_failures_are_reported_and_retried_next_run() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), tmp.path());

    mount_page(
        &mock_server,
        "A000001",
        sequence_page("1, 1, 1, 2", "Number of groups of order n.", &["A000404", "A000002"]),
    )
    .await;
    mount_page(
        &mock_server,
        "A000002",
        sequence_page("1, 2, 2, 1", "Kolakoski sequence of ones and twos.", &[]),
    )
    .await;
    // A000404 is not mounted, so it answers 404

    let frontier = FrontierStore::new(&config.output.frontier_path);
    frontier
        .initialize(&ids(&["A000001"]), false)
        .expect("Failed to write frontier");

    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.total_succeeded(), 2);
    assert_eq!(report.total_failed(), 1);
    assert_eq!(
        report.failures_by_stage().get(&FailureStage::Fetch),
        Some(&1)
    );

    // The failed identifier stays known, so it shows up as pending
    let store = FsRecordStore::open(Path::new(&config.output.data_dir)).expect("Failed to open store");
    let stats = load_dataset_statistics(&frontier, &store).expect("Failed to load stats");
    assert_eq!(stats.known, 3);
    assert_eq!(stats.materialized, 2);
    assert_eq!(stats.pending, 1);

    mount_page(
        &mock_server,
        "A000404",
        sequence_page("2, 5, 8, 10", "Numbers that are the sum of 2 nonzero squares.", &[]),
    )
    .await;

    let retry = crawl(&config).await.expect("Retry crawl failed");
    assert_eq!(retry.total_succeeded(), 1);
    assert_eq!(retry.total_failed(), 0);
}

#[tokio::test]
async fn test_crawl_without_frontier_fails_fast() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), tmp.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&config).await;
    assert!(matches!(
        result,
        Err(HarvestError::Frontier(FrontierError::NotFound(_)))
    ));
    // The data directory is still prepared
    assert!(Path::new(&config.output.data_dir).is_dir());
}
