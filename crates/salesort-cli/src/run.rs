//! One reorder run: load, rank, move.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use salesort_core::{build_ranking, load_sales, Event, EventLog, InputFormat};

use crate::orchestrator::{MoveReport, Orchestrator, OrchestratorOptions, RemoteDirectory};

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub collection: String,
    pub file: PathBuf,
    pub format: InputFormat,
    pub delay: Duration,
    pub dry_run: bool,
    pub set_manual: bool,
}

/// Runs the whole pipeline against `directory`.
///
/// Returns `Ok(None)` when the input held no usable lines; nothing is sent
/// to the remote in that case.
pub(crate) async fn run_reorder<D: RemoteDirectory>(
    directory: &D,
    options: &RunOptions,
    log: &EventLog,
) -> anyhow::Result<Option<MoveReport>> {
    let table = load_sales(&options.file, options.format, log)
        .with_context(|| format!("failed to load sales from {}", options.file.display()))?;

    if table.is_empty() {
        log.record(
            &Event::warn("nothing_to_reorder")
                .detail(format!("{} holds no valid sales lines", options.file.display())),
        );
        return Ok(None);
    }

    let ranking = build_ranking(&table);
    for (idx, item) in ranking.iter().enumerate() {
        log.record(
            &Event::debug("ranked")
                .title(item.title.clone())
                .product_id(&item.product_id)
                .detail(format!("rank {}, total_sales {}", idx + 1, item.total_sales)),
        );
    }
    log.record(&Event::info("ranking_built").detail(format!(
        "{} products ranked for collection {}",
        ranking.len(),
        options.collection
    )));

    let orchestrator_options = OrchestratorOptions {
        delay: options.delay,
        dry_run: options.dry_run,
        set_manual: options.set_manual,
    };
    let mut orchestrator = Orchestrator::new(directory, log, orchestrator_options);
    let outcome = orchestrator.run(&options.collection, &ranking).await;
    tracing::debug!(state = %orchestrator.state(), "orchestrator stopped");
    let report = outcome
        .with_context(|| format!("failed to resolve collection {}", options.collection))?;

    let severity_event = if report.failed > 0 || report.rejected > 0 {
        Event::warn("reorder_completed")
    } else {
        Event::info("reorder_completed")
    };
    log.record(&severity_event.detail(report.to_string()));

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use salesort_shopify::AdminClient;

    use super::*;

    fn input_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".jsonl")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write input");
        file
    }

    fn options(file: &tempfile::NamedTempFile) -> RunOptions {
        RunOptions {
            collection: "best-sellers".to_owned(),
            file: file.path().to_path_buf(),
            format: InputFormat::JsonLines,
            delay: Duration::ZERO,
            dry_run: false,
            set_manual: false,
        }
    }

    async fn mount_collection(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/admin/api/2024-10/graphql.json"))
            .and(header("X-Shopify-Access-Token", "shpat_test"))
            .and(body_string_contains("collectionByHandle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "collectionByHandle": {
                        "id": "gid://shopify/Collection/77",
                        "title": "Best Sellers",
                        "sortOrder": "MANUAL"
                    }
                }
            })))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> AdminClient {
        AdminClient::new(&server.uri(), "shpat_test", "2024-10", 5, Duration::ZERO)
            .expect("client builds")
    }

    #[tokio::test]
    async fn example_file_reorders_best_seller_first() {
        let server = MockServer::start().await;
        mount_collection(&server).await;
        Mock::given(method("POST"))
            .and(body_string_contains("collectionReorderProducts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "collectionReorderProducts": {
                        "job": {"id": "gid://shopify/Job/1", "done": true},
                        "userErrors": []
                    }
                }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let file = input_file(concat!(
            r#"{"product_title":"A","product_id":"111","net_items_sold":"5"}"#,
            "\n",
            r#"{"product_title":"B","product_id":"222","net_items_sold":"9"}"#,
            "\n",
            r#"{"product_title":"A","product_id":"111","net_items_sold":"3"}"#,
            "\n",
        ));
        let log = EventLog::console_only();

        let report = run_reorder(&client(&server), &options(&file), &log)
            .await
            .unwrap()
            .expect("a report");

        assert_eq!(report.applied, 2);
        let calls: Vec<&str> = report.calls.iter().map(|id| id.as_str()).collect();
        assert_eq!(calls, ["111", "222"]);
    }

    #[tokio::test]
    async fn empty_input_makes_no_remote_calls() {
        let server = MockServer::start().await;
        let file = input_file("not json\n\n");
        let log = EventLog::console_only();

        let report = run_reorder(&client(&server), &options(&file), &log)
            .await
            .unwrap();

        assert!(report.is_none());
        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_error_before_any_request() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&input_file(""));
        opts.file = dir.path().join("absent.jsonl");

        let err = run_reorder(&client(&server), &opts, &EventLog::console_only())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to load sales"));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unknown_collection_fails_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"collectionByHandle": null}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let file = input_file(
            r#"{"product_title":"A","product_id":"111","net_items_sold":"5"}"#,
        );

        let err = run_reorder(&client(&server), &options(&file), &EventLog::console_only())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("best-sellers"));
    }

    #[tokio::test]
    async fn run_writes_summary_to_log_file() {
        let server = MockServer::start().await;
        mount_collection(&server).await;
        Mock::given(method("POST"))
            .and(body_string_contains("collectionReorderProducts"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path(), chrono::Utc::now()).unwrap();
        let log_path = log.path().unwrap().to_path_buf();
        let file = input_file(
            r#"{"product_title":"A","product_id":"111","net_items_sold":"5"}"#,
        );

        let report = run_reorder(&client(&server), &options(&file), &log)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.failed, 1);
        drop(log);

        let contents = std::fs::read_to_string(log_path).unwrap();
        assert!(contents.contains("move_failed"));
        assert!(contents.contains("reorder_completed"));
        assert!(contents.contains("failed=1"));
    }
}
