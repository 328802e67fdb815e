//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the board and test the full
//! traversal end-to-end.

use macshop_harvest::config::{Config, RateConfig};
use macshop_harvest::crawler::{harvest, PaginationController, RateGovernor, ResilientClient};
use macshop_harvest::output::{load_snapshot, persist_if_safe, JsonSnapshotWriter, PersistOutcome};
use macshop_harvest::{Category, CrawlPhase, HarvestError, Price, Termination};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = "/bbs/MacShop/index.html";
const INDEX_OLDER: &str = "/bbs/MacShop/index3999.html";

/// Creates a test configuration pointing at the mock board
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.board_url = format!("{}{}", server.uri(), INDEX);
    config.client.max_attempts = 3;
    config.client.backoff_base_ms = 1; // Very short for testing
    config.client.timeout_secs = 5;
    config.client.user_agents = vec!["TestAgent/1.0".to_string()];
    config.rate = RateConfig::zero();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

fn entry(href: &str, title: &str, date: &str) -> String {
    format!(
        r#"<div class="r-ent"><div class="nrec"></div>
        <div class="title"><a href="{}">{}</a></div>
        <div class="meta"><div class="author">seller</div><div class="date">{}</div></div></div>"#,
        href, title, date
    )
}

fn listing(entries: &[String], previous: Option<&str>) -> String {
    let paging = match previous {
        Some(href) => format!(r#"<a class="btn wide" href="{}">‹ 上頁</a>"#, href),
        None => r#"<a class="btn wide disabled">‹ 上頁</a>"#.to_string(),
    };
    format!(
        r#"<html><head><title>看板 MacShop 文章列表 - 批踢踢實業坊</title></head><body>
        <div class="btn-group btn-group-paging">{}</div>
        <div class="r-list-container">{}</div></body></html>"#,
        paging,
        entries.concat()
    )
}

fn post(content: &str) -> String {
    format!(
        r#"<html><head><title>post</title></head><body>
        <div id="main-content" class="bbs-screen bbs-content">{}</div></body></html>"#,
        content
    )
}

fn challenge() -> String {
    r#"<html><head><title>Just a moment...</title></head><body>Checking your browser</body></html>"#
        .to_string()
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Page 1: three sale posts (two classifiable, one not) plus noise; page 2: one classifiable post
async fn mount_two_page_board(server: &MockServer) {
    mount_page(
        server,
        INDEX,
        listing(
            &[
                entry("/bbs/MacShop/M.1.html", "[販售] 台北 iPhone 15 Pro 256G", "11/15"),
                entry("/bbs/MacShop/M.2.html", "[販售] 羅技 MX Keys", "11/15"),
                entry("/bbs/MacShop/M.3.html", "Re: [販售] 台北 iPhone 15 Pro 256G", "11/15"),
                entry("/bbs/MacShop/M.4.html", "[收購] MacBook Air", "11/15"),
                entry("/bbs/MacShop/M.5.html", "[販售] 高雄 MacBook Air M2", "11/16"),
            ],
            Some(INDEX_OLDER),
        ),
    )
    .await;

    mount_page(
        server,
        INDEX_OLDER,
        listing(
            &[entry("/bbs/MacShop/M.6.html", "[販售] AirPods Pro 2", "11/14")],
            None,
        ),
    )
    .await;

    mount_page(server, "/bbs/MacShop/M.1.html", post("[欲售價格]: $3,300")).await;
    mount_page(server, "/bbs/MacShop/M.5.html", post("[售價] 25,000")).await;
    mount_page(server, "/bbs/MacShop/M.6.html", post("[售價] 50")).await;
}

#[tokio::test]
async fn test_two_page_crawl() {
    let mock_server = MockServer::start().await;
    mount_two_page_board(&mock_server).await;

    let config = create_test_config(&mock_server);
    let mut controller = PaginationController::new(&config).expect("Failed to create controller");
    let report = controller.run().await.expect("Harvest failed");

    assert!(matches!(report.termination, Termination::NoPreviousPage));
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.candidates_skipped, 0);
    assert_eq!(controller.phase(), CrawlPhase::Terminated);

    let records = report.result.records();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].category(), Category::IPhone);
    assert_eq!(records[0].location(), "台北");
    assert_eq!(records[0].price(), Price::Amount(3300));
    assert_eq!(
        records[0].link(),
        format!("{}/bbs/MacShop/M.1.html", mock_server.uri())
    );

    assert_eq!(records[1].category(), Category::MacBook);
    assert_eq!(records[1].price().to_string(), "$25000");

    assert_eq!(records[2].category(), Category::AirPods);
    assert_eq!(records[2].location(), "");
    assert_eq!(records[2].price(), Price::Pending);
}

#[tokio::test]
async fn test_controller_runs_once() {
    let mock_server = MockServer::start().await;
    mount_two_page_board(&mock_server).await;

    let config = create_test_config(&mock_server);
    let client = ResilientClient::new(&config.client).expect("Failed to build client");
    let mut controller = PaginationController::with_parts(&config, client, RateGovernor::unthrottled())
        .expect("Failed to create controller");

    controller.run().await.expect("Harvest failed");
    let second = controller.run().await;

    assert!(matches!(
        second,
        Err(HarvestError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_challenge_page_stops_traversal() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX,
        listing(
            &[entry("/bbs/MacShop/M.1.html", "[販售] iPad mini 6", "11/15")],
            Some(INDEX_OLDER),
        ),
    )
    .await;
    mount_page(&mock_server, "/bbs/MacShop/M.1.html", post("[售價] 9,000")).await;

    // The challenge page carries a sale post that must not be harvested
    Mock::given(method("GET"))
        .and(path(INDEX_OLDER))
        .respond_with(
            ResponseTemplate::new(403).set_body_raw(
                format!(
                    "{}{}",
                    challenge(),
                    entry("/bbs/MacShop/M.2.html", "[販售] iPhone 13", "11/14")
                )
                .into_bytes(),
                "text/html; charset=utf-8",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bbs/MacShop/M.2.html"))
        .respond_with(html(post("[售價] 12,000")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(report.termination.is_blocked());
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.result.len(), 1);
    assert_eq!(report.result.records()[0].category(), Category::IPad);
}

#[tokio::test]
async fn test_challenge_on_first_page_yields_nothing() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, INDEX, challenge()).await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(report.termination.is_blocked());
    assert_eq!(report.pages_fetched, 0);
    assert!(report.result.is_empty());
}

#[tokio::test]
async fn test_challenge_served_as_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_raw(challenge().into_bytes(), "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(report.termination.is_blocked());
    assert!(matches!(
        &report.termination,
        Termination::Blocked { title, .. } if title == "Just a moment..."
    ));
    assert_eq!(report.pages_fetched, 0);
    assert!(report.result.is_empty());
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        INDEX,
        listing(
            &[entry("/bbs/MacShop/M.1.html", "[販售] HomePod mini", "11/15")],
            None,
        ),
    )
    .await;
    mount_page(&mock_server, "/bbs/MacShop/M.1.html", post("[售價] 2,000")).await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(report.termination.is_clean());
    assert_eq!(report.result.len(), 1);
    assert_eq!(report.result.records()[0].price(), Price::Amount(2000));
}

#[tokio::test]
async fn test_exhausted_retries_abort() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(matches!(
        report.termination,
        Termination::FetchFailed(HarvestError::RetriesExhausted { attempts: 3, .. })
    ));
    assert!(report.result.is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(matches!(
        report.termination,
        Termination::FetchFailed(HarvestError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_missing_detail_page_is_pending() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX,
        listing(
            &[entry("/bbs/MacShop/M.1.html", "[販售] Apple Watch S9", "11/15")],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bbs/MacShop/M.1.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert_eq!(report.result.len(), 1);
    assert_eq!(report.result.records()[0].price(), Price::Pending);
}

#[tokio::test]
async fn test_page_budget_limits_traversal() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX,
        listing(
            &[entry("/bbs/MacShop/M.1.html", "[販售] AirTag 四入", "11/15")],
            Some(INDEX_OLDER),
        ),
    )
    .await;
    mount_page(&mock_server, "/bbs/MacShop/M.1.html", post("[售價] 3,000")).await;
    Mock::given(method("GET"))
        .and(path(INDEX_OLDER))
        .respond_with(html(listing(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.crawler.page_budget = 1;

    let report = harvest(&config).await.expect("Harvest failed");

    assert!(matches!(report.termination, Termination::PageBudgetExhausted));
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.result.len(), 1);
}

#[tokio::test]
async fn test_title_prices_without_detail_fetches() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX,
        listing(
            &[entry(
                "/bbs/MacShop/M.1.html",
                "[販售] 台中 iPhone 14 $18,000",
                "11/15",
            )],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bbs/MacShop/M.1.html"))
        .respond_with(html(post("[售價] 17,000")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.crawler.resolve_details = false;

    let report = harvest(&config).await.expect("Harvest failed");

    assert_eq!(report.result.records()[0].price(), Price::Amount(18000));
}

#[tokio::test]
async fn test_requests_carry_pool_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(html(listing(&[], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");

    assert!(report.termination.is_clean());
    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_empty_harvest_keeps_previous_snapshot() {
    let mock_server = MockServer::start().await;
    mount_two_page_board(&mock_server).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let snapshot_path = dir.path().join("data.json");
    let mut writer = JsonSnapshotWriter::new(&snapshot_path);

    // First run fills the snapshot
    let report = harvest(&create_test_config(&mock_server))
        .await
        .expect("Harvest failed");
    assert_eq!(
        persist_if_safe(report.result, &mut writer).expect("Write failed"),
        PersistOutcome::Written(3)
    );
    let before = std::fs::read(&snapshot_path).expect("Failed to read snapshot");

    // Second run is blocked and yields nothing
    let blocked_server = MockServer::start().await;
    mount_page(&blocked_server, INDEX, challenge()).await;
    let report = harvest(&create_test_config(&blocked_server))
        .await
        .expect("Harvest failed");
    assert_eq!(
        persist_if_safe(report.result, &mut writer).expect("Write failed"),
        PersistOutcome::Skipped
    );

    let after = std::fs::read(&snapshot_path).expect("Failed to read snapshot");
    assert_eq!(before, after);

    let snapshot = load_snapshot(&snapshot_path).expect("Failed to load snapshot");
    assert_eq!(snapshot.data.len(), 3);
}
