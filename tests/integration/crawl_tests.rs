//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small fake catalog and run the full
//! crawl cycle end-to-end into a real CSV dataset and image directory.

use event_harvester::config::{Config, FetcherKind, Location};
use event_harvester::crawler::Orchestrator;
use event_harvester::record::FIELD_NAMES;
use event_harvester::storage::count_rows;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/d/united-kingdom--london/business--events/";
const PRICE_CLASS: &str = "DiscoverHorizontalEventCard-module__priceWrapper___3rOUY";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir, page_count: u32) -> Config {
    let mut config = Config {
        locations: vec![Location {
            country: "united-kingdom".to_string(),
            cities: vec!["london".to_string()],
        }],
        categories: vec!["business".to_string()],
        page_count,
        ..Config::default()
    };
    config.crawler.base_url = base_url.to_string();
    config.crawler.fetcher = FetcherKind::Http;
    config.crawler.listing_settle_ms = 0;
    config.crawler.detail_settle_ms = 0;
    config.output.dataset_path = dir.path().join("events.csv").display().to_string();
    config.output.image_dir = dir.path().join("images").display().to_string();
    config
}

fn listing_page(links: &[String]) -> String {
    let cards: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<div class="event-card">
                    <a href="{}">Event</a>
                    <div class="{}">From £12.50</div>
                </div>"#,
                link, PRICE_CLASS
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

fn detail_page(name: &str, image: Option<&str>) -> String {
    let meta = image
        .map(|src| format!(r#"<meta property="og:image" content="{}">"#, src))
        .unwrap_or_default();
    format!(
        r#"<html><head>{}</head><body>
            <h1>{}</h1>
            <span class="date-info__full-datetime">Thu, Oct 9 7:00 PM</span>
            <div class="has-user-generated-content event-description"><p>Talks.</p><p>Drinks.</p></div>
            <div class="location-info__address"><p>1 Canal St</p></div>
            <div class="descriptive-organizer-info-mobile__name"><a>Organized by City Club</a></div>
        </body></html>"#,
        meta, name
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_dataset(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open dataset");
    reader
        .records()
        .map(|r| r.expect("Bad row").iter().map(String::from).collect())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_listing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let new_link = format!("{}/e/founders-night-1", base_url);

    // The same event appears twice on the page; only the first is processed
    mount_listing(
        &mock_server,
        1,
        listing_page(&[new_link.clone(), new_link.clone()]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/e/founders-night-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "Founders Night",
            Some(&format!("{}/img/founders.jpg", base_url)),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/founders.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8\xffjpeg".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir, 1);
    let mut orchestrator = Orchestrator::from_config(&config)
        .await
        .expect("Failed to build crawler");
    let stats = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(stats.records_written, 1);
    assert_eq!(stats.duplicates_skipped, 1);
    assert_eq!(stats.assets_saved, 1);

    let dataset = Path::new(&config.output.dataset_path);
    let rows = read_dataset(dataset);
    assert_eq!(rows.len(), 2, "header plus one data row");
    assert_eq!(rows[0], FIELD_NAMES.to_vec());

    let row = &rows[1];
    assert_eq!(row[0], "Founders Night");
    assert_eq!(row[1], "Talks. Drinks.");
    assert_eq!(row[2], "Thu, Oct 9 7:00 PM");
    assert_eq!(row[3], "1 Canal St");
    assert_eq!(row[4], "City Club");
    assert_eq!(row[5], "From £12.50");
    assert_eq!(row[6], "Thu,_Oct_9_7_00_PM_Founders Night.jpg");
    assert_eq!(row[7], "united-kingdom");
    assert_eq!(row[8], "london");
    assert_eq!(row[9], "business");
    assert_eq!(row[10], "1");

    let image = Path::new(&config.output.image_dir).join(&row[6]);
    assert_eq!(std::fs::read(image).unwrap(), b"\xff\xd8\xffjpeg");
}

#[tokio::test]
async fn test_failed_detail_is_skipped_and_others_persist() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let links: Vec<String> = (1..=3)
        .map(|i| format!("{}/e/event-{}", base_url, i))
        .collect();
    mount_listing(&mock_server, 1, listing_page(&links)).await;

    for (i, status) in [(1, 200), (2, 500), (3, 200)] {
        Mock::given(method("GET"))
            .and(path(format!("/e/event-{}", i)))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_string(detail_page(&format!("Event {}", i), None)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&base_url, &dir, 1);
    let mut orchestrator = Orchestrator::from_config(&config).await.unwrap();
    let stats = orchestrator.run().await.unwrap();

    assert_eq!(stats.candidate_failures, 1);
    assert_eq!(stats.assets_missing, 2);

    let dataset = Path::new(&config.output.dataset_path);
    assert_eq!(count_rows(dataset).unwrap(), 2);

    let names: Vec<_> = read_dataset(dataset)[1..]
        .iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(names, vec!["Event 1", "Event 3"]);
}

#[tokio::test]
async fn test_empty_listing_page_ends_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let link = format!("{}/e/only-event", base_url);
    mount_listing(&mock_server, 1, listing_page(&[link])).await;
    mount_listing(&mock_server, 2, listing_page(&[])).await;

    // Page 3 must never be requested
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/e/only-event"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Only", None)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir, 5);
    let mut orchestrator = Orchestrator::from_config(&config).await.unwrap();
    let stats = orchestrator.run().await.unwrap();

    assert_eq!(stats.listing_pages, 2);
    assert_eq!(stats.empty_pages, 1);
    assert_eq!(
        count_rows(Path::new(&config.output.dataset_path)).unwrap(),
        1
    );
}

#[tokio::test]
async fn test_failed_thumbnail_keeps_record() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let link = format!("{}/e/no-image", base_url);
    mount_listing(&mock_server, 1, listing_page(&[link])).await;

    Mock::given(method("GET"))
        .and(path("/e/no-image"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "Broken Image",
            Some("/img/missing.jpg"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir, 1);
    let mut orchestrator = Orchestrator::from_config(&config).await.unwrap();
    let stats = orchestrator.run().await.unwrap();

    assert_eq!(stats.records_written, 1);
    assert_eq!(stats.asset_failures, 1);

    let rows = read_dataset(Path::new(&config.output.dataset_path));
    assert_eq!(rows[1][6], "Thu,_Oct_9_7_00_PM_Broken Image.jpg");
    assert!(!Path::new(&config.output.image_dir)
        .join(&rows[1][6])
        .exists());
}

#[tokio::test]
async fn test_second_run_appends_to_existing_dataset() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let link = format!("{}/e/repeat", base_url);
    mount_listing(&mock_server, 1, listing_page(&[link])).await;
    Mock::given(method("GET"))
        .and(path("/e/repeat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Repeat", None)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir, 1);
    for _ in 0..2 {
        let mut orchestrator = Orchestrator::from_config(&config).await.unwrap();
        orchestrator.run().await.unwrap();
    }

    // The ledger does not outlive a run, so the event is appended again
    let rows = read_dataset(Path::new(&config.output.dataset_path));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], FIELD_NAMES.to_vec());
}
