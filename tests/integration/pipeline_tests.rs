use bookrank::config::Config;
use bookrank::{run, BookRankError, FetchError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TAG: &str = "fiction";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.catalog.tag = TAG.to_string();
    config.catalog.user_agent = "TestBot/1.0".to_string();
    config.pipeline.concurrency = 4;
    config.pipeline.stagger_ms = 0;
    config.pipeline.request_timeout_secs = 5;
    config.output.path = Some(output.to_path_buf());
    config
}

/// One listing item
fn item(name: &str, rating: &str, people: &str) -> String {
    format!(
        r#"<li class="subject-item">
            <div class="pic"><a href="https://book.example.com/{name}/"><img src="https://img.example.com/{name}.jpg"></a></div>
            <div class="info">
              <h2><a href="https://book.example.com/{name}/" title="{name}">{name}</a></h2>
              <div class="star clearfix">
                <span class="rating_nums">{rating}</span>
                <span class="pl">({people}人评价)</span>
              </div>
              <p>About {name}.</p>
            </div>
        </li>"#
    )
}

/// A listing page; `next_offsets` become paginator links
fn listing_page(items: &[String], next_offsets: &[u32]) -> String {
    let links: String = next_offsets
        .iter()
        .map(|o| format!(r#"<a href="/tag/{TAG}?start={o}&amp;type=T">{o}</a>"#))
        .collect();
    format!(
        r#"<html><body>
        <ul class="subject-list">{}</ul>
        <div class="paginator"><span class="thispage">1</span>{}</div>
        </body></html>"#,
        items.concat(),
        links
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_first_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/tag/{TAG}")))
        .and(|req: &Request| req.url.query().is_none())
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, offset: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/tag/{TAG}")))
        .and(query_param("start", offset.to_string()))
        .and(query_param("type", "T"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_three_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("fiction.md");

    mount_first_page(
        &server,
        listing_page(
            &[
                item("a1", "7.0", "100"),
                item("a2", "8.0", "200"),
                item("a3", "6.5", "30"),
            ],
            &[20, 40],
        ),
    )
    .await;
    mount_page(
        &server,
        20,
        html(listing_page(
            &[
                item("b1", "9.6", "12000"),
                item("b2", "5.0", "10"),
                item("b3", "", "0"),
            ],
            &[],
        )),
    )
    .await;
    mount_page(
        &server,
        40,
        html(listing_page(
            &[
                item("c1", "8.8", "900"),
                item("c2", "7.7", "450"),
                item("c3", "9.9", "6"),
            ],
            &[],
        )),
    )
    .await;

    let config = create_test_config(&server.uri(), &report);
    let summary = run(config).await.expect("run succeeds");

    assert_eq!(summary.total_books, 9);
    assert_eq!(summary.pages_parsed, 3);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.report_path, report);

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.starts_with("## fiction\n\n## Book list\n\n### Total 9, updated: "));
    assert_eq!(content.matches("\n### No.").count(), 9);

    // Many ratings beat a near-perfect score from six readers
    assert!(content.contains("### No.1 b1\n"));
    assert!(content.contains(" > Link: [https://book.example.com/b1/](https://book.example.com/b1/)  \n"));
    assert!(content.contains(" > Rating count: 12000  \n"));
    let b1 = content.find("### No.1 b1").unwrap();
    let c3 = content.find(" c3\n").unwrap();
    assert!(b1 < c3);
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("fiction.md");

    mount_first_page(
        &server,
        listing_page(&[item("a1", "7.0", "100")], &[20, 40]),
    )
    .await;
    mount_page(&server, 20, ResponseTemplate::new(500)).await;
    mount_page(
        &server,
        40,
        html(listing_page(&[item("c1", "8.0", "900")], &[])),
    )
    .await;

    let summary = run(create_test_config(&server.uri(), &report))
        .await
        .expect("a failed page does not fail the run");

    assert_eq!(summary.total_books, 2);
    assert_eq!(summary.pages_parsed, 2);
    assert_eq!(summary.pages_failed, 1);

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("### Total 2, updated: "));
}

#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("fiction.md");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = run(create_test_config(&server.uri(), &report))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BookRankError::Planning {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));
    assert!(!report.exists());
}

#[tokio::test]
async fn test_single_page_listing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("fiction.md");

    mount_first_page(
        &server,
        listing_page(&[item("only", "8.1", "300"), item("other", "", "")], &[]),
    )
    .await;

    let summary = run(create_test_config(&server.uri(), &report))
        .await
        .unwrap();

    assert_eq!(summary.total_books, 2);
    assert_eq!(summary.pages_parsed, 1);

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("### No.1 only\n"));
    assert!(content.contains(" > Rating: 0.0  \n > Rating count: 0  \n"));
}

#[tokio::test]
async fn test_existing_report_is_replaced() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("fiction.md");
    std::fs::write(&report, "### Total 999, updated: long ago\n").unwrap();

    mount_first_page(&server, listing_page(&[item("fresh", "7.5", "80")], &[])).await;

    run(create_test_config(&server.uri(), &report))
        .await
        .unwrap();

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("### Total 1, updated: "));
    assert!(!content.contains("long ago"));
}
