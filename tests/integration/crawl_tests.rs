//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use llmstxt_harvest::config::Config;
use llmstxt_harvest::output::render_report;
use llmstxt_harvest::schema::{ProductReference, SchemaFragment};
use llmstxt_harvest::{
    crawl, crawl_with_cancellation, ErrorKind, HarvestError, ReferenceDataset, SchemaType,
};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration with short politeness delays for testing
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = 2;
    config.crawler.max_pages = 20;
    config.crawler.workers = 2;
    config.crawler.minimum_request_interval_ms = 10;
    config.crawler.request_timeout_ms = 5_000;
    config.crawler.robots_timeout_ms = 1_000;
    config
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

async fn mount_html_once(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            html_page("Never", "<p>Must not be fetched</p>"),
            "text/html",
        ))
        .expect(0)
        .mount(server)
        .await;
}

/// Number of page requests the server received, robots.txt excluded
async fn page_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() != "/robots.txt")
        .count()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;

    mount_html_once(
        &server,
        "/",
        html_page(
            "Home",
            r#"<h1>Welcome</h1><p>Landing page text.</p>
               <a href="/page1">Page One</a> <a href="/page2">Page Two</a>"#,
        ),
    )
    .await;
    mount_html_once(
        &server,
        "/page1",
        html_page("Page 1", "<h2>First</h2><p>Content one.</p>"),
    )
    .await;
    mount_html_once(
        &server,
        "/page2",
        html_page("Page 2", "<h2>Second</h2><p>Content two.</p>"),
    )
    .await;

    let report = crawl(&format!("{}/", server.uri()), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert!(!report.cancelled);
    assert_eq!(report.pages.len(), 3);
    assert!(report.failures.is_empty());
    assert!(report.schema.is_none());

    // Ordered by depth: the seed first
    assert_eq!(report.pages[0].metadata.title, "Home");
    assert_eq!(report.pages[0].depth, 0);
    assert!(report.pages[1..].iter().all(|page| page.depth == 1));

    let page1 = report
        .page(&format!("{}/page1", server.uri()))
        .expect("page1 missing");
    assert_eq!(page1.sections[0].title, "First");
    assert_eq!(page1.sections[0].body, "Content one.");

    assert_eq!(report.stats.urls_visited, 3);
    assert_eq!(report.stats.pages_extracted, 3);
    assert_eq!(report.stats.links_discovered, 2);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>Start here.</p>
               <a href="/private/page">Private</a> <a href="/public/page">Public</a>"#,
        ),
    )
    .await;
    mount_never(&server, "/private/page").await;
    mount_html_once(
        &server,
        "/public/page",
        html_page("Public", "<p>Open content.</p>"),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error_kind, ErrorKind::RobotsDisallowed);
    assert!(report.failures[0].url.ends_with("/private/page"));
    assert_eq!(report.failures[0].depth, 1);
}

#[tokio::test]
async fn test_ignore_robots() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_html_once(&server, "/", html_page("Home", "<p>Everything allowed.</p>")).await;

    let mut config = create_test_config();
    config.crawler.respect_robots = false;

    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page("Home", r#"<p>Root.</p><a href="/level1">Level 1</a>"#),
    )
    .await;
    mount_html_once(
        &server,
        "/level1",
        html_page("Level 1", r#"<p>One.</p><a href="/level2">Level 2</a>"#),
    )
    .await;
    mount_never(&server, "/level2").await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;

    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert!(report.pages.iter().all(|page| page.depth <= 1));
    assert_eq!(report.stats.urls_visited, 2);
}

#[tokio::test]
async fn test_page_budget() {
    let server = MockServer::start().await;

    let links: String = (1..=6)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a> "#, i, i))
        .collect();
    mount_html(&server, "/", html_page("Home", &format!("<p>Index.</p>{}", links))).await;
    for i in 1..=6 {
        mount_html(
            &server,
            &format!("/p{}", i),
            html_page(&format!("Page {}", i), "<p>Leaf page.</p>"),
        )
        .await;
    }

    let mut config = create_test_config();
    config.crawler.max_pages = 3;
    config.crawler.workers = 4;

    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");

    assert_eq!(report.stats.urls_visited, 3);
    assert_eq!(report.pages.len(), 3);
    assert_eq!(page_requests(&server).await, 3);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>Downloads below.</p>
               <a href="/label.pdf">Prescribing Information</a>
               <a href="/data.json">Data</a>
               <a href="/about">About us</a>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/label.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/about",
        html_page("About", "<p>Company information.</p>"),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.stats.pages_extracted, 2);
    assert_eq!(report.stats.urls_visited, 4);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| f.error_kind == ErrorKind::UnsupportedContentType));
    assert_eq!(
        report
            .stats
            .failures_by_kind
            .get(&ErrorKind::UnsupportedContentType),
        Some(&2)
    );
}

#[tokio::test]
async fn test_http_error_recorded() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page("Home", r#"<p>Links.</p><a href="/missing">Missing page</a>"#),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error_kind, ErrorKind::NetworkError);
    assert!(report.failures[0].message.contains("404"));
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;

    mount_html_once(
        &server,
        "/",
        html_page(
            "Home",
            r##"<p>Index.</p>
               <a href="/shared">Shared</a>
               <a href="/shared/">Shared again</a>
               <a href="/shared#section">Shared section</a>
               <a href="/other">Other</a>"##,
        ),
    )
    .await;
    mount_html_once(
        &server,
        "/other",
        html_page("Other", r#"<p>Other page.</p><a href="/shared">Shared</a><a href="/">Home</a>"#),
    )
    .await;
    mount_html_once(
        &server,
        "/shared",
        html_page("Shared", r#"<p>Shared page.</p><a href="/other">Other</a>"#),
    )
    .await;

    let mut config = create_test_config();
    config.crawler.workers = 4;

    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");

    assert_eq!(report.pages.len(), 3);
    assert_eq!(page_requests(&server).await, 3);
}

async fn mount_redirect(server: &MockServer, route: &str, location: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", location))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirected_seed_target_fetched_once() {
    let server = MockServer::start().await;

    mount_redirect(&server, "/", "/en").await;
    mount_html_once(
        &server,
        "/en",
        html_page(
            "English",
            r#"<p>Localized home.</p><a href="/en">Home</a><a href="/about">About</a>"#,
        ),
    )
    .await;
    mount_html_once(
        &server,
        "/about",
        html_page("About", r#"<p>About us.</p><a href="/en">English home</a>"#),
    )
    .await;

    let report = crawl(&format!("{}/", server.uri()), create_test_config(), None)
        .await
        .expect("crawl failed");

    let sources: Vec<&str> = report
        .pages
        .iter()
        .map(|page| page.metadata.source_url.as_str())
        .collect();
    assert_eq!(
        sources,
        vec![
            format!("{}/en", server.uri()),
            format!("{}/about", server.uri())
        ]
    );
    assert!(report.failures.is_empty());
    assert_eq!(report.stats.urls_visited, 2);
}

#[tokio::test]
async fn test_redirect_to_fetched_page_not_recorded_twice() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>Index.</p><a href="/current">Current</a><a href="/legacy">Legacy</a>"#,
        ),
    )
    .await;
    mount_html(
        &server,
        "/current",
        html_page("Current", "<p>Current page.</p>"),
    )
    .await;
    mount_redirect(&server, "/legacy", "/current").await;

    let mut config = create_test_config();
    config.crawler.workers = 1;

    let report = crawl(&format!("{}/", server.uri()), config, None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(
        report
            .pages
            .iter()
            .filter(|page| page.metadata.source_url.ends_with("/current"))
            .count(),
        1
    );
    assert!(report.failures.is_empty());
    assert_eq!(report.stats.pages_by_state.get("redirected"), Some(&1));
}

#[tokio::test]
async fn test_off_host_links_not_followed() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>Index.</p><a href="https://elsewhere.invalid/page">Elsewhere</a>"#,
        ),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.stats.urls_visited, 1);
}

#[tokio::test]
async fn test_seed_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = crawl(&server.uri(), create_test_config(), None).await;

    match result {
        Err(HarvestError::SeedUnreachable { source, .. }) => {
            assert_eq!(source.kind(), ErrorKind::NetworkError);
        }
        other => panic!("expected SeedUnreachable, got {:?}", other.map(|r| r.pages.len())),
    }
}

#[tokio::test]
async fn test_seed_non_html_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("plain", "text/plain"))
        .mount(&server)
        .await;

    let result = crawl(&server.uri(), create_test_config(), None).await;
    assert!(matches!(
        result,
        Err(HarvestError::SeedUnreachable { ref source, .. })
            if source.kind() == ErrorKind::UnsupportedContentType
    ));
}

#[tokio::test]
async fn test_empty_page_recorded_as_parse_error() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page("Home", r#"<p>Index.</p><a href="/blank">Blank page</a>"#),
    )
    .await;
    mount_html(
        &server,
        "/blank",
        "<html><head><title>Blank</title></head><body></body></html>".to_string(),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");

    assert_eq!(report.pages.len(), 2);
    let blank = report
        .page(&format!("{}/blank", server.uri()))
        .expect("blank page kept");
    assert_eq!(blank.metadata.title, "Blank");
    assert!(blank.sections.is_empty());

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error_kind, ErrorKind::ParseError);
}

#[tokio::test]
async fn test_pharma_schema_end_to_end() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page(
            "Jardiance Official Site",
            r#"<h1>Jardiance</h1>
               <p>A once-daily prescription medicine.</p>
               <h2>Indications</h2>
               <ul><li>Type 2 diabetes in adults</li><li>Heart failure</li></ul>
               <a href="/safety">Safety Information</a>
               <a href="/dosing">Dosing Guide</a>
               <a href="/pi.pdf">Full Prescribing Information</a>"#,
        ),
    )
    .await;
    mount_html(
        &server,
        "/safety",
        html_page(
            "Safety",
            r#"<h2>Side Effects</h2>
               <ul><li>Urinary tract infection</li><li>Dehydration</li><li>Heart failure</li></ul>"#,
        ),
    )
    .await;
    mount_html(
        &server,
        "/dosing",
        html_page(
            "Dosing",
            r#"<h2>Dosage and Administration</h2>
               <p>Available as a 10 mg film-coated tablet. Take once daily in the morning.</p>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/pi.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let mut reference = ReferenceDataset::new();
    reference.insert(
        "jardiance",
        ProductReference {
            brand_name: "Jardiance".to_string(),
            generic_name: "empagliflozin".to_string(),
            category: "SGLT2 inhibitor".to_string(),
        },
    );

    let mut config = create_test_config();
    config.schema.schema_type = SchemaType::PharmaProduct;

    let report = crawl(&server.uri(), config, Some(reference))
        .await
        .expect("crawl failed");

    let composite = report.schema.expect("composite schema missing");
    assert_eq!(composite.fragment_count, 3);
    assert_eq!(report.stats.fragments_merged, 3);

    let SchemaFragment::PharmaProduct(product) = composite.record else {
        panic!("expected pharma record");
    };
    assert_eq!(product.brand_name.as_deref(), Some("Jardiance"));
    assert_eq!(product.generic_name.as_deref(), Some("empagliflozin"));
    assert_eq!(product.drug_class.as_deref(), Some("SGLT2 inhibitor"));
    assert_eq!(
        product.indications,
        vec!["Type 2 diabetes in adults", "Heart failure"]
    );
    assert_eq!(
        product.side_effects,
        vec!["Urinary tract infection", "Dehydration", "Heart failure"]
    );
    assert_eq!(product.dosage_forms, vec!["film-coated tablet"]);
    assert!(product
        .administration
        .as_deref()
        .is_some_and(|a| a.contains("once daily")));
    assert_eq!(
        product.package_insert_url,
        Some(format!("{}/pi.pdf", server.uri()))
    );
    assert_eq!(product.source_urls.len(), 3);
}

#[tokio::test]
async fn test_clinical_trial_schema_end_to_end() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page(
            "A Study of Drug X in Obesity",
            r#"<h2>Study Overview</h2>
               <p>NCT12345678 is a Phase 3 trial. Status: Recruiting</p>
               <h2>Conditions</h2>
               <ul><li>Obesity</li></ul>
               <a href="/details">Study details</a>"#,
        ),
    )
    .await;
    mount_html(
        &server,
        "/details",
        html_page(
            "Details",
            r#"<h2>Eligibility Criteria</h2>
               <ul><li>Age 18 or older</li><li>BMI of 30 or more</li></ul>
               <h2>Conditions</h2>
               <ul><li>Obesity</li><li>Overweight</li></ul>"#,
        ),
    )
    .await;

    let mut config = create_test_config();
    config.schema.schema_type = SchemaType::ClinicalTrial;

    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");

    let composite = report.schema.expect("composite schema missing");
    let SchemaFragment::ClinicalTrial(trial) = composite.record else {
        panic!("expected trial record");
    };
    assert_eq!(trial.nct_id.as_deref(), Some("NCT12345678"));
    assert_eq!(trial.phase.as_deref(), Some("Phase 3"));
    assert_eq!(trial.status.as_deref(), Some("Recruiting"));
    assert_eq!(trial.conditions, vec!["Obesity", "Overweight"]);
    assert_eq!(
        trial.eligibility_criteria,
        vec!["Age 18 or older", "BMI of 30 or more"]
    );
}

#[tokio::test]
async fn test_cancellation_returns_partial_report() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page("Home", r#"<p>Index.</p><a href="/slow">Slow page</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Slow", "<p>Eventually.</p>"), "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        });
    }

    let started = Instant::now();
    let report = crawl_with_cancellation(&server.uri(), create_test_config(), None, cancel)
        .await
        .expect("crawl failed");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.cancelled);
    assert!(report.stats.cancelled);
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].metadata.title, "Home");
}

#[tokio::test]
async fn test_deadline_cancels_crawl() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        html_page("Home", r#"<p>Index.</p><a href="/slow">Slow page</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Slow", "<p>Eventually.</p>"), "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.deadline_ms = Some(500);

    let started = Instant::now();
    let report = crawl(&server.uri(), config, None).await.expect("crawl failed");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.cancelled);
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_llms_text_rendering_of_crawl() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title>
           <meta name="description" content="Site summary"></head>
           <body><h2>About</h2><p>We make medicines.</p></body></html>"#
            .to_string(),
    )
    .await;

    let report = crawl(&server.uri(), create_test_config(), None)
        .await
        .expect("crawl failed");
    let text = render_report(&report);

    assert!(text.starts_with("# Website Content for LLMs\n"));
    assert!(text.contains("# Home\n\n> Site summary\n"));
    assert!(text.contains(&format!("URL: {}/\n", server.uri())));
    assert!(text.contains("## About\n\nWe make medicines.\n"));
}
