//! Integration tests for the scraping orchestrator, backed by wiremock.

use playbill::WebScraper;
use playbill::config::{Config, General, Selectors, TheatreConfig};
use playbill::monitor::parse_all;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROGRAM_HTML: &str = r#"
<ul class="program">
  <li class="performance">
    <time datetime="2024-06-01T19:00:00">1 June</time>
    <h2 class="name">  Hamlet  </h2>
    <a class="detail" href="/show1">Detail</a>
  </li>
  <li class="performance">
    <time datetime="2024-06-02T19:00:00">2 June</time>
    <h2 class="name">Hamlet</h2>
    <a class="detail" href="https://elsewhere.example/show2">Detail</a>
  </li>
  <li class="performance">
    <time>3 June</time>
    <h2 class="name">Macbeth</h2>
  </li>
</ul>
"#;

fn full_selectors() -> Selectors {
    Selectors {
        elements: Some("li.performance".to_string()),
        time: Some("time".to_string()),
        title: Some("h2.name".to_string()),
        link: Some("a.detail".to_string()),
    }
}

fn theatre(name: &str, base_url: &str, program_url: Option<&str>) -> TheatreConfig {
    TheatreConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        program_url: program_url.map(str::to_string),
        time_parseable: true,
        selectors: Some(full_selectors()),
    }
}

fn config_with(theatres: Vec<TheatreConfig>, results_per_theatre: usize) -> Config {
    Config {
        general: General {
            results_per_theatre,
            display_offset: "+00:00".to_string(),
        },
        theatres,
    }
}

fn test_scraper() -> WebScraper {
    // zero backoff keeps the retry tests fast
    WebScraper::new(5, 0, 2).expect("scraper construction should not fail")
}

#[tokio::test]
async fn eligible_theatre_appears_with_normalized_shows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_HTML))
        .mount(&server)
        .await;

    let base = server.uri();
    let program = format!("{base}/program");
    let cfg = config_with(vec![theatre("Theatre1", &base, Some(&program))], 10);

    let results = parse_all(&cfg, &test_scraper()).await;

    assert_eq!(results.len(), 1);
    let schedule = &results[0];
    assert_eq!(schedule.name, "Theatre1");
    assert_eq!(schedule.shows.len(), 3);

    // whitespace collapsed, relative link absolutized, absolute link untouched
    assert_eq!(schedule.shows[0].title, "Hamlet");
    assert_eq!(schedule.shows[0].link, Some(format!("{base}/show1")));
    assert_eq!(
        schedule.shows[1].link,
        Some("https://elsewhere.example/show2".to_string())
    );

    // no datetime attribute falls back to the element text, no link stays None
    assert_eq!(schedule.shows[2].datetime, "3 June");
    assert_eq!(schedule.shows[2].link, None);
}

#[tokio::test]
async fn result_limit_keeps_first_records_in_document_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_HTML))
        .mount(&server)
        .await;

    let base = server.uri();
    let program = format!("{base}/program");
    let cfg = config_with(vec![theatre("Theatre1", &base, Some(&program))], 1);

    let results = parse_all(&cfg, &test_scraper()).await;

    assert_eq!(results[0].shows.len(), 1);
    assert_eq!(results[0].shows[0].datetime, "2024-06-01T19:00:00");
    assert_eq!(results[0].shows[0].link, Some(format!("{base}/show1")));
}

#[tokio::test]
async fn capped_schedule_formats_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_HTML))
        .mount(&server)
        .await;

    let base = server.uri();
    let program = format!("{base}/program");
    let cfg = config_with(vec![theatre("Theatre1", &base, Some(&program))], 1);

    let results = parse_all(&cfg, &test_scraper()).await;
    let tz = cfg.general.display_offset().unwrap();
    let message = playbill::format::format_schedule(&results[0].shows, tz, true);

    assert_eq!(
        message,
        format!("<b>Hamlet</b>\n- Sat, 01 Jun 19:00 -> <a href=\"{base}/show1\">Detail</a>")
    );
}

#[tokio::test]
async fn theatres_without_url_or_selectors_are_skipped() {
    let no_url = theatre("NoUrl", "https://nourl.example", None);

    let mut empty_selectors = theatre(
        "EmptySelectors",
        "https://empty.example",
        Some("https://empty.example/program"),
    );
    empty_selectors.selectors = Some(Selectors::default());

    let mut no_selectors = theatre(
        "NoSelectors",
        "https://none.example",
        Some("https://none.example/program"),
    );
    no_selectors.selectors = None;

    let cfg = config_with(vec![no_url, empty_selectors, no_selectors], 5);
    let results = parse_all(&cfg, &test_scraper()).await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn failing_theatre_does_not_abort_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_HTML))
        .mount(&server)
        .await;

    let base = server.uri();
    let broken = format!("{base}/broken");
    let program = format!("{base}/program");
    let cfg = config_with(
        vec![
            theatre("Broken", &base, Some(&broken)),
            theatre("Working", &base, Some(&program)),
        ],
        5,
    );

    let results = parse_all(&cfg, &test_scraper()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Working");
}

#[tokio::test]
async fn fetch_retries_transient_errors() {
    let server = MockServer::start().await;
    // first attempt fails, second succeeds
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_HTML))
        .mount(&server)
        .await;

    let base = server.uri();
    let program = format!("{base}/program");
    let cfg = config_with(vec![theatre("Flaky", &base, Some(&program))], 5);

    let results = parse_all(&cfg, &test_scraper()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Flaky");
}

#[tokio::test]
async fn retries_exhausted_is_a_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/program", server.uri());
    let result = test_scraper().fetch(&url).await;

    match result {
        Err(playbill::ScraperError::RetriesExhausted { url: u, attempts }) => {
            assert_eq!(u, url);
            assert_eq!(attempts, 2);
        }
        other => panic!("expected RetriesExhausted, got: {other:?}"),
    }
}
