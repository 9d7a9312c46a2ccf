use crate::config::{Config, Selectors};
use crate::parser::normalize_whitespace;
use crate::scraper::WebScraper;
use crate::types::{RawPerformance, Show, TheatreSchedule};

/// Scrape every eligible theatre in configured order.
///
/// Theatres without a program URL or a complete selector set are skipped
/// with a warning. A fetch or extraction failure drops that one theatre
/// from the result and the run continues; this function never fails.
pub async fn parse_all(config: &Config, scraper: &WebScraper) -> Vec<TheatreSchedule> {
    let mut results = Vec::new();

    for theatre in &config.theatres {
        let Some(program_url) = theatre.program_url() else {
            log::warn!(
                "Skipping theatre '{}' due to missing program URL",
                theatre.name
            );
            continue;
        };
        let Some(selectors) = theatre.selectors.as_ref().and_then(Selectors::complete) else {
            log::warn!(
                "Skipping theatre '{}' due to missing selectors",
                theatre.name
            );
            continue;
        };

        log::info!("Parsing theatre: {} from URL: {}", theatre.name, program_url);

        match scraper.fetch_performances(program_url, &selectors).await {
            Ok(raw) => {
                let shows = normalize(
                    raw,
                    config.general.results_per_theatre,
                    &theatre.base_url,
                );
                results.push(TheatreSchedule {
                    name: theatre.name.clone(),
                    shows,
                });
                log::info!("Successfully parsed data for theatre: {}", theatre.name);
            }
            Err(e) => log::error!("Error parsing theatre '{}': {}", theatre.name, e),
        }
    }

    results
}

/// Cap raw records at `limit` (document order), collapse title whitespace
/// and absolutize relative links.
fn normalize(raw: Vec<RawPerformance>, limit: usize, base_url: &str) -> Vec<Show> {
    raw.into_iter()
        .take(limit)
        .map(|p| Show {
            title: normalize_whitespace(&p.title),
            datetime: p.datetime,
            link: p.link.map(|l| absolutize_link(base_url, l)),
        })
        .collect()
}

/// Rewrite a relative link against the site's base URL. Links that already
/// carry a scheme are returned unchanged.
pub fn absolutize_link(base_url: &str, link: String) -> String {
    if link.starts_with("http") {
        link
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    }
}
