use crate::config::SelectorSet;
use crate::types::RawPerformance;

use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid '{field}' selector '{selector}': {message}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        message: String,
    },
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Selector strings come from the config file, so a malformed one is a
/// recoverable per-site error rather than a programming bug.
fn parse_selector(selector: &str, field: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        field,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extract one raw performance record per element matched by the
/// `elements` selector, in document order.
///
/// Missing sub-elements degrade to empty or absent fields: the datetime
/// falls back from the time element's `datetime` attribute to its visible
/// text to an empty string, the title to an empty string, and the link to
/// `None`. Nothing short of a malformed selector fails the extraction.
pub fn extract_performances(
    html: &str,
    selectors: &SelectorSet<'_>,
) -> Result<Vec<RawPerformance>, ParseError> {
    let document = Html::parse_document(html);

    let elements_selector = parse_selector(selectors.elements, "elements")?;
    let time_selector = parse_selector(selectors.time, "time")?;
    let title_selector = parse_selector(selectors.title, "title")?;
    let link_selector = parse_selector(selectors.link, "link")?;

    let mut performances = Vec::new();
    for perf in document.select(&elements_selector) {
        let time_elem = perf.select(&time_selector).next();
        let datetime = time_elem
            .and_then(|e| e.value().attr("datetime"))
            .map(str::to_string)
            .or_else(|| time_elem.map(|e| elem_text(e).trim().to_string()))
            .unwrap_or_default();

        let title = perf
            .select(&title_selector)
            .next()
            .map(|e| elem_text(e).trim().to_string())
            .unwrap_or_default();

        let link = perf
            .select(&link_selector)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(str::to_string);

        performances.push(RawPerformance {
            datetime,
            title,
            link,
        });
    }

    Ok(performances)
}
