use serde::{Deserialize, Serialize};

/// One performance as extracted from the page, before any cleanup.
///
/// `datetime` is either the raw `datetime` attribute of the time element
/// (usually ISO 8601) or its visible text when no such attribute exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPerformance {
    pub datetime: String,
    pub title: String,
    pub link: Option<String>,
}

/// A performance after normalization: title whitespace collapsed and the
/// link rewritten to an absolute URL (when a link was found at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub datetime: String,
    pub title: String,
    pub link: Option<String>,
}

/// All shows collected for one configured theatre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreSchedule {
    pub name: String,
    pub shows: Vec<Show>,
}
