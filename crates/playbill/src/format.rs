use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::parser::normalize_whitespace;
use crate::types::Show;

const DISPLAY_FORMAT: &str = "%a, %d %b %H:%M";
const SORT_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Resolve a raw datetime string into a (sort key, display string) pair.
///
/// Offset-aware RFC 3339 values are converted to `tz`; naive ISO values
/// are taken as wall time and displayed unconverted. Anything else passes
/// through verbatim, which keeps one odd value from spoiling the message
/// and still sorts correctly against ISO strings.
fn resolve_datetime(raw: &str, tz: FixedOffset) -> (String, String) {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        let local = dt.with_timezone(&tz).naive_local();
        (
            local.format(SORT_KEY_FORMAT).to_string(),
            local.format(DISPLAY_FORMAT).to_string(),
        )
    } else if let Some(naive) = parse_naive(raw) {
        (
            naive.format(SORT_KEY_FORMAT).to_string(),
            naive.format(DISPLAY_FORMAT).to_string(),
        )
    } else {
        (raw.to_string(), raw.to_string())
    }
}

/// Render one theatre's shows as a Telegram-ready HTML string.
///
/// Shows are sorted ascending by datetime, then grouped under a bold title
/// header in order of each title's earliest show. With `time_parseable`
/// unset, datetimes are opaque text sorted lexicographically (which matches
/// chronological order for ISO strings but is undefined for free text).
pub fn format_schedule(shows: &[Show], tz: FixedOffset, time_parseable: bool) -> String {
    let mut resolved: Vec<(String, String, String, Option<&str>)> = shows
        .iter()
        .map(|show| {
            let title = normalize_whitespace(&show.title);
            let (key, display) = if time_parseable {
                resolve_datetime(&show.datetime, tz)
            } else {
                (show.datetime.clone(), show.datetime.clone())
            };
            (key, display, title, show.link.as_deref())
        })
        .collect();

    resolved.sort_by(|a, b| a.0.cmp(&b.0));

    let mut groups: Vec<(String, Vec<(String, Option<&str>)>)> = Vec::new();
    for (_, display, title, link) in resolved {
        match groups.iter_mut().find(|(t, _)| *t == title) {
            Some((_, rows)) => rows.push((display, link)),
            None => groups.push((title, vec![(display, link)])),
        }
    }

    let mut lines = Vec::new();
    for (title, rows) in groups {
        lines.push(format!("<b>{title}</b>"));
        for (display, link) in rows {
            match link {
                Some(link) => {
                    lines.push(format!("- {display} -> <a href=\"{link}\">Detail</a>"));
                }
                None => lines.push(format!("- {display} -> Detail")),
            }
        }
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}
