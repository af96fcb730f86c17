//! Site-wide settings the validator reads. Handed in as a read-only snapshot;
//! nothing in the engine keeps or mutates it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_TIE_BREAKER_LOW: f64 = 50.0;
pub const DEFAULT_TIE_BREAKER_HIGH: f64 = 500.0;

const FALLBACK_STOP_SUBMIT_MESSAGE: &str = "Bracket submissions are currently closed.";
const FALLBACK_DEADLINE_MESSAGE: &str = "The submission deadline has passed.";

/// Naive timestamps are read as UTC.
const NAIVE_DEADLINE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// The subset of site configuration that governs submissions.
///
/// Values usually come from a spreadsheet export, so numeric fields also
/// accept numeric strings and a blank cell counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default, deserialize_with = "number_or_string")]
    pub tie_breaker_low: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub tie_breaker_high: Option<f64>,
    /// "Yes" closes submissions immediately.
    pub stop_submit_toggle: Option<String>,
    pub stop_submit_date_time: Option<String>,
    pub stop_submit_message: Option<String>,
    pub deadline_passed_message: Option<String>,
}

/// State of the configured submission deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline {
    Unset,
    At(DateTime<Utc>),
    Unparseable(String),
}

impl SiteConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Inclusive `(low, high)` range for the tie breaker.
    pub fn tie_breaker_bounds(&self) -> (f64, f64) {
        (
            self.tie_breaker_low.unwrap_or(DEFAULT_TIE_BREAKER_LOW),
            self.tie_breaker_high.unwrap_or(DEFAULT_TIE_BREAKER_HIGH),
        )
    }

    pub fn submissions_stopped(&self) -> bool {
        self.stop_submit_toggle.as_deref() == Some("Yes")
    }

    pub fn deadline(&self) -> Deadline {
        match self.stop_submit_date_time.as_deref().map(str::trim) {
            None | Some("") => Deadline::Unset,
            Some(raw) => match parse_deadline(raw) {
                Some(at) => Deadline::At(at),
                None => Deadline::Unparseable(raw.to_owned()),
            },
        }
    }

    pub fn stop_submit_message(&self) -> &str {
        non_blank(&self.stop_submit_message).unwrap_or(FALLBACK_STOP_SUBMIT_MESSAGE)
    }

    pub fn deadline_passed_message(&self) -> &str {
        non_blank(&self.deadline_passed_message).unwrap_or(FALLBACK_DEADLINE_MESSAGE)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DEADLINE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) if n.is_finite() => Ok(Some(n)),
        Some(NumberOrString::Number(n)) => Err(D::Error::custom(format!("expected a finite number, got {n}"))),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a finite number, got {s:?}"))),
    }
}
