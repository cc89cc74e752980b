//! Pattern-based slot extraction.
//!
//! Every extractor takes the first match scanning left to right. Contact is
//! an email address, or failing that a phone number: an unbroken run of at
//! least ten digits, or the 3-3-4 grouping with an optional `+` country code
//! and parenthesized area code. Date and time are matched separately and
//! joined.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum digits for a run to count as a phone number.
const MIN_PHONE_DIGITS: usize = 10;

/// Matter type when no category keyword matches.
pub const GENERAL_CONSULTATION: &str = "General Consultation";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        \b\d{{{min},}}\b
      | (?:\+\d{{1,3}}[\s.-]?)?(?:\(\d{{3}}\)|\b\d{{3}})[\s.-]?\d{{3}}[\s.-]?\d{{4}}\b",
        min = MIN_PHONE_DIGITS
    ))
    .expect("Invalid phone regex")
});

static CONTACT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:my|our)\s+)?(?:e-?mail|phone|number|contact)(?:\s+(?:address|number))?(?:\s+is)?\s*[:\-]?\s*$",
    )
    .expect("Invalid contact label regex")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(?:
            (?:next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)
          | today | tomorrow
          | \d{4}-\d{1,2}-\d{1,2}
          | \d{1,2}/\d{1,2}(?:/\d{2,4})?
          | (?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?
        )\b",
    )
    .expect("Invalid date regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(?:
            \d{1,2}(?::\d{2})?\s*(?:(?:am|pm)\b|[ap]\.m\.)
          | \d{1,2}:\d{2}\b
          | noon\b | morning\b | afternoon\b | evening\b
        )",
    )
    .expect("Invalid time regex")
});

/// Matter categories in precedence order.
static MATTER_CATEGORIES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let mk = |words: &str| {
        Regex::new(&format!(r"(?i)\b(?:{})\b", words)).expect("Invalid matter regex")
    };
    vec![
        (
            "Corporate Law",
            mk("corporate|corporation|business|company|merger|mergers|acquisition|acquisitions|contract|contracts|startup|securities"),
        ),
        (
            "Litigation",
            mk("litigation|lawsuit|sue|suing|sued|court|trial|dispute|appeal|arbitration"),
        ),
        (
            "Employment Law",
            mk("employment|employee|employer|workplace|discrimination|harassment|fired|wrongful|wage|wages"),
        ),
        (
            "Intellectual Property",
            mk("intellectual|ip|patent|patents|trademark|trademarks|copyright|copyrights|licensing"),
        ),
        (
            "Real Estate",
            mk(r"real\s+estate|property|lease|landlord|tenant|zoning|mortgage"),
        ),
        ("Tax Law", mk("tax|taxes|taxation|irs|audit")),
        (
            "Environmental Law",
            mk("environmental|environment|pollution|emissions|epa|contamination"),
        ),
    ]
});

/// First email address, else first phone number.
///
/// Separators only join the groups of a single phone number, so dates,
/// times, and neighbouring numbers are never merged into one.
pub fn extract_contact(text: &str) -> Option<String> {
    EMAIL
        .find(text)
        .or_else(|| PHONE.find(text))
        .map(|m| m.as_str().to_string())
}

/// Text with the first occurrence of `contact` removed.
pub fn without_contact(text: &str, contact: Option<&str>) -> String {
    match contact {
        Some(c) if !c.is_empty() => text.replacen(c, " ", 1),
        _ => text.to_string(),
    }
}

/// Non-contact lines of the utterance, joined with single spaces.
pub fn extract_message(text: &str, contact: Option<&str>) -> Option<String> {
    let remainder = without_contact(text, contact);
    let lines: Vec<String> = remainder
        .lines()
        .map(|line| CONTACT_LABEL.replace(line.trim_end(), "").into_owned())
        .map(|line| {
            line.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// First matter category with a keyword in the utterance.
pub fn infer_matter_type(text: &str) -> String {
    MATTER_CATEGORIES
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(label, _)| *label)
        .unwrap_or(GENERAL_CONSULTATION)
        .to_string()
}

pub fn extract_date(text: &str) -> Option<String> {
    DATE.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_time(text: &str) -> Option<String> {
    TIME.find(text).map(|m| m.as_str().to_string())
}

/// `"<date> <time>"`, or whichever of the two was found.
pub fn extract_date_time(text: &str) -> Option<String> {
    match (extract_date(text), extract_time(text)) {
        (Some(date), Some(time)) => Some(format!("{} {}", date, time)),
        (Some(date), None) => Some(date),
        (None, Some(time)) => Some(time),
        (None, None) => None,
    }
}
