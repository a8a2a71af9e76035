//! Extracts the sentiment tally from the model's free-text reply.
//!
//! Grammar, applied per line:
//! - the line belongs to the first of `Positive`, `Negative`, `Neutral` it
//!   contains (case-sensitive substring);
//! - the value is the text after the first `:`, trimmed, with `%` removed,
//!   cut at the first whitespace and read as an unsigned integer;
//! - a later line for the same label replaces the earlier value.
//!
//! Lines that name a label but carry no colon or no integer are skipped. The
//! parse fails only when a label never receives a value.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentages reported by the model. Not normalized.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentTally {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentTally {
    pub fn get(&self, label: SentimentLabel) -> u32 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Entries in label order.
    pub fn entries(&self) -> [(SentimentLabel, u32); 3] {
        SentimentLabel::ALL.map(|label| (label, self.get(label)))
    }

    pub fn total(&self) -> u64 {
        self.entries().iter().map(|(_, v)| *v as u64).sum()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Incomplete sentiment data found in the result (missing: {})", join_labels(.0))]
    Incomplete(Vec<SentimentLabel>),
}

fn join_labels(labels: &[SentimentLabel]) -> String {
    labels.iter().map(|l| l.as_str()).collect::<Vec<_>>().join(", ")
}

fn classify(line: &str) -> Option<SentimentLabel> {
    SentimentLabel::ALL
        .into_iter()
        .find(|label| line.contains(label.as_str()))
}

fn value_after_colon(line: &str) -> Option<u32> {
    let (_, rest) = line.split_once(':')?;
    let cleaned = rest.trim().replace('%', "");
    cleaned.split_whitespace().next()?.parse().ok()
}

pub fn parse_analysis_result(raw: &str) -> Result<SentimentTally, ParseError> {
    tracing::debug!("raw analysis result:\n{}", raw);

    let mut found: [Option<u32>; 3] = [None; 3];
    for line in raw.trim().lines() {
        let Some(label) = classify(line) else {
            continue;
        };
        match value_after_colon(line) {
            Some(value) => found[label as usize] = Some(value),
            None => tracing::debug!(%label, line, "label line without a usable value, skipped"),
        }
    }

    match found {
        [Some(positive), Some(negative), Some(neutral)] => {
            let tally = SentimentTally {
                positive,
                negative,
                neutral,
            };
            if tally.total() != 100 {
                tracing::warn!(total = tally.total(), "sentiment percentages do not sum to 100");
            }
            Ok(tally)
        }
        _ => {
            let missing = SentimentLabel::ALL
                .into_iter()
                .zip(found)
                .filter(|(_, v)| v.is_none())
                .map(|(label, _)| label)
                .collect();
            let err = ParseError::Incomplete(missing);
            tracing::debug!("error during parsing: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(positive: u32, negative: u32, neutral: u32) -> SentimentTally {
        SentimentTally {
            positive,
            negative,
            neutral,
        }
    }

    #[test]
    fn parses_well_formed_lines() {
        let parsed = parse_analysis_result("Positive: 40%\nNegative: 10%\nNeutral: 50%").unwrap();
        assert_eq!(parsed, tally(40, 10, 50));
    }

    #[test]
    fn order_and_surrounding_text_do_not_matter() {
        let raw = "Here is the sentiment breakdown of the file.\n\
                   NEUTRAL reviews - Neutral: 50% (25 reviews)\n\
                   overall the Positive: 40 % share\n\
                   some Negative: 10%\n\
                   Total reviews: 50";
        assert_eq!(parse_analysis_result(raw).unwrap(), tally(40, 10, 50));
    }

    #[test]
    fn missing_label_fails() {
        let err = parse_analysis_result("Positive: 70%\nNegative: 20%").unwrap_err();
        assert_eq!(err, ParseError::Incomplete(vec![SentimentLabel::Neutral]));
        assert!(err.to_string().contains("Neutral"));
    }

    #[test]
    fn empty_reply_reports_every_label() {
        let err = parse_analysis_result("").unwrap_err();
        assert_eq!(err, ParseError::Incomplete(SentimentLabel::ALL.to_vec()));
    }

    #[test]
    fn later_line_wins() {
        let raw = "Positive: 40%\nNegative: 10%\nNeutral: 50%\nPositive: 45%";
        assert_eq!(parse_analysis_result(raw).unwrap().positive, 45);
    }

    #[test]
    fn labels_are_case_sensitive() {
        let err = parse_analysis_result("positive: 40%\nNegative: 10%\nNeutral: 50%").unwrap_err();
        assert_eq!(err, ParseError::Incomplete(vec![SentimentLabel::Positive]));
    }

    #[test]
    fn first_label_in_line_claims_it() {
        // "Positive" is checked first, so this line never counts as Negative.
        let raw = "Positive vs Negative: 30%\nNeutral: 20%\nNegative: 50%";
        assert_eq!(parse_analysis_result(raw).unwrap(), tally(30, 50, 20));
    }

    #[test]
    fn takes_first_token_after_colon() {
        let raw = "Positive: 70% (140 reviews)\nNegative:20%\nNeutral:   10 % of 200";
        assert_eq!(parse_analysis_result(raw).unwrap(), tally(70, 20, 10));
    }

    #[test]
    fn malformed_label_lines_are_skipped() {
        let raw = "Positive reviews are mostly about price\n\
                   Positive: 60%\n\
                   Negative: about a third\n\
                   Negative: 30%\n\
                   Neutral: 10.5%\n\
                   Neutral: 10%";
        assert_eq!(parse_analysis_result(raw).unwrap(), tally(60, 30, 10));
    }

    #[test]
    fn decimal_only_value_is_missing() {
        let err = parse_analysis_result("Positive: 40%\nNegative: 10%\nNeutral: 49.5%").unwrap_err();
        assert_eq!(err, ParseError::Incomplete(vec![SentimentLabel::Neutral]));
    }

    #[test]
    fn does_not_normalize() {
        let parsed = parse_analysis_result("Positive: 50%\nNegative: 30%\nNeutral: 30%").unwrap();
        assert_eq!(parsed.total(), 110);
        assert_eq!(parsed, tally(50, 30, 30));
    }

    #[test]
    fn tally_serializes_with_label_keys() {
        let value = serde_json::to_value(tally(70, 20, 10)).unwrap();
        assert_eq!(value, serde_json::json!({ "Positive": 70, "Negative": 20, "Neutral": 10 }));
    }
}
