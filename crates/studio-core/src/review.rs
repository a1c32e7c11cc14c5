//! Parsing of the editor's structured verdict.

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};

/// Critique recorded when the editor's payload has none.
pub const DEFAULT_CRITIQUE: &str = "No feedback";

/// Highest score the editor can give.
pub const MAX_SCORE: u8 = 10;

/// The editor's verdict on a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewVerdict {
    /// Quality score, clamped to `0..=10`.
    pub score: u8,
    /// Notes for the writer.
    pub critique: String,
    /// Whether the draft may go to production.
    pub approved: bool,
}

impl Default for ReviewVerdict {
    fn default() -> Self {
        Self {
            score: 0,
            critique: DEFAULT_CRITIQUE.to_string(),
            approved: false,
        }
    }
}

/// Wire shape of the editor payload. Every key is optional.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    score: Option<serde_json::Number>,
    #[serde(default)]
    critique: Option<String>,
    #[serde(default)]
    approved: Option<bool>,
}

impl ReviewVerdict {
    /// Parses the editor's response.
    ///
    /// The response must be a JSON object, optionally wrapped in a markdown
    /// code fence. Missing keys take their defaults (`0`, [`DEFAULT_CRITIQUE`],
    /// `false`), as does a blank critique; scores outside `0..=10` are
    /// clamped.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::MalformedReview`] carrying the raw response when
    /// the payload is not an object or a key has the wrong type.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        let parsed: RawVerdict =
            serde_json::from_str(body).map_err(|e| StudioError::MalformedReview {
                reason: e.to_string(),
                raw: raw.to_string(),
            })?;

        let score = match parsed.score {
            None => 0,
            Some(n) => clamp_score(&n).ok_or_else(|| StudioError::MalformedReview {
                reason: format!("score is not a number in range: {n}"),
                raw: raw.to_string(),
            })?,
        };

        Ok(Self {
            score,
            critique: parsed
                .critique
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CRITIQUE.to_string()),
            approved: parsed.approved.unwrap_or(false),
        })
    }
}

fn clamp_score(n: &serde_json::Number) -> Option<u8> {
    let value = match n.as_i64() {
        Some(i) => i,
        None => n.as_f64().filter(|f| f.is_finite())?.round() as i64,
    };
    Some(value.clamp(0, i64::from(MAX_SCORE)) as u8)
}

/// Removes a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_payload() {
        let verdict =
            ReviewVerdict::parse(r#"{"score":4,"critique":"too slow","approved":false}"#).unwrap();
        assert_eq!(
            verdict,
            ReviewVerdict {
                score: 4,
                critique: "too slow".into(),
                approved: false,
            }
        );
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        assert_eq!(ReviewVerdict::parse("{}").unwrap(), ReviewVerdict::default());

        let verdict = ReviewVerdict::parse(r#"{"approved": true}"#).unwrap();
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.critique, DEFAULT_CRITIQUE);
        assert!(verdict.approved);
    }

    #[test]
    fn test_null_values_take_defaults() {
        let verdict =
            ReviewVerdict::parse(r#"{"score":null,"critique":null,"approved":null}"#).unwrap();
        assert_eq!(verdict, ReviewVerdict::default());
    }

    #[test]
    fn test_scores_are_clamped_and_rounded() {
        assert_eq!(ReviewVerdict::parse(r#"{"score":14}"#).unwrap().score, 10);
        assert_eq!(ReviewVerdict::parse(r#"{"score":-2}"#).unwrap().score, 0);
        assert_eq!(ReviewVerdict::parse(r#"{"score":7.6}"#).unwrap().score, 8);
    }

    #[test]
    fn test_fenced_payload() {
        let raw = "```json\n{\"score\": 9, \"critique\": \"great\", \"approved\": true}\n```";
        let verdict = ReviewVerdict::parse(raw).unwrap();
        assert_eq!(verdict.score, 9);
        assert!(verdict.approved);

        let bare_fence = "```\n{\"score\": 2}\n```";
        assert_eq!(ReviewVerdict::parse(bare_fence).unwrap().score, 2);
    }

    #[test]
    fn test_single_line_fence() {
        let verdict = ReviewVerdict::parse(r#"```json{"score":3}```"#).unwrap();
        assert_eq!(verdict.score, 3);

        let verdict = ReviewVerdict::parse(r#"```{"score":4}```"#).unwrap();
        assert_eq!(verdict.score, 4);
    }

    #[test]
    fn test_blank_critique_takes_default() {
        let verdict = ReviewVerdict::parse(r#"{"score":5,"critique":"  "}"#).unwrap();
        assert_eq!(verdict.critique, DEFAULT_CRITIQUE);
    }

    #[test]
    fn test_prose_is_malformed() {
        let err = ReviewVerdict::parse("This script is wonderful, 9/10!").unwrap_err();
        match err {
            StudioError::MalformedReview { raw, .. } => {
                assert_eq!(raw, "This script is wonderful, 9/10!");
            }
            other => panic!("expected MalformedReview, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_types_are_malformed() {
        assert!(matches!(
            ReviewVerdict::parse(r#"{"score":"high"}"#),
            Err(StudioError::MalformedReview { .. })
        ));
        assert!(matches!(
            ReviewVerdict::parse(r#"{"approved":"yes"}"#),
            Err(StudioError::MalformedReview { .. })
        ));
        assert!(matches!(
            ReviewVerdict::parse("[1, 2, 3]"),
            Err(StudioError::MalformedReview { .. })
        ));
    }
}
