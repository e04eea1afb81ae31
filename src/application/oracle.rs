use crate::domain::candidate::CandidatePair;
use crate::domain::ports::OracleTransport;
use crate::domain::row::{Row, scalar_text};
use crate::domain::verdict::{Judgement, MISSING_REASON, OracleVerdict};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

const UNKNOWN: &str = "unknown";

const INSTRUCTIONS: &str = "\
You reconcile financial ledgers. Decide which FILE B candidates record the same \
real-world transaction as the FILE A record.

Matching criteria:
- Descriptions, payee names and references may be worded or formatted differently; \
judge meaning, not spelling.
- If currencies differ or are missing on one side, be conservative and say so in the reason. \
Each record ends with its detected amount and currency; compare those first.
- Dates may drift by a few days because of posting and settlement delays.
- Amounts may differ slightly because of rounding, fees or partial payments; mention a \
partial payment or split in the reason.

Confidence bands:
- 0.95-1.00: certain, all details agree apart from formatting
- 0.85-0.94: very likely the same transaction, minor unexplained differences
- 0.50-0.84: plausible but doubtful
- 0.00-0.49: probably a different transaction

Output format: a JSON array with exactly one object per candidate, \
[{\"file_b_index\": <number>, \"match\": <true|false>, \"confidence\": <0.0-1.0>, \
\"reason\": \"<short explanation>\"}]. Output the JSON array only, with no text, \
markdown or code fences around it.";

/// Adapter between the resolver and the external semantic-matching service.
///
/// One call per non-empty candidate batch. Unreadable responses degrade to
/// [`Judgement::ParseFailure`]; transport errors propagate.
pub struct MatchOracle<'t> {
    transport: &'t dyn OracleTransport,
}

impl<'t> MatchOracle<'t> {
    pub fn new(transport: &'t dyn OracleTransport) -> Self {
        Self { transport }
    }

    /// Judges `left` against every candidate in one request.
    ///
    /// An empty batch returns an empty judgement without calling out.
    /// Verdicts naming a right index outside the batch are dropped.
    pub async fn judge(&self, left: &Row, candidates: &[CandidatePair<'_>]) -> Result<Judgement> {
        if candidates.is_empty() {
            return Ok(Judgement::empty());
        }

        let prompt = build_prompt(left, candidates);
        debug!(candidates = candidates.len(), "calling match oracle");
        let raw = self.transport.complete(&prompt).await?;

        match parse_response(&raw) {
            Judgement::Verdicts(verdicts) => {
                let known: HashSet<usize> = candidates.iter().map(|c| c.right_index).collect();
                let (kept, unknown): (Vec<_>, Vec<_>) = verdicts
                    .into_iter()
                    .partition(|verdict| known.contains(&verdict.right_index));
                for verdict in &unknown {
                    warn!(right_index = verdict.right_index, "oracle judged a row outside the batch");
                }
                Ok(Judgement::Verdicts(kept))
            }
            Judgement::ParseFailure { raw } => {
                warn!(raw = %raw, "oracle response is not a verdict array");
                Ok(Judgement::ParseFailure { raw })
            }
        }
    }
}

/// Renders the full request text for one left row and its candidates.
pub fn build_prompt(left: &Row, candidates: &[CandidatePair<'_>]) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nFILE A RECORD:\n");
    push_fields(&mut prompt, left);
    prompt.push_str("\nFILE B CANDIDATES:\n");
    for candidate in candidates {
        prompt.push_str(&format!("[file_b_index {}]\n", candidate.right_index));
        push_fields(&mut prompt, candidate.right);
        prompt.push('\n');
    }
    prompt.push_str("Respond with the JSON array only.");
    prompt
}

fn push_fields(out: &mut String, row: &Row) {
    for (column, value) in row.fields() {
        let text = scalar_text(value).unwrap_or_else(|| match value {
            Value::Null => String::new(),
            other => other.to_string(),
        });
        out.push_str(&format!("{}: {}\n", column.trim(), text));
    }
    out.push_str(&format!(
        "Detected amount: {}\nDetected currency: {}\n",
        row.amount().as_deref().unwrap_or(UNKNOWN),
        row.currency().as_deref().unwrap_or(UNKNOWN)
    ));
}

/// Reads an oracle response as a verdict array.
///
/// Tries the whole text first, then the first embedded array of objects.
/// Array elements that are not usable verdicts are skipped.
pub fn parse_response(raw: &str) -> Judgement {
    let items = match serde_json::from_str::<Vec<Value>>(raw.trim()) {
        Ok(items) => items,
        Err(_) => match first_embedded_array(raw) {
            Some(items) => items,
            None => {
                return Judgement::ParseFailure {
                    raw: raw.to_string(),
                };
            }
        },
    };

    Judgement::Verdicts(items.iter().filter_map(verdict_from_value).collect())
}

/// The first `[` that starts a complete JSON array of objects, read up to its
/// matching `]`. Text after the array is ignored.
fn first_embedded_array(raw: &str) -> Option<Vec<Value>> {
    raw.match_indices('[').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&raw[start..])
            .into_iter::<Vec<Value>>()
            .next()?
            .ok()
            .filter(|items| items.iter().all(Value::is_object))
    })
}

fn verdict_from_value(item: &Value) -> Option<OracleVerdict> {
    let fields = item.as_object()?;

    let Some(right_index) = fields.get("file_b_index").and_then(as_index) else {
        warn!(item = %item, "oracle verdict without a usable file_b_index");
        return None;
    };
    let matched = fields.get("match").is_some_and(as_flag);
    let confidence = fields.get("confidence").and_then(as_number).unwrap_or(0.0);
    let reason = fields
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(MISSING_REASON);

    Some(OracleVerdict::new(right_index, matched, confidence, reason))
}

fn as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes"),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
