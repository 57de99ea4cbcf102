//! Running a compiled filter over a stream of candidate matches.
//!
//! The scan owns the policy decision the evaluator leaves to its caller: on
//! `InvalidPropertyValue` it either aborts or skips the offending candidate,
//! per `FilterConfig::on_invalid_value`. Other evaluation errors abort.

use serde::Serialize;

use crate::config::{FilterConfig, InvalidValuePolicy};
use crate::eval::{evaluate, AliasBinding, EvalError, Triplet};
use crate::resolver::PropertyResolver;
use crate::tree::FilterNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCandidate {
    pub candidate: Triplet,
    #[serde(serialize_with = "serialize_display")]
    pub error: EvalError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub matches: Vec<Triplet>,
    pub skipped: Vec<SkippedCandidate>,
    /// Candidates evaluated, including skipped ones.
    pub examined: usize,
}

fn serialize_display<S: serde::Serializer>(err: &EvalError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Evaluate `filter` over `candidates`, in order.
pub fn scan<I, R>(
    filter: &FilterNode,
    candidates: I,
    aliases: &AliasBinding,
    resolver: &R,
    config: &FilterConfig,
) -> Result<ScanOutcome, EvalError>
where
    I: IntoIterator<Item = Triplet>,
    R: PropertyResolver + ?Sized,
{
    let mut outcome = ScanOutcome::default();
    if config.limit == Some(0) {
        return Ok(outcome);
    }

    for candidate in candidates {
        outcome.examined += 1;
        match evaluate(filter, &candidate, aliases, resolver) {
            Ok(true) => {
                outcome.matches.push(candidate);
                if config.limit.is_some_and(|limit| outcome.matches.len() >= limit) {
                    break;
                }
            }
            Ok(false) => {}
            Err(error @ EvalError::InvalidPropertyValue { .. })
                if config.on_invalid_value == InvalidValuePolicy::SkipCandidate =>
            {
                tracing::warn!(
                    subject = %candidate.subject,
                    object = %candidate.object,
                    %error,
                    "skipping candidate"
                );
                outcome.skipped.push(SkippedCandidate { candidate, error });
            }
            Err(error) => return Err(error),
        }
    }

    tracing::debug!(
        examined = outcome.examined,
        matched = outcome.matches.len(),
        skipped = outcome.skipped.len(),
        "filter scan finished"
    );
    Ok(outcome)
}
