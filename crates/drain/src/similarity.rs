//! Token-sequence similarity, best-match selection and template
//! generalization.

use crate::cluster::Cluster;
use crate::error::{DrainError, DrainResult};

/// Leading character of a pinned template token. Pinned positions must match
/// the input exactly and are never generalized into a wildcard.
pub const PIN_MARKER: char = '\0';

/// Mark `token` as pinned.
pub fn pinned(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 1);
    out.push(PIN_MARKER);
    out.push_str(token);
    out
}

fn is_pinned(token: &str) -> bool {
    token.starts_with(PIN_MARKER)
}

/// How closely an input fits a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Fraction of positions that match (0.0 - 1.0).
    pub similarity: f64,
    /// Number of wildcard positions in the template.
    pub params: usize,
}

fn check_lengths(template: &[String], tokens: &[String]) -> DrainResult<()> {
    if template.len() != tokens.len() {
        return Err(DrainError::TokenLengthMismatch {
            template: template.len(),
            input: tokens.len(),
        });
    }
    Ok(())
}

/// Score `tokens` against `template`.
///
/// Returns `Ok(None)` when a pinned position differs. With `include_params`,
/// wildcard positions count as matches.
pub fn seq_distance(
    template: &[String],
    tokens: &[String],
    param: &str,
    include_params: bool,
) -> DrainResult<Option<Score>> {
    check_lengths(template, tokens)?;

    let mut similar = 0usize;
    let mut params = 0usize;
    for (t, token) in template.iter().zip(tokens) {
        if is_pinned(t) && t != token {
            return Ok(None);
        }
        if t == param {
            params += 1;
        } else if t == token {
            similar += 1;
        }
    }
    if include_params {
        similar += params;
    }

    let similarity = if template.is_empty() {
        1.0
    } else {
        similar as f64 / template.len() as f64
    };
    Ok(Some(Score { similarity, params }))
}

/// Pick the best-fitting candidate, if it reaches `threshold`.
///
/// Highest similarity wins. On a tie the template with more wildcard
/// positions is kept.
pub fn fast_match<'a>(
    candidates: impl IntoIterator<Item = &'a Cluster>,
    tokens: &[String],
    param: &str,
    threshold: f64,
    include_params: bool,
) -> DrainResult<Option<&'a Cluster>> {
    let mut best: Option<(&'a Cluster, Score)> = None;

    for cluster in candidates {
        let Some(score) = seq_distance(cluster.tokens(), tokens, param, include_params)? else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((_, top)) => {
                score.similarity > top.similarity
                    || (score.similarity == top.similarity && score.params > top.params)
            }
        };
        if better {
            best = Some((cluster, score));
        }
    }

    Ok(best
        .filter(|(_, score)| score.similarity >= threshold)
        .map(|(cluster, _)| cluster))
}

/// Generalize `template` to also cover `tokens`: every differing position
/// becomes the wildcard. Positions already holding the wildcard stay put.
pub fn create_template(template: &[String], tokens: &[String], param: &str) -> DrainResult<Vec<String>> {
    check_lengths(template, tokens)?;

    Ok(template
        .iter()
        .zip(tokens)
        .map(|(t, token)| if t == token { t.clone() } else { param.to_string() })
        .collect())
}
