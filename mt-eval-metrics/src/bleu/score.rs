use mt_eval_core::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::tokenizer::Tokenizer;

/// Highest n-gram order entering the geometric mean.
pub const MAX_NGRAM_ORDER: usize = 4;

/// Identifiers accepted for the `smooth_method` configuration value.
pub const SMOOTH_METHODS: [&str; 3] = ["exp", "floor", "none"];

/// Stand-in for ln(0) so a zero precision collapses the geometric mean to
/// zero instead of producing a NaN.
const LOG_ZERO: f64 = -9_999_999_999.0;

/// Adjustment applied to an n-gram precision when its match count is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    /// Exponential decay: each zero-match order halves the assigned precision.
    #[default]
    Exp,
    /// Fixed floor taken from `smooth_value`.
    Floor,
    /// No adjustment; any zero precision zeroes the whole score.
    None,
}

impl SmoothingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmoothingMethod::Exp => "exp",
            SmoothingMethod::Floor => "floor",
            SmoothingMethod::None => "none",
        }
    }
}

impl FromStr for SmoothingMethod {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exp" => Ok(SmoothingMethod::Exp),
            "floor" => Ok(SmoothingMethod::Floor),
            "none" => Ok(SmoothingMethod::None),
            other => Err(EvalError::configuration(
                "smoothing method",
                other,
                &SMOOTH_METHODS,
            )),
        }
    }
}

impl fmt::Display for SmoothingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corpus-BLEU scoring parameters. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BleuConfig {
    pub smooth_method: SmoothingMethod,
    /// Floor precision numerator, used when `smooth_method` is `floor`.
    pub smooth_value: f64,
    /// Silences the pre-tokenized-input warning.
    pub force: bool,
    pub lowercase: bool,
    pub tokenizer: Tokenizer,
    /// Caps the geometric mean at the highest order that produced any
    /// n-grams, for short or sentence-level inputs.
    pub use_effective_order: bool,
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            smooth_method: SmoothingMethod::Exp,
            smooth_value: 0.0,
            force: false,
            lowercase: false,
            tokenizer: Tokenizer::None,
            use_effective_order: false,
        }
    }
}

/// Corpus-level BLEU result on the 0-100 scale, with the per-order
/// precision breakdown the summary line reports.
#[derive(Debug, Clone, Serialize)]
pub struct BleuScore {
    pub score: f64,
    pub precisions: [f64; MAX_NGRAM_ORDER],
    pub brevity_penalty: f64,
    pub hyp_len: usize,
    pub ref_len: usize,
}

impl fmt::Display for BleuScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ratio = if self.ref_len == 0 {
            0.0
        } else {
            self.hyp_len as f64 / self.ref_len as f64
        };
        write!(
            f,
            "BLEU = {:.2} {:.1}/{:.1}/{:.1}/{:.1} (BP = {:.3}, ratio = {:.3}, hyp_len = {}, ref_len = {})",
            self.score,
            self.precisions[0],
            self.precisions[1],
            self.precisions[2],
            self.precisions[3],
            self.brevity_penalty,
            ratio,
            self.hyp_len,
            self.ref_len,
        )
    }
}

fn preprocess(line: &str, config: &BleuConfig) -> String {
    let line = if config.lowercase {
        line.to_lowercase()
    } else {
        line.to_string()
    };
    config.tokenizer.tokenize(&line)
}

fn ngram_counts<'a>(tokens: &[&'a str], n: usize) -> HashMap<Vec<&'a str>, usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window.to_vec()).or_insert(0) += 1;
        }
    }
    counts
}

fn smoothed_ln(value: f64) -> f64 {
    if value == 0.0 {
        LOG_ZERO
    } else {
        value.ln()
    }
}

/// Computes corpus-level BLEU over aligned hypothesis/reference streams.
///
/// `reference_streams` holds one or more streams, each aligned by position
/// with `hypotheses`. Matches are clipped against the maximum count of each
/// n-gram across the reference streams, and the brevity penalty uses the
/// reference length closest to each hypothesis (ties go to the shorter one).
///
/// An empty corpus or a reference stream of the wrong length is a
/// [`EvalError::Scoring`] error.
pub fn corpus_bleu(
    hypotheses: &[String],
    reference_streams: &[Vec<String>],
    config: &BleuConfig,
) -> Result<BleuScore> {
    if hypotheses.is_empty() {
        return Err(EvalError::scoring("empty corpus: no hypotheses to score"));
    }
    if reference_streams.is_empty() {
        return Err(EvalError::scoring("empty corpus: no reference streams"));
    }
    for (idx, stream) in reference_streams.iter().enumerate() {
        if stream.len() != hypotheses.len() {
            return Err(EvalError::scoring(format!(
                "reference stream {} has {} sentences, expected {}",
                idx,
                stream.len(),
                hypotheses.len()
            )));
        }
    }

    if !config.force && config.tokenizer != Tokenizer::None {
        let suspicious = hypotheses.iter().filter(|h| h.ends_with(" .")).count();
        if suspicious * 2 > hypotheses.len() {
            warn!(
                suspicious,
                total = hypotheses.len(),
                "hypotheses look pre-tokenized; scores may be inflated (set force to silence)"
            );
        }
    }

    let mut correct = [0usize; MAX_NGRAM_ORDER];
    let mut total = [0usize; MAX_NGRAM_ORDER];
    let mut hyp_len = 0usize;
    let mut ref_len = 0usize;

    for (i, hyp) in hypotheses.iter().enumerate() {
        let hyp_line = preprocess(hyp, config);
        let hyp_tokens: Vec<&str> = hyp_line.split_whitespace().collect();
        hyp_len += hyp_tokens.len();

        let ref_lines: Vec<String> = reference_streams
            .iter()
            .map(|stream| preprocess(&stream[i], config))
            .collect();
        let ref_token_lists: Vec<Vec<&str>> = ref_lines
            .iter()
            .map(|line| line.split_whitespace().collect())
            .collect();

        // Closest reference length by absolute difference, shorter on ties.
        let mut closest: Option<(usize, usize)> = None;
        for tokens in &ref_token_lists {
            let diff = tokens.len().abs_diff(hyp_tokens.len());
            closest = match closest {
                Some((best_diff, best_len))
                    if (best_diff, best_len) <= (diff, tokens.len()) =>
                {
                    Some((best_diff, best_len))
                }
                _ => Some((diff, tokens.len())),
            };
        }
        ref_len += closest.map(|(_, len)| len).unwrap_or(0);

        for n in 1..=MAX_NGRAM_ORDER {
            let hyp_counts = ngram_counts(&hyp_tokens, n);
            if hyp_counts.is_empty() {
                continue;
            }

            let mut max_ref_counts: HashMap<Vec<&str>, usize> = HashMap::new();
            for tokens in &ref_token_lists {
                for (ngram, count) in ngram_counts(tokens, n) {
                    let entry = max_ref_counts.entry(ngram).or_insert(0);
                    *entry = (*entry).max(count);
                }
            }

            for (ngram, count) in &hyp_counts {
                total[n - 1] += count;
                if let Some(ref_count) = max_ref_counts.get(ngram) {
                    correct[n - 1] += count.min(ref_count);
                }
            }
        }
    }

    let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
    let mut effective_order = MAX_NGRAM_ORDER;
    let mut smooth_exp = 1.0f64;

    for n in 0..MAX_NGRAM_ORDER {
        if total[n] == 0 {
            break;
        }
        if config.use_effective_order {
            effective_order = n + 1;
        }
        if correct[n] == 0 {
            match config.smooth_method {
                SmoothingMethod::Exp => {
                    smooth_exp *= 2.0;
                    precisions[n] = 100.0 / (smooth_exp * total[n] as f64);
                }
                SmoothingMethod::Floor => {
                    precisions[n] = 100.0 * config.smooth_value / total[n] as f64;
                }
                SmoothingMethod::None => {}
            }
        } else {
            precisions[n] = 100.0 * correct[n] as f64 / total[n] as f64;
        }
    }

    let brevity_penalty = if hyp_len < ref_len {
        if hyp_len > 0 {
            (1.0 - ref_len as f64 / hyp_len as f64).exp()
        } else {
            0.0
        }
    } else {
        1.0
    };

    let log_sum: f64 = precisions[..effective_order].iter().copied().map(smoothed_ln).sum();
    let score = brevity_penalty * (log_sum / effective_order as f64).exp();

    debug!(
        score,
        brevity_penalty,
        hyp_len,
        ref_len,
        sentences = hypotheses.len(),
        "corpus BLEU computed"
    );

    Ok(BleuScore {
        score,
        precisions,
        brevity_penalty,
        hyp_len,
        ref_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn perfect_match_scores_100() {
        let hyps = lines(&["the cat sat on the mat"]);
        let refs = vec![lines(&["the cat sat on the mat"])];
        let result = corpus_bleu(&hyps, &refs, &BleuConfig::default()).unwrap();
        assert!((result.score - 100.0).abs() < 1e-9);
        assert_eq!(result.brevity_penalty, 1.0);
    }

    #[test]
    fn clipping_limits_repeated_ngrams() {
        // "the the the the" against "the the": unigram precision is
        // clipped to min(4, 2) / 4.
        let hyps = lines(&["the the the the"]);
        let refs = vec![lines(&["the the"])];
        let config = BleuConfig {
            smooth_method: SmoothingMethod::None,
            use_effective_order: true,
            ..BleuConfig::default()
        };
        let result = corpus_bleu(&hyps, &refs, &config).unwrap();
        assert!((result.precisions[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn multiple_reference_streams_take_max_counts() {
        let hyps = lines(&["the cat sat"]);
        let refs = vec![lines(&["the dog sat"]), lines(&["the cat ran"])];
        let result = corpus_bleu(&hyps, &refs, &BleuConfig::default()).unwrap();
        // All three unigrams are covered across the two streams.
        assert!((result.precisions[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ragged_reference_stream_is_an_error() {
        let hyps = lines(&["a b", "c d"]);
        let refs = vec![lines(&["a b"])];
        let err = corpus_bleu(&hyps, &refs, &BleuConfig::default()).unwrap_err();
        assert!(err.to_string().contains("reference stream"));
    }

    #[test]
    fn display_reports_summary_line() {
        let hyps = lines(&["the cat sat on the mat"]);
        let refs = vec![lines(&["the cat sat on the mat"])];
        let result = corpus_bleu(&hyps, &refs, &BleuConfig::default()).unwrap();
        let line = result.to_string();
        assert!(line.starts_with("BLEU = 100.00 100.0/100.0/100.0/100.0"));
        assert!(line.contains("hyp_len = 6"));
    }
}
