use crate::error::{EvalError, Result};

/// A batch evaluation metric over aligned hypothesis/reference pairs.
///
/// Implementations are pure functions of their configuration and inputs:
/// no I/O, no shared mutable state, safe to call from multiple threads.
pub trait Evaluator: Send + Sync {
    /// Display name used by the host framework when reporting scores.
    fn name(&self) -> &str;

    /// Scores a batch of tokenized sentences, aligned by position.
    ///
    /// Callers are expected to go through
    /// [`score_batch_checked`](Evaluator::score_batch_checked); this entry
    /// point assumes the two batches have equal length.
    fn score_batch(&self, hypotheses: &[Vec<String>], references: &[Vec<String>]) -> Result<f64>;

    /// Length-checked wrapper around [`score_batch`](Evaluator::score_batch).
    ///
    /// Rejects with [`EvalError::LengthMismatch`] before any scoring work
    /// when the batches are not aligned pairwise.
    fn score_batch_checked(
        &self,
        hypotheses: &[Vec<String>],
        references: &[Vec<String>],
    ) -> Result<f64> {
        if hypotheses.len() != references.len() {
            return Err(EvalError::LengthMismatch {
                hypotheses: hypotheses.len(),
                references: references.len(),
            });
        }
        self.score_batch(hypotheses, references)
    }
}
