use mt_eval_core::{Evaluator, Result};

use crate::bleu::{corpus_bleu, BleuConfig};

/// Corpus-BLEU evaluator over tokenized batches.
///
/// Joins each sentence's tokens back into a whitespace-separated line and
/// delegates to [`corpus_bleu`] with the stored configuration. The string
/// setters validate against the tokenizer and smoothing registries at
/// construction time; a built evaluator never fails on configuration again.
#[derive(Debug, Clone)]
pub struct SacreBleuEvaluator {
    name: String,
    config: BleuConfig,
}

impl SacreBleuEvaluator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: BleuConfig::default(),
        }
    }

    /// Sets the smoothing method from its identifier ("exp", "floor", "none").
    pub fn smooth_method(mut self, value: &str) -> Result<Self> {
        self.config.smooth_method = value.parse()?;
        Ok(self)
    }

    pub fn smooth_value(mut self, value: f64) -> Self {
        self.config.smooth_value = value;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.config.force = force;
        self
    }

    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Sets the tokenizer from its registry identifier.
    pub fn tokenize(mut self, value: &str) -> Result<Self> {
        self.config.tokenizer = value.parse()?;
        Ok(self)
    }

    pub fn use_effective_order(mut self, enabled: bool) -> Self {
        self.config.use_effective_order = enabled;
        self
    }

    pub fn config(&self) -> &BleuConfig {
        &self.config
    }
}

impl Evaluator for SacreBleuEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn score_batch(&self, hypotheses: &[Vec<String>], references: &[Vec<String>]) -> Result<f64> {
        let hyp_joined: Vec<String> = hypotheses.iter().map(|tokens| tokens.join(" ")).collect();
        let ref_joined: Vec<String> = references.iter().map(|tokens| tokens.join(" ")).collect();

        let result = corpus_bleu(&hyp_joined, std::slice::from_ref(&ref_joined), &self.config)?;
        Ok(result.score)
    }
}

/// The conventional default instance, named "BLEU" with default
/// configuration. Called once during evaluation setup and shared from there.
pub fn default_bleu() -> SacreBleuEvaluator {
    SacreBleuEvaluator::new("BLEU")
}
