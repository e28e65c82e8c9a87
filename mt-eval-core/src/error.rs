use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Unknown {field} '{value}'. You must use one of: {choices}")]
    Configuration {
        field: &'static str,
        value: String,
        choices: String,
    },

    #[error("Batch length mismatch: {hypotheses} hypotheses vs {references} references")]
    LengthMismatch {
        hypotheses: usize,
        references: usize,
    },

    #[error("Scoring error: {0}")]
    Scoring(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    /// Construction-time rejection of a value outside its allowed set.
    pub fn configuration(field: &'static str, value: impl Into<String>, choices: &[&str]) -> Self {
        EvalError::Configuration {
            field,
            value: value.into(),
            choices: choices.join(", "),
        }
    }

    pub fn scoring(msg: impl Into<String>) -> Self {
        EvalError::Scoring(msg.into())
    }
}
