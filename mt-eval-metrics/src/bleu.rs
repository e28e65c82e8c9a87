pub mod score;
pub mod tokenizer;

pub use score::*;
pub use tokenizer::*;
