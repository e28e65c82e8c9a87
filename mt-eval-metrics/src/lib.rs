pub mod bleu;
pub mod evaluators;

pub use bleu::*;
pub use evaluators::*;
