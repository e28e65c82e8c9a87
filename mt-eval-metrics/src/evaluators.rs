pub mod bleu;

pub use bleu::*;
