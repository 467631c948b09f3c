//! Generative model implementations.

mod openai;

pub use openai::OpenAi;
