//! Judge implementations.

pub mod openai;

pub use openai::OpenAiJudge;
