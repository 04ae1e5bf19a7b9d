//! Domain types for the curation pipeline.

pub mod article;
pub mod config;
pub mod state;
