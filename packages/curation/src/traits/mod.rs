//! Core trait abstractions.
//!
//! The pipeline depends only on these capability interfaces; concrete
//! judge and collector implementations live in [`crate::judges`] and
//! [`crate::collectors`].

pub mod collector;
pub mod judge;
