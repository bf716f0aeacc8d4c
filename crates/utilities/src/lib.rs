#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible
)]
#![warn(clippy::doc_markdown)]

//! Occluders and ready-made scenes shared by integration tests and benchmarks.

pub mod occluders;
pub mod scenes;
