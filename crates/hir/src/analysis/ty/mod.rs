//! Semantic types, conformances, and derived-conformance synthesis.

pub mod corelib;
pub mod derive;
pub mod diagnostics;
pub mod trait_def;
pub mod ty_def;
