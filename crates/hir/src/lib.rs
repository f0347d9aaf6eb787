//! HIR definitions and the semantic analysis built on top of them.
//!
//! The crate is split the same way the compiler passes consume it:
//!
//! - [`hir_def`] holds item and body definitions plus the builders used to
//!   assemble them programmatically.
//! - [`analysis`] holds semantic types, the conformance environment, and
//!   derived-conformance synthesis.
//! - [`db`] is the explicit compilation context threaded into every entry
//!   point: arenas, interners, the conformance table, and the diagnostic sink.

pub mod analysis;
pub mod db;
pub mod fmt;
pub mod hir_def;

pub use db::HirDb;
