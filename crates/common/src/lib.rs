pub mod diagnostics;

pub use indexmap;
