//! HIR item and body definitions.

pub mod body;
pub mod builder;
pub mod ident;
pub mod item;

pub use body::*;
pub use builder::*;
pub use ident::*;
pub use item::*;
