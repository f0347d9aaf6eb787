//! Core-library items the analysis layer locates by name.

use crate::db::HirDb;
use crate::hir_def::{ProtocolBuilder, ProtocolId};

/// Associated-type slot of the elementwise protocol.
pub const ELEMENT_IDENT: &str = "Element";
/// Method slot of the elementwise protocol.
pub const UPDATE_IDENT: &str = "update";
/// Argument label of the aggregate parameter of `update`.
pub const WITH_LABEL: &str = "with";
/// Parameter name of the aggregate parameter of `update`.
pub const OTHER_IDENT: &str = "other";
/// Parameter name of the callback parameter of `update`.
pub const UPDATER_IDENT: &str = "updater";
/// Marker attribute pinning a struct's field layout across compilations.
pub const FIXED_LAYOUT_ATTR: &str = "fixed_layout";

/// Installs the canonical `Elementwise` protocol definition:
///
/// ```text
/// protocol Elementwise {
///     type Element
///     fn update(mut self, with other: Self, _ updater: (mut Element, Element) -> ())
/// }
/// ```
pub fn install_elementwise_protocol(db: &mut HirDb) -> ProtocolId {
    ProtocolBuilder::new(db, "Elementwise")
        .assoc_ty(ELEMENT_IDENT)
        .method(UPDATE_IDENT)
        .build()
}
