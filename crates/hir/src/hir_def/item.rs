//! Item definitions: structs, protocols, functions, and type aliases.
//!
//! Items live in [`HirDb`] arenas and are addressed by entity handles. The
//! accessor methods on the handle types mirror how the analysis layer reads
//! them; mutation goes through `HirDb` so the single-writer discipline of the
//! compilation context is preserved.

use common::diagnostics::Span;
use cranelift_entity::entity_impl;
use derive_more::From;

use super::{Body, IdentId};
use crate::analysis::ty::ty_def::TyId;
use crate::db::HirDb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(u32);
entity_impl!(StructId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolId(u32);
entity_impl!(ProtocolId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(u32);
entity_impl!(FuncId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeAliasId(u32);
entity_impl!(TypeAliasId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// A marker attribute attached to an item, e.g. `#[fixed_layout]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
    pub name: IdentId,
}

/// A generic parameter declared on an item, with its protocol bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParamDef {
    pub name: IdentId,
    pub bounds: Vec<ProtocolId>,
}

/// A named stored field. Field names are unique within one struct; identity
/// across two values of the same struct type is by name, not position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: IdentId,
    pub ty: TyId,
}

#[derive(Debug)]
pub struct StructDef {
    pub name: IdentId,
    pub generic_params: Vec<GenericParamDef>,
    pub fields: Vec<FieldDef>,
    pub vis: Visibility,
    pub attrs: Vec<Attr>,
    pub members: Vec<MemberDef>,
    pub span: Span,
}

/// A member declaration nested inside a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub enum MemberDef {
    TypeAlias(TypeAliasId),
    Func(FuncId),
}

#[derive(Debug)]
pub struct ProtocolDef {
    pub name: IdentId,
    pub requirements: Vec<RequirementDef>,
    pub span: Span,
}

/// A requirement slot declared by a protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementDef {
    pub name: IdentId,
    pub kind: RequirementKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    AssocTy,
    Method,
}

#[derive(Debug)]
pub struct TypeAliasDef {
    pub name: IdentId,
    pub ty: TyId,
    pub origin: ItemOrigin,
}

/// Whether an item came from source or was produced by the compiler.
/// Synthesized items are excluded from user-facing item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrigin {
    Source,
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfKind {
    Shared,
    Mut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncParam {
    /// Argument label at call sites; `None` for positional parameters.
    pub label: Option<IdentId>,
    pub name: IdentId,
    pub ty: TyId,
}

#[derive(Debug)]
pub struct FuncDef {
    pub name: IdentId,
    /// The struct this function is a member of, if any.
    pub parent: Option<StructId>,
    pub generic_params: Vec<GenericParamDef>,
    pub self_param: Option<SelfKind>,
    pub params: Vec<FuncParam>,
    pub ret_ty: TyId,
    pub vis: Visibility,
    pub origin: ItemOrigin,
    /// Signature already checked; later passes skip re-validation.
    pub validated: bool,
    pub body: FuncBody,
}

#[derive(Debug)]
pub enum FuncBody {
    /// Declaration without a body (e.g. an externally checked witness).
    Missing,
    Block(Body),
    /// Deferred synthesis; replaced by `Block` on first elaboration.
    Pending(BodySynthesis),
}

/// Recipes for compiler-synthesized bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySynthesis {
    /// Field-wise `update` traversal for a derived elementwise conformance.
    ElementwiseUpdate { protocol: ProtocolId },
}

impl StructId {
    pub fn name(self, db: &HirDb) -> IdentId {
        db.struct_data(self).name
    }

    pub fn fields(self, db: &HirDb) -> &[FieldDef] {
        &db.struct_data(self).fields
    }

    pub fn generic_params(self, db: &HirDb) -> &[GenericParamDef] {
        &db.struct_data(self).generic_params
    }

    pub fn vis(self, db: &HirDb) -> Visibility {
        db.struct_data(self).vis
    }

    pub fn attrs(self, db: &HirDb) -> &[Attr] {
        &db.struct_data(self).attrs
    }

    pub fn members(self, db: &HirDb) -> &[MemberDef] {
        &db.struct_data(self).members
    }

    pub fn has_attr(self, db: &HirDb, name: &str) -> bool {
        self.attrs(db).iter().any(|attr| attr.name.data(db) == name)
    }

    /// The struct's declared type, applied to its own generic parameters.
    pub fn declared_ty(self, db: &mut HirDb) -> TyId {
        let params: Vec<IdentId> = self
            .generic_params(db)
            .iter()
            .map(|param| param.name)
            .collect();

        let mut ty = TyId::adt(db, self);
        for (idx, name) in params.into_iter().enumerate() {
            let arg = TyId::param(db, name, idx);
            ty = TyId::app(db, ty, arg);
        }
        ty
    }
}

impl ProtocolId {
    pub fn name(self, db: &HirDb) -> IdentId {
        db.protocol_data(self).name
    }

    pub fn requirements(self, db: &HirDb) -> &[RequirementDef] {
        &db.protocol_data(self).requirements
    }
}

impl FuncId {
    pub fn name(self, db: &HirDb) -> IdentId {
        db.func_data(self).name
    }

    pub fn parent(self, db: &HirDb) -> Option<StructId> {
        db.func_data(self).parent
    }

    pub fn generic_params(self, db: &HirDb) -> &[GenericParamDef] {
        &db.func_data(self).generic_params
    }

    pub fn self_param(self, db: &HirDb) -> Option<SelfKind> {
        db.func_data(self).self_param
    }

    pub fn params(self, db: &HirDb) -> &[FuncParam] {
        &db.func_data(self).params
    }

    pub fn ret_ty(self, db: &HirDb) -> TyId {
        db.func_data(self).ret_ty
    }

    pub fn vis(self, db: &HirDb) -> Visibility {
        db.func_data(self).vis
    }

    pub fn origin(self, db: &HirDb) -> ItemOrigin {
        db.func_data(self).origin
    }

    pub fn is_validated(self, db: &HirDb) -> bool {
        db.func_data(self).validated
    }
}

impl TypeAliasId {
    pub fn name(self, db: &HirDb) -> IdentId {
        db.type_alias_data(self).name
    }

    pub fn ty(self, db: &HirDb) -> TyId {
        db.type_alias_data(self).ty
    }

    pub fn origin(self, db: &HirDb) -> ItemOrigin {
        db.type_alias_data(self).origin
    }
}
