//! Programmatic item construction.
//!
//! Used by tests and by embedders that assemble HIR without going through a
//! parser. Builders intern names eagerly and hand the finished definition to
//! the [`HirDb`] arenas.

use common::diagnostics::Span;
use common::indexmap::IndexMap;

use super::{
    FieldDef, FuncId, GenericParamDef, IdentId, ProtocolDef, ProtocolId, RequirementDef,
    RequirementKind, StructDef, StructId, Visibility,
};
use crate::analysis::ty::trait_def::{Conformance, ConformanceConflict, ConformanceId};
use crate::analysis::ty::ty_def::TyId;
use crate::db::HirDb;

pub struct StructBuilder<'db> {
    db: &'db mut HirDb,
    name: IdentId,
    generic_params: Vec<GenericParamDef>,
    fields: Vec<FieldDef>,
    vis: Visibility,
    span: Span,
}

impl<'db> StructBuilder<'db> {
    pub fn new(db: &'db mut HirDb, name: &str) -> Self {
        let name = db.ident(name);
        Self {
            db,
            name,
            generic_params: Vec::new(),
            fields: Vec::new(),
            vis: Visibility::Private,
            span: Span::invalid(),
        }
    }

    pub fn public(mut self) -> Self {
        self.vis = Visibility::Public;
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn generic_param(mut self, name: &str) -> Self {
        let name = self.db.ident(name);
        self.generic_params.push(GenericParamDef {
            name,
            bounds: Vec::new(),
        });
        self
    }

    pub fn field(mut self, name: &str, ty: TyId) -> Self {
        let name = self.db.ident(name);
        self.fields.push(FieldDef { name, ty });
        self
    }

    /// Declares a field whose type is the `idx`-th generic parameter.
    pub fn param_field(mut self, name: &str, idx: usize) -> Self {
        let param = self.generic_params[idx].name;
        let ty = TyId::param(self.db, param, idx);
        let name = self.db.ident(name);
        self.fields.push(FieldDef { name, ty });
        self
    }

    pub fn build(self) -> StructId {
        self.db.alloc_struct(StructDef {
            name: self.name,
            generic_params: self.generic_params,
            fields: self.fields,
            vis: self.vis,
            attrs: Vec::new(),
            members: Vec::new(),
            span: self.span,
        })
    }
}

pub struct ProtocolBuilder<'db> {
    db: &'db mut HirDb,
    name: IdentId,
    requirements: Vec<RequirementDef>,
    span: Span,
}

impl<'db> ProtocolBuilder<'db> {
    pub fn new(db: &'db mut HirDb, name: &str) -> Self {
        let name = db.ident(name);
        Self {
            db,
            name,
            requirements: Vec::new(),
            span: Span::invalid(),
        }
    }

    pub fn assoc_ty(self, name: &str) -> Self {
        self.requirement(name, RequirementKind::AssocTy)
    }

    pub fn method(self, name: &str) -> Self {
        self.requirement(name, RequirementKind::Method)
    }

    fn requirement(mut self, name: &str, kind: RequirementKind) -> Self {
        let name = self.db.ident(name);
        self.requirements.push(RequirementDef {
            name,
            kind,
            span: Span::invalid(),
        });
        self
    }

    pub fn build(self) -> ProtocolId {
        self.db.alloc_protocol(ProtocolDef {
            name: self.name,
            requirements: self.requirements,
            span: self.span,
        })
    }
}

/// Assembles a user-written conformance record.
pub struct ConformanceBuilder<'db> {
    db: &'db mut HirDb,
    self_ty: TyId,
    protocol: ProtocolId,
    type_witnesses: IndexMap<IdentId, TyId>,
    value_witnesses: IndexMap<IdentId, FuncId>,
}

impl<'db> ConformanceBuilder<'db> {
    pub fn new(db: &'db mut HirDb, self_ty: TyId, protocol: ProtocolId) -> Self {
        Self {
            db,
            self_ty,
            protocol,
            type_witnesses: IndexMap::new(),
            value_witnesses: IndexMap::new(),
        }
    }

    pub fn type_witness(mut self, name: &str, ty: TyId) -> Self {
        let name = self.db.ident(name);
        self.type_witnesses.insert(name, ty);
        self
    }

    pub fn value_witness(mut self, name: &str, func: FuncId) -> Self {
        let name = self.db.ident(name);
        self.value_witnesses.insert(name, func);
        self
    }

    pub fn register(self) -> Result<ConformanceId, ConformanceConflict> {
        self.db.register_conformance(Conformance {
            self_ty: self.self_ty,
            protocol: self.protocol,
            type_witnesses: self.type_witnesses,
            value_witnesses: self.value_witnesses,
        })
    }
}
