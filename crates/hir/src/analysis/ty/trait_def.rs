//! Conformance records and the conformance environment.
//!
//! A [`Conformance`] is the record that a specific type satisfies a specific
//! protocol, with a witness per requirement. The [`ConformanceEnv`] maintains
//! all conformances of a compilation unit, keyed by base type so that applied
//! generic types resolve to their constructor's conformance.

use common::indexmap::IndexMap;
use cranelift_entity::entity_impl;
use rustc_hash::FxHashMap;

use super::ty_def::TyId;
use crate::db::HirDb;
use crate::hir_def::{FuncId, IdentId, ProtocolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConformanceId(u32);
entity_impl!(ConformanceId);

/// A record that `self_ty` satisfies `protocol`, with witnesses keyed by
/// requirement name in declaration order.
#[derive(Debug)]
pub struct Conformance {
    pub self_ty: TyId,
    pub protocol: ProtocolId,
    pub type_witnesses: IndexMap<IdentId, TyId>,
    pub value_witnesses: IndexMap<IdentId, FuncId>,
}

impl ConformanceId {
    pub fn self_ty(self, db: &HirDb) -> TyId {
        db.conformance_data(self).self_ty
    }

    pub fn protocol(self, db: &HirDb) -> ProtocolId {
        db.conformance_data(self).protocol
    }

    /// The type witnessing an associated-type requirement, if declared.
    pub fn type_witness(self, db: &HirDb, name: IdentId) -> Option<TyId> {
        db.conformance_data(self).type_witnesses.get(&name).copied()
    }

    /// The declaration witnessing a value requirement, if declared.
    pub fn value_witness(self, db: &HirDb, name: IdentId) -> Option<FuncId> {
        db.conformance_data(self).value_witnesses.get(&name).copied()
    }
}

/// Returned when a conformance for the same (type, protocol) pair is already
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformanceConflict {
    pub existing: ConformanceId,
}

/// Conformance table for one compilation unit.
#[derive(Debug)]
pub struct ConformanceEnv {
    table: FxHashMap<(TyId, ProtocolId), ConformanceId>,
}

impl ConformanceEnv {
    pub(crate) fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub(crate) fn insert(&mut self, key: (TyId, ProtocolId), id: ConformanceId) {
        let prev = self.table.insert(key, id);
        debug_assert!(prev.is_none(), "conflicting conformance slipped past registration");
    }

    pub(crate) fn get(&self, key: (TyId, ProtocolId)) -> Option<ConformanceId> {
        self.table.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use common::indexmap::IndexMap;

    use super::*;
    use crate::analysis::ty::corelib;
    use crate::analysis::ty::ty_def::{PrimTy, TyId};
    use crate::hir_def::StructBuilder;

    #[test]
    fn duplicate_conformance_is_rejected() {
        let mut db = HirDb::new();
        let protocol = corelib::install_elementwise_protocol(&mut db);
        let float = TyId::prim(&mut db, PrimTy::Float);
        let dense = StructBuilder::new(&mut db, "Dense")
            .field("weights", float)
            .build();
        let dense_ty = TyId::adt(&mut db, dense);

        let first = db.register_conformance(Conformance {
            self_ty: dense_ty,
            protocol,
            type_witnesses: IndexMap::new(),
            value_witnesses: IndexMap::new(),
        });
        let first = first.expect("fresh registration");

        let second = db.register_conformance(Conformance {
            self_ty: dense_ty,
            protocol,
            type_witnesses: IndexMap::new(),
            value_witnesses: IndexMap::new(),
        });
        assert_eq!(second, Err(ConformanceConflict { existing: first }));
    }

    #[test]
    fn applied_generic_type_resolves_to_constructor_conformance() {
        let mut db = HirDb::new();
        let protocol = corelib::install_elementwise_protocol(&mut db);
        let holder = StructBuilder::new(&mut db, "Holder")
            .generic_param("T")
            .build();
        let holder_ty = TyId::adt(&mut db, holder);

        let conf = db
            .register_conformance(Conformance {
                self_ty: holder_ty,
                protocol,
                type_witnesses: IndexMap::new(),
                value_witnesses: IndexMap::new(),
            })
            .expect("fresh registration");

        let float = TyId::prim(&mut db, PrimTy::Float);
        let applied = TyId::app(&mut db, holder_ty, float);
        assert_eq!(db.lookup_conformance(applied, protocol), Some(conf));
    }

    #[test]
    fn missing_witnesses_are_none() {
        let mut db = HirDb::new();
        let protocol = corelib::install_elementwise_protocol(&mut db);
        let float = TyId::prim(&mut db, PrimTy::Float);
        let dense = StructBuilder::new(&mut db, "Dense")
            .field("weights", float)
            .build();
        let dense_ty = TyId::adt(&mut db, dense);

        let conf = db
            .register_conformance(Conformance {
                self_ty: dense_ty,
                protocol,
                type_witnesses: IndexMap::new(),
                value_witnesses: IndexMap::new(),
            })
            .expect("fresh registration");

        let element = db.ident(corelib::ELEMENT_IDENT);
        let update = db.ident(corelib::UPDATE_IDENT);
        assert_eq!(conf.type_witness(&db, element), None);
        assert_eq!(conf.value_witness(&db, update), None);
    }
}
