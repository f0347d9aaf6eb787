//! Semantic type definitions.
//!
//! Types are interned: structurally equal [`TyData`] values share one [`TyId`],
//! so type equality anywhere in the analysis layer is handle equality.

use cranelift_entity::{PrimaryMap, entity_impl};
use rustc_hash::FxHashMap;

use crate::db::HirDb;
use crate::hir_def::{IdentId, StructId};

/// An interned semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyId(u32);
entity_impl!(TyId);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TyData {
    Prim(PrimTy),
    /// Nominal struct type constructor.
    Adt(StructId),
    /// Application of a type constructor to an argument.
    App(TyId, TyId),
    /// A generic parameter bound on the enclosing item.
    Param(ParamTy),
    Func(FuncTy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimTy {
    Unit,
    Bool,
    Int,
    Float,
}

impl PrimTy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "()",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamTy {
    pub name: IdentId,
    pub idx: usize,
}

/// Function type. Callback parameters may be marked `mut`; non-escaping
/// function values may only be called, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncTy {
    pub params: Vec<FuncTyParam>,
    pub ret: TyId,
    pub is_escaping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncTyParam {
    pub is_mut: bool,
    pub ty: TyId,
}

impl TyId {
    pub fn prim(db: &mut HirDb, prim: PrimTy) -> Self {
        db.intern_ty(TyData::Prim(prim))
    }

    pub fn unit(db: &mut HirDb) -> Self {
        Self::prim(db, PrimTy::Unit)
    }

    pub fn adt(db: &mut HirDb, strukt: StructId) -> Self {
        db.intern_ty(TyData::Adt(strukt))
    }

    pub fn app(db: &mut HirDb, base: Self, arg: Self) -> Self {
        db.intern_ty(TyData::App(base, arg))
    }

    pub fn param(db: &mut HirDb, name: IdentId, idx: usize) -> Self {
        db.intern_ty(TyData::Param(ParamTy { name, idx }))
    }

    pub fn func(db: &mut HirDb, func: FuncTy) -> Self {
        db.intern_ty(TyData::Func(func))
    }

    pub fn data(self, db: &HirDb) -> &TyData {
        db.ty_data(self)
    }

    /// Strips applied arguments down to the base constructor.
    pub fn base_ty(self, db: &HirDb) -> Self {
        match *self.data(db) {
            TyData::App(base, _) => base.base_ty(db),
            _ => self,
        }
    }

    /// The struct behind this type, if its base is a nominal type.
    pub fn as_adt(self, db: &HirDb) -> Option<StructId> {
        match *self.base_ty(db).data(db) {
            TyData::Adt(strukt) => Some(strukt),
            _ => None,
        }
    }

    pub fn pretty_print(self, db: &HirDb) -> String {
        match self.data(db) {
            TyData::Prim(prim) => prim.as_str().to_string(),
            TyData::Adt(strukt) => strukt.name(db).data(db).to_string(),
            TyData::App(..) => {
                let mut args = Vec::new();
                let mut base = self;
                while let TyData::App(inner, arg) = *base.data(db) {
                    args.push(arg);
                    base = inner;
                }
                args.reverse();
                let args: Vec<String> = args.into_iter().map(|arg| arg.pretty_print(db)).collect();
                format!("{}<{}>", base.pretty_print(db), args.join(", "))
            }
            TyData::Param(param) => param.name.data(db).to_string(),
            TyData::Func(func) => {
                let params: Vec<String> = func
                    .params
                    .iter()
                    .map(|param| {
                        let ty = param.ty.pretty_print(db);
                        if param.is_mut { format!("mut {ty}") } else { ty }
                    })
                    .collect();
                format!("({}) -> {}", params.join(", "), func.ret.pretty_print(db))
            }
        }
    }
}

/// Type interner owned by [`HirDb`].
#[derive(Debug)]
pub(crate) struct TyInterner {
    data: PrimaryMap<TyId, TyData>,
    map: FxHashMap<TyData, TyId>,
}

impl TyInterner {
    pub(crate) fn new() -> Self {
        Self {
            data: PrimaryMap::new(),
            map: FxHashMap::default(),
        }
    }

    pub(crate) fn intern(&mut self, data: TyData) -> TyId {
        if let Some(&id) = self.map.get(&data) {
            return id;
        }
        let id = self.data.push(data.clone());
        self.map.insert(data, id);
        id
    }

    pub(crate) fn data(&self, id: TyId) -> &TyData {
        &self.data[id]
    }
}
