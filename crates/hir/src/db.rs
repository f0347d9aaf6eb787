//! The explicit compilation context.
//!
//! [`HirDb`] owns every arena and table the analysis layer reads: the
//! identifier interner, the type interner, item arenas, the conformance
//! environment, and the diagnostic sink. Entry points take it explicitly
//! instead of relying on ambient state; all mutation funnels through it under
//! the surrounding pass's single-writer discipline.

use common::diagnostics::CompleteDiagnostic;
use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashSet;

use crate::analysis::ty::derive;
use crate::analysis::ty::trait_def::{
    Conformance, ConformanceConflict, ConformanceEnv, ConformanceId,
};
use crate::analysis::ty::ty_def::{TyData, TyId, TyInterner};
use crate::hir_def::{
    Attr, Body, BodySynthesis, FuncBody, FuncDef, FuncId, IdentId, Interner, MemberDef,
    ProtocolDef, ProtocolId, StructDef, StructId, TypeAliasDef, TypeAliasId,
};

#[derive(Debug)]
pub struct HirDb {
    idents: Interner,
    tys: TyInterner,
    structs: PrimaryMap<StructId, StructDef>,
    protocols: PrimaryMap<ProtocolId, ProtocolDef>,
    funcs: PrimaryMap<FuncId, FuncDef>,
    type_aliases: PrimaryMap<TypeAliasId, TypeAliasDef>,
    conformances: PrimaryMap<ConformanceId, Conformance>,
    conformance_env: ConformanceEnv,
    /// Compiler-synthesized declarations, recorded for downstream tooling.
    synthesized: FxHashSet<FuncId>,
    diags: Vec<CompleteDiagnostic>,
}

impl HirDb {
    pub fn new() -> Self {
        Self {
            idents: Interner::new(),
            tys: TyInterner::new(),
            structs: PrimaryMap::new(),
            protocols: PrimaryMap::new(),
            funcs: PrimaryMap::new(),
            type_aliases: PrimaryMap::new(),
            conformances: PrimaryMap::new(),
            conformance_env: ConformanceEnv::new(),
            synthesized: FxHashSet::default(),
            diags: Vec::new(),
        }
    }

    pub fn ident(&mut self, name: &str) -> IdentId {
        self.idents.intern(name)
    }

    /// Looks up an identifier without interning it.
    pub fn lookup_ident(&self, name: &str) -> Option<IdentId> {
        self.idents.get(name)
    }

    pub(crate) fn ident_data(&self, id: IdentId) -> &str {
        self.idents.data(id)
    }

    pub fn intern_ty(&mut self, data: TyData) -> TyId {
        self.tys.intern(data)
    }

    pub(crate) fn ty_data(&self, id: TyId) -> &TyData {
        self.tys.data(id)
    }

    pub fn alloc_struct(&mut self, def: StructDef) -> StructId {
        debug_assert!(
            {
                let mut seen = FxHashSet::default();
                def.fields.iter().all(|field| seen.insert(field.name))
            },
            "struct field names must be unique"
        );
        self.structs.push(def)
    }

    pub fn alloc_protocol(&mut self, def: ProtocolDef) -> ProtocolId {
        self.protocols.push(def)
    }

    pub fn alloc_func(&mut self, def: FuncDef) -> FuncId {
        self.funcs.push(def)
    }

    pub fn alloc_type_alias(&mut self, def: TypeAliasDef) -> TypeAliasId {
        self.type_aliases.push(def)
    }

    pub(crate) fn struct_data(&self, id: StructId) -> &StructDef {
        &self.structs[id]
    }

    pub(crate) fn protocol_data(&self, id: ProtocolId) -> &ProtocolDef {
        &self.protocols[id]
    }

    pub(crate) fn func_data(&self, id: FuncId) -> &FuncDef {
        &self.funcs[id]
    }

    pub(crate) fn type_alias_data(&self, id: TypeAliasId) -> &TypeAliasDef {
        &self.type_aliases[id]
    }

    pub(crate) fn conformance_data(&self, id: ConformanceId) -> &Conformance {
        &self.conformances[id]
    }

    pub fn add_struct_member(&mut self, strukt: StructId, member: MemberDef) {
        self.structs[strukt].members.push(member);
    }

    /// Attaches the `#[fixed_layout]` marker. Idempotent: a repeat marking is
    /// a no-op.
    pub fn attach_fixed_layout(&mut self, strukt: StructId) {
        let name = self.ident(crate::analysis::ty::corelib::FIXED_LAYOUT_ATTR);
        let attrs = &mut self.structs[strukt].attrs;
        if !attrs.iter().any(|attr| attr.name == name) {
            attrs.push(Attr { name });
        }
    }

    /// Finds a type-alias member of `strukt` by name.
    pub fn type_alias_member(&self, strukt: StructId, name: IdentId) -> Option<TypeAliasId> {
        self.structs[strukt].members.iter().find_map(|member| match member {
            MemberDef::TypeAlias(alias) if self.type_aliases[*alias].name == name => Some(*alias),
            _ => None,
        })
    }

    /// Registers a conformance record. A second registration for the same
    /// (base type, protocol) pair is rejected.
    pub fn register_conformance(
        &mut self,
        conf: Conformance,
    ) -> Result<ConformanceId, ConformanceConflict> {
        let key = (conf.self_ty.base_ty(self), conf.protocol);
        if let Some(existing) = self.conformance_env.get(key) {
            return Err(ConformanceConflict { existing });
        }
        let id = self.conformances.push(conf);
        self.conformance_env.insert(key, id);
        Ok(id)
    }

    /// Looks up the conformance of `ty`'s base type to `protocol`.
    pub fn lookup_conformance(&self, ty: TyId, protocol: ProtocolId) -> Option<ConformanceId> {
        self.conformance_env.get((ty.base_ty(self), protocol))
    }

    pub fn mark_synthesized(&mut self, func: FuncId) {
        self.synthesized.insert(func);
    }

    pub fn is_synthesized(&self, func: FuncId) -> bool {
        self.synthesized.contains(&func)
    }

    pub fn push_diag(&mut self, diag: CompleteDiagnostic) {
        self.diags.push(diag);
    }

    pub fn diags(&self) -> &[CompleteDiagnostic] {
        &self.diags
    }

    /// The function's elaborated body, if one is present.
    pub fn func_body(&self, func: FuncId) -> Option<&Body> {
        match &self.funcs[func].body {
            FuncBody::Block(body) => Some(body),
            _ => None,
        }
    }

    /// Returns the function's body, elaborating it on first demand.
    ///
    /// A pending synthesized body is built exactly once and cached; bodyless
    /// declarations cannot be elaborated and panic.
    pub fn elaborate_body(&mut self, func: FuncId) -> &Body {
        if let FuncBody::Pending(synthesis) = &self.funcs[func].body {
            let synthesis = *synthesis;
            let body = match synthesis {
                BodySynthesis::ElementwiseUpdate { protocol } => {
                    derive::synthesize_update_body(self, func, protocol)
                }
            };
            self.funcs[func].body = FuncBody::Block(body);
        }

        match &self.funcs[func].body {
            FuncBody::Block(body) => body,
            FuncBody::Missing => {
                let name = self.funcs[func].name;
                panic!("function `{}` has no body to elaborate", name.data(self))
            }
            FuncBody::Pending(_) => unreachable!("pending body was just elaborated"),
        }
    }
}

impl Default for HirDb {
    fn default() -> Self {
        Self::new()
    }
}
