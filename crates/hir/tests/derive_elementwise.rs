//! End-to-end tests for elementwise conformance derivation: associated-type
//! inference, requirement dispatch, and body synthesis.

use hir::HirDb;
use hir::analysis::ty::corelib;
use hir::analysis::ty::derive::{
    can_derive, derive_ty_requirement, derive_value_requirement, infer_element_ty,
};
use hir::analysis::ty::ty_def::{FuncTy, FuncTyParam, PrimTy, TyId};
use hir::fmt::{format_body, format_signature};
use hir::hir_def::{
    Body, ConformanceBuilder, FuncBody, FuncDef, FuncId, FuncParam, ItemOrigin, MemberDef,
    ProtocolBuilder, ProtocolId, RequirementDef, SelfKind, StructBuilder, StructId, Visibility,
};

/// Pulls a declared requirement off the protocol by name.
fn requirement(db: &HirDb, protocol: ProtocolId, name: &str) -> RequirementDef {
    let name = db.lookup_ident(name).expect("requirement name is interned");
    protocol
        .requirements(db)
        .iter()
        .find(|req| req.name == name)
        .expect("protocol declares the requirement")
        .clone()
}

/// Derives both requirements for `strukt`, returning the synthesized method.
fn derive_both(db: &mut HirDb, strukt: StructId, protocol: ProtocolId) -> FuncId {
    let elem_req = requirement(db, protocol, corelib::ELEMENT_IDENT);
    derive_ty_requirement(db, strukt, protocol, &elem_req).expect("element type derivable");
    let update_req = requirement(db, protocol, corelib::UPDATE_IDENT);
    derive_value_requirement(db, strukt, protocol, &update_req).expect("method derivable")
}

fn elaborated(db: &mut HirDb, func: FuncId) -> String {
    db.elaborate_body(func);
    let body: &Body = db.func_body(func).expect("body was elaborated");
    format_body(db, func, body)
}

/// Declares a `Dense` struct with a hand-written conformance whose element
/// type is `element`, returning the struct and its `update` witness.
fn dense_with_conformance(
    db: &mut HirDb,
    protocol: ProtocolId,
    element: TyId,
) -> (StructId, FuncId) {
    let dense = StructBuilder::new(db, "Dense")
        .public()
        .field("weights", element)
        .build();
    let dense_ty = TyId::adt(db, dense);

    let unit = TyId::unit(db);
    let updater_ty = TyId::func(
        db,
        FuncTy {
            params: vec![
                FuncTyParam {
                    is_mut: true,
                    ty: element,
                },
                FuncTyParam {
                    is_mut: false,
                    ty: element,
                },
            ],
            ret: unit,
            is_escaping: false,
        },
    );
    let name = db.ident(corelib::UPDATE_IDENT);
    let with_label = db.ident(corelib::WITH_LABEL);
    let other = db.ident(corelib::OTHER_IDENT);
    let updater = db.ident(corelib::UPDATER_IDENT);
    let witness = db.alloc_func(FuncDef {
        name,
        parent: Some(dense),
        generic_params: vec![],
        self_param: Some(SelfKind::Mut),
        params: vec![
            FuncParam {
                label: Some(with_label),
                name: other,
                ty: dense_ty,
            },
            FuncParam {
                label: None,
                name: updater,
                ty: updater_ty,
            },
        ],
        ret_ty: unit,
        vis: Visibility::Public,
        origin: ItemOrigin::Source,
        validated: true,
        body: FuncBody::Missing,
    });
    db.add_struct_member(dense, witness.into());

    ConformanceBuilder::new(db, dense_ty, protocol)
        .type_witness(corelib::ELEMENT_IDENT, element)
        .value_witness(corelib::UPDATE_IDENT, witness)
        .register()
        .expect("fresh conformance");

    (dense, witness)
}

#[test]
fn zero_field_struct_is_refused_without_diagnostics() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let empty = StructBuilder::new(&mut db, "Empty").build();

    assert!(!can_derive(&db, empty, protocol));

    let elem_req = requirement(&db, protocol, corelib::ELEMENT_IDENT);
    assert_eq!(derive_ty_requirement(&mut db, empty, protocol, &elem_req), None);

    let update_req = requirement(&db, protocol, corelib::UPDATE_IDENT);
    assert_eq!(
        derive_value_requirement(&mut db, empty, protocol, &update_req),
        None
    );

    // Refusal is surfaced to the caller, never as a diagnostic from here.
    assert!(db.diags().is_empty());
}

#[test]
fn same_typed_fields_infer_their_common_type() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .field("offset", float)
        .build();

    assert!(can_derive(&db, scaled, protocol));
    assert_eq!(infer_element_ty(&db, scaled, protocol), Some(float));

    let elem_req = requirement(&db, protocol, corelib::ELEMENT_IDENT);
    assert_eq!(
        derive_ty_requirement(&mut db, scaled, protocol, &elem_req),
        Some(float)
    );

    // The inferred type is materialized as a synthesized `type Element` member.
    let element = db.lookup_ident(corelib::ELEMENT_IDENT).unwrap();
    let alias = db.type_alias_member(scaled, element).expect("alias recorded");
    assert_eq!(alias.ty(&db), float);
    assert_eq!(alias.origin(&db), ItemOrigin::Synthesized);
}

#[test]
fn mixed_parameter_types_are_refused_in_either_order() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let int = TyId::prim(&mut db, PrimTy::Int);

    let mixed = StructBuilder::new(&mut db, "Mixed")
        .field("a", float)
        .field("b", int)
        .build();
    let flipped = StructBuilder::new(&mut db, "Flipped")
        .field("b", int)
        .field("a", float)
        .build();

    assert_eq!(infer_element_ty(&db, mixed, protocol), None);
    assert_eq!(infer_element_ty(&db, flipped, protocol), None);
    assert!(!can_derive(&db, mixed, protocol));
    assert!(!can_derive(&db, flipped, protocol));
}

#[test]
fn leaf_fields_get_direct_updater_application() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .field("offset", float)
        .build();

    let update = derive_both(&mut db, scaled, protocol);
    assert_eq!(
        elaborated(&mut db, update),
        "updater(mut self.factor, other.factor)\n\
         updater(mut self.offset, other.offset)"
    );
}

#[test]
fn conforming_fields_get_recursive_update_calls() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let tensor_def = StructBuilder::new(&mut db, "Tensor")
        .public()
        .field("data", float)
        .build();
    let tensor = TyId::adt(&mut db, tensor_def);
    let (dense, _) = dense_with_conformance(&mut db, protocol, tensor);
    let dense_ty = TyId::adt(&mut db, dense);

    let pair = StructBuilder::new(&mut db, "Pair")
        .field("weight", dense_ty)
        .field("bias", dense_ty)
        .build();

    // Both fields resolve to Dense's `Element` witness.
    assert_eq!(infer_element_ty(&db, pair, protocol), Some(tensor));

    let update = derive_both(&mut db, pair, protocol);
    assert_eq!(
        elaborated(&mut db, update),
        "self.weight.update(with: other.weight, updater)\n\
         self.bias.update(with: other.bias, updater)"
    );
}

#[test]
fn leaf_and_aggregate_fields_mix_in_one_body() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let tensor_def = StructBuilder::new(&mut db, "Tensor")
        .public()
        .field("data", float)
        .build();
    let tensor = TyId::adt(&mut db, tensor_def);
    let (dense, _) = dense_with_conformance(&mut db, protocol, tensor);
    let dense_ty = TyId::adt(&mut db, dense);

    // `layer` recurses through its witness; `bias` resolves to `Tensor`
    // directly, so both parameter types agree on `Tensor`.
    let model = StructBuilder::new(&mut db, "Model")
        .field("layer", dense_ty)
        .field("bias", tensor)
        .build();

    assert_eq!(infer_element_ty(&db, model, protocol), Some(tensor));

    let update = derive_both(&mut db, model, protocol);
    assert_eq!(
        elaborated(&mut db, update),
        "self.layer.update(with: other.layer, updater)\n\
         updater(mut self.bias, other.bias)"
    );
}

#[test]
fn synthesized_method_signature_and_flags() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .public()
        .field("factor", float)
        .field("offset", float)
        .build();

    let update = derive_both(&mut db, scaled, protocol);

    assert_eq!(
        format_signature(&db, update),
        "fn update(mut self, with other: Scaled, _ updater: (mut float, float) -> ())"
    );
    assert_eq!(update.self_param(&db), Some(SelfKind::Mut));
    assert_eq!(update.vis(&db), Visibility::Public);
    assert_eq!(update.origin(&db), ItemOrigin::Synthesized);
    assert!(update.is_validated(&db));
    assert!(db.is_synthesized(update));
    assert_eq!(update.parent(&db), Some(scaled));

    // Registered as a member exactly once.
    let count = scaled
        .members(&db)
        .iter()
        .filter(|member| matches!(member, MemberDef::Func(f) if *f == update))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn generic_struct_derives_its_param_as_element() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let holder = StructBuilder::new(&mut db, "Holder")
        .public()
        .generic_param("T")
        .param_field("value", 0)
        .build();

    let update = derive_both(&mut db, holder, protocol);

    // Generic parameters are inherited verbatim from the struct.
    assert_eq!(update.generic_params(&db), holder.generic_params(&db));
    assert_eq!(
        format_signature(&db, update),
        "fn update<T>(mut self, with other: Holder<T>, _ updater: (mut T, T) -> ())"
    );
    assert_eq!(
        elaborated(&mut db, update),
        "updater(mut self.value, other.value)"
    );
}

#[test]
fn body_synthesis_is_deterministic_and_cached() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);

    let first = StructBuilder::new(&mut db, "First")
        .field("factor", float)
        .field("offset", float)
        .build();
    let second = StructBuilder::new(&mut db, "Second")
        .field("factor", float)
        .field("offset", float)
        .build();

    let update_first = derive_both(&mut db, first, protocol);
    let update_second = derive_both(&mut db, second, protocol);

    // Identical field declaration order yields identical statement order.
    assert_eq!(
        elaborated(&mut db, update_first),
        elaborated(&mut db, update_second)
    );

    // Elaborating again returns the cached body, not a rebuilt one.
    let first_ptr = db.elaborate_body(update_first) as *const Body;
    let second_ptr = db.elaborate_body(update_first) as *const Body;
    assert_eq!(first_ptr, second_ptr);
}

#[test]
fn fixed_layout_marker_is_idempotent() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .field("offset", float)
        .build();

    let elem_req = requirement(&db, protocol, corelib::ELEMENT_IDENT);
    derive_ty_requirement(&mut db, scaled, protocol, &elem_req);
    derive_ty_requirement(&mut db, scaled, protocol, &elem_req);
    let update_req = requirement(&db, protocol, corelib::UPDATE_IDENT);
    derive_value_requirement(&mut db, scaled, protocol, &update_req);

    let marker_count = scaled
        .attrs(&db)
        .iter()
        .filter(|attr| attr.name.data(&db) == corelib::FIXED_LAYOUT_ATTR)
        .count();
    assert_eq!(marker_count, 1);
    assert!(scaled.has_attr(&db, corelib::FIXED_LAYOUT_ATTR));

    // Re-derivation also leaves a single `Element` alias member.
    let element = db.lookup_ident(corelib::ELEMENT_IDENT).unwrap();
    let alias_count = scaled
        .members(&db)
        .iter()
        .filter(|member| {
            matches!(member, MemberDef::TypeAlias(alias) if alias.name(&db) == element)
        })
        .count();
    assert_eq!(alias_count, 1);
}

#[test]
fn unknown_requirement_reports_a_broken_protocol() {
    let mut db = HirDb::new();
    let broken = ProtocolBuilder::new(&mut db, "Elementwise")
        .assoc_ty(corelib::ELEMENT_IDENT)
        .method("normalize")
        .build();
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .build();

    let bad_req = requirement(&db, broken, "normalize");
    assert_eq!(
        derive_value_requirement(&mut db, scaled, broken, &bad_req),
        None
    );

    assert_eq!(db.diags().len(), 1);
    let diag = &db.diags()[0];
    assert_eq!(diag.error_code.to_string(), "derive-001");
    assert!(diag.message.contains("normalize"));

    // No marker is attached on the defensive path.
    assert!(!scaled.has_attr(&db, corelib::FIXED_LAYOUT_ATTR));
}

#[test]
fn requirement_kind_mismatch_is_also_broken() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .build();

    // The associated-type slot handed to the value entry point (and vice
    // versa) is protocol drift, not a derivable request.
    let elem_req = requirement(&db, protocol, corelib::ELEMENT_IDENT);
    assert_eq!(
        derive_value_requirement(&mut db, scaled, protocol, &elem_req),
        None
    );
    let update_req = requirement(&db, protocol, corelib::UPDATE_IDENT);
    assert_eq!(
        derive_ty_requirement(&mut db, scaled, protocol, &update_req),
        None
    );
    assert_eq!(db.diags().len(), 2);
}

#[test]
#[should_panic(expected = "`Element` alias must be derived")]
fn method_derivation_requires_the_element_alias() {
    let mut db = HirDb::new();
    let protocol = corelib::install_elementwise_protocol(&mut db);
    let float = TyId::prim(&mut db, PrimTy::Float);
    let scaled = StructBuilder::new(&mut db, "Scaled")
        .field("factor", float)
        .build();

    // Skipping the associated-type derivation violates the documented pass
    // ordering precondition.
    let update_req = requirement(&db, protocol, corelib::UPDATE_IDENT);
    derive_value_requirement(&mut db, scaled, protocol, &update_req);
}
