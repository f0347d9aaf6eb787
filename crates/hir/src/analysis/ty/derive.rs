//! Derived conformance synthesis for the elementwise protocol.
//!
//! A struct whose stored fields all share one parameter type gets its
//! `Element` associated type and its `update` method synthesized from the
//! field list alone. The parameter type of a field is the field type's own
//! `Element` witness when that type already satisfies the protocol, and the
//! declared field type otherwise; synthesis recurses into conforming fields by
//! calling their `update` witness, so nested aggregates are traversed without
//! global knowledge of nesting depth.
//!
//! Entry points are called by the type checker once it has decided a
//! conformance is a derivation candidate. Requirement derivation order is
//! owned by the caller: the associated type must be derived (and recorded as a
//! `type Element` alias member) before the method, and
//! [`build_update_method`] treats a missing alias as a broken invariant
//! rather than re-deriving it defensively.

use smallvec::smallvec;
use tracing::{debug, trace};

use super::corelib;
use super::diagnostics::DeriveDiag;
use super::ty_def::{FuncTy, FuncTyParam, TyId};
use crate::db::HirDb;
use crate::hir_def::{
    Body, BodySynthesis, CallArg, Expr, FieldDef, FuncBody, FuncDef, FuncId, FuncParam,
    ItemOrigin, ProtocolId, RequirementDef, RequirementKind, SelfKind, Stmt, StructId,
    TypeAliasDef,
};

/// The closed requirement set of the elementwise protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementwiseRequirement {
    Element,
    Update,
}

impl ElementwiseRequirement {
    /// Classifies a declared requirement against the known slots. `None`
    /// means the protocol definition has drifted from the deriver.
    fn classify(db: &HirDb, requirement: &RequirementDef) -> Option<Self> {
        match (requirement.name.data(db), requirement.kind) {
            (corelib::ELEMENT_IDENT, RequirementKind::AssocTy) => Some(Self::Element),
            (corelib::UPDATE_IDENT, RequirementKind::Method) => Some(Self::Update),
            _ => None,
        }
    }
}

/// Position of the `with other` parameter in the synthesized method.
const OTHER_PARAM: u32 = 0;
/// Position of the `updater` callback parameter in the synthesized method.
const UPDATER_PARAM: u32 = 1;

/// Returns the parameter type of `field`: the `Element` witness of the field's
/// type when that type satisfies the protocol, the declared type otherwise.
fn parameter_ty(db: &HirDb, protocol: ProtocolId, field: &FieldDef) -> TyId {
    let Some(conf) = db.lookup_conformance(field.ty, protocol) else {
        return field.ty;
    };
    db.lookup_ident(corelib::ELEMENT_IDENT)
        .and_then(|name| conf.type_witness(db, name))
        .expect("conformance to the elementwise protocol lacks an `Element` witness")
}

/// Infers the element type of `strukt` by unifying the parameter types of all
/// stored fields. Only exact type identity unifies; the first mismatch fails
/// the whole derivation. A struct with no stored fields has nothing to unify
/// and is refused as well.
pub fn infer_element_ty(db: &HirDb, strukt: StructId, protocol: ProtocolId) -> Option<TyId> {
    let fields = strukt.fields(db);
    if fields.is_empty() {
        debug!("refusing derivation: no stored fields");
        return None;
    }

    let mut candidate = None;
    for field in fields {
        let param_ty = parameter_ty(db, protocol, field);
        match candidate {
            None => candidate = Some(param_ty),
            Some(expected) if expected == param_ty => {}
            Some(_) => {
                debug!(
                    field = field.name.data(db),
                    "refusing derivation: parameter types disagree"
                );
                return None;
            }
        }
    }
    candidate
}

/// Whether the elementwise conformance can be derived for `strukt`.
pub fn can_derive(db: &HirDb, strukt: StructId, protocol: ProtocolId) -> bool {
    infer_element_ty(db, strukt, protocol).is_some()
}

/// Derives the associated-type requirement.
///
/// On success the inferred type is recorded as a `type Element` alias member
/// of the struct, so that the later method derivation can resolve it by name.
/// Returns `None` when derivation is refused; the caller is responsible for
/// the user-facing diagnostic in that case.
pub fn derive_ty_requirement(
    db: &mut HirDb,
    strukt: StructId,
    protocol: ProtocolId,
    requirement: &RequirementDef,
) -> Option<TyId> {
    match ElementwiseRequirement::classify(db, requirement) {
        Some(ElementwiseRequirement::Element) => {
            db.attach_fixed_layout(strukt);
            let element = infer_element_ty(db, strukt, protocol)?;
            record_element_alias(db, strukt, element);
            debug!(
                element = %element.pretty_print(db),
                "derived `Element` associated type"
            );
            Some(element)
        }
        _ => {
            report_broken_requirement(db, requirement);
            None
        }
    }
}

/// Derives the method requirement.
///
/// Returns `None` when derivation is refused (the same refusal conditions as
/// the associated-type case). Requirements other than the `update` method slot
/// are a broken protocol definition.
pub fn derive_value_requirement(
    db: &mut HirDb,
    strukt: StructId,
    protocol: ProtocolId,
    requirement: &RequirementDef,
) -> Option<FuncId> {
    match ElementwiseRequirement::classify(db, requirement) {
        Some(ElementwiseRequirement::Update) => {
            db.attach_fixed_layout(strukt);
            if !can_derive(db, strukt, protocol) {
                return None;
            }
            Some(build_update_method(db, strukt, protocol))
        }
        _ => {
            report_broken_requirement(db, requirement);
            None
        }
    }
}

fn report_broken_requirement(db: &mut HirDb, requirement: &RequirementDef) {
    let diag = DeriveDiag::BrokenProtocolRequirement {
        span: requirement.span.clone(),
        name: requirement.name,
    };
    let complete = diag.to_complete(db);
    db.push_diag(complete);
}

/// Records the inferred element type as a `type Element` member. Idempotent:
/// a re-derivation finds the existing alias and leaves it alone.
fn record_element_alias(db: &mut HirDb, strukt: StructId, element: TyId) {
    let name = db.ident(corelib::ELEMENT_IDENT);
    if db.type_alias_member(strukt, name).is_some() {
        return;
    }
    let alias = db.alloc_type_alias(TypeAliasDef {
        name,
        ty: element,
        origin: ItemOrigin::Synthesized,
    });
    db.add_struct_member(strukt, alias.into());
}

/// Builds the synthesized `update` method declaration:
///
/// ```text
/// fn update(mut self, with other: Self, _ updater: (mut Element, Element) -> ())
/// ```
///
/// The declaration inherits the struct's generic parameters and access level,
/// is marked synthesized and validated, and carries a pending body that is
/// elaborated on first demand.
fn build_update_method(db: &mut HirDb, strukt: StructId, protocol: ProtocolId) -> FuncId {
    let element_name = db.ident(corelib::ELEMENT_IDENT);
    let alias = db
        .type_alias_member(strukt, element_name)
        .expect("`Element` alias must be derived before the `update` method");
    let element = alias.ty(db);

    let self_ty = strukt.declared_ty(db);
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

    let generic_params = strukt.generic_params(db).to_vec();
    let vis = strukt.vis(db);

    let func = db.alloc_func(FuncDef {
        name,
        parent: Some(strukt),
        generic_params,
        self_param: Some(SelfKind::Mut),
        params: vec![
            FuncParam {
                label: Some(with_label),
                name: other,
                ty: self_ty,
            },
            FuncParam {
                label: None,
                name: updater,
                ty: updater_ty,
            },
        ],
        ret_ty: unit,
        vis,
        origin: ItemOrigin::Synthesized,
        validated: true,
        body: FuncBody::Pending(BodySynthesis::ElementwiseUpdate { protocol }),
    });
    db.add_struct_member(strukt, func.into());
    db.mark_synthesized(func);
    debug!(
        strukt = strukt.name(db).data(db),
        "synthesized `update` declaration"
    );
    func
}

/// Synthesizes the `update` method body: one statement per stored field, in
/// declared field order.
///
/// For a field whose type does not satisfy the protocol the statement applies
/// the updater directly, `updater(mut self.f, other.f)`; for a conforming
/// field it recurses through the field's own `update` witness,
/// `self.f.update(with: other.f, updater)`, forwarding the callback unchanged.
pub(crate) fn synthesize_update_body(
    db: &mut HirDb,
    func: FuncId,
    protocol: ProtocolId,
) -> Body {
    let strukt = func
        .parent(db)
        .expect("synthesized `update` must be a struct member");
    let fields = strukt.fields(db).to_vec();

    let update_name = db.ident(corelib::UPDATE_IDENT);
    let with_label = db.ident(corelib::WITH_LABEL);

    // The protocol must still declare the method slot being witnessed.
    assert!(
        protocol
            .requirements(db)
            .iter()
            .any(|req| req.name == update_name && req.kind == RequirementKind::Method),
        "broken elementwise protocol: no `update` method requirement"
    );

    let mut body = Body::new(ItemOrigin::Synthesized);
    for field in &fields {
        // Match the receiver field to the like-named field of `other`. The two
        // aggregates share one declared shape, so a miss is a broken invariant.
        let matching = fields
            .iter()
            .find(|other_field| other_field.name == field.name)
            .unwrap_or_else(|| {
                panic!(
                    "no field named `{}` in the update argument",
                    field.name.data(db)
                )
            });

        let self_ref = body.push_expr(Expr::SelfRef);
        let recv_field = body.push_expr(Expr::FieldAccess {
            base: self_ref,
            field: field.name,
        });
        let other_ref = body.push_expr(Expr::ParamRef(OTHER_PARAM));
        let other_field = body.push_expr(Expr::FieldAccess {
            base: other_ref,
            field: matching.name,
        });
        let updater_ref = body.push_expr(Expr::ParamRef(UPDATER_PARAM));

        let call = match db.lookup_conformance(field.ty, protocol) {
            None => {
                let mut_ref = body.push_expr(Expr::MutRef(recv_field));
                body.push_expr(Expr::Call {
                    callee: updater_ref,
                    args: smallvec![
                        CallArg {
                            label: None,
                            expr: mut_ref,
                        },
                        CallArg {
                            label: None,
                            expr: other_field,
                        },
                    ],
                })
            }
            Some(conf) => {
                let witness = conf.value_witness(db, update_name).unwrap_or_else(|| {
                    panic!(
                        "conformance of `{}` lacks an `update` witness",
                        field.ty.pretty_print(db)
                    )
                });
                body.push_expr(Expr::MethodCall {
                    receiver: recv_field,
                    method: witness,
                    args: smallvec![
                        CallArg {
                            label: Some(with_label),
                            expr: other_field,
                        },
                        CallArg {
                            label: None,
                            expr: updater_ref,
                        },
                    ],
                })
            }
        };
        body.push_stmt(Stmt::Expr(call));
        trace!(field = field.name.data(db), "synthesized update statement");
    }
    body
}
