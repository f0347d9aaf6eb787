//! Pretty-printing for declarations and synthesized bodies.
//!
//! Output is stable line-oriented text, used by tests and tracing output.

use crate::analysis::ty::ty_def::{PrimTy, TyData};
use crate::db::HirDb;
use crate::hir_def::{Body, CallArg, Expr, ExprId, FuncId, SelfKind, Stmt};

/// Formats a function signature, e.g.
/// `fn update(mut self, with other: Pair, _ updater: (mut Tensor, Tensor) -> ())`.
pub fn format_signature(db: &HirDb, func: FuncId) -> String {
    let mut out = String::from("fn ");
    out.push_str(func.name(db).data(db));

    let generics = func.generic_params(db);
    if !generics.is_empty() {
        let names: Vec<&str> = generics.iter().map(|param| param.name.data(db)).collect();
        out.push('<');
        out.push_str(&names.join(", "));
        out.push('>');
    }

    out.push('(');
    let mut first = true;
    match func.self_param(db) {
        Some(SelfKind::Mut) => {
            out.push_str("mut self");
            first = false;
        }
        Some(SelfKind::Shared) => {
            out.push_str("self");
            first = false;
        }
        None => {}
    }
    for param in func.params(db) {
        if !first {
            out.push_str(", ");
        }
        first = false;
        match param.label {
            Some(label) => {
                out.push_str(label.data(db));
                out.push(' ');
            }
            None => out.push_str("_ "),
        }
        out.push_str(param.name.data(db));
        out.push_str(": ");
        out.push_str(&param.ty.pretty_print(db));
    }
    out.push(')');

    let ret = func.ret_ty(db);
    if !matches!(ret.data(db), TyData::Prim(PrimTy::Unit)) {
        out.push_str(" -> ");
        out.push_str(&ret.pretty_print(db));
    }
    out
}

/// Formats an elaborated body, one root statement per line.
pub fn format_body(db: &HirDb, func: FuncId, body: &Body) -> String {
    body.root_stmts()
        .iter()
        .map(|&stmt| match body.stmt(stmt) {
            Stmt::Expr(expr) => format_expr(db, func, body, expr),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_expr(db: &HirDb, func: FuncId, body: &Body, expr: ExprId) -> String {
    match body.expr(expr) {
        Expr::SelfRef => "self".into(),
        Expr::ParamRef(idx) => func.params(db)[*idx as usize].name.data(db).to_string(),
        Expr::FieldAccess { base, field } => {
            format!("{}.{}", format_expr(db, func, body, *base), field.data(db))
        }
        Expr::MutRef(inner) => format!("mut {}", format_expr(db, func, body, *inner)),
        Expr::Call { callee, args } => format!(
            "{}({})",
            format_expr(db, func, body, *callee),
            format_call_args(db, func, body, args)
        ),
        Expr::MethodCall {
            receiver,
            method,
            args,
        } => format!(
            "{}.{}({})",
            format_expr(db, func, body, *receiver),
            method.name(db).data(db),
            format_call_args(db, func, body, args)
        ),
    }
}

fn format_call_args(db: &HirDb, func: FuncId, body: &Body, args: &[CallArg]) -> String {
    args.iter()
        .map(|arg| {
            let rendered = format_expr(db, func, body, arg.expr);
            match arg.label {
                Some(label) => format!("{}: {rendered}", label.data(db)),
                None => rendered,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
