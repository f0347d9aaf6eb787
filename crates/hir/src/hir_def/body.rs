//! Function bodies: expression and statement arenas.
//!
//! Nodes are addressed by entity handles into arenas owned by the enclosing
//! [`Body`]; construction functions return handles.

use cranelift_entity::{PrimaryMap, entity_impl};
use smallvec::SmallVec;

use super::{FuncId, IdentId, ItemOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);
entity_impl!(ExprId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(u32);
entity_impl!(StmtId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// The method receiver.
    SelfRef,
    /// A parameter of the enclosing function, by position.
    ParamRef(u32),
    FieldAccess {
        base: ExprId,
        field: IdentId,
    },
    /// `mut` borrow of a place, for a `mut` parameter position.
    MutRef(ExprId),
    Call {
        callee: ExprId,
        args: SmallVec<[CallArg; 2]>,
    },
    /// Method call dispatched to a known declaration.
    MethodCall {
        receiver: ExprId,
        method: FuncId,
        args: SmallVec<[CallArg; 2]>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallArg {
    pub label: Option<IdentId>,
    pub expr: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stmt {
    Expr(ExprId),
}

#[derive(Debug)]
pub struct Body {
    pub origin: ItemOrigin,
    exprs: PrimaryMap<ExprId, Expr>,
    stmts: PrimaryMap<StmtId, Stmt>,
    root: Vec<StmtId>,
}

impl Body {
    pub fn new(origin: ItemOrigin) -> Self {
        Self {
            origin,
            exprs: PrimaryMap::new(),
            stmts: PrimaryMap::new(),
            root: Vec::new(),
        }
    }

    pub fn push_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr)
    }

    /// Appends a statement to the root sequence.
    pub fn push_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = self.stmts.push(stmt);
        self.root.push(id);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn stmt(&self, id: StmtId) -> Stmt {
        self.stmts[id]
    }

    /// Root statements in execution order.
    pub fn root_stmts(&self) -> &[StmtId] {
        &self.root
    }
}
