//! Validated, typed forms ready for expansion.
//!
//! A [`Form`] only exists for input that matched its form's happy shape; everything
//! here is transient and lives for a single translation.
use proc_macro2::Span;
use syn::{Expr, Ident, Pat};

use crate::scope::bound_names;
use crate::surface::RelationOp;
use crate::syntax::SyntaxForm;

/// Nesting depth of a clause inside its chain, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub usize);

/// `PAT <- GEN`: the pattern's names are visible inside the clause's scope only.
#[derive(Debug, Clone)]
pub struct BindingClause {
    pub pattern: Pat,
    pub generator: Expr,
    pub scope: ScopeId,
}

impl BindingClause {
    pub fn new(pattern: Pat, generator: Expr, depth: usize) -> Self {
        Self {
            pattern,
            generator,
            scope: ScopeId(depth),
        }
    }

    /// Names introduced by the pattern.
    pub fn bound_names(&self) -> Vec<Ident> {
        bound_names(&self.pattern)
    }
}

/// Non-empty, ordered sequence of clauses; clause `i` is the lexical parent of `i + 1`.
#[derive(Debug, Clone)]
pub struct BindingChain {
    clauses: Vec<BindingClause>,
}

impl BindingChain {
    /// `None` for an empty chain.
    pub fn new(clauses: Vec<BindingClause>) -> Option<Self> {
        (!clauses.is_empty()).then_some(Self { clauses })
    }

    pub fn clauses(&self) -> &[BindingClause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A modifier's single parameter (if any) and the body it wraps.
#[derive(Debug, Clone)]
pub struct ModifierWrap {
    pub parameter: Option<Expr>,
    pub body: Expr,
}

/// What a collect entry samples.
#[derive(Debug, Clone)]
pub enum CollectKind {
    /// `TAG: TERM`
    Term(Expr),
    /// `TAG: (COUNT, [REQ, ...])`: every requirement must show up among the samples.
    Coverage { count: Expr, requirements: Vec<Expr> },
}

#[derive(Debug, Clone)]
pub struct CollectEntry {
    pub tag: Ident,
    pub kind: CollectKind,
}

/// Tagged entries in declaration order, plus the terminal body.
#[derive(Debug, Clone)]
pub struct CollectSpec {
    pub entries: Vec<CollectEntry>,
    pub body: Expr,
}

/// The closed set of operators accepted by `ensure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnsureOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    StrictEq,
    Matches,
    StrictNe,
    Ne,
    In,
}

impl EnsureOp {
    /// Operator as written at the surface.
    pub fn symbol(self) -> &'static str {
        match self {
            EnsureOp::Eq => "==",
            EnsureOp::Lt => "<",
            EnsureOp::Gt => ">",
            EnsureOp::Le => "<=",
            EnsureOp::Ge => ">=",
            EnsureOp::StrictEq => "===",
            EnsureOp::Matches => "=~",
            EnsureOp::StrictNe => "!==",
            EnsureOp::Ne => "!=",
            EnsureOp::In => "in",
        }
    }

    /// Comparison operator of a binary expression, if it belongs to the set.
    pub fn from_bin_op(op: &syn::BinOp) -> Option<Self> {
        match op {
            syn::BinOp::Eq(_) => Some(EnsureOp::Eq),
            syn::BinOp::Ne(_) => Some(EnsureOp::Ne),
            syn::BinOp::Lt(_) => Some(EnsureOp::Lt),
            syn::BinOp::Le(_) => Some(EnsureOp::Le),
            syn::BinOp::Gt(_) => Some(EnsureOp::Gt),
            syn::BinOp::Ge(_) => Some(EnsureOp::Ge),
            _ => None,
        }
    }
}

impl From<RelationOp> for EnsureOp {
    fn from(op: RelationOp) -> Self {
        match op {
            RelationOp::StrictEq => EnsureOp::StrictEq,
            RelationOp::StrictNe => EnsureOp::StrictNe,
            RelationOp::Matches => EnsureOp::Matches,
            RelationOp::In => EnsureOp::In,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnsureExpr {
    pub op: EnsureOp,
    pub op_span: Span,
    pub left: Expr,
    pub right: Expr,
}

/// A validated surface form.
#[derive(Debug, Clone)]
pub enum Form {
    ForAll {
        clause: BindingClause,
        body: Expr,
    },
    Let {
        chain: BindingChain,
        body: Expr,
    },
    SuchThat {
        clause: BindingClause,
        predicate: Expr,
    },
    SuchThatMaybe {
        clause: BindingClause,
        predicate: Expr,
    },
    Sized {
        size: Pat,
        body: Expr,
    },
    Shrink {
        generator: Expr,
        alternatives: Vec<Expr>,
    },
    LetShrink {
        clause: BindingClause,
        body: Expr,
    },
    WhenFail(ModifierWrap),
    Lazy(ModifierWrap),
    Implies {
        condition: Expr,
        body: Expr,
    },
    TrapExit(ModifierWrap),
    Timeout(ModifierWrap),
    Always(ModifierWrap),
    Sometimes(ModifierWrap),
    OnceOnly(ModifierWrap),
    SetupTeardown {
        binding: Option<Pat>,
        setup: Expr,
        body: Expr,
        teardown: Option<Expr>,
    },
    Setup {
        setup: Expr,
        body: Expr,
    },
    Collect(CollectSpec),
    Feature {
        term: Expr,
        body: Expr,
    },
    Ensure(EnsureExpr),
}

impl Form {
    pub fn syntax_form(&self) -> SyntaxForm {
        match self {
            Form::ForAll { .. } => SyntaxForm::ForAll,
            Form::Let { .. } => SyntaxForm::Let,
            Form::SuchThat { .. } => SyntaxForm::SuchThat,
            Form::SuchThatMaybe { .. } => SyntaxForm::SuchThatMaybe,
            Form::Sized { .. } => SyntaxForm::Sized,
            Form::Shrink { .. } => SyntaxForm::Shrink,
            Form::LetShrink { .. } => SyntaxForm::LetShrink,
            Form::WhenFail(_) => SyntaxForm::WhenFail,
            Form::Lazy(_) => SyntaxForm::Lazy,
            Form::Implies { .. } => SyntaxForm::Implies,
            Form::TrapExit(_) => SyntaxForm::TrapExit,
            Form::Timeout(_) => SyntaxForm::Timeout,
            Form::Always(_) => SyntaxForm::Always,
            Form::Sometimes(_) => SyntaxForm::Sometimes,
            Form::OnceOnly(_) => SyntaxForm::OnceOnly,
            Form::SetupTeardown { .. } => SyntaxForm::SetupTeardown,
            Form::Setup { .. } => SyntaxForm::Setup,
            Form::Collect(_) => SyntaxForm::Collect,
            Form::Feature { .. } => SyntaxForm::Feature,
            Form::Ensure(_) => SyntaxForm::Ensure,
        }
    }
}
