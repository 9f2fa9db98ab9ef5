//! Lexical scope checks for binding clauses.
//!
//! A clause's pattern names are visible to the generators of later clauses and to the
//! body, never to its own generator nor to earlier ones. Rust would resolve such a
//! reference to whatever outer item happens to share the name; these checks report it
//! at translation time instead.
use std::collections::HashSet;

use proc_macro2::{TokenStream, TokenTree};
use syn::{
    Arm, BinOp, Block, Expr, ExprClosure, ExprForLoop, ExprIf, ExprPath, ExprWhile, Ident,
    Item, Macro, Pat, Stmt,
    visit::{self, Visit},
};

use crate::error::{UsageError, UsageResult};
use crate::form::BindingClause;
use crate::syntax::SyntaxForm;

/// Names bound by `pat`.
///
/// Capitalised identifiers are constants or unit variants (`None`, `MAX`), not bindings.
pub fn bound_names(pat: &Pat) -> Vec<Ident> {
    let mut names = Vec::new();
    collect_bound(pat, &mut names);
    names
}

fn collect_bound(pat: &Pat, names: &mut Vec<Ident>) {
    match pat {
        Pat::Ident(binding) => {
            let starts_upper = binding
                .ident
                .to_string()
                .chars()
                .next()
                .is_some_and(char::is_uppercase);
            if !starts_upper {
                names.push(binding.ident.clone());
            }
            if let Some((_, sub)) = &binding.subpat {
                collect_bound(sub, names);
            }
        }
        Pat::Tuple(tuple) => tuple.elems.iter().for_each(|p| collect_bound(p, names)),
        Pat::TupleStruct(tuple) => tuple.elems.iter().for_each(|p| collect_bound(p, names)),
        Pat::Struct(strukt) => strukt
            .fields
            .iter()
            .for_each(|field| collect_bound(&field.pat, names)),
        Pat::Slice(slice) => slice.elems.iter().for_each(|p| collect_bound(p, names)),
        Pat::Reference(reference) => collect_bound(&reference.pat, names),
        Pat::Paren(paren) => collect_bound(&paren.pat, names),
        Pat::Type(typed) => collect_bound(&typed.pat, names),
        // Every alternative binds the same names.
        Pat::Or(or) => {
            if let Some(first) = or.cases.first() {
                collect_bound(first, names);
            }
        }
        _ => {}
    }
}

/// Single-segment names an expression refers to, excluding those it binds itself.
pub fn referenced_names(expr: &Expr) -> Vec<Ident> {
    let mut visitor = References::default();
    visitor.visit_expr(expr);
    visitor.found
}

#[derive(Default)]
struct References {
    shadowed: Vec<HashSet<String>>,
    found: Vec<Ident>,
}

impl References {
    fn is_shadowed(&self, name: &str) -> bool {
        self.shadowed.iter().any(|frame| frame.contains(name))
    }

    fn record(&mut self, ident: &Ident) {
        if !self.is_shadowed(&ident.to_string()) {
            self.found.push(ident.clone());
        }
    }

    fn frame_of<'p>(pats: impl IntoIterator<Item = &'p Pat>) -> HashSet<String> {
        pats.into_iter()
            .flat_map(bound_names)
            .map(|ident| ident.to_string())
            .collect()
    }

    fn extend_frame(&mut self, names: HashSet<String>) {
        if let Some(frame) = self.shadowed.last_mut() {
            frame.extend(names);
        }
    }

    /// `let` conditions bind into the innermost frame, left to right through `&&` chains.
    fn visit_condition<'ast>(&mut self, cond: &'ast Expr) {
        match cond {
            Expr::Let(binding) => {
                self.visit_expr(&binding.expr);
                self.extend_frame(Self::frame_of([&*binding.pat]));
            }
            Expr::Binary(binary) if matches!(binary.op, BinOp::And(_)) => {
                self.visit_condition(&binary.left);
                self.visit_condition(&binary.right);
            }
            other => self.visit_expr(other),
        }
    }

    fn record_tokens(&mut self, tokens: TokenStream) {
        for tt in tokens {
            match tt {
                TokenTree::Ident(ident) => self.record(&ident),
                TokenTree::Group(group) => self.record_tokens(group.stream()),
                _ => {}
            }
        }
    }
}

impl<'ast> Visit<'ast> for References {
    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        if node.qself.is_none() && node.path.leading_colon.is_none() {
            if let Some(ident) = node.path.get_ident() {
                self.record(ident);
            }
        }
    }

    fn visit_expr_closure(&mut self, node: &'ast ExprClosure) {
        self.shadowed.push(Self::frame_of(&node.inputs));
        self.visit_expr(&node.body);
        self.shadowed.pop();
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.visit_expr(&node.expr);
        self.shadowed.push(Self::frame_of([&*node.pat]));
        self.visit_block(&node.body);
        self.shadowed.pop();
    }

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        self.shadowed.push(HashSet::new());
        self.visit_condition(&node.cond);
        self.visit_block(&node.then_branch);
        self.shadowed.pop();
        if let Some((_, else_branch)) = &node.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        self.shadowed.push(HashSet::new());
        self.visit_condition(&node.cond);
        self.visit_block(&node.body);
        self.shadowed.pop();
    }

    // Nested items cannot capture locals.
    fn visit_item(&mut self, _: &'ast Item) {}

    fn visit_arm(&mut self, node: &'ast Arm) {
        self.shadowed.push(Self::frame_of([&node.pat]));
        if let Some((_, guard)) = &node.guard {
            self.visit_expr(guard);
        }
        self.visit_expr(&node.body);
        self.shadowed.pop();
    }

    fn visit_block(&mut self, node: &'ast Block) {
        self.shadowed.push(HashSet::new());
        for stmt in &node.stmts {
            match stmt {
                Stmt::Local(local) => {
                    if let Some(init) = &local.init {
                        self.visit_local_init(init);
                    }
                    self.extend_frame(Self::frame_of([&local.pat]));
                }
                other => visit::visit_stmt(self, other),
            }
        }
        self.shadowed.pop();
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        self.record_tokens(node.tokens.clone());
    }
}

/// Check every clause of a chain, in declaration order.
pub fn check_chain(form: SyntaxForm, clauses: &[BindingClause]) -> UsageResult<()> {
    let mut earlier: HashSet<String> = HashSet::new();
    for (index, clause) in clauses.iter().enumerate() {
        let own: HashSet<String> = bound_names(&clause.pattern)
            .iter()
            .map(ToString::to_string)
            .collect();
        let later: HashSet<String> = clauses[index + 1..]
            .iter()
            .flat_map(|c| bound_names(&c.pattern))
            .map(|ident| ident.to_string())
            .collect();

        for reference in referenced_names(&clause.generator) {
            let name = reference.to_string();
            if earlier.contains(&name) {
                continue;
            }
            if own.contains(&name) {
                return Err(UsageError::malformed(
                    form,
                    format!("the generator bound to `{name}` refers to `{name}` itself"),
                    reference.span(),
                ));
            }
            if later.contains(&name) {
                return Err(UsageError::malformed(
                    form,
                    format!("`{name}` is unresolved here: it is only bound by a later clause"),
                    reference.span(),
                ));
            }
        }
        earlier.extend(own);
    }
    Ok(())
}
