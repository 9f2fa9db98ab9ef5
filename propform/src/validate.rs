//! Argument-arrangement checks turning a dispatched [`SurfaceCall`] into a [`Form`].
//!
//! Each form accepts exactly one arrangement. Anything else raises a
//! [`UsageError::Malformed`] naming the intended form, before any code is emitted.
use std::collections::HashSet;

use proc_macro2::Span;
use quote::ToTokens;
use syn::{Expr, Pat, parse::Parser, parse_quote, spanned::Spanned};

use crate::error::{UsageError, UsageResult};
use crate::form::{
    BindingChain, BindingClause, CollectEntry, CollectKind, CollectSpec, EnsureExpr, EnsureOp,
    Form, ModifierWrap,
};
use crate::scope;
use crate::surface::{Arg, Binds, SurfaceCall};
use crate::syntax::SyntaxForm;

/// Build the typed form `form` out of `call`.
pub fn validate(form: SyntaxForm, call: &SurfaceCall) -> UsageResult<Form> {
    let mut args = ArgCursor::new(form, call);
    let validated = match form {
        SyntaxForm::ForAll => {
            let clause = args.clause()?;
            let body = args.body()?;
            Form::ForAll { clause, body }
        }
        SyntaxForm::Let => {
            let chain = args.chain()?;
            let body = args.body()?;
            Form::Let { chain, body }
        }
        SyntaxForm::SuchThat | SyntaxForm::SuchThatMaybe => {
            let clause = args.clause()?;
            let predicate = args.keyword("when")?.clone();
            if form == SyntaxForm::SuchThat {
                Form::SuchThat { clause, predicate }
            } else {
                Form::SuchThatMaybe { clause, predicate }
            }
        }
        SyntaxForm::Sized => {
            let size = size_pattern(form, args.expr("the size name")?)?;
            let body = args.body()?;
            Form::Sized { size, body }
        }
        SyntaxForm::Shrink => {
            let generator = args.expr("the generator")?.clone();
            let alternatives = match args.keyword("to")? {
                Expr::Array(list) => list.elems.iter().cloned().collect(),
                other => {
                    return Err(UsageError::malformed(
                        form,
                        "the alternatives must be a `[ALT, ...]` list",
                        other.span(),
                    ));
                }
            };
            Form::Shrink {
                generator,
                alternatives,
            }
        }
        SyntaxForm::LetShrink => {
            let clause = args.clause()?;
            check_shrink_list(form, &clause)?;
            let body = args.body()?;
            Form::LetShrink { clause, body }
        }
        SyntaxForm::WhenFail => Form::WhenFail(args.modifier(Some("the failure action"))?),
        SyntaxForm::Lazy => Form::Lazy(args.modifier(None)?),
        SyntaxForm::Implies => {
            let condition = args.expr("the condition")?.clone();
            let body = args.body()?;
            Form::Implies { condition, body }
        }
        SyntaxForm::TrapExit => Form::TrapExit(args.modifier(None)?),
        SyntaxForm::Timeout => Form::Timeout(args.modifier(Some("the time limit"))?),
        SyntaxForm::Always => Form::Always(args.modifier(Some("the repetition count"))?),
        SyntaxForm::Sometimes => Form::Sometimes(args.modifier(Some("the repetition count"))?),
        SyntaxForm::OnceOnly => Form::OnceOnly(args.modifier(None)?),
        SyntaxForm::SetupTeardown => {
            let (binding, setup) = match args.expr("the setup expression")? {
                Expr::Assign(assign) => (
                    Some(assign_pattern(form, &assign.left)?),
                    (*assign.right).clone(),
                ),
                other => (None, other.clone()),
            };
            let body = args.body()?;
            let teardown = args.optional_keyword("after").cloned();
            Form::SetupTeardown {
                binding,
                setup,
                body,
                teardown,
            }
        }
        SyntaxForm::Setup => {
            let setup = args.expr("the setup expression")?.clone();
            let body = args.body()?;
            Form::Setup { setup, body }
        }
        SyntaxForm::Collect => return collect(call).map(Form::Collect),
        SyntaxForm::Feature => {
            let term = args.expr("the feature term")?.clone();
            let body = args.body()?;
            Form::Feature { term, body }
        }
        SyntaxForm::Ensure => Form::Ensure(args.ensure()?),
    };
    args.finish()?;
    Ok(validated)
}

/// Walks the arguments of one call, left to right.
struct ArgCursor<'a> {
    form: SyntaxForm,
    args: &'a [Arg],
    position: usize,
    span: Span,
}

impl<'a> ArgCursor<'a> {
    fn new(form: SyntaxForm, call: &'a SurfaceCall) -> Self {
        Self {
            form,
            args: &call.args,
            position: 0,
            span: call.span,
        }
    }

    fn malformed(&self, reason: impl Into<String>, span: Span) -> UsageError {
        UsageError::malformed(self.form, reason, span)
    }

    fn peek(&self) -> Option<&'a Arg> {
        self.args.get(self.position)
    }

    fn next_or(&mut self, missing: &str) -> UsageResult<&'a Arg> {
        let arg = self
            .peek()
            .ok_or_else(|| self.malformed(format!("missing {missing}"), self.span))?;
        self.position += 1;
        Ok(arg)
    }

    fn binds(&mut self) -> UsageResult<&'a Binds> {
        match self.next_or("the `PAT <- GEN` binding")? {
            Arg::Binds(binds) => Ok(binds),
            other => Err(self.malformed(
                format!("expected a `PAT <- GEN` binding, found {}", other.describe()),
                other.span(),
            )),
        }
    }

    /// A single binding clause, checked for self reference.
    fn clause(&mut self) -> UsageResult<BindingClause> {
        let binds = self.binds()?;
        let clause = BindingClause::new(binds.pat.clone(), binds.generator.clone(), 0);
        scope::check_chain(self.form, std::slice::from_ref(&clause))?;
        Ok(clause)
    }

    /// A bare clause or a bracketed list of clauses.
    fn chain(&mut self) -> UsageResult<BindingChain> {
        let (span, binds): (Span, Vec<&Binds>) = match self.next_or("the `PAT <- GEN` binding")? {
            Arg::Binds(binds) => (binds.pat.span(), vec![binds]),
            Arg::BindsList { span, clauses } => (*span, clauses.iter().collect()),
            other => {
                return Err(self.malformed(
                    format!(
                        "expected a `PAT <- GEN` binding or a list of them, found {}",
                        other.describe()
                    ),
                    other.span(),
                ));
            }
        };
        let clauses: Vec<BindingClause> = binds
            .into_iter()
            .enumerate()
            .map(|(depth, binds)| {
                BindingClause::new(binds.pat.clone(), binds.generator.clone(), depth)
            })
            .collect();
        scope::check_chain(self.form, &clauses)?;
        BindingChain::new(clauses)
            .ok_or_else(|| self.malformed("at least one `PAT <- GEN` clause is required", span))
    }

    fn expr(&mut self, what: &str) -> UsageResult<&'a Expr> {
        match self.next_or(what)? {
            Arg::Expr(expr) => Ok(expr),
            other => Err(self.malformed(
                format!("expected {what}, found {}", other.describe()),
                other.span(),
            )),
        }
    }

    fn body(&mut self) -> UsageResult<Expr> {
        match self.next_or("the `do:` body")? {
            Arg::Body(body) if body.is_empty() => {
                Err(self.malformed("the `do` body is empty", body.do_token.span))
            }
            Arg::Body(body) => Ok(body.expr.clone()),
            other => Err(self.malformed(
                format!("expected the `do:` body, found {}", other.describe()),
                other.span(),
            )),
        }
    }

    fn keyword(&mut self, expected: &str) -> UsageResult<&'a Expr> {
        match self.next_or(&format!("`{expected}:`"))? {
            Arg::Keyword { name, value } if name == expected => Ok(value),
            Arg::Keyword { name, .. } => Err(self.malformed(
                format!("expected `{expected}:`, found `{name}:`"),
                name.span(),
            )),
            other => Err(self.malformed(
                format!("expected `{expected}:`, found {}", other.describe()),
                other.span(),
            )),
        }
    }

    fn optional_keyword(&mut self, expected: &str) -> Option<&'a Expr> {
        match self.peek() {
            Some(Arg::Keyword { name, value }) if name == expected => {
                self.position += 1;
                Some(value)
            }
            _ => None,
        }
    }

    fn modifier(&mut self, parameter: Option<&str>) -> UsageResult<ModifierWrap> {
        let parameter = match parameter {
            Some(what) => Some(self.expr(what)?.clone()),
            None => None,
        };
        let body = self.body()?;
        Ok(ModifierWrap { parameter, body })
    }

    fn ensure(&mut self) -> UsageResult<EnsureExpr> {
        let accepted = "==, !=, <, <=, >, >=, ===, !==, =~, in";
        match self.next_or("the `LEFT OP RIGHT` comparison")? {
            Arg::Relation(relation) => Ok(EnsureExpr {
                op: relation.op.into(),
                op_span: relation.op_span,
                left: relation.left.clone(),
                right: relation.right.clone(),
            }),
            Arg::Expr(expr) => match unparen(expr) {
                Expr::Binary(binary) => {
                    let op = EnsureOp::from_bin_op(&binary.op).ok_or_else(|| {
                        self.malformed(
                            format!(
                                "`{}` is not a comparison operator; expected one of {accepted}",
                                binary.op.to_token_stream()
                            ),
                            binary.op.span(),
                        )
                    })?;
                    Ok(EnsureExpr {
                        op,
                        op_span: binary.op.span(),
                        left: (*binary.left).clone(),
                        right: (*binary.right).clone(),
                    })
                }
                other => Err(self.malformed(
                    format!("expected a comparison using one of {accepted}"),
                    other.span(),
                )),
            },
            other => Err(self.malformed(
                format!(
                    "expected a `LEFT OP RIGHT` comparison, found {}",
                    other.describe()
                ),
                other.span(),
            )),
        }
    }

    /// Reject anything left over.
    fn finish(&self) -> UsageResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(extra) => Err(self.malformed(
                format!("found {} after the last argument", extra.describe()),
                extra.span(),
            )),
        }
    }
}

/// Strip redundant parentheses and invisible groups.
pub(crate) fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unparen(&paren.expr),
        Expr::Group(group) => unparen(&group.expr),
        other => other,
    }
}

/// `SIZE` of `sized` is a plain name (or `_`).
fn size_pattern(form: SyntaxForm, expr: &Expr) -> UsageResult<Pat> {
    match expr {
        Expr::Path(path) if path.qself.is_none() => match path.path.get_ident() {
            Some(ident) => Ok(parse_quote!(#ident)),
            None => Err(UsageError::malformed(
                form,
                "SIZE must be a plain identifier",
                expr.span(),
            )),
        },
        Expr::Infer(_) => Ok(parse_quote!(_)),
        other => Err(UsageError::malformed(
            form,
            "SIZE must be a plain identifier",
            other.span(),
        )),
    }
}

/// Reinterpret the left side of `PAT = EXPR` as a pattern.
fn assign_pattern(form: SyntaxForm, left: &Expr) -> UsageResult<Pat> {
    Pat::parse_single
        .parse2(left.to_token_stream())
        .map_err(|_| {
            UsageError::malformed(form, "the left side of `=` is not a pattern", left.span())
        })
}

/// The generator of `let_shrink` is a list, and a slice pattern must match its length.
fn check_shrink_list(form: SyntaxForm, clause: &BindingClause) -> UsageResult<()> {
    let Expr::Array(list) = &clause.generator else {
        return Err(UsageError::malformed(
            form,
            "the generator must be a `[GEN, ...]` list",
            clause.generator.span(),
        ));
    };
    if let Pat::Slice(slice) = &clause.pattern {
        let has_rest = slice.elems.iter().any(|p| matches!(p, Pat::Rest(_)));
        if !has_rest && slice.elems.len() != list.elems.len() {
            return Err(UsageError::malformed(
                form,
                format!(
                    "the pattern binds {} values but the list holds {} generators",
                    slice.elems.len(),
                    list.elems.len()
                ),
                clause.pattern.span(),
            ));
        }
    }
    Ok(())
}

fn collect(call: &SurfaceCall) -> UsageResult<CollectSpec> {
    let form = SyntaxForm::Collect;
    let mut entries: Vec<CollectEntry> = Vec::new();
    let mut tags = HashSet::new();
    let mut body = None;

    for arg in &call.args {
        match arg {
            _ if body.is_some() => {
                return Err(UsageError::malformed(
                    form,
                    format!(
                        "the `do:` body must be the last entry, found {} after it",
                        arg.describe()
                    ),
                    arg.span(),
                ));
            }
            Arg::Keyword { name, value } => {
                if !tags.insert(name.to_string()) {
                    return Err(UsageError::malformed(
                        form,
                        format!("tag `{name}` is declared twice"),
                        name.span(),
                    ));
                }
                entries.push(CollectEntry {
                    tag: name.clone(),
                    kind: collect_kind(value)?,
                });
            }
            Arg::Body(block) if block.is_empty() => {
                return Err(UsageError::malformed(
                    form,
                    "the `do` body is empty",
                    block.do_token.span,
                ));
            }
            Arg::Body(block) => body = Some(block.expr.clone()),
            other => {
                return Err(UsageError::malformed(
                    form,
                    format!("expected a `TAG: TERM` entry, found {}", other.describe()),
                    other.span(),
                ));
            }
        }
    }

    let body = body.ok_or_else(|| {
        UsageError::malformed(form, "missing the terminal `do:` body", call.span)
    })?;
    if entries.is_empty() {
        return Err(UsageError::malformed(
            form,
            "at least one `TAG: TERM` entry is required",
            call.span,
        ));
    }
    Ok(CollectSpec { entries, body })
}

fn collect_kind(value: &Expr) -> UsageResult<CollectKind> {
    if let Expr::Tuple(tuple) = value {
        if let [count, Expr::Array(requirements)] = tuple.elems.iter().collect::<Vec<_>>()[..] {
            if requirements.elems.is_empty() {
                return Err(UsageError::malformed(
                    SyntaxForm::Collect,
                    "the coverage requirement list is empty",
                    requirements.span(),
                ));
            }
            return Ok(CollectKind::Coverage {
                count: count.clone(),
                requirements: requirements.elems.iter().cloned().collect(),
            });
        }
    }
    Ok(CollectKind::Term(value.clone()))
}
