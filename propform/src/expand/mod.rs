//! Emission of engine call chains for validated forms.
//!
//! Expansion cannot fail: every arrangement issue has been reported by the validator.
//! Deferred bodies are emitted as `move ||` closures, and names introduced by the
//! expansion itself are mixed-site hygienic so they never collide with user code.
mod binding;
mod keyword;
mod modifier;

use log::{debug, trace};
use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{Expr, Ident, LitStr, Pat, spanned::Spanned};

use crate::engine::{ExpandConfig, Primitive};
use crate::form::Form;

/// Expands forms against one engine configuration.
pub struct Expander<'c> {
    config: &'c ExpandConfig,
}

impl<'c> Expander<'c> {
    pub fn new(config: &'c ExpandConfig) -> Self {
        Self { config }
    }

    /// Call chain equivalent to `form`.
    pub fn expand(&self, form: &Form) -> TokenStream {
        let tokens = match form {
            Form::ForAll { clause, body } => self.forall(clause, body),
            Form::Let { chain, body } => self.let_chain(chain, body),
            Form::SuchThat { clause, predicate } => self.such_that(clause, predicate),
            Form::SuchThatMaybe { clause, predicate } => self.such_that_maybe(clause, predicate),
            Form::LetShrink { clause, body } => self.let_shrink(clause, body),
            Form::SetupTeardown {
                binding,
                setup,
                body,
                teardown,
            } => self.setup_teardown(binding.as_ref(), setup, body, teardown.as_ref()),
            Form::Setup { setup, body } => self.setup(setup, body),
            Form::Sized { size, body } => self.sized(size, body),
            Form::Shrink {
                generator,
                alternatives,
            } => self.shrink(generator, alternatives),
            Form::WhenFail(wrap) => self.when_fail(wrap),
            Form::Lazy(wrap) => self.deferred(Primitive::Lazy, wrap),
            Form::Implies { condition, body } => self.implies(condition, body),
            Form::TrapExit(wrap) => self.deferred(Primitive::TrapExit, wrap),
            Form::Timeout(wrap) => self.deferred(Primitive::Timeout, wrap),
            Form::Always(wrap) => self.deferred(Primitive::Always, wrap),
            Form::Sometimes(wrap) => self.deferred(Primitive::Sometimes, wrap),
            Form::OnceOnly(wrap) => self.deferred(Primitive::OnceOnly, wrap),
            Form::Collect(collected) => self.collect(collected),
            Form::Feature { term, body } => self.feature(term, body),
            Form::Ensure(ensure) => self.ensure(ensure),
        };
        debug!("expanded {} form", form.syntax_form().name());
        trace!("{} expansion: {tokens}", form.syntax_form().name());
        tokens
    }

    fn primitive(&self, primitive: Primitive) -> TokenStream {
        self.config.path(primitive)
    }
}

/// A name only the expansion can see.
fn internal(name: &str) -> Ident {
    Ident::new(&format!("__propform_{name}"), Span::mixed_site())
}

/// `pat` in closure parameter position; or-patterns need parentheses there.
fn closure_param(pat: &Pat) -> TokenStream {
    match pat {
        Pat::Or(_) => quote!((#pat)),
        other => other.to_token_stream(),
    }
}

/// Source text of `expr` as a string literal, for labels and messages.
fn source_text(expr: &Expr) -> LitStr {
    LitStr::new(&expr.to_token_stream().to_string(), expr.span())
}
