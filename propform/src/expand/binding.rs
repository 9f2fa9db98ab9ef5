use proc_macro2::TokenStream;
use quote::quote;
use syn::{Expr, Pat};

use super::{Expander, closure_param, internal};
use crate::engine::Primitive;
use crate::form::{BindingChain, BindingClause};

impl Expander<'_> {
    pub(super) fn forall(&self, clause: &BindingClause, body: &Expr) -> TokenStream {
        let forall = self.primitive(Primitive::ForAll);
        let generator = &clause.generator;
        let pat = closure_param(&clause.pattern);
        quote!(#forall(#generator, move |#pat| #body))
    }

    /// Right fold: the first clause is the outermost `bind`.
    pub(super) fn let_chain(&self, chain: &BindingChain, body: &Expr) -> TokenStream {
        let bind = self.primitive(Primitive::Bind);
        chain
            .clauses()
            .iter()
            .rev()
            .fold(quote!(#body), |inner, clause| {
                let generator = &clause.generator;
                let pat = closure_param(&clause.pattern);
                quote!(#bind(#generator, move |#pat| #inner))
            })
    }

    pub(super) fn such_that(&self, clause: &BindingClause, predicate: &Expr) -> TokenStream {
        let suchthat = self.primitive(Primitive::SuchThat);
        let generator = &clause.generator;
        let pat = closure_param(&clause.pattern);
        quote! {
            #suchthat(
                #generator,
                move |#pat| #predicate,
                (::core::file!(), ::core::line!(), ::core::column!()),
            )
        }
    }

    pub(super) fn such_that_maybe(&self, clause: &BindingClause, predicate: &Expr) -> TokenStream {
        let suchthatmaybe = self.primitive(Primitive::SuchThatMaybe);
        let generator = &clause.generator;
        let pat = closure_param(&clause.pattern);
        quote!(#suchthatmaybe(#generator, move |#pat| #predicate))
    }

    pub(super) fn let_shrink(&self, clause: &BindingClause, body: &Expr) -> TokenStream {
        let letshrink = self.primitive(Primitive::LetShrink);
        let generators = &clause.generator;
        let pat = closure_param(&clause.pattern);
        quote!(#letshrink(#generators, move |#pat| #body))
    }

    /// `(setup thunk returning the teardown thunk, deferred body)`.
    pub(super) fn setup_teardown(
        &self,
        binding: Option<&Pat>,
        setup: &Expr,
        body: &Expr,
        teardown: Option<&Expr>,
    ) -> TokenStream {
        let lazy = self.primitive(Primitive::Lazy);
        let hidden = internal("setup");
        let (bind, teardown) = match (binding, teardown) {
            (Some(pat), Some(teardown)) => (quote!(#pat), quote!(#teardown;)),
            (Some(pat), None) => (quote!(#pat), quote!()),
            (None, Some(teardown)) => (
                quote!(#hidden),
                quote!(#teardown; ::core::mem::drop(#hidden);),
            ),
            (None, None) => (quote!(_), quote!()),
        };
        quote! {
            (
                move || {
                    #[allow(unused_variables)]
                    let #bind = #setup;
                    move || { #teardown }
                },
                #lazy(move || #body),
            )
        }
    }

    pub(super) fn setup(&self, setup: &Expr, body: &Expr) -> TokenStream {
        let lazy = self.primitive(Primitive::Lazy);
        quote! {
            (
                move || {
                    let _ = #setup;
                    move || {}
                },
                #lazy(move || #body),
            )
        }
    }
}
