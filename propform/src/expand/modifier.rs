use proc_macro2::TokenStream;
use quote::quote;
use syn::{Expr, Pat};

use super::{Expander, source_text};
use crate::engine::Primitive;
use crate::form::ModifierWrap;

impl Expander<'_> {
    /// `PRIMITIVE([PARAM,] move || BODY)`.
    pub(super) fn deferred(&self, primitive: Primitive, wrap: &ModifierWrap) -> TokenStream {
        let callee = self.primitive(primitive);
        let body = &wrap.body;
        match &wrap.parameter {
            Some(parameter) => quote!(#callee(#parameter, move || #body)),
            None => quote!(#callee(move || #body)),
        }
    }

    /// The size is the closure parameter rather than a thunk.
    pub(super) fn sized(&self, size: &Pat, body: &Expr) -> TokenStream {
        let sized = self.primitive(Primitive::Sized);
        quote!(#sized(move |#size| #body))
    }

    pub(super) fn shrink(&self, generator: &Expr, alternatives: &[Expr]) -> TokenStream {
        let shrinkwith = self.primitive(Primitive::ShrinkWith);
        quote!(#shrinkwith(#generator, move || ::std::vec![#(#alternatives),*]))
    }

    /// The condition stays eager; its source text labels discarded cases.
    pub(super) fn implies(&self, condition: &Expr, body: &Expr) -> TokenStream {
        let implies = self.primitive(Primitive::Implies);
        let label = source_text(condition);
        quote!(#implies(#condition, #label, move || #body))
    }

    pub(super) fn when_fail(&self, wrap: &ModifierWrap) -> TokenStream {
        let whenfail = self.primitive(Primitive::WhenFail);
        let body = &wrap.body;
        let action = &wrap.parameter;
        quote!(#whenfail(move || { #action; }, move || #body))
    }
}
