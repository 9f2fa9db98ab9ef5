use proc_macro2::TokenStream;
use quote::{ToTokens, quote, quote_spanned};
use syn::{Expr, LitStr};

use super::{Expander, internal, source_text};
use crate::engine::Primitive;
use crate::form::{CollectEntry, CollectKind, CollectSpec, EnsureExpr, EnsureOp};

impl Expander<'_> {
    /// Folds from the last entry to the first so the first tag is the outermost call.
    pub(super) fn collect(&self, collected: &CollectSpec) -> TokenStream {
        let body = &collected.body;
        collected.entries
            .iter()
            .rev()
            .fold(quote!(#body), |inner, entry| self.collect_entry(entry, inner))
    }

    fn collect_entry(&self, entry: &CollectEntry, inner: TokenStream) -> TokenStream {
        let collect = self.primitive(Primitive::Collect);
        let tag = LitStr::new(&entry.tag.to_string(), entry.tag.span());
        match &entry.kind {
            CollectKind::Term(term) => quote!(#collect(#tag, #term, #inner)),
            CollectKind::Coverage {
                count,
                requirements,
            } => {
                let observed = internal("observed");
                let required = internal("required");
                let key = internal("key");
                quote! {
                    #collect(
                        move |#observed: &[(_, usize)]| {
                            for #required in [#(#requirements),*].iter() {
                                if !#observed.iter().any(|(#key, _)| #key == #required) {
                                    ::std::eprintln!(
                                        "{}: expected {:?} to be covered by the sample",
                                        #tag,
                                        #required,
                                    );
                                }
                            }
                        },
                        #count,
                        #inner,
                    )
                }
            }
        }
    }

    /// The term is evaluated once, then both labelled and recorded as a feature.
    pub(super) fn feature(&self, term: &Expr, body: &Expr) -> TokenStream {
        let collect = self.primitive(Primitive::Collect);
        let features = self.primitive(Primitive::Features);
        let label = source_text(term);
        let feature = internal("feature");
        quote! {
            {
                let #feature = #term;
                #collect(
                    #label,
                    ::core::clone::Clone::clone(&#feature),
                    #features(::std::vec![#feature], #body),
                )
            }
        }
    }

    /// Each operand is evaluated exactly once; the failure message shows both sources,
    /// the operator and both values.
    pub(super) fn ensure(&self, ensure: &EnsureExpr) -> TokenStream {
        let whenfail = self.primitive(Primitive::WhenFail);
        let left = internal("left");
        let right = internal("right");
        let message = internal("message");
        let (left_expr, right_expr) = (&ensure.left, &ensure.right);
        let header = LitStr::new(
            &format!(
                "ensure failed: {} {} {}",
                left_expr.to_token_stream(),
                ensure.op.symbol(),
                right_expr.to_token_stream()
            ),
            ensure.op_span,
        );
        let test = self.comparison(ensure, &left, &right);
        quote! {
            {
                let #left = #left_expr;
                let #right = #right_expr;
                let #message = ::std::format!(
                    "{}\n  left: {:?}\n right: {:?}",
                    #header,
                    #left,
                    #right,
                );
                #whenfail(move || ::std::eprintln!("{}", #message), move || #test)
            }
        }
    }

    fn comparison(
        &self,
        ensure: &EnsureExpr,
        left: &syn::Ident,
        right: &syn::Ident,
    ) -> TokenStream {
        let span = ensure.op_span;
        match ensure.op {
            EnsureOp::Eq => quote_spanned!(span=> #left == #right),
            EnsureOp::Ne => quote_spanned!(span=> #left != #right),
            EnsureOp::Lt => quote_spanned!(span=> #left < #right),
            EnsureOp::Le => quote_spanned!(span=> #left <= #right),
            EnsureOp::Gt => quote_spanned!(span=> #left > #right),
            EnsureOp::Ge => quote_spanned!(span=> #left >= #right),
            EnsureOp::StrictEq | EnsureOp::StrictNe => {
                let same = internal("same_type_eq");
                let negate = (ensure.op == EnsureOp::StrictNe).then(|| quote!(!));
                quote_spanned! {span=>
                    {
                        fn #same<T: ::core::cmp::PartialEq + ?::core::marker::Sized>(
                            a: &T,
                            b: &T,
                        ) -> bool {
                            a == b
                        }
                        #negate #same(&#left, &#right)
                    }
                }
            }
            EnsureOp::Matches => quote_spanned! {span=>
                ::core::convert::AsRef::<str>::as_ref(&#left)
                    .contains(::core::convert::AsRef::<str>::as_ref(&#right))
            },
            EnsureOp::In => quote_spanned!(span=> #right.contains(&#left)),
        }
    }
}
