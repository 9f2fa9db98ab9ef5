//! Function-like macros for the propform surface syntax.
//!
//! Every macro expands to calls under `::propcheck` unless the invocation starts with
//! `#![engine(PATH)]`. Malformed input becomes a `compile_error!` carrying the
//! canonical usage string of the intended form.
use proc_macro::TokenStream;

fn keyword_form(keyword: &str, input: TokenStream) -> TokenStream {
    propform::expand_keyword(keyword, input.into())
        .map_err(syn::Error::from)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Any surface form, named by a leading keyword or recognized by shape.
///
/// ```ignore
/// prop!(forall x <- int(), do: x == x)
/// prop!(x <- int(), do: x == x)             // forall
/// prop!([x <- int(), y <- int()], do: x + y) // let
/// prop!(reverse(reverse(xs)) == xs)          // ensure
/// ```
#[proc_macro]
pub fn prop(input: TokenStream) -> TokenStream {
    propform::expand(input.into())
        .map_err(syn::Error::from)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `forall!(PAT <- GEN, do: PROP)`: the property holds for every generated value.
#[proc_macro]
pub fn forall(input: TokenStream) -> TokenStream {
    keyword_form("forall", input)
}

/// Generator binding, `let_gen!(PAT <- GEN, do: BODY)` or
/// `let_gen!([P1 <- G1, P2 <- G2, ...], do: BODY)`.
///
/// Clauses nest in declaration order; each generator sees the names bound before it.
#[proc_macro]
pub fn let_gen(input: TokenStream) -> TokenStream {
    keyword_form("let", input)
}

/// `such_that!(PAT <- GEN, when: PRED)`: keep only values satisfying `PRED`.
#[proc_macro]
pub fn such_that(input: TokenStream) -> TokenStream {
    keyword_form("such_that", input)
}

/// Like [`such_that!`], giving up quietly when no value can be found.
#[proc_macro]
pub fn such_that_maybe(input: TokenStream) -> TokenStream {
    keyword_form("such_that_maybe", input)
}

/// `sized!(n, do: BODY)` binds the current generation size to `n`.
#[proc_macro]
pub fn sized(input: TokenStream) -> TokenStream {
    keyword_form("sized", input)
}

/// `shrink!(GEN, to: [ALT, ...])`
#[proc_macro]
pub fn shrink(input: TokenStream) -> TokenStream {
    keyword_form("shrink", input)
}

/// `let_shrink!(PAT <- [GEN, ...], do: BODY)`
#[proc_macro]
pub fn let_shrink(input: TokenStream) -> TokenStream {
    keyword_form("let_shrink", input)
}

/// `when_fail!(ACTION, do: PROP)` runs `ACTION` when `PROP` fails.
#[proc_macro]
pub fn when_fail(input: TokenStream) -> TokenStream {
    keyword_form("when_fail", input)
}

/// `lazy!(do: GEN)`; the body is not evaluated until the engine forces it.
#[proc_macro]
pub fn lazy(input: TokenStream) -> TokenStream {
    keyword_form("lazy", input)
}

/// `implies!(COND, do: PROP)`: cases where `COND` is false are discarded.
#[proc_macro]
pub fn implies(input: TokenStream) -> TokenStream {
    keyword_form("implies", input)
}

/// `trap_exit!(do: PROP)`: a panic inside `PROP` counts as a failed case.
#[proc_macro]
pub fn trap_exit(input: TokenStream) -> TokenStream {
    keyword_form("trap_exit", input)
}

/// `timeout!(LIMIT, do: PROP)`
#[proc_macro]
pub fn timeout(input: TokenStream) -> TokenStream {
    keyword_form("timeout", input)
}

/// `always!(N, do: PROP)`: the property must pass `N` times in a row.
#[proc_macro]
pub fn always(input: TokenStream) -> TokenStream {
    keyword_form("always", input)
}

/// `sometimes!(N, do: PROP)`: the property must pass at least once in `N` tries.
#[proc_macro]
pub fn sometimes(input: TokenStream) -> TokenStream {
    keyword_form("sometimes", input)
}

/// `once_only!(do: PROP)`: run `PROP` for a single case only.
#[proc_macro]
pub fn once_only(input: TokenStream) -> TokenStream {
    keyword_form("once_only", input)
}

/// Fixture around a property.
///
/// - `setup!(EXPR, do: PROP)` runs `EXPR` before the property.
/// - `setup!(PAT = EXPR, do: PROP, after: TEARDOWN)` binds the fixture for `TEARDOWN`,
///   which runs afterwards; without `after:` the teardown does nothing.
#[proc_macro]
pub fn setup(input: TokenStream) -> TokenStream {
    keyword_form("setup", input)
}

/// `collect!(TAG: TERM, TAG: (COUNT, [REQ, ...]), ..., do: PROP)`
///
/// The first tag is the outermost collection. A `(COUNT, [REQ, ...])` entry reports
/// each required value that never showed up among the samples.
#[proc_macro]
pub fn collect(input: TokenStream) -> TokenStream {
    keyword_form("collect", input)
}

/// `feature!(TERM, do: PROP)`
#[proc_macro]
pub fn feature(input: TokenStream) -> TokenStream {
    keyword_form("feature", input)
}

/// `ensure!(LEFT OP RIGHT)` with `OP` one of `==`, `!=`, `<`, `<=`, `>`, `>=`,
/// `===`, `!==`, `=~` or `in`.
///
/// Both operands are evaluated once; on failure their sources and values are printed.
#[proc_macro]
pub fn ensure(input: TokenStream) -> TokenStream {
    keyword_form("ensure", input)
}

/// The engine's record of the current result, inside a [`when_fail!`] action.
#[proc_macro]
pub fn result_record(input: TokenStream) -> TokenStream {
    propform::expand_result_record(input.into())
        .map_err(syn::Error::from)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
