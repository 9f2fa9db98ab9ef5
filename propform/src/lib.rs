//! Propform: surface syntax for randomized property tests, rewritten at compile time.
//!
//! Each surface form (`forall`, `let`, `such_that`, `collect`, `ensure`, ...) is
//! translated into a nested chain of calls against an external property engine. No
//! generation, shrinking or sampling happens here: this crate only builds the call
//! graph and rejects malformed input with the canonical usage string of the form the
//! input was meant to be.
//!
//! Translation pipeline
//!  - [`surface`] splits the tokens into a keyword and shape-classified arguments.
//!  - [`dispatch`] picks the [`SyntaxForm`] by keyword, or structurally without one.
//!  - [`validate`] checks the arrangement and builds the typed [`Form`], running the
//!    [`scope`] checks on binding clauses.
//!  - [`expand`] emits the engine calls, rooted at [`ExpandConfig::engine`].
//!
//! Example
//! ```
//! use quote::quote;
//!
//! let tokens = propform::expand(quote!(forall x <- int(), do: x == x)).unwrap();
//! assert_eq!(
//!     tokens.to_string(),
//!     quote!(::propcheck::forall(int(), move |x| x == x)).to_string()
//! );
//! ```
use log::debug;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

/// Recognition of the form an invocation is written in.
pub mod dispatch;
/// Engine primitives and the root path they are addressed through.
pub mod engine;
/// Translation-time errors.
pub mod error;
/// Call chain emission.
pub mod expand;
/// Typed, validated forms.
pub mod form;
/// Lexical scope checks for binding clauses.
pub mod scope;
/// Generic surface syntax shared by every form.
pub mod surface;
/// The closed table of surface forms.
pub mod syntax;
/// Per-form arrangement checks.
pub mod validate;

pub use engine::{ExpandConfig, Primitive};
pub use error::{UsageError, UsageResult};
pub use form::Form;
pub use surface::SurfaceCall;
pub use syntax::SyntaxForm;

pub mod prelude {
    //! Convenient re-exports for macro front ends.
    pub use crate::engine::{ExpandConfig, Primitive};
    pub use crate::error::{UsageError, UsageResult};
    pub use crate::syntax::SyntaxForm;
    pub use crate::{expand, expand_keyword, expand_result_record, translate};
}

/// Translate a surface invocation whose form is given by a leading keyword or by shape.
pub fn expand(tokens: TokenStream) -> UsageResult<TokenStream> {
    let call: SurfaceCall = syn::parse2(tokens)?;
    translate(&call, ExpandConfig::default())
}

/// Translate the arguments of a dedicated macro whose name implies `keyword`.
pub fn expand_keyword(keyword: &str, tokens: TokenStream) -> UsageResult<TokenStream> {
    let call = SurfaceCall::parse_keyword(keyword, tokens)?;
    translate(&call, ExpandConfig::default())
}

/// Run dispatch, validation and expansion for one parsed call.
///
/// Inner attributes of `call` are applied on top of `config` first.
pub fn translate(call: &SurfaceCall, mut config: ExpandConfig) -> UsageResult<TokenStream> {
    config.apply_attributes(&call.attrs)?;
    let syntax = dispatch::dispatch(call)?;
    let form = validate::validate(syntax, call)?;
    debug!(
        "translating {} against engine `{}`",
        syntax.name(),
        config.engine.to_token_stream().to_string().replace(' ', "")
    );
    Ok(expand::Expander::new(&config).expand(&form))
}

/// Call to the engine's result record lookup, for use inside `when_fail` actions.
///
/// Accepts an optional `#![engine(PATH)]` and nothing else.
pub fn expand_result_record(tokens: TokenStream) -> UsageResult<TokenStream> {
    let call: SurfaceCall = syn::parse2(tokens)?;
    if let Some(arg) = call.args.first() {
        return Err(syn::Error::new(arg.span(), "`result_record` takes no arguments").into());
    }
    let mut config = ExpandConfig::default();
    config.apply_attributes(&call.attrs)?;
    let result_record = config.path(Primitive::ResultRecord);
    Ok(quote!(#result_record()))
}
