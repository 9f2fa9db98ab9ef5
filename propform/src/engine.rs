//! Interface toward the external property engine.
//!
//! Expansions never implement generation themselves; they call the primitives below,
//! addressed through a configurable root path (`::propcheck` unless overridden).
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use strum::{EnumIter, IntoStaticStr};
use syn::{Attribute, Path, parse_quote, spanned::Spanned};

use crate::error::UsageError;

/// Engine primitives referenced by expansions, named as the engine exports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Primitive {
    #[strum(serialize = "forall")]
    ForAll,
    #[strum(serialize = "bind")]
    Bind,
    #[strum(serialize = "suchthat")]
    SuchThat,
    #[strum(serialize = "suchthatmaybe")]
    SuchThatMaybe,
    #[strum(serialize = "sized")]
    Sized,
    #[strum(serialize = "shrinkwith")]
    ShrinkWith,
    #[strum(serialize = "letshrink")]
    LetShrink,
    #[strum(serialize = "lazy")]
    Lazy,
    #[strum(serialize = "whenfail")]
    WhenFail,
    #[strum(serialize = "implies")]
    Implies,
    #[strum(serialize = "trapexit")]
    TrapExit,
    #[strum(serialize = "timeout_property")]
    Timeout,
    #[strum(serialize = "always")]
    Always,
    #[strum(serialize = "sometimes")]
    Sometimes,
    #[strum(serialize = "onceonly")]
    OnceOnly,
    #[strum(serialize = "collect")]
    Collect,
    #[strum(serialize = "features")]
    Features,
    #[strum(serialize = "result_record")]
    ResultRecord,
}

impl Primitive {
    /// Exported name of the primitive.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Translation settings shared by every form of one invocation.
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Root path under which the engine primitives live.
    pub engine: Path,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            engine: parse_quote!(::propcheck),
        }
    }
}

impl ExpandConfig {
    /// Use `engine` as the root path of every emitted call.
    pub fn with_engine(engine: Path) -> Self {
        Self { engine }
    }

    /// Apply the inner attributes found at the start of an invocation.
    ///
    /// Only `#![engine(PATH)]` is understood; it may appear at most once.
    pub fn apply_attributes(&mut self, attrs: &[Attribute]) -> Result<(), UsageError> {
        let mut seen = false;
        for attr in attrs {
            if !attr.path().is_ident("engine") {
                return Err(UsageError::Config {
                    reason: "only `#![engine(PATH)]` is accepted here".to_string(),
                    span: attr.span(),
                });
            }
            if seen {
                return Err(UsageError::Config {
                    reason: "`#![engine(..)]` given more than once".to_string(),
                    span: attr.span(),
                });
            }
            self.engine = attr.parse_args::<Path>().map_err(|err| UsageError::Config {
                reason: format!("expected `#![engine(PATH)]`: {err}"),
                span: attr.span(),
            })?;
            seen = true;
        }
        Ok(())
    }

    /// Fully qualified path of `primitive`.
    pub fn path(&self, primitive: Primitive) -> TokenStream {
        let engine = &self.engine;
        let name = Ident::new(primitive.name(), Span::call_site());
        quote!(#engine::#name)
    }
}
