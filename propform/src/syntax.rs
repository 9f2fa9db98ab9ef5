//! The closed table of recognized surface forms.
//!
//! Every form has a surface keyword (the word a `prop!` invocation starts with, or the
//! name of the dedicated macro), a canonical usage string reported on malformed input,
//! and the engine primitive its expansion starts with.
use std::fmt;

use strum::{EnumIs, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::engine::Primitive;

/// Identity of a rewrite rule.
///
/// Declaration order is the dispatch priority among forms sharing a keyword:
/// [`SyntaxForm::SetupTeardown`] is tried before [`SyntaxForm::Setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumIs, IntoStaticStr)]
pub enum SyntaxForm {
    ForAll,
    Let,
    SuchThat,
    SuchThatMaybe,
    Sized,
    Shrink,
    LetShrink,
    WhenFail,
    Lazy,
    Implies,
    TrapExit,
    Timeout,
    Always,
    Sometimes,
    SetupTeardown,
    Setup,
    OnceOnly,
    Collect,
    Feature,
    Ensure,
}

impl SyntaxForm {
    /// Surface keyword introducing the form.
    pub const fn keyword(self) -> &'static str {
        match self {
            SyntaxForm::ForAll => "forall",
            SyntaxForm::Let => "let",
            SyntaxForm::SuchThat => "such_that",
            SyntaxForm::SuchThatMaybe => "such_that_maybe",
            SyntaxForm::Sized => "sized",
            SyntaxForm::Shrink => "shrink",
            SyntaxForm::LetShrink => "let_shrink",
            SyntaxForm::WhenFail => "when_fail",
            SyntaxForm::Lazy => "lazy",
            SyntaxForm::Implies => "implies",
            SyntaxForm::TrapExit => "trap_exit",
            SyntaxForm::Timeout => "timeout",
            SyntaxForm::Always => "always",
            SyntaxForm::Sometimes => "sometimes",
            SyntaxForm::SetupTeardown | SyntaxForm::Setup => "setup",
            SyntaxForm::OnceOnly => "once_only",
            SyntaxForm::Collect => "collect",
            SyntaxForm::Feature => "feature",
            SyntaxForm::Ensure => "ensure",
        }
    }

    /// Canonical usage string, unique per form.
    pub const fn usage(self) -> &'static str {
        match self {
            SyntaxForm::ForAll => "forall PAT <- GEN, do: PROP",
            SyntaxForm::Let => "let PAT <- GEN | [PAT <- GEN, ...], do: BODY",
            SyntaxForm::SuchThat => "such_that PAT <- GEN, when: PRED",
            SyntaxForm::SuchThatMaybe => "such_that_maybe PAT <- GEN, when: PRED",
            SyntaxForm::Sized => "sized SIZE, do: BODY",
            SyntaxForm::Shrink => "shrink GEN, to: [ALT, ...]",
            SyntaxForm::LetShrink => "let_shrink PAT <- [GEN, ...], do: BODY",
            SyntaxForm::WhenFail => "when_fail ACTION, do: PROP",
            SyntaxForm::Lazy => "lazy do: GEN",
            SyntaxForm::Implies => "implies COND, do: PROP",
            SyntaxForm::TrapExit => "trap_exit do: PROP",
            SyntaxForm::Timeout => "timeout LIMIT, do: PROP",
            SyntaxForm::Always => "always N, do: PROP",
            SyntaxForm::Sometimes => "sometimes N, do: PROP",
            SyntaxForm::SetupTeardown => "setup PAT = EXPR, do: PROP, after: TEARDOWN",
            SyntaxForm::Setup => "setup EXPR, do: PROP",
            SyntaxForm::OnceOnly => "once_only do: PROP",
            SyntaxForm::Collect => "collect TAG: TERM, TAG: (COUNT, [REQ, ...]), ..., do: PROP",
            SyntaxForm::Feature => "feature TERM, do: PROP",
            SyntaxForm::Ensure => "ensure LEFT OP RIGHT",
        }
    }

    /// Engine primitive targeted by the outermost call of the expansion.
    ///
    /// Setup forms expand to a `(setup, body)` tuple and have no outer call.
    pub const fn primitive(self) -> Option<Primitive> {
        match self {
            SyntaxForm::ForAll => Some(Primitive::ForAll),
            SyntaxForm::Let => Some(Primitive::Bind),
            SyntaxForm::SuchThat => Some(Primitive::SuchThat),
            SyntaxForm::SuchThatMaybe => Some(Primitive::SuchThatMaybe),
            SyntaxForm::Sized => Some(Primitive::Sized),
            SyntaxForm::Shrink => Some(Primitive::ShrinkWith),
            SyntaxForm::LetShrink => Some(Primitive::LetShrink),
            SyntaxForm::WhenFail | SyntaxForm::Ensure => Some(Primitive::WhenFail),
            SyntaxForm::Lazy => Some(Primitive::Lazy),
            SyntaxForm::Implies => Some(Primitive::Implies),
            SyntaxForm::TrapExit => Some(Primitive::TrapExit),
            SyntaxForm::Timeout => Some(Primitive::Timeout),
            SyntaxForm::Always => Some(Primitive::Always),
            SyntaxForm::Sometimes => Some(Primitive::Sometimes),
            SyntaxForm::SetupTeardown | SyntaxForm::Setup => None,
            SyntaxForm::OnceOnly => Some(Primitive::OnceOnly),
            SyntaxForm::Collect | SyntaxForm::Feature => Some(Primitive::Collect),
        }
    }

    /// Forms introduced by `keyword`, in dispatch priority order.
    pub fn with_keyword(keyword: &str) -> impl Iterator<Item = SyntaxForm> + '_ {
        Self::iter().filter(move |form| form.keyword() == keyword)
    }

    /// Whether `word` introduces at least one form.
    pub fn is_keyword(word: &str) -> bool {
        Self::with_keyword(word).next().is_some()
    }

    /// All distinct surface keywords, in declaration order.
    pub fn keywords() -> Vec<&'static str> {
        let mut keywords: Vec<&'static str> = Vec::new();
        for form in Self::iter() {
            if !keywords.contains(&form.keyword()) {
                keywords.push(form.keyword());
            }
        }
        keywords
    }

    /// Variant name, used in log records.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for SyntaxForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
