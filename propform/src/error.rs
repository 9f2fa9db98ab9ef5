use proc_macro2::Span;
use thiserror::Error;

use crate::syntax::SyntaxForm;

/// Translation-time rejection of a surface form.
///
/// Any of these aborts the translation of the whole invocation; nothing is emitted
/// for input that produced one.
#[derive(Debug, Error)]
pub enum UsageError {
    /// A recognized form written in the wrong shape.
    #[error("malformed `{form}` form: {reason}. Usage: {}", .form.usage())]
    Malformed {
        form: SyntaxForm,
        reason: String,
        span: Span,
    },

    /// No form matched the input.
    #[error("{}", unrecognized_message(.keyword.as_deref()))]
    Unrecognized { keyword: Option<String>, span: Span },

    /// The `#![engine(..)]` header could not be understood.
    #[error("invalid engine configuration: {reason}")]
    Config { reason: String, span: Span },

    /// The tokens are not surface syntax at all.
    #[error(transparent)]
    Syntax(#[from] syn::Error),
}

fn unrecognized_message(keyword: Option<&str>) -> String {
    let known = SyntaxForm::keywords().join(", ");
    match keyword {
        Some(keyword) => {
            format!("unrecognized property form `{keyword}`; expected one of: {known}")
        }
        None => format!(
            "unrecognized property form; expected a leading keyword ({known}), a `PAT <- GEN` binding, or a comparison"
        ),
    }
}

impl UsageError {
    pub(crate) fn malformed(form: SyntaxForm, reason: impl Into<String>, span: Span) -> Self {
        UsageError::Malformed {
            form,
            reason: reason.into(),
            span,
        }
    }

    /// Form the error was raised for, when one was recognized.
    pub fn form(&self) -> Option<SyntaxForm> {
        match self {
            UsageError::Malformed { form, .. } => Some(*form),
            _ => None,
        }
    }

    /// Canonical usage string of the intended form.
    pub fn usage(&self) -> Option<&'static str> {
        self.form().map(SyntaxForm::usage)
    }

    /// Location the error is reported at.
    pub fn span(&self) -> Span {
        match self {
            UsageError::Malformed { span, .. }
            | UsageError::Unrecognized { span, .. }
            | UsageError::Config { span, .. } => *span,
            UsageError::Syntax(err) => err.span(),
        }
    }
}

impl From<UsageError> for syn::Error {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::Syntax(err) => err,
            other => syn::Error::new(other.span(), other.to_string()),
        }
    }
}

pub type UsageResult<T> = Result<T, UsageError>;
