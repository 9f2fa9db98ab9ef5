//! Recognition of the surface form an invocation is written in.
use log::debug;
use syn::Expr;

use crate::error::{UsageError, UsageResult};
use crate::surface::{Arg, SurfaceCall};
use crate::syntax::SyntaxForm;
use crate::validate::unparen;

/// Determine which form `call` is an instance of.
///
/// A leading keyword selects its form family, and shape picks the member. Without
/// a keyword the lead argument decides: a binding is `forall`, a binding list is
/// `let`, a comparison is `ensure`.
pub fn dispatch(call: &SurfaceCall) -> UsageResult<SyntaxForm> {
    let form = match call.keyword_str() {
        Some(keyword) => by_keyword(&keyword, call)?,
        None => by_shape(call)?,
    };
    debug!(
        "dispatched {} invocation to {}",
        call.keyword_str().as_deref().unwrap_or("keywordless"),
        form.name()
    );
    Ok(form)
}

fn by_keyword(keyword: &str, call: &SurfaceCall) -> UsageResult<SyntaxForm> {
    let candidates: Vec<SyntaxForm> = SyntaxForm::with_keyword(keyword).collect();
    let fallback = candidates.last().copied().ok_or_else(|| UsageError::Unrecognized {
        keyword: Some(keyword.to_string()),
        span: call
            .keyword
            .as_ref()
            .map_or(call.span, |keyword| keyword.span()),
    })?;
    Ok(candidates
        .into_iter()
        .find(|form| has_shape_of(*form, call))
        .unwrap_or(fallback))
}

/// Shape predicate separating forms that share a keyword.
fn has_shape_of(form: SyntaxForm, call: &SurfaceCall) -> bool {
    match form {
        SyntaxForm::SetupTeardown => {
            let binds_lead = matches!(call.args.first(), Some(Arg::Expr(Expr::Assign(_))));
            let has_after = call
                .args
                .iter()
                .any(|arg| matches!(arg, Arg::Keyword { name, .. } if name == "after"));
            binds_lead || has_after
        }
        _ => true,
    }
}

fn by_shape(call: &SurfaceCall) -> UsageResult<SyntaxForm> {
    match call.args.first() {
        Some(Arg::Binds(_)) => Ok(SyntaxForm::ForAll),
        Some(Arg::BindsList { .. }) => Ok(SyntaxForm::Let),
        Some(Arg::Relation(_)) => Ok(SyntaxForm::Ensure),
        // Non-comparison operators are still meant as `ensure` and get its usage error.
        Some(Arg::Expr(expr)) if matches!(unparen(expr), Expr::Binary(_)) => {
            Ok(SyntaxForm::Ensure)
        }
        Some(other) => Err(UsageError::Unrecognized {
            keyword: None,
            span: other.span(),
        }),
        None => Err(UsageError::Unrecognized {
            keyword: None,
            span: call.span,
        }),
    }
}
