//! Generic surface syntax shared by every form.
//!
//! A surface call is an optional leading keyword followed by comma-separated arguments.
//! Arguments are classified by shape only; whether the arrangement suits the intended
//! form is decided later by the validator.
//!
//! Argument shapes, tried in order:
//! - `do: EXPR` or `do { ... }`: the body block.
//! - `NAME: EXPR`: a keyword argument (`when:`, `to:`, `after:`, collect tags).
//! - `PAT <- EXPR`: a binds relation. `<-` must be written without inner space, so
//!   `x < -1` stays a comparison.
//! - `[PAT <- EXPR, ...]`: a binds list.
//! - `LEFT === RIGHT`, `LEFT !== RIGHT`, `LEFT =~ RIGHT`, `LEFT in RIGHT`: a relation
//!   with an operator that has no Rust expression syntax.
//! - anything else is parsed as a Rust expression.
use proc_macro2::{Delimiter, Spacing, Span, TokenStream, TokenTree};
use syn::{
    Attribute, Expr, ExprBlock, Ident, Pat, Token, bracketed,
    ext::IdentExt,
    parse::{Parse, ParseStream, Parser},
    punctuated::Punctuated,
    spanned::Spanned,
    token,
};

use crate::syntax::SyntaxForm;

/// One surface instance, before dispatch.
#[derive(Debug, Clone)]
pub struct SurfaceCall {
    /// Inner attributes written before the keyword (`#![engine(..)]`).
    pub attrs: Vec<Attribute>,
    pub keyword: Option<Ident>,
    pub args: Vec<Arg>,
    pub span: Span,
}

/// A `PAT <- GEN` relation.
#[derive(Debug, Clone)]
pub struct Binds {
    pub pat: Pat,
    pub arrow: Token![<-],
    pub generator: Expr,
}

/// The `do:` block of a form.
#[derive(Debug, Clone)]
pub struct Body {
    pub do_token: Token![do],
    pub expr: Expr,
}

/// Operators of the comparison form that Rust cannot parse as binary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    StrictEq,
    StrictNe,
    Matches,
    In,
}

/// `LEFT OP RIGHT` with a [`RelationOp`].
#[derive(Debug, Clone)]
pub struct Relation {
    pub left: Expr,
    pub op: RelationOp,
    pub op_span: Span,
    pub right: Expr,
}

#[derive(Debug, Clone)]
pub enum Arg {
    Body(Body),
    Keyword { name: Ident, value: Expr },
    Binds(Binds),
    BindsList { span: Span, clauses: Vec<Binds> },
    Relation(Relation),
    Expr(Expr),
}

impl Arg {
    pub fn span(&self) -> Span {
        match self {
            Arg::Body(body) => body.do_token.span,
            Arg::Keyword { name, .. } => name.span(),
            Arg::Binds(binds) => binds.pat.span(),
            Arg::BindsList { span, .. } => *span,
            Arg::Relation(relation) => relation.op_span,
            Arg::Expr(expr) => expr.span(),
        }
    }

    /// Short shape name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Arg::Body(_) => "a `do:` body",
            Arg::Keyword { .. } => "a keyword argument",
            Arg::Binds(_) => "a `PAT <- GEN` binding",
            Arg::BindsList { .. } => "a binding list",
            Arg::Relation(_) => "a relation",
            Arg::Expr(_) => "an expression",
        }
    }
}

impl Body {
    /// Whether the body is an empty block (`do {}` or `do: {}`).
    pub fn is_empty(&self) -> bool {
        matches!(&self.expr, Expr::Block(block) if block.block.stmts.is_empty())
    }
}

impl RelationOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelationOp::StrictEq => "===",
            RelationOp::StrictNe => "!==",
            RelationOp::Matches => "=~",
            RelationOp::In => "in",
        }
    }
}

impl Parse for Binds {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Binds {
            pat: Pat::parse_multi_with_leading_vert(input)?,
            arrow: input.parse()?,
            generator: input.parse()?,
        })
    }
}

impl Parse for SurfaceCall {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        SurfaceCall::parse_with(input, None)
    }
}

impl SurfaceCall {
    /// Parse a call whose keyword is implied by the macro name.
    pub fn parse_keyword(keyword: &str, tokens: TokenStream) -> syn::Result<Self> {
        let keyword = Ident::new(keyword, Span::call_site());
        (|input: ParseStream| SurfaceCall::parse_with(input, Some(keyword))).parse2(tokens)
    }

    fn parse_with(input: ParseStream, keyword: Option<Ident>) -> syn::Result<Self> {
        let span = input.span();
        let attrs = input.call(Attribute::parse_inner)?;
        let keyword = match keyword {
            Some(keyword) => Some(keyword),
            None if starts_with_keyword(input) => Some(input.call(Ident::parse_any)?),
            None => None,
        };

        let mut args = Vec::new();
        while !input.is_empty() {
            args.push(parse_arg(input)?);
            if input.is_empty() {
                break;
            }
            // The body block may follow its argument without a separating comma.
            if input.peek(Token![do]) {
                continue;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(SurfaceCall {
            attrs,
            keyword,
            args,
            span,
        })
    }

    /// Keyword as written, if any.
    pub fn keyword_str(&self) -> Option<String> {
        self.keyword.as_ref().map(|k| k.unraw().to_string())
    }
}

/// A known keyword followed by something other than punctuation.
///
/// `sized == 3` or `lazy.x` stay expressions even though they start with a keyword, and
/// so does `collect(xs) == ys`: a keyword followed by parentheses is a function call
/// when the whole input is one argument. Every form but `ensure` needs more than one.
fn starts_with_keyword(input: ParseStream) -> bool {
    let Some((ident, rest)) = input.cursor().ident() else {
        return false;
    };
    let keyword = ident.to_string();
    if !SyntaxForm::is_keyword(&keyword) {
        return false;
    }
    if keyword != SyntaxForm::Ensure.keyword() && rest.group(Delimiter::Parenthesis).is_some() {
        return !is_single_argument(input);
    }
    !rest.eof() && rest.punct().is_none()
}

fn is_single_argument(input: ParseStream) -> bool {
    let fork = input.fork();
    matches!(parse_arg(&fork), Ok(Arg::Expr(_) | Arg::Relation(_))) && fork.is_empty()
}

fn parse_arg(input: ParseStream) -> syn::Result<Arg> {
    if input.peek(Token![do]) {
        return parse_body(input).map(Arg::Body);
    }

    if input.peek(Ident) && input.peek2(Token![:]) && !input.peek2(Token![::]) {
        let name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let value: Expr = input.parse()?;
        return Ok(Arg::Keyword { name, value });
    }

    let fork = input.fork();
    if Pat::parse_multi_with_leading_vert(&fork).is_ok() && fork.peek(Token![<-]) {
        return input.parse().map(Arg::Binds);
    }

    if input.peek(token::Bracket) {
        let fork = input.fork();
        if parse_binds_list(&fork).is_ok() && (fork.is_empty() || fork.peek(Token![,])) {
            let (span, clauses) = parse_binds_list(input)?;
            return Ok(Arg::BindsList { span, clauses });
        }
    }

    if let Some(relation) = parse_relation(input)? {
        return Ok(Arg::Relation(relation));
    }

    input.parse().map(Arg::Expr)
}

fn parse_body(input: ParseStream) -> syn::Result<Body> {
    let do_token: Token![do] = input.parse()?;
    let expr = if input.peek(Token![:]) {
        input.parse::<Token![:]>()?;
        input.parse()?
    } else if input.peek(token::Brace) {
        Expr::Block(ExprBlock {
            attrs: Vec::new(),
            label: None,
            block: input.parse()?,
        })
    } else {
        return Err(input.error("expected `do: EXPR` or `do { ... }`"));
    };
    Ok(Body { do_token, expr })
}

fn parse_binds_list(input: ParseStream) -> syn::Result<(Span, Vec<Binds>)> {
    let content;
    let bracket = bracketed!(content in input);
    let clauses = Punctuated::<Binds, Token![,]>::parse_terminated(&content)?;
    Ok((bracket.span.join(), clauses.into_iter().collect()))
}

/// Split the current argument at a top-level relation operator, if it has one.
///
/// The argument ends at the first top-level comma, or at the end of input.
fn parse_relation(input: ParseStream) -> syn::Result<Option<Relation>> {
    let mut tokens = Vec::new();
    let mut cursor = input.cursor();
    while let Some((tt, next)) = cursor.token_tree() {
        if matches!(&tt, TokenTree::Punct(p) if p.as_char() == ',') {
            break;
        }
        tokens.push(tt);
        cursor = next;
    }

    let Some((at, len, op)) = find_relation_op(&tokens) else {
        return Ok(None);
    };
    let op_span = tokens[at].span();
    let left: TokenStream = tokens[..at].iter().cloned().collect();
    let right: TokenStream = tokens[at + len..].iter().cloned().collect();
    if left.is_empty() || right.is_empty() {
        return Err(syn::Error::new(
            op_span,
            format!("`{}` needs an operand on both sides", op.symbol()),
        ));
    }
    let left: Expr = syn::parse2(left)?;
    let right: Expr = syn::parse2(right)?;

    let consumed = tokens.len();
    input.step(|cursor| {
        let mut rest = *cursor;
        for _ in 0..consumed {
            match rest.token_tree() {
                Some((_, next)) => rest = next,
                None => break,
            }
        }
        Ok(((), rest))
    })?;

    Ok(Some(Relation {
        left,
        op,
        op_span,
        right,
    }))
}

/// Position, token length and kind of the first relation operator in `tokens`.
fn find_relation_op(tokens: &[TokenTree]) -> Option<(usize, usize, RelationOp)> {
    let punct = |i: usize| match tokens.get(i) {
        Some(TokenTree::Punct(p)) => Some((p.as_char(), p.spacing())),
        _ => None,
    };

    // `for PAT in EXPR` loops keep their `in`.
    let mut saw_for = false;
    for i in 0..tokens.len() {
        match &tokens[i] {
            TokenTree::Ident(ident) if ident == "for" => {
                saw_for = true;
                continue;
            }
            TokenTree::Ident(ident) if ident == "in" && !saw_for => {
                return Some((i, 1, RelationOp::In));
            }
            TokenTree::Group(group) if group.delimiter() == Delimiter::None => continue,
            TokenTree::Punct(_) => {}
            _ => continue,
        }
        // Operators glued to a preceding punctuation belong to a longer token.
        if i > 0 && matches!(punct(i - 1), Some((_, Spacing::Joint))) {
            continue;
        }
        // `===` may arrive as `==` glued to a lone `=`; neither spelling is valid Rust.
        match (punct(i), punct(i + 1), punct(i + 2)) {
            (Some(('=', Spacing::Joint)), Some(('=', _)), Some(('=', _))) => {
                return Some((i, 3, RelationOp::StrictEq));
            }
            (Some(('!', Spacing::Joint)), Some(('=', _)), Some(('=', _))) => {
                return Some((i, 3, RelationOp::StrictNe));
            }
            (Some(('=', _)), Some(('~', _)), _) => {
                return Some((i, 2, RelationOp::Matches));
            }
            _ => {}
        }
    }
    None
}
