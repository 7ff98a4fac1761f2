//! Parsing of `#[application(...)]`, `#[command(...)]` and
//! `#[middleware(...)]` arguments.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Error, Expr, Lit, Meta, Result, Token,
};

/// Declared metadata and placement hints.
///
/// Terminal kinds only accept `name` and `description`; the placement keys
/// are rejected by [`HandlerAttrs::reject_placement`].
#[derive(Debug, Default)]
pub struct HandlerAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub first: bool,
    pub last: bool,
    /// Span of the first placement key seen, for error reporting.
    placement_span: Option<proc_macro2::Span>,
}

impl HandlerAttrs {
    /// Fails if any placement key was given.
    pub fn reject_placement(&self, kind: &str) -> Result<()> {
        match self.placement_span {
            Some(span) => Err(Error::new(
                span,
                format!("placement hints are only allowed on #[middleware], not #[{}]", kind),
            )),
            None => Ok(()),
        }
    }

    fn mark_placement(&mut self, span: proc_macro2::Span) {
        self.placement_span.get_or_insert(span);
    }
}

impl Parse for HandlerAttrs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attrs = HandlerAttrs::default();

        if input.is_empty() {
            return Ok(attrs);
        }

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match meta {
                Meta::NameValue(nv) => {
                    let ident = nv.path.get_ident().map(|i| i.to_string());
                    match ident.as_deref() {
                        Some("name") => attrs.name = Some(parse_string_value(&nv.value)?),
                        Some("description") => {
                            attrs.description = Some(parse_string_value(&nv.value)?)
                        }
                        Some("before") => {
                            attrs.mark_placement(nv.path.span());
                            attrs.before = Some(parse_string_value(&nv.value)?);
                        }
                        Some("after") => {
                            attrs.mark_placement(nv.path.span());
                            attrs.after = Some(parse_string_value(&nv.value)?);
                        }
                        Some("first") => {
                            attrs.mark_placement(nv.path.span());
                            attrs.first = parse_bool_value(&nv.value)?;
                        }
                        Some("last") => {
                            attrs.mark_placement(nv.path.span());
                            attrs.last = parse_bool_value(&nv.value)?;
                        }
                        Some(other) => {
                            return Err(Error::new(
                                nv.path.span(),
                                format!("unknown attribute `{}`", other),
                            ));
                        }
                        None => {
                            return Err(Error::new(nv.path.span(), "expected identifier"));
                        }
                    }
                }
                Meta::Path(path) => {
                    if path.is_ident("first") {
                        attrs.mark_placement(path.span());
                        attrs.first = true;
                    } else if path.is_ident("last") {
                        attrs.mark_placement(path.span());
                        attrs.last = true;
                    } else {
                        return Err(Error::new(
                            path.span(),
                            "expected `name = \"...\"` style attribute",
                        ));
                    }
                }
                Meta::List(_) => {
                    return Err(Error::new(
                        meta.span(),
                        "unexpected attribute format, use `key = value`",
                    ));
                }
            }
        }

        Ok(attrs)
    }
}

fn parse_string_value(expr: &Expr) -> Result<String> {
    if let Expr::Lit(expr_lit) = expr {
        if let Lit::Str(lit_str) = &expr_lit.lit {
            return Ok(lit_str.value());
        }
    }
    Err(Error::new(expr.span(), "expected string literal"))
}

fn parse_bool_value(expr: &Expr) -> Result<bool> {
    if let Expr::Lit(expr_lit) = expr {
        if let Lit::Bool(lit_bool) = &expr_lit.lit {
            return Ok(lit_bool.value());
        }
    }
    Err(Error::new(expr.span(), "expected boolean literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: proc_macro2::TokenStream) -> Result<HandlerAttrs> {
        syn::parse2(tokens)
    }

    #[test]
    fn test_empty() {
        let attrs = parse(quote::quote!()).unwrap();
        assert!(attrs.name.is_none());
        assert!(!attrs.first);
        assert!(attrs.reject_placement("command").is_ok());
    }

    #[test]
    fn test_name_and_description() {
        let attrs = parse(quote::quote!(name = "list", description = "List items")).unwrap();
        assert_eq!(attrs.name.as_deref(), Some("list"));
        assert_eq!(attrs.description.as_deref(), Some("List items"));
    }

    #[test]
    fn test_placement_keys() {
        let attrs =
            parse(quote::quote!(name = "banner", last, before = "x", first = false)).unwrap();
        assert!(attrs.last);
        assert!(!attrs.first);
        assert_eq!(attrs.before.as_deref(), Some("x"));

        let err = attrs.reject_placement("application").unwrap_err();
        assert!(err.to_string().contains("only allowed on #[middleware]"));
    }

    #[test]
    fn test_unknown_key() {
        let err = parse(quote::quote!(about = "nope")).err().unwrap();
        assert_eq!(err.to_string(), "unknown attribute `about`");
    }

    #[test]
    fn test_wrong_literal() {
        assert!(parse(quote::quote!(name = 3)).is_err());
        assert!(parse(quote::quote!(first = "yes")).is_err());
    }
}
