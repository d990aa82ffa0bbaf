//! Parsing of the doc-comment annotation tags.
//!
//! A tag is a single doc line of the form `@NAME("argument")` or `@NAME`. Tags
//! are tokenized with `syn`, so string escapes and unterminated literals are
//! handled exactly as in Rust source.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitStr, Token, Type, token};

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// POST and PUT send a payload; GET and DELETE encode bindings into the
    /// query string.
    pub fn carries_payload(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// `reqwest::Method` constant as re-exported by the runtime module.
    pub fn to_tokens(&self, runtime: &syn::Path) -> TokenStream {
        match self {
            Self::Get => quote! { #runtime::reqwest::Method::GET },
            Self::Post => quote! { #runtime::reqwest::Method::POST },
            Self::Put => quote! { #runtime::reqwest::Method::PUT },
            Self::Delete => quote! { #runtime::reqwest::Method::DELETE },
        }
    }
}

/// Where a binding method puts its value in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    Path,
    Query,
    Header,
    Form,
    Body,
    Multipart,
}

impl BindingKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Path => "@PATH",
            Self::Query => "@QUERY",
            Self::Header => "@HEADER",
            Self::Form => "@FORM",
            Self::Body => "@BODY",
            Self::Multipart => "@MULTIPART",
        }
    }
}

/// A typed annotation
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Endpoint { verb: HttpMethod, path_template: String },
    Path { key: String },
    Query { key: String },
    Header { key: String },
    Form { key: String },
    Body,
    Multipart { key: String },
    Sync { result_type: Type },
    Async { callback_type: Ident },
}

impl Directive {
    /// Binding kind and key, for binding directives. The body binding has an
    /// empty key.
    pub fn binding(&self) -> Option<(BindingKind, &str)> {
        match self {
            Self::Path { key } => Some((BindingKind::Path, key)),
            Self::Query { key } => Some((BindingKind::Query, key)),
            Self::Header { key } => Some((BindingKind::Header, key)),
            Self::Form { key } => Some((BindingKind::Form, key)),
            Self::Body => Some((BindingKind::Body, "")),
            Self::Multipart { key } => Some((BindingKind::Multipart, key)),
            _ => None,
        }
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self, Self::Endpoint { .. })
    }
}

/// Raw `@NAME("argument")` before the name is resolved
struct Tag {
    name: Ident,
    argument: Option<LitStr>,
}

impl Parse for Tag {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let _: Token![@] = input.parse()?;
        let name = input.call(Ident::parse_any)?;

        let argument = if input.peek(token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            let lit: LitStr = content.parse()?;
            if !content.is_empty() {
                return Err(content.error("expected exactly one string argument"));
            }
            Some(lit)
        } else {
            None
        };

        if !input.is_empty() {
            return Err(input.error("unexpected tokens after annotation"));
        }

        Ok(Tag { name, argument })
    }
}

/// Parse one tag line into a directive.
///
/// Unknown tag names are errors, as are missing, extra, or empty arguments.
pub fn interpret(tag_text: &str) -> syn::Result<Directive> {
    let tag: Tag = syn::parse_str(tag_text.trim())?;
    let name = tag.name.to_string();

    if let Some(verb) = HttpMethod::from_tag(&name) {
        let path_template = required(&tag)?;
        return Ok(Directive::Endpoint {
            verb,
            path_template,
        });
    }

    match name.as_str() {
        "PATH" => Ok(Directive::Path { key: key(&tag)? }),
        "QUERY" => Ok(Directive::Query { key: key(&tag)? }),
        "HEADER" => Ok(Directive::Header { key: key(&tag)? }),
        "FORM" => Ok(Directive::Form { key: key(&tag)? }),
        "MULTIPART" => Ok(Directive::Multipart { key: key(&tag)? }),
        "BODY" => {
            if let Some(lit) = &tag.argument {
                return Err(syn::Error::new(lit.span(), "@BODY takes no argument"));
            }
            Ok(Directive::Body)
        }
        "SYNC" => {
            let value = key(&tag)?;
            let result_type = syn::parse_str::<Type>(&value).map_err(|_| {
                syn::Error::new(tag.name.span(), format!("`{value}` is not a type"))
            })?;
            Ok(Directive::Sync { result_type })
        }
        "ASYNC" => {
            let value = key(&tag)?;
            let callback_type = syn::parse_str::<Ident>(&value).map_err(|_| {
                syn::Error::new(tag.name.span(), format!("`{value}` is not an identifier"))
            })?;
            Ok(Directive::Async { callback_type })
        }
        _ => Err(syn::Error::new(
            tag.name.span(),
            format!("unknown annotation `@{name}`"),
        )),
    }
}

fn required(tag: &Tag) -> syn::Result<String> {
    tag.argument.as_ref().map(LitStr::value).ok_or_else(|| {
        syn::Error::new(
            tag.name.span(),
            format!("@{} expects a string argument", tag.name),
        )
    })
}

fn key(tag: &Tag) -> syn::Result<String> {
    let value = required(tag)?;
    if value.trim().is_empty() {
        return Err(syn::Error::new(
            tag.name.span(),
            format!("@{} argument must not be empty", tag.name),
        ));
    }
    Ok(value)
}
