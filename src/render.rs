//! Structural printing of signatures and types, as written in the source.
//!
//! `quote`'s `to_string` spaces every token (`& some :: Pointer`), which is
//! fine for compilers but not for log lines and docs.

use quote::ToTokens;
use syn::{
    FnArg, GenericArgument, Pat, Path, PathArguments, ReturnType, Signature, Type,
    TypeParamBound,
};

/// `"name type"` pairs of the non-receiver parameters, joined by `,`.
pub fn params_list(sig: &Signature) -> String {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pt) => Some(format!("{} {}", pat_name(&pt.pat), type_expr(&pt.ty))),
            FnArg::Receiver(_) => None,
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn pat_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(p) => p.ident.to_string(),
        Pat::Wild(_) => "_".to_string(),
        other => compact(other),
    }
}

/// Print a type the way it was written: `&some::Pointer`, `Option<Vec<u8>>`.
pub fn type_expr(ty: &Type) -> String {
    match ty {
        Type::Array(a) => format!("[{}; {}]", type_expr(&a.elem), compact(&a.len)),
        Type::Group(g) => type_expr(&g.elem),
        Type::ImplTrait(t) => format!("impl {}", bounds(t.bounds.iter())),
        Type::Infer(_) => "_".to_string(),
        Type::Never(_) => "!".to_string(),
        Type::Paren(p) => format!("({})", type_expr(&p.elem)),
        Type::Path(tp) if tp.qself.is_none() => path_expr(&tp.path),
        Type::Ptr(p) => {
            let qualifier = if p.mutability.is_some() { "mut" } else { "const" };
            format!("*{} {}", qualifier, type_expr(&p.elem))
        }
        Type::Reference(r) => {
            let mut out = String::from("&");
            if let Some(lifetime) = &r.lifetime {
                out.push_str(&format!("'{} ", lifetime.ident));
            }
            if r.mutability.is_some() {
                out.push_str("mut ");
            }
            out.push_str(&type_expr(&r.elem));
            out
        }
        Type::Slice(s) => format!("[{}]", type_expr(&s.elem)),
        Type::TraitObject(t) => format!("dyn {}", bounds(t.bounds.iter())),
        Type::Tuple(t) if t.elems.len() == 1 => format!("({},)", type_expr(&t.elems[0])),
        Type::Tuple(t) => format!(
            "({})",
            t.elems.iter().map(type_expr).collect::<Vec<_>>().join(", ")
        ),
        other => compact(other),
    }
}

fn path_expr(path: &Path) -> String {
    let mut out = String::new();
    if path.leading_colon.is_some() {
        out.push_str("::");
    }
    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|seg| {
            let mut s = seg.ident.to_string();
            match &seg.arguments {
                PathArguments::None => {}
                PathArguments::AngleBracketed(ab) => {
                    if ab.colon2_token.is_some() {
                        s.push_str("::");
                    }
                    let args: Vec<String> = ab.args.iter().map(generic_arg).collect();
                    s.push_str(&format!("<{}>", args.join(", ")));
                }
                PathArguments::Parenthesized(p) => {
                    let inputs: Vec<String> = p.inputs.iter().map(type_expr).collect();
                    s.push_str(&format!("({})", inputs.join(", ")));
                    if let ReturnType::Type(_, ty) = &p.output {
                        s.push_str(&format!(" -> {}", type_expr(ty)));
                    }
                }
            }
            s
        })
        .collect();
    out.push_str(&segments.join("::"));
    out
}

fn generic_arg(arg: &GenericArgument) -> String {
    match arg {
        GenericArgument::Type(ty) => type_expr(ty),
        GenericArgument::Lifetime(l) => format!("'{}", l.ident),
        GenericArgument::AssocType(a) => format!("{} = {}", a.ident, type_expr(&a.ty)),
        other => compact(other),
    }
}

fn bounds<'a>(bounds: impl Iterator<Item = &'a TypeParamBound>) -> String {
    bounds
        .map(|bound| match bound {
            TypeParamBound::Trait(t) => {
                let maybe = if matches!(t.modifier, syn::TraitBoundModifier::Maybe(_)) {
                    "?"
                } else {
                    ""
                };
                format!("{}{}", maybe, path_expr(&t.path))
            }
            TypeParamBound::Lifetime(l) => format!("'{}", l.ident),
            other => compact(other),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Token print with the spacing `quote` adds around punctuation removed.
fn compact(tokens: &dyn ToTokens) -> String {
    tokens
        .to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace("& ", "&")
}
