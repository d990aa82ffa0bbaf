//! Intermediate representation of one annotated trait.
//!
//! [`build`] walks an [`InterfaceDecl`] and produces an [`Endpoint`]. The IR is
//! immutable once built and holds nothing across declarations.

use std::collections::BTreeSet;

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::{FnArg, Ident, Pat, ReturnType, Signature, Type, TypeParamBound, Visibility};

use crate::error::{Error, Location, Result};
use crate::parse::{BindingKind, Directive, HttpMethod, interpret};
use crate::render::{params_list, type_expr};
use crate::scan::{InterfaceDecl, MethodDecl};

/// A method parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    /// The declared type, printed as written
    pub type_expression: String,
    pub ty: Type,
}

/// What a method does when called
#[derive(Debug, Clone)]
pub enum MethodRole {
    Binding { kind: BindingKind, key: String },
    Sync { result_type: Type },
    Async { callback_type: Ident },
}

/// What a generated method hands back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// The builder itself, for chaining
    Builder,
    /// The sync result type or an error
    Response,
    /// Nothing; results arrive through the callback
    Unit,
}

/// How a method receives `self`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    Owned,
    Ref,
    RefMut,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub role: MethodRole,
    pub receiver: ReceiverKind,
    /// Declared signature, reused verbatim for the generated impl
    pub signature: Signature,
}

impl Method {
    pub fn return_shape(&self) -> ReturnShape {
        match self.role {
            MethodRole::Binding { .. } => ReturnShape::Builder,
            MethodRole::Sync { .. } => ReturnShape::Response,
            MethodRole::Async { .. } => ReturnShape::Unit,
        }
    }

    pub fn binding_kind(&self) -> Option<BindingKind> {
        match self.role {
            MethodRole::Binding { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn binding_key(&self) -> Option<&str> {
        match &self.role {
            MethodRole::Binding { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// One HTTP operation derived from an annotated trait
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub ident: Ident,
    pub vis: Visibility,
    pub http_method: HttpMethod,
    pub path_template: String,
    pub methods: Vec<Method>,
    pub sync_result_type: Option<Type>,
    pub async_callback_type: Option<Ident>,
    /// Declared type of the `@BODY` parameter
    pub body_type: Option<Type>,
}

impl Endpoint {
    /// Binding kinds used by at least one method, in a fixed order.
    pub fn binding_kinds(&self) -> BTreeSet<BindingKind> {
        self.methods.iter().filter_map(Method::binding_kind).collect()
    }

    pub fn uses(&self, kind: BindingKind) -> bool {
        self.methods.iter().any(|m| m.binding_kind() == Some(kind))
    }

    /// `{name}` placeholders of the path template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut rest = self.path_template.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            out.push(&after[..end]);
            rest = &after[end + 1..];
        }
        out
    }
}

/// Build the IR for one trait declaration.
pub fn build(decl: &InterfaceDecl<'_>) -> Result<Endpoint> {
    let interface = decl.name();
    check_trait_shape(decl, &interface)?;

    let mut endpoint_tag = None;
    for tag in decl.doc.tags() {
        let location = Location::interface(&interface);
        let directive = interpret_at(tag, &location)?;
        if !directive.is_endpoint() {
            return Err(Error::MisplacedAnnotation {
                location,
                tag: tag.to_string(),
            });
        }
        if endpoint_tag.replace(directive).is_some() {
            return Err(Error::DuplicateEndpointAnnotation { interface });
        }
    }
    let Some(Directive::Endpoint {
        verb,
        path_template,
    }) = endpoint_tag
    else {
        return Err(Error::MissingEndpointAnnotation { interface });
    };

    let degenerate = decl.methods.len() == 1;
    let mut methods = Vec::new();
    let mut sync_result_type = None;
    let mut async_callback_type = None;
    let mut body_type = None;

    for method_decl in &decl.methods {
        let Some(method) = build_method(&interface, method_decl, degenerate)? else {
            continue;
        };
        let method_name = method.name.clone();

        match &method.role {
            MethodRole::Binding {
                kind: BindingKind::Body,
                ..
            } => {
                if body_type.is_some() {
                    return Err(Error::DuplicateBodyBinding {
                        interface,
                        method: method_name,
                    });
                }
                body_type = method.parameters.first().map(|p| p.ty.clone());
            }
            MethodRole::Binding { .. } => {}
            MethodRole::Sync { result_type } => {
                if sync_result_type.replace(result_type.clone()).is_some() {
                    return Err(Error::DuplicateTerminal {
                        interface,
                        method: method_name,
                        kind: "@SYNC",
                    });
                }
            }
            MethodRole::Async { callback_type } => {
                if async_callback_type.replace(callback_type.clone()).is_some() {
                    return Err(Error::DuplicateTerminal {
                        interface,
                        method: method_name,
                        kind: "@ASYNC",
                    });
                }
            }
        }
        methods.push(method);
    }

    match (&sync_result_type, &async_callback_type) {
        (None, None) => return Err(Error::MissingTerminal { interface }),
        (None, Some(_)) => return Err(Error::AsyncWithoutSync { interface }),
        _ => {}
    }

    let endpoint = Endpoint {
        name: interface,
        ident: decl.item.ident.clone(),
        vis: decl.item.vis.clone(),
        http_method: verb,
        path_template,
        methods,
        sync_result_type,
        async_callback_type,
        body_type,
    };
    report_latent_issues(&endpoint);

    tracing::debug!(
        interface = %endpoint.name,
        method = endpoint.http_method.as_str(),
        path = %endpoint.path_template,
        methods = endpoint.methods.len(),
        "built endpoint"
    );
    Ok(endpoint)
}

fn interpret_at(tag: &str, location: &Location) -> Result<Directive> {
    interpret(tag).map_err(|e| Error::MalformedAnnotation {
        location: location.clone(),
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

fn check_trait_shape(decl: &InterfaceDecl<'_>, interface: &str) -> Result<()> {
    let unsupported = |reason: &str| Error::Unsupported {
        location: Location::interface(interface),
        reason: reason.to_string(),
    };

    let item = decl.item;
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(unsupported("generic traits are not supported"));
    }
    for bound in &item.supertraits {
        let allowed = match bound {
            TypeParamBound::Trait(t) => ["Send", "Sync", "Sized"]
                .iter()
                .any(|name| t.path.is_ident(name)),
            _ => false,
        };
        if !allowed {
            return Err(unsupported(&format!(
                "supertrait `{}` is not supported",
                bound.to_token_stream()
            )));
        }
    }
    if item
        .items
        .iter()
        .any(|i| !matches!(i, syn::TraitItem::Fn(_)))
    {
        return Err(unsupported("only methods may be declared in the trait"));
    }
    Ok(())
}

fn build_method(
    interface: &str,
    decl: &MethodDecl<'_>,
    degenerate: bool,
) -> Result<Option<Method>> {
    let sig = &decl.item.sig;
    let name = sig.ident.to_string();
    let location = Location::method(interface, &name);

    let mut directives = Vec::new();
    for tag in decl.doc.tags() {
        let directive = interpret_at(tag, &location)?;
        if directive.is_endpoint() {
            return Err(Error::MisplacedAnnotation {
                location,
                tag: tag.to_string(),
            });
        }
        directives.push(directive);
    }

    let directive = match directives.len() {
        0 if decl.item.default.is_some() => {
            tracing::debug!(interface, method = %name, "keeping default method body");
            return Ok(None);
        }
        0 => match degenerate.then(|| ok_type(&sig.output)).flatten() {
            Some(result_type) => Directive::Sync { result_type },
            None => {
                return Err(Error::UnannotatedMethod {
                    interface: interface.to_string(),
                    method: name,
                });
            }
        },
        1 => directives.remove(0),
        _ => {
            return Err(Error::ConflictingAnnotations {
                interface: interface.to_string(),
                method: name,
            });
        }
    };

    let invalid = |reason: &str| Error::InvalidSignature {
        interface: interface.to_string(),
        method: name.clone(),
        reason: reason.to_string(),
    };

    if sig.asyncness.is_some() {
        return Err(invalid("async fn is not supported; use an @ASYNC terminal"));
    }
    let receiver = receiver_kind(sig).ok_or_else(|| invalid("method must take `self`"))?;
    let parameters = parameters(sig).map_err(|reason| invalid(&reason))?;

    let role = if let Some((kind, key)) = directive.binding() {
        if parameters.is_empty() {
            return Err(invalid("binding methods take at least one parameter"));
        }
        match (receiver, returns_self(&sig.output)) {
            (ReceiverKind::Owned, Some(false)) | (ReceiverKind::RefMut, Some(true)) => {}
            (ReceiverKind::Ref, _) => {
                return Err(invalid("binding methods take `self` or `&mut self`"));
            }
            _ => {
                return Err(invalid(
                    "binding methods return `Self` (or `&mut Self` with `&mut self`)",
                ));
            }
        }
        if kind == BindingKind::Body {
            if !sig.generics.params.is_empty() {
                return Err(invalid("@BODY methods cannot be generic"));
            }
            if matches!(parameters[0].ty, Type::Reference(_) | Type::ImplTrait(_)) {
                return Err(invalid("@BODY parameter must be an owned type"));
            }
        }
        MethodRole::Binding {
            kind,
            key: key.to_string(),
        }
    } else {
        match directive {
            Directive::Sync { result_type } => {
                if !parameters.is_empty() {
                    return Err(invalid("@SYNC terminal takes no parameters"));
                }
                let Some(declared) = ok_type(&sig.output) else {
                    return Err(invalid("@SYNC terminal must return a `Result`"));
                };
                if type_expr(&declared) != type_expr(&result_type) {
                    return Err(invalid(&format!(
                        "@SYNC names `{}` but the method returns `Result<{}, _>`",
                        type_expr(&result_type),
                        type_expr(&declared)
                    )));
                }
                MethodRole::Sync { result_type }
            }
            Directive::Async { callback_type } => {
                if receiver != ReceiverKind::Owned {
                    return Err(invalid("@ASYNC terminal takes `self` by value"));
                }
                if parameters.len() != 1 {
                    return Err(invalid("@ASYNC terminal takes exactly one callback parameter"));
                }
                if !returns_unit(&sig.output) {
                    return Err(invalid("@ASYNC terminal returns nothing"));
                }
                if !mentions(parameters[0].ty.to_token_stream(), &callback_type) {
                    return Err(invalid(&format!(
                        "@ASYNC names `{callback_type}` but the callback parameter is `{}`",
                        parameters[0].type_expression
                    )));
                }
                MethodRole::Async { callback_type }
            }
            other => {
                return Err(Error::MisplacedAnnotation {
                    location,
                    tag: format!("{other:?}"),
                });
            }
        }
    };

    tracing::debug!(
        interface,
        method = %name,
        params = %params_list(sig),
        "method annotated"
    );

    Ok(Some(Method {
        name,
        parameters,
        role,
        receiver,
        signature: sig.clone(),
    }))
}

fn receiver_kind(sig: &Signature) -> Option<ReceiverKind> {
    let receiver = sig.receiver()?;
    // `self: Box<Self>` and friends
    if receiver.colon_token.is_some() {
        return None;
    }
    Some(match &receiver.reference {
        None => ReceiverKind::Owned,
        Some(_) if receiver.mutability.is_some() => ReceiverKind::RefMut,
        Some(_) => ReceiverKind::Ref,
    })
}

fn parameters(sig: &Signature) -> std::result::Result<Vec<Parameter>, String> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pt) => Some(pt),
            FnArg::Receiver(_) => None,
        })
        .map(|pt| match &*pt.pat {
            Pat::Ident(p) => Ok(Parameter {
                name: p.ident.to_string(),
                type_expression: type_expr(&pt.ty),
                ty: (*pt.ty).clone(),
            }),
            other => Err(format!(
                "parameter `{}` must be a plain identifier",
                other.to_token_stream()
            )),
        })
        .collect()
}

/// `Some(false)` for `-> Self`, `Some(true)` for `-> &mut Self`.
fn returns_self(output: &ReturnType) -> Option<bool> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    match &**ty {
        Type::Path(tp) if tp.qself.is_none() && tp.path.is_ident("Self") => Some(false),
        Type::Reference(r) if r.mutability.is_some() => match &*r.elem {
            Type::Path(tp) if tp.path.is_ident("Self") => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(t) if t.elems.is_empty()),
    }
}

/// Whether `ident` occurs anywhere in `tokens`, e.g. `Cb` in `Box<dyn Cb + Send>`.
fn mentions(tokens: TokenStream, ident: &Ident) -> bool {
    tokens.into_iter().any(|tt| match tt {
        TokenTree::Ident(i) => i == *ident,
        TokenTree::Group(g) => mentions(g.stream(), ident),
        _ => false,
    })
}

/// `T` out of a declared `Result<T, E>` return type.
fn ok_type(output: &ReturnType) -> Option<Type> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    let Type::Path(tp) = &**ty else {
        return None;
    };
    let seg = tp.path.segments.last()?;
    if seg.ident != "Result" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    }
}

fn report_latent_issues(endpoint: &Endpoint) {
    let bound: BTreeSet<&str> = endpoint
        .methods
        .iter()
        .filter(|m| m.binding_kind() == Some(BindingKind::Path))
        .filter_map(Method::binding_key)
        .collect();
    for placeholder in endpoint.placeholders() {
        if !bound.contains(placeholder) {
            tracing::warn!(
                interface = %endpoint.name,
                placeholder,
                "path placeholder has no @PATH binding and will be sent literally"
            );
        }
    }

    let ignored: &[BindingKind] = if endpoint.http_method.carries_payload() {
        &[BindingKind::Query]
    } else {
        &[BindingKind::Form, BindingKind::Body, BindingKind::Multipart]
    };
    for kind in ignored {
        if endpoint.uses(*kind) {
            tracing::warn!(
                interface = %endpoint.name,
                binding = kind.tag(),
                method = endpoint.http_method.as_str(),
                "binding is accepted but not sent for this HTTP method"
            );
        }
    }
}
