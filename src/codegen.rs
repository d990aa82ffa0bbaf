//! Code generation utilities
//!
//! Renders an [`Endpoint`] into Rust items:
//!
//! - the async callback trait (when the endpoint has an `@ASYNC` terminal)
//! - the `<Trait>Impl` builder struct, holding only the accumulators in use
//! - `new()`, `Default`, and a free `new_<trait>()` constructor
//! - private `apply_path_substitutions`, `build` and `execute` routines
//! - the trait impl: setters, the sync terminal and the async terminal
//!
//! Output is a pure function of the IR and the options.

use convert_case::{Case, Casing};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{FnArg, Signature};

use crate::error::Result;
use crate::ir::{Endpoint, Method, MethodRole, ReceiverKind};
use crate::parse::BindingKind;

/// Banner placed at the top of every generated file.
pub const BANNER: &str = "// CODE GENERATED AUTOMATICALLY WITH RESTGEN\n\
                          // THIS FILE SHOULD NOT BE EDITED BY HAND\n\n";

/// Generation settings
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Path of the runtime module referenced by generated code
    pub runtime: syn::Path,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::restgen::restclient),
        }
    }
}

impl GeneratorOptions {
    /// Options referencing the runtime module at `path`, e.g. `crate::rest`.
    pub fn with_runtime(path: &str) -> Result<Self> {
        Ok(Self {
            runtime: syn::parse_str(path)?,
        })
    }
}

/// Render one endpoint as formatted source, banner included.
pub fn generate(endpoint: &Endpoint, options: &GeneratorOptions) -> Result<String> {
    format_file(generate_tokens(endpoint, options))
}

/// Parse generated tokens back into a file and pretty-print it.
pub(crate) fn format_file(tokens: TokenStream) -> Result<String> {
    let file: syn::File = syn::parse2(tokens)?;
    Ok(format!("{}{}", BANNER, prettyplease::unparse(&file)))
}

/// Render one endpoint as unformatted tokens.
pub fn generate_tokens(endpoint: &Endpoint, options: &GeneratorOptions) -> TokenStream {
    let rt = &options.runtime;
    let vis = &endpoint.vis;
    let trait_ident = &endpoint.ident;
    let impl_ident = impl_ident(endpoint);
    let ctor_ident = format_ident!("new_{}", endpoint.name.to_case(Case::Snake));

    let callback = callback_trait(endpoint);

    let kinds = endpoint.binding_kinds();
    let fields = kinds.iter().map(|kind| {
        let field = field_ident(*kind);
        let ty = field_type(*kind, endpoint, rt);
        quote! { #field: #ty }
    });
    let inits = kinds.iter().map(|kind| {
        let field = field_ident(*kind);
        let init = field_init(*kind, rt);
        quote! { #field: #init }
    });

    let path_routine = endpoint.uses(BindingKind::Path).then(|| {
        quote! {
            fn apply_path_substitutions(&self, template: &str) -> ::std::string::String {
                #rt::expand_path(template, &self.path_substitutions)
            }
        }
    });
    let build = build_routine(endpoint, rt);
    let execute = execute_routine(endpoint, rt);
    let methods = endpoint.methods.iter().map(trait_method);

    let struct_doc = format!(
        " Request builder implementing [`{}`] for `{} {}`.",
        endpoint.name,
        endpoint.http_method.as_str(),
        endpoint.path_template
    );
    let ctor_doc = format!(" Creates an empty [`{impl_ident}`].");

    quote! {
        #callback

        #[doc = #struct_doc]
        #[allow(dead_code)]
        #vis struct #impl_ident {
            #(#fields,)*
        }

        impl #impl_ident {
            #[doc = #ctor_doc]
            #vis fn new() -> Self {
                Self {
                    #(#inits,)*
                }
            }

            #path_routine

            #build

            #execute
        }

        impl ::std::default::Default for #impl_ident {
            fn default() -> Self {
                Self::new()
            }
        }

        #[doc = #ctor_doc]
        #[allow(dead_code)]
        #vis fn #ctor_ident() -> #impl_ident {
            #impl_ident::new()
        }

        #[allow(unused_variables)]
        impl #trait_ident for #impl_ident {
            #(#methods)*
        }
    }
}

/// `<Trait>Impl`
pub fn impl_ident(endpoint: &Endpoint) -> Ident {
    format_ident!("{}Impl", endpoint.ident)
}

fn callback_trait(endpoint: &Endpoint) -> Option<TokenStream> {
    let callback = endpoint.async_callback_type.as_ref()?;
    let result = endpoint.sync_result_type.as_ref()?;
    let vis = &endpoint.vis;
    let doc = format!(" Receives the outcome of [`{}`] run asynchronously.", endpoint.name);

    Some(quote! {
        #[doc = #doc]
        #vis trait #callback: ::std::marker::Send {
            /// Called on the caller's thread before the request starts.
            fn on_start(&self);

            /// Called once if the request could not be built, sent, or decoded.
            fn on_error(&self, reason: ::std::string::String);

            /// Called once with the decoded response.
            fn on_success(&self, response: #result);
        }
    })
}

// Binding kind lookup: accumulator field, its type and initial value, and the
// statement a setter uses to store into it.

fn field_ident(kind: BindingKind) -> Ident {
    let name = match kind {
        BindingKind::Path => "path_substitutions",
        BindingKind::Query => "query_params",
        BindingKind::Header => "header_params",
        BindingKind::Form => "post_form_params",
        BindingKind::Body => "post_body",
        BindingKind::Multipart => "post_multipart_params",
    };
    format_ident!("{}", name)
}

fn field_type(kind: BindingKind, endpoint: &Endpoint, rt: &syn::Path) -> TokenStream {
    match kind {
        BindingKind::Path | BindingKind::Header => quote! {
            ::std::collections::BTreeMap<::std::string::String, ::std::string::String>
        },
        BindingKind::Query | BindingKind::Form => quote! { #rt::Values },
        BindingKind::Body => {
            let body = &endpoint.body_type;
            quote! { ::std::option::Option<#body> }
        }
        BindingKind::Multipart => quote! {
            ::std::collections::BTreeMap<::std::string::String, ::std::vec::Vec<u8>>
        },
    }
}

fn field_init(kind: BindingKind, rt: &syn::Path) -> TokenStream {
    match kind {
        BindingKind::Path | BindingKind::Header | BindingKind::Multipart => {
            quote! { ::std::collections::BTreeMap::new() }
        }
        BindingKind::Query | BindingKind::Form => quote! { #rt::Values::new() },
        BindingKind::Body => quote! { ::std::option::Option::None },
    }
}

fn store_value(kind: BindingKind, key: &str, value: &Ident) -> TokenStream {
    let field = field_ident(kind);
    match kind {
        BindingKind::Path | BindingKind::Header => quote! {
            self.#field.insert(
                ::std::string::String::from(#key),
                ::std::string::ToString::to_string(&#value),
            );
        },
        BindingKind::Query | BindingKind::Form => quote! {
            self.#field.add(#key, ::std::string::ToString::to_string(&#value));
        },
        BindingKind::Body => quote! {
            self.#field = ::std::option::Option::Some(#value);
        },
        BindingKind::Multipart => quote! {
            self.#field.insert(
                ::std::string::String::from(#key),
                ::std::convert::AsRef::<[u8]>::as_ref(&#value).to_vec(),
            );
        },
    }
}

fn build_routine(endpoint: &Endpoint, rt: &syn::Path) -> TokenStream {
    let template = &endpoint.path_template;
    let method = endpoint.http_method.to_tokens(rt);
    let request_ty = quote! { #rt::reqwest::blocking::Request };

    let path = if endpoint.uses(BindingKind::Path) {
        quote! { self.apply_path_substitutions(#template) }
    } else {
        quote! { ::std::string::String::from(#template) }
    };

    let assemble = if endpoint.http_method.carries_payload() {
        payload_branches(endpoint, rt, &method)
    } else {
        let query = endpoint.uses(BindingKind::Query).then(|| {
            quote! {
                if !self.query_params.is_empty() {
                    request.url_mut().set_query(::std::option::Option::Some(&self.query_params.encode()));
                }
            }
        });
        quote! {
            let mut request = #request_ty::new(#method, url);
            #query
        }
    };

    let headers = endpoint.uses(BindingKind::Header).then(|| {
        quote! {
            for (key, value) in &self.header_params {
                #rt::set_header(&mut request, key, value)?;
            }
        }
    });

    quote! {
        fn build(&self) -> #rt::Result<#request_ty> {
            let client = #rt::client()?;
            let url = #rt::reqwest::Url::parse(&::std::format!("{}{}", client.base_url(), #path))?;
            #assemble
            request.headers_mut().insert(
                #rt::reqwest::header::ACCEPT,
                #rt::reqwest::header::HeaderValue::from_static("application/json"),
            );
            #headers
            ::std::result::Result::Ok(request)
        }
    }
}

/// POST/PUT: body, then form, then multipart, whichever is populated first.
fn payload_branches(endpoint: &Endpoint, rt: &syn::Path, method: &TokenStream) -> TokenStream {
    let request_ty = quote! { #rt::reqwest::blocking::Request };
    let content_type = |value: &str| {
        quote! {
            request.headers_mut().insert(
                #rt::reqwest::header::CONTENT_TYPE,
                #rt::reqwest::header::HeaderValue::from_static(#value),
            );
        }
    };

    let mut branches = Vec::new();
    if endpoint.uses(BindingKind::Body) {
        let json = content_type("application/json");
        branches.push(quote! {
            if let ::std::option::Option::Some(body) = &self.post_body {
                let content = #rt::encode_json(body)?;
                let mut request = #request_ty::new(#method, url);
                *request.body_mut() = ::std::option::Option::Some(content.into());
                #json
                request
            }
        });
    }
    if endpoint.uses(BindingKind::Form) {
        let form = content_type("application/x-www-form-urlencoded");
        branches.push(quote! {
            if !self.post_form_params.is_empty() {
                let mut request = #request_ty::new(#method, url);
                *request.body_mut() = ::std::option::Option::Some(self.post_form_params.encode().into());
                #form
                request
            }
        });
    }
    if endpoint.uses(BindingKind::Multipart) {
        branches.push(quote! {
            if !self.post_multipart_params.is_empty() {
                client.multipart_request(#method, url, &self.post_multipart_params)?
            }
        });
    }

    let fallback = quote! { #request_ty::new(#method, url) };
    if branches.is_empty() {
        return quote! { let mut request = #fallback; };
    }
    quote! {
        let mut request = #(#branches)else* else {
            #fallback
        };
    }
}

fn execute_routine(endpoint: &Endpoint, rt: &syn::Path) -> Option<TokenStream> {
    let result = endpoint.sync_result_type.as_ref()?;
    Some(quote! {
        fn execute(&self) -> #rt::Result<#result> {
            let mut request = self.build()?;
            #rt::reencode_query(&mut request);

            let client = #rt::client()?;
            if client.debug() {
                #rt::debug_request(&request);
            }

            let mut response = client.http_client().execute(request)?;
            if client.debug() {
                #rt::debug_response(&response);
            }

            <#result as #rt::FromResponse>::from_response(&mut response)
        }
    })
}

fn trait_method(method: &Method) -> TokenStream {
    match &method.role {
        MethodRole::Binding { kind, key } => {
            let sig = setter_signature(method);
            let value = format_ident!("{}", method.parameters[0].name);
            let store = store_value(*kind, key, &value);
            quote! {
                #sig {
                    #store
                    self
                }
            }
        }
        MethodRole::Sync { .. } => {
            let sig = &method.signature;
            quote! {
                #sig {
                    self.execute().map_err(::std::convert::From::from)
                }
            }
        }
        MethodRole::Async { .. } => {
            let sig = &method.signature;
            let callback = format_ident!("{}", method.parameters[0].name);
            quote! {
                #sig {
                    #callback.on_start();
                    ::std::thread::spawn(move || match self.execute() {
                        ::std::result::Result::Ok(response) => #callback.on_success(response),
                        ::std::result::Result::Err(err) => {
                            #callback.on_error(::std::string::ToString::to_string(&err))
                        }
                    });
                }
            }
        }
    }
}

// Setters mutate the builder, so an owned `self` becomes `mut self`.
fn setter_signature(method: &Method) -> Signature {
    let mut sig = method.signature.clone();
    if method.receiver == ReceiverKind::Owned {
        for input in &mut sig.inputs {
            if let FnArg::Receiver(receiver) = input {
                receiver.mutability = Some(Default::default());
            }
        }
    }
    sig
}
