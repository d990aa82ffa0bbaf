//! # restgen
//!
//! Generates fluent HTTP request builders from annotated trait declarations.
//!
//! A trait tagged with an endpoint annotation in its doc comment describes one
//! HTTP operation. Each method is tagged with how its argument reaches the
//! request, and one or two terminal methods send it:
//!
//! ```ignore
//! /// @GET("/photos/{id}")
//! pub trait GetPhotoDetailsRequestBuilder {
//!     /// @PATH("id")
//!     fn photo_id(self, id: String) -> Self;
//!
//!     /// @QUERY("image_size")
//!     fn image_size(self, size: u32) -> Self;
//!
//!     /// @SYNC("GetPhotoDetailsResponse")
//!     fn run(self) -> restclient::Result<GetPhotoDetailsResponse>;
//!
//!     /// @ASYNC("GetPhotoDetailsCallback")
//!     fn run_async(self, callback: Box<dyn GetPhotoDetailsCallback>);
//! }
//! ```
//!
//! For every such trait the generator emits a `<Trait>Impl` builder, its
//! constructors, the callback trait and the trait impl. Generation runs either
//! ahead of time through the `restgen` binary, which writes a sibling
//! `<stem>_restgen.rs` file, or inline through the `#[rest_builder]` attribute
//! of `restgen-macros`.
//!
//! ## Tags
//! - `@GET`, `@POST`, `@PUT`, `@DELETE` `("path")` - on the trait
//! - `@PATH`, `@QUERY`, `@HEADER`, `@FORM`, `@MULTIPART` `("key")` - setters
//! - `@BODY` - setter whose argument is sent as the JSON body
//! - `@SYNC("ResultType")` - blocking terminal
//! - `@ASYNC("CallbackTrait")` - terminal running on a spawned thread
//!
//! Generated code calls into [`restclient`], which holds the registered HTTP
//! client.
//!
//! ## Using generated files
//!
//! A generated `<stem>_restgen.rs` holds items only, with no `use` lines and no
//! module of its own. Include it from the module that declares the traits:
//!
//! ```ignore
//! // src/photos.rs
//! use restgen::restclient;
//!
//! /// @GET("/photos/{id}")
//! pub trait GetPhoto { /* ... */ }
//!
//! include!("photos_restgen.rs");
//! ```
//!
//! Names are resolved in that module. The trait, the `@SYNC` result types and
//! anything the method signatures mention must be in scope there. Runtime items
//! are referenced through the absolute `--runtime` path. With `--out-dir`, give
//! `include!` the generated file's path relative to the declaring file.

pub mod codegen;
pub mod error;
pub mod ir;
pub mod output;
pub mod parse;
pub mod render;
pub mod restclient;
pub mod scan;

use proc_macro2::TokenStream;
use syn::ItemTrait;

pub use codegen::{BANNER, GeneratorOptions, generate, generate_tokens};
pub use error::{Error, Location, Result};
pub use ir::Endpoint;

/// Generate builders for every annotated trait of a source file.
///
/// Returns `None` when the file declares no annotated trait. One bad trait
/// fails the whole file.
pub fn generate_source(source: &str, options: &GeneratorOptions) -> Result<Option<String>> {
    let file = syn::parse_file(source)?;

    let mut tokens = TokenStream::new();
    let mut count = 0usize;
    for decl in scan::scan(&file) {
        let endpoint = ir::build(&decl)?;
        tokens.extend(generate_tokens(&endpoint, options));
        count += 1;
    }

    if count == 0 {
        return Ok(None);
    }
    tracing::debug!(endpoints = count, "generated endpoints");
    codegen::format_file(tokens).map(Some)
}

/// Generate the items for a single trait, as the attribute macro does.
///
/// Unlike [`generate_source`], a trait without an endpoint tag is an error.
pub fn expand_trait(item: &ItemTrait, options: &GeneratorOptions) -> Result<TokenStream> {
    let decl = scan::InterfaceDecl::new(item);
    let endpoint = ir::build(&decl)?;
    Ok(generate_tokens(&endpoint, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_without_annotations_generate_nothing() {
        let source = "pub trait Plain { fn noop(&self); }";
        assert!(
            generate_source(source, &GeneratorOptions::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn one_file_can_declare_several_endpoints() {
        let source = r#"
            /// @GET("/photos")
            pub trait ListPhotos {
                /// @SYNC("String")
                fn run(self) -> restclient::Result<String>;
            }

            /// @DELETE("/photos/{id}")
            pub trait DeletePhoto {
                /// @PATH("id")
                fn id(self, id: u64) -> Self;
                /// @SYNC("String")
                fn run(self) -> restclient::Result<String>;
            }
        "#;
        let code = generate_source(source, &GeneratorOptions::default())
            .unwrap()
            .unwrap();
        assert!(code.starts_with(BANNER));
        assert!(code.contains("pub struct ListPhotosImpl"));
        assert!(code.contains("pub struct DeletePhotoImpl"));
        assert_eq!(code.matches(BANNER).count(), 1);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = generate_source("pub trait {", &GeneratorOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn expand_trait_requires_endpoint_tag() {
        let item: ItemTrait = syn::parse_quote! {
            trait Untagged {
                fn run(self) -> Result<String, Error>;
            }
        };
        let err = expand_trait(&item, &GeneratorOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingEndpointAnnotation { .. }));
    }
}
