//! # restgen-macros
//!
//! `#[rest_builder]` generates the request builder for an annotated trait in
//! place, as the `restgen` binary would in a separate file.

mod expand;

use proc_macro::TokenStream;

/// Generates the builder, constructors and callback trait for an annotated
/// trait, keeping the trait itself unchanged.
///
/// # Attributes
/// - `runtime` - path of the runtime module (default `::restgen::restclient`)
///
/// # Example
/// ```ignore
/// #[rest_builder]
/// /// @GET("/photos/{id}")
/// pub trait GetPhotoDetailsRequestBuilder {
///     /// @PATH("id")
///     fn photo_id(self, id: String) -> Self;
///
///     /// @SYNC("Photo")
///     fn run(self) -> restclient::Result<Photo>;
/// }
///
/// let photo = GetPhotoDetailsRequestBuilderImpl::new()
///     .photo_id("42".into())
///     .run()?;
/// ```
#[proc_macro_attribute]
pub fn rest_builder(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::rest_builder_impl(args.into(), input.into()).into()
}
