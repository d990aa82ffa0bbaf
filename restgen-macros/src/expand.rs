//! Expansion of `#[rest_builder]`

use darling::FromMeta;
use darling::ast::NestedMeta;
use proc_macro2::TokenStream;
use quote::quote;
use restgen::GeneratorOptions;
use syn::{ItemTrait, parse2};

#[derive(Debug, Default, FromMeta)]
pub struct BuilderArgs {
    #[darling(default)]
    pub runtime: Option<syn::Path>,
}

impl BuilderArgs {
    fn options(self) -> GeneratorOptions {
        match self.runtime {
            Some(runtime) => GeneratorOptions { runtime },
            None => GeneratorOptions::default(),
        }
    }
}

pub fn rest_builder_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let meta_list = match NestedMeta::parse_meta_list(args) {
        Ok(m) => m,
        Err(e) => return e.to_compile_error(),
    };

    let builder_args = match BuilderArgs::from_list(&meta_list) {
        Ok(a) => a,
        Err(e) => return e.write_errors(),
    };

    let item: ItemTrait = match parse2(input) {
        Ok(i) => i,
        Err(e) => return e.to_compile_error(),
    };

    match restgen::expand_trait(&item, &builder_args.options()) {
        Ok(generated) => quote! {
            #item
            #generated
        },
        Err(e) => {
            // keep the trait so its uses don't pile up unrelated errors
            let error = syn::Error::new_spanned(&item.ident, e.to_string()).to_compile_error();
            quote! {
                #item
                #error
            }
        }
    }
}
