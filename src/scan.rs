//! Finds annotated trait declarations in a parsed source file.

use once_cell::sync::Lazy;
use regex::Regex;
use syn::{Attribute, Expr, ExprLit, Item, ItemMod, ItemTrait, Lit, Meta, TraitItem, TraitItemFn};

static ENDPOINT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(?:GET|POST|PUT|DELETE)\b").expect("valid endpoint tag regex"));

/// The doc comment attached to a declaration, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    lines: Vec<String>,
}

impl DocComment {
    /// Collect `#[doc = "..."]` attributes, which is what `///` and `/** */`
    /// comments desugar to.
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut lines = Vec::new();
        for attr in attrs {
            if !attr.path().is_ident("doc") {
                continue;
            }
            if let Meta::NameValue(nv) = &attr.meta {
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) = &nv.value
                {
                    lines.extend(s.value().lines().map(str::to_string));
                }
            }
        }
        Self { lines }
    }

    /// Lines that hold an annotation tag, trimmed. A leading `*` from block
    /// comments is dropped.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').map(str::trim_start).unwrap_or(line);
            line.starts_with('@').then_some(line)
        })
    }

    pub fn has_endpoint_tag(&self) -> bool {
        self.tags().any(|tag| ENDPOINT_TAG.is_match(tag))
    }
}

/// A method declared inside an annotated trait
#[derive(Debug, Clone)]
pub struct MethodDecl<'a> {
    pub item: &'a TraitItemFn,
    pub doc: DocComment,
}

/// A trait declaration carrying an endpoint tag
#[derive(Debug, Clone)]
pub struct InterfaceDecl<'a> {
    pub item: &'a ItemTrait,
    pub doc: DocComment,
    pub methods: Vec<MethodDecl<'a>>,
}

impl<'a> InterfaceDecl<'a> {
    /// Pair a trait with its doc comment and its methods' doc comments.
    pub fn new(item: &'a ItemTrait) -> Self {
        let methods = item
            .items
            .iter()
            .filter_map(|trait_item| match trait_item {
                TraitItem::Fn(method) => Some(MethodDecl {
                    item: method,
                    doc: DocComment::from_attrs(&method.attrs),
                }),
                _ => None,
            })
            .collect();

        Self {
            item,
            doc: DocComment::from_attrs(&item.attrs),
            methods,
        }
    }

    pub fn name(&self) -> String {
        self.item.ident.to_string()
    }
}

/// Lazily yield the top-level traits of `file` that carry an endpoint tag.
pub fn scan(file: &syn::File) -> impl Iterator<Item = InterfaceDecl<'_>> {
    scan_items(&file.items)
}

fn scan_items(items: &[Item]) -> impl Iterator<Item = InterfaceDecl<'_>> {
    items.iter().filter_map(|item| match item {
        Item::Trait(item) => {
            let decl = InterfaceDecl::new(item);
            if decl.doc.has_endpoint_tag() {
                Some(decl)
            } else {
                tracing::trace!(interface = %decl.name(), "skipping trait without endpoint tag");
                None
            }
        }
        Item::Mod(module) => {
            warn_nested(module);
            None
        }
        _ => None,
    })
}

// The generated file is included at the top level, where traits of inline
// modules are not in scope.
fn warn_nested(module: &ItemMod) -> usize {
    let Some((_, items)) = &module.content else {
        return 0;
    };
    let mut skipped = 0;
    for item in items {
        match item {
            Item::Trait(item) if InterfaceDecl::new(item).doc.has_endpoint_tag() => {
                tracing::warn!(
                    module = %module.ident,
                    interface = %item.ident,
                    "endpoint trait inside an inline module is not generated; \
                     move it to the top level or use #[rest_builder]"
                );
                skipped += 1;
            }
            Item::Mod(inner) => skipped += warn_nested(inner),
            _ => {}
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        /// Fetches one photo.
        ///
        /// @GET("/photos/{id}")
        pub trait GetPhoto {
            /// @PATH("id")
            fn photo_id(self, id: String) -> Self;

            fn untagged(&self);
        }

        /// Not an endpoint, mentions GET only in prose.
        pub trait Plain {
            fn noop(&self);
        }

        pub struct NotATrait;

        /**
         * @POST("/photos")
         */
        pub trait CreatePhoto {}
    "#;

    #[test]
    fn finds_only_annotated_traits() {
        let file = syn::parse_file(SOURCE).unwrap();
        let names: Vec<_> = scan(&file).map(|decl| decl.name()).collect();
        assert_eq!(names, vec!["GetPhoto", "CreatePhoto"]);
    }

    #[test]
    fn collects_method_docs_in_declaration_order() {
        let file = syn::parse_file(SOURCE).unwrap();
        let decl = scan(&file).next().unwrap();
        assert_eq!(decl.methods.len(), 2);
        assert_eq!(decl.methods[0].item.sig.ident, "photo_id");
        assert_eq!(decl.methods[0].doc.tags().collect::<Vec<_>>(), vec![r#"@PATH("id")"#]);
        assert_eq!(decl.methods[1].doc.tags().count(), 0);
    }

    #[test]
    fn prose_lines_are_not_tags() {
        let file = syn::parse_file(SOURCE).unwrap();
        let decl = scan(&file).next().unwrap();
        assert_eq!(
            decl.doc.tags().collect::<Vec<_>>(),
            vec![r#"@GET("/photos/{id}")"#]
        );
    }

    #[test]
    fn endpoint_tag_must_be_a_whole_name() {
        let file = syn::parse_file(
            r#"
            /// @GETTER("/x")
            trait Nope {}
            "#,
        )
        .unwrap();
        assert_eq!(scan(&file).count(), 0);
    }

    #[test]
    fn traits_in_inline_modules_are_reported_not_scanned() {
        let file = syn::parse_file(
            r#"
            mod api {
                /// @GET("/photos")
                pub trait ListPhotos {}

                pub trait Plain {}

                mod admin {
                    /// @DELETE("/photos/{id}")
                    pub trait DeletePhoto {}
                }
            }

            mod external;
            "#,
        )
        .unwrap();
        assert_eq!(scan(&file).count(), 0);

        let Item::Mod(api) = &file.items[0] else {
            panic!("expected a module");
        };
        assert_eq!(warn_nested(api), 2);
        let Item::Mod(external) = &file.items[1] else {
            panic!("expected a module");
        };
        assert_eq!(warn_nested(external), 0);
    }
}
