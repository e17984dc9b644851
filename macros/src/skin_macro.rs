//! skin! macro: parse `Name: "utilities"` entries and build a StyleMap.

use std::collections::HashSet;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Ident, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// One `Name: "utilities"` entry.
#[derive(Clone)]
pub(crate) struct SkinEntry {
    /// The semantic name, from an identifier or a string literal.
    pub name: String,
    pub name_span: Span,
    pub utilities: LitStr,
}

/// The input to the skin! macro: comma-separated entries.
struct SkinInput {
    entries: Vec<SkinEntry>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for SkinEntry {
    fn parse(input: ParseStream) -> Result<Self> {
        let (name, name_span) = if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            (lit.value(), lit.span())
        } else {
            let ident: Ident = input.parse()?;
            (ident.to_string(), ident.span())
        };
        if name.is_empty() {
            return Err(Error::new(name_span, "style name must not be empty"));
        }

        input.parse::<Token![:]>()?;
        let utilities: LitStr = input.parse()?;
        Ok(SkinEntry {
            name,
            name_span,
            utilities,
        })
    }
}

impl Parse for SkinInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let entries = Punctuated::<SkinEntry, Token![,]>::parse_terminated(input)?;
        Ok(SkinInput {
            entries: entries.into_iter().collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

pub(crate) fn skin_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: SkinInput = syn::parse2(input)?;

    let mut seen = HashSet::new();
    for entry in &parsed.entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(Error::new(
                entry.name_span,
                format!("duplicate style name `{}`", entry.name),
            ));
        }
    }

    let inserts = parsed.entries.iter().map(|entry| {
        let name = LitStr::new(&entry.name, entry.name_span);
        let utilities = &entry.utilities;
        quote! { __styles.insert(#name, #utilities); }
    });

    Ok(quote! {
        {
            let mut __styles = ::tailskin::StyleMap::new();
            #(#inserts)*
            __styles
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
