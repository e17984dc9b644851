//! Proc macros for tailskin: `skin!` style map literals.
//!
//! This crate is not meant to be used directly. Enable the `macros` feature on `tailskin`.

use proc_macro::TokenStream;

mod skin_macro;

/// Style map literal macro.
///
/// Builds a `tailskin::StyleMap` from `Name: "utilities"` entries, in the
/// order written. Names are identifiers or string literals; a name written
/// twice is a compile error.
///
/// # Example
///
/// ```ignore
/// let styles = skin! {
///     Button: "bg-blue-500 text-white rounded-lg",
///     Card: "p-4 shadow-md",
///     "card-title": "text-sm font-bold",
/// };
/// ```
#[proc_macro]
pub fn skin(input: TokenStream) -> TokenStream {
    skin_macro::skin_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
