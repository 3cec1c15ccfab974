//! SQL generation primitives.
//!
//! Statements are assembled from [`token::Token`] streams so that literal
//! escaping is handled once, at serialization time. This crate emits a
//! single generic ANSI-ish SQL surface; there is no dialect layer.

pub mod token;

pub use token::{Token, TokenStream};
