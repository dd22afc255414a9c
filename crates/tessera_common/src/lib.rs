//! Shared foundational types used across the Tessera physical backend.
//!
//! This crate provides interned identifiers for design object names and the
//! common internal result type used when an invariant of the backend itself
//! is broken.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, TesseraResult};
