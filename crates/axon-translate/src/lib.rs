//! Claude→Antigravity request translation
//!
//! Accepts requests in the Claude Messages wire format and re-emits
//! semantically equivalent requests in the Antigravity `generateContent`
//! wire format, so clients written against one API can transparently reach
//! a backend implementing the other. Tool parameter schemas are narrowed to
//! the target dialect via `axon-schema`; thinking-block continuity is
//! resolved against `axon-signature`.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod model;
pub mod protocol;
pub mod safety;
pub mod translate;

pub use error::TranslateError;
pub use translate::Translator;
