//! Request translation from the Claude dialect to the Antigravity dialect

mod parts;
mod request;

pub use request::Translator;
