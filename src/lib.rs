// library crate for jbdap
// the engine modules plus the cli used by the jbdap binary

pub mod cli;
pub mod command;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod query;

pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
pub use i18n::Language;
