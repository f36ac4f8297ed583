//! tabledef core - table definition model shared by the parser and its callers
//!
//! This crate provides:
//!
//! - `ParsedTable` and friends - the document produced from a `CREATE TABLE`
//! - `quote_identifier` / `unquote_identifier` - the identifier codec
//! - `TableDefError` - the error taxonomy
//! - `ValidationError` - consistency findings for a parsed table

mod error;
mod identifier;
mod schema;
mod validation;

pub use error::*;
pub use identifier::*;
pub use schema::*;
pub use validation::*;
