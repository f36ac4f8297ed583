//! tabledef parser - MariaDB `SHOW CREATE TABLE` parsing
//!
//! This crate provides:
//!
//! - [`TableParser`] - turns a `CREATE TABLE` statement into a [`ParsedTable`]
//! - [`grammar`] - the per-construct grammars the parser is built from
//! - [`ScriptBuilder`] - renders a parsed table back to a CREATE TABLE script
//! - [`link_references`] / [`col_key_categories`] - relations between parsed tables
//!
//! The model types of `tabledef-core` are re-exported so callers need only
//! this crate.
//!
//! # Example
//!
//! ```
//! use tabledef_parser::{ScriptOptions, build_create_script, parse_create_table};
//!
//! let output = parse_create_table(
//!     "CREATE TABLE `t` (`id` int(11) NOT NULL, PRIMARY KEY (`id`)) ENGINE=InnoDB",
//!     "app",
//! )
//! .unwrap();
//!
//! let script = build_create_script(
//!     &output.table,
//!     &ScriptOptions { skip_schema_creation: true, ..Default::default() },
//! );
//! assert!(script.starts_with("CREATE TABLE `app`.`t` ("));
//! ```

pub mod grammar;
mod parser;
mod relations;
mod script;

pub use parser::{ParseOptions, ParseOutput, ParseWarning, TableParser, parse_create_table};
pub use relations::{col_key_categories, link_references};
pub use script::{ScriptBuilder, ScriptOptions, build_create_script};

pub use tabledef_core::{
    ColumnDef, ForeignKeyRef, GeneratedType, IndexOrder, KeyCategory, KeyColumnRef, KeyDef,
    ParsedTable, ReferentialAction, Result, TableDefError, TableDefs, TableOptions,
    ValidationError,
};
