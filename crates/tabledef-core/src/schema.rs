//! Parsed table definition model
//!
//! The document produced by parsing one `CREATE TABLE` statement. Maps are
//! [`IndexMap`]s so that iteration follows declaration order, which matters
//! both for column order and for the column order inside an index.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quote_identifier;

/// Root of a parsed `CREATE TABLE` statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Generated opaque id, present only when id generation was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub options: TableOptions,
    pub defs: TableDefs,
}

impl ParsedTable {
    /// `` `schema`.`name` ``
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.options.schema),
            quote_identifier(&self.options.name)
        )
    }

    /// Find a column by its unquoted name, returning its map key as well
    pub fn column_by_name(&self, name: &str) -> Option<(&str, &ColumnDef)> {
        self.defs
            .col_map
            .iter()
            .find(|(_, col)| col.name == name)
            .map(|(key, col)| (key.as_str(), col))
    }

    /// Keys of one category in declaration order
    pub fn keys(&self, category: KeyCategory) -> impl Iterator<Item = (&String, &KeyDef)> {
        self.defs
            .key_category_map
            .get(&category)
            .into_iter()
            .flat_map(|keys| keys.iter())
    }

    pub fn primary_key(&self) -> Option<&KeyDef> {
        self.keys(KeyCategory::PrimaryKey).map(|(_, key)| key).next()
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&String, &KeyDef)> {
        self.keys(KeyCategory::ForeignKey)
    }
}

/// Column and key definitions of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDefs {
    /// Columns keyed by generated id, or by name when ids are disabled
    pub col_map: IndexMap<String, ColumnDef>,
    /// Keys grouped by category, then keyed by generated id or natural key
    pub key_category_map: IndexMap<KeyCategory, IndexMap<String, KeyDef>>,
}

impl TableDefs {
    pub fn is_empty(&self) -> bool {
        self.col_map.is_empty() && self.key_category_map.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.key_category_map.values().map(IndexMap::len).sum()
    }
}

/// Table-level options
///
/// Well-known options have their own field. Everything else found in the
/// option tail lands in `extra` under its lower-cased key, and the whole
/// struct serializes as one flat mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Caller-supplied schema name
    pub schema: String,
    /// Unquoted table name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<u64>,
    /// Partitioning clause following the option line, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_by: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

impl TableOptions {
    /// Look up an option by its lower-cased key, well-known or not
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "schema" => Some(self.schema.clone()),
            "name" => Some(self.name.clone()),
            "engine" => self.engine.clone(),
            "charset" => self.charset.clone(),
            "collate" => self.collate.clone(),
            "comment" => self.comment.clone(),
            "row_format" => self.row_format.clone(),
            "auto_increment" => self.auto_increment.map(|n| n.to_string()),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// Kind of a generated column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeneratedType {
    Virtual,
    Stored,
}

impl GeneratedType {
    /// Parse the keyword following `AS (...)`; `PERSISTENT` is MariaDB's alias for `STORED`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "VIRTUAL" => Some(GeneratedType::Virtual),
            "STORED" | "PERSISTENT" => Some(GeneratedType::Stored),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratedType::Virtual => "VIRTUAL",
            GeneratedType::Stored => "STORED",
        }
    }
}

impl fmt::Display for GeneratedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unquoted column name
    pub name: String,
    /// Upper-cased type name with its size suffix, e.g. `VARCHAR(255)`
    pub data_type: String,
    /// UNSIGNED
    pub un: bool,
    /// ZEROFILL
    pub zf: bool,
    /// NOT NULL
    pub nn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedType>,
    /// AUTO_INCREMENT
    pub ai: bool,
    /// Explicit default, or the generation expression of a generated column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_exp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default)]
    pub invisible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Base types that accept `CHARACTER SET` / `COLLATE`
const CHARSET_TYPES: &[&str] = &[
    "CHAR",
    "VARCHAR",
    "TINYTEXT",
    "TEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "ENUM",
    "SET",
];

impl ColumnDef {
    /// Create a column with a name and type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    /// Builder: set as not null
    pub fn not_null(mut self) -> Self {
        self.nn = true;
        self
    }

    /// Builder: set as auto increment
    pub fn auto_increment(mut self) -> Self {
        self.ai = true;
        self
    }

    /// Builder: set default value expression
    pub fn default_exp(mut self, exp: impl Into<String>) -> Self {
        self.default_exp = Some(exp.into());
        self.generated = None;
        self
    }

    /// Builder: make this a generated column
    pub fn generated_as(mut self, exp: impl Into<String>, kind: GeneratedType) -> Self {
        self.default_exp = Some(exp.into());
        self.generated = Some(kind);
        self
    }

    /// Builder: set comment
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    /// Type name without its size suffix, e.g. `VARCHAR` for `VARCHAR(255)`
    pub fn base_type(&self) -> &str {
        self.data_type
            .split_once('(')
            .map_or(self.data_type.as_str(), |(base, _)| base)
            .trim()
    }

    pub fn supports_charset(&self) -> bool {
        CHARSET_TYPES.contains(&self.base_type())
    }

    /// Charset in effect for this column: its own, else the table's,
    /// and none at all for types without a charset.
    pub fn effective_charset<'a>(&'a self, table: &'a TableOptions) -> Option<&'a str> {
        if !self.supports_charset() {
            return None;
        }
        self.charset.as_deref().or(table.charset.as_deref())
    }

    /// Collation in effect for this column, following the same rule as
    /// [`ColumnDef::effective_charset`].
    pub fn effective_collate<'a>(&'a self, table: &'a TableOptions) -> Option<&'a str> {
        if !self.supports_charset() {
            return None;
        }
        self.collate.as_deref().or(table.collate.as_deref())
    }
}

/// Classification of a table constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCategory {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "UNIQUE KEY")]
    UniqueKey,
    #[serde(rename = "KEY")]
    Key,
    #[serde(rename = "FULLTEXT KEY")]
    FullTextKey,
    #[serde(rename = "SPATIAL KEY")]
    SpatialKey,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
}

impl KeyCategory {
    /// All categories in the order keys are emitted in a `CREATE TABLE`
    pub const ALL: [KeyCategory; 6] = [
        KeyCategory::PrimaryKey,
        KeyCategory::UniqueKey,
        KeyCategory::Key,
        KeyCategory::FullTextKey,
        KeyCategory::SpatialKey,
        KeyCategory::ForeignKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCategory::PrimaryKey => "PRIMARY KEY",
            KeyCategory::UniqueKey => "UNIQUE KEY",
            KeyCategory::Key => "KEY",
            KeyCategory::FullTextKey => "FULLTEXT KEY",
            KeyCategory::SpatialKey => "SPATIAL KEY",
            KeyCategory::ForeignKey => "FOREIGN KEY",
        }
    }

    /// Parse a category as written in DDL. Whitespace and case are
    /// normalized and `INDEX` is accepted wherever `KEY` is.
    pub fn from_sql(text: &str) -> Option<Self> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.to_ascii_uppercase())
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["PRIMARY", "KEY"] => Some(KeyCategory::PrimaryKey),
            ["UNIQUE"] | ["UNIQUE", "KEY" | "INDEX"] => Some(KeyCategory::UniqueKey),
            ["KEY"] | ["INDEX"] => Some(KeyCategory::Key),
            ["FULLTEXT"] | ["FULLTEXT", "KEY" | "INDEX"] => Some(KeyCategory::FullTextKey),
            ["SPATIAL"] | ["SPATIAL", "KEY" | "INDEX"] => Some(KeyCategory::SpatialKey),
            ["FOREIGN", "KEY"] => Some(KeyCategory::ForeignKey),
            _ => None,
        }
    }
}

impl fmt::Display for KeyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order of an index column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexOrder {
    Asc,
    Desc,
}

impl IndexOrder {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "ASC" => Some(IndexOrder::Asc),
            "DESC" => Some(IndexOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexOrder::Asc => "ASC",
            IndexOrder::Desc => "DESC",
        }
    }
}

/// A column referenced by a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyColumnRef {
    /// Column id, filled in by reference linking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Index prefix length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<IndexOrder>,
}

impl KeyColumnRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            length: None,
            order: None,
        }
    }
}

/// Referential action of `ON DELETE` / `ON UPDATE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    pub fn from_sql(text: &str) -> Option<Self> {
        let normalized = text
            .split_whitespace()
            .map(|w| w.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET NULL" => Some(ReferentialAction::SetNull),
            "NO ACTION" => Some(ReferentialAction::NoAction),
            "SET DEFAULT" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Foreign-key-only part of a [`KeyDef`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub ref_cols: Vec<KeyColumnRef>,
    /// Referenced schema; the owning table's schema when the DDL omits it
    pub ref_schema_name: String,
    pub ref_tbl_name: String,
    /// Id of the referenced table, filled in by reference linking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_tbl_id: Option<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

/// One key or constraint definition
///
/// `foreign` is set exactly when the key lives under
/// [`KeyCategory::ForeignKey`]; its fields serialize inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Key name; absent for the primary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub cols: Vec<KeyColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Index type from `USING BTREE|HASH|RTREE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(flatten)]
    pub foreign: Option<ForeignKeyRef>,
}

impl KeyDef {
    /// A primary, unique, plain, fulltext or spatial key
    pub fn index(name: Option<String>, cols: Vec<KeyColumnRef>) -> Self {
        Self {
            name,
            cols,
            ..Default::default()
        }
    }

    /// A foreign key constraint
    pub fn foreign(name: Option<String>, cols: Vec<KeyColumnRef>, reference: ForeignKeyRef) -> Self {
        Self {
            name,
            cols,
            foreign: Some(reference),
            ..Default::default()
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    pub fn col_names(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(|c| c.name.as_str())
    }
}
