//! `SHOW CREATE TABLE` parser
//!
//! Turns one `CREATE TABLE` statement, as printed by MariaDB with
//! `sql_quote_show_create = ON`, into a [`ParsedTable`]:
//!
//! 1. the statement envelope yields the table name, the definitions blob
//!    and the option tail
//! 2. the option tail becomes [`TableOptions`]
//! 3. every definition is classified as a column, a key or a foreign key
//!    and added to the column map or the key category map
//!
//! Definitions that match none of the grammars are reported as
//! [`ParseWarning`]s next to the best-effort table instead of vanishing.
//!
//! # Examples
//!
//! ```
//! use tabledef_parser::{KeyCategory, ParseOptions, TableParser};
//!
//! let ddl = "CREATE TABLE `t1` (
//!   `id` int(11) NOT NULL AUTO_INCREMENT,
//!   `name` varchar(50) DEFAULT NULL,
//!   PRIMARY KEY (`id`)
//! ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
//!
//! let output = TableParser::new(ParseOptions::default()).parse(ddl, "test").unwrap();
//! assert!(output.warnings.is_empty());
//!
//! let table = output.table;
//! assert_eq!(table.options.name, "t1");
//! assert_eq!(table.defs.col_map["id"].data_type, "INT(11)");
//! assert!(table.primary_key().is_some());
//! assert_eq!(table.keys(KeyCategory::PrimaryKey).count(), 1);
//! ```

use indexmap::IndexMap;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabledef_core::{
    ColumnDef, ForeignKeyRef, GeneratedType, IndexOrder, KeyCategory, KeyColumnRef, KeyDef,
    ParsedTable, ReferentialAction, Result, TableDefError, TableDefs, TableOptions,
    unquote_identifier,
};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::grammar::{self, COL_DEF, CreateTableMatch, FKS, NON_FKS};

/// Options for [`TableParser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Stamp the table, every column and every key with a fresh UUID and
    /// key the maps by it. Without ids, maps are keyed by natural names.
    pub auto_gen_id: bool,
    /// Drop a column's `charset` when it equals the table charset
    pub skip_col_charset_if_equal: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            auto_gen_id: false,
            skip_col_charset_if_equal: true,
        }
    }
}

/// A recoverable finding made while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A table definition that is neither a column nor a key
    UnparsedLine {
        /// Zero-based position among the table's definitions
        index: usize,
        text: String,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnparsedLine { index, text } => {
                write!(f, "definition #{index} was not recognized: {text}")
            }
        }
    }
}

/// A parsed table together with everything that could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub table: ParsedTable,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutput {
    /// True when every definition was recognized
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Parser for `SHOW CREATE TABLE` output
///
/// Holds only its options; parsing is a pure function of the input, so one
/// parser can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct TableParser {
    options: ParseOptions,
}

impl TableParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse one `CREATE TABLE` statement belonging to `schema`.
    ///
    /// `schema` becomes `options.schema` and the referenced schema of
    /// foreign keys that do not name one. Fails with
    /// [`TableDefError::MalformedStatement`] when `ddl` is not a
    /// `CREATE TABLE` statement.
    pub fn parse(&self, ddl: &str, schema: &str) -> Result<ParseOutput> {
        let statement = grammar::match_create_table(ddl)
            .ok_or_else(|| TableDefError::MalformedStatement(statement_preview(ddl)))?;

        let options = self.parse_table_options(&statement, schema)?;
        if let Some(qualifier) = statement.table_schema {
            let qualifier = unquote_identifier(qualifier)?;
            if qualifier != schema {
                debug!(
                    table = %options.name,
                    qualifier = %qualifier,
                    schema = %schema,
                    "ignoring schema qualifier of CREATE TABLE"
                );
            }
        }

        let mut defs = TableDefs::default();
        let mut warnings = Vec::new();

        let definitions = grammar::split_definitions(statement.table_definitions);
        for (index, line) in definitions.into_iter().enumerate() {
            if let Some(caps) = COL_DEF.captures(line) {
                trace!(index, "column definition");
                let mut column = self.parse_column(&caps, options.charset.as_deref())?;
                let entry = self.entry_id(&defs.col_map, &column.name);
                if self.options.auto_gen_id {
                    column.id = Some(entry.clone());
                }
                defs.col_map.insert(entry, column);
                continue;
            }

            if let Some((category, mut key)) = self.parse_key(line, schema)? {
                trace!(index, category = %category, "key definition");
                let keys = defs.key_category_map.entry(category).or_default();
                let entry = self.entry_id(keys, &natural_key_name(category, &key));
                if self.options.auto_gen_id {
                    key.id = Some(entry.clone());
                }
                keys.insert(entry, key);
                continue;
            }

            warn!(index, definition = %line, "unrecognized table definition");
            warnings.push(ParseWarning::UnparsedLine {
                index,
                text: line.to_string(),
            });
        }

        debug!(
            schema = %options.schema,
            table = %options.name,
            columns = defs.col_map.len(),
            keys = defs.key_count(),
            warnings = warnings.len(),
            "parsed CREATE TABLE"
        );

        let table = ParsedTable {
            id: self.options.auto_gen_id.then(new_id),
            options,
            defs,
        };
        Ok(ParseOutput { table, warnings })
    }

    /// Parse several statements of the same schema, stopping at the first
    /// malformed one
    pub fn parse_all<'a, I>(&self, ddls: I, schema: &str) -> Result<Vec<ParseOutput>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ddls.into_iter().map(|ddl| self.parse(ddl, schema)).collect()
    }

    fn parse_table_options(
        &self,
        statement: &CreateTableMatch<'_>,
        schema: &str,
    ) -> Result<TableOptions> {
        let mut options = TableOptions {
            schema: schema.to_string(),
            name: unquote_identifier(statement.table_name)?,
            partition_by: statement.partition_options.map(str::to_string),
            ..Default::default()
        };

        for (key, raw) in grammar::table_options(statement.table_options) {
            let value = if raw.starts_with('\'') {
                unquote_identifier(raw)?
            } else {
                raw.to_string()
            };
            match key.as_str() {
                "engine" => options.engine = Some(value),
                "charset" => options.charset = Some(value),
                "collate" => options.collate = Some(value),
                "comment" => options.comment = Some(value),
                "row_format" => options.row_format = Some(value),
                "auto_increment" => match value.parse() {
                    Ok(next) => options.auto_increment = Some(next),
                    Err(_) => {
                        options.extra.insert(key, value);
                    }
                },
                _ => {
                    options.extra.insert(key, value);
                }
            }
        }

        Ok(options)
    }

    fn parse_column(&self, caps: &Captures<'_>, table_charset: Option<&str>) -> Result<ColumnDef> {
        let text = |name: &str| caps.name(name).map(|m| m.as_str());
        let flag = |name: &str| caps.name(name).is_some();
        let unquoted = |name: &str| text(name).map(unquote_identifier).transpose();

        let base_type = text("data_type").unwrap_or_default().to_ascii_uppercase();
        let data_type = match text("data_type_size") {
            Some(size) => format!("{base_type}({size})"),
            None => base_type,
        };

        let charset = text("charset").filter(|charset| {
            !(self.options.skip_col_charset_if_equal && Some(*charset) == table_charset)
        });

        Ok(ColumnDef {
            id: None,
            name: unquoted("col_name")?.unwrap_or_default(),
            data_type,
            un: flag("un"),
            zf: flag("zf"),
            nn: flag("nn"),
            charset: charset.map(str::to_string),
            collate: text("collate").map(str::to_string),
            generated: text("generated").and_then(GeneratedType::from_keyword),
            ai: flag("ai"),
            default_exp: text("default_exp")
                .or_else(|| text("generated_exp"))
                .map(str::to_string),
            on_update: text("on_update").map(str::to_string),
            invisible: flag("invisible"),
            check: text("check").map(str::to_string),
            comment: unquoted("comment")?,
        })
    }

    fn parse_key(&self, line: &str, schema: &str) -> Result<Option<(KeyCategory, KeyDef)>> {
        if let Some(caps) = NON_FKS.captures(line) {
            let Some(category) = caps
                .name("category")
                .and_then(|m| KeyCategory::from_sql(m.as_str()))
            else {
                return Ok(None);
            };
            let mut key = KeyDef::index(
                optional_identifier(&caps, "name")?,
                key_columns(&caps, "col_names")?,
            );
            key.comment = optional_identifier(&caps, "comment")?;
            key.using = caps.name("using").map(|m| m.as_str().to_ascii_uppercase());
            return Ok(Some((category, key)));
        }

        if let Some(caps) = FKS.captures(line) {
            let action = |name: &str| {
                caps.name(name)
                    .and_then(|m| ReferentialAction::from_sql(m.as_str()))
                    .unwrap_or_default()
            };
            let reference = ForeignKeyRef {
                ref_cols: key_columns(&caps, "ref_col_names")?,
                ref_schema_name: optional_identifier(&caps, "ref_schema_name")?
                    .unwrap_or_else(|| schema.to_string()),
                ref_tbl_name: optional_identifier(&caps, "ref_tbl_name")?.unwrap_or_default(),
                ref_tbl_id: None,
                on_delete: action("on_delete"),
                on_update: action("on_update"),
            };
            let key = KeyDef::foreign(
                optional_identifier(&caps, "name")?,
                key_columns(&caps, "col_names")?,
                reference,
            );
            return Ok(Some((KeyCategory::ForeignKey, key)));
        }

        Ok(None)
    }

    /// Map key for a new entry: a fresh UUID, or the natural name made
    /// unique within `map`
    fn entry_id<V>(&self, map: &IndexMap<String, V>, natural: &str) -> String {
        if self.options.auto_gen_id {
            return new_id();
        }
        if !map.contains_key(natural) {
            return natural.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{natural}_{n}");
            if !map.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Parse with [`ParseOptions::default`]
pub fn parse_create_table(ddl: &str, schema: &str) -> Result<ParseOutput> {
    TableParser::default().parse(ddl, schema)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// `PRIMARY` for the primary key, the key name when there is one, else
/// the column names joined with the category, e.g. `a_b_UNIQUE_KEY`
fn natural_key_name(category: KeyCategory, key: &KeyDef) -> String {
    if category == KeyCategory::PrimaryKey {
        return "PRIMARY".to_string();
    }
    match &key.name {
        Some(name) => name.clone(),
        None => {
            let cols = key.col_names().collect::<Vec<_>>().join("_");
            format!("{cols}_{}", category.as_str().replace(' ', "_"))
        }
    }
}

fn optional_identifier(caps: &Captures<'_>, name: &str) -> Result<Option<String>> {
    caps.name(name)
        .map(|m| unquote_identifier(m.as_str()))
        .transpose()
}

fn key_columns(caps: &Captures<'_>, name: &str) -> Result<Vec<KeyColumnRef>> {
    let Some(blob) = caps.name(name) else {
        return Ok(Vec::new());
    };
    grammar::index_col_names(blob.as_str())
        .into_iter()
        .map(|col| -> Result<KeyColumnRef> {
            Ok(KeyColumnRef {
                id: None,
                name: unquote_identifier(col.name)?,
                length: col.length.and_then(|length| length.parse().ok()),
                order: col.order.and_then(IndexOrder::from_keyword),
            })
        })
        .collect()
}

/// First line of a rejected statement, shortened for error messages
fn statement_preview(ddl: &str) -> String {
    const MAX_CHARS: usize = 60;
    let first_line = ddl.trim().lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_CHARS {
        let head: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    } else if first_line.is_empty() {
        "empty input".to_string()
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests;
