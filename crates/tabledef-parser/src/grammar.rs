//! CREATE TABLE grammars
//!
//! Each construct of a `SHOW CREATE TABLE` statement has its own anchored
//! pattern with named captures, so the parser can classify a definition by
//! trying the grammars in turn:
//!
//! - [`match_create_table`] - statement envelope (`table_name`,
//!   `table_definitions`, `table_options`)
//! - [`table_options`] - `key=value` pairs of the option tail
//! - [`COL_DEF`] - one column definition
//! - [`NON_FKS`] - `PRIMARY KEY`, `UNIQUE KEY`, `KEY`, `FULLTEXT KEY`, `SPATIAL KEY`
//! - [`FKS`] - `CONSTRAINT ... FOREIGN KEY ... REFERENCES ...`
//! - [`index_col_names`] - column lists of keys
//!
//! The definitions blob is split with [`split_definitions`], which only
//! breaks on commas outside parentheses and quotes, so `DECIMAL(10,2)` or
//! `ENUM('a,b')` stay in one piece.
//!
//! All patterns are compiled once on first use and shared read-only.

use regex::Regex;
use std::sync::LazyLock;

/// Backtick-quoted identifier with doubled-backtick escaping
const IDENT: &str = r"`(?:[^`]|``)+`";

/// Single-quoted string literal with backslash and doubled-quote escaping
const STRING: &str = r"'(?:[^'\\]|\\.|'')*'";

/// Referential actions of `ON DELETE` / `ON UPDATE`
const REF_ACTION: &str = r"RESTRICT|CASCADE|SET\s+NULL|NO\s+ACTION|SET\s+DEFAULT";

/// Column list of a key: identifiers, prefix lengths, commas and sort orders
const COL_LIST: &str = r"(?:`(?:[^`]|``)+`|\(\s*\d+\s*\)|[^`()])+";

static CREATE_TABLE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        ^\s*CREATE\s+(?:OR\s+REPLACE\s+)?(?:TEMPORARY\s+)?TABLE\s+
        (?:IF\s+NOT\s+EXISTS\s+)?
        (?:(?P<table_schema>{IDENT})\s*\.\s*)?
        (?P<table_name>{IDENT})
        \s*\("
    ))
    .expect("valid regex")
});

static TABLE_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        (?P<key>
            DEFAULT\s+CHARACTER\s+SET | DEFAULT\s+CHARSET | DEFAULT\s+COLLATE
            | CHARACTER\s+SET | {IDENT} | \w+
        )
        \s*=\s*
        (?P<value>{STRING}|[^\s']+)"
    ))
    .expect("valid regex")
});

/// One column definition.
///
/// Captures: `col_name`, `data_type`, `data_type_size`, `un`, `zf`,
/// `charset`, `collate`, `generated_exp`, `generated`, `nn`, `invisible`,
/// `default_exp`, `on_update`, `ai`, `comment`, `check`.
pub static COL_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        ^(?P<col_name>{IDENT})
        \s+(?P<data_type>[a-z]\w*)
        (?:\s*\((?P<data_type_size>(?:{STRING}|[^)'])*)\))?
        (?:\s+(?P<un>UNSIGNED))?
        (?:\s+(?P<zf>ZEROFILL))?
        (?:\s+CHARACTER\s+SET\s+(?P<charset>\w+))?
        (?:\s+COLLATE\s+(?P<collate>\w+))?
        (?:\s+(?:GENERATED\s+ALWAYS\s+)?AS\s+\((?P<generated_exp>.*?)\)
            \s+(?P<generated>VIRTUAL|STORED|PERSISTENT))?
        (?:\s+(?P<nn>NOT\s+NULL)|\s+NULL)?
        (?:\s+(?P<invisible>INVISIBLE))?
        (?:\s+DEFAULT\s+(?P<default_exp>
            {STRING}
            | [bx]'[^']*'
            | \(.*?\)
            | [^\s'(]+(?:\(.*?\))?
        ))?
        (?:\s+ON\s+UPDATE\s+(?P<on_update>\w+(?:\(\d*\))?))?
        (?:\s+(?P<ai>AUTO_INCREMENT))?
        (?:\s+COMMENT\s+(?P<comment>{STRING}))?
        (?:\s+CHECK\s+\((?P<check>.*)\))?
        $"
    ))
    .expect("valid regex")
});

/// A primary, unique, plain, fulltext or spatial key.
///
/// Captures: `category`, `name`, `col_names`, `using`, `comment`.
pub static NON_FKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        ^(?P<category>
            PRIMARY\s+KEY
            | UNIQUE(?:\s+(?:KEY|INDEX))?
            | FULLTEXT(?:\s+(?:KEY|INDEX))?
            | SPATIAL(?:\s+(?:KEY|INDEX))?
            | KEY | INDEX
        )
        (?:\s+(?P<name>{IDENT}))?
        \s*\((?P<col_names>{COL_LIST})\)
        (?:\s+USING\s+(?P<using>BTREE|HASH|RTREE))?
        (?:\s+KEY_BLOCK_SIZE\s*=\s*\d+)?
        (?:\s+WITH\s+PARSER\s+\w+)?
        (?:\s+COMMENT\s+(?P<comment>{STRING}))?
        (?:\s+(?:NOT\s+)?IGNORED)?
        $"
    ))
    .expect("valid regex")
});

/// A foreign key constraint.
///
/// Captures: `name`, `category`, `col_names`, `ref_schema_name`,
/// `ref_tbl_name`, `ref_col_names`, `on_delete`, `on_update`.
pub static FKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        ^(?:CONSTRAINT(?:\s+(?P<name>{IDENT}))?\s+)?
        (?P<category>FOREIGN\s+KEY)
        (?:\s+{IDENT})?
        \s*\((?P<col_names>{COL_LIST})\)
        \s+REFERENCES\s+
        (?:(?P<ref_schema_name>{IDENT})\s*\.\s*)?
        (?P<ref_tbl_name>{IDENT})
        \s*\((?P<ref_col_names>{COL_LIST})\)
        (?:\s+MATCH\s+(?:FULL|PARTIAL|SIMPLE))?
        (?:\s+ON\s+DELETE\s+(?P<on_delete>{REF_ACTION}))?
        (?:\s+ON\s+UPDATE\s+(?P<on_update>{REF_ACTION}))?
        $"
    ))
    .expect("valid regex")
});

static INDEX_COL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?xi)
        (?P<name>{IDENT})
        (?:\s*\(\s*(?P<length>\d+)\s*\))?
        (?:\s+(?P<order>ASC|DESC))?"
    ))
    .expect("valid regex")
});

/// Envelope of a `CREATE TABLE` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTableMatch<'a> {
    /// Quoted schema qualifier, when the statement has one
    pub table_schema: Option<&'a str>,
    /// Quoted table name
    pub table_name: &'a str,
    /// Everything between the outer parentheses
    pub table_definitions: &'a str,
    /// The option line following the closing parenthesis
    pub table_options: &'a str,
    /// Anything after the option line, e.g. a `PARTITION BY` clause
    pub partition_options: Option<&'a str>,
}

/// Match the `CREATE TABLE` envelope of `ddl`.
///
/// The definitions end at the parenthesis that balances the one after the
/// table name; parentheses inside quotes do not count.
pub fn match_create_table(ddl: &str) -> Option<CreateTableMatch<'_>> {
    let caps = CREATE_TABLE_HEAD.captures(ddl)?;
    let body_start = caps.get(0)?.end();
    let body_end = body_start + closing_paren(&ddl[body_start..])?;

    let tail = ddl[body_end + 1..].trim();
    let tail = tail.strip_suffix(';').unwrap_or(tail).trim_end();
    let (table_options, rest) = match tail.split_once('\n') {
        Some((line, rest)) => (line.trim(), rest.trim()),
        None => (tail, ""),
    };

    Some(CreateTableMatch {
        table_schema: caps.name("table_schema").map(|m| m.as_str()),
        table_name: caps.name("table_name")?.as_str(),
        table_definitions: &ddl[body_start..body_end],
        table_options,
        partition_options: (!rest.is_empty()).then_some(rest),
    })
}

/// Byte offset of the parenthesis closing an already opened one
fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut scanner = QuoteScanner::default();
    for (i, ch) in text.char_indices() {
        if scanner.consume(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a definitions blob into single definitions.
///
/// Breaks on commas at parenthesis depth zero outside quotes. Each piece is
/// trimmed and empty pieces are dropped.
pub fn split_definitions(blob: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut scanner = QuoteScanner::default();

    for (i, ch) in blob.char_indices() {
        if scanner.consume(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&blob[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&blob[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Tracks whether the scan position is inside a quoted identifier or
/// string literal.
#[derive(Debug, Default)]
struct QuoteScanner {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteScanner {
    /// Feed one character; returns true when it belongs to a quoted run
    /// (including its opening and closing marks).
    fn consume(&mut self, ch: char) -> bool {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' && quote != '`' {
                    self.escaped = true;
                } else if ch == quote {
                    // A doubled quote mark closes and reopens, which nets out.
                    self.quote = None;
                }
                true
            }
            None => {
                if matches!(ch, '`' | '\'' | '"') {
                    self.quote = Some(ch);
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Iterate the `key=value` pairs of a table option line.
///
/// Keys are lower-cased with whitespace collapsed to one space and
/// backtick quoting removed; the `DEFAULT` prefix of the charset and
/// collation options is dropped, as is `CHARACTER SET` in favor of
/// `charset`. Values are returned raw (string values keep their quotes).
pub fn table_options(line: &str) -> impl Iterator<Item = (String, &str)> {
    TABLE_OPTION.captures_iter(line).filter_map(|caps| {
        let key = caps.name("key")?.as_str();
        let value = caps.name("value")?.as_str();
        Some((normalize_option_key(key), value))
    })
}

fn normalize_option_key(key: &str) -> String {
    let key = key
        .strip_prefix('`')
        .and_then(|k| k.strip_suffix('`'))
        .map(|k| k.replace("``", "`"))
        .unwrap_or_else(|| key.to_string());
    let key = key
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match key.as_str() {
        "default charset" | "default character set" | "character set" => "charset".to_string(),
        "default collate" => "collate".to_string(),
        _ => key,
    }
}

/// One entry of a key's column list, still in its quoted form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColName<'a> {
    pub name: &'a str,
    pub length: Option<&'a str>,
    pub order: Option<&'a str>,
}

/// Iterate a column list such as `` `last_name`(30) ASC,`first_name` ``
pub fn index_col_names(blob: &str) -> Vec<IndexColName<'_>> {
    INDEX_COL_NAME
        .captures_iter(blob)
        .filter_map(|caps| {
            Some(IndexColName {
                name: caps.name("name")?.as_str(),
                length: caps.name("length").map(|m| m.as_str()),
                order: caps.name("order").map(|m| m.as_str()),
            })
        })
        .collect()
}
