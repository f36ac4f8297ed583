//! CREATE TABLE script generation
//!
//! Renders a [`ParsedTable`] back to MariaDB DDL. Column attributes are
//! written in the order `SHOW CREATE TABLE` prints them, so a rendered
//! script parses back to the same definitions.

use serde::{Deserialize, Serialize};
use tabledef_core::{
    ColumnDef, KeyCategory, KeyColumnRef, KeyDef, ParsedTable, TableOptions, quote_identifier,
    quote_string_literal,
};

/// Options for [`ScriptBuilder::build_create_script`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Leave out the `CREATE SCHEMA IF NOT EXISTS` statement
    pub skip_schema_creation: bool,
    /// Leave out foreign key constraints
    pub skip_fk_creation: bool,
    /// Emit `CREATE TABLE IF NOT EXISTS`
    pub if_not_exists: bool,
}

/// Builder for CREATE TABLE scripts
///
/// Stateless; every method is an associated function over the parsed
/// table.
pub struct ScriptBuilder;

impl ScriptBuilder {
    /// Generate the CREATE TABLE statement, optionally preceded by the
    /// schema creation statement
    pub fn build_create_script(table: &ParsedTable, options: &ScriptOptions) -> String {
        let mut script = String::new();
        let schema = quote_identifier(&table.options.schema);

        if !options.skip_schema_creation {
            script.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {schema};\n"));
        }

        script.push_str("CREATE TABLE ");
        if options.if_not_exists {
            script.push_str("IF NOT EXISTS ");
        }
        script.push_str(&format!("{} (\n", table.qualified_name()));

        let mut definitions: Vec<String> = table
            .defs
            .col_map
            .values()
            .map(Self::column_definition)
            .collect();

        for category in KeyCategory::ALL {
            if category == KeyCategory::ForeignKey && options.skip_fk_creation {
                continue;
            }
            definitions.extend(
                table
                    .keys(category)
                    .map(|(_, key)| Self::key_definition(category, key)),
            );
        }

        let definitions: Vec<String> = definitions.iter().map(|d| format!("  {d}")).collect();
        script.push_str(&definitions.join(",\n"));
        script.push_str("\n)");
        script.push_str(&Self::table_options(&table.options));
        script.push(';');
        script
    }

    /// One column definition
    ///
    /// Generated columns carry no nullability clause and no default.
    pub fn column_definition(col: &ColumnDef) -> String {
        let mut parts = vec![quote_identifier(&col.name), col.data_type.clone()];

        if col.un {
            parts.push("UNSIGNED".into());
        }
        if col.zf {
            parts.push("ZEROFILL".into());
        }
        if let Some(charset) = &col.charset {
            parts.push(format!("CHARACTER SET {charset}"));
        }
        if let Some(collate) = &col.collate {
            parts.push(format!("COLLATE {collate}"));
        }

        match (&col.generated, &col.default_exp) {
            (Some(kind), Some(exp)) => {
                parts.push(format!("GENERATED ALWAYS AS ({exp}) {kind}"));
            }
            _ => {
                parts.push(if col.nn { "NOT NULL" } else { "NULL" }.into());
            }
        }
        if col.invisible {
            parts.push("INVISIBLE".into());
        }
        if !col.is_generated() {
            if let Some(exp) = &col.default_exp {
                parts.push(format!("DEFAULT {exp}"));
            }
        }
        if let Some(on_update) = &col.on_update {
            parts.push(format!("ON UPDATE {on_update}"));
        }
        if col.ai {
            parts.push("AUTO_INCREMENT".into());
        }
        if let Some(comment) = &col.comment {
            parts.push(format!("COMMENT {}", quote_string_literal(comment)));
        }
        if let Some(check) = &col.check {
            parts.push(format!("CHECK ({check})"));
        }

        parts.join(" ")
    }

    /// One key or foreign key constraint
    pub fn key_definition(category: KeyCategory, key: &KeyDef) -> String {
        let cols = Self::key_columns(&key.cols);

        if let Some(reference) = &key.foreign {
            let mut sql = String::new();
            if let Some(name) = &key.name {
                sql.push_str(&format!("CONSTRAINT {} ", quote_identifier(name)));
            }
            sql.push_str(&format!(
                "FOREIGN KEY ({cols}) REFERENCES {}.{} ({}) ON DELETE {} ON UPDATE {}",
                quote_identifier(&reference.ref_schema_name),
                quote_identifier(&reference.ref_tbl_name),
                Self::key_columns(&reference.ref_cols),
                reference.on_delete,
                reference.on_update,
            ));
            return sql;
        }

        let mut sql = category.as_str().to_string();
        if category != KeyCategory::PrimaryKey {
            if let Some(name) = &key.name {
                sql.push(' ');
                sql.push_str(&quote_identifier(name));
            }
        }
        sql.push_str(&format!(" ({cols})"));
        if let Some(using) = &key.using {
            sql.push_str(&format!(" USING {using}"));
        }
        if let Some(comment) = &key.comment {
            sql.push_str(&format!(" COMMENT {}", quote_string_literal(comment)));
        }
        sql
    }

    fn key_columns(cols: &[KeyColumnRef]) -> String {
        cols.iter()
            .map(|col| {
                let mut sql = quote_identifier(&col.name);
                if let Some(length) = col.length {
                    sql.push_str(&format!("({length})"));
                }
                if let Some(order) = col.order {
                    sql.push(' ');
                    sql.push_str(order.as_str());
                }
                sql
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn table_options(options: &TableOptions) -> String {
        let mut sql = String::new();
        if let Some(engine) = &options.engine {
            sql.push_str(&format!(" ENGINE={engine}"));
        }
        if let Some(charset) = &options.charset {
            sql.push_str(&format!(" DEFAULT CHARSET={charset}"));
        }
        if let Some(collate) = &options.collate {
            sql.push_str(&format!(" COLLATE={collate}"));
        }
        if let Some(row_format) = &options.row_format {
            sql.push_str(&format!(" ROW_FORMAT={row_format}"));
        }
        if let Some(comment) = &options.comment {
            sql.push_str(&format!(" COMMENT={}", quote_string_literal(comment)));
        }
        sql
    }
}

/// Shorthand for [`ScriptBuilder::build_create_script`]
pub fn build_create_script(table: &ParsedTable, options: &ScriptOptions) -> String {
    ScriptBuilder::build_create_script(table, options)
}
