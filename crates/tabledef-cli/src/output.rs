//! Rendering of parse results for the terminal

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};
use tabledef_parser::{ParseOutput, ParsedTable, ScriptOptions, build_create_script};

/// How parse results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `ParseOutput` documents, pretty-printed
    #[default]
    Json,
    /// Column and key tables
    Table,
    /// Regenerated CREATE TABLE scripts
    Sql,
}

/// Render all results in `format`. A single result prints as one JSON
/// object, several as an array.
pub fn render(outputs: &[ParseOutput], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(match outputs {
            [single] => serde_json::to_string_pretty(single)?,
            _ => serde_json::to_string_pretty(outputs)?,
        }),
        OutputFormat::Table => Ok(outputs
            .iter()
            .map(|output| render_table(&output.table))
            .collect::<Vec<_>>()
            .join("\n\n")),
        OutputFormat::Sql => Ok(render_sql(outputs)),
    }
}

/// CREATE TABLE scripts; each schema is created once, before its first table
fn render_sql(outputs: &[ParseOutput]) -> String {
    let mut created: Vec<&str> = Vec::new();
    outputs
        .iter()
        .map(|output| {
            let schema = output.table.options.schema.as_str();
            let options = ScriptOptions {
                skip_schema_creation: created.contains(&schema),
                ..Default::default()
            };
            created.push(schema);
            build_create_script(&output.table, &options)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_table(table: &ParsedTable) -> String {
    let mut columns = Table::new();
    columns.load_preset(UTF8_FULL).set_header(vec![
        "Column", "Type", "Null", "Default", "Extra", "Comment",
    ]);
    for col in table.defs.col_map.values() {
        let mut extra = Vec::new();
        if col.un {
            extra.push("UNSIGNED".to_string());
        }
        if col.zf {
            extra.push("ZEROFILL".to_string());
        }
        if col.ai {
            extra.push("AUTO_INCREMENT".to_string());
        }
        if let Some(kind) = col.generated {
            extra.push(kind.to_string());
        }
        if let Some(on_update) = &col.on_update {
            extra.push(format!("ON UPDATE {on_update}"));
        }
        if let Some(charset) = col.effective_charset(&table.options) {
            extra.push(charset.to_string());
        }
        columns.add_row(vec![
            col.name.clone(),
            col.data_type.clone(),
            if col.nn { "NO" } else { "YES" }.to_string(),
            col.default_exp.clone().unwrap_or_default(),
            extra.join(" "),
            col.comment.clone().unwrap_or_default(),
        ]);
    }

    let mut keys = Table::new();
    keys.load_preset(UTF8_FULL)
        .set_header(vec!["Category", "Name", "Columns", "References"]);
    for (category, key_map) in &table.defs.key_category_map {
        for key in key_map.values() {
            let references = key
                .foreign
                .as_ref()
                .map(|reference| {
                    let ref_cols: Vec<&str> =
                        reference.ref_cols.iter().map(|c| c.name.as_str()).collect();
                    format!(
                        "{}.{} ({}) ON DELETE {} ON UPDATE {}",
                        reference.ref_schema_name,
                        reference.ref_tbl_name,
                        ref_cols.join(", "),
                        reference.on_delete,
                        reference.on_update
                    )
                })
                .unwrap_or_default();
            keys.add_row(vec![
                category.to_string(),
                key.name.clone().unwrap_or_default(),
                key.col_names().collect::<Vec<_>>().join(", "),
                references,
            ]);
        }
    }

    let mut rendered = format!("{}\n{columns}", table.qualified_name());
    if !table.defs.key_category_map.is_empty() {
        rendered.push_str(&format!("\n{keys}"));
    }
    rendered
}

#[cfg(test)]
mod tests;
