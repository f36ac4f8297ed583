//! Relations between parsed tables
//!
//! Helpers that work on already parsed tables: which keys each column takes
//! part in, and resolving foreign key targets against a set of other parsed
//! tables so that references point at column and table ids.

use indexmap::IndexMap;
use tabledef_core::{KeyCategory, KeyColumnRef, ParsedTable};
use tracing::debug;

/// Categories of the keys each column takes part in, keyed by the
/// column's `col_map` key. Columns outside any key are absent.
pub fn col_key_categories(table: &ParsedTable) -> IndexMap<String, Vec<KeyCategory>> {
    let mut map: IndexMap<String, Vec<KeyCategory>> = IndexMap::new();
    for (category, keys) in &table.defs.key_category_map {
        for col in keys.values().flat_map(|key| key.cols.iter()) {
            let Some((col_key, _)) = table.column_by_name(&col.name) else {
                continue;
            };
            let categories = map.entry(col_key.to_string()).or_default();
            if !categories.contains(category) {
                categories.push(*category);
            }
        }
    }
    map
}

/// Point key columns and foreign key targets at ids.
///
/// Every key column gets the `col_map` key of the column it names. A
/// foreign key whose `(ref_schema_name, ref_tbl_name)` matches a table in
/// `lookup`, or the table itself, gets that table's id as `ref_tbl_id` and
/// its referenced columns get their ids. Anything unresolved is left
/// untouched. Returns the number of foreign keys that were resolved.
pub fn link_references(table: &mut ParsedTable, lookup: &[ParsedTable]) -> usize {
    let snapshot = table.clone();
    let mut linked = 0;

    for keys in table.defs.key_category_map.values_mut() {
        for key in keys.values_mut() {
            assign_col_ids(&mut key.cols, &snapshot);

            let Some(reference) = key.foreign.as_mut() else {
                continue;
            };
            let is_target = |candidate: &ParsedTable| {
                candidate.options.schema == reference.ref_schema_name
                    && candidate.options.name == reference.ref_tbl_name
            };
            let target = lookup
                .iter()
                .find(|candidate| is_target(candidate))
                .or_else(|| is_target(&snapshot).then_some(&snapshot));

            match target {
                Some(target) => {
                    reference.ref_tbl_id = target.id.clone();
                    assign_col_ids(&mut reference.ref_cols, target);
                    linked += 1;
                }
                None => debug!(
                    table = %snapshot.options.name,
                    ref_schema = %reference.ref_schema_name,
                    ref_table = %reference.ref_tbl_name,
                    "foreign key target not found"
                ),
            }
        }
    }

    linked
}

fn assign_col_ids(cols: &mut [KeyColumnRef], table: &ParsedTable) {
    for col in cols {
        if let Some((col_key, _)) = table.column_by_name(&col.name) {
            col.id = Some(col_key.to_string());
        }
    }
}
