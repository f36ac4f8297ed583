//! Tests for the CREATE TABLE parser

use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;

const T1: &str = indoc! {"
    CREATE TABLE `t1` (
      `id` int(11) NOT NULL AUTO_INCREMENT,
      `name` varchar(50) DEFAULT NULL,
      PRIMARY KEY (`id`)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"};

fn parse(ddl: &str) -> ParseOutput {
    parse_create_table(ddl, "test").unwrap()
}

fn parse_with(ddl: &str, options: ParseOptions) -> ParseOutput {
    TableParser::new(options).parse(ddl, "app_db").unwrap()
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_end_to_end_t1() {
    let output = parse(T1);
    assert!(output.is_complete());
    let table = output.table;

    assert_eq!(table.id, None);
    assert_eq!(table.options.schema, "test");
    assert_eq!(table.options.name, "t1");
    assert_eq!(table.options.engine.as_deref(), Some("InnoDB"));
    assert_eq!(table.options.charset.as_deref(), Some("utf8mb4"));
    assert_eq!(table.options.collate, None);
    assert!(table.options.extra.is_empty());

    let id = &table.defs.col_map["id"];
    assert_eq!(id.name, "id");
    assert_eq!(id.data_type, "INT(11)");
    assert!(id.nn);
    assert!(id.ai);
    assert_eq!(id.default_exp, None);

    let name = &table.defs.col_map["name"];
    assert_eq!(name.data_type, "VARCHAR(50)");
    assert!(!name.nn);
    assert_eq!(name.default_exp.as_deref(), Some("NULL"));

    let pk = table.primary_key().unwrap();
    assert_eq!(pk.name, None);
    assert_eq!(pk.cols, vec![KeyColumnRef::named("id")]);
    assert!(!pk.is_foreign());
    assert_eq!(
        table.defs.key_category_map[&KeyCategory::PrimaryKey]
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>(),
        vec!["PRIMARY"]
    );
}

#[test]
fn test_json_shape_of_t1() {
    let table = parse(T1).table;
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(
        json["options"],
        serde_json::json!({
            "schema": "test",
            "name": "t1",
            "engine": "InnoDB",
            "charset": "utf8mb4"
        })
    );
    assert_eq!(
        json["defs"]["key_category_map"]["PRIMARY KEY"]["PRIMARY"],
        serde_json::json!({ "cols": [{ "name": "id" }] })
    );
}

#[test]
fn test_malformed_statement_is_an_error() {
    let err = parse_create_table("SELECT * FROM t1", "test").unwrap_err();
    assert!(matches!(err, TableDefError::MalformedStatement(ref s) if s == "SELECT * FROM t1"));

    let err = parse_create_table("   ", "test").unwrap_err();
    assert!(matches!(err, TableDefError::MalformedStatement(ref s) if s == "empty input"));
}

#[test]
fn test_long_malformed_statement_is_shortened() {
    let ddl = format!("CREATE VIEW `v` AS SELECT {}", "x, ".repeat(40));
    let TableDefError::MalformedStatement(preview) = parse_create_table(&ddl, "s").unwrap_err()
    else {
        panic!("expected a malformed statement error");
    };
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 63);
}

// ============================================================================
// Table options
// ============================================================================

#[test]
fn test_table_options() {
    let ddl = "CREATE TABLE `t` (`a` int(11)) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci COMMENT='hello'";
    let options = parse(ddl).table.options;
    assert_eq!(options.engine.as_deref(), Some("InnoDB"));
    assert_eq!(options.charset.as_deref(), Some("utf8mb4"));
    assert_eq!(options.collate.as_deref(), Some("utf8mb4_general_ci"));
    assert_eq!(options.comment.as_deref(), Some("hello"));
}

#[test]
fn test_other_options_land_in_extra() {
    let ddl = "CREATE TABLE `t` (`a` int(11)) ENGINE=Aria AUTO_INCREMENT=42 ROW_FORMAT=PAGE PAGE_CHECKSUM=1 TRANSACTIONAL=1";
    let options = parse(ddl).table.options;
    assert_eq!(options.auto_increment, Some(42));
    assert_eq!(options.row_format.as_deref(), Some("PAGE"));
    assert_eq!(options.get("page_checksum").as_deref(), Some("1"));
    assert_eq!(options.get("transactional").as_deref(), Some("1"));
    assert_eq!(options.extra.len(), 2);
}

#[test]
fn test_partition_clause_is_kept() {
    let ddl = indoc! {"
        CREATE TABLE `p` (
          `id` int(11) NOT NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=latin1
         PARTITION BY HASH (`id`)
        PARTITIONS 4"};
    let options = parse(ddl).table.options;
    assert_eq!(options.charset.as_deref(), Some("latin1"));
    assert_eq!(options.partition_by.as_deref(), Some("PARTITION BY HASH (`id`)\nPARTITIONS 4"));
}

#[test]
fn test_caller_schema_wins_over_qualifier() {
    let ddl = "CREATE TABLE `other`.`t` (`a` int(11))";
    let options = parse(ddl).table.options;
    assert_eq!(options.schema, "test");
    assert_eq!(options.name, "t");
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_column_order_is_preserved() {
    let ddl = indoc! {"
        CREATE TABLE `t` (
          `id` int(11) NOT NULL,
          `name` varchar(20) NOT NULL,
          `created_at` datetime DEFAULT NULL
        )"};
    let table = parse(ddl).table;
    let names: Vec<_> = table.defs.col_map.values().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "created_at"]);
    let keys: Vec<_> = table.defs.col_map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "created_at"]);
}

#[test]
fn test_column_attributes() {
    let ddl = indoc! {"
        CREATE TABLE `t` (
          `price` decimal(10,2) unsigned zerofill NOT NULL DEFAULT 0.00,
          `status` enum('new','done') NOT NULL DEFAULT 'new' COMMENT 'it''s the state',
          `ts` timestamp NOT NULL DEFAULT current_timestamp() ON UPDATE current_timestamp(),
          `secret` int(11) INVISIBLE DEFAULT NULL,
          `doc` longtext DEFAULT NULL CHECK (json_valid(`doc`))
        )"};
    let table = parse(ddl).table;
    let cols = &table.defs.col_map;

    let price = &cols["price"];
    assert_eq!(price.data_type, "DECIMAL(10,2)");
    assert!(price.un && price.zf && price.nn);
    assert_eq!(price.default_exp.as_deref(), Some("0.00"));

    let status = &cols["status"];
    assert_eq!(status.data_type, "ENUM('new','done')");
    assert_eq!(status.default_exp.as_deref(), Some("'new'"));
    assert_eq!(status.comment.as_deref(), Some("it's the state"));

    let ts = &cols["ts"];
    assert_eq!(ts.data_type, "TIMESTAMP");
    assert_eq!(ts.default_exp.as_deref(), Some("current_timestamp()"));
    assert_eq!(ts.on_update.as_deref(), Some("current_timestamp()"));

    assert!(cols["secret"].invisible);
    assert_eq!(cols["secret"].default_exp.as_deref(), Some("NULL"));

    assert_eq!(cols["doc"].check.as_deref(), Some("json_valid(`doc`)"));
}

#[test]
fn test_generated_columns_use_expression_as_default() {
    let ddl = indoc! {"
        CREATE TABLE `t` (
          `a` int(11) NOT NULL,
          `v` int(11) GENERATED ALWAYS AS (`a` * 2) VIRTUAL,
          `s` int(11) AS (`a` + 1) PERSISTENT
        )"};
    let cols = parse(ddl).table.defs.col_map;
    assert_eq!(cols["v"].generated, Some(GeneratedType::Virtual));
    assert_eq!(cols["v"].default_exp.as_deref(), Some("`a` * 2"));
    assert_eq!(cols["s"].generated, Some(GeneratedType::Stored));
    assert_eq!(cols["s"].default_exp.as_deref(), Some("`a` + 1"));
    assert!(cols["s"].is_generated());
    assert!(!cols["a"].is_generated());
}

#[test]
fn test_quoted_column_names() {
    let ddl = "CREATE TABLE `t` (`odd``name` int(11), `with space` int(11))";
    let cols = parse(ddl).table.defs.col_map;
    assert!(cols.contains_key("odd`name"));
    assert_eq!(cols["with space"].name, "with space");
}

mod charset {
    use super::*;
    use pretty_assertions::assert_eq;

    const DDL: &str = indoc! {"
        CREATE TABLE `t` (
          `a` varchar(10) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
          `b` varchar(10) CHARACTER SET latin1 DEFAULT NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"};

    #[test]
    fn test_charset_equal_to_table_is_skipped() {
        let cols = parse_with(DDL, ParseOptions::default()).table.defs.col_map;
        assert_eq!(cols["a"].charset, None);
        assert_eq!(cols["a"].collate.as_deref(), Some("utf8mb4_bin"));
        assert_eq!(cols["b"].charset.as_deref(), Some("latin1"));
    }

    #[test]
    fn test_charset_kept_when_skipping_is_disabled() {
        let options = ParseOptions {
            skip_col_charset_if_equal: false,
            ..Default::default()
        };
        let cols = parse_with(DDL, options).table.defs.col_map;
        assert_eq!(cols["a"].charset.as_deref(), Some("utf8mb4"));
        assert_eq!(cols["b"].charset.as_deref(), Some("latin1"));
    }

    #[test]
    fn test_skipped_charset_is_still_effective() {
        let table = parse_with(DDL, ParseOptions::default()).table;
        let a = &table.defs.col_map["a"];
        assert_eq!(a.effective_charset(&table.options), Some("utf8mb4"));
    }
}

// ============================================================================
// Keys
// ============================================================================

mod keys {
    use super::*;
    use pretty_assertions::assert_eq;

    const DDL: &str = indoc! {"
        CREATE TABLE `orders` (
          `id` int(11) NOT NULL,
          `owner_id` int(11) NOT NULL,
          `org_id` int(11) NOT NULL,
          `last_name` varchar(60) NOT NULL,
          `first_name` varchar(60) NOT NULL,
          `body` text,
          PRIMARY KEY (`id`),
          UNIQUE KEY `uk_owner` (`owner_id`,`org_id`) COMMENT 'one per org',
          KEY `idx_name` (`last_name`(30) ASC,`first_name`),
          KEY `idx_hash` (`org_id`) USING HASH,
          FULLTEXT KEY `ft_body` (`body`),
          CONSTRAINT `fk_owner` FOREIGN KEY (`owner_id`) REFERENCES `users` (`id`),
          CONSTRAINT `fk_org` FOREIGN KEY (`org_id`) REFERENCES `other_schema`.`orgs` (`id`) ON DELETE CASCADE
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"};

    fn key<'a>(table: &'a ParsedTable, category: KeyCategory, name: &str) -> &'a KeyDef {
        &table.defs.key_category_map[&category][name]
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let table = parse_with(DDL, ParseOptions::default()).table;
        let categories: Vec<_> = table.defs.key_category_map.keys().copied().collect();
        assert_eq!(
            categories,
            vec![
                KeyCategory::PrimaryKey,
                KeyCategory::UniqueKey,
                KeyCategory::Key,
                KeyCategory::FullTextKey,
                KeyCategory::ForeignKey,
            ]
        );
        assert_eq!(table.defs.key_count(), 7);
    }

    #[test]
    fn test_index_column_length_and_order() {
        let table = parse_with(DDL, ParseOptions::default()).table;
        let idx = key(&table, KeyCategory::Key, "idx_name");
        assert_eq!(
            idx.cols,
            vec![
                KeyColumnRef {
                    id: None,
                    name: "last_name".into(),
                    length: Some(30),
                    order: Some(IndexOrder::Asc),
                },
                KeyColumnRef::named("first_name"),
            ]
        );

        let json = serde_json::to_value(&idx.cols).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "name": "last_name", "length": 30, "order": "ASC" },
                { "name": "first_name" }
            ])
        );
    }

    #[test]
    fn test_key_comment_and_using() {
        let table = parse_with(DDL, ParseOptions::default()).table;
        let uk = key(&table, KeyCategory::UniqueKey, "uk_owner");
        assert_eq!(uk.name.as_deref(), Some("uk_owner"));
        assert_eq!(uk.comment.as_deref(), Some("one per org"));
        assert_eq!(uk.col_names().collect::<Vec<_>>(), vec!["owner_id", "org_id"]);
        assert_eq!(
            key(&table, KeyCategory::Key, "idx_hash").using.as_deref(),
            Some("HASH")
        );
    }

    #[test]
    fn test_foreign_key_schema_defaulting() {
        let table = parse_with(DDL, ParseOptions::default()).table;

        let owner = key(&table, KeyCategory::ForeignKey, "fk_owner");
        let reference = owner.foreign.as_ref().unwrap();
        assert_eq!(reference.ref_schema_name, "app_db");
        assert_eq!(reference.ref_tbl_name, "users");
        assert_eq!(reference.ref_cols, vec![KeyColumnRef::named("id")]);

        let org = key(&table, KeyCategory::ForeignKey, "fk_org");
        let reference = org.foreign.as_ref().unwrap();
        assert_eq!(reference.ref_schema_name, "other_schema");
        assert_eq!(reference.ref_tbl_name, "orgs");
    }

    #[test]
    fn test_referential_action_defaulting() {
        let table = parse_with(DDL, ParseOptions::default()).table;

        let owner = key(&table, KeyCategory::ForeignKey, "fk_owner");
        let reference = owner.foreign.as_ref().unwrap();
        assert_eq!(reference.on_delete, ReferentialAction::NoAction);
        assert_eq!(reference.on_update, ReferentialAction::NoAction);

        let org = key(&table, KeyCategory::ForeignKey, "fk_org");
        let reference = org.foreign.as_ref().unwrap();
        assert_eq!(reference.on_delete, ReferentialAction::Cascade);
        assert_eq!(reference.on_update, ReferentialAction::NoAction);
    }

    #[test]
    fn test_all_actions() {
        let ddl = indoc! {"
            CREATE TABLE `c` (
              `p` int(11) DEFAULT NULL,
              CONSTRAINT `fk` FOREIGN KEY (`p`) REFERENCES `p` (`id`) ON DELETE SET NULL ON UPDATE RESTRICT
            )"};
        let table = parse(ddl).table;
        let (_, fk) = table.foreign_keys().next().unwrap();
        let reference = fk.foreign.as_ref().unwrap();
        assert_eq!(reference.on_delete, ReferentialAction::SetNull);
        assert_eq!(reference.on_update, ReferentialAction::Restrict);
    }

    #[test]
    fn test_only_foreign_keys_carry_a_reference() {
        let table = parse_with(DDL, ParseOptions::default()).table;
        for (category, keys) in &table.defs.key_category_map {
            for key in keys.values() {
                assert_eq!(key.is_foreign(), *category == KeyCategory::ForeignKey);
            }
        }
        assert!(table.validate().is_empty());
    }

    #[test]
    fn test_unnamed_keys_get_natural_names() {
        let ddl = indoc! {"
            CREATE TABLE `t` (
              `a` int(11) NOT NULL,
              `b` int(11) NOT NULL,
              PRIMARY KEY (`a`),
              UNIQUE KEY (`a`,`b`),
              UNIQUE INDEX (`a`,`b`)
            )"};
        let table = parse(ddl).table;
        let unique: Vec<_> = table
            .keys(KeyCategory::UniqueKey)
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(unique, vec!["a_b_UNIQUE_KEY", "a_b_UNIQUE_KEY_2"]);
    }
}

// ============================================================================
// Ids
// ============================================================================

mod ids {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_ids() -> ParseOptions {
        ParseOptions {
            auto_gen_id: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parsing_without_ids_is_deterministic() {
        assert_eq!(parse(T1), parse(T1));
    }

    #[test]
    fn test_generated_ids_are_map_keys() {
        let table = parse_with(T1, with_ids()).table;
        assert!(table.id.is_some());
        for (key, col) in &table.defs.col_map {
            assert_eq!(col.id.as_deref(), Some(key.as_str()));
            assert!(Uuid::parse_str(key).is_ok());
        }
        for keys in table.defs.key_category_map.values() {
            for (id, key) in keys {
                assert_eq!(key.id.as_deref(), Some(id.as_str()));
            }
        }
    }

    #[test]
    fn test_generated_ids_differ_between_calls() {
        let first = parse_with(T1, with_ids()).table;
        let second = parse_with(T1, with_ids()).table;
        assert_ne!(first.id, second.id);
        assert_ne!(
            first.defs.col_map.keys().collect::<Vec<_>>(),
            second.defs.col_map.keys().collect::<Vec<_>>()
        );
        assert_eq!(first.options, second.options);
    }
}

// ============================================================================
// Comments and warnings
// ============================================================================

#[test]
fn test_table_and_column_comments_stay_separate() {
    let ddl = indoc! {"
        CREATE TABLE `t` (
          `a` int(11) NOT NULL COMMENT 'column note',
          `b` int(11) DEFAULT NULL,
          KEY `k` (`a`) COMMENT 'key note'
        ) ENGINE=InnoDB COMMENT='table note'"};
    let table = parse(ddl).table;
    assert_eq!(table.options.comment.as_deref(), Some("table note"));
    assert_eq!(table.defs.col_map["a"].comment.as_deref(), Some("column note"));
    assert_eq!(table.defs.col_map["b"].comment, None);
    let (_, k) = table.keys(KeyCategory::Key).next().unwrap();
    assert_eq!(k.comment.as_deref(), Some("key note"));
}

#[test]
fn test_unrecognized_definitions_become_warnings() {
    let ddl = indoc! {"
        CREATE TABLE `t` (
          `a` int(11) NOT NULL,
          `b` int(11) NOT NULL WHATEVER,
          CONSTRAINT `chk` CHECK (`a` > 0)
        )"};
    let output = parse(ddl);
    assert!(!output.is_complete());
    assert_eq!(output.table.defs.col_map.len(), 1);
    assert_eq!(
        output.warnings,
        vec![
            ParseWarning::UnparsedLine {
                index: 1,
                text: "`b` int(11) NOT NULL WHATEVER".into(),
            },
            ParseWarning::UnparsedLine {
                index: 2,
                text: "CONSTRAINT `chk` CHECK (`a` > 0)".into(),
            },
        ]
    );
    assert_eq!(
        output.warnings[0].to_string(),
        "definition #1 was not recognized: `b` int(11) NOT NULL WHATEVER"
    );
}

#[test]
fn test_warning_json_is_tagged() {
    let warning = ParseWarning::UnparsedLine {
        index: 3,
        text: "x".into(),
    };
    assert_eq!(
        serde_json::to_value(&warning).unwrap(),
        serde_json::json!({ "kind": "unparsed_line", "index": 3, "text": "x" })
    );
}

#[test]
fn test_parse_all() {
    let ddls = [T1, "CREATE TABLE `t2` (`x` int(11))"];
    let parser = TableParser::default();
    let outputs = parser.parse_all(ddls, "test").unwrap();
    let names: Vec<_> = outputs.iter().map(|o| o.table.options.name.as_str()).collect();
    assert_eq!(names, vec!["t1", "t2"]);

    assert!(parser.parse_all([T1, "nope"], "test").is_err());
}

#[test]
fn test_parse_options_from_json() {
    let options: ParseOptions = serde_json::from_str(r#"{ "auto_gen_id": true }"#).unwrap();
    assert!(options.auto_gen_id);
    assert!(options.skip_col_charset_if_equal);
    assert!(TableParser::new(options).options().auto_gen_id);
}
