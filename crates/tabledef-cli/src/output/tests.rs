use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use tabledef_parser::parse_create_table;

const USERS: &str = indoc! {"
    CREATE TABLE `users` (
      `id` int(11) NOT NULL AUTO_INCREMENT,
      `email` varchar(100) NOT NULL COMMENT 'login',
      `team_id` int(11) DEFAULT NULL,
      PRIMARY KEY (`id`),
      CONSTRAINT `fk_team` FOREIGN KEY (`team_id`) REFERENCES `teams` (`id`) ON DELETE SET NULL
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"};

const TEAMS: &str = "CREATE TABLE `teams` (`id` int(11) NOT NULL, PRIMARY KEY (`id`))";

fn outputs(ddls: &[&str]) -> Vec<ParseOutput> {
    ddls.iter()
        .map(|ddl| parse_create_table(ddl, "app").unwrap())
        .collect()
}

#[test]
fn test_json_single_object() {
    let rendered = render(&outputs(&[TEAMS]), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["table"]["options"]["name"], "teams");
    assert_eq!(value["warnings"], serde_json::json!([]));
}

#[test]
fn test_json_array_for_many() {
    let rendered = render(&outputs(&[USERS, TEAMS]), OutputFormat::Json).unwrap();
    let value: Vec<ParseOutput> = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value, outputs(&[USERS, TEAMS]));
}

#[test]
fn test_sql_creates_schema_once() {
    let rendered = render(&outputs(&[USERS, TEAMS]), OutputFormat::Sql).unwrap();
    assert_eq!(rendered.matches("CREATE SCHEMA IF NOT EXISTS `app`;").count(), 1);
    assert!(rendered.contains("CREATE TABLE `app`.`users` ("));
    assert!(rendered.contains("CREATE TABLE `app`.`teams` ("));
}

#[test]
fn test_table_lists_columns_and_keys() {
    let rendered = render(&outputs(&[USERS]), OutputFormat::Table).unwrap();
    assert!(rendered.starts_with("`app`.`users`\n"));
    for expected in [
        "email",
        "VARCHAR(100)",
        "login",
        "AUTO_INCREMENT",
        "utf8mb4",
        "PRIMARY KEY",
        "fk_team",
        "app.teams (id) ON DELETE SET NULL ON UPDATE NO ACTION",
    ] {
        assert!(rendered.contains(expected), "missing {expected}:\n{rendered}");
    }
}

#[test]
fn test_format_names() {
    assert_eq!(
        serde_json::to_string(&OutputFormat::Table).unwrap(),
        "\"table\""
    );
    assert_eq!(
        OutputFormat::from_str("sql", true).unwrap(),
        OutputFormat::Sql
    );
}
