//! SQL dump splitting

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker drizzle-style migration files put between statements
pub const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";

static CREATE_SCHEMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bcreate\s+schema\s+(?:if\s+not\s+exists\s+)?(?:"([^"]+)"|([A-Za-z_][A-Za-z0-9_$]*))"#)
        .expect("valid regex")
});

/// Dollar-quote opening tag (`$$` or `$tag$`) at the start of `rest`
fn dollar_tag(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix('$')?;
    let end = body.find('$')?;
    let tag = &body[..end];
    let valid = tag
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    valid.then(|| &rest[..end + 2])
}

/// Split a dump into individual statements.
///
/// Semicolons inside quotes, dollar-quoted bodies and comments do not end a
/// statement. Statements that hold nothing but comments are dropped.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut pos = 0;

    let mut flush = |current: &mut String, has_code: &mut bool| {
        if *has_code {
            statements.push(current.trim().to_string());
        }
        current.clear();
        *has_code = false;
    };

    while pos < sql.len() {
        let rest = &sql[pos..];

        if rest.starts_with(STATEMENT_BREAKPOINT) {
            let len = rest.find('\n').unwrap_or(rest.len());
            flush(&mut current, &mut has_code);
            pos += len;
            continue;
        }

        if rest.starts_with("--") {
            let len = rest.find('\n').unwrap_or(rest.len());
            current.push_str(&rest[..len]);
            pos += len;
            continue;
        }

        if rest.starts_with("/*") {
            // block comments nest in PostgreSQL
            let mut depth = 0;
            let mut len = 0;
            while len < rest.len() {
                let tail = &rest[len..];
                if tail.starts_with("/*") {
                    depth += 1;
                    len += 2;
                } else if tail.starts_with("*/") {
                    depth -= 1;
                    len += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    len += tail.chars().next().map_or(1, char::len_utf8);
                }
            }
            current.push_str(&rest[..len]);
            pos += len;
            continue;
        }

        if let Some(tag) = dollar_tag(rest) {
            let body_start = tag.len();
            let len = rest[body_start..]
                .find(tag)
                .map_or(rest.len(), |i| body_start + i + tag.len());
            current.push_str(&rest[..len]);
            has_code = true;
            pos += len;
            continue;
        }

        let Some(c) = rest.chars().next() else { break };

        if c == '\'' || c == '"' {
            // a doubled quote re-enters the literal on the next iteration
            let len = rest[1..].find(c).map_or(rest.len(), |i| i + 2);
            current.push_str(&rest[..len]);
            has_code = true;
            pos += len;
            continue;
        }

        if c == ';' {
            flush(&mut current, &mut has_code);
            pos += 1;
            continue;
        }

        if !c.is_whitespace() {
            has_code = true;
        }
        current.push(c);
        pos += c.len_utf8();
    }
    flush(&mut current, &mut has_code);

    statements
}

/// Schemas a dump creates, `public` first, in order of appearance
pub fn schema_names_from_sql(sql: &str) -> Vec<String> {
    let mut names = vec!["public".to_string()];
    for caps in CREATE_SCHEMA.captures_iter(sql) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            let name = name.as_str().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_simple_statements() {
        let statements = split_sql_statements("CREATE TABLE a (id int);\n\nCREATE TABLE b (id int);\n");
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (id int)", "CREATE TABLE b (id int)"]
        );
    }

    #[test]
    fn test_semicolons_in_literals_and_identifiers() {
        let sql = r#"INSERT INTO t VALUES ('a;b', 'it''s;'); CREATE TABLE "x;y" (id int);"#;
        let statements = split_sql_statements(sql);

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "INSERT INTO t VALUES ('a;b', 'it''s;')");
        assert_eq!(statements[1], r#"CREATE TABLE "x;y" (id int)"#);
    }

    #[test]
    fn test_dollar_quoted_bodies() {
        let sql = "CREATE FUNCTION f() RETURNS int AS $body$ SELECT 1; $body$ LANGUAGE sql;\nSELECT $$a;b$$;";
        let statements = split_sql_statements(sql);

        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("LANGUAGE sql"));
        assert_eq!(statements[1], "SELECT $$a;b$$");
    }

    #[test]
    fn test_comments() {
        let sql = "-- leading; comment\nCREATE TABLE a (id int); /* block; /* nested; */ */\n-- trailing only\n";
        let statements = split_sql_statements(sql);

        assert_eq!(statements, vec!["-- leading; comment\nCREATE TABLE a (id int)"]);
    }

    #[test]
    fn test_statement_breakpoints() {
        let sql = "CREATE TABLE a (id int);--> statement-breakpoint\nCREATE TABLE b (id int)\n--> statement-breakpoint\nCREATE INDEX i ON b (id);";
        let statements = split_sql_statements(sql);

        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (id int)",
                "CREATE TABLE b (id int)",
                "CREATE INDEX i ON b (id)",
            ]
        );
    }

    #[test]
    fn test_positional_parameters_are_not_dollar_quotes() {
        let statements = split_sql_statements("PREPARE p AS SELECT $1; SELECT 2;");
        assert_eq!(statements, vec!["PREPARE p AS SELECT $1", "SELECT 2"]);
    }

    #[test]
    fn test_schema_names() {
        let sql = r#"
            CREATE SCHEMA "audit";
            create schema if not exists billing;
            CREATE SCHEMA audit;
        "#;
        assert_eq!(schema_names_from_sql(sql), vec!["public", "audit", "billing"]);
    }
}
