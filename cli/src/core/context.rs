//! # Dunder Token Context
//!
//! File: cli/src/core/context.rs
//!
//! ## Overview
//!
//! Builds the `TokenMap` used by every rewrite from three sources, applied in
//! order so that later sources win:
//!
//! 1. Standard dunders derived from the `[project]` metadata and the date
//! 2. The `[dunders]` table of the configuration
//! 3. `--var KEY=VALUE` pairs from the command line
//!
//! | Token            | Value                                   |
//! |------------------|-----------------------------------------|
//! | `__NAME__`       | project name as written                 |
//! | `__NAME_SMALL__` | snake_case name (Python package name)   |
//! | `__NAME_BIG__`   | PascalCase name                         |
//! | `__NAME_UPPER__` | SCREAMING_SNAKE_CASE name               |
//! | `__VERSION__`    | version                                 |
//! | `__DESC__`       | description                             |
//! | `__KEYWORDS__`   | keywords joined with `, `               |
//! | `__AUTHOR__`     | author                                  |
//! | `__EMAIL__`      | email                                   |
//! | `__LICENSE__`    | license                                 |
//! | `__DATE__`       | today, `YYYY-MM-DD`                     |
//! | `__YEAR__`       | current year                            |
//!
//! Metadata fields that are empty are left out, so their tokens stay in the
//! tree untouched instead of being erased.
//!
use crate::core::error::Result;
use crate::core::metadata::ProjectMeta;
use crate::core::tokens::{wrap_key, TokenMap};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Builds the token map for today's date.
pub fn build_token_map(
    meta: &ProjectMeta,
    dunders: &BTreeMap<String, String>,
    vars: &[(String, String)],
) -> Result<TokenMap> {
    build_token_map_on(meta, dunders, vars, chrono::Local::now().date_naive())
}

pub fn build_token_map_on(
    meta: &ProjectMeta,
    dunders: &BTreeMap<String, String>,
    vars: &[(String, String)],
    today: NaiveDate,
) -> Result<TokenMap> {
    let name = meta.name.as_str();
    let standard = [
        ("__NAME__", name.to_string()),
        ("__NAME_SMALL__", to_snake_case(name)),
        ("__NAME_BIG__", to_pascal_case(name)),
        ("__NAME_UPPER__", to_snake_case(name).to_uppercase()),
        ("__VERSION__", meta.version.clone()),
        ("__DESC__", meta.description.clone()),
        ("__KEYWORDS__", meta.keywords.join(", ")),
        ("__AUTHOR__", meta.author.clone()),
        ("__EMAIL__", meta.email.clone()),
        ("__LICENSE__", meta.license.clone()),
    ];
    let mut tokens = TokenMap::from_pairs(standard.into_iter().filter(|(key, value)| {
        if value.is_empty() {
            debug!("No value for {}, leaving it in place", key);
        }
        !value.is_empty()
    }))?;
    tokens.insert("__DATE__", today.format("%Y-%m-%d").to_string())?;
    tokens.insert("__YEAR__", today.format("%Y").to_string())?;

    for (key, value) in dunders {
        tokens.insert(wrap_key(key), value.as_str())?;
    }
    for (key, value) in vars {
        debug!("Applying --var override {}={}", key, value);
        tokens.insert(wrap_key(key), value.as_str())?;
    }
    debug!("Token map has {} entries", tokens.len());
    for (key, value) in tokens.iter() {
        trace!("{} = {:?}", key, value);
    }
    Ok(tokens)
}

/// Converts a project name to a Python-friendly snake_case identifier.
/// Hyphens, dots and spaces become underscores; case boundaries are not split.
pub fn to_snake_case(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Converts a kebab-case or snake_case string to PascalCase.
pub fn to_pascal_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut capitalize_next = true;

    for c in input.trim().chars() {
        if matches!(c, '-' | '_' | '.' | ' ') {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_snake_case("my-project"), "my_project");
        assert_eq!(to_snake_case("My Project.io"), "my_project_io");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case(""), "");

        assert_eq!(to_pascal_case("my-project"), "MyProject");
        assert_eq!(to_pascal_case("awesome_api-service"), "AwesomeApiService");
        assert_eq!(to_pascal_case("alreadyCamel"), "AlreadyCamel");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_standard_tokens() {
        let meta = ProjectMeta {
            name: "my-tool".into(),
            version: "1.0.0".into(),
            keywords: vec!["a".into(), "b".into()],
            author: "Ada".into(),
            ..Default::default()
        };
        let tokens = build_token_map_on(&meta, &BTreeMap::new(), &[], date()).unwrap();
        assert_eq!(tokens.get("__NAME__"), Some("my-tool"));
        assert_eq!(tokens.get("__NAME_SMALL__"), Some("my_tool"));
        assert_eq!(tokens.get("__NAME_BIG__"), Some("MyTool"));
        assert_eq!(tokens.get("__NAME_UPPER__"), Some("MY_TOOL"));
        assert_eq!(tokens.get("__KEYWORDS__"), Some("a, b"));
        assert_eq!(tokens.get("__DATE__"), Some("2024-03-09"));
        assert_eq!(tokens.get("__YEAR__"), Some("2024"));
        // Empty metadata is left out.
        assert!(!tokens.contains_key("__DESC__"));
        assert!(!tokens.contains_key("__LICENSE__"));
    }

    #[test]
    fn test_later_sources_win() {
        let meta = ProjectMeta {
            name: "base".into(),
            ..Default::default()
        };
        let mut dunders = BTreeMap::new();
        dunders.insert("__ORG__".to_string(), "Acme".to_string());
        dunders.insert("NAME".to_string(), "from-config".to_string());
        let vars = vec![("ORG".to_string(), "Initech".to_string())];

        let tokens = build_token_map_on(&meta, &dunders, &vars, date()).unwrap();
        assert_eq!(tokens.get("__NAME__"), Some("from-config"));
        assert_eq!(tokens.get("__ORG__"), Some("Initech"));
        assert_eq!(tokens.substitute("__NAME_SMALL__/__NAME__"), "base/from-config");
    }
}
