//! Query-string parsing with nested-object and array notation.
//!
//! `a[b]=1` produces `{"a": {"b": "1"}}`, and `a[]=1&a[]=2` produces
//! `{"a": ["1", "2"]}`. Pair splitting and percent-decoding are delegated to
//! `serde_urlencoded`; the bracket-path expansion happens here. All leaf
//! values are strings.

use serde_json::{Map, Value};

use crate::error::Error;

/// Parse a URL query string. Unparsable input yields an empty map, never an
/// error.
pub(crate) fn parse(input: &str) -> Map<String, Value> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(input) {
        Ok(pairs) => pairs,
        Err(_) => return Map::new(),
    };

    build(pairs)
}

/// Parse a form-urlencoded entity body. Unlike the query string, a malformed
/// body is a client error.
pub(crate) fn parse_form(input: &str) -> Result<Map<String, Value>, Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)
        .map_err(|err| Error::bad_request(format!("invalid form body: {}", err)))?;

    Ok(build(pairs))
}

fn build(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut root = Value::Object(Map::new());

    for (key, value) in pairs {
        let parts = split_key(&key);
        insert(&mut root, &parts, value);
    }

    match root {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

enum Part {
    Key(String),
    Push,
}

/// Split `a[b][]` into its bracket path. A key with unbalanced brackets is
/// kept whole as a literal key.
fn split_key(raw: &str) -> Vec<Part> {
    let first = match raw.find('[') {
        Some(0) | None => return vec![Part::Key(raw.to_owned())],
        Some(i) => i,
    };

    let mut parts = vec![Part::Key(raw[..first].to_owned())];
    let mut rest = &raw[first..];

    while !rest.is_empty() {
        let close = match (rest.starts_with('['), rest.find(']')) {
            (true, Some(close)) => close,
            _ => return vec![Part::Key(raw.to_owned())],
        };

        let segment = &rest[1..close];
        parts.push(match segment {
            "" => Part::Push,
            key => Part::Key(key.to_owned()),
        });

        rest = &rest[close + 1..];
    }

    parts
}

fn insert(slot: &mut Value, parts: &[Part], value: String) {
    match parts.split_first() {
        None => *slot = Value::String(value),
        Some((Part::Key(key), rest)) => {
            if !matches!(slot, Value::Object(_)) {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(map) = slot {
                insert(map.entry(key.clone()).or_insert(Value::Null), rest, value);
            }
        }
        Some((Part::Push, rest)) => {
            if !matches!(slot, Value::Array(_)) {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                items.push(Value::Null);
                if let Some(last) = items.last_mut() {
                    insert(last, rest, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_pairs() {
        let map = parse("a=1&b=two");
        assert_eq!(Value::Object(map), json!({ "a": "1", "b": "two" }));
    }

    #[test]
    fn nested_objects() {
        let map = parse("a[b]=1&a[c][d]=2");
        assert_eq!(
            Value::Object(map),
            json!({ "a": { "b": "1", "c": { "d": "2" } } })
        );
    }

    #[test]
    fn array_notation() {
        let map = parse("a[]=1&a[]=2");
        assert_eq!(Value::Object(map), json!({ "a": ["1", "2"] }));
    }

    #[test]
    fn percent_decoding() {
        let map = parse("name=hello%20world");
        assert_eq!(Value::Object(map), json!({ "name": "hello world" }));
    }

    #[test]
    fn unbalanced_brackets_are_literal() {
        let map = parse("a%5Bb=1");
        assert_eq!(Value::Object(map), json!({ "a[b": "1" }));
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn later_pair_wins_on_conflict() {
        let map = parse("a=1&a[b]=2");
        assert_eq!(Value::Object(map), json!({ "a": { "b": "2" } }));
    }
}
