//! `Cookie` header parsing.
//!
//! The header is split on `;`, each entry on its first `=`. Names are
//! trimmed, values percent-decoded. Entries without `=`, with an empty name,
//! or whose value does not decode to UTF-8 are skipped. When a name repeats,
//! the later entry wins.

use std::collections::HashMap;

/// Parse a raw `Cookie` header into a name to value map.
#[must_use]
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    raw.split(';').filter_map(parse_entry).collect()
}

/// Look up a single cookie in a raw `Cookie` header.
#[must_use]
pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    parse_cookie_header(raw).remove(name)
}

fn parse_entry(entry: &str) -> Option<(String, String)> {
    let (name, value) = entry.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    match urlencoding::decode(value) {
        Ok(decoded) => Some((name.to_owned(), decoded.into_owned())),
        Err(err) => {
            tracing::trace!(cookie = name, error = %err, "skipping undecodable cookie value");
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_entries() {
        let map = parse_cookie_header("a=1; session=changeMe; b=2");
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], "1");
        assert_eq!(map["session"], "changeMe");
        assert_eq!(map["b"], "2");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let map = parse_cookie_header("session=abc=def==");
        assert_eq!(map["session"], "abc=def==");
    }

    #[test]
    fn percent_decodes_values() {
        let map = parse_cookie_header("session=change%20me%21; other=a%3Bb");
        assert_eq!(map["session"], "change me!");
        assert_eq!(map["other"], "a;b");
    }

    #[test]
    fn skips_entries_without_equals() {
        let map = parse_cookie_header("flag; session=x;;  ");
        assert_eq!(map.len(), 1);
        assert_eq!(map["session"], "x");
    }

    #[test]
    fn skips_values_that_are_not_utf8() {
        let map = parse_cookie_header("bad=%FF%FE; session=ok");
        assert!(!map.contains_key("bad"));
        assert_eq!(map["session"], "ok");
    }

    #[test]
    fn empty_header_yields_empty_map() {
        assert!(parse_cookie_header("").is_empty());
        assert!(parse_cookie_header("=value").is_empty());
    }

    #[test]
    fn later_duplicate_wins() {
        assert_eq!(
            cookie_value("session=first; session=second", "session").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn names_are_trimmed_values_are_not() {
        let map = parse_cookie_header("  session =value ");
        assert_eq!(map["session"], "value ");
    }
}
