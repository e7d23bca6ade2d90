use std::collections::BTreeMap;

use tracing::debug;

use crate::defines::Defines;
use crate::scan::Cursor;

/// Substituted for a `ui_min` that is neither a literal nor a known define.
pub const DEFAULT_UI_MIN: &str = "0";
/// Substituted for a `ui_max` that is neither a literal nor a known define.
pub const DEFAULT_UI_MAX: &str = "100";

/// Extracts `key = value;` pairs from the body of a `< ... >` block.
///
/// Values may be quoted; a quoted value ends at the closing quote, an unquoted
/// one at `;` or the end of the line. Pairs that do not fit the shape are
/// skipped and a repeated key keeps its last value.
pub fn parse_annotations(block: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let mut cursor = Cursor::at(block, 0);

    while !cursor.is_done() {
        let start = cursor.pos;
        match parse_pair(&mut cursor) {
            Some((key, value)) => {
                metadata.insert(key.to_string(), value);
            }
            None => {
                cursor.pos = start;
                if cursor.word().is_none() {
                    cursor.advance();
                }
            }
        }
    }

    metadata
}

fn parse_pair<'a>(cursor: &mut Cursor<'a>) -> Option<(&'a str, String)> {
    let key = cursor.word()?;
    cursor.skip_whitespace();
    if !cursor.eat(b'=') {
        return None;
    }
    cursor.skip_whitespace();
    let quoted = cursor.eat(b'"');
    let raw = cursor.take_while(|byte| !matches!(byte, b';' | b'\n' | b'"'))?;
    cursor.eat(b'"');
    cursor.eat(b';');

    let value = if quoted { raw } else { raw.trim_end() };
    Some((key, value.to_string()))
}

/// Replaces symbolic `ui_min`/`ui_max` values with their `#define` value, or
/// with the fixed fallback when the symbol is unknown.
pub(crate) fn resolve_range_bounds(metadata: &mut BTreeMap<String, String>, defines: &Defines) {
    for (key, fallback) in [("ui_min", DEFAULT_UI_MIN), ("ui_max", DEFAULT_UI_MAX)] {
        let Some(value) = metadata.get_mut(key) else {
            continue;
        };
        if is_numeric_literal(value) {
            continue;
        }
        *value = match defines.get(value.as_str()) {
            Some(resolved) => resolved.clone(),
            None => {
                debug!(key, symbol = %value, fallback, "unresolved range bound");
                fallback.to_string()
            }
        };
    }
}

fn is_numeric_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(unsigned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_values() {
        let meta = parse_annotations(
            "\n    ui_type = \"slider\";\n    ui_min = 0.0 ; ui_max=1.0;\n    ui_label = \"Bloom Strength\";\n",
        );
        assert_eq!(meta.get("ui_type").map(String::as_str), Some("slider"));
        assert_eq!(meta.get("ui_min").map(String::as_str), Some("0.0"));
        assert_eq!(meta.get("ui_max").map(String::as_str), Some("1.0"));
        assert_eq!(
            meta.get("ui_label").map(String::as_str),
            Some("Bloom Strength")
        );
    }

    #[test]
    fn last_duplicate_key_wins() {
        let meta = parse_annotations("ui_label = \"First\"; ui_label = \"Second\";");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("ui_label").map(String::as_str), Some("Second"));
    }

    #[test]
    fn value_may_follow_a_line_break() {
        let meta = parse_annotations("ui_tooltip =\n    \"Radius in pixels\";");
        assert_eq!(
            meta.get("ui_tooltip").map(String::as_str),
            Some("Radius in pixels")
        );
    }

    #[test]
    fn skips_fragments_without_values() {
        let meta = parse_annotations("hidden; ui_label = \"\"; ui_step = 0.1");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("ui_step").map(String::as_str), Some("0.1"));
    }

    #[test]
    fn recognizes_numeric_literals() {
        assert!(is_numeric_literal("0"));
        assert!(is_numeric_literal("-12.5"));
        assert!(!is_numeric_literal("1."));
        assert!(!is_numeric_literal(".5"));
        assert!(!is_numeric_literal("1e3"));
        assert!(!is_numeric_literal("MAX"));
    }

    #[test]
    fn resolves_only_range_bounds() {
        let mut defines = Defines::new();
        defines.insert("LIMIT".into(), "4".into());
        let mut meta = parse_annotations("ui_min = -LIMIT; ui_max = LIMIT; ui_step = LIMIT;");
        resolve_range_bounds(&mut meta, &defines);
        assert_eq!(meta.get("ui_min").map(String::as_str), Some("0"));
        assert_eq!(meta.get("ui_max").map(String::as_str), Some("4"));
        assert_eq!(meta.get("ui_step").map(String::as_str), Some("LIMIT"));
    }
}
