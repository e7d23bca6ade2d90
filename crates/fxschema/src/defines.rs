use std::collections::BTreeMap;

use crate::scan::Cursor;

/// `#define` name to numeric literal text.
pub type Defines = BTreeMap<String, String>;

const DEFINE_DIRECTIVE: &str = "#define";

/// Collects `#define NAME NUMBER` constants. The tokens may be separated by any
/// whitespace, line breaks included. Only the leading run of digits and dots
/// counts as the value, so `#define MAX 2.0f` records `2.0`. Directives without
/// a numeric value are ignored and later definitions win.
pub fn collect_defines(source: &str) -> Defines {
    let mut defines = Defines::new();
    let mut from = 0;

    while let Some(found) = source.get(from..).and_then(|rest| rest.find(DEFINE_DIRECTIVE)) {
        let after_directive = from + found + DEFINE_DIRECTIVE.len();
        let mut cursor = Cursor::at(source, after_directive);
        if let Some((name, value)) = parse_define(&mut cursor) {
            defines.insert(name.to_string(), value.to_string());
        }
        from = cursor.pos.max(after_directive);
    }

    defines
}

fn parse_define<'a>(cursor: &mut Cursor<'a>) -> Option<(&'a str, &'a str)> {
    if cursor.skip_whitespace() == 0 {
        return None;
    }
    let name = cursor.word()?;
    if cursor.skip_whitespace() == 0 {
        return None;
    }
    let value = cursor.take_while(|byte| byte.is_ascii_digit() || byte == b'.')?;
    Some((name, value))
}
