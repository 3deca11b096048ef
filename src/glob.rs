//! Glob to regex translation.
//!
//! | glob      | regex      |
//! |-----------|------------|
//! | `*`       | `.*`       |
//! | `?`       | `.`        |
//! | `[...]`   | `[...]` (verbatim) |
//! | `{a,b,c}` | `(a|b|c)`  |
//!
//! Any other regex metacharacter in a literal run is escaped. Translation never
//! fails; a malformed glob such as an unclosed `[` or `{` produces a regex that
//! fails later, when it is compiled.

/// Translates `glob` into regex source. The result is unanchored.
pub fn to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    let mut chars = glob.chars().peekable();
    let mut brace_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // Copy the bracket expression through its closing `]`. A `]`
                // right after `[` or `[^` is part of the set.
                out.push('[');
                if let Some(&neg) = chars.peek() {
                    if neg == '^' || neg == '!' {
                        out.push(neg);
                        chars.next();
                    }
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            '{' => {
                brace_depth += 1;
                out.push('(');
            }
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            ',' if brace_depth > 0 => out.push('|'),
            c if is_regex_meta(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn is_regex_meta(c: char) -> bool {
    matches!(c, '\\' | '.' | '+' | '(' | ')' | '|' | '^' | '$' | ']' | '}')
}
