//! ASCII-only case folding used by every case-insensitive path.
//!
//! Only `'A'..='Z'` and `'a'..='z'` change; every other char, non-ASCII
//! letters included, passes through untouched. Case-insensitive glob and regex
//! patterns get the same folding by rewriting their regex source, see
//! [`fold_regex_source`].

use std::borrow::Cow;
use std::convert::Infallible;

use regex_syntax::ast::parse::Parser;
use regex_syntax::ast::{self, Ast, ClassAsciiKind, ClassSetItem, Span};

#[inline]
pub fn fold_char(c: char) -> char {
    c.to_ascii_lowercase()
}

/// Lower-cases ASCII letters, borrowing when nothing changes.
pub fn to_lower(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(s.to_ascii_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Upper-cases ASCII letters, borrowing when nothing changes.
pub fn to_upper(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_lowercase()) {
        Cow::Owned(s.to_ascii_uppercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Chars of `s`, folded when `fold` is set.
pub(crate) fn chars(s: &str, fold: bool) -> impl DoubleEndedIterator<Item = char> + Clone + '_ {
    s.chars().map(move |c| if fold { fold_char(c) } else { c })
}

/// The other ASCII case of `c`, if `c` is an ASCII letter.
#[inline]
fn swap_case(c: char) -> Option<char> {
    match c {
        'a'..='z' => Some(c.to_ascii_uppercase()),
        'A'..='Z' => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// Rewrites regex `source` so that a case-sensitive compile of the result
/// matches ASCII letters in either case and folds nothing else.
///
/// Letter literals become two-letter classes (`k` to `[kK]`) and bracket
/// classes gain the other case of their letter literals and ranges
/// (`[a-c_]` to `[a-cA-C_]`). A source that does not parse is returned as is,
/// so that compiling it reports the syntax error.
pub fn fold_regex_source(source: &str) -> Cow<'_, str> {
    let Ok(tree) = Parser::new().parse(source) else {
        return Cow::Borrowed(source);
    };
    let mut edits = match ast::visit(&tree, FoldEdits { source, edits: Vec::new() }) {
        Ok(edits) => edits,
        Err(never) => match never {},
    };
    if edits.is_empty() {
        return Cow::Borrowed(source);
    }

    edits.sort_by_key(|edit| edit.start);
    let mut out = String::with_capacity(source.len() + 4 * edits.len());
    let mut copied = 0;
    for edit in edits {
        out.push_str(&source[copied..edit.start]);
        out.push_str(&edit.text);
        copied = edit.end;
    }
    out.push_str(&source[copied..]);
    Cow::Owned(out)
}

/// Replaces `source[start..end]` with `text`. Insertions have `start == end`.
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

struct FoldEdits<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl FoldEdits<'_> {
    fn wrap(&mut self, span: &Span, other: char) {
        let (start, end) = (span.start.offset, span.end.offset);
        self.edits.push(Edit {
            start,
            end,
            text: format!("[{}{}]", &self.source[start..end], other),
        });
    }

    fn append(&mut self, span: &Span, text: String) {
        let at = span.end.offset;
        self.edits.push(Edit { start: at, end: at, text });
    }
}

impl ast::Visitor for FoldEdits<'_> {
    type Output = Vec<Edit>;
    type Err = Infallible;

    fn finish(self) -> Result<Vec<Edit>, Infallible> {
        Ok(self.edits)
    }

    fn visit_pre(&mut self, node: &Ast) -> Result<(), Infallible> {
        if let Ast::Literal(lit) = node {
            if let Some(other) = swap_case(lit.c) {
                self.wrap(&lit.span, other);
            }
        }
        Ok(())
    }

    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), Infallible> {
        match item {
            ClassSetItem::Literal(lit) => {
                if let Some(other) = swap_case(lit.c) {
                    self.append(&lit.span, other.to_string());
                }
            }
            ClassSetItem::Range(range) => {
                let (lo, hi) = (range.start.c, range.end.c);
                let mut extra = String::new();
                for (first, last) in [('a', 'z'), ('A', 'Z')] {
                    let (from, to) = (lo.max(first), hi.min(last));
                    if from <= to {
                        for c in [from, '-', to] {
                            extra.push(swap_case(c).unwrap_or(c));
                        }
                    }
                }
                if !extra.is_empty() {
                    self.append(&range.span, extra);
                }
            }
            ClassSetItem::Ascii(class) if !class.negated => {
                if matches!(class.kind, ClassAsciiKind::Upper | ClassAsciiKind::Lower) {
                    self.append(&class.span, "[:alpha:]".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }
}
