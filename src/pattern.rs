//! Single matching rules.
//!
//! A [`Pattern`] is an immutable `(kind, ignore_case, expression)` triple.
//! Literal, prefix and suffix patterns compare text directly; glob and regex
//! patterns compile their expression once, at construction, and that is the
//! only place a pattern can fail.
//!
//! ```rust
//! use trie_match::Pattern;
//!
//! let p = Pattern::glob("h?ello*.{c,h}", false)?;
//! assert!(p.matches("hqelloXXX.c"));
//! assert!(!p.matches("hello.c"));
//! # Ok::<(), trie_match::PatternError>(())
//! ```

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ascii;
use crate::error::{PatternError, Result};
use crate::glob;

/// How a pattern's expression is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Whole-string equality
    Literal,
    /// Starts-with
    Prefix,
    /// Ends-with
    Suffix,
    /// Shell-style wildcard, full match
    Glob,
    /// Regular expression, full match
    Regex,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Literal,
        PatternKind::Prefix,
        PatternKind::Suffix,
        PatternKind::Glob,
        PatternKind::Regex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Literal => "literal",
            PatternKind::Prefix => "prefix",
            PatternKind::Suffix => "suffix",
            PatternKind::Glob => "glob",
            PatternKind::Regex => "regex",
        }
    }

    /// Whether patterns of this kind compile to a regex.
    pub fn is_compiled(self) -> bool {
        matches!(self, PatternKind::Glob | PatternKind::Regex)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable matching rule.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternRepr", into = "PatternRepr")]
pub struct Pattern {
    kind: PatternKind,
    ignore_case: bool,
    expression: String,
    /// Anchored regex for glob and regex kinds.
    compiled: Option<Regex>,
}

impl Pattern {
    /// Builds a pattern, compiling glob and regex expressions.
    pub fn new(
        kind: PatternKind,
        expression: impl Into<String>,
        ignore_case: bool,
    ) -> Result<Self> {
        let expression = expression.into();
        let compiled = match kind {
            PatternKind::Glob => {
                let source = glob::to_regex(&expression);
                Some(compile(kind, &expression, &source, ignore_case)?)
            }
            PatternKind::Regex => Some(compile(kind, &expression, &expression, ignore_case)?),
            PatternKind::Literal | PatternKind::Prefix | PatternKind::Suffix => None,
        };
        Ok(Self {
            kind,
            ignore_case,
            expression,
            compiled,
        })
    }

    pub fn literal(expression: impl Into<String>, ignore_case: bool) -> Self {
        Self::uncompiled(PatternKind::Literal, expression.into(), ignore_case)
    }

    pub fn prefix(expression: impl Into<String>, ignore_case: bool) -> Self {
        Self::uncompiled(PatternKind::Prefix, expression.into(), ignore_case)
    }

    pub fn suffix(expression: impl Into<String>, ignore_case: bool) -> Self {
        Self::uncompiled(PatternKind::Suffix, expression.into(), ignore_case)
    }

    pub fn glob(expression: impl Into<String>, ignore_case: bool) -> Result<Self> {
        Self::new(PatternKind::Glob, expression, ignore_case)
    }

    pub fn regex(expression: impl Into<String>, ignore_case: bool) -> Result<Self> {
        Self::new(PatternKind::Regex, expression, ignore_case)
    }

    fn uncompiled(kind: PatternKind, expression: String, ignore_case: bool) -> Self {
        debug_assert!(!kind.is_compiled());
        Self {
            kind,
            ignore_case,
            expression,
            compiled: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    #[inline]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    #[inline]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether `s` satisfies this rule.
    pub fn matches(&self, s: &str) -> bool {
        let expr = self.expression.as_bytes();
        let text = s.as_bytes();
        match self.kind {
            PatternKind::Literal => bytes_eq(text, expr, self.ignore_case),
            PatternKind::Prefix => {
                text.len() >= expr.len() && bytes_eq(&text[..expr.len()], expr, self.ignore_case)
            }
            PatternKind::Suffix => {
                text.len() >= expr.len()
                    && bytes_eq(&text[text.len() - expr.len()..], expr, self.ignore_case)
            }
            PatternKind::Glob | PatternKind::Regex => {
                self.compiled.as_ref().is_some_and(|re| re.is_match(s))
            }
        }
    }
}

#[inline]
fn bytes_eq(a: &[u8], b: &[u8], ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Compiles `source` anchored at both ends. Case is always matched exactly
/// by the regex engine; ignore-case folding is spelled out in the source.
fn compile(kind: PatternKind, expression: &str, source: &str, ignore_case: bool) -> Result<Regex> {
    let source = if ignore_case {
        ascii::fold_regex_source(source)
    } else {
        Cow::Borrowed(source)
    };
    Regex::new(&format!(r"\A(?:{source})\z"))
        .map_err(|source| {
            tracing::debug!(%kind, expression, error = %source, "pattern failed to compile");
            PatternError::Syntax {
                kind,
                expression: expression.to_string(),
                source,
            }
        })
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.ignore_case == other.ignore_case
            && self.expression == other.expression
    }
}

impl Eq for Pattern {}

impl std::hash::Hash for Pattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.ignore_case.hash(state);
        self.expression.hash(state);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("kind", &self.kind)
            .field("ignore_case", &self.ignore_case)
            .field("expression", &self.expression)
            .finish()
    }
}

/// `kind:expression`, with `/i` after the kind when case-insensitive.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.ignore_case { "/i" } else { "" };
        write!(f, "{}{}:{}", self.kind, flag, self.expression)
    }
}

/// Plain form used for (de)serialization.
#[derive(Serialize, Deserialize)]
struct PatternRepr {
    kind: PatternKind,
    #[serde(default)]
    ignore_case: bool,
    expression: String,
}

impl TryFrom<PatternRepr> for Pattern {
    type Error = PatternError;

    fn try_from(repr: PatternRepr) -> Result<Self> {
        Pattern::new(repr.kind, repr.expression, repr.ignore_case)
    }
}

impl From<Pattern> for PatternRepr {
    fn from(p: Pattern) -> Self {
        PatternRepr {
            kind: p.kind,
            ignore_case: p.ignore_case,
            expression: p.expression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal() {
        let cs = Pattern::literal("Tag", false);
        assert!(cs.matches("Tag"));
        assert!(!cs.matches("tag"));
        assert!(!cs.matches("Tags"));

        let ci = Pattern::literal("Tag", true);
        assert!(ci.matches("tAG"));
        assert!(!ci.matches("tAGs"));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let p = Pattern::prefix("data-", false);
        assert!(p.matches("data-id"));
        assert!(p.matches("data-"));
        assert!(!p.matches("DATA-id"));
        assert!(!p.matches("data"));
        assert!(Pattern::prefix("data-", true).matches("DATA-id"));

        let s = Pattern::suffix(".RS", true);
        assert!(s.matches("main.rs"));
        assert!(!s.matches("rs"));
        assert!(!Pattern::suffix(".RS", false).matches("main.rs"));
    }

    #[test]
    fn test_empty_expressions() {
        assert!(Pattern::prefix("", false).matches("anything"));
        assert!(Pattern::suffix("", false).matches(""));
        assert!(Pattern::literal("", false).matches(""));
        assert!(!Pattern::literal("", false).matches("x"));
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let p = Pattern::literal("école", true);
        assert!(p.matches("éCOLE"));
        assert!(!p.matches("ÉCOLE"));
    }

    #[test]
    fn test_non_ascii_suffix_boundary() {
        let p = Pattern::suffix("é", false);
        assert!(p.matches("café"));
        assert!(!p.matches("cafe"));
    }

    #[test]
    fn test_glob_full_match() {
        let p = Pattern::glob("h?ello*.{c,h}", false).unwrap();
        assert!(p.matches("hqelloXXX.c"));
        assert!(p.matches("hxello.h"));
        assert!(!p.matches("hello.c"));
        assert!(!p.matches("hqelloXXX.cpp"));
        assert!(!p.matches("xhqello.c"));
    }

    #[test]
    fn test_glob_ignore_case() {
        let p = Pattern::glob("*.JAVA", true).unwrap();
        assert!(p.matches("Main.java"));
        assert!(!Pattern::glob("*.JAVA", false).unwrap().matches("Main.java"));
    }

    #[test]
    fn test_compiled_kinds_fold_ascii_only() {
        let glob = Pattern::glob("é*", true).unwrap();
        assert!(glob.matches("école"));
        assert!(!glob.matches("ÉCOLE"));
        assert_eq!(glob.matches("ÉCOLE"), Pattern::prefix("é", true).matches("ÉCOLE"));

        let kelvin = Pattern::regex("k", true).unwrap();
        assert!(kelvin.matches("K"));
        assert!(!kelvin.matches("\u{212A}"));

        let class = Pattern::regex("[a-c]x[^q]", true).unwrap();
        assert!(class.matches("BXz"));
        assert!(!class.matches("bxQ"));
        assert!(!Pattern::regex("[é]", true).unwrap().matches("É"));
    }

    #[test]
    fn test_regex_full_match() {
        let p = Pattern::regex("[a-z]+[0-9]", false).unwrap();
        assert!(p.matches("abc1"));
        assert!(!p.matches("abc1x"));
        assert!(!p.matches("ABC1"));
        assert!(Pattern::regex("[a-z]+[0-9]", true).unwrap().matches("ABC1"));
    }

    #[test]
    fn test_regex_alternation_is_anchored_as_a_whole() {
        let p = Pattern::regex("a|b", false).unwrap();
        assert!(p.matches("a"));
        assert!(p.matches("b"));
        assert!(!p.matches("ab"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = Pattern::regex("(unclosed", false).unwrap_err();
        assert!(matches!(err, PatternError::Syntax { kind: PatternKind::Regex, .. }));
        assert!(err.to_string().starts_with("invalid regex pattern '(unclosed'"));

        assert!(Pattern::glob("[abc", false).is_err());
        assert!(Pattern::glob("{a,b", false).is_err());
        assert!(Pattern::new(PatternKind::Literal, "(unclosed", false).is_ok());
    }

    #[test]
    fn test_equality_ignores_compiled_state() {
        let a = Pattern::glob("*.rs", false).unwrap();
        let b = Pattern::new(PatternKind::Glob, "*.rs", false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Pattern::glob("*.rs", true).unwrap());
        assert_ne!(a, Pattern::literal("*.rs", false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pattern::prefix("ab", false).to_string(), "prefix:ab");
        assert_eq!(Pattern::glob("*.c", true).unwrap().to_string(), "glob/i:*.c");
    }

    #[test]
    fn test_serde_round_trip() {
        let p = Pattern::glob("*.{c,h}", true).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"kind":"glob","ignore_case":true,"expression":"*.{c,h}"}"#);
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(back.matches("X.H"));
    }

    #[test]
    fn test_serde_rejects_bad_regex() {
        let res = serde_json::from_str::<Pattern>(r#"{"kind":"regex","expression":"("}"#);
        assert!(res.is_err());
    }

    proptest! {
        #[test]
        fn prop_text_kinds_never_fail(kind in any::<PatternKind>(), expr in ".{0,12}", ic in any::<bool>()) {
            let res = Pattern::new(kind, expr.clone(), ic);
            if !kind.is_compiled() {
                prop_assert!(res.is_ok());
            }
            if let Ok(p) = res {
                prop_assert_eq!(p.kind(), kind);
                prop_assert_eq!(p.expression(), expr.as_str());
                prop_assert_eq!(p.ignore_case(), ic);
            }
        }

        #[test]
        fn prop_literal_matches_itself(expr in "[a-zA-Z0-9._-]{0,16}") {
            prop_assert!(Pattern::literal(expr.clone(), false).matches(&expr));
            prop_assert!(Pattern::literal(expr.clone(), true).matches(&expr.to_ascii_uppercase()));
            prop_assert!(Pattern::glob(expr.clone(), false).unwrap().matches(&expr));
        }
    }
}
