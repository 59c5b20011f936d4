//! XSD 1.0 pattern translation
//!
//! XML Schema defines its own regular expression dialect (Datatypes,
//! Appendix F). This module translates a pattern in that dialect to the
//! syntax of the host `regex` engine, rejecting constructs the host
//! cannot express instead of silently changing their meaning.
//!
//! XSD patterns are implicitly anchored, so the compiled form is always
//! wrapped in `^(?:...)$`.
//!
//! Error split: a pattern that is not legal XSD syntax (lazy quantifier,
//! group prefix, anchor escape, back-reference) is `PatternSyntax`; a
//! pattern that is legal XSD but beyond the host dialect (block escapes,
//! class subtraction, some negated-class combinations) is
//! `PatternUnsupported`.

use crate::error::{Error, Result};
use crate::names::{NAME_CHAR_CLASS, NAME_START_CHAR_CLASS};
use regex::Regex;

/// Maximum value allowed in a `{m,n}` quantifier
const REPEAT_CEILING: u32 = 1000;

/// Translate an XSD 1.0 pattern into host regex syntax (unanchored body)
pub fn translate_pattern(pattern: &str) -> Result<String> {
    Translator::new(pattern).run()
}

/// Translate and compile an XSD 1.0 pattern, anchored to the full string
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let body = translate_pattern(pattern)?;
    Regex::new(&format!("^(?:{})$", body))
        .map_err(|e| Error::PatternSyntax(format!("pattern '{}': {}", pattern, e)))
}

/// What the previous token contributed, for quantifier placement checks
#[derive(Clone, Copy, PartialEq)]
enum LastToken {
    None,
    Atom,
    Quantifier,
}

/// Single-pass translator state: an index over the input characters and
/// an output buffer, with per-construct handlers.
struct Translator {
    chars: Vec<char>,
    pos: usize,
    out: String,
    group_depth: u32,
    last: LastToken,
}

impl Translator {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            out: String::new(),
            group_depth: 0,
            last: LastToken::None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn run(mut self) -> Result<String> {
        while let Some(c) = self.next() {
            match c {
                '\\' => {
                    let frag = self.escape_outside_class()?;
                    self.out.push_str(&frag);
                    self.last = LastToken::Atom;
                }
                '[' => {
                    let frag = self.character_class()?;
                    self.out.push_str(&frag);
                    self.last = LastToken::Atom;
                }
                ']' => {
                    return Err(Error::PatternSyntax(
                        "unescaped ']' outside a character class".to_string(),
                    ));
                }
                '.' => {
                    self.out.push_str("[^\\n\\r]");
                    self.last = LastToken::Atom;
                }
                // ^ and $ are ordinary characters in the XSD dialect
                '^' => {
                    self.out.push_str("\\^");
                    self.last = LastToken::Atom;
                }
                '$' => {
                    self.out.push_str("\\$");
                    self.last = LastToken::Atom;
                }
                '(' => {
                    if self.peek() == Some('?') {
                        return Err(Error::PatternSyntax(
                            "(?...) group prefixes are not part of XSD 1.0 patterns".to_string(),
                        ));
                    }
                    self.group_depth += 1;
                    self.out.push('(');
                    self.last = LastToken::None;
                }
                ')' => {
                    if self.group_depth == 0 {
                        return Err(Error::PatternSyntax("unbalanced ')'".to_string()));
                    }
                    self.group_depth -= 1;
                    self.out.push(')');
                    self.last = LastToken::Atom;
                }
                '*' | '+' | '?' => {
                    self.require_atom(c)?;
                    self.out.push(c);
                    self.reject_lazy()?;
                    self.last = LastToken::Quantifier;
                }
                '{' => {
                    self.require_atom('{')?;
                    let frag = self.bounded_quantifier()?;
                    self.out.push_str(&frag);
                    self.reject_lazy()?;
                    self.last = LastToken::Quantifier;
                }
                '}' => {
                    self.out.push_str("\\}");
                    self.last = LastToken::Atom;
                }
                '|' => {
                    self.out.push('|');
                    self.last = LastToken::None;
                }
                _ => {
                    push_literal(&mut self.out, c);
                    self.last = LastToken::Atom;
                }
            }
        }
        if self.group_depth != 0 {
            return Err(Error::PatternSyntax("unbalanced '('".to_string()));
        }
        Ok(self.out)
    }

    fn require_atom(&self, q: char) -> Result<()> {
        match self.last {
            LastToken::Atom => Ok(()),
            LastToken::Quantifier => Err(Error::PatternSyntax(format!(
                "quantifier '{}' follows another quantifier",
                q
            ))),
            LastToken::None => Err(Error::PatternSyntax(format!(
                "quantifier '{}' has nothing to repeat",
                q
            ))),
        }
    }

    fn reject_lazy(&self) -> Result<()> {
        if self.peek() == Some('?') {
            return Err(Error::PatternSyntax(
                "lazy quantifier not supported in XSD 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse `{m}`, `{m,}` or `{m,n}` after the opening brace
    fn bounded_quantifier(&mut self) -> Result<String> {
        let min = self.quantifier_number()?;
        match self.next() {
            Some('}') => Ok(format!("{{{}}}", min)),
            Some(',') => match self.peek() {
                Some('}') => {
                    self.next();
                    Ok(format!("{{{},}}", min))
                }
                Some(c) if c.is_ascii_digit() => {
                    let max = self.quantifier_number()?;
                    if self.next() != Some('}') {
                        return Err(Error::PatternSyntax("unterminated quantifier".to_string()));
                    }
                    if max < min {
                        return Err(Error::PatternSyntax(format!(
                            "quantifier maximum {} is less than minimum {}",
                            max, min
                        )));
                    }
                    Ok(format!("{{{},{}}}", min, max))
                }
                _ => Err(Error::PatternSyntax("malformed quantifier".to_string())),
            },
            _ => Err(Error::PatternSyntax("unterminated quantifier".to_string())),
        }
    }

    fn quantifier_number(&mut self) -> Result<u32> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(Error::PatternSyntax("quantifier requires a number".to_string()));
        }
        let n: u32 = digits
            .parse()
            .map_err(|_| Error::PatternSyntax(format!("quantifier bound '{}' too large", digits)))?;
        if n > REPEAT_CEILING {
            return Err(Error::PatternSyntax(format!(
                "quantifier bound {} exceeds the {} repeat ceiling",
                n, REPEAT_CEILING
            )));
        }
        Ok(n)
    }

    /// Handle an escape sequence outside a character class
    fn escape_outside_class(&mut self) -> Result<String> {
        let c = self
            .next()
            .ok_or_else(|| Error::PatternSyntax("trailing backslash".to_string()))?;
        match c {
            'i' => Ok(format!("[{}]", NAME_START_CHAR_CLASS)),
            'I' => Ok(format!("[^{}]", NAME_START_CHAR_CLASS)),
            'c' => Ok(format!("[{}]", NAME_CHAR_CLASS)),
            'C' => Ok(format!("[^{}]", NAME_CHAR_CLASS)),
            'd' => Ok("\\p{Nd}".to_string()),
            'D' => Ok("\\P{Nd}".to_string()),
            's' => Ok("[\\x20\\t\\n\\r]".to_string()),
            'S' => Ok("[^\\x20\\t\\n\\r]".to_string()),
            'w' => Ok("[^\\p{P}\\p{Z}\\p{C}]".to_string()),
            'W' => Ok("[\\p{P}\\p{Z}\\p{C}]".to_string()),
            'p' | 'P' => self.property_escape(c),
            'n' => Ok("\\n".to_string()),
            'r' => Ok("\\r".to_string()),
            't' => Ok("\\t".to_string()),
            'f' => Ok("\\x0C".to_string()),
            'v' => Ok("\\x0B".to_string()),
            'a' => Ok("\\x07".to_string()),
            'b' => Err(Error::PatternSyntax(
                "\\b is only valid inside a character class in XSD 1.0".to_string(),
            )),
            'A' | 'Z' | 'z' | 'B' => Err(Error::PatternSyntax(format!(
                "\\{} anchors are not part of XSD 1.0 patterns",
                c
            ))),
            '0'..='9' => Err(Error::PatternSyntax(
                "back-references are not part of XSD 1.0 patterns".to_string(),
            )),
            '\\' | '[' | ']' | '(' | ')' | '{' | '}' | '*' | '+' | '?' | '|' | '^' | '$' | '.'
            | '-' => {
                let mut s = String::new();
                s.push('\\');
                s.push(c);
                Ok(s)
            }
            _ => Err(Error::PatternSyntax(format!("unknown escape '\\{}'", c))),
        }
    }

    /// `\p{...}` / `\P{...}` pass-through, with block names rejected
    fn property_escape(&mut self, p: char) -> Result<String> {
        if self.next() != Some('{') {
            return Err(Error::PatternSyntax(format!("malformed \\{} escape", p)));
        }
        let mut name = String::new();
        loop {
            match self.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => {
                    return Err(Error::PatternSyntax(format!("unterminated \\{}{{...}}", p)));
                }
            }
        }
        if name.starts_with("Is") || name.starts_with("In") {
            return Err(Error::PatternUnsupported(format!(
                "Unicode block escape \\{}{{{}}} is not supported by the host engine",
                p, name
            )));
        }
        if name.is_empty() {
            return Err(Error::PatternSyntax(format!("empty \\{}{{}} escape", p)));
        }
        Ok(format!("\\{}{{{}}}", p, name))
    }

    /// Parse a character class after the opening `[`
    fn character_class(&mut self) -> Result<String> {
        let negated = if self.peek() == Some('^') {
            self.next();
            true
        } else {
            false
        };

        let mut body = String::new();
        // Item count and whether every item so far was `\D`; drives the
        // `[^\D]` -> `\p{Nd}` rewrite.
        let mut items = 0usize;
        let mut all_digit_complement = true;
        // Last single character emitted, as a possible range start.
        let mut range_start: Option<char> = None;
        let mut first = true;

        loop {
            let c = self
                .next()
                .ok_or_else(|| Error::PatternSyntax("unterminated character class".to_string()))?;
            match c {
                ']' if !first => break,
                '[' => {
                    return Err(Error::PatternSyntax(
                        "nested character classes are not part of XSD 1.0 patterns".to_string(),
                    ));
                }
                '-' => {
                    match self.peek() {
                        Some(']') if !first => {
                            // dash right before the closing bracket is literal
                            body.push_str("\\-");
                            items += 1;
                            all_digit_complement = false;
                            range_start = None;
                        }
                        Some('[') => {
                            return Err(Error::PatternUnsupported(
                                "character class subtraction is not supported by the host engine"
                                    .to_string(),
                            ));
                        }
                        _ if first || range_start.is_none() => {
                            // dash at the opening, or not preceded by a range
                            // start, is literal
                            body.push_str("\\-");
                            items += 1;
                            all_digit_complement = false;
                            range_start = None;
                        }
                        _ => {
                            let lo = range_start.take().unwrap();
                            let hi = self.range_end_char()?;
                            if hi < lo {
                                return Err(Error::PatternSyntax(format!(
                                    "character range '{}-{}' is out of order",
                                    lo, hi
                                )));
                            }
                            body.push('-');
                            push_class_literal(&mut body, hi);
                            all_digit_complement = false;
                        }
                    }
                }
                '\\' => {
                    let item = self.class_escape()?;
                    match item {
                        ClassItem::Char(ch) => {
                            push_class_literal(&mut body, ch);
                            range_start = Some(ch);
                            all_digit_complement = false;
                        }
                        ClassItem::Fragment { text, digit_complement, host_negated } => {
                            if negated && host_negated {
                                return Err(Error::PatternUnsupported(format!(
                                    "'{}' inside a negated class is not expressible in the host engine",
                                    text
                                )));
                            }
                            body.push_str(&text);
                            range_start = None;
                            if !digit_complement {
                                all_digit_complement = false;
                            }
                        }
                    }
                    items += 1;
                }
                _ => {
                    push_class_literal(&mut body, c);
                    range_start = Some(c);
                    items += 1;
                    all_digit_complement = false;
                }
            }
            first = false;
        }

        if items == 0 {
            return Err(Error::PatternSyntax("empty character class".to_string()));
        }

        if negated {
            if all_digit_complement {
                // [^\D] is exactly the digits
                return Ok("\\p{Nd}".to_string());
            }
            Ok(format!("[^{}]", body))
        } else {
            Ok(format!("[{}]", body))
        }
    }

    /// The upper end of a range: a literal or a single-character escape
    fn range_end_char(&mut self) -> Result<char> {
        let c = self
            .next()
            .ok_or_else(|| Error::PatternSyntax("unterminated character class".to_string()))?;
        match c {
            '\\' => match self.class_escape()? {
                ClassItem::Char(ch) => Ok(ch),
                ClassItem::Fragment { text, .. } => Err(Error::PatternSyntax(format!(
                    "multi-character escape '{}' cannot end a range",
                    text
                ))),
            },
            '[' | ']' => Err(Error::PatternSyntax(format!(
                "'{}' cannot end a character range",
                c
            ))),
            _ => Ok(c),
        }
    }

    /// Handle an escape sequence inside a character class
    fn class_escape(&mut self) -> Result<ClassItem> {
        let c = self
            .next()
            .ok_or_else(|| Error::PatternSyntax("trailing backslash".to_string()))?;
        let frag = |text: &str, digit_complement: bool, host_negated: bool| {
            Ok(ClassItem::Fragment {
                text: text.to_string(),
                digit_complement,
                host_negated,
            })
        };
        match c {
            'i' => frag(NAME_START_CHAR_CLASS, false, false),
            'c' => frag(NAME_CHAR_CLASS, false, false),
            'I' => frag(&format!("[^{}]", NAME_START_CHAR_CLASS), false, true),
            'C' => frag(&format!("[^{}]", NAME_CHAR_CLASS), false, true),
            'd' => frag("\\p{Nd}", false, false),
            'D' => frag("\\P{Nd}", true, false),
            's' => frag("\\x20\\t\\n\\r", false, false),
            'S' => frag("[^\\x20\\t\\n\\r]", false, true),
            'w' => frag("[^\\p{P}\\p{Z}\\p{C}]", false, true),
            'W' => frag("\\p{P}\\p{Z}\\p{C}", false, false),
            'p' | 'P' => {
                let text = self.property_escape(c)?;
                Ok(ClassItem::Fragment {
                    text,
                    digit_complement: false,
                    host_negated: false,
                })
            }
            'n' => Ok(ClassItem::Char('\n')),
            'r' => Ok(ClassItem::Char('\r')),
            't' => Ok(ClassItem::Char('\t')),
            'f' => Ok(ClassItem::Char('\u{C}')),
            'v' => Ok(ClassItem::Char('\u{B}')),
            'a' => Ok(ClassItem::Char('\u{7}')),
            'b' => Ok(ClassItem::Char('\u{8}')),
            '0'..='9' => Err(Error::PatternSyntax(
                "back-references are not part of XSD 1.0 patterns".to_string(),
            )),
            'A' | 'Z' | 'z' | 'B' => Err(Error::PatternSyntax(format!(
                "\\{} anchors are not part of XSD 1.0 patterns",
                c
            ))),
            '\\' | '[' | ']' | '(' | ')' | '{' | '}' | '*' | '+' | '?' | '|' | '^' | '$' | '.'
            | '-' => Ok(ClassItem::Char(c)),
            _ => Err(Error::PatternSyntax(format!("unknown escape '\\{}'", c))),
        }
    }
}

/// One parsed item of a character class
enum ClassItem {
    /// A single concrete character (usable as a range endpoint)
    Char(char),
    /// A multi-character fragment in host syntax
    Fragment {
        text: String,
        /// True only for `\D`; drives the `[^\D]` rewrite
        digit_complement: bool,
        /// True when the fragment is itself a negated host class and so
        /// cannot appear inside a negated outer class
        host_negated: bool,
    },
}

/// Push a literal character, escaped for the host regex if needed
fn push_literal(out: &mut String, c: char) {
    if "\\.+*?()|[]{}^$#&-~".contains(c) {
        out.push('\\');
    }
    out.push(c);
}

/// Push a literal character inside a class body, escaped if needed
fn push_class_literal(out: &mut String, c: char) {
    match c {
        '\\' | ']' | '[' | '^' | '-' | '&' | '~' => {
            out.push('\\');
            out.push(c);
        }
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, value: &str) -> bool {
        compile_pattern(pattern).unwrap().is_match(value)
    }

    #[test]
    fn test_implicit_anchoring() {
        assert!(matches("[A-Z]{3}", "ABC"));
        assert!(!matches("[A-Z]{3}", "AB"));
        assert!(!matches("[A-Z]{3}", "ABCD"));
        assert!(!matches("abc", "xabcx"));
    }

    #[test]
    fn test_literal_caret_and_dollar() {
        assert!(matches("a^b", "a^b"));
        assert!(matches("a$b", "a$b"));
        assert!(!matches("a^b", "ab"));
    }

    #[test]
    fn test_dot_excludes_newlines() {
        assert!(matches(".", "x"));
        assert!(!matches(".", "\n"));
        assert!(!matches(".", "\r"));
    }

    #[test]
    fn test_lazy_quantifier_rejected() {
        let err = compile_pattern("a+?").unwrap_err();
        assert!(matches!(err, Error::PatternSyntax(_)));
        assert!(err.to_string().contains("lazy quantifier"));
        assert!(matches!(compile_pattern("a*?"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("a{1,2}?"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_group_prefix_rejected() {
        assert!(matches!(compile_pattern("(?:ab)"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("(?=x)"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_unbalanced_parens_rejected() {
        assert!(matches!(compile_pattern("(ab"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("ab)"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_anchor_escapes_rejected() {
        for p in ["\\Aab", "ab\\Z", "ab\\z", "a\\Bb"] {
            assert!(matches!(compile_pattern(p), Err(Error::PatternSyntax(_))), "{}", p);
        }
    }

    #[test]
    fn test_back_references_rejected() {
        assert!(matches!(compile_pattern("(a)\\1"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_name_char_escapes() {
        assert!(matches("\\i\\c*", "element"));
        assert!(matches("\\i\\c*", "_a-b.c"));
        assert!(!matches("\\i\\c*", "1abc"));
        assert!(matches("\\I", "1"));
        assert!(!matches("\\I", "a"));
    }

    #[test]
    fn test_digit_escapes() {
        assert!(matches("\\d+", "0123"));
        assert!(matches("\\d+", "\u{0660}")); // ARABIC-INDIC DIGIT ZERO
        assert!(!matches("\\d", "a"));
        assert!(matches("\\D", "a"));
    }

    #[test]
    fn test_space_escapes() {
        assert!(matches("a\\sb", "a b"));
        assert!(matches("a\\sb", "a\tb"));
        assert!(!matches("a\\sb", "a\u{A0}b")); // NBSP is not XML whitespace
        assert!(matches("\\S", "x"));
    }

    #[test]
    fn test_word_escapes() {
        assert!(matches("\\w+", "abc123"));
        assert!(!matches("\\w", " "));
        assert!(matches("\\W", " "));
        assert!(matches("\\W", ","));
    }

    #[test]
    fn test_property_escape_pass_through() {
        assert!(matches("\\p{Lu}+", "ABC"));
        assert!(!matches("\\p{Lu}", "a"));
        assert!(matches("\\P{Lu}", "a"));
    }

    #[test]
    fn test_block_escape_rejected() {
        assert!(matches!(
            compile_pattern("\\p{IsBasicLatin}"),
            Err(Error::PatternUnsupported(_))
        ));
        assert!(matches!(
            compile_pattern("\\P{InGreek}"),
            Err(Error::PatternUnsupported(_))
        ));
    }

    #[test]
    fn test_class_ranges() {
        assert!(matches("[a-f]+", "cafe"));
        assert!(!matches("[a-f]", "g"));
        assert!(matches!(compile_pattern("[z-a]"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_class_literal_dash() {
        assert!(matches("[-a]", "-"));
        assert!(matches("[a-]", "-"));
        assert!(matches("[a-]", "a"));
        assert!(matches("[a\\-z]+", "a-z"));
        assert!(!matches("[a\\-z]", "b"));
    }

    #[test]
    fn test_negated_class() {
        assert!(matches("[^0-9]", "a"));
        assert!(!matches("[^0-9]", "5"));
    }

    #[test]
    fn test_negated_digit_complement_rewrite() {
        // [^\D] means exactly the digits
        assert_eq!(translate_pattern("[^\\D]").unwrap(), "\\p{Nd}");
        assert!(matches("[^\\D]", "7"));
        assert!(!matches("[^\\D]", "a"));
    }

    #[test]
    fn test_negated_class_unexpressible() {
        for p in ["[^\\w]", "[^\\S]", "[^a\\I]", "[^\\C]"] {
            assert!(
                matches!(compile_pattern(p), Err(Error::PatternUnsupported(_))),
                "{}",
                p
            );
        }
    }

    #[test]
    fn test_nested_class_and_subtraction_rejected() {
        assert!(matches!(compile_pattern("[a[b]]"), Err(Error::PatternSyntax(_))));
        assert!(matches!(
            compile_pattern("[a-z-[aeiou]]"),
            Err(Error::PatternUnsupported(_))
        ));
    }

    #[test]
    fn test_bounded_quantifiers() {
        assert!(matches("a{2}", "aa"));
        assert!(!matches("a{2}", "a"));
        assert!(matches("a{2,}", "aaaa"));
        assert!(matches("a{1,3}", "aa"));
        assert!(!matches("a{1,3}", "aaaa"));
        assert!(matches!(compile_pattern("a{3,2}"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("a{1001}"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("a{2"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_quantifier_placement() {
        assert!(matches!(compile_pattern("*a"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("a**"), Err(Error::PatternSyntax(_))));
        assert!(matches!(compile_pattern("(|*)"), Err(Error::PatternSyntax(_))));
    }

    #[test]
    fn test_metachar_escapes() {
        assert!(matches("\\[\\]", "[]"));
        assert!(matches("\\(\\)", "()"));
        assert!(matches("\\{\\}", "{}"));
        assert!(matches("\\*\\+\\?", "*+?"));
        assert!(matches("\\\\", "\\"));
        assert!(matches("\\.", "."));
        assert!(!matches("\\.", "x"));
    }

    #[test]
    fn test_class_single_char_escapes() {
        assert!(matches("[\\n\\t]+", "\n\t"));
        assert!(matches("[\\b]", "\u{8}"));
        assert!(matches("[\\]\\[]+", "[]"));
    }

    #[test]
    fn test_alternation() {
        assert!(matches("cat|dog", "cat"));
        assert!(matches("cat|dog", "dog"));
        assert!(!matches("cat|dog", "catdog"));
    }

    #[test]
    fn test_empty_class_rejected() {
        assert!(matches!(compile_pattern("[]"), Err(Error::PatternSyntax(_))));
    }
}
