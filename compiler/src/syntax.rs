//! The regular expression syntax tree consumed by the compiler.
//!
//! Each node carries an operator kind and the fields that operator uses.
//! Fields a given operator does not use are left at their defaults.
use std::fmt::{self, Display, Write};

/// The largest explicit bound a [`Op::Repeat`] node may carry.
pub const MAX_REPEAT: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Matches no strings.
    NoMatch,
    /// Matches the empty string.
    EmptyMatch,
    /// Matches `runes` as a sequence.
    Literal,
    /// Matches one character within `ranges`.
    CharClass,
    /// Matches any character except a newline.
    AnyCharNotNL,
    /// Matches any character.
    AnyChar,
    /// `(?m:^)`
    BeginLine,
    /// `(?m:$)`
    EndLine,
    /// `^` or `\A`
    BeginText,
    /// `$`, `\z` or `\Z`
    EndText,
    /// `\b`
    WordBoundary,
    /// `\B`
    NoWordBoundary,
    /// A capturing group around its single sub-expression.
    Capture,
    Star,
    Plus,
    Quest,
    /// Matches `min` through `max` repetitions of its sub-expression. A `max`
    /// of `-1` is unbounded.
    Repeat,
    Concat,
    Alternate,
    /// `\N`, referencing capture group `cap`.
    Backreference,
    /// `\G`
    PreviousMatchEnd,
    /// `\p{name}`
    UnicodeClass,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Op::NoMatch => "no-match",
            Op::EmptyMatch => "empty-match",
            Op::Literal => "literal",
            Op::CharClass => "char-class",
            Op::AnyCharNotNL => "any-char-not-nl",
            Op::AnyChar => "any-char",
            Op::BeginLine => "begin-line",
            Op::EndLine => "end-line",
            Op::BeginText => "begin-text",
            Op::EndText => "end-text",
            Op::WordBoundary => "word-boundary",
            Op::NoWordBoundary => "no-word-boundary",
            Op::Capture => "capture",
            Op::Star => "star",
            Op::Plus => "plus",
            Op::Quest => "quest",
            Op::Repeat => "repeat",
            Op::Concat => "concat",
            Op::Alternate => "alternate",
            Op::Backreference => "backreference",
            Op::PreviousMatchEnd => "previous-match-end",
            Op::UnicodeClass => "unicode-class",
        }
    }

    /// Returns `true` for the repetition operators.
    pub fn is_repetition(&self) -> bool {
        matches!(self, Op::Star | Op::Plus | Op::Quest | Op::Repeat)
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of a parsed regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regexp {
    pub op: Op,
    pub sub: Vec<Regexp>,
    /// Literal characters, used by [`Op::Literal`].
    pub runes: Vec<char>,
    /// Inclusive character ranges, used by [`Op::CharClass`].
    pub ranges: Vec<(char, char)>,
    /// Repetition bounds, used by [`Op::Repeat`].
    pub min: i32,
    pub max: i32,
    /// Capture index, used by [`Op::Capture`] and [`Op::Backreference`].
    pub cap: usize,
    /// Class name, used by [`Op::UnicodeClass`].
    pub name: Option<String>,
}

impl Regexp {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            sub: vec![],
            runes: vec![],
            ranges: vec![],
            min: 0,
            max: 0,
            cap: 0,
            name: None,
        }
    }

    #[must_use]
    pub fn with_sub(self, sub: Vec<Regexp>) -> Self {
        Self { sub, ..self }
    }

    pub fn literal(text: &str) -> Self {
        Self {
            runes: text.chars().collect(),
            ..Self::new(Op::Literal)
        }
    }

    pub fn char_class(ranges: Vec<(char, char)>) -> Self {
        Self {
            ranges,
            ..Self::new(Op::CharClass)
        }
    }

    pub fn capture(cap: usize, sub: Regexp) -> Self {
        Self {
            cap,
            ..Self::new(Op::Capture).with_sub(vec![sub])
        }
    }

    pub fn star(sub: Regexp) -> Self {
        Self::new(Op::Star).with_sub(vec![sub])
    }

    pub fn plus(sub: Regexp) -> Self {
        Self::new(Op::Plus).with_sub(vec![sub])
    }

    pub fn quest(sub: Regexp) -> Self {
        Self::new(Op::Quest).with_sub(vec![sub])
    }

    pub fn repeat(sub: Regexp, min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            ..Self::new(Op::Repeat).with_sub(vec![sub])
        }
    }

    pub fn concat(sub: Vec<Regexp>) -> Self {
        Self::new(Op::Concat).with_sub(sub)
    }

    pub fn alternate(sub: Vec<Regexp>) -> Self {
        Self::new(Op::Alternate).with_sub(sub)
    }

    pub fn backreference(cap: usize) -> Self {
        Self {
            cap,
            ..Self::new(Op::Backreference)
        }
    }

    pub fn unicode_class(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(Op::UnicodeClass)
        }
    }

    /// Renders an indented structural dump of the tree, one node per line.
    ///
    /// # Example
    ///
    /// ```
    /// use regen_compiler::syntax::Regexp;
    ///
    /// let regexp = Regexp::star(Regexp::literal("ab"));
    ///
    /// assert_eq!("star\n  literal \"ab\"\n", regexp.inspect());
    /// ```
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        self.inspect_into(&mut out, 0);
        out
    }

    fn inspect_into(&self, out: &mut String, depth: usize) {
        let _ = write!(out, "{:indent$}{}", "", self.op, indent = depth * 2);

        let _ = match self.op {
            Op::Literal => write!(out, " {:?}", self.runes.iter().collect::<String>()),
            Op::CharClass => write!(out, " {:?}", self.ranges),
            Op::Repeat => write!(out, " min={} max={}", self.min, self.max),
            Op::Capture | Op::Backreference => write!(out, " cap={}", self.cap),
            Op::UnicodeClass => write!(out, " name={}", self.name.as_deref().unwrap_or("")),
            _ => Ok(()),
        };
        out.push('\n');

        for sub in &self.sub {
            sub.inspect_into(out, depth + 1);
        }
    }
}

/// Characters that must be escaped to be read back as literals.
const META_CHARACTERS: &str = "\\.+*?()|[]{}^$";

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, specials: &str) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        '\u{B}' => f.write_str("\\v"),
        '\u{C}' => f.write_str("\\f"),
        c if specials.contains(c) => write!(f, "\\{}", c),
        c if c.is_control() => write!(f, "\\x{{{:X}}}", c as u32),
        c => f.write_char(c),
    }
}

impl Regexp {
    /// Sub-expressions that bind looser than a postfix operator need grouping.
    fn needs_group_for_postfix(&self) -> bool {
        match self.op {
            Op::Literal => self.runes.len() > 1,
            Op::Concat | Op::Alternate | Op::Star | Op::Plus | Op::Quest | Op::Repeat => true,
            Op::EmptyMatch => true,
            _ => false,
        }
    }

    fn write_sub_group(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sub in &self.sub {
            if sub.needs_group_for_postfix() {
                write!(f, "(?:{})", sub)?;
            } else {
                write!(f, "{}", sub)?;
            }
        }
        Ok(())
    }
}

impl Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::NoMatch => f.write_str("[^\\x{0}-\\x{10FFFF}]"),
            Op::EmptyMatch => f.write_str("(?:)"),
            Op::Literal => self
                .runes
                .iter()
                .try_for_each(|&c| write_escaped(f, c, META_CHARACTERS)),
            Op::CharClass => {
                f.write_char('[')?;
                for &(lower, upper) in &self.ranges {
                    write_escaped(f, lower, "\\[]^-")?;
                    if lower != upper {
                        f.write_char('-')?;
                        write_escaped(f, upper, "\\[]^-")?;
                    }
                }
                f.write_char(']')
            }
            Op::AnyCharNotNL => f.write_char('.'),
            Op::AnyChar => f.write_str("(?s:.)"),
            Op::BeginLine => f.write_str("(?m:^)"),
            Op::EndLine => f.write_str("(?m:$)"),
            Op::BeginText => f.write_char('^'),
            Op::EndText => f.write_char('$'),
            Op::WordBoundary => f.write_str("\\b"),
            Op::NoWordBoundary => f.write_str("\\B"),
            Op::PreviousMatchEnd => f.write_str("\\G"),
            Op::Backreference => write!(f, "\\{}", self.cap),
            Op::UnicodeClass => write!(f, "\\p{{{}}}", self.name.as_deref().unwrap_or("")),
            Op::Capture => {
                f.write_char('(')?;
                for sub in &self.sub {
                    write!(f, "{}", sub)?;
                }
                f.write_char(')')
            }
            Op::Star | Op::Plus | Op::Quest | Op::Repeat => {
                self.write_sub_group(f)?;
                match (self.op, self.min, self.max) {
                    (Op::Star, ..) => f.write_char('*'),
                    (Op::Plus, ..) => f.write_char('+'),
                    (Op::Quest, ..) => f.write_char('?'),
                    (_, min, max) if min == max => write!(f, "{{{}}}", min),
                    (_, min, max) if max < 0 => write!(f, "{{{},}}", min),
                    (_, min, max) => write!(f, "{{{},{}}}", min, max),
                }
            }
            Op::Concat => {
                for sub in &self.sub {
                    if sub.op == Op::Alternate {
                        write!(f, "(?:{})", sub)?;
                    } else {
                        write!(f, "{}", sub)?;
                    }
                }
                Ok(())
            }
            Op::Alternate => {
                for (idx, sub) in self.sub.iter().enumerate() {
                    if idx > 0 {
                        f.write_char('|')?;
                    }
                    write!(f, "{}", sub)?;
                }
                Ok(())
            }
        }
    }
}
