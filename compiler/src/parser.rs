use parcel::parsers::character::{alphabetic, digit, expect_character};
use parcel::prelude::v1::*;

use regen_runtime::RangeSet;

use crate::syntax::{Op, Regexp, MAX_REPEAT};

/// The deepest group nesting a pattern may contain.
pub const MAX_NESTING_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErr {
    #[error("provided regex is invalid")]
    InvalidRegex,
    #[error("unexpected character {character:?} at offset {offset}")]
    UnexpectedCharacter { offset: usize, character: char },
    #[error("group at offset {offset} exceeds the maximum nesting depth of {}", MAX_NESTING_DEPTH)]
    NestingTooDeep { offset: usize },
    #[error("repeat count in {{{min},{max}}} exceeds the maximum of {}", MAX_REPEAT)]
    InvalidRepeatCount { min: i32, max: i32 },
    #[error("undefined parse error: {0}")]
    Undefined(String),
}

/// Parses a pattern into a syntax tree. Capture groups are numbered from 1
/// in order of their opening parenthesis.
///
/// # Example
///
/// ```
/// use regen_compiler::parse;
/// use regen_compiler::syntax::Regexp;
///
/// assert_eq!(
///     Ok(Regexp::alternate(vec![Regexp::literal("a"), Regexp::literal("b")])),
///     parse("a|b")
/// );
/// ```
pub fn parse(pattern: &str) -> Result<Regexp, ParseErr> {
    let input: Vec<(usize, char)> = pattern.chars().enumerate().collect();
    check_nesting_depth(&input)?;

    expression()
        .parse(input.as_slice())
        .map_err(|err| ParseErr::Undefined(format!("unspecified parse error occured: {}", err)))
        .and_then(|ms| match ms {
            MatchStatus::Match {
                remainder, inner, ..
            } => match remainder.first() {
                None => Ok(inner),
                Some(&(offset, character)) => Err(ParseErr::UnexpectedCharacter { offset, character }),
            },
            MatchStatus::NoMatch(..) => Err(ParseErr::InvalidRegex),
        })
        .and_then(|regexp| check_repeat_counts(&regexp).map(|_| regexp))
        .map(|mut regexp| {
            number_captures(&mut regexp, &mut 0);
            regexp
        })
}

/// Rejects patterns whose groups nest deeper than [`MAX_NESTING_DEPTH`]
/// before any recursive descent begins.
fn check_nesting_depth(input: &[(usize, char)]) -> Result<(), ParseErr> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = input.iter();

    while let Some(&(offset, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(ParseErr::NestingTooDeep { offset });
                }
            }
            ')' if !in_class => depth = depth.saturating_sub(1),
            _ => (),
        }
    }

    Ok(())
}

fn check_repeat_counts(regexp: &Regexp) -> Result<(), ParseErr> {
    if regexp.op == Op::Repeat && (regexp.min > MAX_REPEAT || regexp.max > MAX_REPEAT) {
        return Err(ParseErr::InvalidRepeatCount {
            min: regexp.min,
            max: regexp.max,
        });
    }

    regexp.sub.iter().try_for_each(check_repeat_counts)
}

fn number_captures(regexp: &mut Regexp, next: &mut usize) {
    if regexp.op == Op::Capture {
        *next += 1;
        regexp.cap = *next;
    }

    for sub in regexp.sub.iter_mut() {
        number_captures(sub, next);
    }
}

// Expression

fn expression<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::join(
        subexpression(),
        parcel::zero_or_more(parcel::right(parcel::join(
            expect_character('|'),
            subexpression(),
        ))),
    )
    .map(|(head, tail)| {
        let mut alternatives: Vec<Regexp> = vec![head].into_iter().chain(tail).collect();

        if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Regexp::alternate(alternatives)
        }
    })
}

fn subexpression<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::zero_or_more(subexpression_item()).map(|mut items| match items.len() {
        0 => Regexp::new(Op::EmptyMatch),
        1 => items.remove(0),
        _ => Regexp::concat(items),
    })
}

fn subexpression_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::or(group(), || {
        parcel::or(backreference(), || parcel::or(anchor(), || r#match()))
    })
}

// Group

fn group<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::right(parcel::join(
        expect_character('('),
        parcel::optional(group_non_capturing_modifier())
            .map(|non_capturing| non_capturing.is_some()),
    ))
    .and_then(|non_capturing| {
        parcel::join(
            expression(),
            parcel::right(parcel::join(
                expect_character(')'),
                parcel::optional(quantifier()),
            )),
        )
        .map(move |(expression, quantifier)| {
            let group = if non_capturing {
                expression
            } else {
                // numbered once the whole pattern is parsed.
                Regexp::capture(0, expression)
            };

            quantify(group, quantifier)
        })
    })
}

fn group_non_capturing_modifier<'a>() -> impl Parser<'a, &'a [(usize, char)], ()> {
    parcel::join(expect_character('?'), expect_character(':')).map(|_| ())
}

// Matchers

fn r#match<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::join(match_item(), parcel::optional(quantifier()))
        .map(|(item, quantifier)| quantify(item, quantifier))
}

fn match_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::or(match_character_class(), || {
        parcel::or(match_any_character(), || match_character())
    })
}

fn match_any_character<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    expect_character('.').map(|_| Regexp::new(Op::AnyCharNotNL))
}

fn match_character_class<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::or(character_group(), || {
        parcel::or(
            character_class().map(Regexp::char_class),
            || character_class_from_unicode_category(),
        )
    })
}

fn match_character<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    char()
        .predicate(|c| c.escaped || !"()[|*+?".contains(c.value))
        .map(|c| Regexp {
            runes: vec![c.value],
            ..Regexp::new(Op::Literal)
        })
}

// Character Classes

const DIGIT_RANGES: [(char, char); 1] = [('0', '9')];
const WORD_RANGES: [(char, char); 4] = [('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')];
const SPACE_RANGES: [(char, char); 3] = [('\t', '\n'), ('\u{C}', '\r'), (' ', ' ')];

fn character_group<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::join(
        parcel::right(parcel::join(
            expect_character('['),
            parcel::optional(expect_character('^')).map(|negation| negation.is_some()),
        )),
        parcel::left(parcel::join(
            parcel::one_or_more(character_group_item()),
            expect_character(']'),
        )),
    )
    .map(|(negated, items)| {
        let set = RangeSet::new(items.into_iter().flatten());
        let set = if negated { set.negate() } else { set };

        Regexp::char_class(set.ranges().iter().map(|r| (*r.start(), *r.end())).collect())
    })
}

fn character_group_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<(char, char)>>
{
    parcel::or(character_class(), || {
        parcel::or(
            character_range().map(|range| vec![range]),
            || character_group_char().map(|c| vec![(c, c)]),
        )
    })
}

fn character_group_char<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], char> {
    char()
        .predicate(|c| c.escaped || c.value != ']')
        .map(|c| c.value)
}

fn character_range<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], (char, char)> {
    parcel::join(
        character_group_char(),
        parcel::right(parcel::join(expect_character('-'), character_group_char())),
    )
}

/// The `\d`, `\w` and `\s` classes and their negations.
fn character_class<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<(char, char)>> {
    parcel::right(parcel::join(
        expect_character('\\'),
        one_of(&['d', 'D', 'w', 'W', 's', 'S']),
    ))
    .map(|class| {
        let ranges: &[(char, char)] = match class.to_ascii_lowercase() {
            'd' => &DIGIT_RANGES,
            'w' => &WORD_RANGES,
            _ => &SPACE_RANGES,
        };

        if class.is_ascii_uppercase() {
            let negated = RangeSet::new(ranges.iter().copied()).negate();
            negated.ranges().iter().map(|r| (*r.start(), *r.end())).collect()
        } else {
            ranges.to_vec()
        }
    })
}

fn character_class_from_unicode_category<'a>(
) -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::right(parcel::join(
        parcel::join(expect_character('\\'), expect_character('p')),
        parcel::right(parcel::join(
            expect_character('{'),
            parcel::left(parcel::join(letters(), expect_character('}'))),
        )),
    ))
    .map(|name| Regexp::unicode_class(&name))
}

// Quantifiers

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    /// `{n}`, `{n,}` and `{n,m}`, with `-1` marking an open upper bound.
    Range { min: i32, max: i32 },
}

fn quantify(item: Regexp, quantifier: Option<Quantifier>) -> Regexp {
    match quantifier {
        None => item,
        Some(Quantifier::ZeroOrOne) => Regexp::quest(item),
        Some(Quantifier::ZeroOrMore) => Regexp::star(item),
        Some(Quantifier::OneOrMore) => Regexp::plus(item),
        Some(Quantifier::Range { min, max }) => Regexp::repeat(item, min, max),
    }
}

/// A quantifier with an optional lazy modifier. Laziness only affects match
/// preference, so it is consumed and dropped.
fn quantifier<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Quantifier> {
    parcel::left(parcel::join(
        quantifier_type(),
        parcel::optional(lazy_modifier()),
    ))
}

fn lazy_modifier<'a>() -> impl Parser<'a, &'a [(usize, char)], ()> {
    expect_character('?').map(|_| ())
}

fn quantifier_type<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Quantifier> {
    parcel::or(expect_character('*').map(|_| Quantifier::ZeroOrMore), || {
        parcel::or(expect_character('+').map(|_| Quantifier::OneOrMore), || {
            parcel::or(
                expect_character('?').map(|_| Quantifier::ZeroOrOne),
                || range_quantifier(),
            )
        })
    })
}

fn range_quantifier<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Quantifier> {
    parcel::left(parcel::join(
        parcel::right(parcel::join(
            expect_character('{'),
            parcel::join(
                integer(),
                parcel::optional(parcel::right(parcel::join(
                    expect_character(','),
                    parcel::optional(integer()),
                ))),
            ),
        )),
        expect_character('}'),
    ))
    .map(|(min, upper_bound)| match upper_bound {
        None => Quantifier::Range { min, max: min },
        Some(None) => Quantifier::Range { min, max: -1 },
        Some(Some(max)) => Quantifier::Range { min, max },
    })
}

// Backreferences

fn backreference<'a>() -> impl Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::right(parcel::join(
        expect_character('\\'),
        integer().predicate(|idx| *idx > 0),
    ))
    .map(|idx| Regexp::backreference(idx as usize))
}

// Anchors

fn anchor<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Regexp> {
    parcel::or(expect_character('^').map(|_| Op::BeginText), || {
        parcel::or(expect_character('$').map(|_| Op::EndText), || {
            parcel::right(parcel::join(
                expect_character('\\'),
                one_of(&['A', 'z', 'Z', 'b', 'B', 'G']),
            ))
            .map(|anchor| match anchor {
                'A' => Op::BeginText,
                'z' | 'Z' => Op::EndText,
                'b' => Op::WordBoundary,
                'B' => Op::NoWordBoundary,
                _ => Op::PreviousMatchEnd,
            })
        })
    })
    .map(Regexp::new)
}

// Terminals

fn integer<'a>() -> impl Parser<'a, &'a [(usize, char)], i32> {
    move |input: &'a [(usize, char)]| {
        let preparsed_input = input;
        let res = parcel::join(
            expect_character('-').optional(),
            parcel::one_or_more(digit(10)),
        )
        .map(|(negative, digits)| {
            let vd: String = match negative {
                Some(_) => "-",
                None => "",
            }
            .chars()
            .chain(digits.into_iter())
            .collect();

            vd.parse::<i32>()
        })
        .parse(input);

        match res {
            Ok(MatchStatus::Match {
                span,
                remainder,
                inner: Ok(int),
            }) => Ok(MatchStatus::Match {
                span,
                remainder,
                inner: int,
            }),

            Ok(MatchStatus::Match {
                span: _,
                remainder: _,
                inner: Err(_),
            }) => Ok(MatchStatus::NoMatch(preparsed_input)),

            Ok(MatchStatus::NoMatch(remainder)) => Ok(MatchStatus::NoMatch(remainder)),
            Err(e) => Err(e),
        }
    }
}

fn letters<'a>() -> impl Parser<'a, &'a [(usize, char)], String> {
    parcel::one_or_more(alphabetic().predicate(|c| c.is_ascii_alphabetic()))
        .map(|letters| letters.into_iter().collect())
}

/// Matches any single character in `candidates`.
fn one_of<'a>(candidates: &'static [char]) -> impl Parser<'a, &'a [(usize, char)], char> {
    move |input: &'a [(usize, char)]| match input.first() {
        Some(&(pos, next)) if candidates.contains(&next) => Ok(MatchStatus::Match {
            span: pos..pos + 1,
            remainder: &input[1..],
            inner: next,
        }),
        _ => Ok(MatchStatus::NoMatch(input)),
    }
}

/// A single, possibly escaped, character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Char {
    value: char,
    escaped: bool,
}

fn char<'a>() -> impl Parser<'a, &'a [(usize, char)], Char> {
    move |input: &'a [(usize, char)]| match input {
        [(escape_pos, '\\'), (_, 'x'), ..] => match hex_escape(&input[2..]) {
            Some((value, consumed)) => Ok(MatchStatus::Match {
                span: *escape_pos..*escape_pos + 2 + consumed,
                remainder: &input[2 + consumed..],
                inner: Char {
                    value,
                    escaped: true,
                },
            }),
            None => Ok(MatchStatus::NoMatch(input)),
        },
        [(escape_pos, '\\'), (to_escape_pos, to_escape), ..] => {
            match char_to_escaped_equivalent(*to_escape) {
                Some(value) => Ok(MatchStatus::Match {
                    span: *escape_pos..*to_escape_pos + 1,
                    remainder: &input[2..],
                    inner: Char {
                        value,
                        escaped: true,
                    },
                }),
                None => Ok(MatchStatus::NoMatch(input)),
            }
        }
        // a trailing backslash escapes nothing.
        [(_, '\\')] => Ok(MatchStatus::NoMatch(input)),
        [(next_pos, next), ..] => Ok(MatchStatus::Match {
            span: *next_pos..*next_pos + 1,
            remainder: &input[1..],
            inner: Char {
                value: *next,
                escaped: false,
            },
        }),
        [] => Ok(MatchStatus::NoMatch(input)),
    }
}

/// Decodes the digits following `\x`, either two hex digits or a braced
/// code point such as `{1F600}`, returning the character and the number of
/// input characters consumed.
fn hex_escape(input: &[(usize, char)]) -> Option<(char, usize)> {
    let (digits, consumed): (String, usize) = match input.first() {
        Some((_, '{')) => {
            let digits: String = input[1..]
                .iter()
                .map(|&(_, c)| c)
                .take_while(|&c| c != '}')
                .collect();
            let digit_cnt = digits.chars().count();

            match input.get(digit_cnt + 1) {
                Some((_, '}')) => (digits, digit_cnt + 2),
                _ => return None,
            }
        }
        _ => {
            let digits: String = input.iter().take(2).map(|&(_, c)| c).collect();
            if digits.chars().count() != 2 {
                return None;
            }

            (digits, 2)
        }
    };

    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .map(|c| (c, consumed))
}

fn char_to_escaped_equivalent(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'f' => Some('\u{C}'),
        'v' => Some('\u{B}'),
        '0' => Some('\0'),
        c if c.is_ascii_punctuation() => Some(c),
        _ => None,
    }
}
