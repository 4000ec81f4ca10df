//! Normalizes a syntax tree into an equivalent, smaller form before
//! compilation.

use regen_runtime::RangeSet;

use crate::syntax::{Op, Regexp};

impl Regexp {
    /// Returns an equivalent tree with redundant forms collapsed.
    ///
    /// Nodes with a malformed number of sub-expressions are returned
    /// unchanged, apart from their simplified children, so that the compiler
    /// can report them.
    ///
    /// # Example
    ///
    /// ```
    /// use regen_compiler::syntax::Regexp;
    ///
    /// let regexp = Regexp::repeat(Regexp::star(Regexp::literal("a")), 0, -1);
    ///
    /// assert_eq!("a*", regexp.simplify().to_string());
    /// ```
    #[must_use]
    pub fn simplify(&self) -> Regexp {
        let sub: Vec<Regexp> = self.sub.iter().map(Regexp::simplify).collect();

        match self.op {
            Op::Star | Op::Plus | Op::Quest if sub.len() == 1 => {
                postfix(self.op, sub.into_iter().next().unwrap_or_else(empty))
            }
            Op::Repeat if sub.len() == 1 => {
                let inner = sub.into_iter().next().unwrap_or_else(empty);

                match (self.min, self.max) {
                    (0, 0) => empty(),
                    (1, 1) => inner,
                    (0, max) if max < 0 => postfix(Op::Star, inner),
                    (1, max) if max < 0 => postfix(Op::Plus, inner),
                    (0, 1) => postfix(Op::Quest, inner),
                    (min, max)
                        if inner.op == Op::EmptyMatch && min >= 0 && (max < 0 || max >= min) =>
                    {
                        inner
                    }
                    (min, max) => Regexp::repeat(inner, min, max),
                }
            }
            Op::Concat => {
                let flattened = sub.into_iter().fold(Vec::new(), push_concatenated);

                match flattened.len() {
                    0 => empty(),
                    1 => flattened.into_iter().next().unwrap_or_else(empty),
                    _ => Regexp::concat(flattened),
                }
            }
            Op::Alternate => match sub.len() {
                0 => Regexp::new(Op::NoMatch),
                1 => sub.into_iter().next().unwrap_or_else(empty),
                _ => Regexp::alternate(sub),
            },
            Op::CharClass if RangeSet::new(self.ranges.iter().copied()).is_empty() => {
                Regexp::new(Op::NoMatch)
            }
            _ => Regexp {
                sub,
                ..self.clone()
            },
        }
    }
}

/// Appends `next` to a concatenation, splicing nested concatenations and
/// merging adjacent literals.
fn push_concatenated(mut acc: Vec<Regexp>, next: Regexp) -> Vec<Regexp> {
    match next.op {
        Op::EmptyMatch => acc,
        Op::Concat => next.sub.into_iter().fold(acc, push_concatenated),
        Op::Literal => {
            match acc.last_mut() {
                Some(last) if last.op == Op::Literal => last.runes.extend(next.runes),
                _ => acc.push(next),
            }
            acc
        }
        _ => {
            acc.push(next);
            acc
        }
    }
}

fn empty() -> Regexp {
    Regexp::new(Op::EmptyMatch)
}

/// Builds `inner` followed by a `*`, `+` or `?`, collapsing `x**`, `x++`
/// and `x??` and repetitions of the empty string.
fn postfix(op: Op, inner: Regexp) -> Regexp {
    if inner.op == Op::EmptyMatch || inner.op == op {
        return inner;
    }

    Regexp::new(op).with_sub(vec![inner])
}
