//! Provides a sorted set of disjoint character ranges, supporting lookup of
//! the `i`-th member character.

use std::ops::RangeInclusive;

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;
const MAX_CODE_POINT: u32 = char::MAX as u32;

/// A character class represented as an ascending list of disjoint, non-adjacent
/// inclusive ranges. A range never spans the surrogate gap, so every offset
/// into a range maps to a valid `char`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<RangeInclusive<char>>,
    /// The count of characters preceding each range.
    offsets: Vec<u32>,
    len: u32,
}

impl RangeSet {
    /// Builds a set from an unordered list of inclusive `(start, end)` pairs.
    /// Overlapping and touching pairs are merged. Pairs where `start > end`
    /// are discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use regen_runtime::RangeSet;
    ///
    /// let set = RangeSet::new([('x', 'z'), ('a', 'c'), ('b', 'd')]);
    ///
    /// assert_eq!(&['a'..='d', 'x'..='z'], set.ranges());
    /// assert_eq!(7, set.len());
    /// assert_eq!('x', set.get(4));
    /// ```
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        Self::from_code_points(
            pairs
                .into_iter()
                .map(|(start, end)| (start as u32, end as u32))
                .collect(),
        )
    }

    /// A set containing every Unicode scalar value.
    pub fn any() -> Self {
        Self::from_code_points(vec![(0, MAX_CODE_POINT)])
    }

    /// A set containing every Unicode scalar value except `NUL` and `\n`.
    pub fn any_except_newline() -> Self {
        Self::from_code_points(vec![(1, '\n' as u32 - 1), ('\n' as u32 + 1, MAX_CODE_POINT)])
    }

    fn from_code_points(mut pairs: Vec<(u32, u32)>) -> Self {
        pairs.retain(|(start, end)| start <= end && *start <= MAX_CODE_POINT);
        pairs.sort_unstable();

        let merged = pairs
            .into_iter()
            .map(|(start, end)| (start, end.min(MAX_CODE_POINT)))
            .fold(Vec::<(u32, u32)>::new(), |mut acc, (start, end)| {
                match acc.last_mut() {
                    Some((_, last_end)) if start <= *last_end + 1 => {
                        *last_end = (*last_end).max(end)
                    }
                    _ => acc.push((start, end)),
                }
                acc
            });

        // split anything straddling the surrogate gap.
        let ranges: Vec<RangeInclusive<char>> = merged
            .into_iter()
            .flat_map(|(start, end)| {
                let below = (start < SURROGATE_START).then(|| (start, end.min(SURROGATE_START - 1)));
                let above = (end > SURROGATE_END).then(|| (start.max(SURROGATE_END + 1), end));

                below.into_iter().chain(above)
            })
            .filter_map(|(start, end)| Some(char::from_u32(start)?..=char::from_u32(end)?))
            .collect();

        let (offsets, len) = ranges
            .iter()
            .fold((Vec::with_capacity(ranges.len()), 0u32), |(mut offsets, total), r| {
                offsets.push(total);
                (offsets, total + range_len(r))
            });

        Self {
            ranges,
            offsets,
            len,
        }
    }

    /// Returns the complement of this set over all Unicode scalar values.
    ///
    /// # Example
    ///
    /// ```
    /// use regen_runtime::RangeSet;
    ///
    /// let set = RangeSet::new([('\0', '`'), ('{', char::MAX)]).negate();
    ///
    /// assert_eq!(&['a'..='z'], set.ranges());
    /// ```
    pub fn negate(&self) -> Self {
        let (mut gaps, next) =
            self.ranges
                .iter()
                .fold((vec![], 0u32), |(mut gaps, next), r| {
                    let (start, end) = (*r.start() as u32, *r.end() as u32);
                    if start > next {
                        gaps.push((next, start - 1));
                    }
                    (gaps, end + 1)
                });

        if next <= MAX_CODE_POINT {
            gaps.push((next, MAX_CODE_POINT));
        }

        Self::from_code_points(gaps)
    }

    /// Returns the `index`-th character of the set in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`RangeSet::len`].
    pub fn get(&self, index: u32) -> char {
        assert!(
            index < self.len,
            "index {} out of range for a set of {} characters",
            index,
            self.len
        );

        // offsets[0] is always 0 so the partition point is at least 1.
        let pos = self.offsets.partition_point(|&offset| offset <= index) - 1;
        let code_point = *self.ranges[pos].start() as u32 + (index - self.offsets[pos]);

        char::from_u32(code_point).expect("ranges never span the surrogate gap")
    }

    /// Returns `true` if `c` is a member of the set.
    pub fn contains(&self, c: char) -> bool {
        let pos = self.ranges.partition_point(|r| *r.end() < c);
        self.ranges.get(pos).map_or(false, |r| r.contains(&c))
    }

    /// Returns the total number of characters in the set.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Returns `true` if the set contains no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The normalized ranges of the set in ascending order.
    pub fn ranges(&self) -> &[RangeInclusive<char>] {
        &self.ranges
    }
}

impl FromIterator<RangeInclusive<char>> for RangeSet {
    fn from_iter<T: IntoIterator<Item = RangeInclusive<char>>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(|r| (*r.start(), *r.end())))
    }
}

fn range_len(r: &RangeInclusive<char>) -> u32 {
    *r.end() as u32 - *r.start() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_merge_overlapping_and_adjacent_ranges() {
        let set = RangeSet::new([('d', 'f'), ('a', 'c'), ('e', 'h'), ('0', '9')]);

        assert_eq!(&['0'..='9', 'a'..='h'], set.ranges());
        assert_eq!(18, set.len());
    }

    #[test]
    fn should_discard_inverted_pairs() {
        let set = RangeSet::new([('z', 'a'), ('b', 'b')]);

        assert_eq!(&['b'..='b'], set.ranges());
        assert_eq!(1, set.len());
    }

    #[test]
    fn should_resolve_indexes_in_ascending_order() {
        let set = RangeSet::new([('x', 'z'), ('a', 'c')]);
        let members: String = (0..set.len()).map(|idx| set.get(idx)).collect();

        assert_eq!("abcxyz", members);
    }

    #[test]
    fn should_exclude_surrogates_from_any() {
        let set = RangeSet::any();

        assert_eq!(&['\0'..='\u{D7FF}', '\u{E000}'..=char::MAX], set.ranges());
        assert_eq!(0x110000 - 0x800, set.len());
        assert_eq!('\u{E000}', set.get(0xD800));
        assert_eq!(char::MAX, set.get(set.len() - 1));
    }

    #[test]
    fn should_exclude_nul_and_newline_from_any_except_newline() {
        let set = RangeSet::any_except_newline();

        assert!(!set.contains('\0'));
        assert!(!set.contains('\n'));
        assert!(set.contains('\t'));
        assert!(set.contains('\u{B}'));
        assert_eq!('\u{1}', set.get(0));
        assert_eq!('\u{B}', set.get(9));
    }

    #[test]
    fn should_negate_against_all_scalar_values() {
        let set = RangeSet::new([('b', 'y')]).negate();

        assert!(set.contains('a'));
        assert!(set.contains('z'));
        assert!(!set.contains('m'));
        assert_eq!(RangeSet::any().len() - 24, set.len());
        assert_eq!(RangeSet::new([('b', 'y')]), set.negate());
    }

    #[test]
    fn should_yield_empty_set_when_negating_everything() {
        let set = RangeSet::any().negate();

        assert!(set.is_empty());
        assert!(!set.contains('a'));
    }

    #[test]
    #[should_panic]
    fn should_panic_on_out_of_range_index() {
        RangeSet::new([('a', 'b')]).get(2);
    }
}
