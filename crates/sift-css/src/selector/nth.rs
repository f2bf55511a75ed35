//! The `An+B` microsyntax of the `:nth-*` pseudo-classes.
//!
//! [§ 4.13 The :nth-child() pseudo-class](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
//!
//! "The :nth-child(An+B) pseudo-class notation represents elements that are
//! among An+Bth elements from the list composed of their inclusive siblings
//! [...] for any positive integer or zero value of n."

/// A parsed `An+B` argument.
///
/// Positions are 1-based. The argument selects every position `p` for which
/// some `n >= 0` satisfies `a * n + b == p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthArgument {
    /// The step `A`. Zero selects the single position `b`.
    pub a: i64,
    /// The offset `B`.
    pub b: i64,
}

impl NthArgument {
    /// `:first-child` and friends are `:nth-child(1)`.
    pub const FIRST: Self = Self { a: 0, b: 1 };

    /// Parse an `odd`, `even` or `An+B` argument.
    ///
    /// [§ 6.1 An+B](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
    ///
    /// Whitespace is accepted between a sign and its digits, around the `n`,
    /// and between the two terms. A bare `n` means a step of 1, and a bare
    /// sign before `n` means ±1.
    ///
    /// Returns `None` for an empty argument, for text outside the grammar
    /// (`5+1`, `5k+1`, `2-1`), and for the degenerate `0n+0`, which can never
    /// select a position.
    #[must_use]
    pub fn parse(argument: &str) -> Option<Self> {
        let argument = argument.trim();
        if argument.eq_ignore_ascii_case("odd") {
            return Some(Self { a: 2, b: 1 });
        }
        if argument.eq_ignore_ascii_case("even") {
            return Some(Self { a: 2, b: 0 });
        }

        let (step, offset) = match argument.find(['n', 'N']) {
            Some(at) => (Some(&argument[..at]), &argument[at + 1..]),
            None => (None, argument),
        };

        let a = match step {
            None => 0,
            Some(step) => match signed_integer(step)? {
                (negative, None) => signed(negative, 1),
                (negative, Some(magnitude)) => signed(negative, magnitude),
            },
        };

        let offset = offset.trim_start();
        let b = if offset.is_empty() {
            0
        } else {
            match signed_integer(offset)? {
                (_, None) => return None,
                (negative, Some(magnitude)) => signed(negative, magnitude),
            }
        };

        if a == 0 && b == 0 {
            return None;
        }
        Some(Self { a, b })
    }

    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub fn matches(self, position: i64) -> bool {
        let distance = i128::from(position) - i128::from(self.b);
        if self.a == 0 {
            return distance == 0;
        }
        let a = i128::from(self.a);
        // n = distance / a must be a non-negative integer.
        distance % a == 0 && distance / a >= 0
    }

    /// The selected positions among `count` siblings, ascending.
    ///
    /// Only positions in `1..=count` are returned, whatever the sign of `a`.
    #[must_use]
    pub fn positions(self, count: usize) -> Vec<usize> {
        (1..=count)
            .filter(|&position| {
                i64::try_from(position).is_ok_and(|position| self.matches(position))
            })
            .collect()
    }
}

const fn signed(negative: bool, magnitude: i64) -> i64 {
    if negative { -magnitude } else { magnitude }
}

/// Split `[+-]? digits?` into its sign and optional magnitude.
///
/// Whitespace may separate the sign from the digits and may follow them.
fn signed_integer(text: &str) -> Option<(bool, Option<i64>)> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'+') => (false, &text[1..]),
        Some(b'-') => (true, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.trim();
    if digits.is_empty() {
        return Some((negative, None));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|magnitude| (negative, Some(magnitude)))
}
