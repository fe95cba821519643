//! Register numbers.
//!
//! Patients are registered as `<sequence>/<yy>`, e.g. `42/23` is the 42nd
//! registration of 2023. Ordering is chronological: year first, then sequence.
//! Values that are missing altogether get [`RegisterKey::Missing`], which
//! orders after every parsed key.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterKey {
    Parsed { sequence: u64, year: u32 },
    Missing,
}

impl RegisterKey {
    /// Total and infallible. Malformed parts fall back to zero rather than
    /// failing: a non-numeric sequence is 0, an absent or non-numeric year is 0.
    /// A two-digit year is an offset from 2000; a longer one is taken as-is.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return RegisterKey::Missing,
        };

        let mut parts = raw.split('/');
        let sequence = parts
            .next()
            .and_then(|s| leading_number(s.trim()))
            .unwrap_or(0);
        let year = parts
            .next()
            .and_then(|y| leading_number(y.trim()))
            .map(|y| if y < 100 { 2000 + y } else { y })
            .and_then(|y| u32::try_from(y).ok())
            .unwrap_or(0);

        RegisterKey::Parsed { sequence, year }
    }
}

/// Integer prefix of `s`, so `"12a"` reads as 12 and `"a12"` as nothing.
fn leading_number(s: &str) -> Option<u64> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

impl Ord for RegisterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                RegisterKey::Parsed {
                    sequence: sa,
                    year: ya,
                },
                RegisterKey::Parsed {
                    sequence: sb,
                    year: yb,
                },
            ) => ya.cmp(yb).then(sa.cmp(sb)),
            (RegisterKey::Parsed { .. }, RegisterKey::Missing) => Ordering::Less,
            (RegisterKey::Missing, RegisterKey::Parsed { .. }) => Ordering::Greater,
            (RegisterKey::Missing, RegisterKey::Missing) => Ordering::Equal,
        }
    }
}

impl PartialOrd for RegisterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
