// Copyright (C) 2019-2026 Moment Algebra Contributors.
// This file is part of the Moment Algebra library.

// The Moment Algebra library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The Moment Algebra library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the Moment Algebra library. If not, see <https://www.gnu.org/licenses/>.

use std::fmt;
use std::ops::{Mul, Neg};

/// A sign tag on a hashed sequence: one of `{+1, +i, -1, -i}`, forming `Z/4`
/// under multiplication. The absorbing "zero" element is *not* a fifth
/// variant of this enum — it is tracked separately as a boolean flag on
/// [`crate::HashedSequence`], per the distinction the source material draws
/// between a sentinel and a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Sign {
    #[default]
    Positive,
    ImaginaryPositive,
    Negative,
    ImaginaryNegative,
}

impl Sign {
    /// This sign's exponent `k` such that the sign equals `i^k`.
    const fn exponent(self) -> u8 {
        match self {
            Sign::Positive => 0,
            Sign::ImaginaryPositive => 1,
            Sign::Negative => 2,
            Sign::ImaginaryNegative => 3,
        }
    }

    const fn from_exponent(k: u8) -> Self {
        match k % 4 {
            0 => Sign::Positive,
            1 => Sign::ImaginaryPositive,
            2 => Sign::Negative,
            _ => Sign::ImaginaryNegative,
        }
    }

    /// The complex conjugate of this sign: `i^k` conjugates to `i^{-k}`.
    #[must_use]
    pub const fn conjugate(self) -> Self {
        Self::from_exponent((4 - self.exponent()) % 4)
    }

    /// True for the two real signs (`+1`, `-1`).
    #[must_use]
    pub const fn is_real(self) -> bool {
        matches!(self, Sign::Positive | Sign::Negative)
    }

    /// This sign as a real coefficient, or `None` if the sign is imaginary.
    #[must_use]
    pub const fn as_real(self) -> Option<f64> {
        match self {
            Sign::Positive => Some(1.0),
            Sign::Negative => Some(-1.0),
            _ => None,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        Self::from_exponent(self.exponent() + rhs.exponent())
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        self * Sign::Negative
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sign::Positive => "+1",
            Sign::ImaginaryPositive => "+i",
            Sign::Negative => "-1",
            Sign::ImaginaryNegative => "-i",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_cyclic_group_of_order_four() {
        let all = [Sign::Positive, Sign::ImaginaryPositive, Sign::Negative, Sign::ImaginaryNegative];
        for &s in &all {
            assert_eq!(s * Sign::Positive, s);
        }
        assert_eq!(Sign::ImaginaryPositive * Sign::ImaginaryPositive, Sign::Negative);
        assert_eq!(Sign::ImaginaryPositive * Sign::ImaginaryPositive * Sign::ImaginaryPositive, Sign::ImaginaryNegative);
        assert_eq!(Sign::ImaginaryNegative * Sign::ImaginaryPositive, Sign::Positive);
        assert_eq!(-Sign::Positive, Sign::Negative);
        assert_eq!(-(-Sign::Negative), Sign::Negative);
    }

    #[test]
    fn conjugate_fixes_real_signs() {
        assert_eq!(Sign::Positive.conjugate(), Sign::Positive);
        assert_eq!(Sign::Negative.conjugate(), Sign::Negative);
        assert_eq!(Sign::ImaginaryPositive.conjugate(), Sign::ImaginaryNegative);
        assert_eq!(Sign::ImaginaryNegative.conjugate(), Sign::ImaginaryPositive);
    }
}
