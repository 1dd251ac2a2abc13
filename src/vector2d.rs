//! A 2-D vector element type ordered by magnitude.

use std::cmp::Ordering;
use std::fmt;
use std::num::ParseFloatError;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point or displacement in the plane.
///
/// Equality compares coordinates. Ordering is by Euclidean magnitude through
/// [`Vector2D::cmp_magnitude`], which is what containers sort by:
///
/// ```
/// use tiered_vec::{TieredVec, Vector2D};
///
/// let mut vec = TieredVec::new(2).unwrap();
/// vec.extend([Vector2D::new(3.0, 4.0), Vector2D::new(1.0, 0.0), Vector2D::new(0.0, -2.0)]);
/// vec.sort_by(Vector2D::cmp_magnitude);
/// assert_eq!(vec.to_string(), "[(1, 0), (0, -2)\n(3, 4)]");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Scales to unit length. The zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();
        if magnitude != 0.0 {
            self.x /= magnitude;
            self.y /= magnitude;
        }
    }

    /// Returns a unit-length copy, or the zero vector unchanged.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Total order by magnitude. Vectors of equal length compare equal
    /// whatever their direction.
    #[inline]
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.magnitude().total_cmp(&other.magnitude())
    }
}

impl Add for Vector2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vector2D {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vector2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Vector2D {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Error returned when parsing a [`Vector2D`] from text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseVector2DError {
    #[error("expected two comma-separated components, found {found}")]
    WrongComponentCount { found: usize },

    #[error("invalid component: {0}")]
    InvalidNumber(#[from] ParseFloatError),
}

impl FromStr for Vector2D {
    type Err = ParseVector2DError;

    /// Parses `"x, y"`. Surrounding parentheses are accepted, so the
    /// `Display` form parses back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = inner.split(',').collect();
        let [x, y] = parts.as_slice() else {
            return Err(ParseVector2DError::WrongComponentCount { found: parts.len() });
        };
        Ok(Self::new(x.trim().parse()?, y.trim().parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude() {
        assert_eq!(Vector2D::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Vector2D::default().magnitude(), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = Vector2D::new(0.0, -5.0);
        v.normalize();
        assert_eq!(v, Vector2D::new(0.0, -1.0));

        let mut zero = Vector2D::default();
        zero.normalize();
        assert_eq!(zero, Vector2D::default());

        let unit = Vector2D::new(3.0, 4.0).normalized();
        assert!((unit.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector2D::new(1.5, 2.0);
        let b = Vector2D::new(0.5, -1.0);
        assert_eq!(a + b, Vector2D::new(2.0, 1.0));
        assert_eq!(a - b, Vector2D::new(1.0, 3.0));

        let mut c = a;
        c += b;
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_cmp_magnitude() {
        let short = Vector2D::new(1.0, 1.0);
        let long = Vector2D::new(-3.0, 0.0);
        assert_eq!(short.cmp_magnitude(&long), Ordering::Less);
        assert_eq!(long.cmp_magnitude(&short), Ordering::Greater);
        assert_eq!(
            Vector2D::new(1.0, 0.0).cmp_magnitude(&Vector2D::new(0.0, -1.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("1.5, -2".parse::<Vector2D>(), Ok(Vector2D::new(1.5, -2.0)));
        assert_eq!("  3,4 ".parse::<Vector2D>(), Ok(Vector2D::new(3.0, 4.0)));
        assert_eq!("(0.25, 8)".parse::<Vector2D>(), Ok(Vector2D::new(0.25, 8.0)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "1, 2, 3".parse::<Vector2D>(),
            Err(ParseVector2DError::WrongComponentCount { found: 3 })
        );
        assert_eq!(
            "42".parse::<Vector2D>(),
            Err(ParseVector2DError::WrongComponentCount { found: 1 })
        );
        assert!(matches!(
            "x, 1".parse::<Vector2D>(),
            Err(ParseVector2DError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let v = Vector2D::new(-0.5, 12.0);
        assert_eq!(v.to_string(), "(-0.5, 12)");
        assert_eq!(v.to_string().parse::<Vector2D>(), Ok(v));
    }
}
