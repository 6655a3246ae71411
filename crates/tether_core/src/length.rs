//! Lengths
//!
//! A [`Length`] is either a concrete measurement in one unit or a symbolic
//! expression over other lengths. Arithmetic folds eagerly whenever the
//! operands can be expressed in the same unit and falls back to an
//! expression tree otherwise, so `10px + 1in` stays symbolic while
//! `1in + 2.54cm` folds to `2in`.

use std::fmt;
use std::ops;

/// Centimetres per inch
const CM_PER_IN: f64 = 2.54;

#[derive(Debug, Clone, PartialEq)]
pub enum Length {
    Px(f64),
    In(f64),
    Cm(f64),
    /// Percent of the viewport width
    Vw(f64),
    /// Percent of the viewport height
    Vh(f64),
    Add(Box<Length>, Box<Length>),
    Sub(Box<Length>, Box<Length>),
    Mul(Box<Length>, f64),
    Div(Box<Length>, f64),
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

impl Length {
    /// Whether this is a single unit value rather than an expression
    pub fn is_concrete(&self) -> bool {
        self.magnitude().is_some()
    }

    /// Numeric magnitude of a concrete length
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Length::Px(n) | Length::In(n) | Length::Cm(n) | Length::Vw(n) | Length::Vh(n) => {
                Some(*n)
            }
            _ => None,
        }
    }

    fn is_zero_px(&self) -> bool {
        matches!(self, Length::Px(n) if *n == 0.0)
    }

    /// Same unit as `self`, different magnitude. Expressions return `None`.
    fn with_magnitude(&self, n: f64) -> Option<Length> {
        match self {
            Length::Px(_) => Some(Length::Px(n)),
            Length::In(_) => Some(Length::In(n)),
            Length::Cm(_) => Some(Length::Cm(n)),
            Length::Vw(_) => Some(Length::Vw(n)),
            Length::Vh(_) => Some(Length::Vh(n)),
            _ => None,
        }
    }

    /// Magnitude of `self` expressed in the unit of `target`
    fn convert_to(&self, target: &Length) -> Option<f64> {
        match (self, target) {
            (Length::Px(n), Length::Px(_))
            | (Length::In(n), Length::In(_))
            | (Length::Cm(n), Length::Cm(_))
            | (Length::Vw(n), Length::Vw(_))
            | (Length::Vh(n), Length::Vh(_)) => Some(*n),
            (Length::In(n), Length::Cm(_)) => Some(n * CM_PER_IN),
            (Length::Cm(n), Length::In(_)) => Some(n / CM_PER_IN),
            _ => None,
        }
    }

    fn fold(self, rhs: Length, op: fn(f64, f64) -> f64) -> Result<Length, (Length, Length)> {
        let folded = match (self.magnitude(), rhs.convert_to(&self)) {
            (Some(l), Some(r)) => self.with_magnitude(op(l, r)),
            _ => None,
        };
        folded.ok_or((self, rhs))
    }
}

impl ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        if self.is_zero_px() {
            return rhs;
        }
        if rhs.is_zero_px() {
            return self;
        }
        match self.fold(rhs, |a, b| a + b) {
            Ok(folded) => folded,
            Err((l, r)) => Length::Add(Box::new(l), Box::new(r)),
        }
    }
}

impl ops::Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        if rhs.is_zero_px() {
            return self;
        }
        if self.is_zero_px() {
            return -rhs;
        }
        match self.fold(rhs, |a, b| a - b) {
            Ok(folded) => folded,
            Err((l, r)) => Length::Sub(Box::new(l), Box::new(r)),
        }
    }
}

impl ops::Mul<f64> for Length {
    type Output = Length;

    fn mul(self, rhs: f64) -> Length {
        if rhs == 1.0 {
            return self;
        }
        if rhs == 0.0 {
            return Length::Px(0.0);
        }
        match self {
            Length::Mul(inner, n) => *inner * (n * rhs),
            other => match other.magnitude() {
                Some(n) => other.with_magnitude(n * rhs).unwrap_or(other),
                None => Length::Mul(Box::new(other), rhs),
            },
        }
    }
}

impl ops::Div<f64> for Length {
    type Output = Length;

    fn div(self, rhs: f64) -> Length {
        if rhs == 0.0 || rhs.is_nan() {
            tracing::warn!(length = %self, "attempted to divide a length by zero");
            return Length::Px(0.0);
        }
        if rhs == 1.0 {
            return self;
        }
        match self.magnitude() {
            Some(n) => self.with_magnitude(n / rhs).unwrap_or(self),
            None => Length::Div(Box::new(self), rhs),
        }
    }
}

impl ops::Neg for Length {
    type Output = Length;

    fn neg(self) -> Length {
        match self {
            Length::Add(l, r) => -*l + -*r,
            Length::Sub(l, r) => -*l - -*r,
            Length::Mul(l, n) => *l * -n,
            Length::Div(l, n) => *l / -n,
            concrete => match concrete.magnitude() {
                Some(n) => concrete.with_magnitude(-n).unwrap_or(concrete),
                None => concrete,
            },
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(n) => write!(f, "{n}px"),
            Length::In(n) => write!(f, "{n}in"),
            Length::Cm(n) => write!(f, "{n}cm"),
            Length::Vw(n) => write!(f, "{n}vw"),
            Length::Vh(n) => write!(f, "{n}vh"),
            Length::Add(l, r) => write!(f, "({l} + {r})"),
            Length::Sub(l, r) => write!(f, "({l} - {r})"),
            Length::Mul(l, n) => write!(f, "({l} * {n})"),
            Length::Div(l, n) => write!(f, "({l} / {n})"),
        }
    }
}
