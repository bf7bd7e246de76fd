//! Constant values appearing in the IR.

use std::fmt;

use tessera_types::{DataType, Precision};

/// A compile-time constant.
///
/// Numeric literals carry their own precision so that `int(x)` on a literal written with an
/// explicit kind can still be folded to the default-precision value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Integer { value: i64, precision: Precision },
    Float { value: f64, precision: Precision },
    Complex { real: f64, imag: f64, precision: Precision },
    /// The imaginary unit `1j`.
    ImaginaryUnit,
    String(String),
    /// The absent value (`None`).
    Nil,
}

impl Literal {
    pub fn int(value: i64) -> Self {
        Literal::Integer { value, precision: Precision::DEFAULT }
    }

    pub fn float(value: f64) -> Self {
        Literal::Float { value, precision: Precision::DEFAULT }
    }

    pub fn complex(real: f64, imag: f64) -> Self {
        Literal::Complex { real, imag, precision: Precision::DEFAULT }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Literal::Bool(_) => DataType::Bool,
            Literal::Integer { .. } => DataType::Integer,
            Literal::Float { .. } => DataType::Float,
            Literal::Complex { .. } | Literal::ImaginaryUnit => DataType::Complex,
            Literal::String(_) => DataType::String,
            Literal::Nil => DataType::Generic,
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            Literal::Integer { precision, .. }
            | Literal::Float { precision, .. }
            | Literal::Complex { precision, .. } => *precision,
            _ => Precision::DEFAULT,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype().is_numeric()
    }

    /// Real component of a numeric literal.
    pub fn real_part(&self) -> Option<f64> {
        match self {
            Literal::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Literal::Integer { value, .. } => Some(*value as f64),
            Literal::Float { value, .. } => Some(*value),
            Literal::Complex { real, .. } => Some(*real),
            Literal::ImaginaryUnit => Some(0.0),
            _ => None,
        }
    }

    /// Imaginary component of a numeric literal (zero for real kinds).
    pub fn imag_part(&self) -> Option<f64> {
        match self {
            Literal::Complex { imag, .. } => Some(*imag),
            Literal::ImaginaryUnit => Some(1.0),
            other if other.is_numeric() => Some(0.0),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(
            (self.real_part(), self.imag_part()),
            (Some(re), Some(im)) if re == 0.0 && im == 0.0
        )
    }

    /// The integer value of an `int` or `bool` literal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Integer { value, .. } => Some(*value),
            Literal::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// The zero value of a numeric kind: `False`, `0`, `0.0` or `0j`.
    pub fn zero_of(dtype: &DataType) -> Option<Literal> {
        match dtype {
            DataType::Bool => Some(Literal::Bool(false)),
            DataType::Integer => Some(Literal::int(0)),
            DataType::Float => Some(Literal::float(0.0)),
            DataType::Complex => Some(Literal::complex(0.0, 0.0)),
            _ => None,
        }
    }

    /// Re-expresses the literal in `target` at default precision.
    ///
    /// Only conversions that keep the numeric value are performed, so this returns
    /// `None` unless `self.dtype()` is a subset of `target`.
    pub fn convert_to(&self, target: &DataType) -> Option<Literal> {
        if !self.dtype().is_subset_of(target) {
            return None;
        }
        let re = self.real_part()?;
        match target {
            DataType::Bool => self.as_int().map(|v| Literal::Bool(v != 0)),
            DataType::Integer => self.as_int().map(Literal::int),
            DataType::Float => Some(Literal::float(re)),
            DataType::Complex => Some(Literal::complex(re, self.imag_part()?)),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Integer { value, .. } => write!(f, "{}", value),
            Literal::Float { value, .. } => write!(f, "{:?}", value),
            Literal::Complex { real, imag, .. } => {
                if *imag < 0.0 {
                    write!(f, "({:?}-{:?}j)", real, -imag)
                } else {
                    write!(f, "({:?}+{:?}j)", real, imag)
                }
            }
            Literal::ImaginaryUnit => write!(f, "1j"),
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Nil => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_keeps_value() {
        assert_eq!(Literal::Bool(true).convert_to(&DataType::Integer), Some(Literal::int(1)));
        assert_eq!(Literal::int(3).convert_to(&DataType::Float), Some(Literal::float(3.0)));
        assert_eq!(Literal::float(3.5).convert_to(&DataType::Integer), None);
    }

    #[test]
    fn explicit_precision_is_dropped_on_conversion() {
        let lit = Literal::Integer { value: 7, precision: Precision::new(4) };
        assert_eq!(lit.convert_to(&DataType::Integer), Some(Literal::int(7)));
    }

    #[test]
    fn imaginary_unit_parts() {
        assert_eq!(Literal::ImaginaryUnit.real_part(), Some(0.0));
        assert_eq!(Literal::ImaginaryUnit.imag_part(), Some(1.0));
        assert!(!Literal::ImaginaryUnit.is_zero());
        assert!(Literal::Bool(false).is_zero());
    }

    #[test]
    fn display() {
        assert_eq!(Literal::complex(2.0, -3.0).to_string(), "(2.0-3.0j)");
        assert_eq!(Literal::float(0.5).to_string(), "0.5");
        assert_eq!(Literal::Nil.to_string(), "None");
    }
}
