//! The type signature carried by every typed node.

use tessera_types::{ClassType, DataType, Order, Precision};

use crate::expr::Expr;

/// Per-dimension sizes. `None` marks a dimension whose size is not known.
pub type Shape = Vec<Option<Expr>>;

/// `{dtype, precision, rank, shape, order, class_type}` of a node.
///
/// Invariant: `rank == 0` implies `shape.is_none()`; otherwise `shape` holds exactly
/// `rank` entries when present.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSignature {
    pub dtype: DataType,
    pub precision: Precision,
    pub rank: usize,
    pub shape: Option<Shape>,
    pub order: Option<Order>,
    pub class_type: ClassType,
}

impl TypeSignature {
    pub fn scalar(dtype: DataType, precision: Precision) -> Self {
        TypeSignature {
            dtype,
            precision,
            rank: 0,
            shape: None,
            order: None,
            class_type: ClassType::Scalar,
        }
    }

    /// The signature of a node whose type has not been derived yet.
    pub fn untyped() -> Self {
        Self::scalar(DataType::Generic, Precision::DEFAULT)
    }

    pub fn void() -> Self {
        Self::scalar(DataType::Void, Precision::DEFAULT)
    }

    /// A multi-dimensional signature; `rank` is taken from `shape`.
    pub fn array(
        dtype: DataType,
        precision: Precision,
        shape: Shape,
        order: Option<Order>,
        class_type: ClassType,
    ) -> Self {
        if shape.is_empty() {
            return Self::scalar(dtype, precision);
        }
        TypeSignature {
            dtype,
            precision,
            rank: shape.len(),
            shape: Some(shape),
            order,
            class_type,
        }
    }

    /// One-dimensional sequence of `dtype` elements with the given length.
    pub fn sequence(dtype: DataType, length: Option<Expr>) -> Self {
        Self::array(dtype, Precision::DEFAULT, vec![length], None, ClassType::NdArray)
    }

    /// Same rank, shape, order and class as `self`, with a new element kind.
    pub fn with_element(&self, dtype: DataType, precision: Precision) -> Self {
        TypeSignature {
            dtype,
            precision,
            ..self.clone()
        }
    }

    /// Precision with the default resolved against the dtype.
    pub fn final_precision(&self) -> i8 {
        self.precision.resolve(&self.dtype)
    }

    pub fn is_scalar(&self) -> bool {
        self.rank == 0
    }

    pub fn is_typed(&self) -> bool {
        self.dtype != DataType::Generic
    }

    /// Size expression of the leading dimension, if known.
    pub fn first_dim(&self) -> Option<&Expr> {
        self.shape.as_ref()?.first()?.as_ref()
    }

    /// `dtype(final_precision)` as used in user-facing messages.
    pub fn describe(&self) -> String {
        format!("{}({})", self.dtype, self.final_precision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;

    #[test]
    fn empty_shape_collapses_to_scalar() {
        let sig = TypeSignature::array(
            DataType::Float,
            Precision::DEFAULT,
            vec![],
            Some(Order::C),
            ClassType::NdArray,
        );
        assert_eq!(sig.rank, 0);
        assert!(sig.shape.is_none());
        assert!(sig.order.is_none());
    }

    #[test]
    fn first_dim_of_sequence() {
        let sig = TypeSignature::sequence(DataType::Integer, Some(Expr::Literal(Literal::int(5))));
        assert_eq!(sig.first_dim(), Some(&Expr::Literal(Literal::int(5))));
        assert_eq!(sig.describe(), "int(8)");
    }
}
