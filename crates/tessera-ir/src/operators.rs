//! Arithmetic and logical operators.
//!
//! Builtin factories compose these when they rewrite a call into simpler primitives
//! (`a + b*1j`, `x is not None and bool(x)`, `start + i*step`).

use std::fmt;

use tessera_types::{ClassType, DataType, Precision};

use crate::expr::Expr;
use crate::literal::Literal;
use crate::signature::TypeSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Add,
    Minus,
    Mul,
    UnarySub,
    Not,
    And,
    IsNot,
}

impl OperatorKind {
    fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Add => "+",
            OperatorKind::Minus => "-",
            OperatorKind::Mul => "*",
            OperatorKind::UnarySub => "-",
            OperatorKind::Not => "not",
            OperatorKind::And => "and",
            OperatorKind::IsNot => "is not",
        }
    }

    fn is_binary(self) -> bool {
        !matches!(self, OperatorKind::UnarySub | OperatorKind::Not)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub kind: OperatorKind,
    pub args: Vec<Expr>,
    pub signature: TypeSignature,
}

impl Operator {
    fn build(kind: OperatorKind, args: Vec<Expr>) -> Expr {
        let signature = match kind {
            OperatorKind::Add | OperatorKind::Minus | OperatorKind::Mul => arithmetic_signature(&args),
            OperatorKind::UnarySub => {
                let sig = args[0].signature();
                if sig.dtype == DataType::Bool {
                    sig.with_element(DataType::Integer, Precision::DEFAULT)
                } else {
                    sig
                }
            }
            OperatorKind::Not | OperatorKind::And | OperatorKind::IsNot => {
                TypeSignature::scalar(DataType::Bool, Precision::DEFAULT)
            }
        };
        Expr::Operator(Box::new(Operator {
            kind,
            args,
            signature,
        }))
    }

    pub fn add(a: Expr, b: Expr) -> Expr {
        Self::build(OperatorKind::Add, vec![a, b])
    }

    pub fn minus(a: Expr, b: Expr) -> Expr {
        Self::build(OperatorKind::Minus, vec![a, b])
    }

    pub fn mul(a: Expr, b: Expr) -> Expr {
        Self::build(OperatorKind::Mul, vec![a, b])
    }

    pub fn unary_sub(a: Expr) -> Expr {
        Self::build(OperatorKind::UnarySub, vec![a])
    }

    pub fn not(a: Expr) -> Expr {
        Self::build(OperatorKind::Not, vec![a])
    }

    pub fn and(a: Expr, b: Expr) -> Expr {
        Self::build(OperatorKind::And, vec![a, b])
    }

    pub fn is_not(a: Expr, b: Expr) -> Expr {
        Self::build(OperatorKind::IsNot, vec![a, b])
    }

    /// `a + b`, folding integer literals and dropping a literal zero.
    ///
    /// A fold that would overflow `i64` is left as the symbolic sum.
    pub fn add_simplified(a: Expr, b: Expr) -> Expr {
        match (a.as_const_int(), b.as_const_int()) {
            (Some(x), Some(y)) => match x.checked_add(y).and_then(int_literal) {
                Some(sum) => sum,
                None => Self::add(a, b),
            },
            (Some(0), None) if is_integer_kind(&b) => b,
            (None, Some(0)) if is_integer_kind(&a) => a,
            _ => Self::add(a, b),
        }
    }

    /// `a * b`, folding integer literals and dropping a literal one.
    pub fn mul_simplified(a: Expr, b: Expr) -> Expr {
        match (a.as_const_int(), b.as_const_int()) {
            (Some(x), Some(y)) => match x.checked_mul(y).and_then(int_literal) {
                Some(product) => product,
                None => Self::mul(a, b),
            },
            (Some(1), None) if is_integer_kind(&b) => b,
            (None, Some(1)) if is_integer_kind(&a) => a,
            _ => Self::mul(a, b),
        }
    }

    /// `n` when this node is `-n` for an integer literal `n`.
    pub fn as_negated_literal(&self) -> Option<i64> {
        match (self.kind, self.args.as_slice()) {
            (OperatorKind::UnarySub, [Expr::Literal(Literal::Integer { value, .. })]) => Some(*value),
            _ => None,
        }
    }
}

/// `None` for `i64::MIN`, whose magnitude has no literal.
fn int_literal(value: i64) -> Option<Expr> {
    if value < 0 {
        value.checked_neg().map(|magnitude| Operator::unary_sub(Expr::int(magnitude)))
    } else {
        Some(Expr::int(value))
    }
}

fn is_integer_kind(e: &Expr) -> bool {
    matches!(e.dtype(), DataType::Integer | DataType::Generic)
}

/// Element kind is the promotion of all operand kinds; the shape comes from the
/// operand of highest rank (broadcasting is not checked here).
fn arithmetic_signature(args: &[Expr]) -> TypeSignature {
    let sigs: Vec<TypeSignature> = args.iter().map(Expr::signature).collect();
    let dtype = sigs
        .iter()
        .skip(1)
        .try_fold(sigs[0].dtype.clone(), |acc, s| acc.promote(&s.dtype))
        .unwrap_or(DataType::Generic);

    let same_kind: Vec<&TypeSignature> = sigs.iter().filter(|s| s.dtype == dtype).collect();
    let precision = if same_kind.iter().all(|s| s.precision.is_default()) {
        Precision::DEFAULT
    } else {
        same_kind
            .iter()
            .map(|s| s.final_precision())
            .max()
            .map_or(Precision::DEFAULT, Precision::new)
    };

    let widest = sigs
        .iter()
        .max_by_key(|s| s.rank)
        .cloned()
        .unwrap_or_else(TypeSignature::untyped);
    if widest.rank == 0 {
        return TypeSignature::scalar(dtype, precision);
    }
    let class_type = match widest.class_type {
        ClassType::Scalar => ClassType::NdArray,
        other => other,
    };
    TypeSignature {
        dtype,
        precision,
        class_type,
        ..widest
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = |e: &Expr| match e {
            Expr::Operator(inner) if inner.kind.is_binary() => format!("({})", inner),
            other => other.to_string(),
        };
        match self.kind {
            OperatorKind::UnarySub => write!(f, "-{}", operand(&self.args[0])),
            OperatorKind::Not => write!(f, "not {}", operand(&self.args[0])),
            kind => write!(
                f,
                "{} {} {}",
                operand(&self.args[0]),
                kind.symbol(),
                operand(&self.args[1])
            ),
        }
    }
}
