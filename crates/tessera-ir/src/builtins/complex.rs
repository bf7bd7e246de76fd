//! `complex(a, b)` and the `.real`, `.imag`, `.conjugate()` accessors.

use tessera_types::{DataType, Precision, TypeError, TypeResult};

use super::{cast::to_int, Built, BuiltinCall, BuiltinKind};
use crate::expr::Expr;
use crate::literal::Literal;
use crate::operators::Operator;
use crate::signature::TypeSignature;

/// A complex value assembled from a real and an imaginary part.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexAssembly {
    pub real: Expr,
    pub imag: Expr,
    pub(crate) cast_source: Option<Expr>,
}

impl ComplexAssembly {
    /// `complex(z)` / `complex(z, 0)` of an already complex `z`.
    pub fn is_cast(&self) -> bool {
        self.cast_source.is_some()
    }

    /// The complex operand being re-cast. `None` unless [`is_cast`](Self::is_cast).
    pub fn cast_source(&self) -> Option<&Expr> {
        self.cast_source.as_ref()
    }
}

/// `complex(a, b)` with `b` defaulting to `0.0`.
///
/// Both literal operands fold using `re = re(a) - im(b)` and `im = im(a) + re(b)`. The
/// node forms below follow the same convention so folded and unfolded results agree.
pub fn complex(a: Expr, b: Option<Expr>) -> TypeResult<Built> {
    let b = b.unwrap_or_else(|| Expr::float(0.0));
    for operand in [&a, &b] {
        let dtype = operand.dtype();
        if !dtype.is_numeric() && dtype != DataType::Generic {
            return Err(TypeError::InvalidOperand {
                func: "complex".to_string(),
                found: format!("{} of type {}", operand, dtype),
            });
        }
    }

    if let (Some(la), Some(lb)) = (a.as_literal(), b.as_literal()) {
        if let (Some(ra), Some(ia), Some(rb), Some(ib)) =
            (la.real_part(), la.imag_part(), lb.real_part(), lb.imag_part())
        {
            return Ok(Built::Folded(Literal::complex(ra - ib, ia + rb)));
        }
    }

    let a_complex = a.dtype() == DataType::Complex;
    let b_complex = b.dtype() == DataType::Complex;

    if a_complex && b_complex && !a.is_literal() && !b.is_literal() {
        let scaled = Operator::mul(b, Expr::Literal(Literal::ImaginaryUnit));
        return Ok(Built::Simplified(Operator::add(a, scaled)));
    }

    let assembly = if a_complex && b.is_zero_literal() {
        ComplexAssembly {
            real: part_node(Part::Real, a.clone()),
            imag: part_node(Part::Imag, a.clone()),
            cast_source: Some(a),
        }
    } else if a_complex && b_complex {
        // one side is a literal; spell out the rewrite component-wise
        ComplexAssembly {
            real: Operator::minus(part_node(Part::Real, a.clone()), part_node(Part::Imag, b.clone())),
            imag: Operator::add(part_node(Part::Imag, a), part_node(Part::Real, b)),
            cast_source: None,
        }
    } else if a_complex {
        ComplexAssembly {
            real: part_node(Part::Real, a.clone()),
            imag: Operator::add(part_node(Part::Imag, a), b),
            cast_source: None,
        }
    } else if b_complex && a.is_zero_literal() {
        ComplexAssembly {
            real: Operator::unary_sub(part_node(Part::Imag, b.clone())),
            imag: part_node(Part::Real, b),
            cast_source: None,
        }
    } else if b_complex {
        ComplexAssembly {
            real: Operator::minus(a, part_node(Part::Imag, b.clone())),
            imag: part_node(Part::Real, b),
            cast_source: None,
        }
    } else {
        ComplexAssembly {
            real: real(a).into_expr(),
            imag: real(b).into_expr(),
            cast_source: None,
        }
    };
    let signature = TypeSignature::scalar(DataType::Complex, Precision::DEFAULT);
    Ok(Built::Constructed(BuiltinCall::expr(
        BuiltinKind::Complex(assembly),
        signature,
    )))
}

#[derive(Clone, Copy)]
enum Part {
    Real,
    Imag,
}

/// `Real(z)` / `Imag(z)`: float typed, precision and shape of `z`. A literal `z` folds
/// to the float component.
fn part_node(part: Part, arg: Expr) -> Expr {
    let component = arg.as_literal().and_then(|lit| match part {
        Part::Real => lit.real_part(),
        Part::Imag => lit.imag_part(),
    });
    if let Some(value) = component {
        return Expr::float(value);
    }
    let sig = arg.signature();
    let signature = sig.with_element(DataType::Float, sig.precision);
    let kind = match part {
        Part::Real => BuiltinKind::Real(arg),
        Part::Imag => BuiltinKind::Imag(arg),
    };
    BuiltinCall::expr(kind, signature)
}

/// `x.real`
pub fn real(arg: Expr) -> Built {
    match arg.dtype() {
        DataType::Complex => match arg.as_literal().and_then(Literal::real_part) {
            Some(re) => Built::Folded(Literal::float(re)),
            None => Built::Constructed(part_node(Part::Real, arg)),
        },
        DataType::Bool => to_int(arg),
        _ => Built::Simplified(arg),
    }
}

/// `x.imag`. Zero of the operand's kind unless `x` is complex.
pub fn imag(arg: Expr) -> TypeResult<Built> {
    let dtype = arg.dtype();
    if dtype == DataType::Complex {
        return Ok(match arg.as_literal().and_then(Literal::imag_part) {
            Some(im) => Built::Folded(Literal::float(im)),
            None => Built::Constructed(part_node(Part::Imag, arg)),
        });
    }
    Literal::zero_of(&dtype)
        .map(Built::Folded)
        .ok_or_else(|| TypeError::InvalidOperand {
            func: "imag".to_string(),
            found: format!("{} of type {}", arg, dtype),
        })
}

/// `x.conjugate()`
pub fn conjugate(arg: Expr) -> Built {
    match arg.dtype() {
        DataType::Complex => {
            if let Some(lit) = arg.as_literal() {
                if let (Some(re), Some(im)) = (lit.real_part(), lit.imag_part()) {
                    return Built::Folded(Literal::complex(re, -im));
                }
            }
            let signature = arg.signature();
            Built::Constructed(BuiltinCall::expr(BuiltinKind::Conjugate(arg), signature))
        }
        DataType::Bool => to_int(arg),
        _ => Built::Simplified(arg),
    }
}
