//! `len`, `sum`, `max`, `min` and `abs`.

use tessera_types::{DataType, Precision, TypeError, TypeResult};

use super::aggregate::{describe_all, tuple};
use super::{Built, BuiltinCall, BuiltinKind};
use crate::expr::Expr;
use crate::signature::TypeSignature;
use crate::stage::Stage;

/// Aggregate stored element by element, or with elements of different types.
fn has_fixed_elements(arg: &Expr) -> bool {
    match arg {
        Expr::Builtin(call) => matches!(&call.kind, BuiltinKind::Tuple(t) if !t.is_homogeneous),
        Expr::Variable(var) if var.has_members() => true,
        other => matches!(other.dtype(), DataType::InhomogeneousTuple(_)),
    }
}

fn require_typed(func: &str, arg: &Expr) -> TypeResult<()> {
    if arg.is_typed() {
        Ok(())
    } else {
        Err(TypeError::UntypedOperand {
            func: func.to_string(),
            found: arg.to_string(),
        })
    }
}

/// `len(x)`
pub fn len(arg: Expr) -> TypeResult<Built> {
    let sig = arg.signature();
    if has_fixed_elements(&arg) {
        if let Some(first) = sig.first_dim() {
            return Ok(match first {
                Expr::Literal(lit) => Built::Folded(lit.clone()),
                other => Built::Simplified(other.clone()),
            });
        }
    }
    if sig.rank == 0 {
        return Err(TypeError::LengthOfScalar {
            expr: arg.to_string(),
        });
    }
    let signature = TypeSignature::scalar(DataType::Integer, Precision::DEFAULT);
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Len(arg), signature)))
}

/// `sum(x)`: kind of `x`, default precision, no promotion.
pub fn sum(arg: Expr) -> TypeResult<Built> {
    require_typed("sum", &arg)?;
    let dtype = arg.dtype();
    if !dtype.is_numeric() {
        return Err(TypeError::InvalidOperand {
            func: "sum".to_string(),
            found: format!("{} of type {}", arg, dtype),
        });
    }
    let signature = TypeSignature::scalar(dtype, Precision::DEFAULT);
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Sum(arg), signature)))
}

pub fn max(args: Vec<Expr>) -> TypeResult<Built> {
    extremum("max", args)
}

pub fn min(args: Vec<Expr>) -> TypeResult<Built> {
    extremum("min", args)
}

/// Shared body of `max` and `min`.
///
/// Several operands are packed into a tuple first. The aggregate must be homogeneous so
/// that the result has a single kind and precision.
fn extremum(func: &str, mut args: Vec<Expr>) -> TypeResult<Built> {
    let aggregate = match args.len() {
        0 => return Err(TypeError::arity(func, "at least 1", 0)),
        1 => {
            let arg = args.remove(0);
            let is_literal_aggregate = matches!(
                arg.as_builtin().map(|c| &c.kind),
                Some(BuiltinKind::Tuple(_) | BuiltinKind::List(_))
            );
            if !is_literal_aggregate && arg.rank() == 0 {
                return Err(TypeError::InvalidOperand {
                    func: func.to_string(),
                    found: format!("{} is not iterable", arg),
                });
            }
            arg
        }
        _ => tuple(args, Stage::Semantic),
    };

    if let Some(types) = inhomogeneous_element_types(&aggregate) {
        return Err(TypeError::InhomogeneousExtremum {
            func: func.to_string(),
            types,
        });
    }
    require_typed(func, &aggregate)?;

    let sig = aggregate.signature();
    let signature = TypeSignature::scalar(sig.dtype, sig.precision);
    let kind = if func == "max" {
        BuiltinKind::Max(aggregate)
    } else {
        BuiltinKind::Min(aggregate)
    };
    Ok(Built::Constructed(BuiltinCall::expr(kind, signature)))
}

/// The element types of an aggregate whose elements do not share one kind and precision.
fn inhomogeneous_element_types(aggregate: &Expr) -> Option<String> {
    match aggregate {
        Expr::Builtin(call) => {
            if let BuiltinKind::Tuple(t) = &call.kind {
                if !t.is_homogeneous {
                    let signatures: Vec<_> = t.args.iter().map(Expr::signature).collect();
                    return Some(describe_all(&signatures));
                }
            }
        }
        Expr::Variable(var) if var.has_members() && matches!(var.dtype(), DataType::InhomogeneousTuple(_)) => {
            let signatures: Vec<_> = var.members.iter().map(|m| m.signature.clone()).collect();
            return Some(describe_all(&signatures));
        }
        _ => {}
    }
    match aggregate.dtype() {
        DataType::InhomogeneousTuple(kinds) => Some(
            kinds
                .iter()
                .map(DataType::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

/// `abs(x)`: `int` for integer operands, `float` otherwise, element-wise.
pub fn abs(arg: Expr) -> TypeResult<Built> {
    require_typed("abs", &arg)?;
    let sig = arg.signature();
    if !sig.dtype.is_numeric() {
        return Err(TypeError::InvalidOperand {
            func: "abs".to_string(),
            found: format!("{} of type {}", arg, sig.dtype),
        });
    }
    let dtype = if sig.dtype == DataType::Integer {
        DataType::Integer
    } else {
        DataType::Float
    };
    let signature = sig.with_element(dtype, Precision::DEFAULT);
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Abs(arg), signature)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::aggregate::list;
    use crate::literal::Literal;
    use crate::variable::Variable;
    use expect_test::expect;
    use tessera_types::Order;

    fn var(name: &str, dtype: DataType) -> Expr {
        Expr::Variable(Variable::scalar(name, dtype))
    }

    #[test]
    fn max_of_mixed_kinds_names_both() {
        let err = max(vec![var("a", DataType::Integer), var("x", DataType::Float)]).unwrap_err();
        expect![[r#"Cannot determine final dtype of 'max' call with arguments of different types (int(8), float(8))"#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn max_of_ints_is_int() {
        let built = max(vec![var("a", DataType::Integer), var("b", DataType::Integer)]).unwrap();
        let e = built.into_expr();
        assert_eq!(e.to_string(), "max((a, b))");
        let sig = e.signature();
        assert_eq!(sig.dtype, DataType::Integer);
        assert!(sig.is_scalar());
    }

    #[test]
    fn min_of_precisions_differs() {
        let narrow = Expr::Variable(Variable::scalar("a", DataType::Float).with_precision(Precision::new(4)));
        let err = min(vec![narrow, var("b", DataType::Float)]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InhomogeneousExtremum {
                func: "min".into(),
                types: "float(4), float(8)".into()
            }
        );
    }

    #[test]
    fn extremum_of_mixed_tuple_variable() {
        let t = Variable::tuple(
            "t",
            vec![Variable::scalar("a", DataType::Integer), Variable::scalar("b", DataType::Float)],
        );
        let err = max(vec![Expr::Variable(t)]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InhomogeneousExtremum {
                func: "max".into(),
                types: "int(8), float(8)".into()
            }
        );

        let same = Variable::tuple(
            "s",
            vec![Variable::scalar("a", DataType::Integer), Variable::scalar("b", DataType::Integer)],
        );
        let sig = min(vec![Expr::Variable(same)]).unwrap().into_expr().signature();
        assert_eq!(sig.dtype, DataType::Integer);
    }

    #[test]
    fn max_over_single_aggregate() {
        let l = list(vec![Expr::int(1), Expr::int(5)], Stage::Semantic).unwrap();
        assert!(max(vec![l]).is_ok());
        let a = Expr::Variable(Variable::array("a", DataType::Float, 1, Order::C));
        let sig = min(vec![a]).unwrap().into_expr().signature();
        assert_eq!(sig.dtype, DataType::Float);
        assert!(max(vec![var("x", DataType::Float)]).is_err());
    }

    #[test]
    fn len_rules() {
        let mixed = tuple(vec![var("a", DataType::Integer), var("x", DataType::Float)], Stage::Semantic);
        assert_eq!(len(mixed).unwrap(), Built::Folded(Literal::int(2)));

        let a = Expr::Variable(Variable::array("a", DataType::Float, 2, Order::C));
        let built = len(a).unwrap();
        assert!(built.is_constructed());
        let sig = built.into_expr().signature();
        assert_eq!(sig.dtype, DataType::Integer);
        assert!(sig.is_scalar());

        assert!(matches!(len(var("x", DataType::Float)), Err(TypeError::LengthOfScalar { .. })));
    }

    #[test]
    fn sum_keeps_kind() {
        let a = Expr::Variable(Variable::array("a", DataType::Integer, 1, Order::C).with_precision(Precision::new(4)));
        let sig = sum(a).unwrap().into_expr().signature();
        assert_eq!(sig.dtype, DataType::Integer);
        assert_eq!(sig.precision, Precision::DEFAULT);
        assert!(sig.is_scalar());
        assert!(sum(Expr::symbol("xs")).is_err());
    }

    #[test]
    fn abs_kinds() {
        let a = Expr::Variable(Variable::array("a", DataType::Complex, 2, Order::F));
        let sig = abs(a).unwrap().into_expr().signature();
        assert_eq!(sig.dtype, DataType::Float);
        assert_eq!(sig.rank, 2);
        assert_eq!(sig.order, Some(Order::F));
        let sig = abs(var("n", DataType::Integer)).unwrap().into_expr().signature();
        assert_eq!(sig.dtype, DataType::Integer);
    }
}
