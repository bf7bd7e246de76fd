//! `bool(x)`, `int(x)` and `float(x)`.

use tessera_types::{ClassType, DataType, Precision};

use super::{Built, BuiltinCall, BuiltinKind};
use crate::expr::Expr;
use crate::literal::Literal;
use crate::operators::Operator;

pub fn to_bool(arg: Expr) -> Built {
    // a possibly-absent value is false when absent
    if arg.is_optional() {
        let present = Operator::is_not(arg.clone(), Expr::Literal(Literal::Nil));
        let truth = cast_node(DataType::Bool, arg);
        return Built::Simplified(Operator::and(present, truth));
    }
    cast(DataType::Bool, arg)
}

pub fn to_int(arg: Expr) -> Built {
    cast(DataType::Integer, arg)
}

pub fn to_float(arg: Expr) -> Built {
    cast(DataType::Float, arg)
}

fn cast(target: DataType, arg: Expr) -> Built {
    if let Expr::Literal(lit) = &arg {
        if lit.dtype() == target && lit.precision().is_default() {
            return Built::Simplified(arg);
        }
        if let Some(folded) = lit.convert_to(&target) {
            return Built::Folded(folded);
        }
    } else {
        let sig = arg.signature();
        if sig.dtype == target && sig.final_precision() == target.default_precision() {
            return Built::Simplified(arg);
        }
    }
    Built::Constructed(cast_node(target, arg))
}

/// Element-wise cast keeping the operand's rank, shape and order.
fn cast_node(target: DataType, arg: Expr) -> Expr {
    let mut signature = arg.signature().with_element(target.clone(), Precision::DEFAULT);
    if signature.rank == 0 {
        signature.class_type = ClassType::Scalar;
    }
    let kind = match target {
        DataType::Bool => BuiltinKind::Bool(arg),
        DataType::Integer => BuiltinKind::Int(arg),
        _ => BuiltinKind::Float(arg),
    };
    BuiltinCall::expr(kind, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Variable;
    use tessera_types::Order;

    #[test]
    fn identity_cast_returns_operand() {
        let x = Expr::Variable(Variable::scalar("x", DataType::Float));
        assert_eq!(to_float(x.clone()), Built::Simplified(x));
    }

    #[test]
    fn explicit_precision_is_not_identity() {
        let x = Expr::Variable(Variable::scalar("x", DataType::Float).with_precision(Precision::new(4)));
        let built = to_float(x);
        assert!(built.is_constructed());
        assert_eq!(built.into_expr().signature().final_precision(), 8);
    }

    #[test]
    fn literal_at_target_is_operand() {
        assert_eq!(to_int(Expr::int(3)), Built::Simplified(Expr::int(3)));
        assert_eq!(to_bool(Expr::Literal(Literal::Bool(true))), Built::Simplified(Expr::Literal(Literal::Bool(true))));
    }

    #[test]
    fn subset_literal_folds() {
        assert_eq!(to_float(Expr::int(2)), Built::Folded(Literal::float(2.0)));
        assert_eq!(to_int(Expr::Literal(Literal::Bool(true))), Built::Folded(Literal::int(1)));
        let narrow = Expr::Literal(Literal::Integer { value: 5, precision: Precision::new(2) });
        assert_eq!(to_int(narrow), Built::Folded(Literal::int(5)));
    }

    #[test]
    fn narrowing_literal_builds_node() {
        let built = to_int(Expr::float(3.7));
        assert!(built.is_constructed());
        assert_eq!(built.into_expr().to_string(), "int(3.7)");
    }

    #[test]
    fn array_cast_keeps_shape() {
        let x = Variable::array("x", DataType::Integer, 2, Order::F);
        let shape = x.signature.shape.clone();
        let sig = to_float(Expr::Variable(x)).into_expr().signature();
        assert_eq!(sig.dtype, DataType::Float);
        assert_eq!(sig.rank, 2);
        assert_eq!(sig.shape, shape);
        assert_eq!(sig.order, Some(Order::F));
    }

    #[test]
    fn optional_bool_checks_presence() {
        let flag = Expr::Variable(Variable::scalar("flag", DataType::Integer).optional());
        match to_bool(flag) {
            Built::Simplified(e) => assert_eq!(e.to_string(), "(flag is not None) and bool(flag)"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
