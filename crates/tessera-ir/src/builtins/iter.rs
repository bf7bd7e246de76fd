// src/builtins/iter.rs
//! Iteration adapters: `range`, `zip`, `enumerate`, `map`.
//!
//! None of these materialise storage. Loop lowering asks them for their length and for
//! the expression of element `i`.

use tessera_types::{DataType, TypeError, TypeResult};

use super::reduce::len;
use super::{Built, BuiltinCall, BuiltinKind};
use crate::expr::{Expr, Index};
use crate::indexing::index_expr;
use crate::operators::Operator;
use crate::signature::TypeSignature;
use crate::stage::Stage;

/// `range(start, stop, step)`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeNode {
    pub start: Expr,
    pub stop: Expr,
    pub step: Expr,
}

impl RangeNode {
    /// `start + i*step`, simplified.
    pub fn element_at(&self, index: Expr) -> Expr {
        let offset = Operator::mul_simplified(index, self.step.clone());
        Operator::add_simplified(self.start.clone(), offset)
    }

    /// Number of elements when it can be expressed without run-time arithmetic.
    ///
    /// A literal when all bounds are literals, `stop` when counting from 0 by 1.
    /// `None` when the count does not fit in an `i64`.
    pub fn length(&self) -> Option<Expr> {
        match (
            self.start.as_const_int(),
            self.stop.as_const_int(),
            self.step.as_const_int(),
        ) {
            (Some(start), Some(stop), Some(step)) => range_len(start, stop, step).map(Expr::int),
            (Some(0), _, Some(1)) => Some(self.stop.clone()),
            _ => None,
        }
    }
}

fn range_len(start: i64, stop: i64, step: i64) -> Option<i64> {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let count = if step > 0 && start < stop {
        (stop - start + step - 1) / step
    } else if step < 0 && start > stop {
        (start - stop - step - 1) / -step
    } else {
        0
    };
    i64::try_from(count).ok()
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`.
pub fn range(mut args: Vec<Expr>) -> TypeResult<Built> {
    let (start, stop, step) = match args.len() {
        1 => (Expr::int(0), args.remove(0), Expr::int(1)),
        2 => {
            let stop = args.remove(1);
            (args.remove(0), stop, Expr::int(1))
        }
        3 => {
            let step = args.remove(2);
            let stop = args.remove(1);
            (args.remove(0), stop, step)
        }
        n => return Err(TypeError::arity("range", "1 to 3", n)),
    };
    for bound in [&start, &stop, &step] {
        let dtype = bound.dtype();
        if !matches!(dtype, DataType::Integer | DataType::Bool | DataType::Generic) {
            return Err(TypeError::InvalidOperand {
                func: "range".to_string(),
                found: format!("{} of type {} is not an integer", bound, dtype),
            });
        }
    }
    if step.as_const_int() == Some(0) {
        return Err(TypeError::ZeroRangeStep);
    }
    let node = RangeNode { start, stop, step };
    let signature = TypeSignature::sequence(DataType::Integer, node.length());
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Range(node), signature)))
}

/// `zip(a, b, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ZipNode {
    pub args: Vec<Expr>,
    /// Shortest known length; `None` before the semantic stage.
    pub length: Option<Expr>,
}

impl ZipNode {
    /// `[a[i], b[i], ...]`
    pub fn element_at(&self, index: &Expr) -> TypeResult<Vec<Expr>> {
        self.args
            .iter()
            .map(|source| index_expr(source.clone(), Index::Expr(index.clone())))
            .collect()
    }
}

pub fn zip(args: Vec<Expr>, stage: Stage) -> TypeResult<Built> {
    if args.len() < 2 {
        return Err(TypeError::arity("zip", "at least 2", args.len()));
    }
    if !stage.is_semantic() {
        let node = ZipNode { args, length: None };
        return Ok(Built::Constructed(BuiltinCall::expr(
            BuiltinKind::Zip(node),
            TypeSignature::untyped(),
        )));
    }
    let signatures: Vec<TypeSignature> = args.iter().map(Expr::signature).collect();
    let shortest_literal = signatures
        .iter()
        .filter_map(|s| s.first_dim().and_then(Expr::as_const_int))
        .min();
    let length = match shortest_literal {
        Some(n) => Some(Expr::int(n)),
        None => signatures[0].first_dim().cloned(),
    };
    let signature = TypeSignature::sequence(DataType::Generic, length.clone());
    let node = ZipNode { args, length };
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Zip(node), signature)))
}

/// `enumerate(x, start)`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerateNode {
    pub element: Expr,
    pub start: Expr,
}

impl EnumerateNode {
    /// `(start + i, x[i])`
    pub fn element_at(&self, index: &Expr) -> TypeResult<(Expr, Expr)> {
        let counter = Operator::add_simplified(index.clone(), self.start.clone());
        let item = index_expr(self.element.clone(), Index::Expr(index.clone()))?;
        Ok((counter, item))
    }

    /// `len(x)`
    pub fn length(&self) -> TypeResult<Built> {
        len(self.element.clone())
    }
}

pub fn enumerate(element: Expr, start: Option<Expr>, stage: Stage) -> TypeResult<Built> {
    let start = start.unwrap_or_else(|| Expr::int(0));
    if !stage.is_semantic() {
        let node = EnumerateNode { element, start };
        return Ok(Built::Constructed(BuiltinCall::expr(
            BuiltinKind::Enumerate(node),
            TypeSignature::untyped(),
        )));
    }
    if matches!(element, Expr::Symbol(_)) {
        return Err(TypeError::UntypedOperand {
            func: "enumerate".to_string(),
            found: element.to_string(),
        });
    }
    let length = element.signature().first_dim().cloned();
    let signature = TypeSignature::sequence(DataType::Generic, length);
    let node = EnumerateNode { element, start };
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Enumerate(node), signature)))
}

/// `map(f, xs)`
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub func: Expr,
    pub func_args: Expr,
}

impl MapNode {
    /// `(f, xs[i])`: the function to call and its argument for element `i`.
    pub fn element_at(&self, index: &Expr) -> TypeResult<(Expr, Expr)> {
        let arg = index_expr(self.func_args.clone(), Index::Expr(index.clone()))?;
        Ok((self.func.clone(), arg))
    }

    /// `len(xs)`
    pub fn length(&self) -> TypeResult<Built> {
        len(self.func_args.clone())
    }
}

pub fn map(func: Expr, func_args: Expr) -> Built {
    let length = func_args.signature().first_dim().cloned();
    let signature = TypeSignature::sequence(DataType::Generic, length);
    let node = MapNode { func, func_args };
    Built::Constructed(BuiltinCall::expr(BuiltinKind::Map(node), signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::aggregate::tuple;
    use crate::variable::Variable;
    use tessera_types::Order;

    fn range_expr(args: Vec<Expr>) -> Expr {
        range(args).unwrap().into_expr()
    }

    fn range_node(e: &Expr) -> &RangeNode {
        match &e.as_builtin().unwrap().kind {
            BuiltinKind::Range(r) => r,
            other => panic!("not a range: {:?}", other),
        }
    }

    #[test]
    fn range_defaults() {
        let r = range_expr(vec![Expr::symbol("n")]);
        assert_eq!(r.to_string(), "range(0, n, 1)");
        assert_eq!(r.signature().first_dim(), Some(&Expr::symbol("n")));
        assert_eq!(r.signature().dtype, DataType::Integer);
    }

    #[test]
    fn range_literal_lengths() {
        let len_of = |args: Vec<i64>| {
            range_node(&range_expr(args.into_iter().map(Expr::int).collect()))
                .length()
                .and_then(|e| e.as_const_int())
        };
        assert_eq!(len_of(vec![5]), Some(5));
        assert_eq!(len_of(vec![2, 10, 3]), Some(3));
        assert_eq!(len_of(vec![10, 2, -3]), Some(3));
        assert_eq!(len_of(vec![5, 2]), Some(0));
    }

    #[test]
    fn range_length_at_integer_bounds() {
        let node = |start: i64, stop: i64, step: i64| {
            range_node(&range_expr(vec![Expr::int(start), Expr::int(stop), Expr::int(step)])).clone()
        };
        assert_eq!(node(0, i64::MAX, 2).length(), Some(Expr::int(i64::MAX / 2 + 1)));
        assert_eq!(node(i64::MAX, i64::MIN + 1, -1).length(), None);
        assert_eq!(node(i64::MIN + 1, i64::MAX, i64::MAX).length(), Some(Expr::int(2)));

        let wide = node(0, i64::MAX, i64::MAX);
        assert_eq!(wide.element_at(Expr::int(1)), Expr::int(i64::MAX));
        assert_eq!(wide.element_at(Expr::int(2)).as_const_int(), None);
    }

    #[test]
    fn range_unknown_length() {
        let r = range_expr(vec![Expr::int(1), Expr::symbol("n")]);
        assert_eq!(range_node(&r).length(), None);
        assert_eq!(r.signature().shape, Some(vec![None]));
    }

    #[test]
    fn range_errors() {
        assert_eq!(range(vec![]).unwrap_err(), TypeError::arity("range", "1 to 3", 0));
        let four = vec![Expr::int(0), Expr::int(1), Expr::int(2), Expr::int(3)];
        assert!(matches!(range(four), Err(TypeError::WrongNumberOfArguments { found: 4, .. })));
        assert_eq!(
            range(vec![Expr::int(0), Expr::int(4), Expr::int(0)]).unwrap_err(),
            TypeError::ZeroRangeStep
        );
        assert!(range(vec![Expr::float(1.0)]).is_err());
    }

    #[test]
    fn range_elements() {
        let r = range_expr(vec![Expr::int(2), Expr::symbol("n"), Expr::int(3)]);
        let node = range_node(&r);
        assert_eq!(node.element_at(Expr::symbol("i")).to_string(), "2 + (i * 3)");
        assert_eq!(node.element_at(Expr::int(4)), Expr::int(14));

        let plain = range_expr(vec![Expr::symbol("n")]);
        assert_eq!(range_node(&plain).element_at(Expr::symbol("i")), Expr::symbol("i"));
    }

    #[test]
    fn zip_length_is_shortest_literal() {
        let z = zip(
            vec![range_expr(vec![Expr::int(5)]), range_expr(vec![Expr::int(10)])],
            Stage::Semantic,
        )
        .unwrap()
        .into_expr();
        assert_eq!(z.signature().first_dim(), Some(&Expr::int(5)));
    }

    #[test]
    fn zip_length_falls_back_to_first_source() {
        let a = Expr::Variable(Variable::array("a", DataType::Float, 1, Order::C));
        let b = Expr::Variable(Variable::array("b", DataType::Float, 1, Order::C));
        let z = zip(vec![a, b], Stage::Semantic).unwrap().into_expr();
        assert_eq!(
            z.signature().first_dim(),
            Some(&Expr::ArraySize { array: "a".into(), index: 0 })
        );
    }

    #[test]
    fn zip_needs_two_sources() {
        let err = zip(vec![Expr::symbol("a")], Stage::Syntactic).unwrap_err();
        assert_eq!(err, TypeError::arity("zip", "at least 2", 1));
    }

    #[test]
    fn zip_elements() {
        let a = Expr::Variable(Variable::array("a", DataType::Float, 1, Order::C));
        let z = zip(vec![a, range_expr(vec![Expr::int(3)])], Stage::Semantic).unwrap().into_expr();
        let BuiltinKind::Zip(node) = &z.as_builtin().unwrap().kind else {
            panic!("not a zip");
        };
        let items = node.element_at(&Expr::symbol("i")).unwrap();
        let rendered: Vec<_> = items.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["a[i]", "i"]);
    }

    #[test]
    fn enumerate_elements_and_length() {
        let xs = Expr::Variable(Variable::array("xs", DataType::Integer, 1, Order::C));
        let e = enumerate(xs, Some(Expr::int(1)), Stage::Semantic).unwrap().into_expr();
        let BuiltinKind::Enumerate(node) = &e.as_builtin().unwrap().kind else {
            panic!("not an enumerate");
        };
        let (counter, item) = node.element_at(&Expr::symbol("i")).unwrap();
        assert_eq!(counter.to_string(), "i + 1");
        assert_eq!(item.to_string(), "xs[i]");
        assert_eq!(node.length().unwrap().into_expr().to_string(), "len(xs)");
    }

    #[test]
    fn enumerate_rejects_untyped_operand() {
        let err = enumerate(Expr::symbol("xs"), None, Stage::Semantic).unwrap_err();
        assert!(matches!(err, TypeError::UntypedOperand { .. }));
        assert!(enumerate(Expr::symbol("xs"), None, Stage::Syntactic).is_ok());
    }

    #[test]
    fn map_elements() {
        let xs = tuple(vec![Expr::int(1), Expr::int(2)], Stage::Semantic);
        let m = map(Expr::symbol("f"), xs).into_expr();
        let BuiltinKind::Map(node) = &m.as_builtin().unwrap().kind else {
            panic!("not a map");
        };
        let (func, arg) = node.element_at(&Expr::int(1)).unwrap();
        assert_eq!(func, Expr::symbol("f"));
        assert_eq!(arg, Expr::int(2));
        assert_eq!(node.length().unwrap(), Built::Constructed(
            BuiltinCall::expr(
                BuiltinKind::Len(node.func_args.clone()),
                TypeSignature::scalar(DataType::Integer, tessera_types::Precision::DEFAULT)
            )
        ));
    }
}
