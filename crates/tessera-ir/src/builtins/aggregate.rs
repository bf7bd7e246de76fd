//! Tuple and list literals, tuple indexing and `tuple(x)` unpacking.

use tessera_types::{ClassType, DataType, Order, Precision, TypeError, TypeResult};

use super::{Built, BuiltinCall, BuiltinKind};
use crate::expr::{Expr, Index, Slice};
use crate::indexing::index_expr;
use crate::signature::TypeSignature;
use crate::stage::Stage;

/// `(a, b, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct TupleLiteral {
    pub args: Vec<Expr>,
    /// All elements share kind, precision, rank and order. Always `false` before the
    /// semantic stage.
    pub is_homogeneous: bool,
    /// Not all elements have the same shape.
    pub inconsistent_shape: bool,
}

/// `[a, b, ...]`, always homogeneous once typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub args: Vec<Expr>,
}

/// Type information derived from the elements of an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub signature: TypeSignature,
    pub is_homogeneous: bool,
    pub inconsistent_shape: bool,
}

/// Derives the signature of an aggregate from its element signatures.
///
/// A homogeneous aggregate of `n` elements of shape `S` has shape `(n,) + S`. An
/// inhomogeneous one gets the composite kind and a trailing shape that is unknown
/// wherever the element ranks disagree.
pub fn analyze_elements(elements: &[TypeSignature], class_type: ClassType) -> Analysis {
    let Some(first) = elements.first() else {
        return Analysis {
            signature: TypeSignature {
                dtype: DataType::Generic,
                precision: Precision::new(0),
                rank: 0,
                shape: None,
                order: None,
                class_type,
            },
            is_homogeneous: false,
            inconsistent_shape: false,
        };
    };
    let length = Some(Expr::int(elements.len() as i64));
    let inconsistent_shape = elements.iter().any(|e| e.shape != first.shape);
    let is_homogeneous = first.dtype != DataType::Generic
        && elements.iter().all(|e| {
            e.dtype == first.dtype
                && e.final_precision() == first.final_precision()
                && e.rank == first.rank
                && e.order == first.order
        });

    let signature = if is_homogeneous {
        let mut shape = vec![length];
        shape.extend(first.shape.clone().unwrap_or_default());
        let order = (shape.len() > 1).then_some(Order::C);
        TypeSignature::array(first.dtype.clone(), first.precision, shape, order, class_type)
    } else {
        let max_rank = elements.iter().map(|e| e.rank).max().unwrap_or(0);
        let rank = max_rank + 1;
        let mut shape = vec![length];
        if rank > 1 {
            if elements.iter().any(|e| e.rank != max_rank) {
                shape.extend(std::iter::repeat(None).take(rank - 1));
            } else {
                shape.extend(first.shape.clone().unwrap_or_default());
            }
        }
        let order = (rank > 1).then_some(Order::C);
        let dtype = DataType::InhomogeneousTuple(elements.iter().map(|e| e.dtype.clone()).collect());
        TypeSignature::array(
            dtype,
            Precision::new(0),
            shape,
            order,
            ClassType::InhomogeneousTuple,
        )
    };
    Analysis {
        signature,
        is_homogeneous,
        inconsistent_shape,
    }
}

fn element_signatures(args: &[Expr]) -> Vec<TypeSignature> {
    args.iter().map(Expr::signature).collect()
}

pub fn tuple(args: Vec<Expr>, stage: Stage) -> Expr {
    if !stage.is_semantic() {
        let node = TupleLiteral {
            args,
            is_homogeneous: false,
            inconsistent_shape: false,
        };
        return BuiltinCall::expr(BuiltinKind::Tuple(node), TypeSignature::untyped());
    }
    let analysis = analyze_elements(&element_signatures(&args), ClassType::HomogeneousTuple);
    let node = TupleLiteral {
        args,
        is_homogeneous: analysis.is_homogeneous,
        inconsistent_shape: analysis.inconsistent_shape,
    };
    BuiltinCall::expr(BuiltinKind::Tuple(node), analysis.signature)
}

pub fn list(args: Vec<Expr>, stage: Stage) -> TypeResult<Expr> {
    if !stage.is_semantic() {
        return Ok(BuiltinCall::expr(
            BuiltinKind::List(ListLiteral { args }),
            TypeSignature::untyped(),
        ));
    }
    let signatures = element_signatures(&args);
    let analysis = analyze_elements(&signatures, ClassType::HomogeneousList);
    if !args.is_empty() && !analysis.is_homogeneous {
        return Err(TypeError::InhomogeneousList {
            types: describe_all(&signatures),
        });
    }
    Ok(BuiltinCall::expr(
        BuiltinKind::List(ListLiteral { args }),
        analysis.signature,
    ))
}

/// `int(8), float(8), ...`
pub(crate) fn describe_all(signatures: &[TypeSignature]) -> String {
    signatures
        .iter()
        .map(TypeSignature::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

impl TupleLiteral {
    /// `self + other`, a fresh tuple of both element lists.
    pub fn concat(&self, other: &TupleLiteral) -> Expr {
        let args = self.args.iter().chain(&other.args).cloned().collect();
        tuple(args, Stage::Semantic)
    }
}

/// Indexes an aggregate whose elements are known individually.
///
/// `base` is the aggregate expression itself; it becomes the base of a generic
/// indexing node when the index is not constant.
pub(crate) fn index_elements(
    base: Expr,
    elements: &[Expr],
    is_homogeneous: bool,
    index: Index,
) -> TypeResult<Expr> {
    let invalid = |found: String| TypeError::InvalidOperand {
        func: "[]".to_string(),
        found,
    };
    match index {
        Index::Expr(i) => {
            if let Some(position) = i.as_const_int() {
                let len = elements.len() as i64;
                let resolved = if position < 0 { position + len } else { position };
                if resolved < 0 || resolved >= len {
                    return Err(invalid(format!("tuple index {} out of range for {}", position, base)));
                }
                return Ok(elements[resolved as usize].clone());
            }
            if !is_homogeneous {
                return Err(TypeError::DynamicTupleIndex {
                    tuple: base.to_string(),
                    index: i.to_string(),
                });
            }
            Ok(crate::indexing::generic_index(base, Index::Expr(i)))
        }
        Index::Slice(slice) => {
            if slice.step.as_ref().and_then(Expr::as_const_int) == Some(0) {
                return Err(invalid("slice step cannot be zero".to_string()));
            }
            match slice_positions(elements.len(), &slice) {
                Some(positions) => {
                    let picked = positions.into_iter().map(|p| elements[p].clone()).collect();
                    Ok(tuple(picked, Stage::Semantic))
                }
                None if is_homogeneous => Ok(crate::indexing::generic_index(base, Index::Slice(slice))),
                None => Err(TypeError::DynamicTupleIndex {
                    tuple: base.to_string(),
                    index: Index::Slice(slice).to_string(),
                }),
            }
        }
    }
}

/// Positions selected by `slice` over `len` elements, following Python's slicing
/// rules. `None` when a bound is not an integer constant.
pub(crate) fn slice_positions(len: usize, slice: &Slice) -> Option<Vec<usize>> {
    let bound = |part: &Option<Expr>| match part {
        None => Some(None),
        Some(e) => e.as_const_int().map(Some),
    };
    let start = bound(&slice.start)?;
    let stop = bound(&slice.stop)?;
    let step = bound(&slice.step)?.unwrap_or(1);
    if step == 0 {
        return None;
    }
    let n = len as i64;
    let (lo, hi) = if step > 0 { (0, n) } else { (-1, n - 1) };
    let normalize = |value: Option<i64>, default: i64| match value {
        None => default,
        Some(v) if v < 0 => (v + n).clamp(lo, hi),
        Some(v) => v.clamp(lo, hi),
    };
    let start = normalize(start, if step > 0 { 0 } else { n - 1 });
    let stop = normalize(stop, if step > 0 { n } else { -1 });

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        positions.push(i as usize);
        i += step;
    }
    Some(positions)
}

/// `tuple(x)`
pub fn tuple_function(arg: Expr, stage: Stage) -> TypeResult<Built> {
    if let Expr::Builtin(call) = &arg {
        match &call.kind {
            BuiltinKind::Tuple(_) => return Ok(Built::Simplified(arg)),
            BuiltinKind::List(l) => return Ok(Built::Constructed(tuple(l.args.clone(), stage))),
            _ => {}
        }
    }
    if let Expr::Variable(var) = &arg {
        if var.has_members() {
            let members = var.members.iter().cloned().map(Expr::Variable).collect();
            return Ok(Built::Constructed(tuple(members, stage)));
        }
    }
    let Some(length) = arg.signature().first_dim().and_then(Expr::as_const_int) else {
        return Err(TypeError::UnknownLength {
            expr: arg.to_string(),
        });
    };
    let elements = (0..length)
        .map(|i| index_expr(arg.clone(), Index::Expr(Expr::int(i))))
        .collect::<TypeResult<Vec<_>>>()?;
    Ok(Built::Constructed(tuple(elements, stage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Variable;
    use expect_test::expect;

    fn int_var(name: &str) -> Expr {
        Expr::Variable(Variable::scalar(name, DataType::Integer))
    }

    fn float_var(name: &str) -> Expr {
        Expr::Variable(Variable::scalar(name, DataType::Float))
    }

    fn tuple_node(e: &Expr) -> &TupleLiteral {
        match &e.as_builtin().unwrap().kind {
            BuiltinKind::Tuple(t) => t,
            other => panic!("not a tuple: {:?}", other),
        }
    }

    #[test]
    fn homogeneous_shape_law() {
        let rows = vec![
            tuple(vec![int_var("a"), int_var("b")], Stage::Semantic),
            tuple(vec![int_var("c"), int_var("d")], Stage::Semantic),
            tuple(vec![int_var("e"), int_var("f")], Stage::Semantic),
        ];
        let t = tuple(rows, Stage::Semantic);
        let sig = t.signature();
        assert!(tuple_node(&t).is_homogeneous);
        assert_eq!(sig.rank, 2);
        assert_eq!(sig.shape, Some(vec![Some(Expr::int(3)), Some(Expr::int(2))]));
        assert_eq!(sig.order, Some(Order::C));
        assert_eq!(sig.dtype, DataType::Integer);
    }

    #[test]
    fn one_dimensional_aggregate_has_no_order() {
        let t = tuple(vec![int_var("a"), int_var("b")], Stage::Semantic);
        assert_eq!(t.signature().order, None);
    }

    #[test]
    fn inhomogeneous_tuple_has_unknown_trailing_shape() {
        let inner = tuple(vec![int_var("b"), int_var("c")], Stage::Semantic);
        let t = tuple(vec![int_var("a"), inner, float_var("x")], Stage::Semantic);
        let node = tuple_node(&t);
        assert!(!node.is_homogeneous);
        assert!(node.inconsistent_shape);
        let sig = t.signature();
        assert_eq!(sig.shape, Some(vec![Some(Expr::int(3)), None]));
        assert_eq!(sig.precision, Precision::new(0));
        assert_eq!(sig.class_type, ClassType::InhomogeneousTuple);
    }

    #[test]
    fn inhomogeneous_list_is_an_error() {
        let err = list(vec![int_var("a"), float_var("x")], Stage::Semantic).unwrap_err();
        expect![[r#"Can't create an inhomogeneous list (int(8), float(8))"#]].assert_eq(&err.to_string());
    }

    #[test]
    fn empty_aggregate() {
        let t = tuple(vec![], Stage::Semantic);
        let sig = t.signature();
        assert_eq!(sig.dtype, DataType::Generic);
        assert_eq!(sig.rank, 0);
        assert!(sig.shape.is_none());
        assert!(!tuple_node(&t).is_homogeneous);
        assert!(list(vec![], Stage::Semantic).is_ok());
    }

    #[test]
    fn syntactic_stage_skips_analysis() {
        let l = list(vec![int_var("a"), float_var("x")], Stage::Syntactic).unwrap();
        assert_eq!(l.signature(), TypeSignature::untyped());
    }

    #[test]
    fn constant_indices() {
        let t = tuple(vec![int_var("a"), float_var("x"), int_var("b")], Stage::Semantic);
        assert_eq!(index_expr(t.clone(), Index::Expr(Expr::int(1))).unwrap(), float_var("x"));
        assert_eq!(
            index_expr(t.clone(), Index::Expr(crate::operators::Operator::unary_sub(Expr::int(1)))).unwrap(),
            int_var("b")
        );
        assert!(index_expr(t, Index::Expr(Expr::int(3))).is_err());
    }

    #[test]
    fn constant_slice_builds_fresh_tuple() {
        let t = tuple(vec![int_var("a"), float_var("x"), int_var("b")], Stage::Semantic);
        let evens = index_expr(t.clone(), Index::Slice(Slice::new(None, None, Some(Expr::int(2))))).unwrap();
        let node = tuple_node(&evens);
        assert_eq!(node.args, vec![int_var("a"), int_var("b")]);
        assert!(node.is_homogeneous);

        let reversed = index_expr(t, Index::Slice(Slice::new(None, None, Some(Expr::int(-1))))).unwrap();
        assert_eq!(reversed.to_string(), "(b, x, a)");
    }

    #[test]
    fn dynamic_index() {
        let homogeneous = tuple(vec![int_var("a"), int_var("b")], Stage::Semantic);
        let e = index_expr(homogeneous, Index::Expr(Expr::symbol("i"))).unwrap();
        assert_eq!(e.to_string(), "(a, b)[i]");
        assert_eq!(e.signature().dtype, DataType::Integer);

        let mixed = tuple(vec![int_var("a"), float_var("x")], Stage::Semantic);
        let err = index_expr(mixed, Index::Expr(Expr::symbol("i"))).unwrap_err();
        assert!(matches!(err, TypeError::DynamicTupleIndex { .. }));
    }

    #[test]
    fn python_slice_positions() {
        let s = |start: Option<i64>, stop: Option<i64>, step: Option<i64>| {
            Slice::new(start.map(Expr::int), stop.map(Expr::int), step.map(Expr::int))
        };
        assert_eq!(slice_positions(5, &s(Some(1), Some(100), None)), Some(vec![1, 2, 3, 4]));
        assert_eq!(slice_positions(5, &s(Some(-2), None, None)), Some(vec![3, 4]));
        assert_eq!(slice_positions(5, &s(None, Some(1), Some(-1))), Some(vec![4, 3, 2]));
        assert_eq!(slice_positions(3, &s(Some(5), None, None)), Some(vec![]));
    }

    #[test]
    fn concatenation() {
        let a = tuple(vec![int_var("a")], Stage::Semantic);
        let b = tuple(vec![float_var("x")], Stage::Semantic);
        let joined = tuple_node(&a).concat(tuple_node(&b));
        assert_eq!(joined.to_string(), "(a, x)");
        assert!(!tuple_node(&joined).is_homogeneous);
    }

    #[test]
    fn unpack_rules() {
        let t = tuple(vec![int_var("a")], Stage::Semantic);
        assert_eq!(tuple_function(t.clone(), Stage::Semantic).unwrap(), Built::Simplified(t));

        let l = list(vec![int_var("a"), int_var("b")], Stage::Semantic).unwrap();
        assert_eq!(
            tuple_function(l, Stage::Semantic).unwrap().into_expr().to_string(),
            "(a, b)"
        );

        let fixed = Variable::with_shape("v", DataType::Float, vec![Some(Expr::int(2))], Order::C);
        let unpacked = tuple_function(Expr::Variable(fixed), Stage::Semantic).unwrap();
        assert_eq!(unpacked.into_expr().to_string(), "(v[0], v[1])");

        let dynamic = Variable::array("w", DataType::Float, 1, Order::C);
        let err = tuple_function(Expr::Variable(dynamic), Stage::Semantic).unwrap_err();
        expect![[r#"Can't unpack w into a tuple"#]].assert_eq(&err.to_string());
    }

    #[test]
    fn unpack_member_tuple_variable() {
        let t = Variable::tuple(
            "t",
            vec![Variable::scalar("t_0", DataType::Integer), Variable::scalar("t_1", DataType::Bool)],
        );
        let unpacked = tuple_function(Expr::Variable(t), Stage::Semantic).unwrap();
        assert_eq!(unpacked.into_expr().to_string(), "(t_0, t_1)");
    }
}
