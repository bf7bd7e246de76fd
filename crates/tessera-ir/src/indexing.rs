//! Subscripting of arbitrary expressions.

use tessera_types::{DataType, TypeError, TypeResult};

use crate::builtins::aggregate::index_elements;
use crate::builtins::BuiltinKind;
use crate::expr::{Expr, Index, IndexedElement};

/// `base[index]`.
///
/// Aggregates whose elements are known (tuple literals, tuple variables stored member by
/// member) resolve constant indices to the element itself. `range(...)[i]` becomes the
/// arithmetic element expression. Anything else builds an [`IndexedElement`].
pub fn index_expr(base: Expr, index: Index) -> TypeResult<Expr> {
    let range_element = match (&base, &index) {
        (Expr::Builtin(call), Index::Expr(i)) => match &call.kind {
            BuiltinKind::Range(r) => Some(r.element_at(i.clone())),
            _ => None,
        },
        _ => None,
    };
    if let Some(element) = range_element {
        return Ok(element);
    }

    let known_elements = match &base {
        Expr::Builtin(call) => match &call.kind {
            BuiltinKind::Tuple(t) => Some((t.args.clone(), t.is_homogeneous)),
            _ => None,
        },
        Expr::Variable(var) if var.has_members() => {
            let members = var.members.iter().cloned().map(Expr::Variable).collect();
            let is_homogeneous = !matches!(var.signature.dtype, DataType::InhomogeneousTuple(_));
            Some((members, is_homogeneous))
        }
        _ => None,
    };
    if let Some((elements, is_homogeneous)) = known_elements {
        return index_elements(base, &elements, is_homogeneous, index);
    }

    if base.rank() == 0 {
        return Err(TypeError::InvalidOperand {
            func: "[]".to_string(),
            found: format!("{} is not subscriptable", base),
        });
    }
    Ok(generic_index(base, index))
}

/// Builds the indexing node without looking through the base.
pub(crate) fn generic_index(base: Expr, index: Index) -> Expr {
    match base {
        // x[i][j] is x[i, j] as long as no earlier subscript was a slice
        Expr::Indexed(indexed) if indexed.indices.iter().all(|i| matches!(i, Index::Expr(_))) => {
            let IndexedElement {
                base, mut indices, ..
            } = *indexed;
            indices.push(index);
            Expr::Indexed(Box::new(IndexedElement::new(base, indices)))
        }
        base => Expr::Indexed(Box::new(IndexedElement::new(base, vec![index]))),
    }
}

/// `base[indices...]` applied one subscript at a time.
pub fn index_all(base: Expr, indices: Vec<Index>) -> TypeResult<Expr> {
    indices.into_iter().try_fold(base, index_expr)
}
