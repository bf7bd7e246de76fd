// src/expr.rs
//! Expression tree of the typed IR.

use std::fmt;

use tessera_types::{ClassType, DataType, Precision};

use crate::builtins::BuiltinCall;
use crate::literal::Literal;
use crate::operators::Operator;
use crate::signature::TypeSignature;
use crate::variable::Variable;

/// A node of the IR expression tree.
///
/// Every variant can report its [`TypeSignature`]. Nodes are never mutated after
/// construction; rewrites build new trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(Variable),
    /// A name whose type is not known yet (syntactic stage, function names).
    Symbol(String),
    /// Run-time size of dimension `index` of the named array.
    ArraySize { array: String, index: usize },
    Indexed(Box<IndexedElement>),
    Operator(Box<Operator>),
    Builtin(Box<BuiltinCall>),
}

/// One subscript of an indexing expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    Expr(Expr),
    Slice(Slice),
}

/// `start:stop:step`, each part optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    pub start: Option<Expr>,
    pub stop: Option<Expr>,
    pub step: Option<Expr>,
}

/// `base[i, j, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedElement {
    pub base: Expr,
    pub indices: Vec<Index>,
    pub signature: TypeSignature,
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::int(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::Literal(Literal::float(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn signature(&self) -> TypeSignature {
        match self {
            Expr::Literal(lit) => TypeSignature::scalar(lit.dtype(), lit.precision()),
            Expr::Variable(var) => var.signature.clone(),
            Expr::Symbol(_) => TypeSignature::untyped(),
            Expr::ArraySize { .. } => TypeSignature::scalar(DataType::Integer, Precision::DEFAULT),
            Expr::Indexed(indexed) => indexed.signature.clone(),
            Expr::Operator(op) => op.signature.clone(),
            Expr::Builtin(call) => call.signature.clone(),
        }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Expr::Literal(lit) => lit.dtype(),
            Expr::Variable(var) => var.signature.dtype.clone(),
            _ => self.signature().dtype,
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Symbol(_) | Expr::ArraySize { .. } => 0,
            Expr::Variable(var) => var.signature.rank,
            _ => self.signature().rank,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Value of an integer constant, including a negated literal such as `-1`.
    pub fn as_const_int(&self) -> Option<i64> {
        match self {
            Expr::Literal(Literal::Integer { value, .. }) => Some(*value),
            Expr::Operator(op) => op.as_negated_literal().and_then(i64::checked_neg),
            _ => None,
        }
    }

    pub fn is_zero_literal(&self) -> bool {
        self.as_literal().map_or(false, Literal::is_zero)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Expr::Variable(var) if var.is_optional)
    }

    pub fn is_typed(&self) -> bool {
        !matches!(self, Expr::Symbol(_)) && self.signature().is_typed()
    }

    pub fn as_builtin(&self) -> Option<&BuiltinCall> {
        match self {
            Expr::Builtin(call) => Some(call),
            _ => None,
        }
    }

    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Variable(_) | Expr::Symbol(_) | Expr::ArraySize { .. } => {
                Vec::new()
            }
            Expr::Indexed(indexed) => {
                let mut out = vec![&indexed.base];
                for index in &indexed.indices {
                    match index {
                        Index::Expr(e) => out.push(e),
                        Index::Slice(slice) => out.extend(slice.parts()),
                    }
                }
                out
            }
            Expr::Operator(op) => op.args.iter().collect(),
            Expr::Builtin(call) => call.children(),
        }
    }

    pub(crate) fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Expr)) {
        match self {
            Expr::Literal(_) | Expr::Variable(_) | Expr::Symbol(_) | Expr::ArraySize { .. } => {}
            Expr::Indexed(indexed) => {
                f(&mut indexed.base);
                for index in &mut indexed.indices {
                    match index {
                        Index::Expr(e) => f(e),
                        Index::Slice(slice) => {
                            for part in [&mut slice.start, &mut slice.stop, &mut slice.step] {
                                if let Some(e) = part {
                                    f(e);
                                }
                            }
                        }
                    }
                }
            }
            Expr::Operator(op) => op.args.iter_mut().for_each(f),
            Expr::Builtin(call) => call.for_each_child_mut(f),
        }
    }

    /// Returns a copy of `self` where every symbol or variable named in `bindings` is
    /// replaced by the bound expression.
    ///
    /// Signatures of enclosing nodes are kept as they were; this is only meant for
    /// syntactic substitution such as lambda application.
    pub fn substitute(&self, bindings: &[(&str, &Expr)]) -> Expr {
        let name = match self {
            Expr::Symbol(name) => Some(name.as_str()),
            Expr::Variable(var) => Some(var.name.as_str()),
            _ => None,
        };
        if let Some(name) = name {
            if let Some((_, value)) = bindings.iter().find(|(bound, _)| *bound == name) {
                return (*value).clone();
            }
        }
        let mut copy = self.clone();
        copy.for_each_child_mut(&mut |child| *child = child.substitute(bindings));
        copy
    }
}

impl Slice {
    pub fn new(start: Option<Expr>, stop: Option<Expr>, step: Option<Expr>) -> Self {
        Slice { start, stop, step }
    }

    /// `:`
    pub fn full() -> Self {
        Slice::default()
    }

    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.step.is_none()
    }

    pub fn parts(&self) -> impl Iterator<Item = &Expr> {
        [&self.start, &self.stop, &self.step]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

impl IndexedElement {
    /// Indexes `base` without looking through aggregate literals.
    ///
    /// Each integer subscript removes a dimension; a slice keeps it, with its size known
    /// only for a full `:` slice.
    pub fn new(base: Expr, indices: Vec<Index>) -> Self {
        let base_sig = base.signature();
        assert!(
            indices.len() <= base_sig.rank,
            "too many indices ({}) for rank {}",
            indices.len(),
            base_sig.rank
        );
        let base_shape = base_sig.shape.clone().unwrap_or_default();
        let mut shape = Vec::new();
        for (dim, index) in indices.iter().enumerate() {
            if let Index::Slice(slice) = index {
                let size = if slice.is_full() {
                    base_shape.get(dim).cloned().flatten()
                } else {
                    None
                };
                shape.push(size);
            }
        }
        shape.extend(base_shape.into_iter().skip(indices.len()));

        let element_dtype = match &base_sig.dtype {
            // a homogeneous sub-tuple of a composite shares the first kind
            DataType::InhomogeneousTuple(kinds) => kinds.first().cloned().unwrap_or(DataType::Generic),
            other => other.clone(),
        };
        let order = if shape.len() > 1 { base_sig.order } else { None };
        let class_type = if shape.is_empty() {
            ClassType::Scalar
        } else {
            base_sig.class_type
        };
        let signature = TypeSignature::array(element_dtype, base_sig.precision, shape, order, class_type);
        IndexedElement {
            base,
            indices,
            signature,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Variable(var) => write!(f, "{}", var.name),
            Expr::Symbol(name) => write!(f, "{}", name),
            Expr::ArraySize { array, index } => write!(f, "{}.shape[{}]", array, index),
            Expr::Indexed(indexed) => {
                let indices = indexed
                    .indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}[{}]", indexed.base, indices)
            }
            Expr::Operator(op) => write!(f, "{}", op),
            Expr::Builtin(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Expr(e) => write!(f, "{}", e),
            Index::Slice(slice) => {
                let part = |p: &Option<Expr>| p.as_ref().map(|e| e.to_string()).unwrap_or_default();
                write!(f, "{}:{}", part(&slice.start), part(&slice.stop))?;
                if let Some(step) = &slice.step {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Literal(lit)
    }
}
