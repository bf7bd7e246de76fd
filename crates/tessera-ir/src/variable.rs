use tessera_types::{ClassType, DataType, Order, Precision};

use crate::builtins::aggregate::analyze_elements;
use crate::expr::Expr;
use crate::signature::{Shape, TypeSignature};

/// How the storage behind a variable is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryHandling {
    Stack,
    Heap,
    /// Non-owning view of storage owned elsewhere.
    Alias,
}

/// A named, typed storage location.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub signature: TypeSignature,
    pub memory_handling: MemoryHandling,
    /// May hold `None` at run time.
    pub is_optional: bool,
    /// Can't be written through. Binding shape/stride parameters are always const.
    pub is_const: bool,
    /// Element variables of an inhomogeneous tuple variable, in order.
    pub members: Vec<Variable>,
}

impl Variable {
    pub fn new(name: impl Into<String>, signature: TypeSignature) -> Self {
        let memory_handling = if signature.rank > 0 {
            MemoryHandling::Heap
        } else {
            MemoryHandling::Stack
        };
        Variable {
            name: name.into(),
            signature,
            memory_handling,
            is_optional: false,
            is_const: false,
            members: Vec::new(),
        }
    }

    pub fn scalar(name: impl Into<String>, dtype: DataType) -> Self {
        Self::new(name, TypeSignature::scalar(dtype, Precision::DEFAULT))
    }

    /// An array whose dimension sizes are read from the array itself at run time.
    pub fn array(name: impl Into<String>, dtype: DataType, rank: usize, order: Order) -> Self {
        let name = name.into();
        let shape = (0..rank)
            .map(|index| {
                Some(Expr::ArraySize {
                    array: name.clone(),
                    index,
                })
            })
            .collect();
        Self::with_shape(name, dtype, shape, order)
    }

    pub fn with_shape(name: impl Into<String>, dtype: DataType, shape: Shape, order: Order) -> Self {
        let order = if shape.len() > 1 { Some(order) } else { None };
        Self::new(
            name,
            TypeSignature::array(dtype, Precision::DEFAULT, shape, order, ClassType::NdArray),
        )
    }

    /// A tuple variable whose elements are stored as separate member variables.
    pub fn tuple(name: impl Into<String>, members: Vec<Variable>) -> Self {
        let signatures: Vec<_> = members.iter().map(|m| m.signature.clone()).collect();
        let analysis = analyze_elements(&signatures, ClassType::HomogeneousTuple);
        let mut var = Self::new(name, analysis.signature);
        var.memory_handling = MemoryHandling::Stack;
        var.members = members;
        var
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.signature.precision = precision;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn alias(mut self) -> Self {
        self.memory_handling = MemoryHandling::Alias;
        self
    }

    pub fn dtype(&self) -> &DataType {
        &self.signature.dtype
    }

    pub fn rank(&self) -> usize {
        self.signature.rank
    }

    /// Tuple variable stored element by element, homogeneous or not.
    pub fn has_members(&self) -> bool {
        !self.members.is_empty()
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::Variable(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_shape_reads_own_sizes() {
        let x = Variable::array("x", DataType::Float, 2, Order::F);
        let shape = x.signature.shape.clone().unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape[1], Some(Expr::ArraySize { array: "x".into(), index: 1 }));
        assert_eq!(x.signature.order, Some(Order::F));
        assert_eq!(x.memory_handling, MemoryHandling::Heap);
    }

    #[test]
    fn one_dimensional_arrays_have_no_order() {
        let x = Variable::array("x", DataType::Integer, 1, Order::C);
        assert_eq!(x.signature.order, None);
    }

    #[test]
    fn tuple_variable_is_inhomogeneous_composite() {
        let t = Variable::tuple(
            "t",
            vec![
                Variable::scalar("t_0", DataType::Integer),
                Variable::scalar("t_1", DataType::Complex),
            ],
        );
        assert!(t.has_members());
        assert_eq!(
            t.signature.dtype,
            DataType::InhomogeneousTuple(vec![DataType::Integer, DataType::Complex])
        );
        assert_eq!(t.rank(), 1);
    }

    #[test]
    fn homogeneous_member_tuple_keeps_element_kind() {
        let t = Variable::tuple(
            "t",
            vec![
                Variable::scalar("t_0", DataType::Float),
                Variable::scalar("t_1", DataType::Float),
            ],
        );
        assert!(t.has_members());
        assert_eq!(*t.dtype(), DataType::Float);
        assert!(!Variable::scalar("x", DataType::Float).has_members());
    }
}
