// src/datatypes.rs
//! Scalar element kinds, precisions and memory orders shared by every typed node.

use std::fmt;

/// The scalar data category of a value.
///
/// `InhomogeneousTuple` is the structural composite produced by tuple literals whose
/// elements disagree on kind, precision, rank or order. It records each element's kind
/// in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Integer,
    Float,
    Complex,
    String,
    /// Unknown or untyped. Empty aggregates and syntactic-stage nodes carry this kind.
    Generic,
    Void,
    /// Opaque C pointer (`type(c_ptr)` on the Fortran side). Only the binding layer
    /// produces values of this kind.
    BindCPointer,
    InhomogeneousTuple(Vec<DataType>),
    /// An instance of the named user class.
    Class(String),
}

impl DataType {
    /// Returns `true` for `bool`, `int`, `float` and `complex`.
    pub fn is_numeric(&self) -> bool {
        self.promotion_rank().is_some()
    }

    /// Position of the kind in the numeric promotion chain
    /// `bool < int < float < complex`, or `None` for non-numeric kinds.
    pub fn promotion_rank(&self) -> Option<u8> {
        match self {
            DataType::Bool => Some(0),
            DataType::Integer => Some(1),
            DataType::Float => Some(2),
            DataType::Complex => Some(3),
            _ => None,
        }
    }

    /// Returns `true` if every value of `self` is representable in `target`
    /// without changing its numeric value (`bool ⊆ int ⊆ float ⊆ complex`).
    pub fn is_subset_of(&self, target: &DataType) -> bool {
        match (self.promotion_rank(), target.promotion_rank()) {
            (Some(from), Some(to)) => from <= to,
            _ => self == target,
        }
    }

    /// The byte width used when a node of this kind asks for the default precision.
    pub fn default_precision(&self) -> i8 {
        match self {
            DataType::Bool => 4,
            DataType::Integer | DataType::Float | DataType::Complex => 8,
            _ => 0,
        }
    }

    /// The numerically wider of two kinds, following the promotion chain.
    /// Non-numeric kinds only unify with themselves.
    pub fn promote(&self, other: &DataType) -> Option<DataType> {
        match (self.promotion_rank(), other.promotion_rank()) {
            (Some(a), Some(b)) => {
                let widest = if a >= b { self } else { other };
                // bool + bool arithmetic yields int
                if *widest == DataType::Bool {
                    Some(DataType::Integer)
                } else {
                    Some(widest.clone())
                }
            }
            _ if self == other => Some(self.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "bool"),
            DataType::Integer => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Complex => write!(f, "complex"),
            DataType::String => write!(f, "str"),
            DataType::Generic => write!(f, "*"),
            DataType::Void => write!(f, "void"),
            DataType::BindCPointer => write!(f, "bindcpointer"),
            DataType::InhomogeneousTuple(elements) => {
                let inner = elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "tuple[{}]", inner)
            }
            DataType::Class(name) => write!(f, "{}", name),
        }
    }
}

/// Byte-width selector for an element kind. `-1` means "default for the kind".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precision(i8);

impl Precision {
    pub const DEFAULT: Precision = Precision(-1);

    pub const fn new(bytes: i8) -> Self {
        Precision(bytes)
    }

    pub fn is_default(self) -> bool {
        self.0 == -1
    }

    /// Raw value as written on the node (`-1` for default).
    pub fn value(self) -> i8 {
        self.0
    }

    /// Concrete byte width once the default has been resolved against `dtype`.
    pub fn resolve(self, dtype: &DataType) -> i8 {
        if self.is_default() {
            dtype.default_precision()
        } else {
            self.0
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::DEFAULT
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memory layout order of a multi-dimensional value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Row-major.
    C,
    /// Column-major.
    F,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::C => write!(f, "C"),
            Order::F => write!(f, "F"),
        }
    }
}

/// The container class of a value, orthogonal to its element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassType {
    Scalar,
    NdArray,
    HomogeneousTuple,
    InhomogeneousTuple,
    HomogeneousList,
}
