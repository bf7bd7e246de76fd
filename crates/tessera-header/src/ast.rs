//! Syntax tree of header statements.

use std::fmt;

use miette::SourceSpan;
use tessera_ir::{Literal, Variable};
use tessera_types::{DataType, Order, Precision};

use crate::{HeaderError, HeaderResult};

// --- Types ---

/// Element type of an annotation before any dimensions are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseType {
    Builtin { dtype: DataType, precision: Precision },
    /// A name that is not a builtin type. Resolved against the declared templates.
    Named(String),
}

impl BaseType {
    /// Maps a header type name to its element type. `None` for names that are not builtin.
    pub fn builtin(name: &str) -> Option<BaseType> {
        let (dtype, precision) = match name {
            "bool" => (DataType::Bool, Precision::DEFAULT),
            "int" => (DataType::Integer, Precision::DEFAULT),
            "int8" => (DataType::Integer, Precision::new(1)),
            "int16" => (DataType::Integer, Precision::new(2)),
            "int32" => (DataType::Integer, Precision::new(4)),
            "int64" => (DataType::Integer, Precision::new(8)),
            "float" | "real" => (DataType::Float, Precision::DEFAULT),
            "float32" => (DataType::Float, Precision::new(4)),
            "float64" | "double" => (DataType::Float, Precision::new(8)),
            "complex" => (DataType::Complex, Precision::DEFAULT),
            "complex64" => (DataType::Complex, Precision::new(4)),
            "complex128" => (DataType::Complex, Precision::new(8)),
            "str" => (DataType::String, Precision::DEFAULT),
            "*" => (DataType::Generic, Precision::DEFAULT),
            _ => return None,
        };
        Some(BaseType::Builtin { dtype, precision })
    }
}

/// Kinds accepted by `(kind=n)` for each element type.
pub(crate) fn valid_kinds(dtype: &DataType) -> &'static [i8] {
    match dtype {
        DataType::Integer => &[1, 2, 4, 8],
        DataType::Float => &[4, 8],
        DataType::Complex => &[4, 8],
        _ => &[],
    }
}

/// One alternative of a type annotation, e.g. `float64[:,:](order=F)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAtom {
    pub base: BaseType,
    pub rank: usize,
    /// Only meaningful from rank 2 on.
    pub order: Option<Order>,
    pub span: SourceSpan,
}

impl TypeAtom {
    pub fn template_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Named(name) => Some(name),
            BaseType::Builtin { .. } => None,
        }
    }

    /// Replaces a template reference by one of the template's alternatives.
    ///
    /// Dimensions add up, so with `T(int[:])` the atom `T[:]` becomes `int[:,:]`. An
    /// order written on the reference wins over the alternative's.
    pub fn instantiate(&self, alternative: &TypeAtom) -> TypeAtom {
        TypeAtom {
            base: alternative.base.clone(),
            rank: self.rank + alternative.rank,
            order: self.order.or(alternative.order),
            span: self.span,
        }
    }

    pub fn to_variable(&self, name: impl Into<String>) -> HeaderResult<Variable> {
        let (dtype, precision) = match &self.base {
            BaseType::Builtin { dtype, precision } => (dtype.clone(), *precision),
            BaseType::Named(type_name) => {
                return Err(HeaderError::UnknownType {
                    span: self.span,
                    name: type_name.clone(),
                })
            }
        };
        let var = if self.rank == 0 {
            Variable::scalar(name, dtype)
        } else {
            Variable::array(name, dtype, self.rank, self.order.unwrap_or(Order::C))
        };
        Ok(var.with_precision(precision))
    }
}

impl fmt::Display for TypeAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Builtin { dtype, precision } => {
                write!(f, "{}", dtype)?;
                if !precision.is_default() {
                    write!(f, "(kind={})", precision)?;
                }
            }
            BaseType::Named(name) => write!(f, "{}", name)?,
        }
        if self.rank > 0 {
            let dims = vec![":"; self.rank].join(",");
            write!(f, "[{}]", dims)?;
        }
        if let Some(order) = self.order {
            write!(f, "(order={})", order)?;
        }
        Ok(())
    }
}

/// `[const] atom (| atom)*`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub is_const: bool,
    pub alternatives: Vec<TypeAtom>,
    pub span: SourceSpan,
}

impl TypeAnnotation {
    pub fn is_union(&self) -> bool {
        self.alternatives.len() > 1
    }

    /// The variable `name` described by this annotation. Unions have no single variable.
    pub fn to_variable(&self, name: impl Into<String>) -> HeaderResult<Variable> {
        match self.alternatives.as_slice() {
            [atom] => Ok(self.finish(atom.to_variable(name)?)),
            _ => Err(HeaderError::UnionVariable { span: self.span }),
        }
    }

    /// One variable per alternative, in the order written.
    pub fn to_variables(&self, name: &str) -> HeaderResult<Vec<Variable>> {
        self.alternatives
            .iter()
            .map(|atom| atom.to_variable(name).map(|var| self.finish(var)))
            .collect::<HeaderResult<Vec<_>>>()
    }

    fn finish(&self, var: Variable) -> Variable {
        if self.is_const {
            var.constant()
        } else {
            var
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        let parts: Vec<String> = self.alternatives.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join(" | "))
    }
}

// --- Statements ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
}

/// `[function|method] [static] name(types) [results(types)]`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader {
    pub kind: FunctionKind,
    pub is_static: bool,
    pub name: String,
    pub arguments: Vec<TypeAnnotation>,
    pub results: Vec<TypeAnnotation>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub types: TypeAnnotation,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaVariable {
    pub name: String,
    pub value: Literal,
}

/// `interface name = f | g`: one name dispatching to several functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceHeader {
    pub name: String,
    pub functions: Vec<String>,
}

/// A value passed to the function a macro expands to, or the default of a macro
/// argument.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroValue {
    Name(String),
    /// `x.shape`, `x.shape[0]`
    Attribute {
        name: String,
        attribute: String,
        index: Option<i64>,
    },
    Literal(Literal),
}

impl fmt::Display for MacroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroValue::Name(name) => write!(f, "{}", name),
            MacroValue::Attribute {
                name,
                attribute,
                index,
            } => {
                write!(f, "{}.{}", name, attribute)?;
                if let Some(index) = index {
                    write!(f, "[{}]", index)?;
                }
                Ok(())
            }
            MacroValue::Literal(Literal::String(text)) => write!(f, "'{}'", text),
            MacroValue::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

/// A parameter of the macro as written at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroArgument {
    Name {
        name: String,
        default: Option<MacroValue>,
    },
    /// `(a, b)`: a tuple unpacked into its names.
    Tuple(Vec<String>),
}

impl fmt::Display for MacroArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroArgument::Name { name, default: None } => write!(f, "{}", name),
            MacroArgument::Name {
                name,
                default: Some(value),
            } => write!(f, "{}={}", name, value),
            MacroArgument::Tuple(names) => write!(f, "({})", names.join(", ")),
        }
    }
}

/// `macro [(results),] name(args) := master(values)`
///
/// A dotted name `Point.translate` binds the leading parts as extra leading arguments
/// of a macro named after the last part.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroHeader {
    /// `macro x := y`
    Variable { name: String, master: String },
    Function {
        name: String,
        arguments: Vec<MacroArgument>,
        master: String,
        master_arguments: Vec<MacroValue>,
        results: Vec<String>,
        span: SourceSpan,
    },
}

impl MacroHeader {
    pub fn name(&self) -> &str {
        match self {
            MacroHeader::Variable { name, .. } | MacroHeader::Function { name, .. } => name,
        }
    }

    pub fn master(&self) -> &str {
        match self {
            MacroHeader::Variable { master, .. } | MacroHeader::Function { master, .. } => master,
        }
    }
}

impl fmt::Display for MacroHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(items: &[T]) -> String {
            items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        }
        match self {
            MacroHeader::Variable { name, master } => write!(f, "{} := {}", name, master),
            MacroHeader::Function {
                name,
                arguments,
                master,
                master_arguments,
                results,
                ..
            } => {
                if !results.is_empty() {
                    write!(f, "({}), ", results.join(", "))?;
                }
                write!(f, "{}({}) := {}({})", name, list(arguments), master, list(master_arguments))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderStmt {
    Variable {
        name: String,
        annotation: TypeAnnotation,
    },
    Function(FunctionHeader),
    Template(Template),
    Metavar(MetaVariable),
    Interface(InterfaceHeader),
    Macro(MacroHeader),
}

impl HeaderStmt {
    pub fn name(&self) -> &str {
        match self {
            HeaderStmt::Variable { name, .. } => name,
            HeaderStmt::Function(header) => &header.name,
            HeaderStmt::Template(template) => &template.name,
            HeaderStmt::Metavar(meta) => &meta.name,
            HeaderStmt::Interface(interface) => &interface.name,
            HeaderStmt::Macro(macro_header) => macro_header.name(),
        }
    }
}
