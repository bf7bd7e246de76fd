// src/builtins/mod.rs
//! Typed nodes for the builtin functions of the source language.
//!
//! Every builtin is a factory: it looks at its operands and either returns an existing
//! expression (identity elimination, operand-driven rewriting), a folded literal, or a
//! freshly built [`BuiltinCall`] whose [`TypeSignature`] is fixed at construction.

pub mod aggregate;
pub mod cast;
pub mod complex;
pub mod iter;
pub mod misc;
pub mod reduce;

use std::fmt;

use tessera_types::{DataType, TypeError, TypeResult};

use crate::expr::Expr;
use crate::literal::Literal;
use crate::operators::Operator;
use crate::signature::TypeSignature;
use crate::stage::Stage;

pub use aggregate::{list, tuple, tuple_function, ListLiteral, TupleLiteral};
pub use cast::{to_bool, to_float, to_int};
pub use complex::{complex, conjugate, imag, real, ComplexAssembly};
pub use iter::{enumerate, map, range, zip, EnumerateNode, MapNode, RangeNode, ZipNode};
pub use misc::{lambda, print, python_type, LambdaNode, PrintNode, PrintTarget};
pub use reduce::{abs, len, max, min, sum};

/// Outcome of a builtin factory.
#[derive(Debug, Clone, PartialEq)]
pub enum Built {
    /// An existing expression, or one rebuilt from simpler primitives.
    Simplified(Expr),
    /// A constant computed at compile time.
    Folded(Literal),
    /// A new builtin node.
    Constructed(Expr),
}

impl Built {
    pub fn into_expr(self) -> Expr {
        match self {
            Built::Simplified(e) | Built::Constructed(e) => e,
            Built::Folded(lit) => Expr::Literal(lit),
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self, Built::Constructed(_))
    }
}

/// A builtin node together with its derived signature.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinCall {
    pub kind: BuiltinKind,
    pub signature: TypeSignature,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinKind {
    Bool(Expr),
    Int(Expr),
    Float(Expr),
    Complex(ComplexAssembly),
    Real(Expr),
    Imag(Expr),
    Conjugate(Expr),
    Tuple(TupleLiteral),
    List(ListLiteral),
    Len(Expr),
    Sum(Expr),
    Max(Expr),
    Min(Expr),
    Abs(Expr),
    Range(RangeNode),
    Zip(ZipNode),
    Enumerate(EnumerateNode),
    Map(MapNode),
    Print(PrintNode),
    Type(Expr),
    Lambda(LambdaNode),
}

impl BuiltinCall {
    pub(crate) fn expr(kind: BuiltinKind, signature: TypeSignature) -> Expr {
        Expr::Builtin(Box::new(BuiltinCall { kind, signature }))
    }

    /// Name under which the node is printed.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            BuiltinKind::Bool(_) => "bool",
            BuiltinKind::Int(_) => "int",
            BuiltinKind::Float(_) => "float",
            BuiltinKind::Complex(_) => "complex",
            BuiltinKind::Real(_) => "Real",
            BuiltinKind::Imag(_) => "Imag",
            BuiltinKind::Conjugate(_) => "Conjugate",
            BuiltinKind::Tuple(_) => "tuple",
            BuiltinKind::List(_) => "list",
            BuiltinKind::Len(_) => "len",
            BuiltinKind::Sum(_) => "sum",
            BuiltinKind::Max(_) => "max",
            BuiltinKind::Min(_) => "min",
            BuiltinKind::Abs(_) => "abs",
            BuiltinKind::Range(_) => "range",
            BuiltinKind::Zip(_) => "zip",
            BuiltinKind::Enumerate(_) => "enumerate",
            BuiltinKind::Map(_) => "map",
            BuiltinKind::Print(_) => "print",
            BuiltinKind::Type(_) => "type",
            BuiltinKind::Lambda(_) => "lambda",
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            BuiltinKind::Bool(e)
            | BuiltinKind::Int(e)
            | BuiltinKind::Float(e)
            | BuiltinKind::Real(e)
            | BuiltinKind::Imag(e)
            | BuiltinKind::Conjugate(e)
            | BuiltinKind::Len(e)
            | BuiltinKind::Sum(e)
            | BuiltinKind::Max(e)
            | BuiltinKind::Min(e)
            | BuiltinKind::Abs(e)
            | BuiltinKind::Type(e) => vec![e],
            BuiltinKind::Complex(c) => vec![&c.real, &c.imag],
            BuiltinKind::Tuple(t) => t.args.iter().collect(),
            BuiltinKind::List(l) => l.args.iter().collect(),
            BuiltinKind::Range(r) => vec![&r.start, &r.stop, &r.step],
            BuiltinKind::Zip(z) => z.args.iter().collect(),
            BuiltinKind::Enumerate(e) => vec![&e.element, &e.start],
            BuiltinKind::Map(m) => vec![&m.func, &m.func_args],
            BuiltinKind::Print(p) => vec![&p.expr],
            BuiltinKind::Lambda(l) => vec![&l.expr],
        }
    }

    pub(crate) fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Expr)) {
        match &mut self.kind {
            BuiltinKind::Bool(e)
            | BuiltinKind::Int(e)
            | BuiltinKind::Float(e)
            | BuiltinKind::Real(e)
            | BuiltinKind::Imag(e)
            | BuiltinKind::Conjugate(e)
            | BuiltinKind::Len(e)
            | BuiltinKind::Sum(e)
            | BuiltinKind::Max(e)
            | BuiltinKind::Min(e)
            | BuiltinKind::Abs(e)
            | BuiltinKind::Type(e) => f(e),
            BuiltinKind::Complex(c) => {
                f(&mut c.real);
                f(&mut c.imag);
                if let Some(source) = &mut c.cast_source {
                    f(source);
                }
            }
            BuiltinKind::Tuple(t) => t.args.iter_mut().for_each(f),
            BuiltinKind::List(l) => l.args.iter_mut().for_each(f),
            BuiltinKind::Range(r) => {
                f(&mut r.start);
                f(&mut r.stop);
                f(&mut r.step);
            }
            BuiltinKind::Zip(z) => z.args.iter_mut().for_each(f),
            BuiltinKind::Enumerate(e) => {
                f(&mut e.element);
                f(&mut e.start);
            }
            BuiltinKind::Map(m) => {
                f(&mut m.func);
                f(&mut m.func_args);
            }
            BuiltinKind::Print(p) => f(&mut p.expr),
            BuiltinKind::Lambda(l) => f(&mut l.expr),
        }
    }
}

fn join(args: &[Expr]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for BuiltinCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BuiltinKind::Complex(c) => write!(f, "complex({}, {})", c.real, c.imag),
            BuiltinKind::Tuple(t) if t.args.len() == 1 => write!(f, "({},)", t.args[0]),
            BuiltinKind::Tuple(t) => write!(f, "({})", join(&t.args)),
            BuiltinKind::List(l) => write!(f, "[{}]", join(&l.args)),
            BuiltinKind::Range(r) => write!(f, "range({}, {}, {})", r.start, r.stop, r.step),
            BuiltinKind::Zip(z) => write!(f, "zip({})", join(&z.args)),
            BuiltinKind::Enumerate(e) => write!(f, "enumerate({}, {})", e.element, e.start),
            BuiltinKind::Map(m) => write!(f, "map({}, {})", m.func, m.func_args),
            BuiltinKind::Print(p) => write!(f, "print({}, file={})", p.expr, p.file),
            BuiltinKind::Lambda(l) => write!(f, "lambda {}: {}", l.variables.join(", "), l.expr),
            _ => write!(f, "{}({})", self.name(), join_refs(&self.children())),
        }
    }
}

fn join_refs(args: &[&Expr]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

// --- Name dispatch ---

/// Builtin functions callable by name from source programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Abs,
    Range,
    Zip,
    Enumerate,
    Int,
    Float,
    Complex,
    Bool,
    Sum,
    Len,
    Max,
    Min,
    Not,
    Map,
    Type,
    Tuple,
}

impl BuiltinFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "abs" => BuiltinFunction::Abs,
            "range" => BuiltinFunction::Range,
            "zip" => BuiltinFunction::Zip,
            "enumerate" => BuiltinFunction::Enumerate,
            "int" => BuiltinFunction::Int,
            "float" => BuiltinFunction::Float,
            "complex" => BuiltinFunction::Complex,
            "bool" => BuiltinFunction::Bool,
            "sum" => BuiltinFunction::Sum,
            "len" => BuiltinFunction::Len,
            "max" => BuiltinFunction::Max,
            "min" => BuiltinFunction::Min,
            "not" => BuiltinFunction::Not,
            "map" => BuiltinFunction::Map,
            "type" => BuiltinFunction::Type,
            "tuple" => BuiltinFunction::Tuple,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinFunction::Abs => "abs",
            BuiltinFunction::Range => "range",
            BuiltinFunction::Zip => "zip",
            BuiltinFunction::Enumerate => "enumerate",
            BuiltinFunction::Int => "int",
            BuiltinFunction::Float => "float",
            BuiltinFunction::Complex => "complex",
            BuiltinFunction::Bool => "bool",
            BuiltinFunction::Sum => "sum",
            BuiltinFunction::Len => "len",
            BuiltinFunction::Max => "max",
            BuiltinFunction::Min => "min",
            BuiltinFunction::Not => "not",
            BuiltinFunction::Map => "map",
            BuiltinFunction::Type => "type",
            BuiltinFunction::Tuple => "tuple",
        }
    }

    /// Builds the node for a call with positional `args`.
    pub fn call(self, mut args: Vec<Expr>, stage: Stage) -> TypeResult<Built> {
        let name = self.name();
        let unary = |args: &mut Vec<Expr>| -> TypeResult<Expr> {
            if args.len() != 1 {
                return Err(TypeError::arity(name, "1", args.len()));
            }
            Ok(args.remove(0))
        };
        match self {
            BuiltinFunction::Abs => abs(unary(&mut args)?),
            BuiltinFunction::Int => Ok(to_int(unary(&mut args)?)),
            BuiltinFunction::Float => Ok(to_float(unary(&mut args)?)),
            BuiltinFunction::Bool => Ok(to_bool(unary(&mut args)?)),
            BuiltinFunction::Sum => sum(unary(&mut args)?),
            BuiltinFunction::Len => len(unary(&mut args)?),
            BuiltinFunction::Type => python_type(unary(&mut args)?),
            BuiltinFunction::Tuple => tuple_function(unary(&mut args)?, stage),
            BuiltinFunction::Not => Ok(Built::Constructed(Operator::not(unary(&mut args)?))),
            BuiltinFunction::Max => max(args),
            BuiltinFunction::Min => min(args),
            BuiltinFunction::Range => range(args),
            BuiltinFunction::Zip => zip(args, stage),
            BuiltinFunction::Complex => {
                if args.is_empty() || args.len() > 2 {
                    return Err(TypeError::arity(name, "1 or 2", args.len()));
                }
                let real_part = args.remove(0);
                complex(real_part, args.pop())
            }
            BuiltinFunction::Enumerate => {
                if args.is_empty() || args.len() > 2 {
                    return Err(TypeError::arity(name, "1 or 2", args.len()));
                }
                let element = args.remove(0);
                enumerate(element, args.pop(), stage)
            }
            BuiltinFunction::Map => {
                if args.len() != 2 {
                    return Err(TypeError::arity(name, "2", args.len()));
                }
                let func_args = args.remove(1);
                let func = args.remove(0);
                Ok(map(func, func_args))
            }
        }
    }
}

/// Element kind named by a builtin type name (`bool`, `int`, `float`, `complex`, `str`).
pub fn builtin_datatype(name: &str) -> Option<DataType> {
    match name {
        "bool" => Some(DataType::Bool),
        "int" => Some(DataType::Integer),
        "float" => Some(DataType::Float),
        "complex" => Some(DataType::Complex),
        "str" => Some(DataType::String),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_round_trips_names() {
        for name in ["abs", "range", "zip", "enumerate", "int", "float", "complex", "bool", "sum",
            "len", "max", "min", "not", "map", "type", "tuple"]
        {
            let function = BuiltinFunction::from_name(name).unwrap();
            assert_eq!(function.name(), name);
        }
        assert_eq!(BuiltinFunction::from_name("print"), None);
    }

    #[test]
    fn dispatch_checks_arity() {
        let err = BuiltinFunction::Len
            .call(vec![Expr::int(1), Expr::int(2)], Stage::Semantic)
            .unwrap_err();
        assert_eq!(err, TypeError::arity("len", "1", 2));
    }

    #[test]
    fn dispatch_builds_nodes() {
        let built = BuiltinFunction::Float
            .call(vec![Expr::int(3)], Stage::Semantic)
            .unwrap();
        assert_eq!(built, Built::Folded(Literal::float(3.0)));

        let built = BuiltinFunction::Not
            .call(vec![Expr::symbol("x")], Stage::Syntactic)
            .unwrap();
        assert_eq!(built.into_expr().to_string(), "not x");
    }

    #[test]
    fn datatype_names() {
        assert_eq!(builtin_datatype("complex"), Some(DataType::Complex));
        assert_eq!(builtin_datatype("list"), None);
    }
}
