// src/ndarray.rs
//! C-API type constants and type checks used when marshalling arrays.

use std::fmt;

use tessera_ir::Variable;
use tessera_types::{DataType, Order};

use crate::error::{BindError, BindResult};

/// An `NPY_*` type number constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumpyType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    LongDouble,
    CFloat,
    CDouble,
    CLongDouble,
}

impl NumpyType {
    pub fn c_name(self) -> &'static str {
        match self {
            NumpyType::Bool => "NPY_BOOL",
            NumpyType::Int8 => "NPY_INT8",
            NumpyType::Int16 => "NPY_INT16",
            NumpyType::Int32 => "NPY_INT32",
            NumpyType::Int64 => "NPY_INT64",
            NumpyType::Float => "NPY_FLOAT",
            NumpyType::Double => "NPY_DOUBLE",
            NumpyType::LongDouble => "NPY_LONGDOUBLE",
            NumpyType::CFloat => "NPY_CFLOAT",
            NumpyType::CDouble => "NPY_CDOUBLE",
            NumpyType::CLongDouble => "NPY_CLONGDOUBLE",
        }
    }
}

impl fmt::Display for NumpyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

fn unsupported(name: &str, dtype: &DataType, precision: i8) -> BindError {
    BindError::UnsupportedDtype {
        name: name.to_string(),
        dtype: dtype.to_string(),
        precision,
    }
}

/// Type constant for an element kind at a resolved precision.
pub fn numpy_type_for(dtype: &DataType, precision: i8) -> BindResult<NumpyType> {
    let ty = match (dtype, precision) {
        (DataType::Bool, 4) => NumpyType::Bool,
        (DataType::Integer, 1) => NumpyType::Int8,
        (DataType::Integer, 2) => NumpyType::Int16,
        (DataType::Integer, 4) => NumpyType::Int32,
        (DataType::Integer, 8) | (DataType::Integer, 16) => NumpyType::Int64,
        (DataType::Float, 4) => NumpyType::Float,
        (DataType::Float, 8) => NumpyType::Double,
        (DataType::Float, 16) => NumpyType::LongDouble,
        (DataType::Complex, 4) => NumpyType::CFloat,
        (DataType::Complex, 8) => NumpyType::CDouble,
        (DataType::Complex, 16) => NumpyType::CLongDouble,
        _ => return Err(unsupported("<dtype>", dtype, precision)),
    };
    Ok(ty)
}

/// Type constant for `var`, naming `var` in the error.
pub fn numpy_type_of(var: &Variable) -> BindResult<NumpyType> {
    let precision = var.signature.final_precision();
    numpy_type_for(var.dtype(), precision).map_err(|_| unsupported(&var.name, var.dtype(), precision))
}

/// Contiguity flag passed to the array check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderFlag {
    NoOrderCheck,
    CContiguous,
    FContiguous,
}

impl fmt::Display for OrderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderFlag::NoOrderCheck => "NO_ORDER_CHECK",
            OrderFlag::CContiguous => "NPY_ARRAY_C_CONTIGUOUS",
            OrderFlag::FContiguous => "NPY_ARRAY_F_CONTIGUOUS",
        })
    }
}

/// A call validating that a Python object is an array of the expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayTypeCheck {
    /// `pyarray_check` raises on mismatch, `is_numpy_array` only reports.
    pub function: &'static str,
    pub object: String,
    pub type_ref: NumpyType,
    pub rank: usize,
    pub flag: OrderFlag,
}

impl fmt::Display for ArrayTypeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {}, {})",
            self.function, self.object, self.type_ref, self.rank, self.flag
        )
    }
}

/// Check that `py_variable` holds an array matching the rank, kind, precision and order
/// of `c_variable`. Order is only checked for `rank > 1`.
pub fn array_type_check(
    py_variable: &Variable,
    c_variable: &Variable,
    raise_error: bool,
) -> BindResult<ArrayTypeCheck> {
    let rank = c_variable.rank();
    let type_ref = numpy_type_of(c_variable)?;
    let flag = match (rank > 1, c_variable.signature.order) {
        (true, Some(Order::F)) => OrderFlag::FContiguous,
        (true, _) => OrderFlag::CContiguous,
        (false, _) => OrderFlag::NoOrderCheck,
    };
    Ok(ArrayTypeCheck {
        function: if raise_error { "pyarray_check" } else { "is_numpy_array" },
        object: py_variable.name.clone(),
        type_ref,
        rank,
        flag,
    })
}

/// `PyArray_IsScalar(o, Ref)` for a scalar of `c_variable`'s type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarTypeCheck {
    pub object: String,
    pub type_ref: &'static str,
}

impl fmt::Display for ScalarTypeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PyArray_IsScalar({}, {})", self.object, self.type_ref)
    }
}

pub fn scalar_type_check(py_variable: &Variable, c_variable: &Variable) -> BindResult<ScalarTypeCheck> {
    let precision = c_variable.signature.final_precision();
    let type_ref = match (c_variable.dtype(), precision) {
        (DataType::Integer, 1) => "Int8",
        (DataType::Integer, 2) => "Int16",
        (DataType::Integer, 4) => "Int32",
        (DataType::Integer, 8) => "Int64",
        (DataType::Float, 4) => "Float32",
        (DataType::Float, 8) => "Float64",
        (DataType::Complex, 4) => "Complex64",
        (DataType::Complex, 8) => "Complex128",
        (DataType::Bool, 4) => "Bool",
        (dtype, _) => return Err(unsupported(&c_variable.name, dtype, precision)),
    };
    Ok(ScalarTypeCheck {
        object: py_variable.name.clone(),
        type_ref,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::Precision;

    #[test]
    fn registry_covers_standard_kinds() {
        assert_eq!(numpy_type_for(&DataType::Bool, 4).unwrap(), NumpyType::Bool);
        assert_eq!(numpy_type_for(&DataType::Integer, 4).unwrap(), NumpyType::Int32);
        assert_eq!(numpy_type_for(&DataType::Float, 8).unwrap(), NumpyType::Double);
        assert_eq!(numpy_type_for(&DataType::Complex, 16).unwrap(), NumpyType::CLongDouble);
        assert!(numpy_type_for(&DataType::String, 0).is_err());
        assert!(numpy_type_for(&DataType::Float, 2).is_err());
    }

    #[test]
    fn array_check_order_flag() {
        let py = Variable::scalar("arr_obj", DataType::Generic);
        let a = Variable::array("a", DataType::Float, 2, Order::F);
        let check = array_type_check(&py, &a, true).unwrap();
        assert_eq!(check.to_string(), "pyarray_check(arr_obj, NPY_DOUBLE, 2, NPY_ARRAY_F_CONTIGUOUS)");

        let v = Variable::array("v", DataType::Integer, 1, Order::F).with_precision(Precision::new(4));
        let check = array_type_check(&py, &v, false).unwrap();
        assert_eq!(check.to_string(), "is_numpy_array(arr_obj, NPY_INT32, 1, NO_ORDER_CHECK)");
    }

    #[test]
    fn scalar_refs() {
        let py = Variable::scalar("o", DataType::Generic);
        let z = Variable::scalar("z", DataType::Complex);
        assert_eq!(scalar_type_check(&py, &z).unwrap().to_string(), "PyArray_IsScalar(o, Complex128)");
        let s = Variable::scalar("s", DataType::String);
        assert!(matches!(
            scalar_type_check(&py, &s),
            Err(BindError::UnsupportedDtype { .. })
        ));
    }
}
