// src/wrapper.rs
//! Builds C-callable wrappers for functions and modules.

use tessera_ir::{
    ClassDef, ClassId, DefArena, Expr, FunctionDef, FunctionId, Index, IndexedElement, ModuleId,
    Operator, Scope, Slice, Variable,
};
use tessera_types::{DataType, Order};

use crate::argument::{BindCFunctionDefArgument, BindCFunctionDefResult};
use crate::error::{BindError, BindResult};
use crate::function::BindCFunctionDef;
use crate::module::{
    BindCArrayVariable, BindCClassDef, BindCClassProperty, BindCModule, BindCVariable,
};
use crate::ndarray::numpy_type_of;
use crate::pointer::{CFPointer, CLocFunc, WrapperStmt};

/// Translates function and module definitions into their C-callable counterparts.
///
/// Scalars cross the boundary by value. An array argument is received as an opaque handle
/// plus shape and stride integers; the wrapper views the handle as an array and passes
/// the strided section on. An array result is returned as a handle plus its shape. A class
/// instance travels as a handle to the object.
#[derive(Debug, Clone)]
pub struct CBindingWrapper {
    prefix: String,
}

impl Default for CBindingWrapper {
    fn default() -> Self {
        CBindingWrapper {
            prefix: "bind_c_".to_string(),
        }
    }
}

impl CBindingWrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `prefix` instead of `bind_c_` for generated function names.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        CBindingWrapper {
            prefix: prefix.into(),
        }
    }

    fn bound_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name).to_lowercase()
    }

    /// Wraps function `id`. `scope` is the naming scope of the new function.
    pub fn wrap_function(
        &self,
        arena: &DefArena,
        id: FunctionId,
        scope: &mut Scope,
    ) -> BindResult<BindCFunctionDef> {
        let name = self.bound_name(&arena.function(id).name);
        self.wrap_function_as(arena, id, name, scope)
    }

    fn wrap_function_as(
        &self,
        arena: &DefArena,
        id: FunctionId,
        name: String,
        scope: &mut Scope,
    ) -> BindResult<BindCFunctionDef> {
        let func = arena.function(id);
        log::debug!("wrapping function `{}` as `{}`", func.name, name);
        if func.is_private {
            return Err(unsupported_signature(func, "private functions are not exported"));
        }
        for arg in &func.arguments {
            check_supported(func, &arg.var)?;
            scope.insert_symbol(arg.name());
        }
        for res in &func.results {
            check_supported(func, &res.var)?;
            scope.insert_symbol(&res.var.name);
        }
        scope.insert_symbol(&name);

        let mut body = Vec::new();
        let mut arguments = Vec::new();
        let mut call_args = Vec::new();
        for arg in &func.arguments {
            let original = arg.var.clone();
            if is_instance(&original) {
                let (handle, object, view) = instance_view(scope, &original);
                body.push(WrapperStmt::Reinterpret(view));
                call_args.push(Expr::Variable(object));
                arguments.push(BindCFunctionDefArgument::new(handle, scope, original, arg.inout));
                continue;
            }
            if original.rank() == 0 {
                call_args.push(Expr::Variable(original.clone()));
                arguments.push(BindCFunctionDefArgument::new(
                    original.clone(),
                    scope,
                    original,
                    arg.inout,
                ));
                continue;
            }
            let handle = Variable::scalar(original.name.clone(), DataType::BindCPointer);
            let wrapper = BindCFunctionDefArgument::new(handle.clone(), scope, original, arg.inout);
            let (view, section) = strided_view(scope, &handle, &wrapper);
            body.push(WrapperStmt::Reinterpret(view));
            call_args.push(section);
            arguments.push(wrapper);
        }

        let mut results = Vec::new();
        let mut call_results = Vec::new();
        let mut epilogue = Vec::new();
        for res in &func.results {
            let original = res.var.clone();
            if is_instance(&original) {
                let object_name = scope.get_new_name(&original.name);
                let object = Variable::scalar(object_name, original.dtype().clone()).alias();
                let handle = Variable::scalar(original.name.clone(), DataType::BindCPointer);
                epilogue.push(WrapperStmt::AddressOf(CLocFunc::new(object.clone(), handle.clone())));
                call_results.push(object);
                results.push(BindCFunctionDefResult::new(handle, original, scope));
                continue;
            }
            if original.rank() == 0 {
                call_results.push(original.clone());
                results.push(BindCFunctionDefResult::new(original.clone(), original, scope));
                continue;
            }
            let local = local_array(scope.get_new_name(&original.name), &original);
            let handle = Variable::scalar(original.name.clone(), DataType::BindCPointer);
            let wrapper = BindCFunctionDefResult::new(handle.clone(), original, scope);
            epilogue.push(WrapperStmt::AddressOf(CLocFunc::new(local.clone(), handle)));
            epilogue.extend(shape_assignments(&local.name, wrapper.shape()));
            call_results.push(local);
            results.push(wrapper);
        }

        body.push(WrapperStmt::Call {
            function: id,
            args: call_args,
            results: call_results,
        });
        body.extend(epilogue);
        Ok(BindCFunctionDef::new(name, arguments, results, body, Some(id)))
    }

    /// Wraps the methods and attributes of class `id`.
    ///
    /// Methods become `{prefix}{class}_{method}`. An attribute C can use gets a getter
    /// `{prefix}{class}_{attribute}_get`, and a scalar one also gets a `_set` counterpart.
    /// Generated names are reserved in `scope`.
    pub fn wrap_class(&self, arena: &DefArena, id: ClassId, scope: &mut Scope) -> BindCClassDef {
        let class = arena.class(id);
        log::debug!("wrapping class `{}`", class.name);
        let mut bound = BindCClassDef::new(class.name.clone(), id);

        for &fid in &class.methods {
            let method = arena.function(fid);
            let name = scope.get_new_name(&self.bound_name(&format!("{}_{}", class.name, method.name)));
            match self.wrap_function_as(arena, fid, name, &mut Scope::new()) {
                Ok(def) => bound.methods.push(def),
                Err(err) => {
                    log::info!(
                        "removing method `{}` from bound class `{}`: {}",
                        method.name,
                        class.name,
                        err
                    );
                    bound.removed_methods.push(fid);
                }
            }
        }

        for attr in &class.attributes {
            if attr.is_optional || numpy_type_of(attr).is_err() {
                log::debug!("attribute `{}.{}` is not visible from C", class.name, attr.name);
                continue;
            }
            let getter = self.attribute_getter(class, attr, scope);
            let setter = (attr.rank() == 0).then(|| self.attribute_setter(class, attr, scope));
            bound.attributes.push(BindCClassProperty::new(attr.clone(), getter, setter));
        }
        bound
    }

    /// Wraps every function, class and variable of module `id` that C can use.
    ///
    /// `scope` is the naming scope of the binding module; each bound function gets a
    /// fresh scope of its own.
    pub fn wrap_module(&self, arena: &DefArena, id: ModuleId, scope: &mut Scope) -> BindCModule {
        let module = arena.module(id);
        log::debug!("wrapping module `{}`", module.name);
        let mut bound = BindCModule::new(module.name.clone(), id);
        for var in &module.variables {
            scope.insert_symbol(&var.name);
        }

        for &fid in &module.functions {
            let mut function_scope = Scope::new();
            match self.wrap_function(arena, fid, &mut function_scope) {
                Ok(def) => {
                    scope.insert_symbol(def.name());
                    bound.functions.push(def);
                }
                Err(err) => {
                    log::info!(
                        "removing `{}` from bound module `{}`: {}",
                        arena.function(fid).name,
                        module.name,
                        err
                    );
                    bound.removed_functions.push(fid);
                }
            }
        }

        for &cid in &module.classes {
            let class = self.wrap_class(arena, cid, scope);
            bound.classes.push(class);
        }

        for var in &module.variables {
            if var.is_optional || numpy_type_of(var).is_err() {
                log::debug!("module variable `{}` is not visible from C", var.name);
                continue;
            }
            if var.rank() == 0 {
                bound.variables.push(BindCVariable::new(var.clone()));
                continue;
            }
            let accessor = self.array_accessor(var, scope);
            bound.array_variables.push(BindCArrayVariable::new(
                accessor.bind_c_results()[0].var().clone(),
                accessor.name().to_string(),
                var.clone(),
            ));
            bound.variable_wrappers.push(accessor);
        }
        bound
    }

    /// `bind_c_{name}() -> (handle, shape...)` for a module array.
    fn array_accessor(&self, var: &Variable, module_scope: &mut Scope) -> BindCFunctionDef {
        let name = module_scope.get_new_name(&self.bound_name(&var.name));
        let mut scope = Scope::new();
        scope.insert_symbol(&var.name);
        scope.insert_symbol(&name);
        let handle = Variable::scalar(scope.get_new_name(&format!("{}_ptr", var.name)), DataType::BindCPointer);
        let result = BindCFunctionDefResult::new(handle.clone(), var.clone(), &mut scope);

        let mut body = vec![WrapperStmt::AddressOf(CLocFunc::new(var.clone(), handle))];
        body.extend(shape_assignments(&var.name, result.shape()));
        BindCFunctionDef::new(name, vec![], vec![result], body, None)
    }

    fn attribute_getter(
        &self,
        class: &ClassDef,
        attr: &Variable,
        class_scope: &mut Scope,
    ) -> BindCFunctionDef {
        let name = class_scope.get_new_name(&self.bound_name(&format!("{}_{}_get", class.name, attr.name)));
        let mut scope = Scope::new();
        scope.insert_symbol(&name);
        let (this, object, view) = self_argument(&mut scope, class);
        let mut body = vec![view];

        if attr.rank() == 0 {
            let value = Variable::scalar(scope.get_new_name(&attr.name), attr.dtype().clone())
                .with_precision(attr.signature.precision);
            body.push(WrapperStmt::GetAttribute {
                lhs: value.clone(),
                object,
                attribute: attr.clone(),
            });
            let result = BindCFunctionDefResult::new(value.clone(), value, &mut scope);
            return BindCFunctionDef::new(name, vec![this], vec![result], body, None);
        }

        let local = local_array(scope.get_new_name(&attr.name), attr);
        let handle = Variable::scalar(scope.get_new_name(&format!("{}_ptr", attr.name)), DataType::BindCPointer);
        let result = BindCFunctionDefResult::new(handle.clone(), attr.clone(), &mut scope);
        body.push(WrapperStmt::GetAttribute {
            lhs: local.clone(),
            object,
            attribute: attr.clone(),
        });
        body.push(WrapperStmt::AddressOf(CLocFunc::new(local.clone(), handle)));
        body.extend(shape_assignments(&local.name, result.shape()));
        BindCFunctionDef::new(name, vec![this], vec![result], body, None)
    }

    fn attribute_setter(
        &self,
        class: &ClassDef,
        attr: &Variable,
        class_scope: &mut Scope,
    ) -> BindCFunctionDef {
        let name = class_scope.get_new_name(&self.bound_name(&format!("{}_{}_set", class.name, attr.name)));
        let mut scope = Scope::new();
        scope.insert_symbol(&name);
        let (this, object, view) = self_argument(&mut scope, class);
        let value = Variable::scalar(scope.get_new_name(&attr.name), attr.dtype().clone())
            .with_precision(attr.signature.precision);
        let body = vec![
            view,
            WrapperStmt::SetAttribute {
                object,
                attribute: attr.clone(),
                value: Expr::Variable(value.clone()),
            },
        ];
        let value_arg = BindCFunctionDefArgument::new(value.clone(), &mut scope, value, false);
        BindCFunctionDef::new(name, vec![this, value_arg], vec![], body, None)
    }
}

fn unsupported_signature(func: &FunctionDef, reason: impl Into<String>) -> BindError {
    BindError::UnsupportedSignature {
        function: func.name.clone(),
        reason: reason.into(),
    }
}

fn check_supported(func: &FunctionDef, var: &Variable) -> BindResult<()> {
    if var.is_optional {
        return Err(unsupported_signature(
            func,
            format!("optional argument `{}`", var.name),
        ));
    }
    if let DataType::Class(class) = var.dtype() {
        if var.rank() > 0 {
            return Err(unsupported_signature(
                func,
                format!("`{}` is an array of `{}` instances", var.name, class),
            ));
        }
        return Ok(());
    }
    numpy_type_of(var).map(|_| ())
}

fn is_instance(var: &Variable) -> bool {
    matches!(var.dtype(), DataType::Class(_)) && var.rank() == 0
}

/// A handle named after `instance` and the object it is viewed as.
fn instance_view(scope: &mut Scope, instance: &Variable) -> (Variable, Variable, CFPointer) {
    let handle = Variable::scalar(instance.name.clone(), DataType::BindCPointer);
    let object = Variable::scalar(scope.get_new_name(&instance.name), instance.dtype().clone()).alias();
    let view = CFPointer::new(handle.clone(), object.clone(), vec![]);
    (handle, object, view)
}

/// The `self` handle of an accessor, the instance behind it and the statement that
/// views one as the other.
fn self_argument(scope: &mut Scope, class: &ClassDef) -> (BindCFunctionDefArgument, Variable, WrapperStmt) {
    let this = Variable::scalar(scope.get_new_name("self"), class.instance_dtype());
    let (handle, object, view) = instance_view(scope, &this);
    let argument = BindCFunctionDefArgument::new(handle, scope, this, false);
    (argument, object, WrapperStmt::Reinterpret(view))
}

/// Array `name` shaped by its own run-time sizes, with the element type of `like`.
fn local_array(name: String, like: &Variable) -> Variable {
    let order = like.signature.order.unwrap_or(Order::F);
    Variable::array(name, like.dtype().clone(), like.rank(), order)
        .with_precision(like.signature.precision)
        .alias()
}

/// Views the memory behind `handle` as an array spanning `shape_i * stride_i` elements per
/// dimension, and the section `view[::stride_1, ::stride_2, ...]` holding the argument.
fn strided_view(
    scope: &mut Scope,
    handle: &Variable,
    wrapper: &BindCFunctionDefArgument,
) -> (CFPointer, Expr) {
    let original = wrapper.original_function_argument_variable();
    let memory_shape: Vec<Expr> = wrapper
        .shape()
        .iter()
        .zip(wrapper.strides())
        .map(|(size, stride)| Operator::mul(Expr::Variable(size.clone()), Expr::Variable(stride.clone())))
        .collect();
    let order = original.signature.order.unwrap_or(Order::F);
    let view = Variable::with_shape(
        scope.get_new_name(&original.name),
        original.dtype().clone(),
        memory_shape.iter().cloned().map(Some).collect(),
        order,
    )
    .with_precision(original.signature.precision)
    .alias();

    let steps = wrapper
        .strides()
        .iter()
        .map(|stride| Index::Slice(Slice::new(None, None, Some(Expr::Variable(stride.clone())))))
        .collect();
    let section = Expr::Indexed(Box::new(IndexedElement::new(Expr::Variable(view.clone()), steps)));
    (CFPointer::new(handle.clone(), view, memory_shape), section)
}

fn shape_assignments(array: &str, shape: &[Variable]) -> Vec<WrapperStmt> {
    shape
        .iter()
        .enumerate()
        .map(|(index, size)| WrapperStmt::Assign {
            lhs: size.clone(),
            rhs: Expr::ArraySize {
                array: array.to_string(),
                index,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ir::{FunctionDefArgument, FunctionDefResult, Module};
    use tessera_types::Precision;

    #[test]
    fn private_functions_are_refused() {
        let mut arena = DefArena::new();
        let id = arena.alloc_function(FunctionDef::new("hidden", vec![], vec![]).private());
        let err = CBindingWrapper::new()
            .wrap_function(&arena, id, &mut Scope::new())
            .unwrap_err();
        assert!(matches!(err, BindError::UnsupportedSignature { .. }));
    }

    #[test]
    fn scalar_function_passes_values_through() {
        let mut arena = DefArena::new();
        let x = Variable::scalar("x", DataType::Float);
        let y = Variable::scalar("y", DataType::Float);
        let id = arena.alloc_function(FunctionDef::new(
            "Square",
            vec![FunctionDefArgument::new(x.clone())],
            vec![FunctionDefResult::new(y.clone())],
        ));
        let def = CBindingWrapper::new()
            .wrap_function(&arena, id, &mut Scope::new())
            .unwrap();
        assert_eq!(def.name(), "bind_c_square");
        assert_eq!(def.arguments().len(), 1);
        assert_eq!(def.results().len(), 1);
        assert_eq!(
            def.body(),
            &[WrapperStmt::Call {
                function: id,
                args: vec![Expr::Variable(x)],
                results: vec![y],
            }]
        );
    }

    #[test]
    fn array_result_is_returned_by_address() {
        let mut arena = DefArena::new();
        let out = Variable::array("out", DataType::Integer, 1, Order::C);
        let id = arena.alloc_function(FunctionDef::new(
            "make",
            vec![],
            vec![FunctionDefResult::new(out)],
        ));
        let def = CBindingWrapper::new()
            .wrap_function(&arena, id, &mut Scope::new())
            .unwrap();
        let names: Vec<_> = def.results().iter().map(|r| r.var.name.clone()).collect();
        assert_eq!(names, vec!["out", "out_shape_1"]);
        assert_eq!(*def.results()[0].var.dtype(), DataType::BindCPointer);
        assert!(matches!(def.body()[1], WrapperStmt::AddressOf(_)));
        assert!(matches!(def.body()[2], WrapperStmt::Assign { .. }));
    }

    #[test]
    fn module_removes_unsupported_functions() {
        let mut arena = DefArena::new();
        let module = arena.alloc_module(Module::new("m"));
        let ok = arena.add_function_to(module, FunctionDef::new("f", vec![], vec![]));
        let text = Variable::scalar("s", DataType::String);
        let bad = arena.add_function_to(
            module,
            FunctionDef::new("g", vec![FunctionDefArgument::new(text)], vec![]),
        );
        let bound = CBindingWrapper::new().wrap_module(&arena, module, &mut Scope::new());
        assert_eq!(bound.functions.len(), 1);
        assert_eq!(bound.functions[0].original_function(), Some(ok));
        assert_eq!(bound.removed_functions, vec![bad]);
    }

    #[test]
    fn instance_argument_is_viewed_through_its_handle() {
        let mut arena = DefArena::new();
        let module = arena.alloc_module(Module::new("shapes"));
        let point = arena.add_class_to(module, ClassDef::new("Point", vec![]));
        let this = Variable::scalar("self", DataType::Class("Point".into()));
        let norm = Variable::scalar("n", DataType::Float);
        let id = arena.add_method_to(
            point,
            FunctionDef::new(
                "norm",
                vec![FunctionDefArgument::new(this)],
                vec![FunctionDefResult::new(norm.clone())],
            ),
        );
        let bound = CBindingWrapper::new().wrap_class(&arena, point, &mut Scope::new());
        assert!(bound.removed_methods.is_empty());
        let def = &bound.methods[0];
        assert_eq!(def.name(), "bind_c_point_norm");
        assert_eq!(*def.arguments()[0].var.dtype(), DataType::BindCPointer);

        let object = match &def.body()[0] {
            WrapperStmt::Reinterpret(view) => {
                assert_eq!(view.c_pointer().name, "self");
                assert!(view.shape().is_empty());
                view.f_array().clone()
            }
            other => panic!("expected c_f_pointer, found {:?}", other),
        };
        assert_eq!(object.name, "self_0001");
        assert_eq!(
            def.body()[1],
            WrapperStmt::Call {
                function: id,
                args: vec![Expr::Variable(object)],
                results: vec![norm],
            }
        );
    }

    #[test]
    fn scalar_attribute_gets_getter_and_setter() {
        let mut arena = DefArena::new();
        let x = Variable::scalar("x", DataType::Float).with_precision(Precision::new(8));
        let data = Variable::array("data", DataType::Integer, 1, Order::F);
        let label = Variable::scalar("label", DataType::String);
        let point = arena.alloc_class(ClassDef::new("Point", vec![x, data, label]));
        let bound = CBindingWrapper::new().wrap_class(&arena, point, &mut Scope::new());

        let names: Vec<_> = bound.attributes.iter().map(|p| p.attribute().name.as_str()).collect();
        assert_eq!(names, vec!["x", "data"]);

        let x_prop = &bound.attributes[0];
        assert_eq!(x_prop.getter().name(), "bind_c_point_x_get");
        assert!(matches!(x_prop.getter().body()[1], WrapperStmt::GetAttribute { .. }));
        let setter = x_prop.setter().expect("scalar attributes are writable");
        assert_eq!(setter.name(), "bind_c_point_x_set");
        assert_eq!(setter.arguments().len(), 2);
        assert!(matches!(setter.body()[1], WrapperStmt::SetAttribute { .. }));

        let data_prop = &bound.attributes[1];
        assert!(data_prop.setter().is_none());
        let results: Vec<_> = data_prop.getter().results().iter().map(|r| r.var.name.clone()).collect();
        assert_eq!(results, vec!["data_ptr", "data_shape_1"]);
        assert!(bound.function("bind_c_point_data_get").is_some());
    }

    #[test]
    fn arrays_of_instances_are_refused() {
        let mut arena = DefArena::new();
        let point = arena.alloc_class(ClassDef::new("Point", vec![]));
        let many = Variable::array("points", DataType::Class("Point".into()), 1, Order::F);
        let id = arena.add_method_to(
            point,
            FunctionDef::new("spread", vec![FunctionDefArgument::new(many)], vec![]),
        );
        let bound = CBindingWrapper::new().wrap_class(&arena, point, &mut Scope::new());
        assert!(bound.methods.is_empty());
        assert_eq!(bound.removed_methods, vec![id]);
    }
}
