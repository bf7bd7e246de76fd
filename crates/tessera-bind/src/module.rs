//! Modules and module variables exposed to C.

use tessera_ir::{ClassId, FunctionId, ModuleId, Variable};

use crate::function::BindCFunctionDef;

/// A module scalar that C can use directly under its lower-case name.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCVariable {
    var: Variable,
}

impl BindCVariable {
    pub fn new(var: Variable) -> Self {
        BindCVariable { var }
    }

    /// External (C) name.
    pub fn name(&self) -> String {
        self.var.name.to_lowercase()
    }

    /// Name in the translated module.
    pub fn indexed_name(&self) -> &str {
        &self.var.name
    }

    pub fn var(&self) -> &Variable {
        &self.var
    }
}

/// A module array reached from C through an accessor returning a handle and the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCArrayVariable {
    var: Variable,
    wrapper_function: String,
    original_variable: Variable,
}

impl BindCArrayVariable {
    pub fn new(var: Variable, wrapper_function: String, original_variable: Variable) -> Self {
        BindCArrayVariable {
            var,
            wrapper_function,
            original_variable,
        }
    }

    /// The opaque handle returned by the accessor.
    pub fn var(&self) -> &Variable {
        &self.var
    }

    /// Name of the accessor in [`BindCModule::variable_wrappers`].
    pub fn wrapper_function(&self) -> &str {
        &self.wrapper_function
    }

    pub fn original_variable(&self) -> &Variable {
        &self.original_variable
    }
}

/// Accessors of one class attribute. Array attributes are read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCClassProperty {
    attribute: Variable,
    getter: BindCFunctionDef,
    setter: Option<BindCFunctionDef>,
}

impl BindCClassProperty {
    pub fn new(attribute: Variable, getter: BindCFunctionDef, setter: Option<BindCFunctionDef>) -> Self {
        BindCClassProperty {
            attribute,
            getter,
            setter,
        }
    }

    pub fn attribute(&self) -> &Variable {
        &self.attribute
    }

    pub fn getter(&self) -> &BindCFunctionDef {
        &self.getter
    }

    pub fn setter(&self) -> Option<&BindCFunctionDef> {
        self.setter.as_ref()
    }
}

/// A class whose methods and attributes are reached from C through an opaque instance
/// handle.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCClassDef {
    pub name: String,
    original_class: ClassId,
    pub methods: Vec<BindCFunctionDef>,
    pub attributes: Vec<BindCClassProperty>,
    /// Methods of the original class that have no C counterpart.
    pub removed_methods: Vec<FunctionId>,
}

impl BindCClassDef {
    pub fn new(name: impl Into<String>, original_class: ClassId) -> Self {
        BindCClassDef {
            name: name.into(),
            original_class,
            methods: Vec::new(),
            attributes: Vec::new(),
            removed_methods: Vec::new(),
        }
    }

    pub fn original_class(&self) -> ClassId {
        self.original_class
    }

    /// A wrapped method, getter or setter by bound name.
    pub fn function(&self, name: &str) -> Option<&BindCFunctionDef> {
        self.methods
            .iter()
            .chain(
                self.attributes
                    .iter()
                    .flat_map(|p| std::iter::once(&p.getter).chain(p.setter.as_ref())),
            )
            .find(|f| f.name() == name)
    }
}

/// A module of the translated program as seen from C.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCModule {
    pub name: String,
    original_module: ModuleId,
    pub functions: Vec<BindCFunctionDef>,
    /// Accessors of module arrays.
    pub variable_wrappers: Vec<BindCFunctionDef>,
    pub variables: Vec<BindCVariable>,
    pub array_variables: Vec<BindCArrayVariable>,
    pub classes: Vec<BindCClassDef>,
    /// Functions of the original module that have no C counterpart.
    pub removed_functions: Vec<FunctionId>,
}

impl BindCModule {
    pub fn new(name: impl Into<String>, original_module: ModuleId) -> Self {
        BindCModule {
            name: name.into(),
            original_module,
            functions: Vec::new(),
            variable_wrappers: Vec::new(),
            variables: Vec::new(),
            array_variables: Vec::new(),
            classes: Vec::new(),
            removed_functions: Vec::new(),
        }
    }

    pub fn original_module(&self) -> ModuleId {
        self.original_module
    }

    /// Variable declarations of the binding module. All variables live in the original
    /// module, so there are none.
    pub fn declarations(&self) -> &[Variable] {
        &[]
    }

    pub fn function(&self, name: &str) -> Option<&BindCFunctionDef> {
        self.functions
            .iter()
            .chain(&self.variable_wrappers)
            .find(|f| f.name() == name)
    }

    pub fn class(&self, name: &str) -> Option<&BindCClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::DataType;

    #[test]
    fn variable_names() {
        let v = BindCVariable::new(Variable::scalar("MaxIter", DataType::Integer));
        assert_eq!(v.name(), "maxiter");
        assert_eq!(v.indexed_name(), "MaxIter");
    }

    #[test]
    fn declarations_are_empty() {
        let module = BindCModule::new("m", ModuleId(0));
        assert!(module.declarations().is_empty());
        assert_eq!(module.original_module(), ModuleId(0));
    }
}
