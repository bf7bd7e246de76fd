//! Function and module definitions.
//!
//! Definitions live in a [`DefArena`] and refer to each other by id, so wrappers built
//! from a definition can point back to it without owning it.

use tessera_types::DataType;

use crate::expr::Expr;
use crate::variable::Variable;

/// Index of a [`FunctionDef`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// Index of a [`Module`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// Index of a [`ClassDef`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// A formal argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefArgument {
    pub var: Variable,
    /// Default value, if any.
    pub value: Option<Expr>,
    /// The function writes through this argument.
    pub inout: bool,
}

impl FunctionDefArgument {
    pub fn new(var: Variable) -> Self {
        FunctionDefArgument {
            var,
            value: None,
            inout: false,
        }
    }

    pub fn with_default(mut self, value: Expr) -> Self {
        self.value = Some(value);
        self
    }

    pub fn inout(mut self) -> Self {
        self.inout = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.var.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefResult {
    pub var: Variable,
}

impl FunctionDefResult {
    pub fn new(var: Variable) -> Self {
        FunctionDefResult { var }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub arguments: Vec<FunctionDefArgument>,
    pub results: Vec<FunctionDefResult>,
    /// Not visible outside its module; never exported through bindings.
    pub is_private: bool,
}

impl FunctionDef {
    pub fn new(
        name: impl Into<String>,
        arguments: Vec<FunctionDefArgument>,
        results: Vec<FunctionDefResult>,
    ) -> Self {
        FunctionDef {
            name: name.into(),
            arguments,
            results,
            is_private: false,
        }
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }
}

/// A user class. Methods take the instance as their first argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub attributes: Vec<Variable>,
    pub methods: Vec<FunctionId>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, attributes: Vec<Variable>) -> Self {
        ClassDef {
            name: name.into(),
            attributes,
            methods: Vec::new(),
        }
    }

    /// The kind of an instance of this class.
    pub fn instance_dtype(&self) -> DataType {
        DataType::Class(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    /// Module-level variables.
    pub variables: Vec<Variable>,
    pub functions: Vec<FunctionId>,
    pub classes: Vec<ClassId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            variables: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }
}

/// Owns every definition of a translation unit.
#[derive(Debug, Default, Clone)]
pub struct DefArena {
    functions: Vec<FunctionDef>,
    classes: Vec<ClassDef>,
    modules: Vec<Module>,
}

impl DefArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_function(&mut self, def: FunctionDef) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(def);
        id
    }

    pub fn alloc_module(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(module);
        id
    }

    /// Panics if `id` was not allocated by this arena.
    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.0 as usize]
    }

    pub fn alloc_class(&mut self, class: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    /// Panics if `id` was not allocated by this arena.
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0 as usize]
    }

    /// Allocates `class` and lists it in `module`.
    pub fn add_class_to(&mut self, module: ModuleId, class: ClassDef) -> ClassId {
        let id = self.alloc_class(class);
        self.module_mut(module).classes.push(id);
        id
    }

    /// Allocates `def` and lists it as a method of `class`.
    pub fn add_method_to(&mut self, class: ClassId, def: FunctionDef) -> FunctionId {
        let id = self.alloc_function(def);
        self.classes[class.0 as usize].methods.push(id);
        id
    }

    /// Panics if `id` was not allocated by this arena.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0 as usize]
    }

    /// Allocates `def` and lists it in `module`.
    pub fn add_function_to(&mut self, module: ModuleId, def: FunctionDef) -> FunctionId {
        let id = self.alloc_function(def);
        self.module_mut(module).functions.push(id);
        id
    }
}
