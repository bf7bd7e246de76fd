// src/scope.rs
//! Collision-free naming for synthesized variables.

use rustc_hash::FxHashSet;
use tessera_types::DataType;

use crate::variable::Variable;

/// Capability to create fresh variables during lowering.
pub trait TemporaryAllocator {
    /// Allocates a new scalar variable of `dtype` whose name is `name` if that is free, or
    /// `name` with a numeric suffix otherwise.
    fn new_temporary(&mut self, dtype: DataType, name: &str) -> Variable;
}

/// The set of names declared in one function or module.
///
/// Names are compared case-insensitively since the generated Fortran is.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    used: FxHashSet<String>,
    temporaries: Vec<Variable>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `name`. Returns `false` if it was already taken.
    pub fn insert_symbol(&mut self, name: &str) -> bool {
        self.used.insert(name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    /// Reserves and returns `base`, or `base_0001`, `base_0002`, ... if taken.
    pub fn get_new_name(&mut self, base: &str) -> String {
        if self.insert_symbol(base) {
            return base.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{}_{:04}", base, counter);
            if self.insert_symbol(&candidate) {
                log::trace!("name `{}` is taken, using `{}`", base, candidate);
                return candidate;
            }
            counter += 1;
        }
    }

    /// Variables created through [`TemporaryAllocator::new_temporary`], in creation order.
    pub fn temporaries(&self) -> &[Variable] {
        &self.temporaries
    }
}

impl TemporaryAllocator for Scope {
    fn new_temporary(&mut self, dtype: DataType, name: &str) -> Variable {
        let name = self.get_new_name(name);
        let var = Variable::scalar(name, dtype);
        self.temporaries.push(var.clone());
        var
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_get_suffixes() {
        let mut scope = Scope::new();
        assert_eq!(scope.get_new_name("n"), "n");
        assert_eq!(scope.get_new_name("n"), "n_0001");
        assert_eq!(scope.get_new_name("N"), "N_0002");
        assert!(scope.contains("n_0001"));
    }

    #[test]
    fn temporaries_are_recorded() {
        let mut scope = Scope::new();
        scope.insert_symbol("tmp");
        let var = scope.new_temporary(DataType::Integer, "tmp");
        assert_eq!(var.name, "tmp_0001");
        assert_eq!(scope.temporaries().len(), 1);
    }
}
