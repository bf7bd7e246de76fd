//! A file's worth of header statements and their lowering to definitions.

use rustc_hash::FxHashMap;
use tessera_ir::{FunctionDef, FunctionDefArgument, FunctionDefResult, Literal, Variable};

use crate::ast::*;
use crate::{HeaderError, HeaderResult};

/// The header statements of one source file, with templates indexed by name.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    statements: Vec<HeaderStmt>,
    templates: FxHashMap<String, Template>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement. A template name can only be declared once.
    pub fn push(&mut self, stmt: HeaderStmt) -> HeaderResult<()> {
        if let HeaderStmt::Template(template) = &stmt {
            if self.templates.contains_key(&template.name) {
                return Err(HeaderError::DuplicateTemplate {
                    span: template.span,
                    name: template.name.clone(),
                });
            }
            self.templates.insert(template.name.clone(), template.clone());
        }
        self.statements.push(stmt);
        Ok(())
    }

    pub fn statements(&self) -> &[HeaderStmt] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn variable(&self, name: &str) -> Option<&TypeAnnotation> {
        self.statements.iter().find_map(|stmt| match stmt {
            HeaderStmt::Variable { name: n, annotation } if n == name => Some(annotation),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&FunctionHeader> {
        self.statements.iter().find_map(|stmt| match stmt {
            HeaderStmt::Function(header) if header.name == name => Some(header),
            _ => None,
        })
    }

    pub fn metavar(&self, name: &str) -> Option<&Literal> {
        self.statements.iter().find_map(|stmt| match stmt {
            HeaderStmt::Metavar(meta) if meta.name == name => Some(&meta.value),
            _ => None,
        })
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceHeader> {
        self.statements.iter().find_map(|stmt| match stmt {
            HeaderStmt::Interface(interface) if interface.name == name => Some(interface),
            _ => None,
        })
    }

    pub fn macro_header(&self, name: &str) -> Option<&MacroHeader> {
        self.statements.iter().find_map(|stmt| match stmt {
            HeaderStmt::Macro(m) if m.name() == name => Some(m),
            _ => None,
        })
    }

    /// Every `variable` statement as a typed variable.
    pub fn variables(&self) -> HeaderResult<Vec<Variable>> {
        self.statements
            .iter()
            .filter_map(|stmt| match stmt {
                HeaderStmt::Variable { name, annotation } => Some(annotation.to_variable(name.as_str())),
                _ => None,
            })
            .collect()
    }

    /// One definition per distinct instantiation of `header`.
    ///
    /// Every union argument and every template is a choice; a template takes the same
    /// alternative everywhere it appears in the header. Arguments are named `arg_{i}` and
    /// results `result_{i}`. When there is more than one instantiation the definitions
    /// are named `{name}_{k}`, `k` counting from 1.
    pub fn create_definitions(&self, header: &FunctionHeader) -> HeaderResult<Vec<FunctionDef>> {
        let annotations: Vec<&TypeAnnotation> =
            header.arguments.iter().chain(&header.results).collect();

        let mut templates: Vec<&Template> = Vec::new();
        for atom in annotations.iter().flat_map(|a| &a.alternatives) {
            if let Some(name) = atom.template_name() {
                let template = self.templates.get(name).ok_or_else(|| HeaderError::UnknownType {
                    span: atom.span,
                    name: name.to_string(),
                })?;
                if !templates.iter().any(|known| known.name == template.name) {
                    templates.push(template);
                }
            }
        }

        let sizes: Vec<usize> = annotations
            .iter()
            .map(|a| a.alternatives.len())
            .chain(templates.iter().map(|t| t.types.alternatives.len()))
            .collect();

        let mut signatures: Vec<Vec<Variable>> = Vec::new();
        for choice in combinations(&sizes) {
            let (picked, bound) = choice.split_at(annotations.len());
            let mut vars = Vec::with_capacity(annotations.len());
            for (i, (annotation, &alt)) in annotations.iter().zip(picked).enumerate() {
                let atom = &annotation.alternatives[alt];
                let atom = match atom.template_name() {
                    Some(name) => {
                        let slot = templates.iter().position(|t| t.name == name).unwrap_or(0);
                        atom.instantiate(&templates[slot].types.alternatives[bound[slot]])
                    }
                    None => atom.clone(),
                };
                let var_name = if i < header.arguments.len() {
                    format!("arg_{}", i)
                } else {
                    format!("result_{}", i - header.arguments.len())
                };
                let var = atom.to_variable(var_name)?;
                vars.push(if annotation.is_const { var.constant() } else { var });
            }
            if !signatures.contains(&vars) {
                signatures.push(vars);
            }
        }

        let versions = signatures.len();
        let defs = signatures
            .into_iter()
            .enumerate()
            .map(|(k, mut vars)| {
                let results = vars.split_off(header.arguments.len());
                let name = if versions == 1 {
                    header.name.clone()
                } else {
                    format!("{}_{}", header.name, k + 1)
                };
                FunctionDef::new(
                    name,
                    vars.into_iter().map(FunctionDefArgument::new).collect(),
                    results.into_iter().map(FunctionDefResult::new).collect(),
                )
            })
            .collect();
        Ok(defs)
    }
}

/// Every index vector `v` with `v[i] < sizes[i]`, the first position varying slowest.
fn combinations(sizes: &[usize]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new()];
    for &size in sizes {
        out = out
            .into_iter()
            .flat_map(|prefix: Vec<usize>| {
                (0..size).map(move |i| {
                    let mut next = prefix.clone();
                    next.push(i);
                    next
                })
            })
            .collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_count() {
        assert_eq!(combinations(&[]), vec![Vec::<usize>::new()]);
        assert_eq!(
            combinations(&[2, 1, 2]),
            vec![vec![0, 0, 0], vec![0, 0, 1], vec![1, 0, 0], vec![1, 0, 1]]
        );
    }
}
