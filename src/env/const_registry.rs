use crate::types::QualifiedName;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Kind of a registered constant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstantKind {
    Module,
    Class,
}

/// A registered module or class
#[derive(Clone, Debug)]
pub struct Constant {
    pub name: QualifiedName,
    pub kind: ConstantKind,
    pub parent: Option<QualifiedName>,
    /// Files in which this constant is declared
    pub paths: Vec<PathBuf>,
}

impl Constant {
    pub fn add_path(&mut self, path: &Path) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }
}

/// Registry mapping fully qualified constant names to constants
#[derive(Debug, Default)]
pub struct ConstRegistry {
    consts: HashMap<String, Constant>,
}

impl ConstRegistry {
    pub fn new() -> Self {
        Self {
            consts: HashMap::new(),
        }
    }

    /// Register a constant, or return the existing one for the same
    /// qualified name. Idempotent on identical inputs.
    pub fn find_or_add(
        &mut self,
        qualified_name: &str,
        kind: ConstantKind,
        parent: Option<&str>,
    ) -> &mut Constant {
        self.consts
            .entry(qualified_name.to_string())
            .or_insert_with(|| Constant {
                name: QualifiedName::new(qualified_name),
                kind,
                parent: parent.map(QualifiedName::new),
                paths: Vec::new(),
            })
    }

    pub fn find(&self, qualified_name: &str) -> Option<&Constant> {
        self.consts.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.consts.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.consts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.consts.values()
    }

    pub fn clear(&mut self) {
        self.consts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_add_registers_constant() {
        let mut registry = ConstRegistry::new();
        registry.find_or_add("User", ConstantKind::Class, None);

        let user = registry.find("User").unwrap();
        assert_eq!(user.kind, ConstantKind::Class);
        assert!(user.parent.is_none());
    }

    #[test]
    fn test_find_or_add_idempotent() {
        let mut registry = ConstRegistry::new();
        registry
            .find_or_add("Api::User", ConstantKind::Class, Some("Api"))
            .add_path(Path::new("a.rb"));
        registry
            .find_or_add("Api::User", ConstantKind::Class, Some("Api"))
            .add_path(Path::new("a.rb"));

        assert_eq!(registry.len(), 1);
        let user = registry.find("Api::User").unwrap();
        assert_eq!(user.paths.len(), 1);
        assert_eq!(user.parent.as_ref().unwrap().as_str(), "Api");
    }

    #[test]
    fn test_find_missing_returns_none() {
        let registry = ConstRegistry::new();
        assert!(registry.find("Missing").is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = ConstRegistry::new();
        registry.find_or_add("Utils", ConstantKind::Module, None);
        registry.clear();
        assert!(registry.is_empty());
    }
}
