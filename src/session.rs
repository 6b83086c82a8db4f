//! Per-run state shared by the cell generators of a single compile.

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;

use crate::error::Result;
use crate::layout::Module;
use crate::tech::{self, TechConfig};

/// Hands out module names that are unique within one run.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    names: HashSet<ArcStr>,
    next: HashMap<ArcStr, usize>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve and return `base`, or `base_1`, `base_2`, ... if it is taken.
    pub fn unique(&mut self, base: &str) -> ArcStr {
        let base = ArcStr::from(base);
        if self.names.insert(base.clone()) {
            return base;
        }
        let counter = self.next.entry(base.clone()).or_insert(1);
        loop {
            let candidate = arcstr::format!("{}_{}", base, counter);
            *counter += 1;
            if self.names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Technology rules plus the name registry, owned by the top-level compile.
#[derive(Debug, Clone)]
pub struct Session {
    pub tech: TechConfig,
    names: NameRegistry,
}

impl Session {
    pub fn new(tech: TechConfig) -> Self {
        Self {
            tech,
            names: NameRegistry::new(),
        }
    }

    /// Start a session on a built-in technology.
    pub fn builtin(name: &str) -> Result<Self> {
        Ok(Self::new(tech::builtin(name)?))
    }

    /// An empty module with a name not yet used in this session.
    pub fn module(&mut self, base: &str) -> Module {
        let name = self.names.unique(base);
        log::trace!("new module {name}");
        Module::new(name)
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameRegistry {
        &mut self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FillError;

    #[test]
    fn test_unique_names() {
        let mut names = NameRegistry::new();
        assert!(names.is_empty());
        assert_eq!(names.unique("inv"), "inv");
        assert_eq!(names.unique("inv"), "inv_1");
        assert_eq!(names.unique("nand2"), "nand2");
        assert_eq!(names.unique("inv"), "inv_2");
        assert!(names.contains("inv_1"));
        assert!(!names.contains("inv_3"));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_unique_skips_taken_suffix() {
        let mut names = NameRegistry::new();
        assert_eq!(names.unique("dff_1"), "dff_1");
        assert_eq!(names.unique("dff"), "dff");
        assert_eq!(names.unique("dff"), "dff_2");
    }

    #[test]
    fn test_session_modules() {
        let mut session = Session::builtin("sky130").unwrap();
        let a = session.module("bitcell");
        let b = session.module("bitcell");
        assert_eq!(a.name, "bitcell");
        assert_eq!(b.name, "bitcell_1");
        assert!(a.is_empty());
        assert_eq!(session.names().len(), 2);
        session.names_mut().unique("precharge");
        assert!(session.names().contains("precharge"));

        assert!(matches!(
            Session::builtin("nope"),
            Err(FillError::UnknownTech(_))
        ));
    }
}
