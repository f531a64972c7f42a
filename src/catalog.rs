//! Package registry and dependency closures.
//!
//! A [`Catalog`] is built once (usually by
//! [`discover`](crate::package::discovery::discover)) and read-only
//! afterwards.  Dependency names stay raw strings on each
//! [`Package`]; the catalog resolves them on demand, so cycles are
//! representable and every traversal is guarded by a visited set.
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque, btree_map};

use crate::error::CatalogError;
use crate::package::Package;
use crate::path::PathValue;

/// Name-keyed package registry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    packages: BTreeMap<String, Package>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `packages`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePackage`] if two packages share a name.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for package in packages {
            catalog.register(package)?;
        }
        Ok(catalog)
    }

    /// Add a package.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePackage`] if the name is taken.
    pub fn register(&mut self, package: Package) -> Result<(), CatalogError> {
        if let Some(existing) = self.packages.get(package.name()) {
            return Err(CatalogError::DuplicatePackage {
                name: package.name().to_string(),
                first: existing.location().to_string(),
                second: package.location().to_string(),
            });
        }
        self.packages.insert(package.name().to_string(), package);
        Ok(())
    }

    /// Look up a package by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Look up a package by its (resolved) location.
    #[must_use]
    pub fn by_location(&self, location: &PathValue) -> Option<&Package> {
        self.packages.values().find(|p| p.location() == location)
    }

    /// The package whose location is `path` or its nearest ancestor.
    #[must_use]
    pub fn owner_of(&self, path: &PathValue) -> Option<&Package> {
        self.packages
            .values()
            .filter(|p| p.location() == path || p.is_within_location(path))
            .max_by_key(|p| p.location().as_path().components().count())
    }

    /// All packages, sorted by name.
    pub fn iter(&self) -> btree_map::Values<'_, String, Package> {
        self.packages.values()
    }

    /// Number of registered packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns `true` if no package is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Resolve names (or descriptors) to packages.
    ///
    /// The result keeps input order with duplicates removed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingPackage`] listing every name that could
    /// not be resolved.
    pub fn find<K: AsRef<str>>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Vec<&Package>, CatalogError> {
        let mut found: Vec<&Package> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        for key in keys {
            let name = key.as_ref();
            match self.packages.get(name) {
                Some(package) => {
                    if !found.iter().any(|p| p.name() == name) {
                        found.push(package);
                    }
                }
                None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                }
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(CatalogError::MissingPackage(missing))
        }
    }

    /// Direct dependencies of `package`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingPackage`] for dangling dependency names.
    pub fn depends_of(&self, package: &Package) -> Result<Vec<&Package>, CatalogError> {
        self.find(package.depends_names())
    }

    /// Transitive dependencies of `roots`, sorted by name.
    ///
    /// A root appears in the result only if another root (or itself, through
    /// a cycle) depends on it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingPackage`] for an unknown root or a
    /// dangling dependency name anywhere in the closure.
    pub fn find_dependencies<K: AsRef<str>>(
        &self,
        roots: impl IntoIterator<Item = K>,
    ) -> Result<Vec<&Package>, CatalogError> {
        let mut queue: VecDeque<&Package> = self.find(roots)?.into_iter().collect();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        while let Some(package) = queue.pop_front() {
            for dep in self.depends_of(package)? {
                if visited.insert(dep.name()) {
                    queue.push_back(dep);
                }
            }
        }
        Ok(visited.into_iter().filter_map(|name| self.get(name)).collect())
    }

    /// Every package whose transitive dependencies include one of `roots`,
    /// sorted by name.
    ///
    /// A root appears in the result only if it depends on itself through a
    /// cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingPackage`] for an unknown root.
    pub fn find_reverse_dependencies<K: AsRef<str>>(
        &self,
        roots: impl IntoIterator<Item = K>,
    ) -> Result<Vec<&Package>, CatalogError> {
        let mut dependents: HashMap<&str, Vec<&Package>> = HashMap::new();
        for package in self.packages.values() {
            for dep in package.depends_names() {
                dependents.entry(dep.as_str()).or_default().push(package);
            }
        }

        let mut queue: VecDeque<&Package> = self.find(roots)?.into_iter().collect();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        while let Some(package) = queue.pop_front() {
            for &dependent in dependents.get(package.name()).into_iter().flatten() {
                if visited.insert(dependent.name()) {
                    queue.push_back(dependent);
                }
            }
        }
        Ok(visited.into_iter().filter_map(|name| self.get(name)).collect())
    }

    /// Order `packages` so that each one comes after the members of the set
    /// it depends on, directly or through packages outside the set.
    /// Duplicates are dropped and a dependency cycle is entered at the first
    /// member that reaches it.
    #[must_use]
    pub fn dependency_order<'a>(
        &'a self,
        packages: impl IntoIterator<Item = &'a Package>,
    ) -> Vec<&'a Package> {
        let members: Vec<&Package> = packages.into_iter().collect();
        let wanted: BTreeSet<&str> = members.iter().map(|p| p.name()).collect();
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::with_capacity(wanted.len());
        for package in members {
            self.visit_dependencies_first(package, &wanted, &mut visited, &mut ordered);
        }
        ordered
    }

    fn visit_dependencies_first<'a>(
        &'a self,
        package: &'a Package,
        wanted: &BTreeSet<&str>,
        visited: &mut BTreeSet<&'a str>,
        ordered: &mut Vec<&'a Package>,
    ) {
        if !visited.insert(package.name()) {
            return;
        }
        for dep in package.depends_names().iter().filter_map(|name| self.get(name)) {
            self.visit_dependencies_first(dep, wanted, visited, ordered);
        }
        if wanted.contains(package.name()) {
            ordered.push(package);
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Package;
    type IntoIter = btree_map::Values<'a, String, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
