// src/recipe/kitchen/deps.rs

//! Runtime dependency checks for recipe installs

use crate::db::Registry;
use crate::error::Result;
use tracing::debug;

/// Trait for deciding whether a recipe's runtime dependencies are present
///
/// This keeps the Kitchen decoupled from where installed state lives. There
/// is no auto-install: a missing dependency aborts the install.
pub trait DependencyResolver: Send + Sync {
    /// Return the names in `deps` that are not satisfied, in input order
    fn check_missing(&self, deps: &[String]) -> Result<Vec<String>>;
}

/// Dependencies must be recipes recorded in the installed registry
pub struct RegistryResolver {
    registry: Registry,
}

impl RegistryResolver {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

impl DependencyResolver for RegistryResolver {
    fn check_missing(&self, deps: &[String]) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for dep in deps {
            if !self.registry.is_installed(dep)? {
                missing.push(dep.clone());
            }
        }
        Ok(missing)
    }
}

/// Dependencies are satisfied by an executable of the same name on `PATH`
pub struct HostPathResolver;

impl DependencyResolver for HostPathResolver {
    fn check_missing(&self, deps: &[String]) -> Result<Vec<String>> {
        Ok(deps
            .iter()
            .filter(|dep| match which::which(dep.as_str()) {
                Ok(path) => {
                    debug!("Dependency {} provided by host: {}", dep, path.display());
                    false
                }
                Err(_) => true,
            })
            .cloned()
            .collect())
    }
}

/// Satisfied if any of the inner resolvers is satisfied
pub struct ChainResolver {
    resolvers: Vec<Box<dyn DependencyResolver>>,
}

impl ChainResolver {
    pub fn new(resolvers: Vec<Box<dyn DependencyResolver>>) -> Self {
        Self { resolvers }
    }
}

impl DependencyResolver for ChainResolver {
    fn check_missing(&self, deps: &[String]) -> Result<Vec<String>> {
        let mut missing = deps.to_vec();
        for resolver in &self.resolvers {
            if missing.is_empty() {
                break;
            }
            missing = resolver.check_missing(&missing)?;
        }
        Ok(missing)
    }
}

/// Treats every dependency as satisfied
pub struct NoopResolver;

impl DependencyResolver for NoopResolver {
    fn check_missing(&self, _deps: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
