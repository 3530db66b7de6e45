// src/recipe/kitchen/context.rs

//! Install contexts: the directories a recipe installs into

use crate::error::{Error, Result};
use crate::paths;
use crate::recipe::format::Recipe;
use crate::recipe::parser::is_valid_name;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use super::KitchenConfig;

/// Directory pair a recipe is installed into
///
/// `prefix` is the working directory for install steps and the test command;
/// `libexec` (`<prefix>/libexec`) is where self-contained tools put their
/// tree. A scratch context is backed by a temporary directory that is removed
/// on drop unless [`InstallContext::persist`] is called.
#[derive(Debug)]
pub struct InstallContext {
    prefix: PathBuf,
    cache_dir: PathBuf,
    bin_dir: PathBuf,
    scratch: Option<TempDir>,
}

impl InstallContext {
    /// Context at `<root>/cellar/<name>/<version>`, created if missing
    ///
    /// The prefix is emptied on reinstall, so both path components must stay
    /// inside the cellar.
    pub fn persistent(config: &KitchenConfig, recipe: &Recipe) -> Result<Self> {
        let version = recipe.version();
        for component in [recipe.name.as_str(), version.as_str()] {
            if !is_valid_name(component) {
                return Err(Error::MalformedRecipe(format!(
                    "{}: '{}' is not a safe install path component",
                    recipe.name, component
                )));
            }
        }

        let prefix = paths::prefix_dir(&config.root, &recipe.name, &version);
        fs::create_dir_all(&prefix)?;

        Ok(Self {
            prefix,
            cache_dir: config.source_cache.clone(),
            bin_dir: config.bin_dir(),
            scratch: None,
        })
    }

    /// Existing prefix (e.g. from the registry); fails if it is gone
    pub fn existing(config: &KitchenConfig, prefix: &Path) -> Result<Self> {
        if !prefix.is_dir() {
            return Err(Error::NotFound(format!(
                "install prefix {} does not exist",
                prefix.display()
            )));
        }

        Ok(Self {
            prefix: prefix.to_path_buf(),
            cache_dir: config.source_cache.clone(),
            bin_dir: config.bin_dir(),
            scratch: None,
        })
    }

    /// Throwaway context under a fresh temporary directory
    pub fn scratch(cache_dir: &Path) -> Result<Self> {
        let temp = TempDir::with_prefix("pantry-")
            .map_err(|e| Error::IoError(format!("Failed to create scratch directory: {}", e)))?;
        let prefix = temp.path().join("prefix");
        let bin_dir = temp.path().join("bin");
        fs::create_dir_all(&prefix)?;

        debug!("Scratch install context at {}", temp.path().display());

        Ok(Self {
            prefix,
            cache_dir: cache_dir.to_path_buf(),
            bin_dir,
            scratch: Some(temp),
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn libexec(&self) -> PathBuf {
        self.prefix.join("libexec")
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn is_scratch(&self) -> bool {
        self.scratch.is_some()
    }

    /// Empty the prefix so a reinstall starts from nothing
    pub fn reset(&self) -> Result<()> {
        if self.prefix.exists() {
            debug!("Clearing previous contents of {}", self.prefix.display());
            fs::remove_dir_all(&self.prefix)?;
        }
        fs::create_dir_all(&self.prefix)?;
        Ok(())
    }

    /// Keep a scratch context on disk; returns the prefix
    pub fn persist(mut self) -> PathBuf {
        if let Some(temp) = self.scratch.take() {
            let kept = temp.keep();
            debug!("Keeping scratch context at {}", kept.display());
        }
        self.prefix.clone()
    }

    /// Template variables for `%(key)s` substitution
    pub fn variables(&self, recipe: &Recipe, artifact: Option<&Path>) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("name".to_string(), recipe.name.clone());
        vars.insert("version".to_string(), recipe.version());
        vars.insert("prefix".to_string(), self.prefix.display().to_string());
        vars.insert("libexec".to_string(), self.libexec().display().to_string());
        vars.insert("bin".to_string(), self.bin_dir.display().to_string());
        vars.insert("cache".to_string(), self.cache_dir.display().to_string());
        if let Some(artifact) = artifact {
            vars.insert("artifact".to_string(), artifact.display().to_string());
        }
        vars
    }

    /// Environment exported to install steps and the test command
    pub fn environment(&self, recipe: &Recipe, artifact: Option<&Path>) -> BTreeMap<String, String> {
        let vars = self.variables(recipe, artifact);
        let mut env: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (format!("PANTRY_{}", k.to_uppercase()), v.clone()))
            .collect();
        env.insert("HOME".to_string(), self.prefix.display().to_string());
        for (key, value) in &recipe.env {
            env.insert(key.clone(), recipe.substitute(value, &vars));
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipe;

    fn recipe() -> Recipe {
        parse_recipe(
            r#"
name = "cdk8s"
url = "https://registry.npmjs.org/cdk8s-cli/-/cdk8s-cli-1.0.96.tgz"
sha256 = "a86852dc0d7040cdf0baf37cf90ad623bdb84d8485c00c1216dc64ee8888d338"

[env]
NPM_CONFIG_CACHE = "%(cache)s/npm"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let cache = TempDir::new().unwrap();
        let ctx = InstallContext::scratch(cache.path()).unwrap();
        let prefix = ctx.prefix().to_path_buf();
        assert!(prefix.is_dir());
        assert!(ctx.is_scratch());

        drop(ctx);
        assert!(!prefix.exists());
    }

    #[test]
    fn test_persistent_rejects_escaping_version() {
        let root = TempDir::new().unwrap();
        let config = KitchenConfig::with_root(root.path());

        for version in ["../..", "/tmp/victim"] {
            let mut recipe = recipe();
            recipe.version = Some(version.to_string());
            let err = InstallContext::persistent(&config, &recipe).unwrap_err();
            assert!(matches!(err, Error::MalformedRecipe(_)), "{}", version);
        }
        assert!(!config.cellar_dir().exists());
    }

    #[test]
    fn test_scratch_persist() {
        let cache = TempDir::new().unwrap();
        let ctx = InstallContext::scratch(cache.path()).unwrap();
        let prefix = ctx.persist();
        assert!(prefix.is_dir());

        fs::remove_dir_all(prefix.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_persistent_layout() {
        let root = TempDir::new().unwrap();
        let config = KitchenConfig::with_root(root.path());
        let ctx = InstallContext::persistent(&config, &recipe()).unwrap();

        assert_eq!(ctx.prefix(), root.path().join("cellar/cdk8s/1.0.96"));
        assert!(ctx.prefix().is_dir());
        assert!(!ctx.is_scratch());
    }

    #[test]
    fn test_variables_and_environment() {
        let cache = TempDir::new().unwrap();
        let ctx = InstallContext::scratch(cache.path()).unwrap();
        let recipe = recipe();

        let vars = ctx.variables(&recipe, Some(Path::new("/tmp/a.tgz")));
        assert_eq!(vars["version"], "1.0.96");
        assert_eq!(vars["artifact"], "/tmp/a.tgz");
        assert_eq!(vars["libexec"], ctx.libexec().display().to_string());

        let env = ctx.environment(&recipe, None);
        assert_eq!(env["PANTRY_NAME"], "cdk8s");
        assert_eq!(env["NPM_CONFIG_CACHE"], format!("{}/npm", cache.path().display()));
        assert!(!env.contains_key("PANTRY_ARTIFACT"));
    }

    #[test]
    fn test_reset_empties_prefix() {
        let cache = TempDir::new().unwrap();
        let ctx = InstallContext::scratch(cache.path()).unwrap();
        fs::write(ctx.prefix().join("stale"), b"old").unwrap();

        ctx.reset().unwrap();
        assert!(ctx.prefix().is_dir());
        assert!(!ctx.prefix().join("stale").exists());
    }

    #[test]
    fn test_existing_requires_prefix() {
        let root = TempDir::new().unwrap();
        let config = KitchenConfig::with_root(root.path());
        assert!(matches!(
            InstallContext::existing(&config, &root.path().join("gone")),
            Err(Error::NotFound(_))
        ));
    }
}
