// src/recipe/kitchen/mod.rs

//! Kitchen: the recipe interpreter
//!
//! The Kitchen takes a loaded recipe through its lifecycle:
//! - Fetching the source artifact into a checksum-keyed cache
//! - Verifying it against the declared SHA-256 digest
//! - Running install steps, in order, inside an install context
//! - Linking executables into the shared bin directory
//! - Running the acceptance test
//!
//! Collaborators sit behind traits so they can be swapped: [`SourceFetcher`]
//! for downloads, [`ProcessRunner`] for step execution and
//! [`DependencyResolver`] for runtime dependency checks.

mod config;
mod context;
mod cook;
pub mod deps;
pub mod fetch;
mod taste;

pub use config::KitchenConfig;
pub use context::InstallContext;
pub use cook::{Cook, CookResult, RecipeState};
pub use deps::{ChainResolver, DependencyResolver, HostPathResolver, NoopResolver, RegistryResolver};
pub use fetch::{HttpFetcher, LocalFetcher, SourceFetcher, UrlFetcher};
pub use taste::TestResult;

use crate::db::Registry;
use crate::db::models::{BinaryLink, InstalledRecipe};
use crate::error::{Error, Result, Stage};
use crate::hash::{Checksum, verify_file};
use crate::process::{HostRunner, Invocation, ProcessRunner, log_output};
use crate::recipe::format::{Recipe, Step};
use crate::recipe::parser;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    registry: Registry,
    fetcher: Arc<dyn SourceFetcher>,
    runner: Arc<dyn ProcessRunner>,
    resolver: Arc<dyn DependencyResolver>,
}

impl Kitchen {
    /// Create a Kitchen, opening (or creating) the installed registry
    ///
    /// Dependencies are checked against the registry, and also against the
    /// host `PATH` when `allow_host_deps` is set.
    pub fn new(config: KitchenConfig) -> Result<Self> {
        let registry = Registry::open(&config.db_path())?;

        let resolver: Arc<dyn DependencyResolver> = if config.skip_deps {
            Arc::new(NoopResolver)
        } else if config.allow_host_deps {
            Arc::new(ChainResolver::new(vec![
                Box::new(RegistryResolver::new(registry.clone())),
                Box::new(HostPathResolver),
            ]))
        } else {
            Arc::new(RegistryResolver::new(registry.clone()))
        };

        Ok(Self {
            config,
            registry,
            fetcher: Arc::new(UrlFetcher::default()),
            runner: Arc::new(HostRunner),
            resolver,
        })
    }

    /// Replace the source fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the process runner
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the dependency resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse a recipe from TOML source
    pub fn load(&self, source: &str) -> Result<Recipe> {
        parser::parse_recipe(source).map_err(|e| e.in_stage(&name_hint(source), Stage::Load))
    }

    /// Load `<recipes_dir>/<name>.toml`
    pub fn load_named(&self, recipes_dir: &Path, name: &str) -> Result<Recipe> {
        parser::load_named(recipes_dir, name).map_err(|e| e.in_stage(name, Stage::Load))
    }

    /// Download and verify the source artifact; returns its cached path
    pub fn fetch(&self, recipe: &Recipe) -> Result<PathBuf> {
        let staged = self.download(recipe)?;
        self.verify(recipe, &staged)
    }

    /// Whether a verified copy of the artifact is already cached
    pub fn is_cached(&self, recipe: &Recipe) -> bool {
        recipe
            .checksum()
            .ok()
            .map(|checksum| self.cached_path(&checksum))
            .is_some_and(|path| path.is_file())
    }

    fn cached_path(&self, checksum: &Checksum) -> PathBuf {
        self.config.source_cache.join(checksum.cache_key())
    }

    /// Obtain the artifact bytes without verifying them
    ///
    /// Returns the cached file when it still matches, otherwise a freshly
    /// downloaded temporary file in the cache directory.
    pub fn download(&self, recipe: &Recipe) -> Result<PathBuf> {
        self.download_inner(recipe)
            .map_err(|e| e.in_stage(&recipe.name, Stage::Fetch))
    }

    fn download_inner(&self, recipe: &Recipe) -> Result<PathBuf> {
        let checksum = recipe.checksum()?;
        fs::create_dir_all(&self.config.source_cache)?;

        let cached_path = self.cached_path(&checksum);
        if cached_path.exists() {
            debug!("Using cached source: {}", cached_path.display());
            if verify_file(&cached_path, &checksum)?.is_ok() {
                return Ok(cached_path);
            }
            warn!("Cached file checksum mismatch, re-downloading");
            fs::remove_file(&cached_path)?;
        }

        info!("Downloading: {}", recipe.url);
        let temp_path = tempfile::Builder::new()
            .prefix(&format!("{}.", checksum.cache_key()))
            .suffix(".tmp")
            .tempfile_in(&self.config.source_cache)?
            .into_temp_path();

        // The temp path removes itself if the fetch fails
        self.fetcher.fetch(&recipe.url, &temp_path)?;

        temp_path
            .keep()
            .map_err(|e| Error::IoError(format!("Failed to keep download: {}", e)))
    }

    /// Check a staged artifact against the declared digest
    ///
    /// On success the file is moved into the cache and the cached path is
    /// returned; on mismatch the file is deleted.
    pub fn verify(&self, recipe: &Recipe, staged: &Path) -> Result<PathBuf> {
        self.verify_inner(recipe, staged)
            .map_err(|e| e.in_stage(&recipe.name, Stage::Verify))
    }

    fn verify_inner(&self, recipe: &Recipe, staged: &Path) -> Result<PathBuf> {
        let checksum = recipe.checksum()?;

        if let Err(actual) = verify_file(staged, &checksum)? {
            fs::remove_file(staged)?;
            return Err(Error::ChecksumMismatch {
                expected: checksum.to_prefixed_string(),
                actual: actual.to_prefixed_string(),
            });
        }

        let cached_path = self.cached_path(&checksum);
        if staged != cached_path {
            fs::rename(staged, &cached_path)?;
        }
        debug!("Verified {} against {}", cached_path.display(), checksum.to_prefixed_string());
        Ok(cached_path)
    }

    /// Run install steps for a verified artifact
    ///
    /// Dependencies are checked and the artifact re-verified before the
    /// first step. Steps run in declared order with the prefix as working
    /// directory; the first failing step aborts the rest and nothing is
    /// rolled back. Persistent installs are recorded in the registry.
    pub fn install(
        &self,
        recipe: &Recipe,
        artifact: &Path,
        context: &InstallContext,
    ) -> Result<InstalledRecipe> {
        self.install_inner(recipe, artifact, context)
            .map_err(|e| e.in_stage(&recipe.name, Stage::Install))
    }

    fn install_inner(
        &self,
        recipe: &Recipe,
        artifact: &Path,
        context: &InstallContext,
    ) -> Result<InstalledRecipe> {
        self.check_dependencies(recipe)?;

        let checksum = recipe.checksum()?;
        if let Err(actual) = verify_file(artifact, &checksum)? {
            return Err(Error::ChecksumMismatch {
                expected: checksum.to_prefixed_string(),
                actual: actual.to_prefixed_string(),
            });
        }

        context.reset()?;

        let vars = context.variables(recipe, Some(artifact));
        let env = context.environment(recipe, Some(artifact));
        let total = recipe.install.len();

        for (index, step) in recipe.install.iter().enumerate() {
            let step = step.substituted(recipe, &vars);
            info!("Step {}/{}: {}", index + 1, total, step);

            let invocation = self.invocation(&step, context.prefix(), &env)?;
            let output = self.runner.run(&invocation)?;
            log_output(&format!("{} step {}", recipe.name, index), &output);

            if !output.success() {
                return Err(Error::InstallStepFailed {
                    index,
                    exit_code: output.exit_code,
                    timed_out: output.timed_out,
                });
            }
        }

        let mut installed = InstalledRecipe::new(
            &recipe.name,
            &recipe.version(),
            context.prefix().to_path_buf(),
            checksum.to_prefixed_string(),
        );
        installed.links = plan_links(recipe, context)?;

        if context.is_scratch() {
            create_links(&installed.links, context)?;
            debug!("Scratch install of {}, not recording", recipe.name);
        } else {
            self.check_link_owners(recipe, &installed.links)?;
            let previous = self.registry.get(&recipe.name)?;
            create_links(&installed.links, context)?;
            self.registry.record(&mut installed)?;

            if let Some(previous) = previous
                && let Err(e) = retire_previous(&previous, &installed)
            {
                warn!(
                    "Could not clean up {} {} at {}: {}",
                    previous.name,
                    previous.version,
                    previous.prefix.display(),
                    e
                );
            }
        }

        info!(
            "Installed {} {} into {}",
            installed.name,
            installed.version,
            installed.prefix.display()
        );
        Ok(installed)
    }

    /// Refuse links that another installed recipe already owns
    fn check_link_owners(&self, recipe: &Recipe, links: &[BinaryLink]) -> Result<()> {
        for link in links {
            if let Some(owner) = self.registry.link_owner(&link.link_path)?
                && owner != recipe.name
            {
                return Err(Error::LinkConflict {
                    link: link.link_path.display().to_string(),
                    owner,
                });
            }
        }
        Ok(())
    }

    fn check_dependencies(&self, recipe: &Recipe) -> Result<()> {
        if recipe.depends_on.is_empty() {
            return Ok(());
        }

        info!("Checking runtime dependencies: {}", recipe.depends_on.join(", "));
        let missing = self.resolver.check_missing(&recipe.depends_on)?;
        if !missing.is_empty() {
            return Err(Error::MissingDependency(missing.join(", ")));
        }
        Ok(())
    }

    fn invocation(
        &self,
        step: &Step,
        workdir: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<Invocation> {
        let invocation = match step {
            Step::Shell(line) => Invocation::shell(&self.config.shell, line, workdir),
            Step::Exec(argv) => {
                let Some((program, args)) = argv.split_first() else {
                    return Err(Error::MalformedRecipe("empty command".to_string()));
                };
                Invocation::new(program, workdir).args(args.iter().cloned())
            }
        };
        Ok(invocation.envs(env).with_timeout(self.config.timeout))
    }

    /// Run the acceptance test in an install context
    ///
    /// A failed expectation is reported through [`TestResult::passed`], not
    /// as an error. Running the test twice gives the same verdict.
    pub fn test(&self, recipe: &Recipe, context: &InstallContext) -> Result<TestResult> {
        self.test_inner(recipe, context)
            .map_err(|e| e.in_stage(&recipe.name, Stage::Test))
    }

    fn test_inner(&self, recipe: &Recipe, context: &InstallContext) -> Result<TestResult> {
        let Some(test) = &recipe.test else {
            return Err(Error::NotFound(format!("{} has no test section", recipe.name)));
        };

        let vars = context.variables(recipe, None);
        let env = context.environment(recipe, None);
        let command = test.command.substituted(recipe, &vars);
        debug!("Test command: {}", command);

        let invocation = self.invocation(&command, context.prefix(), &env)?;
        let output = self.runner.run(&invocation)?;
        log_output(&format!("{} test", recipe.name), &output);

        let result = TestResult::evaluate(&recipe.name, test, output);
        if result.passed {
            info!("Test passed for {}", recipe.name);
        } else {
            warn!("Test failed for {}: {}", recipe.name, result.failures.join("; "));
        }
        Ok(result)
    }

    /// Test an installed recipe in its recorded prefix
    pub fn test_installed(&self, recipe: &Recipe) -> Result<TestResult> {
        let context = self
            .registry
            .require(&recipe.name)
            .and_then(|installed| InstallContext::existing(&self.config, &installed.prefix))
            .map_err(|e| e.in_stage(&recipe.name, Stage::Test))?;
        self.test(recipe, &context)
    }

    /// Fetch, verify and install a recipe into its cellar prefix,
    /// optionally running the test afterwards
    pub fn cook(&self, recipe: Recipe, run_test: bool) -> Result<CookResult> {
        info!("Cooking {} {}", recipe.name, recipe.version());

        let mut cook = Cook::new(self, recipe);
        cook.fetch()?;

        let context = InstallContext::persistent(&self.config, cook.recipe())
            .map_err(|e| e.in_stage(&cook.recipe().name, Stage::Install))?;
        cook.install(context)?;

        if run_test {
            cook.test()?;
        }

        cook.finish()
    }

    /// Cook independent recipes on a worker pool of `config.jobs` threads
    ///
    /// Each recipe gets its own prefix; a repeated name is only cooked once.
    /// Results come back in input order.
    pub fn cook_batch(&self, recipes: Vec<Recipe>, run_test: bool) -> Vec<(String, Result<CookResult>)> {
        let mut seen = HashSet::new();
        let recipes: Vec<Recipe> = recipes
            .into_iter()
            .filter(|recipe| {
                let first = seen.insert(recipe.name.clone());
                if !first {
                    warn!("Skipping duplicate recipe {}", recipe.name);
                }
                first
            })
            .collect();

        let cook_all = move || -> Vec<(String, Result<CookResult>)> {
            recipes
                .into_par_iter()
                .map(|recipe| {
                    let name = recipe.name.clone();
                    (name, self.cook(recipe, run_test))
                })
                .collect()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs.max(1))
            .build()
        {
            Ok(pool) => pool.install(cook_all),
            Err(e) => {
                warn!("Failed to create worker pool ({}), using the global pool", e);
                cook_all()
            }
        }
    }

    /// Remove an installed recipe: its bin links, its prefix and its
    /// registry entry
    pub fn uninstall(&self, name: &str) -> Result<InstalledRecipe> {
        let installed = self.registry.require(name)?;

        remove_links(&installed.links, &installed.prefix)?;

        if installed.prefix.exists() {
            fs::remove_dir_all(&installed.prefix)?;
        }
        // Drop the now-empty <cellar>/<name> directory; ignore if other
        // versions remain.
        if let Some(parent) = installed.prefix.parent() {
            let _ = fs::remove_dir(parent);
        }

        self.registry.remove(name)?;
        info!("Uninstalled {} {}", installed.name, installed.version);
        Ok(installed)
    }
}

/// Files in the prefix matching the recipe's link patterns, paired with
/// their link path in the bin directory
fn plan_links(recipe: &Recipe, context: &InstallContext) -> Result<Vec<BinaryLink>> {
    if recipe.links.is_empty() {
        return Ok(Vec::new());
    }

    let vars = context.variables(recipe, None);
    let prefix = glob::Pattern::escape(&context.prefix().to_string_lossy());
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for pattern in &recipe.links {
        let pattern = recipe.substitute(pattern, &vars);
        if Path::new(&pattern).is_absolute() || pattern.split('/').any(|c| c == "..") {
            return Err(Error::MalformedRecipe(format!(
                "link pattern {} escapes the prefix",
                pattern
            )));
        }

        let entries = glob::glob(&format!("{}/{}", prefix, pattern))
            .map_err(|e| Error::MalformedRecipe(format!("invalid link pattern {}: {}", pattern, e)))?;

        for entry in entries {
            let target = entry.map_err(|e| Error::IoError(e.to_string()))?;
            if target.is_dir() {
                continue;
            }
            let Some(file_name) = target.file_name() else {
                continue;
            };

            let link_path = context.bin_dir().join(file_name);
            if !seen.insert(link_path.clone()) {
                return Err(Error::MalformedRecipe(format!(
                    "{}: more than one file would be linked as {}",
                    recipe.name,
                    link_path.display()
                )));
            }
            links.push(BinaryLink::new(link_path, target));
        }
    }

    if links.is_empty() {
        warn!("No files matched the link patterns of {}", recipe.name);
    }
    Ok(links)
}

/// Symlink planned links into the bin directory
fn create_links(links: &[BinaryLink], context: &InstallContext) -> Result<()> {
    if links.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(context.bin_dir())?;
    for link in links {
        replace_symlink(&link.target_path, &link.link_path)?;
        debug!("Linked {} -> {}", link.link_path.display(), link.target_path.display());
    }
    Ok(())
}

/// Remove links that still point at their recorded target
fn remove_links(links: &[BinaryLink], prefix: &Path) -> Result<()> {
    for link in links {
        match fs::read_link(&link.link_path) {
            Ok(target) if target == link.target_path => {
                fs::remove_file(&link.link_path)?;
                debug!("Removed link {}", link.link_path.display());
            }
            Ok(_) => warn!(
                "{} no longer points into {}, leaving it",
                link.link_path.display(),
                prefix.display()
            ),
            Err(_) => debug!("Link {} already gone", link.link_path.display()),
        }
    }
    Ok(())
}

/// Drop what an earlier install of the same recipe left behind
///
/// Links the new install replaced are left alone; a previous prefix at a
/// different version is removed.
fn retire_previous(previous: &InstalledRecipe, current: &InstalledRecipe) -> Result<()> {
    let stale: Vec<BinaryLink> = previous
        .links
        .iter()
        .filter(|old| !current.links.iter().any(|new| new.link_path == old.link_path))
        .cloned()
        .collect();
    remove_links(&stale, &previous.prefix)?;

    if previous.prefix != current.prefix && previous.prefix.exists() {
        fs::remove_dir_all(&previous.prefix)?;
        info!(
            "Removed {} {} at {}",
            previous.name,
            previous.version,
            previous.prefix.display()
        );
    }
    Ok(())
}

fn replace_symlink(target: &Path, link_path: &Path) -> Result<()> {
    match fs::symlink_metadata(link_path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(link_path)?,
        Ok(_) => {
            return Err(Error::IoError(format!(
                "{} exists and is not a symlink",
                link_path.display()
            )));
        }
        Err(_) => {}
    }
    std::os::unix::fs::symlink(target, link_path)?;
    Ok(())
}

/// Best-effort recipe name for errors raised before a recipe parses
fn name_hint(source: &str) -> String {
    toml::from_str::<toml::Table>(source)
        .ok()
        .and_then(|table| table.get("name")?.as_str().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "<recipe>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records invocations and fails the step whose display contains `fail_on`
    struct RecordingRunner {
        calls: Mutex<Vec<Invocation>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingRunner {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|i| i.args.last().cloned().unwrap_or_default())
                .collect()
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            let failed = self
                .fail_on
                .is_some_and(|needle| invocation.display().contains(needle));
            Ok(ProcessOutput {
                exit_code: Some(if failed { 2 } else { 0 }),
                stdout: "ok\n".to_string(),
                ..Default::default()
            })
        }
    }

    struct Fixture {
        _root: TempDir,
        kitchen: Kitchen,
        source: PathBuf,
        digest: String,
    }

    fn fixture(runner: Arc<RecordingRunner>) -> Fixture {
        let root = TempDir::new().unwrap();
        let source = root.path().join("tool-1.2.3.tgz");
        fs::write(&source, b"tool payload").unwrap();
        let digest = crate::hash::sha256(b"tool payload");

        let kitchen = Kitchen::new(KitchenConfig::with_root(root.path()))
            .unwrap()
            .with_runner(runner);

        Fixture {
            _root: root,
            kitchen,
            source,
            digest,
        }
    }

    fn recipe(fx: &Fixture, extra: &str) -> Recipe {
        fx.kitchen
            .load(&format!(
                "name = \"tool\"\nurl = \"{}\"\nsha256 = \"{}\"\n{}",
                fx.source.display(),
                fx.digest,
                extra
            ))
            .unwrap()
    }

    #[test]
    fn test_load_error_carries_name() {
        let runner = Arc::new(RecordingRunner::new(None));
        let fx = fixture(runner);
        let err = fx.kitchen.load("name = \"tool\"\nurl = \"x\"\n").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Load));
        assert!(err.to_string().starts_with("tool: load failed"));
        assert_eq!(err.kind_name(), "MalformedRecipe");
    }

    #[test]
    fn test_fetch_caches_by_checksum() {
        let runner = Arc::new(RecordingRunner::new(None));
        let fx = fixture(runner);
        let recipe = recipe(&fx, "");

        assert!(!fx.kitchen.is_cached(&recipe));
        let artifact = fx.kitchen.fetch(&recipe).unwrap();
        assert!(fx.kitchen.is_cached(&recipe));
        assert_eq!(artifact.file_name().unwrap().to_string_lossy(), format!("sha256_{}", fx.digest));

        // The cached copy is reused even once the source is gone
        fs::remove_file(&fx.source).unwrap();
        assert_eq!(fx.kitchen.fetch(&recipe).unwrap(), artifact);
    }

    #[test]
    fn test_install_steps_in_order_and_stop_on_failure() {
        let runner = Arc::new(RecordingRunner::new(Some("second")));
        let fx = fixture(runner.clone());
        let recipe = recipe(&fx, "install = [\"echo first\", \"echo second\", \"echo third\"]\n");
        let artifact = fx.kitchen.fetch(&recipe).unwrap();
        let context = InstallContext::persistent(fx.kitchen.config(), &recipe).unwrap();

        let err = fx.kitchen.install(&recipe, &artifact, &context).unwrap_err();
        assert!(matches!(
            err.kind(),
            Error::InstallStepFailed { index: 1, exit_code: Some(2), timed_out: false }
        ));
        assert_eq!(runner.commands(), vec!["echo first", "echo second"]);
        assert!(!fx.kitchen.registry().is_installed("tool").unwrap());
    }

    #[test]
    fn test_missing_dependency_runs_no_steps() {
        let runner = Arc::new(RecordingRunner::new(None));
        let fx = fixture(runner.clone());
        let recipe = recipe(&fx, "depends_on = [\"node\"]\ninstall = [\"npm install\"]\n");
        let artifact = fx.kitchen.fetch(&recipe).unwrap();
        let context = InstallContext::persistent(fx.kitchen.config(), &recipe).unwrap();

        let err = fx.kitchen.install(&recipe, &artifact, &context).unwrap_err();
        assert!(matches!(err.kind(), Error::MissingDependency(dep) if dep == "node"));
        assert_eq!(err.stage(), Some(Stage::Install));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_cook_records_install_and_substitutes_variables() {
        let runner = Arc::new(RecordingRunner::new(None));
        let fx = fixture(runner.clone());
        let recipe = recipe(
            &fx,
            "install = [\"tar xf %(artifact)s -C %(libexec)s\"]\n[test]\ncommand = \"tool --version\"\nexpect = \"ok\"\n",
        );

        let result = fx.kitchen.cook(recipe, true).unwrap();
        assert_eq!(result.version, "1.2.3");
        assert!(result.test.as_ref().unwrap().passed);

        let commands = runner.commands();
        assert_eq!(
            commands[0],
            format!(
                "tar xf {} -C {}",
                result.artifact.display(),
                result.prefix.join("libexec").display()
            )
        );
        assert_eq!(commands[1], "tool --version");

        let installed = fx.kitchen.registry().require("tool").unwrap();
        assert_eq!(installed.prefix, result.prefix);
        assert_eq!(installed.checksum, format!("sha256:{}", fx.digest));
    }

    #[test]
    fn test_cook_batch_reports_each_recipe() {
        let runner = Arc::new(RecordingRunner::new(None));
        let fx = fixture(runner);
        let good = recipe(&fx, "");
        let mut bad = good.clone();
        bad.name = "broken".to_string();
        bad.sha256 = "deadbeef".to_string();

        let results = fx.kitchen.cook_batch(vec![good.clone(), bad, good], false);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "tool");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "broken");
        assert_eq!(results[1].1.as_ref().unwrap_err().kind_name(), "ChecksumMismatch");
    }

    #[test]
    fn test_name_hint() {
        assert_eq!(name_hint("name = \"cdk8s\""), "cdk8s");
        assert_eq!(name_hint("not toml ["), "<recipe>");
    }
}
