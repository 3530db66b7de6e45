// src/recipe/parser.rs

//! Recipe loading and validation

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use std::path::{Path, PathBuf};

/// File extension of recipe files
pub const RECIPE_EXTENSION: &str = "toml";

/// Parse a recipe from a TOML string
///
/// Fails with `MalformedRecipe` when the TOML is invalid or a required field
/// (`name`, `url`, `sha256`) is absent, empty or unusable.
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    let recipe: Recipe = toml::from_str(content)
        .map_err(|e| Error::MalformedRecipe(e.message().to_string()))?;

    check_required(&recipe)?;
    Ok(recipe)
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file {}: {}", path.display(), e)))?;

    parse_recipe(&content).map_err(|e| match e {
        Error::MalformedRecipe(msg) => {
            Error::MalformedRecipe(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Locate `<name>.toml` in a recipe directory
pub fn find_recipe(recipes_dir: &Path, name: &str) -> Result<PathBuf> {
    if !is_valid_name(name) {
        return Err(Error::NotFound(format!("invalid recipe name '{}'", name)));
    }

    let path = recipes_dir.join(format!("{}.{}", name, RECIPE_EXTENSION));
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::NotFound(format!(
            "no recipe named '{}' in {}",
            name,
            recipes_dir.display()
        )))
    }
}

/// Load a recipe by name from a recipe directory
///
/// The file name must agree with the recipe's `name` field.
pub fn load_named(recipes_dir: &Path, name: &str) -> Result<Recipe> {
    let path = find_recipe(recipes_dir, name)?;
    let recipe = parse_recipe_file(&path)?;

    if recipe.name != name {
        return Err(Error::MalformedRecipe(format!(
            "{} declares name '{}'",
            path.display(),
            recipe.name
        )));
    }

    Ok(recipe)
}

/// List recipe names available in a directory, sorted
pub fn list_recipes(recipes_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if !recipes_dir.is_dir() {
        return Ok(names);
    }

    for entry in std::fs::read_dir(recipes_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(RECIPE_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Recipe names end up in filesystem paths, so keep them plain
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
}

fn check_required(recipe: &Recipe) -> Result<()> {
    if recipe.name.trim().is_empty() {
        return Err(Error::MalformedRecipe("name cannot be empty".to_string()));
    }
    if !is_valid_name(&recipe.name) {
        return Err(Error::MalformedRecipe(format!(
            "invalid name '{}': use letters, digits, '.', '_', '+' or '-'",
            recipe.name
        )));
    }
    if let Some(version) = &recipe.version
        && !is_valid_name(version)
    {
        return Err(Error::MalformedRecipe(format!(
            "{}: invalid version '{}': use letters, digits, '.', '_', '+' or '-'",
            recipe.name, version
        )));
    }
    if recipe.url.trim().is_empty() {
        return Err(Error::MalformedRecipe(format!("{}: url cannot be empty", recipe.name)));
    }
    recipe.checksum()?;

    for dep in &recipe.depends_on {
        if !is_valid_name(dep) {
            return Err(Error::MalformedRecipe(format!(
                "{}: invalid dependency name '{}'",
                recipe.name, dep
            )));
        }
    }

    if let Some(index) = recipe.install.iter().position(|step| step.is_empty()) {
        return Err(Error::MalformedRecipe(format!(
            "{}: install step {} is empty",
            recipe.name, index
        )));
    }

    Ok(())
}

/// Validate a loaded recipe for completeness
///
/// Returns non-fatal warnings; fatal problems were already rejected at load.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    check_required(recipe)?;
    let mut warnings = Vec::new();

    if recipe.desc.is_none() {
        warnings.push("Missing desc".to_string());
    }
    if recipe.homepage.is_none() {
        warnings.push("Missing homepage".to_string());
    }
    if recipe.license.is_none() {
        warnings.push("Missing license".to_string());
    }

    let checksum = recipe.checksum()?;
    if !checksum.is_full_length() {
        warnings.push(format!(
            "sha256 is {} hex characters, expected {}; it can never match",
            checksum.digest.len(),
            checksum.algorithm.hex_len()
        ));
    }

    if recipe.url.starts_with("http://") {
        warnings.push("Source url uses plain http".to_string());
    }

    if recipe.install.is_empty() {
        warnings.push("No install steps".to_string());
    }

    match &recipe.test {
        None => warnings.push("No test section".to_string()),
        Some(test) => {
            if test.command.is_empty() {
                warnings.push("Test command is empty".to_string());
            }
            if test.assertions().is_empty() && test.exit_code.is_none() {
                warnings.push("Test has no expectations and always passes".to_string());
            }
            for pattern in test.pattern.values() {
                if let Err(e) = regex::Regex::new(&pattern) {
                    warnings.push(format!("Test pattern /{}/ is invalid: {}", pattern, e));
                }
            }
        }
    }

    for pattern in &recipe.links {
        if Path::new(pattern).is_absolute() || pattern.split('/').any(|c| c == "..") {
            warnings.push(format!("Link pattern {} escapes the prefix", pattern));
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "hello"
url = "https://example.com/hello-1.0.tar.gz"
sha256 = "deadbeef"
"#;

    #[test]
    fn test_parse_minimal_recipe() {
        let recipe = parse_recipe(MINIMAL).unwrap();
        assert_eq!(recipe.name, "hello");
        assert!(recipe.install.is_empty());
        assert!(recipe.test.is_none());
        assert_eq!(recipe.version(), "1.0");
    }

    #[test]
    fn test_missing_required_fields() {
        for missing in ["name", "url", "sha256"] {
            let content: String = MINIMAL
                .lines()
                .filter(|l| !l.starts_with(missing))
                .collect::<Vec<_>>()
                .join("\n");
            let err = parse_recipe(&content).unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecipe(ref msg) if msg.contains(missing)),
                "missing {} gave {:?}",
                missing,
                err
            );
        }
    }

    #[test]
    fn test_empty_fields_are_malformed() {
        let content = MINIMAL.replace("name = \"hello\"", "name = \"\"");
        assert!(matches!(parse_recipe(&content), Err(Error::MalformedRecipe(_))));

        let content = MINIMAL.replace("sha256 = \"deadbeef\"", "sha256 = \"\"");
        assert!(matches!(parse_recipe(&content), Err(Error::MalformedRecipe(_))));
    }

    #[test]
    fn test_unsafe_versions_rejected() {
        for version in ["", "/tmp/victim", "../..", "1.0/../../x", ".hidden"] {
            let content = format!("{}version = \"{}\"\n", MINIMAL, version);
            assert!(
                matches!(parse_recipe(&content), Err(Error::MalformedRecipe(ref msg)) if msg.contains("version")),
                "version {:?} was accepted",
                version
            );
        }

        let content = format!("{}version = \"2.1.0-rc1\"\n", MINIMAL);
        assert_eq!(parse_recipe(&content).unwrap().version(), "2.1.0-rc1");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            parse_recipe("this is not valid toml at all {}"),
            Err(Error::MalformedRecipe(_))
        ));
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let content = MINIMAL.replace("\"hello\"", "\"../evil\"");
        assert!(matches!(parse_recipe(&content), Err(Error::MalformedRecipe(_))));

        assert!(is_valid_name("cdk8s"));
        assert!(is_valid_name("libfoo+bar-2.0_x"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-flag"));
        assert!(!is_valid_name("a/b"));
    }

    #[test]
    fn test_empty_install_step_rejected() {
        let content = format!("{}install = [\"make\", \"  \"]\n", MINIMAL);
        let err = parse_recipe(&content).unwrap_err();
        assert!(matches!(err, Error::MalformedRecipe(msg) if msg.contains("step 1")));
    }

    #[test]
    fn test_validate_warnings() {
        let recipe = parse_recipe(MINIMAL).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();

        assert!(warnings.iter().any(|w| w.contains("desc")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("never match")));
        assert!(warnings.iter().any(|w| w.contains("install")));
        assert!(warnings.iter().any(|w| w.contains("test")));
    }

    #[test]
    fn test_load_named_and_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.toml"), MINIMAL).unwrap();
        std::fs::write(dir.path().join("README.md"), "not a recipe").unwrap();
        std::fs::write(
            dir.path().join("other.toml"),
            MINIMAL.replace("\"hello\"", "\"mismatch\""),
        )
        .unwrap();

        assert_eq!(load_named(dir.path(), "hello").unwrap().name, "hello");
        assert!(matches!(load_named(dir.path(), "other"), Err(Error::MalformedRecipe(_))));
        assert!(matches!(load_named(dir.path(), "absent"), Err(Error::NotFound(_))));
        assert!(matches!(load_named(dir.path(), "../x"), Err(Error::NotFound(_))));

        assert_eq!(list_recipes(dir.path()).unwrap(), vec!["hello", "other"]);
    }
}
