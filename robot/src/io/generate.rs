//! Recipe generation.
//!
//! The [`Generator`] trait decouples the pipeline from how recipe files are
//! produced. [`TemplateGenerator`] renders one file per enabled type from a
//! bundled template.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::{debug, info, instrument};

use crate::core::catalog::parent_type;
use crate::core::preferences::Preferences;
use crate::error::{DomainError, Failure};
use crate::facts::Facts;
use crate::io::paths::expand_home;

const RECIPE_TEMPLATE: &str = include_str!("../../templates/recipe.plist.j2");
// The `.xml` name turns on XML escaping for rendered values.
const TEMPLATE_NAME: &str = "recipe.xml";

/// Result of a generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    /// Recipe files written this run.
    pub recipes: Vec<PathBuf>,
    pub elapsed: Duration,
}

pub trait Generator {
    fn generate(&self, facts: &mut Facts, prefs: &Preferences) -> Result<Generation, Failure>;
}

pub struct TemplateGenerator {
    env: Environment<'static>,
}

impl TemplateGenerator {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, RECIPE_TEMPLATE)
            .context("load recipe template")?;
        Ok(Self { env })
    }

    fn render(&self, recipe: &RecipeSpec<'_>) -> Result<String> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .context("get recipe template")?;
        let mut rendered = template
            .render(context! {
                description => &recipe.description,
                identifier => &recipe.identifier,
                app_name => recipe.app_name,
                parent => &recipe.parent,
                inputs => &recipe.inputs,
            })
            .with_context(|| format!("render {} recipe", recipe.kind))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

struct RecipeSpec<'a> {
    kind: &'a str,
    description: String,
    identifier: String,
    app_name: &'a str,
    parent: Option<String>,
    inputs: BTreeMap<&'static str, String>,
}

impl Generator for TemplateGenerator {
    #[instrument(skip_all)]
    fn generate(&self, facts: &mut Facts, prefs: &Preferences) -> Result<Generation, Failure> {
        let start = Instant::now();
        if prefs.enabled_types.is_empty() {
            return Err(DomainError::new(
                "No recipe types are enabled; run with --config to choose some",
            )
            .into());
        }
        let Some(app_name) = facts.get_str("app_name").map(str::to_string) else {
            return Err(Failure::domain("App name is unknown; cannot name recipes"));
        };

        let recipe_dir = expand_home(&prefs.output_dir).join(&app_name);
        fs::create_dir_all(&recipe_dir)
            .with_context(|| format!("create recipe dir {}", recipe_dir.display()))?;

        let mut written = Vec::new();
        for kind in &prefs.enabled_types {
            let Some(summary) = facts
                .catalog
                .iter()
                .find(|recipe| &recipe.kind == kind)
                .map(|recipe| recipe.description.clone())
            else {
                debug!(kind = %kind, "skipping unknown recipe type");
                continue;
            };
            let path = recipe_dir.join(format!("{app_name}.{kind}.recipe"));
            if path.exists() && !facts.args.ignore_existing {
                facts.warn(format!(
                    "{} already exists; skipping (use --ignore-existing to overwrite)",
                    path.display()
                ));
                continue;
            }
            let spec = RecipeSpec {
                kind,
                description: format!("{app_name}: {summary}"),
                identifier: identifier(&prefs.identifier_prefix, kind, &app_name),
                app_name: &app_name,
                parent: parent_type(kind)
                    .map(|parent| identifier(&prefs.identifier_prefix, parent, &app_name)),
                inputs: recipe_inputs(kind, facts, prefs),
            };
            write_recipe(&path, &self.render(&spec)?)?;
            info!(path = %path.display(), "recipe written");
            written.push(path);
        }

        Ok(Generation {
            recipes: written,
            elapsed: start.elapsed(),
        })
    }
}

/// `<prefix>.<type>.<AppNameWithoutSpaces>`
pub fn identifier(prefix: &str, kind: &str, app_name: &str) -> String {
    let compact: String = app_name.chars().filter(|c| !c.is_whitespace()).collect();
    format!("{prefix}.{kind}.{compact}")
}

fn recipe_inputs(kind: &str, facts: &Facts, prefs: &Preferences) -> BTreeMap<&'static str, String> {
    let mut inputs = BTreeMap::new();
    match kind {
        "download" => {
            if let Some(url) = facts.get_str("download_url") {
                inputs.insert("DOWNLOAD_URL", url.to_string());
            }
            if let Some(feed) = facts.get_str("sparkle_feed") {
                inputs.insert("SPARKLE_FEED_URL", feed.to_string());
            }
        }
        "munki" => {
            inputs.insert("MUNKI_REPO_SUBDIR", "apps".to_string());
        }
        "ds" => {
            if let Some(path) = &prefs.ds_packages_path {
                inputs.insert("DS_PKGS_PATH", path.clone());
            }
        }
        "jss" => {
            let official = prefs.follow_official_jss.unwrap_or(false);
            let category = if official { "Productivity" } else { "Apps" };
            inputs.insert("CATEGORY", category.to_string());
            inputs.insert("POLICY_CATEGORY", "Testing".to_string());
        }
        _ => {}
    }
    inputs
}

fn write_recipe(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write recipe {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use crate::core::catalog::Catalog;

    fn prefs(output_dir: &Path, enabled: &[&str]) -> Preferences {
        Preferences {
            identifier_prefix: "com.github.example".to_string(),
            output_dir: output_dir.to_string_lossy().into_owned(),
            enabled_types: enabled.iter().map(|kind| kind.to_string()).collect(),
            ds_packages_path: Some("/Volumes/DS".to_string()),
            follow_official_jss: Some(true),
            ..Preferences::default()
        }
    }

    fn facts(ignore_existing: bool) -> Facts {
        let mut facts = Facts::new(
            Args {
                input_path: Some("https://example.com/Big Thing.dmg".to_string()),
                ignore_existing,
                ..Args::default()
            },
            Catalog::standard(),
        );
        facts.set("app_name", "Big Thing");
        facts.set("download_url", "https://example.com/Big Thing.dmg?a=1&b=2");
        facts
    }

    #[test]
    fn writes_one_recipe_per_enabled_type() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = TemplateGenerator::new().expect("generator");
        let mut facts = facts(false);

        let generation = generator
            .generate(&mut facts, &prefs(temp.path(), &["download", "pkg", "jss"]))
            .expect("generate");

        assert_eq!(generation.recipes.len(), 3);
        let jss = fs::read_to_string(temp.path().join("Big Thing/Big Thing.jss.recipe"))
            .expect("read jss");
        assert!(jss.contains("<string>com.github.example.jss.BigThing</string>"));
        assert!(jss.contains("<string>com.github.example.pkg.BigThing</string>"));

        let download =
            fs::read_to_string(temp.path().join("Big Thing/Big Thing.download.recipe"))
                .expect("read download");
        assert!(download.contains("DOWNLOAD_URL"));
        assert!(download.contains("a=1&amp;b=2"));
        assert!(!download.contains("ParentRecipe"));
    }

    #[test]
    fn existing_recipes_are_skipped_with_warning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("Big Thing");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("Big Thing.download.recipe"), "mine").expect("write existing");
        let generator = TemplateGenerator::new().expect("generator");
        let mut facts = facts(false);

        let generation = generator
            .generate(&mut facts, &prefs(temp.path(), &["download", "munki"]))
            .expect("generate");

        assert_eq!(generation.recipes, vec![dir.join("Big Thing.munki.recipe")]);
        assert_eq!(facts.warnings().len(), 1);
        let existing = fs::read_to_string(dir.join("Big Thing.download.recipe")).expect("read");
        assert_eq!(existing, "mine");
    }

    #[test]
    fn ignore_existing_overwrites() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("Big Thing");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("Big Thing.download.recipe"), "mine").expect("write existing");
        let generator = TemplateGenerator::new().expect("generator");
        let mut facts = facts(true);

        let generation = generator
            .generate(&mut facts, &prefs(temp.path(), &["download"]))
            .expect("generate");

        assert_eq!(generation.recipes.len(), 1);
        assert!(facts.warnings().is_empty());
    }

    #[test]
    fn nothing_enabled_is_a_domain_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = TemplateGenerator::new().expect("generator");
        let failure = generator
            .generate(&mut facts(false), &prefs(temp.path(), &[]))
            .unwrap_err();
        assert!(matches!(failure, Failure::Domain(_)));
    }

    #[test]
    fn identifiers_drop_whitespace() {
        assert_eq!(
            identifier("com.example", "munki", "Big  Thing"),
            "com.example.munki.BigThing"
        );
    }
}
