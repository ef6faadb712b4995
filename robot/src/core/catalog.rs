//! The recipe catalog: which output kinds exist and which are preferred.
//!
//! Membership is fixed for a run; only the `preferred` flags change. Turning a
//! type on pulls in its prerequisites immediately, turning one off never
//! retracts anything.

use serde::Serialize;

/// Types whose recipes chain off a `download` recipe.
pub const REQUIRES_DOWNLOAD: &[&str] = &[
    "munki", "pkg", "install", "jss", "lanrev", "sccm", "ds", "filewave", "bigfix",
];

/// Types whose recipes chain off a `pkg` recipe.
pub const REQUIRES_PKG: &[&str] = &["jss", "lanrev", "sccm", "ds"];

pub const DOWNLOAD: &str = "download";
pub const PKG: &str = "pkg";

/// One producible output kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub preferred: bool,
}

impl RecipeDescriptor {
    pub fn new(kind: &str, description: &str) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.to_string(),
            preferred: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    recipes: Vec<RecipeDescriptor>,
}

impl Catalog {
    pub fn new(recipes: Vec<RecipeDescriptor>) -> Self {
        Self { recipes }
    }

    /// Every recipe type the robot knows how to produce, all preferred.
    pub fn standard() -> Self {
        Self::new(vec![
            RecipeDescriptor::new(
                "download",
                "Downloads an app in whatever format the developer provides.",
            ),
            RecipeDescriptor::new("munki", "Imports into your Munki repository."),
            RecipeDescriptor::new("pkg", "Creates a standard pkg installer file."),
            RecipeDescriptor::new("install", "Installs the app on the computer running AutoPkg."),
            RecipeDescriptor::new(
                "jss",
                "Imports into your Casper JSS and creates necessary groups, policies, etc.",
            ),
            RecipeDescriptor::new("lanrev", "Imports into your LANrev server."),
            RecipeDescriptor::new(
                "sccm",
                "Creates a cmmac package for deploying via Microsoft SCCM.",
            ),
            RecipeDescriptor::new("ds", "Imports into your DeployStudio Packages folder."),
            RecipeDescriptor::new("filewave", "Imports a fileset into your FileWave server."),
            RecipeDescriptor::new("bigfix", "Creates a BigFix task for deploying the app."),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecipeDescriptor> {
        self.recipes.iter()
    }

    pub fn is_enabled(&self, kind: &str) -> bool {
        self.recipes
            .iter()
            .any(|recipe| recipe.kind == kind && recipe.preferred)
    }

    /// Flip the flag at `index`, returning the new state.
    ///
    /// Returns `None` when `index` is out of range; the catalog is untouched.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let recipe = self.recipes.get_mut(index)?;
        recipe.preferred = !recipe.preferred;
        let now = recipe.preferred;
        if now {
            let kind = recipe.kind.clone();
            self.enable_prerequisites(&kind);
        }
        Some(now)
    }

    pub fn set_all(&mut self, preferred: bool) {
        for recipe in &mut self.recipes {
            recipe.preferred = preferred;
        }
    }

    /// Reflect a persisted enabled-type list into the flags.
    ///
    /// Types absent from the list are turned off. Entries that name no known
    /// type are ignored and returned so the caller can log them.
    pub fn apply_enabled(&mut self, enabled: &[String]) -> Vec<String> {
        for recipe in &mut self.recipes {
            recipe.preferred = enabled.iter().any(|kind| kind == &recipe.kind);
        }
        enabled
            .iter()
            .filter(|kind| !self.recipes.iter().any(|recipe| &recipe.kind == *kind))
            .cloned()
            .collect()
    }

    /// Enabled types in catalog order.
    pub fn enabled_types(&self) -> Vec<String> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.preferred)
            .map(|recipe| recipe.kind.clone())
            .collect()
    }

    // Both rules are applied independently; `pkg` being pulled in does not
    // recurse into its own prerequisites.
    fn enable_prerequisites(&mut self, kind: &str) {
        if REQUIRES_DOWNLOAD.contains(&kind) {
            self.set_preferred(DOWNLOAD);
        }
        if REQUIRES_PKG.contains(&kind) {
            self.set_preferred(PKG);
        }
    }

    fn set_preferred(&mut self, kind: &str) {
        if let Some(recipe) = self.recipes.iter_mut().find(|recipe| recipe.kind == kind) {
            recipe.preferred = true;
        }
    }
}

/// Parent recipe type a generated recipe of `kind` chains off, if any.
pub fn parent_type(kind: &str) -> Option<&'static str> {
    if REQUIRES_PKG.contains(&kind) {
        Some(PKG)
    } else if REQUIRES_DOWNLOAD.contains(&kind) {
        Some(DOWNLOAD)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        let mut catalog = Catalog::new(vec![
            RecipeDescriptor::new("download", "d"),
            RecipeDescriptor::new("pkg", "p"),
            RecipeDescriptor::new("munki", "m"),
            RecipeDescriptor::new("jss", "j"),
        ]);
        catalog.set_all(false);
        catalog
    }

    fn index_of(catalog: &Catalog, kind: &str) -> usize {
        catalog
            .iter()
            .position(|recipe| recipe.kind == kind)
            .expect("kind in catalog")
    }

    #[test]
    fn enabling_jss_pulls_in_pkg_and_download() {
        let mut catalog = small_catalog();
        let jss = index_of(&catalog, "jss");

        assert_eq!(catalog.toggle(jss), Some(true));

        assert!(catalog.is_enabled("jss"));
        assert!(catalog.is_enabled("pkg"));
        assert!(catalog.is_enabled("download"));
        assert!(!catalog.is_enabled("munki"));
    }

    #[test]
    fn download_stays_on_across_unrelated_toggles() {
        let mut catalog = small_catalog();
        let munki = index_of(&catalog, "munki");
        let pkg = index_of(&catalog, "pkg");
        let jss = index_of(&catalog, "jss");

        catalog.toggle(munki);
        assert!(catalog.is_enabled("download"));

        for index in [jss, jss, pkg, jss, munki] {
            catalog.toggle(index);
            assert!(catalog.is_enabled("download"), "after toggling {index}");
        }
    }

    #[test]
    fn disabling_a_prerequisite_keeps_dependents() {
        let mut catalog = small_catalog();
        catalog.toggle(index_of(&catalog, "jss"));

        assert_eq!(catalog.toggle(index_of(&catalog, "download")), Some(false));
        assert_eq!(catalog.toggle(index_of(&catalog, "pkg")), Some(false));

        assert!(catalog.is_enabled("jss"));
        assert!(!catalog.is_enabled("download"));
        assert!(!catalog.is_enabled("pkg"));
    }

    #[test]
    fn toggling_off_a_dependent_does_not_retract_prerequisites() {
        let mut catalog = small_catalog();
        let munki = index_of(&catalog, "munki");
        catalog.toggle(munki);
        catalog.toggle(munki);

        assert!(!catalog.is_enabled("munki"));
        assert!(catalog.is_enabled("download"));
    }

    #[test]
    fn toggle_out_of_range_changes_nothing() {
        let mut catalog = small_catalog();
        let before = catalog.clone();
        assert_eq!(catalog.toggle(99), None);
        assert_eq!(catalog, before);
    }

    #[test]
    fn apply_enabled_ignores_unknown_types() {
        let mut catalog = small_catalog();
        let ignored = catalog.apply_enabled(&[
            "munki".to_string(),
            "filewave-classic".to_string(),
            "download".to_string(),
        ]);

        assert_eq!(ignored, vec!["filewave-classic".to_string()]);
        assert_eq!(catalog.enabled_types(), vec!["download", "munki"]);
    }

    #[test]
    fn enabled_types_follow_catalog_order() {
        let mut catalog = Catalog::standard();
        catalog.set_all(false);
        assert_eq!(catalog.toggle(6), Some(true));

        assert_eq!(catalog.enabled_types(), vec!["download", "pkg", "sccm"]);
    }

    #[test]
    fn parents_prefer_pkg_over_download() {
        assert_eq!(parent_type("jss"), Some("pkg"));
        assert_eq!(parent_type("munki"), Some("download"));
        assert_eq!(parent_type("pkg"), Some("download"));
        assert_eq!(parent_type("download"), None);
    }
}
