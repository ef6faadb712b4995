//! Interactive preference reconciliation.
//!
//! Produces a consistent [`Preferences`] record: either the stored one as-is,
//! or the result of an edit session when nothing is stored yet or the user
//! asked to reconfigure. The recipe type menu edits a working copy of the
//! catalog; nothing is committed unless the user saves.

use tracing::{debug, info, warn};

use crate::core::catalog::Catalog;
use crate::core::menu::MenuCommand;
use crate::core::preferences::{DEFAULT_DS_PACKAGES_PATH, Preferences, trim_trailing};
use crate::error::{Abort, Failure};
use crate::io::console::{Console, Tone};

const MENU_PROMPT: &str = concat!(
    "Type a number to toggle a recipe type, ",
    "A to enable all, D to disable all, S to save, or Q to quit: ",
);

const FIRST_RUN_GREETING: &str = concat!(
    "It looks like this is your first time running Recipe Robot. ",
    "Let's set up your preferences.",
);

/// Settle on the preferences for this run.
///
/// With stored preferences and no `force_edit`, the stored record is reflected
/// into `catalog` and returned, with any missing values filled from first-run
/// defaults. Otherwise an edit session runs, seeded from the stored record or
/// first-run defaults.
pub fn resolve<C: Console>(
    console: &mut C,
    catalog: &mut Catalog,
    existing: Option<Preferences>,
    force_edit: bool,
    username: &str,
) -> Result<Preferences, Failure> {
    let mut prefs = match existing {
        Some(mut prefs) => {
            let filled = prefs.fill_missing(username);
            if !filled.is_empty() {
                info!(?filled, "filled missing preference values");
            }
            reflect(catalog, &prefs);
            if !force_edit {
                debug!("using stored preferences");
                return Ok(prefs);
            }
            prefs
        }
        None => {
            info!("no stored preferences; starting first-run setup");
            console.emit(Tone::Plain, FIRST_RUN_GREETING);
            Preferences::first_run(username)
        }
    };

    edit(console, catalog, &mut prefs)?;
    Ok(prefs)
}

fn reflect(catalog: &mut Catalog, prefs: &Preferences) {
    let ignored = catalog.apply_enabled(&prefs.enabled_types);
    for kind in ignored {
        warn!(kind = %kind, "ignoring unknown recipe type in preferences");
    }
}

fn edit<C: Console>(
    console: &mut C,
    catalog: &mut Catalog,
    prefs: &mut Preferences,
) -> Result<(), Failure> {
    prefs.identifier_prefix =
        prompt_value(console, "Recipe identifier prefix", &prefs.identifier_prefix, '.')?;
    prefs.output_dir = prompt_value(console, "Recipe output location", &prefs.output_dir, '/')?;

    let mut working = catalog.clone();
    select_recipe_types(console, &mut working)?;
    *catalog = working;
    prefs.enabled_types = catalog.enabled_types();
    info!(enabled = ?prefs.enabled_types, "recipe types saved");

    if catalog.is_enabled("ds") {
        let current = prefs
            .ds_packages_path
            .clone()
            .unwrap_or_else(|| DEFAULT_DS_PACKAGES_PATH.to_string());
        prefs.ds_packages_path =
            Some(prompt_value(console, "DeployStudio Packages path", &current, '/')?);
    }
    if catalog.is_enabled("jss") {
        let current = prefs.follow_official_jss.unwrap_or(true);
        prefs.follow_official_jss = Some(prompt_yes_no(
            console,
            "Follow the official jss-recipes style conventions?",
            current,
        )?);
    }
    Ok(())
}

/// Run the recipe type menu until the user saves or quits.
pub fn select_recipe_types<C: Console>(
    console: &mut C,
    catalog: &mut Catalog,
) -> Result<(), Failure> {
    loop {
        render_menu(console, catalog);
        let line = read_or_abort(console, MENU_PROMPT)?;
        match MenuCommand::parse(&line) {
            MenuCommand::Toggle(index) => match catalog.toggle(index) {
                Some(enabled) => debug!(index, enabled, "recipe type toggled"),
                None => console.emit(
                    Tone::Warning,
                    &format!("{index} is not a valid option. Please try again."),
                ),
            },
            MenuCommand::EnableAll => catalog.set_all(true),
            MenuCommand::DisableAll => catalog.set_all(false),
            MenuCommand::Quit => return Err(Failure::Aborted(Abort::MenuQuit)),
            MenuCommand::Save => return Ok(()),
            MenuCommand::Invalid(input) => console.emit(
                Tone::Warning,
                &format!("\"{input}\" is not a valid option. Please try again."),
            ),
        }
    }
}

fn render_menu<C: Console>(console: &mut C, catalog: &Catalog) {
    console.emit(Tone::Plain, "\nChoose which recipe types to create by default:");
    for (index, recipe) in catalog.iter().enumerate() {
        let mark = if recipe.preferred { "✓" } else { " " };
        console.emit(
            Tone::Plain,
            &format!(
                "  [{index:>2}] [{mark}] {:<9} {}",
                recipe.kind, recipe.description
            ),
        );
    }
}

/// Prompt with a current value; empty input keeps it.
fn prompt_value<C: Console>(
    console: &mut C,
    label: &str,
    current: &str,
    separator: char,
) -> Result<String, Failure> {
    loop {
        let line = read_or_abort(console, &format!("{label} [{current}]: "))?;
        let value = if line.trim().is_empty() {
            current.to_string()
        } else {
            trim_trailing(&line, separator)
        };
        if !value.is_empty() {
            return Ok(value);
        }
        console.emit(Tone::Warning, &format!("{label} cannot be empty."));
    }
}

fn prompt_yes_no<C: Console>(console: &mut C, label: &str, current: bool) -> Result<bool, Failure> {
    let hint = if current { "Y/n" } else { "y/N" };
    loop {
        let line = read_or_abort(console, &format!("{label} [{hint}]: "))?;
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(current),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => console.emit(
                Tone::Warning,
                &format!("\"{other}\" is not a valid answer. Please enter y or n."),
            ),
        }
    }
}

fn read_or_abort<C: Console>(console: &mut C, prompt: &str) -> Result<String, Failure> {
    match console.read_line(prompt)? {
        Some(line) => Ok(line),
        None => Err(Failure::Aborted(Abort::EndOfInput)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::RecipeDescriptor;
    use crate::test_support::ScriptedConsole;

    fn stored() -> Preferences {
        Preferences {
            identifier_prefix: "com.github.stored".to_string(),
            output_dir: "~/Stored".to_string(),
            enabled_types: vec!["download".to_string(), "munki".to_string()],
            recipe_create_count: 3,
            ..Preferences::default()
        }
    }

    fn four() -> Catalog {
        let mut catalog = Catalog::new(vec![
            RecipeDescriptor::new("download", "d"),
            RecipeDescriptor::new("pkg", "p"),
            RecipeDescriptor::new("munki", "m"),
            RecipeDescriptor::new("jss", "j"),
        ]);
        catalog.set_all(false);
        catalog
    }

    #[test]
    fn stored_preferences_are_used_without_prompting() {
        let mut console = ScriptedConsole::new(Vec::<&str>::new());
        let mut catalog = Catalog::standard();

        let prefs =
            resolve(&mut console, &mut catalog, Some(stored()), false, "me").expect("resolve");

        assert_eq!(prefs, stored());
        assert_eq!(catalog.enabled_types(), vec!["download", "munki"]);
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn unknown_stored_types_are_ignored() {
        let mut console = ScriptedConsole::new(Vec::<&str>::new());
        let mut catalog = Catalog::standard();
        let mut prefs = stored();
        prefs.enabled_types.push("casper-classic".to_string());

        let resolved =
            resolve(&mut console, &mut catalog, Some(prefs), false, "me").expect("resolve");

        assert_eq!(catalog.enabled_types(), vec!["download", "munki"]);
        assert!(resolved.enabled_types.contains(&"casper-classic".to_string()));
    }

    #[test]
    fn first_run_keeps_defaults_on_empty_input() {
        let mut console = ScriptedConsole::new(["", "", "D", "2", "s"]);
        let mut catalog = four();

        let prefs = resolve(&mut console, &mut catalog, None, false, "me").expect("resolve");

        assert_eq!(prefs.identifier_prefix, "com.github.me");
        assert_eq!(prefs.output_dir, crate::core::preferences::DEFAULT_OUTPUT_DIR);
        assert_eq!(prefs.enabled_types, vec!["download", "munki"]);
    }

    #[test]
    fn values_are_trimmed_of_trailing_separators() {
        let mut console = ScriptedConsole::new(["com.example..", "~/Recipes/", "s"]);
        let mut catalog = four();

        let prefs =
            resolve(&mut console, &mut catalog, Some(stored()), true, "me").expect("resolve");

        assert_eq!(prefs.identifier_prefix, "com.example");
        assert_eq!(prefs.output_dir, "~/Recipes");
        assert_eq!(prefs.recipe_create_count, 3);
    }

    #[test]
    fn enabling_jss_pulls_prerequisites_and_asks_style() {
        let mut console = ScriptedConsole::new(["", "", "3", "s", "n"]);
        let mut catalog = four();

        let prefs = resolve(&mut console, &mut catalog, None, false, "me").expect("resolve");

        assert_eq!(prefs.enabled_types, vec!["download", "pkg", "jss"]);
        assert!(!catalog.is_enabled("munki"));
        assert_eq!(prefs.follow_official_jss, Some(false));
    }

    #[test]
    fn indicators_update_between_prompts() {
        let mut console = ScriptedConsole::new(["3", "s"]);
        let mut catalog = four();

        select_recipe_types(&mut console, &mut catalog).expect("select");

        let transcript = console.transcript();
        let second_menu = transcript
            .rsplit("Choose which recipe types")
            .next()
            .expect("second menu");
        assert!(second_menu.contains("[✓] download"));
        assert!(second_menu.contains("[✓] pkg"));
        assert!(second_menu.contains("[ ] munki"));
    }

    #[test]
    fn invalid_input_warns_and_changes_nothing() {
        let mut console = ScriptedConsole::new(["42", "banana", "s"]);
        let mut catalog = four();

        select_recipe_types(&mut console, &mut catalog).expect("select");

        assert!(catalog.enabled_types().is_empty());
        assert_eq!(console.count(Tone::Warning), 2);
    }

    #[test]
    fn quit_discards_session_edits() {
        let mut console = ScriptedConsole::new(["", "", "2", "q"]);
        let mut catalog = four();

        let failure = resolve(&mut console, &mut catalog, Some(stored()), true, "me").unwrap_err();

        assert!(matches!(failure, Failure::Aborted(Abort::MenuQuit)));
        assert_eq!(catalog.enabled_types(), vec!["download", "munki"]);
    }

    #[test]
    fn closed_input_aborts() {
        let mut console = ScriptedConsole::new(["", ""]);
        let mut catalog = four();

        let failure = resolve(&mut console, &mut catalog, None, false, "me").unwrap_err();

        assert!(matches!(failure, Failure::Aborted(Abort::EndOfInput)));
    }

    #[test]
    fn ds_path_prompt_seeds_from_stored_value() {
        let mut stored = stored();
        stored.ds_packages_path = Some("/Volumes/Old".to_string());
        let mut console = ScriptedConsole::new(["", "", "A", "s", "", ""]);
        let mut catalog = Catalog::standard();

        let prefs = resolve(&mut console, &mut catalog, Some(stored), true, "me").expect("resolve");

        assert_eq!(prefs.ds_packages_path.as_deref(), Some("/Volumes/Old"));
        assert_eq!(prefs.follow_official_jss, Some(true));
        assert_eq!(prefs.enabled_types.len(), catalog.iter().count());
        assert!(console.prompts().iter().any(|prompt| prompt.contains("[/Volumes/Old]")));
    }

    #[test]
    fn yes_no_reprompts_on_nonsense() {
        let mut console = ScriptedConsole::new(["maybe", "yes"]);
        assert!(prompt_yes_no(&mut console, "Sure?", false).expect("answer"));
        assert_eq!(console.count(Tone::Warning), 1);
    }
}
