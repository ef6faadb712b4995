//! Input inspection: work out what the user pointed us at.
//!
//! The [`Inspector`] trait decouples the pipeline from how facts are gathered.
//! [`InputInspector`] only looks at the input string and the local filesystem;
//! it never touches the network.

use std::path::Path;

use serde_json::json;
use tracing::{debug, info, instrument};

use crate::core::classifier::{InputKind, classify_input, guess_app_name};
use crate::error::{DomainError, Failure};
use crate::facts::Facts;
use crate::io::paths::expand_home;

/// Where a stored GitHub token is looked up when `--github-token` is given.
pub const GITHUB_TOKEN_PATH: &str = "~/.autopkg_gh_token";

/// Populates facts, warnings and errors from `facts.args.input_path`.
pub trait Inspector {
    fn inspect(&self, facts: &mut Facts) -> Result<(), Failure>;
}

#[derive(Debug, Default)]
pub struct InputInspector;

impl Inspector for InputInspector {
    #[instrument(skip_all)]
    fn inspect(&self, facts: &mut Facts) -> Result<(), Failure> {
        let Some(input) = facts.args.input_path.clone() else {
            return Err(Failure::domain("No input path was given"));
        };
        let kind = classify_input(&input);
        info!(input = %input, kind = kind.label(), "input classified");
        facts.set("input_path", input.as_str());
        facts.set("input_type", kind.label());

        match &kind {
            InputKind::AppBundle => inspect_app(&input, facts)?,
            InputKind::GithubRepo { owner, repo } => {
                facts.set("github_repo", json!({ "owner": owner, "repo": repo }));
                facts.set(
                    "download_url",
                    format!("https://github.com/{owner}/{repo}/releases/latest"),
                );
                if facts.args.github_token {
                    let found = expand_home(GITHUB_TOKEN_PATH).is_file();
                    debug!(found, "github token lookup");
                    facts.set("github_token_found", found);
                    if !found {
                        facts.warn(format!(
                            "--github-token was given but no token was found at {GITHUB_TOKEN_PATH}"
                        ));
                    }
                }
            }
            InputKind::UpdateFeed => {
                facts.set("sparkle_feed", input.as_str());
            }
            InputKind::DownloadUrl => {
                facts.set("download_url", input.as_str());
            }
            InputKind::Unknown => {
                return Err(DomainError::new(format!(
                    "Input path does not look like an app or a URL: {input}"
                ))
                .into());
            }
        }

        if facts.get("app_name").is_none() {
            match guess_app_name(&input, &kind) {
                Some(name) => facts.set("app_name", name),
                None => facts.error(format!("Could not work out the app name from {input}")),
            }
        }
        Ok(())
    }
}

fn inspect_app(input: &str, facts: &mut Facts) -> Result<(), Failure> {
    let path = expand_home(input.trim().trim_end_matches('/'));
    if !path.is_dir() {
        return Err(DomainError::new(format!("No app found at {}", path.display())).into());
    }
    facts.set("app_path", path.to_string_lossy().into_owned());
    if !has_info_plist(&path) {
        facts.warn(format!(
            "{} has no Contents/Info.plist; version details will be missing",
            path.display()
        ));
    }
    Ok(())
}

fn has_info_plist(app: &Path) -> bool {
    app.join("Contents").join("Info.plist").is_file()
}
