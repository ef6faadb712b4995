//! Deterministic classification of the user's input.

use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

static GITHUB_REPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^https?://(?:www\.)?github\.com/",
        r"([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?(?:[/?#].*)?$",
    ))
    .expect("valid github regex")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(https?|ftp)://[^\s/]+").expect("valid url regex"));

static FEED_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(appcast|sparkle|\.xml$|\.rss$|/feed/?$)").expect("valid feed regex")
});

/// What kind of thing the input names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputKind {
    /// A local `.app` bundle path.
    AppBundle,
    /// A Sparkle-style update feed.
    UpdateFeed,
    /// A GitHub-hosted project.
    GithubRepo { owner: String, repo: String },
    /// Any other URL; assumed to point straight at a download.
    DownloadUrl,
    Unknown,
}

impl InputKind {
    /// Short stable label recorded as the `input_type` fact.
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::AppBundle => "app",
            InputKind::UpdateFeed => "sparkle_feed",
            InputKind::GithubRepo { .. } => "github_url",
            InputKind::DownloadUrl => "download_url",
            InputKind::Unknown => "unknown",
        }
    }
}

/// Classify `input`.
///
/// - `GithubRepo` for `github.com/<owner>/<repo>` URLs.
/// - `UpdateFeed` for URLs that look like an appcast.
/// - `DownloadUrl` for any other URL.
/// - `AppBundle` for paths ending in `.app` (optionally with a trailing `/`).
pub fn classify_input(input: &str) -> InputKind {
    let input = input.trim();
    if let Some(captures) = GITHUB_REPO.captures(input) {
        return InputKind::GithubRepo {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
        };
    }
    if URL.is_match(input) {
        if FEED_HINT.is_match(input) {
            return InputKind::UpdateFeed;
        }
        return InputKind::DownloadUrl;
    }
    if input.trim_end_matches('/').to_ascii_lowercase().ends_with(".app") {
        return InputKind::AppBundle;
    }
    InputKind::Unknown
}

/// Best guess at the app's name from the input alone.
///
/// Names that could not serve as a single directory component (`.`, `..`,
/// anything with a path separator) count as no guess.
pub fn guess_app_name(input: &str, kind: &InputKind) -> Option<String> {
    raw_app_name(input, kind).filter(|name| is_component(name))
}

fn is_component(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn raw_app_name(input: &str, kind: &InputKind) -> Option<String> {
    match kind {
        InputKind::GithubRepo { repo, .. } => Some(repo.clone()),
        InputKind::AppBundle => Path::new(input.trim().trim_end_matches('/'))
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        InputKind::DownloadUrl => {
            let path = input.split(['?', '#']).next().unwrap_or(input);
            let last = path.trim_end_matches('/').rsplit('/').next()?;
            let stem = last.split('.').next().unwrap_or(last);
            let name: String = stem
                .split(['-', '_'])
                .take_while(|part| !part.chars().next().is_some_and(|c| c.is_ascii_digit()))
                .collect::<Vec<_>>()
                .join(" ");
            (!name.is_empty()).then_some(name)
        }
        InputKind::UpdateFeed | InputKind::Unknown => None,
    }
}
