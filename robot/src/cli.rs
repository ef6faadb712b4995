//! Command-line surface for `recipe-robot`.

use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[command(
    name = "recipe-robot",
    version,
    about = "Generate AutoPkg recipes for an app, feed, or download URL"
)]
pub struct Args {
    /// App bundle path, update feed URL, GitHub repository URL, or download URL.
    pub input_path: Option<String>,

    /// Suppress colored output (for use by a wrapping app).
    #[arg(long)]
    pub app_mode: bool,

    /// Reconfigure preferences interactively.
    #[arg(short, long)]
    pub config: bool,

    /// Verbose output plus a full state dump at exit.
    #[arg(long)]
    pub debug: bool,

    /// Build recipes even if they already exist.
    #[arg(long)]
    pub ignore_existing: bool,

    /// Keep the scratch cache directory after the run.
    #[arg(long)]
    pub keep_cache: bool,

    /// Allow use of a stored GitHub token for GitHub-hosted projects.
    #[arg(long)]
    pub github_token: bool,

    /// Extra progress output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// True when there is something to do: an input to inspect or a reconfiguration.
    pub fn has_work(&self) -> bool {
        self.input_path.is_some() || self.config
    }

    /// `--debug` implies verbose output.
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_and_flags() {
        let args = Args::parse_from([
            "recipe-robot",
            "https://github.com/owner/Thing",
            "--keep-cache",
            "-v",
        ]);
        assert_eq!(
            args.input_path.as_deref(),
            Some("https://github.com/owner/Thing")
        );
        assert!(args.keep_cache);
        assert!(args.verbose);
        assert!(!args.config);
        assert!(args.has_work());
    }

    #[test]
    fn parse_config_only() {
        let args = Args::parse_from(["recipe-robot", "-c"]);
        assert!(args.config);
        assert!(args.input_path.is_none());
        assert!(args.has_work());
    }

    #[test]
    fn bare_invocation_has_no_work() {
        let args = Args::parse_from(["recipe-robot"]);
        assert!(!args.has_work());
    }

    #[test]
    fn debug_implies_verbose() {
        let args = Args::parse_from(["recipe-robot", "--debug", "Foo.app"]);
        assert!(args.is_verbose());
    }
}
