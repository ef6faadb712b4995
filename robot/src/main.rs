//! `recipe-robot`: create recipes for an app, update feed, or download URL.

use anyhow::Result;
use clap::Parser;

use robot::cli::Args;
use robot::exit_codes;
use robot::io::console::StdConsole;
use robot::io::generate::TemplateGenerator;
use robot::io::inspect::InputInspector;
use robot::io::paths::RobotPaths;
use robot::logging::{self, Verbosity};
use robot::pipeline::Pipeline;

fn main() {
    let args = Args::parse();
    logging::init(Verbosity::from_flags(args.verbose, args.debug));
    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run(args: Args) -> Result<i32> {
    let paths = RobotPaths::from_env()?;
    let mut console = StdConsole::new(args.app_mode, args.is_verbose());
    let generator = TemplateGenerator::new()?;
    let status = Pipeline::new(paths, &mut console, &InputInspector, &generator)
        .watch_interrupts(true)
        .run(args);
    Ok(status.exit_code())
}
