//! libjson command-line tool
//!
//! Generates `lib.json` marker documents and resolves declared modules and
//! executables from the marker files above a directory.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::Context;
use std::path::PathBuf;

/// Environment variable that turns on diagnostic output
const VERBOSE_ENV: &str = "VERBOSE";

#[derive(Parser)]
#[command(name = "libjson")]
#[command(about = "Resolve package locations from lib.json marker files", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to work from instead of the current directory
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Print diagnostic messages to stderr
    #[arg(long, visible_alias = "debug", global = true)]
    verbose: bool,

    /// Resolve against an empty namespace when no marker file is found
    #[arg(long, global = true)]
    allow_missing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a marker document and print it as JSON
    From {
        #[command(subcommand)]
        source: FromSource,
    },

    /// Print the absolute path of a declared executable
    #[command(name = "resolve.bin")]
    ResolveBin {
        /// Executable name
        name: String,
    },

    /// Print the absolute path of a module
    #[command(name = "resolve.js")]
    ResolveJs {
        /// Module identifier (`name` or `name/sub/path`)
        name: String,
    },

    /// Print the derived module search path
    #[command(name = "node-path")]
    NodePath,
}

#[derive(Subcommand)]
enum FromSource {
    /// Scan the installed dependencies under ./node_modules
    #[command(name = "node_modules")]
    NodeModules,

    /// Scan the working directory and its ancestors for marker files
    Ancestors {
        /// File to look for and the category to record it under (FILE=CATEGORY)
        #[arg(long = "find", value_parser = commands::from::parse_lookup, required = true)]
        find: Vec<(String, String)>,
        /// Number of ancestor levels to scan above the working directory
        #[arg(long)]
        max_levels: Option<usize>,
        /// Directory below each level whose subdirectories are scanned
        #[arg(long)]
        sub_path: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = cli.verbose || std::env::var_os(VERBOSE_ENV).is_some_and(|v| !v.is_empty());
    logging::init(verbose);

    let ctx = match Context::new(cli.cwd, cli.allow_missing) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::From { source } => match source {
            FromSource::NodeModules => commands::from::node_modules(&ctx),
            FromSource::Ancestors {
                find,
                max_levels,
                sub_path,
            } => commands::from::ancestors(&ctx, &find, max_levels, sub_path),
        },
        Commands::ResolveBin { name } => commands::resolve::bin(&ctx, &name),
        Commands::ResolveJs { name } => commands::resolve::js(&ctx, &name),
        Commands::NodePath => commands::resolve::node_path(&ctx),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
