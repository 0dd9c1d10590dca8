use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use vcs_overlay::commands::*;
use vcs_overlay::core::{
    error::{Result, VcsOverlayError},
    print_error,
};

#[derive(Parser)]
#[command(name = "vcs-overlay")]
#[command(about = "Version-control status overlays and file actions for project trees")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the overlay of every changed path
    Status {
        /// Directory or file to report on (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Print overlay changes of a directory's entries as they happen
    Watch {
        /// Directory to watch (defaults to the current directory)
        dir: Option<PathBuf>,
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Delete files, through version control when they are versioned
    Rm {
        /// Skip the version-control confirmation and delete from disk only
        #[arg(long = "no-confirm")]
        no_confirm: bool,
        /// Answer yes to every question
        #[arg(short = 'y', long = "yes")]
        yes: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Move a file or directory and offer to commit the move
    Mv {
        /// Answer yes to every question
        #[arg(short = 'y', long = "yes")]
        yes: bool,
        from: PathBuf,
        to: PathBuf,
    },
    /// Commit paths, one commit per working copy
    Commit {
        /// Commit message
        #[arg(short = 'm', long = "message")]
        message: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        if let VcsOverlayError::NotUnderVersionControl { .. } = e {
            print_error("Not under version control");
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match cli.command {
        Commands::Status { path } => report(execute_status(path)),
        Commands::Watch { dir, seconds } => report(execute_watch(dir, seconds)),
        Commands::Rm {
            no_confirm,
            yes,
            paths,
        } => report(execute_rm(paths, !no_confirm, yes)),
        Commands::Mv { yes, from, to } => report(execute_mv(from, to, yes)),
        Commands::Commit { message, paths } => report(execute_commit(message, paths)),
    }
}
