//! # cxcheck CLI Entry Point
//!
//! Parses CLI arguments using clap and routes each subcommand to its engine.
//! The exit code of `check` and `analyze` reflects whether any diagnostic was
//! produced, not just whether the run itself succeeded.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use cxcheck::analyze;
use cxcheck::asm;
use cxcheck::scenes;
use cxcheck::style;

#[derive(Parser)]
#[command(name = "cxcheck")]
#[command(
    about = "Compile-command driven style checks and static analysis for C/C++ source trees",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run clang-tidy, clang-format and include-guard checks over the tree
    Check {
        /// Source root directory
        source_dir: PathBuf,
        /// Build directory containing compile_commands.json
        build_dir: PathBuf,
        /// Project prefix for canonical include guard names
        #[arg(long, default_value = "PROJECT")]
        guard_prefix: String,
    },
    /// Run the Clang static analyzer over every compiled file
    Analyze {
        /// Source root directory
        source_dir: PathBuf,
        /// Build directory containing compile_commands.json
        build_dir: PathBuf,
    },
    /// Print the assembler the compiler generates for one source file
    Asm {
        /// Build directory containing compile_commands.json
        build_dir: PathBuf,
        /// Source file to compile to assembly
        source_file: PathBuf,
    },
    /// Download and checksum-verify the scene data archives
    FetchScenes {
        /// Directory archives are downloaded to
        download_dir: PathBuf,
        /// Directory archives are extracted into
        scenes_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            source_dir,
            build_dir,
            guard_prefix,
        } => style::style_check(&source_dir, &build_dir, &guard_prefix),
        Commands::Analyze {
            source_dir,
            build_dir,
        } => analyze::analyze(&source_dir, &build_dir),
        Commands::Asm {
            build_dir,
            source_file,
        } => asm::print_assembler(&build_dir, &source_file).map(|_| false),
        Commands::FetchScenes {
            download_dir,
            scenes_dir,
        } => scenes::download_scene_data(&download_dir, &scenes_dir).map(|_| false),
    };

    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {:#}", "x".red(), err);
            ExitCode::FAILURE
        }
    }
}
