//! valikit - build and release utilities for Vali userspace packaging.
//!
//! Two modes:
//! - `cp`   : recursive pattern-based directory mirror used by install steps
//! - `pack` : consume CI artifact archives and hand the resolved version to
//!   the makefile packager

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use valikit_io_fs::{SpecMirrorOptions, mirror_tree};
use valikit_pack::{SpecIntakeOptions, intake_artifacts, invoke_packager};

#[derive(Parser)]
#[command(name = "valikit")]
#[command(about = "Installation utilities for building and releasing userspace apps for Vali")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recursively copy files matching a pattern into a destination tree
    Cp {
        /// Source directory
        #[arg(long)]
        source: PathBuf,

        /// Destination directory
        #[arg(long)]
        dest: PathBuf,

        /// Basename pattern applied at every depth
        #[arg(long, default_value = "*")]
        pattern: String,

        /// Replace destination files that already exist
        #[arg(long)]
        overwrite: bool,

        /// Plan the copy without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Unpack CI artifact archives and invoke the makefile packager
    Pack {
        /// Directory the CI run dropped the zip archives into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Cp {
            source,
            dest,
            pattern,
            overwrite,
            dry_run,
        } => run_cp(source, dest, pattern, overwrite, dry_run),
        Command::Pack { dir } => run_pack(dir),
    }
}

fn run_cp(
    source: PathBuf,
    dest: PathBuf,
    pattern: String,
    overwrite: bool,
    dry_run: bool,
) -> Result<()> {
    let spec_mirror_options = SpecMirrorOptions {
        pattern: Some(pattern),
        if_overwrite: overwrite,
        if_dry_run: dry_run,
        ..SpecMirrorOptions::default()
    };

    let report = mirror_tree(&source, &dest, spec_mirror_options)
        .with_context(|| format!("cp {} -> {}", source.display(), dest.display()))?;
    for warning in &report.warnings {
        eprintln!("valikit: {warning}");
    }
    println!("{report}");
    Ok(())
}

fn run_pack(dir: PathBuf) -> Result<()> {
    let spec_intake_options = SpecIntakeOptions::from_env()?;
    let report = intake_artifacts(&dir, &spec_intake_options)
        .with_context(|| format!("pack {}", dir.display()))?;
    for warning in &report.warnings {
        eprintln!("valikit: {warning}");
    }
    println!("{report}");

    let Some(version) = report.version else {
        bail!("no version captured from the OS archive");
    };
    let status = invoke_packager(&version)?;
    if !status.success() {
        bail!("packager exited with {status}");
    }
    Ok(())
}
