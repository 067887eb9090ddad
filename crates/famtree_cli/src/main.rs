//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `famtree_core` linkage.
//! - Optionally round-trip one GEDCOM file: import it, report counts on
//!   stderr and write the export to stdout.
//!
//! File I/O lives here so the core stays a pure text transform.

use clap::Parser;
use famtree_core::{ExportOptions, GedcomService, ImportOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// FamTree GEDCOM smoke tool.
///
/// Without a path, prints the core ping and version. With a path, imports the file and
/// writes its GEDCOM 5.5.5 re-export to stdout.
#[derive(Debug, Parser)]
#[command(name = "famtree", version)]
struct Args {
    /// GEDCOM file to import and re-export.
    path: Option<PathBuf>,

    /// Fail on the first malformed line or dangling reference.
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn import_options(&self) -> ImportOptions {
        if self.strict {
            ImportOptions::strict()
        } else {
            ImportOptions::default()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let Some(path) = args.path.as_deref() else {
        println!("famtree_core ping={}", famtree_core::ping());
        println!("famtree_core version={}", famtree_core::core_version());
        return ExitCode::SUCCESS;
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read `{}`: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let service = GedcomService::new(args.import_options(), ExportOptions::default());
    let outcome = match service.import_bytes(&bytes) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("import failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    eprintln!(
        "imported individuals={} families={} skipped_lines={} dangling_references={}",
        outcome.graph.individuals.len(),
        outcome.graph.families.len(),
        outcome.report.skipped_lines,
        outcome.report.dangling_references
    );

    match service.export(&outcome.graph) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::{CommandFactory, Parser};
    use std::path::Path;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_version_check_only() {
        let args = Args::try_parse_from(["famtree"]).unwrap();
        assert!(args.path.is_none());
        assert!(!args.import_options().is_strict());
    }

    #[test]
    fn strict_flag_selects_strict_import() {
        let args = Args::try_parse_from(["famtree", "--strict", "tree.ged"]).unwrap();
        assert_eq!(args.path.as_deref(), Some(Path::new("tree.ged")));
        assert!(args.import_options().is_strict());
    }
}
