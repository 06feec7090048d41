/// Catalog Linter: validates theme block data and the pair penalty table.
///
/// Usage: catalog_linter <theme_dir> [--pairs <file>]

use clap::Parser;
use fantasy_namegen::core::catalog::ThemeBlocks;
use fantasy_namegen::core::pairs::PairPenaltyTable;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "catalog_linter")]
#[command(about = "Check theme block files for bad ratings, duplicates and empty pools", long_about = None)]
struct Cli {
    /// Directory with one `<theme>/blocks.ron` per theme, or a single blocks file
    path: PathBuf,

    /// Pair penalty table to validate as well
    #[arg(long)]
    pairs: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let files = match theme_files(&cli.path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut themes = 0;
    let mut blocks = 0;

    for file in &files {
        match ThemeBlocks::load_from_ron(file) {
            Ok(theme) => {
                themes += 1;
                blocks += theme.len();
                warnings.extend(theme.lint().into_iter().map(|issue| issue.to_string()));
            }
            Err(e) => errors.push(format!("{}: {}", file.display(), e)),
        }
    }

    if let Some(ref path) = cli.pairs {
        match PairPenaltyTable::load_from_ron(path) {
            Ok(table) => {
                println!("Loaded {} pair penalties", table.len());
                if table.is_empty() {
                    warnings.push(format!("{}: pair table is empty", path.display()));
                }
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    println!("Loaded {} themes, {} blocks", themes, blocks);
    println!("\n=== Catalog Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }
    println!("\nSummary: {} errors, {} warnings", errors.len(), warnings.len());

    if !errors.is_empty() || !warnings.is_empty() {
        process::exit(1);
    }
}

fn theme_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let candidate = entry?.path().join("blocks.ron");
        if candidate.is_file() {
            files.push(candidate);
        }
    }
    files.sort();
    Ok(files)
}
