/// Preview: generate names from a preset or a theme and inspect their scores.
///
/// Usage: preview [--preset <id> | --theme <name>] [--count <n>] [--seed <n>]
///                [--detailed | --json] [--shell] [--verbose]
///
/// Shell commands:
///   gen [n]          generate n names (default 5)
///   detail           generate one name with per-block scores
///   preset <id>      switch to a preset
///   theme <name>     switch theme, keeping other settings
///   seed <n>         reseed the RNG
///   presets          list presets
///   themes           list themes
///   help             list commands
///   quit             exit

use clap::Parser;
use fantasy_namegen::core::generator::{GeneratedName, NameGenerator};
use fantasy_namegen::presets::PresetCatalog;
use fantasy_namegen::schema::request::GenerationRequest;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "preview")]
#[command(about = "Generate fantasy names from the shipped theme data", long_about = None)]
struct Cli {
    /// Theme data directory (one `<theme>/blocks.ron` per theme)
    #[arg(long, default_value = "theme_data")]
    themes: PathBuf,

    /// Pair penalty table
    #[arg(long, default_value = "theme_data/pair_penalties.ron")]
    pairs: PathBuf,

    /// Preset to start from
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// Override the preset's theme
    #[arg(short, long)]
    theme: Option<String>,

    /// Names to generate
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Print per-block scores
    #[arg(short, long)]
    detailed: bool,

    /// Print the batch as JSON, with per-block scores
    #[arg(long, conflicts_with = "detailed")]
    json: bool,

    /// Start an interactive shell after the first batch
    #[arg(long)]
    shell: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let generator = match NameGenerator::builder()
        .themes_dir(&cli.themes)
        .pair_penalties(&cli.pairs)
        .build()
    {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    let presets = match PresetCatalog::builtin() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut request = match presets.get(&cli.preset) {
        Ok(p) => p.request.clone(),
        Err(e) => {
            eprintln!("ERROR: {} (available: {})", e, presets.ids().join(", "));
            process::exit(1);
        }
    };
    if let Some(theme) = cli.theme {
        request.theme = theme;
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    if cli.json {
        print_json(&generator, &request, cli.count, &mut rng);
        return;
    }
    println!("Theme: {}  Seed: {}\n", request.theme, cli.seed);
    generate_batch(&generator, &request, cli.count, cli.detailed, &mut rng);

    if cli.shell {
        run_shell(&generator, &presets, request, rng);
    }
}

fn generate_batch(
    generator: &NameGenerator,
    request: &GenerationRequest,
    count: usize,
    detailed: bool,
    rng: &mut StdRng,
) {
    for i in 0..count {
        match generator.generate_detailed(request, rng) {
            Ok(name) if detailed => print_detail(i + 1, &name),
            Ok(name) => println!("{:>3}. {}", i + 1, name.name),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return;
            }
        }
    }
}

fn print_json(generator: &NameGenerator, request: &GenerationRequest, count: usize, rng: &mut StdRng) {
    let names: Result<Vec<GeneratedName>, _> = (0..count)
        .map(|_| generator.generate_detailed(request, rng))
        .collect();
    let output = names
        .map_err(|e| e.to_string())
        .and_then(|names| serde_json::to_string_pretty(&names).map_err(|e| e.to_string()));
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }
}

fn print_detail(index: usize, name: &GeneratedName) {
    println!(
        "{:>3}. {:<20} avg {:>5.1}  low {:>5.1}{}",
        index,
        name.name,
        name.average_score,
        name.lowest_score,
        if name.was_forced { "  (forced)" } else { "" }
    );
    for score in &name.scores {
        println!(
            "       {:<7} {:<8} vibe {:>5.1}  compat {:>5.1}  final {:>5.1}{}",
            score.role,
            score.text,
            score.vibe_score,
            score.compat_score,
            score.final_score,
            if score.forced { "  *" } else { "" }
        );
    }
}

fn run_shell(
    generator: &NameGenerator,
    presets: &PresetCatalog,
    mut request: GenerationRequest,
    mut rng: StdRng,
) {
    println!("\nType 'help' for commands.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(cmd) = parts.first() else {
            continue;
        };

        match cmd.to_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "help" | "h" | "?" => print_help(),
            "gen" | "g" => {
                let n = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(5);
                generate_batch(generator, &request, n, false, &mut rng);
            }
            "detail" | "d" => generate_batch(generator, &request, 1, true, &mut rng),
            "preset" if parts.len() == 2 => match presets.get(parts[1]) {
                Ok(p) => {
                    request = p.request.clone();
                    println!("Preset: {} (theme {})", p.label, request.theme);
                }
                Err(e) => println!("{}", e),
            },
            "theme" if parts.len() == 2 => {
                request.theme = parts[1].to_string();
                println!("Theme: {}", request.theme);
            }
            "seed" if parts.len() == 2 => match parts[1].parse::<u64>() {
                Ok(seed) => {
                    rng = StdRng::seed_from_u64(seed);
                    println!("Seed: {}", seed);
                }
                Err(_) => println!("Seed must be a number"),
            },
            "presets" => println!("{}", presets.ids().join(", ")),
            "themes" => println!("{}", generator.catalog().themes().join(", ")),
            _ => println!("Unknown command: {}. Type 'help'.", line.trim()),
        }
    }
}

fn print_help() {
    println!("  gen [n]          generate n names (default 5)");
    println!("  detail           one name with per-block scores");
    println!("  preset <id>      switch to a preset");
    println!("  theme <name>     switch theme");
    println!("  seed <n>         reseed the RNG");
    println!("  presets | themes list what is available");
    println!("  quit             exit");
}
