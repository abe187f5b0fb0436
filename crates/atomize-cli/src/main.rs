use anyhow::{Context, Result};
use atomize_core::ast::TranslationUnit;
use atomize_core::graph::{describe, DeclAtLevel, EquivalenceGraph};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atomize")]
#[command(about = "Insert _Atomic qualifiers into C sources via equivalence propagation")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one C file, seed an upgrade, and write the rewritten source.
    Upgrade {
        input: PathBuf,

        /// Where the rewritten source is written.
        #[arg(short, long)]
        output: PathBuf,

        /// Seed the upgrade at this declaration instead of drawing one at random.
        #[arg(long)]
        name: Option<String>,

        /// Seed value for the random declaration draw; defaults to fresh entropy.
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON summary of the run next to the rewritten source.
        #[arg(long)]
        report: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the declarations and equivalence edges without rewriting anything.
    Analyze {
        input: PathBuf,

        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upgrade {
            input,
            output,
            name,
            seed,
            report,
            verbose,
        } => cmd_upgrade(input, output, name, seed, report, verbose),
        Commands::Analyze { input, verbose } => cmd_analyze(input, verbose),
    }
}

fn cmd_upgrade(
    input: PathBuf,
    output: PathBuf,
    name: Option<String>,
    seed: Option<u64>,
    report: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    use atomize_core::{propagate, select_seed, EquivalenceBuilder, UpgradeReport};
    use atomize_frontend::parse_translation_unit;
    use colored::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::time::Instant;

    if verbose {
        println!("{}", " Atomize".bright_blue().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!(" Input: {}", input.display());
        println!(" Output: {}", output.display());
        if let Some(ref name) = name {
            println!(" Seed declaration: {name}");
        }
        println!();
    }

    let start = Instant::now();

    if verbose {
        println!(" Loading C source...");
    }
    let source = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    if verbose {
        println!(" Parsing translation unit...");
    }
    let unit = parse_translation_unit(&source)?;

    if verbose {
        println!(" Building equivalence graph...");
    }
    let graph = EquivalenceBuilder::build(&unit)?;
    print_equivalences(&unit, &graph);

    let seed_value = seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed_value);
    let seed_decl = select_seed(&unit, name.as_deref(), &mut rng)?;
    eprintln!("Using seed {seed_value}");
    eprintln!("Initially upgrading {}", unit.decl(seed_decl).name);

    let upgrades = propagate(&unit, &graph, seed_decl)?;
    for step in &upgrades.trace {
        eprintln!("Propagating upgrade {} {}", step.name, step.level);
    }
    eprintln!("Upgrades:");
    for (decl, level) in upgrades.iter() {
        eprintln!("{} {}", unit.decl(decl).name, level);
    }

    if verbose {
        println!(" Rewriting declarations...");
    }
    let rewritten = atomize_rewrite::rewrite_source(&unit, &upgrades, &source)?;
    fs::write(&output, rewritten)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(report_path) = report {
        let summary = UpgradeReport::new(
            input.display().to_string(),
            seed_value,
            seed_decl,
            &unit,
            &graph,
            &upgrades,
        );
        let summary_json = serde_json::to_string_pretty(&summary)?;
        fs::write(&report_path, summary_json)
            .with_context(|| format!("failed to write {}", report_path.display()))?;
    }

    if verbose {
        let elapsed = start.elapsed();
        println!(
            "\n {} Upgraded {} declaration(s)",
            "SUCCESS:".bright_green().bold(),
            upgrades.len()
        );
        println!("   Time: {:.3}s", elapsed.as_secs_f64());
        println!("   Output: {}", output.display());
    }

    Ok(())
}

fn cmd_analyze(input: PathBuf, verbose: bool) -> Result<()> {
    use atomize_core::EquivalenceBuilder;
    use atomize_frontend::parse_translation_unit;
    use colored::*;
    use std::fs;

    if verbose {
        println!("{}", " Atomize Analysis".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());
        println!(" Input: {}", input.display());
        println!();
    }

    let source = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let unit = parse_translation_unit(&source)?;
    let graph = EquivalenceBuilder::build(&unit)?;

    println!(
        " {} declaration(s), {} equivalence edge(s)\n",
        unit.decl_count(),
        graph.edge_count()
    );
    for (decl, row) in graph.iter() {
        println!("{}", unit.decl(decl).name);
        for (&entry_level, edges) in row {
            for edge in edges {
                println!(
                    "   {} ~ {}",
                    describe(&unit, DeclAtLevel::new(decl, entry_level)),
                    describe(&unit, *edge)
                );
            }
        }
    }

    Ok(())
}

/// The diagnostic dump of every declaration's equivalence row, on the diagnostic stream.
fn print_equivalences(unit: &TranslationUnit, graph: &EquivalenceGraph) {
    for (decl, row) in graph.iter() {
        eprintln!("{}", unit.decl(decl).name);
        for (&entry_level, edges) in row {
            for edge in edges {
                eprintln!(
                    "   {} ~ {}",
                    describe(unit, DeclAtLevel::new(decl, entry_level)),
                    describe(unit, *edge)
                );
            }
        }
    }
}
