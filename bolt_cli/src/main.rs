//! # Bolt CLI
//!
//! Command-line front end for bolt_core.
//!
//! ```text
//! bolt analyze --input bracket.json [--json] [--csv-dir out]
//! bolt example [--json] [--csv-dir out]
//! bolt template
//! bolt                       # interactive prompts
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use bolt_core::file_io::{export_all_csv, load_input};
use bolt_core::geometry::GridLayout;
use bolt_core::results::{analyze, render_report, AnalysisInput};
use bolt_core::{CalcError, LoadCase};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bolt")]
#[command(version, about = "Bolt group shear and torsion analysis (elastic and ICR methods)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the bolt group described in a JSON input file.
    Analyze {
        /// Path to the analysis input (JSON).
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze the built-in reference bracket.
    Example {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print a JSON input template.
    Template,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Print the full analysis as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Write one CSV bolt force table per method into this directory.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze { input, output }) => load_input(&input).and_then(|i| run(&i, &output)),
        Some(Commands::Example { output }) => run(&AnalysisInput::reference(), &output),
        Some(Commands::Template) => template(),
        None => run(
            &interactive(),
            &OutputArgs {
                json: false,
                csv_dir: None,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
        if e.is_recoverable() {
            eprintln!();
            eprintln!("Hint: raise icr.max_iterations or relax icr.tolerance in the input file.");
        }
        std::process::exit(1);
    }
}

fn run(input: &AnalysisInput, output: &OutputArgs) -> Result<(), CalcError> {
    let analysis = analyze(input)?;

    if output.json {
        let json = serde_json::to_string_pretty(&analysis).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        println!("{}", json);
    } else {
        print!("{}", render_report(&analysis));
    }

    if let Some(dir) = &output.csv_dir {
        for path in export_all_csv(&analysis, dir)? {
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn template() -> Result<(), CalcError> {
    let json = serde_json::to_string_pretty(&AnalysisInput::reference()).map_err(|e| {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    })?;
    println!("{}", json);
    Ok(())
}

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return None;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return None;
    }
    Some(input.trim().to_string())
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_line(prompt)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn prompt_usize(prompt: &str, default: usize) -> usize {
    prompt_line(prompt)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Prompt for a rectangular grid and load, defaulting to the reference bracket.
fn interactive() -> AnalysisInput {
    let reference = AnalysisInput::reference();

    println!("Bolt Group Analysis");
    println!("===================");
    println!();

    let nx = prompt_usize("Bolts along X [2]: ", reference.layout.nx);
    let ny = prompt_usize("Bolts along Y [3]: ", reference.layout.ny);
    let width = prompt_f64("Width between outer columns (in) [3.0]: ", reference.layout.width);
    let height = prompt_f64("Height between outer rows (in) [6.0]: ", reference.layout.height);
    let vx = prompt_f64("Shear Vx (kips) [0.0]: ", reference.load.vx);
    let vy = prompt_f64("Shear Vy (kips) [-50.0]: ", reference.load.vy);
    let torsion = prompt_f64("Torsion T (kip-in, CCW +) [-200.0]: ", reference.load.torsion);
    let bolt_capacity = prompt_f64("Bolt capacity (kips) [17.9]: ", reference.bolt_capacity);
    println!();

    AnalysisInput {
        label: format!("{} x {} bolt group", nx, ny),
        layout: GridLayout {
            width,
            height,
            nx,
            ny,
            ..reference.layout
        },
        load: LoadCase::new(vx, vy, torsion),
        bolt_capacity,
        icr: reference.icr,
    }
}
