use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use typeray::checker::{render_report, FileAnalyzer};

/// TypeRay - graph-based type inference for Ruby
#[derive(Parser)]
#[command(name = "typeray")]
#[command(about = "Infer and print Ruby type signatures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer types for a Ruby file and print the signature report
    Check {
        /// Ruby file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also print the raw type-vertex table
        #[arg(short, long)]
        verbose: bool,
    },

    /// Watch a Ruby file and re-analyze on changes
    Watch {
        /// Ruby file to watch
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    // Logging is opt-in via RUST_LOG so normal output stays clean
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, verbose } => {
            check_file(&file, verbose)?;
        }
        Commands::Watch { file } => {
            watch_file(&file)?;
        }
        Commands::Version => {
            println!("TypeRay {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn check_file(file_path: &PathBuf, verbose: bool) -> Result<()> {
    let analysis = FileAnalyzer::analyze_file(file_path)?;

    let report = render_report(&analysis);
    if report.is_empty() {
        println!("{}: nothing to report", file_path.display());
    } else {
        println!("{}", report);
    }

    if verbose {
        println!();
        for vertex in analysis.genv.type_vertex_registry.all() {
            let deps: Vec<String> = vertex
                .dependencies
                .iter()
                .map(|dep| dep.0.to_string())
                .collect();
            println!(
                "#{:<4} {:<28} scope={} deps=[{}] : {}",
                vertex.id.0,
                vertex.name,
                vertex.scope,
                deps.join(", "),
                analysis.genv.infer_vertex(vertex.id).to_ts()
            );
        }
    }

    Ok(())
}

fn watch_file(file_path: &PathBuf) -> Result<()> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    println!(
        "Watching {} for changes (Press Ctrl+C to stop)",
        file_path.display()
    );
    println!();

    if let Err(e) = check_file(file_path, false) {
        eprintln!("Error during initial check: {}", e);
    }

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )?;

    watcher.watch(file_path.as_ref(), RecursiveMode::NonRecursive)?;

    loop {
        match rx.recv() {
            Ok(event) => {
                if let notify::EventKind::Modify(_) = event.kind {
                    println!("\n--- File changed, re-analyzing... ---\n");

                    // Small delay so the file is fully written
                    std::thread::sleep(Duration::from_millis(100));

                    if let Err(e) = check_file(file_path, false) {
                        eprintln!("Error during check: {}", e);
                    }
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
