mod enrich;
mod error;
mod fetch;
mod movie;
mod parser;
mod pipeline;
mod settings;
mod tmdb;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;

use fetch::HttpPageSource;
use movie::MovieRecord;
use parser::Extraction;
use settings::Settings;
use tmdb::TmdbClient;

#[derive(Parser)]
#[command(name = "list_picker", about = "Pull the films off a Letterboxd list and pick one")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every film on a list
    List {
        /// List or watchlist URL
        url: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Skip TMDB poster lookups even if TMDB_API_KEY is set
        #[arg(long)]
        no_enrich: bool,
    },
    /// Pick one film from a list at random
    Pick {
        /// List or watchlist URL
        url: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Skip TMDB poster lookups even if TMDB_API_KEY is set
        #[arg(long)]
        no_enrich: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::List { url, json, no_enrich } => {
            let found = load_list(&url, &settings, no_enrich).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&found.movies)?);
                return Ok(());
            }

            println!(
                "{:>3} | {:<40} | {:<10} | {:<24} | {:<6}",
                "#", "Title", "Year", "Director", "Poster"
            );
            println!("{}", "-".repeat(95));
            for (i, m) in found.movies.iter().enumerate() {
                println!(
                    "{:>3} | {:<40} | {:<10} | {:<24} | {:<6}",
                    i + 1,
                    truncate(&m.title, 40),
                    truncate(&m.year, 10),
                    truncate(&m.director, 24),
                    if m.poster.is_empty() { "-" } else { "yes" },
                );
            }
            println!("\n{} films (via {})", found.movies.len(), found.strategy);
        }
        Commands::Pick { url, json, no_enrich } => {
            let found = load_list(&url, &settings, no_enrich).await?;
            let Some(choice) = found.movies.choose(&mut rand::thread_rng()) else {
                anyhow::bail!("List is empty");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(choice)?);
            } else {
                print_choice(choice, found.movies.len());
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

async fn load_list(url: &str, settings: &Settings, no_enrich: bool) -> anyhow::Result<Extraction> {
    let source = HttpPageSource::new(settings.user_agent.as_str());
    let tmdb = if no_enrich {
        None
    } else {
        TmdbClient::from_settings(settings)
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(format!("Reading {}", url.trim()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline::run(url, &source, tmdb.as_ref(), settings.pacing).await;
    pb.finish_and_clear();

    result.map_err(|e| {
        let status = e.status_code();
        anyhow::Error::new(e).context(format!("Could not load {} (status {})", url.trim(), status))
    })
}

fn print_choice(m: &MovieRecord, out_of: usize) {
    if m.year.is_empty() {
        println!("{}", m.title);
    } else {
        println!("{} ({})", m.title, m.year);
    }
    if !m.director.is_empty() {
        println!("  Directed by {}", m.director);
    }
    if !m.poster.is_empty() {
        println!("  Poster: {}", m.poster);
    }
    if !m.link.is_empty() {
        println!("  {}", m.link);
    }
    println!("\nPicked 1 of {} films.", out_of);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
