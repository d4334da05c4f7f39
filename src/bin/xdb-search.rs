//! xdb-search: CLI tool for querying xdb region files.

use clap::{Parser, Subcommand};
use ipxdb::{load_header_from_file, CachePolicy, Region};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xdb-search")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Look up IPv4 regions in xdb files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded file header
    Header {
        /// xdb file
        db: PathBuf,
    },

    /// Search one or more IPv4 addresses
    Search {
        /// xdb file
        db: PathBuf,

        /// Addresses to look up
        #[arg(required = true)]
        ips: Vec<String>,

        /// Cache policy: file, vectorIndex or content
        #[arg(short, long, default_value = "vectorIndex")]
        policy: CachePolicy,

        /// Print results as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    ip: &'a str,
    region: Option<Region>,
    io_count: usize,
    took_us: u128,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Header { db } => print_header(&db),
        Commands::Search {
            db,
            ips,
            policy,
            json,
        } => search(&db, &ips, policy, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_header(db: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let header = load_header_from_file(db)?;
    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}

fn search(
    db: &PathBuf,
    ips: &[String],
    policy: CachePolicy,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut searcher = policy.open(db)?;
    log::info!("Loaded {:?} with {} policy in {:?}", db, policy, started.elapsed());

    for ip in ips {
        let started = Instant::now();
        let payload = searcher.search(ip)?;
        let took_us = started.elapsed().as_micros();

        if json {
            let output = SearchOutput {
                ip,
                region: payload.as_deref().map(Region::from_payload),
                io_count: searcher.io_count(),
                took_us,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            let region = match &payload {
                Some(payload) => String::from_utf8_lossy(payload).into_owned(),
                None => "not found".to_string(),
            };
            println!(
                "{}\t{}\tio: {}\ttook: {}us",
                ip,
                region,
                searcher.io_count(),
                took_us
            );
        }
    }

    searcher.close();
    Ok(())
}
