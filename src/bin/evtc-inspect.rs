//! arcdps EVTC combat log inspector
//!
//! A command-line interface for looking inside EVTC logs.
//!
//! ## Commands
//!
//! - `info` - Display header and log metadata
//! - `events` - Dump decoded events
//! - `agents` - List participants and their masters
//!
//! Set `RUST_LOG=evtc=debug` to see decoder diagnostics on stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evtc::{AgentKind, Chain, ParseOptions};

/// arcdps EVTC combat log inspector
#[derive(Parser)]
#[command(name = "evtc-inspect")]
#[command(about = "arcdps EVTC combat log inspector", long_about = None)]
#[command(version)]
struct Cli {
    /// Drop records with unknown kinds instead of failing
    #[arg(long, global = true)]
    skip_unknown: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display log information
    Info {
        /// Path to the log file
        file: PathBuf,
    },
    /// Dump decoded events
    Events {
        /// Path to the log file
        file: PathBuf,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
        /// Stop after this many events
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List agents
    Agents {
        /// Path to the log file
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    arcdps_build: &'a str,
    boss_species: u16,
    boss_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    point_of_view: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    build_id: u64,
    world_id: u16,
    map_id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_start: Option<String>,
    agents: usize,
    skills: usize,
    events: usize,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let options = ParseOptions::new().skip_unknown(cli.skip_unknown);

    match cli.command {
        Commands::Info { file } => cmd_info(&file, &options),
        Commands::Events { file, json, limit } => cmd_events(&file, &options, json, limit),
        Commands::Agents { file } => cmd_agents(&file, &options),
    }
}

fn init_logging() {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn load(file: &Path, options: &ParseOptions) -> Option<Chain> {
    let reader = match File::open(file) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error opening file: {}", e);
            return None;
        }
    };

    match evtc::parse_reader_with(reader, options) {
        Ok(chain) => Some(chain),
        Err(e) => {
            eprintln!("Error parsing log: {}", e);
            if let Some(record) = e.record() {
                eprintln!("  at record time {}ms: {:?}", record.time, record);
            }
            None
        }
    }
}

fn cmd_info(file: &Path, options: &ParseOptions) -> ExitCode {
    let Some(chain) = load(file, options) else {
        return ExitCode::FAILURE;
    };

    let info = InfoOutput {
        arcdps_build: &chain.arcdps_build,
        boss_species: chain.boss_species,
        boss_name: &chain.boss_name,
        point_of_view: chain.recorder().map(|agent| agent.name.as_str()),
        language: chain.language.map(|language| language.to_string()),
        build_id: chain.build_id,
        world_id: chain.world_id,
        map_id: chain.map_id,
        log_start: chain.log_start().map(|start| start.server.to_rfc3339()),
        agents: chain.agents().len(),
        skills: chain.skills().len(),
        events: chain.events.len(),
    };

    match serde_json::to_string_pretty(&info) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing to JSON: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_events(file: &Path, options: &ParseOptions, json: bool, limit: Option<usize>) -> ExitCode {
    let Some(chain) = load(file, options) else {
        return ExitCode::FAILURE;
    };

    let limit = limit.unwrap_or(usize::MAX);
    for event in chain.events.iter().take(limit) {
        if json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", event);
        }
    }

    ExitCode::SUCCESS
}

fn cmd_agents(file: &Path, options: &ParseOptions) -> ExitCode {
    let Some(chain) = load(file, options) else {
        return ExitCode::FAILURE;
    };

    for agent in chain.agents().iter() {
        let kind = match agent.kind {
            AgentKind::Player {
                profession,
                elite_spec,
            } => format!("{} {}", profession, elite_spec).trim_end().to_string(),
            AgentKind::Npc { species_id } => format!("npc {}", species_id),
            AgentKind::Gadget { volatile_id } => format!("gadget {}", volatile_id),
        };

        print!("{:#018x}  {:<24} {:<24}", agent.address(), agent.name, kind);
        if let Some(master) = chain.master_of(agent.address()) {
            print!(" master={}", master.name);
        }
        println!();
    }

    ExitCode::SUCCESS
}
