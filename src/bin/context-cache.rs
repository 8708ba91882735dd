//! Operator CLI for the context cache: inspect, reset, and exercise it.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use context_cache::cache::{
    CacheConfig, CacheLookup, CacheManager, ConfigOverrides, ResetOutcome, ResetTarget,
};
use context_cache::document::{ContextCollector, DEFAULT_MAX_BYTES};
use context_cache::selection::SpecExpander;

/// `get` exit status when the request is not served from cache.
const MISS_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "context-cache", version, about = "Inspect and manage the file context cache")]
struct Cli {
    /// Cache directory (overrides CONTEXT_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Maximum files cached per session
    #[arg(long, global = true)]
    max_files: Option<usize>,

    /// Maximum sessions kept
    #[arg(long, global = true)]
    max_sessions: Option<usize>,

    /// Hours of inactivity before a session expires
    #[arg(long, global = true)]
    timeout_hours: Option<u64>,

    /// Emit JSON instead of text where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show cache statistics and the session inventory
    Stats,
    /// List sessions, most recently used first
    List,
    /// Drop one session by id, or every session with "all"
    Reset { target: String },
    /// Print cached context on a hit; exit 2 on a miss
    Get(ContextArgs),
    /// Read context from disk, cache it, and print it
    Put(PutArgs),
}

#[derive(Debug, Args)]
struct ContextArgs {
    /// Goal text; part of the session identity, taken verbatim
    #[arg(long)]
    goal: String,

    /// File, directory or glob selector (repeatable)
    #[arg(long = "spec", required = true)]
    specs: Vec<String>,

    /// Repository root the selectors are relative to
    #[arg(long, default_value = ".")]
    repo: PathBuf,
}

#[derive(Debug, Args)]
struct PutArgs {
    #[command(flatten)]
    context: ContextArgs,

    /// Per-file read limit before truncation
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: usize,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("context_cache=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn config_from(cli: &Cli) -> CacheConfig {
    CacheConfig::from_env().with_overrides(&ConfigOverrides {
        cache_dir: cli.cache_dir.clone(),
        max_files_per_session: cli.max_files,
        max_sessions: cli.max_sessions,
        session_timeout_hours: cli.timeout_hours,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_sessions(manager: &CacheManager) {
    let sessions = manager.list_sessions();
    if sessions.is_empty() {
        println!("No cache sessions found");
        return;
    }
    println!("Cache sessions:");
    for summary in sessions {
        println!("{summary}");
        println!();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let mut manager = CacheManager::open(config_from(&cli));

    match &cli.command {
        Command::Stats => {
            if cli.json {
                return print_json(&manager.cache_stats());
            }
            print_sessions(&manager);
            println!("{}", manager.cache_stats());
            ExitCode::SUCCESS
        }
        Command::List => {
            if cli.json {
                return print_json(&manager.list_sessions());
            }
            print_sessions(&manager);
            ExitCode::SUCCESS
        }
        Command::Reset { target } => {
            let target: ResetTarget = match target.parse() {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match manager.reset_cache(&target) {
                ResetOutcome::Cleared { sessions } => {
                    println!("Reset all cache sessions ({sessions} removed)");
                    ExitCode::SUCCESS
                }
                ResetOutcome::Removed(id) => {
                    println!("Reset cache for session {id}");
                    ExitCode::SUCCESS
                }
                ResetOutcome::NotFound(id) => {
                    eprintln!("Session {id} not found");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Get(args) => {
            match manager.get_cached_context(&args.repo, &args.specs, &args.goal) {
                CacheLookup::Hit(hit) => {
                    print!("{}", hit.content);
                    ExitCode::SUCCESS
                }
                CacheLookup::Miss(miss) => {
                    eprintln!(
                        "cache miss for session {}: {} missing, {} changed",
                        miss.session_id,
                        miss.missing.len(),
                        miss.changed.len()
                    );
                    ExitCode::from(MISS_EXIT_CODE)
                }
            }
        }
        Command::Put(args) => {
            let ctx = &args.context;
            let expander = SpecExpander::default().excluding(&manager.config().cache_dir);
            let collector = ContextCollector::new(expander, args.max_bytes);
            let content = collector
                .collect(&ctx.repo, &ctx.specs, manager.config().selector_limit)
                .render();

            let write = manager.cache_context(&ctx.repo, &ctx.specs, &ctx.goal, &content);
            eprintln!(
                "cached {} files in session {}{}",
                write.files_cached,
                write.session_id,
                if write.persisted { "" } else { " (not persisted)" }
            );
            print!("{content}");
            ExitCode::SUCCESS
        }
    }
}
