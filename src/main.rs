/// Symex CLI (symex)
/// Drives the symbolic execution engine over the internal SSA text format
/// and manages persisted engine configuration.
use clap::{Parser as ClapParser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;

use symex::config::{default_config_path, EngineConfig, QueueStrategy};
use symex::engine::queue::{BfsQueue, DfsQueue, Queue, RandomQueue};
use symex::engine::static_encoder;
use symex::engine::translate::run_function;
use symex::reify::emit_test;
use symex::smt::solver::SolverGlue;
use symex::ssa::text::parse_function;

// 64 MB stack — deep interprocedural call chains shouldn't blow the main thread.
const STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(ClapParser)]
#[command(
    name = "symex",
    version = "0.1.0",
    about = "Path-sensitive symbolic execution test generator",
    long_about = "symex — explore a function's SSA control-flow graph and emit unit tests covering each feasible path."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore a function read from the internal SSA text format and emit tests
    Run {
        path: PathBuf,
        /// Path exploration order
        #[arg(long, value_enum)]
        queue: Option<QueueArg>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Use the static (whole-function, no-pruning) encoder instead of
        /// exploring paths one at a time
        #[arg(long)]
        r#static: bool,
    },
    /// Manage engine configuration (~/.symex/conf.toml)
    Conf {
        #[command(subcommand)]
        cmd: ConfCommands,
    },
}

#[derive(Copy, Clone, clap::ValueEnum)]
enum QueueArg {
    Random,
    Bfs,
    Dfs,
}

#[derive(Subcommand)]
enum ConfCommands {
    /// Set a property: symex conf set max_depth=256
    Set { spec: String },
    /// Get a property: symex conf get max_depth
    Get { key: String },
    /// List all properties with current values
    List,
    /// Reset all properties to their defaults
    Reset,
    /// Show detailed documentation for a property
    Describe { key: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = std::thread::Builder::new()
        .name("symex-worker".into())
        .stack_size(STACK_SIZE)
        .spawn(move || std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(cli))))
        .expect("failed to spawn symex worker thread")
        .join();

    match result {
        Ok(Ok(inner)) => inner,
        Ok(Err(panic_payload)) | Err(panic_payload) => {
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                format!("internal error (panic): {s}")
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                format!("internal error (panic): {s}")
            } else {
                "internal error: unexpected panic in symex".to_string()
            };
            eprintln!("symex crashed: {msg}");
            Err(miette::miette!("{}", msg))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    env_logger::try_init().ok();

    match cli.command {
        Commands::Run { path, queue, seed, max_depth, timeout_secs, r#static } => {
            let cfg = EngineConfig::load_or_default(&default_config_path());
            let source = std::fs::read_to_string(&path).map_err(|e| miette::miette!("cannot read '{}': {e}", path.display()))?;
            let func = parse_function(&source).map_err(|e| miette::miette!("{e}"))?;

            if r#static {
                let formula = static_encoder::encode_function(&func).map_err(|e| miette::miette!("{e}"))?;
                log::info!("static formula for '{}' encoded with {} top-level conjuncts", func.name, match &formula {
                    symex::Formula::And(parts) => parts.len(),
                    _ => 1,
                });
                println!("{formula:#?}");
                return Ok(());
            }

            let effective_seed = seed.unwrap_or(cfg.seed);
            let mut q: Box<dyn Queue> = match queue.unwrap_or(match cfg.queue {
                QueueStrategy::Random => QueueArg::Random,
                QueueStrategy::Bfs => QueueArg::Bfs,
                QueueStrategy::Dfs => QueueArg::Dfs,
            }) {
                QueueArg::Random => Box::new(RandomQueue::new(effective_seed)),
                QueueArg::Bfs => Box::new(BfsQueue::new()),
                QueueArg::Dfs => Box::new(DfsQueue::new()),
            };

            let mut solver = SolverGlue::spawn(&cfg.solver_binary, timeout_secs.unwrap_or(cfg.timeout_secs))
                .map_err(|e| miette::miette!("{e}"))?;

            let functions = vec![func];
            let outcome = run_function(&functions, 0, q.as_mut(), &mut solver, max_depth.unwrap_or(cfg.max_depth))
                .map_err(|e| miette::miette!("{e}"))?;

            log::info!("{} feasible paths, {} abandoned", outcome.testcases.len(), outcome.abandoned);
            for (i, tc) in outcome.testcases.iter().enumerate() {
                let src = emit_test(tc, i).map_err(|e| miette::miette!("{e}"))?;
                print!("{src}");
            }
            std::io::stdout().flush().into_diagnostic()?;
        }

        Commands::Conf { cmd } => {
            let path = default_config_path();
            match cmd {
                ConfCommands::Set { spec } => cmd_conf_set(&path, &spec)?,
                ConfCommands::Get { key } => cmd_conf_get(&path, &key)?,
                ConfCommands::List => cmd_conf_list(&path),
                ConfCommands::Reset => cmd_conf_reset(&path)?,
                ConfCommands::Describe { key } => cmd_conf_describe(&key),
            }
        }
    }

    Ok(())
}

fn cmd_conf_set(path: &std::path::Path, spec: &str) -> Result<()> {
    let (key, value) = spec.split_once('=').ok_or_else(|| miette::miette!("expected key=value, got '{spec}'"))?;
    let mut cfg = EngineConfig::load_or_default(path);
    match key {
        "max_depth" => cfg.max_depth = value.parse().into_diagnostic()?,
        "timeout_secs" => cfg.timeout_secs = value.parse().into_diagnostic()?,
        "seed" => cfg.seed = value.parse().into_diagnostic()?,
        "solver_binary" => cfg.solver_binary = value.to_string(),
        "queue" => {
            cfg.queue = match value {
                "random" => QueueStrategy::Random,
                "bfs" => QueueStrategy::Bfs,
                "dfs" => QueueStrategy::Dfs,
                other => return Err(miette::miette!("unknown queue strategy '{other}'")),
            }
        }
        other => return Err(miette::miette!("unknown property '{other}'")),
    }
    cfg.save(path).map_err(|e| miette::miette!("{e}"))?;
    println!("set {key} = {value}");
    Ok(())
}

fn cmd_conf_get(path: &std::path::Path, key: &str) -> Result<()> {
    let cfg = EngineConfig::load_or_default(path);
    let value = match key {
        "max_depth" => cfg.max_depth.to_string(),
        "timeout_secs" => cfg.timeout_secs.to_string(),
        "seed" => cfg.seed.to_string(),
        "solver_binary" => cfg.solver_binary,
        "queue" => format!("{:?}", cfg.queue).to_lowercase(),
        other => return Err(miette::miette!("unknown property '{other}'")),
    };
    println!("{value}");
    Ok(())
}

fn cmd_conf_list(path: &std::path::Path) {
    let cfg = EngineConfig::load_or_default(path);
    println!("max_depth = {}", cfg.max_depth);
    println!("timeout_secs = {}", cfg.timeout_secs);
    println!("seed = {}", cfg.seed);
    println!("solver_binary = {}", cfg.solver_binary);
    println!("queue = {:?}", cfg.queue);
}

fn cmd_conf_reset(path: &std::path::Path) -> Result<()> {
    EngineConfig::default().save(path).map_err(|e| miette::miette!("{e}"))?;
    println!("reset to defaults");
    Ok(())
}

fn cmd_conf_describe(key: &str) {
    let doc = match key {
        "max_depth" => "maximum number of dequeues a single path may go through before it is abandoned",
        "timeout_secs" => "per-check-sat solver timeout, in seconds",
        "seed" => "PRNG seed for the random exploration queue",
        "solver_binary" => "name of the SMT solver binary on PATH (z3, cvc5, ...)",
        "queue" => "path exploration order: random, bfs, or dfs",
        other => {
            println!("unknown property '{other}'");
            return;
        }
    };
    println!("{doc}");
}
