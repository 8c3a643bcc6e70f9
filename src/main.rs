use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cluster_range::fixture;
use cluster_range::{loader, EngineConfig, State};

/// 集群范围表达式查询工具
#[derive(Parser)]
#[command(name = "crange")]
#[command(version)]
#[command(about = "Evaluate range expressions over cluster definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory of `<cluster>.json` files to load
    #[arg(short, long, global = true)]
    clusters: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cluster that `@` and `?` resolve against
    #[arg(short, long, global = true)]
    default_cluster: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one expression and print its members
    Query {
        expression: String,

        /// Print members on one comma separated line
        #[arg(long)]
        join: bool,
    },

    /// Run every conformance case directory under DIR
    Check { dir: PathBuf },

    /// Interactive prompt (default)
    Repl,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "cluster_range=debug" } else { "cluster_range=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 根据命令行参数构建查询状态：配置文件 -> 默认集群覆盖 -> 加载集群目录
fn build_state(cli: &Cli) -> anyhow::Result<State> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut state = State::with_config(config);

    if let Some(name) = &cli.default_cluster {
        state.set_default_cluster(Some(name.as_str()));
    }
    if let Some(dir) = &cli.clusters {
        loader::load_dir(&mut state, dir)
            .with_context(|| format!("loading clusters from {}", dir.display()))?;
    }
    Ok(state)
}

fn cmd_query(state: &State, expression: &str, join: bool) -> anyhow::Result<()> {
    let result = state.query(expression)?;
    if join {
        println!("{}", result);
    } else {
        for member in result.iter() {
            println!("{}", member);
        }
    }
    Ok(())
}

/// 每个用例目录都从 `base` 的副本开始, 命令行的配置与集群同样生效
fn cmd_check(base: &State, dir: &Path) -> anyhow::Result<()> {
    let cases = fixture::walk_cases(dir)?;
    let mut total = 0;
    let mut failed = 0;

    for case in &cases {
        let outcomes = fixture::run_case_dir_with(case, base)
            .with_context(|| format!("running case {}", case.display()))?;
        for outcome in outcomes.iter().filter(|o| !o.is_pass()) {
            println!("FAIL {}", outcome);
        }
        total += outcomes.len();
        failed += outcomes.iter().filter(|o| !o.is_pass()).count();
    }

    println!(
        "{} case director{}, {} records, {} failed",
        cases.len(),
        if cases.len() == 1 { "y" } else { "ies" },
        total,
        failed
    );
    if failed > 0 {
        bail!("{} of {} records failed", failed, total);
    }
    Ok(())
}

const REPL_HELP: &str = "\
Enter a range expression, or one of:
  :load DIR     load <cluster>.json files from DIR
  :clusters     list loaded clusters
  :help         show this message
  :quit         exit";

fn repl(mut state: State) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("crange {} (:help for commands)", env!("CARGO_PKG_VERSION"));

    loop {
        let line = match editor.readline("crange> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line)?;

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            ":quit" | ":q" => break,
            ":help" => println!("{}", REPL_HELP),
            ":clusters" => {
                for (name, cluster) in state.clusters() {
                    println!("{} ({} keys)", name, cluster.len());
                }
            }
            ":load" if argument.is_empty() => println!("usage: :load DIR"),
            ":load" => match loader::load_dir(&mut state, Path::new(argument)) {
                Ok(names) => println!("loaded {} clusters", names.len()),
                Err(e) => println!("error: {}", e),
            },
            _ if command.starts_with(':') => println!("unknown command {} (:help)", command),
            _ => match state.query(line) {
                Ok(result) if result.is_empty() => println!("(empty)"),
                Ok(result) => println!("{}", result),
                Err(e) => println!("error: {}", e),
            },
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Check { dir }) => {
            let base = build_state(&cli)?;
            cmd_check(&base, dir)
        }
        Some(Commands::Query { expression, join }) => {
            let state = build_state(&cli)?;
            cmd_query(&state, expression, *join)
        }
        Some(Commands::Repl) | None => {
            let state = build_state(&cli)?;
            if state.is_empty() {
                warn!("no clusters loaded; use --clusters DIR or :load DIR");
            } else {
                info!(clusters = state.len(), "ready");
            }
            repl(state)
        }
    }
}
