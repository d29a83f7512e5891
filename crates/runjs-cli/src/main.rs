//! runjs CLI
//!
//! Runs `user_code.js` from the directory given on the command line.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use runjs_core::{ExecutionOutcome, Job};
use runjs_engine::{EngineConfig, HostContext, Runner};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Duration;

fn cli() -> Command {
    Command::new("runjs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run user_code.js from a code directory in an embedded JavaScript engine")
        .arg(
            Arg::new("directory")
                .value_name("CODE_DIR")
                .help("Directory containing user_code.js")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .help("Wall-clock limit for evaluation and pending timers")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("memory-limit-mb")
                .long("memory-limit-mb")
                .value_name("MB")
                .help("Heap limit for the script")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("max-stack-kb")
                .long("max-stack-kb")
                .value_name("KB")
                .help("Stack limit for the script")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("isolate-env")
                .long("isolate-env")
                .help("Expose an empty process.env instead of the current environment")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Runner log verbosity")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"])
                .default_value("warn"),
        )
}

fn main() {
    let matches = cli().get_matches();

    match setup(&matches) {
        Ok((runner, job)) => {
            let outcome = runner.run(&job);
            process::exit(report(&outcome));
        }
        Err(e) => {
            eprintln!("runjs: {e:#}");
            process::exit(1);
        }
    }
}

fn setup(matches: &ArgMatches) -> Result<(Runner, Job), anyhow::Error> {
    init_logging(matches)?;

    let directory = matches
        .get_one::<PathBuf>("directory")
        .context("missing code directory")?;
    let config = engine_config(matches)?;
    let host = if matches.get_flag("isolate-env") {
        HostContext::inherit().without_env()
    } else {
        HostContext::inherit()
    };

    log::debug!("engine config: {config:?}");
    Ok((Runner::new(config, host), Job::new(directory)))
}

fn init_logging(matches: &ArgMatches) -> Result<(), anyhow::Error> {
    let level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    let level = LevelFilter::from_str(level)
        .ok()
        .with_context(|| format!("invalid log level {level}"))?;

    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .try_init()?;
    Ok(())
}

fn engine_config(matches: &ArgMatches) -> Result<EngineConfig, anyhow::Error> {
    let mut config = EngineConfig::new();

    if let Some(&ms) = matches.get_one::<u64>("timeout-ms") {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(&mb) = matches.get_one::<u64>("memory-limit-mb") {
        let bytes = scaled(mb, 1024 * 1024).context("--memory-limit-mb is too large")?;
        config = config.with_memory_limit(bytes);
    }
    if let Some(&kb) = matches.get_one::<u64>("max-stack-kb") {
        let bytes = scaled(kb, 1024).context("--max-stack-kb is too large")?;
        config = config.with_max_stack_size(bytes);
    }

    Ok(config)
}

fn scaled(value: u64, unit: u64) -> Option<usize> {
    value.checked_mul(unit).and_then(|bytes| usize::try_from(bytes).ok())
}

/// Print the failure diagnostic, if any, and return the exit status
fn report(outcome: &ExecutionOutcome) -> i32 {
    if let Some(diagnostic) = outcome.diagnostic() {
        eprintln!("{diagnostic}");
    }
    outcome.exit_code()
}
