//! lpuwire-assemble - Assemble and dry-run a multi-LPU network
//!
//! # Usage
//!
//! ```bash
//! # Two generic LPUs with 30 ports per direction and kind (the intro network)
//! lpuwire-assemble
//!
//! # Network described by a JSON config
//! lpuwire-assemble networks/intro.json
//!
//! # Override seed and unit count, print patterns as JSON
//! lpuwire-assemble --seed 7 --units 3 --json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Network assembled and dry-run completed
//! - 1: Assembly failed (invalid network description)
//! - 2: Invalid arguments or IO error

use std::process::ExitCode;

use anyhow::{Context, Result};
use lpuwire::{load_config, DryRunManager, Network, NetworkConfig, WireError};

#[derive(Debug, Default)]
struct Options {
    config: Option<String>,
    seed: Option<u64>,
    steps: Option<u64>,
    units: Option<u32>,
    json: bool,
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {:#}\n", e);
            print_help();
            return ExitCode::from(2);
        }
    };

    let config = match build_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match assemble_and_run(&config, &opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("x {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Option<Options>> {
    let mut opts = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-v" | "--verbose" => opts.verbose = true,
            "--json" => opts.json = true,
            "--seed" => opts.seed = Some(next_value(&mut args, "--seed")?),
            "--steps" => opts.steps = Some(next_value(&mut args, "--steps")?),
            "--units" => opts.units = Some(next_value(&mut args, "--units")?),
            _ if arg.starts_with('-') => anyhow::bail!("unknown option: {}", arg),
            _ => {
                if opts.config.replace(arg).is_some() {
                    anyhow::bail!("only one config path may be given");
                }
            }
        }
    }

    Ok(Some(opts))
}

fn next_value<T, I>(args: &mut I, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    I: Iterator<Item = String>,
{
    let raw = args
        .next()
        .with_context(|| format!("{} requires a value", flag))?;
    raw.parse()
        .with_context(|| format!("invalid value for {}: {}", flag, raw))
}

fn build_config(opts: &Options) -> Result<NetworkConfig> {
    let mut config = match &opts.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path))?,
        None => NetworkConfig::default(),
    };

    if let Some(n) = opts.units {
        let ports = config.units.first().map_or(30, |u| {
            u.in_spike.max(u.in_graded).max(u.out_spike).max(u.out_graded)
        });
        config.units = NetworkConfig::generic(n, ports).units;
    }
    if let Some(seed) = opts.seed {
        config.wiring.seed = seed;
    }
    if let Some(steps) = opts.steps {
        config.steps = steps;
    }
    Ok(config)
}

fn assemble_and_run(config: &NetworkConfig, opts: &Options) -> std::result::Result<(), WireError> {
    let network = Network::assemble(config)?;
    let mut manager = DryRunManager::new();
    network.run(&mut manager, config.steps)?;

    if opts.json {
        let patterns: Vec<_> = network.links().iter().map(|l| &l.pattern).collect();
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    for reg in manager.registrations() {
        println!(
            "+ {} (dev {}) <-> {} (dev {}): {} connections",
            reg.unit_a,
            reg.device_a,
            reg.unit_b,
            reg.device_b,
            reg.pattern.len()
        );
        if opts.verbose {
            for c in reg.pattern.connections() {
                println!("    {} -> {}", c.source, c.destination);
            }
        }
    }
    eprintln!();
    eprintln!(
        "Assembled {} units on {} devices, ran {} steps (dt = {})",
        network.units().len(),
        manager.devices().len(),
        manager.steps_run(),
        config.dt
    );
    Ok(())
}

fn print_help() {
    eprintln!("lpuwire-assemble - Wire LPUs with random typed port patterns");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    lpuwire-assemble [OPTIONS] [CONFIG]");
    eprintln!();
    eprintln!("ARGS:");
    eprintln!("    <CONFIG>    JSON network description (default: two generic LPUs)");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("        --seed <N>     Base seed for pattern sampling");
    eprintln!("        --steps <N>    Steps to dry-run");
    eprintln!("        --units <N>    Replace units with N generic LPUs");
    eprintln!("        --json         Print patterns as JSON");
    eprintln!("    -v, --verbose      List every connection");
    eprintln!("    -h, --help         Print this help message");
    eprintln!();
    eprintln!("EXIT CODES:");
    eprintln!("    0    Network assembled and dry-run completed");
    eprintln!("    1    Assembly failed");
    eprintln!("    2    Invalid arguments or IO error");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to log every sampling pass.");
}
