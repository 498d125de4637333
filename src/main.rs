use anyhow::Context;
use mowplan::{
    init_json_logging, init_logging, Config, CoveragePlanner, JsonZoneStore, Zone, ZoneStore,
    BUILD_DATE, VERSION,
};
use std::path::PathBuf;

/// Command line arguments
#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    zones_path: Option<PathBuf>,
    seed: Option<u64>,
    json_logs: bool,
    zone_id: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .with_context(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--config" | "-c" => {
                result.config_path = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--zones" | "-z" => {
                result.zones_path = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--seed" | "-s" => {
                let raw = value(i)?;
                result.seed = Some(raw.parse().with_context(|| format!("invalid seed '{}'", raw))?);
                i += 1;
            }
            "--json-logs" => result.json_logs = true,
            "--version" | "-V" => {
                println!("mowplan {} ({})", VERSION, BUILD_DATE);
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                print_help();
                anyhow::bail!("unknown argument: {}", other);
            }
            other => {
                if result.zone_id.is_some() {
                    anyhow::bail!("only one zone id may be given");
                }
                result.zone_id = Some(other.to_string());
            }
        }
        i += 1;
    }

    Ok(result)
}

fn print_help() {
    println!("mowplan - coverage path planning for lawn mowers");
    println!();
    println!("USAGE:");
    println!("    mowplan [OPTIONS] <ZONE_ID>");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>     Configuration file (.toml or .json)");
    println!("    -z, --zones <FILE>      Zone file (defaults to the configured data dir)");
    println!("    -s, --seed <N>          Seed for the random pattern");
    println!("        --json-logs         Log as JSON lines on stderr");
    println!("    -V, --version           Print version information");
    println!("    -h, --help              Print help information");
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.json_logs {
        init_json_logging()?;
    } else {
        init_logging()?;
    }
    tracing::debug!("mowplan {} built {}", VERSION, BUILD_DATE);

    let mut config = match &args.config_path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };
    if args.seed.is_some() {
        config.patterns.random_seed = args.seed;
    }

    let zones_path = args
        .zones_path
        .clone()
        .unwrap_or_else(|| config.storage.zone_path());
    let store = JsonZoneStore::new(&zones_path);
    if store.load()?.is_empty() {
        tracing::info!("No zones in {}, creating a 10 m x 10 m default zone", zones_path.display());
        store.save(&[Zone::rectangle("default", 10.0, 10.0)])?;
    }

    let planner = CoveragePlanner::new(config, Box::new(store))?;
    let zone_id = args.zone_id.unwrap_or_else(|| "default".to_string());
    planner.plan_path_for_zone(&zone_id)?;

    let result = planner
        .current_result()
        .with_context(|| format!("zone {} produced no plan", zone_id))?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
