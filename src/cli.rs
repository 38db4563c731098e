use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;
use crate::distances::{DistanceTable, TableFormat, UnreachablePolicy};
use crate::logging::init_logging;
use crate::pipeline::{compute_distances, inspect_map};

#[derive(Debug, Parser)]
#[command(name = "port-distances")]
#[command(
    about = "Compute sailing distances between ports from the frontline map",
    long_about = None
)]
struct Cli {
    /// YAML config file (defaults to $PORT_DISTANCES_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compute the distance table for a server snapshot and write it
    Distances(DistancesArgs),
    /// Load the map image and report size, spot layout and tonal audit
    InspectMap(SnapshotArgs),
    /// Print the distance between two ports from a written table
    Lookup {
        from: u16,
        to: u16,
        /// Table file (defaults to the configured output file)
        #[arg(long)]
        table: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SnapshotArgs {
    /// Server id, e.g. eu2
    #[arg(long)]
    server: Option<String>,

    /// Snapshot date YYYY-MM-DD (defaults to the current server day)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DistancesArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Output file (defaults to <root>/lib/distances.json, or .csv with --format csv)
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// What to write for ports that cannot reach each other by water
    #[arg(long, value_enum)]
    unreachable: Option<PolicyArg>,

    /// Run sources one after another on the main thread
    #[arg(long)]
    sequential: bool,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for TableFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => TableFormat::Json,
            FormatArg::Csv => TableFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Omit,
    Zero,
    Fail,
}

impl From<PolicyArg> for UnreachablePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Omit => UnreachablePolicy::Omit,
            PolicyArg::Zero => UnreachablePolicy::Zero,
            PolicyArg::Fail => UnreachablePolicy::Fail,
        }
    }
}

/// Parse `args` (including the program name). `Err` carries the exit code after
/// clap has printed help or the usage error.
pub fn parse_command(args: &[String]) -> Result<(Option<PathBuf>, Command), i32> {
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok((cli.config, cli.command)),
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            Err(code)
        }
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let (config_path, command) = match parse_command(args) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };

    init_logging("info");

    let mut config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match command {
        Command::Distances(args) => handle_distances(&mut config, args),
        Command::InspectMap(args) => handle_inspect_map(&mut config, args),
        Command::Lookup { from, to, table } => handle_lookup(&config, from, to, table),
    }
}

fn apply_snapshot_args(config: &mut AppConfig, args: SnapshotArgs) {
    if let Some(server) = args.server {
        config.server_id = server;
    }
    if let Some(date) = args.date {
        config.date = Some(date);
    }
}

fn handle_distances(config: &mut AppConfig, args: DistancesArgs) -> i32 {
    apply_snapshot_args(config, args.snapshot);
    if let Some(output) = args.output {
        config.output_file = Some(output);
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if let Some(policy) = args.unreachable {
        config.unreachable = policy.into();
    }
    if args.sequential {
        config.parallel = false;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    match compute_distances(config) {
        Ok(report) => {
            println!(
                "distances complete: ports={}, records={}, unreachable_pairs={}, output='{}'",
                report.ports,
                report.records,
                report.unreachable_pairs,
                report.output.display()
            );
            0
        }
        Err(err) => {
            eprintln!("distances failed: {err}");
            1
        }
    }
}

fn handle_inspect_map(config: &mut AppConfig, args: SnapshotArgs) -> i32 {
    apply_snapshot_args(config, args);

    let report = match inspect_map(config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("inspect-map failed: {err}");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize map report: {err}");
            1
        }
    }
}

fn handle_lookup(config: &AppConfig, from: u16, to: u16, table: Option<PathBuf>) -> i32 {
    let path = table.unwrap_or_else(|| config.output_file());
    let table = match DistanceTable::load(&path) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("lookup failed: {err}");
            return 1;
        }
    };

    match table.get(from, to) {
        Some(distance) => {
            println!("{from}\t{to}\t{distance}");
            0
        }
        None => {
            eprintln!("no distance recorded between ports {from} and {to}");
            1
        }
    }
}
