//! AssayFlow Agent Dispatcher server.
//!
//! Usage:
//!     assay-dispatcher --bind tcp://127.0.0.1:7751 \
//!         --quartermaster tcp://127.0.0.1:7750 \
//!         --launch-pad tcp://127.0.0.1:7752

use assay_dispatcher::{run, DispatcherConfig};
use assay_logging::{assayflow_home, init_logging, LogConfig};
use assay_protocol::defaults;
use assay_protocol::MethodTable;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assay-dispatcher", about = "Assessment run dispatcher for AssayFlow")]
struct Args {
    /// ZMQ REP bind address
    #[arg(
        long,
        env = "ASSAY_DISPATCHER_BIND",
        default_value_t = defaults::DEFAULT_DISPATCHER_BIND_ADDR.to_string()
    )]
    bind: String,

    /// Quartermaster address
    #[arg(
        long,
        env = "ASSAY_QUARTERMASTER_ADDR",
        default_value_t = defaults::DEFAULT_QUARTERMASTER_BIND_ADDR.to_string()
    )]
    quartermaster: String,

    /// Launch pad address
    #[arg(
        long,
        env = "ASSAY_LAUNCH_PAD_ADDR",
        default_value_t = defaults::DEFAULT_LAUNCH_PAD_ADDR.to_string()
    )]
    launch_pad: String,

    /// Database file (defaults to assayflow.sqlite3 under the AssayFlow home)
    #[arg(long, env = "ASSAY_DATABASE")]
    database: Option<PathBuf>,

    /// Root folder for assessment results
    #[arg(
        long,
        env = "ASSAY_RESULTS_FOLDER",
        default_value_t = defaults::DEFAULT_RESULTS_FOLDER.to_string()
    )]
    results_folder: String,

    /// Mirror the full log to the console
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(LogConfig {
        app_name: "assay-dispatcher",
        verbose: args.verbose,
    })?;

    let database = args
        .database
        .unwrap_or_else(|| assayflow_home().join(defaults::DEFAULT_DATABASE_FILE));

    tracing::info!("Starting AssayFlow Dispatcher");
    tracing::info!("  Bind: {}", args.bind);
    tracing::info!("  Quartermaster: {}", args.quartermaster);
    tracing::info!("  Launch pad: {}", args.launch_pad);
    tracing::info!("  Database: {}", database.display());
    tracing::info!("  Results folder: {}", args.results_folder);

    run(DispatcherConfig {
        bind_addr: args.bind,
        database,
        quartermaster_addr: args.quartermaster,
        launch_pad_addr: args.launch_pad,
        results_folder: args.results_folder,
        methods: MethodTable::default(),
    })
}
