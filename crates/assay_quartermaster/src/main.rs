//! AssayFlow Quartermaster server.
//!
//! Usage:
//!     assay-quartermaster --bind tcp://127.0.0.1:7750 --database /path/to/assayflow.sqlite3

use assay_logging::{assayflow_home, init_logging, LogConfig};
use assay_protocol::defaults;
use assay_protocol::MethodTable;
use assay_quartermaster::{run, QuartermasterConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assay-quartermaster", about = "Bill of goods server for AssayFlow")]
struct Args {
    /// ZMQ REP bind address
    #[arg(
        long,
        env = "ASSAY_QUARTERMASTER_BIND",
        default_value_t = defaults::DEFAULT_QUARTERMASTER_BIND_ADDR.to_string()
    )]
    bind: String,

    /// Database file (defaults to assayflow.sqlite3 under the AssayFlow home)
    #[arg(long, env = "ASSAY_DATABASE")]
    database: Option<PathBuf>,

    /// Skip package and tool archive checksum verification
    #[arg(long, env = "ASSAY_TEST_MODE")]
    test_mode: bool,

    /// Mirror the full log to the console
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(LogConfig {
        app_name: "assay-quartermaster",
        verbose: args.verbose,
    })?;

    let database = args
        .database
        .unwrap_or_else(|| assayflow_home().join(defaults::DEFAULT_DATABASE_FILE));

    tracing::info!("Starting AssayFlow Quartermaster");
    tracing::info!("  Bind: {}", args.bind);
    tracing::info!("  Database: {}", database.display());
    if args.test_mode {
        tracing::info!("  Test mode: checksum verification disabled");
    }

    run(QuartermasterConfig {
        bind_addr: args.bind,
        database,
        test_mode: args.test_mode,
        methods: MethodTable::default(),
    })
}
