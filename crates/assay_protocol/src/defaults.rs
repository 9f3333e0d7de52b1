//! Canonical default values shared across the control plane.

pub const DEFAULT_QUARTERMASTER_BIND_ADDR: &str = "tcp://127.0.0.1:7750";
pub const DEFAULT_DISPATCHER_BIND_ADDR: &str = "tcp://127.0.0.1:7751";
pub const DEFAULT_LAUNCH_PAD_ADDR: &str = "tcp://127.0.0.1:7752";
pub const DEFAULT_DATABASE_FILE: &str = "assayflow.sqlite3";
pub const DEFAULT_RESULTS_FOLDER: &str = "/swamp/working/results";

/// Request timeout applied to REQ sockets (milliseconds).
pub const DEFAULT_REQUEST_TIMEOUT_MS: i32 = 120_000;
