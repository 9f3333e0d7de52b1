//! AssayFlow Agent Dispatcher
//!
//! Dispatches assessment runs (bill of goods via the quartermaster, hand-off
//! to the launch pad) and collects execution status and assessment results,
//! serving both over a ZMQ REP socket.

pub mod clients;
pub mod exec_collector;
pub mod results_collector;
pub mod run_handler;
pub mod server;
pub mod store;

pub use clients::{BogSource, LaunchPadClient, Launcher, QuartermasterClient};
pub use server::{run, DispatcherConfig, DispatcherServer};
pub use store::ExecStore;
