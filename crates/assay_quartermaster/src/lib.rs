//! AssayFlow Quartermaster
//!
//! Assembles the bill of goods for assessment runs and serves the catalog,
//! admin and viewer-store operations over a ZMQ REP socket.

pub mod admin;
pub mod checksum;
pub mod gator;
pub mod quartermaster;
pub mod server;
pub mod store;
pub mod viewer;

pub use quartermaster::Quartermaster;
pub use server::{run, QuartermasterConfig, QuartermasterServer};
pub use store::{CatalogStore, DbCatalogStore};
