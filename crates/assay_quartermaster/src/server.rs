//! ZMQ REP server loop and method dispatch.
//!
//! Requests are serviced one at a time: the loop parses the envelope,
//! drives the async handler to completion on the server's runtime, and
//! replies. Malformed input gets an error reply, never a dropped request
//! (a REP socket that skips a send is wedged for good).

use crate::quartermaster::Quartermaster;
use crate::store::DbCatalogStore;
use crate::{admin, gator, viewer};
use assay_db::AssayDb;
use assay_protocol::{error_map, MethodTable, RpcMap, RpcRequest};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

/// Reply of last resort when the real reply cannot be serialized.
const FALLBACK_REPLY: &[u8] = br#"{"error":"internal serialization failure"}"#;

/// Quartermaster server configuration.
pub struct QuartermasterConfig {
    pub bind_addr: String,
    pub database: PathBuf,
    /// Skip archive checksum verification.
    pub test_mode: bool,
    pub methods: MethodTable,
}

/// Dispatches parsed requests to the handlers.
pub struct QuartermasterServer {
    db: AssayDb,
    quartermaster: Quartermaster<DbCatalogStore>,
    methods: MethodTable,
}

impl QuartermasterServer {
    pub fn new(db: AssayDb, test_mode: bool, methods: MethodTable) -> Self {
        let quartermaster = Quartermaster::new(DbCatalogStore::new(db.clone()), test_mode);
        Self {
            db,
            quartermaster,
            methods,
        }
    }

    /// Parse a raw request and drive the matching handler.
    pub fn handle_message(&self, runtime: &Runtime, raw: &[u8]) -> RpcMap {
        let request: RpcRequest = match serde_json::from_slice(raw) {
            Ok(request) => request,
            Err(err) => {
                error!(%err, "malformed request");
                return error_map(format!("malformed request: {}", err));
            }
        };
        debug!(method = %request.method, "request received");
        runtime.block_on(self.dispatch(request))
    }

    pub async fn dispatch(&self, request: RpcRequest) -> RpcMap {
        let m = &self.methods;
        let method = request.method.as_str();
        let args = &request.args;

        if method == m.get_bill_of_goods {
            self.quartermaster.get_bill_of_goods(args).await
        } else if method == m.list_tools {
            gator::list_tools(&self.db).await
        } else if method == m.list_packages {
            gator::list_packages(&self.db).await
        } else if method == m.list_platforms {
            gator::list_platforms(&self.db).await
        } else if method == m.insert_execution_event {
            admin::insert_execution_event(&self.db, args).await
        } else if method == m.insert_system_status {
            admin::insert_system_status(&self.db, args).await
        } else if method == m.store_viewer_database {
            viewer::store_viewer_database(&self.db, args).await
        } else if method == m.update_viewer_instance {
            viewer::update_viewer_instance(&self.db, args).await
        } else {
            error_map(format!("unknown method: {}", method))
        }
    }
}

/// Bind the REP socket and serve forever.
pub fn run(config: QuartermasterConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let db = runtime.block_on(AssayDb::open(&config.database))?;
    let server = QuartermasterServer::new(db, config.test_mode, config.methods);

    let ctx = zmq::Context::new();
    let socket = ctx.socket(zmq::REP)?;
    socket.bind(&config.bind_addr)?;
    info!(bind = %config.bind_addr, "quartermaster listening");

    loop {
        let raw = match socket.recv_bytes(0) {
            Ok(raw) => raw,
            Err(err) => {
                error!(%err, "receive failed");
                continue;
            }
        };

        let reply = server.handle_message(&runtime, &raw);
        let bytes = match serde_json::to_vec(&reply) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(%err, "reply serialization failed");
                FALLBACK_REPLY.to_vec()
            }
        };
        if let Err(err) = socket.send(&bytes, 0) {
            error!(%err, "send failed");
        }
    }
}
