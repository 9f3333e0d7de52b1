//! ZMQ REP server loop and method dispatch for the dispatcher.
//!
//! Same discipline as the quartermaster server: one request at a time,
//! every received request gets a reply, malformed input answers with an
//! `error` map.

use crate::clients::{BogSource, LaunchPadClient, Launcher, QuartermasterClient};
use crate::store::ExecStore;
use crate::{exec_collector, results_collector, run_handler};
use assay_db::AssayDb;
use assay_protocol::{error_map, MethodTable, RpcMap, RpcRequest};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

const FALLBACK_REPLY: &[u8] = br#"{"error":"internal serialization failure"}"#;

/// Dispatcher server configuration.
pub struct DispatcherConfig {
    pub bind_addr: String,
    pub database: PathBuf,
    pub quartermaster_addr: String,
    pub launch_pad_addr: String,
    pub results_folder: String,
    pub methods: MethodTable,
}

/// Dispatches parsed requests to the handlers.
pub struct DispatcherServer<S, Q, L> {
    store: S,
    quartermaster: Q,
    launch_pad: L,
    results_folder: String,
    methods: MethodTable,
}

impl<S, Q, L> DispatcherServer<S, Q, L>
where
    S: ExecStore,
    Q: BogSource,
    L: Launcher,
{
    pub fn new(
        store: S,
        quartermaster: Q,
        launch_pad: L,
        results_folder: String,
        methods: MethodTable,
    ) -> Self {
        Self {
            store,
            quartermaster,
            launch_pad,
            results_folder,
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

        if method == m.do_run {
            run_handler::do_run(
                &self.store,
                &self.quartermaster,
                &self.launch_pad,
                &self.results_folder,
                args,
            )
            .await
        } else if method == m.update_execution_results {
            exec_collector::update_execution_results(&self.store, args).await
        } else if method == m.get_single_execution_record {
            exec_collector::get_single_execution_record(&self.store, args).await
        } else if method == m.save_result {
            results_collector::save_result(&self.store, args).await
        } else {
            error_map(format!("unknown method: {}", method))
        }
    }
}

/// Bind the REP socket, connect the peers and serve forever.
pub fn run(config: DispatcherConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let db = runtime.block_on(AssayDb::open(&config.database))?;
    let quartermaster = QuartermasterClient::connect(&config.quartermaster_addr)?;
    let launch_pad = LaunchPadClient::connect(&config.launch_pad_addr)?;
    let server = DispatcherServer::new(
        db,
        quartermaster,
        launch_pad,
        config.results_folder,
        config.methods,
    );

    let ctx = zmq::Context::new();
    let socket = ctx.socket(zmq::REP)?;
    socket.bind(&config.bind_addr)?;
    info!(bind = %config.bind_addr, "dispatcher listening");

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
