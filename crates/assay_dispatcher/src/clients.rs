//! Synchronous REQ clients for the quartermaster and the launch pad.
//!
//! Clients are constructed once at startup from configuration and injected
//! into the handlers; transport failures surface as errors the handlers
//! convert into `error` responses.

use anyhow::{Context as _, Result};
use assay_protocol::{defaults, methods, RpcMap, RpcRequest};
use std::time::Duration;
use zmq::{Context as ZmqContext, Socket};

/// Seam for requesting a bill of goods.
pub trait BogSource {
    fn bill_of_goods(&self, args: &RpcMap) -> Result<RpcMap>;
}

/// Seam for submitting a bill of goods to the launch pad.
pub trait Launcher {
    fn launch(&self, bog: &RpcMap) -> Result<RpcMap>;
}

/// JSON-over-ZMQ REQ client shared by the concrete peers.
pub struct RequestClient {
    socket: Socket,
    #[allow(dead_code)]
    context: ZmqContext, // Keep context alive
}

impl RequestClient {
    /// Connect with the default request timeout.
    pub fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_timeout(
            addr,
            Duration::from_millis(defaults::DEFAULT_REQUEST_TIMEOUT_MS as u64),
        )
    }

    /// Connect with a custom timeout.
    pub fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        let context = ZmqContext::new();
        let socket = context
            .socket(zmq::REQ)
            .context("Failed to create REQ socket")?;

        let timeout_ms = timeout.as_millis() as i32;
        socket
            .set_rcvtimeo(timeout_ms)
            .context("Failed to set receive timeout")?;
        socket
            .set_sndtimeo(timeout_ms)
            .context("Failed to set send timeout")?;
        socket.set_linger(0).context("Failed to set linger")?;

        socket
            .connect(addr)
            .with_context(|| format!("Failed to connect to {}", addr))?;

        Ok(Self { socket, context })
    }

    /// Send one request and wait for the reply map.
    pub fn request(&self, method: &str, args: &RpcMap) -> Result<RpcMap> {
        let request = RpcRequest::new(method, args.clone());
        let req_bytes = serde_json::to_vec(&request).context("Failed to serialize request")?;

        self.socket
            .send(&req_bytes, 0)
            .context("Failed to send request")?;

        let resp_bytes = self
            .socket
            .recv_bytes(0)
            .context("Failed to receive response (timeout or connection error)")?;

        let resp: RpcMap =
            serde_json::from_slice(&resp_bytes).context("Failed to parse response")?;

        Ok(resp)
    }
}

/// Quartermaster peer.
pub struct QuartermasterClient {
    client: RequestClient,
    method: String,
}

impl QuartermasterClient {
    pub fn connect(addr: &str) -> Result<Self> {
        Ok(Self {
            client: RequestClient::connect(addr)?,
            method: methods::GET_BILL_OF_GOODS.to_string(),
        })
    }
}

impl BogSource for QuartermasterClient {
    fn bill_of_goods(&self, args: &RpcMap) -> Result<RpcMap> {
        self.client.request(&self.method, args)
    }
}

/// Launch pad peer.
pub struct LaunchPadClient {
    client: RequestClient,
    method: String,
}

impl LaunchPadClient {
    pub fn connect(addr: &str) -> Result<Self> {
        Ok(Self {
            client: RequestClient::connect(addr)?,
            method: methods::LAUNCH_PAD_START.to_string(),
        })
    }
}

impl Launcher for LaunchPadClient {
    fn launch(&self, bog: &RpcMap) -> Result<RpcMap> {
        self.client.request(&self.method, bog)
    }
}
