use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use crate::api::dto::ReportDto;
use crate::application::Introspector;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

/// Line-delimited JSON server answering introspection requests.
pub struct ApiServer {
    introspector: Introspector,
    shutdown: Arc<AtomicBool>,
}

/// Per-connection state.
#[derive(Clone)]
struct Session {
    introspector: Introspector,
    shutdown: Arc<AtomicBool>,
    /// Address the accept loop listens on, dialled to wake it after SHUTDOWN
    wake: SocketAddr,
}

pub fn start_server(port: u16, introspector: Introspector) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;
    ApiServer::new(introspector).serve(listener)
}

impl ApiServer {
    pub fn new(introspector: Introspector) -> Self {
        Self { introspector, shutdown: Arc::new(AtomicBool::new(false)) }
    }

    /// Accept connections until a client sends SHUTDOWN.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        let wake = listener.local_addr().context("Listener has no local address")?;
        info!(target: "plugin_scout", %wake, "API server listening");

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let session = Session {
                        introspector: self.introspector.clone(),
                        shutdown: Arc::clone(&self.shutdown),
                        wake,
                    };
                    thread::spawn(move || {
                        if let Err(e) = session.handle_connection(stream) {
                            warn!(target: "plugin_scout", "Connection error: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!(target: "plugin_scout", "Accept error: {}", e),
            }
        }

        info!(target: "plugin_scout", "API server stopped");
        Ok(())
    }
}

impl Session {
    fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (response, stop) = match self.process_command(trimmed) {
                Ok((data, stop)) => (json!({ "status": "success", "data": data }), stop),
                Err(e) => (json!({ "status": "error", "message": format!("{:#}", e) }), false),
            };

            let response_str = serde_json::to_string(&response)?;
            stream.write_all(response_str.as_bytes())?;
            stream.write_all(b"\n")?;
            stream.flush()?;

            if stop {
                info!(target: "plugin_scout", "Shutdown requested");
                self.shutdown.store(true, Ordering::SeqCst);
                // Unblock the accept loop so it observes the flag.
                let _ = TcpStream::connect(self.wake);
                break;
            }
        }
        Ok(())
    }

    /// Returns the response payload and whether the server should stop.
    fn process_command(&self, json_str: &str) -> Result<(serde_json::Value, bool)> {
        let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;
        debug!(target: "plugin_scout", command = %req.command, "API request");

        match req.command.as_str() {
            "PING" => Ok((json!("PONG"), false)),
            "INTROSPECT" => Ok((self.handle_introspect(req.params)?, false)),
            "SHUTDOWN" => Ok((json!("Shutting down..."), true)),
            _ => anyhow::bail!("Unknown command: {}", req.command),
        }
    }

    fn handle_introspect(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for INTROSPECT"))?;
        let path_str = params
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Missing 'path' param"))?;

        let report = self.introspector.introspect(&PathBuf::from(path_str));
        Ok(serde_json::to_value(ReportDto::from(&report))?)
    }
}
