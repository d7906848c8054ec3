//! IPC Server for the ELIZA script responder
//!
//! This binary runs as a subprocess and handles JSON requests over stdin/stdout,
//! one per line. Any language runtime can host ELIZA conversations through it.
//!
//! ## Usage
//!
//! ```bash
//! cargo build --features ipc --bin eliza-script-ipc
//! ELIZA_SCRIPT=data/doctor.txt ./eliza-script-ipc
//! ```
//!
//! ### Example Request
//! ```json
//! {"id": 1, "method": "generateResponse", "params": {"input": "Hello"}}
//! ```

use std::io;
use std::sync::Arc;

use anyhow::Context;
use elizaos_eliza_script::interop::IpcServer;
use elizaos_eliza_script::logging::init_logging;
use elizaos_eliza_script::{ElizaScriptConfig, Responder};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(false);

    let config = ElizaScriptConfig::from_env()?;
    let responder = Responder::from_config(&config).context("failed to load ELIZA script")?;
    let mut server = IpcServer::new(Arc::new(responder), config.seed());

    info!("server started, waiting for requests");
    let stdin = io::stdin();
    let stdout = io::stdout();
    server.serve(stdin.lock(), stdout.lock())?;
    info!(sessions = server.session_count(), "server shutting down");
    Ok(())
}
