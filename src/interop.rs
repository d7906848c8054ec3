#![allow(missing_docs)]
//! JSON-lines protocol for driving sessions from another process.
//!
//! Each request is one line of JSON on the input, each response one line on
//! the output. Sessions are addressed by an optional string id and share a
//! single [`Responder`]. A session is dropped once its farewell has been
//! sent, so the next request on that id starts over.
//!
//! ```json
//! {"id": 1, "method": "generateResponse", "params": {"session": "a", "input": "I am sad"}}
//! {"id": 1, "result": {"response": "Why are you sad?", "kind": "matched", "ended": false}}
//! ```

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::responder::Responder;
use crate::session::{Session, TurnKind};

/// Session id used when a request names none.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub version: String,
    pub methods: Vec<String>,
    pub keyword_groups: usize,
}

impl Manifest {
    fn for_responder(responder: &Responder) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            methods: ["getManifest", "getGreeting", "generateResponse", "reset"]
                .into_iter()
                .map(String::from)
                .collect(),
            keyword_groups: responder.script().keyword_groups().len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IpcRequest {
    #[serde(default)]
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpcResponse {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpcResponse {
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionParams {
    #[serde(default)]
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateParams {
    #[serde(default)]
    session: Option<String>,
    input: String,
}

#[derive(Debug, Serialize)]
struct GenerateResult<'a> {
    response: &'a str,
    kind: TurnKind,
    ended: bool,
}

/// Owns the live sessions for one IPC connection.
#[derive(Debug)]
pub struct IpcServer {
    responder: Arc<Responder>,
    seed: Option<u64>,
    sessions: HashMap<String, Session>,
}

impl IpcServer {
    /// Creates a server; every new session is seeded from `seed` if given.
    pub fn new(responder: Arc<Responder>, seed: Option<u64>) -> Self {
        Self {
            responder,
            seed,
            sessions: HashMap::new(),
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session(&mut self, key: &str) -> &mut Session {
        let responder = &self.responder;
        let seed = self.seed;
        self.sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::with_optional_seed(Arc::clone(responder), seed))
    }

    /// Dispatches one request.
    pub fn handle(&mut self, request: &IpcRequest) -> IpcResponse {
        let id = request.id;
        match request.method.as_str() {
            "getManifest" => match serde_json::to_value(Manifest::for_responder(&self.responder)) {
                Ok(value) => IpcResponse::success(id, value),
                Err(e) => IpcResponse::error(id, e.to_string()),
            },
            "getGreeting" => match parse_params::<SessionParams>(&request.params) {
                Ok(params) => {
                    let key = session_key(params.session);
                    let greeting = self.session(&key).greeting().to_string();
                    IpcResponse::success(id, serde_json::json!({ "greeting": greeting }))
                }
                Err(e) => IpcResponse::error(id, e),
            },
            "generateResponse" => match parse_params::<GenerateParams>(&request.params) {
                Ok(params) => {
                    let key = session_key(params.session);
                    let turn = self.session(&key).turn(&params.input);
                    let ended = turn.is_farewell();
                    if ended {
                        // The next request on this id starts a new conversation.
                        self.sessions.remove(&key);
                        debug!(session = %key, "session ended");
                    }
                    let result = GenerateResult {
                        response: turn.text(),
                        kind: turn.kind(),
                        ended,
                    };
                    match serde_json::to_value(&result) {
                        Ok(value) => IpcResponse::success(id, value),
                        Err(e) => IpcResponse::error(id, e.to_string()),
                    }
                }
                Err(e) => IpcResponse::error(id, e),
            },
            "reset" => match parse_params::<SessionParams>(&request.params) {
                Ok(params) => {
                    let key = session_key(params.session);
                    self.sessions.remove(&key);
                    let greeting = self.session(&key).greeting().to_string();
                    IpcResponse::success(id, serde_json::json!({ "greeting": greeting }))
                }
                Err(e) => IpcResponse::error(id, e),
            },
            other => IpcResponse::error(id, format!("Unknown method: {other}")),
        }
    }

    /// Parses and dispatches one input line. Blank lines yield `None`.
    pub fn handle_line(&mut self, line: &str) -> Option<IpcResponse> {
        if line.trim().is_empty() {
            return None;
        }
        let response = match serde_json::from_str::<IpcRequest>(line) {
            Ok(request) => {
                debug!(id = request.id, method = %request.method, "ipc request");
                self.handle(&request)
            }
            Err(e) => {
                warn!(error = %e, "invalid ipc request");
                IpcResponse::error(0, format!("Invalid JSON: {e}"))
            }
        };
        Some(response)
    }

    /// Serves requests from `input` until it is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, writing or encoding a response fails.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if let Some(response) = self.handle_line(&line) {
                writeln!(output, "{}", serde_json::to_string(&response)?)?;
                output.flush()?;
            }
        }
        Ok(())
    }
}

fn session_key(session: Option<String>) -> String {
    session.unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
) -> std::result::Result<T, String> {
    let params = if params.is_null() {
        serde_json::json!({})
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {e}"))
}
