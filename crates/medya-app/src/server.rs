//! The subscriber-facing protocol: newline-delimited JSON over
//! stdin/stdout.
//!
//! Request:   `{"id":1,"method":"createTab","params":{"source":"youTube"}}`
//! Response:  `{"id":1,"result":{...}}` or `{"id":1,"error":"..."}`
//! Broadcast: `{"event":"BACKEND_STATE_EVENT","state":{...}}`
//!
//! Log output goes to stderr so stdout stays a clean protocol stream.

use medya_common::TabKey;
use medya_sources::SourceId;
use medya_tabs::TabManager;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::debug;

pub const BACKEND_STATE_EVENT: &str = "BACKEND_STATE_EVENT";

/// Serve the command loop until stdin closes.
pub async fn run(manager: &TabManager) -> std::io::Result<()> {
    // Broadcast pump: every state-affecting change goes out as one line.
    let mut updates = manager.subscribe();
    let pump = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(state) => {
                    let line = json!({"event": BACKEND_STATE_EVENT, "state": state});
                    println!("{line}");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Snapshots are idempotent values; the next one carries
                    // everything the skipped ones did.
                    debug!(skipped, "subscriber lagged behind the state bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!(
        "{}",
        json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")})
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        println!("{}", handle_line(manager, &line));
    }

    pump.abort();
    Ok(())
}

fn handle_line(manager: &TabManager, line: &str) -> Value {
    let request: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return json!({"id": null, "error": format!("parse error: {e}")}),
    };
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

    match handle_method(manager, method, &params) {
        Ok(result) => json!({"id": id, "result": result}),
        Err(error) => json!({"id": id, "error": error}),
    }
}

fn handle_method(manager: &TabManager, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "createTab" => {
            let source: SourceId = parse_param(params, "source")?;
            let key = manager.create_tab(source).map_err(|e| e.to_string())?;
            Ok(json!({"key": key}))
        }
        "switchTab" => {
            let key: TabKey = parse_param(params, "key")?;
            manager.switch_tab(&key).map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        "closeTab" => {
            let key: TabKey = parse_param(params, "key")?;
            manager.close_tab(&key).map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        "getSources" => serde_json::to_value(manager.get_sources()).map_err(|e| e.to_string()),
        "getBackendState" => {
            serde_json::to_value(manager.get_backend_state()).map_err(|e| e.to_string())
        }
        other => Err(format!("unknown method: {other}")),
    }
}

fn parse_param<T: serde::de::DeserializeOwned>(params: &Value, field: &str) -> Result<T, String> {
    let value = params
        .get(field)
        .cloned()
        .ok_or_else(|| format!("missing param: {field}"))?;
    serde_json::from_value(value).map_err(|e| format!("invalid param {field}: {e}"))
}
