//! History viewer RPC server: JSON-RPC over stdin/stdout for a front end shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"history.change_page", "params":{"page":2}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Requests run concurrently, so responses may come back out of order.
//! Logs go to stderr.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use history_viewer::app::App;
use history_viewer::rpc_handler::handle_method;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::var("HISTORY_VIEWER_CONFIG").ok();
    let app = match App::load(config_path) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            log::error!("Failed to initialize history viewer: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            let line = format!("{}\n", message);
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                log::error!("Failed to write response: {}", e);
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let _ = tx.send(json!({
        "event": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "view": app.current_view(),
    }));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read request: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let app = app.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            log::debug!("-> {} {}", method, params);
            let response = match handle_method(&app, &method, &params).await {
                Ok(result) => json!({"id": id, "result": result}),
                Err(error) => json!({"id": id, "error": error}),
            };
            let _ = tx.send(response);
        });
    }

    drop(tx);
    let _ = writer.await;
}
