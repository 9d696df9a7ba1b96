//! Stdio client for driving the `pgn-ls` binary in integration tests
#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const URI: &str = "file:///games/session.pgn";

pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    messages: Receiver<Value>,
}

impl Session {
    /// Spawn the server without initializing it
    pub fn spawn() -> Self {
        let bin_path = std::env::var("CARGO_BIN_EXE_pgn-ls")
            .unwrap_or_else(|_| "target/debug/pgn-ls".to_string());

        let mut child = Command::new(bin_path)
            .args(["--config", "/dev/null"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn language server");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = child.stdout.take().expect("stdout");

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            while let Some(message) = read_message(&mut reader) {
                if tx.send(message).is_err() {
                    break;
                }
            }
        });

        Session {
            child,
            stdin: Some(stdin),
            messages: rx,
        }
    }

    /// Spawn the server and complete the initialize handshake
    pub fn start() -> Self {
        let mut session = Session::spawn();
        session.request(1, "initialize", json!({ "processId": null, "capabilities": {} }));
        session.notify("initialized", json!({}));
        session
    }

    pub fn send(&mut self, message: Value) {
        let body = message.to_string();
        let stdin = self.stdin.as_mut().expect("stdin still open");
        write!(stdin, "Content-Length: {}\r\n\r\n{}", body.len(), body)
            .expect("Failed to write message");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Send a request and wait for its response
    pub fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        let mut message = envelope(method, params);
        message["id"] = json!(id);
        self.send(message);
        self.wait_for(|m| m.get("id") == Some(&json!(id)) && m.get("method").is_none())
    }

    pub fn notify(&mut self, method: &str, params: Value) {
        self.send(envelope(method, params));
    }

    /// Next server message matching `predicate`; others are skipped
    pub fn wait_for(&self, predicate: impl Fn(&Value) -> bool) -> Value {
        loop {
            let message = self
                .messages
                .recv_timeout(MESSAGE_TIMEOUT)
                .expect("Timeout waiting for server message");
            if predicate(&message) {
                return message;
            }
        }
    }

    pub fn next_diagnostics(&self) -> Value {
        let message = self.wait_for(|m| {
            m.get("method").and_then(|v| v.as_str()) == Some("textDocument/publishDiagnostics")
        });
        message["params"].clone()
    }

    pub fn open(&mut self, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": { "uri": URI, "languageId": "pgn", "version": 1, "text": text }
            }),
        );
    }

    pub fn change(&mut self, version: i32, changes: Value) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": URI, "version": version },
                "contentChanges": changes
            }),
        );
    }

    /// Run the shutdown/exit sequence and return the exit status
    pub fn shutdown(mut self, id: i64) -> ExitStatus {
        let response = self.request(id, "shutdown", Value::Null);
        assert_eq!(response["result"], Value::Null);

        self.notify("exit", Value::Null);
        drop(self.stdin.take());

        let start = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait().expect("Error checking server status") {
                return status;
            }
            assert!(start.elapsed() < MESSAGE_TIMEOUT, "Server did not exit");
            thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// JSON-RPC message without an id; `Null` params are left out
fn envelope(method: &str, params: Value) -> Value {
    let mut message = json!({ "jsonrpc": "2.0", "method": method });
    if !params.is_null() {
        message["params"] = params;
    }
    message
}

fn read_message(reader: &mut impl BufRead) -> Option<Value> {
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(length) = line.strip_prefix("Content-Length:") {
            content_length = length.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0u8; content_length?];
    reader.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

pub fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Value {
    json!({
        "start": { "line": sl, "character": sc },
        "end": { "line": el, "character": ec }
    })
}

/// Messages of a publishDiagnostics payload
pub fn messages(params: &Value) -> Vec<String> {
    params["diagnostics"]
        .as_array()
        .expect("diagnostics array")
        .iter()
        .map(|d| d["message"].as_str().unwrap_or_default().to_string())
        .collect()
}
