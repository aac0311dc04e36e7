//! Host process spoken to over newline-delimited JSON on stdin/stdout.
//!
//! Each request is one line `{"op": "api/v1/...", "params": {...}}`; the host
//! answers with exactly one JSON line. An answer carrying a string `error`
//! field is a host failure.

use super::{HostBridge, HostOp};
use crate::config::HostConfig;
use crate::error::{HarnessError, Result};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::{debug, error, warn};

pub struct StdioHost {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StdioHost {
    pub fn spawn(config: &HostConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %config.command, args = ?config.args, "spawning host process");
        let mut child = cmd.spawn().map_err(|e| {
            error!(err = %e, command = %config.command, "failed to spawn host");
            HarnessError::Host(format!("failed to spawn {}: {}", config.command, e))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Host("host stdin was not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Host("host stdout was not piped".to_string()))?;

        Ok(StdioHost {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl HostBridge for StdioHost {
    fn call(&mut self, op: HostOp, request: Value) -> Result<Value> {
        let envelope = json!({ "op": op.as_str(), "params": request });
        writeln!(self.stdin, "{}", envelope)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(HarnessError::Host(format!("host closed its output during {}", op)));
        }
        parse_answer(op, &line)
    }
}

impl Drop for StdioHost {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(err = %e, "host already exited");
        }
        match self.child.wait() {
            Ok(status) => debug!(%status, "host process reaped"),
            Err(e) => warn!(err = %e, "failed to reap host process"),
        }
    }
}

fn parse_answer(op: HostOp, line: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(line.trim())?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        warn!(%op, reason = message, "host rejected request");
        return Err(HarnessError::Host(message.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let value = parse_answer(HostOp::MineEmptyBlocks, "{\"session_id\":1,\"block_height\":40}\n").unwrap();
        assert_eq!(value["block_height"], 40);

        let err = parse_answer(HostOp::NewSession, r#"{"error":"deployment plan not found"}"#).unwrap_err();
        assert_eq!(err, HarnessError::Host("deployment plan not found".to_string()));

        assert!(matches!(
            parse_answer(HostOp::NewSession, "not json"),
            Err(HarnessError::Json(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exchange_with_shell_host() {
        // `cat` answers each request with the request itself.
        let config = HostConfig {
            command: "cat".to_string(),
            args: Vec::new(),
            working_dir: None,
        };
        let mut host = StdioHost::spawn(&config).unwrap();
        let answer = host
            .call(HostOp::TerminateSession, json!({ "sessionId": 4 }))
            .unwrap();
        assert_eq!(answer["op"], "api/v1/terminate_session");
        assert_eq!(answer["params"]["sessionId"], 4);

        let answer = host.call(HostOp::MineEmptyBlocks, json!({ "count": 2 })).unwrap();
        assert_eq!(answer["op"], "api/v1/mine_empty_blocks");
    }

    #[test]
    fn test_spawn_missing_command() {
        let config = HostConfig {
            command: "clarity-harness-no-such-host".to_string(),
            args: Vec::new(),
            working_dir: None,
        };
        assert!(matches!(StdioHost::spawn(&config), Err(HarnessError::Host(_))));
    }
}
