//! Wire types for the hub's newline-delimited JSON RPC channel.
//!
//! Each direction of a connection carries one JSON object per line: a
//! [`Request`] (method name plus positional/keyword arguments) answered by
//! exactly one [`Response`] carrying the same `id`. Both the façade-facing
//! side (client/EP → hub) and the reverse-dispatch side (hub → peer) use
//! this same shape; which end a frame is travelling is determined by who
//! holds the connection, not by the frame itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};

/// An outbound or inbound RPC call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlates this call with its [`Response`].
    pub id: u64,
    /// The exposed method name, e.g. `"login"` or `"start_ep"`.
    pub method: String,
    /// Positional arguments, in call order.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            args,
            kwargs: Map::new(),
        }
    }

    /// Fetch a positional argument as a string, or a descriptive error.
    pub fn arg_str(&self, index: usize) -> Result<&str, String> {
        self.args
            .get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("argument {index} to {} must be a string", self.method))
    }
}

/// The reply to a [`Request`]. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// A typed substitute for variadic `args, kwargs` forwarding (spec §9):
/// a command name plus a structured parameter map, used by façade entries
/// like `run_plugin` that the original dispatched dynamically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Read one newline-delimited JSON value from `reader`, or `Ok(None)` on
/// clean EOF.
pub fn read_line_json<R: BufRead, T: serde::de::DeserializeOwned>(
    reader: &mut R,
) -> io::Result<Option<T>> {
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    let value = serde_json::from_str(line.trim_end())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// Write one value as newline-delimited JSON and flush.
pub fn write_line_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    let encoded = serde_json::to_string(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(encoded.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_request_roundtrip() {
        let req = Request::new(1, "login", vec![Value::String("alice".into())]);
        let encoded = serde_json::to_string(&req).unwrap();
        let decoded: Request = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, 1);
        assert_eq!(decoded.method, "login");
        assert_eq!(decoded.arg_str(0).unwrap(), "alice");
    }

    #[test]
    fn test_arg_str_missing() {
        let req = Request::new(1, "login", vec![]);
        assert!(req.arg_str(0).is_err());
    }

    #[test]
    fn test_response_ok_and_err_are_mutually_exclusive() {
        let ok = Response::ok(1, Value::Bool(true));
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());

        let err = Response::err(1, "boom");
        assert!(err.result.is_none());
        assert_eq!(err.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_write_then_read_line_json() {
        let req = Request::new(42, "echo", vec![Value::String("hi".into())]);
        let mut buf: Vec<u8> = Vec::new();
        write_line_json(&mut buf, &req).unwrap();
        assert!(buf.ends_with(b"\n"));

        let mut reader = BufReader::new(buf.as_slice());
        let decoded: Request = read_line_json(&mut reader).unwrap().unwrap();
        assert_eq!(decoded.id, 42);
        assert_eq!(decoded.method, "echo");
    }

    #[test]
    fn test_read_line_json_eof() {
        let mut reader = BufReader::new(&b""[..]);
        let decoded: Option<Request> = read_line_json(&mut reader).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_command_envelope_roundtrip() {
        let mut params = Map::new();
        params.insert("verbose".to_string(), Value::Bool(true));
        let env = CommandEnvelope {
            command: "run_plugin".to_string(),
            params,
        };
        let encoded = serde_json::to_string(&env).unwrap();
        let decoded: CommandEnvelope = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.command, "run_plugin");
        assert_eq!(decoded.params.get("verbose"), Some(&Value::Bool(true)));
    }
}
