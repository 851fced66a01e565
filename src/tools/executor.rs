// Tool Executor
//
// Generic adapter behind every catalog row: validate arguments, build the
// request, call the signed client and wrap the outcome as an MCP tool
// result.

use reqwest::Method;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::api::SignedApiClient;
use crate::tools::catalog::{self, ArgLocation, ToolSpec};

/// Argument problems detected before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("arguments must be a JSON object")]
    ArgumentsNotObject,

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("argument '{name}' must be of type {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },
}

/// HTTP request derived from a tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Turn a tool row and its arguments into a request description.
///
/// `null` arguments are treated as an empty object. Arguments the tool does
/// not declare are ignored.
pub fn prepare(spec: &ToolSpec, arguments: &Value) -> Result<PreparedCall, ToolError> {
    let empty = Map::new();
    let args = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => return Err(ToolError::ArgumentsNotObject),
    };

    let mut path = spec.path.to_string();
    let mut query = Vec::new();
    let mut fields = Map::new();

    for arg in spec.args {
        let value = match args.get(arg.name) {
            None | Some(Value::Null) => {
                if arg.required {
                    return Err(ToolError::MissingArgument(arg.name));
                }
                continue;
            }
            Some(value) => value,
        };

        if !arg.kind.matches(value) {
            return Err(ToolError::WrongType {
                name: arg.name,
                expected: arg.kind.schema_name(),
            });
        }

        match arg.location {
            ArgLocation::Path => {
                let placeholder = format!("{{{}}}", arg.name);
                let encoded = urlencoding::encode(&scalar_text(value)).into_owned();
                path = path.replace(&placeholder, &encoded);
            }
            ArgLocation::Query => query.push((arg.field.to_string(), scalar_text(value))),
            ArgLocation::Body => {
                fields.insert(arg.field.to_string(), value.clone());
            }
        }
    }

    let body = if spec.verb.has_body() {
        for (key, value) in spec.fixed_body {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
        let fields = Value::Object(fields);
        Some(match spec.body_wrapper {
            Some(wrapper) => {
                let mut wrapped = Map::new();
                wrapped.insert(wrapper.to_string(), fields);
                Value::Object(wrapped)
            }
            None => fields,
        })
    } else {
        None
    };

    Ok(PreparedCall {
        method: spec.verb.method(),
        path,
        query,
        body,
    })
}

/// Plain text form of a scalar argument for paths and query strings.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// MCP tool result with a single text block.
pub fn tool_result(text: impl Into<String>, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text.into()
            }
        ],
        "isError": is_error
    })
}

/// Executes catalog tools against the payment API.
pub struct ToolExecutor {
    client: SignedApiClient,
}

impl ToolExecutor {
    pub fn new(client: SignedApiClient) -> Self {
        Self { client }
    }

    /// Descriptors of every tool this executor can run.
    pub fn list_tools(&self) -> Vec<Value> {
        catalog::descriptors()
    }

    /// Run the named tool and return an MCP tool result.
    ///
    /// Failures of any kind are reported inside the result with
    /// `isError: true`.
    pub async fn call(&self, name: &str, arguments: &Value) -> Value {
        info!("MCP tool call: {}", name);

        let prepared = match catalog::find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
            .and_then(|spec| prepare(spec, arguments))
        {
            Ok(prepared) => prepared,
            Err(e) => {
                error!("Rejected tool call {}: {}", name, e);
                return tool_result(format!("Invalid tool call: {}", e), true);
            }
        };

        let response = self
            .client
            .request(
                prepared.method,
                &prepared.path,
                &prepared.query,
                prepared.body.as_ref(),
            )
            .await;

        match response {
            Ok(json) => {
                let text = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
                tool_result(text, false)
            }
            Err(e) => {
                error!("Tool {} failed: {:#}", name, e);
                tool_result(format!("Request failed: {:#}", e), true)
            }
        }
    }
}
