//! Request handlers for the tool server

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::protocol::{
    CallParams, PROTOCOL_VERSION, Request, Response, ToolResult, error_codes,
};
use super::tools::{Tool, definitions};
use crate::core::{PackageService, PkgError, Result, format_error_with_suggestion};

/// Parse and answer one line of input; `None` for notifications
pub async fn handle_line(service: &PackageService, line: &str) -> Option<Response> {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(service, request).await,
        Err(e) => {
            tracing::debug!("unparsable request: {e}");
            Some(Response::error(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {e}"),
            ))
        }
    }
}

/// Dispatch one request
pub async fn handle_request(service: &PackageService, request: Request) -> Option<Response> {
    let Some(id) = request.id else {
        tracing::debug!("notification {}", request.method);
        return None;
    };

    if !request.jsonrpc.is_empty() && request.jsonrpc != "2.0" {
        return Some(Response::error(
            id,
            error_codes::INVALID_REQUEST,
            format!("unsupported jsonrpc version {}", request.jsonrpc),
        ));
    }

    let response = match request.method.as_str() {
        "initialize" => Response::success(id, initialize_result(service)),
        "ping" => Response::success(id, json!({})),
        "tools/list" => Response::success(id, json!({ "tools": definitions() })),
        "tools/call" => match serde_json::from_value::<CallParams>(request.params) {
            Ok(call) => match call.name.parse::<Tool>() {
                Ok(tool) => Response::success(id, call_tool(service, tool, call.arguments).await),
                Err(message) => Response::error(id, error_codes::INVALID_PARAMS, message),
            },
            Err(e) => Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("invalid tools/call params: {e}"),
            ),
        },
        other => Response::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        ),
    };
    Some(response)
}

fn initialize_result(service: &PackageService) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": format!(
            "Manages operating system packages through the {} backend.",
            service.backend_name()
        ),
    })
}

/// Run a tool on the blocking pool and wrap the outcome as a tool result
pub async fn call_tool(service: &PackageService, tool: Tool, arguments: Value) -> ToolResult {
    let service = service.clone();
    let outcome = tokio::task::spawn_blocking(move || dispatch(&service, tool, arguments)).await;

    match outcome {
        Ok(Ok(text)) => ToolResult::text(text),
        Ok(Err(e)) => {
            tracing::debug!("{} failed: {}", tool.name(), format_error_with_suggestion(&e));
            ToolResult::failure(e.kind().as_str(), e.to_string())
        }
        Err(e) => {
            tracing::error!("{} panicked or was cancelled: {e}", tool.name());
            ToolResult::failure("internal", format!("{} did not complete", tool.name()))
        }
    }
}

/// Call the service; structured results come back as JSON text, transcripts verbatim
fn dispatch(service: &PackageService, tool: Tool, arguments: Value) -> Result<String> {
    match tool {
        Tool::ListPackages => to_json(&service.list_packages(&params(arguments)?)?),
        Tool::QueryPackage => to_json(&service.query_package(&params(arguments)?)?),
        Tool::ListRepos => to_json(&service.list_repos(&params(arguments)?)?),
        Tool::ModifyRepo => to_json(&service.modify_repo(&params(arguments)?)?),
        Tool::RefreshRepos => {
            service.refresh_repos(&params(arguments)?)?;
            Ok("repositories refreshed".to_string())
        }
        Tool::ListPatches => to_json(&service.list_patches(&params(arguments)?)?),
        Tool::InstallPatches => to_json(&service.install_patches(&params(arguments)?)?),
        Tool::SearchPackage => to_json(&service.search_packages(&params(arguments)?)?),
        Tool::InstallPackage => service.install_package(&params(arguments)?),
        Tool::RemovePackage => service.remove_package(&params(arguments)?),
        Tool::UpdatePackage => service.update_package(&params(arguments)?),
    }
}

/// Missing arguments mean all defaults
fn params<T: DeserializeOwned + Default>(arguments: Value) -> Result<T> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments)
        .map_err(|e| PkgError::MalformedInput(format!("invalid arguments: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| PkgError::Parse {
        tool: "json".to_string(),
        message: e.to_string(),
    })
}
