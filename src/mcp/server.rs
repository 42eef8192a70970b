/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Routes tool calls to the habit and analytics tools
/// 3. Sends JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{HabitAnalyticsServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    server: HabitAnalyticsServer,
    /// Whether the client has finished the initialize handshake
    initialized: bool,
}

impl McpServer {
    pub fn new(server: HabitAnalyticsServer) -> Self {
        Self {
            server,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        match &params.client_info {
            Some(client) => info!("MCP client connected: {} {}", client.name, client.version),
            None => info!("MCP client connected"),
        }
        if let Some(version) = params.protocol_version.as_deref() {
            if version != MCP_VERSION {
                warn!("Client requested protocol {}, answering with {}", version, MCP_VERSION);
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Analytics MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        match tool_definitions() {
            Ok(tools) => JsonRpcResponse::success(id, json!({ "tools": tools })),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to build tool schemas: {}", e),
                None,
            ),
        }
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let name = tool_params.name;
        match self.call_tool(&name, tool_params.arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => to_response(id, &ToolCallResult::success(text)),
                Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
            },
            // Malformed arguments are a protocol error; everything else is
            // reported back to the model as a failed tool result
            Err(e @ ToolError::InvalidParams(_)) => {
                JsonRpcResponse::error(id, e.code(), e.to_string(), None)
            }
            Err(e) => {
                warn!("Tool '{}' failed (code {}): {}", name, e.code(), e);
                to_response(id, &ToolCallResult::error(e.to_string()))
            }
        }
    }

    /// Run one tool against the server's storage as of the request's `today`
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let storage = self.server.storage();
        let engine = self.server.analytics();
        let today = self.server.today();
        let args = Value::Object(arguments);

        debug!("Calling tool '{}' with today = {}", name, today);

        match name {
            "habit_create" => to_value(tools::create_habit(storage, parse_args(args)?, today)?),
            "habit_update" => to_value(tools::update_habit(storage, parse_args(args)?)?),
            "habit_delete" => to_value(tools::delete_habit(storage, parse_args(args)?)?),
            "habit_list" => to_value(tools::list_habits(storage, engine, parse_args(args)?, today)?),
            "habit_streak" => to_value(tools::habit_streak(storage, engine, parse_args(args)?, today)?),
            "checkin_log" => to_value(tools::log_check_in(storage, engine, parse_args(args)?, today)?),
            "checkin_list" => to_value(tools::list_check_ins(storage, parse_args(args)?)?),
            "checkin_delete" => to_value(tools::delete_check_in(storage, parse_args(args)?)?),
            "stats_overview" => {
                to_value(tools::stats_overview(storage, engine, parse_args(args)?, today).await?)
            }
            "stats_habit" => to_value(tools::stats_habit(storage, engine, parse_args(args)?, today)?),
            "stats_calendar" => to_value(tools::stats_calendar(storage, engine, parse_args(args)?, today)?),
            _ => Err(ToolError::InvalidParams(format!("Unknown tool: {}", name))),
        }
    }
}

fn parse_args<P: DeserializeOwned>(args: Value) -> Result<P, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

fn to_value<T: Serialize>(result: T) -> Result<Value, ToolError> {
    Ok(serde_json::to_value(result)?)
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
    }
}

fn definition<P: JsonSchema>(name: &str, description: &str) -> Result<ToolDefinition, serde_json::Error> {
    Ok(ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schemars::schema_for!(P))?,
    })
}

/// Every tool this server provides, with input schemas derived from the
/// parameter structs
pub fn tool_definitions() -> Result<Vec<ToolDefinition>, serde_json::Error> {
    Ok(vec![
        definition::<tools::CreateHabitParams>("habit_create", "Create a new habit to track")?,
        definition::<tools::UpdateHabitParams>(
            "habit_update",
            "Rename, describe, archive or unarchive a habit",
        )?,
        definition::<tools::DeleteHabitParams>("habit_delete", "Delete a habit and all of its check-ins")?,
        definition::<tools::ListHabitsParams>(
            "habit_list",
            "List habits with their current streak, longest streak and total check-ins",
        )?,
        definition::<tools::StreakParams>("habit_streak", "Current and longest streak for one habit")?,
        definition::<tools::LogCheckInParams>(
            "checkin_log",
            "Record a habit as done (or missed) for today or a given date; logging the same day again updates it",
        )?,
        definition::<tools::ListCheckInsParams>("checkin_list", "List check-ins, newest first")?,
        definition::<tools::DeleteCheckInParams>("checkin_delete", "Delete a single check-in")?,
        definition::<tools::OverviewParams>(
            "stats_overview",
            "Overview across all habits: today's progress, weekly and monthly completion, and per-habit streaks",
        )?,
        definition::<tools::HabitStatsParams>(
            "stats_habit",
            "Streaks and completion rate for one habit over a week, month, year or since creation",
        )?,
        definition::<tools::CalendarParams>(
            "stats_calendar",
            "Calendar heatmap of completed check-ins for one year",
        )?,
    ])
}
