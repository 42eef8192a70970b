/// End-to-end tests: SQLite storage, the analytics engine and the MCP server
use habit_analytics_mcp::analytics::AnalyticsConfig;
use habit_analytics_mcp::mcp::McpServer;
use habit_analytics_mcp::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

fn d(s: &str) -> CalendarDate {
    CalendarDate::parse(s).unwrap()
}

async fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments}
    });
    let response = server.process_line(&request.to_string()).await.expect("tool call gets a response");
    serde_json::to_value(response).unwrap()
}

/// Parse the JSON text of a successful tool result
fn tool_output(response: &Value) -> Value {
    assert_eq!(response["result"]["isError"], json!(false), "unexpected failure: {}", response);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn mcp_server(today: &str) -> McpServer {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let server = HabitAnalyticsServer::with_storage(storage, AnalyticsEngine::new(), Some(d(today)));
        McpServer::new(server)
    }

    #[tokio::test]
    async fn test_handshake_and_tool_listing() {
        let mut server = mcp_server("2024-06-10");

        let init = server
            .process_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#)
            .await
            .unwrap();
        let init = serde_json::to_value(init).unwrap();
        assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));

        let notification = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(notification.is_none());
        assert!(server.is_initialized());

        let list = server
            .process_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let list = serde_json::to_value(list).unwrap();
        let tools = list["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 11);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let mut server = mcp_server("2024-06-10");

        let garbage = serde_json::to_value(server.process_line("{not json").await.unwrap()).unwrap();
        assert_eq!(garbage["error"]["code"], json!(-32700));

        let unknown = serde_json::to_value(
            server
                .process_line(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(unknown["error"]["code"], json!(-32601));

        let bad_tool = call(&mut server, 4, "habit_fly", json!({})).await;
        assert_eq!(bad_tool["error"]["code"], json!(-32602));

        let missing_arg = call(&mut server, 5, "habit_create", json!({})).await;
        assert_eq!(missing_arg["error"]["code"], json!(-32602));

        let not_found = call(&mut server, 6, "habit_streak", json!({"habit_id": HabitId::new().to_string()})).await;
        assert_eq!(not_found["result"]["isError"], json!(true));
    }

    #[tokio::test]
    async fn test_habit_workflow_over_mcp() {
        let mut server = mcp_server("2024-06-10");

        let created = tool_output(&call(&mut server, 1, "habit_create", json!({"name": "Run"})).await);
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["habit"]["created_on"], json!("2024-06-10"));

        for date in ["2024-06-08", "2024-06-09"] {
            call(&mut server, 2, "checkin_log", json!({"habit_id": habit_id, "date": date})).await;
        }
        let logged = tool_output(&call(&mut server, 3, "checkin_log", json!({"habit_id": habit_id})).await);
        assert_eq!(logged["check_in"]["date"], json!("2024-06-10"));
        assert_eq!(logged["current_streak"], json!(3));

        let streak = tool_output(&call(&mut server, 4, "habit_streak", json!({"habit_id": habit_id})).await);
        assert_eq!(streak["current_streak"], json!(3));
        assert_eq!(streak["at_risk"], json!(false));

        let overview = tool_output(&call(&mut server, 5, "stats_overview", json!({})).await);
        assert_eq!(overview["total_habits"], json!(1));
        assert_eq!(overview["today_completion_rate"], json!(100.0));
        assert_eq!(overview["habit_stats"][0]["longest_streak"], json!(3));
        // Backdated check-ins exceed the single day since creation
        assert_eq!(overview["habit_stats"][0]["completion_rate"], json!(100.0));

        let calendar = tool_output(&call(&mut server, 6, "stats_calendar", json!({})).await);
        assert_eq!(calendar["year"], json!(2024));
        assert_eq!(calendar["days"].as_array().unwrap().len(), 366);

        let detail = tool_output(&call(&mut server, 7, "stats_habit", json!({"habit_id": habit_id, "period": "week"})).await);
        assert_eq!(detail["period"], json!("week"));
        assert_eq!(detail["total_check_ins"], json!(3));

        let archived = tool_output(
            &call(&mut server, 8, "habit_update", json!({"habit_id": habit_id, "is_archived": true})).await,
        );
        assert_eq!(archived["habit"]["is_archived"], json!(true));

        let overview = tool_output(&call(&mut server, 9, "stats_overview", json!({})).await);
        assert_eq!(overview["archived_habits"], json!(1));
        assert_eq!(overview["habit_stats"], json!([]));
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit = Habit::new("Journal".to_string(), None, None, None, None, d("2024-01-01")).unwrap();
        {
            let storage = SqliteStorage::new(db_path.clone()).unwrap();
            storage.create_habit(&habit).unwrap();
            storage
                .upsert_check_in(&CheckIn::new(habit.id.clone(), d("2024-01-01"), true, None).unwrap())
                .unwrap();
        }

        let storage = SqliteStorage::new(db_path).unwrap();
        let dates = storage.completed_dates_for_habit(&habit.id).unwrap();
        assert_eq!(dates.ascending(), &[d("2024-01-01")]);
    }

    #[tokio::test]
    async fn test_aggregate_over_sqlite() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).unwrap();

        let mut habits = Vec::new();
        for (i, name) in ["Run", "Read", "Meditate"].iter().enumerate() {
            let habit = Habit::new(name.to_string(), None, None, None, None, d("2024-03-01")).unwrap();
            storage.create_habit(&habit).unwrap();
            for offset in 0..=i as i64 {
                let date = d("2024-03-10").add_days(-offset);
                storage
                    .upsert_check_in(&CheckIn::new(habit.id.clone(), date, true, None).unwrap())
                    .unwrap();
            }
            habits.push(habit.to_ref());
        }

        let engine = AnalyticsEngine::with_config(AnalyticsConfig { max_concurrent_fetches: 2 });
        let stats = engine.aggregate_stats(&habits, d("2024-03-10"), &storage).await.unwrap();

        assert_eq!(stats.total_habits, 3);
        assert_eq!(stats.today_completed, 3);
        assert_eq!(stats.week_completion, 100.0);
        assert!(stats.skipped_habits.is_empty());

        // Rows keep the input order
        let names: Vec<_> = stats.habit_stats.iter().map(|s| s.habit_name.as_str()).collect();
        assert_eq!(names, vec!["Run", "Read", "Meditate"]);
        let streaks: Vec<_> = stats.habit_stats.iter().map(|s| s.current_streak).collect();
        assert_eq!(streaks, vec![1, 2, 3]);
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");

        let _: &dyn HabitStorage = &storage;
    }
}
