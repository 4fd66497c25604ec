//! RPC method handler for the history viewer JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.
//! `handle_method` dispatches a method call to the controllers held by `App`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::app::App;
use crate::controllers::pagination;
use crate::controllers::screenshot_controller::Preconfirmed;
use crate::types::page::LoadOutcome;
use crate::types::screenshot::ImageSource;
use crate::types::view::View;

fn param_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn optional_u32(params: &Value, key: &str) -> Result<Option<u32>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("invalid {}: {}", key, value)),
    }
}

fn param_u32(params: &Value, key: &str) -> Result<u32, String> {
    optional_u32(params, key)?.ok_or_else(|| format!("missing {}", key))
}

/// Optional `YYYY-MM-DD` parameter; `null`, `""` and absence all mean unset.
fn param_date(params: &Value, key: &str) -> Result<Option<NaiveDate>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("invalid {}: {}", key, s)),
        Some(other) => Err(format!("invalid {}: {}", key, other)),
    }
}

fn required_date(params: &Value, key: &str) -> Result<NaiveDate, String> {
    param_date(params, key)?.ok_or_else(|| format!("missing {}", key))
}

fn history_state(app: &App) -> Value {
    json!({
        "snapshot": app.history.snapshot(),
        "pages": app.history.page_numbers(),
    })
}

fn screenshot_state(app: &App) -> Value {
    json!({
        "snapshot": app.screenshots.snapshot(),
        "pages": app.screenshots.pagination_window(),
    })
}

fn history_outcome(app: &App, outcome: LoadOutcome) -> Value {
    json!({ "outcome": outcome, "state": history_state(app) })
}

fn screenshot_outcome(app: &App, outcome: LoadOutcome) -> Value {
    json!({ "outcome": outcome, "state": screenshot_state(app) })
}

/// Dispatch a JSON-RPC method call to the appropriate controller.
///
/// Returns `Ok(Value)` on success or `Err(String)` carrying the user-facing message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── View shell ───
        "view.get" => Ok(json!({"view": app.current_view()})),
        "view.set" => {
            let view: View = param_str(params, "view")?.parse()?;
            app.set_view(view);
            let outcome = app.mount_current().await?;
            let state = match view {
                View::History => history_state(app),
                View::Screenshots => screenshot_state(app),
            };
            Ok(json!({"view": view, "outcome": outcome, "state": state}))
        }

        // ─── History ───
        "history.state" => Ok(history_state(app)),
        "history.load" => {
            let page = optional_u32(params, "page")?.unwrap_or(1);
            let date = param_date(params, "date")?;
            let outcome = app
                .history
                .load(page, date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.change_page" => {
            let page = param_u32(params, "page")?;
            let outcome = app
                .history
                .change_page(page)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.next" => {
            let outcome = app
                .history
                .next_page()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.previous" => {
            let outcome = app
                .history
                .previous_page()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.set_filter" => {
            let date = required_date(params, "date")?;
            let outcome = app
                .history
                .set_filter(date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.clear_filter" => {
            let outcome = app
                .history
                .clear_filter()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(history_outcome(app, outcome))
        }
        "history.delete" => {
            let id = param_str(params, "id")?;
            let date = required_date(params, "date")?;
            let removed = app
                .history
                .delete_item(id, date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(json!({"ok": true, "removed": removed, "state": history_state(app)}))
        }
        "history.delete_date" => {
            let date = required_date(params, "date")?;
            let removed = app
                .history
                .delete_all_for_date(date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(json!({
                "ok": true,
                "removed": removed,
                "message": format!("All history for {} has been deleted.", date),
                "state": history_state(app),
            }))
        }

        // ─── Screenshots ───
        "screenshots.state" => Ok(screenshot_state(app)),
        "screenshots.load" => {
            let page = optional_u32(params, "page")?.unwrap_or(1);
            let date = param_date(params, "date")?;
            let outcome = app
                .screenshots
                .load(page, date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.reload" => {
            let outcome = app
                .screenshots
                .reload()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.change_page" => {
            let page = param_u32(params, "page")?;
            let outcome = app
                .screenshots
                .change_page(page)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.next" => {
            let outcome = app
                .screenshots
                .next_page()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.previous" => {
            let outcome = app
                .screenshots
                .previous_page()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.set_filter" => {
            let date = required_date(params, "date")?;
            let outcome = app
                .screenshots
                .set_filter(date)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.clear_filter" => {
            let outcome = app
                .screenshots
                .clear_filter()
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(screenshot_outcome(app, outcome))
        }
        "screenshots.delete" => {
            let id = param_str(params, "id")?;
            let removed = app
                .screenshots
                .delete_item(id)
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(json!({"ok": true, "removed": removed, "state": screenshot_state(app)}))
        }
        "screenshots.delete_date" => {
            // The front end shows the confirmation dialog and reports the answer.
            let confirmed = params
                .get("confirmed")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let date = match param_date(params, "date")? {
                Some(date) => Some(date),
                None => app.screenshots.filter_date(),
            };
            let result = app
                .screenshots
                .delete_all_for_date(date, &Preconfirmed(confirmed))
                .await
                .map_err(|e| e.user_message().to_string())?;
            Ok(json!({"result": result, "state": screenshot_state(app)}))
        }
        "screenshots.fullscreen.open" => {
            let index = param_u32(params, "index")? as usize;
            let opened = app.screenshots.open_fullscreen(index);
            Ok(json!({"opened": opened, "index": app.screenshots.fullscreen_index()}))
        }
        "screenshots.fullscreen.close" => {
            app.screenshots.close_fullscreen();
            Ok(json!({"index": null}))
        }
        "screenshots.fullscreen.next" => {
            Ok(json!({"index": app.screenshots.next_screenshot()}))
        }
        "screenshots.fullscreen.previous" => {
            Ok(json!({"index": app.screenshots.previous_screenshot()}))
        }
        "screenshots.image" => {
            let entry = app
                .screenshots
                .fullscreen_entry()
                .ok_or("full-screen view is closed")?;
            match entry.image_source().map_err(|e| e.to_string())? {
                ImageSource::Url(url) => Ok(json!({"id": entry.id, "kind": "url", "url": url})),
                ImageSource::Inline { mime, bytes } => Ok(json!({
                    "id": entry.id,
                    "kind": "inline",
                    "mime": mime,
                    "size": bytes.len(),
                    "data": BASE64.encode(&bytes),
                })),
            }
        }

        // ─── Pagination ───
        "pagination.window" => {
            let current = param_u32(params, "current")?;
            let total = param_u32(params, "total")?;
            Ok(json!(pagination::pagination_window(current, total)))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
