//! Realtime change feed for the roster.
//!
//! A background task LISTENs on the `user_accounts_changes` channel. Every
//! notification, whatever its payload, triggers a full re-fetch that is
//! merged into the shared roster and re-broadcast to SSE subscribers. A
//! fetch failure switches the roster to the demo dataset; the next
//! successful fetch switches it back.

use serde_json::Value;
use sqlx::postgres::PgListener;
use tracing::{info, warn};

use crate::accounts::demo::demo_users;
use crate::accounts::repo;
use crate::accounts::roster::RosterEvent;
use crate::state::AppState;

const CHANNEL: &str = "user_accounts_changes";
const RECONNECT_DELAY_SECS: u64 = 5;

/// Fetches the roster and merges it in. Never errors: a store failure loads
/// the demo dataset instead.
pub async fn refresh(state: &AppState) {
    let mark = state.roster.begin_refresh();
    match repo::fetch_all(&state.db).await {
        Ok(rows) => {
            state.roster.complete_refresh(rows, mark, false);
        }
        Err(e) => {
            warn!("Roster fetch failed, serving demo data: {e}");
            state.roster.complete_refresh(demo_users(), mark, true);
        }
    }
}

/// Runs the listener loop forever, reconnecting with a fixed delay after
/// any listener error. Spawned once at startup.
pub async fn run(state: AppState) {
    refresh(&state).await;
    info!("Roster loaded (demo: {})", state.roster.is_demo());

    loop {
        match listen_once(&state).await {
            Ok(()) => warn!("Roster change listener closed, reconnecting"),
            Err(e) => warn!("Roster change listener error: {e}, reconnecting"),
        }
        tokio::time::sleep(std::time::Duration::from_secs(RECONNECT_DELAY_SECS)).await;
    }
}

async fn listen_once(state: &AppState) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(&state.db).await?;
    listener.listen(CHANNEL).await?;
    info!("Listening for roster changes on '{CHANNEL}'");

    loop {
        let notification = listener.recv().await?;
        let event = classify(notification.payload());
        refresh(state).await;
        state.roster.publish(event);
    }
}

/// Maps a notification payload to a toast event. Payloads are parsed
/// leniently: a malformed or unknown payload still refreshes the roster, it
/// just gets the generic wording.
fn classify(payload: &str) -> RosterEvent {
    let event_type = serde_json::from_str::<Value>(payload)
        .ok()
        .and_then(|v| {
            v.get("event_type")
                .or_else(|| v.get("eventType"))
                .and_then(Value::as_str)
                .map(str::to_uppercase)
        });

    match event_type.as_deref() {
        Some("INSERT") => RosterEvent::created(),
        Some("UPDATE") => RosterEvent::updated(),
        Some("DELETE") => RosterEvent::deleted(),
        _ => {
            warn!("Unrecognized roster change payload: {payload}");
            RosterEvent::refreshed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_map_to_toast_events() {
        assert_eq!(classify(r#"{"event_type":"INSERT","id":"u1"}"#).kind, "created");
        assert_eq!(classify(r#"{"event_type":"update"}"#).kind, "updated");
        assert_eq!(classify(r#"{"eventType":"DELETE"}"#).kind, "deleted");
    }

    #[test]
    fn malformed_payloads_still_yield_a_refresh_event() {
        assert_eq!(classify("not json").kind, "refreshed");
        assert_eq!(classify(r#"{"event_type":"TRUNCATE"}"#).kind, "refreshed");
        assert_eq!(classify("{}").kind, "refreshed");
    }
}
