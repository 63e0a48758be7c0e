// src/sources/incident.rs
//
// Source Adapter A: direction-closure state from the regional incident
// listing. Two-step fetch: a pointer document names the current dataset
// path and cache-busting token, then the dataset itself is retrieved at the
// resolved path. The adapter only ever reports a direction.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::IncidentFeedConfig;
use crate::fetch::FetchClient;
use crate::sources::ClosureSource;
use crate::status::{Direction, ExpressStatus};

// Incident rows are positional JSON arrays; only two slots matter here.
const MESSAGE_IDX: usize = 3;
const STATUS_IDX: usize = 4;

const STATUS_CLOSED: &str = "Closed";

#[derive(Debug, Deserialize)]
struct PathPointer {
    path: String,
    #[serde(rename = "cacheBuster")]
    cache_buster: String,
}

#[derive(Debug, Deserialize)]
struct IncidentPayload {
    #[serde(default)]
    incidents: Vec<Value>,
}

pub struct IncidentFeed {
    client: FetchClient,
    cfg: IncidentFeedConfig,
}

impl IncidentFeed {
    pub fn new(client: FetchClient, cfg: IncidentFeedConfig) -> Self {
        Self { client, cfg }
    }

    /// Pointer fetch, then dataset fetch. A failed pointer fetch returns
    /// `None` immediately; there is no fallback path guessing.
    async fn fetch_incidents(&self) -> Option<Vec<Value>> {
        let pointer: PathPointer = self.client.get_json(&self.cfg.pointer_url).await?;
        let url = self.cfg.data_url(&pointer.path, &pointer.cache_buster);
        let payload: IncidentPayload = self.client.get_json(&url).await?;
        Some(payload.incidents)
    }

    /// Scan the incident list for active closures. A direction is
    /// closure-active when some row's message starts with that direction's
    /// configured prefix and the row's status is "Closed". Rows missing
    /// either field are skipped.
    fn derive_direction(&self, incidents: &[Value]) -> Direction {
        let mut active = Vec::with_capacity(2);
        for (direction, prefix) in self.cfg.direction_prefixes() {
            let hit = incidents.iter().any(|row| {
                matches!(
                    (row_message(row), row_status(row)),
                    (Some(msg), Some(status)) if msg.starts_with(prefix) && status == STATUS_CLOSED
                )
            });
            if hit {
                active.push(direction);
            }
        }
        match active.as_slice() {
            [] => Direction::Unknown,
            [one] => *one,
            // Both directions closure-active at once.
            _ => Direction::Closed,
        }
    }
}

fn row_message(row: &Value) -> Option<&str> {
    row.get(MESSAGE_IDX)?.as_str()
}

fn row_status(row: &Value) -> Option<&str> {
    row.get(STATUS_IDX)?.as_str()
}

#[async_trait]
impl ClosureSource for IncidentFeed {
    async fn poll(&self) -> Option<ExpressStatus> {
        let incidents = self.fetch_incidents().await?;
        Some(ExpressStatus::direction_only(
            self.derive_direction(&incidents),
        ))
    }

    fn name(&self) -> &'static str {
        "incident"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed() -> IncidentFeed {
        IncidentFeed::new(FetchClient::default(), IncidentFeedConfig::default())
    }

    fn incident(message: &str, status: &str) -> Value {
        json!([
            41.9,
            -87.7,
            "10:15 AM",
            message,
            status,
            0,
            0,
            0,
            "2024-03-01T10:15:00Z",
            "2024-03-01T10:20:00Z"
        ])
    }

    #[test]
    fn no_matching_closures_is_unknown() {
        let rows = vec![
            incident("Dan Ryan (I-90/94) at 35th St", "Closed"),
            incident("Kennedy (I-90/94) Express Lanes West", "Construction"),
        ];
        assert_eq!(feed().derive_direction(&rows), Direction::Unknown);
    }

    #[test]
    fn single_matching_closure_names_that_direction() {
        let west = vec![incident(
            "Kennedy (I-90/94) Express Lanes West of Ohio St",
            "Closed",
        )];
        assert_eq!(feed().derive_direction(&west), Direction::Inbound);

        let east = vec![incident(
            "Kennedy (I-90/94) Express Lanes East of Addison",
            "Closed",
        )];
        assert_eq!(feed().derive_direction(&east), Direction::Outbound);
    }

    #[test]
    fn both_directions_closed_collapses_to_closed() {
        let rows = vec![
            incident("Kennedy (I-90/94) Express Lanes West at Ohio", "Closed"),
            incident("Kennedy (I-90/94) Express Lanes East at Montrose", "Closed"),
        ];
        assert_eq!(feed().derive_direction(&rows), Direction::Closed);
    }

    #[test]
    fn prefix_match_requires_closed_status() {
        let rows = vec![incident("Kennedy (I-90/94) Express Lanes West", "Cleared")];
        assert_eq!(feed().derive_direction(&rows), Direction::Unknown);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            json!([1, 2]),
            json!("not an array"),
            json!([0, 0, "t", 42, 7]),
            incident("Kennedy (I-90/94) Express Lanes East", "Closed"),
        ];
        assert_eq!(feed().derive_direction(&rows), Direction::Outbound);
    }

    #[test]
    fn empty_list_is_unknown() {
        assert_eq!(feed().derive_direction(&[]), Direction::Unknown);
    }
}
