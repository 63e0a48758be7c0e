//! Core record types shared by the source adapters, the reconciliation
//! engine and the API: corridor direction, congestion level, and the
//! normalized status record served to clients.

use serde::{Deserialize, Serialize};

/// Corridor flow direction, including the sentinel states.
///
/// `Closed` means both directions are closure-active at once; `Unknown` is
/// the universal safe fallback when the feeds disagree or are unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Unknown,
    Inbound,
    Outbound,
    Closed,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Unknown => "Unknown",
            Direction::Inbound => "Inbound",
            Direction::Outbound => "Outbound",
            Direction::Closed => "Closed",
        };
        f.write_str(s)
    }
}

/// Congestion classification as reported by the travel-time feed.
///
/// Unrecognized wire values deserialize as `Unknown` so feed drift degrades
/// to the sentinel instead of failing the whole payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLevel {
    Uncongested,
    Light,
    Medium,
    Heavy,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TrafficLevel {
    /// Human-readable label; the match is total so the compiler flags any
    /// new variant that lacks one.
    pub fn label(self) -> &'static str {
        match self {
            TrafficLevel::Uncongested => "Uncongested",
            TrafficLevel::Light => "Light Congestion",
            TrafficLevel::Medium => "Medium Congestion",
            TrafficLevel::Heavy => "Heavy Congestion",
            TrafficLevel::Unknown => "Unknown Congestion",
        }
    }
}

/// The normalized corridor record, produced once per reconciliation cycle.
///
/// Wire shape is camelCase JSON; optional fields are omitted when absent, so
/// a direction-only record serializes as `{"direction": "..."}`. All numeric
/// payload fields in one record come from the same travel-time row of the
/// same cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressStatus {
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<TrafficLevel>,
    /// Live full-corridor travel time, whole minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<i32>,
    /// Typical travel time for this time of day, whole minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_travel_time: Option<i32>,
    /// Express-lane speed, MPH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    /// Unrestricted local-road speed in the same direction, MPH.
    /// Comparison display only; never consulted by the merge policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_spd: Option<i32>,
}

impl ExpressStatus {
    /// A bare record carrying a direction and nothing else.
    pub fn direction_only(direction: Direction) -> Self {
        Self {
            direction,
            level: None,
            travel_time: None,
            average_travel_time: None,
            speed: None,
            local_spd: None,
        }
    }

    /// The universal fallback record.
    pub fn unknown() -> Self {
        Self::direction_only(Direction::Unknown)
    }

    /// True when the record carries a determinate direction.
    pub fn is_usable(&self) -> bool {
        self.direction != Direction::Unknown
    }
}

impl Default for ExpressStatus {
    fn default() -> Self {
        Self::unknown()
    }
}
