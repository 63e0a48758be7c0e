// src/sources/travel_time.rs
//
// Source Adapter B: direction, travel times, speed, congestion level, and
// the local-road comparison speed, all derived from the regional
// travel-time feed. The feed returns named tables of report rows; several
// overlapping segments cover each direction of the reversible lanes, so a
// sort policy picks one representative row per direction.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{DirectionSegments, TravelTimeFeedConfig};
use crate::fetch::FetchClient;
use crate::sources::{DirectionReading, TravelSnapshot, TravelSource};
use crate::status::{Direction, ExpressStatus, TrafficLevel};

/// One named table of the feed. Unknown members are ignored; missing ones
/// take inert defaults so a drifted payload degrades instead of failing.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelTimeTable {
    #[serde(rename = "tablePath", default)]
    pub table_path: String,
    #[serde(rename = "reportRows", default)]
    pub report_rows: Vec<ReportRow>,
}

/// A single segment reading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportRow {
    pub id: String,
    pub level: TrafficLevel,
    /// Speed as the feed sends it: a numeric string, or "N/A".
    pub spd: String,
    /// Travel time in minutes; the feed uses -1 for "no reading".
    pub tt: f64,
    /// Average travel time in minutes, same sentinel.
    pub avg: f64,
}

impl Default for ReportRow {
    fn default() -> Self {
        Self {
            id: String::new(),
            level: TrafficLevel::Unknown,
            spd: "N/A".into(),
            tt: -1.0,
            avg: -1.0,
        }
    }
}

pub struct TravelTimeFeed {
    client: FetchClient,
    cfg: TravelTimeFeedConfig,
}

impl TravelTimeFeed {
    pub fn new(client: FetchClient, cfg: TravelTimeFeedConfig) -> Self {
        Self { client, cfg }
    }

    /// Extract both directions' readings from a fetched table set.
    pub fn snapshot(&self, tables: &[TravelTimeTable]) -> TravelSnapshot {
        TravelSnapshot {
            inbound: read_direction(tables, &self.cfg.inbound),
            outbound: read_direction(tables, &self.cfg.outbound),
        }
    }
}

#[async_trait]
impl TravelSource for TravelTimeFeed {
    async fn poll(&self) -> Option<TravelSnapshot> {
        let tables: Vec<TravelTimeTable> = self.client.get_json(&self.cfg.url).await?;
        Some(self.snapshot(&tables))
    }

    fn name(&self) -> &'static str {
        "travel-time"
    }
}

/// Pick the representative row for one direction and extract its fields.
/// `None` when the table or every candidate row is missing.
fn read_direction(
    tables: &[TravelTimeTable],
    segments: &DirectionSegments,
) -> Option<DirectionReading> {
    let table = tables.iter().find(|t| t.table_path == segments.table_path)?;
    let mut candidates: Vec<&ReportRow> = table
        .report_rows
        .iter()
        .filter(|row| segments.is_candidate(&row.id))
        .collect();
    candidates.sort_by(|a, b| representative_order(a, b, &segments.main_id));
    let row = candidates.first()?;

    // Partial segments are not representative of full-corridor transit
    // time, so their raw tt/avg values are never reported.
    let (travel_time, average_travel_time) = if segments.travel_time_eligible(&row.id) {
        (minutes(row.tt), minutes(row.avg))
    } else {
        (None, None)
    };

    Some(DirectionReading {
        level: row.level,
        travel_time,
        average_travel_time,
        speed: parse_speed(&row.spd),
        local_speed: local_speed(tables, segments),
    })
}

/// Sort policy for overlapping candidate rows: rows with a known travel
/// time first, then the full-length main segment, otherwise stable.
fn representative_order(a: &ReportRow, b: &ReportRow, main_id: &str) -> Ordering {
    match (a.tt >= 0.0, b.tt >= 0.0) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match (a.id == main_id, b.id == main_id) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Comparison speed from the fixed local-road table/segment for the same
/// direction. Display-only; absence never affects direction resolution.
fn local_speed(tables: &[TravelTimeTable], segments: &DirectionSegments) -> Option<i32> {
    let table = tables
        .iter()
        .find(|t| t.table_path == segments.local_table_path)?;
    let row = table
        .report_rows
        .iter()
        .find(|row| row.id == segments.local_id)?;
    parse_speed(&row.spd)
}

/// "N/A" (or anything non-numeric) maps to null; otherwise nearest integer.
fn parse_speed(spd: &str) -> Option<i32> {
    spd.trim().parse::<f64>().ok().map(|v| v.round() as i32)
}

/// The feed's negative sentinel maps to null; otherwise whole minutes.
fn minutes(value: f64) -> Option<i32> {
    (value >= 0.0).then(|| value.round() as i32)
}

/// Resolve a fetched snapshot against the optional direction hint from the
/// incident feed.
///
/// `None` in means the feed was unavailable and stays `None` for the merge
/// policy. Otherwise the result is total: a missing representative row or
/// both directions active at once is unreliable data and collapses to
/// Unknown; neither direction active means the lanes are closed; exactly one
/// active direction carries that row's payload.
pub fn resolve(snapshot: Option<&TravelSnapshot>, hint: Option<Direction>) -> Option<ExpressStatus> {
    let snapshot = snapshot?;
    let (Some(inbound), Some(outbound)) = (&snapshot.inbound, &snapshot.outbound) else {
        return Some(ExpressStatus::unknown());
    };

    let inbound_active =
        inbound.level != TrafficLevel::Unknown || hint == Some(Direction::Inbound);
    let outbound_active =
        outbound.level != TrafficLevel::Unknown || hint == Some(Direction::Outbound);

    Some(match (inbound_active, outbound_active) {
        (true, true) => ExpressStatus::unknown(),
        (false, false) => ExpressStatus::direction_only(Direction::Closed),
        (true, false) => from_reading(Direction::Inbound, inbound),
        (false, true) => from_reading(Direction::Outbound, outbound),
    })
}

fn from_reading(direction: Direction, reading: &DirectionReading) -> ExpressStatus {
    ExpressStatus {
        direction,
        level: Some(reading.level),
        travel_time: reading.travel_time,
        average_travel_time: reading.average_travel_time,
        speed: reading.speed,
        local_spd: reading.local_speed,
    }
}
