// src/sources/mod.rs
pub mod incident;
pub mod travel_time;

use async_trait::async_trait;

use crate::status::{ExpressStatus, TrafficLevel};

/// Source A: coarse direction-closure signal read from an incident listing.
/// Reports a direction and nothing else.
#[async_trait]
pub trait ClosureSource: Send + Sync {
    /// `None` means the feed was unavailable, never a direction state.
    async fn poll(&self) -> Option<ExpressStatus>;
    fn name(&self) -> &'static str;
}

/// Source B: the tabular travel-time feed. The fetch is independent of
/// Source A; the incident direction is applied afterwards as a hint by
/// [`travel_time::resolve`], so the two upstream fetches can run
/// concurrently.
#[async_trait]
pub trait TravelSource: Send + Sync {
    async fn poll(&self) -> Option<TravelSnapshot>;
    fn name(&self) -> &'static str;
}

/// Field extract of one direction's representative row, plus the local-road
/// comparison speed looked up for the same direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionReading {
    pub level: TrafficLevel,
    pub travel_time: Option<i32>,
    pub average_travel_time: Option<i32>,
    pub speed: Option<i32>,
    pub local_speed: Option<i32>,
}

/// Both directions' readings from a single fetch of the travel-time feed.
/// `None` means that direction's representative row was missing, which marks
/// the whole snapshot unreliable during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelSnapshot {
    pub inbound: Option<DirectionReading>,
    pub outbound: Option<DirectionReading>,
}
