// src/config.rs
//
// Corridor configuration: upstream endpoints, incident message prefixes,
// travel-time segment identifier sets, cache TTL, and fetch timeout.
//
// Load order: $CORRIDOR_CONFIG_PATH (must exist), else config/corridor.toml
// if present, else the compiled-in Kennedy (I-90/94) defaults. Every field
// is individually defaultable, so a partial TOML file only overrides what it
// names.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::status::Direction;

pub const DEFAULT_CORRIDOR_CONFIG_PATH: &str = "config/corridor.toml";
pub const ENV_CORRIDOR_CONFIG_PATH: &str = "CORRIDOR_CONFIG_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "CORRIDOR_CACHE_TTL_SECS";

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Validity window of the reconciled record, seconds.
    pub cache_ttl_secs: u64,
    /// Per-request upstream timeout, milliseconds.
    pub fetch_timeout_ms: u64,
    pub incident: IncidentFeedConfig,
    pub travel_time: TravelTimeFeedConfig,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            fetch_timeout_ms: crate::fetch::DEFAULT_FETCH_TIMEOUT_MS,
            incident: IncidentFeedConfig::default(),
            travel_time: TravelTimeFeedConfig::default(),
        }
    }
}

impl CorridorConfig {
    /// Load configuration using env var + fallbacks:
    /// 1) $CORRIDOR_CONFIG_PATH (error if it points nowhere)
    /// 2) config/corridor.toml
    /// 3) compiled-in defaults
    ///
    /// $CORRIDOR_CACHE_TTL_SECS, when set and parseable, overrides the TTL
    /// from any of the above.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CORRIDOR_CONFIG_PATH) {
            let pb = PathBuf::from(&p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CORRIDOR_CONFIG_PATH} points to non-existent path"));
            }
            let content = std::fs::read_to_string(&pb)
                .with_context(|| format!("reading corridor config from {}", pb.display()))?;
            Self::from_toml_str(&content)?
        } else {
            let pb = PathBuf::from(DEFAULT_CORRIDOR_CONFIG_PATH);
            if pb.exists() {
                let content = std::fs::read_to_string(&pb)
                    .with_context(|| format!("reading corridor config from {}", pb.display()))?;
                Self::from_toml_str(&content)?
            } else {
                Self::default()
            }
        };

        if let Some(ttl) = std::env::var(ENV_CACHE_TTL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            cfg.cache_ttl_secs = ttl;
        }
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("parsing corridor config TOML")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Incident feed (Source A): pointer document, dataset location, and the
/// direction-specific closure message prefixes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IncidentFeedConfig {
    pub pointer_url: String,
    pub data_base: String,
    pub data_file: String,
    pub inbound_prefix: String,
    pub outbound_prefix: String,
}

impl Default for IncidentFeedConfig {
    fn default() -> Self {
        const MSG_BASE: &str = "Kennedy (I-90/94) Express Lanes";
        Self {
            pointer_url: "https://www.sigalert.com/Data/Chicago/path.json".into(),
            data_base: "https://www.sigalert.com/Data".into(),
            data_file: "ChicagoData.json".into(),
            inbound_prefix: format!("{MSG_BASE} West"),
            outbound_prefix: format!("{MSG_BASE} East"),
        }
    }
}

impl IncidentFeedConfig {
    /// Dataset URL resolved from the pointer document's path + cache buster.
    pub fn data_url(&self, path: &str, cache_buster: &str) -> String {
        format!(
            "{}/{}/{}?cb={}",
            self.data_base, path, self.data_file, cache_buster
        )
    }

    pub fn direction_prefixes(&self) -> [(Direction, &str); 2] {
        [
            (Direction::Inbound, self.inbound_prefix.as_str()),
            (Direction::Outbound, self.outbound_prefix.as_str()),
        ]
    }
}

/// Travel-time feed (Source B): the table endpoint plus per-direction
/// segment identifier sets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TravelTimeFeedConfig {
    pub url: String,
    #[serde(default = "DirectionSegments::default_inbound")]
    pub inbound: DirectionSegments,
    #[serde(default = "DirectionSegments::default_outbound")]
    pub outbound: DirectionSegments,
}

impl Default for TravelTimeFeedConfig {
    fn default() -> Self {
        Self {
            url: "https://www.travelmidwest.com/lmiga/travelTime.json?path=GATEWAY.IL.KENNEDY"
                .into(),
            inbound: DirectionSegments::default_inbound(),
            outbound: DirectionSegments::default_outbound(),
        }
    }
}

/// Segment identifiers for one direction of the corridor.
///
/// The main segment spans the full corridor and is eligible for travel-time
/// reporting, as are the extended ids. Partial ids cover shorter sections:
/// they can stand in as representative rows for level/speed, but never
/// populate travel time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectionSegments {
    /// Reversible-lane table for this direction.
    pub table_path: String,
    /// Full-length segment id.
    pub main_id: String,
    /// Overlapping full-corridor segments, still travel-time eligible.
    pub extended_ids: Vec<String>,
    /// Short partial segments: candidates, but no travel time.
    pub partial_ids: Vec<String>,
    /// Unrestricted local-road table and segment used for speed comparison.
    pub local_table_path: String,
    pub local_id: String,
}

impl DirectionSegments {
    fn default_inbound() -> Self {
        Self {
            table_path: "GATEWAY.IL.KENNEDY.KENNEDY REVERSIBLE EB".into(),
            main_id: "IL-TESTTSC-249".into(),
            extended_ids: vec!["IL-TSCDMS-EB_I_90 Express_ADDISON_TO_OHIO_342".into()],
            partial_ids: Vec::new(),
            local_table_path: "GATEWAY.IL.KENNEDY.KENNEDY EB".into(),
            local_id: "IL-TSCDMS-EB_I_90_PULASKI_TO_OHIO_642".into(),
        }
    }

    fn default_outbound() -> Self {
        Self {
            table_path: "GATEWAY.IL.KENNEDY.KENNEDY REVERSIBLE WB".into(),
            main_id: "IL-TESTTSC-250".into(),
            extended_ids: vec!["IL-TSCDMS-WB_I_90 Express_ARMITAGE_TO_MONTROSE_341".into()],
            partial_ids: Vec::new(),
            local_table_path: "GATEWAY.IL.KENNEDY.KENNEDY WB".into(),
            local_id: "IL-TSCDMS-WB_I_90_DAMEN_TO_MONTROSE_343".into(),
        }
    }

    /// Rows considered when picking the representative row.
    pub fn is_candidate(&self, id: &str) -> bool {
        self.travel_time_eligible(id) || self.partial_ids.iter().any(|p| p == id)
    }

    /// The "main or extended" set: only these ids may populate travel time.
    pub fn travel_time_eligible(&self, id: &str) -> bool {
        id == self.main_id || self.extended_ids.iter().any(|e| e == id)
    }
}
