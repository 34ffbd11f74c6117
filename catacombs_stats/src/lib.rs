use catacombs_schema::{PlayerProfile, PlayerView};
use serde_json::Value;

mod comparison;
mod error;
mod floor;
mod format;
mod level;
mod payload;
mod profile;
mod value;
mod weight;

pub use comparison::{same_player, Comparison, ComparisonEntry};
pub use error::{ErrorKind, TrackerError};
pub use floor::{normalize_floor, normalize_mode, parse_run, rank_runs, DungeonTypeStats, FloorLayout};
pub use format::{format_date, format_number, format_time, NOT_AVAILABLE};
pub use level::{compute_level, XpCurve, DUNGEON_XP_COSTS};
pub use payload::{PayloadShape, RawPayload};
pub use profile::{normalize_player_id, select_active, select_member};
pub use weight::{breakdown, score, REFERENCE_WEIGHT};

#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    /// Player whose member record is read from multi-member profiles.
    pub player_id: Option<String>,
    pub xp_curve: XpCurve,
}

impl DeriveOptions {
    pub fn for_player(player_id: impl Into<String>) -> Self {
        Self {
            player_id: Some(player_id.into()),
            ..Self::default()
        }
    }
}

/// Every profile in the payload, in payload order.
pub fn parse_profiles(payload: &Value, options: &DeriveOptions) -> Result<Vec<PlayerProfile>, TrackerError> {
    let raw = RawPayload::detect(payload)?;
    tracing::debug!(shape = ?raw.shape, profiles = raw.len(), "detected payload shape");
    Ok(raw.profiles(options))
}

/// The profile the player is currently using.
pub fn active_profile(payload: &Value, options: &DeriveOptions) -> Result<PlayerProfile, TrackerError> {
    let profiles = parse_profiles(payload, options)?;
    let active = select_active(&profiles)?;
    Ok(active.clone())
}

pub fn derive_player_view(
    display_name: &str,
    avatar_url: impl Into<String>,
    payload: &Value,
    options: &DeriveOptions,
) -> Result<PlayerView, TrackerError> {
    let profile = active_profile(payload, options).map_err(|e| e.with_player(display_name))?;
    Ok(build_view(display_name, avatar_url.into(), profile))
}

pub fn build_view(display_name: &str, avatar_url: String, profile: PlayerProfile) -> PlayerView {
    let dungeon_record = profile.dungeons.unwrap_or_default();
    let weight_breakdown = breakdown(&dungeon_record);

    PlayerView {
        display_name: display_name.to_string(),
        avatar_url,
        profile_name: profile.cute_name,
        weight: weight_breakdown.total(),
        weight_breakdown,
        class_average: dungeon_record.class_average(),
        dungeon_record,
    }
}

#[cfg(test)]
mod tests;
