use catacombs_schema::PlayerProfile;
use serde_json::{Map, Value};

use crate::value::object;
use crate::TrackerError;

/// Picks the profile to display.
///
/// 1. the only profile flagged as selected,
/// 2. otherwise the most recently saved one (first wins on ties),
/// 3. otherwise the first profile. This fallback is arbitrary but stable.
pub fn select_active(profiles: &[PlayerProfile]) -> Result<&PlayerProfile, TrackerError> {
    let first = profiles.first().ok_or_else(TrackerError::no_profiles)?;

    let mut flagged = profiles.iter().filter(|p| p.is_selected);
    if let (Some(only), None) = (flagged.next(), flagged.next()) {
        return Ok(only);
    }

    let mut latest: Option<(&PlayerProfile, u64)> = None;
    for profile in profiles {
        let Some(saved) = profile.last_save else {
            continue;
        };
        if latest.map_or(true, |(_, best)| saved > best) {
            latest = Some((profile, saved));
        }
    }

    Ok(latest.map_or(first, |(profile, _)| profile))
}

/// Dashes and case are ignored when comparing player ids.
pub fn normalize_player_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Member record of `player_id` inside a profile's `members` table. Without a
/// match, a profile with a single member yields that member.
pub fn select_member<'a>(
    members: &'a Map<String, Value>,
    player_id: Option<&str>,
) -> Option<&'a Map<String, Value>> {
    if let Some(wanted) = player_id.map(normalize_player_id) {
        let found = members
            .iter()
            .find(|(id, _)| normalize_player_id(id) == wanted)
            .and_then(|(_, member)| object(member));
        if found.is_some() {
            return found;
        }
    }

    if members.len() == 1 {
        return members.values().next().and_then(object);
    }
    None
}
