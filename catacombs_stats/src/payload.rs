use std::collections::BTreeMap;

use catacombs_schema::{ClassName, DungeonMode, DungeonRecord, Floors, LevelInfo, PlayerProfile};
use serde_json::{Map, Value};

use crate::floor::{normalize_mode, DungeonTypeStats, FloorLayout};
use crate::level::{compute_level, XpCurve};
use crate::profile::select_member;
use crate::value::{count, float, object, optional_count, path};
use crate::{DeriveOptions, TrackerError};

/// The two known payload generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Profiles carry a ready `dungeons` tree with per-floor objects.
    Nested,
    /// Profiles carry `members`, each with per-metric floor tables.
    Columnar,
}

impl PayloadShape {
    pub fn floor_layout(self) -> FloorLayout {
        match self {
            PayloadShape::Nested => FloorLayout::Nested,
            PayloadShape::Columnar => FloorLayout::Columnar,
        }
    }
}

/// A stats payload whose shape has been detected. Nothing past this point
/// branches on the payload generation except through [`FloorLayout`].
#[derive(Debug, Clone)]
pub struct RawPayload<'a> {
    pub shape: PayloadShape,
    profiles: Vec<(Option<&'a str>, &'a Map<String, Value>)>,
}

impl<'a> RawPayload<'a> {
    pub fn detect(payload: &'a Value) -> Result<Self, TrackerError> {
        let root = payload
            .as_object()
            .ok_or_else(|| TrackerError::malformed("payload is not a JSON object"))?;

        if root.get("success") == Some(&Value::Bool(false)) {
            let cause = root
                .get("cause")
                .and_then(Value::as_str)
                .unwrap_or("unknown cause");
            return Err(TrackerError::new("E1002", format!("stats service reported failure: {cause}")));
        }

        let container = root
            .get("profiles")
            .ok_or_else(|| TrackerError::malformed("missing profiles container"))?;

        let entries: Vec<(Option<&'a str>, &'a Value)> = match container {
            // Players who never joined Skyblock.
            Value::Null => Vec::new(),
            Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
            Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
            _ => {
                return Err(TrackerError::malformed(
                    "profiles container must be an array or an object",
                ))
            }
        };

        let mut profiles = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            match object(entry) {
                Some(profile) => profiles.push((key, profile)),
                None => tracing::debug!(?key, "skipping non-object profile entry"),
            }
        }

        let shape = if profiles.iter().any(|(_, p)| p.contains_key("members")) {
            PayloadShape::Columnar
        } else {
            PayloadShape::Nested
        };

        Ok(Self { shape, profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self, options: &DeriveOptions) -> Vec<PlayerProfile> {
        self.profiles
            .iter()
            .map(|&(key, raw)| self.profile(key, raw, options))
            .collect()
    }

    fn profile(
        &self,
        key: Option<&str>,
        raw: &'a Map<String, Value>,
        options: &DeriveOptions,
    ) -> PlayerProfile {
        let profile_id = raw
            .get("profile_id")
            .and_then(Value::as_str)
            .or(key)
            .unwrap_or_default()
            .to_string();
        let cute_name = raw
            .get("cute_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let is_selected = ["selected", "current"]
            .iter()
            .any(|k| raw.get(*k).and_then(Value::as_bool) == Some(true));

        let member = match self.shape {
            PayloadShape::Nested => Some(raw),
            PayloadShape::Columnar => raw
                .get("members")
                .and_then(object)
                .and_then(|members| select_member(members, options.player_id.as_deref())),
        };
        if member.is_none() {
            tracing::debug!(%profile_id, "no member record for requested player");
        }

        let last_save = raw
            .get("last_save")
            .or_else(|| member.and_then(|m| m.get("last_save")))
            .or_else(|| member.and_then(|m| path(m, &["profile", "last_save"])))
            .and_then(optional_count)
            .filter(|&t| t > 0);

        let dungeons = member
            .and_then(|m| DungeonTree::locate(self.shape, m))
            .map(|tree| tree.into_record(self.shape.floor_layout(), &options.xp_curve));

        PlayerProfile {
            profile_id,
            cute_name,
            is_selected,
            last_save,
            dungeons,
        }
    }
}

/// The dungeon-related nodes of one member record, wherever the payload
/// generation keeps them.
struct DungeonTree<'a> {
    normal: Option<&'a Map<String, Value>>,
    master: Option<&'a Map<String, Value>>,
    classes: Option<&'a Map<String, Value>>,
    selected_class: Option<&'a Value>,
    secrets: Option<&'a Value>,
    essence: Vec<&'a Map<String, Value>>,
    legacy_essence: Option<&'a Map<String, Value>>,
}

impl<'a> DungeonTree<'a> {
    fn locate(shape: PayloadShape, member: &'a Map<String, Value>) -> Option<Self> {
        let dungeons = member.get("dungeons").and_then(object)?;
        let tree = match shape {
            PayloadShape::Nested => Self {
                normal: dungeons.get(DungeonMode::Normal.payload_key()).and_then(object),
                master: dungeons.get(DungeonMode::Master.payload_key()).and_then(object),
                classes: path(dungeons, &["classes", "classes"])
                    .or_else(|| dungeons.get("classes"))
                    .and_then(object),
                selected_class: path(dungeons, &["classes", "selected_class"])
                    .or_else(|| dungeons.get("selected_dungeon_class")),
                secrets: dungeons
                    .get("secrets_found")
                    .or_else(|| dungeons.get("secrets")),
                essence: dungeons.get("essence").and_then(object).into_iter().collect(),
                legacy_essence: None,
            },
            PayloadShape::Columnar => Self {
                normal: path(dungeons, &["dungeon_types", DungeonMode::Normal.payload_key()]).and_then(object),
                master: path(dungeons, &["dungeon_types", DungeonMode::Master.payload_key()]).and_then(object),
                classes: dungeons.get("player_classes").and_then(object),
                selected_class: dungeons.get("selected_dungeon_class"),
                secrets: dungeons
                    .get("secrets")
                    .or_else(|| dungeons.get("secrets_found")),
                essence: path(member, &["currencies", "essence"])
                    .and_then(object)
                    .into_iter()
                    .collect(),
                legacy_essence: Some(member),
            },
        };
        Some(tree)
    }

    fn mode(&self, mode: DungeonMode) -> Option<&'a Map<String, Value>> {
        match mode {
            DungeonMode::Normal => self.normal,
            DungeonMode::Master => self.master,
        }
    }

    fn into_record(self, layout: FloorLayout, curve: &XpCurve) -> DungeonRecord {
        let catacombs_xp = self.normal.map_or(0.0, xp_of);

        let mut floors = Floors::default();
        for mode in DungeonMode::ALL {
            if let Some(raw) = self.mode(mode) {
                *floors.mode_mut(mode) = normalize_mode(&DungeonTypeStats::new(raw, layout), mode);
            }
        }

        DungeonRecord {
            catacombs_level: compute_level(catacombs_xp, curve),
            class_levels: self.class_levels(curve),
            selected_class: self
                .selected_class
                .and_then(Value::as_str)
                .and_then(ClassName::from_key),
            floors,
            secrets_found: self.secrets.map_or(0, count),
            essence: self.essence(),
        }
    }

    fn class_levels(&self, curve: &XpCurve) -> BTreeMap<ClassName, LevelInfo> {
        let Some(container) = self.classes else {
            return BTreeMap::new();
        };

        // Both spellings of berserk may be present; keep the larger one.
        let mut xp: BTreeMap<ClassName, f64> = BTreeMap::new();
        for key in ClassName::RAW_KEYS {
            let (Some(class), Some(node)) = (ClassName::from_key(key), container.get(key)) else {
                continue;
            };
            let value = object(node).map_or(0.0, xp_of);
            let slot = xp.entry(class).or_insert(0.0);
            if value > *slot {
                *slot = value;
            }
        }

        xp.into_iter()
            .map(|(class, xp)| (class, compute_level(xp, curve)))
            .collect()
    }

    fn essence(&self) -> BTreeMap<String, u64> {
        let mut out = BTreeMap::new();
        for table in &self.essence {
            for (kind, amount) in *table {
                // Either a bare number or `{ "current": n }`.
                let amount = match amount {
                    Value::Object(inner) => inner.get("current").map_or(0, count),
                    other => count(other),
                };
                out.insert(kind.to_ascii_lowercase(), amount);
            }
        }
        if let Some(member) = self.legacy_essence {
            for (key, amount) in member {
                if let Some(kind) = key.strip_prefix("essence_") {
                    out.entry(kind.to_ascii_lowercase()).or_insert_with(|| count(amount));
                }
            }
        }
        out
    }
}

/// Experience of a dungeon type or class node, from `level.xp` or `experience`.
fn xp_of(node: &Map<String, Value>) -> f64 {
    path(node, &["level", "xp"])
        .or_else(|| node.get("experience"))
        .map_or(0.0, float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_payload_is_malformed() {
        let err = RawPayload::detect(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::MalformedPayload);
    }

    #[test]
    fn missing_profiles_is_malformed() {
        let err = RawPayload::detect(&json!({ "success": true })).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::MalformedPayload);
        assert!(err.message.contains("profiles"));

        let err = RawPayload::detect(&json!({ "profiles": 3 })).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::MalformedPayload);
    }

    #[test]
    fn reported_failure_is_malformed_with_cause() {
        let err = RawPayload::detect(&json!({ "success": false, "cause": "Invalid API key" })).unwrap_err();
        assert_eq!(err.code, "E1002");
        assert!(err.message.contains("Invalid API key"));
    }

    #[test]
    fn null_profiles_is_empty_not_malformed() {
        let payload = json!({ "success": true, "profiles": null });
        let raw = RawPayload::detect(&payload).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn shape_detection() {
        let nested = json!({ "profiles": { "abc": { "cute_name": "Apple", "dungeons": {} } } });
        assert_eq!(RawPayload::detect(&nested).unwrap().shape, PayloadShape::Nested);

        let columnar = json!({ "profiles": [ { "cute_name": "Apple", "members": {} } ] });
        assert_eq!(RawPayload::detect(&columnar).unwrap().shape, PayloadShape::Columnar);
    }

    #[test]
    fn nested_profile_id_falls_back_to_key() {
        let payload = json!({ "profiles": { "abc": { "cute_name": "Apple", "selected": true } } });
        let profiles = RawPayload::detect(&payload)
            .unwrap()
            .profiles(&DeriveOptions::default());

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].profile_id, "abc");
        assert!(profiles[0].is_selected);
        assert!(profiles[0].dungeons.is_none());
    }

    #[test]
    fn classes_normalize_legacy_spelling_once() {
        let payload = json!({
            "profiles": [{
                "profile_id": "p1",
                "members": {
                    "u1": {
                        "dungeons": {
                            "player_classes": {
                                "berserk": { "experience": 50.0 },
                                "beserk": { "experience": 125.0 },
                                "mage": { "experience": 0 }
                            },
                            "selected_dungeon_class": "beserk"
                        }
                    }
                }
            }]
        });
        let profiles = RawPayload::detect(&payload)
            .unwrap()
            .profiles(&DeriveOptions::default());
        let record = profiles[0].dungeons.as_ref().unwrap();

        assert_eq!(record.class_levels.len(), 2);
        assert_eq!(record.class_levels[&ClassName::Berserk].level, 2);
        assert_eq!(record.class_levels[&ClassName::Mage].level, 0);
        assert_eq!(record.selected_class, Some(ClassName::Berserk));
    }

    #[test]
    fn essence_from_currencies_and_legacy_fields() {
        let payload = json!({
            "profiles": [{
                "members": {
                    "u1": {
                        "dungeons": {},
                        "currencies": { "essence": { "WITHER": { "current": 120 }, "DRAGON": { "current": 7 } } },
                        "essence_wither": 1,
                        "essence_ice": 33
                    }
                }
            }]
        });
        let profiles = RawPayload::detect(&payload)
            .unwrap()
            .profiles(&DeriveOptions::default());
        let essence = &profiles[0].dungeons.as_ref().unwrap().essence;

        assert_eq!(essence["wither"], 120);
        assert_eq!(essence["dragon"], 7);
        assert_eq!(essence["ice"], 33);
    }
}
