use std::collections::BTreeMap;

use catacombs_schema::{ClassName, DungeonMode, FloorId, FloorStats, RunSummary};
use serde_json::{Map, Value};

use crate::value::{count, object, optional_count};

/// Where per-floor metrics live inside a dungeon-type object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorLayout {
    /// `metric -> { floor -> value }`, as in raw member records.
    Columnar,
    /// `floors -> { floor -> { stats -> { metric -> value } } }`.
    Nested,
}

/// One dungeon type (`catacombs` or `master_catacombs`) of a raw payload.
///
/// Lookups try the preferred layout first and fall back to the other one, so
/// a payload mixing both still resolves.
#[derive(Debug, Clone, Copy)]
pub struct DungeonTypeStats<'a> {
    map: &'a Map<String, Value>,
    preferred: FloorLayout,
}

impl<'a> DungeonTypeStats<'a> {
    pub fn new(map: &'a Map<String, Value>, preferred: FloorLayout) -> Self {
        Self { map, preferred }
    }

    fn columnar(&self, name: &str, floor: FloorId) -> Option<&'a Value> {
        object(self.map.get(name)?)?.get(&floor.get().to_string())
    }

    fn nested(&self, name: &str, floor: FloorId) -> Option<&'a Value> {
        let floors = object(self.map.get("floors")?)?;
        let floor_obj = floors
            .get(&floor.get().to_string())
            .or_else(|| floors.get(&format!("floor_{}", floor.get())))
            .and_then(object)?;
        floor_obj
            .get("stats")
            .and_then(object)
            .and_then(|stats| stats.get(name))
            .or_else(|| floor_obj.get(name))
    }

    pub fn metric(&self, name: &str, floor: FloorId) -> Option<&'a Value> {
        match self.preferred {
            FloorLayout::Columnar => self
                .columnar(name, floor)
                .or_else(|| self.nested(name, floor)),
            FloorLayout::Nested => self
                .nested(name, floor)
                .or_else(|| self.columnar(name, floor)),
        }
    }

    fn count(&self, name: &str, floor: FloorId) -> u64 {
        self.metric(name, floor).map_or(0, count)
    }

    /// Zero is treated as "no time recorded".
    fn time(&self, name: &str, floor: FloorId) -> Option<u64> {
        self.metric(name, floor)
            .and_then(optional_count)
            .filter(|&ms| ms > 0)
    }
}

pub fn normalize_floor(
    stats: &DungeonTypeStats<'_>,
    mode: DungeonMode,
    floor: FloorId,
) -> Option<FloorStats> {
    if !mode.has_floor(floor) {
        return None;
    }

    let top_runs = top_runs(stats, floor);
    let normalized = FloorStats {
        times_played: stats.count("times_played", floor),
        tier_completions: stats.count("tier_completions", floor),
        best_score: clamp_u32(stats.count("best_score", floor)),
        fastest_time_ms: stats.time("fastest_time", floor),
        fastest_time_s_rank_ms: stats.time("fastest_time_s", floor),
        fastest_time_s_plus_rank_ms: stats.time("fastest_time_s_plus", floor),
        mobs_killed: stats.count("mobs_killed", floor),
        most_mobs_in_single_run: stats.count("most_mobs_killed", floor),
        watcher_kills: stats.count("watcher_kills", floor),
        most_healing: stats.count("most_healing", floor),
        most_damage_by_class: damage_by_class(stats, floor),
        best_run: top_runs.first().cloned(),
        top_runs,
    };
    Some(normalized).filter(FloorStats::is_attempted)
}

/// Every attempted floor of one mode.
pub fn normalize_mode(stats: &DungeonTypeStats<'_>, mode: DungeonMode) -> BTreeMap<FloorId, FloorStats> {
    mode.floors()
        .filter_map(|floor| normalize_floor(stats, mode, floor).map(|s| (floor, s)))
        .collect()
}

fn damage_by_class(stats: &DungeonTypeStats<'_>, floor: FloorId) -> BTreeMap<ClassName, u64> {
    let mut out = BTreeMap::new();
    for key in ClassName::RAW_KEYS {
        let Some(class) = ClassName::from_key(key) else {
            continue;
        };
        let damage = stats.count(&format!("most_damage_{key}"), floor);
        record_damage(&mut out, class, damage);
    }

    // Some sources only keep the single best class.
    if let Some(best) = stats.metric("most_damage", floor).and_then(object) {
        let class = best
            .get("class")
            .and_then(Value::as_str)
            .and_then(ClassName::from_key);
        if let Some(class) = class {
            record_damage(&mut out, class, best.get("value").map_or(0, count));
        }
    }
    out
}

fn record_damage(out: &mut BTreeMap<ClassName, u64>, class: ClassName, damage: u64) {
    if damage == 0 {
        return;
    }
    let slot = out.entry(class).or_insert(0);
    *slot = (*slot).max(damage);
}

fn top_runs(stats: &DungeonTypeStats<'_>, floor: FloorId) -> Vec<RunSummary> {
    if let Some(single) = stats.metric("best_run", floor).and_then(object) {
        return parse_run(single).into_iter().collect();
    }

    match stats.metric("best_runs", floor) {
        Some(Value::Array(runs)) => rank_runs(runs.iter().filter_map(|r| object(r).and_then(parse_run))),
        Some(Value::Object(single)) => parse_run(single).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Highest score sum first, ties in input order, at most
/// [`FloorStats::TOP_RUNS`] runs.
pub fn rank_runs(runs: impl IntoIterator<Item = RunSummary>) -> Vec<RunSummary> {
    let mut ranked: Vec<RunSummary> = runs.into_iter().collect();
    ranked.sort_by(|a, b| b.total_score().cmp(&a.total_score()));
    ranked.truncate(FloorStats::TOP_RUNS);
    ranked
}

pub fn parse_run(raw: &Map<String, Value>) -> Option<RunSummary> {
    let Some(dungeon_class) = raw
        .get("dungeon_class")
        .and_then(Value::as_str)
        .and_then(ClassName::from_key)
    else {
        tracing::debug!("skipping run without a known dungeon_class");
        return None;
    };

    let field = |name: &str| raw.get(name).map_or(0, count);
    Some(RunSummary {
        score_exploration: clamp_u32(field("score_exploration")),
        score_speed: clamp_u32(field("score_speed")),
        score_skill: clamp_u32(field("score_skill")),
        score_bonus: clamp_u32(field("score_bonus")),
        elapsed_time_ms: field("elapsed_time"),
        deaths: clamp_u32(field("deaths")),
        secrets_found: clamp_u32(field("secrets_found")),
        damage_dealt: field("damage_dealt"),
        damage_mitigated: field("damage_mitigated"),
        dungeon_class,
        timestamp: raw.get("timestamp").and_then(optional_count).filter(|&t| t > 0),
    })
}

fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
