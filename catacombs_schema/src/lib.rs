use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Milliseconds = u64;

/// Dungeon combat class. The upstream API has historically spelled berserk
/// as `beserk`; both spellings deserialize to [`ClassName::Berserk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassName {
    Tank,
    Healer,
    Mage,
    Archer,
    #[serde(alias = "beserk")]
    Berserk,
}

impl ClassName {
    pub const ALL: [ClassName; 5] = [
        ClassName::Tank,
        ClassName::Healer,
        ClassName::Mage,
        ClassName::Archer,
        ClassName::Berserk,
    ];

    /// Every key spelling seen in payloads, legacy typo included.
    pub const RAW_KEYS: [&'static str; 6] = ["healer", "mage", "berserk", "beserk", "archer", "tank"];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassName::Tank => "tank",
            ClassName::Healer => "healer",
            ClassName::Mage => "mage",
            ClassName::Archer => "archer",
            ClassName::Berserk => "berserk",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ClassName::Tank => "Tank",
            ClassName::Healer => "Healer",
            ClassName::Mage => "Mage",
            ClassName::Archer => "Archer",
            ClassName::Berserk => "Berserk",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "tank" => Some(ClassName::Tank),
            "healer" => Some(ClassName::Healer),
            "mage" => Some(ClassName::Mage),
            "archer" => Some(ClassName::Archer),
            "berserk" | "beserk" => Some(ClassName::Berserk),
            _ => None,
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floor number, 0 (entrance) through 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FloorId(u8);

impl FloorId {
    pub const ENTRANCE: FloorId = FloorId(0);
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FloorId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("floor id out of range: {value}"))
    }
}

impl From<FloorId> for u8 {
    fn from(id: FloorId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DungeonMode {
    Normal,
    Master,
}

impl DungeonMode {
    pub const ALL: [DungeonMode; 2] = [DungeonMode::Normal, DungeonMode::Master];

    /// Key of this mode's object inside a raw dungeon payload.
    pub fn payload_key(self) -> &'static str {
        match self {
            DungeonMode::Normal => "catacombs",
            DungeonMode::Master => "master_catacombs",
        }
    }

    pub fn floors(self) -> impl Iterator<Item = FloorId> {
        let first = match self {
            DungeonMode::Normal => 0,
            DungeonMode::Master => 1,
        };
        (first..=FloorId::MAX).map(FloorId)
    }

    pub fn has_floor(self, floor: FloorId) -> bool {
        !(self == DungeonMode::Master && floor == FloorId::ENTRANCE)
    }

    pub fn floor_label(self, floor: FloorId) -> String {
        match (self, floor.get()) {
            (DungeonMode::Normal, 0) => "Entrance".to_string(),
            (DungeonMode::Normal, n) => format!("F{n}"),
            (DungeonMode::Master, n) => format!("M{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub progress: f64,
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
    pub total_xp: u64,
}

impl LevelInfo {
    pub fn is_max(&self) -> bool {
        self.xp_for_next_level == 0 && self.progress >= 1.0
    }
}

/// Run grade on the 0-300+ score scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    A,
    S,
    #[serde(rename = "S+")]
    SPlus,
}

impl Grade {
    pub fn from_score(score: u64) -> Self {
        match score {
            s if s > 300 => Grade::SPlus,
            s if s > 270 => Grade::S,
            s if s > 230 => Grade::A,
            s if s > 160 => Grade::B,
            s if s > 100 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::SPlus => "S+",
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour tier of a catacombs level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelRarity {
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl LevelRarity {
    pub fn from_level(level: u32) -> Self {
        match level {
            l if l >= 40 => LevelRarity::Mythic,
            l if l >= 30 => LevelRarity::Legendary,
            l if l >= 20 => LevelRarity::Epic,
            l if l >= 10 => LevelRarity::Rare,
            _ => LevelRarity::Uncommon,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LevelRarity::Uncommon => "uncommon",
            LevelRarity::Rare => "rare",
            LevelRarity::Epic => "epic",
            LevelRarity::Legendary => "legendary",
            LevelRarity::Mythic => "mythic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score_exploration: u32,
    pub score_speed: u32,
    pub score_skill: u32,
    pub score_bonus: u32,
    pub elapsed_time_ms: Milliseconds,
    pub deaths: u32,
    pub secrets_found: u32,
    pub damage_dealt: u64,
    pub damage_mitigated: u64,
    pub dungeon_class: ClassName,
    pub timestamp: Option<u64>,
}

impl RunSummary {
    /// Widened so four saturated parts cannot overflow.
    pub fn total_score(&self) -> u64 {
        [self.score_exploration, self.score_speed, self.score_skill, self.score_bonus]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.total_score())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorStats {
    pub times_played: u64,
    pub tier_completions: u64,
    pub best_score: u32,
    pub fastest_time_ms: Option<Milliseconds>,
    pub fastest_time_s_rank_ms: Option<Milliseconds>,
    pub fastest_time_s_plus_rank_ms: Option<Milliseconds>,
    pub mobs_killed: u64,
    pub most_mobs_in_single_run: u64,
    pub watcher_kills: u64,
    pub most_healing: u64,
    #[serde(default)]
    pub most_damage_by_class: BTreeMap<ClassName, u64>,
    pub best_run: Option<RunSummary>,
    /// Highest-scoring runs first, at most [`FloorStats::TOP_RUNS`].
    #[serde(default)]
    pub top_runs: Vec<RunSummary>,
}

impl FloorStats {
    pub const TOP_RUNS: usize = 3;

    pub fn is_attempted(&self) -> bool {
        self.times_played > 0 || self.tier_completions > 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Floors {
    #[serde(default)]
    pub normal: BTreeMap<FloorId, FloorStats>,
    #[serde(default)]
    pub master: BTreeMap<FloorId, FloorStats>,
}

impl Floors {
    pub fn mode(&self, mode: DungeonMode) -> &BTreeMap<FloorId, FloorStats> {
        match mode {
            DungeonMode::Normal => &self.normal,
            DungeonMode::Master => &self.master,
        }
    }

    pub fn mode_mut(&mut self, mode: DungeonMode) -> &mut BTreeMap<FloorId, FloorStats> {
        match mode {
            DungeonMode::Normal => &mut self.normal,
            DungeonMode::Master => &mut self.master,
        }
    }

    pub fn get(&self, mode: DungeonMode, floor: FloorId) -> Option<&FloorStats> {
        self.mode(mode).get(&floor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class: ClassName,
    pub level: LevelInfo,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DungeonRecord {
    pub catacombs_level: LevelInfo,
    #[serde(default)]
    pub class_levels: BTreeMap<ClassName, LevelInfo>,
    pub selected_class: Option<ClassName>,
    #[serde(default)]
    pub floors: Floors,
    pub secrets_found: u64,
    #[serde(default)]
    pub essence: BTreeMap<String, u64>,
}

impl DungeonRecord {
    /// Sum of tier completions over every floor of both modes.
    pub fn total_completions(&self) -> u64 {
        DungeonMode::ALL
            .iter()
            .flat_map(|&mode| self.floors.mode(mode).values())
            .map(|f| f.tier_completions)
            .sum()
    }

    pub fn mode_completions(&self, mode: DungeonMode) -> u64 {
        self.floors.mode(mode).values().map(|f| f.tier_completions).sum()
    }

    pub fn class_level(&self, class: ClassName) -> u32 {
        self.class_levels.get(&class).map_or(0, |l| l.level)
    }

    /// Missing classes count as level 0.
    pub fn class_level_sum(&self) -> u32 {
        ClassName::ALL.iter().map(|&c| self.class_level(c)).sum()
    }

    pub fn class_average(&self) -> f64 {
        self.class_level_sum() as f64 / ClassName::ALL.len() as f64
    }

    pub fn classes(&self) -> Vec<ClassSummary> {
        self.class_levels
            .iter()
            .map(|(&class, level)| ClassSummary {
                class,
                level: level.clone(),
                selected: self.selected_class == Some(class),
            })
            .collect()
    }

    pub fn highest_floor(&self, mode: DungeonMode) -> Option<FloorId> {
        self.floors
            .mode(mode)
            .iter()
            .filter(|(_, stats)| stats.tier_completions > 0)
            .map(|(&id, _)| id)
            .max()
    }

    /// Ties go to the lower floor.
    pub fn most_played_floor(&self, mode: DungeonMode) -> Option<FloorId> {
        let mut best: Option<(FloorId, u64)> = None;
        for (&id, stats) in self.floors.mode(mode) {
            if stats.times_played > best.map_or(0, |(_, plays)| plays) {
                best = Some((id, stats.times_played));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Floor to show first: highest completed, else the lowest recorded one.
    pub fn default_floor(&self, mode: DungeonMode) -> Option<FloorId> {
        self.highest_floor(mode)
            .or_else(|| self.floors.mode(mode).keys().next().copied())
    }

    pub fn fastest_time_ms(&self, mode: DungeonMode, floor: FloorId) -> Option<Milliseconds> {
        self.floors.get(mode, floor).and_then(|f| f.fastest_time_ms)
    }

    pub fn rarity(&self) -> LevelRarity {
        LevelRarity::from_level(self.catacombs_level.level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub profile_id: String,
    pub cute_name: String,
    pub is_selected: bool,
    pub last_save: Option<u64>,
    pub dungeons: Option<DungeonRecord>,
}

/// Dungeon weight split into its seven additive parts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub catacombs: f64,
    pub classes: f64,
    pub secrets: f64,
    pub completions: f64,
    pub master_mode: f64,
    pub perfect_scores: f64,
    pub full_completion: f64,
}

impl WeightBreakdown {
    pub fn sum(&self) -> f64 {
        self.catacombs
            + self.classes
            + self.secrets
            + self.completions
            + self.master_mode
            + self.perfect_scores
            + self.full_completion
    }

    pub fn total(&self) -> u32 {
        self.sum().round().max(0.0) as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub display_name: String,
    pub avatar_url: String,
    pub profile_name: String,
    pub dungeon_record: DungeonRecord,
    pub weight: u32,
    pub weight_breakdown: WeightBreakdown,
    pub class_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub display_name: String,
    pub avatar_url: String,
    pub weight: u32,
    pub catacombs_level: u32,
    pub class_average: f64,
    pub selected_class: Option<ClassName>,
    pub secrets_found: u64,
    pub total_completions: u64,
    pub fastest_f7: String,
    pub fastest_m7: String,
    pub fastest_f7_s_plus: String,
    pub fastest_m7_s_plus: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(times_played: u64, tier_completions: u64) -> FloorStats {
        FloorStats {
            times_played,
            tier_completions,
            ..FloorStats::default()
        }
    }

    #[test]
    fn legacy_berserk_spelling_deserializes() {
        let class: ClassName = serde_json::from_str("\"beserk\"").unwrap();
        assert_eq!(class, ClassName::Berserk);
        assert_eq!(serde_json::to_string(&class).unwrap(), "\"berserk\"");
        assert_eq!(ClassName::from_key("Beserk"), Some(ClassName::Berserk));
    }

    #[test]
    fn floor_id_rejects_out_of_range() {
        assert!(FloorId::new(8).is_none());
        assert!(serde_json::from_str::<FloorId>("9").is_err());
        assert!(!DungeonMode::Master.has_floor(FloorId::ENTRANCE));
        assert_eq!(DungeonMode::Master.floors().count(), 7);
        assert_eq!(DungeonMode::Normal.floors().count(), 8);
    }

    #[test]
    fn floor_map_keys_serialize_as_strings() {
        let mut floors = Floors::default();
        floors.normal.insert(FloorId::new(7).unwrap(), floor(3, 2));

        let json = serde_json::to_value(&floors).unwrap();
        assert_eq!(json["normal"]["7"]["tier_completions"], 2);

        let back: Floors = serde_json::from_value(json).unwrap();
        assert_eq!(back, floors);
    }

    #[test]
    fn total_completions_sums_both_modes() {
        let mut record = DungeonRecord::default();
        record.floors.normal.insert(FloorId::new(1).unwrap(), floor(10, 4));
        record.floors.normal.insert(FloorId::new(7).unwrap(), floor(20, 6));
        record.floors.master.insert(FloorId::new(3).unwrap(), floor(5, 5));

        assert_eq!(record.total_completions(), 15);
        assert_eq!(record.mode_completions(DungeonMode::Normal), 10);
        assert_eq!(record.highest_floor(DungeonMode::Normal).map(FloorId::get), Some(7));
        assert_eq!(record.most_played_floor(DungeonMode::Normal).map(FloorId::get), Some(7));
        assert_eq!(record.highest_floor(DungeonMode::Master).map(FloorId::get), Some(3));
    }

    #[test]
    fn default_floor_falls_back_to_lowest_recorded() {
        let mut record = DungeonRecord::default();
        record.floors.master.insert(FloorId::new(2).unwrap(), floor(4, 0));
        record.floors.master.insert(FloorId::new(5).unwrap(), floor(1, 0));

        assert_eq!(record.highest_floor(DungeonMode::Master), None);
        assert_eq!(record.default_floor(DungeonMode::Master).map(FloorId::get), Some(2));
        assert_eq!(record.default_floor(DungeonMode::Normal), None);
    }

    #[test]
    fn class_average_counts_missing_classes_as_zero() {
        let mut record = DungeonRecord::default();
        record.class_levels.insert(
            ClassName::Mage,
            LevelInfo {
                level: 25,
                ..LevelInfo::default()
            },
        );
        record.selected_class = Some(ClassName::Mage);

        assert_eq!(record.class_level_sum(), 25);
        assert_eq!(record.class_average(), 5.0);
        let classes = record.classes();
        assert_eq!(classes.len(), 1);
        assert!(classes[0].selected);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_score(301), Grade::SPlus);
        assert_eq!(Grade::from_score(300), Grade::S);
        assert_eq!(Grade::from_score(271), Grade::S);
        assert_eq!(Grade::from_score(231), Grade::A);
        assert_eq!(Grade::from_score(230), Grade::B);
        assert_eq!(Grade::from_score(101), Grade::C);
        assert_eq!(Grade::from_score(100), Grade::D);
        assert_eq!(Grade::from_score(u64::from(u32::MAX) * 4), Grade::SPlus);
        assert_eq!(serde_json::to_string(&Grade::SPlus).unwrap(), "\"S+\"");
    }

    #[test]
    fn rarity_tiers() {
        assert_eq!(LevelRarity::from_level(0), LevelRarity::Uncommon);
        assert_eq!(LevelRarity::from_level(10), LevelRarity::Rare);
        assert_eq!(LevelRarity::from_level(29), LevelRarity::Epic);
        assert_eq!(LevelRarity::from_level(30), LevelRarity::Legendary);
        assert_eq!(LevelRarity::from_level(50), LevelRarity::Mythic);
    }
}
