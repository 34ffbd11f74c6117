use catacombs_schema::LevelInfo;

/// XP needed to go from `level - 1` to `level`, shared by catacombs and
/// every dungeon class.
pub const DUNGEON_XP_COSTS: [(u32, u64); 50] = [
    (1, 50),
    (2, 75),
    (3, 110),
    (4, 160),
    (5, 230),
    (6, 330),
    (7, 470),
    (8, 670),
    (9, 950),
    (10, 1_340),
    (11, 1_890),
    (12, 2_665),
    (13, 3_760),
    (14, 5_260),
    (15, 7_380),
    (16, 10_300),
    (17, 14_400),
    (18, 20_000),
    (19, 27_600),
    (20, 38_000),
    (21, 52_500),
    (22, 71_500),
    (23, 97_000),
    (24, 132_000),
    (25, 180_000),
    (26, 243_000),
    (27, 328_000),
    (28, 445_000),
    (29, 600_000),
    (30, 800_000),
    (31, 1_065_000),
    (32, 1_410_000),
    (33, 1_900_000),
    (34, 2_500_000),
    (35, 3_300_000),
    (36, 4_300_000),
    (37, 5_600_000),
    (38, 7_200_000),
    (39, 9_200_000),
    (40, 12_000_000),
    (41, 15_000_000),
    (42, 19_000_000),
    (43, 24_000_000),
    (44, 30_000_000),
    (45, 38_000_000),
    (46, 48_000_000),
    (47, 60_000_000),
    (48, 75_000_000),
    (49, 93_000_000),
    (50, 116_250_000),
];

/// A per-level XP cost table plus the factor that turns the stored value
/// into real XP.
#[derive(Debug, Clone, PartialEq)]
pub struct XpCurve {
    costs: Vec<(u32, u64)>,
    /// Applied to the raw stored value before lookup. Sources that store XP
    /// pre-divided by 1000 use `1000.0`.
    pub raw_xp_multiplier: f64,
}

impl XpCurve {
    /// Entries may come in any order and may skip levels.
    pub fn new(costs: &[(u32, u64)], raw_xp_multiplier: f64) -> Self {
        let mut costs = costs.to_vec();
        costs.sort_by_key(|&(level, _)| level);
        costs.dedup_by_key(|&mut (level, _)| level);
        Self {
            costs,
            raw_xp_multiplier,
        }
    }

    pub fn dungeon() -> Self {
        Self::new(&DUNGEON_XP_COSTS, 1.0)
    }

    pub fn with_multiplier(mut self, raw_xp_multiplier: f64) -> Self {
        self.raw_xp_multiplier = raw_xp_multiplier;
        self
    }

    pub fn max_level(&self) -> u32 {
        self.costs.last().map_or(0, |&(level, _)| level)
    }

    pub fn total_cost(&self) -> u64 {
        self.costs.iter().map(|&(_, cost)| cost).sum()
    }

    /// Real XP for a stored value; malformed input becomes 0.
    pub fn scaled_xp(&self, raw_xp: f64) -> u64 {
        let xp = raw_xp * self.raw_xp_multiplier;
        if xp.is_finite() && xp > 0.0 {
            xp.floor() as u64
        } else {
            0
        }
    }
}

impl Default for XpCurve {
    fn default() -> Self {
        Self::dungeon()
    }
}

pub fn compute_level(raw_xp: f64, curve: &XpCurve) -> LevelInfo {
    let total_xp = curve.scaled_xp(raw_xp);
    let mut climbed: u64 = 0;
    let mut level = 0;

    for &(table_level, cost) in &curve.costs {
        if total_xp < climbed + cost {
            let xp_into_level = total_xp - climbed;
            return LevelInfo {
                // Gaps in the table count as already climbed.
                level: table_level.saturating_sub(1).max(level),
                progress: xp_into_level as f64 / cost as f64,
                xp_into_level,
                xp_for_next_level: cost,
                total_xp,
            };
        }
        climbed += cost;
        level = table_level;
    }

    LevelInfo {
        level: curve.max_level(),
        progress: 1.0,
        xp_into_level: 0,
        xp_for_next_level: 0,
        total_xp,
    }
}
