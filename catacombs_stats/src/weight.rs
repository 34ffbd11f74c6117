use catacombs_schema::{DungeonMode, DungeonRecord, FloorId, WeightBreakdown};

/// Weight of a player who maxes every component.
pub const REFERENCE_WEIGHT: u32 = 1000;

const MAX_LEVEL: f64 = 50.0;
const CLASS_COUNT: f64 = 5.0;
const SECRETS_CEILING: f64 = 150_000.0;
const COMPLETIONS_CEILING: f64 = 10_000.0;
const MASTER_MODE_CAP: f64 = 50.0;
const PERFECT_SCORE_CAP: f64 = 20.0;
const PERFECT_SCORE: u32 = 300;
const FULL_COMPLETION_BONUS: f64 = 30.0;

/// Dungeon weight; an absent record weighs 0.
pub fn score(record: Option<&DungeonRecord>) -> u32 {
    record.map_or(0, |r| breakdown(r).total())
}

pub fn breakdown(record: &DungeonRecord) -> WeightBreakdown {
    WeightBreakdown {
        catacombs: record.catacombs_level.level as f64 / MAX_LEVEL * 300.0,
        classes: class_component(record),
        secrets: concave(record.secrets_found as f64 / SECRETS_CEILING, 0.6) * 200.0,
        completions: concave(record.total_completions() as f64 / COMPLETIONS_CEILING, 0.7) * 150.0,
        master_mode: master_mode_component(record),
        perfect_scores: perfect_score_component(record),
        full_completion: if is_fully_completed(record) {
            FULL_COMPLETION_BONUS
        } else {
            0.0
        },
    }
}

fn class_component(record: &DungeonRecord) -> f64 {
    let sum = record.class_level_sum() as f64;
    sum / (CLASS_COUNT * MAX_LEVEL) * 150.0 + record.class_average() / MAX_LEVEL * 100.0
}

/// `min(1, ratio) ^ exponent`, never negative.
fn concave(ratio: f64, exponent: f64) -> f64 {
    ratio.clamp(0.0, 1.0).powf(exponent)
}

fn master_mode_component(record: &DungeonRecord) -> f64 {
    let total: f64 = DungeonMode::Master
        .floors()
        .map(|floor| {
            let index = floor.get() as f64;
            let completions = record
                .floors
                .get(DungeonMode::Master, floor)
                .map_or(0, |f| f.tier_completions) as f64;
            (index * 5.0).min((completions + 1.0).log10() * index * 3.0)
        })
        .sum();
    total.min(MASTER_MODE_CAP)
}

fn perfect_score_component(record: &DungeonRecord) -> f64 {
    let mut total = 0.0;
    for mode in DungeonMode::ALL {
        let per_floor = match mode {
            DungeonMode::Normal => 0.5,
            DungeonMode::Master => 1.0,
        };
        for (floor, stats) in record.floors.mode(mode) {
            if stats.best_score >= PERFECT_SCORE {
                total += floor.get() as f64 * per_floor;
            }
        }
    }
    f64::min(total, PERFECT_SCORE_CAP)
}

fn is_fully_completed(record: &DungeonRecord) -> bool {
    DungeonMode::ALL.iter().all(|&mode| {
        mode.floors().all(|floor: FloorId| {
            record
                .floors
                .get(mode, floor)
                .is_some_and(|f| f.tier_completions > 0)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catacombs_schema::{ClassName, FloorStats, LevelInfo};

    fn level(level: u32) -> LevelInfo {
        LevelInfo {
            level,
            ..LevelInfo::default()
        }
    }

    fn cleared(completions: u64, best_score: u32) -> FloorStats {
        FloorStats {
            times_played: completions,
            tier_completions: completions,
            best_score,
            ..FloorStats::default()
        }
    }

    fn maxed_record() -> DungeonRecord {
        let mut record = DungeonRecord {
            catacombs_level: level(50),
            secrets_found: 200_000,
            ..DungeonRecord::default()
        };
        for class in ClassName::ALL {
            record.class_levels.insert(class, level(50));
        }
        for mode in DungeonMode::ALL {
            for floor in mode.floors() {
                record.floors.mode_mut(mode).insert(floor, cleared(1_000, 317));
            }
        }
        record
    }

    #[test]
    fn absent_record_weighs_nothing() {
        assert_eq!(score(None), 0);
    }

    #[test]
    fn empty_record_weighs_nothing() {
        let record = DungeonRecord::default();
        let parts = breakdown(&record);
        assert_eq!(parts.sum(), 0.0);
        assert_eq!(score(Some(&record)), 0);
    }

    #[test]
    fn maxed_record_hits_reference_weight() {
        let record = maxed_record();
        let parts = breakdown(&record);

        assert_eq!(parts.catacombs, 300.0);
        assert_eq!(parts.classes, 250.0);
        assert_eq!(parts.secrets, 200.0);
        assert_eq!(parts.completions, 150.0);
        assert_eq!(parts.master_mode, 50.0);
        assert_eq!(parts.perfect_scores, 20.0);
        assert_eq!(parts.full_completion, 30.0);
        assert_eq!(score(Some(&record)), REFERENCE_WEIGHT);
    }

    #[test]
    fn one_missing_floor_drops_full_completion_bonus() {
        let mut record = maxed_record();
        record.floors.master.remove(&FloorId::new(1).unwrap());
        assert_eq!(breakdown(&record).full_completion, 0.0);
    }

    #[test]
    fn master_mode_component_uses_log_curve_below_cap() {
        let mut record = DungeonRecord::default();
        // log10(10) * 2 * 3 = 6, capped by 2 * 5 = 10.
        record.floors.master.insert(FloorId::new(2).unwrap(), cleared(9, 0));
        assert!((breakdown(&record).master_mode - 6.0).abs() < 1e-9);

        // log10(1000) * 1 * 3 = 9, capped by 1 * 5 = 5.
        record.floors.master.insert(FloorId::new(1).unwrap(), cleared(999, 0));
        assert!((breakdown(&record).master_mode - 11.0).abs() < 1e-9);
    }

    #[test]
    fn perfect_scores_weigh_master_floors_double() {
        let mut record = DungeonRecord::default();
        record.floors.normal.insert(FloorId::new(4).unwrap(), cleared(1, 300));
        record.floors.normal.insert(FloorId::new(5).unwrap(), cleared(1, 299));
        record.floors.master.insert(FloorId::new(4).unwrap(), cleared(1, 305));
        assert_eq!(breakdown(&record).perfect_scores, 6.0);
    }

    #[test]
    fn secrets_have_diminishing_returns() {
        let mut record = DungeonRecord {
            secrets_found: 37_500,
            ..DungeonRecord::default()
        };
        let quarter = breakdown(&record).secrets;
        assert!(quarter > 50.0, "concave curve should beat linear");

        record.secrets_found = 10_000_000;
        assert_eq!(breakdown(&record).secrets, 200.0);
    }

    #[test]
    fn weight_grows_past_reference_only_through_levels() {
        let mut record = maxed_record();
        record.catacombs_level = level(60);
        assert_eq!(score(Some(&record)), 1060);
    }
}
