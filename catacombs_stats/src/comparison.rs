use catacombs_schema::{ComparisonRow, DungeonMode, FloorId, PlayerView};

use crate::format::format_time;
use crate::TrackerError;

const TOP_FLOOR: u8 = 7;

/// Frozen snapshot of one player's derived view. Refreshing a player means
/// removing the entry and adding a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonEntry {
    view: PlayerView,
}

impl ComparisonEntry {
    pub fn new(view: PlayerView) -> Self {
        Self { view }
    }

    pub fn name(&self) -> &str {
        &self.view.display_name
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    fn matches(&self, name: &str) -> bool {
        same_player(self.name(), name)
    }

    pub fn to_row(&self) -> ComparisonRow {
        let view = &self.view;
        let record = &view.dungeon_record;
        let top = FloorId::new(TOP_FLOOR);
        let time = |mode: DungeonMode, s_plus: bool| {
            let floor = top.and_then(|f| record.floors.get(mode, f));
            format_time(floor.and_then(|f| {
                if s_plus {
                    f.fastest_time_s_plus_rank_ms
                } else {
                    f.fastest_time_ms
                }
            }))
        };

        ComparisonRow {
            display_name: view.display_name.clone(),
            avatar_url: view.avatar_url.clone(),
            weight: view.weight,
            catacombs_level: record.catacombs_level.level,
            class_average: view.class_average,
            selected_class: record.selected_class,
            secrets_found: record.secrets_found,
            total_completions: record.total_completions(),
            fastest_f7: time(DungeonMode::Normal, false),
            fastest_m7: time(DungeonMode::Master, false),
            fastest_f7_s_plus: time(DungeonMode::Normal, true),
            fastest_m7_s_plus: time(DungeonMode::Master, true),
        }
    }
}

impl From<PlayerView> for ComparisonEntry {
    fn from(view: PlayerView) -> Self {
        Self::new(view)
    }
}

pub fn same_player(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Players tracked side by side, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    entries: Vec<ComparisonEntry>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ComparisonEntry) -> Result<&[ComparisonEntry], TrackerError> {
        if self.contains(entry.name()) {
            return Err(TrackerError::duplicate_player(entry.name()));
        }
        tracing::debug!(player = entry.name(), "added to comparison");
        self.entries.push(entry);
        Ok(self.entries.as_slice())
    }

    /// Unknown names leave the list untouched.
    pub fn remove(&mut self, name: &str) -> &[ComparisonEntry] {
        self.entries.retain(|e| !e.matches(name));
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.matches(name))
    }

    pub fn entries(&self) -> &[ComparisonEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_table(&self) -> Vec<ComparisonRow> {
        self.entries.iter().map(ComparisonEntry::to_row).collect()
    }
}
