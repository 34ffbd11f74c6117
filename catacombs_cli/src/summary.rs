use std::fmt::Write;

use catacombs_client::DirectoryEntry;
use catacombs_schema::{ComparisonRow, DungeonMode, DungeonRecord, PlayerView};
use catacombs_stats::{format_date, format_number, format_time};

const NONE: &str = "None";

pub fn render_view(view: &PlayerView) -> String {
    let record = &view.dungeon_record;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", view.display_name, view.profile_name);
    let _ = writeln!(
        out,
        "Catacombs {} ({})  Weight {}  Class average {:.1}",
        record.catacombs_level.level,
        record.rarity().as_str(),
        view.weight,
        view.class_average
    );
    let _ = writeln!(
        out,
        "Secrets {}  Completions {}",
        format_number(record.secrets_found),
        format_number(record.total_completions())
    );

    let classes: Vec<String> = record
        .classes()
        .iter()
        .map(|c| {
            let marker = if c.selected { "*" } else { "" };
            format!("{}{} {}", c.class.display_name(), marker, c.level.level)
        })
        .collect();
    let _ = writeln!(out, "Classes: {}", if classes.is_empty() { NONE.to_string() } else { classes.join(", ") });

    for mode in DungeonMode::ALL {
        render_mode(&mut out, record, mode);
    }

    if !record.essence.is_empty() {
        let essence: Vec<String> = record
            .essence
            .iter()
            .map(|(kind, amount)| format!("{kind} {}", format_number(*amount)))
            .collect();
        let _ = writeln!(out, "Essence: {}", essence.join(", "));
    }
    out
}

fn render_mode(out: &mut String, record: &DungeonRecord, mode: DungeonMode) {
    let label = |floor: Option<_>| floor.map_or_else(|| NONE.to_string(), |f| mode.floor_label(f));
    let title = match mode {
        DungeonMode::Normal => "Normal",
        DungeonMode::Master => "Master",
    };
    let _ = writeln!(
        out,
        "{title}: highest {}, most played {}, completions {}",
        label(record.highest_floor(mode)),
        label(record.most_played_floor(mode)),
        format_number(record.mode_completions(mode))
    );

    for (&floor, stats) in record.floors.mode(mode) {
        let _ = writeln!(
            out,
            "  {:<8} played {:<6} completions {:<6} best {:<4} fastest {:<6} S+ {}",
            mode.floor_label(floor),
            stats.times_played,
            stats.tier_completions,
            stats.best_score,
            format_time(stats.fastest_time_ms),
            format_time(stats.fastest_time_s_plus_rank_ms)
        );
    }

    let Some(floor) = record.default_floor(mode) else {
        return;
    };
    let runs = record.floors.get(mode, floor).map_or(&[][..], |stats| stats.top_runs.as_slice());
    for (rank, run) in runs.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{} {:<8} score {} {:<2} {:<8} {} {}",
            rank + 1,
            mode.floor_label(floor),
            run.total_score(),
            run.grade().as_str(),
            run.dungeon_class.display_name(),
            format_time(Some(run.elapsed_time_ms)),
            format_date(run.timestamp)
        );
    }
}

pub fn render_table(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} | {:>6} | {:>4} | {:>6} | {:<8} | {:>8} | {:>6} | {:>6}",
        "Player", "Weight", "Cata", "ClsAvg", "Class", "Secrets", "F7", "M7"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<16} | {:>6} | {:>4} | {:>6.1} | {:<8} | {:>8} | {:>6} | {:>6}",
            row.display_name,
            row.weight,
            row.catacombs_level,
            row.class_average,
            row.selected_class.map_or(NONE, |c| c.display_name()),
            format_number(row.secrets_found),
            row.fastest_f7,
            row.fastest_m7
        );
    }
    out
}

pub fn render_players(entries: &[DirectoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        match &entry.description {
            Some(description) => {
                let _ = writeln!(out, "{} - {}", entry.name, description);
            }
            None => {
                let _ = writeln!(out, "{}", entry.name);
            }
        }
    }
    out
}
