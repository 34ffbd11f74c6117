use super::*;
use catacombs_schema::{ClassName, DungeonMode, FloorId, Grade};
use serde_json::json;
use std::{fs, path::PathBuf};

const PLAYER_ID: &str = "4d4f7f9e-0c2a-4e8b-9a1d-2b3c4d5e6f70";

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn floor(n: u8) -> FloorId {
    FloorId::new(n).unwrap()
}

#[test]
fn both_payload_shapes_derive_identical_records() {
    let options = DeriveOptions::for_player(PLAYER_ID);
    let columnar = active_profile(&fixture("columnar_payload.json"), &options).unwrap();
    let nested = active_profile(&fixture("nested_payload.json"), &options).unwrap();

    assert_eq!(columnar.cute_name, "Apple");
    assert_eq!(nested.cute_name, "Apple");

    let columnar = columnar.dungeons.unwrap();
    let nested = nested.dungeons.unwrap();
    for mode in DungeonMode::ALL {
        assert_eq!(columnar.floors.mode(mode), nested.floors.mode(mode), "{mode:?} floors differ");
    }
    assert_eq!(columnar, nested);
}

#[test]
fn secondary_profiles_match_across_shapes() {
    let options = DeriveOptions::for_player(PLAYER_ID);
    let find = |payload: &Value| {
        parse_profiles(payload, &options)
            .unwrap()
            .into_iter()
            .find(|p| p.cute_name == "Banana")
            .unwrap()
    };

    let columnar = find(&fixture("columnar_payload.json"));
    let nested = find(&fixture("nested_payload.json"));
    assert_eq!(columnar, nested);
    assert_eq!(columnar.last_save, Some(1_699_000_000_000));
}

#[test]
fn fixture_record_values() {
    let options = DeriveOptions::for_player(PLAYER_ID);
    let record = active_profile(&fixture("columnar_payload.json"), &options)
        .unwrap()
        .dungeons
        .unwrap();

    assert_eq!(record.catacombs_level.level, 45);
    assert_eq!(record.catacombs_level.total_xp, 195_000_000);
    assert_eq!(record.class_level(ClassName::Mage), 44);
    assert_eq!(record.class_level(ClassName::Berserk), 23);
    assert_eq!(record.class_level(ClassName::Tank), 0);
    assert!(!record.class_levels.contains_key(&ClassName::Tank));
    assert_eq!(record.selected_class, Some(ClassName::Mage));
    assert_eq!(record.secrets_found, 45_000);
    assert_eq!(record.total_completions(), 227);
    assert_eq!(record.essence["undead"], 30_000);

    // floor 3 was never played
    assert!(record.floors.get(DungeonMode::Normal, floor(3)).is_none());
    assert_eq!(record.floors.normal.len(), 3);
    assert_eq!(record.floors.master.len(), 2);

    let f7 = record.floors.get(DungeonMode::Normal, floor(7)).unwrap();
    assert_eq!(f7.most_damage_by_class[&ClassName::Mage], 85_000_000);
    assert_eq!(f7.most_damage_by_class[&ClassName::Berserk], 12_000_000);
    let best = f7.best_run.as_ref().unwrap();
    assert_eq!(best.total_score(), 318);
    assert_eq!(best.grade(), Grade::SPlus);
    assert_eq!(best.dungeon_class, ClassName::Healer);

    assert_eq!(record.highest_floor(DungeonMode::Master), Some(floor(7)));
    assert_eq!(record.most_played_floor(DungeonMode::Normal), Some(floor(7)));
}

#[test]
fn player_view_carries_weight_and_class_average() {
    let options = DeriveOptions::for_player(PLAYER_ID);
    let view = derive_player_view(
        "tommo395",
        "https://mc-heads.net/avatar/tommo395",
        &fixture("nested_payload.json"),
        &options,
    )
    .unwrap();

    assert_eq!(view.display_name, "tommo395");
    assert_eq!(view.profile_name, "Apple");
    assert_eq!(view.weight, 517);
    assert_eq!(view.weight, score(Some(&view.dungeon_record)));
    assert!((view.class_average - 19.4).abs() < 1e-9);
    assert_eq!(view.weight_breakdown.full_completion, 0.0);
}

#[test]
fn columnar_without_player_id_needs_single_member() {
    // Banana has two members, so nothing can be read without an id.
    let profiles = parse_profiles(&fixture("columnar_payload.json"), &DeriveOptions::default()).unwrap();
    let banana = profiles.iter().find(|p| p.cute_name == "Banana").unwrap();
    assert!(banana.dungeons.is_none());

    let apple = profiles.iter().find(|p| p.cute_name == "Apple").unwrap();
    assert!(apple.dungeons.is_some());
}

#[test]
fn empty_profiles_signal_no_profiles_found() {
    let err = active_profile(&json!({ "success": true, "profiles": [] }), &DeriveOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoProfilesFound);

    let err = derive_player_view("nobody", "", &json!({ "profiles": null }), &DeriveOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoProfilesFound);
    assert_eq!(err.player.as_deref(), Some("nobody"));
}

#[test]
fn profile_without_dungeons_derives_zero_view() {
    let payload = json!({
        "profiles": [{ "profile_id": "p", "cute_name": "Kiwi", "members": { "u": {} } }]
    });
    let view = derive_player_view("fresh", "", &payload, &DeriveOptions::default()).unwrap();
    assert_eq!(view.weight, 0);
    assert_eq!(view.dungeon_record.total_completions(), 0);
    assert_eq!(view.class_average, 0.0);
}

#[test]
fn latest_save_picks_profile_when_none_selected() {
    let payload = json!({
        "profiles": [
            { "profile_id": "old", "cute_name": "Old", "last_save": 100, "dungeons": {} },
            { "profile_id": "new", "cute_name": "New", "last_save": 200, "dungeons": {} }
        ]
    });
    let active = active_profile(&payload, &DeriveOptions::default()).unwrap();
    assert_eq!(active.profile_id, "new");
}

#[test]
fn pre_divided_xp_uses_curve_multiplier() {
    let payload = json!({
        "profiles": [{
            "selected": true,
            "dungeons": { "catacombs": { "experience": 4.5 } }
        }]
    });
    let options = DeriveOptions {
        xp_curve: XpCurve::dungeon().with_multiplier(1000.0),
        ..DeriveOptions::default()
    };
    let record = active_profile(&payload, &options).unwrap().dungeons.unwrap();
    assert_eq!(record.catacombs_level.level, 10);
}

#[test]
fn comparison_over_fixtures() {
    let options = DeriveOptions::for_player(PLAYER_ID);
    let a = derive_player_view("tommo395", "a", &fixture("columnar_payload.json"), &options).unwrap();
    let b = derive_player_view("Midori642", "b", &fixture("nested_payload.json"), &options).unwrap();

    let mut cmp = Comparison::new();
    cmp.add(a.clone().into()).unwrap();
    cmp.add(b.into()).unwrap();
    assert!(cmp.add(a.into()).is_err());

    let table = cmp.to_table();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].display_name, "tommo395");
    assert_eq!(table[0].fastest_f7, "5:12");
    assert_eq!(table[0].fastest_m7, "6:41");
    assert_eq!(table[0].weight, table[1].weight);
}
