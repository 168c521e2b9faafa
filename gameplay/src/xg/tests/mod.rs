//! Whole-level runs of the extended sector engine.

use glam::Vec2;
use sound_traits::SoundAction;

use crate::env::specials::Plane;
use crate::level::tests::{corridor_map, monster, new_level, player_start, two_room_map};
use crate::xg::{
    movers_on, set_sector_type, start_plane_mover, use_line, ChainClass, Definitions, MoverFlag,
    PlaneMover,
};

const DEFS: &str = r#"(
    sector_types: [
        (id: 20, floor: (func: "az", interval_min: 1.0, interval_max: 1.0, scale: 64.0)),
        (id: 21, floor: (func: "+faz", interval_min: 1.0, interval_max: 1.0, scale: 64.0)),
        (
            id: 30,
            chains: [(class: "inside", line_type: 60, flags: ["player-a"], count: 1)],
        ),
        (id: 31, chains: [(class: "ticker", line_type: 80, count: 2)]),
        (id: 32, light: (func: "A!61Z", interval_min: 0.1, interval_max: 0.1)),
        (
            id: 33,
            chains: [(class: "floor", line_type: 60, flags: ["any-a"], start: 2.0)],
        ),
    ],
    line_types: [
        (id: 60, class: "set-light", light: 0.0),
        (id: 61, class: "set-light", light: 0.75, target: "tagged:2"),
        (id: 70, class: "move-plane", target: "tagged:5", plane: "floor",
         destination: "current-floor", destination_offset: 8.0, speed: 1.0, start_sound: 77),
        (id: 80, class: "move-plane", plane: "ceiling", destination: "current-ceiling",
         destination_offset: -1.0, speed: 1.0, start_sound: 90),
        (id: 90, class: "build-stairs", plane: "floor", step_height: 8.0, speed: 2.0, flags: ["spread"]),
    ],
)"#;

fn defs() -> Definitions {
    Definitions::from_ron(DEFS).unwrap()
}

fn started(rx: &std::sync::mpsc::Receiver<SoundAction>, sfx: i32) -> usize {
    rx.try_iter()
        .filter(|a| matches!(a, SoundAction::StartSfx { sfx: s, .. } if *s == sfx))
        .count()
}

#[test]
fn floor_function_rises_smoothly() {
    let (mut level, _rx) = new_level(&two_room_map(), defs());
    set_sector_type(&mut level, 0, 20);

    let mut last = level.map_data.sectors[0].floorheight;
    assert_eq!(last, 0.0);
    for _ in 0..35 {
        level.tick();
        let h = level.map_data.sectors[0].floorheight;
        assert!(h >= last);
        assert!(h <= 64.0 + 1e-3);
        last = h;
    }
    assert!((last - 64.0).abs() < 1e-3);
}

#[test]
fn floor_function_from_current_height() {
    let (mut level, _rx) = new_level(&two_room_map(), defs());
    // Sector 1 starts at 16
    set_sector_type(&mut level, 1, 21);
    for _ in 0..17 {
        level.tick();
    }
    let h = level.map_data.sectors[1].floorheight;
    assert!(h > 16.0 && h < 16.0 + 64.0);
    for _ in 0..18 {
        level.tick();
    }
    assert!((level.map_data.sectors[1].floorheight - 80.0).abs() < 1e-3);
}

#[test]
fn inside_chain_only_for_players() {
    let mut desc = two_room_map();
    desc.things.push(player_start(32.0, 32.0));
    desc.things.push(monster(200.0, 64.0));
    let (mut level, _rx) = new_level(&desc, defs());
    set_sector_type(&mut level, 1, 30);
    let start_light = level.map_data.sectors[1].lightlevel;

    for _ in 0..5 {
        level.tick();
    }
    assert_eq!(level.map_data.sectors[1].lightlevel, start_light);

    let player = level.players[0].mobj.unwrap();
    assert!(level.move_mobj(player, Vec2::new(160.0, 32.0), 16.0));
    level.tick();
    assert_eq!(level.map_data.sectors[1].lightlevel, 0.0);
    assert_eq!(
        level.xg().sector(1).unwrap().chain_counts[ChainClass::Inside as usize],
        0
    );

    // Budget spent, nothing more fires
    level.map_data.sectors[1].lightlevel = 0.5;
    for _ in 0..10 {
        level.tick();
    }
    assert_eq!(level.map_data.sectors[1].lightlevel, 0.5);
}

#[test]
fn clearing_extended_type_stops_its_sounds() {
    let (mut level, rx) = new_level(&two_room_map(), defs());
    set_sector_type(&mut level, 0, 31);
    set_sector_type(&mut level, 1, 0);
    assert!(!rx
        .try_iter()
        .any(|a| matches!(a, SoundAction::StopSectorSfx { .. })));

    set_sector_type(&mut level, 0, 0);
    assert!(level.xg().sector(0).is_none());
    let actions: Vec<_> = rx.try_iter().collect();
    assert!(matches!(
        actions[..],
        [SoundAction::StopSectorSfx { sector: 0 }]
    ));
}

#[test]
fn ticker_chain_budget() {
    let (mut level, rx) = new_level(&two_room_map(), defs());
    set_sector_type(&mut level, 0, 31);
    for _ in 0..20 {
        level.tick();
    }
    assert_eq!(started(&rx, 90), 2);
    assert_eq!(
        level.xg().sector(0).unwrap().chain_counts[ChainClass::Ticker as usize],
        0
    );
}

#[test]
fn floor_chain_waits_for_window() {
    let mut desc = two_room_map();
    desc.things.push(monster(64.0, 64.0));
    let (mut level, _rx) = new_level(&desc, defs());
    set_sector_type(&mut level, 0, 33);

    // Not before two seconds of level time
    for _ in 0..69 {
        level.tick();
    }
    assert!(level.map_data.sectors[0].lightlevel > 0.0);
    level.tick();
    assert_eq!(level.map_data.sectors[0].lightlevel, 0.0);
}

#[test]
fn function_fires_chain() {
    let (mut level, _rx) = new_level(&two_room_map(), defs());
    level.map_data.sectors[1].tag = 2;
    set_sector_type(&mut level, 0, 32);
    for _ in 0..3 {
        level.tick();
    }
    assert_ne!(level.map_data.sectors[1].lightlevel, 0.75);
    level.tick();
    assert_eq!(level.map_data.sectors[1].lightlevel, 0.75);
    assert_eq!(level.map_data.sectors[0].lightlevel, 1.0);
}

#[test]
fn one_mover_per_plane() {
    let mut desc = two_room_map();
    desc.lines[3].special = 70;
    let (mut level, rx) = new_level(&desc, defs());
    level.map_data.sectors[0].tag = 5;

    let mut first = PlaneMover::new(1, Plane::Ceiling, 64.0, 1.0);
    first.origin = Some(3);
    first.flags = MoverFlag::ActivateOnAbort as u32;
    start_plane_mover(&mut level, first);
    level.tick();
    assert_eq!(started(&rx, 77), 0);

    let second = PlaneMover::new(1, Plane::Ceiling, 100.0, 2.0);
    start_plane_mover(&mut level, second);

    let movers = movers_on(&level, 1, Plane::Ceiling);
    assert_eq!(movers.len(), 1);
    let mover = level.thinkers.get(movers[0]).and_then(|d| d.plane_mover()).unwrap();
    assert_eq!(mover.destination, 100.0);

    // The abort hook activated line 3 once, which started sector 0's floor
    assert!(level.map_data.linedefs[3].xg.as_ref().unwrap().active);
    assert_eq!(movers_on(&level, 0, Plane::Floor).len(), 1);
    for _ in 0..4 {
        level.tick();
    }
    assert_eq!(started(&rx, 77), 1);
    assert_eq!(movers_on(&level, 1, Plane::Ceiling).len(), 1);
}

#[test]
fn used_line_builds_stairs() {
    let mut desc = corridor_map(5);
    // Left wall of sector 0
    desc.lines[10].special = 90;
    desc.things.push(player_start(32.0, 32.0));
    let (mut level, _rx) = new_level(&desc, defs());
    let player = level.players[0].mobj.unwrap();

    assert!(use_line(&mut level, 10, player));
    assert_eq!(level.xg.built.iter().flatten().count(), 5);
    for _ in 0..40 {
        level.tick();
    }
    let floors: Vec<f32> = level.map_data.sectors.iter().map(|s| s.floorheight).collect();
    assert_eq!(floors, vec![8.0, 16.0, 24.0, 32.0, 40.0]);
}
