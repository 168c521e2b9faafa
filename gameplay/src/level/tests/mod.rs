//! Small hand-built maps shared by the level and XG tests.

use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};

use sound_traits::SoundAction;

use crate::level::map_data::{
    LineDesc, MapData, MapDescription, SectorDesc, SideDesc, ThingDesc, VertexDesc,
};
use crate::xg::Definitions;
use crate::{Level, Skill};

fn vertex(x: f32, y: f32) -> VertexDesc {
    VertexDesc { x, y }
}

fn sector(floor: f32, ceiling: f32, light: f32) -> SectorDesc {
    SectorDesc {
        floor,
        ceiling,
        light,
        ..SectorDesc::default()
    }
}

fn side(sector: usize) -> SideDesc {
    SideDesc {
        sector,
        ..SideDesc::default()
    }
}

fn line(v1: usize, v2: usize, front: usize, back: Option<usize>) -> LineDesc {
    LineDesc {
        v1,
        v2,
        front,
        back,
        ..LineDesc::default()
    }
}

/// Two 128 unit rooms side by side, joined by line 6.
///
/// Sector 0 spans x 0..128, sector 1 spans x 128..256.
pub(crate) fn two_room_map() -> MapDescription {
    MapDescription {
        name: "ROOMS".to_string(),
        vertexes: vec![
            vertex(0.0, 0.0),
            vertex(128.0, 0.0),
            vertex(256.0, 0.0),
            vertex(256.0, 128.0),
            vertex(128.0, 128.0),
            vertex(0.0, 128.0),
        ],
        sectors: vec![sector(0.0, 128.0, 160.0), sector(16.0, 112.0, 128.0)],
        sides: vec![side(0), side(1), side(0), side(1)],
        lines: vec![
            line(0, 1, 0, None),
            line(1, 2, 1, None),
            line(2, 3, 1, None),
            line(3, 4, 1, None),
            line(4, 5, 0, None),
            line(5, 0, 0, None),
            line(1, 4, 2, Some(3)),
        ],
        things: Vec::new(),
        texture_heights: vec![64.0, 128.0, 32.0],
    }
}

/// A row of `count` 64 unit square sectors along x. The line between
/// sector `i` and `i + 1` has `i` as its front sector.
pub(crate) fn corridor_map(count: usize) -> MapDescription {
    let mut vertexes = Vec::new();
    for i in 0..=count {
        vertexes.push(vertex(i as f32 * 64.0, 0.0));
    }
    for i in 0..=count {
        vertexes.push(vertex(i as f32 * 64.0, 64.0));
    }
    let top = |i: usize| count + 1 + i;

    let sectors = (0..count).map(|_| sector(0.0, 256.0, 192.0)).collect();
    let mut sides: Vec<SideDesc> = (0..count).map(side).collect();
    let mut lines = Vec::new();
    for i in 0..count {
        lines.push(line(i, i + 1, i, None));
        lines.push(line(top(i + 1), top(i), i, None));
    }
    lines.push(line(top(0), 0, 0, None));
    lines.push(line(count, top(count), count - 1, None));
    for i in 0..count - 1 {
        let front = sides.len();
        sides.push(side(i));
        sides.push(side(i + 1));
        lines.push(line(i + 1, top(i + 1), front, Some(front + 1)));
    }

    MapDescription {
        name: "CORRIDOR".to_string(),
        vertexes,
        sectors,
        sides,
        lines,
        things: Vec::new(),
        texture_heights: vec![64.0],
    }
}

/// Add a two-sided line with `front` and `back` on its sides. Only the
/// sector adjacency is meaningful, the line reuses vertexes 0 and 1.
pub(crate) fn join_sectors(desc: &mut MapDescription, front: usize, back: usize) {
    let side_num = desc.sides.len();
    desc.sides.push(side(front));
    desc.sides.push(side(back));
    desc.lines.push(line(0, 1, side_num, Some(side_num + 1)));
}

pub(crate) fn player_start(x: f32, y: f32) -> ThingDesc {
    ThingDesc {
        x,
        y,
        angle: 90.0,
        kind: 1,
        flags: vec!["solid".to_string(), "shootable".to_string()],
        radius: None,
        height: None,
    }
}

pub(crate) fn monster(x: f32, y: f32) -> ThingDesc {
    ThingDesc {
        x,
        y,
        angle: 0.0,
        kind: 3004,
        flags: vec![
            "solid".to_string(),
            "shootable".to_string(),
            "count-kill".to_string(),
        ],
        radius: Some(20.0),
        height: Some(56.0),
    }
}

pub(crate) fn new_level(desc: &MapDescription, defs: Definitions) -> (Level, Receiver<SoundAction>) {
    let map = MapData::from_description(desc).unwrap();
    let (tx, rx) = channel();
    let mut level = Level::new(map, Rc::new(defs), Skill::Medium, tx);
    level.spawn_specials();
    (level, rx)
}
