//! Stair building. Each round raises (or lowers) the sectors reached from
//! the previous round one step further than the last.

use log::debug;

use crate::env::specials::{plane_height, Plane};
use crate::level::Level;
use crate::xg::defs::StairsDef;
use crate::xg::mover::{start_plane_mover, MoverFlag, PlaneMover};

fn material(level: &Level, sector: usize, plane: Plane) -> usize {
    let sec = &level.map_data.sectors[sector];
    match plane {
        Plane::Floor => sec.floorpic,
        Plane::Ceiling => sec.ceilingpic,
    }
}

fn build_step(
    level: &mut Level,
    sector: usize,
    def: &StairsDef,
    origin_line: Option<usize>,
    base: f32,
    step: u32,
) {
    level.xg.built[sector] = Some(step);
    let n = step as f32;
    let mut mover = PlaneMover::new(
        sector,
        def.plane,
        base + (n + 1.0) * def.step_height,
        def.speed + n * def.speed_increment,
    )
    .with_wait(def.wait + step as i32 * def.wait_increment);
    mover.origin = origin_line;
    mover.sounds = def.sounds;
    mover.sound_interval = def.sound_interval;
    if def.crush {
        mover.flags |= MoverFlag::Crush as u32;
    }
    start_plane_mover(level, mover);
}

/// Sectors on the far side of two-sided lines facing out of `sector` that
/// have not been built yet, as `(line, sector)` in line order
fn outward(level: &Level, sector: usize, picstop: Option<usize>, plane: Plane) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for &l in &level.map_data.sectors[sector].lines {
        let line = &level.map_data.linedefs[l];
        if line.frontsector != sector {
            continue;
        }
        let Some(back) = line.backsector else {
            continue;
        };
        if level.xg.built[back].is_some() {
            continue;
        }
        if picstop.is_some_and(|pic| material(level, back, plane) != pic) {
            continue;
        }
        out.push((l, back));
    }
    out
}

/// Build stairs starting at `origin`. Every mover is set up here; the spread
/// does not wait for a step to finish moving. Returns the number of sectors
/// built.
pub fn build_stairs(
    level: &mut Level,
    origin: usize,
    def: &StairsDef,
    origin_line: Option<usize>,
) -> usize {
    level.xg.built.iter_mut().for_each(|b| *b = None);
    let base = plane_height(level, origin, def.plane);
    let picstop = def.picstop.then(|| material(level, origin, def.plane));

    build_step(level, origin, def, origin_line, base, 0);
    let mut count = 1;
    let mut previous = vec![origin];
    let mut step = 1;

    while !previous.is_empty() {
        let mut found: Vec<(usize, usize)> = Vec::new();
        for &sector in &previous {
            for (line, next) in outward(level, sector, picstop, def.plane) {
                if !found.iter().any(|&(_, s)| s == next) {
                    found.push((line, next));
                }
            }
        }
        if !def.spread {
            found = found.into_iter().min_by_key(|&(line, _)| line).into_iter().collect();
        }

        previous = found.iter().map(|&(_, s)| s).collect();
        previous.sort_unstable();
        for &sector in &previous {
            build_step(level, sector, def, origin_line, base, step);
        }
        count += previous.len();
        step += 1;
    }

    debug!(target: "xg", "Stairs from sector {} built {} steps", origin, count);
    count
}

#[cfg(test)]
mod tests {
    use super::build_stairs;
    use crate::env::specials::Plane;
    use crate::level::tests::{corridor_map, join_sectors, new_level};
    use crate::xg::defs::{MoverSounds, StairsDef};
    use crate::xg::mover::movers_on;
    use crate::xg::Definitions;

    fn stairs(spread: bool, picstop: bool) -> StairsDef {
        StairsDef {
            plane: Plane::Floor,
            speed: 2.0,
            speed_increment: 1.0,
            step_height: 8.0,
            wait: 0,
            wait_increment: 5,
            picstop,
            spread,
            crush: false,
            sounds: MoverSounds::default(),
            sound_interval: [0, 0],
        }
    }

    #[test]
    fn corridor_steps() {
        let (mut level, _rx) = new_level(&corridor_map(4), Definitions::default());
        assert_eq!(build_stairs(&mut level, 0, &stairs(false, false), None), 4);
        assert_eq!(level.xg.built, vec![Some(0), Some(1), Some(2), Some(3)]);

        for (sector, (dest, speed)) in [(8.0, 2.0), (16.0, 3.0), (24.0, 4.0), (32.0, 5.0)]
            .into_iter()
            .enumerate()
        {
            let id = movers_on(&level, sector, Plane::Floor)[0];
            let mover = level.thinkers.get(id).and_then(|d| d.plane_mover()).unwrap();
            assert_eq!(mover.destination, dest);
            assert_eq!(mover.speed, speed);
            assert_eq!(mover.timer, sector as i32 * 5);
        }

        for _ in 0..40 {
            level.tick();
        }
        let floors: Vec<f32> = level.map_data.sectors.iter().map(|s| s.floorheight).collect();
        assert_eq!(floors, vec![8.0, 16.0, 24.0, 32.0]);
    }

    #[test]
    fn starts_mid_corridor() {
        let (mut level, _rx) = new_level(&corridor_map(4), Definitions::default());
        // Shared lines face toward higher sectors, so nothing spreads back
        assert_eq!(build_stairs(&mut level, 2, &stairs(true, false), None), 2);
        assert_eq!(level.xg.built, vec![None, None, Some(0), Some(1)]);
    }

    #[test]
    fn picstop_halts() {
        let (mut level, _rx) = new_level(&corridor_map(5), Definitions::default());
        level.map_data.sectors[3].floorpic = 4;
        assert_eq!(build_stairs(&mut level, 0, &stairs(false, true), None), 3);
        assert_eq!(level.xg.built[3], None);
        assert_eq!(level.xg.built[4], None);
    }

    #[test]
    fn rebuild_resets() {
        let (mut level, _rx) = new_level(&corridor_map(3), Definitions::default());
        build_stairs(&mut level, 0, &stairs(false, false), None);
        assert_eq!(build_stairs(&mut level, 1, &stairs(false, false), None), 2);
        assert_eq!(level.xg.built, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn spread_builds_every_branch_per_round() {
        // Sector 0 opens on to both 1 and 2
        let mut desc = corridor_map(3);
        join_sectors(&mut desc, 0, 2);

        let (mut level, _rx) = new_level(&desc, Definitions::default());
        assert_eq!(build_stairs(&mut level, 0, &stairs(true, false), None), 3);
        assert_eq!(level.xg.built, vec![Some(0), Some(1), Some(1)]);
        let id = movers_on(&level, 2, Plane::Floor)[0];
        let mover = level.thinkers.get(id).and_then(|d| d.plane_mover()).unwrap();
        assert_eq!(mover.destination, 16.0);

        let (mut level, _rx) = new_level(&desc, Definitions::default());
        assert_eq!(build_stairs(&mut level, 0, &stairs(false, false), None), 3);
        assert_eq!(level.xg.built, vec![Some(0), Some(1), Some(2)]);
        let id = movers_on(&level, 2, Plane::Floor)[0];
        let mover = level.thinkers.get(id).and_then(|d| d.plane_mover()).unwrap();
        assert_eq!(mover.destination, 24.0);
    }
}
