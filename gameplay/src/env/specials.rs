//! Sector plane movement and neighbour lookups shared by the XG movers.
//!
//! Doom source name `p_spec`, `p_floor`

use log::{debug, trace};

use crate::level::flags::LineDefFlags;
use crate::level::map_defs::LineDef;
use crate::level::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Floor,
    Ceiling,
}

impl Plane {
    pub const fn index(self) -> usize {
        match self {
            Plane::Floor => 0,
            Plane::Ceiling => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneResult {
    Ok,
    Crushed,
    PastDest,
}

/// The sector on the other side of `line` from `sector`
pub fn get_next_sector(line: &LineDef, sector: usize) -> Option<usize> {
    if line.flags & LineDefFlags::TwoSided as u32 == 0 {
        return None;
    }

    if line.frontsector == sector {
        return line.backsector;
    }

    Some(line.frontsector)
}

/// Every distinct sector sharing a line with `sector`, in line order
pub fn surrounding_sectors(level: &Level, sector: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for &line in &level.map_data.sectors[sector].lines {
        if let Some(other) = get_next_sector(&level.map_data.linedefs[line], sector) {
            if other != sector && !out.contains(&other) {
                out.push(other);
            }
        }
    }
    out
}

pub fn plane_height(level: &Level, sector: usize, plane: Plane) -> f32 {
    let sec = &level.map_data.sectors[sector];
    match plane {
        Plane::Floor => sec.floorheight,
        Plane::Ceiling => sec.ceilingheight,
    }
}

fn set_plane_height(level: &mut Level, sector: usize, plane: Plane, height: f32) {
    let sec = &mut level.map_data.sectors[sector];
    match plane {
        Plane::Floor => sec.floorheight = height,
        Plane::Ceiling => sec.ceilingheight = height,
    }
}

/// P_ChangeSector
///
/// Refit every object in the sector. Returns true if any no longer fit.
pub(crate) fn change_sector(level: &mut Level, sector: usize, crunch: bool) -> bool {
    let mut no_fit = false;
    let level_time = level.level_time;
    let (floor, ceiling) = {
        let sec = &level.map_data.sectors[sector];
        (sec.floorheight, sec.ceilingheight)
    };
    let things = level.map_data.sectors[sector].thinglist.clone();
    for id in things {
        if let Some(thing) = level.thinkers.mobj_mut(id) {
            trace!("Thing type {:?} is in affected sector", thing.kind);
            thing.pit_change_sector(floor, ceiling, &mut no_fit, crunch, level_time);
        }
    }
    no_fit
}

/// Move a floor or ceiling toward `dest` by `speed`, stopping exactly on the
/// destination. If objects no longer fit the move is undone, unless `crush`
/// is set in which case the plane keeps moving and squeezes them.
///
/// Doom function name `T_MovePlane`
pub fn move_plane(
    level: &mut Level,
    sector: usize,
    speed: f32,
    dest: f32,
    crush: bool,
    plane: Plane,
    direction: i32,
) -> PlaneResult {
    let current = plane_height(level, sector, plane);
    trace!(
        "move_plane: {:?}: {} {} to {} at speed {}",
        plane,
        direction,
        current,
        dest,
        speed
    );

    let past_dest = match direction {
        -1 => current - speed < dest,
        1 => current + speed > dest,
        _ => {
            debug!("Invalid plane direction: {}", direction);
            return PlaneResult::Ok;
        }
    };

    if past_dest {
        set_plane_height(level, sector, plane, dest);
        if change_sector(level, sector, crush) {
            set_plane_height(level, sector, plane, current);
            change_sector(level, sector, crush);
        }
        return PlaneResult::PastDest;
    }

    set_plane_height(level, sector, plane, current + speed * direction as f32);
    // A rising ceiling can't squash anything
    if plane == Plane::Ceiling && direction == 1 {
        change_sector(level, sector, crush);
        return PlaneResult::Ok;
    }

    if change_sector(level, sector, crush) {
        if crush {
            return PlaneResult::Crushed;
        }
        set_plane_height(level, sector, plane, current);
        change_sector(level, sector, crush);
        return PlaneResult::Crushed;
    }
    PlaneResult::Ok
}
