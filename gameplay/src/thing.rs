//! Map objects. Movement and AI belong to the host game; the level only
//! needs enough of an object to link it in to sectors, push it with wind,
//! and crush it.

use glam::Vec2;
use log::debug;
use math::Angle;

use crate::level::Level;
use crate::thinker::{Think, ThinkerId};

/// Bit flags for `MapObject::flags`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapObjFlag {
    /// Call P_SpecialThing when touched.
    Special = 1,
    /// Blocks.
    Solid = 2,
    /// Can be hit.
    Shootable = 4,
    /// Don't use the sector links (invisible but touchable).
    Nosector = 8,
    /// Don't apply gravity (every tic), that is, object will float, keeping
    /// current height  or changing it actively.
    Nogravity = 512,
    /// Don't hit same species, explode on block. Player missiles as well as
    /// fireballs of various kinds.
    Missile = 0x10000,
    /// Dropped by a demon, not level spawned. Crushed away by movers.
    Dropped = 0x20000,
    /// On kill, count this enemy object towards intermission kill total.
    CountKill = 0x400000,
    /// On picking up, count this item object towards intermission item total.
    CountItem = 0x800000,
}

impl MapObjFlag {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "special" => MapObjFlag::Special,
            "solid" => MapObjFlag::Solid,
            "shootable" => MapObjFlag::Shootable,
            "no-sector" => MapObjFlag::Nosector,
            "no-gravity" => MapObjFlag::Nogravity,
            "missile" => MapObjFlag::Missile,
            "dropped" => MapObjFlag::Dropped,
            "count-kill" => MapObjFlag::CountKill,
            "count-item" => MapObjFlag::CountItem,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MapObject {
    /// Info for drawing: position.
    pub xy: Vec2,
    pub z: f32,
    /// orientation
    pub angle: Angle,
    /// The closest interval over all contacted Sectors.
    pub floorz: f32,
    pub ceilingz: f32,
    /// For movement checking.
    pub radius: f32,
    pub height: f32,
    /// Momentum, used to update position.
    pub momxy: Vec2,
    pub momz: f32,
    /// Editor number of the thing
    pub kind: u16,
    pub flags: u32,
    pub health: i32,
    /// Set if this object is a player's body
    pub player: Option<usize>,
    /// The sector this object is linked in to
    pub sector: usize,
}

impl MapObject {
    pub fn new(kind: u16, xy: Vec2, z: f32, sector: usize) -> Self {
        Self {
            xy,
            z,
            angle: Angle::default(),
            floorz: z,
            ceilingz: z,
            radius: 20.0,
            height: 16.0,
            momxy: Vec2::ZERO,
            momz: 0.0,
            kind,
            flags: 0,
            health: 100,
            player: None,
            sector,
        }
    }

    pub fn is_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn is_monster(&self) -> bool {
        self.flags & MapObjFlag::CountKill as u32 != 0
    }

    pub fn is_missile(&self) -> bool {
        self.flags & MapObjFlag::Missile as u32 != 0
    }

    /// Refit the object between new floor and ceiling heights. Objects
    /// standing on the floor ride it. Returns false if the object no longer
    /// fits.
    pub(crate) fn height_clip(&mut self, floor: f32, ceiling: f32) -> bool {
        let on_floor = self.z == self.floorz;
        self.floorz = floor;
        self.ceilingz = ceiling;

        if on_floor {
            self.z = self.floorz;
        } else if self.z + self.height > self.ceilingz {
            self.z = self.ceilingz - self.height;
        }

        self.ceilingz - self.floorz >= self.height
    }

    /// PIT_ChangeSector
    ///
    /// Sets `no_fit` if the object is stuck, and damages it when `crush_change`
    /// is set on every fourth tic.
    pub(crate) fn pit_change_sector(
        &mut self,
        floor: f32,
        ceiling: f32,
        no_fit: &mut bool,
        crush_change: bool,
        level_time: u32,
    ) {
        if self.height_clip(floor, ceiling) {
            return;
        }

        if self.health <= 0 {
            self.height = 0.0;
            self.radius = 0.0;
            return;
        }

        if self.flags & MapObjFlag::Shootable as u32 == 0 {
            // assume it is bloody gibs or something
            return;
        }

        *no_fit = true;

        if crush_change && level_time & 3 == 0 {
            debug!("Crushing!");
            self.health -= 10;
        }
    }
}

impl Think for MapObject {
    /// Object movement is run by the host game
    fn think(&mut self, _id: ThinkerId, _level: &mut Level) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{MapObjFlag, MapObject};

    #[test]
    fn rides_floor() {
        let mut mobj = MapObject::new(1, Vec2::ZERO, 0.0, 0);
        mobj.height = 56.0;
        mobj.floorz = 0.0;
        assert!(mobj.height_clip(8.0, 128.0));
        assert_eq!(mobj.z, 8.0);
    }

    #[test]
    fn crushed_every_fourth_tic() {
        let mut mobj = MapObject::new(3004, Vec2::ZERO, 0.0, 0);
        mobj.height = 56.0;
        mobj.flags = MapObjFlag::Shootable as u32;
        let mut no_fit = false;
        for tic in 0..8 {
            mobj.pit_change_sector(0.0, 40.0, &mut no_fit, true, tic);
        }
        assert!(no_fit);
        assert_eq!(mobj.health, 80);
    }

    #[test]
    fn names() {
        assert_eq!(MapObjFlag::from_name("count-kill"), Some(MapObjFlag::CountKill));
        assert_eq!(MapObjFlag::from_name("bogus"), None);
    }
}
