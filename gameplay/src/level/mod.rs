//! The data that makes up an entire level, along with functions to record state,
//! or get ref/mutable-ref to parts of it.

pub mod flags;
pub mod map_data;
pub mod map_defs;
#[cfg(test)]
pub(crate) mod tests;

use std::rc::Rc;

use glam::Vec2;
use log::{debug, info};
use math::{Angle, Random};
use sound_traits::{SectorPart, SfxId, SndServerTx, SoundAction, SoundOrigin};

use crate::doom_def::MAXPLAYERS;
use crate::level::map_data::{MapData, ThingDesc};
use crate::thing::{MapObjFlag, MapObject};
use crate::thinker::{ThinkerAlloc, ThinkerData, ThinkerId};
use crate::xg::{self, Definitions, XgState};
use crate::Skill;

/// Slots kept free for movers on top of the map's things
const EXTRA_THINKERS: usize = 1024;

/// What the level needs to know about each player
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerSlot {
    pub in_game: bool,
    pub mobj: Option<ThinkerId>,
    /// A free-flying viewpoint rather than a body. Wind skips these.
    pub camera: bool,
    /// Has the computer map power-up
    pub allmap: bool,
}

/// The level is considered a `World` or sorts. One that exists only
/// while the player is in it. Another benefit of this structure is
/// it makes it easier for all involved thinkers and functions to
/// work with the data, as much of it is interlinked.
pub struct Level {
    pub map_data: MapData,
    pub thinkers: ThinkerAlloc,
    pub game_skill: Skill,
    pub level_time: u32,
    /// Networked play. Wind only pushes the local player.
    pub netgame: bool,
    pub console_player: usize,
    pub players: [PlayerSlot; MAXPLAYERS],
    /// for intermission
    pub totalkills: i32,
    /// for intermission
    pub totalitems: i32,
    /// Gameplay random numbers, seeded per level
    pub random: Random,
    pub(crate) xg: XgState,
    /// Provides ability for things to start a sound
    pub(super) snd_command: SndServerTx,
}

impl Level {
    pub fn new(
        map_data: MapData,
        definitions: Rc<Definitions>,
        skill: Skill,
        snd_command: SndServerTx,
    ) -> Self {
        let thinker_count = map_data.things().len() + EXTRA_THINKERS;
        let xg = XgState::new(definitions, map_data.sectors.len());
        let mut level = Self {
            map_data,
            thinkers: ThinkerAlloc::new(thinker_count),
            game_skill: skill,
            level_time: 0,
            netgame: false,
            console_player: 0,
            players: [PlayerSlot::default(); MAXPLAYERS],
            totalkills: 0,
            totalitems: 0,
            random: Random::default(),
            xg,
            snd_command,
        };

        let things = level.map_data.things().to_vec();
        for thing in &things {
            level.spawn_thing(thing);
        }
        info!(
            "Level {} spawned {} things",
            level.map_data.name(),
            level.thinkers.len()
        );
        level
    }

    /// Set up extended sector and line types for everything that has one.
    /// Call once after the level is loaded.
    pub fn spawn_specials(&mut self) {
        xg::spawn_specials(self);
    }

    /// Advance the level one tic: level time, then every thinker in the order
    /// they were added, then the extended sectors in index order.
    pub fn tick(&mut self) {
        self.level_time += 1;
        self.run_thinkers();
        xg::ticker(self);
    }

    fn run_thinkers(&mut self) {
        for id in self.thinkers.ids() {
            if self.thinkers.should_remove(id) {
                self.thinkers.remove(id);
                continue;
            }
            let Some(mut data) = self.thinkers.take(id) else {
                continue;
            };
            if data.think(id, self) {
                self.thinkers.restore(id, data);
            } else {
                self.thinkers.remove(id);
            }
        }
    }

    pub fn xg(&self) -> &XgState {
        &self.xg
    }

    pub fn definitions(&self) -> &Definitions {
        self.xg.definitions()
    }

    /// Spawn a map thing. Player starts fill the matching player slot.
    pub fn spawn_thing(&mut self, thing: &ThingDesc) -> Option<ThinkerId> {
        let xy = Vec2::new(thing.x, thing.y);
        let Some(sector) = self.map_data.sector_at_point(xy) else {
            debug!("Thing {} at {:?} is outside the map", thing.kind, xy);
            return None;
        };

        let z = self.map_data.sectors[sector].floorheight;
        let mut mobj = MapObject::new(thing.kind, xy, z, sector);
        mobj.angle = Angle::from_degrees(thing.angle);
        mobj.ceilingz = self.map_data.sectors[sector].ceilingheight;
        for name in &thing.flags {
            match MapObjFlag::from_name(name) {
                Some(flag) => mobj.flags |= flag as u32,
                None => debug!("Unknown thing flag {}", name),
            }
        }

        let player = (1..=MAXPLAYERS as u16)
            .contains(&thing.kind)
            .then(|| thing.kind as usize - 1);
        if player.is_some() {
            mobj.radius = 16.0;
            mobj.height = 56.0;
        }
        if let Some(radius) = thing.radius {
            mobj.radius = radius;
        }
        if let Some(height) = thing.height {
            mobj.height = height;
        }
        mobj.player = player;

        if mobj.is_monster() {
            self.totalkills += 1;
        }
        if mobj.flags & MapObjFlag::CountItem as u32 != 0 {
            self.totalitems += 1;
        }

        let id = self.spawn_mobj(mobj);
        if let Some(p) = player {
            self.players[p].in_game = true;
            self.players[p].mobj = Some(id);
        }
        Some(id)
    }

    /// Add an object to the thinkers and link it in to its sector
    pub fn spawn_mobj(&mut self, mobj: MapObject) -> ThinkerId {
        let sector = mobj.sector;
        let linked = mobj.flags & MapObjFlag::Nosector as u32 == 0;
        let id = self.thinkers.push(ThinkerData::MapObject(mobj));
        if linked {
            self.map_data.sectors[sector].thinglist.push(id);
        }
        id
    }

    pub fn remove_mobj(&mut self, id: ThinkerId) {
        if let Some(mobj) = self.thinkers.mobj(id) {
            let sector = mobj.sector;
            self.map_data.sectors[sector].thinglist.retain(|t| *t != id);
            for player in self.players.iter_mut() {
                if player.mobj == Some(id) {
                    player.mobj = None;
                }
            }
            self.thinkers.mark_remove(id);
        }
    }

    /// Place an object at a new position, relinking it if it crossed in to
    /// another sector. Returns false if the position is off the map.
    pub fn move_mobj(&mut self, id: ThinkerId, xy: Vec2, z: f32) -> bool {
        let Some(sector) = self.map_data.sector_at_point(xy) else {
            return false;
        };
        let (floor, ceiling) = {
            let sec = &self.map_data.sectors[sector];
            (sec.floorheight, sec.ceilingheight)
        };
        let Some(mobj) = self.thinkers.mobj_mut(id) else {
            return false;
        };
        let old = mobj.sector;
        let linked = mobj.flags & MapObjFlag::Nosector as u32 == 0;
        mobj.xy = xy;
        mobj.z = z.clamp(floor, (ceiling - mobj.height).max(floor));
        mobj.floorz = floor;
        mobj.ceilingz = ceiling;
        mobj.sector = sector;

        if linked && old != sector {
            self.map_data.sectors[old].thinglist.retain(|t| *t != id);
            self.map_data.sectors[sector].thinglist.push(id);
        }
        true
    }

    /// Start a sound from a sector. Nobody listening is not an error.
    pub fn start_sector_sound(&self, sector: usize, part: SectorPart, sfx: SfxId) {
        if sfx <= 0 {
            return;
        }
        let sec = &self.map_data.sectors[sector];
        let z = match part {
            SectorPart::Floor => sec.floorheight,
            SectorPart::Ceiling => sec.ceilingheight,
            SectorPart::Center => (sec.floorheight + sec.ceilingheight) * 0.5,
        };
        let origin = SoundOrigin::Sector {
            sector,
            part,
            xy: sec.sound_origin,
            z,
        };
        if self
            .snd_command
            .send(SoundAction::StartSfx { sfx, origin })
            .is_err()
        {
            debug!("No sound server for sfx {}", sfx);
        }
    }

    pub fn stop_sector_sounds(&self, sector: usize) {
        if self
            .snd_command
            .send(SoundAction::StopSectorSfx { sector })
            .is_err()
        {
            debug!("No sound server to stop sector {} sounds", sector);
        }
    }
}

#[cfg(test)]
mod level_tests {
    use glam::Vec2;

    use super::tests::{monster, new_level, player_start, two_room_map};
    use crate::xg::Definitions;

    #[test]
    fn spawn_links_things() {
        let mut desc = two_room_map();
        desc.things.push(player_start(32.0, 32.0));
        desc.things.push(monster(200.0, 64.0));
        let (level, _rx) = new_level(&desc, Definitions::default());

        assert!(level.players[0].in_game);
        let player = level.players[0].mobj.unwrap();
        assert_eq!(level.map_data.sectors[0].thinglist(), &[player]);
        assert_eq!(level.map_data.sectors[1].thinglist().len(), 1);
        assert_eq!(level.totalkills, 1);

        let mobj = level.thinkers.mobj(player).unwrap();
        assert_eq!(mobj.player, Some(0));
        assert_eq!(mobj.height, 56.0);
    }

    #[test]
    fn move_relinks() {
        let mut desc = two_room_map();
        desc.things.push(player_start(32.0, 32.0));
        let (mut level, _rx) = new_level(&desc, Definitions::default());
        let player = level.players[0].mobj.unwrap();

        assert!(level.move_mobj(player, Vec2::new(160.0, 64.0), 0.0));
        assert!(level.map_data.sectors[0].thinglist().is_empty());
        assert_eq!(level.map_data.sectors[1].thinglist(), &[player]);
        // Placed on the floor of the new sector
        assert_eq!(level.thinkers.mobj(player).unwrap().z, 16.0);

        assert!(!level.move_mobj(player, Vec2::new(-64.0, 64.0), 0.0));
    }

    #[test]
    fn remove_unlinks() {
        let mut desc = two_room_map();
        desc.things.push(player_start(32.0, 32.0));
        let (mut level, _rx) = new_level(&desc, Definitions::default());
        let player = level.players[0].mobj.unwrap();
        level.remove_mobj(player);
        assert!(level.map_data.sectors[0].thinglist().is_empty());
        assert!(level.players[0].mobj.is_none());
        level.tick();
        assert!(level.thinkers.is_empty());
    }
}
