//! Per-sector extended state and the once-a-tic sector think.

use glam::Vec2;
use log::debug;
use sound_traits::SectorPart;

use crate::env::specials::{move_plane, plane_height, Plane};
use crate::level::map_defs::Sector;
use crate::level::Level;
use crate::thing::MapObject;
use crate::xg::chain::{check_occupants, do_chain, ChainClass, NUM_CHAINS};
use crate::xg::defs::{SectorFlag, SectorType};
use crate::xg::function::{Channel, Function, NUM_CHANNELS};

const DEFAULT_GRAVITY: f32 = 1.0;
/// Doom's 0xe800 in fixed point
const DEFAULT_FRICTION: f32 = 0.90625;
/// Flat scroll offsets wrap at the size of a flat
const FLAT_SIZE: f32 = 64.0;

/// A sector's copy of its extended type along with everything that changes
/// while it runs
#[derive(Debug, Clone)]
pub struct XgSector {
    pub info: SectorType,
    pub disabled: bool,
    pub functions: [Function; NUM_CHANNELS],
    pub chain_timers: [i32; NUM_CHAINS],
    /// Fires left per chain, 0 disabled, negative unlimited
    pub chain_counts: [i32; NUM_CHAINS],
    pub sound_timer: i32,
}

impl XgSector {
    pub fn function(&self, channel: Channel) -> &Function {
        &self.functions[channel.index()]
    }
}

fn channel_value(sec: &Sector, channel: Channel) -> f32 {
    match channel {
        Channel::Floor => sec.floorheight,
        Channel::Ceiling => sec.ceilingheight,
        Channel::Light => sec.lightlevel,
        Channel::Red => sec.rgb[0],
        Channel::Green => sec.rgb[1],
        Channel::Blue => sec.rgb[2],
    }
}

/// Set the sector's special. If it names an extended sector type the sector
/// gets fresh extended state, otherwise any it had is dropped.
pub fn set_sector_type(level: &mut Level, sector: usize, special: i32) {
    level.map_data.sectors[sector].special = special;
    let Some(info) = level.definitions().sector_type(special).cloned() else {
        if level.xg.sectors[sector].take().is_some() {
            level.stop_sector_sounds(sector);
            debug!(target: "xg", "Sector {} is no longer extended", sector);
        } else if special != 0 {
            debug!(target: "xg", "Sector {} has no extended type {}", sector, special);
        }
        return;
    };

    let sec = &level.map_data.sectors[sector];
    let rng = &mut level.random;
    let functions = std::array::from_fn(|i| {
        Function::new(&info.functions[i], |c| channel_value(sec, c), rng)
    });
    let chain_timers =
        std::array::from_fn(|i| rng.range(info.chains[i].interval[0], info.chains[i].interval[1]));
    let chain_counts = std::array::from_fn(|i| info.chains[i].count);
    let sound_timer = rng.range(info.sound_interval[0], info.sound_interval[1]);

    debug!(target: "xg", "Sector {} is extended type {}", sector, special);
    level.xg.sectors[sector] = Some(XgSector {
        info,
        disabled: false,
        functions,
        chain_timers,
        chain_counts,
        sound_timer,
    });
}

fn wind_allowed(info: &SectorType, mobj: &MapObject, floor: f32, ceiling: f32) -> bool {
    let flag = if mobj.is_player() {
        SectorFlag::WindPlayers
    } else if mobj.is_missile() {
        SectorFlag::WindMissiles
    } else if mobj.is_monster() {
        SectorFlag::WindMonsters
    } else {
        SectorFlag::WindOthers
    };
    if !info.has_flag(flag) {
        return false;
    }
    if info.has_flag(SectorFlag::WindFloor) && mobj.z > floor {
        return false;
    }
    if info.has_flag(SectorFlag::WindCeiling) && mobj.z + mobj.height < ceiling {
        return false;
    }
    true
}

fn apply_wind(level: &mut Level, sector: usize, info: &SectorType) {
    if info.wind_speed == 0.0 && info.vertical_wind == 0.0 {
        return;
    }
    let push = info.wind_angle.unit() * info.wind_speed;
    let (floor, ceiling) = {
        let sec = &level.map_data.sectors[sector];
        (sec.floorheight, sec.ceilingheight)
    };
    let console = level.console_player;
    let netgame = level.netgame;
    let players = level.players;

    for id in level.map_data.sectors[sector].thinglist.clone() {
        let Some(mobj) = level.thinkers.mobj_mut(id) else {
            continue;
        };
        if let Some(p) = mobj.player {
            if players[p].camera {
                continue;
            }
        }
        if netgame && mobj.player != Some(console) {
            continue;
        }
        if !wind_allowed(info, mobj, floor, ceiling) {
            continue;
        }
        mobj.momxy += push;
        mobj.momz += info.vertical_wind;
    }
}

fn scroll(offset: &mut Vec2, delta: Vec2) {
    *offset = (*offset + delta).rem_euclid(Vec2::splat(FLAT_SIZE));
}

/// One tic of one extended sector
pub(crate) fn think(level: &mut Level, sector: usize) {
    let mut fired = Vec::new();
    let values = {
        let Some(xg) = level.xg.sectors[sector].as_mut() else {
            return;
        };
        if xg.disabled {
            return;
        }
        for func in xg.functions.iter_mut() {
            func.tick(&mut level.random, &mut fired);
        }
        // Links take the value of the channel they follow
        let sec = &level.map_data.sectors[sector];
        for c in Channel::ALL {
            if let Some(link) = xg.functions[c.index()].link() {
                let linked = &xg.functions[link.index()];
                let value = if linked.is_active() && linked.link().is_none() {
                    linked.value()
                } else {
                    channel_value(sec, link)
                };
                xg.functions[c.index()].set_linked_value(value);
            }
        }
        Channel::ALL.map(|c| xg.functions[c.index()].is_active().then(|| xg.functions[c.index()].value()))
    };
    let Some(info) = level.xg.sectors[sector].as_ref().map(|xg| xg.info.clone()) else {
        return;
    };

    let crush = info.has_flag(SectorFlag::Crush);
    for (channel, plane) in [(Channel::Floor, Plane::Floor), (Channel::Ceiling, Plane::Ceiling)] {
        let Some(target) = values[channel.index()] else {
            continue;
        };
        let current = plane_height(level, sector, plane);
        let delta = target - current;
        if delta != 0.0 {
            let direction = if delta > 0.0 { 1 } else { -1 };
            move_plane(level, sector, delta.abs(), target, crush, plane, direction);
        }
    }

    {
        let sec = &mut level.map_data.sectors[sector];
        if let Some(light) = values[Channel::Light.index()] {
            sec.lightlevel = light.clamp(0.0, 1.0);
        }
        for (i, c) in [Channel::Red, Channel::Green, Channel::Blue].into_iter().enumerate() {
            if let Some(v) = values[c.index()] {
                sec.rgb[i] = v.clamp(0.0, 1.0);
            }
        }
    }

    for n in fired {
        do_chain(level, sector, ChainClass::Function, Some(n), true, None);
    }
    for class in [
        ChainClass::Floor,
        ChainClass::Ceiling,
        ChainClass::Inside,
        ChainClass::Ticker,
    ] {
        let c = class as usize;
        let ready = match level.xg.sectors[sector].as_mut() {
            Some(xg) => {
                if xg.chain_timers[c] > 0 {
                    xg.chain_timers[c] -= 1;
                }
                xg.chain_timers[c] <= 0 && xg.chain_counts[c] != 0
            }
            None => false,
        };
        if !ready {
            continue;
        }
        match class {
            ChainClass::Ticker => {
                do_chain(level, sector, class, None, true, None);
            }
            _ => check_occupants(level, sector, class),
        }
    }
    if let Some(xg) = level.xg.sectors[sector].as_mut() {
        if xg.chain_timers[ChainClass::Function as usize] > 0 {
            xg.chain_timers[ChainClass::Function as usize] -= 1;
        }
    }

    if info.ambient_sound > 0 {
        let play = match level.xg.sectors[sector].as_mut() {
            Some(xg) => {
                xg.sound_timer -= 1;
                if xg.sound_timer <= 0 {
                    xg.sound_timer = level
                        .random
                        .range(info.sound_interval[0], info.sound_interval[1]);
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        if play {
            level.start_sector_sound(sector, SectorPart::Center, info.ambient_sound);
        }
    }

    {
        let sec = &mut level.map_data.sectors[sector];
        if info.scroll_speed[0] != 0.0 {
            scroll(&mut sec.floor_offset, info.scroll_angle[0].unit() * info.scroll_speed[0]);
        }
        if info.scroll_speed[1] != 0.0 {
            scroll(&mut sec.ceiling_offset, info.scroll_angle[1].unit() * info.scroll_speed[1]);
        }
    }

    apply_wind(level, sector, &info);
}

impl Level {
    /// Gravity multiplier for objects in the sector
    pub fn sector_gravity(&self, sector: usize) -> f32 {
        self.xg.sectors[sector]
            .as_ref()
            .and_then(|xg| xg.info.gravity)
            .unwrap_or(DEFAULT_GRAVITY)
    }

    /// Momentum kept per tic by objects on the sector's floor
    pub fn sector_friction(&self, sector: usize) -> f32 {
        self.xg.sectors[sector]
            .as_ref()
            .and_then(|xg| xg.info.friction)
            .unwrap_or(DEFAULT_FRICTION)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::set_sector_type;
    use crate::level::tests::{monster, new_level, player_start, two_room_map};
    use crate::xg::function::Channel;
    use crate::xg::Definitions;

    fn defs() -> Definitions {
        Definitions::from_ron(
            r#"(sector_types: [
                (id: 1, light: (func: "aZ", interval_min: 0.1, interval_max: 0.1), red: (func: "=l")),
                (id: 2, gravity: 0.5, floor_scroll_speed: 48.0,
                 wind_speed: 2.0, wind_angle: 90.0, flags: ["wind-monsters", "wind-floor"]),
                (id: 3, ambient_sound: 33, sound_interval_min: 0.1, sound_interval_max: 0.1),
            ])"#,
        )
        .unwrap()
    }

    #[test]
    fn type_change_resets_state() {
        let (mut level, _rx) = new_level(&two_room_map(), defs());
        assert!(level.xg().sector(0).is_none());
        set_sector_type(&mut level, 0, 1);
        assert!(level.xg().sector(0).unwrap().function(Channel::Light).is_active());
        set_sector_type(&mut level, 0, 77);
        assert!(level.xg().sector(0).is_none());
        assert_eq!(level.map_data.sectors[0].special, 77);
    }

    #[test]
    fn light_steps_and_colour_follows() {
        let (mut level, _rx) = new_level(&two_room_map(), defs());
        set_sector_type(&mut level, 0, 1);
        // Four tic interval, stepping to 'Z'
        for _ in 0..4 {
            level.tick();
        }
        let sec = &level.map_data.sectors[0];
        assert_eq!(sec.lightlevel, 1.0);
        assert_eq!(sec.rgb[0], 1.0);
        // Holds 'Z' for a full interval then wraps back to 'a'
        for _ in 0..3 {
            level.tick();
        }
        assert_eq!(level.map_data.sectors[0].lightlevel, 1.0);
        level.tick();
        let sec = &level.map_data.sectors[0];
        assert_eq!(sec.lightlevel, 0.0);
        assert_eq!(sec.rgb[0], 0.0);
    }

    #[test]
    fn gravity_scroll_and_wind() {
        let mut desc = two_room_map();
        desc.things.push(player_start(32.0, 32.0));
        desc.things.push(monster(64.0, 64.0));
        let (mut level, _rx) = new_level(&desc, defs());
        set_sector_type(&mut level, 0, 2);
        assert_eq!(level.sector_gravity(0), 0.5);
        assert_eq!(level.sector_friction(0), 0.90625);
        assert_eq!(level.sector_gravity(1), 1.0);

        level.tick();
        level.tick();
        let sec = &level.map_data.sectors[0];
        // 96 along x wraps to 32
        assert!((sec.floor_offset - Vec2::new(32.0, 0.0)).length() < 1e-3);

        let player = level.players[0].mobj.unwrap();
        let monster = level.map_data.sectors[0].thinglist()[1];
        assert_eq!(level.thinkers.mobj(player).unwrap().momxy, Vec2::ZERO);
        let push = level.thinkers.mobj(monster).unwrap().momxy;
        assert!((push - Vec2::new(0.0, 4.0)).length() < 1e-3);

        // Lifted off the floor, no more wind
        level.thinkers.mobj_mut(monster).unwrap().z = 8.0;
        level.tick();
        let push = level.thinkers.mobj(monster).unwrap().momxy;
        assert!((push - Vec2::new(0.0, 4.0)).length() < 1e-3);
    }

    #[test]
    fn ambient_sound_cadence() {
        let (mut level, rx) = new_level(&two_room_map(), defs());
        set_sector_type(&mut level, 1, 3);
        for _ in 0..12 {
            level.tick();
        }
        assert_eq!(rx.try_iter().count(), 3);
    }
}
