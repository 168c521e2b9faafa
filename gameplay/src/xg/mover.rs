//! The plane mover thinker. One floor or ceiling of one sector, moving
//! toward a destination height.

use log::debug;
use sound_traits::SectorPart;

use crate::env::specials::{change_sector, move_plane, plane_height, Plane, PlaneResult};
use crate::level::Level;
use crate::thinker::{Think, ThinkerData, ThinkerId};
use crate::xg::defs::MoverSounds;
use crate::xg::line::activate_line;
use crate::xg::sector::set_sector_type;

/// Bit flags for `PlaneMover::flags`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoverFlag {
    /// Keep pushing at crush speed when blocked
    Crush = 1,
    /// The other plane of the sector moves by the same amount
    OtherFollows = 1 << 1,
    /// Record the final height as the sector's original height
    SetOriginal = 1 << 2,
    ActivateOnDone = 1 << 3,
    DeactivateOnDone = 1 << 4,
    ActivateOnAbort = 1 << 5,
    DeactivateOnAbort = 1 << 6,
}

impl MoverFlag {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "crush" => MoverFlag::Crush,
            "other-follows" => MoverFlag::OtherFollows,
            "set-original" => MoverFlag::SetOriginal,
            "activate-on-done" => MoverFlag::ActivateOnDone,
            "deactivate-on-done" => MoverFlag::DeactivateOnDone,
            "activate-on-abort" => MoverFlag::ActivateOnAbort,
            "deactivate-on-abort" => MoverFlag::DeactivateOnAbort,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverState {
    Running,
    /// Holding still until the timer runs out
    Waiting,
    Done,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct PlaneMover {
    pub sector: usize,
    pub plane: Plane,
    /// The real line that started the move, if any
    pub origin: Option<usize>,
    pub flags: u32,
    pub destination: f32,
    pub speed: f32,
    pub crush_speed: f32,
    pub set_material: Option<usize>,
    pub set_sector_type: Option<i32>,
    pub sounds: MoverSounds,
    pub sound_interval: [i32; 2],
    /// Counts down to the next sound, or to the end of the wait
    pub timer: i32,
    pub state: MoverState,
}

impl PlaneMover {
    pub fn new(sector: usize, plane: Plane, destination: f32, speed: f32) -> Self {
        Self {
            sector,
            plane,
            origin: None,
            flags: 0,
            destination,
            speed,
            crush_speed: speed,
            set_material: None,
            set_sector_type: None,
            sounds: MoverSounds::default(),
            sound_interval: [0, 0],
            timer: 0,
            state: MoverState::Running,
        }
    }

    /// Hold still for `tics` before moving
    pub fn with_wait(mut self, tics: i32) -> Self {
        if tics > 0 {
            self.state = MoverState::Waiting;
            self.timer = tics;
        }
        self
    }

    pub fn has_flag(&self, flag: MoverFlag) -> bool {
        self.flags & flag as u32 != 0
    }

    fn part(&self) -> SectorPart {
        match self.plane {
            Plane::Floor => SectorPart::Floor,
            Plane::Ceiling => SectorPart::Ceiling,
        }
    }

    /// Fire the origin line hooks for a finished or aborted move
    fn run_hooks(&self, level: &mut Level, done: bool) {
        let Some(line) = self.origin else {
            return;
        };
        let (on, off) = if done {
            (MoverFlag::ActivateOnDone, MoverFlag::DeactivateOnDone)
        } else {
            (MoverFlag::ActivateOnAbort, MoverFlag::DeactivateOnAbort)
        };
        if self.has_flag(on) {
            activate_line(level, line, true, None);
        }
        if self.has_flag(off) {
            activate_line(level, line, false, None);
        }
    }

    fn finish(&mut self, level: &mut Level) {
        let height = plane_height(level, self.sector, self.plane);
        let sec = &mut level.map_data.sectors[self.sector];
        if self.has_flag(MoverFlag::SetOriginal) {
            match self.plane {
                Plane::Floor => sec.original_floor = height,
                Plane::Ceiling => sec.original_ceiling = height,
            }
        }
        if let Some(material) = self.set_material {
            match self.plane {
                Plane::Floor => sec.floorpic = material,
                Plane::Ceiling => sec.ceilingpic = material,
            }
        }
        if let Some(special) = self.set_sector_type {
            set_sector_type(level, self.sector, special);
        }
        level.start_sector_sound(self.sector, self.part(), self.sounds.end);
        self.state = MoverState::Done;
        debug!(target: "xg", "Mover on sector {} {:?} done at {}", self.sector, self.plane, height);
        self.run_hooks(level, true);
    }

    fn abort(&mut self, level: &mut Level, heights: (f32, f32)) {
        let sec = &mut level.map_data.sectors[self.sector];
        sec.floorheight = heights.0;
        sec.ceilingheight = heights.1;
        change_sector(level, self.sector, false);
        self.state = MoverState::Aborted;
        debug!(target: "xg", "Mover on sector {} {:?} blocked", self.sector, self.plane);
        self.run_hooks(level, false);
    }
}

impl Think for PlaneMover {
    fn think(&mut self, _id: ThinkerId, level: &mut Level) -> bool {
        if matches!(self.state, MoverState::Done | MoverState::Aborted) {
            return false;
        }

        self.timer -= 1;
        if self.timer <= 0 {
            let sfx = if self.state == MoverState::Waiting {
                self.state = MoverState::Running;
                self.sounds.start
            } else {
                self.sounds.moving
            };
            level.start_sector_sound(self.sector, self.part(), sfx);
            self.timer = level
                .random
                .range(self.sound_interval[0], self.sound_interval[1]);
        }
        if self.state == MoverState::Waiting {
            return true;
        }

        let before = {
            let sec = &level.map_data.sectors[self.sector];
            (sec.floorheight, sec.ceilingheight)
        };
        let current = plane_height(level, self.sector, self.plane);
        let crush = self.has_flag(MoverFlag::Crush);
        let result = if self.destination > current {
            move_plane(level, self.sector, self.speed, self.destination, crush, self.plane, 1)
        } else if self.destination < current {
            move_plane(level, self.sector, self.speed, self.destination, crush, self.plane, -1)
        } else {
            PlaneResult::PastDest
        };

        if result == PlaneResult::Crushed && !crush {
            self.abort(level, before);
            return false;
        }

        if self.has_flag(MoverFlag::OtherFollows) {
            let delta = plane_height(level, self.sector, self.plane) - current;
            if delta != 0.0 {
                let sec = &mut level.map_data.sectors[self.sector];
                match self.plane {
                    Plane::Floor => sec.ceilingheight += delta,
                    Plane::Ceiling => sec.floorheight += delta,
                }
                change_sector(level, self.sector, crush);
            }
        }

        match result {
            PlaneResult::PastDest => {
                self.finish(level);
                false
            }
            PlaneResult::Crushed => {
                self.speed = self.crush_speed;
                true
            }
            PlaneResult::Ok => true,
        }
    }
}

/// Every mover on this sector's plane, in run order
pub fn movers_on(level: &Level, sector: usize, plane: Plane) -> Vec<ThinkerId> {
    level
        .thinkers
        .iter()
        .filter(|(_, d)| {
            d.plane_mover()
                .is_some_and(|m| m.sector == sector && m.plane == plane)
        })
        .map(|(id, _)| id)
        .collect()
}

/// Stop a mover where it is. Its abort hooks fire and its slot is freed
/// the next time thinkers run.
pub fn stop_mover(level: &mut Level, id: ThinkerId) {
    let Some(ThinkerData::PlaneMover(mut mover)) = level.thinkers.take(id) else {
        return;
    };
    debug!(target: "xg", "Stopping mover on sector {} {:?}", mover.sector, mover.plane);
    mover.state = MoverState::Aborted;
    mover.run_hooks(level, false);
}

/// Start a mover, first stopping whatever is already moving that plane
pub fn start_plane_mover(level: &mut Level, mover: PlaneMover) -> ThinkerId {
    while let Some(old) = movers_on(level, mover.sector, mover.plane).first().copied() {
        stop_mover(level, old);
    }
    if mover.state == MoverState::Running {
        let part = mover.part();
        level.start_sector_sound(mover.sector, part, mover.sounds.start);
    }
    debug!(
        target: "xg",
        "Mover on sector {} {:?} to {} at {}",
        mover.sector, mover.plane, mover.destination, mover.speed
    );
    level.thinkers.push(ThinkerData::PlaneMover(mover))
}

#[cfg(test)]
mod tests {
    use super::{movers_on, start_plane_mover, stop_mover, MoverFlag, PlaneMover};
    use crate::env::specials::Plane;
    use crate::level::tests::{monster, new_level, two_room_map};
    use crate::xg::Definitions;

    #[test]
    fn moves_then_removes() {
        let (mut level, _rx) = new_level(&two_room_map(), Definitions::default());
        start_plane_mover(&mut level, PlaneMover::new(0, Plane::Floor, 24.0, 8.0));
        assert_eq!(movers_on(&level, 0, Plane::Floor).len(), 1);

        for _ in 0..3 {
            level.tick();
        }
        assert_eq!(level.map_data.sectors[0].floorheight, 24.0);
        // Finishes on the tic it finds itself at the destination
        level.tick();
        assert!(movers_on(&level, 0, Plane::Floor).is_empty());
        assert!(level.thinkers.is_empty());
    }

    #[test]
    fn waits_first() {
        let (mut level, _rx) = new_level(&two_room_map(), Definitions::default());
        start_plane_mover(
            &mut level,
            PlaneMover::new(0, Plane::Ceiling, 96.0, 8.0).with_wait(3),
        );
        level.tick();
        level.tick();
        assert_eq!(level.map_data.sectors[0].ceilingheight, 128.0);
        level.tick();
        assert_eq!(level.map_data.sectors[0].ceilingheight, 120.0);
    }

    #[test]
    fn finish_settings() {
        let (mut level, _rx) = new_level(&two_room_map(), Definitions::default());
        let mut mover = PlaneMover::new(1, Plane::Floor, 32.0, 16.0);
        mover.flags = MoverFlag::SetOriginal as u32 | MoverFlag::OtherFollows as u32;
        mover.set_material = Some(7);
        start_plane_mover(&mut level, mover);
        level.tick();
        level.tick();

        let sec = &level.map_data.sectors[1];
        assert_eq!(sec.floorheight, 32.0);
        assert_eq!(sec.ceilingheight, 128.0);
        assert_eq!(sec.original_floor, 32.0);
        assert_eq!(sec.floorpic, 7);
    }

    #[test]
    fn blocked_mover_aborts() {
        let mut desc = two_room_map();
        desc.things.push(monster(64.0, 64.0));
        let (mut level, _rx) = new_level(&desc, Definitions::default());
        level.map_data.sectors[0].ceilingheight = 60.0;

        start_plane_mover(&mut level, PlaneMover::new(0, Plane::Ceiling, 0.0, 8.0));
        level.tick();
        assert_eq!(level.map_data.sectors[0].ceilingheight, 60.0);
        assert!(movers_on(&level, 0, Plane::Ceiling).is_empty());
    }

    #[test]
    fn crushing_mover_slows() {
        let mut desc = two_room_map();
        desc.things.push(monster(64.0, 64.0));
        let (mut level, _rx) = new_level(&desc, Definitions::default());
        level.map_data.sectors[0].ceilingheight = 60.0;

        let mut mover = PlaneMover::new(0, Plane::Ceiling, 0.0, 8.0);
        mover.flags = MoverFlag::Crush as u32;
        mover.crush_speed = 1.0;
        let id = start_plane_mover(&mut level, mover);
        level.tick();
        assert_eq!(level.map_data.sectors[0].ceilingheight, 52.0);
        level.tick();
        assert_eq!(level.map_data.sectors[0].ceilingheight, 51.0);
        assert_eq!(level.thinkers.get(id).and_then(|d| d.plane_mover()).unwrap().speed, 1.0);
    }

    #[test]
    fn stop_frees_slot() {
        let (mut level, _rx) = new_level(&two_room_map(), Definitions::default());
        let id = start_plane_mover(&mut level, PlaneMover::new(0, Plane::Floor, 64.0, 1.0));
        stop_mover(&mut level, id);
        assert!(movers_on(&level, 0, Plane::Floor).is_empty());
        level.tick();
        assert_eq!(level.map_data.sectors[0].floorheight, 0.0);
        assert!(level.thinkers.is_empty());
    }
}
