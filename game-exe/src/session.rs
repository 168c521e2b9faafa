//! One level being played with the automap over it, and the glue that lets
//! scripted input reach both.

use automap::Automap;
use gameplay::{
    log::{debug, info, warn},
    xg::{activate_line, cross_line, set_line_type, set_sector_type, shoot_line, use_line},
    GameVariant, Level, Skill, ThinkerId,
};
use gamestate_traits::{
    DrawCmd, DrawList, GameState, GameTraits, KeyEvent, LevelStats, SubsystemTrait, Vec2,
};

use crate::script::{Action, LineAct};

/// The game state the automap reads from
pub struct Game {
    pub level: Level,
    pub state: GameState,
    pub variant: GameVariant,
    pub screen: Vec2,
    /// Every player message shown so far
    pub messages: Vec<String>,
}

impl GameTraits for Game {
    fn game_state(&self) -> GameState {
        self.state
    }

    fn variant(&self) -> GameVariant {
        self.variant
    }

    fn skill(&self) -> Skill {
        self.level.game_skill
    }

    fn level(&self) -> Option<&Level> {
        Some(&self.level)
    }

    fn screen_size(&self) -> Vec2 {
        self.screen
    }

    fn level_stats(&self) -> LevelStats {
        LevelStats {
            total_kills: self.level.totalkills,
            total_items: self.level.totalitems,
            ..LevelStats::default()
        }
    }

    fn player_msg(&mut self, msg: String) {
        info!("[{}] {}", self.level.level_time, msg);
        self.messages.push(msg);
    }
}

/// Counts of what the automap asked to draw
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub frames: u32,
    pub lines: usize,
    pub quads: usize,
    pub texts: usize,
}

impl DrawStats {
    fn add(&mut self, list: &DrawList) {
        if list.is_empty() {
            return;
        }
        self.frames += 1;
        for cmd in list.cmds() {
            match cmd {
                DrawCmd::Line { .. } => self.lines += 1,
                DrawCmd::Quad { .. } => self.quads += 1,
                DrawCmd::Text { .. } => self.texts += 1,
            }
        }
    }
}

pub struct Session {
    pub game: Game,
    pub automap: Automap,
    pub draw_stats: DrawStats,
    list: DrawList,
}

impl Session {
    pub fn new(level: Level, automap: Automap, variant: GameVariant, screen: Vec2) -> Self {
        let mut session = Self {
            game: Game {
                level,
                state: GameState::Level,
                variant,
                screen,
                messages: Vec::new(),
            },
            automap,
            draw_stats: DrawStats::default(),
            list: DrawList::new(),
        };
        session.game.level.spawn_specials();
        session.automap.init(&session.game);
        session
    }

    /// Run the level for one tic, then let the automap follow and draw it
    pub fn tick(&mut self) {
        self.game.level.tick();
        self.automap.ticker(&mut self.game);
        self.list.clear();
        self.automap.draw(&self.game, &mut self.list);
        if !self.list.is_empty() {
            debug!(
                "[{}] automap drew {} commands",
                self.game.level.level_time,
                self.list.len()
            );
        }
        self.draw_stats.add(&self.list);
    }

    fn player(&self) -> Option<ThinkerId> {
        let level = &self.game.level;
        level.players[level.console_player].mobj
    }

    fn line_exists(&self, line: usize) -> bool {
        if line < self.game.level.map_data.linedefs().len() {
            return true;
        }
        warn!("No line {}", line);
        false
    }

    /// Carry out one scripted action. Returns false if it did nothing.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::Line { act, line } => {
                if !self.line_exists(*line) {
                    return false;
                }
                let Some(player) = self.player() else {
                    warn!("No player to trigger line {}", line);
                    return false;
                };
                let level = &mut self.game.level;
                let used = match act {
                    LineAct::Cross => cross_line(level, *line, player),
                    LineAct::Use => use_line(level, *line, player),
                    LineAct::Shoot => shoot_line(level, *line, player),
                };
                info!("[{}] {:?} line {}: {}", level.level_time, act, line, used);
                used
            }
            Action::Activate { line, on } => {
                if !self.line_exists(*line) {
                    return false;
                }
                let player = self.player();
                let level = &mut self.game.level;
                activate_line(level, *line, *on, player);
                true
            }
            Action::SectorType { sector, special } => {
                let level = &mut self.game.level;
                if *sector >= level.map_data.sectors().len() {
                    warn!("No sector {}", sector);
                    return false;
                }
                set_sector_type(level, *sector, *special);
                true
            }
            Action::LineType { line, special } => {
                if !self.line_exists(*line) {
                    return false;
                }
                set_line_type(&mut self.game.level, *line, *special);
                true
            }
            Action::MovePlayer(xy) => {
                let Some(player) = self.player() else {
                    return false;
                };
                let level = &mut self.game.level;
                let z = level.thinkers.mobj(player).map_or(0.0, |m| m.z);
                level.move_mobj(player, *xy, z)
            }
            Action::AllMap(on) => {
                let level = &mut self.game.level;
                let p = level.console_player;
                level.players[p].allmap = *on;
                true
            }
            Action::KeyDown(key) => self.automap.responder(KeyEvent::Down(*key), &mut self.game),
            Action::KeyUp(key) => self.automap.responder(KeyEvent::Up(*key), &mut self.game),
            Action::Press(key) => {
                let taken = self.automap.responder(KeyEvent::Down(*key), &mut self.game);
                self.automap.responder(KeyEvent::Up(*key), &mut self.game);
                taken
            }
            Action::Cvar { name, value } => {
                let set = self.automap.set_cvar(name, *value);
                if !set {
                    warn!("Unknown variable {}", name);
                }
                set
            }
            Action::Report => {
                self.report();
                true
            }
            Action::Command(name) => self.automap.command(name, &mut self.game),
        }
    }

    /// Log every sector with extended state
    pub fn report(&self) {
        let level = &self.game.level;
        for (num, xg) in level.xg().active_sectors() {
            let sec = &level.map_data.sectors()[num];
            info!(
                "[{}] sector {} type {}{}: floor {} ceiling {} light {} rgb {:?}",
                level.level_time,
                num,
                xg.info.id,
                if xg.disabled { " (disabled)" } else { "" },
                sec.floorheight,
                sec.ceilingheight,
                sec.lightlevel,
                sec.rgb
            );
        }
    }
}
