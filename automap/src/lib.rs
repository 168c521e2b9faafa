//! The automap: a top down view of the level drawn over or in place of the
//! player's view, with pan, zoom, rotate and follow controls, marks, and a
//! cheat that reveals the whole map and the extended line state.

mod cheat;
mod config;
mod draw;
mod rules;
mod view;

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use gamestate_traits::{
    Colour, DrawList, GameState, GameTraits, KeyCode, KeyEvent, SubsystemTrait, Vec2,
};
use log::{debug, info};

pub use cheat::Cheat;
pub use config::{AutomapConfig, Counter, Rgb, COUNTER_CVARS, CVARS};
pub use draw::{classify, clip_line, counter_lines, LineKind, Reveal};
pub use rules::{DoorLine, Glow, KeyMarker, MapRules};
pub use view::{OpenState, View, Window, Zoom};

use draw::{key_markers, Painter};

pub const NUM_MARKS: usize = 10;

/// Console commands the automap answers to
pub const COMMANDS: &[&str] = &[
    "automap",
    "follow",
    "rotate",
    "addmark",
    "clearmarks",
    "grid",
    "zoommax",
];

pub struct Automap {
    config: AutomapConfig,
    rules: &'static MapRules,
    view: View,
    cheat: Cheat,
    /// 0 normal, 1 whole map, 2 whole map and things and active lines
    cheating: u8,
    grid: bool,
    marks: [Option<Vec2>; NUM_MARKS],
    next_mark: usize,
    zoom: Zoom,
    /// Held pan keys: right, left, up, down
    pan_keys: [bool; 4],
    keys: Vec<(Vec2, Colour)>,
}

impl Automap {
    pub fn new(config: AutomapConfig) -> Self {
        let rules = MapRules::for_variant(Default::default());
        let mut view = View::default();
        view.set_rotate(config.rotate);
        Self {
            config,
            rules,
            view,
            cheat: Cheat::new(rules.cheat),
            cheating: 0,
            grid: false,
            marks: [None; NUM_MARKS],
            next_mark: 0,
            zoom: Zoom::None,
            pan_keys: [false; 4],
            keys: Vec::new(),
        }
    }

    pub fn config(&self) -> &AutomapConfig {
        &self.config
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn rules(&self) -> &'static MapRules {
        self.rules
    }

    pub fn is_active(&self) -> bool {
        self.view.is_active()
    }

    pub fn cheating(&self) -> u8 {
        self.cheating
    }

    pub fn grid(&self) -> bool {
        self.grid
    }

    pub fn marks(&self) -> &[Option<Vec2>] {
        &self.marks
    }

    /// Whether the HUD should be drawn this frame
    pub fn hud_visible(&self) -> bool {
        if !self.view.is_active() {
            return true;
        }
        match self.config.hud_display {
            0 => false,
            1 => self.config.width < 1.0 || self.config.height < 1.0,
            _ => true,
        }
    }

    fn window_target(&self, game: &impl GameTraits) -> Window {
        Window::placed(
            game.screen_size(),
            self.config.position,
            Vec2::new(self.config.width, self.config.height),
        )
    }

    /// Read a persisted variable by name
    pub fn cvar(&self, name: &str) -> Option<f32> {
        if !self.rules.counters && COUNTER_CVARS.contains(&name) {
            return None;
        }
        self.config.get(name)
    }

    /// Set a persisted variable by name, clamped to its range
    pub fn set_cvar(&mut self, name: &str, value: f32) -> bool {
        if !self.rules.counters && COUNTER_CVARS.contains(&name) {
            return false;
        }
        if !self.config.set(name, value) {
            return false;
        }
        self.view.set_rotate(self.config.rotate);
        true
    }

    pub fn open(&mut self) {
        self.view.open();
        debug!("Automap opening");
    }

    pub fn close(&mut self) {
        self.view.close();
        self.zoom = Zoom::None;
        self.pan_keys = [false; 4];
        debug!("Automap closing");
    }

    pub fn toggle(&mut self) {
        if self.view.is_active() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn toggle_follow(&mut self, game: &mut impl GameTraits) {
        let follow = !self.view.follow();
        self.view.set_follow(follow);
        self.pan_keys = [false; 4];
        game.player_msg(format!("Follow mode {}", on_off(follow)));
    }

    pub fn toggle_rotate(&mut self, game: &mut impl GameTraits) {
        self.config.rotate = !self.config.rotate;
        self.view.set_rotate(self.config.rotate);
        game.player_msg(format!("Rotate mode {}", on_off(self.config.rotate)));
    }

    pub fn toggle_grid(&mut self, game: &mut impl GameTraits) {
        self.grid = !self.grid;
        game.player_msg(format!("Grid {}", on_off(self.grid)));
    }

    /// Mark the point at the centre of the view. The oldest mark is
    /// replaced once all are used.
    pub fn add_mark(&mut self, game: &mut impl GameTraits) -> usize {
        let num = self.next_mark;
        self.marks[num] = Some(self.view.center());
        self.next_mark = (num + 1) % NUM_MARKS;
        game.player_msg(format!("Marked spot {}", num));
        num
    }

    pub fn clear_marks(&mut self, game: &mut impl GameTraits) {
        self.marks = [None; NUM_MARKS];
        self.next_mark = 0;
        game.player_msg("All marks cleared".to_string());
    }

    /// Run a console command. Returns false if the command was not handled.
    pub fn command(&mut self, name: &str, game: &mut impl GameTraits) -> bool {
        if !COMMANDS.contains(&name) {
            return false;
        }
        if game.game_state() != GameState::Level {
            info!("{}: can only be used while playing a level", name);
            return false;
        }
        if name == "automap" {
            self.toggle();
            return true;
        }
        if !self.view.is_active() {
            info!("{}: the automap is not open", name);
            return false;
        }
        match name {
            "follow" => self.toggle_follow(game),
            "rotate" => self.toggle_rotate(game),
            "addmark" => {
                self.add_mark(game);
            }
            "clearmarks" => self.clear_marks(game),
            "grid" => self.toggle_grid(game),
            "zoommax" => {
                self.view.toggle_big();
            }
            _ => return false,
        }
        true
    }

    fn pan_dir(&self) -> Vec2 {
        let [right, left, up, down] = self.pan_keys.map(f32::from);
        Vec2::new(right - left, up - down)
    }

    fn set_pan_key(&mut self, key: KeyCode, down: bool) -> bool {
        let i = match key {
            KeyCode::Right => 0,
            KeyCode::Left => 1,
            KeyCode::Up => 2,
            KeyCode::Down => 3,
            _ => return false,
        };
        self.pan_keys[i] = down;
        true
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl SubsystemTrait for Automap {
    fn init(&mut self, game: &impl GameTraits) {
        self.rules = MapRules::for_variant(game.variant());
        self.cheat = Cheat::new(self.rules.cheat);
        self.cheating = 0;
        self.marks = [None; NUM_MARKS];
        self.next_mark = 0;
        self.zoom = Zoom::None;
        self.pan_keys = [false; 4];

        let window = self.window_target(game);
        let player = game.player_mobj().map(|m| m.xy);
        self.keys.clear();
        let (min, max) = match game.level() {
            Some(level) => {
                self.keys = key_markers(level, self.rules);
                let extents = level.map_data.get_map_extents();
                (extents.min_vertex, extents.max_vertex)
            }
            None => (Vec2::ZERO, Vec2::ZERO),
        };
        self.view.init_level(min, max, window, player);
        debug!(
            "Automap scale {} in {}..{}",
            self.view.scale_mtof(),
            self.view.min_scale_mtof(),
            self.view.max_scale_mtof()
        );
    }

    fn responder(&mut self, event: KeyEvent, game: &mut impl GameTraits) -> bool {
        if !self.view.is_active() {
            if event == KeyEvent::Down(KeyCode::Tab) && game.game_state() == GameState::Level {
                self.open();
                return true;
            }
            return false;
        }

        let down = event.is_down();
        if let KeyEvent::Down(KeyCode::Char(c)) = event {
            let netgame = game.level().is_some_and(|l| l.netgame);
            if !netgame && self.cheat.check(c) {
                self.cheating = (self.cheating + 1) % 3;
                debug!("Automap cheat level {}", self.cheating);
                return true;
            }
        }

        match event.key() {
            KeyCode::Tab if down => {
                self.close();
                true
            }
            key @ (KeyCode::Right | KeyCode::Left | KeyCode::Up | KeyCode::Down) => {
                if self.view.follow() {
                    return false;
                }
                self.set_pan_key(key, down);
                down
            }
            KeyCode::Equals | KeyCode::Minus => {
                self.zoom = match (down, event.key()) {
                    (false, _) => Zoom::None,
                    (true, KeyCode::Equals) => Zoom::In,
                    (true, _) => Zoom::Out,
                };
                down
            }
            KeyCode::Char(c) if down => match c {
                '0' => {
                    self.view.toggle_big();
                    true
                }
                'f' => {
                    self.toggle_follow(game);
                    true
                }
                'r' => {
                    self.toggle_rotate(game);
                    true
                }
                'g' => {
                    self.toggle_grid(game);
                    true
                }
                'm' => {
                    self.add_mark(game);
                    true
                }
                'c' => {
                    self.clear_marks(game);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn ticker(&mut self, game: &mut impl GameTraits) -> bool {
        if self.view.state() == OpenState::Closed {
            return false;
        }
        #[cfg(feature = "hprof")]
        profile!("automap_ticker");
        let target = self.window_target(game);
        self.view.set_target_window(target);
        let player = game.player_mobj().map(|m| (m.xy, m.angle));
        self.view.tick(self.zoom, self.pan_dir(), player);
        false
    }

    fn draw(&mut self, game: &impl GameTraits, list: &mut DrawList) {
        if self.view.state() == OpenState::Closed {
            return;
        }
        let painter = Painter {
            view: &self.view,
            config: &self.config,
            rules: self.rules,
            cheating: self.cheating,
            grid: self.grid,
            marks: &self.marks,
            keys: &self.keys,
        };
        painter.draw(game, list);
    }
}

#[cfg(test)]
mod tests;
