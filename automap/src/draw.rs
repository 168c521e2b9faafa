//! Turning the level in to automap draw commands. Reads the level only.

use gameplay::{Level, LineDef, LineDefFlags, MapObject, Sector, Skill};
use gamestate_traits::{Colour, DrawList, GameTraits, LevelStats};
use glam::Vec2;
use math::Angle;

use crate::config::{AutomapConfig, Counter};
use crate::rules::{DoorLine, Glow, MapRules, Segment};
use crate::view::{View, Window};

/// Map units between grid lines
const GRID_SIZE: f32 = 128.0;
const GRID_COLOUR: Colour = Colour::rgb(0.3, 0.3, 0.3);
const XG_ACTIVE: Colour = Colour::rgb(0.0, 1.0, 1.0);
const XG_ACTIVE_FLASH: Colour = Colour::rgb(0.6, 0.0, 1.0);
const THING_COLOUR: Colour = Colour::rgb(0.3, 0.85, 0.3);
const PLAYER_COLOUR: Colour = Colour::rgb(1.0, 1.0, 1.0);
const MARK_COLOUR: Colour = Colour::rgb(0.9, 0.9, 0.9);
const TEXT_COLOUR: Colour = Colour::rgb(1.0, 1.0, 1.0);
const PLAYER_RADIUS: f32 = 16.0;
/// Frame pixels between counter lines at scale 1
const TEXT_HEIGHT: f32 = 10.0;

/// How a line is drawn
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LineKind {
    /// Revealed by the map power or the cheat, not yet seen
    Unseen,
    Wall,
    Door(DoorLine),
    FloorChange,
    CeilingChange,
}

/// What reveals lines the player has not seen
#[derive(Debug, Default, Copy, Clone)]
pub struct Reveal {
    /// 0 normal, 1 everything, 2 everything and the debug overlay
    pub cheating: u8,
    pub allmap: bool,
    pub door_colors: bool,
}

/// Decide how, if at all, a line is drawn
pub fn classify(
    line: &LineDef,
    sectors: &[Sector],
    rules: &MapRules,
    reveal: Reveal,
) -> Option<LineKind> {
    let cheating = reveal.cheating > 0;
    if !cheating && LineDefFlags::DontDraw.is_set(line.flags) {
        return None;
    }
    if !cheating && !LineDefFlags::Mapped.is_set(line.flags) {
        return reveal.allmap.then_some(LineKind::Unseen);
    }

    let Some(back) = line.backsector else {
        return Some(LineKind::Wall);
    };
    if LineDefFlags::Secret.is_set(line.flags) {
        return Some(LineKind::Wall);
    }
    if reveal.door_colors {
        if let Some(door) = rules.door(line.special) {
            return Some(LineKind::Door(*door));
        }
    }
    let front = &sectors[line.frontsector];
    let back = &sectors[back];
    if front.floorheight != back.floorheight {
        return Some(LineKind::FloorChange);
    }
    if front.ceilingheight != back.ceilingheight {
        return Some(LineKind::CeilingChange);
    }
    cheating.then_some(LineKind::Unseen)
}

/// Clip a frame space line to the window
pub fn clip_line(window: &Window, a: Vec2, b: Vec2) -> Option<(Vec2, Vec2)> {
    let min = window.origin;
    let max = window.max();
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((a + d * t0, a + d * t1))
}

pub struct Painter<'a> {
    pub view: &'a View,
    pub config: &'a AutomapConfig,
    pub rules: &'a MapRules,
    pub cheating: u8,
    pub grid: bool,
    pub marks: &'a [Option<Vec2>],
    /// Key things found when the level was loaded
    pub keys: &'a [(Vec2, Colour)],
}

impl Painter<'_> {
    fn alpha(&self) -> f32 {
        self.view.alpha()
    }

    fn line_alpha(&self) -> f32 {
        self.config.line_alpha * self.view.alpha()
    }

    /// Draw a map space line, clipped to the window
    fn map_line(&self, list: &mut DrawList, a: Vec2, b: Vec2, colour: Colour, width: f32) {
        let fa = self.view.map_to_frame(a);
        let fb = self.view.map_to_frame(b);
        if let Some((fa, fb)) = clip_line(self.view.window(), fa, fb) {
            list.line(fa, fb, colour, width);
        }
    }

    fn in_window(&self, p: Vec2) -> bool {
        let w = self.view.window();
        p.cmpge(w.origin).all() && p.cmple(w.max()).all()
    }

    /// Everything, back to front
    pub fn draw(&self, game: &impl GameTraits, list: &mut DrawList) {
        let Some(level) = game.level() else {
            return;
        };
        let window = self.view.window();
        let bg = self.config.background;
        list.quad(
            window.origin,
            window.max(),
            bg.colour(self.config.background_alpha * self.alpha()),
        );
        if self.grid {
            self.draw_grid(list);
        }
        self.draw_lines(level, game.player_has_allmap(), list);
        if self.cheating == 2 {
            self.draw_xg_lines(level, list);
        }
        self.draw_players(level, list);
        if self.cheating == 2 {
            self.draw_things(level, list);
        }
        if game.skill() == Skill::Baby && self.config.baby_keys {
            self.draw_keys(list);
        }
        self.draw_marks(list);
        if self.rules.counters {
            self.draw_counters(game.level_stats(), list);
        }
    }

    fn draw_grid(&self, list: &mut DrawList) {
        let (min, _) = self.view.bounds();
        let center = self.view.center();
        let r = self.view.visible_radius();
        let colour = GRID_COLOUR.with_alpha(self.line_alpha());

        let first = |from: f32, origin: f32| origin + ((from - origin) / GRID_SIZE).ceil() * GRID_SIZE;
        let mut x = first(center.x - r, min.x);
        while x <= center.x + r {
            self.map_line(list, Vec2::new(x, center.y - r), Vec2::new(x, center.y + r), colour, 1.0);
            x += GRID_SIZE;
        }
        let mut y = first(center.y - r, min.y);
        while y <= center.y + r {
            self.map_line(list, Vec2::new(center.x - r, y), Vec2::new(center.x + r, y), colour, 1.0);
            y += GRID_SIZE;
        }
    }

    fn draw_lines(&self, level: &Level, allmap: bool, list: &mut DrawList) {
        let reveal = Reveal {
            cheating: self.cheating,
            allmap,
            door_colors: self.config.door_colors,
        };
        let alpha = self.line_alpha();
        let sectors = &level.map_data.sectors;
        for line in &level.map_data.linedefs {
            let Some(kind) = classify(line, sectors, self.rules, reveal) else {
                continue;
            };
            let colour = match kind {
                LineKind::Unseen => self.config.color_unseen.colour(alpha),
                LineKind::Wall => self.config.color_wall.colour(alpha),
                LineKind::FloorChange => self.config.color_floor_change.colour(alpha),
                LineKind::CeilingChange => self.config.color_ceiling_change.colour(alpha),
                LineKind::Door(door) => {
                    self.draw_glow(line, &door, list);
                    door.colour.with_alpha(alpha)
                }
            };
            self.map_line(list, line.v1, line.v2, colour, 1.0);
        }
    }

    /// A wide translucent line beside or over a door line
    fn draw_glow(&self, line: &LineDef, door: &DoorLine, list: &mut DrawList) {
        let size = self.config.door_glow;
        if size <= 0.0 {
            return;
        }
        // The front is on the right going from v1 to v2
        let normal = Vec2::new(line.delta.y, -line.delta.x).normalize_or_zero();
        let offset = match door.glow {
            Glow::TwoSided => Vec2::ZERO,
            Glow::Front => normal * size / 4.0,
            Glow::Back => -normal * size / 4.0,
        };
        let width = match door.glow {
            Glow::TwoSided => size,
            Glow::Front | Glow::Back => size / 2.0,
        } * self.view.scale_mtof();
        let colour = door.colour.with_alpha(self.line_alpha() / 2.0);
        self.map_line(list, line.v1 + offset, line.v2 + offset, colour, width);
    }

    /// Active extended lines, seen or not, flashing
    fn draw_xg_lines(&self, level: &Level, list: &mut DrawList) {
        let colour = if level.level_time & 8 == 0 {
            XG_ACTIVE
        } else {
            XG_ACTIVE_FLASH
        }
        .with_alpha(self.alpha());
        for line in &level.map_data.linedefs {
            if line.xg.as_ref().is_some_and(|xg| xg.active) {
                self.map_line(list, line.v1, line.v2, colour, 2.0);
            }
        }
    }

    fn draw_shape(
        &self,
        list: &mut DrawList,
        shape: &[Segment],
        radius: f32,
        angle: Angle,
        at: Vec2,
        colour: Colour,
    ) {
        let (sin, cos) = angle.sin_cos();
        let place = |x: f32, y: f32| at + Vec2::new(x * cos - y * sin, x * sin + y * cos) * radius;
        for s in shape {
            self.map_line(list, place(s[0], s[1]), place(s[2], s[3]), colour, 1.0);
        }
    }

    fn draw_players(&self, level: &Level, list: &mut DrawList) {
        let arrow = if self.cheating > 0 {
            self.rules.cheat_arrow
        } else {
            self.rules.arrow
        };
        let radius = 8.0 * PLAYER_RADIUS / 7.0;
        for (i, slot) in level.players.iter().enumerate() {
            if !slot.in_game || (!level.netgame && i != level.console_player) {
                continue;
            }
            let Some(mobj) = slot.mobj.and_then(|id| level.thinkers.mobj(id)) else {
                continue;
            };
            let colour = if level.netgame {
                self.rules.player_colours[i % self.rules.player_colours.len()]
            } else {
                PLAYER_COLOUR
            };
            self.draw_shape(list, arrow, radius, mobj.angle, mobj.xy, colour.with_alpha(self.alpha()));
        }
    }

    fn draw_things(&self, level: &Level, list: &mut DrawList) {
        const TRIANGLE: [Segment; 3] = [
            [-0.5, -0.7, 1.0, 0.0],
            [1.0, 0.0, -0.5, 0.7],
            [-0.5, 0.7, -0.5, -0.7],
        ];
        let colour = THING_COLOUR.with_alpha(self.alpha());
        for mobj in mobjs(level).filter(|m| !m.is_player()) {
            self.draw_shape(list, &TRIANGLE, mobj.radius.max(4.0), mobj.angle, mobj.xy, colour);
        }
    }

    fn draw_keys(&self, list: &mut DrawList) {
        let half = Vec2::splat((8.0 * self.view.scale_mtof()).max(2.0));
        for &(xy, colour) in self.keys {
            let p = self.view.map_to_frame(xy);
            if !self.in_window(p) {
                continue;
            }
            list.quad(p - half, p + half, colour.with_alpha(self.alpha()));
        }
    }

    fn draw_marks(&self, list: &mut DrawList) {
        let colour = MARK_COLOUR.with_alpha(self.alpha());
        for (i, mark) in self.marks.iter().enumerate() {
            let Some(mark) = mark else {
                continue;
            };
            let p = self.view.map_to_frame(*mark);
            if self.in_window(p) {
                list.text(p, i.to_string(), colour, 1.0);
            }
        }
    }

    fn draw_counters(&self, stats: LevelStats, list: &mut DrawList) {
        let lines = counter_lines(self.config, &stats);
        let scale = self.config.counter_scale;
        let origin = self.view.window().origin + Vec2::splat(4.0);
        let colour = TEXT_COLOUR.with_alpha(self.alpha());
        for (i, text) in lines.into_iter().enumerate() {
            let pos = origin + Vec2::new(0.0, i as f32 * TEXT_HEIGHT * scale);
            list.text(pos, text, colour, scale);
        }
    }
}

fn mobjs(level: &Level) -> impl Iterator<Item = &MapObject> + '_ {
    level.thinkers.iter().filter_map(|(_, t)| t.mobj())
}

/// Where the level's keys are and what colour each is marked in
pub fn key_markers(level: &Level, rules: &MapRules) -> Vec<(Vec2, Colour)> {
    mobjs(level)
        .filter_map(|m| rules.key(m.kind).map(|k| (m.xy, k.colour)))
        .collect()
}

fn percent(count: i32, total: i32) -> i32 {
    if total > 0 {
        count * 100 / total
    } else {
        100
    }
}

fn counter_line(
    config: &AutomapConfig,
    name: &str,
    (count, total): (i32, i32),
    show: Counter,
    show_percent: Counter,
) -> Option<String> {
    let mut parts = Vec::new();
    if config.has_counter(show) {
        parts.push(format!("{}/{}", count, total));
    }
    if config.has_counter(show_percent) {
        parts.push(format!("{}%", percent(count, total)));
    }
    (!parts.is_empty()).then(|| format!("{}: {}", name, parts.join(" ")))
}

/// The counter text lines the config asks for
pub fn counter_lines(config: &AutomapConfig, stats: &LevelStats) -> Vec<String> {
    [
        ("Kills", (stats.kills, stats.total_kills), Counter::Kills, Counter::KillsPercent),
        ("Items", (stats.items, stats.total_items), Counter::Items, Counter::ItemsPercent),
        ("Secrets", (stats.secrets, stats.total_secrets), Counter::Secrets, Counter::SecretsPercent),
    ]
    .into_iter()
    .filter_map(|(name, tally, show, percent)| counter_line(config, name, tally, show, percent))
    .collect()
}
