//! The automap's window, scale and position, and how they move each tic.
//!
//! Map space has +y up. Frame space is the frame buffer, +y down, with the
//! window placed somewhere inside it.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use math::{rotate_around, Angle};

/// Frame pixels panned per tic
pub const F_PANINC: f32 = 4.0;
/// Zoom change per tic while a zoom key is held
pub const M_ZOOMIN: f32 = 1.02;
pub const M_ZOOMOUT: f32 = 1.0 / 1.02;
/// Fully zoomed in, the window is this many player widths tall
const PLAYER_RADIUS: f32 = 16.0;
/// A new level starts this far in from the fully zoomed out scale
const INIT_SCALE: f32 = 0.7;

const ALPHA_SNAP: f32 = 0.01;
const WINDOW_SNAP: f32 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpenState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Zoom key state
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Zoom {
    #[default]
    None,
    In,
    Out,
}

/// A rectangle in frame space, origin top left
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Window {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Window {
    /// Place a window of `scale` times the screen size on a 3x3 grid
    pub fn placed(screen: Vec2, position: u8, scale: Vec2) -> Self {
        let size = (screen * scale).max(Vec2::ONE);
        let free = (screen - size).max(Vec2::ZERO);
        let cell = Vec2::new((position % 3) as f32, (position.min(8) / 3) as f32);
        Self {
            origin: free * cell / 2.0,
            size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    fn ease(&mut self, target: &Window) -> bool {
        let o = ease(&mut self.origin.x, target.origin.x, WINDOW_SNAP)
            & ease(&mut self.origin.y, target.origin.y, WINDOW_SNAP);
        let s = ease(&mut self.size.x, target.size.x, WINDOW_SNAP)
            & ease(&mut self.size.y, target.size.y, WINDOW_SNAP);
        o && s
    }
}

/// Move `v` half way to `target`, snapping once within `snap`. Returns true
/// when `v` has arrived.
fn ease(v: &mut f32, target: f32, snap: f32) -> bool {
    *v += (target - *v) / 2.0;
    if (target - *v).abs() < snap {
        *v = target;
    }
    *v == target
}

#[derive(Debug, Clone)]
pub struct View {
    state: OpenState,
    alpha: f32,
    target_alpha: f32,
    window: Window,
    target_window: Window,
    /// Map bounding box
    min: Vec2,
    max: Vec2,
    scale_mtof: f32,
    scale_ftom: f32,
    min_scale_mtof: f32,
    max_scale_mtof: f32,
    /// Map point at the window centre
    center: Vec2,
    zoom_mul: f32,
    /// Map units per tic
    pan: Vec2,
    follow: bool,
    rotate: bool,
    /// Where the player was when the view last followed them
    followed: Option<Vec2>,
    rotation: Angle,
    /// Scale and centre saved on entering the zoomed out view
    big: Option<(f32, Vec2)>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            state: OpenState::Closed,
            alpha: 0.0,
            target_alpha: 0.0,
            window: Window::default(),
            target_window: Window::default(),
            min: Vec2::ZERO,
            max: Vec2::ZERO,
            scale_mtof: 1.0,
            scale_ftom: 1.0,
            min_scale_mtof: 1.0,
            max_scale_mtof: 1.0,
            center: Vec2::ZERO,
            zoom_mul: 1.0,
            pan: Vec2::ZERO,
            follow: true,
            rotate: false,
            followed: None,
            rotation: Angle::default(),
            big: None,
        }
    }
}

impl View {
    /// Reset for a new level with the given bounding box
    pub fn init_level(&mut self, min: Vec2, max: Vec2, window: Window, player: Option<Vec2>) {
        self.min = min;
        self.max = max;
        self.window = window;
        self.target_window = window;
        self.big = None;
        self.followed = None;
        self.zoom_mul = 1.0;
        self.pan = Vec2::ZERO;
        self.set_limits();
        self.set_scale(self.min_scale_mtof / INIT_SCALE);
        self.center = player.unwrap_or((min + max) / 2.0);
    }

    /// Scale limits from the settled window and map size
    fn set_limits(&mut self) {
        let map = (self.max - self.min).max(Vec2::ONE);
        let win = self.target_window.size;
        self.max_scale_mtof = win.y / (2.0 * PLAYER_RADIUS);
        let fit = win / map;
        self.min_scale_mtof = fit.x.min(fit.y).min(self.max_scale_mtof);
    }

    /// Clamp and apply a new map to frame scale
    fn set_scale(&mut self, scale: f32) {
        self.scale_mtof = scale.clamp(self.min_scale_mtof, self.max_scale_mtof);
        self.scale_ftom = 1.0 / self.scale_mtof;
    }

    pub fn set_target_window(&mut self, window: Window) {
        if window != self.target_window {
            self.target_window = window;
            self.set_limits();
            self.set_scale(self.scale_mtof);
        }
    }

    pub fn open(&mut self) {
        if matches!(self.state, OpenState::Closed | OpenState::Closing) {
            self.state = OpenState::Opening;
            self.target_alpha = 1.0;
            // Re-centre on the player the first tic open
            self.followed = None;
        }
    }

    pub fn close(&mut self) {
        if matches!(self.state, OpenState::Open | OpenState::Opening) {
            self.state = OpenState::Closing;
            self.target_alpha = 0.0;
            self.zoom_mul = 1.0;
            self.pan = Vec2::ZERO;
        }
    }

    /// Open or opening
    pub fn is_active(&self) -> bool {
        matches!(self.state, OpenState::Opening | OpenState::Open)
    }

    pub fn state(&self) -> OpenState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn target_window(&self) -> &Window {
        &self.target_window
    }

    pub fn scale_mtof(&self) -> f32 {
        self.scale_mtof
    }

    pub fn scale_ftom(&self) -> f32 {
        self.scale_ftom
    }

    pub fn min_scale_mtof(&self) -> f32 {
        self.min_scale_mtof
    }

    pub fn max_scale_mtof(&self) -> f32 {
        self.max_scale_mtof
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }

    pub fn follow(&self) -> bool {
        self.follow
    }

    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
        self.followed = None;
        self.pan = Vec2::ZERO;
    }

    pub fn rotate(&self) -> bool {
        self.rotate
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = rotate;
    }

    pub fn is_big(&self) -> bool {
        self.big.is_some()
    }

    /// Toggle the fully zoomed out view. Entering saves the scale and centre,
    /// leaving restores them.
    pub fn toggle_big(&mut self) -> bool {
        match self.big.take() {
            Some((scale, center)) => {
                self.set_scale(scale);
                self.center = center;
                false
            }
            None => {
                self.big = Some((self.scale_mtof, self.center));
                self.set_scale(self.min_scale_mtof);
                true
            }
        }
    }

    /// Advance one tic. `pan_dir` is the held pan keys as a unit step on each
    /// axis; it is ignored while following. `player` is the followed
    /// position and heading.
    pub fn tick(&mut self, zoom: Zoom, pan_dir: Vec2, player: Option<(Vec2, Angle)>) {
        let alpha_done = ease(&mut self.alpha, self.target_alpha, ALPHA_SNAP);
        let target = self.target_window;
        let window_done = self.window.ease(&target);
        match self.state {
            OpenState::Opening if alpha_done && window_done => self.state = OpenState::Open,
            OpenState::Closing if alpha_done => self.state = OpenState::Closed,
            _ => {}
        }

        self.zoom_mul = match zoom {
            Zoom::In => M_ZOOMIN,
            Zoom::Out => M_ZOOMOUT,
            Zoom::None => 1.0,
        };

        if self.follow {
            self.pan = Vec2::ZERO;
            if let Some((xy, angle)) = player {
                if self.followed != Some(xy) {
                    self.center = xy;
                    self.followed = Some(xy);
                }
                self.rotation = Angle::new(FRAC_PI_2) - angle;
            }
        } else {
            self.pan = pan_dir * F_PANINC * self.scale_ftom;
        }

        if self.zoom_mul != 1.0 {
            self.set_scale(self.scale_mtof * self.zoom_mul);
        }
        if self.pan != Vec2::ZERO {
            self.center += self.pan;
        }
        self.center = self.center.clamp(self.min, self.max);
    }

    fn rotating(&self) -> bool {
        self.rotate && self.follow
    }

    /// Map point at the window's top left corner, before rotation
    fn map_origin(&self) -> Vec2 {
        let half = self.window.size / 2.0 * self.scale_ftom;
        Vec2::new(self.center.x - half.x, self.center.y + half.y)
    }

    pub fn map_to_frame(&self, point: Vec2) -> Vec2 {
        let point = if self.rotating() {
            rotate_around(point, self.center, self.rotation)
        } else {
            point
        };
        let d = (point - self.map_origin()) * self.scale_mtof;
        Vec2::new(self.window.origin.x + d.x, self.window.origin.y - d.y)
    }

    pub fn frame_to_map(&self, point: Vec2) -> Vec2 {
        let d = point - self.window.origin;
        let origin = self.map_origin();
        let map = Vec2::new(
            origin.x + d.x * self.scale_ftom,
            origin.y - d.y * self.scale_ftom,
        );
        if self.rotating() {
            rotate_around(map, self.center, -self.rotation)
        } else {
            map
        }
    }

    /// Half the window's diagonal in map units. Everything visible at any
    /// rotation is within this distance of the centre.
    pub fn visible_radius(&self) -> f32 {
        self.window.size.length() / 2.0 * self.scale_ftom
    }
}
