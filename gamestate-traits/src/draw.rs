//! Immediate mode drawing commands. A subsystem pushes lines, quads and text
//! in frame buffer coordinates; the host turns them in to pixels, or in the
//! headless harness, counts them.

use glam::Vec2;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Line {
        from: Vec2,
        to: Vec2,
        colour: Colour,
        width: f32,
    },
    /// Axis aligned filled rectangle
    Quad {
        min: Vec2,
        max: Vec2,
        colour: Colour,
    },
    Text {
        pos: Vec2,
        text: String,
        colour: Colour,
        scale: f32,
    },
}

#[derive(Debug, Default, Clone)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, colour: Colour, width: f32) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            colour,
            width,
        });
    }

    pub fn quad(&mut self, min: Vec2, max: Vec2, colour: Colour) {
        self.cmds.push(DrawCmd::Quad { min, max, colour });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, colour: Colour, scale: f32) {
        self.cmds.push(DrawCmd::Text {
            pos,
            text: text.into(),
            colour,
            scale,
        });
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Number of line commands drawn in exactly this colour
    pub fn lines_coloured(&self, colour: Colour) -> usize {
        self.cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { colour: lc, .. } if *lc == colour))
            .count()
    }
}
