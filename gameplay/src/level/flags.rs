#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineDefFlags {
    /// Players and monsters cannot cross this line. Note that
    /// if there is no sector on the other side, they can't go through the line
    /// anyway, regardless of the flags
    Blocking = 1,
    /// Monsters cannot cross this line
    BlockMonsters = 1 << 1,
    /// The linedef has a sector on both sides
    TwoSided = 1 << 2,
    UnpegTop = 1 << 3,
    UnpegBottom = 1 << 4,
    /// On the automap, this line appears like a normal one-sided wall. Note
    /// that if the floors differ the map will still show the heights changing
    Secret = 1 << 5,
    BlockSound = 1 << 6,
    /// Not on AutoMap
    DontDraw = 1 << 7,
    /// Already seen, so drawn on the AutoMap
    Mapped = 1 << 8,
}

impl LineDefFlags {
    pub const fn is_set(self, flags: u32) -> bool {
        flags & self as u32 != 0
    }
}
