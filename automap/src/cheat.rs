/// A key sequence typed while the map is open, e.g, `iddt`
#[derive(Debug, Clone)]
pub struct Cheat {
    /// The sequence of chars to accept
    sequence: &'static str,
    /// `char` read so far
    chars_read: usize,
}

impl Cheat {
    pub const fn new(sequence: &'static str) -> Self {
        Self {
            sequence,
            chars_read: 0,
        }
    }

    pub fn sequence(&self) -> &'static str {
        self.sequence
    }

    /// Feed one key. Returns true when this key completes the sequence.
    pub fn check(&mut self, key: char) -> bool {
        let bytes = self.sequence.as_bytes();
        if bytes.is_empty() {
            return false;
        }
        if key as u32 == bytes[self.chars_read] as u32 {
            self.chars_read += 1;
        } else if key as u32 == bytes[0] as u32 {
            self.chars_read = 1;
        } else {
            self.chars_read = 0;
        }

        if self.chars_read >= bytes.len() {
            self.chars_read = 0;
            return true;
        }
        false
    }
}
