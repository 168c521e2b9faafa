//! The animation strings that drive a sector channel over time.
//!
//! A string is parsed once in to tokens and walked by an index cursor:
//!
//! * `a`..`z` are values 0 to 1 in 25 steps, interpolated toward the next value
//! * `A`..`Z` are the same values, stepped
//! * `/n` and `%n` are literal values, interpolated and stepped respectively
//! * digits repeat the following value that many times
//! * `!n` fires chain `n`, `#n` sets the next interval, `?n` a random one up to `n`
//! * `>` marks a loop start, `<` jumps back to it, `.` stops the cursor
//!
//! A leading `=x` links the channel to channel `x` of the same sector, and a
//! leading `+x` adds the current value of channel `x` to the offset.

use math::Random;

use crate::doom_def::TICRATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Floor,
    Ceiling,
    Light,
    Red,
    Green,
    Blue,
}

pub const NUM_CHANNELS: usize = 6;

impl Channel {
    pub const ALL: [Channel; NUM_CHANNELS] = [
        Channel::Floor,
        Channel::Ceiling,
        Channel::Light,
        Channel::Red,
        Channel::Green,
        Channel::Blue,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_lowercase() {
            'f' => Channel::Floor,
            'c' => Channel::Ceiling,
            'l' => Channel::Light,
            'r' => Channel::Red,
            'g' => Channel::Green,
            'b' => Channel::Blue,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Value { value: f32, interpolate: bool },
    Repeat(i32),
    Chain(i32),
    SetTimer(i32),
    RandomTimer(i32),
    LoopStart,
    /// Resume at this token index
    LoopBack(usize),
    Stop,
}

/// Longest interval a `#n` or `?n` may ask for, one hour of tics
const MAX_TIMER: i32 = TICRATE * 60 * 60;

/// A decimal point only counts when it is the first and a digit follows it,
/// so a trailing `.` is left to stop the cursor.
fn take_number(chars: &[char], pos: &mut usize, float: bool) -> Option<String> {
    let start = *pos;
    let mut point = false;
    while *pos < chars.len() {
        let c = chars[*pos];
        let ok = c.is_ascii_digit()
            || (*pos == start && (c == '-' || c == '+'))
            || (float
                && !point
                && c == '.'
                && chars.get(*pos + 1).is_some_and(|n| n.is_ascii_digit()));
        if !ok {
            break;
        }
        point |= c == '.';
        *pos += 1;
    }
    (*pos > start).then(|| chars[start..*pos].iter().collect())
}

fn parse(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut loop_start: Option<usize> = None;
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        pos += 1;
        match c {
            'a'..='z' | 'A'..='Z' => tokens.push(Token::Value {
                value: (c.to_ascii_lowercase() as u8 - b'a') as f32 / 25.0,
                interpolate: c.is_ascii_lowercase(),
            }),
            '/' | '%' => {
                if let Some(value) =
                    take_number(&chars, &mut pos, true).and_then(|n| n.parse::<f32>().ok())
                {
                    tokens.push(Token::Value {
                        value,
                        interpolate: c == '/',
                    });
                }
            }
            '0'..='9' => {
                pos -= 1;
                if let Some(n) = take_number(&chars, &mut pos, false).and_then(|n| n.parse().ok())
                {
                    tokens.push(Token::Repeat(n));
                }
            }
            '!' | '#' | '?' => {
                if let Some(n) =
                    take_number(&chars, &mut pos, false).and_then(|n| n.parse::<i32>().ok())
                {
                    tokens.push(match c {
                        '!' => Token::Chain(n),
                        '#' => Token::SetTimer(n.clamp(0, MAX_TIMER)),
                        _ => Token::RandomTimer(n.clamp(0, MAX_TIMER)),
                    });
                }
            }
            '>' => {
                loop_start = Some(tokens.len());
                tokens.push(Token::LoopStart);
            }
            '<' => tokens.push(Token::LoopBack(loop_start.map_or(0, |i| i + 1))),
            '.' => tokens.push(Token::Stop),
            _ => {}
        }
    }
    tokens
}

/// How a channel's function is set up
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub source: String,
    pub min_interval: i32,
    pub max_interval: i32,
    pub scale: f32,
    pub offset: f32,
}

impl Default for FunctionDef {
    fn default() -> Self {
        Self {
            source: String::new(),
            min_interval: 0,
            max_interval: 0,
            scale: 1.0,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Function {
    tokens: Vec<Token>,
    /// Index of the value token being shown
    pos: Option<usize>,
    repeat: i32,
    timer: i32,
    max_timer: i32,
    min_interval: i32,
    max_interval: i32,
    scale: f32,
    offset: f32,
    value: f32,
    old_value: f32,
    link: Option<Channel>,
    stopped: bool,
}

impl Function {
    /// `current` gives the sector's present value of a channel, used by the
    /// `+x` prefix.
    pub fn new(def: &FunctionDef, current: impl Fn(Channel) -> f32, rng: &mut Random) -> Self {
        let mut source = def.source.trim();
        let mut link = None;
        let mut offset = def.offset;

        let mut prefix = source.chars();
        match (prefix.next(), prefix.next().and_then(Channel::from_char)) {
            (Some('='), Some(channel)) => {
                link = Some(channel);
                source = "";
            }
            (Some('+'), Some(channel)) => {
                offset += current(channel);
                source = &source[2..];
            }
            _ => {}
        }

        let mut func = Self {
            tokens: parse(source),
            min_interval: def.min_interval,
            max_interval: def.max_interval.max(def.min_interval),
            scale: def.scale,
            offset,
            link,
            ..Self::default()
        };
        func.max_timer = rng.range(func.min_interval, func.max_interval);
        // Settle on the first value without firing anything
        func.pos = func.scan(0, rng, &mut Vec::new(), false);
        if let Some(pos) = func.pos {
            func.value = func.present(pos);
            func.old_value = func.value;
        }
        func
    }

    /// Something to evaluate, or a link to follow
    pub fn is_active(&self) -> bool {
        self.pos.is_some() || self.link.is_some()
    }

    pub fn link(&self) -> Option<Channel> {
        self.link
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn old_value(&self) -> f32 {
        self.old_value
    }

    pub fn changed(&self) -> bool {
        self.value != self.old_value
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Copy in the value of the linked channel
    pub fn set_linked_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Step one tic. Chains met while advancing are pushed on to `fired`.
    pub fn tick(&mut self, rng: &mut Random, fired: &mut Vec<i32>) {
        self.old_value = self.value;
        if self.link.is_some() {
            return;
        }
        let Some(pos) = self.pos else {
            return;
        };

        if !self.stopped {
            self.timer += 1;
            if self.timer >= self.max_timer {
                self.timer = 0;
                self.max_timer = rng.range(self.min_interval, self.max_interval);
                self.advance(pos, rng, fired);
            }
        }

        if let Some(pos) = self.pos {
            self.value = self.present(pos);
        }
    }

    fn advance(&mut self, pos: usize, rng: &mut Random, fired: &mut Vec<i32>) {
        if self.repeat > 0 {
            self.repeat -= 1;
            return;
        }
        if let Some(next) = self.scan(pos + 1, rng, fired, true) {
            self.pos = Some(next);
        }
    }

    /// Walk forward from `start` to the next value token, running control
    /// tokens on the way. Gives up after one full lap with no value.
    fn scan(
        &mut self,
        start: usize,
        rng: &mut Random,
        fired: &mut Vec<i32>,
        run: bool,
    ) -> Option<usize> {
        let len = self.tokens.len();
        if len == 0 {
            return None;
        }
        let mut i = start;
        for _ in 0..len * 2 + 2 {
            if i >= len {
                i = 0;
            }
            match self.tokens[i] {
                Token::Value { .. } => return Some(i),
                Token::Repeat(n) => self.repeat = (n - 1).max(0),
                Token::Chain(n) => {
                    if run {
                        fired.push(n)
                    }
                }
                Token::SetTimer(n) => self.max_timer = n,
                Token::RandomTimer(n) => self.max_timer = rng.range(0, n),
                Token::LoopStart => {}
                Token::LoopBack(target) => {
                    i = target;
                    continue;
                }
                Token::Stop => {
                    if self.pos.is_some() {
                        self.stopped = true;
                        return None;
                    }
                }
            }
            i += 1;
        }
        None
    }

    /// The value token after `pos` if the cursor would blend toward it.
    /// Running off the end of the string is a step, not a blend.
    fn peek_next(&self, pos: usize) -> Option<(f32, bool)> {
        if self.repeat > 0 {
            return match self.tokens[pos] {
                Token::Value { value, interpolate } => Some((value, interpolate)),
                _ => None,
            };
        }
        let mut i = pos + 1;
        for _ in 0..self.tokens.len() + 1 {
            match self.tokens.get(i)? {
                Token::Value { value, interpolate } => return Some((*value, *interpolate)),
                Token::LoopBack(target) => i = *target,
                Token::Stop => return None,
                _ => i += 1,
            }
        }
        None
    }

    fn present(&self, pos: usize) -> f32 {
        let Token::Value { value, .. } = self.tokens[pos] else {
            return self.value;
        };
        let mut raw = value;
        if !self.stopped && self.max_timer > 0 {
            if let Some((next, true)) = self.peek_next(pos) {
                let inter = self.timer as f32 / self.max_timer as f32;
                raw = value * (1.0 - inter) + next * inter;
            }
        }
        raw * self.scale + self.offset
    }
}

#[cfg(test)]
mod tests {
    use math::Random;

    use super::{parse, Channel, Function, FunctionDef, Token, MAX_TIMER};

    fn def(source: &str, min: i32, max: i32) -> FunctionDef {
        FunctionDef {
            source: source.to_string(),
            min_interval: min,
            max_interval: max,
            ..FunctionDef::default()
        }
    }

    fn func(source: &str, min: i32, max: i32) -> Function {
        Function::new(&def(source, min, max), |_| 0.0, &mut Random::default())
    }

    fn run(f: &mut Function, tics: usize) -> Vec<f32> {
        let mut rng = Random::default();
        let mut fired = Vec::new();
        (0..tics)
            .map(|_| {
                f.tick(&mut rng, &mut fired);
                f.value()
            })
            .collect()
    }

    #[test]
    fn parse_tokens() {
        let tokens = parse("aZ/0.5%2 3b!7#10?4>c<.");
        assert_eq!(
            tokens,
            vec![
                Token::Value {
                    value: 0.0,
                    interpolate: true
                },
                Token::Value {
                    value: 1.0,
                    interpolate: false
                },
                Token::Value {
                    value: 0.5,
                    interpolate: true
                },
                Token::Value {
                    value: 2.0,
                    interpolate: false
                },
                Token::Repeat(3),
                Token::Value {
                    value: 0.04,
                    interpolate: true
                },
                Token::Chain(7),
                Token::SetTimer(10),
                Token::RandomTimer(4),
                Token::LoopStart,
                Token::Value {
                    value: 0.08,
                    interpolate: true
                },
                Token::LoopBack(10),
                Token::Stop,
            ]
        );
    }

    #[test]
    fn midpoint_interpolation() {
        let mut f = func("az", 10, 10);
        let values = run(&mut f, 5);
        assert!((values[4] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn scale_and_offset() {
        let mut d = def("az", 10, 10);
        d.scale = 64.0;
        d.offset = 8.0;
        let mut f = Function::new(&d, |_| 0.0, &mut Random::default());
        assert_eq!(f.value(), 8.0);
        let values = run(&mut f, 5);
        assert!((values[4] - 40.0).abs() < 1e-4);
    }

    #[test]
    fn uppercase_next_steps() {
        let mut f = func("aZ", 4, 4);
        let values = run(&mut f, 5);
        // Holds 'a' until the step, then jumps
        assert_eq!(values[..3], [0.0, 0.0, 0.0]);
        assert_eq!(values[3], 1.0);
    }

    #[test]
    fn end_of_string_steps_and_wraps() {
        let mut f = func("az", 2, 2);
        let values = run(&mut f, 6);
        assert_eq!(values, vec![0.5, 1.0, 1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn repeat_count() {
        let mut f = func("A3Z", 1, 1);
        let values = run(&mut f, 5);
        assert_eq!(values, vec![1.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn chain_and_timer_tokens() {
        let mut f = func("A!3#5Z", 1, 1);
        let mut rng = Random::default();
        let mut fired = Vec::new();
        f.tick(&mut rng, &mut fired);
        assert_eq!(fired, vec![3]);
        assert_eq!(f.value(), 1.0);
        // '#5' holds 'Z' for five tics
        for _ in 0..4 {
            f.tick(&mut rng, &mut fired);
            assert_eq!(f.value(), 1.0);
        }
        f.tick(&mut rng, &mut fired);
        assert_eq!(f.value(), 0.0);
        assert_eq!(fired, vec![3]);
    }

    #[test]
    fn loop_back_skips_intro() {
        let mut f = func("Z>AM<", 1, 1);
        let values = run(&mut f, 5);
        assert_eq!(values, vec![0.0, 0.48, 0.0, 0.48, 0.0]);
    }

    #[test]
    fn stop_holds() {
        let mut f = func("AZ.", 1, 1);
        let values = run(&mut f, 4);
        assert_eq!(values, vec![1.0, 1.0, 1.0, 1.0]);
        assert!(f.is_stopped());
    }

    #[test]
    fn literal_then_stop_holds_literal() {
        assert_eq!(
            parse("/0.5.%1.25.5"),
            vec![
                Token::Value {
                    value: 0.5,
                    interpolate: true
                },
                Token::Stop,
                Token::Value {
                    value: 1.25,
                    interpolate: false
                },
                Token::Stop,
                Token::Repeat(5),
            ]
        );

        let mut f = func("A/0.5.", 1, 1);
        let values = run(&mut f, 4);
        assert_eq!(values, vec![0.5, 0.5, 0.5, 0.5]);
        assert!(f.is_stopped());
    }

    #[test]
    fn huge_timers_are_clamped() {
        assert_eq!(
            parse("#2147483647?2147483647"),
            vec![Token::SetTimer(MAX_TIMER), Token::RandomTimer(MAX_TIMER)]
        );
        let mut f = func("A?2147483647Z", 1, 1);
        let values = run(&mut f, 3);
        assert_eq!(values[0], 1.0);
    }

    #[test]
    fn malformed_holds_last_value() {
        let mut f = func("!!##<", 1, 1);
        assert!(!f.is_active());
        run(&mut f, 3);
        assert_eq!(f.value(), 0.0);

        let mut f = func("M/", 1, 1);
        let values = run(&mut f, 3);
        assert_eq!(values, vec![0.48, 0.48, 0.48]);
    }

    #[test]
    fn prefixes() {
        let f = Function::new(&def("=l", 0, 0), |_| 0.0, &mut Random::default());
        assert_eq!(f.link(), Some(Channel::Light));
        assert!(f.is_active());

        let f = Function::new(
            &def("+fZ", 0, 0),
            |c| if c == Channel::Floor { 32.0 } else { 0.0 },
            &mut Random::default(),
        );
        assert_eq!(f.value(), 33.0);
    }

    #[test]
    fn deterministic_for_seed() {
        let mut a = Function::new(&def("aqzKm", 3, 9), |_| 0.0, &mut Random::new(5));
        let mut b = Function::new(&def("aqzKm", 3, 9), |_| 0.0, &mut Random::new(5));
        let mut ra = Random::new(9);
        let mut rb = Random::new(9);
        let mut fired = Vec::new();
        for _ in 0..200 {
            a.tick(&mut ra, &mut fired);
            b.tick(&mut rb, &mut fired);
            assert_eq!(a.value(), b.value());
        }
    }
}
