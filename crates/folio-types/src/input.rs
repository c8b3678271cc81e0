//! Platform-agnostic key input.
//!
//! The presentation layer maps native keyboard events to the fixed key
//! vocabulary below. The core never sees raw platform input.

use serde::{Deserialize, Serialize};

/// A single key press forwarded to the terminal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character (including space).
    Char(char),
    Enter,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
}

impl Key {
    /// Parse a key token from the presentation layer.
    ///
    /// Accepts a single printable character or one of the literal tokens
    /// `Enter`, `Backspace`, `Escape`, `ArrowUp`, `ArrowDown`, `ArrowLeft`,
    /// `ArrowRight`, `Tab`. Anything else is `None` and should be ignored.
    pub fn parse(token: &str) -> Option<Key> {
        let key = match token {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Escape" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Tab" => Key::Tab,
            _ => {
                let mut chars = token.chars();
                let ch = chars.next()?;
                if chars.next().is_some() || ch.is_control() {
                    return None;
                }
                Key::Char(ch)
            },
        };
        Some(key)
    }

    /// The character carried by a `Char` key, lowercased.
    pub fn lower_char(self) -> Option<char> {
        match self {
            Key::Char(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// A grid direction, shared by the arcade programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step `(dx, dy)` with `y` growing downwards.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Map arrow keys and WASD to a direction.
    pub fn from_key(key: Key) -> Option<Direction> {
        match key {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => Some(Direction::Up),
                's' => Some(Direction::Down),
                'a' => Some(Direction::Left),
                'd' => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }
}
