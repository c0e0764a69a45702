//! Coordinate move encoding (source square, destination square, promotion)

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A board square, `a1` = 0 through `h8` = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Build a square from zero-based file (a = 0) and rank (1 = 0).
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self(rank * 8 + file))
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Self::new(file - b'a', rank - b'1'),
            _ => None,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file()),
            char::from(b'1' + self.rank())
        )
    }
}

/// Piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    fn from_char(c: u8) -> Option<Self> {
        match c {
            b'q' => Some(Promotion::Queen),
            b'r' => Some(Promotion::Rook),
            b'b' => Some(Promotion::Bishop),
            b'n' => Some(Promotion::Knight),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }
}

/// Machine encoding of one move, printed in UCI coordinate form (`e2e4`, `e7e8q`).
///
/// Independent of the human-readable notation stored next to it; both describe
/// the same transition when present.
///
/// # Examples
///
/// ```
/// use movetree::tree::{MoveCode, Promotion};
///
/// let code: MoveCode = "e7e8q".parse()?;
/// assert_eq!(code.promotion(), Some(Promotion::Queen));
/// assert_eq!(code.to_string(), "e7e8q");
/// # Ok::<(), movetree::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCode {
    from: Square,
    to: Square,
    promotion: Option<Promotion>,
}

impl MoveCode {
    pub fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn promotion(&self) -> Option<Promotion> {
        self.promotion
    }
}

impl fmt::Display for MoveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for MoveCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMoveCode {
            input: s.to_string(),
        };
        let bytes = s.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }
        let from = Square::parse(&bytes[0..2]).ok_or_else(invalid)?;
        let to = Square::parse(&bytes[2..4]).ok_or_else(invalid)?;
        if from == to {
            return Err(invalid());
        }
        let promotion = match bytes.get(4) {
            Some(&c) => Some(Promotion::from_char(c).ok_or_else(invalid)?),
            None => None,
        };
        Ok(Self::new(from, to, promotion))
    }
}

impl Serialize for MoveCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MoveCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
