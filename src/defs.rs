/*
 * crab_core, a chess move generation core
 * Copyright (C) 2024 Jasper Shovelton
 *
 * crab_core is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * crab_core is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with crab_core. If not, see <https://www.gnu.org/licenses/>.
 */

//! Core enumerations and square/coordinate geometry.
//!
//! Every numeric code in this file is load-bearing: [`Color`] and
//! [`PieceKind`] index fixed-size tables throughout the crate, so their
//! associated constants must keep the exact values documented on them.

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::ParseError;

/// A cardinal or intercardinal direction, expressed as the square-index
/// delta it adds.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Direction(pub i8);

/// A file: file a = 0 to file h = 7.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct File(pub u8);

/// A rank: rank 1 = 0 to rank 8 = 7.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Rank(pub u8);

/// A side to move.
///
/// `WHITE = 0`, `BLACK = 1`, matching bit 7 of [`Position`](crate::position::Position)'s
/// flags word (0 = white to move, 1 = black to move).
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Color(pub u8);

/// A kind of piece, independent of color.
///
/// `KING=0, PAWN=1, KNIGHT=2, ROOK=3, BISHOP=4, QUEEN=5`. These indices are
/// used directly as array keys for `piece_occ` and every attack table in
/// the crate.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct PieceKind(pub u8);

/// A square 0..=63, plus the sentinel [`Square::INVALID`].
///
/// Little-endian rank-file mapping: a1 = 0, b1 = 1, ..., h1 = 7, a2 = 8, ...,
/// h8 = 63.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Square(pub u8);

#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl Direction {
    pub const NORTH: Self = Self(8);
    pub const SOUTH: Self = Self(-8);
    pub const EAST: Self = Self(1);
    pub const WEST: Self = Self(-1);
    pub const NORTH_EAST: Self = Self(9);
    pub const NORTH_WEST: Self = Self(7);
    pub const SOUTH_EAST: Self = Self(-7);
    pub const SOUTH_WEST: Self = Self(-9);
}

#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl File {
    pub const FILE_A: Self = Self(0);
    pub const FILE_B: Self = Self(1);
    pub const FILE_C: Self = Self(2);
    pub const FILE_D: Self = Self(3);
    pub const FILE_E: Self = Self(4);
    pub const FILE_F: Self = Self(5);
    pub const FILE_G: Self = Self(6);
    pub const FILE_H: Self = Self(7);
    pub const TOTAL: usize = 8;
}

#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl Rank {
    pub const RANK_1: Self = Self(0);
    pub const RANK_2: Self = Self(1);
    pub const RANK_3: Self = Self(2);
    pub const RANK_4: Self = Self(3);
    pub const RANK_5: Self = Self(4);
    pub const RANK_6: Self = Self(5);
    pub const RANK_7: Self = Self(6);
    pub const RANK_8: Self = Self(7);
    pub const TOTAL: usize = 8;
}

impl Color {
    /// See the module docs: these values index `color_occ` and the flags
    /// side-to-move bit directly.
    pub const WHITE: Self = Self(0);
    /// See [`Self::WHITE`].
    pub const BLACK: Self = Self(1);
    /// Number of colors.
    pub const TOTAL: usize = 2;

    /// Returns the opposite color.
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Converts the color to a `usize` array index.
    #[inline]
    #[must_use]
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl PieceKind {
    /// See the module docs: these values index `piece_occ` and every
    /// attack table directly.
    pub const KING: Self = Self(0);
    /// See [`Self::KING`].
    pub const PAWN: Self = Self(1);
    /// See [`Self::KING`].
    pub const KNIGHT: Self = Self(2);
    /// See [`Self::KING`].
    pub const ROOK: Self = Self(3);
    /// See [`Self::KING`].
    pub const BISHOP: Self = Self(4);
    /// See [`Self::KING`].
    pub const QUEEN: Self = Self(5);
    /// Number of piece kinds.
    pub const TOTAL: usize = 6;

    /// Converts the piece kind to a `usize` array index.
    #[inline]
    #[must_use]
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }

    /// Converts a FEN/move-string promotion letter (`n`, `b`, `r`, `q`,
    /// case-insensitive) into a piece kind.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidToken`] if `letter` isn't one of those
    /// four.
    pub fn from_promotion_letter(letter: char) -> Result<Self, ParseError> {
        Ok(match letter.to_ascii_lowercase() {
            'n' => Self::KNIGHT,
            'b' => Self::BISHOP,
            'r' => Self::ROOK,
            'q' => Self::QUEEN,
            _ => return Err(ParseError::InvalidToken),
        })
    }

    /// Converts the piece kind to its lowercase FEN/promotion letter.
    #[must_use]
    pub const fn to_letter(self) -> char {
        match self.0 {
            0 => 'k',
            1 => 'p',
            2 => 'n',
            3 => 'r',
            4 => 'b',
            5 => 'q',
            _ => '?',
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = ParseError;

    /// Converts a FEN piece letter (either case) into a piece kind.
    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Ok(match letter.to_ascii_lowercase() {
            'k' => Self::KING,
            'p' => Self::PAWN,
            'n' => Self::KNIGHT,
            'r' => Self::ROOK,
            'b' => Self::BISHOP,
            'q' => Self::QUEEN,
            _ => return Err(ParseError::InvalidToken),
        })
    }
}

#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl Square {
    pub const A1: Self = Self(0);
    pub const B1: Self = Self(1);
    pub const C1: Self = Self(2);
    pub const D1: Self = Self(3);
    pub const E1: Self = Self(4);
    pub const F1: Self = Self(5);
    pub const G1: Self = Self(6);
    pub const H1: Self = Self(7);
    pub const A2: Self = Self(8);
    pub const B2: Self = Self(9);
    pub const C2: Self = Self(10);
    pub const D2: Self = Self(11);
    pub const E2: Self = Self(12);
    pub const F2: Self = Self(13);
    pub const G2: Self = Self(14);
    pub const H2: Self = Self(15);
    pub const A3: Self = Self(16);
    pub const B3: Self = Self(17);
    pub const C3: Self = Self(18);
    pub const D3: Self = Self(19);
    pub const E3: Self = Self(20);
    pub const F3: Self = Self(21);
    pub const G3: Self = Self(22);
    pub const H3: Self = Self(23);
    pub const A4: Self = Self(24);
    pub const B4: Self = Self(25);
    pub const C4: Self = Self(26);
    pub const D4: Self = Self(27);
    pub const E4: Self = Self(28);
    pub const F4: Self = Self(29);
    pub const G4: Self = Self(30);
    pub const H4: Self = Self(31);
    pub const A5: Self = Self(32);
    pub const B5: Self = Self(33);
    pub const C5: Self = Self(34);
    pub const D5: Self = Self(35);
    pub const E5: Self = Self(36);
    pub const F5: Self = Self(37);
    pub const G5: Self = Self(38);
    pub const H5: Self = Self(39);
    pub const A6: Self = Self(40);
    pub const B6: Self = Self(41);
    pub const C6: Self = Self(42);
    pub const D6: Self = Self(43);
    pub const E6: Self = Self(44);
    pub const F6: Self = Self(45);
    pub const G6: Self = Self(46);
    pub const H6: Self = Self(47);
    pub const A7: Self = Self(48);
    pub const B7: Self = Self(49);
    pub const C7: Self = Self(50);
    pub const D7: Self = Self(51);
    pub const E7: Self = Self(52);
    pub const F7: Self = Self(53);
    pub const G7: Self = Self(54);
    pub const H7: Self = Self(55);
    pub const A8: Self = Self(56);
    pub const B8: Self = Self(57);
    pub const C8: Self = Self(58);
    pub const D8: Self = Self(59);
    pub const E8: Self = Self(60);
    pub const F8: Self = Self(61);
    pub const G8: Self = Self(62);
    pub const H8: Self = Self(63);
}

impl Square {
    /// The sentinel value for "no square". `255` per spec.
    pub const INVALID: Self = Self(255);
    /// Number of real squares on the board.
    pub const TOTAL: usize = 64;

    /// Builds a square from a file and rank.
    #[inline]
    #[must_use]
    pub const fn from_file_rank(file: File, rank: Rank) -> Self {
        Self(rank.0 * 8 + file.0)
    }

    /// The file this square is on.
    #[inline]
    #[must_use]
    pub const fn file(self) -> File {
        File(self.0 & 7)
    }

    /// The rank this square is on.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Converts the square to a `usize` array index.
    #[inline]
    #[must_use]
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl From<File> for char {
    fn from(file: File) -> Self {
        (b'a' + file.0) as Self
    }
}

impl From<Rank> for char {
    fn from(rank: Rank) -> Self {
        (b'1' + rank.0) as Self
    }
}

impl From<Color> for char {
    /// `'w'` for white, `'b'` for black; undefined for other values.
    fn from(color: Color) -> Self {
        if color == Color::WHITE {
            'w'
        } else {
            'b'
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(Self::WHITE),
            "b" => Ok(Self::BLACK),
            _ => Err(ParseError::InvalidToken),
        }
    }
}

impl Add<Direction> for Square {
    type Output = Self;

    fn add(self, rhs: Direction) -> Self::Output {
        Self(self.0.wrapping_add_signed(rhs.0))
    }
}

impl Sub<Direction> for Square {
    type Output = Self;

    fn sub(self, rhs: Direction) -> Self::Output {
        Self(self.0.wrapping_add_signed(-rhs.0))
    }
}

impl Display for Square {
    /// Renders the square as algebraic notation (e.g. `"e4"`), or `"-"` for
    /// [`Square::INVALID`].
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            f.write_str("-")
        } else {
            write!(f, "{}{}", char::from(self.file()), char::from(self.rank()))
        }
    }
}

impl FromStr for Square {
    type Err = ParseError;

    /// Parses algebraic notation (`[a-h][1-8]`, case-insensitive), or `"-"`
    /// for [`Square::INVALID`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Self::INVALID);
        }

        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::ErroneousToken);
        }

        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) {
            return Err(ParseError::ErroneousToken);
        }
        if !(b'1'..=b'8').contains(&rank) {
            return Err(ParseError::ErroneousToken);
        }

        Ok(Self::from_file_rank(File(file - b'a'), Rank(rank - b'1')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_round_trips_through_algebraic_notation() {
        for raw in 0..64u8 {
            let square = Square(raw);
            let text = square.to_string();
            assert_eq!(text.parse::<Square>().unwrap(), square);
        }
    }

    #[test]
    fn invalid_square_round_trips_as_dash() {
        assert_eq!(Square::INVALID.to_string(), "-");
        assert_eq!("-".parse::<Square>().unwrap(), Square::INVALID);
    }

    #[test]
    fn file_and_rank_extraction() {
        let e4 = Square::from_file_rank(File::FILE_E, Rank::RANK_4);
        assert_eq!(e4.file(), File::FILE_E);
        assert_eq!(e4.rank(), Rank::RANK_4);
    }

    #[test]
    fn piece_kind_numeric_codes_are_load_bearing() {
        assert_eq!(PieceKind::KING.0, 0);
        assert_eq!(PieceKind::PAWN.0, 1);
        assert_eq!(PieceKind::KNIGHT.0, 2);
        assert_eq!(PieceKind::ROOK.0, 3);
        assert_eq!(PieceKind::BISHOP.0, 4);
        assert_eq!(PieceKind::QUEEN.0, 5);
        assert_eq!(Color::WHITE.0, 0);
        assert_eq!(Color::BLACK.0, 1);
    }

    #[test]
    fn promotion_letters_round_trip() {
        for letter in ['n', 'b', 'r', 'q'] {
            let kind = PieceKind::from_promotion_letter(letter).unwrap();
            assert_eq!(kind.to_letter(), letter);
        }
    }
}
