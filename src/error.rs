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

//! Errors produced when parsing externally-supplied strings.

use std::fmt::{self, Display, Formatter};

/// An error produced when a FEN, square or move string cannot be parsed.
///
/// This is the only recoverable error this crate returns. Everything else
/// (an out-of-range square passed to an internal lookup, a mismatched
/// `prev_flags` passed to [`make`](crate::position::Position::make)) is a
/// programmer error and is checked with `debug_assert!` instead, per the
/// crate's error taxonomy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A field was expected but the input ran out.
    ExpectedToken,
    /// A token was present but not a valid piece, file, rank or digit.
    InvalidToken,
    /// A token was present and recognisable but out of range (e.g. a digit
    /// run in a FEN rank that overflows the board, or a promotion letter
    /// that isn't one of `nbrq`).
    ErroneousToken,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::ExpectedToken => "expected a token but found none",
            Self::InvalidToken => "found a token that isn't valid here",
            Self::ErroneousToken => "found a token that is valid but out of range",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ParseError {}
