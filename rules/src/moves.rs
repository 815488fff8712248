//! Moves and their coordinate notations (UCI and xboard).

use crate::position::{IllegalMoveError, Position};
use crate::types::{
    CastlingSide, Color, File, Piece, PromotePiece, Rank, Square, SquareParseError,
};

use std::fmt;

use thiserror::Error;

/// What a move does, beyond moving a piece from one square to another
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Any move without special rules, including plain pawn pushes and captures
    Normal,
    /// Pawn double push from its starting rank
    PawnDouble,
    /// En passant capture; the captured pawn is not on the destination square
    EnPassant,
    /// Castling; `from`/`to` hold the king's path
    Castle(CastlingSide),
    /// Pawn promotion, possibly capturing
    Promotion(PromotePiece),
}

/// A move, always interpreted relative to some [`Position`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    from: Square,
    to: Square,
}

/// Error parsing a move in UCI or xboard coordinate notation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UciParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source square: {0}")]
    BadFrom(SquareParseError),
    #[error("bad destination square: {0}")]
    BadTo(SquareParseError),
    #[error("bad promotion char {0:?}")]
    BadPromotion(char),
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}

impl Move {
    pub const fn new(kind: MoveKind, from: Square, to: Square) -> Move {
        Move { kind, from, to }
    }

    /// The castling move of `color` to `side`
    pub const fn castle(color: Color, side: CastlingSide) -> Move {
        let rank = Rank::back_rank(color);
        let to_file = match side {
            CastlingSide::King => File::G,
            CastlingSide::Queen => File::C,
        };
        Move {
            kind: MoveKind::Castle(side),
            from: Square::new(File::E, rank),
            to: Square::new(to_file, rank),
        }
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn promotion(self) -> Option<PromotePiece> {
        match self.kind {
            MoveKind::Promotion(p) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub const fn castling_side(self) -> Option<CastlingSide> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            _ => None,
        }
    }

    /// Whether the move takes a piece in the given position
    pub fn is_capture(self, pos: &Position) -> bool {
        self.kind == MoveKind::EnPassant || pos.piece_at(self.to).is_some()
    }

    /// Whether the move is legal in the given position
    pub fn is_legal(self, pos: &Position) -> bool {
        crate::movegen::legal_moves(pos).contains(&self)
    }

    /// Parses UCI coordinate notation (`e2e4`, `e7e8q`) against a position
    ///
    /// The position determines the special-move classification (double
    /// push, en passant, castling written as the king's two-square jump)
    /// and is used to reject illegal moves.
    pub fn from_uci(s: &str, pos: &Position) -> Result<Move, UciParseError> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(UciParseError::BadLength);
        }
        let from: Square = s[0..2].parse().map_err(UciParseError::BadFrom)?;
        let to: Square = s[2..4].parse().map_err(UciParseError::BadTo)?;
        let promotion = match s.as_bytes().get(4) {
            Some(&b) => Some(
                PromotePiece::from_char(b as char).ok_or(UciParseError::BadPromotion(b as char))?,
            ),
            None => None,
        };
        let mv = Move::classify(from, to, promotion, pos);
        pos.check_legal(mv)?;
        Ok(mv)
    }

    /// Parses xboard move notation against a position
    ///
    /// This is the UCI coordinate grammar, with castling additionally
    /// accepted as `O-O`/`O-O-O` (or with zeros) and promotion letters
    /// accepted in either case.
    pub fn from_xboard(s: &str, pos: &Position) -> Result<Move, UciParseError> {
        match s {
            "O-O" | "0-0" => {
                let mv = Move::castle(pos.side_to_move(), CastlingSide::King);
                pos.check_legal(mv)?;
                return Ok(mv);
            }
            "O-O-O" | "0-0-0" => {
                let mv = Move::castle(pos.side_to_move(), CastlingSide::Queen);
                pos.check_legal(mv)?;
                return Ok(mv);
            }
            _ => {}
        }
        if s.len() == 5 && s.as_bytes()[4].is_ascii_uppercase() {
            let mut lowered = s.to_owned();
            lowered[4..5].make_ascii_lowercase();
            return Move::from_uci(&lowered, pos);
        }
        Move::from_uci(s, pos)
    }

    /// Builds a move from bare squares, letting the position decide the kind
    pub(crate) fn classify(
        from: Square,
        to: Square,
        promotion: Option<PromotePiece>,
        pos: &Position,
    ) -> Move {
        if let Some(p) = promotion {
            return Move::new(MoveKind::Promotion(p), from, to);
        }
        let side = pos.side_to_move();
        match pos.piece_at(from) {
            Some(Piece::Pawn) if pos.color_at(from) == Some(side) => {
                if from.rank().index().abs_diff(to.rank().index()) == 2 {
                    return Move::new(MoveKind::PawnDouble, from, to);
                }
                if from.file() != to.file() && pos.piece_at(to).is_none() {
                    return Move::new(MoveKind::EnPassant, from, to);
                }
            }
            Some(Piece::King) if pos.color_at(from) == Some(side) => {
                let rank = Rank::back_rank(side);
                if from == Square::new(File::E, rank) {
                    if to == Square::new(File::G, rank) {
                        return Move::castle(side, CastlingSide::King);
                    }
                    if to == Square::new(File::C, rank) {
                        return Move::castle(side, CastlingSide::Queen);
                    }
                }
            }
            _ => {}
        }
        Move::new(MoveKind::Normal, from, to)
    }

    /// The move in UCI coordinate notation
    ///
    /// Does the same as `to_string()`, with a more discoverable name.
    pub fn uci(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion() {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}
