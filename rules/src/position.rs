//! Positions as immutable snapshots.
//!
//! A [`Position`] never changes after construction; applying a move with
//! [`Position::make`] yields a new snapshot. This keeps game trees simple:
//! every node owns the position it produced and nothing is ever unmade.

use crate::bitboard::Bitboard;
use crate::moves::{Move, MoveKind};
use crate::types::{
    CastlingRights, CastlingRightsParseError, CastlingSide, Color, ColorParseError, File, Piece,
    Rank, Square, SquareParseError,
};
use crate::{attacks, movegen, zobrist};

use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Error applying a move that is not legal in the position
///
/// Carries the side to move and the size of the legal move set, so that
/// callers can report the failure without re-deriving the context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("illegal move {mv} for {side} ({legal_count} legal moves in position)")]
pub struct IllegalMoveError {
    pub mv: Move,
    pub side: Color,
    pub legal_count: usize,
}

/// Error validating a parsed position
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("no king of color {0:?}")]
    NoKing(Color),
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),
    #[error("the side not to move is in check")]
    OppositeKingInCheck,
}

/// Error parsing a position from FEN
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenParseError {
    #[error("board field missing")]
    NoBoard,
    #[error("unexpected char {0:?} in board field")]
    BadBoardChar(char),
    #[error("rank {0} does not have exactly 8 squares")]
    BadRankWidth(Rank),
    #[error("board field does not have exactly 8 ranks")]
    BadRankCount,
    #[error("side field missing")]
    NoSide,
    #[error("bad side field: {0}")]
    BadSide(#[from] ColorParseError),
    #[error("castling field missing")]
    NoCastling,
    #[error("bad castling field: {0}")]
    BadCastling(#[from] CastlingRightsParseError),
    #[error("en passant field missing")]
    NoEnPassant,
    #[error("bad en passant field: {0}")]
    BadEnPassant(#[from] SquareParseError),
    #[error("en passant square {0} on impossible rank")]
    BadEnPassantRank(Square),
    #[error("bad halfmove clock: {0}")]
    BadHalfmoveClock(ParseIntError),
    #[error("bad fullmove number: {0}")]
    BadFullmoveNumber(ParseIntError),
    #[error("extra data after FEN fields")]
    ExtraData,
    #[error("invalid position: {0}")]
    Invalid(#[from] ValidateError),
}

/// Why a finished game was won
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    Checkmate,
}

/// Why a finished game was drawn
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoves,
    Repetition,
}

/// Outcome of a finished game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Color, reason: WinReason },
    Draw(DrawReason),
}

impl Outcome {
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Win { side, .. } => Some(side),
            Outcome::Draw(_) => None,
        }
    }
}

/// Full chess state: placement, side to move, castling rights, en passant
/// target, halfmove clock and fullmove number
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    pieces: [Bitboard; Piece::COUNT],
    colors: [Bitboard; 2],
    side: Color,
    castling: CastlingRights,
    ep_target: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
}

impl Position {
    /// The standard starting position
    pub fn initial() -> Position {
        const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        INITIAL_FEN.parse().unwrap()
    }

    /// Parses a position from FEN
    ///
    /// Does the same as [`Position::from_str`], with a more discoverable
    /// name.
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        fen.parse()
    }

    /// The position as a FEN string
    pub fn as_fen(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// The en passant target square (the square a capturing pawn lands on),
    /// if an en passant capture is possible
    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    /// Half-moves since the last capture or pawn move
    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Move number, incremented after each move by Black
    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Zobrist hash over placement, side, castling rights and en passant
    /// file; the move counters are deliberately excluded so equal hashes
    /// mean repeated positions
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// All pieces of the given color and kind
    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// All pieces of the given color
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// All pieces on the board
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        if !self.occupied().contains(sq) {
            return None;
        }
        Piece::ALL
            .into_iter()
            .find(|p| self.pieces[p.index()].contains(sq))
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.colors[0].contains(sq) {
            Some(Color::White)
        } else if self.colors[1].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// The square of the king of the given color
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, Piece::King)
            .first()
            .expect("a valid position has a king of each color")
    }

    /// Whether the side to move is in check
    pub fn is_check(&self) -> bool {
        self.is_king_attacked(self.side)
    }

    /// All enemy pieces currently giving check
    pub fn checkers(&self) -> Bitboard {
        movegen::attackers(self, self.king_square(self.side), self.side.other())
    }

    pub(crate) fn is_king_attacked(&self, color: Color) -> bool {
        movegen::is_square_attacked(self, self.king_square(color), color.other())
    }

    /// Whether the side to move is checkmated
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !movegen::has_legal_moves(self)
    }

    /// Whether the side to move is stalemated
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !movegen::has_legal_moves(self)
    }

    /// Whether neither side can possibly deliver checkmate
    ///
    /// True for bare kings, king and knight versus king, and positions
    /// where every remaining piece is a bishop on one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let kings = self.pieces[Piece::King.index()];
        let rest = self.occupied() ^ kings;
        if rest.is_empty() {
            return true;
        }
        let knights = self.pieces[Piece::Knight.index()];
        if rest == knights && knights.count() == 1 {
            return true;
        }
        let bishops = self.pieces[Piece::Bishop.index()];
        if rest == bishops
            && ((bishops & Bitboard::LIGHT).is_empty() || (bishops & Bitboard::DARK).is_empty())
        {
            return true;
        }
        false
    }

    /// Whether the fifty-move rule allows claiming a draw
    pub fn is_fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Whether two positions repeat each other for the repetition rules
    /// (same placement, side to move, castling rights and en passant
    /// possibilities; move counters are ignored)
    pub fn is_same_position(&self, other: &Position) -> bool {
        self.pieces == other.pieces
            && self.colors == other.colors
            && self.side == other.side
            && self.castling == other.castling
            && self.ep_target == other.ep_target
    }

    /// The outcome forced by the position itself, if any
    ///
    /// Draws by repetition need the game history and are not detected
    /// here; see [`is_threefold_repetition`].
    pub fn outcome(&self) -> Option<Outcome> {
        if !movegen::has_legal_moves(self) {
            return Some(if self.is_check() {
                Outcome::Win {
                    side: self.side.other(),
                    reason: WinReason::Checkmate,
                }
            } else {
                Outcome::Draw(DrawReason::Stalemate)
            });
        }
        if self.is_insufficient_material() {
            return Some(Outcome::Draw(DrawReason::InsufficientMaterial));
        }
        if self.is_fifty_moves() {
            return Some(Outcome::Draw(DrawReason::FiftyMoves));
        }
        None
    }

    /// Checks that `mv` belongs to the legal move set of this position
    pub fn check_legal(&self, mv: Move) -> Result<(), IllegalMoveError> {
        let legal = movegen::legal_moves(self);
        if legal.contains(&mv) {
            Ok(())
        } else {
            Err(IllegalMoveError {
                mv,
                side: self.side,
                legal_count: legal.len(),
            })
        }
    }

    /// Applies a legal move, producing the resulting position
    ///
    /// The original position is left untouched. Fails with
    /// [`IllegalMoveError`] if `mv` is not in the legal move set.
    pub fn make(&self, mv: Move) -> Result<Position, IllegalMoveError> {
        self.check_legal(mv)?;
        Ok(self.apply_unchecked(mv))
    }

    fn put(&mut self, sq: Square, color: Color, piece: Piece) {
        self.pieces[piece.index()].insert(sq);
        self.colors[color.index()].insert(sq);
    }

    fn clear(&mut self, sq: Square) {
        for bb in self.pieces.iter_mut() {
            bb.remove(sq);
        }
        self.colors[0].remove(sq);
        self.colors[1].remove(sq);
    }

    fn strip_castling_rights(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            let rank = Rank::back_rank(color);
            if sq == Square::new(File::E, rank) {
                self.castling.unset_color(color);
            } else if sq == Square::new(File::A, rank) {
                self.castling.unset(color, CastlingSide::Queen);
            } else if sq == Square::new(File::H, rank) {
                self.castling.unset(color, CastlingSide::King);
            }
        }
    }

    /// Applies a move without legality checks; the caller guarantees the
    /// move came from this position's legal (or at least pseudo-legal)
    /// move set.
    pub(crate) fn apply_unchecked(&self, mv: Move) -> Position {
        let mut next = self.clone();
        let side = self.side;
        let moved = self.piece_at(mv.from());
        let is_capture = self.occupied_by(side.other()).contains(mv.to());
        next.ep_target = None;

        match mv.kind() {
            MoveKind::Normal => {
                let piece = moved.expect("move source square is occupied");
                next.clear(mv.to());
                next.clear(mv.from());
                next.put(mv.to(), side, piece);
                next.strip_castling_rights(mv.from());
                next.strip_castling_rights(mv.to());
                next.halfmove_clock = if is_capture || piece == Piece::Pawn {
                    0
                } else {
                    self.halfmove_clock + 1
                };
            }
            MoveKind::PawnDouble => {
                next.clear(mv.from());
                next.put(mv.to(), side, Piece::Pawn);
                next.ep_target =
                    Some(Square::from_index((mv.from().index() + mv.to().index()) / 2));
                next.halfmove_clock = 0;
            }
            MoveKind::EnPassant => {
                let taken = Square::new(mv.to().file(), mv.from().rank());
                next.clear(mv.from());
                next.clear(taken);
                next.put(mv.to(), side, Piece::Pawn);
                next.halfmove_clock = 0;
            }
            MoveKind::Castle(castle_side) => {
                let rank = Rank::back_rank(side);
                let (rook_from, rook_to) = match castle_side {
                    CastlingSide::King => (File::H, File::F),
                    CastlingSide::Queen => (File::A, File::D),
                };
                next.clear(mv.from());
                next.clear(Square::new(rook_from, rank));
                next.put(mv.to(), side, Piece::King);
                next.put(Square::new(rook_to, rank), side, Piece::Rook);
                next.castling.unset_color(side);
                next.halfmove_clock = self.halfmove_clock + 1;
            }
            MoveKind::Promotion(promote) => {
                next.clear(mv.to());
                next.clear(mv.from());
                next.put(mv.to(), side, promote.into());
                next.strip_castling_rights(mv.to());
                next.halfmove_clock = 0;
            }
        }

        next.side = side.other();
        if side == Color::Black {
            next.fullmove_number += 1;
        }
        next.normalize_ep();
        next.hash = next.compute_hash();
        next
    }

    // Drops the en passant target unless a pawn could actually capture
    // there, so repeated positions compare equal regardless of how they
    // were reached.
    fn normalize_ep(&mut self) {
        let Some(target) = self.ep_target else {
            return;
        };
        let capturers =
            self.pieces(self.side, Piece::Pawn) & attacks::pawn(self.side.other(), target);
        let taken = target.pawn_forward(self.side.other());
        let pawn_present = taken
            .map(|sq| self.pieces(self.side.other(), Piece::Pawn).contains(sq))
            .unwrap_or(false);
        if capturers.is_empty() || !pawn_present || self.occupied().contains(target) {
            self.ep_target = None;
        }
    }

    fn compute_hash(&self) -> u64 {
        let mut hash = zobrist::side_to_move(self.side) ^ zobrist::castling(self.castling);
        if let Some(target) = self.ep_target {
            hash ^= zobrist::en_passant(target.file());
        }
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in self.pieces(color, piece) {
                    hash ^= zobrist::piece(color, piece, sq);
                }
            }
        }
        hash
    }

    fn validate(&self) -> Result<(), ValidateError> {
        for color in [Color::White, Color::Black] {
            let kings = self.pieces(color, Piece::King);
            if kings.is_empty() {
                return Err(ValidateError::NoKing(color));
            }
            if kings.count() > 1 {
                return Err(ValidateError::TooManyKings(color));
            }
            if self.occupied_by(color).count() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
        }
        let pawns = self.pieces[Piece::Pawn.index()];
        let back_ranks = Bitboard::rank(Rank::R1) | Bitboard::rank(Rank::R8);
        if let Some(sq) = (pawns & back_ranks).first() {
            return Err(ValidateError::PawnOnBackRank(sq));
        }
        if self.is_king_attacked(self.side.other()) {
            return Err(ValidateError::OppositeKingInCheck);
        }
        Ok(())
    }
}

/// Whether the last position of `history` has occurred at least three
/// times in the whole history (repetition compares placement, side to
/// move, castling rights and en passant possibilities)
pub fn is_threefold_repetition<'a, I>(history: I) -> bool
where
    I: IntoIterator<Item = &'a Position>,
{
    let positions: Vec<&Position> = history.into_iter().collect();
    let Some((&last, earlier)) = positions.split_last() else {
        return false;
    };
    let repeats = 1 + earlier
        .iter()
        .filter(|pos| pos.is_same_position(last))
        .count();
    repeats >= 3
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Position({})", self)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                let sq = Square::new(file, rank);
                match (self.color_at(sq), self.piece_at(sq)) {
                    (Some(color), Some(piece)) => {
                        if empty != 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.as_fen_char(color))?;
                    }
                    _ => empty += 1,
                }
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
            if rank != Rank::R1 {
                write!(f, "/")?;
            }
        }
        write!(f, " {} {}", self.side, self.castling)?;
        match self.ep_target {
            Some(sq) => write!(f, " {}", sq)?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        let mut fields = s.split_ascii_whitespace().fuse();

        let board = fields.next().ok_or(FenParseError::NoBoard)?;
        let mut pos = Position {
            pieces: [Bitboard::EMPTY; Piece::COUNT],
            colors: [Bitboard::EMPTY; 2],
            side: Color::White,
            castling: CastlingRights::NONE,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        };

        let mut ranks = board.split('/');
        for rank in Rank::iter().rev() {
            let row = ranks.next().ok_or(FenParseError::BadRankCount)?;
            let mut file = 0_usize;
            for c in row.chars() {
                match c {
                    '1'..='8' => file += c as usize - '0' as usize,
                    _ => {
                        let (color, piece) = Piece::from_fen_char(c)
                            .ok_or(FenParseError::BadBoardChar(c))?;
                        if file >= 8 {
                            return Err(FenParseError::BadRankWidth(rank));
                        }
                        pos.put(Square::new(File::from_index(file), rank), color, piece);
                        file += 1;
                    }
                }
            }
            if file != 8 {
                return Err(FenParseError::BadRankWidth(rank));
            }
        }
        if ranks.next().is_some() {
            return Err(FenParseError::BadRankCount);
        }

        pos.side = fields.next().ok_or(FenParseError::NoSide)?.parse()?;
        pos.castling = fields.next().ok_or(FenParseError::NoCastling)?.parse()?;

        let ep = fields.next().ok_or(FenParseError::NoEnPassant)?;
        if ep != "-" {
            let target: Square = ep.parse()?;
            if target.rank() != Rank::en_passant_rank(pos.side) {
                return Err(FenParseError::BadEnPassantRank(target));
            }
            pos.ep_target = Some(target);
        }

        if let Some(field) = fields.next() {
            pos.halfmove_clock = field.parse().map_err(FenParseError::BadHalfmoveClock)?;
        }
        if let Some(field) = fields.next() {
            pos.fullmove_number = field.parse().map_err(FenParseError::BadFullmoveNumber)?;
        }
        if fields.next().is_some() {
            return Err(FenParseError::ExtraData);
        }

        // Quietly drop castling rights whose king or rook has moved away,
        // the way lenient FEN readers do.
        for color in [Color::White, Color::Black] {
            let rank = Rank::back_rank(color);
            if pos.pieces(color, Piece::King) != Bitboard::from_square(Square::new(File::E, rank)) {
                pos.castling.unset_color(color);
            } else {
                if !pos.pieces(color, Piece::Rook).contains(Square::new(File::A, rank)) {
                    pos.castling.unset(color, CastlingSide::Queen);
                }
                if !pos.pieces(color, Piece::Rook).contains(Square::new(File::H, rank)) {
                    pos.castling.unset(color, CastlingSide::King);
                }
            }
        }

        pos.validate()?;
        pos.normalize_ep();
        pos.hash = pos.compute_hash();
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    #[test]
    fn test_initial() {
        const INITIAL: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let pos = Position::initial();
        assert_eq!(pos.as_fen(), INITIAL);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::FULL);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert_eq!(pos.king_square(Color::White).to_string(), "e1");
        assert_eq!(pos.king_square(Color::Black).to_string(), "e8");
        assert!(!pos.is_check());
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 6 5",
            "8/2k5/8/8/8/3K4/8/8 w - - 12 40",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.as_fen(), fen);
        }
    }

    #[test]
    fn test_fen_defaults_and_errors() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);

        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w -"),
            Err(FenParseError::NoEnPassant)
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3"),
            Err(FenParseError::NoSide)
        );
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/3K4/8 w - -"),
            Err(FenParseError::BadRankCount)
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra"),
            Err(FenParseError::ExtraData)
        ));
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - -"),
            Err(FenParseError::Invalid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Position::from_fen("4k3/P7/8/8/8/8/8/4K2P w - -"),
            Err(FenParseError::Invalid(ValidateError::PawnOnBackRank(
                Square::new(File::H, Rank::R1)
            )))
        );
        // White to move while the white rook already attacks the black king
        assert_eq!(
            Position::from_fen("R3k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenParseError::Invalid(ValidateError::OppositeKingInCheck))
        );
    }

    #[test]
    fn test_fen_fixes() {
        // Castling rights dropped when rooks or kings are displaced
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K1R1 w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_string(), "Qkq");

        let pos = Position::from_fen("r3k2r/8/8/8/8/8/3K4/R6R w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_string(), "kq");

        // En passant target without a capturer is dropped
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(pos.en_passant_target(), None);
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(pos.en_passant_target().map(|s| s.to_string()), Some("d6".into()));
    }

    #[test]
    fn test_make_sequence() {
        // Scholar's mate, checking the FEN after every move
        let mut pos = Position::initial();
        for (uci, fen) in [
            (
                "e2e4",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            ),
            (
                "e7e5",
                "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            ),
            (
                "f1c4",
                "rnbqkbnr/pppp1ppp/8/4p3/2B1P3/8/PPPP1PPP/RNBQK1NR b KQkq - 1 2",
            ),
            (
                "b8c6",
                "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 2 3",
            ),
            (
                "d1h5",
                "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
            ),
            (
                "g8f6",
                "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
            ),
            (
                "h5f7",
                "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4",
            ),
        ] {
            let mv = Move::from_uci(uci, &pos).unwrap();
            pos = pos.make(mv).unwrap();
            assert_eq!(pos.as_fen(), fen);
        }
        assert!(pos.is_check());
        assert!(pos.is_checkmate());
        assert_eq!(
            pos.outcome(),
            Some(Outcome::Win {
                side: Color::White,
                reason: WinReason::Checkmate
            })
        );
    }

    #[test]
    fn test_castling_make() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = pos
            .make(Move::castle(Color::White, CastlingSide::King))
            .unwrap();
        assert_eq!(next.as_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        let next = pos
            .make(Move::castle(Color::White, CastlingSide::Queen))
            .unwrap();
        assert_eq!(next.as_fen(), "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");
    }

    #[test]
    fn test_en_passant_make() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let mv = Move::from_uci("e5d6", &pos).unwrap();
        let next = pos.make(mv).unwrap();
        assert_eq!(next.as_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 2");
    }

    #[test]
    fn test_illegal_move_error() {
        let pos = Position::initial();
        let mv = Move::classify(
            Square::new(File::E, Rank::R2),
            Square::new(File::E, Rank::R5),
            None,
            &pos,
        );
        let err = pos.make(mv).unwrap_err();
        assert_eq!(err.side, Color::White);
        assert_eq!(err.legal_count, 20);
    }

    #[test]
    fn test_outcome() {
        // Stalemate
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(pos.is_stalemate());
        assert_eq!(pos.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));

        // Bare kings
        let pos = Position::from_fen("8/2k5/8/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(pos.is_insufficient_material());
        assert_eq!(
            pos.outcome(),
            Some(Outcome::Draw(DrawReason::InsufficientMaterial))
        );

        // King and knight versus king
        let pos = Position::from_fen("8/2k5/8/8/5N2/3K4/8/8 w - - 0 1").unwrap();
        assert!(pos.is_insufficient_material());

        // Two knights are not automatically a draw
        let pos = Position::from_fen("8/2k5/8/8/4NN2/3K4/8/8 w - - 0 1").unwrap();
        assert!(!pos.is_insufficient_material());

        // Same-colored bishops
        let pos = Position::from_fen("8/2k5/8/8/2B1B3/3K4/8/8 w - - 0 1").unwrap();
        assert!(pos.is_insufficient_material());

        // Opposite-colored bishops can still mate
        let pos = Position::from_fen("8/2k5/8/8/2BB4/3K4/8/8 w - - 0 1").unwrap();
        assert!(!pos.is_insufficient_material());

        // Fifty-move rule
        let pos = Position::from_fen("8/2k5/8/8/5R2/3K4/8/8 w - - 100 80").unwrap();
        assert!(pos.is_fifty_moves());
        assert_eq!(pos.outcome(), Some(Outcome::Draw(DrawReason::FiftyMoves)));
        let pos = Position::from_fen("8/2k5/8/8/5R2/3K4/8/8 w - - 99 80").unwrap();
        assert_eq!(pos.outcome(), None);
    }

    #[test]
    fn test_threefold() {
        let mut history = vec![Position::initial()];
        for _ in 0..2 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                let last = history.last().unwrap();
                let mv = Move::from_uci(uci, last).unwrap();
                history.push(last.make(mv).unwrap());
            }
        }
        assert!(is_threefold_repetition(history.iter()));
        assert!(!is_threefold_repetition(history[..history.len() - 1].iter()));
    }
}
