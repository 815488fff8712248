//! # Chess rules engine for `chesstree`
//!
//! Board vocabulary, legal move generation and the three move notations
//! (SAN, UCI, xboard) behind the `chesstree` game-tree crate. Positions
//! are immutable snapshots: [`Position::make`] returns a new position and
//! never mutates the old one, which is what lets a game tree share
//! positions freely between nodes.
//!
//! Normally you want the `chesstree` crate, which re-exports everything
//! here. Use this crate directly only when you need the rules engine
//! without the tree and PGN layers.

pub mod attacks;
pub mod bitboard;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod san;
pub mod types;

mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{legal_moves, MoveList};
pub use moves::{Move, MoveKind, UciParseError};
pub use position::{
    is_threefold_repetition, DrawReason, FenParseError, IllegalMoveError, Outcome, Position,
    WinReason,
};
pub use san::{San, SanMove};
pub use types::{
    CastlingRights, CastlingSide, Color, File, Piece, PromotePiece, Rank, Square,
};
