//! # chesstree
//!
//! Chess games as navigable trees: a mainline plus arbitrarily nested
//! variations, with comments and numeric annotation glyphs on every
//! node, and a PGN reader/writer that round-trips its own output.
//!
//! A [`Game`] owns the tree; a [`NodeId`] is a cheap copyable cursor
//! into it. Moves can be added from parsed [`Move`] values or from
//! tokens in SAN, UCI or xboard notation, one at a time or through the
//! [`Game::play`] builder, which understands nested variation lines:
//!
//! ```
//! use chesstree::{moves, Game, Notation};
//!
//! let mut game = Game::new();
//! game.play(
//!     game.root(),
//!     &moves!["e4", "e5", ["c5", "Nf3"], "Nf3"],
//!     Notation::San,
//! )
//! .unwrap();
//! assert_eq!(game.movetext(game.root()), "1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *");
//!
//! let reparsed = Game::from_pgn(&game.pgn()).unwrap();
//! assert_eq!(reparsed.movetext(reparsed.root()), game.movetext(game.root()));
//! ```
//!
//! The chess rules themselves (legal move generation, check and draw
//! detection, the notations) live in [`chesstree_rules`] and are
//! re-exported here.

pub mod builder;
pub mod game;
pub mod nag;
pub mod parse;
pub mod pgn;
pub mod tags;

pub use builder::MoveInput;
pub use game::{Game, GameResult, Mainline, NodeId, PlayError, TreeError};
pub use parse::{Notation, NotationError};
pub use pgn::{PgnError, PgnErrorKind};
pub use tags::Tags;

pub use chesstree_rules::{
    Bitboard, CastlingRights, CastlingSide, Color, DrawReason, File, IllegalMoveError, Move,
    MoveKind, Outcome, Piece, Position, PromotePiece, Rank, Square, WinReason,
};
