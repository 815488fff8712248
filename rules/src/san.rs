//! Standard Algebraic Notation.

use crate::moves::{Move, MoveKind};
use crate::movegen;
use crate::position::{IllegalMoveError, Position};
use crate::types::{
    CastlingSide, File, Piece, PromotePiece, Rank, Square, SquareParseError,
};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the textual form of a SAN move
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("string is empty")]
    Empty,
    #[error("bad destination square: {0}")]
    BadSquare(#[from] SquareParseError),
    #[error("malformed SAN move")]
    Syntax,
}

/// Error resolving a parsed SAN move against a position
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No legal move matches the description
    #[error("no matching legal move")]
    NotFound,
    /// More than one legal move matches the description
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguous(Move, Move),
    /// A capture sign was given but the described move captures nothing
    #[error("capture sign on a non-capture move")]
    NotACapture,
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}

/// Error parsing a [`Move`] from a SAN string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("cannot parse move: {0}")]
    Parse(#[from] ParseError),
    #[error("cannot resolve move: {0}")]
    Resolve(#[from] ResolveError),
}

/// Check indication appended to a SAN move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CheckMark {
    /// `+`
    Check,
    /// `#`
    Checkmate,
}

/// The move description part of a SAN token, without a check mark
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum San {
    Castle(CastlingSide),
    PawnPush {
        to: Square,
        promotion: Option<PromotePiece>,
    },
    PawnCapture {
        from_file: File,
        to: Square,
        promotion: Option<PromotePiece>,
    },
    Piece {
        piece: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        capture: bool,
        to: Square,
    },
}

/// A full SAN token: move description plus an optional check mark
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SanMove {
    pub san: San,
    pub check: Option<CheckMark>,
}

impl San {
    /// Renders `mv` with minimal disambiguation, per the SAN rules:
    /// a qualifier is added only when another legal move of the same
    /// piece kind shares the destination, and the file qualifier wins
    /// unless it fails to disambiguate.
    pub fn from_move(mv: Move, pos: &Position) -> San {
        if let Some(side) = mv.castling_side() {
            return San::Castle(side);
        }
        let is_pawn = matches!(
            mv.kind(),
            MoveKind::PawnDouble | MoveKind::EnPassant | MoveKind::Promotion(_)
        ) || pos.piece_at(mv.from()) == Some(Piece::Pawn);
        if is_pawn {
            return if mv.from().file() == mv.to().file() {
                San::PawnPush {
                    to: mv.to(),
                    promotion: mv.promotion(),
                }
            } else {
                San::PawnCapture {
                    from_file: mv.from().file(),
                    to: mv.to(),
                    promotion: mv.promotion(),
                }
            };
        }

        let piece = pos
            .piece_at(mv.from())
            .expect("move source square is occupied");
        let mut from_file = None;
        let mut from_rank = None;
        let others: Vec<Move> = movegen::san_candidates(pos, piece, mv.to())
            .into_iter()
            .filter(|&other| other != mv)
            .collect();
        if !others.is_empty() {
            if others.iter().all(|o| o.from().file() != mv.from().file()) {
                from_file = Some(mv.from().file());
            } else if others.iter().all(|o| o.from().rank() != mv.from().rank()) {
                from_rank = Some(mv.from().rank());
            } else {
                from_file = Some(mv.from().file());
                from_rank = Some(mv.from().rank());
            }
        }
        San::Piece {
            piece,
            from_file,
            from_rank,
            capture: mv.is_capture(pos),
            to: mv.to(),
        }
    }

    /// Resolves the description to the unique matching legal move
    pub fn to_move(self, pos: &Position) -> Result<Move, ResolveError> {
        match self {
            San::Castle(side) => {
                let mv = Move::castle(pos.side_to_move(), side);
                pos.check_legal(mv)?;
                Ok(mv)
            }
            San::PawnPush { to, promotion } => movegen::legal_moves(pos)
                .into_iter()
                .find(|mv| {
                    pos.piece_at(mv.from()) == Some(Piece::Pawn)
                        && mv.to() == to
                        && mv.from().file() == to.file()
                        && mv.promotion() == promotion
                })
                .ok_or(ResolveError::NotFound),
            San::PawnCapture {
                from_file,
                to,
                promotion,
            } => movegen::legal_moves(pos)
                .into_iter()
                .find(|mv| {
                    pos.piece_at(mv.from()) == Some(Piece::Pawn)
                        && mv.to() == to
                        && mv.from().file() == from_file
                        && mv.from().file() != to.file()
                        && mv.promotion() == promotion
                })
                .ok_or(ResolveError::NotFound),
            San::Piece {
                piece,
                from_file,
                from_rank,
                capture,
                to,
            } => {
                if capture && pos.piece_at(to).is_none() {
                    return Err(ResolveError::NotACapture);
                }
                let mut candidates = movegen::san_candidates(pos, piece, to).into_iter().filter(
                    |mv| {
                        from_file.map_or(true, |f| mv.from().file() == f)
                            && from_rank.map_or(true, |r| mv.from().rank() == r)
                    },
                );
                let first = candidates.next().ok_or(ResolveError::NotFound)?;
                match candidates.next() {
                    Some(second) => Err(ResolveError::Ambiguous(first, second)),
                    None => Ok(first),
                }
            }
        }
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            San::Castle(CastlingSide::King) => write!(f, "O-O"),
            San::Castle(CastlingSide::Queen) => write!(f, "O-O-O"),
            San::PawnPush { to, promotion } => {
                write!(f, "{}", to)?;
                if let Some(p) = promotion {
                    write!(f, "={}", Piece::from(p).as_upper_char())?;
                }
                Ok(())
            }
            San::PawnCapture {
                from_file,
                to,
                promotion,
            } => {
                write!(f, "{}x{}", from_file.as_char(), to)?;
                if let Some(p) = promotion {
                    write!(f, "={}", Piece::from(p).as_upper_char())?;
                }
                Ok(())
            }
            San::Piece {
                piece,
                from_file,
                from_rank,
                capture,
                to,
            } => {
                write!(f, "{}", piece.as_upper_char())?;
                if let Some(file) = from_file {
                    write!(f, "{}", file.as_char())?;
                }
                if let Some(rank) = from_rank {
                    write!(f, "{}", rank.as_char())?;
                }
                if capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", to)
            }
        }
    }
}

impl SanMove {
    /// Renders `mv` in the given position, with a `+`/`#` mark when the
    /// move gives check or mate
    pub fn from_move(mv: Move, pos: &Position) -> Result<SanMove, IllegalMoveError> {
        let san = San::from_move(mv, pos);
        let next = pos.make(mv)?;
        let check = if next.is_check() {
            if movegen::has_legal_moves(&next) {
                Some(CheckMark::Check)
            } else {
                Some(CheckMark::Checkmate)
            }
        } else {
            None
        };
        Ok(SanMove { san, check })
    }

    /// Resolves to the unique matching legal move; the check mark is not
    /// verified against the position
    pub fn to_move(self, pos: &Position) -> Result<Move, ResolveError> {
        self.san.to_move(pos)
    }
}

impl fmt::Display for SanMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.san)?;
        match self.check {
            Some(CheckMark::Check) => write!(f, "+"),
            Some(CheckMark::Checkmate) => write!(f, "#"),
            None => Ok(()),
        }
    }
}

impl FromStr for SanMove {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<SanMove, ParseError> {
        let (s, check) = match s.strip_suffix('#') {
            Some(rest) => (rest, Some(CheckMark::Checkmate)),
            None => match s.strip_suffix("++").or_else(|| s.strip_suffix('+')) {
                Some(rest) => (rest, Some(CheckMark::Check)),
                None => (s, None),
            },
        };
        Ok(SanMove {
            san: s.parse()?,
            check,
        })
    }
}

impl FromStr for San {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<San, ParseError> {
        match s {
            "" => return Err(ParseError::Empty),
            "O-O" | "0-0" => return Ok(San::Castle(CastlingSide::King)),
            "O-O-O" | "0-0-0" => return Ok(San::Castle(CastlingSide::Queen)),
            _ => {}
        }
        if !s.is_ascii() {
            return Err(ParseError::Syntax);
        }
        let bytes = s.as_bytes();

        if let first @ (b'N' | b'B' | b'R' | b'Q' | b'K') = bytes[0] {
            let piece = match first {
                b'N' => Piece::Knight,
                b'B' => Piece::Bishop,
                b'R' => Piece::Rook,
                b'Q' => Piece::Queen,
                _ => Piece::King,
            };
            let rest = &bytes[1..];
            if rest.len() < 2 {
                return Err(ParseError::Syntax);
            }
            let (qualifiers, dest) = rest.split_at(rest.len() - 2);
            let to: Square = std::str::from_utf8(dest)
                .map_err(|_| ParseError::Syntax)?
                .parse()?;
            let (from_file, qualifiers) = match qualifiers.first() {
                Some(&b @ b'a'..=b'h') => (File::from_char(b as char), &qualifiers[1..]),
                _ => (None, qualifiers),
            };
            let (from_rank, qualifiers) = match qualifiers.first() {
                Some(&b @ b'1'..=b'8') => (Rank::from_char(b as char), &qualifiers[1..]),
                _ => (None, qualifiers),
            };
            let (capture, qualifiers) = match qualifiers.first() {
                Some(b'x' | b':') => (true, &qualifiers[1..]),
                _ => (false, qualifiers),
            };
            if !qualifiers.is_empty() {
                return Err(ParseError::Syntax);
            }
            return Ok(San::Piece {
                piece,
                from_file,
                from_rank,
                capture,
                to,
            });
        }

        // Pawn move; a trailing promotion piece may come with or without '='
        let (promotion, bytes) = match bytes.split_last() {
            Some((&b @ (b'N' | b'B' | b'R' | b'Q'), rest)) => {
                let promote = match b {
                    b'N' => PromotePiece::Knight,
                    b'B' => PromotePiece::Bishop,
                    b'R' => PromotePiece::Rook,
                    _ => PromotePiece::Queen,
                };
                let rest = match rest.split_last() {
                    Some((b'=', stripped)) => stripped,
                    _ => rest,
                };
                (Some(promote), rest)
            }
            _ => (None, bytes),
        };

        match bytes.len() {
            2 => Ok(San::PawnPush {
                to: std::str::from_utf8(bytes)
                    .map_err(|_| ParseError::Syntax)?
                    .parse()?,
                promotion,
            }),
            4 if matches!(bytes[1], b'x' | b':') => {
                let from_file =
                    File::from_char(bytes[0] as char).ok_or(ParseError::Syntax)?;
                let to: Square = std::str::from_utf8(&bytes[2..4])
                    .map_err(|_| ParseError::Syntax)?
                    .parse()?;
                Ok(San::PawnCapture {
                    from_file,
                    to,
                    promotion,
                })
            }
            _ => Err(ParseError::Syntax),
        }
    }
}

impl Move {
    /// Parses a SAN string and resolves it in the given position
    pub fn from_san(s: &str, pos: &Position) -> Result<Move, Error> {
        let san: SanMove = s.parse().map_err(Error::Parse)?;
        Ok(san.to_move(pos)?)
    }

    /// Renders the move as SAN for the given position
    pub fn san(self, pos: &Position) -> Result<SanMove, IllegalMoveError> {
        SanMove::from_move(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_opening_round_trip() {
        let mut pos = Position::initial();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "O-O", "Nf6", "Re1"] {
            let mv = Move::from_san(san, &pos).unwrap();
            assert_eq!(mv.san(&pos).unwrap().to_string(), san);
            pos = pos.make(mv).unwrap();
        }
        assert_eq!(
            pos.as_fen(),
            "r1bqkb1r/1ppp1ppp/p1n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQR1K1 b kq - 3 5"
        );
    }

    #[test]
    fn test_disambiguation() {
        for (fen, uci, san) in [
            ("4k3/6K1/8/2N5/8/8/8/N7 w - - 0 1", "a1b3", "Nab3"),
            ("4k3/6K1/8/N7/8/8/8/N7 w - - 0 1", "a1b3", "N1b3"),
            ("4k3/6K1/8/N1N5/8/8/8/N1N5 w - - 0 1", "a1b3", "Na1b3"),
            ("4k3/6K1/8/2N5/8/1r6/8/N7 w - - 0 1", "a1b3", "Naxb3"),
            ("4k3/6K1/8/8/8/8/8/N1N5 w - - 0 1", "a1b3", "Nab3"),
        ] {
            let pos: Position = fen.parse().unwrap();
            let mv = Move::from_uci(uci, &pos).unwrap();
            assert_eq!(mv.san(&pos).unwrap().to_string(), san);
            assert_eq!(Move::from_san(san, &pos).unwrap(), mv);
        }
    }

    #[test]
    fn test_ambiguous_and_missing() {
        let pos: Position = "4k3/6K1/8/N7/8/8/8/N7 w - - 0 1".parse().unwrap();
        assert!(matches!(
            Move::from_san("Nb3", &pos),
            Err(Error::Resolve(ResolveError::Ambiguous(_, _)))
        ));
        assert_eq!(
            Move::from_san("Nd5", &pos),
            Err(Error::Resolve(ResolveError::NotFound))
        );
        assert_eq!(
            Move::from_san("Nxb3", &pos),
            Err(Error::Resolve(ResolveError::NotACapture))
        );
    }

    #[test]
    fn test_pawn_moves() {
        let pos: Position = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = Move::from_san("exd5", &pos).unwrap();
        assert_eq!(mv.to_string(), "e4d5");
        assert_eq!(mv.san(&pos).unwrap().to_string(), "exd5");
        let mv = Move::from_san("e5", &pos).unwrap();
        assert_eq!(mv.to_string(), "e4e5");

        // En passant renders as an ordinary pawn capture
        let pos: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2".parse().unwrap();
        let mv = Move::from_san("exd6", &pos).unwrap();
        assert_eq!(mv.kind(), MoveKind::EnPassant);
        assert_eq!(mv.san(&pos).unwrap().to_string(), "exd6");
    }

    #[test]
    fn test_promotion() {
        let pos: Position = "7k/P7/8/8/8/8/8/K7 w - - 0 1".parse().unwrap();
        let mv = Move::from_san("a8=Q+", &pos).unwrap();
        assert_eq!(mv.to_string(), "a7a8q");
        assert_eq!(mv.san(&pos).unwrap().to_string(), "a8=Q+");
        // Promotion letter without '=' is accepted on input
        assert_eq!(Move::from_san("a8Q", &pos).unwrap(), mv);

        let pos: Position = "1n5k/P7/8/8/8/8/8/K7 w - - 0 1".parse().unwrap();
        let mv = Move::from_san("axb8=N", &pos).unwrap();
        assert_eq!(mv.to_string(), "a7b8n");
        assert_eq!(mv.san(&pos).unwrap().to_string(), "axb8=N");
    }

    #[test]
    fn test_check_marks() {
        // Back-rank mate
        let pos: Position = "6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let mv = Move::from_san("Ra8", &pos).unwrap();
        assert_eq!(mv.san(&pos).unwrap().to_string(), "Ra8#");

        // Plain check; the mark is optional on input
        let pos: Position = "6k1/5pp1/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let mv = Move::from_san("Ra8+", &pos).unwrap();
        assert_eq!(Move::from_san("Ra8", &pos).unwrap(), mv);
        assert_eq!(mv.san(&pos).unwrap().to_string(), "Ra8+");
    }

    #[test]
    fn test_castle_round_trip() {
        let pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1".parse().unwrap();
        let mv = Move::from_san("O-O-O", &pos).unwrap();
        assert_eq!(mv.castling_side(), Some(CastlingSide::Queen));
        assert_eq!(mv.san(&pos).unwrap().to_string(), "O-O-O");
        assert_eq!(Move::from_san("0-0", &pos).unwrap().castling_side(), Some(CastlingSide::King));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<San>(), Err(ParseError::Empty));
        assert!(matches!("Nb".parse::<San>(), Err(ParseError::Syntax)));
        assert!(matches!("Ni9".parse::<San>(), Err(ParseError::BadSquare(_))));
        assert!(matches!("exd9".parse::<San>(), Err(ParseError::BadSquare(_))));
        assert!(matches!("♘f3".parse::<San>(), Err(ParseError::Syntax)));
    }
}
