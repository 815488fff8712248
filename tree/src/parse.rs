//! Move token preparation.
//!
//! A builder token is `<move>[<nag>][{comment}]`: a move in one of the
//! three notations, optionally followed by a NAG (symbolic glyph or
//! `$n`) and a `{...}` comment. The suffixes are stripped here and
//! attached to the node the move creates.

use crate::game::PlayError;
use crate::nag;

use chesstree_rules::{moves::UciParseError, san, Move, Position};

use thiserror::Error;

/// The notation a move token is written in
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Standard Algebraic Notation (`Nf3`, `exd5`)
    #[default]
    San,
    /// UCI coordinate notation (`g1f3`, `e7e8q`)
    Uci,
    /// xboard coordinate notation (UCI plus `O-O` forms)
    Xboard,
}

/// Why a move token could not be read
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("{0}")]
    San(#[from] san::Error),
    #[error("{0}")]
    Coord(#[from] UciParseError),
    #[error("unbalanced braces in trailing comment")]
    UnbalancedComment,
    #[error("bad NAG number")]
    BadNag,
    #[error("empty move token")]
    EmptyToken,
}

pub(crate) struct ParsedToken {
    pub mv: Move,
    pub comment: Option<String>,
    pub nag: Option<u8>,
}

impl ParsedToken {
    pub fn nags(&self) -> Vec<u8> {
        self.nag.into_iter().collect()
    }
}

/// Collapses runs of whitespace to single spaces and trims the ends
pub(crate) fn normalize_comment(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_comment(token: &str) -> Result<(&str, Option<String>), NotationError> {
    let token = token.trim_end();
    if let Some(rest) = token.strip_suffix('}') {
        let open = rest.rfind('{').ok_or(NotationError::UnbalancedComment)?;
        return Ok((&rest[..open], Some(normalize_comment(&rest[open + 1..]))));
    }
    if token.contains('{') {
        return Err(NotationError::UnbalancedComment);
    }
    Ok((token, None))
}

fn strip_nag(token: &str) -> Result<(&str, Option<u8>), NotationError> {
    let token = token.trim_end();
    if let Some(dollar) = token.rfind('$') {
        let digits = &token[dollar + 1..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let code = digits.parse().map_err(|_| NotationError::BadNag)?;
            return Ok((token[..dollar].trim_end(), Some(code)));
        }
        return Err(NotationError::BadNag);
    }
    let (rest, glyph) = nag::split_trailing_glyph(token);
    Ok((rest, glyph))
}

/// Strips trailing comment and NAG from a token and parses the remaining
/// move in the node's position; errors carry the token and the position
/// context
pub(crate) fn parse_token(
    pos: &Position,
    token: &str,
    notation: Notation,
) -> Result<ParsedToken, PlayError> {
    let fail = |source: NotationError| PlayError::Notation {
        token: token.to_owned(),
        side: pos.side_to_move(),
        legal_count: chesstree_rules::legal_moves(pos).len(),
        source,
    };

    let (rest, comment) = strip_comment(token.trim()).map_err(fail)?;
    let (move_text, nag) = strip_nag(rest).map_err(fail)?;
    let move_text = move_text.trim();
    if move_text.is_empty() {
        return Err(fail(NotationError::EmptyToken));
    }

    let mv = match notation {
        Notation::San => Move::from_san(move_text, pos).map_err(|e| fail(e.into()))?,
        Notation::Uci => Move::from_uci(move_text, pos).map_err(|e| fail(e.into()))?,
        Notation::Xboard => Move::from_xboard(move_text, pos).map_err(|e| fail(e.into()))?,
    };
    Ok(ParsedToken { mv, comment, nag })
}
