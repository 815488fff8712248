//! PGN parsing.

use crate::game::{Game, GameResult, NodeId, PlayError};
use crate::parse::{normalize_comment, Notation};
use crate::pgn::MAX_VARIATION_DEPTH;
use crate::tags::Tags;

use chesstree_rules::{FenParseError, Position};

use thiserror::Error;

/// Error parsing PGN text, located by line and column
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("PGN syntax error at {line}:{column}: {kind}")]
pub struct PgnError {
    pub line: u32,
    pub column: u32,
    pub kind: PgnErrorKind,
}

/// What went wrong while parsing PGN text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PgnErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("malformed tag pair")]
    BadTag,
    #[error("unterminated tag value")]
    UnterminatedTag,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unmatched ')'")]
    UnmatchedClose,
    #[error("unclosed variation at end of input")]
    UnclosedVariation,
    #[error("variation before any move")]
    VariationAtStart,
    #[error("variations nested deeper than {MAX_VARIATION_DEPTH}")]
    TooDeep,
    #[error("bad NAG token")]
    BadNag,
    #[error("unknown token {0:?}")]
    UnknownToken(String),
    #[error("result marker inside a variation")]
    ResultInVariation,
    #[error("text after game end")]
    TrailingText,
    #[error("bad FEN tag: {0}")]
    BadFen(#[from] FenParseError),
    #[error("cannot play {token:?}: {source}")]
    BadMove {
        token: String,
        source: PlayError,
    },
}

impl PgnError {
    fn new(line: u32, column: u32, kind: PgnErrorKind) -> PgnError {
        PgnError { line, column, kind }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Reader<'a> {
        Reader {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            return true;
        }
        false
    }

    fn error(&self, kind: PgnErrorKind) -> PgnError {
        PgnError::new(self.line, self.column, kind)
    }

    fn take_while(&mut self, f: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.peek().map_or(false, &f) {
            self.bump();
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    /// Reads one `[Name "Value"]` pair; the opening `[` is consumed
    fn read_tag_pair(&mut self) -> Result<(String, String), PgnError> {
        self.skip_whitespace();
        let name = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        if name.is_empty() {
            return Err(self.error(PgnErrorKind::BadTag));
        }
        self.skip_whitespace();
        if !self.eat(b'"') {
            return Err(self.error(PgnErrorKind::BadTag));
        }
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some(b'\n') => return Err(self.error(PgnErrorKind::UnterminatedTag)),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'"') => value.push('"'),
                    Some(b'\\') => value.push('\\'),
                    _ => return Err(self.error(PgnErrorKind::BadTag)),
                },
                Some(b) => value.push(b as char),
            }
        }
        self.skip_whitespace();
        if !self.eat(b']') {
            return Err(self.error(PgnErrorKind::BadTag));
        }
        Ok((name, value))
    }

    /// Reads `{...}` content after the opening brace was consumed
    fn read_brace_comment(&mut self) -> Result<String, PgnError> {
        let start = self.pos;
        loop {
            match self.bump() {
                None => return Err(self.error(PgnErrorKind::UnterminatedComment)),
                Some(b'}') => {
                    let raw = String::from_utf8_lossy(&self.bytes[start..self.pos - 1]);
                    return Ok(normalize_comment(&raw));
                }
                Some(_) => {}
            }
        }
    }

    /// Reads a `;` comment running to the end of the line
    fn read_line_comment(&mut self) -> String {
        let raw = self.take_while(|b| b != b'\n');
        normalize_comment(&raw)
    }
}

fn is_move_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'#' | b'=' | b'-' | b':')
}

impl Game {
    /// Parses one PGN game: tag pairs followed by movetext
    ///
    /// Variations attach as siblings of the move they follow, comments
    /// and NAGs attach to the move before them, and the result marker
    /// (also mirrored into the `Result` tag) ends the movetext. A `FEN`
    /// tag sets the root position.
    pub fn from_pgn(text: &str) -> Result<Game, PgnError> {
        let mut reader = Reader::new(text);
        let mut tags = Tags::new();

        reader.skip_whitespace();
        while reader.eat(b'[') {
            let (name, value) = reader.read_tag_pair()?;
            tags.set(&name, &value);
            reader.skip_whitespace();
        }

        let root_position = match tags.get("FEN") {
            Some(fen) => Position::from_fen(fen)
                .map_err(|e| reader.error(PgnErrorKind::BadFen(e)))?,
            None => Position::initial(),
        };
        let tag_result = tags.get("Result").and_then(GameResult::from_token);
        let mut game = Game::with_root(root_position, tags);
        if let Some(result) = tag_result {
            game.set_result(result);
        }

        let mut cursor = game.root();
        let mut saved: Vec<NodeId> = Vec::new();
        let mut opens_variation = false;

        loop {
            reader.skip_whitespace();
            let (line, column) = (reader.line, reader.column);
            let Some(byte) = reader.peek() else {
                if !saved.is_empty() {
                    return Err(reader.error(PgnErrorKind::UnclosedVariation));
                }
                break;
            };
            match byte {
                b'{' => {
                    reader.bump();
                    let comment = reader.read_brace_comment()?;
                    game.append_comment(cursor, &comment);
                }
                b';' => {
                    reader.bump();
                    let comment = reader.read_line_comment();
                    game.append_comment(cursor, &comment);
                }
                b'(' => {
                    reader.bump();
                    let Some(parent) = game.parent(cursor) else {
                        return Err(PgnError::new(
                            line,
                            column,
                            PgnErrorKind::VariationAtStart,
                        ));
                    };
                    if saved.len() == MAX_VARIATION_DEPTH {
                        return Err(PgnError::new(line, column, PgnErrorKind::TooDeep));
                    }
                    saved.push(cursor);
                    cursor = parent;
                    opens_variation = true;
                }
                b')' => {
                    reader.bump();
                    cursor = saved
                        .pop()
                        .ok_or(PgnError::new(line, column, PgnErrorKind::UnmatchedClose))?;
                    opens_variation = false;
                }
                b'$' => {
                    reader.bump();
                    let digits = reader.take_while(|b| b.is_ascii_digit());
                    let nag: u8 = digits
                        .parse()
                        .map_err(|_| PgnError::new(line, column, PgnErrorKind::BadNag))?;
                    game.add_nag(cursor, nag);
                }
                b'!' | b'?' => {
                    // Suffix glyph separated from its move by whitespace
                    let glyph = reader.take_while(|b| matches!(b, b'!' | b'?'));
                    match crate::nag::from_glyph(&glyph) {
                        Some(nag) => game.add_nag(cursor, nag),
                        None => {
                            return Err(PgnError::new(
                                line,
                                column,
                                PgnErrorKind::UnknownToken(glyph),
                            ))
                        }
                    }
                }
                b'*' => {
                    reader.bump();
                    finish_game(&mut game, &mut reader, GameResult::Unknown, &saved, line, column)?;
                    break;
                }
                b'0'..=b'9' => {
                    let token =
                        reader.take_while(|b| is_move_char(b) || b == b'/');
                    if token.bytes().all(|b| b.is_ascii_digit()) {
                        // A move number; the dots (`1.`, `1...`, `1. ...`)
                        // are consumed and the number itself is not checked
                        loop {
                            reader.skip_whitespace();
                            if !reader.eat(b'.') {
                                break;
                            }
                        }
                    } else if let Some(result) = GameResult::from_token(&token) {
                        finish_game(&mut game, &mut reader, result, &saved, line, column)?;
                        break;
                    } else if token.starts_with("0-") {
                        // Castling spelled with zeros
                        cursor = play_move(
                            &mut game,
                            &mut reader,
                            cursor,
                            opens_variation,
                            token,
                            line,
                            column,
                        )?;
                        opens_variation = false;
                    } else {
                        return Err(PgnError::new(
                            line,
                            column,
                            PgnErrorKind::UnknownToken(token),
                        ));
                    }
                }
                b if is_move_char(b) => {
                    let token = reader.take_while(is_move_char);
                    cursor = play_move(
                        &mut game,
                        &mut reader,
                        cursor,
                        opens_variation,
                        token,
                        line,
                        column,
                    )?;
                    opens_variation = false;
                }
                other => {
                    return Err(PgnError::new(
                        line,
                        column,
                        PgnErrorKind::UnexpectedChar(other as char),
                    ))
                }
            }
        }
        Ok(game)
    }
}

/// Plays one movetext token at `cursor` and attaches a directly
/// following suffix glyph (`!`, `??`, ...) to the new node
fn play_move(
    game: &mut Game,
    reader: &mut Reader<'_>,
    cursor: NodeId,
    opens_variation: bool,
    token: String,
    line: u32,
    column: u32,
) -> Result<NodeId, PgnError> {
    let glyph = reader.take_while(|b| matches!(b, b'!' | b'?'));
    let nag = if glyph.is_empty() {
        None
    } else {
        match crate::nag::from_glyph(&glyph) {
            Some(nag) => Some(nag),
            None => {
                return Err(PgnError::new(
                    line,
                    column,
                    PgnErrorKind::UnknownToken(glyph),
                ))
            }
        }
    };
    let added = if opens_variation {
        game.play_token_as_variation(cursor, &token, Notation::San)
    } else {
        game.play_token(cursor, &token, Notation::San)
    };
    let added = added.map_err(|source| {
        PgnError::new(line, column, PgnErrorKind::BadMove { token, source })
    })?;
    if let Some(nag) = nag {
        game.add_nag(added, nag);
    }
    Ok(added)
}

fn finish_game(
    game: &mut Game,
    reader: &mut Reader<'_>,
    result: GameResult,
    saved: &[NodeId],
    line: u32,
    column: u32,
) -> Result<(), PgnError> {
    if !saved.is_empty() {
        return Err(PgnError::new(line, column, PgnErrorKind::ResultInVariation));
    }
    game.set_result(result);
    reader.skip_whitespace();
    if reader.peek().is_some() {
        return Err(reader.error(PgnErrorKind::TrailingText));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_game() {
        let game = Game::from_pgn("1. e4 e5 (1... c5) 2. Nf3 *").unwrap();
        let root = game.root();
        let e4 = game.variation(root, 1).unwrap();
        assert_eq!(game.san(e4).as_deref(), Some("e4"));
        assert_eq!(game.children(root).len(), 1);

        let children = game.children(e4);
        assert_eq!(children.len(), 2);
        assert_eq!(game.san(children[0]).as_deref(), Some("e5"));
        assert_eq!(game.san(children[1]).as_deref(), Some("c5"));

        let e5 = children[0];
        let nf3 = game.mainline_child(e5).unwrap();
        assert_eq!(game.san(nf3).as_deref(), Some("Nf3"));
        assert_eq!(game.result(), GameResult::Unknown);
    }

    #[test]
    fn test_tags() {
        let game = Game::from_pgn(
            "[Event \"Rated game\"]\n[Site \"?\"]\n[Result \"1-0\"]\n\n1. e4 1-0",
        )
        .unwrap();
        assert_eq!(game.tags().get("Event"), Some("Rated game"));
        assert_eq!(game.tags().get("Result"), Some("1-0"));
        assert_eq!(game.result(), GameResult::White);
    }

    #[test]
    fn test_tag_escapes() {
        let game =
            Game::from_pgn("[Event \"A \\\"quoted\\\" \\\\ name\"]\n\n*").unwrap();
        assert_eq!(game.tags().get("Event"), Some("A \"quoted\" \\ name"));
    }

    #[test]
    fn test_fen_tag() {
        let game = Game::from_pgn(
            "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]\n\n1. O-O *",
        )
        .unwrap();
        let tip = game.mainline(game.root()).last().unwrap();
        assert_eq!(game.san(tip).as_deref(), Some("O-O"));
    }

    #[test]
    fn test_comments_and_nags() {
        let game =
            Game::from_pgn("1. e4 $1 {king pawn} e5!? {classical   reply} *").unwrap();
        let e4 = game.variation(game.root(), 1).unwrap();
        assert_eq!(game.nags(e4).collect::<Vec<_>>(), vec![1]);
        assert_eq!(game.comment(e4), "king pawn");
        let e5 = game.variation(e4, 1).unwrap();
        assert_eq!(game.nags(e5).collect::<Vec<_>>(), vec![5]);
        assert_eq!(game.comment(e5), "classical reply");
    }

    #[test]
    fn test_root_comment() {
        let game = Game::from_pgn("{annotated by hand} 1. d4 *").unwrap();
        assert_eq!(game.comment(game.root()), "annotated by hand");
    }

    #[test]
    fn test_semicolon_comment() {
        let game = Game::from_pgn("1. e4 ; best by test\ne5 *").unwrap();
        let e4 = game.variation(game.root(), 1).unwrap();
        assert_eq!(game.comment(e4), "best by test");
        assert_eq!(game.mainline(game.root()).count(), 2);
    }

    #[test]
    fn test_nested_variations() {
        let game = Game::from_pgn("1. e4 e5 2. Nf3 (2. Bc4 Nf6 (2... Bc5 3. c3) 3. d3) 2... Nc6 *")
            .unwrap();
        let e4 = game.variation(game.root(), 1).unwrap();
        let e5 = game.variation(e4, 1).unwrap();
        let children = game.children(e5);
        assert_eq!(children.len(), 2);
        assert_eq!(game.san(children[0]).as_deref(), Some("Nf3"));
        assert_eq!(game.san(children[1]).as_deref(), Some("Bc4"));

        let bc4 = children[1];
        let bc4_children = game.children(bc4);
        assert_eq!(bc4_children.len(), 2);
        assert_eq!(game.san(bc4_children[0]).as_deref(), Some("Nf6"));
        assert_eq!(game.san(bc4_children[1]).as_deref(), Some("Bc5"));

        let nf3 = children[0];
        let nc6 = game.mainline_child(nf3).unwrap();
        assert_eq!(game.san(nc6).as_deref(), Some("Nc6"));
    }

    #[test]
    fn test_unbalanced_variation() {
        // The variation is never closed
        let err = Game::from_pgn("1. e4 (1. d4").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::UnclosedVariation);

        // Unbalanced in the other direction: the token inside the open
        // group is not even a legal alternative, which surfaces first
        assert!(Game::from_pgn("1. e4 (e5").is_err());

        let err = Game::from_pgn("1. e4 e5) *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::UnmatchedClose);

        let err = Game::from_pgn("(1. e4) *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::VariationAtStart);
    }

    #[test]
    fn test_bad_tokens() {
        let err = Game::from_pgn("1. e4 {never closed").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::UnterminatedComment);

        let err = Game::from_pgn("1. e9 *").unwrap_err();
        assert!(matches!(err.kind, PgnErrorKind::BadMove { .. }));
        assert_eq!((err.line, err.column), (1, 4));

        let err = Game::from_pgn("1. e4 e5 2. Ke2 *").unwrap_err();
        assert!(matches!(err.kind, PgnErrorKind::BadMove { .. }));

        let err = Game::from_pgn("1. e4 % *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::UnexpectedChar('%'));

        let err = Game::from_pgn("1. e4 1-1 *").unwrap_err();
        assert!(matches!(err.kind, PgnErrorKind::UnknownToken(_)));

        let err = Game::from_pgn("1. e4 * extra").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::TrailingText);

        let err = Game::from_pgn("1. e4 (1-0) *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::ResultInVariation);
    }

    #[test]
    fn test_result_markers() {
        for (text, result) in [
            ("1. e4 1-0", GameResult::White),
            ("1. e4 0-1", GameResult::Black),
            ("1. e4 1/2-1/2", GameResult::Draw),
            ("1. e4 *", GameResult::Unknown),
        ] {
            let game = Game::from_pgn(text).unwrap();
            assert_eq!(game.result(), result);
            assert_eq!(game.tags().get("Result"), Some(result.as_str()));
        }
    }

    #[test]
    fn test_empty_movetext() {
        let game = Game::from_pgn("*").unwrap();
        assert_eq!(game.children(game.root()), &[]);
        let game = Game::from_pgn("[Event \"?\"]\n\n1/2-1/2").unwrap();
        assert_eq!(game.result(), GameResult::Draw);
    }
}
