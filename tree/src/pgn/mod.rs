//! PGN reading and writing.
//!
//! The reader turns a whole PGN string into a [`Game`](crate::Game)
//! tree; the writer walks a tree back into movetext. Both are iterative
//! with explicit stacks, and the reader additionally caps variation
//! nesting at [`MAX_VARIATION_DEPTH`], so adversarial input cannot
//! exhaust the call stack.

mod reader;
mod writer;

pub use reader::{PgnError, PgnErrorKind};

/// Upper bound on `(`-nesting the reader accepts
pub const MAX_VARIATION_DEPTH: usize = 255;

#[cfg(test)]
mod tests {
    use crate::game::Game;

    /// Serializer output must reparse and re-serialize byte-identically
    fn assert_round_trip(movetext: &str) {
        let game = Game::from_pgn(movetext).unwrap();
        let written = game.movetext(game.root());
        let reparsed = Game::from_pgn(&written).unwrap();
        assert_eq!(reparsed.movetext(reparsed.root()), written);
    }

    #[test]
    fn test_round_trip_simple() {
        assert_round_trip("1. e4 e5 (1... c5) 2. Nf3 *");
        // Already-canonical text survives unchanged
        let game = Game::from_pgn("1. e4 e5 (1... c5) 2. Nf3 *").unwrap();
        assert_eq!(game.movetext(game.root()), "1. e4 e5 (1... c5) 2. Nf3 *");
    }

    #[test]
    fn test_round_trip_annotated() {
        assert_round_trip(
            "1. e4 $1 {king pawn} e5!? (1... c5 {sharp} 2. Nf3 d6) \
             2. Nf3 (2. f4 exf4 3. Nf3) 2... Nc6 1/2-1/2",
        );
    }

    #[test]
    fn test_round_trip_deep_nesting() {
        assert_round_trip("1. e4 e5 (1... c5 (1... e6 (1... c6 2. d4 (2. c4)))) 2. Nf3 *");
    }

    #[test]
    fn test_round_trip_full_pgn() {
        let game = Game::from_pgn(
            "[Event \"Casual\"]\n[White \"A\"]\n[Black \"B\"]\n\n1. d4 {queen pawn} d5 2. c4 1-0",
        )
        .unwrap();
        let pgn = game.pgn();
        let reparsed = Game::from_pgn(&pgn).unwrap();
        assert_eq!(reparsed.pgn(), pgn);
    }

    #[test]
    fn test_parse_canonicalizes_whitespace() {
        let game = Game::from_pgn("1.e4   e5\n2.Nf3\t Nc6 *").unwrap();
        assert_eq!(game.movetext(game.root()), "1. e4 e5 2. Nf3 Nc6 *");
    }
}
