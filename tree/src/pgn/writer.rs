//! PGN serialization.

use crate::game::{Game, NodeId};
use crate::nag;

use chesstree_rules::Color;

enum Step {
    Node(NodeId),
    Open,
    Close,
}

struct Writer<'a> {
    game: &'a Game,
    out: String,
    needs_space: bool,
    /// Whether the next Black move must carry an `N...` number (line
    /// start, or resumption after a comment or variation)
    force_number: bool,
}

impl<'a> Writer<'a> {
    fn token(&mut self, s: &str) {
        if self.needs_space {
            self.out.push(' ');
        }
        self.out.push_str(s);
        self.needs_space = true;
    }

    fn open_paren(&mut self) {
        if self.needs_space {
            self.out.push(' ');
        }
        self.out.push('(');
        self.needs_space = false;
        self.force_number = true;
    }

    fn close_paren(&mut self) {
        self.out.push(')');
        self.needs_space = true;
        self.force_number = true;
    }

    fn node(&mut self, id: NodeId, work: &mut Vec<Step>) {
        let game = self.game;
        let parent = game
            .parent(id)
            .expect("only non-root nodes are emitted as moves");
        let before = game.position(parent);

        match before.side_to_move() {
            Color::White => self.token(&format!("{}.", before.fullmove_number())),
            Color::Black if self.force_number => {
                self.token(&format!("{}...", before.fullmove_number()))
            }
            Color::Black => {}
        }
        self.force_number = false;

        // The lowest glyph-coded NAG rides on the move token itself; the
        // rest follow as `$n` tokens in ascending order.
        let mut san = game.san(id).expect("non-root nodes always have a SAN form");
        let nags: Vec<u8> = game.nags(id).collect();
        let inline = nags.iter().copied().find(|&n| nag::glyph(n).is_some());
        if let Some(code) = inline {
            san.push_str(nag::glyph(code).expect("glyph existence was just checked"));
        }
        self.token(&san);
        for &code in nags.iter().filter(|&&n| Some(n) != inline) {
            self.token(&format!("${}", code));
        }

        if !game.comment(id).is_empty() {
            self.token(&format!("{{{}}}", game.comment(id)));
            self.force_number = true;
        }

        // Push in reverse emission order: the continuation goes deepest,
        // then each sibling variation group in reverse
        if let Some(next) = game.mainline_child(id) {
            work.push(Step::Node(next));
        }
        if game.mainline_child(parent) == Some(id) {
            for &variation in game.children(parent)[1..].iter().rev() {
                work.push(Step::Close);
                work.push(Step::Node(variation));
                work.push(Step::Open);
            }
        }
    }
}

impl Game {
    /// Serializes the movetext starting after `from`, ending with the
    /// game's result marker
    ///
    /// The mainline runs inline; every other child of a node is emitted
    /// as a parenthesized variation immediately after the move it
    /// varies. Comments come as `{text}` after their move, NAGs as a
    /// suffix glyph where the table has one and `$n` otherwise, and
    /// move numbers follow the standard rules (`N.` before a White
    /// move, `N...` when a Black move resumes an interrupted line).
    pub fn movetext(&self, from: NodeId) -> String {
        let mut writer = Writer {
            game: self,
            out: String::new(),
            needs_space: false,
            force_number: true,
        };
        if !self.comment(from).is_empty() {
            writer.token(&format!("{{{}}}", self.comment(from)));
        }
        let mut work: Vec<Step> = Vec::new();
        if let Some(first) = self.mainline_child(from) {
            work.push(Step::Node(first));
        }
        while let Some(step) = work.pop() {
            match step {
                Step::Node(id) => writer.node(id, &mut work),
                Step::Open => writer.open_paren(),
                Step::Close => writer.close_paren(),
            }
        }
        writer.token(self.result().as_str());
        writer.out
    }

    /// The whole game as PGN: tag pairs, a blank line, then movetext
    pub fn pgn(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.tags().iter() {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            out.push_str(&format!("[{} \"{}\"]\n", name, escaped));
        }
        out.push('\n');
        out.push_str(&self.movetext(self.root()));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MoveInput;
    use crate::game::GameResult;
    use crate::moves;
    use crate::parse::Notation;

    fn play(game: &mut Game, inputs: &[MoveInput]) {
        game.play(game.root(), inputs, Notation::San).unwrap();
    }

    #[test]
    fn test_empty_game() {
        let game = Game::new();
        assert_eq!(game.movetext(game.root()), "*");
    }

    #[test]
    fn test_mainline_numbering() {
        let mut game = Game::new();
        play(&mut game, &moves!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert_eq!(
            game.movetext(game.root()),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 *"
        );
    }

    #[test]
    fn test_variation_and_resumption() {
        let mut game = Game::new();
        play(&mut game, &moves!["e4", "e5", ["c5"], "Nf3"]);
        assert_eq!(
            game.movetext(game.root()),
            "1. e4 e5 (1... c5) 2. Nf3 *"
        );
    }

    #[test]
    fn test_comment_forces_number() {
        let mut game = Game::new();
        play(&mut game, &moves!["e4 {king pawn}", "e5", "Nf3"]);
        assert_eq!(
            game.movetext(game.root()),
            "1. e4 {king pawn} 1... e5 2. Nf3 *"
        );
    }

    #[test]
    fn test_nags() {
        let mut game = Game::new();
        let tip = game
            .play(game.root(), &moves!["e4!", "e5"], Notation::San)
            .unwrap();
        game.add_nag(tip, 22);
        game.add_nag(tip, 2);
        assert_eq!(game.movetext(game.root()), "1. e4! e5? $22 *");
    }

    #[test]
    fn test_black_start_from_fen() {
        let pos = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        let mut game = Game::from_position(pos);
        play(&mut game, &moves!["e5", "Nf3"]);
        assert_eq!(game.movetext(game.root()), "1... e5 2. Nf3 *");
    }

    #[test]
    fn test_result_marker() {
        let mut game = Game::new();
        play(&mut game, &moves!["e4"]);
        game.set_result(GameResult::White);
        assert_eq!(game.movetext(game.root()), "1. e4 1-0");
        assert_eq!(game.tags().get("Result"), Some("1-0"));
    }

    #[test]
    fn test_movetext_from_inner_node() {
        let mut game = Game::new();
        play(&mut game, &moves!["e4", "e5", "Nf3", "Nc6"]);
        let e4 = game.variation(game.root(), 1).unwrap();
        assert_eq!(game.movetext(e4), "1... e5 2. Nf3 Nc6 *");
    }

    #[test]
    fn test_pgn_with_tags() {
        let mut game = Game::new();
        play(&mut game, &moves!["d4", "d5"]);
        let pgn = game.pgn();
        assert!(pgn.starts_with("[Event \"?\"]\n"));
        assert!(pgn.ends_with("\n\n1. d4 d5 *\n"));
    }
}
