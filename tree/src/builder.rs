//! Building moves and variations from heterogeneous inputs.
//!
//! [`Game::play`] consumes a sequence of [`MoveInput`]s: a bare token is
//! one mainline move, a nested line is a variation of the move played
//! just before it. Groups are processed with an explicit worklist, so
//! arbitrarily deep nesting cannot exhaust the call stack.

use crate::game::{Game, NodeId, PlayError};
use crate::parse::Notation;

/// One element of a move sequence: a single move token or a nested
/// variation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveInput {
    /// A move in the chosen notation, optionally suffixed with a NAG
    /// glyph and a `{comment}`
    Token(String),
    /// A variation branching off the move played just before the group
    Line(Vec<MoveInput>),
}

impl From<&str> for MoveInput {
    fn from(s: &str) -> MoveInput {
        MoveInput::Token(s.to_owned())
    }
}

impl From<String> for MoveInput {
    fn from(s: String) -> MoveInput {
        MoveInput::Token(s)
    }
}

impl From<Vec<MoveInput>> for MoveInput {
    fn from(line: Vec<MoveInput>) -> MoveInput {
        MoveInput::Line(line)
    }
}

/// Builds a `Vec<MoveInput>`; bracketed groups become nested variation
/// lines:
///
/// ```
/// # use chesstree::moves;
/// let inputs = moves!["e4", "e5", ["e6"], ["d5", "Bc4", "dxc4"]];
/// ```
#[macro_export]
macro_rules! moves {
    ($($item:tt),* $(,)?) => {
        vec![$($crate::moves_item!($item)),*]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! moves_item {
    ([ $($inner:tt),* $(,)? ]) => {
        $crate::MoveInput::Line(vec![$($crate::moves_item!($inner)),*])
    };
    ($token:expr) => {
        $crate::MoveInput::from($token)
    };
}

struct Frame<'a> {
    items: &'a [MoveInput],
    next: usize,
    /// The node the group branched from; `None` for the outermost
    /// sequence, which unwinds nowhere
    branch_point: Option<NodeId>,
    /// Whether the next token opens the group's branch (appended as a
    /// trailing variation instead of a new mainline)
    opens_branch: bool,
}

impl Game {
    /// Plays a sequence of moves and variations starting at `at`,
    /// returning the cursor the sequence ends on
    ///
    /// Tokens extend the mainline through [`Game::add_main_variation`].
    /// A nested line steps back one ply, opens a trailing variation
    /// there with its first token, plays out the rest of the line, then
    /// snaps back to the branch point and re-enters variation 1 (the
    /// mainline child) before the outer sequence continues.
    ///
    /// Fail-fast: on error, moves already applied stay in the tree.
    /// Snapshot the cursor first if you need to retry from a clean
    /// point.
    pub fn play(
        &mut self,
        at: NodeId,
        inputs: &[MoveInput],
        notation: Notation,
    ) -> Result<NodeId, PlayError> {
        let mut cursor = at;
        let mut stack = vec![Frame {
            items: inputs,
            next: 0,
            branch_point: None,
            opens_branch: false,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.items.len() {
                let branch_point = frame.branch_point;
                stack.pop();
                if let Some(branch_point) = branch_point {
                    cursor = self.variation(branch_point, 1)?;
                }
                continue;
            }
            let items = frame.items;
            let index = frame.next;
            frame.next += 1;
            let opens_branch = std::mem::take(&mut frame.opens_branch);

            match &items[index] {
                MoveInput::Token(token) => {
                    cursor = if opens_branch {
                        self.play_token_as_variation(cursor, token, notation)?
                    } else {
                        self.play_token(cursor, token, notation)?
                    };
                }
                MoveInput::Line(line) => {
                    let branch_point = self.back(cursor, 1)?;
                    cursor = branch_point;
                    stack.push(Frame {
                        items: line,
                        next: 0,
                        branch_point: Some(branch_point),
                        opens_branch: true,
                    });
                }
            }
        }
        Ok(cursor)
    }
}
