//! The game tree: nodes, cursors and navigation.
//!
//! A [`Game`] owns every node of one game in an arena; a [`NodeId`] is a
//! copyable cursor into that arena. Any number of cursors may observe the
//! tree at once, and a mutation through one of them is immediately
//! visible through all of them, because the nodes live in one place. The
//! tree only ever grows: nodes are created by move application and
//! destroyed together with the whole game.

use crate::parse::{self, Notation, NotationError};
use crate::tags::Tags;

use chesstree_rules::{Color, DrawReason, IllegalMoveError, Move, Outcome, Position};

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Structural tree errors: navigation past the root, bad variation
/// indices and conflicting insertions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Asked to go further back than the node's depth; exceeding the
    /// depth is an error, not a clamp to the root
    #[error("cannot go back {steps} plies from ply {ply}")]
    PastRoot { steps: usize, ply: usize },
    /// Variation index out of range (indices are 1-based; 1 is the
    /// mainline child)
    #[error("no variation {index} here (node has {count} children)")]
    NoSuchVariation { index: usize, count: usize },
    /// The move is already one of the node's variations
    #[error("move {mv} is already a variation of this node")]
    DuplicateChild { mv: Move },
}

/// Error applying a move (or move token) to the tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlayError {
    /// The token could not be read as a move; carries the side to move
    /// and the size of the legal move set for context
    #[error("cannot parse {token:?} for {side} ({legal_count} legal moves): {source}")]
    Notation {
        token: String,
        side: Color,
        legal_count: usize,
        source: NotationError,
    },
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// How a game ended, as written in PGN movetext
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum GameResult {
    White,
    Black,
    Draw,
    #[default]
    Unknown,
}

impl GameResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameResult::White => "1-0",
            GameResult::Black => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }

    pub fn from_token(s: &str) -> Option<GameResult> {
        match s {
            "1-0" => Some(GameResult::White),
            "0-1" => Some(GameResult::Black),
            "1/2-1/2" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// Cursor into a [`Game`]'s node arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

struct Node {
    position: Position,
    mv: Option<Move>,
    comment: String,
    nags: BTreeSet<u8>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    ply: u32,
}

/// One chess game: a tree of positions with comments and annotations,
/// plus its tag pairs and result
pub struct Game {
    nodes: Vec<Node>,
    tags: Tags,
    result: GameResult,
}

impl Game {
    /// A fresh game from the standard starting position, carrying the
    /// seven-tag roster
    pub fn new() -> Game {
        Game::with_root(Position::initial(), Tags::roster())
    }

    /// A fresh game from an arbitrary position; the `FEN` and `SetUp`
    /// tags record the starting point
    pub fn from_position(position: Position) -> Game {
        let mut tags = Tags::roster();
        tags.set("SetUp", "1");
        tags.set("FEN", &position.as_fen());
        Game::with_root(position, tags)
    }

    pub(crate) fn with_root(position: Position, tags: Tags) -> Game {
        Game {
            nodes: vec![Node {
                position,
                mv: None,
                comment: String::new(),
                nags: BTreeSet::new(),
                parent: None,
                children: Vec::new(),
                ply: 0,
            }],
            tags,
            result: GameResult::Unknown,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// The root cursor (ply 0, no move)
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Records the result and mirrors it into the `Result` tag
    pub fn set_result(&mut self, result: GameResult) {
        self.result = result;
        self.tags.set("Result", result.as_str());
    }

    /// The position after this node's move (for the root, the starting
    /// position)
    pub fn position(&self, id: NodeId) -> &Position {
        &self.node(id).position
    }

    /// The move that produced this node, absent for the root
    pub fn node_move(&self, id: NodeId) -> Option<Move> {
        self.node(id).mv
    }

    /// Half-move index from the start of the game; the root is 0
    pub fn ply(&self, id: NodeId) -> usize {
        self.node(id).ply as usize
    }

    /// The side that made this node's move; for the root, the side to
    /// move in the starting position
    pub fn turn(&self, id: NodeId) -> Color {
        match self.node(id).parent {
            Some(parent) => self.node(parent).position.side_to_move(),
            None => self.node(id).position.side_to_move(),
        }
    }

    /// The node's move in SAN, derived from the parent position; absent
    /// for the root
    pub fn san(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        let parent = node.parent?;
        let mv = node.mv?;
        let san = mv
            .san(&self.node(parent).position)
            .expect("tree nodes only hold moves legal in their parent position");
        Some(san.to_string())
    }

    pub fn comment(&self, id: NodeId) -> &str {
        &self.node(id).comment
    }

    pub fn set_comment(&mut self, id: NodeId, comment: &str) {
        self.node_mut(id).comment = comment.to_owned();
    }

    /// Appends to an existing comment, joining with one space
    pub(crate) fn append_comment(&mut self, id: NodeId, comment: &str) {
        let slot = &mut self.node_mut(id).comment;
        if slot.is_empty() {
            *slot = comment.to_owned();
        } else {
            slot.push(' ');
            slot.push_str(comment);
        }
    }

    pub fn nags(&self, id: NodeId) -> impl Iterator<Item = u8> + '_ {
        self.node(id).nags.iter().copied()
    }

    pub fn add_nag(&mut self, id: NodeId, nag: u8) {
        self.node_mut(id).nags.insert(nag);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Child cursors in variation order; index 0 is the mainline
    /// continuation
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The mainline continuation, if the node has any children
    pub fn mainline_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    /// Ascends `steps` plies; exceeding the node's depth is an error
    pub fn back(&self, id: NodeId, steps: usize) -> Result<NodeId, TreeError> {
        let mut cursor = id;
        for taken in 0..steps {
            cursor = self.node(cursor).parent.ok_or(TreeError::PastRoot {
                steps,
                ply: taken,
            })?;
        }
        Ok(cursor)
    }

    /// Descends into the child with 1-based index `index`;
    /// `variation(id, 1)` is the mainline child
    pub fn variation(&self, id: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let children = &self.node(id).children;
        if index == 0 || index > children.len() {
            return Err(TreeError::NoSuchVariation {
                index,
                count: children.len(),
            });
        }
        Ok(children[index - 1])
    }

    /// Lazy walk along index-0 children, yielding the nodes strictly
    /// after `from`; restartable from any node
    pub fn mainline(&self, from: NodeId) -> Mainline<'_> {
        Mainline {
            game: self,
            next: self.mainline_child(from),
        }
    }

    /// Whether every link from the root to this node is a mainline link
    pub fn is_mainline(&self, id: NodeId) -> bool {
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            if self.mainline_child(parent) != Some(cursor) {
                return false;
            }
            cursor = parent;
        }
        true
    }

    /// Moves this node to index 0 of its parent's children, keeping the
    /// relative order of the other variations; a no-op for the root or a
    /// node already on the mainline of its parent
    pub fn promote_to_main(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let children = &mut self.node_mut(parent).children;
        if let Some(pos) = children.iter().position(|&c| c == id) {
            if pos != 0 {
                children.remove(pos);
                children.insert(0, id);
            }
        }
    }

    /// Adds `mv` as the new mainline continuation of `at`
    ///
    /// A previous mainline child is kept and shifted to variation index
    /// 2; the total move count never shrinks. Fails if `mv` is illegal
    /// in the node's position or already one of its variations.
    pub fn add_main_variation(
        &mut self,
        at: NodeId,
        mv: Move,
        comment: &str,
        nags: &[u8],
    ) -> Result<NodeId, PlayError> {
        self.add_child(at, mv, comment, nags, true)
    }

    /// Adds `mv` as the last variation of `at`
    ///
    /// Existing children keep their positions and relative order. Fails
    /// if `mv` is illegal in the node's position or already one of its
    /// variations.
    pub fn add_variation(
        &mut self,
        at: NodeId,
        mv: Move,
        comment: &str,
        nags: &[u8],
    ) -> Result<NodeId, PlayError> {
        self.add_child(at, mv, comment, nags, false)
    }

    fn add_child(
        &mut self,
        at: NodeId,
        mv: Move,
        comment: &str,
        nags: &[u8],
        main: bool,
    ) -> Result<NodeId, PlayError> {
        let duplicate = self
            .node(at)
            .children
            .iter()
            .any(|&child| self.node(child).mv == Some(mv));
        if duplicate {
            return Err(TreeError::DuplicateChild { mv }.into());
        }
        let position = self.node(at).position.make(mv)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            position,
            mv: Some(mv),
            comment: comment.to_owned(),
            nags: nags.iter().copied().collect(),
            parent: Some(at),
            children: Vec::new(),
            ply: self.node(at).ply + 1,
        });
        let children = &mut self.node_mut(at).children;
        if main {
            children.insert(0, id);
        } else {
            children.push(id);
        }
        Ok(id)
    }

    /// Parses `token` in the node's position and adds the move like
    /// [`Game::add_main_variation`]; comment and NAG suffixes on the
    /// token are stripped and attached to the new node
    pub fn play_token(
        &mut self,
        at: NodeId,
        token: &str,
        notation: Notation,
    ) -> Result<NodeId, PlayError> {
        let parsed = parse::parse_token(self.position(at), token, notation)?;
        self.add_main_variation(
            at,
            parsed.mv,
            parsed.comment.as_deref().unwrap_or(""),
            &parsed.nags(),
        )
    }

    pub(crate) fn play_token_as_variation(
        &mut self,
        at: NodeId,
        token: &str,
        notation: Notation,
    ) -> Result<NodeId, PlayError> {
        let parsed = parse::parse_token(self.position(at), token, notation)?;
        self.add_variation(
            at,
            parsed.mv,
            parsed.comment.as_deref().unwrap_or(""),
            &parsed.nags(),
        )
    }

    /// Cursors from the root to `id`, inclusive
    fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// Whether the node's position has occurred at least three times on
    /// the way from the root to the node
    pub fn is_threefold_repetition(&self, id: NodeId) -> bool {
        chesstree_rules::is_threefold_repetition(
            self.path(id).into_iter().map(|n| &self.node(n).position),
        )
    }

    /// The outcome at this node, if the game is over there
    ///
    /// Combines the position-local outcome (mate, stalemate, material,
    /// fifty moves) with draw by threefold repetition along this node's
    /// history.
    pub fn outcome(&self, id: NodeId) -> Option<Outcome> {
        if let Some(outcome) = self.position(id).outcome() {
            return Some(outcome);
        }
        if self.is_threefold_repetition(id) {
            return Some(Outcome::Draw(DrawReason::Repetition));
        }
        None
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Game")
            .field("nodes", &self.nodes.len())
            .field("result", &self.result)
            .finish()
    }
}

/// Iterator over the mainline descendants of a node; see
/// [`Game::mainline`]
pub struct Mainline<'a> {
    game: &'a Game,
    next: Option<NodeId>,
}

impl<'a> Iterator for Mainline<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.game.mainline_child(current);
        Some(current)
    }
}
