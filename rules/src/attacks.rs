//! Attack masks for every piece kind.
//!
//! Leaper tables and ray tables are computed at compile time; sliding
//! attacks use the classical ray scan with the first blocker cutting the
//! ray short.

use crate::bitboard::Bitboard;
use crate::types::{Color, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const fn leaper_table(deltas: &[(i8, i8)]) -> [u64; 64] {
    let mut table = [0_u64; 64];
    let mut idx = 0;
    while idx < 64 {
        let file = (idx % 8) as i8;
        let rank = (idx / 8) as i8;
        let mut d = 0;
        while d < deltas.len() {
            let (df, dr) = deltas[d];
            let (f, r) = (file + df, rank + dr);
            if 0 <= f && f < 8 && 0 <= r && r < 8 {
                table[idx] |= 1_u64 << (r * 8 + f);
            }
            d += 1;
        }
        idx += 1;
    }
    table
}

const fn ray_table(df: i8, dr: i8) -> [u64; 64] {
    let mut table = [0_u64; 64];
    let mut idx = 0;
    while idx < 64 {
        let mut file = (idx % 8) as i8 + df;
        let mut rank = (idx / 8) as i8 + dr;
        while 0 <= file && file < 8 && 0 <= rank && rank < 8 {
            table[idx] |= 1_u64 << (rank * 8 + file);
            file += df;
            rank += dr;
        }
        idx += 1;
    }
    table
}

static KNIGHT: [u64; 64] = leaper_table(&KNIGHT_DELTAS);
static KING: [u64; 64] = leaper_table(&KING_DELTAS);
static WHITE_PAWN: [u64; 64] = leaper_table(&[(-1, 1), (1, 1)]);
static BLACK_PAWN: [u64; 64] = leaper_table(&[(-1, -1), (1, -1)]);

// Ray directions; the first four run towards higher square indices, so a
// blocker is found with `first()` there and with `last()` on the rest.
const NORTH: usize = 0;
const NORTH_EAST: usize = 1;
const EAST: usize = 2;
const NORTH_WEST: usize = 3;
const SOUTH: usize = 4;
const SOUTH_WEST: usize = 5;
const WEST: usize = 6;
const SOUTH_EAST: usize = 7;

static RAYS: [[u64; 64]; 8] = [
    ray_table(0, 1),
    ray_table(1, 1),
    ray_table(1, 0),
    ray_table(-1, 1),
    ray_table(0, -1),
    ray_table(-1, -1),
    ray_table(-1, 0),
    ray_table(1, -1),
];

#[inline]
pub fn king(sq: Square) -> Bitboard {
    Bitboard::from_raw(KING[sq.index()])
}

#[inline]
pub fn knight(sq: Square) -> Bitboard {
    Bitboard::from_raw(KNIGHT[sq.index()])
}

/// Squares a pawn of color `color` standing on `sq` attacks
#[inline]
pub fn pawn(color: Color, sq: Square) -> Bitboard {
    match color {
        Color::White => Bitboard::from_raw(WHITE_PAWN[sq.index()]),
        Color::Black => Bitboard::from_raw(BLACK_PAWN[sq.index()]),
    }
}

fn ray_attack(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = Bitboard::from_raw(RAYS[dir][sq.index()]);
    let blockers = ray & occupied;
    let blocker = if dir < 4 { blockers.first() } else { blockers.last() };
    match blocker {
        Some(b) => ray ^ Bitboard::from_raw(RAYS[dir][b.index()]),
        None => ray,
    }
}

pub fn bishop(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(NORTH_EAST, sq, occupied)
        | ray_attack(NORTH_WEST, sq, occupied)
        | ray_attack(SOUTH_EAST, sq, occupied)
        | ray_attack(SOUTH_WEST, sq, occupied)
}

pub fn rook(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(NORTH, sq, occupied)
        | ray_attack(EAST, sq, occupied)
        | ray_attack(SOUTH, sq, occupied)
        | ray_attack(WEST, sq, occupied)
}

pub fn queen(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop(sq, occupied) | rook(sq, occupied)
}
