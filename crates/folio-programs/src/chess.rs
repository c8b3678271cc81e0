//! Chess with full legal-move generation and a light-weight bot.
//!
//! [`Position`] holds the rules: pseudo-legal generation per piece, attack
//! detection, and legality by simulating each move and rejecting those that
//! leave the mover's king attacked. [`Chess`] wraps a position with the
//! cursor UI, the promotion prompt and the optional bot.

use std::fmt;

use folio_types::backend::{Canvas, Color};
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;
use rand::Rng;
use rand::rngs::StdRng;

use crate::{Program, draw_centered, font_for, make_rng};

/// Seconds the bot waits before replying.
pub const BOT_DELAY_SECS: f32 = 0.4;
/// The bot picks uniformly among this many best-scored moves.
pub const BOT_TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank direction pawns advance in.
    fn forward(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    fn home_rank(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value used by the bot.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Promotion choice for a key (`q`, `r`, `b`, `n`).
    pub fn from_promotion_key(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }
}

/// A board square. File 0 is `a`, rank 0 is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub const fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Parse algebraic notation such as `e2`.
    pub fn parse(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Square::new(file as u8 - b'a', rank as u8 - b'1'))
    }

    fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let f = self.file as i8 + df;
        let r = self.rank as i8 + dr;
        if (0..8).contains(&f) && (0..8).contains(&r) {
            Some(Square::new(f as u8, r as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

/// Castling rights, cleared when the king or the relevant rook moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Castling {
    white_king: bool,
    white_queen: bool,
    black_king: bool,
    black_queen: bool,
}

impl Castling {
    const ALL: Castling = Castling {
        white_king: true,
        white_queen: true,
        black_king: true,
        black_queen: true,
    };
    const NONE: Castling = Castling {
        white_king: false,
        white_queen: false,
        black_king: false,
        black_queen: false,
    };

    fn get(&self, side: Side, king_side: bool) -> bool {
        match (side, king_side) {
            (Side::White, true) => self.white_king,
            (Side::White, false) => self.white_queen,
            (Side::Black, true) => self.black_king,
            (Side::Black, false) => self.black_queen,
        }
    }

    /// Drop any right tied to a piece leaving or being captured on `sq`.
    fn touch(&mut self, sq: Square) {
        match (sq.file, sq.rank) {
            (4, 0) => {
                self.white_king = false;
                self.white_queen = false;
            },
            (4, 7) => {
                self.black_king = false;
                self.black_queen = false;
            },
            (0, 0) => self.white_queen = false,
            (7, 0) => self.white_king = false,
            (0, 7) => self.black_queen = false,
            (7, 7) => self.black_king = false,
            _ => {},
        }
    }
}

/// Result of the side to move having no legal moves (or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Check,
    Checkmate { winner: Side },
    Stalemate,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Stalemate)
    }
}

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const ROOK_RAYS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Board state plus everything the rules need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: [[Option<Piece>; 8]; 8],
    side_to_move: Side,
    castling: Castling,
    /// Square a pawn skipped over on the previous double step.
    en_passant: Option<Square>,
}

impl Position {
    pub fn initial() -> Self {
        let mut pos = Self::empty(Side::White);
        pos.castling = Castling::ALL;
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back.into_iter().enumerate() {
            let file = file as u8;
            pos.put(Square::new(file, 0), Some(Piece::new(kind, Side::White)));
            pos.put(Square::new(file, 1), Some(Piece::new(PieceKind::Pawn, Side::White)));
            pos.put(Square::new(file, 6), Some(Piece::new(PieceKind::Pawn, Side::Black)));
            pos.put(Square::new(file, 7), Some(Piece::new(kind, Side::Black)));
        }
        pos
    }

    /// An empty board with no castling rights.
    pub fn empty(side_to_move: Side) -> Self {
        Self {
            board: [[None; 8]; 8],
            side_to_move,
            castling: Castling::NONE,
            en_passant: None,
        }
    }

    pub fn at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.rank as usize][sq.file as usize]
    }

    pub fn put(&mut self, sq: Square, piece: Option<Piece>) {
        self.board[sq.rank as usize][sq.file as usize] = piece;
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    fn king_square(&self, side: Side) -> Option<Square> {
        (0..8u8)
            .flat_map(|rank| (0..8u8).map(move |file| Square::new(file, rank)))
            .find(|sq| self.at(*sq) == Some(Piece::new(PieceKind::King, side)))
    }

    /// Whether any piece of `by` attacks `sq`.
    pub fn is_attacked(&self, sq: Square, by: Side) -> bool {
        let is = |s: Option<Square>, kinds: &[PieceKind]| {
            s.and_then(|s| self.at(s))
                .is_some_and(|p| p.side == by && kinds.contains(&p.kind))
        };

        // A pawn of `by` attacks diagonally forward, so look backwards.
        let back = -by.forward();
        if is(sq.offset(-1, back), &[PieceKind::Pawn]) || is(sq.offset(1, back), &[PieceKind::Pawn])
        {
            return true;
        }
        if KNIGHT_JUMPS
            .iter()
            .any(|&(df, dr)| is(sq.offset(df, dr), &[PieceKind::Knight]))
        {
            return true;
        }
        if ROOK_RAYS
            .iter()
            .chain(BISHOP_RAYS.iter())
            .any(|&(df, dr)| is(sq.offset(df, dr), &[PieceKind::King]))
        {
            return true;
        }
        let ray_hits = |rays: &[(i8, i8)], kinds: &[PieceKind]| {
            rays.iter().any(|&(df, dr)| {
                let mut cur = sq.offset(df, dr);
                while let Some(s) = cur {
                    if let Some(p) = self.at(s) {
                        return p.side == by && kinds.contains(&p.kind);
                    }
                    cur = s.offset(df, dr);
                }
                false
            })
        };
        ray_hits(&ROOK_RAYS, &[PieceKind::Rook, PieceKind::Queen])
            || ray_hits(&BISHOP_RAYS, &[PieceKind::Bishop, PieceKind::Queen])
    }

    pub fn in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|k| self.is_attacked(k, side.other()))
    }

    fn push_pawn_move(out: &mut Vec<Move>, from: Square, to: Square) {
        if to.rank == 0 || to.rank == 7 {
            for kind in [
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight,
            ] {
                out.push(Move {
                    from,
                    to,
                    promotion: Some(kind),
                });
            }
        } else {
            out.push(Move::new(from, to));
        }
    }

    fn pseudo_moves_from(&self, from: Square, out: &mut Vec<Move>) {
        let Some(piece) = self.at(from) else {
            return;
        };
        let side = piece.side;
        let target_ok = |to: Square| self.at(to).is_none_or(|p| p.side != side);

        match piece.kind {
            PieceKind::Pawn => {
                let fwd = side.forward();
                if let Some(one) = from.offset(0, fwd) {
                    if self.at(one).is_none() {
                        Self::push_pawn_move(out, from, one);
                        let start_rank = if side == Side::White { 1 } else { 6 };
                        if from.rank == start_rank {
                            if let Some(two) = one.offset(0, fwd) {
                                if self.at(two).is_none() {
                                    out.push(Move::new(from, two));
                                }
                            }
                        }
                    }
                }
                for df in [-1, 1] {
                    let Some(to) = from.offset(df, fwd) else {
                        continue;
                    };
                    let captures = self.at(to).is_some_and(|p| p.side != side);
                    if captures || self.en_passant == Some(to) {
                        Self::push_pawn_move(out, from, to);
                    }
                }
            },
            PieceKind::Knight => {
                for (df, dr) in KNIGHT_JUMPS {
                    if let Some(to) = from.offset(df, dr) {
                        if target_ok(to) {
                            out.push(Move::new(from, to));
                        }
                    }
                }
            },
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                let rays: &[(i8, i8)] = match piece.kind {
                    PieceKind::Bishop => &BISHOP_RAYS,
                    PieceKind::Rook => &ROOK_RAYS,
                    _ => &[
                        (1, 0),
                        (-1, 0),
                        (0, 1),
                        (0, -1),
                        (1, 1),
                        (1, -1),
                        (-1, 1),
                        (-1, -1),
                    ],
                };
                for &(df, dr) in rays {
                    let mut cur = from.offset(df, dr);
                    while let Some(to) = cur {
                        match self.at(to) {
                            None => out.push(Move::new(from, to)),
                            Some(p) => {
                                if p.side != side {
                                    out.push(Move::new(from, to));
                                }
                                break;
                            },
                        }
                        cur = to.offset(df, dr);
                    }
                }
            },
            PieceKind::King => {
                for (df, dr) in ROOK_RAYS.into_iter().chain(BISHOP_RAYS) {
                    if let Some(to) = from.offset(df, dr) {
                        if target_ok(to) {
                            out.push(Move::new(from, to));
                        }
                    }
                }
                self.castling_moves(from, side, out);
            },
        }
    }

    fn castling_moves(&self, from: Square, side: Side, out: &mut Vec<Move>) {
        let rank = side.home_rank();
        if from != Square::new(4, rank) || self.is_attacked(from, side.other()) {
            return;
        }
        // (king side?, rook file, squares that must be empty, squares the king crosses)
        let options: [(bool, u8, &[u8], [u8; 2]); 2] =
            [(true, 7, &[5, 6], [5, 6]), (false, 0, &[1, 2, 3], [3, 2])];
        for (king_side, rook_file, empty, path) in options {
            if !self.castling.get(side, king_side) {
                continue;
            }
            if self.at(Square::new(rook_file, rank)) != Some(Piece::new(PieceKind::Rook, side)) {
                continue;
            }
            if empty.iter().any(|&f| self.at(Square::new(f, rank)).is_some()) {
                continue;
            }
            if path
                .iter()
                .any(|&f| self.is_attacked(Square::new(f, rank), side.other()))
            {
                continue;
            }
            out.push(Move::new(from, Square::new(path[1], rank)));
        }
    }

    /// Apply a move without checking legality.
    fn apply(&mut self, mv: Move) {
        let Some(piece) = self.at(mv.from) else {
            return;
        };
        let side = piece.side;

        if piece.kind == PieceKind::Pawn && Some(mv.to) == self.en_passant && self.at(mv.to).is_none()
        {
            self.put(Square::new(mv.to.file, mv.from.rank), None);
        }
        if piece.kind == PieceKind::King && mv.from.file.abs_diff(mv.to.file) == 2 {
            let rank = mv.from.rank;
            let (rook_from, rook_to) = if mv.to.file == 6 { (7, 5) } else { (0, 3) };
            let rook = self.at(Square::new(rook_from, rank));
            self.put(Square::new(rook_from, rank), None);
            self.put(Square::new(rook_to, rank), rook);
        }

        self.en_passant = if piece.kind == PieceKind::Pawn && mv.from.rank.abs_diff(mv.to.rank) == 2
        {
            Some(Square::new(mv.from.file, (mv.from.rank + mv.to.rank) / 2))
        } else {
            None
        };

        let placed = match mv.promotion {
            Some(kind) if piece.kind == PieceKind::Pawn => Piece::new(kind, side),
            _ => piece,
        };
        self.put(mv.from, None);
        self.put(mv.to, Some(placed));
        self.castling.touch(mv.from);
        self.castling.touch(mv.to);
        self.side_to_move = side.other();
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        let side = self.side_to_move;
        let mut pseudo = Vec::with_capacity(48);
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::new(file, rank);
                if self.at(sq).is_some_and(|p| p.side == side) {
                    self.pseudo_moves_from(sq, &mut pseudo);
                }
            }
        }
        pseudo
            .into_iter()
            .filter(|mv| {
                let mut next = self.clone();
                next.apply(*mv);
                !next.in_check(side)
            })
            .collect()
    }

    /// Legal moves starting at `from`.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|m| m.from == from)
            .collect()
    }

    /// Play `mv` if it is legal. Returns whether it was played.
    pub fn play(&mut self, mv: Move) -> bool {
        if self.legal_moves().contains(&mv) {
            self.apply(mv);
            true
        } else {
            false
        }
    }

    pub fn status(&self) -> GameStatus {
        let side = self.side_to_move;
        let check = self.in_check(side);
        if self.legal_moves().is_empty() {
            if check {
                GameStatus::Checkmate {
                    winner: side.other(),
                }
            } else {
                GameStatus::Stalemate
            }
        } else if check {
            GameStatus::Check
        } else {
            GameStatus::Playing
        }
    }
}

/// Bot score: captured material plus closeness to the center.
fn score_move(pos: &Position, mv: &Move) -> f32 {
    let capture = pos.at(mv.to).map_or(0, |p| p.kind.value()) * 10;
    let promotion = mv.promotion.map_or(0, |k| k.value()) * 8;
    let df = (f32::from(mv.to.file) - 3.5).abs();
    let dr = (f32::from(mv.to.rank) - 3.5).abs();
    let center = 7.0 - (df + dr);
    (capture + promotion) as f32 + center
}

/// Pick uniformly among the top-scored legal moves.
pub fn pick_bot_move(pos: &Position, rng: &mut StdRng) -> Option<Move> {
    let mut scored: Vec<(f32, Move)> = pos
        .legal_moves()
        .into_iter()
        .map(|mv| (score_move(pos, &mv), mv))
        .collect();
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    let top = scored.len().min(BOT_TOP_N);
    Some(scored[rng.gen_range(0..top)].1)
}

pub struct Chess {
    seed: Option<u64>,
    rng: StdRng,
    position: Position,
    status: GameStatus,
    cursor: Square,
    selected: Option<Square>,
    pending_promotion: Option<(Square, Square)>,
    bot: Option<Side>,
    bot_timer: f32,
    last_move: Option<Move>,
}

impl Chess {
    /// New game. With `bot` the computer plays black.
    pub fn new(bot: bool, seed: Option<u64>) -> Self {
        Self {
            seed,
            rng: make_rng(seed),
            position: Position::initial(),
            status: GameStatus::Playing,
            cursor: Square::new(4, 1),
            selected: None,
            pending_promotion: None,
            bot: bot.then_some(Side::Black),
            bot_timer: 0.0,
            last_move: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_awaiting_promotion(&self) -> bool {
        self.pending_promotion.is_some()
    }

    /// Attempt a move. A pawn reaching the last rank pauses in the
    /// promotion prompt until [`Chess::promote`] is called.
    pub fn try_move(&mut self, from: Square, to: Square) -> bool {
        if self.status.is_over() || self.pending_promotion.is_some() {
            return false;
        }
        let candidates: Vec<Move> = self
            .position
            .legal_moves_from(from)
            .into_iter()
            .filter(|m| m.to == to)
            .collect();
        match candidates.as_slice() {
            [] => false,
            [mv] if mv.promotion.is_none() => {
                self.finish_move(*mv);
                true
            },
            _ => {
                self.pending_promotion = Some((from, to));
                true
            },
        }
    }

    /// Complete a pending promotion.
    pub fn promote(&mut self, kind: PieceKind) -> bool {
        let Some((from, to)) = self.pending_promotion else {
            return false;
        };
        if kind == PieceKind::Pawn || kind == PieceKind::King {
            return false;
        }
        let mv = Move {
            from,
            to,
            promotion: Some(kind),
        };
        self.pending_promotion = None;
        self.finish_move(mv);
        true
    }

    fn finish_move(&mut self, mv: Move) {
        if self.position.play(mv) {
            self.last_move = Some(mv);
            self.status = self.position.status();
            self.bot_timer = 0.0;
            log::debug!("chess {mv} -> {:?}", self.status);
        }
    }

    fn is_bot_turn(&self) -> bool {
        self.bot == Some(self.position.side_to_move())
    }

    fn activate(&mut self) {
        if self.status.is_over() {
            self.reset();
            return;
        }
        if self.is_bot_turn() || self.pending_promotion.is_some() {
            return;
        }
        let side = self.position.side_to_move();
        let own = self.position.at(self.cursor).is_some_and(|p| p.side == side);
        match self.selected {
            Some(sel) if sel == self.cursor => self.selected = None,
            _ if own => self.selected = Some(self.cursor),
            Some(sel) => {
                if self.try_move(sel, self.cursor) {
                    self.selected = None;
                }
            },
            None => {},
        }
    }
}

impl Program for Chess {
    fn name(&self) -> &str {
        "chess"
    }

    fn on_input(&mut self, key: Key) {
        if self.pending_promotion.is_some() {
            if let Some(kind) = key.lower_char().and_then(PieceKind::from_promotion_key) {
                self.promote(kind);
            }
            return;
        }
        let c = self.cursor;
        match key {
            Key::ArrowUp => self.cursor = c.offset(0, 1).unwrap_or(c),
            Key::ArrowDown => self.cursor = c.offset(0, -1).unwrap_or(c),
            Key::ArrowLeft => self.cursor = c.offset(-1, 0).unwrap_or(c),
            Key::ArrowRight => self.cursor = c.offset(1, 0).unwrap_or(c),
            Key::Enter | Key::Char(' ') => self.activate(),
            Key::Char('r') | Key::Char('R') if self.status.is_over() => self.reset(),
            _ => {},
        }
    }

    fn tick(&mut self, dt: f32) {
        if !self.is_bot_turn() || self.status.is_over() {
            return;
        }
        self.bot_timer += dt;
        if self.bot_timer < BOT_DELAY_SECS {
            return;
        }
        if let Some(mut mv) = pick_bot_move(&self.position, &mut self.rng) {
            if mv.promotion.is_some() {
                mv.promotion = Some(PieceKind::Queen);
            }
            self.finish_move(mv);
        }
    }

    fn render(
        &self,
        canvas: &mut dyn Canvas,
        width: u32,
        height: u32,
        theme: &Theme,
    ) -> Result<()> {
        canvas.clear_area(width, height, theme.bg)?;
        let font = font_for(height, 20);
        let hud = u32::from(font) * 2 + 8;
        let cell = (width.min(height.saturating_sub(hud)) / 8).max(1);
        let board_px = cell * 8;
        let ox = (width.saturating_sub(board_px) / 2) as i32;
        let oy = 4;

        let legal_targets: Vec<Square> = self
            .selected
            .map(|s| {
                self.position
                    .legal_moves_from(s)
                    .into_iter()
                    .map(|m| m.to)
                    .collect()
            })
            .unwrap_or_default();

        let light = theme.dim.with_alpha(110);
        let dark = theme.dim.with_alpha(45);
        let piece_font = (cell * 3 / 5).clamp(6, 48) as u16;
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::new(file, rank);
                let x = ox + (u32::from(file) * cell) as i32;
                // Rank 8 at the top.
                let y = oy + (u32::from(7 - rank) * cell) as i32;
                let shade = if (file + rank) % 2 == 1 { light } else { dark };
                canvas.fill_rect(x, y, cell, cell, shade)?;

                if self.last_move.is_some_and(|m| m.from == sq || m.to == sq) {
                    canvas.fill_rect(x, y, cell, cell, theme.accent.with_alpha(40))?;
                }
                if legal_targets.contains(&sq) {
                    let dot = (cell / 4).max(1);
                    let off = ((cell - dot) / 2) as i32;
                    canvas.fill_rect(x + off, y + off, dot, dot, theme.accent.with_alpha(160))?;
                }
                if let Some(piece) = self.position.at(sq) {
                    let color: Color = match piece.side {
                        Side::White => theme.text,
                        Side::Black => theme.accent,
                    };
                    let glyph = piece.kind.letter().to_string();
                    let gw = canvas.measure_text(&glyph, piece_font);
                    let gx = x + (cell.saturating_sub(gw) / 2) as i32;
                    let gy = y + (cell.saturating_sub(u32::from(piece_font)) / 2) as i32;
                    canvas.draw_text(&glyph, gx, gy, piece_font, color)?;
                }
                if self.selected == Some(sq) {
                    canvas.stroke_rect(x, y, cell, cell, 2, theme.text)?;
                }
                if self.cursor == sq {
                    canvas.stroke_rect(x, y, cell, cell, 2, theme.accent)?;
                }
            }
        }

        let side = self.position.side_to_move();
        let status = match self.status {
            _ if self.pending_promotion.is_some() => "Promote to: q r b n".to_string(),
            GameStatus::Playing => format!("{side} to move"),
            GameStatus::Check => format!("{side} to move. Check!"),
            GameStatus::Checkmate { winner } => format!("Checkmate. {winner} wins. Enter to restart"),
            GameStatus::Stalemate => "Stalemate. Enter to restart".to_string(),
        };
        let text_y = oy + board_px as i32 + 4;
        draw_centered(canvas, &status, width, text_y, font, theme.text)
    }

    fn reset(&mut self) {
        *self = Self::new(self.bot.is_some(), self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockCanvas;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::new(sq(&s[..2]), sq(&s[2..4]))
    }

    fn play_all(pos: &mut Position, moves: &[&str]) {
        for m in moves {
            assert!(pos.play(mv(m)), "illegal move {m}");
        }
    }

    #[test]
    fn square_parsing() {
        assert_eq!(sq("a1"), Square::new(0, 0));
        assert_eq!(sq("h8"), Square::new(7, 7));
        assert_eq!(sq("E2").to_string(), "e2");
        assert_eq!(Square::parse("i1"), None);
        assert_eq!(Square::parse("a9"), None);
        assert_eq!(Square::parse("a10"), None);
        assert_eq!(Square::parse(""), None);
    }

    #[test]
    fn initial_position_has_twenty_moves() {
        assert_eq!(Position::initial().legal_moves().len(), 20);
    }

    #[test]
    fn black_not_in_check_after_e4() {
        let mut pos = Position::initial();
        play_all(&mut pos, &["e2e4"]);
        assert!(!pos.in_check(Side::Black));
        assert_eq!(pos.side_to_move(), Side::Black);
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let mut pos = Position::empty(Side::White);
        pos.put(sq("e1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("h8"), Some(Piece::new(PieceKind::King, Side::Black)));
        pos.put(sq("d8"), Some(Piece::new(PieceKind::Rook, Side::Black)));
        let targets: Vec<String> = pos
            .legal_moves_from(sq("e1"))
            .iter()
            .map(|m| m.to.to_string())
            .collect();
        assert!(!targets.contains(&"d1".to_string()));
        assert!(!targets.contains(&"d2".to_string()));
        assert!(targets.contains(&"f1".to_string()));
        assert!(!pos.play(mv("e1d1")));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut pos = Position::empty(Side::White);
        pos.put(sq("e1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("e2"), Some(Piece::new(PieceKind::Knight, Side::White)));
        pos.put(sq("e8"), Some(Piece::new(PieceKind::Rook, Side::Black)));
        pos.put(sq("a8"), Some(Piece::new(PieceKind::King, Side::Black)));
        assert!(pos.legal_moves_from(sq("e2")).is_empty());
    }

    #[test]
    fn sliders_stop_at_first_piece() {
        let mut pos = Position::empty(Side::White);
        pos.put(sq("a1"), Some(Piece::new(PieceKind::Rook, Side::White)));
        pos.put(sq("a4"), Some(Piece::new(PieceKind::Pawn, Side::Black)));
        pos.put(sq("c1"), Some(Piece::new(PieceKind::Pawn, Side::White)));
        pos.put(sq("h1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("h8"), Some(Piece::new(PieceKind::King, Side::Black)));
        let targets: Vec<String> = pos
            .legal_moves_from(sq("a1"))
            .iter()
            .map(|m| m.to.to_string())
            .collect();
        assert_eq!(targets.len(), 4); // a2 a3 a4(capture) b1
        assert!(targets.contains(&"a4".to_string()));
        assert!(!targets.contains(&"a5".to_string()));
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut pos = Position::initial();
        play_all(&mut pos, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            pos.status(),
            GameStatus::Checkmate {
                winner: Side::Black
            }
        );
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let mut pos = Position::empty(Side::Black);
        pos.put(sq("a8"), Some(Piece::new(PieceKind::King, Side::Black)));
        pos.put(sq("b6"), Some(Piece::new(PieceKind::Queen, Side::White)));
        pos.put(sq("e1"), Some(Piece::new(PieceKind::King, Side::White)));
        assert_eq!(pos.status(), GameStatus::Stalemate);
    }

    #[test]
    fn en_passant_captures_pawn() {
        let mut pos = Position::initial();
        play_all(&mut pos, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        assert_eq!(pos.at(sq("d5")), None);
        assert_eq!(
            pos.at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let mut pos = Position::initial();
        play_all(&mut pos, &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
        assert!(!pos.play(mv("e5d6")));
    }

    #[test]
    fn castling_moves_rook() {
        let mut pos = Position::initial();
        play_all(&mut pos, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);
        assert_eq!(
            pos.at(sq("g1")),
            Some(Piece::new(PieceKind::King, Side::White))
        );
        assert_eq!(
            pos.at(sq("f1")),
            Some(Piece::new(PieceKind::Rook, Side::White))
        );
        assert_eq!(pos.at(sq("h1")), None);
    }

    #[test]
    fn cannot_castle_through_attack() {
        let mut pos = Position::empty(Side::White);
        pos.castling = Castling::ALL;
        pos.put(sq("e1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("h1"), Some(Piece::new(PieceKind::Rook, Side::White)));
        pos.put(sq("f8"), Some(Piece::new(PieceKind::Rook, Side::Black)));
        pos.put(sq("a8"), Some(Piece::new(PieceKind::King, Side::Black)));
        assert!(!pos.play(mv("e1g1")));
    }

    #[test]
    fn king_move_drops_castling_rights() {
        let mut pos = Position::initial();
        play_all(
            &mut pos,
            &["e2e4", "e7e5", "e1e2", "a7a6", "e2e1", "a6a5", "g1f3", "a5a4", "f1c4", "b7b6"],
        );
        assert!(!pos.play(mv("e1g1")));
    }

    #[test]
    fn promotion_waits_for_choice() {
        let mut game = Chess::new(false, Some(1));
        let mut pos = Position::empty(Side::White);
        pos.put(sq("a7"), Some(Piece::new(PieceKind::Pawn, Side::White)));
        pos.put(sq("e1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("h5"), Some(Piece::new(PieceKind::King, Side::Black)));
        game.position = pos;

        assert!(game.try_move(sq("a7"), sq("a8")));
        assert!(game.is_awaiting_promotion());
        assert_eq!(game.position().side_to_move(), Side::White);

        game.on_input(Key::Char('x'));
        assert!(game.is_awaiting_promotion());
        game.on_input(Key::Char('n'));
        assert!(!game.is_awaiting_promotion());
        assert_eq!(
            game.position().at(sq("a8")),
            Some(Piece::new(PieceKind::Knight, Side::White))
        );
        assert_eq!(game.position().side_to_move(), Side::Black);
    }

    #[test]
    fn cursor_selects_and_moves() {
        let mut game = Chess::new(false, Some(1));
        // Cursor starts on e2.
        game.on_input(Key::Enter);
        game.on_input(Key::ArrowUp);
        game.on_input(Key::ArrowUp);
        game.on_input(Key::Enter);
        assert_eq!(
            game.position().at(sq("e4")),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
        assert_eq!(game.position().side_to_move(), Side::Black);
    }

    #[test]
    fn bot_replies_after_delay() {
        let mut game = Chess::new(true, Some(9));
        assert!(game.try_move(sq("e2"), sq("e4")));
        game.tick(BOT_DELAY_SECS / 2.0);
        assert_eq!(game.position().side_to_move(), Side::Black);
        game.tick(BOT_DELAY_SECS);
        assert_eq!(game.position().side_to_move(), Side::White);
        assert!(game.last_move.is_some());
    }

    #[test]
    fn bot_picks_among_best() {
        // Free queen on d5 for the black pawn on e6 outscores everything.
        let mut pos = Position::empty(Side::Black);
        pos.put(sq("e6"), Some(Piece::new(PieceKind::Pawn, Side::Black)));
        pos.put(sq("d5"), Some(Piece::new(PieceKind::Queen, Side::White)));
        pos.put(sq("a1"), Some(Piece::new(PieceKind::King, Side::White)));
        pos.put(sq("h8"), Some(Piece::new(PieceKind::King, Side::Black)));
        let mut scored: Vec<(f32, Move)> = pos
            .legal_moves()
            .into_iter()
            .map(|m| (score_move(&pos, &m), m))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        assert_eq!(scored[0].1, mv("e6d5"));

        let mut rng = make_rng(Some(5));
        let top: Vec<Move> = scored.iter().take(BOT_TOP_N).map(|s| s.1).collect();
        for _ in 0..20 {
            let pick = pick_bot_move(&pos, &mut rng).unwrap();
            assert!(top.contains(&pick));
        }
    }

    #[test]
    fn two_player_has_no_bot() {
        let mut game = Chess::new(false, Some(1));
        assert!(game.try_move(sq("e2"), sq("e4")));
        game.tick(5.0);
        assert_eq!(game.position().side_to_move(), Side::Black);
    }

    #[test]
    fn render_shows_turn() {
        let game = Chess::new(true, Some(1));
        let mut canvas = MockCanvas::new();
        game.render(&mut canvas, 480, 520, &Theme::default()).unwrap();
        assert!(canvas.has_text("White to move"));
        assert!(canvas.has_text("K"));
    }
}
