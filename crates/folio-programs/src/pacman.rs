//! Pac-Man on a procedurally generated maze.
//!
//! The maze starts from a fixed lattice (border plus regular pillars) and
//! gains random extra walls, each kept only if every open cell stays
//! reachable. Three ghosts share one movement rule with different targets.

use std::collections::VecDeque;

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::{Direction, Key};
use folio_types::theme::Theme;
use rand::Rng;
use rand::rngs::StdRng;

use crate::{Program, draw_centered, font_for, make_rng};

pub const COLS: i32 = 21;
pub const ROWS: i32 = 15;
/// Seconds between game steps.
pub const STEP_SECS: f32 = 0.15;
/// Steps ghosts stay scared after a power pellet.
pub const SCARED_STEPS: u32 = 30;
/// Chance per step that a ghost ignores its target.
pub const RANDOM_MOVE_CHANCE: f64 = 0.35;
/// How many cells ahead of the player the ambusher aims.
pub const AMBUSH_LEAD: i32 = 4;
pub const PELLET_POINTS: u32 = 10;
pub const POWER_POINTS: u32 = 50;
pub const GHOST_POINTS: u32 = 200;

const EXTRA_WALL_ATTEMPTS: usize = 40;
const PLAYER_START: Pos = (COLS / 2, ROWS - 2);
const GHOST_HOMES: [Pos; 3] = [
    (COLS / 2 - 1, ROWS / 2),
    (COLS / 2, ROWS / 2),
    (COLS / 2 + 1, ROWS / 2),
];
const POWER_CELLS: [Pos; 4] = [(1, 1), (COLS - 2, 1), (1, ROWS - 2), (COLS - 2, ROWS - 2)];

/// Grid cell `(x, y)`.
pub type Pos = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Pellet,
    Power,
    Empty,
}

/// Targeting rule of a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostStyle {
    /// Aim at the player's cell.
    Chase,
    /// Aim a few cells ahead of the player.
    Ambush,
    /// Aim at a random cell each step.
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ghost {
    pub pos: Pos,
    pub home: Pos,
    pub dir: Option<Direction>,
    pub style: GhostStyle,
    pub scared: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    Caught,
}

fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

fn shift(p: Pos, dir: Direction) -> Pos {
    let (dx, dy) = dir.delta();
    (p.0 + dx, p.1 + dy)
}

/// The wall/pellet grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    tiles: Vec<Tile>,
}

impl Maze {
    /// Border walls plus pillars on every third row at every fourth column.
    fn lattice() -> Self {
        let mut tiles = vec![Tile::Pellet; (COLS * ROWS) as usize];
        for y in 0..ROWS {
            for x in 0..COLS {
                let border = x == 0 || y == 0 || x == COLS - 1 || y == ROWS - 1;
                let pillar_row = y >= 2 && y < ROWS - 2 && (y - 2) % 3 == 0;
                let pillar = pillar_row && (2..COLS - 2).contains(&x) && x % 4 == 0;
                if border || pillar {
                    tiles[(y * COLS + x) as usize] = Tile::Wall;
                }
            }
        }
        Self { tiles }
    }

    pub fn generate(rng: &mut StdRng) -> Self {
        let mut maze = Self::lattice();
        let reserved = |p: Pos| {
            p == PLAYER_START
                || GHOST_HOMES.contains(&p)
                || POWER_CELLS.contains(&p)
                || manhattan(p, PLAYER_START) <= 1
        };
        let mut added = 0;
        for _ in 0..EXTRA_WALL_ATTEMPTS {
            let p = (rng.gen_range(1..COLS - 1), rng.gen_range(1..ROWS - 1));
            if reserved(p) || maze.is_wall(p) {
                continue;
            }
            maze.set(p, Tile::Wall);
            if maze.all_open_connected() {
                added += 1;
            } else {
                maze.set(p, Tile::Pellet);
            }
        }
        for p in POWER_CELLS {
            maze.set(p, Tile::Power);
        }
        maze.set(PLAYER_START, Tile::Empty);
        log::debug!("pacman maze with {added} extra walls");
        maze
    }

    fn index(p: Pos) -> Option<usize> {
        if p.0 < 0 || p.1 < 0 || p.0 >= COLS || p.1 >= ROWS {
            None
        } else {
            Some((p.1 * COLS + p.0) as usize)
        }
    }

    pub fn get(&self, p: Pos) -> Tile {
        Self::index(p).map_or(Tile::Wall, |i| self.tiles[i])
    }

    pub fn set(&mut self, p: Pos, tile: Tile) {
        if let Some(i) = Self::index(p) {
            self.tiles[i] = tile;
        }
    }

    pub fn is_wall(&self, p: Pos) -> bool {
        self.get(p) == Tile::Wall
    }

    pub fn pellets_left(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Tile::Pellet | Tile::Power))
            .count()
    }

    fn open_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..ROWS)
            .flat_map(|y| (0..COLS).map(move |x| (x, y)))
            .filter(|p| !self.is_wall(*p))
    }

    /// Breadth-first flood from one open cell must reach every open cell.
    fn all_open_connected(&self) -> bool {
        let Some(start) = self.open_cells().next() else {
            return false;
        };
        let total = self.open_cells().count();
        let mut seen = vec![false; self.tiles.len()];
        let mut queue = VecDeque::from([start]);
        let mut reached = 0;
        if let Some(i) = Self::index(start) {
            seen[i] = true;
        }
        while let Some(p) = queue.pop_front() {
            reached += 1;
            for dir in Direction::ALL {
                let n = shift(p, dir);
                if self.is_wall(n) {
                    continue;
                }
                if let Some(i) = Self::index(n) {
                    if !seen[i] {
                        seen[i] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        reached == total
    }

    /// Open neighbours of `p`, excluding the reverse of `dir` unless that is
    /// the only way out.
    fn exits(&self, p: Pos, dir: Option<Direction>) -> Vec<Direction> {
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| !self.is_wall(shift(p, *d)))
            .collect();
        let forward: Vec<Direction> = open
            .iter()
            .copied()
            .filter(|d| Some(d.opposite()) != dir)
            .collect();
        if forward.is_empty() { open } else { forward }
    }
}

pub struct Pacman {
    seed: Option<u64>,
    rng: StdRng,
    maze: Maze,
    player: Pos,
    dir: Option<Direction>,
    next_dir: Option<Direction>,
    ghosts: Vec<Ghost>,
    score: u32,
    outcome: Outcome,
    steps: u64,
    acc: f32,
}

impl Pacman {
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = make_rng(seed);
        let maze = Maze::generate(&mut rng);
        let styles = [GhostStyle::Chase, GhostStyle::Ambush, GhostStyle::Random];
        let ghosts = GHOST_HOMES
            .into_iter()
            .zip(styles)
            .map(|(home, style)| Ghost {
                pos: home,
                home,
                dir: None,
                style,
                scared: 0,
            })
            .collect();
        Self {
            seed,
            rng,
            maze,
            player: PLAYER_START,
            dir: None,
            next_dir: None,
            ghosts,
            score: 0,
            outcome: Outcome::Playing,
            steps: 0,
            acc: 0.0,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// One game step: player, contacts, ghosts, contacts.
    pub fn step(&mut self) {
        if self.outcome != Outcome::Playing {
            return;
        }
        self.steps += 1;
        for ghost in &mut self.ghosts {
            ghost.scared = ghost.scared.saturating_sub(1);
        }

        self.move_player();
        self.resolve_contacts();
        if self.outcome != Outcome::Playing {
            return;
        }
        if self.maze.pellets_left() == 0 {
            log::debug!("pacman cleared with score {}", self.score);
            self.outcome = Outcome::Won;
            return;
        }

        for i in 0..self.ghosts.len() {
            // Scared ghosts move at half speed.
            if self.ghosts[i].scared > 0 && self.steps % 2 == 0 {
                continue;
            }
            self.move_ghost(i);
        }
        self.resolve_contacts();
    }

    fn move_player(&mut self) {
        if let Some(next) = self.next_dir {
            if !self.maze.is_wall(shift(self.player, next)) {
                self.dir = Some(next);
            }
        }
        let Some(dir) = self.dir else {
            return;
        };
        let target = shift(self.player, dir);
        if self.maze.is_wall(target) {
            return;
        }
        self.player = target;
        match self.maze.get(target) {
            Tile::Pellet => {
                self.score += PELLET_POINTS;
                self.maze.set(target, Tile::Empty);
            },
            Tile::Power => {
                self.score += POWER_POINTS;
                self.maze.set(target, Tile::Empty);
                for ghost in &mut self.ghosts {
                    ghost.scared = SCARED_STEPS;
                }
            },
            Tile::Empty | Tile::Wall => {},
        }
    }

    fn ghost_target(&mut self, i: usize) -> Pos {
        match self.ghosts[i].style {
            GhostStyle::Chase => self.player,
            GhostStyle::Ambush => {
                let (dx, dy) = self.dir.map_or((0, 0), Direction::delta);
                (
                    (self.player.0 + dx * AMBUSH_LEAD).clamp(0, COLS - 1),
                    (self.player.1 + dy * AMBUSH_LEAD).clamp(0, ROWS - 1),
                )
            },
            GhostStyle::Random => (self.rng.gen_range(0..COLS), self.rng.gen_range(0..ROWS)),
        }
    }

    fn move_ghost(&mut self, i: usize) {
        let target = self.ghost_target(i);
        let ghost = &self.ghosts[i];
        let options = self.maze.exits(ghost.pos, ghost.dir);
        if options.is_empty() {
            return;
        }
        let pos = ghost.pos;
        let scared = ghost.scared > 0;
        let choice = if self.rng.gen_bool(RANDOM_MOVE_CHANCE) {
            options[self.rng.gen_range(0..options.len())]
        } else {
            let dist = |d: Direction| manhattan(shift(pos, d), target);
            let best = if scared {
                options.iter().max_by_key(|d| dist(**d))
            } else {
                options.iter().min_by_key(|d| dist(**d))
            };
            match best {
                Some(d) => *d,
                None => return,
            }
        };
        let ghost = &mut self.ghosts[i];
        ghost.pos = shift(pos, choice);
        ghost.dir = Some(choice);
    }

    /// Handle ghosts sharing the player's cell. The player moves first, so
    /// a head-on swap is caught here before the ghosts move.
    fn resolve_contacts(&mut self) {
        for i in 0..self.ghosts.len() {
            if self.ghosts[i].pos != self.player {
                continue;
            }
            if self.ghosts[i].scared > 0 {
                self.score += GHOST_POINTS;
                let ghost = &mut self.ghosts[i];
                ghost.pos = ghost.home;
                ghost.dir = None;
                ghost.scared = 0;
            } else {
                log::debug!("pacman caught with score {}", self.score);
                self.outcome = Outcome::Caught;
                return;
            }
        }
    }
}

impl Program for Pacman {
    fn name(&self) -> &str {
        "pacman"
    }

    fn on_input(&mut self, key: Key) {
        if self.outcome != Outcome::Playing {
            if key == Key::Enter || key.lower_char() == Some('r') {
                self.reset();
            }
            return;
        }
        if let Some(dir) = Direction::from_key(key) {
            self.next_dir = Some(dir);
        }
    }

    fn tick(&mut self, dt: f32) {
        self.acc += dt.min(0.5);
        while self.acc >= STEP_SECS {
            self.acc -= STEP_SECS;
            self.step();
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
        let font = font_for(height, 24);
        let hud = u32::from(font) + 8;
        let cell = (width / COLS as u32)
            .min(height.saturating_sub(hud) / ROWS as u32)
            .max(1);
        let ox = (width.saturating_sub(cell * COLS as u32) / 2) as i32;
        let oy = hud as i32;
        let c = cell as i32;
        let center = |p: Pos| (ox + p.0 * c + c / 2, oy + p.1 * c + c / 2);

        for y in 0..ROWS {
            for x in 0..COLS {
                let (cx, cy) = center((x, y));
                match self.maze.get((x, y)) {
                    Tile::Wall => {
                        canvas.fill_rect(ox + x * c, oy + y * c, cell, cell, theme.dim)?;
                    },
                    Tile::Pellet => {
                        let s = (cell / 5).max(1);
                        let half = s as i32 / 2;
                        canvas.fill_rect(cx - half, cy - half, s, s, theme.text)?;
                    },
                    Tile::Power => {
                        let r = (cell / 3).max(1) as u16;
                        canvas.fill_circle(cx, cy, r, theme.accent)?;
                    },
                    Tile::Empty => {},
                }
            }
        }

        for ghost in &self.ghosts {
            let color = if ghost.scared > 0 {
                theme.dim.with_alpha(180)
            } else {
                theme.text
            };
            let inset = (cell / 6) as i32;
            let size = cell.saturating_sub(2 * inset as u32).max(1);
            let gx = ox + ghost.pos.0 * c + inset;
            let gy = oy + ghost.pos.1 * c + inset;
            canvas.fill_rect(gx, gy, size, size, color)?;
        }

        let (px, py) = center(self.player);
        canvas.fill_circle(px, py, (cell * 2 / 5).max(1) as u16, theme.accent)?;

        let hud_text = format!("Score {}   Pellets {}", self.score, self.maze.pellets_left());
        canvas.draw_text(&hud_text, 4, 4, font, theme.text)?;
        let banner = match self.outcome {
            Outcome::Playing => None,
            Outcome::Won => Some("You win! Enter to play again"),
            Outcome::Caught => Some("Caught! Enter to restart"),
        };
        if let Some(text) = banner {
            draw_centered(canvas, text, width, height as i32 / 2, font, theme.accent)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}
