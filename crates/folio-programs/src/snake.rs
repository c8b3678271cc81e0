//! Snake.
//!
//! The board size is measured from the first frame: the drawable area is
//! divided into fixed-size cells and the count clamped to a sane range.
//! Until that first render the game is idle.

use std::cell::Cell;
use std::collections::VecDeque;

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::{Direction, Key};
use folio_types::theme::Theme;
use rand::Rng;
use rand::rngs::StdRng;

use crate::{Program, draw_centered, font_for, make_rng};

pub const CELL_PX: u32 = 16;
pub const MIN_COLS: i32 = 10;
pub const MAX_COLS: i32 = 40;
pub const MIN_ROWS: i32 = 8;
pub const MAX_ROWS: i32 = 30;
/// Seconds between moves.
pub const STEP_SECS: f32 = 0.12;

const HUD_PX: u32 = 24;

/// Grid cell `(x, y)`.
pub type Pos = (i32, i32);

/// Column and row count for a drawable area.
pub fn grid_for(width: u32, height: u32) -> (i32, i32) {
    let cols = (width / CELL_PX) as i32;
    let rows = (height.saturating_sub(HUD_PX) / CELL_PX) as i32;
    (cols.clamp(MIN_COLS, MAX_COLS), rows.clamp(MIN_ROWS, MAX_ROWS))
}

#[derive(Debug, Clone)]
struct Board {
    cols: i32,
    rows: i32,
    /// Head first.
    body: VecDeque<Pos>,
    dir: Direction,
    next_dir: Direction,
    food: Pos,
    alive: bool,
    won: bool,
    score: u32,
}

impl Board {
    fn new(cols: i32, rows: i32, rng: &mut StdRng) -> Self {
        let head = (cols / 2, rows / 2);
        let body = (0..3).map(|i| (head.0 - i, head.1)).collect();
        let mut board = Self {
            cols,
            rows,
            body,
            dir: Direction::Right,
            next_dir: Direction::Right,
            food: (0, 0),
            alive: true,
            won: false,
            score: 0,
        };
        board.place_food(rng);
        board
    }

    fn place_food(&mut self, rng: &mut StdRng) {
        let free: Vec<Pos> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| (x, y)))
            .filter(|p| !self.body.contains(p))
            .collect();
        if free.is_empty() {
            self.won = true;
            self.alive = false;
        } else {
            self.food = free[rng.gen_range(0..free.len())];
        }
    }

    fn turn(&mut self, dir: Direction) {
        if dir != self.dir.opposite() {
            self.next_dir = dir;
        }
    }

    fn step(&mut self, rng: &mut StdRng) {
        if !self.alive {
            return;
        }
        self.dir = self.next_dir;
        let Some(&(hx, hy)) = self.body.front() else {
            return;
        };
        let (dx, dy) = self.dir.delta();
        let head = (hx + dx, hy + dy);
        if head.0 < 0 || head.1 < 0 || head.0 >= self.cols || head.1 >= self.rows {
            self.alive = false;
            return;
        }
        let eating = head == self.food;
        if !eating {
            self.body.pop_back();
        }
        if self.body.contains(&head) {
            self.alive = false;
            return;
        }
        self.body.push_front(head);
        if eating {
            self.score += 1;
            self.place_food(rng);
        }
    }
}

pub struct Snake {
    seed: Option<u64>,
    rng: StdRng,
    measured: Cell<Option<(i32, i32)>>,
    board: Option<Board>,
    acc: f32,
}

impl Snake {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            rng: make_rng(seed),
            measured: Cell::new(None),
            board: None,
            acc: 0.0,
        }
    }

    /// Start immediately on a fixed grid without waiting for a render.
    pub fn with_grid(cols: i32, rows: i32, seed: Option<u64>) -> Self {
        let mut snake = Self::new(seed);
        let cols = cols.clamp(MIN_COLS, MAX_COLS);
        let rows = rows.clamp(MIN_ROWS, MAX_ROWS);
        snake.measured.set(Some((cols, rows)));
        snake.board = Some(Board::new(cols, rows, &mut snake.rng));
        snake
    }

    pub fn is_alive(&self) -> bool {
        self.board.as_ref().is_none_or(|b| b.alive)
    }

    pub fn score(&self) -> u32 {
        self.board.as_ref().map_or(0, |b| b.score)
    }

    pub fn len(&self) -> usize {
        self.board.as_ref().map_or(0, |b| b.body.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance one grid step.
    pub fn step(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.step(&mut self.rng);
        }
    }

    fn ensure_board(&mut self) {
        if self.board.is_none() {
            if let Some((cols, rows)) = self.measured.get() {
                log::debug!("snake board {cols}x{rows}");
                self.board = Some(Board::new(cols, rows, &mut self.rng));
            }
        }
    }

    fn restart(&mut self) {
        if let Some((cols, rows)) = self.measured.get() {
            self.board = Some(Board::new(cols, rows, &mut self.rng));
        }
        self.acc = 0.0;
    }
}

impl Program for Snake {
    fn name(&self) -> &str {
        "snake"
    }

    fn on_input(&mut self, key: Key) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        if !board.alive {
            if key == Key::Enter || key.lower_char() == Some('r') {
                self.restart();
            }
            return;
        }
        if let Some(dir) = Direction::from_key(key) {
            board.turn(dir);
        }
    }

    fn tick(&mut self, dt: f32) {
        self.ensure_board();
        if self.board.is_none() {
            return;
        }
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
        if self.measured.get().is_none() {
            self.measured.set(Some(grid_for(width, height)));
        }
        let font = font_for(HUD_PX * 2, 2).min(font_for(height, 20));
        let Some(board) = self.board.as_ref() else {
            return draw_centered(canvas, "loading...", width, height as i32 / 2, font, theme.dim);
        };

        let avail_h = height.saturating_sub(HUD_PX);
        let cell = (width / board.cols as u32)
            .min(avail_h / board.rows as u32)
            .max(1);
        let board_w = cell * board.cols as u32;
        let board_h = cell * board.rows as u32;
        let ox = (width.saturating_sub(board_w) / 2) as i32;
        let oy = HUD_PX as i32 + (avail_h.saturating_sub(board_h) / 2) as i32;
        let at = |p: Pos| (ox + p.0 * cell as i32, oy + p.1 * cell as i32);

        canvas.stroke_rect(ox - 1, oy - 1, board_w + 2, board_h + 2, 1, theme.dim)?;

        let food_px = cell.saturating_sub(4).max(1);
        let (fx, fy) = at(board.food);
        canvas.fill_rect(fx + 2, fy + 2, food_px, food_px, theme.accent)?;

        let part_px = cell.saturating_sub(2).max(1);
        for (i, part) in board.body.iter().enumerate() {
            let (x, y) = at(*part);
            let color = if i == 0 { theme.accent } else { theme.text };
            canvas.fill_rect(x + 1, y + 1, part_px, part_px, color)?;
        }

        canvas.draw_text(&format!("Score: {}", board.score), 4, 4, font, theme.text)?;
        if !board.alive {
            let msg = if board.won {
                "You win! Enter to play again"
            } else {
                "Game over. Enter to restart"
            };
            draw_centered(canvas, msg, width, height as i32 / 2, font, theme.accent)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockCanvas;

    fn board(snake: &mut Snake) -> &mut Board {
        snake.board.as_mut().unwrap()
    }

    #[test]
    fn grid_is_clamped() {
        assert_eq!(grid_for(10, 10), (MIN_COLS, MIN_ROWS));
        assert_eq!(grid_for(10_000, 10_000), (MAX_COLS, MAX_ROWS));
        assert_eq!(grid_for(320, 24 + 160), (20, 10));
    }

    #[test]
    fn idle_until_first_render() {
        let mut snake = Snake::new(Some(1));
        snake.tick(1.0);
        assert!(snake.board.is_none());
        let mut canvas = MockCanvas::new();
        snake.render(&mut canvas, 320, 240, &Theme::default()).unwrap();
        snake.tick(0.0);
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn length_constant_without_food() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        board(&mut snake).food = (0, 0);
        for _ in 0..5 {
            snake.step();
            assert_eq!(snake.len(), 3);
        }
        assert!(snake.is_alive());
    }

    #[test]
    fn eating_grows_by_exactly_one() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        let head = board(&mut snake).body[0];
        board(&mut snake).food = (head.0 + 1, head.1);
        snake.step();
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.score(), 1);
        let food = board(&mut snake).food;
        assert!(!board(&mut snake).body.contains(&food));
        // The tick after eating does not grow again.
        board(&mut snake).food = (0, 0);
        snake.step();
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn reversal_is_rejected() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        snake.on_input(Key::ArrowLeft);
        assert_eq!(board(&mut snake).next_dir, Direction::Right);
        snake.on_input(Key::Char('w'));
        assert_eq!(board(&mut snake).next_dir, Direction::Up);
    }

    #[test]
    fn quick_double_turn_cannot_reverse() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        snake.on_input(Key::ArrowUp);
        // Left still reverses the committed direction (Right).
        snake.on_input(Key::ArrowLeft);
        assert_eq!(board(&mut snake).next_dir, Direction::Up);
        snake.step();
        assert!(snake.is_alive());
        assert_eq!(board(&mut snake).dir, Direction::Up);
    }

    #[test]
    fn wall_collision_ends_game() {
        let mut snake = Snake::with_grid(10, 8, Some(3));
        board(&mut snake).food = (0, 0);
        for _ in 0..10 {
            snake.step();
        }
        assert!(!snake.is_alive());
    }

    #[test]
    fn self_intersection_ends_game() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        {
            let b = board(&mut snake);
            b.body = [(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)].into_iter().collect();
            b.dir = Direction::Up;
            b.next_dir = Direction::Down;
            b.food = (0, 0);
        }
        snake.step();
        assert!(!snake.is_alive());
    }

    #[test]
    fn moving_into_vacated_tail_is_allowed() {
        let mut snake = Snake::with_grid(20, 10, Some(3));
        {
            let b = board(&mut snake);
            b.body = [(5, 5), (6, 5), (6, 6), (5, 6)].into_iter().collect();
            b.dir = Direction::Left;
            b.next_dir = Direction::Down;
            b.food = (0, 0);
        }
        snake.step();
        assert!(snake.is_alive());
        assert_eq!(board(&mut snake).body[0], (5, 6));
    }

    #[test]
    fn enter_restarts_after_death() {
        let mut snake = Snake::with_grid(10, 8, Some(3));
        board(&mut snake).alive = false;
        snake.on_input(Key::Enter);
        assert!(snake.is_alive());
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn tick_steps_on_fixed_interval() {
        let mut snake = Snake::with_grid(40, 30, Some(3));
        board(&mut snake).food = (0, 0);
        let start = board(&mut snake).body[0];
        snake.tick(STEP_SECS * 2.5);
        assert_eq!(board(&mut snake).body[0], (start.0 + 2, start.1));
    }
}
