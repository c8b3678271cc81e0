//! Pong against a speed-capped AI.
//!
//! The field is normalized to `[0, 1] x [0, 1]` with `y` growing downwards.
//! The player's paddle sits along the bottom edge, the AI's along the top.

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;
use rand::Rng;
use rand::rngs::StdRng;

use crate::{Program, draw_centered, font_for, make_rng};

pub const LIVES: u32 = 3;
pub const PADDLE_W: f32 = 0.18;
pub const PADDLE_H: f32 = 0.02;
pub const PLAYER_Y: f32 = 0.92;
pub const AI_Y: f32 = 0.08;
pub const BALL_R: f32 = 0.015;
/// Player paddle movement per key press.
pub const PLAYER_STEP: f32 = 0.06;
/// AI paddle speed cap, field widths per second.
pub const AI_MAX_SPEED: f32 = 0.45;
pub const SERVE_SPEED: f32 = 0.55;
pub const MAX_SPEED: f32 = 1.2;
/// Vertical speed multiplier per paddle hit.
pub const SPEEDUP: f32 = 1.05;
/// Maximum random horizontal kick on a paddle hit.
pub const ENGLISH: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

pub struct Pong {
    seed: Option<u64>,
    rng: StdRng,
    ball: Ball,
    player_x: f32,
    ai_x: f32,
    lives: u32,
    player_score: u32,
    ai_score: u32,
    over: bool,
}

fn clamp_paddle(x: f32) -> f32 {
    x.clamp(PADDLE_W / 2.0, 1.0 - PADDLE_W / 2.0)
}

impl Pong {
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = make_rng(seed);
        let ball = serve(&mut rng, -1.0);
        Self {
            seed,
            rng,
            ball,
            player_x: 0.5,
            ai_x: 0.5,
            lives: LIVES,
            player_score: 0,
            ai_score: 0,
            over: false,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// `(player, ai)` points.
    pub fn score(&self) -> (u32, u32) {
        (self.player_score, self.ai_score)
    }

    fn update(&mut self, dt: f32) {
        let ball = &mut self.ball;
        ball.x += ball.vx * dt;
        ball.y += ball.vy * dt;

        if ball.x < BALL_R {
            ball.x = BALL_R;
            ball.vx = ball.vx.abs();
        } else if ball.x > 1.0 - BALL_R {
            ball.x = 1.0 - BALL_R;
            ball.vx = -ball.vx.abs();
        }

        // AI follows the ball's x at a capped speed.
        let max_move = AI_MAX_SPEED * dt;
        let diff = (self.ball.x - self.ai_x).clamp(-max_move, max_move);
        self.ai_x = clamp_paddle(self.ai_x + diff);

        let reach = PADDLE_W / 2.0 + BALL_R;
        if self.ball.vy < 0.0
            && self.ball.y - BALL_R <= AI_Y + PADDLE_H / 2.0
            && self.ball.y >= AI_Y - PADDLE_H
            && (self.ball.x - self.ai_x).abs() <= reach
        {
            self.ball.y = AI_Y + PADDLE_H / 2.0 + BALL_R;
            self.bounce(1.0);
        } else if self.ball.vy > 0.0
            && self.ball.y + BALL_R >= PLAYER_Y - PADDLE_H / 2.0
            && self.ball.y <= PLAYER_Y + PADDLE_H
            && (self.ball.x - self.player_x).abs() <= reach
        {
            self.ball.y = PLAYER_Y - PADDLE_H / 2.0 - BALL_R;
            self.bounce(-1.0);
        }

        if self.ball.y > 1.0 + BALL_R {
            self.ai_score += 1;
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                log::debug!("pong over {}:{}", self.player_score, self.ai_score);
                self.over = true;
            } else {
                self.ball = serve(&mut self.rng, -1.0);
            }
        } else if self.ball.y < -BALL_R {
            self.player_score += 1;
            self.ball = serve(&mut self.rng, 1.0);
        }
    }

    /// Send the ball back vertically (`dir` is the new sign of `vy`).
    fn bounce(&mut self, dir: f32) {
        let speed = (self.ball.vy.abs() * SPEEDUP).min(MAX_SPEED);
        self.ball.vy = dir * speed;
        self.ball.vx += self.rng.gen_range(-ENGLISH..=ENGLISH);
    }
}

/// A ball at the center heading up (`dir < 0`) or down.
fn serve(rng: &mut StdRng, dir: f32) -> Ball {
    let vx = rng.gen_range(0.15..0.3) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Ball {
        x: 0.5,
        y: 0.5,
        vx,
        vy: dir * SERVE_SPEED,
    }
}

impl Program for Pong {
    fn name(&self) -> &str {
        "pong"
    }

    fn on_input(&mut self, key: Key) {
        if self.over {
            if key == Key::Enter || key.lower_char() == Some('r') {
                self.reset();
            }
            return;
        }
        match key {
            Key::ArrowLeft | Key::Char('a') | Key::Char('A') => {
                self.player_x = clamp_paddle(self.player_x - PLAYER_STEP);
            },
            Key::ArrowRight | Key::Char('d') | Key::Char('D') => {
                self.player_x = clamp_paddle(self.player_x + PLAYER_STEP);
            },
            _ => {},
        }
    }

    fn tick(&mut self, dt: f32) {
        if self.over {
            return;
        }
        // Substeps keep fast balls from tunnelling through paddles.
        let mut remaining = dt.min(0.25);
        while remaining > 0.0 && !self.over {
            let step = remaining.min(1.0 / 120.0);
            self.update(step);
            remaining -= step;
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
        let w = width as f32;
        let h = height as f32;
        let paddle_w = (PADDLE_W * w).max(2.0) as u32;
        let paddle_h = (PADDLE_H * h).max(2.0) as u32;

        // Center line.
        let dash = (w / 40.0).max(2.0) as u32;
        let mut x = 0;
        while x < width {
            canvas.fill_rect(x as i32, (h / 2.0) as i32, dash, 1, theme.dim)?;
            x += dash * 2;
        }

        for (cx, cy, color) in [
            (self.ai_x, AI_Y, theme.dim),
            (self.player_x, PLAYER_Y, theme.text),
        ] {
            let px = (cx * w) as i32 - paddle_w as i32 / 2;
            let py = (cy * h) as i32 - paddle_h as i32 / 2;
            canvas.fill_rect(px, py, paddle_w, paddle_h, color)?;
        }

        let radius = (BALL_R * w.min(h)).max(1.0) as u16;
        canvas.fill_circle(
            (self.ball.x * w) as i32,
            (self.ball.y * h) as i32,
            radius,
            theme.accent,
        )?;

        let font = font_for(height, 24);
        let hud = format!(
            "You {}  AI {}  Lives {}",
            self.player_score, self.ai_score, self.lives
        );
        canvas.draw_text(&hud, 4, (h / 2.0) as i32 + 4, font, theme.dim)?;
        if self.over {
            draw_centered(
                canvas,
                "Game over. Enter to play again",
                width,
                (h * 0.35) as i32,
                font,
                theme.accent,
            )?;
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

    fn pong() -> Pong {
        Pong::new(Some(42))
    }

    #[test]
    fn ai_speed_is_capped() {
        let mut game = pong();
        game.ball = Ball {
            x: 0.95,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
        };
        game.update(0.1);
        assert!((game.ai_x - (0.5 + AI_MAX_SPEED * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn ball_reflects_off_side_walls() {
        let mut game = pong();
        game.ball = Ball {
            x: 0.99,
            y: 0.5,
            vx: 0.5,
            vy: 0.0,
        };
        game.update(0.05);
        assert!(game.ball.vx < 0.0);
        assert!(game.ball.x <= 1.0 - BALL_R);
    }

    #[test]
    fn player_paddle_returns_ball_faster() {
        let mut game = pong();
        game.ball = Ball {
            x: 0.5,
            y: PLAYER_Y - PADDLE_H / 2.0 - BALL_R - 0.001,
            vx: 0.0,
            vy: 0.5,
        };
        game.update(0.01);
        assert!(game.ball.vy < 0.0);
        assert!((game.ball.vy.abs() - 0.5 * SPEEDUP).abs() < 1e-5);
        assert!(game.ball.vx.abs() <= ENGLISH);
    }

    #[test]
    fn miss_costs_a_life_not_the_game() {
        let mut game = pong();
        game.player_x = 0.1;
        game.ball = Ball {
            x: 0.9,
            y: 1.0,
            vx: 0.0,
            vy: 0.5,
        };
        game.update(0.1);
        assert_eq!(game.lives(), LIVES - 1);
        assert!(!game.is_over());
        assert_eq!(game.score(), (0, 1));
        assert_eq!(game.ball.y, 0.5);
    }

    #[test]
    fn last_life_ends_game() {
        let mut game = pong();
        game.lives = 1;
        game.player_x = 0.1;
        game.ball = Ball {
            x: 0.9,
            y: 1.0,
            vx: 0.0,
            vy: 0.5,
        };
        game.update(0.1);
        assert!(game.is_over());
        game.on_input(Key::ArrowLeft);
        assert!(game.is_over());
        game.on_input(Key::Enter);
        assert!(!game.is_over());
        assert_eq!(game.lives(), LIVES);
    }

    #[test]
    fn passing_ai_scores_for_player() {
        let mut game = pong();
        game.ai_x = 0.9;
        game.ball = Ball {
            x: 0.1,
            y: 0.0,
            vx: 0.0,
            vy: -0.5,
        };
        game.update(0.1);
        assert_eq!(game.score(), (1, 0));
    }

    #[test]
    fn paddle_stays_on_field() {
        let mut game = pong();
        for _ in 0..50 {
            game.on_input(Key::ArrowLeft);
        }
        assert_eq!(game.player_x, PADDLE_W / 2.0);
    }

    #[test]
    fn render_draws_hud() {
        let game = pong();
        let mut canvas = MockCanvas::new();
        game.render(&mut canvas, 400, 300, &Theme::default()).unwrap();
        assert!(canvas.has_text("Lives 3"));
    }
}
