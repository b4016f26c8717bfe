use std::f32::consts::FRAC_PI_4;

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::Rng;
use ratatui::style::Color;

use crate::games::{Action, Game, GameContext, Phase, Session};
use crate::i18n::ArcadeText;
use crate::input::{Channel, InputEvent, Subscription};
use crate::surface::{Surface, NEON_BLUE, NEON_PINK};

const PADDLE_W: f32 = 15.0;
const PADDLE_H: f32 = 80.0;
const BALL_SIZE: f32 = 8.0;
const BASE_SPEED: f32 = 3.0;
const MAX_SPEED: f32 = 12.0;
const SPEED_UP: f32 = 1.02;
const AI_SPEED: f32 = 2.5;
const AI_DEAD_ZONE: f32 = 10.0;
const AI_NOISE: f32 = 15.0;
const PLAYER_STEP: f32 = 20.0;
/// Smallest serve angle, so a serve is never perfectly flat.
const MIN_SERVE_ANGLE: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
}

pub struct Pong {
    session: Session,
    player_y: f32,
    ai_y: f32,
    ball: Ball,
    rng: StdRng,
    text: &'static ArcadeText,
    keys: Subscription,
    pointer: Subscription,
}

impl Pong {
    pub fn new(ctx: GameContext) -> Self {
        let size = ctx.size;
        let mid = size.h() / 2.0 - PADDLE_H / 2.0;
        let mut p = Self {
            session: Session::new(size, Phase::Serving, ctx.callbacks),
            player_y: mid,
            ai_y: mid,
            ball: Ball { x: 0.0, y: 0.0, dx: 0.0, dy: 0.0, speed: BASE_SPEED },
            rng: ctx.rng,
            text: ctx.text,
            keys: ctx.hub.subscribe(Channel::Keyboard),
            pointer: ctx.hub.subscribe(Channel::Pointer),
        };
        p.reset_ball();
        p
    }

    fn width(&self) -> f32 {
        self.session.size.w()
    }

    fn height(&self) -> f32 {
        self.session.size.h()
    }

    fn set_player_y(&mut self, y: f32) {
        self.player_y = y.clamp(0.0, (self.height() - PADDLE_H).max(0.0));
    }

    fn reset_ball(&mut self) {
        self.ball = Ball {
            x: self.width() / 2.0 - BALL_SIZE / 2.0,
            y: self.height() / 2.0 - BALL_SIZE / 2.0,
            dx: 0.0,
            dy: 0.0,
            speed: BASE_SPEED,
        };
        self.session.set_phase(Phase::Serving);
    }

    fn serve(&mut self) {
        if self.session.phase() != Phase::Serving {
            return;
        }
        let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let tilt = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let angle = tilt * self.rng.gen_range(MIN_SERVE_ANGLE..FRAC_PI_4);
        self.ball.speed = BASE_SPEED;
        self.ball.dx = side * BASE_SPEED * angle.cos();
        self.ball.dy = BASE_SPEED * angle.sin();
        self.session.set_phase(Phase::Running);
    }

    fn move_ai(&mut self) {
        let centre = self.ai_y + PADDLE_H / 2.0;
        let target = if self.ball.dx > 0.0 {
            self.ball.y + self.rng.gen_range(-AI_NOISE..AI_NOISE)
        } else {
            self.height() / 2.0
        };
        if centre < target - AI_DEAD_ZONE {
            self.ai_y += AI_SPEED;
        } else if centre > target + AI_DEAD_ZONE {
            self.ai_y -= AI_SPEED;
        }
        self.ai_y = self.ai_y.clamp(0.0, (self.height() - PADDLE_H).max(0.0));
    }

    /// Bounce off the paddle at (`paddle_x`, `paddle_y`) if the ball box overlaps it.
    fn check_paddle(&mut self, paddle_x: f32, paddle_y: f32, is_player: bool) {
        let b = self.ball;
        let toward = if is_player { b.dx < 0.0 } else { b.dx > 0.0 };
        let overlaps = b.x < paddle_x + PADDLE_W
            && b.x + BALL_SIZE > paddle_x
            && b.y < paddle_y + PADDLE_H
            && b.y + BALL_SIZE > paddle_y;
        if !toward || !overlaps {
            return;
        }

        // -1 at the top edge, 1 at the bottom
        let centre = paddle_y + PADDLE_H / 2.0;
        let hit = ((b.y + BALL_SIZE / 2.0 - centre) / (PADDLE_H / 2.0)).clamp(-1.0, 1.0);
        let angle = hit * FRAC_PI_4;
        let direction = if is_player { 1.0 } else { -1.0 };

        self.ball.speed = (b.speed * SPEED_UP).min(MAX_SPEED);
        self.ball.dx = direction * self.ball.speed * angle.cos();
        self.ball.dy = self.ball.speed * angle.sin();
        self.ball.x = if is_player {
            paddle_x + PADDLE_W + 1.0
        } else {
            paddle_x - BALL_SIZE - 1.0
        };
    }

    fn handle_input(&mut self) {
        for event in self.keys.drain().into_iter().chain(self.pointer.drain()) {
            match event {
                InputEvent::Key(key) => match key.code {
                    KeyCode::Char(' ') => self.serve(),
                    KeyCode::Up => self.action(Action::Up),
                    KeyCode::Down => self.action(Action::Down),
                    _ => {}
                },
                InputEvent::Pointer { y, .. } => self.set_player_y(y - PADDLE_H / 2.0),
            }
        }
    }
}

impl Game for Pong {
    fn update(&mut self) {
        self.handle_input();
        if self.session.is_over() {
            return;
        }

        // Opponent tracks even while waiting for the serve
        self.move_ai();

        if self.session.phase() == Phase::Serving {
            return;
        }

        // Ball
        self.ball.x += self.ball.dx;
        self.ball.y += self.ball.dy;

        // Walls
        let h = self.height();
        if self.ball.y <= 0.0 || self.ball.y + BALL_SIZE >= h {
            self.ball.dy = -self.ball.dy;
            // Re-seat just inside the wall so the bounce fires once.
            self.ball.y = if self.ball.y <= 0.0 { 1.0 } else { h - BALL_SIZE - 1.0 };
        }

        // Paddles, only the one on the ball's side
        if self.ball.x < self.width() / 2.0 {
            self.check_paddle(0.0, self.player_y, true);
        } else {
            self.check_paddle(self.width() - PADDLE_W, self.ai_y, false);
        }

        // Misses
        if self.ball.x < 0.0 {
            log::info!("pong: player missed, final score {}", self.session.score());
            self.session.end();
        } else if self.ball.x > self.width() {
            self.session.add_points(1);
            self.reset_ball();
        }
    }

    fn draw(&self, surface: &mut Surface) {
        let (w, h) = (self.width(), self.height());
        surface.dashed_vline(w / 2.0, 10.0, 15.0, Color::Rgb(60, 60, 80));
        surface.fill_rect(0.0, self.player_y, PADDLE_W, PADDLE_H, NEON_BLUE);
        surface.fill_rect(w - PADDLE_W, self.ai_y, PADDLE_W, PADDLE_H, NEON_PINK);
        surface.fill_circle(
            self.ball.x + BALL_SIZE / 2.0,
            self.ball.y + BALL_SIZE / 2.0,
            BALL_SIZE / 2.0,
            Color::White,
        );
        if self.session.phase() == Phase::Serving {
            surface.text(w / 2.0, h / 2.0 - 50.0, self.text.press_start, Color::White);
        }
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::Action => self.serve(),
            Action::Up => self.set_player_y(self.player_y - PLAYER_STEP),
            Action::Down => self.set_player_y(self.player_y + PLAYER_STEP),
            Action::Left | Action::Right => {}
        }
    }

    fn cleanup(&mut self) {
        self.keys.release();
        self.pointer.release();
    }
}
