use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::Rng;
use ratatui::style::Color;

use crate::games::{Action, Game, GameContext, Phase, Session};
use crate::i18n::ArcadeText;
use crate::input::{Channel, InputEvent, Subscription};
use crate::surface::{Surface, NEON_BLUE, NEON_GREEN, NEON_PINK};

const BRICK_ROWS: usize = 6;
const BRICK_COLS: usize = 8;
const BRICK_PADDING: f32 = 8.0;
const BRICK_TOP: f32 = 60.0;
const BRICK_LEFT: f32 = 35.0;
const BRICK_HEIGHT: f32 = 20.0;
const BRICK_POINTS: u32 = 20;
const PALETTE: [Color; 3] = [NEON_PINK, NEON_BLUE, NEON_GREEN];

const PADDLE_W: f32 = 100.0;
const PADDLE_H: f32 = 15.0;
/// Paddle top, measured up from the bottom edge.
const PADDLE_RISE: f32 = 25.0;
const PADDLE_STEP: f32 = 40.0;
const BALL_SIZE: f32 = 6.0;
const START_SPEED: f32 = 3.0;
const PADDLE_SPEED_UP: f32 = 1.01;
const PADDLE_SPEED_CAP: f32 = 7.0;
/// Horizontal velocity per pixel of offset from the paddle centre.
const ANGLE_GAIN: f32 = 0.15;

#[derive(Clone, Debug)]
struct Brick {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    active: bool,
    color: Color,
}

impl Brick {
    fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.w && y > self.y && y < self.y + self.h
    }
}

pub struct Breaker {
    session: Session,
    paddle_x: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    ball_speed: f32,
    bricks: Vec<Brick>,
    level: u32,
    rng: StdRng,
    text: &'static ArcadeText,
    keys: Subscription,
    pointer: Subscription,
}

impl Breaker {
    pub fn new(ctx: GameContext) -> Self {
        let size = ctx.size;
        let mut b = Self {
            session: Session::new(size, Phase::Serving, ctx.callbacks),
            paddle_x: size.w() / 2.0 - PADDLE_W / 2.0,
            ball_x: size.w() / 2.0,
            ball_y: size.h() - 40.0,
            ball_dx: 0.0,
            ball_dy: 0.0,
            ball_speed: START_SPEED,
            bricks: Vec::new(),
            level: 1,
            rng: ctx.rng,
            text: ctx.text,
            keys: ctx.hub.subscribe(Channel::Keyboard),
            pointer: ctx.hub.subscribe(Channel::Pointer),
        };
        b.init_bricks();
        b
    }

    fn width(&self) -> f32 {
        self.session.size.w()
    }

    fn height(&self) -> f32 {
        self.session.size.h()
    }

    fn paddle_top(&self) -> f32 {
        self.height() - PADDLE_RISE
    }

    fn init_bricks(&mut self) {
        self.bricks.clear();
        let width = (self.width() - BRICK_LEFT * 2.0 - BRICK_PADDING * (BRICK_COLS as f32 - 1.0))
            / BRICK_COLS as f32;
        for col in 0..BRICK_COLS {
            for row in 0..BRICK_ROWS {
                self.bricks.push(Brick {
                    x: col as f32 * (width + BRICK_PADDING) + BRICK_LEFT,
                    y: row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_TOP,
                    w: width,
                    h: BRICK_HEIGHT,
                    active: true,
                    color: PALETTE[row % PALETTE.len()],
                });
            }
        }
    }

    fn set_paddle_x(&mut self, x: f32) {
        self.paddle_x = x.clamp(0.0, (self.width() - PADDLE_W).max(0.0));
    }

    fn launch(&mut self) {
        if self.session.phase() != Phase::Serving {
            return;
        }
        self.ball_dx = self.rng.gen_range(-1.0f32..1.0) * self.ball_speed;
        self.ball_dy = -self.ball_speed;
        self.session.set_phase(Phase::Running);
    }

    fn move_ball(&mut self) {
        if self.session.phase() == Phase::Serving {
            self.ball_x = self.paddle_x + PADDLE_W / 2.0;
            self.ball_y = self.height() - 30.0;
            return;
        }

        self.ball_x += self.ball_dx;
        self.ball_y += self.ball_dy;

        // Walls
        if self.ball_x < 0.0 {
            self.ball_x = 0.0;
            self.ball_dx = self.ball_dx.abs();
        } else if self.ball_x > self.width() {
            self.ball_x = self.width();
            self.ball_dx = -self.ball_dx.abs();
        }
        if self.ball_y < 0.0 {
            self.ball_y = 0.0;
            self.ball_dy = self.ball_dy.abs();
        }

        if self.ball_y > self.height() {
            log::info!("breaker: ball lost on level {}, final score {}", self.level, self.session.score());
            self.session.end();
            return;
        }

        // Paddle
        let top = self.paddle_top();
        if self.ball_dy > 0.0
            && self.ball_x > self.paddle_x
            && self.ball_x < self.paddle_x + PADDLE_W
            && self.ball_y + BALL_SIZE > top
            && self.ball_y < top + PADDLE_H
        {
            let offset = self.ball_x - (self.paddle_x + PADDLE_W / 2.0);
            self.ball_dx = offset * ANGLE_GAIN;
            // Never slow an escalated ball back down to the cap.
            self.ball_speed = (self.ball_speed * PADDLE_SPEED_UP)
                .min(PADDLE_SPEED_CAP)
                .max(self.ball_speed);
            self.ball_dy = -self.ball_speed;
        }

        // Bricks: first hit wins, one per frame.
        let (bx, by) = (self.ball_x, self.ball_y);
        if let Some(brick) = self.bricks.iter_mut().find(|b| b.active && b.contains(bx, by)) {
            brick.active = false;
            self.ball_dy = -self.ball_dy;
            self.session.add_points(BRICK_POINTS);
        }

        if self.bricks.iter().all(|b| !b.active) {
            self.next_level();
        }
    }

    fn next_level(&mut self) {
        self.init_bricks();
        self.ball_speed += 1.0;
        self.ball_dy = -self.ball_speed;
        self.level += 1;
        log::info!("breaker: grid cleared, level {} at speed {:.1}", self.level, self.ball_speed);
        self.session.set_phase(Phase::Serving);
    }

    fn handle_input(&mut self) {
        for event in self.keys.drain().into_iter().chain(self.pointer.drain()) {
            match event {
                InputEvent::Key(key) => match key.code {
                    KeyCode::Left => self.action(Action::Left),
                    KeyCode::Right => self.action(Action::Right),
                    KeyCode::Char(' ') | KeyCode::Up => self.action(Action::Action),
                    _ => {}
                },
                InputEvent::Pointer { x, .. } => self.set_paddle_x(x - PADDLE_W / 2.0),
            }
        }
    }
}

impl Game for Breaker {
    fn update(&mut self) {
        self.handle_input();
        if self.session.is_over() {
            return;
        }
        self.move_ball();
    }

    fn draw(&self, surface: &mut Surface) {
        surface.fill_rect(self.paddle_x, self.paddle_top(), PADDLE_W, PADDLE_H, NEON_BLUE);
        surface.fill_circle(self.ball_x, self.ball_y, BALL_SIZE, Color::White);
        for brick in self.bricks.iter().filter(|b| b.active) {
            surface.fill_rect(brick.x, brick.y, brick.w, brick.h, brick.color);
        }
        if self.session.phase() == Phase::Serving {
            surface.text(self.width() / 2.0, self.height() / 2.0, self.text.press_start, Color::White);
        }
        surface.text(
            self.width() - 60.0,
            10.0,
            format!("LV {}", self.level),
            Color::Rgb(120, 120, 140),
        );
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::Left => self.set_paddle_x(self.paddle_x - PADDLE_STEP),
            Action::Right => self.set_paddle_x(self.paddle_x + PADDLE_STEP),
            Action::Action => self.launch(),
            Action::Up | Action::Down => {}
        }
    }

    fn cleanup(&mut self) {
        self.keys.release();
        self.pointer.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::*;
    use crate::input::InputHub;

    fn breaker(hub: &InputHub, rec: &Recorder) -> Breaker {
        Breaker::new(context(hub, rec, 11))
    }

    #[test]
    fn grid_layout() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let b = breaker(&hub, &rec);
        assert_eq!(b.bricks.len(), BRICK_ROWS * BRICK_COLS);
        let first = &b.bricks[0];
        assert_eq!((first.x, first.y), (BRICK_LEFT, BRICK_TOP));
        assert_eq!(b.bricks[1].color, NEON_BLUE);
        assert_eq!(b.bricks[3].color, NEON_PINK);
        let last = b.bricks.last().unwrap();
        assert!((last.x + last.w - (800.0 - BRICK_LEFT)).abs() < 1e-3);
    }

    #[test]
    fn serving_ball_tracks_paddle() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.action(Action::Left);
        b.update();
        assert_eq!(b.ball_x, b.paddle_x + PADDLE_W / 2.0);
        assert_eq!(b.ball_y, 570.0);
        hub.publish(InputEvent::Pointer { x: 10_000.0, y: 0.0 });
        b.update();
        assert_eq!(b.paddle_x, 700.0);
        assert_eq!(b.ball_x, 750.0);
    }

    #[test]
    fn launch_goes_up_at_speed() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.action(Action::Action);
        assert_eq!(b.session.phase(), Phase::Running);
        assert_eq!(b.ball_dy, -START_SPEED);
        assert!(b.ball_dx.abs() <= START_SPEED);
    }

    #[test]
    fn one_brick_per_frame() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.session.set_phase(Phase::Running);
        // Make two bricks overlap the ball's next position.
        b.bricks[1] = b.bricks[0].clone();
        let target = b.bricks[0].clone();
        b.ball_x = target.x + target.w / 2.0;
        b.ball_y = target.y + target.h / 2.0 + 3.0;
        b.ball_dx = 0.0;
        b.ball_dy = -3.0;

        b.update();

        assert_eq!(b.bricks.iter().filter(|b| !b.active).count(), 1);
        assert!(!b.bricks[0].active);
        assert_eq!(b.ball_dy, 3.0);
        assert_eq!(rec.scores(), vec![20]);
        assert_eq!(b.bricks.len(), BRICK_ROWS * BRICK_COLS);
    }

    #[test]
    fn paddle_hit_steers_by_offset() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.session.set_phase(Phase::Running);
        b.paddle_x = 350.0;
        b.ball_x = 420.0;
        b.ball_y = 568.0;
        b.ball_dx = 0.0;
        b.ball_dy = 3.0;

        b.update();

        assert!((b.ball_dx - 20.0 * ANGLE_GAIN).abs() < 1e-4);
        assert!(b.ball_dy < 0.0);
        assert!((b.ball_speed - 3.03).abs() < 1e-4);
    }

    #[test]
    fn clearing_grid_regenerates_once_and_speeds_up() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.session.set_phase(Phase::Running);
        for brick in b.bricks.iter_mut().skip(1) {
            brick.active = false;
        }
        let last = b.bricks[0].clone();
        b.ball_x = last.x + last.w / 2.0;
        b.ball_y = last.y + last.h / 2.0 + 3.0;
        b.ball_dx = 0.0;
        b.ball_dy = -3.0;
        let before = b.ball_speed;

        b.update();

        assert!(b.bricks.iter().all(|b| b.active));
        assert_eq!(b.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert!(b.ball_speed > before);
        assert_eq!(b.level, 2);
        assert_eq!(b.session.phase(), Phase::Serving);

        b.update();
        assert_eq!(b.level, 2);
    }

    #[test]
    fn escalated_speed_is_not_capped_down() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.session.set_phase(Phase::Running);
        b.ball_speed = 9.0;
        b.paddle_x = 350.0;
        b.ball_x = 400.0;
        b.ball_y = 568.0;
        b.ball_dy = 3.0;
        b.update();
        assert_eq!(b.ball_speed, 9.0);
    }

    #[test]
    fn falling_below_ends_session() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut b = breaker(&hub, &rec);
        b.session.set_phase(Phase::Running);
        b.paddle_x = 0.0;
        b.ball_x = 600.0;
        b.ball_y = 598.0;
        b.ball_dx = 0.0;
        b.ball_dy = 3.0;
        b.update();
        b.update();
        assert_eq!(rec.notes(), vec![Note::Over(0)]);
    }
}
