use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::Rng;
use ratatui::style::Color;

use crate::games::{Action, Game, GameContext, Phase, Session};
use crate::input::{Channel, InputEvent, Subscription};
use crate::surface::{Surface, NEON_BLUE, NEON_GREEN, NEON_PINK};

const ENEMY_ROWS: usize = 4;
const ENEMY_COLS: usize = 8;
const ENEMY_TOTAL: usize = ENEMY_ROWS * ENEMY_COLS;
const ENEMY_W: f32 = 30.0;
const ENEMY_H: f32 = 20.0;
const ENEMY_ORIGIN: (f32, f32) = (50.0, 50.0);
const ENEMY_SPACING: (f32, f32) = (60.0, 40.0);
const ENEMY_START_SPEED: f32 = 0.5;
const ENEMY_SPEED_STEP: f32 = 0.2;
const ENEMY_STEP_DOWN: f32 = 20.0;
const ENEMY_SHOT_SPEED: f32 = 4.0;
const ENEMY_POINTS: u32 = 50;
const BASE_FIRE_CHANCE: f64 = 0.02;

const SHIP_W: f32 = 30.0;
const SHIP_H: f32 = 20.0;
const SHIP_SPEED: f32 = 3.0;
const SHIP_SHOT_SPEED: f32 = 7.0;
const SHOT_COOLDOWN: Duration = Duration::from_millis(300);
/// Left and right edges, as offsets from the sides.
const BOUND_LEFT: f32 = 10.0;
const BOUND_RIGHT: f32 = 40.0;
/// Terminals report no key release, so a press holds for about 100ms.
const HOLD_FRAMES: u32 = 6;

#[derive(Clone, Debug)]
struct Enemy {
    x: f32,
    y: f32,
    active: bool,
    /// Formation row, 0 at the top.
    kind: usize,
}

impl Enemy {
    fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + ENEMY_W && y > self.y && y < self.y + ENEMY_H
    }

    fn color(&self) -> Color {
        if self.kind % 2 == 0 {
            NEON_GREEN
        } else {
            NEON_PINK
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Shot {
    x: f32,
    y: f32,
    speed: f32,
}

#[derive(Default)]
struct Held {
    left: u32,
    right: u32,
    fire: u32,
}

pub struct Invaders {
    session: Session,
    ship_x: f32,
    ship_y: f32,
    shots: Vec<Shot>,
    enemy_shots: Vec<Shot>,
    enemies: Vec<Enemy>,
    enemy_dir: f32,
    enemy_speed: f32,
    wave: u32,
    frame_count: u64,
    last_shot: Option<Instant>,
    held: Held,
    rng: StdRng,
    keys: Subscription,
}

impl Invaders {
    pub fn new(ctx: GameContext) -> Self {
        let size = ctx.size;
        let mut s = Self {
            session: Session::new(size, Phase::Running, ctx.callbacks),
            ship_x: size.w() / 2.0,
            ship_y: size.h() - 40.0,
            shots: Vec::new(),
            enemy_shots: Vec::new(),
            enemies: Vec::new(),
            enemy_dir: 1.0,
            enemy_speed: ENEMY_START_SPEED,
            wave: 1,
            frame_count: 0,
            last_shot: None,
            held: Held::default(),
            rng: ctx.rng,
            keys: ctx.hub.subscribe(Channel::Keyboard),
        };
        s.spawn_enemies();
        s
    }

    fn width(&self) -> f32 {
        self.session.size.w()
    }

    fn height(&self) -> f32 {
        self.session.size.h()
    }

    fn spawn_enemies(&mut self) {
        self.enemies.clear();
        for row in 0..ENEMY_ROWS {
            for col in 0..ENEMY_COLS {
                self.enemies.push(Enemy {
                    x: ENEMY_ORIGIN.0 + col as f32 * ENEMY_SPACING.0,
                    y: ENEMY_ORIGIN.1 + row as f32 * ENEMY_SPACING.1,
                    active: true,
                    kind: row,
                });
            }
        }
    }

    fn active_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    /// Frames between formation steps; fewer survivors march faster.
    fn march_interval(&self) -> u64 {
        let multiplier = 1.0 + (ENEMY_TOTAL - self.active_count()) as f32 * 0.1;
        ((30.0 / multiplier).floor() as u64).max(5)
    }

    fn try_shoot(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_shot {
            if now.duration_since(last) <= SHOT_COOLDOWN {
                return false;
            }
        }
        self.shots.push(Shot { x: self.ship_x + SHIP_W / 2.0, y: self.ship_y, speed: SHIP_SHOT_SPEED });
        self.last_shot = Some(now);
        true
    }

    fn move_ship(&mut self) {
        if self.held.left > 0 {
            self.ship_x = (self.ship_x - SHIP_SPEED).max(BOUND_LEFT);
        }
        if self.held.right > 0 {
            self.ship_x = (self.ship_x + SHIP_SPEED).min(self.width() - BOUND_RIGHT);
        }
        if self.held.fire > 0 {
            self.try_shoot(Instant::now());
        }
        self.held.left = self.held.left.saturating_sub(1);
        self.held.right = self.held.right.saturating_sub(1);
        self.held.fire = self.held.fire.saturating_sub(1);
    }

    fn march(&mut self) {
        if self.frame_count % self.march_interval() != 0 {
            return;
        }
        let step = self.enemy_speed * self.enemy_dir * 5.0;
        let (left, right) = (BOUND_LEFT, self.width() - BOUND_RIGHT);
        let mut hit_edge = false;
        for e in self.enemies.iter_mut().filter(|e| e.active) {
            e.x += step;
            if e.x > right || e.x < left {
                hit_edge = true;
            }
        }
        if hit_edge {
            self.enemy_dir = -self.enemy_dir;
            for e in self.enemies.iter_mut().filter(|e| e.active) {
                e.y += ENEMY_STEP_DOWN;
            }
        }
    }

    /// Chance of an enemy shot this frame, rising with score.
    fn fire_chance(&self) -> f64 {
        BASE_FIRE_CHANCE * (1.0 + self.session.score() as f64 / 1000.0)
    }

    /// Returns the index of the enemy that fired, if any.
    fn enemy_fire(&mut self) -> Option<usize> {
        if !self.rng.gen_bool(self.fire_chance().min(1.0)) {
            return None;
        }
        let active: Vec<usize> = (0..self.enemies.len()).filter(|&i| self.enemies[i].active).collect();
        if active.is_empty() {
            return None;
        }
        let idx = active[self.rng.gen_range(0..active.len())];
        let e = &self.enemies[idx];
        self.enemy_shots.push(Shot { x: e.x + ENEMY_W / 2.0, y: e.y + ENEMY_H, speed: ENEMY_SHOT_SPEED });
        Some(idx)
    }

    fn resolve_shots(&mut self) {
        let mut i = self.shots.len();
        while i > 0 {
            i -= 1;
            self.shots[i].y -= self.shots[i].speed;
            let shot = self.shots[i];
            if shot.y < 0.0 {
                self.shots.remove(i);
                continue;
            }
            if let Some(enemy) = self.enemies.iter_mut().find(|e| e.active && e.contains(shot.x, shot.y)) {
                enemy.active = false;
                self.shots.remove(i);
                self.session.add_points(ENEMY_POINTS);
            }
        }
    }

    fn resolve_enemy_shots(&mut self) {
        let (h, sx, sy) = (self.height(), self.ship_x, self.ship_y);
        for shot in &mut self.enemy_shots {
            shot.y += shot.speed;
        }
        self.enemy_shots.retain(|s| s.y <= h);
        let hit = self.enemy_shots.iter().any(|s| {
            s.x > sx && s.x < sx + SHIP_W && s.y > sy && s.y < sy + SHIP_H
        });
        if hit {
            log::info!("invaders: ship destroyed on wave {}, final score {}", self.wave, self.session.score());
            self.session.end();
        }
    }

    fn handle_input(&mut self) {
        for event in self.keys.drain() {
            let InputEvent::Key(key) = event else { continue };
            match key.code {
                KeyCode::Left => self.action(Action::Left),
                KeyCode::Right => self.action(Action::Right),
                KeyCode::Char(' ') | KeyCode::Up => self.held.fire = HOLD_FRAMES,
                _ => {}
            }
        }
    }
}

impl Game for Invaders {
    fn update(&mut self) {
        self.handle_input();
        if self.session.is_over() {
            return;
        }
        self.frame_count += 1;

        self.move_ship();
        self.march();
        self.enemy_fire();
        // Shots
        self.resolve_shots();
        self.resolve_enemy_shots();
        if self.session.is_over() {
            return;
        }

        // Landing
        if self.enemies.iter().any(|e| e.active && e.y > self.ship_y) {
            log::info!("invaders: formation landed on wave {}", self.wave);
            self.session.end();
            return;
        }

        // Next wave
        if self.active_count() == 0 {
            self.spawn_enemies();
            self.enemy_speed += ENEMY_SPEED_STEP;
            self.wave += 1;
            log::info!("invaders: wave {} at speed {:.1}", self.wave, self.enemy_speed);
        }
    }

    fn draw(&self, surface: &mut Surface) {
        let (x, y) = (self.ship_x, self.ship_y);
        surface.fill_triangle(
            [(x + SHIP_W / 2.0, y), (x + SHIP_W, y + SHIP_H), (x, y + SHIP_H)],
            NEON_BLUE,
        );
        for e in self.enemies.iter().filter(|e| e.active) {
            surface.fill_rect(e.x, e.y, ENEMY_W, ENEMY_H, e.color());
            surface.fill_rect(e.x + 5.0, e.y + 5.0, 5.0, 5.0, Color::Black);
            surface.fill_rect(e.x + ENEMY_W - 10.0, e.y + 5.0, 5.0, 5.0, Color::Black);
        }
        for s in &self.shots {
            surface.fill_rect(s.x - 1.0, s.y, 3.0, 10.0, Color::White);
        }
        for s in &self.enemy_shots {
            surface.fill_rect(s.x - 2.0, s.y, 4.0, 8.0, Color::Red);
        }
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::Left => self.held.left = HOLD_FRAMES,
            Action::Right => self.held.right = HOLD_FRAMES,
            Action::Action => {
                self.try_shoot(Instant::now());
            }
            Action::Up | Action::Down => {}
        }
    }

    fn cleanup(&mut self) {
        self.keys.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::*;
    use crate::input::InputHub;

    fn invaders(hub: &InputHub, rec: &Recorder, seed: u64) -> Invaders {
        Invaders::new(context(hub, rec, seed))
    }

    #[test]
    fn formation_layout() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let s = invaders(&hub, &rec, 1);
        assert_eq!(s.enemies.len(), ENEMY_TOTAL);
        assert_eq!((s.enemies[0].x, s.enemies[0].y), (50.0, 50.0));
        assert_eq!(s.enemies[ENEMY_COLS].kind, 1);
        assert_eq!(s.march_interval(), 30);
    }

    #[test]
    fn march_speeds_up_as_enemies_fall() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        for e in s.enemies.iter_mut().take(10) {
            e.active = false;
        }
        // 1 + 10 * 0.1 = 2 -> 15 frames
        assert_eq!(s.march_interval(), 15);
        for e in s.enemies.iter_mut() {
            e.active = false;
        }
        s.enemies[0].active = true;
        assert_eq!(s.march_interval(), 7);
    }

    #[test]
    fn formation_flips_and_steps_down_at_bound() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        let right = 800.0 - BOUND_RIGHT;
        // Park the right-most column one step from the edge.
        let shift = right - s.enemies[ENEMY_COLS - 1].x;
        for e in s.enemies.iter_mut() {
            e.x += shift;
        }
        let y0 = s.enemies[0].y;
        s.frame_count = 29;
        s.march();
        assert_eq!(s.enemy_dir, 1.0);
        s.frame_count = 30;
        s.march();
        assert_eq!(s.enemy_dir, -1.0);
        assert_eq!(s.enemies[0].y, y0 + ENEMY_STEP_DOWN);
    }

    #[test]
    fn shots_are_rate_limited() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        let t0 = Instant::now();
        assert!(s.try_shoot(t0));
        assert!(!s.try_shoot(t0 + Duration::from_millis(100)));
        assert!(!s.try_shoot(t0 + Duration::from_millis(300)));
        assert!(s.try_shoot(t0 + Duration::from_millis(301)));
        assert_eq!(s.shots.len(), 2);
    }

    #[test]
    fn shot_destroys_first_enemy_and_scores() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        let target = s.enemies[3 * ENEMY_COLS].clone();
        s.shots.push(Shot { x: target.x + 15.0, y: target.y + 10.0 + SHIP_SHOT_SPEED, speed: SHIP_SHOT_SPEED });
        s.resolve_shots();
        assert!(!s.enemies[3 * ENEMY_COLS].active);
        assert!(s.shots.is_empty());
        assert_eq!(rec.scores(), vec![50]);
    }

    #[test]
    fn shots_leaving_the_surface_are_dropped() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        s.shots.push(Shot { x: 5.0, y: 3.0, speed: SHIP_SHOT_SPEED });
        s.enemy_shots.push(Shot { x: 5.0, y: 598.0, speed: ENEMY_SHOT_SPEED });
        s.resolve_shots();
        s.resolve_enemy_shots();
        assert!(s.shots.is_empty());
        assert!(s.enemy_shots.is_empty());
        assert!(!s.session.is_over());
    }

    #[test]
    fn enemy_shot_on_ship_is_fatal() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        s.enemy_shots.push(Shot { x: s.ship_x + 15.0, y: s.ship_y + 5.0, speed: ENEMY_SHOT_SPEED });
        s.update();
        s.update();
        assert_eq!(rec.game_overs(), 1);
    }

    #[test]
    fn landing_formation_is_fatal() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        s.enemies[5].y = s.ship_y + 1.0;
        s.update();
        assert!(s.session.is_over());
    }

    #[test]
    fn enemy_fire_only_from_active_enemies() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 42);
        for (i, e) in s.enemies.iter_mut().enumerate() {
            e.active = i % 3 == 0;
        }
        let mut fired = 0;
        for _ in 0..5000 {
            if let Some(idx) = s.enemy_fire() {
                assert!(s.enemies[idx].active);
                fired += 1;
            }
        }
        assert!(fired > 0);
        for e in s.enemies.iter_mut() {
            e.active = false;
        }
        for _ in 0..500 {
            assert_eq!(s.enemy_fire(), None);
        }
    }

    #[test]
    fn fire_chance_grows_with_score() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        let base = s.fire_chance();
        s.session.add_points(1000);
        assert!((s.fire_chance() - base * 2.0).abs() < 1e-9);
    }

    #[test]
    fn cleared_wave_respawns_faster() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        for e in s.enemies.iter_mut() {
            e.active = false;
        }
        let before = s.enemy_speed;
        s.update();
        assert_eq!(s.active_count(), ENEMY_TOTAL);
        assert!(s.enemy_speed > before);
        assert_eq!(s.wave, 2);
    }

    #[test]
    fn held_direction_expires() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut s = invaders(&hub, &rec, 1);
        let x0 = s.ship_x;
        s.action(Action::Left);
        for _ in 0..20 {
            s.move_ship();
        }
        assert_eq!(s.ship_x, x0 - SHIP_SPEED * HOLD_FRAMES as f32);
    }
}
