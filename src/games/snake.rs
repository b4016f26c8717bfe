use std::collections::VecDeque;

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::Rng;

use crate::games::{Action, Game, GameContext, Phase, Session};
use crate::input::{Channel, InputEvent, Subscription};
use crate::surface::{Surface, NEON_BLUE, NEON_PINK};

const CELL: u32 = 20;
const START_SPEED: f32 = 5.0;
const SPEED_STEP: f32 = 0.2;
const SPEED_CAP: f32 = 25.0;
const FOOD_POINTS: u32 = 10;
const MAX_PENDING: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Heading {
    dx: i32,
    dy: i32,
}

impl Heading {
    const UP: Heading = Heading { dx: 0, dy: -1 };
    const DOWN: Heading = Heading { dx: 0, dy: 1 };
    const LEFT: Heading = Heading { dx: -1, dy: 0 };
    const RIGHT: Heading = Heading { dx: 1, dy: 0 };

    fn reverses(&self, other: Heading) -> bool {
        self.dx == -other.dx && self.dy == -other.dy
    }
}

pub struct Snake {
    session: Session,
    cols: i32,
    rows: i32,
    /// Head first.
    body: VecDeque<Cell>,
    heading: Heading,
    pending: VecDeque<Heading>,
    food: Cell,
    speed: f32,
    frame_count: u32,
    rng: StdRng,
    keys: Subscription,
}

impl Snake {
    pub fn new(ctx: GameContext) -> Self {
        let cols = (ctx.size.width / CELL) as i32;
        let rows = (ctx.size.height / CELL) as i32;
        let mut s = Self {
            session: Session::new(ctx.size, Phase::Running, ctx.callbacks),
            cols,
            rows,
            body: VecDeque::from([Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]),
            heading: Heading::RIGHT,
            pending: VecDeque::new(),
            food: Cell::new(0, 0),
            speed: START_SPEED,
            frame_count: 0,
            rng: ctx.rng,
            keys: ctx.hub.subscribe(Channel::Keyboard),
        };
        match s.free_cell() {
            Some(cell) => s.food = cell,
            None => s.session.end(),
        }
        s
    }

    /// Uniformly random cell not covered by the body.
    fn free_cell(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }

    fn queue(&mut self, heading: Heading) {
        if self.pending.len() < MAX_PENDING {
            self.pending.push_back(heading);
        }
    }

    fn take_heading(&mut self) {
        let Some(next) = self.pending.pop_front() else { return };
        if !next.reverses(self.heading) {
            self.heading = next;
        } else if let Some(second) = self.pending.pop_front() {
            if !second.reverses(self.heading) {
                self.heading = second;
            }
        }
    }

    fn frames_per_step(&self) -> f32 {
        60.0 / self.speed
    }

    /// One logical move of the snake.
    fn step(&mut self) {
        self.take_heading();

        let head = self.body[0];
        let next = Cell::new(head.x + self.heading.dx, head.y + self.heading.dy);

        if next.x < 0 || next.x >= self.cols || next.y < 0 || next.y >= self.rows {
            log::info!("snake hit the wall at {},{}", next.x, next.y);
            self.session.end();
            return;
        }
        if self.body.contains(&next) {
            log::info!("snake bit itself at {},{}", next.x, next.y);
            self.session.end();
            return;
        }

        self.body.push_front(next);

        if next == self.food {
            self.session.add_points(FOOD_POINTS);
            if self.speed < SPEED_CAP {
                self.speed = (self.speed + SPEED_STEP).min(SPEED_CAP);
            }
            match self.free_cell() {
                Some(cell) => self.food = cell,
                None => {
                    log::info!("snake filled the board");
                    self.session.end();
                }
            }
        } else {
            self.body.pop_back();
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.queue(Heading::UP),
            KeyCode::Down => self.queue(Heading::DOWN),
            KeyCode::Left => self.queue(Heading::LEFT),
            KeyCode::Right => self.queue(Heading::RIGHT),
            _ => {}
        }
    }
}

impl Game for Snake {
    fn update(&mut self) {
        for event in self.keys.drain() {
            if let InputEvent::Key(key) = event {
                self.handle_key(key.code);
            }
        }
        if self.session.is_over() {
            return;
        }

        self.frame_count += 1;
        if (self.frame_count as f32) < self.frames_per_step() {
            return;
        }
        self.frame_count = 0;
        self.step();
    }

    fn draw(&self, surface: &mut Surface) {
        let g = CELL as f32;
        surface.fill_circle(
            self.food.x as f32 * g + g / 2.0,
            self.food.y as f32 * g + g / 2.0,
            g / 2.0 - 2.0,
            NEON_PINK,
        );
        for (i, part) in self.body.iter().enumerate() {
            // Head is drawn slightly larger.
            let pad = if i == 0 { 1.0 } else { 2.0 };
            surface.fill_rect(
                part.x as f32 * g + pad,
                part.y as f32 * g + pad,
                g - pad * 2.0,
                g - pad * 2.0,
                NEON_BLUE,
            );
        }
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::Left => self.queue(Heading::LEFT),
            Action::Right => self.queue(Heading::RIGHT),
            Action::Up => self.queue(Heading::UP),
            Action::Down => self.queue(Heading::DOWN),
            Action::Action => {}
        }
    }

    fn cleanup(&mut self) {
        self.keys.release();
    }
}
