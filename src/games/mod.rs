pub mod breaker;
pub mod invaders;
pub mod pong;
pub mod snake;
pub mod tetris;

use rand::rngs::StdRng;

use crate::i18n::ArcadeText;
use crate::input::InputHub;
use crate::surface::{Size, Surface};

use self::breaker::Breaker;
use self::invaders::Invaders;
use self::pong::Pong;
use self::snake::Snake;
use self::tetris::Tetris;

/// Discrete pointer/touch-style input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Action,
}

pub trait Game {
    /// Advance exactly one frame. May fire the session callbacks.
    fn update(&mut self);
    fn draw(&self, surface: &mut Surface);
    fn action(&mut self, action: Action);
    /// Release every input subscription held by the instance.
    fn cleanup(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameId {
    Snake,
    Pong,
    Breaker,
    Invaders,
    Tetris,
}

impl GameId {
    pub fn all() -> &'static [GameId] {
        &[GameId::Snake, GameId::Pong, GameId::Breaker, GameId::Invaders, GameId::Tetris]
    }

    pub fn index(&self) -> usize {
        match self {
            GameId::Snake => 0,
            GameId::Pong => 1,
            GameId::Breaker => 2,
            GameId::Invaders => 3,
            GameId::Tetris => 4,
        }
    }

    pub fn from_index(idx: usize) -> GameId {
        Self::all()[idx % Self::all().len()]
    }
}

pub struct Callbacks {
    on_score: Box<dyn FnMut(u32)>,
    on_game_over: Box<dyn FnMut(u32)>,
}

impl Callbacks {
    pub fn new(on_score: impl FnMut(u32) + 'static, on_game_over: impl FnMut(u32) + 'static) -> Self {
        Self {
            on_score: Box::new(on_score),
            on_game_over: Box::new(on_game_over),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Serving,
    Running,
    Over,
}

/// State every title shares: surface size, score, lifecycle and callbacks.
pub struct Session {
    pub size: Size,
    score: u32,
    phase: Phase,
    callbacks: Callbacks,
}

impl Session {
    pub fn new(size: Size, phase: Phase, callbacks: Callbacks) -> Self {
        Self { size, score: 0, phase, callbacks }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    /// Move between Serving and Running. Over is terminal.
    pub fn set_phase(&mut self, phase: Phase) {
        if self.phase != Phase::Over && phase != Phase::Over {
            self.phase = phase;
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.score += points;
        (self.callbacks.on_score)(self.score);
    }

    pub fn end(&mut self) {
        if self.phase == Phase::Over {
            return;
        }
        self.phase = Phase::Over;
        (self.callbacks.on_game_over)(self.score);
    }
}

/// Everything a title needs at construction.
pub struct GameContext<'a> {
    pub size: Size,
    pub hub: &'a InputHub,
    pub callbacks: Callbacks,
    pub text: &'static ArcadeText,
    pub rng: StdRng,
}

pub enum ActiveGame {
    Snake(Snake),
    Pong(Pong),
    Breaker(Breaker),
    Invaders(Invaders),
    Tetris(Tetris),
}

impl ActiveGame {
    pub fn new(id: GameId, ctx: GameContext) -> Self {
        match id {
            GameId::Snake => ActiveGame::Snake(Snake::new(ctx)),
            GameId::Pong => ActiveGame::Pong(Pong::new(ctx)),
            GameId::Breaker => ActiveGame::Breaker(Breaker::new(ctx)),
            GameId::Invaders => ActiveGame::Invaders(Invaders::new(ctx)),
            GameId::Tetris => ActiveGame::Tetris(Tetris::new(ctx)),
        }
    }

    pub fn id(&self) -> GameId {
        match self {
            ActiveGame::Snake(_) => GameId::Snake,
            ActiveGame::Pong(_) => GameId::Pong,
            ActiveGame::Breaker(_) => GameId::Breaker,
            ActiveGame::Invaders(_) => GameId::Invaders,
            ActiveGame::Tetris(_) => GameId::Tetris,
        }
    }

    fn game(&self) -> &dyn Game {
        match self {
            ActiveGame::Snake(g) => g,
            ActiveGame::Pong(g) => g,
            ActiveGame::Breaker(g) => g,
            ActiveGame::Invaders(g) => g,
            ActiveGame::Tetris(g) => g,
        }
    }

    fn game_mut(&mut self) -> &mut dyn Game {
        match self {
            ActiveGame::Snake(g) => g,
            ActiveGame::Pong(g) => g,
            ActiveGame::Breaker(g) => g,
            ActiveGame::Invaders(g) => g,
            ActiveGame::Tetris(g) => g,
        }
    }
}

impl Game for ActiveGame {
    fn update(&mut self) {
        self.game_mut().update();
    }

    fn draw(&self, surface: &mut Surface) {
        self.game().draw(surface);
    }

    fn action(&mut self, action: Action) {
        self.game_mut().action(action);
    }

    fn cleanup(&mut self) {
        self.game_mut().cleanup();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;

    use super::*;
    use crate::i18n::{self, Lang};

    /// Every callback invocation, in order.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Note {
        Score(u32),
        Over(u32),
    }

    #[derive(Clone, Default)]
    pub struct Recorder(Rc<RefCell<Vec<Note>>>);

    impl Recorder {
        pub fn callbacks(&self) -> Callbacks {
            let s = self.0.clone();
            let o = self.0.clone();
            Callbacks::new(
                move |total| s.borrow_mut().push(Note::Score(total)),
                move |total| o.borrow_mut().push(Note::Over(total)),
            )
        }

        pub fn notes(&self) -> Vec<Note> {
            self.0.borrow().clone()
        }

        pub fn scores(&self) -> Vec<u32> {
            self.notes()
                .into_iter()
                .filter_map(|n| match n {
                    Note::Score(s) => Some(s),
                    Note::Over(_) => None,
                })
                .collect()
        }

        pub fn game_overs(&self) -> usize {
            self.notes().iter().filter(|n| matches!(n, Note::Over(_))).count()
        }
    }

    pub fn context<'a>(hub: &'a InputHub, recorder: &Recorder, seed: u64) -> GameContext<'a> {
        GameContext {
            size: Size::new(800, 600),
            hub,
            callbacks: recorder.callbacks(),
            text: i18n::text(Lang::En),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}
