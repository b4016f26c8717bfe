//! Frame pump for the live title.
//!
//! The host calls [`GameLoop::tick`] once per frame. Each tick clears the
//! surface, advances the game one frame and repaints it; once the stop
//! condition holds the loop stops rescheduling and keeps its last frame.

use crate::games::{Action, ActiveGame, Game, GameId};
use crate::surface::{Size, Surface, BACKGROUND};

pub struct GameLoop {
    game: ActiveGame,
    surface: Surface,
    running: bool,
    frames: u64,
}

impl GameLoop {
    pub fn new(game: ActiveGame, size: Size) -> Self {
        let mut surface = Surface::new(size);
        surface.clear(BACKGROUND);
        game.draw(&mut surface);
        Self { game, surface, running: true, frames: 0 }
    }

    pub fn id(&self) -> GameId {
        self.game.id()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame. `stop` is checked after the frame is painted.
    pub fn tick(&mut self, stop: impl FnOnce() -> bool) {
        if !self.running {
            return;
        }
        self.surface.clear(BACKGROUND);
        self.game.update();
        self.game.draw(&mut self.surface);
        self.frames += 1;
        if stop() {
            log::debug!("{:?} loop halted after {} frames", self.game.id(), self.frames);
            self.running = false;
        }
    }

    pub fn action(&mut self, action: Action) {
        if self.running {
            self.game.action(action);
        }
    }

    /// Tear the instance down, releasing its input subscriptions.
    pub fn shutdown(mut self) {
        self.running = false;
        self.game.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::games::testing::*;
    use crate::input::InputHub;

    #[test]
    fn tick_clears_updates_and_draws() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let game = ActiveGame::new(GameId::Pong, context(&hub, &rec, 1));
        let mut lp = GameLoop::new(game, Size::new(800, 600));
        let before = lp.surface().shapes().len();
        lp.tick(|| false);
        lp.tick(|| false);
        assert_eq!(lp.surface().shapes().len(), before);
        assert_eq!(lp.surface().background(), BACKGROUND);
        assert!(lp.is_running());
    }

    #[test]
    fn stop_condition_freezes_the_frame() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let game = ActiveGame::new(GameId::Snake, context(&hub, &rec, 1));
        let mut lp = GameLoop::new(game, Size::new(800, 600));
        let checks = Cell::new(0);
        lp.tick(|| {
            checks.set(checks.get() + 1);
            true
        });
        assert!(!lp.is_running());
        let frozen = lp.surface().shapes().to_vec();
        for _ in 0..30 {
            lp.tick(|| {
                checks.set(checks.get() + 1);
                false
            });
        }
        assert_eq!(lp.surface().shapes(), frozen.as_slice());
        assert_eq!(checks.get(), 1);
    }

    #[test]
    fn shutdown_releases_input() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let game = ActiveGame::new(GameId::Breaker, context(&hub, &rec, 1));
        let lp = GameLoop::new(game, Size::new(800, 600));
        assert!(hub.listener_count() > 0);
        lp.shutdown();
        assert_eq!(hub.listener_count(), 0);
    }
}
