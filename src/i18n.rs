use clap::ValueEnum;

use crate::games::GameId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[default]
    En,
    Es,
}

pub struct TitleText {
    pub name: &'static str,
    pub desc: &'static str,
}

/// On-screen strings for the arcade. Purely cosmetic.
pub struct ArcadeText {
    pub title: &'static str,
    pub exit: &'static str,
    pub score: &'static str,
    pub game_over: &'static str,
    pub final_score: &'static str,
    pub retry: &'static str,
    pub press_start: &'static str,
    pub navigate: &'static str,
    pub start: &'static str,
    titles: [TitleText; 5],
}

impl ArcadeText {
    pub fn game(&self, id: GameId) -> &TitleText {
        &self.titles[id.index()]
    }
}

static EN: ArcadeText = ArcadeText {
    title: "NEON ARCADE",
    exit: "EXIT",
    score: "SCORE",
    game_over: "GAME OVER",
    final_score: "FINAL SCORE",
    retry: "RETRY",
    press_start: "PRESS SPACE TO SERVE",
    navigate: "Use Arrow Keys to Navigate • Enter to Start",
    start: "START",
    titles: [
        TitleText { name: "NEON SNAKE", desc: "Relaxed classic. Collect energy." },
        TitleText { name: "CYBER PONG", desc: "Smooth duel against the AI." },
        TitleText { name: "DATA BREAKER", desc: "Destroy the firewalls." },
        TitleText { name: "CYBER INVADERS", desc: "Defend the base." },
        TitleText { name: "NEON BLOCKS", desc: "Geometric fitting puzzle." },
    ],
};

static ES: ArcadeText = ArcadeText {
    title: "NEON ARCADE",
    exit: "SALIR",
    score: "PUNTOS",
    game_over: "JUEGO TERMINADO",
    final_score: "PUNTUACIÓN FINAL",
    retry: "REINTENTAR",
    press_start: "PULSA ESPACIO PARA SACAR",
    navigate: "Flechas para navegar • Enter para empezar",
    start: "EMPEZAR",
    titles: [
        TitleText { name: "NEON SNAKE", desc: "Clásico relajado. Recolecta energía." },
        TitleText { name: "CYBER PONG", desc: "Duelo suave contra la IA." },
        TitleText { name: "DATA BREAKER", desc: "Destruye los cortafuegos." },
        TitleText { name: "CYBER INVADERS", desc: "Defiende la base." },
        TitleText { name: "NEON BLOCKS", desc: "Puzzle de encaje geométrico." },
    ],
};

pub fn text(lang: Lang) -> &'static ArcadeText {
    match lang {
        Lang::En => &EN,
        Lang::Es => &ES,
    }
}
