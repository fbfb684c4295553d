use kairos_core::display::Tone;
use kairos_core::{Network, NotificationKind};
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug)]
pub struct PulseTheme {
    pub bg: Color,
    pub surface: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub info: Color,
}

pub fn pulse_theme() -> PulseTheme {
    PulseTheme {
        bg: Color::Rgb(15, 23, 42),
        surface: Color::Rgb(30, 27, 75),
        border: Color::Rgb(71, 85, 105),
        title: Color::Rgb(216, 180, 254),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(148, 163, 184),
        accent: Color::Rgb(192, 132, 252),
        ok: Color::Rgb(74, 222, 128),
        warn: Color::Rgb(234, 179, 8),
        critical: Color::Rgb(239, 68, 68),
        info: Color::Rgb(59, 130, 246),
    }
}

impl PulseTheme {
    pub fn tone(self, tone: Tone) -> Color {
        match tone {
            Tone::Ok => self.ok,
            Tone::Warn => self.warn,
            Tone::Critical => self.critical,
            Tone::Neutral => Color::Rgb(209, 213, 219),
        }
    }

    pub fn network(self, network: &Network) -> Color {
        match network {
            Network::Polygon => Color::Rgb(168, 85, 247),
            Network::Hedera => self.info,
            Network::Unknown(_) => self.muted,
        }
    }

    pub fn notification(self, kind: NotificationKind) -> Style {
        let bg = match kind {
            NotificationKind::Success => Color::Rgb(126, 34, 206),
            NotificationKind::Failure => Color::Rgb(153, 27, 27),
        };
        Style::new().bg(bg).fg(Color::White)
    }

    pub fn panel_title(self) -> Style {
        Style::new().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn panel_border(self) -> Style {
        Style::new().fg(self.border)
    }
}

pub mod icons {
    pub const DOT: &str = "●";
    pub const CLOCK: &str = "◷";
    pub const SELECTED: &str = ">";
    pub const LINK: &str = "↗";
}
