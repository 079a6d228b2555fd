use ratatui::style::{Color, Modifier, Style};
use zpoolmon_core::{ScanTone, Severity};

const fn rgb(hex: u32) -> Color {
    Color::Rgb(((hex >> 16) & 0xFF) as u8, ((hex >> 8) & 0xFF) as u8, (hex & 0xFF) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub variant: ThemeVariant,
    pub border: Style,
    pub border_focused: Style,
    pub title: Style,
    pub text: Style,
    pub text_dim: Style,
    pub label: Style,
    pub header: Style,
    pub ok: Style,
    pub warn: Style,
    pub crit: Style,
    pub scrub: Style,
    pub resilver: Style,
    pub unknown: Style,
    pub bar_fill: Style,
    pub bar_empty: Style,
    pub footer_bg: Style,
    pub footer_key: Style,
    pub footer_text: Style,
}

impl Theme {
    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        Self::for_variant(self.variant.toggle())
    }

    pub fn severity(&self, severity: Severity) -> Style {
        match severity {
            Severity::Ok => self.ok,
            Severity::Warning => self.warn,
            Severity::Critical => self.crit,
        }
    }

    pub fn scan(&self, tone: ScanTone) -> Style {
        match tone {
            ScanTone::Scrub => self.scrub,
            ScanTone::Resilver => self.resilver,
            ScanTone::Unknown => self.unknown,
        }
    }

    fn dark() -> Self {
        Self {
            variant: ThemeVariant::Dark,
            border: Style::default().fg(rgb(0x4c566a)),
            border_focused: Style::default().fg(rgb(0x88c0d0)).add_modifier(Modifier::BOLD),
            title: Style::default().fg(rgb(0xebcb8b)).add_modifier(Modifier::BOLD),
            text: Style::default().fg(rgb(0xe5e9f0)),
            text_dim: Style::default().fg(rgb(0x7b8394)),
            label: Style::default().fg(rgb(0x81a1c1)).add_modifier(Modifier::BOLD),
            header: Style::default().bg(rgb(0x2e3440)),
            ok: Style::default().fg(rgb(0xa3be8c)),
            warn: Style::default().fg(rgb(0xebcb8b)).add_modifier(Modifier::BOLD),
            crit: Style::default().fg(rgb(0xbf616a)).add_modifier(Modifier::BOLD),
            scrub: Style::default().fg(rgb(0x88c0d0)).add_modifier(Modifier::BOLD),
            resilver: Style::default().fg(rgb(0xd08770)).add_modifier(Modifier::BOLD),
            unknown: Style::default().fg(rgb(0xbf616a)).add_modifier(Modifier::BOLD),
            bar_fill: Style::default().fg(rgb(0x8fbcbb)),
            bar_empty: Style::default().fg(rgb(0x434c5e)),
            footer_bg: Style::default().bg(rgb(0x3b4252)),
            footer_key: Style::default().fg(rgb(0x2e3440)).bg(rgb(0x88c0d0)).add_modifier(Modifier::BOLD),
            footer_text: Style::default().fg(rgb(0xd8dee9)).bg(rgb(0x3b4252)),
        }
    }

    fn light() -> Self {
        Self {
            variant: ThemeVariant::Light,
            border: Style::default().fg(rgb(0x9ca0b0)),
            border_focused: Style::default().fg(rgb(0x1e66f5)).add_modifier(Modifier::BOLD),
            title: Style::default().fg(rgb(0xdf8e1d)).add_modifier(Modifier::BOLD),
            text: Style::default().fg(rgb(0x4c4f69)),
            text_dim: Style::default().fg(rgb(0x8c8fa1)),
            label: Style::default().fg(rgb(0x1e66f5)).add_modifier(Modifier::BOLD),
            header: Style::default().bg(rgb(0xe6e9ef)),
            ok: Style::default().fg(rgb(0x40a02b)),
            warn: Style::default().fg(rgb(0xdf8e1d)).add_modifier(Modifier::BOLD),
            crit: Style::default().fg(rgb(0xd20f39)).add_modifier(Modifier::BOLD),
            scrub: Style::default().fg(rgb(0x209fb5)).add_modifier(Modifier::BOLD),
            resilver: Style::default().fg(rgb(0xfe640b)).add_modifier(Modifier::BOLD),
            unknown: Style::default().fg(rgb(0xd20f39)).add_modifier(Modifier::BOLD),
            bar_fill: Style::default().fg(rgb(0x179299)),
            bar_empty: Style::default().fg(rgb(0xccd0da)),
            footer_bg: Style::default().bg(rgb(0xdce0e8)),
            footer_key: Style::default().fg(rgb(0xeff1f5)).bg(rgb(0x1e66f5)).add_modifier(Modifier::BOLD),
            footer_text: Style::default().fg(rgb(0x4c4f69)).bg(rgb(0xdce0e8)),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
