use iced::theme::Palette;
use iced::{Color, Theme};
use once_cell::sync::Lazy;

pub const DEFAULT_THEME: &str = "Deck Default";

const GREEN: Color = Color::from_rgb(0.0, 1.0, 0.533);
const BLUE: Color = Color::from_rgb(0.31, 0.765, 0.969);
const RED: Color = Color::from_rgb(1.0, 0.333, 0.333);

static THEMES: Lazy<Vec<(&'static str, Palette)>> = Lazy::new(|| {
    vec![
        (
            DEFAULT_THEME,
            Palette {
                background: Color::from_rgb(0.059, 0.078, 0.098),
                text: GREEN,
                primary: BLUE,
                success: GREEN,
                danger: RED,
            },
        ),
        (
            "Focus Mode",
            Palette {
                background: Color::from_rgb(0.118, 0.118, 0.118),
                text: Color::from_rgb(0.878, 0.878, 0.878),
                primary: BLUE,
                success: GREEN,
                danger: RED,
            },
        ),
        (
            "Super Focus Burst",
            Palette {
                background: Color::from_rgb(0.043, 0.055, 0.071),
                text: GREEN,
                primary: GREEN,
                success: GREEN,
                danger: RED,
            },
        ),
    ]
});

pub fn names() -> Vec<&'static str> {
    THEMES.iter().map(|(name, _)| *name).collect()
}

/// Unknown names fall back to the default palette.
pub fn theme(name: &str) -> Theme {
    let (name, palette) = THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .unwrap_or(&THEMES[0]);
    Theme::custom(name.to_string(), *palette)
}

pub fn user_color() -> Color {
    GREEN
}

pub fn assistant_color() -> Color {
    BLUE
}

pub fn error_color() -> Color {
    RED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_theme_resolves() {
        for name in names() {
            // Theme::custom keeps the name it was given.
            assert_eq!(theme(name).to_string(), name);
        }
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        assert_eq!(theme("No Such Theme").to_string(), DEFAULT_THEME);
    }
}
