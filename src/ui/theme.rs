//! Greyscale theme for the molasses demo editor

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    /// Near white - titles, emphasized text
    pub const GREY_50: Color = Color::Rgb(250, 250, 250);

    /// Bright grey - primary text
    pub const GREY_100: Color = Color::Rgb(220, 220, 220);

    /// Medium grey - status line, muted info
    pub const GREY_300: Color = Color::Rgb(140, 140, 140);

    /// Near black - main background
    pub const BG: Color = Color::Rgb(18, 18, 18);

    pub fn title() -> Style {
        Style::default()
            .fg(Self::GREY_50)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::GREY_100).bg(Self::BG)
    }

    pub fn status() -> Style {
        Style::default().fg(Self::GREY_300)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::GREY_50).add_modifier(Modifier::BOLD)
    }

    /// Overlay fill, dimmed so text stays readable on top of it.
    pub fn tier_fill(rgb: [u8; 3]) -> Color {
        Color::Rgb(rgb[0] / 3, rgb[1] / 3, rgb[2] / 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_fill_is_dimmed() {
        let fill = Theme::tier_fill([210, 90, 30]);
        assert_eq!(fill, Color::Rgb(70, 30, 10));
    }
}
