use serde::{Deserialize, Serialize};

use crate::standings::Medal;
use crate::surface::Color;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn background(self) -> Color {
        match self {
            Theme::Light => Color::rgb(255, 255, 255),
            Theme::Dark => Color::rgb(24, 26, 31),
        }
    }

    pub fn axis(self) -> Color {
        match self {
            Theme::Light => Color::rgba(0, 0, 0, 0.45),
            Theme::Dark => Color::rgba(255, 255, 255, 0.45),
        }
    }

    pub fn grid(self) -> Color {
        match self {
            Theme::Light => Color::rgba(0, 0, 0, 0.08),
            Theme::Dark => Color::rgba(255, 255, 255, 0.08),
        }
    }

    pub fn label(self) -> Color {
        match self {
            Theme::Light => Color::rgb(85, 85, 85),
            Theme::Dark => Color::rgb(187, 187, 187),
        }
    }

    pub fn band_alpha(self) -> f64 {
        match self {
            Theme::Light => 0.12,
            Theme::Dark => 0.2,
        }
    }

    pub fn separator_alpha(self) -> f64 {
        match self {
            Theme::Light => 0.7,
            Theme::Dark => 0.45,
        }
    }

    /// Fill for a heatmap bin holding no submissions.
    pub fn empty_bin(self) -> Color {
        match self {
            Theme::Light => Color::rgba(0, 0, 0, 0.04),
            Theme::Dark => Color::rgba(255, 255, 255, 0.05),
        }
    }

    /// Soft, medium and hot heatmap fills.
    pub fn heat_ramp(self) -> [Color; 3] {
        match self {
            Theme::Light => [
                Color::rgba(255, 183, 77, 0.45),
                Color::rgba(255, 112, 67, 0.7),
                Color::rgba(229, 57, 53, 0.9),
            ],
            Theme::Dark => [
                Color::rgba(255, 183, 77, 0.55),
                Color::rgba(255, 112, 67, 0.8),
                Color::rgba(239, 83, 80, 0.95),
            ],
        }
    }
}

pub fn medal_color(medal: Medal) -> Color {
    match medal {
        Medal::Gold => Color::rgb(255, 215, 0),
        Medal::Silver => Color::rgb(192, 192, 192),
        Medal::Bronze => Color::rgb(205, 127, 50),
    }
}

/// Series colors: one accent for the total and a cycle for problems.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Palette {
    pub total: Color,
    pub problems: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            total: Color::rgb(99, 102, 241),
            problems: vec![
                Color::rgb(59, 130, 246),
                Color::rgb(34, 197, 94),
                Color::rgb(239, 68, 68),
                Color::rgb(168, 85, 247),
                Color::rgb(234, 179, 8),
                Color::rgb(236, 72, 153),
                Color::rgb(20, 184, 166),
                Color::rgb(249, 115, 22),
            ],
        }
    }
}

impl Palette {
    /// Color for a 1-based problem index, cycling through the palette.
    pub fn problem(&self, problem_index: u32) -> Color {
        if self.problems.is_empty() {
            return self.total;
        }
        let slot = problem_index.saturating_sub(1) as usize % self.problems.len();
        self.problems[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_from_one() {
        let palette = Palette::default();
        assert_eq!(palette.problem(1), palette.problems[0]);
        assert_eq!(palette.problem(8), palette.problems[7]);
        assert_eq!(palette.problem(9), palette.problems[0]);
    }

    #[test]
    fn empty_palette_falls_back_to_accent() {
        let palette = Palette {
            total: Color::rgb(1, 2, 3),
            problems: Vec::new(),
        };
        assert_eq!(palette.problem(4), Color::rgb(1, 2, 3));
    }

    #[test]
    fn dark_bands_stronger_separators_weaker() {
        assert!(Theme::Dark.band_alpha() > Theme::Light.band_alpha());
        assert!(Theme::Dark.separator_alpha() < Theme::Light.separator_alpha());
    }
}
