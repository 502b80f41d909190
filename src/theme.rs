use std::str::FromStr;

use tuirealm::ratatui::style::Color;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemePreset {
    #[default]
    Default,
    Light,
    HighContrast,
    Mono,
}

impl ThemePreset {
    pub const ALL: [Self; 4] = [Self::Default, Self::Light, Self::HighContrast, Self::Mono];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::HighContrast => "high-contrast",
            Self::Mono => "mono",
        }
    }
}

impl FromStr for ThemePreset {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "light" | "day" => Ok(Self::Light),
            "high-contrast" | "high_contrast" | "contrast" => Ok(Self::HighContrast),
            "mono" | "monochrome" => Ok(Self::Mono),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub interactive: InteractivePalette,
    pub task: TaskPalette,
    pub dialog: DialogPalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub text: Color,
    pub text_muted: Color,
    pub header: Color,
    pub accent: Color,
    pub danger: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub selected_bg: Color,
    pub border: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskPalette {
    pub done: Color,
    pub pending: Color,
    pub handle: Color,
    pub dragging_bg: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct DialogPalette {
    pub surface: Color,
    pub input_bg: Color,
    pub button_bg: Color,
    pub button_fg: Color,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Default => Self {
                base: BasePalette {
                    text: Color::White,
                    text_muted: Color::DarkGray,
                    header: Color::Cyan,
                    accent: Color::Magenta,
                    danger: Color::Red,
                },
                interactive: InteractivePalette {
                    focus: Color::Cyan,
                    selected_bg: Color::Rgb(54, 48, 72),
                    border: Color::DarkGray,
                },
                task: TaskPalette {
                    done: Color::LightGreen,
                    pending: Color::Gray,
                    handle: Color::DarkGray,
                    dragging_bg: Color::Rgb(255, 187, 120),
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(36, 40, 56),
                    input_bg: Color::Rgb(46, 50, 68),
                    button_bg: Color::Cyan,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Light => Self {
                base: BasePalette {
                    text: Color::Rgb(32, 38, 51),
                    text_muted: Color::Rgb(95, 105, 122),
                    header: Color::Rgb(37, 99, 235),
                    accent: Color::Rgb(2, 132, 199),
                    danger: Color::Rgb(185, 28, 28),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(37, 99, 235),
                    selected_bg: Color::Rgb(227, 237, 255),
                    border: Color::Rgb(196, 208, 224),
                },
                task: TaskPalette {
                    done: Color::Rgb(22, 163, 74),
                    pending: Color::Rgb(71, 85, 105),
                    handle: Color::Rgb(148, 163, 184),
                    dragging_bg: Color::Rgb(254, 240, 138),
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(255, 255, 255),
                    input_bg: Color::Rgb(241, 245, 249),
                    button_bg: Color::Rgb(37, 99, 235),
                    button_fg: Color::White,
                },
            },
            ThemePreset::HighContrast => Self {
                base: BasePalette {
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::LightCyan,
                    accent: Color::LightBlue,
                    danger: Color::LightRed,
                },
                interactive: InteractivePalette {
                    focus: Color::LightCyan,
                    selected_bg: Color::Rgb(36, 36, 36),
                    border: Color::Gray,
                },
                task: TaskPalette {
                    done: Color::LightGreen,
                    pending: Color::White,
                    handle: Color::Gray,
                    dragging_bg: Color::LightYellow,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(20, 20, 20),
                    input_bg: Color::Rgb(40, 40, 40),
                    button_bg: Color::LightCyan,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Mono => Self {
                base: BasePalette {
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::White,
                    accent: Color::Gray,
                    danger: Color::White,
                },
                interactive: InteractivePalette {
                    focus: Color::White,
                    selected_bg: Color::Rgb(35, 35, 35),
                    border: Color::Gray,
                },
                task: TaskPalette {
                    done: Color::Gray,
                    pending: Color::White,
                    handle: Color::Gray,
                    dragging_bg: Color::Rgb(70, 70, 70),
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(26, 26, 26),
                    input_bg: Color::Rgb(40, 40, 40),
                    button_bg: Color::White,
                    button_fg: Color::Black,
                },
            },
        }
    }

    pub fn border_color(&self, focused: bool) -> Color {
        if focused {
            self.interactive.focus
        } else {
            self.interactive.border
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_preset(ThemePreset::Default)
    }
}
