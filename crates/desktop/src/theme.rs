use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

/// Resolve the iced Theme from the appearance setting.
pub fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    let palette = if is_dark {
        dark_palette()
    } else {
        light_palette()
    };
    Theme::custom("EyePong", palette)
}

/// Secondary text, e.g. hints under a control.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x12, 0x16, 0x1c),
        text: color!(0xd6, 0xdb, 0xe1),
        primary: color!(0x22, 0xc5, 0x5e),
        success: color!(0x4a, 0xde, 0x80),
        warning: color!(0xfa, 0xcc, 0x15),
        danger: color!(0xf8, 0x71, 0x71),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf8, 0xfa, 0xfc),
        text: color!(0x0f, 0x17, 0x2a),
        primary: color!(0x16, 0xa3, 0x4a),
        success: color!(0x15, 0x80, 0x3d),
        warning: color!(0xca, 0x8a, 0x04),
        danger: color!(0xdc, 0x26, 0x26),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
