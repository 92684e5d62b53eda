use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed series colours
// ---------------------------------------------------------------------------

/// Daily series line.
pub const SKY_BLUE: Color32 = Color32::from_rgb(135, 206, 235);

/// Rolling-mean line.
pub const ORANGE: Color32 = Color32::from_rgb(255, 165, 0);

/// Opacity of the daily line when drawn underneath the rolling mean.
pub const OVERLAY_ALPHA: f32 = 0.5;

// ---------------------------------------------------------------------------
// Month colours
// ---------------------------------------------------------------------------

/// One colour per calendar month, shared by the window and the exporter so
/// both legends match.
#[derive(Debug, Clone)]
pub struct MonthPalette {
    colors: Vec<Color32>,
}

impl Default for MonthPalette {
    fn default() -> Self {
        Self {
            colors: generate_palette(12),
        }
    }
}

impl MonthPalette {
    /// Colour for `month` (1 = January).  Out-of-range months wrap.
    pub fn color_for(&self, month: u32) -> Color32 {
        let idx = (month.max(1) - 1) as usize % self.colors.len();
        self.colors[idx]
    }
}

/// Short English month name for legends (1 = "Jan").
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}
