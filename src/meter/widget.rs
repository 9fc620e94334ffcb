//! Spectrum bar widget.
//!
//! Draws one vertical bar per band with eighth-block resolution, colored on a
//! low/mid/high ramp, plus an optional peak cap per band.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::config::{Rgb, VisualizationSettings};

/// Fraction of the area height a full-scale bar may use.
const HEADROOM: f32 = 0.95;

const EIGHTHS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

const PEAK_SYMBOL: &str = "▀";

/// Maps a level in `[0, 1]` onto the low→mid→high color ramp.
pub fn interpolate_color(level: f32, style: &VisualizationSettings) -> Rgb {
    let level = level.clamp(0.0, 1.0);
    if level < 0.5 {
        lerp_rgb(style.bar_color_low, style.bar_color_mid, level * 2.0)
    } else {
        lerp_rgb(style.bar_color_mid, style.bar_color_high, (level - 0.5) * 2.0)
    }
}

fn lerp_rgb(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
    [mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])]
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb[0], rgb[1], rgb[2])
}

/// Splits `width` columns into `count` bars separated by `gap` empty columns.
///
/// Returns `(x offset, bar width)` per bar. The gap is dropped when the bars
/// would not otherwise fit; bars narrower than a column get width 0.
pub fn bar_columns(width: u16, count: usize, gap: u16) -> Vec<(u16, u16)> {
    if count == 0 || width == 0 {
        return Vec::new();
    }

    let mut gap = gap as f32;
    let mut total_gap = gap * (count - 1) as f32;
    if total_gap >= width as f32 {
        gap = 0.0;
        total_gap = 0.0;
    }
    let bar_width = (width as f32 - total_gap) / count as f32;

    (0..count)
        .map(|i| {
            let start = (i as f32 * (bar_width + gap)).floor();
            let end = (i as f32 * (bar_width + gap) + bar_width).floor().min(width as f32);
            (start as u16, (end - start).max(0.0) as u16)
        })
        .collect()
}

/// Bar height in eighths of a row for `rows` available rows.
pub fn bar_eighths(level: f32, rows: u16) -> u32 {
    (level.clamp(0.0, 1.0) * rows as f32 * HEADROOM * 8.0).round() as u32
}

/// Row (counted from the bottom) holding the peak cap.
pub fn peak_row(peak: f32, rows: u16) -> u16 {
    let row = (peak.clamp(0.0, 1.0) * rows as f32 * HEADROOM) as u16;
    row.min(rows.saturating_sub(1))
}

/// Bars and peak caps for one frame.
pub struct SpectrumWidget<'a> {
    pub bands: &'a [f32],
    pub peaks: &'a [f32],
    pub show_peaks: bool,
    pub style: &'a VisualizationSettings,
}

impl SpectrumWidget<'_> {
    fn cell_color(&self, level: f32, row: u16, bar_rows: f32) -> Color {
        if !self.style.bar_gradient {
            return to_color(interpolate_color(level, self.style));
        }
        let bottom = interpolate_color(level * 0.5, self.style);
        let top = interpolate_color(level, self.style);
        let t = ((row as f32 + 0.5) / bar_rows.max(1.0)).clamp(0.0, 1.0);
        to_color(lerp_rgb(bottom, top, t))
    }
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let rows = area.height;
        let bottom = area.y + rows - 1;
        let columns = bar_columns(area.width, self.bands.len(), self.style.bar_gap);

        for (band, &(offset, width)) in columns.iter().enumerate() {
            if width == 0 {
                continue;
            }
            let level = self.bands[band];
            let eighths = bar_eighths(level, rows);
            let bar_rows = eighths as f32 / 8.0;

            for row in 0..rows {
                let filled = eighths.saturating_sub(row as u32 * 8).min(8) as usize;
                if filled == 0 {
                    break;
                }
                let color = self.cell_color(level, row, bar_rows);
                for x in area.x + offset..area.x + offset + width {
                    if let Some(cell) = buf.cell_mut((x, bottom - row)) {
                        cell.set_symbol(EIGHTHS[filled]).set_fg(color);
                    }
                }
            }

            let peak = self.peaks.get(band).copied().unwrap_or(0.0);
            if self.show_peaks && peak > 0.0 {
                let y = bottom - peak_row(peak, rows);
                for x in area.x + offset..area.x + offset + width {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_symbol(PEAK_SYMBOL)
                            .set_fg(to_color(self.style.peak_color));
                    }
                }
            }
        }
    }
}
