//! PNG rendering of bar charts with the `image` crate
//!
//! A chart is a white canvas with viridis-coloured bars scaled to the
//! largest value, axis lines, the title across the top, both axis labels,
//! one tick label per bar and the value range along the value axis.

use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

use super::text::{draw_text, draw_text_vertical, fit, text_width, GLYPH_SIZE};
use super::{BarChart, ChartRenderer, Orientation};
use crate::error::{ErrorCode, ErrorExt, Result};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const TEXT: Rgb<u8> = Rgb([0, 0, 0]);

/// Viridis colour map sampled at 0, 0.25, 0.5, 0.75 and 1
const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

/// Room for value labels and the rotated y label
const MARGIN_LEFT_VERTICAL: u32 = 90;
/// Room for channel names beside horizontal bars
const MARGIN_LEFT_HORIZONTAL: u32 = 220;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 70;

const TITLE_SCALE: u32 = 2;
/// Gap between an axis and the labels beside it
const LABEL_GAP: u32 = 8;
/// Left edge of the rotated y label
const Y_LABEL_X: u32 = 12;
/// Distance of the x label's top edge from the bottom of the image
const X_LABEL_RISE: u32 = 22;

/// Fraction of each slot covered by its bar
const BAR_FILL: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct PngChartRenderer;

impl PngChartRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the chart into an in-memory image
    pub fn draw(&self, chart: &BarChart) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(chart.width, chart.height, BACKGROUND);
        let area = PlotArea::for_chart(chart);
        let max = chart.max_value();
        let count = chart.bars.len();

        for (index, bar) in chart.bars.iter().enumerate() {
            if max == 0 {
                break;
            }
            let share = bar.value as f64 / max as f64;
            let colour = palette_colour(index, count);
            match chart.orientation {
                Orientation::Vertical => {
                    let slot = area.width as f64 / count as f64;
                    let bar_width = (slot * BAR_FILL).max(1.0);
                    let x = area.left as f64 + slot * index as f64 + (slot - bar_width) / 2.0;
                    let height = (area.height as f64 * share).round() as u32;
                    let y = area.bottom().saturating_sub(height);
                    fill_rect(&mut canvas, x as u32, y, bar_width as u32, height, colour);
                }
                Orientation::Horizontal => {
                    let slot = area.height as f64 / count as f64;
                    let bar_height = (slot * BAR_FILL).max(1.0);
                    let y = area.top as f64 + slot * index as f64 + (slot - bar_height) / 2.0;
                    let length = (area.width as f64 * share).round() as u32;
                    fill_rect(&mut canvas, area.left, y as u32, length, bar_height as u32, colour);
                }
            }
        }

        // x axis along the bottom, y axis along the left edge
        fill_rect(&mut canvas, area.left, area.bottom(), area.width, 2, AXIS);
        fill_rect(&mut canvas, area.left.saturating_sub(2), area.top, 2, area.height + 2, AXIS);

        draw_labels(&mut canvas, chart, &area);
        canvas
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &BarChart, path: &Path) -> Result<()> {
        let canvas = self.draw(chart);
        canvas.save_with_format(path, ImageFormat::Png).to_io_error(
            ErrorCode::IO_RENDER_FAILED,
            "Failed to save chart",
            path,
        )?;
        debug!(bars = chart.bars.len(), "Rendered {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl PlotArea {
    fn for_chart(chart: &BarChart) -> Self {
        let margin_left = match chart.orientation {
            Orientation::Vertical => MARGIN_LEFT_VERTICAL,
            Orientation::Horizontal => MARGIN_LEFT_HORIZONTAL,
        };
        Self {
            left: margin_left.min(chart.width),
            top: MARGIN_TOP.min(chart.height),
            width: chart.width.saturating_sub(margin_left + MARGIN_RIGHT),
            height: chart.height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM),
        }
    }

    fn bottom(&self) -> u32 {
        self.top + self.height
    }

    fn right(&self) -> u32 {
        self.left + self.width
    }
}

fn draw_labels(canvas: &mut RgbImage, chart: &BarChart, area: &PlotArea) {
    let glyph = i64::from(GLYPH_SIZE);

    let title = fit(&chart.title, chart.width.saturating_sub(20), TITLE_SCALE);
    let title_x = centred(0, chart.width, text_width(&title, TITLE_SCALE));
    let title_y = (i64::from(area.top) - glyph * i64::from(TITLE_SCALE)) / 2;
    draw_text(canvas, title_x, title_y, &title, TITLE_SCALE, TEXT);

    let x_label = fit(&chart.x_label, area.width, 1);
    let x_label_x = centred(area.left, area.width, text_width(&x_label, 1));
    let x_label_y = i64::from(chart.height) - i64::from(X_LABEL_RISE);
    draw_text(canvas, x_label_x, x_label_y, &x_label, 1, TEXT);

    let y_label = fit(&chart.y_label, area.height, 1);
    let y_label_bottom =
        i64::from(area.top + area.height / 2) + i64::from(text_width(&y_label, 1)) / 2;
    draw_text_vertical(canvas, i64::from(Y_LABEL_X), y_label_bottom, &y_label, 1, TEXT);

    let count = chart.bars.len();
    if count == 0 {
        return;
    }
    let below_axis = i64::from(area.bottom() + LABEL_GAP);

    match chart.orientation {
        Orientation::Vertical => {
            let slot = area.width as f64 / count as f64;
            for (index, bar) in chart.bars.iter().enumerate() {
                let label = fit(&bar.label, slot as u32, 1);
                let centre = area.left as f64 + slot * (index as f64 + 0.5);
                let x = centre as i64 - i64::from(text_width(&label, 1)) / 2;
                draw_text(canvas, x, below_axis, &label, 1, TEXT);
            }
        }
        Orientation::Horizontal => {
            let slot = area.height as f64 / count as f64;
            let room = area.left.saturating_sub(Y_LABEL_X + GLYPH_SIZE + 2 * LABEL_GAP);
            for (index, bar) in chart.bars.iter().enumerate() {
                let label = fit(&bar.label, room, 1);
                let centre = area.top as f64 + slot * (index as f64 + 0.5);
                let x = right_aligned(area.left.saturating_sub(LABEL_GAP), &label);
                draw_text(canvas, x, centre as i64 - glyph / 2, &label, 1, TEXT);
            }
        }
    }

    let max = chart.max_value();
    if max == 0 {
        return;
    }
    let max_label = compact(max);
    match chart.orientation {
        Orientation::Vertical => {
            let x_end = area.left.saturating_sub(LABEL_GAP);
            let zero_y = i64::from(area.bottom()) - glyph;
            draw_text(canvas, right_aligned(x_end, "0"), zero_y, "0", 1, TEXT);
            let max_x = right_aligned(x_end, &max_label);
            draw_text(canvas, max_x, i64::from(area.top), &max_label, 1, TEXT);
        }
        Orientation::Horizontal => {
            draw_text(canvas, i64::from(area.left), below_axis, "0", 1, TEXT);
            let max_x = right_aligned(area.right(), &max_label);
            draw_text(canvas, max_x, below_axis, &max_label, 1, TEXT);
        }
    }
}

/// Left edge that centres `width` pixels within `start..start + span`
fn centred(start: u32, span: u32, width: u32) -> i64 {
    i64::from(start) + (i64::from(span) - i64::from(width)) / 2
}

/// Left edge of `text` when it should end at `x_end`
fn right_aligned(x_end: u32, text: &str) -> i64 {
    i64::from(x_end) - i64::from(text_width(text, 1))
}

/// Short form of a total for the value axis, e.g. `1.2M` or `350K`
fn compact(value: u64) -> String {
    let (scaled, suffix) = match value {
        v if v >= 1_000_000_000 => (v as f64 / 1e9, "B"),
        v if v >= 1_000_000 => (v as f64 / 1e6, "M"),
        v if v >= 1_000 => (v as f64 / 1e3, "K"),
        v => return v.to_string(),
    };
    let digits = format!("{:.1}", scaled);
    format!("{}{}", digits.trim_end_matches(".0"), suffix)
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, colour: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, colour);
        }
    }
}

/// Evenly spaced viridis colour for bar `index` of `count`
fn palette_colour(index: usize, count: usize) -> Rgb<u8> {
    let t = if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 1);
    let upper = (lower + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lower as f64;

    let mix = |channel: usize| {
        let a = VIRIDIS[lower][channel] as f64;
        let b = VIRIDIS[upper][channel] as f64;
        (a + (b - a) * frac).round() as u8
    };
    Rgb([mix(0), mix(1), mix(2)])
}
