//! Word placement. Pure: the same frequencies and options always give the
//! same layout.

use crate::frequencies::WordFrequency;
use crate::palette::viridis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use tracing::debug;
use verdict_core::WordCloudConfig;

/// Approximate glyph advance as a fraction of the font size.
const CHAR_WIDTH: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub prefer_horizontal: f64,
    pub relative_scaling: f64,
    pub min_font_size: u32,
    pub margin: u32,
    /// Occupancy grid resolution in pixels.
    pub cell: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&WordCloudConfig::default())
    }
}

impl From<&WordCloudConfig> for LayoutOptions {
    fn from(config: &WordCloudConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            seed: config.seed,
            prefer_horizontal: config.prefer_horizontal,
            relative_scaling: config.relative_scaling,
            min_font_size: 4,
            margin: 2,
            cell: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Top-left corner of the word's box.
    pub x: u32,
    pub y: u32,
    pub vertical: bool,
    pub color: (u8, u8, u8),
}

impl PlacedWord {
    pub fn box_size(&self) -> (u32, u32) {
        text_box(&self.text, self.font_size, self.vertical)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudLayout {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

fn text_box(text: &str, font_size: u32, vertical: bool) -> (u32, u32) {
    let along = (CHAR_WIDTH * font_size as f64 * text.chars().count() as f64).ceil() as u32;
    let across = font_size;
    if vertical {
        (across, along)
    } else {
        (along, across)
    }
}

struct Occupancy {
    cols: usize,
    rows: usize,
    filled: Vec<bool>,
    /// Summed-area table, `(cols + 1) * (rows + 1)`.
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            filled: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn at(&self, col: usize, row: usize) -> u32 {
        self.integral[row * (self.cols + 1) + col]
    }

    fn is_free(&self, col: usize, row: usize, w: usize, h: usize) -> bool {
        let sum = self.at(col + w, row + h) + self.at(col, row) - self.at(col + w, row) - self.at(col, row + h);
        sum == 0
    }

    fn fill(&mut self, col: usize, row: usize, w: usize, h: usize) {
        for r in row..(row + h).min(self.rows) {
            for c in col..(col + w).min(self.cols) {
                self.filled[r * self.cols + c] = true;
            }
        }
        let stride = self.cols + 1;
        for r in 0..self.rows {
            let mut row_sum = 0;
            for c in 0..self.cols {
                row_sum += self.filled[r * self.cols + c] as u32;
                self.integral[(r + 1) * stride + c + 1] = self.integral[r * stride + c + 1] + row_sum;
            }
        }
    }

    /// Walks an Archimedean spiral out from a random start until a box of
    /// `w` x `h` cells fits.
    fn spiral_search(&self, w: usize, h: usize, rng: &mut StdRng) -> Option<(usize, usize)> {
        if w == 0 || h == 0 || w > self.cols || h > self.rows {
            return None;
        }
        let max_col = (self.cols - w) as f64;
        let max_row = (self.rows - h) as f64;
        let start_col = rng.gen_range(0..=self.cols - w) as f64;
        let start_row = rng.gen_range(0..=self.rows - h) as f64;

        let aspect = self.cols as f64 / self.rows as f64;
        let reach_col = start_col.max(max_col - start_col) / aspect;
        let reach_row = start_row.max(max_row - start_row);
        let max_radius = reach_col.hypot(reach_row) + 1.0;

        let mut theta = 0.0_f64;
        loop {
            // one cell between turns
            let radius = theta / TAU;
            if radius > max_radius {
                return None;
            }
            let col = (start_col + radius * theta.cos() * aspect).round();
            let row = (start_row + radius * theta.sin()).round();
            if (0.0..=max_col).contains(&col) && (0.0..=max_row).contains(&row) {
                let (col, row) = (col as usize, row as usize);
                if self.is_free(col, row, w, h) {
                    return Some((col, row));
                }
            }
            theta += 1.0 / radius.max(1.0);
        }
    }
}

/// Places `frequencies` (most frequent first) on the canvas.
///
/// Each word's font follows the previous one scaled by
/// `relative_scaling * (weight / previous_weight) + (1 - relative_scaling)`.
/// A word that does not fit is tried in the other orientation, then with a
/// smaller font; placement stops once the font falls below `min_font_size`.
pub fn layout(frequencies: &[WordFrequency], options: &LayoutOptions) -> CloudLayout {
    let mut placed = Vec::new();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let cell = options.cell.max(1);
    let cols = (options.width / cell) as usize;
    let rows = (options.height / cell) as usize;
    let mut grid = Occupancy::new(cols, rows);
    let to_cells = |px: u32| ((px + options.margin) as f64 / cell as f64).ceil() as usize;

    let Some(first) = frequencies.first() else {
        return CloudLayout {
            width: options.width,
            height: options.height,
            words: placed,
        };
    };
    let fit_width = 0.95 * options.width as f64 / (CHAR_WIDTH * first.word.chars().count() as f64);
    let mut font_size = fit_width.min(options.height as f64 * 0.5).floor() as u32;
    let mut last_weight = 1.0;
    let rs = options.relative_scaling;
    // boxes already known not to fit; anything at least as large is skipped
    let mut rejected: Vec<(usize, usize)> = Vec::new();

    for frequency in frequencies {
        if frequency.weight <= 0.0 {
            continue;
        }
        if rs != 0.0 {
            font_size = ((rs * (frequency.weight / last_weight) + (1.0 - rs)) * font_size as f64).round() as u32;
        }
        let mut vertical = rng.gen::<f64>() >= options.prefer_horizontal;
        let mut tried_other = false;

        let position = loop {
            if font_size < options.min_font_size {
                break None;
            }
            let (w, h) = text_box(&frequency.word, font_size, vertical);
            let (wc, hc) = (to_cells(w), to_cells(h));
            let known_miss = rejected.iter().any(|&(rw, rh)| rw <= wc && rh <= hc);
            if !known_miss {
                if let Some(found) = grid.spiral_search(wc, hc, &mut rng) {
                    break Some((found, wc, hc));
                }
                rejected.push((wc, hc));
            }
            if !tried_other && options.prefer_horizontal < 1.0 {
                vertical = !vertical;
                tried_other = true;
            } else {
                font_size = font_size.saturating_sub((font_size / 20).max(1));
                vertical = false;
            }
        };

        let Some(((col, row), wc, hc)) = position else {
            debug!("Stopped placing at '{}' after {} words", frequency.word, placed.len());
            break;
        };
        grid.fill(col, row, wc, hc);
        placed.push(PlacedWord {
            text: frequency.word.clone(),
            font_size,
            x: col as u32 * cell + options.margin / 2,
            y: row as u32 * cell + options.margin / 2,
            vertical,
            color: viridis(rng.gen::<f64>()),
        });
        last_weight = frequency.weight;
    }

    CloudLayout {
        width: options.width,
        height: options.height,
        words: placed,
    }
}
