//! Size report table
//!
//! One row per image: the source size, the pass-through size with its ratio
//! to the source, every width-only variant, and every forced-codec variant
//! with its ratio to the largest width-only variant. Ratios are floored
//! percentages.

use crate::transcode::ImageResults;
use crate::variant::VariantCatalog;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary units, rounded to whole units
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", value.round(), UNITS[unit])
}

/// Floored `part / whole * 100`, `None` when `whole` is zero
#[must_use]
pub fn floor_percent(part: u64, whole: u64) -> Option<u64> {
    (whole != 0).then(|| part.saturating_mul(100) / whole)
}

fn with_percent(size: u64, whole: u64) -> String {
    match floor_percent(size, whole) {
        Some(pct) => format!("{} ({pct}%)", format_bytes(size)),
        None => format_bytes(size),
    }
}

/// Table of per-image size rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SizeTable {
    /// Table with headers derived from the catalog
    #[must_use]
    pub fn new(catalog: &VariantCatalog) -> Self {
        let mut header = vec![
            "Image".to_string(),
            "Original Size".to_string(),
            "Transcoded Size".to_string(),
        ];
        header.extend(
            catalog
                .width_variants()
                .filter_map(|v| v.options.width)
                .map(|w| format!("{w}px")),
        );
        header.extend(catalog.codec_variants().map(|v| {
            let codec = v.options.forced_codec().map_or("", |c| c.as_str());
            match v.options.width {
                Some(w) => format!("{w}px {codec}"),
                None => codec.to_string(),
            }
        }));

        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Build a table for a whole run
    #[must_use]
    pub fn from_results(catalog: &VariantCatalog, results: &[ImageResults]) -> Self {
        let mut table = Self::new(catalog);
        for image in results {
            table.push(catalog, image);
        }
        table
    }

    /// Append the row for one image
    pub fn push(&mut self, catalog: &VariantCatalog, image: &ImageResults) {
        let size_of = |name: &str| image.get(name).map(|r| r.size());
        let missing = || "-".to_string();

        let mut row = vec![image.image_name.clone(), format_bytes(image.source_size)];

        row.push(
            catalog
                .identity_variant()
                .and_then(|v| size_of(&v.name))
                .map_or_else(missing, |size| with_percent(size, image.source_size)),
        );

        for variant in catalog.width_variants() {
            row.push(size_of(&variant.name).map_or_else(missing, format_bytes));
        }

        let largest = catalog
            .largest_width_variant()
            .and_then(|v| size_of(&v.name));
        for variant in catalog.codec_variants() {
            let cell = match (size_of(&variant.name), largest) {
                (Some(size), Some(large)) => with_percent(size, large),
                (Some(size), None) => format_bytes(size),
                (None, _) => missing(),
            };
            row.push(cell);
        }

        self.rows.push(row);
    }

    /// Header cells
    #[inline]
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Render as a boxed fixed-width table
    #[must_use]
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let border = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };
        let render_row = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, &width) in cells.iter().zip(&widths) {
                line.push_str(&format!(" {cell:<width$} |"));
            }
            line
        };

        let mut out = vec![border.clone(), render_row(&self.header), border.clone()];
        out.extend(self.rows.iter().map(|row| render_row(row)));
        out.push(border);
        out.join("\n")
    }
}
