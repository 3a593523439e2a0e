//! Grow or shrink the page canvas of every page in a PDF.
//!
//! Adding a margin pushes each side of the MediaBox outward so the original
//! content sits inside a wider blank border; removing a margin pulls the
//! sides inward and crops whatever falls outside.

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

use super::artifact::{load, processing_error, save, PdfArtifact};
use super::merge::inherited_attribute;
use super::queue::SourceFile;
use crate::error::CalcKitError;
use crate::CalcKitResult;

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginUnit {
    #[default]
    Points,
    Inches,
    Millimetres,
}

impl MarginUnit {
    pub fn to_points(&self, value: f32) -> f32 {
        match self {
            MarginUnit::Points => value,
            MarginUnit::Inches => value * POINTS_PER_INCH,
            MarginUnit::Millimetres => value / MM_PER_INCH * POINTS_PER_INCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    /// Expand the canvas
    Add,
    /// Shrink the canvas, cropping content
    Remove,
}

/// Per-side offsets, always non-negative; the mode supplies the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginSpec {
    pub mode: MarginMode,
    #[serde(default)]
    pub unit: MarginUnit,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

/// Axis-aligned page box in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Overlap of two boxes, `None` when they do not share any area.
    pub fn intersect(self, other: PageBox) -> Option<PageBox> {
        let overlap = PageBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (overlap.width() > 0.0 && overlap.height() > 0.0).then_some(overlap)
    }

    fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x0),
            Object::Real(self.y0),
            Object::Real(self.x1),
            Object::Real(self.y1),
        ])
    }
}

impl MarginSpec {
    pub fn output_name(&self, source: &SourceFile) -> String {
        let prefix = match self.mode {
            MarginMode::Add => "margins-added",
            MarginMode::Remove => "margins-removed",
        };
        format!("{prefix}-{}.pdf", source.stem())
    }

    fn validate(&self) -> CalcKitResult<()> {
        let sides = [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ];
        for (field, value) in sides {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcKitError::invalid(
                    field,
                    "Margin must be a non-negative number",
                ));
            }
        }
        if sides.iter().all(|(_, v)| *v == 0.0) {
            return Err(CalcKitError::invalid("margins", "Enter at least one margin"));
        }
        Ok(())
    }

    /// Re-map the sides as the reader sees them onto the unrotated page.
    /// `/Rotate` turns a page clockwise for display, so at 90 degrees the
    /// visible top edge is the stored left edge.
    pub fn for_rotation(&self, rotate: i64) -> MarginSpec {
        let (top, right, bottom, left) = match rotate.rem_euclid(360) {
            90 => (self.right, self.bottom, self.left, self.top),
            180 => (self.bottom, self.left, self.top, self.right),
            270 => (self.left, self.top, self.right, self.bottom),
            _ => (self.top, self.right, self.bottom, self.left),
        };
        MarginSpec {
            mode: self.mode,
            unit: self.unit,
            top,
            right,
            bottom,
            left,
        }
    }

    /// Apply the offsets to one page box.
    pub fn apply(&self, page: PageBox) -> CalcKitResult<PageBox> {
        let [top, right, bottom, left] =
            [self.top, self.right, self.bottom, self.left].map(|v| self.unit.to_points(v));
        let adjusted = match self.mode {
            MarginMode::Add => PageBox {
                x0: page.x0 - left,
                y0: page.y0 - bottom,
                x1: page.x1 + right,
                y1: page.y1 + top,
            },
            MarginMode::Remove => PageBox {
                x0: page.x0 + left,
                y0: page.y0 + bottom,
                x1: page.x1 - right,
                y1: page.y1 - top,
            },
        };
        if adjusted.width() <= 0.0 || adjusted.height() <= 0.0 {
            return Err(CalcKitError::invalid(
                "margins",
                format!(
                    "Margins remove the whole {:.0}x{:.0}pt page",
                    page.width(),
                    page.height()
                ),
            ));
        }
        Ok(adjusted)
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Read a page box (`MediaBox`, `CropBox`), following inheritance and
/// references.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<PageBox> {
    let raw = inherited_attribute(doc, page_id, key)?;
    let array = resolve(doc, &raw)?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut coords = [0f32; 4];
    for (slot, value) in coords.iter_mut().zip(array) {
        *slot = resolve(doc, value)?.as_float().ok()?;
    }
    Some(PageBox {
        x0: coords[0].min(coords[2]),
        y0: coords[1].min(coords[3]),
        x1: coords[0].max(coords[2]),
        y1: coords[1].max(coords[3]),
    })
}

/// Effective `/Rotate` of a page in degrees; absent or malformed is 0.
fn rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|raw| resolve(doc, &raw)?.as_i64().ok())
        .unwrap_or(0)
}

/// Resize every page of `file` by the given margins.
///
/// An existing CropBox is moved by the same offsets rather than replaced, so
/// content cropped out of the source stays hidden.
pub fn adjust_margins(file: &SourceFile, spec: &MarginSpec) -> CalcKitResult<PdfArtifact> {
    spec.validate()?;
    let mut doc = load(file)?;

    let mut resized = Vec::new();
    for (number, page_id) in doc.get_pages() {
        let media = page_box(&doc, page_id, b"MediaBox").ok_or_else(|| {
            processing_error(&file.name, format!("page {number} has no readable MediaBox"))
        })?;
        let crop = page_box(&doc, page_id, b"CropBox")
            .and_then(|crop| crop.intersect(media))
            .unwrap_or(media);
        let sides = spec.for_rotation(rotation(&doc, page_id));
        resized.push((page_id, sides.apply(media)?, sides.apply(crop)?));
    }

    for (page_id, media, crop) in resized {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("MediaBox", media.to_object());
            dict.set("CropBox", crop.to_object());
        }
    }

    log::debug!("{:?} margins on {}", spec.mode, file.name);
    save(doc, spec.output_name(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> PageBox {
        PageBox {
            x0: 0.0,
            y0: 0.0,
            x1: 612.0,
            y1: 792.0,
        }
    }

    fn spec(mode: MarginMode, inches: f32) -> MarginSpec {
        MarginSpec {
            mode,
            unit: MarginUnit::Inches,
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }

    #[test]
    fn test_add_expands_every_side() {
        let out = spec(MarginMode::Add, 1.0).apply(letter()).unwrap();
        assert_eq!(out.x0, -72.0);
        assert_eq!(out.width(), 756.0);
        assert_eq!(out.height(), 936.0);
    }

    #[test]
    fn test_remove_shrinks() {
        let out = spec(MarginMode::Remove, 0.5).apply(letter()).unwrap();
        assert_eq!(out.x0, 36.0);
        assert_eq!(out.width(), 540.0);
    }

    #[test]
    fn test_remove_whole_page_is_rejected() {
        assert!(spec(MarginMode::Remove, 5.0).apply(letter()).is_err());
    }

    #[test]
    fn test_rotation_moves_sides() {
        let visual = MarginSpec {
            mode: MarginMode::Add,
            unit: MarginUnit::Points,
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        let quarter = visual.for_rotation(90);
        assert_eq!(
            (quarter.top, quarter.right, quarter.bottom, quarter.left),
            (2.0, 3.0, 4.0, 1.0)
        );
        let three_quarter = visual.for_rotation(-90);
        assert_eq!(
            (three_quarter.top, three_quarter.right, three_quarter.bottom, three_quarter.left),
            (4.0, 1.0, 2.0, 3.0)
        );
        let half = visual.for_rotation(180);
        assert_eq!((half.top, half.left), (3.0, 2.0));
        assert_eq!(visual.for_rotation(360).top, 1.0);
    }

    #[test]
    fn test_intersect() {
        let inner = PageBox {
            x0: 100.0,
            y0: 100.0,
            x1: 700.0,
            y1: 200.0,
        };
        assert_eq!(inner.intersect(letter()).map(|b| b.x1), Some(612.0));
        let outside = PageBox {
            x0: 700.0,
            y0: 0.0,
            x1: 800.0,
            y1: 10.0,
        };
        assert!(outside.intersect(letter()).is_none());
    }

    #[test]
    fn test_millimetres() {
        assert!((MarginUnit::Millimetres.to_points(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_validation() {
        let mut s = spec(MarginMode::Add, 0.0);
        assert!(s.validate().is_err());
        s.left = -1.0;
        assert!(s.validate().is_err());
        s.left = 1.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_output_name() {
        let file = SourceFile::new("Quarterly Report.pdf", b"%PDF-".to_vec());
        assert_eq!(
            spec(MarginMode::Add, 1.0).output_name(&file),
            "margins-added-Quarterly Report.pdf"
        );
        assert_eq!(
            spec(MarginMode::Remove, 1.0).output_name(&file),
            "margins-removed-Quarterly Report.pdf"
        );
    }
}
