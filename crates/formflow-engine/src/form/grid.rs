//! Grid layout engine
//!
//! Pixel/cell mapping and the helpers that keep `FormDocument::layout` and
//! the elements' `gridProps` reconciled.

use super::types::{FormDocument, FormElement, GridProps, LayoutItem};
use crate::types::ElementId;

/// Map a pixel offset onto a cell index
///
/// Negative or non-finite offsets land in cell 0.
pub fn pixel_to_cell(pixel: f64, cell_size: f64) -> u32 {
    if !pixel.is_finite() || pixel <= 0.0 || cell_size <= 0.0 {
        return 0;
    }
    (pixel / cell_size).floor().min(u32::MAX as f64) as u32
}

/// Map a cell index back to the pixel offset of its top-left corner
pub fn cell_to_pixel(cell: u32, cell_size: f64) -> f64 {
    f64::from(cell) * cell_size
}

/// Derive the layout array from the elements' current placement
pub fn layout_items(elements: &[FormElement]) -> Vec<LayoutItem> {
    elements
        .iter()
        .map(|e| {
            let g = &e.grid_props;
            LayoutItem::new(e.id.clone(), g.x, g.y, g.w, g.h)
        })
        .collect()
}

/// Ids of elements whose committed layout entry disagrees with `gridProps`
///
/// Elements without a layout entry are not drift: the layout only records
/// what the grid surface has committed.
pub fn drifted_elements(document: &FormDocument) -> Vec<ElementId> {
    document
        .layout
        .iter()
        .filter_map(|item| {
            let element = document.find_element(&item.id)?;
            (!item.matches(&element.grid_props)).then(|| element.id.clone())
        })
        .collect()
}

/// Whether the committed layout and the elements agree
pub fn layout_in_sync(document: &FormDocument) -> bool {
    drifted_elements(document).is_empty()
}

/// Whether an element spills past the last column
///
/// Reported only; no operation rejects or corrects an overflowing element.
pub fn overflows(grid_props: &GridProps, cols: u32) -> bool {
    grid_props.x.saturating_add(grid_props.w) > cols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_cell() {
        assert_eq!(pixel_to_cell(150.0, 100.0), 1);
        assert_eq!(pixel_to_cell(220.0, 100.0), 2);
        assert_eq!(pixel_to_cell(99.9, 100.0), 0);
        assert_eq!(pixel_to_cell(-40.0, 100.0), 0);
        assert_eq!(pixel_to_cell(f64::NAN, 100.0), 0);
        assert_eq!(pixel_to_cell(300.0, 0.0), 0);
    }

    #[test]
    fn test_cell_to_pixel() {
        assert_eq!(cell_to_pixel(3, 100.0), 300.0);
        assert_eq!(pixel_to_cell(cell_to_pixel(7, 60.0), 60.0), 7);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(overflows(&GridProps::new(8, 0, 6, 2), 12));
        assert!(!overflows(&GridProps::new(6, 0, 6, 2), 12));
    }
}
