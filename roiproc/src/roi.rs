use crate::{DispatchError, Result};

/// A rectangular region of a frame, `[x0, x1) x [y0, y1)` in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Roi {
    tag: String,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Roi {
    /// Fails with [`DispatchError::EmptyRoi`] unless `x0 < x1` and `y0 < y1`.
    pub fn new(tag: impl Into<String>, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self> {
        if x0 >= x1 || y0 >= y1 {
            return Err(DispatchError::EmptyRoi);
        }
        Ok(Self {
            tag: tag.into(),
            x0,
            y0,
            x1,
            y1,
        })
    }

    /// Builds a region from the two corners of a drag gesture.
    ///
    /// The corners may come in any order and may lie outside the frame; they are
    /// clamped to `width x height` first.
    pub fn from_corners(
        tag: impl Into<String>,
        a: (i32, i32),
        b: (i32, i32),
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let clamp = |v: i32, max: u32| v.max(0).min(max as i32) as u32;
        let (ax, ay) = (clamp(a.0, width), clamp(a.1, height));
        let (bx, by) = (clamp(b.0, width), clamp(b.1, height));
        Self::new(tag, ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn x0(&self) -> u32 {
        self.x0
    }

    pub fn y0(&self) -> u32 {
        self.y0
    }

    pub fn x1(&self) -> u32 {
        self.x1
    }

    pub fn y1(&self) -> u32 {
        self.y1
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Whether the region lies entirely inside a `width x height` frame.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x1 <= width && self.y1 <= height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }

    /// The part of the region inside a `width x height` frame.
    ///
    /// Fails with [`DispatchError::RoiOutOfBounds`] when nothing of it is left.
    pub fn clamped(&self, width: u32, height: u32) -> Result<Roi> {
        let (x1, y1) = (self.x1.min(width), self.y1.min(height));
        if self.x0 >= x1 || self.y0 >= y1 {
            return Err(DispatchError::RoiOutOfBounds {
                x0: self.x0,
                y0: self.y0,
                x1: self.x1,
                y1: self.y1,
                width,
                height,
            });
        }
        Ok(Roi {
            tag: self.tag.clone(),
            x0: self.x0,
            y0: self.y0,
            x1,
            y1,
        })
    }
}

/// Selection state of the single region of interest.
///
/// `Idle -> Selecting -> Selected` through a drag gesture, back to `Idle` on
/// delete. Processing commands never change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Idle,
    Selecting { anchor: (i32, i32), cursor: (i32, i32) },
    Selected(Roi),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Idle
    }
}

impl Selection {
    /// Start a drag at `point`. Any previous region is discarded.
    pub fn begin_drag(&mut self, point: (i32, i32)) {
        *self = Selection::Selecting {
            anchor: point,
            cursor: point,
        };
    }

    /// Move the free corner. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, point: (i32, i32)) {
        if let Selection::Selecting { cursor, .. } = self {
            *cursor = point;
        }
    }

    /// Release the drag.
    ///
    /// A non-empty rectangle becomes the active region; anything else drops back
    /// to `Idle`. Returns the active region, if any.
    pub fn finish_drag(&mut self, tag: &str, width: u32, height: u32) -> Option<&Roi> {
        if let Selection::Selecting { anchor, cursor } = *self {
            *self = match Roi::from_corners(tag, anchor, cursor, width, height) {
                Ok(roi) => Selection::Selected(roi),
                Err(_) => Selection::Idle,
            };
        }
        self.active_roi()
    }

    /// Make `roi` the active region directly.
    pub fn select(&mut self, roi: Roi) {
        *self = Selection::Selected(roi);
    }

    pub fn delete(&mut self) {
        *self = Selection::Idle;
    }

    pub fn active_roi(&self) -> Option<&Roi> {
        match self {
            Selection::Selected(roi) => Some(roi),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rectangles_are_rejected() {
        assert!(matches!(Roi::new("a", 3, 0, 3, 5), Err(DispatchError::EmptyRoi)));
        assert!(matches!(Roi::new("a", 0, 5, 4, 2), Err(DispatchError::EmptyRoi)));
        assert!(Roi::new("a", 0, 0, 1, 1).is_ok());
    }

    #[test]
    fn corners_are_normalized_and_clamped() {
        let roi = Roi::from_corners("r", (30, -4), (-2, 12), 20, 10).unwrap();
        assert_eq!((roi.x0(), roi.y0(), roi.x1(), roi.y1()), (0, 0, 20, 10));
        assert_eq!((roi.width(), roi.height()), (20, 10));
        assert!(roi.fits(20, 10));
        assert!(!roi.fits(19, 10));
    }

    #[test]
    fn drag_outside_the_frame_is_empty() {
        assert!(Roi::from_corners("r", (25, 1), (40, 8), 20, 10).is_err());
    }

    #[test]
    fn clamping_to_a_smaller_frame() {
        let roi = Roi::new("r", 10, 4, 60, 40).unwrap();
        let clamped = roi.clamped(32, 24).unwrap();
        assert_eq!((clamped.x0(), clamped.y0(), clamped.x1(), clamped.y1()), (10, 4, 32, 24));
        assert_eq!(clamped.tag(), "r");
        assert_eq!(roi.clamped(64, 48).unwrap(), roi);
        assert!(matches!(
            roi.clamped(10, 24),
            Err(DispatchError::RoiOutOfBounds { width: 10, height: 24, .. })
        ));
    }

    #[test]
    fn selection_transitions() {
        let mut selection = Selection::default();
        assert_eq!(selection, Selection::Idle);
        assert!(selection.active_roi().is_none());

        selection.drag_to((4, 4));
        assert_eq!(selection, Selection::Idle);

        selection.begin_drag((8, 2));
        selection.drag_to((2, 6));
        assert!(selection.active_roi().is_none());
        let roi = selection.finish_drag("roi", 10, 10).cloned().unwrap();
        assert_eq!((roi.x0(), roi.y0(), roi.x1(), roi.y1()), (2, 2, 8, 6));
        assert_eq!(roi.tag(), "roi");

        selection.delete();
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn click_without_drag_selects_nothing() {
        let mut selection = Selection::Idle;
        selection.begin_drag((3, 3));
        assert!(selection.finish_drag("roi", 10, 10).is_none());
        assert_eq!(selection, Selection::Idle);
    }
}
