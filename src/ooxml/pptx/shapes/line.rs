//! Connector shapes (`p:cxnSp`).
//!
//! A new line stores its start point as the offset and, unless one of the
//! flips applies, its end point verbatim as the extents. [`LineFrame`] encodes
//! the two points into that form and decodes it back. Decoding is exact for
//! distinct points with positive coordinates; a zero end coordinate can read
//! back as one of the axis-aligned cases.
//!
//! A line drawn leftwards and upwards keeps its start as the offset and both
//! flips set; one drawn leftwards and downwards is moved to the end's `x` with
//! only `flipH`.
use crate::ooxml::pptx::shapes::base::BaseShape;

/// A point in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Offset, extents and flips of a line's transform, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineFrame {
    pub x: f64,
    pub y: f64,
    pub cx: f64,
    pub cy: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl LineFrame {
    /// Encode a line from `start` to `end`.
    pub fn from_points(start: Point, end: Point) -> Self {
        let (sx, sy, ex, ey) = (start.x, start.y, end.x, end.y);

        let mut frame = LineFrame {
            x: sx,
            y: sy,
            cx: if sx == ex { 0.0 } else { ex },
            cy: if sy == ey { 0.0 } else { ey },
            flip_h: false,
            flip_v: false,
        };

        if sx > ex && ey > sy {
            frame.x = ex;
            frame.cx = sx - ex;
            frame.cy = ey;
            frame.flip_h = true;
        } else if sx > ex && sy == ey {
            frame.cx = (sx - ex).abs();
            frame.cy = 0.0;
        } else if sy > ey {
            frame.cy = ey;
            frame.flip_v = true;
        }

        if frame.cx == 0.0 {
            frame.flip_v = true;
        }
        if sx > ex {
            frame.flip_h = true;
        }
        frame
    }

    /// Start point of the encoded line.
    pub fn start(&self) -> Point {
        if self.flip_h && !self.flip_v && self.cy != 0.0 {
            Point::new(self.x + self.cx, self.y)
        } else {
            Point::new(self.x, self.y)
        }
    }

    /// End point of the encoded line.
    pub fn end(&self) -> Point {
        match (self.flip_h, self.flip_v) {
            (true, false) if self.cy == 0.0 => Point::new(self.x - self.cx, self.y),
            (true, false) => Point::new(self.x, self.cy),
            (true, true) => Point::new(self.cx, self.cy),
            (false, _) if self.cx == 0.0 => Point::new(self.x, self.cy),
            (false, false) if self.cy == 0.0 => Point::new(self.cx, self.y),
            (false, _) => Point::new(self.cx, self.cy),
        }
    }
}

/// A straight line between two points.
#[derive(Debug, Clone)]
pub struct Line {
    base: BaseShape,
}

impl Line {
    pub(crate) fn new(base: BaseShape) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    /// The transform as stored, in pixels.
    pub fn frame(&self) -> LineFrame {
        let xfrm = self
            .base
            .element()
            .path(&["spPr", "xfrm"]);
        let flip = |attr: &str| xfrm.as_ref().is_some_and(|x| x.attr_bool(attr));
        LineFrame {
            x: self.base.x(),
            y: self.base.y(),
            cx: self.base.width(),
            cy: self.base.height(),
            flip_h: flip("flipH"),
            flip_v: flip("flipV"),
        }
    }

    pub fn start_point(&self) -> Point {
        self.frame().start()
    }

    pub fn end_point(&self) -> Point {
        self.frame().end()
    }

    pub fn is_flipped_horizontally(&self) -> bool {
        self.frame().flip_h
    }

    pub fn is_flipped_vertically(&self) -> bool {
        self.frame().flip_v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn round_trip(sx: f64, sy: f64, ex: f64, ey: f64) -> (Point, Point) {
        let frame = LineFrame::from_points(Point::new(sx, sy), Point::new(ex, ey));
        (frame.start(), frame.end())
    }

    #[test]
    fn test_descending_line() {
        let frame = LineFrame::from_points(Point::new(10.0, 10.0), Point::new(20.0, 5.0));
        assert_eq!((frame.x, frame.y, frame.cx, frame.cy), (10.0, 10.0, 20.0, 5.0));
        assert!(frame.flip_v);
        assert!(!frame.flip_h);
        assert_eq!(frame.start(), Point::new(10.0, 10.0));
        assert_eq!(frame.end(), Point::new(20.0, 5.0));
    }

    #[test]
    fn test_left_up_line_keeps_start_as_offset() {
        let frame = LineFrame::from_points(Point::new(100.0, 50.0), Point::new(40.0, 20.0));
        assert_eq!((frame.x, frame.y), (100.0, 50.0));
        assert_eq!((frame.cx, frame.cy), (40.0, 20.0));
        assert!(frame.flip_h);
        assert!(frame.flip_v);
        assert_eq!(frame.start(), Point::new(100.0, 50.0));
        assert_eq!(frame.end(), Point::new(40.0, 20.0));
    }

    #[test]
    fn test_left_down_line_moves_to_end_x() {
        let frame = LineFrame::from_points(Point::new(100.0, 20.0), Point::new(40.0, 50.0));
        assert_eq!((frame.x, frame.y), (40.0, 20.0));
        assert_eq!((frame.cx, frame.cy), (60.0, 50.0));
        assert!(frame.flip_h);
        assert!(!frame.flip_v);
        assert_eq!(frame.start(), Point::new(100.0, 20.0));
        assert_eq!(frame.end(), Point::new(40.0, 50.0));
    }

    #[test]
    fn test_axis_aligned_lines() {
        // Horizontal, left to right
        assert_eq!(round_trip(10.0, 30.0, 80.0, 30.0), (Point::new(10.0, 30.0), Point::new(80.0, 30.0)));
        // Horizontal, right to left
        assert_eq!(round_trip(80.0, 30.0, 10.0, 30.0), (Point::new(80.0, 30.0), Point::new(10.0, 30.0)));
        // Vertical, downwards and upwards
        assert_eq!(round_trip(15.0, 10.0, 15.0, 90.0), (Point::new(15.0, 10.0), Point::new(15.0, 90.0)));
        assert_eq!(round_trip(15.0, 90.0, 15.0, 10.0), (Point::new(15.0, 90.0), Point::new(15.0, 10.0)));
    }

    #[test]
    fn test_ascending_line() {
        assert_eq!(round_trip(10.0, 10.0, 50.0, 40.0), (Point::new(10.0, 10.0), Point::new(50.0, 40.0)));
    }

    proptest! {
        #[test]
        fn prop_distinct_points_round_trip(
            sx in 1u32..2000, sy in 1u32..2000, ex in 1u32..2000, ey in 1u32..2000,
        ) {
            prop_assume!(sx != ex || sy != ey);
            let (sx, sy, ex, ey) = (sx as f64, sy as f64, ex as f64, ey as f64);
            let (start, end) = round_trip(sx, sy, ex, ey);
            prop_assert_eq!(start, Point::new(sx, sy));
            prop_assert_eq!(end, Point::new(ex, ey));
        }
    }
}
