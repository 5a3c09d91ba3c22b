use crate::cartesian::{CartesianPoint2d, Segment, POINT_ON_SEGMENT_TOLERANCE};
use crate::vertex::Vertex;

/// Direction of a closed contour traversal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Winding {
    /// Positive signed area.
    CounterClockwise,
    /// Negative signed area.
    Clockwise,
}

/// Sequence of vertices connected by straight segments.
///
/// Closed contours are iterated without their duplicated closing vertex; [`Contour::iter_points_closing`] and
/// [`Contour::iter_segments`] add the closing segment back.
pub trait Contour {
    /// Whether the last vertex is connected back to the first one.
    fn is_closed(&self) -> bool;

    /// Distinct vertices of the contour.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Vertex>;

    /// Vertices of the contour, repeating the first one at the end if the contour is closed.
    fn iter_points_closing(&self) -> impl Iterator<Item = &'_ Vertex> {
        ContourPointsIterator::new(self.iter_points(), self.is_closed())
    }

    /// Segments of the contour, including the closing one.
    fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, Vertex>> {
        ContourSegmentIterator::new(ContourPointsIterator::new(self.iter_points(), self.is_closed()))
    }

    /// Signed area enclosed by the contour (shoelace formula). Positive for counterclockwise contours. Open contours
    /// are treated as if they were closed.
    fn area_signed(&self) -> f64 {
        let mut iter = ContourSegmentIterator::new(ContourPointsIterator::new(self.iter_points(), true));
        let Some(first) = iter.next() else {
            return 0.0;
        };

        let origin = *first.0;
        let mut area = 0.0;
        for Segment(a, b) in std::iter::once(first).chain(iter) {
            area += (a.x - origin.x) * (b.y - origin.y) - (b.x - origin.x) * (a.y - origin.y);
        }

        area / 2.0
    }

    /// Traversal direction, or `None` for contours with zero area.
    fn winding(&self) -> Option<Winding> {
        let area = self.area_signed();
        if area > 0.0 {
            Some(Winding::CounterClockwise)
        } else if area < 0.0 {
            Some(Winding::Clockwise)
        } else {
            None
        }
    }

    /// Squared distance from the contour to the point, or `None` for an empty contour.
    fn distance_to_point_sq(&self, point: &Vertex) -> Option<f64> {
        let mut points = self.iter_points();
        let first = points.next()?;
        let segments_min = self
            .iter_segments()
            .map(|segment| segment.distance_to_point_sq(point))
            .min_by(f64::total_cmp);

        Some(segments_min.unwrap_or_else(|| first.distance_sq(point)))
    }
}

/// Iterator over contour vertices that repeats the first vertex at the end of closed contours.
pub struct ContourPointsIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    points_iter: Iter,
    is_closed: bool,
    first_point: Option<&'a Vertex>,
}

impl<'a, Iter> ContourPointsIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    fn new(points_iter: Iter, is_closed: bool) -> Self {
        Self {
            points_iter,
            is_closed,
            first_point: None,
        }
    }
}

impl<'a, Iter> Iterator for ContourPointsIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.points_iter.next();
        if self.is_closed && self.first_point.is_none() {
            self.first_point = next;
        }

        if next.is_none() {
            self.first_point.take()
        } else {
            next
        }
    }
}

/// Iterator over consecutive vertex pairs of a contour.
pub struct ContourSegmentIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    points_iter: ContourPointsIterator<'a, Iter>,
    prev_point: Option<&'a Vertex>,
}

impl<'a, Iter> ContourSegmentIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    fn new(mut points_iter: ContourPointsIterator<'a, Iter>) -> Self {
        let prev_point = points_iter.next();
        Self {
            points_iter,
            prev_point,
        }
    }
}

impl<'a, Iter> Iterator for ContourSegmentIterator<'a, Iter>
where
    Iter: Iterator<Item = &'a Vertex>,
{
    type Item = Segment<'a, Vertex>;

    fn next(&mut self) -> Option<Self::Item> {
        let next_point = self.points_iter.next()?;
        let prev_point = self.prev_point.replace(next_point)?;

        Some(Segment(prev_point, next_point))
    }
}

/// Location of a point relative to a closed ring.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RingPosition {
    Inside,
    OnBoundary,
    Outside,
}

/// Locates `point` relative to the ring given by `vertices` using the winding number. The closing vertex may or may
/// not be repeated at the end of the slice.
pub(crate) fn point_in_ring(vertices: &[Vertex], point: &Vertex) -> RingPosition {
    let Some(first) = vertices.first() else {
        return RingPosition::Outside;
    };

    let closing = std::iter::once(first);
    let mut winding_number = 0i32;
    for (a, b) in vertices.iter().zip(vertices.iter().skip(1).chain(closing)) {
        if Segment(a, b).contains_point(point, POINT_ON_SEGMENT_TOLERANCE) {
            return RingPosition::OnBoundary;
        }

        let is_left = (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);
        if a.y <= point.y {
            if b.y > point.y && is_left > 0.0 {
                winding_number += 1;
            }
        } else if b.y <= point.y && is_left < 0.0 {
            winding_number -= 1;
        }
    }

    if winding_number != 0 {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}
