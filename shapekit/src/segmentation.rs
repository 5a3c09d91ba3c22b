//! Dynamic segmentation: locating points and sub-lines by the distance along a line.
//!
//! Distances are measured from the [`StartingPoint`] along the vertex sequence. Multilines are treated as their
//! member lines laid end to end in order.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_in_range, ensure_positive, ShapeError, ShapeResult};
use crate::shape::{BaseShape, LineShape, MultilineShape, PointShape, ValidationMode};
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Scale applied to a line when a requested position lies beyond its end.
const BEYOND_END_SCALE: f64 = 10.0;

/// End of the line distances are measured from.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartingPoint {
    /// First vertex.
    #[default]
    FirstPoint,
    /// Last vertex. The line is walked backwards.
    LastPoint,
}

/// Vertex sequences walked in the order requested by a [`StartingPoint`].
struct Path {
    lines: Vec<Vec<Vertex>>,
    shape_unit: GeographyUnit,
    distance_unit: DistanceUnit,
}

impl Path {
    fn new<'a>(
        lines: impl DoubleEndedIterator<Item = &'a [Vertex]>,
        starting_point: StartingPoint,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> Self {
        let lines = match starting_point {
            StartingPoint::FirstPoint => lines.map(<[Vertex]>::to_vec).collect(),
            StartingPoint::LastPoint => lines
                .rev()
                .map(|line| line.iter().rev().copied().collect())
                .collect(),
        };

        Self {
            lines,
            shape_unit,
            distance_unit,
        }
    }

    fn segment_length(&self, a: &Vertex, b: &Vertex) -> f64 {
        a.distance_to(b, self.shape_unit, self.distance_unit)
    }

    fn line_length(&self, line: &[Vertex]) -> f64 {
        line.windows(2).map(|pair| self.segment_length(&pair[0], &pair[1])).sum()
    }

    fn total_length(&self) -> f64 {
        self.lines.iter().map(|line| self.line_length(line)).sum()
    }

    fn is_finite(&self) -> bool {
        self.lines.iter().flatten().all(Vertex::is_finite)
    }

    fn start(&self) -> Option<Vertex> {
        self.lines.first().and_then(|line| line.first()).copied()
    }

    /// Position at `distance` along a single line and the index of the segment it lies on. `None` if the line is
    /// shorter than `distance`.
    fn locate(&self, line: &[Vertex], distance: f64) -> Option<(Vertex, usize)> {
        let first = *line.first()?;
        if distance <= 0.0 {
            return Some((first, 0));
        }

        let mut walked = 0.0;
        for (index, pair) in line.windows(2).enumerate() {
            let length = self.segment_length(&pair[0], &pair[1]);
            if length == 0.0 {
                continue;
            }

            if walked + length >= distance {
                let fraction = (distance - walked) / length;
                return Some((pair[0].lerp(&pair[1], fraction), index));
            }
            walked += length;
        }

        None
    }

    /// Same as [`Path::locate`], but positions past the end snap to the last vertex.
    fn locate_clamped(&self, line: &[Vertex], distance: f64) -> (Vertex, usize) {
        self.locate(line, distance).unwrap_or_else(|| {
            let last = line.last().copied().unwrap_or_default();
            (last, line.len().saturating_sub(2))
        })
    }

    fn point_at(&self, distance: f64) -> Option<Vertex> {
        let total = self.total_length();
        if distance > total && distance - total > total * f64::EPSILON * 16.0 {
            return None;
        }

        let mut offset = 0.0;
        for line in &self.lines {
            let length = self.line_length(line);
            if offset + length >= distance {
                return Some(self.locate_clamped(line, distance - offset).0);
            }
            offset += length;
        }

        self.lines.last().and_then(|line| line.last()).copied()
    }

    /// Vertices of a single line between the distances `from` and `to`, `from < to`.
    fn extract_line(&self, line: &[Vertex], from: f64, to: f64) -> Vec<Vertex> {
        let (start, start_index) = self.locate_clamped(line, from);
        let (end, end_index) = self.locate_clamped(line, to);

        let mut vertices = vec![start];
        if end_index > start_index {
            vertices.extend_from_slice(&line[start_index + 1..=end_index]);
        }
        vertices.push(end);
        vertices.dedup();
        vertices
    }

    /// Pieces of the member lines covering `[from, to]` of the total length.
    fn extract(&self, from: f64, to: f64) -> Vec<Vec<Vertex>> {
        let mut pieces = vec![];
        let mut offset = 0.0;
        for line in &self.lines {
            let length = self.line_length(line);
            let line_start = offset;
            let line_end = offset + length;
            offset = line_end;

            let piece = if from >= line_start && to <= line_end {
                // The whole interval is inside this line.
                Some((from - line_start, to - line_start))
            } else if from >= line_start && from < line_end {
                // Starts here and continues in the next lines.
                Some((from - line_start, length))
            } else if from < line_start && to >= line_end {
                Some((0.0, length))
            } else if from < line_start && to > line_start {
                // Ends inside this line.
                Some((0.0, to - line_start))
            } else {
                None
            };

            if let Some((local_from, local_to)) = piece {
                let vertices = self.extract_line(line, local_from, local_to);
                if vertices.len() > 1 {
                    pieces.push(vertices);
                }
            }
        }

        pieces
    }

    /// Distance along the path to the position closest to `point`.
    fn project(&self, point: &Vertex) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        let mut offset = 0.0;
        for line in &self.lines {
            for pair in line.windows(2) {
                let segment = crate::cartesian::Segment(&pair[0], &pair[1]);
                let closest = segment.closest_point(point);
                let separation = (closest.x - point.x).hypot(closest.y - point.y);
                if separation < best.0 {
                    best = (separation, offset + self.segment_length(&pair[0], &closest));
                }
                offset += self.segment_length(&pair[0], &pair[1]);
            }
        }

        best.1
    }
}

fn validate_distance(name: &'static str, distance: f64) -> ShapeResult<()> {
    ensure_finite(name, distance)?;
    if distance < 0.0 {
        return Err(ShapeError::invalid_argument(name, format!("must not be negative, but is {distance}")));
    }
    Ok(())
}

fn validate_percentage(name: &'static str, percentage: f64) -> ShapeResult<()> {
    ensure_positive(name, percentage)?;
    ensure_in_range(name, percentage, 0.0, 100.0)
}

/// Point at `distance` along the path. Positions past the end are searched on the shape scaled up about its
/// centroid, repeatedly while scaling still makes the path longer.
fn point_on_path<S>(
    shape: &S,
    path: impl Fn(&S) -> Path,
    distance: f64,
) -> ShapeResult<PointShape>
where
    S: BaseShape + Clone,
{
    validate_distance("distance", distance)?;
    shape.validate(ValidationMode::Simple).into_result()?;

    let mut current = path(shape);
    let mut scaled = shape.clone();
    let mut previous_total = f64::NEG_INFINITY;
    loop {
        let total = current.total_length();
        if total == 0.0 {
            let start = current
                .start()
                .ok_or_else(|| ShapeError::InvalidShape("line has no vertices".into()))?;
            return Ok(PointShape::from_vertex(start));
        }

        // Geodesic lengths are bounded, so repeated scaling eventually stops adding length.
        if !current.is_finite() || !total.is_finite() || total <= previous_total {
            log::debug!("Distance {distance} cannot be reached, the scaled line stopped growing at {previous_total}");
            return Err(ShapeError::invalid_argument(
                "distance",
                format!("{distance} cannot be reached on the line, even after scaling it up"),
            ));
        }

        if let Some(point) = current.point_at(distance) {
            return Ok(PointShape::from_vertex(point));
        }

        log::debug!(
            "Distance {distance} is beyond the line length {total}, searching on the line scaled up {BEYOND_END_SCALE} times"
        );
        previous_total = total;
        scaled.scale_by(BEYOND_END_SCALE);
        current = path(&scaled);
    }
}

fn line_on_path(path: &Path, start_distance: f64, length: f64) -> ShapeResult<Vec<Vec<Vertex>>> {
    validate_distance("start_distance", start_distance)?;
    ensure_positive("length", length)?;

    let total = path.total_length();
    if start_distance >= total {
        return Err(ShapeError::invalid_argument(
            "start_distance",
            format!("{start_distance} is not less than the line length {total}"),
        ));
    }

    let mut end = start_distance + length;
    if end > total {
        log::debug!("Sub-line end {end} is clamped to the line length {total}");
        end = total;
    }

    Ok(path.extract(start_distance, end))
}

fn line_between(path: &Path, start_point: &PointShape, end_point: &PointShape) -> ShapeResult<(Vec<Vec<Vertex>>, bool)> {
    let from = path.project(&start_point.to_vertex());
    let to = path.project(&end_point.to_vertex());
    if from == to {
        return Err(ShapeError::invalid_argument(
            "end_point",
            "projects onto the same position of the line as the start point",
        ));
    }

    let reversed = from > to;
    let (from, to) = if reversed { (to, from) } else { (from, to) };
    Ok((path.extract(from, to), reversed))
}

impl LineShape {
    fn path(&self, starting_point: StartingPoint, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> Path {
        Path::new(std::iter::once(self.vertices()), starting_point, shape_unit, distance_unit)
    }

    fn from_pieces(pieces: Vec<Vec<Vertex>>) -> ShapeResult<LineShape> {
        pieces
            .into_iter()
            .next()
            .map(LineShape::new)
            .ok_or_else(|| ShapeError::InvalidShape("sub-line is empty".into()))
    }

    /// Point at `distance` (in `distance_unit`) along the line from the `starting_point`.
    ///
    /// If the distance exceeds the line length, the line is scaled up 10 times about its centroid and the point
    /// is searched on the larger line instead.
    pub fn get_point_on_a_line(
        &self,
        starting_point: StartingPoint,
        distance: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<PointShape> {
        point_on_path(
            self,
            |line| line.path(starting_point, shape_unit, distance_unit),
            distance,
        )
    }

    /// Point at `percentage` (in `(0, 100]`) of the line length from the `starting_point`.
    pub fn get_point_on_a_line_by_percentage(
        &self,
        starting_point: StartingPoint,
        percentage: f64,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<PointShape> {
        validate_percentage("percentage", percentage)?;
        let length = self.length_in_meters(shape_unit)?;
        self.get_point_on_a_line(
            starting_point,
            length * percentage / 100.0,
            shape_unit,
            DistanceUnit::Meter,
        )
    }

    /// Part of the line of the given `length` starting `start_distance` from the `starting_point`. The part ends at
    /// the end of the line if it would be longer.
    pub fn get_line_on_a_line(
        &self,
        starting_point: StartingPoint,
        start_distance: f64,
        length: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<LineShape> {
        self.validate(ValidationMode::Simple).into_result()?;
        let path = self.path(starting_point, shape_unit, distance_unit);
        Self::from_pieces(line_on_path(&path, start_distance, length)?)
    }

    /// Same as [`LineShape::get_line_on_a_line`] with the start and the length given in percents of the line length.
    pub fn get_line_on_a_line_by_percentage(
        &self,
        starting_point: StartingPoint,
        start_percentage: f64,
        percentage: f64,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<LineShape> {
        ensure_in_range("start_percentage", start_percentage, 0.0, 100.0)?;
        validate_percentage("percentage", percentage)?;
        let length = self.length_in_meters(shape_unit)?;
        self.get_line_on_a_line(
            starting_point,
            length * start_percentage / 100.0,
            length * percentage / 100.0,
            shape_unit,
            DistanceUnit::Meter,
        )
    }

    /// Part of the line between the projections of the two points onto it, going from `start_point` to
    /// `end_point`.
    pub fn get_line_on_a_line_between(
        &self,
        start_point: &PointShape,
        end_point: &PointShape,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<LineShape> {
        self.validate(ValidationMode::Simple).into_result()?;
        let path = self.path(StartingPoint::FirstPoint, shape_unit, DistanceUnit::Meter);
        let (pieces, reversed) = line_between(&path, start_point, end_point)?;
        let mut line = Self::from_pieces(pieces)?;
        if reversed {
            line.vertices_mut().reverse();
        }
        Ok(line)
    }

    fn length_in_meters(&self, shape_unit: GeographyUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self.measured_length(shape_unit, DistanceUnit::Meter))
    }
}

impl MultilineShape {
    fn path(&self, starting_point: StartingPoint, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> Path {
        Path::new(
            self.lines().iter().map(LineShape::vertices),
            starting_point,
            shape_unit,
            distance_unit,
        )
    }

    fn from_pieces(pieces: Vec<Vec<Vertex>>) -> MultilineShape {
        MultilineShape::new(pieces.into_iter().map(LineShape::new).collect())
    }

    fn length_in_meters(&self, shape_unit: GeographyUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self.path(StartingPoint::FirstPoint, shape_unit, DistanceUnit::Meter).total_length())
    }

    /// Point at `distance` along the member lines from the `starting_point`. From the last point the lines are
    /// walked in reverse order.
    pub fn get_point_on_a_line(
        &self,
        starting_point: StartingPoint,
        distance: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<PointShape> {
        point_on_path(
            self,
            |multiline| multiline.path(starting_point, shape_unit, distance_unit),
            distance,
        )
    }

    /// Point at `percentage` (in `(0, 100]`) of the total length from the `starting_point`.
    pub fn get_point_on_a_line_by_percentage(
        &self,
        starting_point: StartingPoint,
        percentage: f64,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<PointShape> {
        validate_percentage("percentage", percentage)?;
        let length = self.length_in_meters(shape_unit)?;
        self.get_point_on_a_line(
            starting_point,
            length * percentage / 100.0,
            shape_unit,
            DistanceUnit::Meter,
        )
    }

    /// Parts of the member lines covering `length` from `start_distance`. A part is produced for every member line
    /// the interval touches.
    pub fn get_line_on_a_line(
        &self,
        starting_point: StartingPoint,
        start_distance: f64,
        length: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<MultilineShape> {
        self.validate(ValidationMode::Simple).into_result()?;
        let path = self.path(starting_point, shape_unit, distance_unit);
        Ok(Self::from_pieces(line_on_path(&path, start_distance, length)?))
    }

    /// Same as [`MultilineShape::get_line_on_a_line`] with the start and the length given in percents of the total
    /// length.
    pub fn get_line_on_a_line_by_percentage(
        &self,
        starting_point: StartingPoint,
        start_percentage: f64,
        percentage: f64,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<MultilineShape> {
        ensure_in_range("start_percentage", start_percentage, 0.0, 100.0)?;
        validate_percentage("percentage", percentage)?;
        let length = self.length_in_meters(shape_unit)?;
        self.get_line_on_a_line(
            starting_point,
            length * start_percentage / 100.0,
            length * percentage / 100.0,
            shape_unit,
            DistanceUnit::Meter,
        )
    }

    /// Parts of the member lines between the projections of the two points.
    pub fn get_line_on_a_line_between(
        &self,
        start_point: &PointShape,
        end_point: &PointShape,
        shape_unit: GeographyUnit,
    ) -> ShapeResult<MultilineShape> {
        self.validate(ValidationMode::Simple).into_result()?;
        let path = self.path(StartingPoint::FirstPoint, shape_unit, DistanceUnit::Meter);
        let (pieces, reversed) = line_between(&path, start_point, end_point)?;
        let mut multiline = Self::from_pieces(pieces);
        if reversed {
            crate::shape::LinearShape::reverse(&mut multiline);
        }
        Ok(multiline)
    }
}
