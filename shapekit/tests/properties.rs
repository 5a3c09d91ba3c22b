use approx::{assert_abs_diff_eq, assert_relative_eq};
use shapekit::{
    AreaShape, AreaUnit, BaseShape, ByteOrder, DistanceUnit, EllipseShape, GeographyUnit, LineShape, MultilineShape,
    MultipointShape, MultipolygonShape, PointShape, PolygonShape, RectangleShape, RingShape, Shape, ShapeRef,
    ShapeType, StartingPoint, Vertex,
};

const M: GeographyUnit = GeographyUnit::Meter;

fn v(x: f64, y: f64) -> Vertex {
    Vertex::new(x, y)
}

fn ring(coords: &[(f64, f64)]) -> RingShape {
    RingShape::new(coords.iter().map(|c| Vertex::from(*c)).collect())
}

fn line(coords: &[(f64, f64)]) -> LineShape {
    LineShape::new(coords.iter().map(|c| Vertex::from(*c)).collect())
}

fn unit_square(x: f64, y: f64) -> PolygonShape {
    PolygonShape::new(
        ring(&[(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]),
        vec![],
    )
}

/// One shape of every variant, none of them touching the others.
fn separated_shapes() -> Vec<Shape> {
    vec![
        PointShape::new(20.0, 20.0).into(),
        MultipointShape::new(vec![PointShape::new(30.0, 0.0), PointShape::new(32.0, 2.0)]).into(),
        line(&[(0.0, -10.0), (10.0, -10.0)]).into(),
        MultilineShape::new(vec![
            line(&[(-20.0, 0.0), (-20.0, 5.0)]),
            line(&[(-25.0, 0.0), (-25.0, 5.0), (-27.0, 7.0)]),
        ])
        .into(),
        ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]).into(),
        PolygonShape::new(
            ring(&[(0.0, 25.0), (10.0, 25.0), (10.0, 35.0), (0.0, 35.0)]),
            vec![ring(&[(2.0, 27.0), (8.0, 27.0), (8.0, 33.0), (2.0, 33.0)])],
        )
        .into(),
        MultipolygonShape::new(vec![unit_square(40.0, 40.0), unit_square(43.0, 40.0)]).into(),
        RectangleShape::new(v(50.0, 10.0), v(60.0, 0.0)).unwrap().into(),
        EllipseShape::new(v(-40.0, -40.0), 6.0, 4.0).unwrap().into(),
    ]
}

/// Shapes that intersect some of the separated ones.
fn overlapping_shapes() -> Vec<Shape> {
    vec![
        PointShape::new(2.0, 2.0).into(),
        PointShape::new(-40.0, -40.0).into(),
        line(&[(-1.0, 2.0), (5.0, 2.0)]).into(),
        line(&[(5.0, 30.0), (15.0, 30.0)]).into(),
        RectangleShape::new(v(55.0, 5.0), v(65.0, -5.0)).unwrap().into(),
        EllipseShape::circle(v(40.0, 40.0), 0.5).unwrap().into(),
    ]
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn vertices(shape: &Shape) -> Vec<Vertex> {
    ShapeRef::from(shape).vertices()
}

#[test]
fn wkt_round_trip_keeps_vertices() {
    for shape in separated_shapes() {
        let wkt = shape.to_wkt();
        let parsed = Shape::from_wkt(&wkt).unwrap();
        let rewritten = parsed.to_wkt();
        let reparsed = Shape::from_wkt(&rewritten).unwrap();

        assert_eq!(wkt, rewritten, "{}", shape.shape_type());
        assert_eq!(vertices(&parsed), vertices(&reparsed), "{}", shape.shape_type());
    }
}

#[test]
fn wkb_round_trip_keeps_vertices() {
    init_logger();
    for byte_order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        for shape in separated_shapes() {
            let wkb = shape.to_wkb(byte_order);
            let decoded = Shape::from_wkb(&wkb).unwrap().unwrap();
            let rewritten = decoded.to_wkb(byte_order);
            let redecoded = Shape::from_wkb(&rewritten).unwrap().unwrap();

            assert_eq!(wkb, rewritten, "{} {byte_order:?}", shape.shape_type());
            assert_eq!(vertices(&decoded), vertices(&redecoded));
        }
    }
}

#[test]
fn distance_is_symmetric() {
    let shapes = separated_shapes();
    for a in &shapes {
        for b in &shapes {
            let ab = a.distance_to(b, M, DistanceUnit::Meter).unwrap();
            let ba = b.distance_to(a, M, DistanceUnit::Meter).unwrap();
            assert_relative_eq!(ab, ba, epsilon = 1e-9, max_relative = 1e-9);
        }
    }
}

#[test]
fn separated_shapes_have_positive_distance() {
    let shapes = separated_shapes();
    for (i, a) in shapes.iter().enumerate() {
        for b in &shapes[i + 1..] {
            assert!(!a.intersects(b).unwrap(), "{} and {}", a.shape_type(), b.shape_type());
            assert!(a.distance_to(b, M, DistanceUnit::Meter).unwrap() > 0.0);
            assert!(a.closest_point_to(b, M).unwrap().is_some());
        }
    }
}

#[test]
fn intersecting_shapes_have_zero_distance() {
    init_logger();
    let mut shapes = separated_shapes();
    shapes.extend(overlapping_shapes());

    let mut intersecting_pairs = 0;
    for a in &shapes {
        for b in &shapes {
            if a.intersects(b).unwrap() {
                intersecting_pairs += 1;
                assert_eq!(a.distance_to(b, M, DistanceUnit::Meter).unwrap(), 0.0);
                assert!(a.closest_point_to(b, M).unwrap().is_none());
                assert!(a.shortest_line_to(b, M).unwrap().is_none());
            }
        }
    }

    // Every shape intersects itself, plus the overlapping pairs in both orders.
    assert!(intersecting_pairs > shapes.len());
}

#[test]
fn scale_down_does_not_invert_scale_up() {
    let mut square = ring(&[(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]);
    square.scale_up(10.0).unwrap();
    square.scale_down(10.0).unwrap();

    assert_abs_diff_eq!(square.vertices()[2], v(0.99, 0.99), epsilon = 1e-12);
    assert_relative_eq!(
        square.area(M, AreaUnit::SquareMeters).unwrap(),
        4.0 * 0.99 * 0.99,
        epsilon = 1e-12
    );
}

#[test]
fn degenerate_rectangle_is_inflated() {
    let rectangle = RectangleShape::new(v(0.0, 0.0), v(0.0, 0.0)).unwrap();
    assert!(rectangle.width() > 0.0);
    assert!(rectangle.height() > 0.0);
    assert_abs_diff_eq!(rectangle.center().to_vertex(), v(0.0, 0.0));
}

#[test]
fn ring_is_closed_once() {
    let open = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
    assert_eq!(open.vertices().len(), 4);
    assert_eq!(open.vertices().first(), open.vertices().last());

    let closed = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
    assert_eq!(closed.vertices().len(), 4);
}

#[test]
fn point_at_half_of_line() {
    let Shape::Line(line) = Shape::from_wkt("LINESTRING(0 0, 10 0)").unwrap() else {
        panic!("expected a line");
    };
    let point = line
        .get_point_on_a_line_by_percentage(StartingPoint::FirstPoint, 50.0, M)
        .unwrap();
    assert_eq!(point.to_wkt(), "POINT(5 0)");
}

#[test]
fn polygon_area() {
    let Shape::Polygon(polygon) = Shape::from_wkt("POLYGON((0 0,4 0,4 4,0 4,0 0))").unwrap() else {
        panic!("expected a polygon");
    };
    assert_relative_eq!(polygon.area(M, AreaUnit::SquareMeters).unwrap(), 16.0);
}

#[test]
fn circle_containment() {
    let circle = EllipseShape::new(v(0.0, 0.0), 4.0, 4.0).unwrap();
    assert!(circle.contains_point(&v(0.0, 0.0)));
    assert!(!circle.contains_point(&v(3.0, 0.0)));
    assert_abs_diff_eq!(circle.nearest_boundary_point(&v(3.0, 0.0)), v(2.0, 0.0), epsilon = 1e-9);
}

#[test]
fn rectangle_contains_point() {
    let rectangle = RectangleShape::new(v(0.0, 10.0), v(10.0, 0.0)).unwrap();
    assert_eq!(rectangle.width(), 10.0);
    assert_eq!(rectangle.height(), 10.0);
    assert!(rectangle.contains(&PointShape::new(5.0, 5.0)).unwrap());
}

#[test]
fn union_of_overlapping_squares() {
    let union = unit_square(0.0, 0.0).union(&unit_square(0.5, 0.0)).unwrap();
    assert_eq!(union.shape_type(), ShapeType::Multipolygon);
    assert_eq!(union.polygons().len(), 1);
    assert!(union.polygons()[0].inner_rings().is_empty());

    // Four corners plus the closing vertex, the seam vertices on the long edges are dropped.
    let outer = union.polygons()[0].outer_ring().vertices();
    assert_eq!(outer.len(), 5);
    assert_eq!(outer.first(), outer.last());
    for corner in [v(0.0, 0.0), v(1.5, 0.0), v(1.5, 1.0), v(0.0, 1.0)] {
        assert!(outer.contains(&corner), "{corner:?}");
    }
    assert_relative_eq!(union.area(M, AreaUnit::SquareMeters).unwrap(), 1.5, epsilon = 1e-9);
}

#[test]
fn point_binary_round_trip() {
    let point = PointShape::new(1.5, -2.25);
    for byte_order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let wkb = point.to_wkb(byte_order);
        let Some(Shape::Point(decoded)) = Shape::from_wkb(&wkb).unwrap() else {
            panic!("expected a point");
        };
        assert_eq!((decoded.x(), decoded.y()), (1.5, -2.25));
    }
}
