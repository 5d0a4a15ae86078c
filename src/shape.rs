use crate::Point;

/// Anything that can project a point onto itself.
pub trait Boundary {
    fn center(&self) -> Point;

    /// The closest point of the shape (boundary or interior) to `target`.
    /// Points inside or on the shape are returned unchanged, so
    /// `nearest_point(p) == p` doubles as the containment test.
    fn nearest_point(&self, target: Point) -> Point;

    fn contains(&self, point: Point) -> bool {
        self.nearest_point(point) == point
    }

    /// Project our center onto `other`, then project that back onto ourselves.
    ///
    /// Either projection landing on the point it started from means overlap. Otherwise the gap
    /// between the two projections must not exceed `offset`.
    fn is_overlap<B>(&self, other: &B, offset: f32) -> bool
    where
        B: Boundary + ?Sized,
    {
        let center = self.center();
        let nearest_other = other.nearest_point(center);
        let nearest_self = self.nearest_point(nearest_other);
        if nearest_other == center {
            return true;
        }
        if nearest_self == nearest_other {
            return true;
        }
        nearest_self.dist(&nearest_other) <= offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f32,
}

impl Circle {
    pub fn new(center: Point, radius: f32) -> Self {
        assert!(radius >= 0.0);
        Self { center, radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Boundary for Circle {
    fn center(&self) -> Point {
        self.center
    }

    fn nearest_point(&self, target: Point) -> Point {
        if self.center.dist(&target) <= self.radius {
            return target;
        }
        // a zero direction only happens for target == center, which the branch above covers
        match (target - self.center).normalize() {
            Some(dir) => self.center + dir * self.radius,
            None => target,
        }
    }
}

/// Axis aligned, described by its half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    center: Point,
    half_width: f32,
    half_height: f32,
}

impl Rectangle {
    pub fn new(center: Point, half_width: f32, half_height: f32) -> Self {
        assert!(half_width >= 0.0);
        assert!(half_height >= 0.0);
        Self {
            center,
            half_width,
            half_height,
        }
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    pub fn min(&self) -> Point {
        Point::new(
            self.center[0] - self.half_width,
            self.center[1] - self.half_height,
        )
    }

    pub fn max(&self) -> Point {
        Point::new(
            self.center[0] + self.half_width,
            self.center[1] + self.half_height,
        )
    }
}

impl Boundary for Rectangle {
    fn center(&self) -> Point {
        self.center
    }

    fn nearest_point(&self, target: Point) -> Point {
        let [minx, miny] = *self.min();
        let [maxx, maxy] = *self.max();
        // clamping each axis covers the inside, edge and corner cases at once
        Point::new(
            target[0].max(minx).min(maxx),
            target[1].max(miny).min(maxy),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl Shape {
    pub fn circle(center: Point, radius: f32) -> Self {
        Shape::Circle(Circle::new(center, radius))
    }

    pub fn rectangle(center: Point, half_width: f32, half_height: f32) -> Self {
        Shape::Rectangle(Rectangle::new(center, half_width, half_height))
    }

    /// Largest distance from the center to any point of the shape.
    pub fn extent(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Rectangle(r) => r.half_width.hypot(r.half_height),
        }
    }
}

impl Boundary for Shape {
    fn center(&self) -> Point {
        match self {
            Shape::Circle(c) => c.center,
            Shape::Rectangle(r) => r.center,
        }
    }

    fn nearest_point(&self, target: Point) -> Point {
        match self {
            Shape::Circle(c) => c.nearest_point(target),
            Shape::Rectangle(r) => r.nearest_point(target),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rectangle(r)
    }
}
