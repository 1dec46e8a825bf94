use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hyrtti::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Hierarchy)]
#[repr(u8)]
enum ShapeId {
    #[hierarchy(ty = dyn Shape)]
    Shape,
    #[hierarchy(ty = dyn Polygon, parent = Shape)]
    Polygon,
    #[hierarchy(ty = Triangle, parent = Polygon, concrete)]
    Triangle,
    #[hierarchy(ty = Square, parent = Polygon, concrete)]
    Square,
    #[hierarchy(ty = Hexagon, parent = Polygon, concrete)]
    Hexagon,
    #[hierarchy(ty = dyn Round, parent = Shape)]
    Round,
    #[hierarchy(ty = Circle, parent = Round, concrete)]
    Circle,
    #[hierarchy(ty = Ellipse, parent = Round, concrete)]
    Ellipse,
}

trait Shape: Tagged<Id = ShapeId> + Send + Sync {}

trait Polygon: Shape {
    fn side(&self) -> f64;
}

trait Round: Shape {
    fn radius(&self) -> f64;
}

struct Triangle(f64);
struct Square(f64);
struct Hexagon(f64);
struct Circle(f64);
struct Ellipse(f64, f64);

impl Shape for Triangle {}
impl Shape for Square {}
impl Shape for Hexagon {}
impl Shape for Circle {}
impl Shape for Ellipse {}

impl Polygon for Triangle {
    fn side(&self) -> f64 {
        self.0
    }
}

impl Polygon for Square {
    fn side(&self) -> f64 {
        self.0
    }
}

impl Polygon for Hexagon {
    fn side(&self) -> f64 {
        self.0
    }
}

impl Round for Circle {
    fn radius(&self) -> f64 {
        self.0
    }
}

impl Round for Ellipse {
    fn radius(&self) -> f64 {
        (self.0 * self.1).sqrt()
    }
}

fn random_shapes(count: usize) -> Vec<Box<dyn Shape>> {
    // Seeded for reproducible runs
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);

    (0..count)
        .map(|_| {
            let size = rng.random_range(1.0..10.0);
            let shape: Box<dyn Shape> = match rng.random_range(0..5) {
                0 => Box::new(Triangle(size)),
                1 => Box::new(Square(size)),
                2 => Box::new(Hexagon(size)),
                3 => Box::new(Circle(size)),
                _ => Box::new(Ellipse(size, size / 2.0)),
            };
            shape
        })
        .collect()
}

fn area_by_match(shape: &dyn Shape) -> f64 {
    match shape.rtti() {
        ShapeId::Triangle => shape.dyncast::<Triangle>().map_or(0.0, |t| t.0 * t.0 * 0.433),
        ShapeId::Square => shape.dyncast::<Square>().map_or(0.0, |s| s.0 * s.0),
        ShapeId::Hexagon => shape.dyncast::<Hexagon>().map_or(0.0, |h| h.0 * h.0 * 2.598),
        ShapeId::Circle | ShapeId::Ellipse => shape
            .dyncast::<dyn Round>()
            .map_or(0.0, |r| std::f64::consts::PI * r.radius() * r.radius()),
        ShapeId::Shape | ShapeId::Polygon | ShapeId::Round => 0.0,
    }
}

fn area_by_dyncast_chain(shape: &dyn Shape) -> f64 {
    if let Some(t) = shape.dyncast::<Triangle>() {
        t.0 * t.0 * 0.433
    } else if let Some(s) = shape.dyncast::<Square>() {
        s.0 * s.0
    } else if let Some(h) = shape.dyncast::<Hexagon>() {
        h.0 * h.0 * 2.598
    } else if let Some(r) = shape.dyncast::<dyn Round>() {
        std::f64::consts::PI * r.radius() * r.radius()
    } else {
        0.0
    }
}

fn bench_single_dispatch(c: &mut Criterion) {
    let shapes = random_shapes(1024);
    let area = Overload1::<dyn Shape, f64>::new()
        .on::<Triangle>(|t| t.0 * t.0 * 0.433)
        .on::<Square>(|s| s.0 * s.0)
        .on::<Hexagon>(|h| h.0 * h.0 * 2.598)
        .on::<dyn Round>(|r| std::f64::consts::PI * r.radius() * r.radius())
        .build()
        .unwrap();

    c.bench_function("single_dispatch_table", |b| {
        b.iter(|| {
            let total: f64 = shapes.iter().map(|shape| area.visit(&**shape)).sum();
            black_box(total);
        })
    });

    c.bench_function("single_dispatch_match", |b| {
        b.iter(|| {
            let total: f64 = shapes.iter().map(|shape| area_by_match(&**shape)).sum();
            black_box(total);
        })
    });

    c.bench_function("single_dispatch_dyncast_chain", |b| {
        b.iter(|| {
            let total: f64 = shapes
                .iter()
                .map(|shape| area_by_dyncast_chain(&**shape))
                .sum();
            black_box(total);
        })
    });
}

fn bench_double_dispatch(c: &mut Criterion) {
    let shapes = random_shapes(256);
    let overlap = Overload2::<dyn Shape, dyn Shape, f64>::new()
        .on::<dyn Shape, dyn Shape>(|_, _| 0.0)
        .on::<dyn Polygon, dyn Polygon>(|a, b| a.side().min(b.side()))
        .on::<dyn Round, dyn Round>(|a, b| a.radius().min(b.radius()))
        .on::<Square, Circle>(|s, c| s.0.min(2.0 * c.0))
        .build()
        .unwrap();

    c.bench_function("double_dispatch_table", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for pair in shapes.windows(2) {
                total += overlap.visit(&*pair[0], &*pair[1]);
            }
            black_box(total);
        })
    });

    c.bench_function("double_dispatch_dyncast_chain", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for pair in shapes.windows(2) {
                let (x, y) = (&*pair[0], &*pair[1]);
                total += if let (Some(s), Some(c)) = (x.dyncast::<Square>(), y.dyncast::<Circle>()) {
                    s.0.min(2.0 * c.0)
                } else if let (Some(a), Some(b)) = (x.dyncast::<dyn Polygon>(), y.dyncast::<dyn Polygon>()) {
                    a.side().min(b.side())
                } else if let (Some(a), Some(b)) = (x.dyncast::<dyn Round>(), y.dyncast::<dyn Round>()) {
                    a.radius().min(b.radius())
                } else {
                    0.0
                };
            }
            black_box(total);
        })
    });
}

fn bench_isa(c: &mut Criterion) {
    let shapes = random_shapes(1024);

    // Warm the ancestor tables outside of the measured loop
    black_box(ShapeId::hierarchy().ancestor_table(ShapeId::Polygon));

    c.bench_function("isa_abstract", |b| {
        b.iter(|| {
            black_box(shapes.iter().filter(|shape| shape.isa::<dyn Polygon>()).count());
        })
    });

    c.bench_function("isa_concrete", |b| {
        b.iter(|| {
            black_box(shapes.iter().filter(|shape| shape.isa::<Circle>()).count());
        })
    });
}

criterion_group!(
    benches,
    bench_single_dispatch,
    bench_double_dispatch,
    bench_isa,
);
criterion_main!(benches);
