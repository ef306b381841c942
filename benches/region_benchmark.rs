use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gerber_generator::board::{Board, Element, PadShape, ViaElement};
use gerber_generator::testing::{line, rectangle_region, signals, two_layer_layers, GND, TOP, VCC};
use gerber_generator::{Position, RegionSynthesizer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A 100x100mm top layer pour with random vias and traces of both signals.
fn board_with_obstacles(count: usize) -> Board {
    let mut rng = StdRng::seed_from_u64(42);
    let mut elements = vec![Element::Region(rectangle_region(
        TOP,
        (0.0, 0.0),
        (100.0, 100.0),
        Some(GND),
    ))];

    for index in 0..count {
        let signal = match index % 2 {
            0 => GND,
            _ => VCC,
        };
        let x = rng.random_range(2.0..98.0);
        let y = rng.random_range(2.0..98.0);
        elements.push(Element::Via(ViaElement {
            center: Position::new(x, y),
            drill: 0.3,
            diameter: 0.6,
            shape: PadShape::Round,
            signal: Some(signal),
        }));
        let length = rng.random_range(1.0..10.0);
        elements.push(line(TOP, (x, y), ((x + length).min(98.0), y), 0.25, Some(signal)));
    }

    Board {
        layers: two_layer_layers(),
        signals: signals(),
        elements,
        parts: vec![],
        connections: vec![],
    }
}

fn benchmark_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Region synthesis");
    group.sample_size(10);

    for count in [10, 50, 200] {
        let board = board_with_obstacles(count);
        let Element::Region(region) = &board.elements[0] else {
            unreachable!()
        };
        let synthesizer = RegionSynthesizer::new(&board, 5.0);

        group.bench_with_input(BenchmarkId::new("synthesize", count), &count, |b, _| {
            b.iter(|| black_box(synthesizer.synthesize(black_box(region), None, 0.2)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_synthesis);
criterion_main!(benches);
