use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polyview::bench::{scan_convert, DVertex, Edge, FrameBuffer, Point, Renderer};
use polyview::math::vec4::Vec4;

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

const FILL: Vec4 = Vec4::rgb(255.0, 0.0, 0.0);

fn quad(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Edge> {
    let corners = [(x0, y0), (x1, y0 + 10), (x1, y1), (x0 + 10, y1)];
    let vertices: Vec<DVertex> = corners
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| DVertex::flat(Point::new(x, y), -1.0 - i as f64, FILL))
        .collect();
    Edge::polygon(&vertices)
}

fn empty_z_buffer() -> Vec<f64> {
    vec![f64::NEG_INFINITY; (BUFFER_WIDTH * BUFFER_HEIGHT) as usize]
}

fn benchmark_single_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_polygon");

    for (name, edges) in [
        ("small", quad(100, 100, 120, 120)),
        ("medium", quad(100, 100, 300, 300)),
        ("large", quad(50, 50, 750, 550)),
    ] {
        group.bench_with_input(BenchmarkId::new("scan_convert", name), &edges, |b, edges| {
            let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            b.iter(|| {
                let mut z_buffer = empty_z_buffer();
                scan_convert(&mut fb, &mut z_buffer, black_box(edges));
            });
        });
    }

    group.finish();
}

fn benchmark_many_polygons(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_polygons");

    // 20x20 grid of overlapping-depth quads
    let polygons: Vec<Vec<Edge>> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col * 40;
                let y = row * 30;
                quad(x, y, x + 35, y + 25)
            })
        })
        .collect();

    group.bench_function("scan_convert_400_quads", |b| {
        let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        b.iter(|| {
            let mut z_buffer = empty_z_buffer();
            for edges in &polygons {
                scan_convert(&mut fb, &mut z_buffer, black_box(edges));
            }
        });
    });

    group.finish();
}

fn benchmark_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("lines");
    let renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);

    for thickness in [0, 1, 3] {
        group.bench_with_input(
            BenchmarkId::new("draw_line_fan", thickness),
            &thickness,
            |b, &thickness| {
                let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
                let center = Point::new(400, 300);
                b.iter(|| {
                    for i in 0..64 {
                        let angle = i as f64 * std::f64::consts::TAU / 64.0;
                        let end = Point::new(
                            400 + (angle.cos() * 280.0) as i32,
                            300 + (angle.sin() * 280.0) as i32,
                        );
                        renderer.draw_line(&mut fb, center, black_box(end), FILL, thickness);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_polygon,
    benchmark_many_polygons,
    benchmark_lines
);
criterion_main!(benches);
