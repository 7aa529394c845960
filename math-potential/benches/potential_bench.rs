use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use math_audio_potential::mesh::generate_icosphere_mesh;
use math_audio_potential::{
    CoefficientMode, KernelVariant, PotentialOperator, ShapeFamily, triangle_rule,
};
use ndarray::Array2;

fn shell_points(n: usize, radius: f64) -> Array2<f64> {
    // Fibonacci points on a sphere
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    Array2::from_shape_fn((n, 3), |(i, j)| {
        let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
        let rho = (1.0 - z * z).sqrt();
        let phi = golden * i as f64;
        radius * [rho * phi.cos(), rho * phi.sin(), z][j]
    })
}

fn bench_sphere_potential(c: &mut Criterion) {
    let mesh = generate_icosphere_mesh(1.0, 3);
    let n = mesh.num_elements();
    let points = shell_points(256, 2.0);
    let coefficients = vec![1.0; n];

    let mut group = c.benchmark_group("sphere_potential");
    for group_size in [8, 16, 64] {
        let operator = PotentialOperator::new(
            mesh.clone(),
            &points,
            ShapeFamily::P0,
            KernelVariant::HelmholtzSingleLayer {
                wavenumber_re: 2.0,
                wavenumber_im: 0.0,
            },
            triangle_rule(3).unwrap(),
            CoefficientMode::RealOnly,
        )
        .unwrap()
        .with_group_size(group_size);

        group.bench_with_input(
            BenchmarkId::new("helmholtz_p0", group_size),
            &operator,
            |b, operator| b.iter(|| operator.evaluate(black_box(&coefficients)).unwrap()),
        );
    }
    group.finish();
}

fn bench_quadrature_order(c: &mut Criterion) {
    let mesh = generate_icosphere_mesh(1.0, 2);
    let n = mesh.num_elements();
    let points = shell_points(64, 1.5);
    let coefficients = vec![1.0; 3 * n];

    let mut group = c.benchmark_group("quadrature_order");
    for order in 1..=4 {
        let operator = PotentialOperator::new(
            mesh.clone(),
            &points,
            ShapeFamily::P1,
            KernelVariant::LaplaceSingleLayer,
            triangle_rule(order).unwrap(),
            CoefficientMode::RealOnly,
        )
        .unwrap();

        group.bench_with_input(
            BenchmarkId::new("laplace_p1", order),
            &operator,
            |b, operator| b.iter(|| operator.evaluate(black_box(&coefficients)).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_sphere_potential, bench_quadrature_order);
criterion_main!(benches);
