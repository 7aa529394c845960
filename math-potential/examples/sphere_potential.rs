//! Sphere potential - compare the discrete single layer with the closed form
//!
//! A uniform density on a sphere of radius a produces a²/r (Laplace) and
//! (a sin(ka)/k) e^{ikr}/r (Helmholtz) outside it.
//!
//! Usage: `RUST_LOG=debug cargo run --example sphere_potential [config.json]`

use math_audio_potential::mesh::generate_icosphere_mesh;
use math_audio_potential::{KernelVariant, PotentialConfig, Result, evaluate_with_config};
use ndarray::Array2;
use num_complex::Complex64;

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => PotentialConfig::from_json_file(path)?,
        None => PotentialConfig {
            kernel: KernelVariant::HelmholtzSingleLayer {
                wavenumber_re: 2.0,
                wavenumber_im: 0.0,
            },
            ..Default::default()
        },
    };
    let radius = 1.0;

    println!("=== Sphere single-layer potential ===\n");
    println!("{}", serde_json::to_string_pretty(&config)?);

    let distances = [1.5, 2.0, 3.0, 5.0, 10.0];
    let points = Array2::from_shape_fn((distances.len(), 3), |(i, j)| {
        if j == 2 { distances[i] } else { 0.0 }
    });

    println!("\nlevel | faces | r     | |φ| discrete | |φ| exact | error");
    println!("------|-------|-------|--------------|-----------|-----------");
    for level in 1..=4 {
        let mesh = generate_icosphere_mesh(radius, level);
        let n = mesh.num_elements();
        let coefficients = vec![1.0; config.coefficient_len(n)];
        let potential = evaluate_with_config(&config, &mesh, &points, &coefficients)?;

        for (&r, phi) in distances.iter().zip(potential.iter()) {
            let exact = exact_potential(&config.kernel, radius, r);
            let error = if exact.norm() > 0.0 {
                (phi - exact).norm() / exact.norm()
            } else {
                phi.norm()
            };
            println!(
                "{:>5} | {:>5} | {:>5.1} | {:>12.6} | {:>9.6} | {:.2e}",
                level,
                n,
                r,
                phi.norm(),
                exact.norm(),
                error
            );
        }
    }

    Ok(())
}

/// Potential of a unit density on a sphere of radius `a` at distance `r`
fn exact_potential(kernel: &KernelVariant, a: f64, r: f64) -> Complex64 {
    match *kernel {
        KernelVariant::HelmholtzSingleLayer {
            wavenumber_re,
            wavenumber_im,
        } => {
            let k = Complex64::new(wavenumber_re, wavenumber_im);
            if k.norm() == 0.0 {
                return Complex64::new(a * a / r, 0.0);
            }
            (k * a).sin() * a / k * (Complex64::i() * k * r).exp() / r
        }
        // The double layer of a constant density vanishes outside
        KernelVariant::LaplaceDoubleLayer => Complex64::new(0.0, 0.0),
        KernelVariant::LaplaceSingleLayer => Complex64::new(a * a / r, 0.0),
    }
}
