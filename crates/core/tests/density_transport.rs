//! Integration tests for density injection, decay and transport

use fluid_sim_core::core_types::Vec2;
use fluid_sim_core::solver::{FieldSolver, FluidSolver, SerialBackend};
use fluid_sim_core::{Cell, FluidConfig, ForcingFrame, Rgba};

fn config(resolution: usize) -> FluidConfig {
    FluidConfig {
        simulation_resolution: resolution,
        render_resolution: resolution,
        solver_iterations: 20,
        velocity_effect_radius: 4.0,
        density_effect_radius: 6.0,
        density_falloff: 5.0,
        ..FluidConfig::default()
    }
}

fn paint(position: Vec2) -> ForcingFrame {
    ForcingFrame {
        velocity_pressed: 0.0,
        density_pressed: 1.0,
        current: position,
        previous: position,
        color: Rgba::RED,
    }
}

fn total(solver: &dyn FieldSolver) -> f32 {
    solver.read_density().iter().map(Cell::component_sum).sum()
}

#[test]
fn test_still_density_decays_monotonically() {
    let mut solver = FluidSolver::with_backend(config(24), SerialBackend).expect("solver");
    for _ in 0..10 {
        solver.step(&paint(Vec2::new(12.0, 12.0)));
    }
    let painted = total(&solver);
    assert!(painted > 0.0);

    let mut previous = painted;
    for frame in 0..50 {
        solver.step(&ForcingFrame::idle());
        let current = total(&solver);
        assert!(
            current <= previous,
            "frame {frame}: density grew from {previous} to {current}"
        );
        previous = current;
    }
    assert!(previous < painted);

    let density = solver.read_density();
    assert!(density.iter().all(|c| c.min_component() >= 0.0));
    // Only the red and alpha channels were painted
    assert!(density.iter().all(|c| c.g == 0.0 && c.b == 0.0));
}

#[test]
fn test_stroke_keeps_density_finite_and_non_negative() {
    let mut solver = FluidSolver::with_backend(config(32), SerialBackend).expect("solver");
    let mut previous = Vec2::new(24.0, 16.0);
    for i in 1..=30 {
        let angle = i as f32 * 0.2;
        let current = Vec2::new(16.0 + 8.0 * angle.cos(), 16.0 + 8.0 * angle.sin());
        solver.step(&ForcingFrame {
            velocity_pressed: 1.0,
            density_pressed: 1.0,
            current,
            previous,
            color: Rgba::CYAN,
        });
        previous = current;
        assert!(solver.scratch_is_clear(), "scratch dirty after frame {i}");
    }

    let density = solver.read_density();
    assert!(density.iter().all(|c| c.is_finite()));
    assert!(density.iter().all(|c| c.min_component() >= 0.0));
    assert!(solver.read_velocity().iter().all(|f| f.is_finite()));
    assert!(total(&solver) > 0.0);
}

#[test]
fn test_density_borders_are_cleared() {
    let mut solver = FluidSolver::with_backend(config(16), SerialBackend).expect("solver");
    // Splat touching the border
    for _ in 0..3 {
        solver.step(&paint(Vec2::new(1.0, 1.0)));
    }
    let extent = solver.extent();
    let density = solver.read_density();
    for y in 0..extent.height {
        for x in 0..extent.width {
            if extent.is_border(x, y) {
                assert_eq!(density[extent.index(x, y)], Rgba::default());
            }
        }
    }
    assert!(density[extent.index(2, 2)].r > 0.0);
}
