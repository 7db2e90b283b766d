//! # MGMC-RS
//!
//! Demonstration run: a two-group fissile sphere inside a scattering
//! reflector, with collision, track-length, current and fluence tallies.
//!
//! Tables go to stdout; the same reports are written as JSON to
//! `mgmc-tallies.json`. Set `RUST_LOG=mgmc_rs=debug` for per-history logging.

use std::f64::consts::PI;
use std::io::Write;
use std::sync::Arc;

use mgmc_rs::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const REPORT_PATH: &str = "mgmc-tallies.json";

fn build_problem(num_histories: u64) -> Result<Problem> {
    let mut problem = Problem::new();
    let g = &mut problem.geometry;

    let core_surface = g.add_surface(Surface::sphere("core", Vec3::zero(), 2.0)?);
    let reflector_surface = g.add_surface(Surface::sphere("reflector", Vec3::zero(), 5.0)?);

    let fuel = Arc::new(Nuclide::new(
        "fuel",
        2,
        vec![
            Reaction::capture(vec![0.05, 0.20])?,
            Reaction::scatter(vec![vec![0.40, 0.25], vec![0.0, 0.60]])?,
            Reaction::fission(vec![0.05, 0.30], vec![2.6, 2.4], vec![1.0, 0.0])?,
        ],
    )?);
    let water = Arc::new(Nuclide::new(
        "moderator",
        2,
        vec![
            Reaction::capture(vec![0.002, 0.02])?,
            Reaction::scatter(vec![vec![0.50, 0.45], vec![0.0, 1.10]])?,
        ],
    )?);

    let core_mat = g.add_material(Material::new(
        "fuel mix",
        1.0,
        vec![(Arc::clone(&fuel), 0.6), (Arc::clone(&water), 0.4)],
    )?);
    let refl_mat = g.add_material(Material::new("reflector", 1.0, vec![(water, 1.0)])?);

    let core = g.add_cell(Cell::new(
        "core",
        Some(core_mat),
        vec![(core_surface, Sense::Negative)],
    ))?;
    let reflector = g.add_cell(Cell::new(
        "reflector",
        Some(refl_mat),
        vec![(core_surface, Sense::Positive), (reflector_surface, Sense::Negative)],
    ))?;
    g.set_source(Source::point("center", Vec3::zero(), 1)?);

    // one tetrahedron inside the core, tallied per unit volume
    let tet = MeshElement::new([
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ])?;
    let tet_volume = tet.volume();
    g.set_mesh(Mesh::new(vec![tet]));

    let core_volume = 4.0 / 3.0 * PI * 2.0_f64.powi(3);
    let reflector_volume = 4.0 / 3.0 * PI * 5.0_f64.powi(3) - core_volume;

    let mut flux = EstimatorCollection::new(
        "core collision flux",
        EstimatorType::Collision,
        vec![AttributeBinning::group_all(2)?],
        num_histories,
    )?;
    flux.set_geometric_divisor(core_volume)?;
    problem.add_tally(flux, AttachTarget::Cell(core))?;

    let mut track = EstimatorCollection::new(
        "reflector track-length flux",
        EstimatorType::TrackLength,
        vec![
            AttributeBinning::group_all(2)?,
            AttributeBinning::collision_order_range(0, 4)?,
        ],
        num_histories,
    )?;
    track.set_geometric_divisor(reflector_volume)?;
    problem.add_tally(track, AttachTarget::Cell(reflector))?;

    problem.add_tally(
        EstimatorCollection::new(
            "leakage current",
            EstimatorType::SurfaceCurrent,
            vec![AttributeBinning::group_all(2)?],
            num_histories,
        )?,
        AttachTarget::Surface(reflector_surface),
    )?;

    let mut fluence = EstimatorCollection::new(
        "core surface fluence",
        EstimatorType::SurfaceFluence,
        vec![
            AttributeBinning::group_all(2)?,
            AttributeBinning::angle(Vec3::unit_z(), -1.0, 1.0, 4)?,
        ],
        num_histories,
    )?;
    fluence.set_geometric_divisor(4.0 * PI * 2.0_f64.powi(2))?;
    problem.add_tally(fluence, AttachTarget::Surface(core_surface))?;

    let mut local = EstimatorCollection::new(
        "tetrahedron collision flux",
        EstimatorType::Collision,
        vec![AttributeBinning::group_all(2)?],
        num_histories,
    )?;
    local.set_geometric_divisor(tet_volume)?;
    problem.add_tally(local, AttachTarget::MeshElement(MeshElementId(0)))?;

    Ok(problem)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("{}", mgmc_rs::info());
    println!();

    let settings = RunSettings::default();
    println!("Settings: {}", settings.to_json()?);
    let problem = build_problem(settings.num_histories)?;

    let start = std::time::Instant::now();
    let mut transport = Transport::new(problem, settings)?;
    transport.run_seeded()?;
    let elapsed = start.elapsed();

    println!("{}", transport.summary());
    println!("Wall-clock time: {:.3} s", elapsed.as_secs_f64());
    println!();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    transport.problem().tallies.write_reports(&mut out)?;
    out.flush()?;

    std::fs::write(REPORT_PATH, transport.problem().tallies.to_json()?)?;
    info!(path = REPORT_PATH, "wrote JSON tally reports");
    Ok(())
}
