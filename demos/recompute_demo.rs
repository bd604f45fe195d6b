//! Demonstration of a constrained tessellation session
//!
//! Run with `RUST_LOG=debug` to see the pipeline's log output.

use constrained_voronoi::generation::scatter_sites;
use constrained_voronoi::*;
use tracing_subscriber::EnvFilter;

const BOUNDARY: &str = r#"{
    "outer": [
        [-22.990, -43.230], [-22.960, -43.235], [-22.950, -43.200],
        [-22.965, -43.170], [-22.990, -43.180]
    ],
    "inner": [
        [[-22.975, -43.215], [-22.968, -43.215], [-22.968, -43.205], [-22.975, -43.205]]
    ]
}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let boundary = BoundaryModel::from_json(BOUNDARY)?;
    let sites = scatter_sites(&boundary, 25, 42);

    let mut session = Session::new();
    session.load_boundary(boundary.outer().clone(), boundary.holes().to_vec());
    session.apply(Command::AddSites(sites))?;

    let tessellation = session.tessellation();
    println!("Published {} cells", tessellation.cell_count());
    println!("Total area: {:.6}", tessellation.total_area());
    println!("Outer area: {:.6}", boundary.outer().area());

    // Drag the first site to the boundary's corner region
    if let Some(first) = tessellation.sites().first().map(|s| s.id) {
        let target = Point::new(-22.985, -43.185);
        session.move_site(first, target)?;
        if let Some(cell) = session.tessellation().cell_for(first) {
            println!("Site {} now covers {:.6} with {} vertices", first, cell.area(), cell.vertex_count());
        }
    }

    #[cfg(feature = "spatial-index")]
    {
        let query = Point::new(-22.970, -43.190);
        if let Some(id) = session.find_site_at(query) {
            println!("Position {:?} is in the cell of site {}", query, id);
        }
    }

    let json = serde_json::to_string(session.tessellation()).map_err(TessellationError::from)?;
    println!("Serialized tessellation: {} bytes", json.len());

    Ok(())
}
