//! Breadth-first search as repeated masked vector–matrix products
//!
//! Each level multiplies the frontier with the adjacency matrix over the
//! Boolean semiring, masked by the complement of the visited set.

use spla::blas1::set_element;
use spla::blas2::vxm_masked;
use spla::{ops, Descriptor, Matrix, Vector};
use tracing::{info, Level};

fn main() -> spla::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    // two rings of five vertices joined by the edge 4 -> 5
    let n = 10;
    let mut edges = Vec::new();
    for k in 0..5 {
        edges.push((k, (k + 1) % 5, ()));
        edges.push((5 + k, 5 + (k + 1) % 5, ()));
    }
    edges.push((4, 5, ()));
    let a = Matrix::<()>::from_triples(n, n, edges)?;

    let ring = ops::lor_land::<bool>();
    let mut levels = Vector::<u32>::new(n);
    let mut visited = Vector::<bool>::new(n);
    let mut frontier = Vector::<bool>::new(n);
    set_element(&mut frontier, true, 0, Descriptor::NO_OPERATION)?;
    set_element(&mut visited, true, 0, Descriptor::NO_OPERATION)?;
    set_element(&mut levels, 0u32, 0, Descriptor::NO_OPERATION)?;

    let mut level = 0u32;
    loop {
        level += 1;
        let mut next = Vector::<bool>::new(n);
        vxm_masked(
            &mut next,
            &visited,
            &frontier,
            &a,
            &ring,
            Descriptor::STRUCTURAL_COMPLEMENT,
        )?;
        if next.nnz() == 0 {
            break;
        }
        info!(level, reached = next.nnz(), "frontier advanced");
        for (i, _) in next.iter() {
            set_element(&mut visited, true, i, Descriptor::NO_OPERATION)?;
            set_element(&mut levels, level, i, Descriptor::NO_OPERATION)?;
        }
        frontier = next;
    }

    println!("BFS levels from vertex 0:");
    for (i, l) in levels.to_sorted_entries() {
        println!("   vertex {i}: level {l}");
    }
    Ok(())
}
