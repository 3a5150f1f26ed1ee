//! Read a Matrix Market file and multiply it with the all-ones vector
//!
//! Usage: `cargo run --example spmv_from_file -- [path.mtx]`. Without a
//! path a small symmetric matrix is written to the temp directory first.

use std::time::Instant;

use spla::blas2::mxv;
use spla::{ops, Descriptor, Matrix, MatrixFile, MatrixOperations, ParserConfig, SparseMatrix, Vector};
use tracing::Level;

const SAMPLE: &str = "%%MatrixMarket matrix coordinate real symmetric\n\
                      % 4x4 sample\n\
                      4 4 6\n\
                      1 1 4\n\
                      2 1 -1\n\
                      2 2 4\n\
                      3 2 -1\n\
                      3 3 4\n\
                      4 3 -1\n";

fn main() -> spla::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let path = match std::env::args().nth(1) {
        Some(path) => path.into(),
        None => {
            let path = std::env::temp_dir().join("spla-sample.mtx");
            std::fs::write(&path, SAMPLE).map_err(|_| spla::SplaError::Io)?;
            path
        }
    };

    let config = ParserConfig::default();
    let start = Instant::now();
    let file = MatrixFile::open(&path, &config)?;
    let parse_time = start.elapsed();

    let p = file.properties();
    println!("Matrix '{}'", p.filename);
    println!("   Dimensions: {} x {}", p.m, p.n);
    println!("   Entries in file: {}", p.entries);
    println!("   Non-zeros: {}", p.nz);
    println!("   Symmetry: {:?}", p.symmetry);
    println!("   Parsed in {:.3}ms", parse_time.as_secs_f64() * 1000.0);

    let start = Instant::now();
    let a: Matrix<f64> = file.to_matrix(Descriptor::NO_OPERATION)?;
    println!("   Ingested in {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);
    print_first_row("file", &file);
    print_first_row("matrix", &a);

    let v = Vector::from_dense(&vec![1.0; a.ncols()]);
    let mut u = Vector::<f64>::new(a.nrows());
    let start = Instant::now();
    mxv(&mut u, &a, &v, &ops::plus_times::<f64>(), Descriptor::DENSE)?;
    println!("\nA·1 computed in {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);

    for (i, x) in u.to_sorted_entries().into_iter().take(10) {
        println!("   u[{i}] = {x:.3}");
    }
    if u.nnz() > 10 {
        println!("   ... {} more", u.nnz() - 10);
    }
    Ok(())
}

/// Row 0 as seen through the layout-agnostic accessors
fn print_first_row<M: MatrixOperations<Element = f64>>(label: &str, m: &M) {
    let (rows, cols) = m.dimensions();
    if rows == 0 {
        return;
    }
    println!("   {label} ({rows} x {cols}, {} stored) row 0: {:?}", SparseMatrix::nnz(m), m.get_row(0));
}
