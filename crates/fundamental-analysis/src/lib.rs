pub mod benchmarks;
pub mod insights;
pub mod scorer;
pub mod scoring;


pub use benchmarks::{benchmark_for, SectorBenchmark};
pub use scorer::SectorScorer;
