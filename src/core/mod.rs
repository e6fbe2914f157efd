pub mod clustering;
pub mod dna;
pub mod features;
pub mod monte_carlo;
pub mod patterns;
pub mod rng;
pub mod scoring;
pub mod sessions;
pub mod stats;
pub mod store;
pub mod tilt;
