//! Distances and divergences between distributions.

mod cdf;
mod divergence;

pub use cdf::{energy_distance, wasserstein_distance};
pub use divergence::{jensen_shannon_divergence, kl_div};
