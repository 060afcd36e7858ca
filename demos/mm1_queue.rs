//! M/M/1 queue service-rate design.
//!
//! Chooses the service rate `mu` of a single-server queue with arrival rate
//! `lambda = 1.5` to minimize the mean sojourn time plus a quadratic cost on
//! `mu`. Each objective call simulates one replication of the queue with its
//! own random stream, so the objective is noisy and the study averages
//! several replications per candidate.
//!
//! ```text
//! RUST_LOG=info cargo run --example mm1_queue
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use u_simopt::prelude::*;

/// Problem factors, passed to the objective as explicit context.
struct Mm1Problem {
    lambda: f64,
    cost: f64,
    warmup: usize,
    customers: usize,
    rng: StdRng,
}

impl Mm1Problem {
    fn exponential(&mut self, rate: f64) -> f64 {
        let u: f64 = self.rng.random_range(f64::EPSILON..1.0);
        -u.ln() / rate
    }

    /// Mean sojourn time over one replication (Lindley recursion).
    fn simulate(&mut self, mu: f64) -> f64 {
        let mut wait = 0.0;
        let mut total = 0.0;
        for i in 0..self.warmup + self.customers {
            let service = self.exponential(mu);
            if i >= self.warmup {
                total += wait + service;
            }
            let interarrival = self.exponential(self.lambda);
            wait = (wait + service - interarrival).max(0.0);
        }
        total / self.customers as f64
    }
}

impl Objective for Mm1Problem {
    fn evaluate(&mut self, trial: &mut Trial) -> Result<f64> {
        let mu = trial.suggest_real("mu", 0.1, 10.0, false)?;
        let sojourn = self.simulate(mu);
        Ok(sojourn + self.cost * mu * mu)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut problem = Mm1Problem {
        lambda: 1.5,
        cost: 0.1,
        warmup: 50,
        customers: 500,
        rng: StdRng::seed_from_u64(123_456),
    };

    let config = StudyConfig::default()
        .with_direction(Direction::Minimize)
        .with_n_init_points(5)
        .with_noise(0.5, 0.05)
        .with_n_replications(5)
        .with_max_no_improve(Some(10))
        .with_seed(42)
        .with_verbose(true);
    let mut study = SimulationStudyTabu::new(config)?;

    println!("Starting simulation optimization for the M/M/1 queue problem...");
    study.optimize_with(&mut problem, 50)?;

    if let Some(best) = study.best_params() {
        println!("\nBest candidate: {best:?}");
    }
    if let Some(value) = study.best_value() {
        println!("Best objective value achieved: {value:.4}");
    }
    Ok(())
}
