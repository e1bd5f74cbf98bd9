//! Membrane coefficient fields.
//!
//! A membrane is described by three scalar fields over the unit square:
//! tension p(x,y), density w(x,y) and potential q(x,y). The default
//! field is a mildly heterogeneous membrane with a Gaussian obstacle in
//! the potential; arbitrary closures can be supplied instead.

use std::f64::consts::PI;
use std::sync::Arc;

/// Side length of the square domain.
pub const DOMAIN_SIZE: f64 = 1.0;

/// Smallest admissible interior grid resolution.
pub const MIN_GRID_SIZE: usize = 10;

type CoefficientFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Gaussian obstacle parameterizing the default potential:
/// `q(x,y) = strength * exp(-width * r²)` with `r²` the squared
/// distance to the obstacle center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center_x: f64,
    pub center_y: f64,
    pub strength: f64,
    pub width: f64,
}

impl Default for Obstacle {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            strength: 50.0,
            width: 50.0,
        }
    }
}

/// Coefficient field of the membrane: tension, density and potential as
/// continuous functions over the domain. Immutable once constructed and
/// owned independently of any mesh sampled from it.
#[derive(Clone)]
pub enum Coefficients {
    /// Analytic default forms with a parameterized obstacle.
    Default { obstacle: Obstacle },
    /// User-supplied coefficient functions.
    Custom {
        tension: CoefficientFn,
        density: CoefficientFn,
        potential: CoefficientFn,
    },
}

impl Coefficients {
    /// Default membrane: mildly varying tension and density, Gaussian
    /// potential bump centered in the domain.
    pub fn default_membrane() -> Self {
        Self::Default {
            obstacle: Obstacle::default(),
        }
    }

    /// Default analytic forms with a custom obstacle.
    pub fn with_obstacle(obstacle: Obstacle) -> Self {
        Self::Default { obstacle }
    }

    /// Fully custom coefficient functions.
    pub fn custom<P, W, Q>(tension: P, density: W, potential: Q) -> Self
    where
        P: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        W: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        Q: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom {
            tension: Arc::new(tension),
            density: Arc::new(density),
            potential: Arc::new(potential),
        }
    }

    /// Tension p(x,y).
    pub fn tension(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Default { .. } => 1.0 + 0.5 * (2.0 * PI * x).sin() * (2.0 * PI * y).cos(),
            Self::Custom { tension, .. } => tension(x, y),
        }
    }

    /// Density w(x,y).
    pub fn density(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Default { .. } => 1.0 + 0.3 * x * y,
            Self::Custom { density, .. } => density(x, y),
        }
    }

    /// Potential q(x,y).
    pub fn potential(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Default { obstacle } => {
                let dx = x - obstacle.center_x;
                let dy = y - obstacle.center_y;
                let r2 = dx * dx + dy * dy;
                obstacle.strength * (-obstacle.width * r2).exp()
            }
            Self::Custom { potential, .. } => potential(x, y),
        }
    }
}

impl std::fmt::Debug for Coefficients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default { obstacle } => {
                f.debug_struct("Default").field("obstacle", obstacle).finish()
            }
            Self::Custom { .. } => f.debug_struct("Custom").finish_non_exhaustive(),
        }
    }
}
