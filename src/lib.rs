// Biomarker trajectory analysis: normalization, polynomial fitting, derivative
// classification into 27 trajectory states, and zone-transition prediction.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::trajectory_computer::{compute_trajectory, time_to_transition};
pub use domain::error::TrajectoryError;
pub use domain::measurement::Measurement;
pub use domain::polynomial::FittingConfig;
pub use domain::trajectory::{FitMetadata, PointResult, TrajectoryResult, TrajectoryState};
pub use domain::zone::{Zone, ZoneBoundaries};
