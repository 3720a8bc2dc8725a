#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
pub mod progress;
mod service;
mod session;
mod submission;
mod workout;

pub use error::*;
pub use exercise::*;
pub use progress::{
    ExerciseState, Reconciliation, WorkoutProgressState, compute_progress_percent,
    is_exercise_complete, reconcile, sort_exercises,
};
pub use service::*;
pub use session::*;
pub use submission::*;
pub use workout::*;
