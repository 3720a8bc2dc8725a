use std::fmt;

use derive_more::Deref;
use uuid::Uuid;

use crate::{
    ClientID, Exercise, ExerciseID, ExerciseKind, Load, ReadError, TargetSet, UpdateError,
    WorkoutID, WorkoutStatus,
};

#[allow(async_fn_in_trait)]
pub trait SubmissionRepository {
    async fn read_submissions(
        &self,
        workout_id: WorkoutID,
        client_id: ClientID,
    ) -> Result<Vec<PersistedSubmission>, ReadError>;
    /// Insert or update keyed on (workout, client, exercise). Repeating the same write must not
    /// create a second row.
    async fn upsert_submission(
        &self,
        workout_id: WorkoutID,
        client_id: ClientID,
        submission: PersistedSubmission,
    ) -> Result<SubmissionID, UpdateError>;
    async fn write_workout_status(
        &self,
        workout_id: WorkoutID,
        status: WorkoutStatus,
    ) -> Result<WorkoutStatus, UpdateError>;
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmissionID(Uuid);

impl SubmissionID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SubmissionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SubmissionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// A client's recorded performance against one exercise of a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSubmission {
    pub exercise_id: ExerciseID,
    pub sets: Vec<SubmissionSet>,
    pub video_uri: Option<String>,
    pub notes: String,
    pub submission_id: Option<SubmissionID>,
}

impl ExerciseSubmission {
    #[must_use]
    pub fn empty(exercise: &Exercise) -> Self {
        Self {
            exercise_id: exercise.id,
            sets: exercise
                .target_sets()
                .iter()
                .map(|_| SubmissionSet::empty(exercise.kind()))
                .collect(),
            video_uri: None,
            notes: String::new(),
            submission_id: None,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sets.iter().all(SubmissionSet::is_checked)
    }

    #[must_use]
    pub fn checked_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_checked()).count()
    }

    #[must_use]
    pub fn has_checked_set(&self) -> bool {
        self.sets.iter().any(SubmissionSet::is_checked)
    }
}

/// One slot of recorded performance, index-aligned to the exercise's target sets.
///
/// Values are kept as entered. An empty string means no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionSet {
    Weighted {
        reps: String,
        weight: String,
        checked: bool,
    },
    Bodyweight {
        reps: String,
        checked: bool,
    },
    Duration {
        duration: String,
        checked: bool,
    },
}

impl SubmissionSet {
    #[must_use]
    pub fn empty(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Weighted => SubmissionSet::Weighted {
                reps: String::new(),
                weight: String::new(),
                checked: false,
            },
            ExerciseKind::Bodyweight => SubmissionSet::Bodyweight {
                reps: String::new(),
                checked: false,
            },
            ExerciseKind::Duration => SubmissionSet::Duration {
                duration: String::new(),
                checked: false,
            },
        }
    }

    /// Restores the values of a persisted set. A restored set counts as checked exactly when all
    /// fields required by its kind carry a value.
    #[must_use]
    pub fn restore(kind: ExerciseKind, persisted: &PersistedSet) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        let set = match kind {
            ExerciseKind::Weighted => SubmissionSet::Weighted {
                reps: value(&persisted.reps),
                weight: value(&persisted.weight),
                checked: false,
            },
            ExerciseKind::Bodyweight => SubmissionSet::Bodyweight {
                reps: value(&persisted.reps),
                checked: false,
            },
            ExerciseKind::Duration => SubmissionSet::Duration {
                duration: value(&persisted.duration),
                checked: false,
            },
        };
        let filled = set.is_filled();
        set.with_checked(filled)
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        match self {
            SubmissionSet::Weighted { .. } => ExerciseKind::Weighted,
            SubmissionSet::Bodyweight { .. } => ExerciseKind::Bodyweight,
            SubmissionSet::Duration { .. } => ExerciseKind::Duration,
        }
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        match self {
            SubmissionSet::Weighted { checked, .. }
            | SubmissionSet::Bodyweight { checked, .. }
            | SubmissionSet::Duration { checked, .. } => *checked,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        match self {
            SubmissionSet::Weighted { reps, weight, .. } => !is_blank(reps) && !is_blank(weight),
            SubmissionSet::Bodyweight { reps, .. } => !is_blank(reps),
            SubmissionSet::Duration { duration, .. } => !is_blank(duration),
        }
    }

    #[must_use]
    pub fn value(&self, field: SetField) -> Option<&str> {
        match (self, field) {
            (
                SubmissionSet::Weighted { reps: slot, .. }
                | SubmissionSet::Bodyweight { reps: slot, .. },
                SetField::Reps,
            )
            | (SubmissionSet::Weighted { weight: slot, .. }, SetField::Weight)
            | (SubmissionSet::Duration { duration: slot, .. }, SetField::Duration) => {
                Some(slot.as_str())
            }
            _ => None,
        }
    }

    /// Returns the set with `field` replaced and the confirmation cleared, or `None` if the field
    /// does not exist for the set's kind.
    #[must_use]
    pub fn with_value(&self, field: SetField, value: &str) -> Option<Self> {
        let mut set = self.clone();
        match (&mut set, field) {
            (
                SubmissionSet::Weighted {
                    reps: slot,
                    checked,
                    ..
                }
                | SubmissionSet::Bodyweight {
                    reps: slot,
                    checked,
                },
                SetField::Reps,
            )
            | (
                SubmissionSet::Weighted {
                    weight: slot,
                    checked,
                    ..
                },
                SetField::Weight,
            )
            | (
                SubmissionSet::Duration {
                    duration: slot,
                    checked,
                },
                SetField::Duration,
            ) => {
                *slot = value.to_string();
                *checked = false;
            }
            _ => return None,
        }
        Some(set)
    }

    #[must_use]
    pub fn with_checked(&self, value: bool) -> Self {
        let mut set = self.clone();
        match &mut set {
            SubmissionSet::Weighted { checked, .. }
            | SubmissionSet::Bodyweight { checked, .. }
            | SubmissionSet::Duration { checked, .. } => *checked = value,
        }
        set
    }

    /// Fills every empty field from the prescribed target. Fields that already carry a value are
    /// kept.
    #[must_use]
    pub fn filled_from(&self, target: &TargetSet) -> Self {
        let mut set = self.clone();
        match (&mut set, target) {
            (
                SubmissionSet::Weighted { reps, weight, .. },
                TargetSet::Weighted {
                    reps: target_reps,
                    load,
                },
            ) => {
                fill(reps, target_reps.map(|r| r.to_string()));
                fill(weight, load.map(|l: Load| l.to_string()));
            }
            (
                SubmissionSet::Bodyweight { reps, .. },
                TargetSet::Bodyweight { reps: target_reps },
            ) => {
                fill(reps, target_reps.map(|r| r.to_string()));
            }
            (
                SubmissionSet::Duration { duration, .. },
                TargetSet::Duration {
                    duration: target_duration,
                },
            ) => {
                fill(duration, target_duration.map(|d| d.to_string()));
            }
            _ => {}
        }
        set
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn fill(value: &mut String, target: Option<String>) {
    if is_blank(value) {
        if let Some(target) = target {
            *value = target;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Reps,
    Weight,
    Duration,
}

impl fmt::Display for SetField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SetField::Reps => "reps",
                SetField::Weight => "weight",
                SetField::Duration => "duration",
            }
        )
    }
}

/// Submission as kept by the store. Its sets are not guaranteed to match the current shape of
/// the exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSubmission {
    pub exercise_id: ExerciseID,
    pub sets: Vec<PersistedSet>,
    pub video_uri: Option<String>,
    pub notes: String,
    pub submission_id: Option<SubmissionID>,
}

impl From<&ExerciseSubmission> for PersistedSubmission {
    fn from(value: &ExerciseSubmission) -> Self {
        Self {
            exercise_id: value.exercise_id,
            sets: value.sets.iter().map(PersistedSet::from).collect(),
            video_uri: value.video_uri.clone(),
            notes: value.notes.clone(),
            submission_id: value.submission_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSet {
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub duration: Option<String>,
}

/// Only confirmed sets carry values. Anything entered but not confirmed is not persisted.
impl From<&SubmissionSet> for PersistedSet {
    fn from(value: &SubmissionSet) -> Self {
        if !value.is_checked() {
            return Self::default();
        }
        let value_of = |field| {
            value
                .value(field)
                .filter(|v| !is_blank(v))
                .map(ToString::to_string)
        };
        Self {
            reps: value_of(SetField::Reps),
            weight: value_of(SetField::Weight),
            duration: value_of(SetField::Duration),
        }
    }
}
