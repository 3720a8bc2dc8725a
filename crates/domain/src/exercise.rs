use std::fmt;

use derive_more::{Deref, Display, Into};
use uuid::Uuid;

/// A coach-authored exercise within a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub order_index: i32,
    pub name: String,
    kind: ExerciseKind,
    target_sets: Vec<TargetSet>,
}

impl Exercise {
    pub fn new(
        id: ExerciseID,
        order_index: i32,
        name: String,
        kind: ExerciseKind,
        target_sets: Vec<TargetSet>,
    ) -> Result<Self, ExerciseError> {
        if let Some(idx) = target_sets.iter().position(|s| s.kind() != kind) {
            return Err(ExerciseError::KindMismatch(idx));
        }

        Ok(Self {
            id,
            order_index,
            name,
            kind,
            target_sets,
        })
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn target_sets(&self) -> &[TargetSet] {
        &self.target_sets
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseError {
    #[error("Target set {0} does not match the exercise kind")]
    KindMismatch(usize),
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ExerciseKind {
    Weighted,
    Bodyweight,
    Duration,
}

/// Prescribed performance for one set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSet {
    Weighted {
        reps: Option<Reps>,
        load: Option<Load>,
    },
    Bodyweight {
        reps: Option<Reps>,
    },
    Duration {
        duration: Option<Time>,
    },
}

impl TargetSet {
    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        match self {
            TargetSet::Weighted { .. } => ExerciseKind::Weighted,
            TargetSet::Bodyweight { .. } => ExerciseKind::Bodyweight,
            TargetSet::Duration { .. } => ExerciseKind::Duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Load {
    Weight(Weight),
    Bodyweight,
}

impl Load {
    pub const BODYWEIGHT_MARKER: &'static str = "BW";
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Load::Weight(weight) => write!(f, "{weight}"),
            Load::Bodyweight => write!(f, "{}", Self::BODYWEIGHT_MARKER),
        }
    }
}

impl TryFrom<&str> for Load {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case(Self::BODYWEIGHT_MARKER) {
            Ok(Load::Bodyweight)
        } else {
            Ok(Load::Weight(Weight::try_from(value)?))
        }
    }
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Time(u32);

impl Time {
    pub fn new(value: u32) -> Result<Self, TimeError> {
        if !(0..10000).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(TimeError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Time must be in the range 0 to 9999 s")]
    OutOfRange,
    #[error("Time must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1")]
    InvalidResolution,
    #[error("Weight must be a decimal or BW")]
    ParseError,
}
