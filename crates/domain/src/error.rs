use crate::{ExerciseID, ExerciseKind, SetField};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("all sets of the current exercise must be checked before continuing")]
    IncompleteExercise(ExerciseID),
    #[error("exercise {0:?} is not part of this workout")]
    UnknownExercise(ExerciseID),
    #[error("exercise {0:?} has no set {1}")]
    UnknownSet(ExerciseID, usize),
    #[error("{0} cannot be recorded for {1} exercises")]
    FieldNotApplicable(SetField, ExerciseKind),
    #[error("set {1} of exercise {0:?} has no values to confirm")]
    EmptySet(ExerciseID, usize),
    #[error("there is no next exercise")]
    NoNextExercise,
    #[error("workout can only be finished on the last exercise")]
    NotLastExercise,
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Update(#[from] UpdateError),
}
