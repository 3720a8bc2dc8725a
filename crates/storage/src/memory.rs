//! In-memory store
//!
//! Keeps submissions for the lifetime of the value. Used where no backend is available and to
//! exercise the domain services.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use log::debug;
use spotter_domain as domain;
use uuid::Uuid;

type SubmissionKey = (domain::WorkoutID, domain::ClientID, domain::ExerciseID);

#[derive(Default)]
pub struct InMemory {
    submissions: RefCell<BTreeMap<SubmissionKey, domain::PersistedSubmission>>,
    statuses: RefCell<BTreeMap<domain::WorkoutID, domain::WorkoutStatus>>,
    offline: Cell<bool>,
}

impl InMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets every subsequent operation fail with [`domain::StorageError::NoConnection`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    #[must_use]
    pub fn workout_status(&self, workout_id: domain::WorkoutID) -> domain::WorkoutStatus {
        self.statuses
            .borrow()
            .get(&workout_id)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.submissions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.submissions.borrow().is_empty()
    }

    fn check_connection(&self) -> Result<(), domain::StorageError> {
        if self.offline.get() {
            return Err(domain::StorageError::NoConnection);
        }
        Ok(())
    }
}

impl domain::SubmissionRepository for InMemory {
    async fn read_submissions(
        &self,
        workout_id: domain::WorkoutID,
        client_id: domain::ClientID,
    ) -> Result<Vec<domain::PersistedSubmission>, domain::ReadError> {
        self.check_connection()?;
        Ok(self
            .submissions
            .borrow()
            .iter()
            .filter(|((w, c, _), _)| *w == workout_id && *c == client_id)
            .map(|(_, submission)| submission.clone())
            .collect())
    }

    async fn upsert_submission(
        &self,
        workout_id: domain::WorkoutID,
        client_id: domain::ClientID,
        submission: domain::PersistedSubmission,
    ) -> Result<domain::SubmissionID, domain::UpdateError> {
        self.check_connection()?;
        let mut submissions = self.submissions.borrow_mut();
        let key = (workout_id, client_id, submission.exercise_id);
        let id = submissions
            .get(&key)
            .and_then(|existing| existing.submission_id)
            .or(submission.submission_id)
            .unwrap_or_else(|| Uuid::new_v4().into());
        debug!("storing submission {}", *id);
        submissions.insert(
            key,
            domain::PersistedSubmission {
                submission_id: Some(id),
                ..submission
            },
        );
        Ok(id)
    }

    async fn write_workout_status(
        &self,
        workout_id: domain::WorkoutID,
        status: domain::WorkoutStatus,
    ) -> Result<domain::WorkoutStatus, domain::UpdateError> {
        self.check_connection()?;
        self.statuses.borrow_mut().insert(workout_id, status);
        Ok(status)
    }
}
