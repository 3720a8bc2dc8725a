use log::{debug, error};

use crate::{
    ClientID, Exercise, ExerciseID, PersistedSubmission, ServiceError, Session, SessionError,
    SessionService, SubmissionRepository, WorkoutID, WorkoutStatus,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                crate::$error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SubmissionRepository> SessionService for Service<R> {
    async fn start_session(
        &self,
        workout_id: WorkoutID,
        client_id: ClientID,
        exercises: Vec<Exercise>,
    ) -> Result<Session, ServiceError> {
        let persisted = log_on_error!(
            self.repository.read_submissions(workout_id, client_id),
            ReadError,
            "read",
            "submissions"
        )?;

        let session = Session::start(workout_id, client_id, exercises, &persisted);

        if persisted.is_empty() {
            log_on_error!(
                self.repository
                    .write_workout_status(workout_id, WorkoutStatus::InProgress),
                UpdateError,
                "write",
                "workout status"
            )?;
        }

        Ok(session)
    }

    async fn save_submission(
        &self,
        session: &Session,
        exercise_id: ExerciseID,
    ) -> Result<Session, ServiceError> {
        let submission = session
            .submission(exercise_id)
            .ok_or(SessionError::UnknownExercise(exercise_id))?;

        if !submission.has_checked_set() {
            return Ok(session.clone());
        }

        let submission_id = log_on_error!(
            self.repository.upsert_submission(
                session.workout_id(),
                session.client_id(),
                PersistedSubmission::from(submission),
            ),
            UpdateError,
            "save",
            "submission"
        )?;

        Ok(session.set_submission_id(exercise_id, submission_id)?)
    }

    async fn complete_workout(&self, session: &Session) -> Result<Session, ServiceError> {
        let completed = session.finish()?;

        let session = match session.current_exercise() {
            Some(exercise) => self.save_submission(session, exercise.id).await?,
            None => session.clone(),
        };

        log_on_error!(
            self.repository
                .write_workout_status(completed.workout_id, WorkoutStatus::Completed),
            UpdateError,
            "write",
            "workout status"
        )?;

        Ok(session)
    }
}
