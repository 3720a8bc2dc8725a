use std::collections::BTreeMap;

use log::debug;

use crate::{
    ClientID, Exercise, ExerciseID, ExerciseSubmission, PersistedSubmission, ServiceError,
    SessionError, SetField, SubmissionID, SubmissionSet, WorkoutCompleted, WorkoutID,
    WorkoutProgressState, progress,
};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    /// Restores the logging session of a client from the persisted submissions.
    async fn start_session(
        &self,
        workout_id: WorkoutID,
        client_id: ClientID,
        exercises: Vec<Exercise>,
    ) -> Result<Session, ServiceError>;
    /// Persists the submission of an exercise if at least one of its sets is checked.
    async fn save_submission(
        &self,
        session: &Session,
        exercise_id: ExerciseID,
    ) -> Result<Session, ServiceError>;
    /// Persists the last exercise and marks the workout as completed.
    async fn complete_workout(&self, session: &Session) -> Result<Session, ServiceError>;
}

/// Snapshot of an active logging session.
///
/// All transitions leave `self` untouched and return the next snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    workout_id: WorkoutID,
    client_id: ClientID,
    exercises: Vec<Exercise>,
    submissions: BTreeMap<ExerciseID, ExerciseSubmission>,
    current: usize,
}

impl Session {
    #[must_use]
    pub fn start(
        workout_id: WorkoutID,
        client_id: ClientID,
        mut exercises: Vec<Exercise>,
        persisted: &[PersistedSubmission],
    ) -> Self {
        progress::sort_exercises(&mut exercises);
        let reconciliation = progress::reconcile(&exercises, persisted);

        debug!(
            "resuming workout {} at exercise {} of {}",
            *workout_id,
            reconciliation.resume_index + 1,
            exercises.len()
        );

        Self {
            workout_id,
            client_id,
            exercises,
            submissions: reconciliation.submissions,
            current: reconciliation.resume_index,
        }
    }

    #[must_use]
    pub fn workout_id(&self) -> WorkoutID {
        self.workout_id
    }

    #[must_use]
    pub fn client_id(&self) -> ClientID {
        self.client_id
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.current)
    }

    #[must_use]
    pub fn is_last_exercise(&self) -> bool {
        self.current + 1 >= self.exercises.len()
    }

    #[must_use]
    pub fn submission(&self, exercise_id: ExerciseID) -> Option<&ExerciseSubmission> {
        self.submissions.get(&exercise_id)
    }

    #[must_use]
    pub fn submissions(&self) -> &BTreeMap<ExerciseID, ExerciseSubmission> {
        &self.submissions
    }

    #[must_use]
    pub fn progress(&self) -> WorkoutProgressState {
        WorkoutProgressState::compute(&self.exercises, &self.submissions)
    }

    /// Records a value of a set. Any change requires the set to be confirmed again.
    pub fn update_set_value(
        &self,
        exercise_id: ExerciseID,
        set_index: usize,
        field: SetField,
        value: &str,
    ) -> Result<Self, SessionError> {
        let exercise = self.exercise(exercise_id)?;
        let kind = exercise.kind();
        self.with_set(exercise_id, set_index, |set| {
            set.with_value(field, value)
                .ok_or(SessionError::FieldNotApplicable(field, kind))
        })
    }

    /// Confirms or unconfirms a set. Confirming a set fills its empty fields with the target
    /// values first. Unconfirming keeps the entered values.
    pub fn toggle_set(
        &self,
        exercise_id: ExerciseID,
        set_index: usize,
    ) -> Result<Self, SessionError> {
        let exercise = self.exercise(exercise_id)?;
        let target = exercise
            .target_sets()
            .get(set_index)
            .ok_or(SessionError::UnknownSet(exercise_id, set_index))?;
        self.with_set(exercise_id, set_index, |set| {
            if set.is_checked() {
                return Ok(set.with_checked(false));
            }
            let set = set.filled_from(target);
            if !set.is_filled() {
                return Err(SessionError::EmptySet(exercise_id, set_index));
            }
            Ok(set.with_checked(true))
        })
    }

    pub fn set_notes(&self, exercise_id: ExerciseID, notes: &str) -> Result<Self, SessionError> {
        self.with_submission(exercise_id, |submission| {
            submission.notes = notes.to_string();
        })
    }

    pub fn set_video_uri(
        &self,
        exercise_id: ExerciseID,
        video_uri: Option<String>,
    ) -> Result<Self, SessionError> {
        self.with_submission(exercise_id, |submission| {
            submission.video_uri = video_uri;
        })
    }

    pub fn set_submission_id(
        &self,
        exercise_id: ExerciseID,
        submission_id: SubmissionID,
    ) -> Result<Self, SessionError> {
        self.with_submission(exercise_id, |submission| {
            submission.submission_id = Some(submission_id);
        })
    }

    /// Advances to the next exercise once the current one is complete.
    pub fn next(&self) -> Result<Self, SessionError> {
        self.ensure_current_complete()?;
        if self.is_last_exercise() {
            return Err(SessionError::NoNextExercise);
        }
        Ok(Self {
            current: self.current + 1,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn previous(&self) -> Self {
        Self {
            current: self.current.saturating_sub(1),
            ..self.clone()
        }
    }

    /// Ends the workout. Only possible once the current exercise is complete and it is the last
    /// one.
    pub fn finish(&self) -> Result<WorkoutCompleted, SessionError> {
        self.ensure_current_complete()?;
        if !self.is_last_exercise() {
            return Err(SessionError::NotLastExercise);
        }
        Ok(WorkoutCompleted {
            workout_id: self.workout_id,
            client_id: self.client_id,
        })
    }

    fn ensure_current_complete(&self) -> Result<(), SessionError> {
        if let Some(exercise) = self.current_exercise() {
            if !self
                .submissions
                .get(&exercise.id)
                .is_some_and(progress::is_exercise_complete)
            {
                return Err(SessionError::IncompleteExercise(exercise.id));
            }
        }
        Ok(())
    }

    fn exercise(&self, exercise_id: ExerciseID) -> Result<&Exercise, SessionError> {
        self.exercises
            .iter()
            .find(|e| e.id == exercise_id)
            .ok_or(SessionError::UnknownExercise(exercise_id))
    }

    fn with_submission(
        &self,
        exercise_id: ExerciseID,
        update: impl FnOnce(&mut ExerciseSubmission),
    ) -> Result<Self, SessionError> {
        let mut submissions = self.submissions.clone();
        let submission = submissions
            .get_mut(&exercise_id)
            .ok_or(SessionError::UnknownExercise(exercise_id))?;
        update(submission);
        Ok(Self {
            submissions,
            ..self.clone()
        })
    }

    fn with_set(
        &self,
        exercise_id: ExerciseID,
        set_index: usize,
        update: impl FnOnce(&SubmissionSet) -> Result<SubmissionSet, SessionError>,
    ) -> Result<Self, SessionError> {
        let mut submissions = self.submissions.clone();
        let submission = submissions
            .get_mut(&exercise_id)
            .ok_or(SessionError::UnknownExercise(exercise_id))?;
        let set = submission
            .sets
            .get_mut(set_index)
            .ok_or(SessionError::UnknownSet(exercise_id, set_index))?;
        *set = update(set)?;
        Ok(Self {
            submissions,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::{ExerciseKind, Load, PersistedSet, Reps, TargetSet, Time, Weight};

    use super::*;

    fn weighted(id: u128, order_index: i32, targets: &[(u32, Option<Load>)]) -> Exercise {
        Exercise::new(
            id.into(),
            order_index,
            format!("Exercise {id}"),
            ExerciseKind::Weighted,
            targets
                .iter()
                .map(|(reps, load)| TargetSet::Weighted {
                    reps: Some(Reps::new(*reps).unwrap()),
                    load: *load,
                })
                .collect(),
        )
        .unwrap()
    }

    fn kg(value: f32) -> Option<Load> {
        Some(Load::Weight(Weight::new(value).unwrap()))
    }

    #[fixture]
    fn session() -> Session {
        Session::start(
            1.into(),
            2.into(),
            vec![
                weighted(20, 1, &[(5, None)]),
                weighted(10, 0, &[(8, kg(60.0)), (6, kg(70.0))]),
            ],
            &[],
        )
    }

    const E1: u128 = 10;
    const E2: u128 = 20;

    #[rstest]
    fn test_start_sorts_and_resumes(session: Session) {
        assert_eq!(
            session.exercises().iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![ExerciseID::from(E1), ExerciseID::from(E2)]
        );
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.workout_id(), 1.into());
        assert_eq!(session.client_id(), 2.into());
        assert!(
            session
                .submissions()
                .values()
                .all(|s| s.sets.iter().all(|set| !set.is_checked()))
        );
    }

    #[test]
    fn test_start_resumes_after_complete_exercise() {
        let session = Session::start(
            1.into(),
            2.into(),
            vec![weighted(E1, 0, &[(5, kg(50.0))]), weighted(E2, 1, &[(5, kg(50.0))])],
            &[PersistedSubmission {
                exercise_id: E1.into(),
                sets: vec![PersistedSet {
                    reps: Some("5".to_string()),
                    weight: Some("50".to_string()),
                    duration: None,
                }],
                video_uri: None,
                notes: String::new(),
                submission_id: Some(3.into()),
            }],
        );
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.progress().progress_percent, 50);
    }

    #[rstest]
    fn test_update_set_value_clears_confirmation(session: Session) {
        let id = ExerciseID::from(E1);
        let session = session.toggle_set(id, 0).unwrap().toggle_set(id, 1).unwrap();
        assert!(session.submission(id).unwrap().is_complete());

        let session = session.update_set_value(id, 1, SetField::Weight, "72.5").unwrap();

        assert_eq!(
            session.submission(id).unwrap().sets,
            vec![
                SubmissionSet::Weighted {
                    reps: "8".to_string(),
                    weight: "60".to_string(),
                    checked: true,
                },
                SubmissionSet::Weighted {
                    reps: "6".to_string(),
                    weight: "72.5".to_string(),
                    checked: false,
                },
            ]
        );
    }

    #[rstest]
    fn test_update_set_value_keeps_previous_snapshot(session: Session) {
        let id = ExerciseID::from(E1);
        let updated = session.update_set_value(id, 0, SetField::Reps, "9").unwrap();
        assert_eq!(
            session.submission(id).unwrap().sets[0],
            SubmissionSet::empty(ExerciseKind::Weighted)
        );
        assert_ne!(updated, session);
    }

    #[rstest]
    #[case(E1, 5, SetField::Reps, SessionError::UnknownSet(E1.into(), 5))]
    #[case(99, 0, SetField::Reps, SessionError::UnknownExercise(99.into()))]
    #[case(
        E1,
        0,
        SetField::Duration,
        SessionError::FieldNotApplicable(SetField::Duration, ExerciseKind::Weighted)
    )]
    fn test_update_set_value_invalid(
        session: Session,
        #[case] exercise_id: u128,
        #[case] set_index: usize,
        #[case] field: SetField,
        #[case] expected: SessionError,
    ) {
        assert_eq!(
            session.update_set_value(exercise_id.into(), set_index, field, "1"),
            Err(expected)
        );
    }

    #[rstest]
    fn test_toggle_set_fills_from_target(session: Session) {
        let id = ExerciseID::from(E1);
        let session = session
            .update_set_value(id, 0, SetField::Reps, "7")
            .unwrap()
            .toggle_set(id, 0)
            .unwrap();
        assert_eq!(
            session.submission(id).unwrap().sets[0],
            SubmissionSet::Weighted {
                reps: "7".to_string(),
                weight: "60".to_string(),
                checked: true,
            }
        );

        let session = session.toggle_set(id, 0).unwrap();
        assert_eq!(
            session.submission(id).unwrap().sets[0],
            SubmissionSet::Weighted {
                reps: "7".to_string(),
                weight: "60".to_string(),
                checked: false,
            }
        );
    }

    #[rstest]
    fn test_toggle_set_without_target_values(session: Session) {
        let id = ExerciseID::from(E2);
        assert_eq!(session.toggle_set(id, 0), Err(SessionError::EmptySet(id, 0)));

        let session = session
            .update_set_value(id, 0, SetField::Weight, "BW")
            .unwrap()
            .toggle_set(id, 0)
            .unwrap();
        assert!(session.submission(id).unwrap().is_complete());
    }

    #[test]
    fn test_toggle_set_duration() {
        let id = ExerciseID::from(1);
        let session = Session::start(
            1.into(),
            2.into(),
            vec![
                Exercise::new(
                    id,
                    0,
                    "Plank".to_string(),
                    ExerciseKind::Duration,
                    vec![TargetSet::Duration {
                        duration: Some(Time::new(60).unwrap()),
                    }],
                )
                .unwrap(),
            ],
            &[],
        )
        .toggle_set(id, 0)
        .unwrap();
        assert_eq!(
            session.submission(id).unwrap().sets[0],
            SubmissionSet::Duration {
                duration: "60".to_string(),
                checked: true,
            }
        );
        assert_eq!(
            session.finish(),
            Ok(WorkoutCompleted {
                workout_id: 1.into(),
                client_id: 2.into(),
            })
        );
    }

    #[rstest]
    fn test_navigation(session: Session) {
        let e1 = ExerciseID::from(E1);
        let e2 = ExerciseID::from(E2);

        assert_eq!(session.next(), Err(SessionError::IncompleteExercise(e1)));
        assert_eq!(session.finish(), Err(SessionError::IncompleteExercise(e1)));

        let session = session.toggle_set(e1, 0).unwrap().toggle_set(e1, 1).unwrap();
        assert!(progress::is_exercise_complete(session.submission(e1).unwrap()));
        assert_eq!(session.finish(), Err(SessionError::NotLastExercise));

        let session = session.next().unwrap();
        assert_eq!(session.current_exercise().unwrap().id, e2);
        assert_eq!(session.next(), Err(SessionError::IncompleteExercise(e2)));
        assert_eq!(session.finish(), Err(SessionError::IncompleteExercise(e2)));

        assert_eq!(session.previous().current_index(), 0);
        assert_eq!(session.previous().previous().current_index(), 0);

        let session = session
            .update_set_value(e2, 0, SetField::Weight, "20")
            .unwrap()
            .toggle_set(e2, 0)
            .unwrap();
        assert_eq!(session.next(), Err(SessionError::NoNextExercise));
        assert!(session.finish().is_ok());
        assert_eq!(session.progress().progress_percent, 100);
        assert_eq!(session.progress().resume_index, 1);
    }

    #[rstest]
    fn test_set_notes_and_video_uri(session: Session) {
        let id = ExerciseID::from(E2);
        let session = session
            .set_notes(id, "left knee")
            .unwrap()
            .set_video_uri(id, Some("videos/e2.mp4".to_string()))
            .unwrap()
            .set_submission_id(id, 7.into())
            .unwrap();
        let submission = session.submission(id).unwrap();
        assert_eq!(submission.notes, "left knee");
        assert_eq!(submission.video_uri.as_deref(), Some("videos/e2.mp4"));
        assert_eq!(submission.submission_id, Some(7.into()));
        assert_eq!(
            session.set_notes(99.into(), ""),
            Err(SessionError::UnknownExercise(99.into()))
        );
    }
}
