//! Workout progress and resumption
//!
//! A logging session is restored from the submissions a client has persisted so far. The session
//! resumes at the first exercise that is not complete. If every exercise is complete, it resumes
//! at the last exercise, so that the workout can still be reviewed and finished.

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::{Exercise, ExerciseID, ExerciseSubmission, PersistedSubmission, SubmissionSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub submissions: BTreeMap<ExerciseID, ExerciseSubmission>,
    pub resume_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutProgressState {
    pub exercise_states: BTreeMap<ExerciseID, ExerciseState>,
    pub resume_index: usize,
    pub progress_percent: u8,
}

impl WorkoutProgressState {
    #[must_use]
    pub fn compute(
        exercises: &[Exercise],
        submissions: &BTreeMap<ExerciseID, ExerciseSubmission>,
    ) -> Self {
        let mut tracker = ResumeTracker::default();
        let mut exercise_states = BTreeMap::new();

        for (idx, exercise) in exercises.iter().enumerate() {
            let is_complete = submissions
                .get(&exercise.id)
                .is_some_and(is_exercise_complete);
            tracker.observe(idx, is_complete);
            exercise_states.insert(exercise.id, ExerciseState { is_complete });
        }

        Self {
            exercise_states,
            resume_index: tracker.finish(exercises.len()),
            progress_percent: compute_progress_percent(exercises, submissions),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseState {
    pub is_complete: bool,
}

/// Orders exercises for traversal by order index, ties broken by ID.
pub fn sort_exercises(exercises: &mut [Exercise]) {
    exercises.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Restores the working submission of every exercise and determines where to resume.
///
/// `exercises` must be in traversal order (see [`sort_exercises`]). Persisted submissions whose
/// sets do not match the exercise's target sets are restored as far as possible: missing sets
/// are empty and unchecked, surplus sets are dropped.
#[must_use]
pub fn reconcile(exercises: &[Exercise], persisted: &[PersistedSubmission]) -> Reconciliation {
    let mut persisted_by_exercise: HashMap<ExerciseID, &PersistedSubmission> = HashMap::new();
    for submission in persisted {
        persisted_by_exercise
            .entry(submission.exercise_id)
            .or_insert(submission);
    }

    let mut tracker = ResumeTracker::default();
    let mut submissions = BTreeMap::new();

    for (idx, exercise) in exercises.iter().enumerate() {
        let submission = match persisted_by_exercise.get(&exercise.id) {
            Some(persisted) => restore(exercise, persisted),
            None => ExerciseSubmission::empty(exercise),
        };
        tracker.observe(idx, is_exercise_complete(&submission));
        submissions.insert(exercise.id, submission);
    }

    Reconciliation {
        submissions,
        resume_index: tracker.finish(exercises.len()),
    }
}

#[must_use]
pub fn is_exercise_complete(submission: &ExerciseSubmission) -> bool {
    submission.is_complete()
}

/// Share of complete exercises in percent, rounded half up. Exercises without a submission count
/// as incomplete.
#[must_use]
pub fn compute_progress_percent(
    exercises: &[Exercise],
    submissions: &BTreeMap<ExerciseID, ExerciseSubmission>,
) -> u8 {
    if exercises.is_empty() {
        return 0;
    }

    let complete = exercises
        .iter()
        .filter(|e| submissions.get(&e.id).is_some_and(is_exercise_complete))
        .count();
    let total = exercises.len();

    u8::try_from((200 * complete + total) / (2 * total)).unwrap_or(100)
}

fn restore(exercise: &Exercise, persisted: &PersistedSubmission) -> ExerciseSubmission {
    let target_sets = exercise.target_sets();

    if persisted.sets.len() != target_sets.len() {
        warn!(
            "persisted submission of exercise {} has {} sets, expected {}",
            *exercise.id,
            persisted.sets.len(),
            target_sets.len()
        );
    }

    let sets = (0..target_sets.len())
        .map(|i| match persisted.sets.get(i) {
            Some(set) => SubmissionSet::restore(exercise.kind(), set),
            None => SubmissionSet::empty(exercise.kind()),
        })
        .collect();

    ExerciseSubmission {
        exercise_id: exercise.id,
        sets,
        video_uri: persisted.video_uri.clone(),
        notes: persisted.notes.clone(),
        submission_id: persisted.submission_id,
    }
}

/// Forward pass over the completeness of exercises in traversal order.
#[derive(Default)]
struct ResumeTracker {
    found_incomplete: bool,
    resume_index: usize,
}

impl ResumeTracker {
    fn observe(&mut self, idx: usize, is_complete: bool) {
        if self.found_incomplete {
            return;
        }
        if is_complete {
            self.resume_index = idx + 1;
        } else {
            self.resume_index = idx;
            self.found_incomplete = true;
        }
    }

    fn finish(self, len: usize) -> usize {
        self.resume_index.min(len.saturating_sub(1))
    }
}
