use derive_more::Deref;
use uuid::Uuid;

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClientID(Uuid);

impl ClientID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ClientID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ClientID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Emitted when the last exercise is complete and the client confirms the end of the workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutCompleted {
    pub workout_id: WorkoutID,
    pub client_id: ClientID,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(WorkoutStatus::NotStarted, "not_started")]
    #[case(WorkoutStatus::InProgress, "in_progress")]
    #[case(WorkoutStatus::Completed, "completed")]
    fn test_workout_status_display(#[case] status: WorkoutStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
        assert_eq!(status.as_ref(), expected);
        assert_eq!(expected.parse::<WorkoutStatus>(), Ok(status));
    }

    #[test]
    fn test_workout_status_parse_unknown() {
        assert!("paused".parse::<WorkoutStatus>().is_err());
    }

    #[test]
    fn test_workout_id_nil() {
        assert!(WorkoutID::nil().is_nil());
        assert_eq!(WorkoutID::nil(), WorkoutID::default());
    }

    #[test]
    fn test_client_id_from_u128() {
        assert!(!ClientID::from(1).is_nil());
        assert_eq!(ClientID::from(0), ClientID::nil());
    }
}
