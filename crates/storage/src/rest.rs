//! REST
//!
//! Access to the hosted backend through its PostgREST interface. Submissions are stored in the
//! `exercise_submissions` table, one row per workout, client and exercise. The performed sets
//! are kept as JSON in the `actual_sets` column.

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use spotter_domain as domain;
use uuid::Uuid;

const SUBMISSIONS: &str = "rest/v1/exercise_submissions";
const WORKOUTS: &str = "rest/v1/workouts";
const SUBMISSION_KEY: &str = "workout_id,client_id,exercise_id";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub url: String,
    pub api_key: String,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct SendError(pub String);

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, SendError>;
}

#[derive(Clone, Copy)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, SendError> {
        let builder = match request.method {
            Method::Get => gloo_net::http::Request::get(&request.url),
            Method::Post => gloo_net::http::Request::post(&request.url),
            Method::Patch => gloo_net::http::Request::patch(&request.url),
        };
        let builder = request
            .headers
            .iter()
            .fold(builder, |builder, (key, value)| builder.header(key, value));
        let request = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|err| SendError(err.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|err| SendError(err.to_string()))?;
        Ok(Response {
            status: response.status(),
            body: response
                .text()
                .await
                .map_err(|err| SendError(err.to_string()))?,
        })
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    pub config: Config,
    pub sender: S,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            sender: GlooNetSendRequest,
        }
    }
}

impl<S: SendRequest> REST<S> {
    fn request(&self, method: Method, path: &str, query: &str, body: Option<String>) -> Request {
        let url = if self.config.url.is_empty() {
            format!("{path}?{query}")
        } else {
            format!("{}/{path}?{query}", self.config.url.trim_end_matches('/'))
        };
        Request {
            method,
            url,
            headers: vec![
                ("apikey".to_string(), self.config.api_key.clone()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }

    async fn send(&self, request: Request) -> Result<Response, domain::StorageError> {
        debug!("{:?} {}", request.method, request.url);
        self.sender.send_request(request).await.map_err(|err| {
            debug!("request failed: {err}");
            domain::StorageError::NoConnection
        })
    }
}

fn check_status(response: Response) -> Result<Response, domain::StorageError> {
    match response.status {
        200..=299 => Ok(response),
        401 | 403 => Err(domain::StorageError::NoSession),
        status => Err(domain::StorageError::Other(
            format!("unexpected status {status}: {}", response.body).into(),
        )),
    }
}

impl<S: SendRequest> domain::SubmissionRepository for REST<S> {
    async fn read_submissions(
        &self,
        workout_id: domain::WorkoutID,
        client_id: domain::ClientID,
    ) -> Result<Vec<domain::PersistedSubmission>, domain::ReadError> {
        let request = self.request(
            Method::Get,
            SUBMISSIONS,
            &format!(
                "workout_id=eq.{}&client_id=eq.{}&select=*",
                *workout_id, *client_id
            ),
            None,
        );
        let response = check_status(self.send(request).await?)?;
        let rows: Vec<SubmissionRow> = serde_json::from_str(&response.body)
            .map_err(|err| domain::ReadError::Other(Box::new(err)))?;
        Ok(rows
            .into_iter()
            .map(domain::PersistedSubmission::from)
            .collect())
    }

    async fn upsert_submission(
        &self,
        workout_id: domain::WorkoutID,
        client_id: domain::ClientID,
        submission: domain::PersistedSubmission,
    ) -> Result<domain::SubmissionID, domain::UpdateError> {
        let row = SubmissionRow::new(workout_id, client_id, &submission);
        let body = serde_json::to_string(&[row])
            .map_err(|err| domain::UpdateError::Other(Box::new(err)))?;
        let mut request = self.request(
            Method::Post,
            SUBMISSIONS,
            &format!("on_conflict={SUBMISSION_KEY}"),
            Some(body),
        );
        request.headers.push((
            "Prefer".to_string(),
            "resolution=merge-duplicates,return=representation".to_string(),
        ));
        let response = self.send(request).await?;
        if response.status == 409 {
            return Err(domain::UpdateError::Conflict);
        }
        let response = check_status(response)?;
        let rows: Vec<SubmissionRow> = serde_json::from_str(&response.body)
            .map_err(|err| domain::UpdateError::Other(Box::new(err)))?;
        rows.into_iter()
            .find_map(|row| row.id)
            .map(domain::SubmissionID::from)
            .ok_or_else(|| domain::UpdateError::Other("response contains no submission".into()))
    }

    async fn write_workout_status(
        &self,
        workout_id: domain::WorkoutID,
        status: domain::WorkoutStatus,
    ) -> Result<domain::WorkoutStatus, domain::UpdateError> {
        let mut request = self.request(
            Method::Patch,
            WORKOUTS,
            &format!("id=eq.{}", *workout_id),
            Some(json!({ "status": status.as_ref() }).to_string()),
        );
        request
            .headers
            .push(("Prefer".to_string(), "return=minimal".to_string()));
        check_status(self.send(request).await?)?;
        Ok(status)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubmissionRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub workout_id: Uuid,
    pub client_id: Uuid,
    pub exercise_id: Uuid,
    #[serde(default)]
    pub actual_sets: Option<Vec<SetRow>>,
    #[serde(default)]
    pub video_uri: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SubmissionRow {
    #[must_use]
    pub fn new(
        workout_id: domain::WorkoutID,
        client_id: domain::ClientID,
        submission: &domain::PersistedSubmission,
    ) -> Self {
        Self {
            id: submission.submission_id.map(|id| *id),
            workout_id: *workout_id,
            client_id: *client_id,
            exercise_id: *submission.exercise_id,
            actual_sets: Some(submission.sets.iter().map(SetRow::from).collect()),
            video_uri: submission.video_uri.clone(),
            notes: Some(submission.notes.clone()),
        }
    }
}

impl From<SubmissionRow> for domain::PersistedSubmission {
    fn from(value: SubmissionRow) -> Self {
        Self {
            exercise_id: value.exercise_id.into(),
            sets: value
                .actual_sets
                .unwrap_or_default()
                .into_iter()
                .map(domain::PersistedSet::from)
                .collect(),
            video_uri: value.video_uri.filter(|uri| !uri.is_empty()),
            notes: value.notes.unwrap_or_default(),
            submission_id: value.id.map(domain::SubmissionID::from),
        }
    }
}

/// Values are accepted as strings or numbers, as older rows store numbers.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SetRow {
    #[serde(default, deserialize_with = "text")]
    pub reps: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub duration: Option<String>,
}

impl From<&domain::PersistedSet> for SetRow {
    fn from(value: &domain::PersistedSet) -> Self {
        Self {
            reps: value.reps.clone(),
            weight: value.weight.clone(),
            duration: value.duration.clone(),
        }
    }
}

impl From<SetRow> for domain::PersistedSet {
    fn from(value: SetRow) -> Self {
        Self {
            reps: value.reps,
            weight: value.weight,
            duration: value.duration,
        }
    }
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}
