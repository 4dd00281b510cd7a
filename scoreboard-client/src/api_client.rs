//! REST backend for a PostgREST/GoTrue style service.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::rows::{
    ChallengeInsert, ChallengeRow, ErrorBody, PersonInsert, PersonRow, RoleRow, ScoreRow,
    ScoreUpsert, TokenResponse, CHALLENGES_TABLE, CHALLENGE_COLUMNS, PEOPLE_TABLE,
    PERSON_COLUMNS, ROLES_TABLE, SCORES_TABLE, SCORE_COLUMNS, SCORE_CONFLICT_KEY,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use scoreboard_core::{
    BackendError, BackendResult, Challenge, ChallengeId, EntityIdType, NewChallenge, NewPerson,
    Person, PersonId, Role, Score,
};
use scoreboard_storage::{Backend, BackendOp, LoadedEntities};
use serde::de::DeserializeOwned;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

#[derive(Debug, Clone)]
struct AuthSession {
    access_token: String,
    user_id: String,
}

/// Backend client speaking the service's REST and auth endpoints.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: HeaderValue,
    timeout_ms: u64,
    session: RwLock<Option<AuthSession>>,
}

impl RestBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let anon_key = HeaderValue::from_str(config.anon_key.trim()).map_err(|e| {
            crate::config::ConfigError::InvalidValue {
                field: "anon_key",
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            client,
            base_url: config.backend_url.trim().trim_end_matches('/').to_string(),
            anon_key,
            timeout_ms: config.request_timeout_ms,
            session: RwLock::new(None),
        })
    }

    fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session(&self, session: Option<AuthSession>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    /// Password sign-in. Keeps the access token for later calls.
    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<()> {
        let op = "sign in";
        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key.clone())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| self.transport_error(op, e))?;
        let token: TokenResponse = self.parse_json(op, response).await?;
        tracing::info!(user = %token.user.id, "signed in");
        self.set_session(Some(AuthSession {
            access_token: token.access_token,
            user_id: token.user.id,
        }));
        Ok(())
    }

    /// Revoke the access token. The local session is dropped either way.
    pub async fn sign_out(&self) -> BackendResult<()> {
        let op = "sign out";
        let headers = self.auth_headers()?;
        self.set_session(None);
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.transport_error(op, e))?;
        expect_success(op, response).await
    }

    fn auth_headers(&self) -> BackendResult<HeaderMap> {
        let session = self.session().ok_or(BackendError::NotSignedIn)?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), self.anon_key.clone());
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|e| BackendError::Transport {
                operation: "authorize".to_string(),
                message: e.to_string(),
            })?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                operation: operation.to_string(),
                after_ms: self.timeout_ms,
            }
        } else {
            BackendError::Transport {
                operation: operation.to_string(),
                message: err.to_string(),
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> BackendResult<T> {
        if !response.status().is_success() {
            return Err(rejection(operation, response).await);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        op: BackendOp,
        table: &str,
        query: &[(&str, String)],
    ) -> BackendResult<Vec<T>> {
        let op = op.to_string();
        let response = self
            .client
            .get(self.table_url(table))
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(&op, e))?;
        self.parse_json(&op, response).await
    }

    async fn insert<B, T>(&self, op: BackendOp, table: &str, body: &B) -> BackendResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let op = op.to_string();
        let response = self
            .client
            .post(self.table_url(table))
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(&[body])
            .send()
            .await
            .map_err(|e| self.transport_error(&op, e))?;
        let mut rows: Vec<T> = self.parse_json(&op, response).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode {
                operation: op,
                message: "no row returned".to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete_where(
        &self,
        op: BackendOp,
        table: &str,
        column: &str,
        value: &str,
    ) -> BackendResult<()> {
        let op = op.to_string();
        let response = self
            .client
            .delete(self.table_url(table))
            .headers(self.auth_headers()?)
            .query(&[(column, format!("eq.{value}"))])
            .send()
            .await
            .map_err(|e| self.transport_error(&op, e))?;
        expect_success(&op, response).await
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn load_all(&self) -> BackendResult<LoadedEntities> {
        let challenge_query = [
            ("select", CHALLENGE_COLUMNS.to_string()),
            ("order", "numero.asc".to_string()),
        ];
        let person_query = [
            ("select", PERSON_COLUMNS.to_string()),
            ("order", "inscricao.asc".to_string()),
        ];
        let score_query = [("select", SCORE_COLUMNS.to_string())];

        let (challenges, people, scores) = tokio::try_join!(
            self.select::<ChallengeRow>(BackendOp::LoadAll, CHALLENGES_TABLE, &challenge_query),
            self.select::<PersonRow>(BackendOp::LoadAll, PEOPLE_TABLE, &person_query),
            self.select::<ScoreRow>(BackendOp::LoadAll, SCORES_TABLE, &score_query),
        )?;
        tracing::debug!(
            challenges = challenges.len(),
            people = people.len(),
            scores = scores.len(),
            "loaded tables"
        );

        Ok(LoadedEntities {
            challenges: challenges.into_iter().map(Challenge::from).collect(),
            people: people.into_iter().map(Person::from).collect(),
            scores: scores.into_iter().map(Score::from).collect(),
        })
    }

    async fn insert_challenge(&self, record: &NewChallenge) -> BackendResult<Challenge> {
        let row: ChallengeRow = self
            .insert(
                BackendOp::InsertChallenge,
                CHALLENGES_TABLE,
                &ChallengeInsert::from(record),
            )
            .await?;
        Ok(row.into())
    }

    async fn insert_person(&self, record: &NewPerson) -> BackendResult<Person> {
        let row: PersonRow = self
            .insert(BackendOp::InsertPerson, PEOPLE_TABLE, &PersonInsert::from(record))
            .await?;
        Ok(row.into())
    }

    async fn delete_challenge(&self, id: &ChallengeId) -> BackendResult<()> {
        self.delete_where(BackendOp::DeleteChallenge, SCORES_TABLE, "desafio_id", id.as_str())
            .await?;
        self.delete_where(BackendOp::DeleteChallenge, CHALLENGES_TABLE, "id", id.as_str())
            .await
    }

    async fn delete_person(&self, id: &PersonId) -> BackendResult<()> {
        self.delete_where(BackendOp::DeletePerson, PEOPLE_TABLE, "id", id.as_str())
            .await
    }

    async fn upsert_score(
        &self,
        person_id: &PersonId,
        challenge_id: &ChallengeId,
        value: i64,
    ) -> BackendResult<()> {
        let op = BackendOp::UpsertScore.to_string();
        let body = [ScoreUpsert {
            pessoa_id: person_id.as_str(),
            desafio_id: challenge_id.as_str(),
            score: value,
        }];
        let response = self
            .client
            .post(self.table_url(SCORES_TABLE))
            .headers(self.auth_headers()?)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", SCORE_CONFLICT_KEY)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&op, e))?;
        expect_success(&op, response).await
    }

    async fn current_user_role(&self) -> BackendResult<Role> {
        let user_id = self.session().ok_or(BackendError::NotSignedIn)?.user_id;
        let query = [
            ("select", "role".to_string()),
            ("user_id", format!("eq.{user_id}")),
        ];
        let rows: Vec<RoleRow> = self
            .select(BackendOp::CurrentUserRole, ROLES_TABLE, &query)
            .await?;
        Ok(rows.first().map(RoleRow::role).unwrap_or_default())
    }
}

async fn rejection(operation: &str, response: reqwest::Response) -> BackendError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), text));
    BackendError::rejected(operation, message)
}

async fn expect_success(operation: &str, response: reqwest::Response) -> BackendResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(rejection(operation, response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, LoggingConfig};

    fn config() -> ClientConfig {
        ClientConfig {
            backend_url: "https://project.example.co/".to_string(),
            anon_key: "anon".to_string(),
            request_timeout_ms: 1000,
            auth: AuthConfig {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            },
            logging: LoggingConfig {
                filter: "info".to_string(),
                json: false,
            },
        }
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let backend = RestBackend::new(&config()).unwrap();
        assert_eq!(
            backend.table_url("desafios"),
            "https://project.example.co/rest/v1/desafios"
        );
    }

    #[tokio::test]
    async fn test_client_timeout_reports_configured_value() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut config = config();
        config.backend_url = format!("http://{addr}");
        config.request_timeout_ms = 100;
        let backend = RestBackend::new(&config).unwrap();

        let err = backend.sign_in("admin@example.com", "secret").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Timeout {
                operation: "sign in".to_string(),
                after_ms: 100,
            }
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_calls_require_sign_in() {
        let backend = RestBackend::new(&config()).unwrap();
        assert!(!backend.is_signed_in());
        let err = backend.load_all().await.unwrap_err();
        assert_eq!(err, BackendError::NotSignedIn);
        let err = backend.current_user_role().await.unwrap_err();
        assert_eq!(err, BackendError::NotSignedIn);
    }
}
