//! Wire rows for the backend tables.
//!
//! Column names are the deployed schema's; conversion into core entities
//! happens here so nothing else sees them. Null numeric columns decode to 0.

use scoreboard_core::{Challenge, NewChallenge, NewPerson, Person, Role, Score};
use serde::{Deserialize, Serialize};

pub const CHALLENGES_TABLE: &str = "desafios";
pub const PEOPLE_TABLE: &str = "pessoas";
pub const SCORES_TABLE: &str = "pontuacoes";
pub const ROLES_TABLE: &str = "app_roles";

pub const CHALLENGE_COLUMNS: &str = "id,numero,nome,descricao,pontuacao_max";
pub const PERSON_COLUMNS: &str = "id,inscricao,nome";
pub const SCORE_COLUMNS: &str = "pessoa_id,desafio_id,score";
pub const SCORE_CONFLICT_KEY: &str = "pessoa_id,desafio_id";

/// Opaque id column; accepts text or integer keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeRow {
    pub id: RawId,
    pub numero: Option<i64>,
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub pontuacao_max: Option<i64>,
}

impl From<ChallengeRow> for Challenge {
    fn from(row: ChallengeRow) -> Self {
        Challenge {
            id: String::from(row.id).into(),
            display_number: row.numero.unwrap_or(0),
            name: row.nome.unwrap_or_default(),
            description: row.descricao,
            max_score: row.pontuacao_max.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonRow {
    pub id: RawId,
    pub inscricao: Option<i64>,
    pub nome: Option<String>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: String::from(row.id).into(),
            enrollment_number: row.inscricao.unwrap_or(0),
            name: row.nome.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRow {
    pub pessoa_id: RawId,
    pub desafio_id: RawId,
    pub score: Option<i64>,
}

impl From<ScoreRow> for Score {
    fn from(row: ScoreRow) -> Self {
        Score::new(
            String::from(row.pessoa_id).into(),
            String::from(row.desafio_id).into(),
            row.score.unwrap_or(0),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRow {
    pub role: Option<String>,
}

impl RoleRow {
    pub fn role(&self) -> Role {
        Role::from_column(self.role.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeInsert<'a> {
    pub numero: i64,
    pub nome: &'a str,
    pub descricao: Option<&'a str>,
    pub pontuacao_max: i64,
}

impl<'a> From<&'a NewChallenge> for ChallengeInsert<'a> {
    fn from(record: &'a NewChallenge) -> Self {
        Self {
            numero: record.display_number,
            nome: &record.name,
            descricao: record.description.as_deref(),
            pontuacao_max: record.max_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonInsert<'a> {
    pub inscricao: i64,
    pub nome: &'a str,
}

impl<'a> From<&'a NewPerson> for PersonInsert<'a> {
    fn from(record: &'a NewPerson) -> Self {
        Self {
            inscricao: record.enrollment_number,
            nome: &record.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreUpsert<'a> {
    pub pessoa_id: &'a str,
    pub desafio_id: &'a str,
    pub score: i64,
}

/// Error body shapes returned by the REST and auth endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: TokenUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenUser {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::EntityIdType;

    #[test]
    fn test_challenge_row_defaults_nulls() {
        let row: ChallengeRow = serde_json::from_str(
            r#"{"id":"c1","numero":null,"nome":"Quiz","descricao":null,"pontuacao_max":null}"#,
        )
        .unwrap();
        let challenge = Challenge::from(row);
        assert_eq!(challenge.id.as_str(), "c1");
        assert_eq!(challenge.display_number, 0);
        assert_eq!(challenge.max_score, 0);
        assert_eq!(challenge.description, None);
    }

    #[test]
    fn test_integer_ids_become_strings() {
        let row: ScoreRow =
            serde_json::from_str(r#"{"pessoa_id":7,"desafio_id":"c1","score":null}"#).unwrap();
        let score = Score::from(row);
        assert_eq!(score.person_id.as_str(), "7");
        assert_eq!(score.value, 0);
    }

    #[test]
    fn test_challenge_insert_uses_column_names() {
        let record = NewChallenge {
            display_number: 3,
            name: "Relay".to_string(),
            description: Some("team event".to_string()),
            max_score: 50,
        };
        let body = serde_json::to_value(ChallengeInsert::from(&record)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "numero": 3,
                "nome": "Relay",
                "descricao": "team event",
                "pontuacao_max": 50
            })
        );
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"Invalid login credentials","error":"invalid_grant"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_role_row() {
        let row: RoleRow = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(row.role(), Role::Admin);
        let row: RoleRow = serde_json::from_str(r#"{"role":null}"#).unwrap();
        assert_eq!(row.role(), Role::User);
    }
}
