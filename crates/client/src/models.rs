use serde::{Deserialize, Serialize};

/// Direction of a single user's vote. Encoded as `1` (up) and `2` (down) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VoteKind {
    Up,
    Down,
}

impl TryFrom<u8> for VoteKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteKind::Up),
            2 => Ok(VoteKind::Down),
            other => Err(format!("unknown vote type {other}")),
        }
    }
}

impl From<VoteKind> for u8 {
    fn from(kind: VoteKind) -> Self {
        match kind {
            VoteKind::Up => 1,
            VoteKind::Down => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub codigo_usuario: String,
    pub nome_usuario: String,
    pub email: String,
    pub comentario: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub codigo: String,
    pub titulo: String,
    pub descricao: String,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default)]
    pub comentarios: Vec<Comment>,
    #[serde(default)]
    pub user_vote: Option<VoteKind>,
    #[serde(default)]
    pub nome_usuario: String,
    #[serde(default)]
    pub email_usuario: String,
}

/// A vote the current user already cast, as held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub codigo_ideia: String,
    pub tipo_vote: VoteKind,
}

// ===== Wire envelopes =====

#[derive(Debug, Deserialize)]
pub struct IdeasResponse {
    #[serde(default)]
    pub ideias: Vec<Idea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedIdeasResponse {
    #[serde(default)]
    pub ideias_votadas: Vec<VoteRecord>,
}

#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub sucesso: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewIdeaRequest<'a> {
    pub titulo: &'a str,
    pub descricao: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRef<'a> {
    pub codigo_ideia: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest<'a> {
    pub codigo_ideia: &'a str,
    pub tipo_vote: VoteKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest<'a> {
    pub codigo_ideia: &'a str,
    pub texto: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub nome: &'a str,
    pub email: &'a str,
    pub senha: &'a str,
}
