use std::future::Future;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{ClientError, Result},
    models::*,
};

/// Calls the dashboard needs from the portal API.
pub trait IdeaApi {
    fn list_ideas(&self) -> impl Future<Output = Result<Vec<Idea>>> + Send;
    fn voted_ideas(&self) -> impl Future<Output = Result<Vec<VoteRecord>>> + Send;
    fn create_idea(&self, titulo: &str, descricao: &str) -> impl Future<Output = Result<()>> + Send;
    fn delete_idea(&self, codigo: &str) -> impl Future<Output = Result<bool>> + Send;
    fn cast_vote(&self, codigo: &str, kind: VoteKind) -> impl Future<Output = Result<bool>> + Send;
    fn retract_vote(&self, codigo: &str) -> impl Future<Output = Result<bool>> + Send;
    fn comment(&self, codigo: &str, texto: &str) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);
        Err(ClientError::Api { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.request(method, path).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response: LoginResponse = self
            .send_json(
                Method::POST,
                "/Usuario/login",
                &LoginRequest { email, password },
            )
            .await?;
        response.token.ok_or(ClientError::Rejected("login"))
    }

    pub async fn sign_up(&self, nome: &str, email: &str, senha: &str) -> Result<()> {
        let request = SignUpRequest { nome, email, senha };
        self.send(self.request(Method::POST, "/Usuario").json(&request))
            .await?;
        Ok(())
    }
}

impl IdeaApi for ApiClient {
    async fn list_ideas(&self) -> Result<Vec<Idea>> {
        let response: IdeasResponse = self.get_json("/Ideias").await?;
        Ok(response.ideias)
    }

    async fn voted_ideas(&self) -> Result<Vec<VoteRecord>> {
        let response: VotedIdeasResponse = self.get_json("/Usuario/ObterIdeiasVotadas").await?;
        Ok(response.ideias_votadas)
    }

    async fn create_idea(&self, titulo: &str, descricao: &str) -> Result<()> {
        let request = NewIdeaRequest { titulo, descricao };
        self.send(self.request(Method::POST, "/Ideias").json(&request))
            .await?;
        Ok(())
    }

    async fn delete_idea(&self, codigo: &str) -> Result<bool> {
        let ack: Ack = self
            .send_json(Method::DELETE, "/Ideias", &IdeaRef { codigo_ideia: codigo })
            .await?;
        Ok(ack.sucesso)
    }

    async fn cast_vote(&self, codigo: &str, kind: VoteKind) -> Result<bool> {
        let request = VoteRequest {
            codigo_ideia: codigo,
            tipo_vote: kind,
        };
        let ack: Ack = self
            .send_json(Method::POST, "/Ideias/Vote", &request)
            .await?;
        Ok(ack.sucesso)
    }

    // The API removes the caller's vote through the same DELETE route used for ideas.
    async fn retract_vote(&self, codigo: &str) -> Result<bool> {
        let ack: Ack = self
            .send_json(Method::DELETE, "/Ideias", &IdeaRef { codigo_ideia: codigo })
            .await?;
        Ok(ack.sucesso)
    }

    async fn comment(&self, codigo: &str, texto: &str) -> Result<()> {
        let request = CommentRequest {
            codigo_ideia: codigo,
            texto,
        };
        self.send(self.request(Method::POST, "/Ideias/Comentario").json(&request))
            .await?;
        Ok(())
    }
}
