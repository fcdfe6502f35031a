use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::{
    api::ApiClient,
    auth::{CookieJar, decode_claims},
    board::CurrentUser,
    error::{ClientError, Result},
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid e-mail pattern")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub confirm_senha: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<()> {
        if !validate_email(self.email.trim()) {
            return Err(ClientError::Invalid("please enter a valid e-mail".into()));
        }
        if self.senha != self.confirm_senha {
            return Err(ClientError::Invalid("passwords do not match".into()));
        }
        Ok(())
    }
}

/// Logs in and persists the session cookie. Returns the user the token identifies.
pub async fn login(
    api: &ApiClient,
    jar: &CookieJar,
    email: &str,
    password: &str,
) -> Result<Option<CurrentUser>> {
    let token = api.login(email.trim(), password).await?;
    jar.store_token(&token, Utc::now())?;
    tracing::info!("Logged in as {}", email.trim());
    Ok(decode_claims(&token).map(CurrentUser::from))
}

pub async fn sign_up(api: &ApiClient, form: &SignUpForm) -> Result<()> {
    form.validate()?;
    api.sign_up(form.nome.trim(), form.email.trim(), &form.senha)
        .await
}
