//! Dashboard controller: the idea list and every action taken on it.
//!
//! Votes are applied optimistically and rolled back when the API refuses
//! them. Periodic snapshots from the poller carry a ticket; a snapshot whose
//! fetch started before a local mutation, or before a snapshot that was
//! already applied, is discarded instead of overwriting fresher state.

use std::future::Future;

use crate::{
    api::IdeaApi,
    auth::SessionClaims,
    error::{ClientError, Result},
    models::{Idea, VoteKind, VoteRecord},
    vote::{Transition, reconcile},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub nome: String,
    pub email: String,
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.id,
            nome: claims.nome,
            email: claims.email,
        }
    }
}

/// Blocking yes/no dialog shown before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, title: &str, text: &str) -> impl Future<Output = bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTicket {
    revision: u64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Board {
    ideas: Vec<Idea>,
    loading: bool,
    current_user: Option<CurrentUser>,
    // Bumped on every local mutation.
    revision: u64,
    next_seq: u64,
    applied_seq: u64,
}

/// Copies the user's recorded votes onto the matching ideas.
pub fn merge_votes(mut ideas: Vec<Idea>, votes: &[VoteRecord]) -> Vec<Idea> {
    for idea in &mut ideas {
        if let Some(record) = votes.iter().find(|v| v.codigo_ideia == idea.codigo) {
            idea.user_vote = Some(record.tipo_vote);
        }
    }
    ideas
}

/// Fetches the idea list and the user's votes, merged.
///
/// Failing to load the votes is not fatal: the list is shown without them.
pub async fn fetch_snapshot<A: IdeaApi>(api: &A) -> Result<Vec<Idea>> {
    let ideas = api.list_ideas().await?;
    let votes = api.voted_ideas().await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch voted ideas: {e}");
        Vec::new()
    });
    Ok(merge_votes(ideas, &votes))
}

impl Board {
    pub fn new(current_user: Option<CurrentUser>) -> Self {
        Self {
            current_user,
            loading: true,
            ..Default::default()
        }
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn idea(&self, codigo: &str) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.codigo == codigo)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    /// Only the author of an idea may delete it.
    pub fn can_delete(&self, idea: &Idea) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| u.email == idea.email_usuario)
    }

    fn position(&self, codigo: &str) -> Result<usize> {
        self.ideas
            .iter()
            .position(|i| i.codigo == codigo)
            .ok_or_else(|| ClientError::UnknownIdea(codigo.to_string()))
    }

    fn mutated(&mut self) {
        self.revision += 1;
    }

    /// Tags a snapshot fetch that is about to start.
    pub fn begin_snapshot(&mut self) -> SnapshotTicket {
        self.next_seq += 1;
        SnapshotTicket {
            revision: self.revision,
            seq: self.next_seq,
        }
    }

    /// Installs a fetched snapshot unless it is stale. Returns whether it was applied.
    pub fn apply_snapshot(&mut self, ticket: SnapshotTicket, ideas: Vec<Idea>) -> bool {
        self.loading = false;
        if ticket.revision != self.revision || ticket.seq <= self.applied_seq {
            tracing::debug!(
                "Discarding stale snapshot (seq {}, revision {} vs {})",
                ticket.seq,
                ticket.revision,
                self.revision
            );
            return false;
        }
        self.applied_seq = ticket.seq;
        self.ideas = ideas;
        true
    }

    pub async fn refresh<A: IdeaApi>(&mut self, api: &A) -> Result<()> {
        let ticket = self.begin_snapshot();
        self.loading = true;
        match fetch_snapshot(api).await {
            Ok(ideas) => {
                self.apply_snapshot(ticket, ideas);
                Ok(())
            }
            Err(e) => {
                self.loading = false;
                tracing::error!("Failed to fetch ideas: {e}");
                Err(e)
            }
        }
    }

    pub async fn submit_idea<A: IdeaApi>(
        &mut self,
        api: &A,
        titulo: &str,
        descricao: &str,
    ) -> Result<()> {
        let (titulo, descricao) = (titulo.trim(), descricao.trim());
        if titulo.is_empty() || descricao.is_empty() {
            return Err(ClientError::Invalid(
                "an idea needs a title and a description".into(),
            ));
        }

        if let Err(e) = api.create_idea(titulo, descricao).await {
            tracing::error!("Failed to submit idea: {e}");
            return Err(e);
        }
        self.mutated();
        self.refresh(api).await
    }

    /// Applies the vote locally, then sends it.
    ///
    /// On failure the idea returns to the last state the server confirmed: the
    /// pre-vote state, or the retracted state when a switch lost only its cast.
    pub async fn vote<A: IdeaApi>(
        &mut self,
        api: &A,
        codigo: &str,
        kind: VoteKind,
    ) -> Result<Transition> {
        let index = self.position(codigo)?;
        let mut confirmed = self.ideas[index].clone();
        let transition = reconcile(&mut self.ideas[index], kind);
        self.mutated();

        let outcome = match transition {
            Transition::Cast(kind) => api.cast_vote(codigo, kind).await,
            Transition::Retract(_) => api.retract_vote(codigo).await,
            Transition::Switch { from, to } => match api.retract_vote(codigo).await {
                Ok(true) => {
                    reconcile(&mut confirmed, from);
                    api.cast_vote(codigo, to).await
                }
                other => other,
            },
        };

        let err = match outcome {
            Ok(true) => return Ok(transition),
            Ok(false) => ClientError::Rejected("vote"),
            Err(e) => e,
        };

        tracing::error!("Failed to vote on {codigo}: {err}");
        self.ideas[index] = confirmed;
        self.mutated();
        Err(err)
    }

    /// Posts a comment, then replaces the commented idea with the server's copy.
    pub async fn comment<A: IdeaApi>(&mut self, api: &A, codigo: &str, texto: &str) -> Result<()> {
        if self.current_user.is_none() {
            tracing::error!("Cannot comment without a logged in user");
            return Err(ClientError::NotAuthenticated);
        }
        let texto = texto.trim();
        if texto.is_empty() {
            return Err(ClientError::Invalid("comment is empty".into()));
        }
        self.position(codigo)?;

        if let Err(e) = api.comment(codigo, texto).await {
            tracing::error!("Failed to comment on {codigo}: {e}");
            return Err(e);
        }

        // The comment is saved at this point; a failed refetch only leaves the idea stale.
        let fresh = match api.list_ideas().await {
            Ok(ideas) => ideas.into_iter().find(|i| i.codigo == codigo),
            Err(e) => {
                tracing::warn!("Failed to refetch {codigo} after commenting: {e}");
                None
            }
        };

        // The idea may have been deleted meanwhile; keep what we have.
        if let (Some(mut fresh), Ok(index)) = (fresh, self.position(codigo)) {
            fresh.user_vote = self.ideas[index].user_vote;
            self.ideas[index] = fresh;
            self.mutated();
        }
        Ok(())
    }

    /// Deletes an idea after confirmation. Returns `false` when the user cancelled.
    pub async fn delete_idea<A: IdeaApi, C: Confirm>(
        &mut self,
        api: &A,
        codigo: &str,
        confirm: &mut C,
    ) -> Result<bool> {
        let index = self.position(codigo)?;
        if !self.can_delete(&self.ideas[index]) {
            return Err(ClientError::Invalid("only the author can delete an idea".into()));
        }
        if !confirm
            .confirm("Are you sure?", "You won't be able to revert this!")
            .await
        {
            return Ok(false);
        }

        match api.delete_idea(codigo).await {
            Ok(true) => {
                self.ideas.retain(|i| i.codigo != codigo);
                self.mutated();
                Ok(true)
            }
            Ok(false) => Err(ClientError::Rejected("deletion")),
            Err(e) => {
                tracing::error!("Failed to delete idea {codigo}: {e}");
                Err(e)
            }
        }
    }
}
