//! Vote-state transitions for a single idea.
//!
//! A user holds at most one vote per idea. Requesting the vote already held
//! retracts it, requesting the other direction switches it.

use crate::models::{Idea, VoteKind};

/// What a requested vote does to the user's current vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Cast(VoteKind),
    Retract(VoteKind),
    Switch { from: VoteKind, to: VoteKind },
}

impl Transition {
    pub fn new(current: Option<VoteKind>, requested: VoteKind) -> Self {
        match current {
            None => Transition::Cast(requested),
            Some(held) if held == requested => Transition::Retract(held),
            Some(held) => Transition::Switch {
                from: held,
                to: requested,
            },
        }
    }

    /// The user's vote once the transition is applied.
    pub fn resulting_vote(self) -> Option<VoteKind> {
        match self {
            Transition::Cast(kind) | Transition::Switch { to: kind, .. } => Some(kind),
            Transition::Retract(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub upvotes: u32,
    pub downvotes: u32,
}

impl Tally {
    pub fn of(idea: &Idea) -> Self {
        Self {
            upvotes: idea.upvotes,
            downvotes: idea.downvotes,
        }
    }

    fn counter(&mut self, kind: VoteKind) -> &mut u32 {
        match kind {
            VoteKind::Up => &mut self.upvotes,
            VoteKind::Down => &mut self.downvotes,
        }
    }

    // Saturating so an inconsistent server snapshot can never push a counter below zero.
    fn add(&mut self, kind: VoteKind) {
        let c = self.counter(kind);
        *c = c.saturating_add(1);
    }

    fn remove(&mut self, kind: VoteKind) {
        let c = self.counter(kind);
        *c = c.saturating_sub(1);
    }

    pub fn apply(mut self, transition: Transition) -> Self {
        match transition {
            Transition::Cast(kind) => self.add(kind),
            Transition::Retract(kind) => self.remove(kind),
            Transition::Switch { from, to } => {
                self.remove(from);
                self.add(to);
            }
        }
        self
    }
}

/// Applies `requested` to `idea` in place and returns the transition taken.
pub fn reconcile(idea: &mut Idea, requested: VoteKind) -> Transition {
    let transition = Transition::new(idea.user_vote, requested);
    let tally = Tally::of(idea).apply(transition);
    idea.upvotes = tally.upvotes;
    idea.downvotes = tally.downvotes;
    idea.user_vote = transition.resulting_vote();
    transition
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteKind::{Down, Up};

    fn idea(upvotes: u32, downvotes: u32, user_vote: Option<VoteKind>) -> Idea {
        Idea {
            codigo: "i1".into(),
            titulo: "t".into(),
            descricao: "d".into(),
            upvotes,
            downvotes,
            comentarios: vec![],
            user_vote,
            nome_usuario: "Ana".into(),
            email_usuario: "ana@example.com".into(),
        }
    }

    #[test]
    fn transition_table() {
        let cases = [
            (None, Up, (6, 4), Some(Up)),
            (None, Down, (5, 5), Some(Down)),
            (Some(Up), Up, (4, 4), None),
            (Some(Down), Down, (5, 3), None),
            (Some(Up), Down, (4, 5), Some(Down)),
            (Some(Down), Up, (6, 3), Some(Up)),
        ];

        for (current, requested, (up, down), vote) in cases {
            let mut i = idea(5, 4, current);
            reconcile(&mut i, requested);
            assert_eq!(
                (i.upvotes, i.downvotes, i.user_vote),
                (up, down, vote),
                "{current:?} -> {requested:?}"
            );
        }
    }

    #[test]
    fn upvote_toggle_then_switch() {
        let mut i = idea(0, 0, None);

        assert_eq!(reconcile(&mut i, Up), Transition::Cast(Up));
        assert_eq!((i.upvotes, i.downvotes, i.user_vote), (1, 0, Some(Up)));

        assert_eq!(reconcile(&mut i, Up), Transition::Retract(Up));
        assert_eq!((i.upvotes, i.downvotes, i.user_vote), (0, 0, None));

        reconcile(&mut i, Up);
        assert_eq!(
            reconcile(&mut i, Down),
            Transition::Switch { from: Up, to: Down }
        );
        assert_eq!((i.upvotes, i.downvotes, i.user_vote), (0, 1, Some(Down)));
    }

    #[test]
    fn counters_never_go_negative() {
        let mut i = idea(0, 0, None);
        for requested in [Up, Down, Down, Up, Up, Down, Up, Up, Down, Down] {
            reconcile(&mut i, requested);
            let held = i.user_vote.map_or(0, |_| 1);
            assert_eq!(i.upvotes + i.downvotes, held);
        }

        // Snapshot claims the user voted but the counter is already zero.
        let mut inconsistent = idea(0, 0, Some(Up));
        reconcile(&mut inconsistent, Down);
        assert_eq!((inconsistent.upvotes, inconsistent.downvotes), (0, 1));
    }
}
