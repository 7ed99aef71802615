//! Plain-text rendering of announcements, notices and results.

use std::fmt::Write;

use crate::application::coordinator::Ack;
use crate::application::handlers::MyRole;
use crate::domain::catalog::RoleCatalog;
use crate::domain::foundation::{ParticipantId, RoleId, SessionId};
use crate::domain::lottery::{SessionMode, SessionProgress, SlotProgress, TerminalOutcome};
use crate::ports::{Notice, SessionAnnouncement};

/// Formats text for one catalog.
pub struct Renderer<'a> {
    catalog: &'a RoleCatalog,
}

impl<'a> Renderer<'a> {
    pub fn new(catalog: &'a RoleCatalog) -> Self {
        Self { catalog }
    }

    fn label(&self, role: &RoleId) -> String {
        self.catalog
            .get(role)
            .map(|r| r.label())
            .unwrap_or_else(|| role.to_string())
    }

    fn labels(&self, roles: &[RoleId]) -> String {
        roles.iter().map(|r| self.label(r)).collect::<Vec<_>>().join(", ")
    }

    pub fn announcement(&self, session_id: SessionId, announcement: &SessionAnnouncement) -> String {
        let mut out = String::new();
        let title = match announcement.mode {
            SessionMode::OpenLottery => "Role lottery",
            SessionMode::InstantPick => "Secret role pick",
            SessionMode::ExclusionThenLottery => "Exclude-then-draw lottery",
        };
        let _ = writeln!(out, "[{}] {} is open", session_id, title);
        let _ = writeln!(out, "  roles: {}", self.labels(&announcement.available_roles));
        if !announcement.roster.is_empty() {
            let _ = writeln!(out, "  participants: {}", names(&announcement.roster));
        }
        match announcement.mode {
            SessionMode::OpenLottery => {
                let _ = writeln!(
                    out,
                    "  pick a number 1-{} to join, then 'execute' to draw (max {} players)",
                    announcement.tokens.len(),
                    announcement.available_roles.len()
                );
            }
            SessionMode::InstantPick => {
                let _ = writeln!(
                    out,
                    "  claim a number 1-{}; your role is fixed the moment you claim it",
                    announcement.tokens.len()
                );
            }
            SessionMode::ExclusionThenLottery => {
                let keys: Vec<&str> = announcement.available_roles.iter().map(|r| r.as_str()).collect();
                let _ = writeln!(out, "  toggle roles you refuse ({}), then 'execute'", keys.join(" "));
                let _ = writeln!(out, "  no toggles means any role is fine");
            }
        }
        let _ = write!(out, "  closes in {}s", announcement.input_timeout.as_secs());
        out
    }

    pub fn notice(&self, session_id: SessionId, notice: &Notice) -> String {
        match notice {
            Notice::Joined {
                participant,
                token,
                progress,
            } => format!(
                "[{}] {} picked {} ({}/{})",
                session_id,
                participant,
                token,
                progress.joined(),
                progress.available_roles.len()
            ),
            Notice::RoleClaimed {
                participant,
                token,
                role,
                progress,
            } => {
                let mut line = format!(
                    "[{}] {} claimed {} -> {}",
                    session_id,
                    participant,
                    token,
                    self.label(role)
                );
                if let Some(tip) = self.catalog.get(role).map(|r| r.tip()) {
                    let _ = write!(line, "\n  tip: {}", tip);
                }
                if let SlotProgress::InstantPick {
                    claims,
                    total,
                    remaining_tokens,
                } = &progress.slots
                {
                    let left: Vec<String> = remaining_tokens.iter().map(ToString::to_string).collect();
                    let _ = write!(line, "\n  {}/{} claimed", claims.len(), total);
                    if !left.is_empty() {
                        let _ = write!(line, ", left: {}", left.join(" "));
                    }
                }
                line
            }
            Notice::Rejected {
                participant,
                reason,
            } => format!("[{}] {}: {}", session_id, participant, reason),
            Notice::Drawing { participants } => {
                format!("[{}] drawing roles for {} participant(s)…", session_id, participants)
            }
            Notice::Finished { outcome, progress } => self.outcome(session_id, outcome, progress),
        }
    }

    pub fn outcome(&self, session_id: SessionId, outcome: &TerminalOutcome, progress: &SessionProgress) -> String {
        match outcome {
            TerminalOutcome::Complete(assignment) => {
                let mut out = format!("[{}] roles assigned:", session_id);
                for grant in assignment.grants() {
                    let pick = match &progress.slots {
                        SlotProgress::OpenLottery { picks, .. } => picks
                            .iter()
                            .find(|p| p.participant == grant.participant)
                            .map(|p| format!(" (picked {})", p.token)),
                        _ => None,
                    };
                    let _ = write!(
                        out,
                        "\n  {}{} -> {}",
                        grant.participant,
                        pick.unwrap_or_default(),
                        self.label(&grant.role)
                    );
                }
                out
            }
            TerminalOutcome::Infeasible(infeasible) => {
                format!("[{}] could not assign roles: {}", session_id, infeasible.reason)
            }
            TerminalOutcome::TimedOut => format!("[{}] timed out", session_id),
            TerminalOutcome::Cancelled => format!("[{}] cancelled", session_id),
        }
    }

    pub fn ack(&self, ack: &Ack) -> Option<String> {
        match ack {
            Ack::AlreadyPicked => Some("you already picked; your first pick stands".to_string()),
            Ack::Exclusions { excluded, .. } if excluded.is_empty() => {
                Some("excluding nothing: any role is fine".to_string())
            }
            Ack::Exclusions { excluded, .. } => {
                let roles: Vec<RoleId> = excluded.iter().cloned().collect();
                Some(format!("excluding {}", self.labels(&roles)))
            }
            // Everything else is announced through a notice.
            _ => None,
        }
    }

    pub fn progress(&self, progress: &SessionProgress) -> String {
        let mut out = format!(
            "[{}] {} {}",
            progress.session_id, progress.mode, progress.state
        );
        if let Some(remaining) = progress.remaining {
            let _ = write!(out, ", {}s left", remaining.as_secs());
        }
        match &progress.slots {
            SlotProgress::OpenLottery { picks, capacity } => {
                let _ = write!(out, "\n  joined {}/{}", picks.len(), capacity);
                for pick in picks {
                    let _ = write!(out, "\n  {} picked {}", pick.participant, pick.token);
                }
            }
            SlotProgress::InstantPick { claims, total, .. } => {
                let _ = write!(out, "\n  claimed {}/{}", claims.len(), total);
                for claim in claims {
                    let _ = write!(out, "\n  {} -> {}", claim.participant, self.label(&claim.role));
                }
            }
            SlotProgress::ExclusionThenLottery { roster, exclusions } => {
                for member in roster {
                    let excluded: Vec<RoleId> = exclusions
                        .get(member)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default();
                    let text = if excluded.is_empty() {
                        "any role".to_string()
                    } else {
                        format!("not {}", self.labels(&excluded))
                    };
                    let _ = write!(out, "\n  {}: {}", member, text);
                }
            }
        }
        out
    }

    pub fn my_role(&self, mine: &MyRole) -> String {
        format!(
            "{}\n  {}\n  {}\n  tip: {}",
            mine.role.label(),
            mine.role.title(),
            mine.role.message(),
            mine.role.tip()
        )
    }
}

fn names(participants: &[ParticipantId]) -> String {
    participants
        .iter()
        .map(ParticipantId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::{Assignment, InfeasibilityReason, Infeasible, RoleGrant};
    use crate::domain::foundation::{ChannelId, MessageId};
    use crate::domain::lottery::SessionState;
    use std::sync::Arc;

    fn sid() -> SessionId {
        SessionId::new(ChannelId::new(1), MessageId::new(2))
    }

    fn progress() -> SessionProgress {
        SessionProgress {
            session_id: sid(),
            mode: SessionMode::ExclusionThenLottery,
            state: SessionState::Complete,
            available_roles: vec![],
            slots: SlotProgress::ExclusionThenLottery {
                roster: vec![ParticipantId::new("alice").unwrap()],
                exclusions: Default::default(),
            },
            remaining: None,
        }
    }

    #[test]
    fn completed_outcome_lists_every_grant() {
        let renderer = Renderer::new(RoleCatalog::standard());
        let assignment = Assignment::from_grants(
            vec![RoleGrant {
                participant: ParticipantId::new("alice").unwrap(),
                role: RoleId::new("mid").unwrap(),
            }],
            1,
        )
        .unwrap();
        let text = renderer.outcome(sid(), &TerminalOutcome::Complete(Arc::new(assignment)), &progress());
        assert!(text.starts_with("[1_2] roles assigned:"));
        assert!(text.contains("alice -> "));
    }

    #[test]
    fn internal_failures_stay_generic() {
        let renderer = Renderer::new(RoleCatalog::standard());
        let outcome = TerminalOutcome::Infeasible(Infeasible::immediate(InfeasibilityReason::Internal));
        let text = renderer.outcome(sid(), &outcome, &progress());
        assert_eq!(text, "[1_2] could not assign roles: could not assign");
    }

    #[test]
    fn progress_shows_exclusions_per_member() {
        let renderer = Renderer::new(RoleCatalog::standard());
        let text = renderer.progress(&progress());
        assert!(text.contains("alice: any role"));
    }
}
