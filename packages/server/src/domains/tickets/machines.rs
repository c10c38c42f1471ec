//! Ticket lifecycle rules.
//!
//! `decide` is pure: given a ticket, who is acting and what they asked for,
//! it either rejects the request or returns the `Transition` to apply. All
//! role and ownership guards live here so every entry point (HTTP, scheduler,
//! tests) shares one definition of a legal move.
//!
//! ```text
//! en_attente_analyse ──assign──► assigne_technicien ──start──► en_cours ──resolve──► resolu
//!        ▲   ▲                        │    ▲                                  │    │
//!        │   └──reject assignment─────┘    └────────reopen────────┐  validate │    │ validate ok
//!        │                                                        │   refused ▼    ▼ / close
//!        └───────────── reopen auto-closed (7 days) ◄── cloture ◄─┴──close── rejete
//! ```

use chrono::{DateTime, Duration, Utc};

use super::models::{Ticket, TicketPriority, TicketStatus};
use crate::common::auth::{Actor, Capability};
use crate::common::{DomainError, DomainResult, UserId};

/// Days during which a requester may reopen an automatically closed ticket.
pub const REOPEN_WINDOW_DAYS: i64 = 7;

/// What an actor asks to do to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    Assign { technician_id: UserId },
    Reassign { technician_id: UserId },
    Escalate,
    StartWork,
    Resolve,
    Validate {
        accepted: bool,
        rejection_reason: Option<String>,
    },
    Close,
    ReopenRejected { technician_id: UserId },
    ReopenAutoClosed,
    AcceptAssignment,
    RejectAssignment,
    DelegateToAdjoint { adjoint_id: UserId },
    Edit,
    Delete,
}

impl TicketAction {
    pub fn name(&self) -> &'static str {
        match self {
            TicketAction::Assign { .. } => "assign",
            TicketAction::Reassign { .. } => "reassign",
            TicketAction::Escalate => "escalate",
            TicketAction::StartWork => "start work on",
            TicketAction::Resolve => "resolve",
            TicketAction::Validate { .. } => "validate",
            TicketAction::Close => "close",
            TicketAction::ReopenRejected { .. } => "reopen",
            TicketAction::ReopenAutoClosed => "reopen",
            TicketAction::AcceptAssignment => "accept",
            TicketAction::RejectAssignment => "reject the assignment of",
            TicketAction::DelegateToAdjoint { .. } => "delegate",
            TicketAction::Edit => "edit",
            TicketAction::Delete => "delete",
        }
    }
}

/// Change to an optional column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T: Copy> Change<T> {
    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Change::Keep => {}
            Change::Set(value) => *slot = Some(value),
            Change::Clear => *slot = None,
        }
    }
}

/// The effect of an accepted action on a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: TicketStatus,
    pub to: TicketStatus,
    pub priority: Option<TicketPriority>,
    pub technician: Change<UserId>,
    pub secretary: Change<UserId>,
    pub assigned_at: Change<DateTime<Utc>>,
    pub resolved_at: Change<DateTime<Utc>>,
    pub closed_at: Change<DateTime<Utc>>,
    pub auto_closed_at: Change<DateTime<Utc>>,
}

impl Transition {
    fn new(from: TicketStatus, to: TicketStatus) -> Self {
        Self {
            from,
            to,
            priority: None,
            technician: Change::Keep,
            secretary: Change::Keep,
            assigned_at: Change::Keep,
            resolved_at: Change::Keep,
            closed_at: Change::Keep,
            auto_closed_at: Change::Keep,
        }
    }

    fn stay(status: TicketStatus) -> Self {
        Self::new(status, status)
    }

    fn assign(mut self, technician_id: UserId, secretary_id: UserId, now: DateTime<Utc>) -> Self {
        self.technician = Change::Set(technician_id);
        self.secretary = Change::Set(secretary_id);
        self.assigned_at = Change::Set(now);
        self
    }

    fn unassign(mut self) -> Self {
        self.technician = Change::Clear;
        self.assigned_at = Change::Clear;
        self
    }

    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}

impl Ticket {
    pub fn apply(&mut self, transition: &Transition) {
        self.status = transition.to;
        if let Some(priority) = transition.priority {
            self.priority = priority;
        }
        transition.technician.apply_to(&mut self.technician_id);
        transition.secretary.apply_to(&mut self.secretary_id);
        transition.assigned_at.apply_to(&mut self.assigned_at);
        transition.resolved_at.apply_to(&mut self.resolved_at);
        transition.closed_at.apply_to(&mut self.closed_at);
        transition.auto_closed_at.apply_to(&mut self.auto_closed_at);
    }
}

/// Decide whether `actor` may perform `action` on `ticket` right now.
pub fn decide(
    ticket: &Ticket,
    actor: &Actor,
    action: &TicketAction,
    now: DateTime<Utc>,
) -> DomainResult<Transition> {
    use TicketStatus::*;

    let status = ticket.status;
    let allow_from = |states: &[TicketStatus]| -> DomainResult<()> {
        if states.contains(&status) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action: action.name(),
                status: status.as_str(),
            })
        }
    };

    match action {
        TicketAction::Assign { technician_id } => {
            actor.can(Capability::AssignTickets).check()?;
            allow_from(&[EnAttenteAnalyse])?;
            Ok(Transition::new(status, AssigneTechnicien).assign(*technician_id, actor.id, now))
        }

        TicketAction::Reassign { technician_id } => {
            actor.can(Capability::AssignTickets).check()?;
            let current = ticket.technician_id.ok_or_else(|| {
                DomainError::validation("Ticket is not assigned yet, assign it first")
            })?;
            if current == *technician_id {
                return Err(DomainError::validation(
                    "Ticket is already assigned to this technician",
                ));
            }
            allow_from(&[EnAttenteAnalyse, AssigneTechnicien, EnCours])?;
            let to = if status == EnAttenteAnalyse {
                AssigneTechnicien
            } else {
                status
            };
            Ok(Transition::new(status, to).assign(*technician_id, actor.id, now))
        }

        TicketAction::Escalate => {
            actor.can(Capability::EscalateTickets).check()?;
            let next = ticket.priority.escalated().ok_or_else(|| {
                DomainError::validation("Ticket already has the highest priority")
            })?;
            let mut transition = Transition::stay(status);
            transition.priority = Some(next);
            Ok(transition)
        }

        TicketAction::StartWork => {
            require_technician(ticket, actor, "Only the assigned technician can start this ticket")?;
            allow_from(&[AssigneTechnicien])?;
            Ok(Transition::new(status, EnCours))
        }

        TicketAction::Resolve => {
            require_technician(ticket, actor, "Only the assigned technician can resolve this ticket")?;
            allow_from(&[EnCours])?;
            let mut transition = Transition::new(status, Resolu);
            transition.resolved_at = Change::Set(now);
            Ok(transition)
        }

        TicketAction::Validate {
            accepted,
            rejection_reason,
        } => {
            require_creator(ticket, actor, "Only the ticket creator can validate its resolution")?;
            allow_from(&[Resolu])?;
            if *accepted {
                let mut transition = Transition::new(status, Cloture);
                transition.closed_at = Change::Set(now);
                Ok(transition)
            } else if rejection_reason
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
            {
                Err(DomainError::validation("A rejection reason is required"))
            } else {
                Ok(Transition::new(status, Rejete))
            }
        }

        TicketAction::Close => {
            actor
                .can(Capability::CloseTickets)
                .check()
                .map_err(|_| DomainError::forbidden("Only agents can close tickets"))?;
            allow_from(&[Resolu, Rejete])?;
            let mut transition = Transition::new(status, Cloture);
            transition.closed_at = Change::Set(now);
            Ok(transition)
        }

        TicketAction::ReopenRejected { technician_id } => {
            actor.can(Capability::ReopenTickets).check()?;
            allow_from(&[Rejete])?;
            let mut transition =
                Transition::new(status, AssigneTechnicien).assign(*technician_id, actor.id, now);
            transition.resolved_at = Change::Clear;
            Ok(transition)
        }

        TicketAction::ReopenAutoClosed => {
            require_creator(ticket, actor, "Only the ticket creator can reopen it")?;
            let auto_closed_at = ticket.auto_closed_at.ok_or_else(|| {
                DomainError::validation("Only automatically closed tickets can be reopened")
            })?;
            allow_from(&[Cloture])?;
            if now - auto_closed_at > Duration::days(REOPEN_WINDOW_DAYS) {
                return Err(DomainError::validation(format!(
                    "Reopening window expired ({} days after automatic closure)",
                    REOPEN_WINDOW_DAYS
                )));
            }
            let mut transition = Transition::new(status, EnAttenteAnalyse).unassign();
            transition.resolved_at = Change::Clear;
            transition.closed_at = Change::Clear;
            transition.auto_closed_at = Change::Clear;
            Ok(transition)
        }

        TicketAction::AcceptAssignment => {
            require_technician(ticket, actor, "This ticket is not assigned to you")?;
            allow_from(&[AssigneTechnicien])?;
            Ok(Transition::stay(status))
        }

        TicketAction::RejectAssignment => {
            require_technician(ticket, actor, "This ticket is not assigned to you")?;
            allow_from(&[AssigneTechnicien])?;
            Ok(Transition::new(status, EnAttenteAnalyse).unassign())
        }

        TicketAction::DelegateToAdjoint { adjoint_id } => {
            actor.can(Capability::DelegateToAdjoint).check()?;
            allow_from(&[EnAttenteAnalyse, AssigneTechnicien, EnCours])?;
            let mut transition = Transition::new(status, EnAttenteAnalyse).unassign();
            transition.secretary = Change::Set(*adjoint_id);
            Ok(transition)
        }

        TicketAction::Edit | TicketAction::Delete => {
            require_creator(ticket, actor, "Access denied")?;
            if ticket.technician_id.is_some() || status != EnAttenteAnalyse {
                return Err(DomainError::forbidden(
                    "Ticket is already being processed and can no longer be modified",
                ));
            }
            Ok(Transition::stay(status))
        }
    }
}

/// Automatic closure of a resolved ticket nobody validated.
pub fn decide_auto_close(ticket: &Ticket, now: DateTime<Utc>) -> DomainResult<Transition> {
    if ticket.status != TicketStatus::Resolu {
        return Err(DomainError::InvalidTransition {
            action: "auto-close",
            status: ticket.status.as_str(),
        });
    }
    let mut transition = Transition::new(ticket.status, TicketStatus::Cloture);
    transition.closed_at = Change::Set(now);
    transition.auto_closed_at = Change::Set(now);
    Ok(transition)
}

fn require_creator(ticket: &Ticket, actor: &Actor, message: &str) -> DomainResult<()> {
    if ticket.is_creator(actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(message))
    }
}

fn require_technician(ticket: &Ticket, actor: &Actor, message: &str) -> DomainResult<()> {
    if ticket.is_assigned_to(actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::auth::Role;
    use crate::common::TicketId;
    use crate::domains::tickets::models::TicketType;
    use TicketStatus::*;

    struct Cast {
        requester: Actor,
        secretary: Actor,
        adjoint: Actor,
        dsi: Actor,
        technician: Actor,
        other_technician: Actor,
    }

    fn cast() -> Cast {
        Cast {
            requester: Actor::new(UserId::new(), Role::Utilisateur),
            secretary: Actor::new(UserId::new(), Role::SecretaireDsi),
            adjoint: Actor::new(UserId::new(), Role::AdjointDsi),
            dsi: Actor::new(UserId::new(), Role::Dsi),
            technician: Actor::new(UserId::new(), Role::Technicien),
            other_technician: Actor::new(UserId::new(), Role::Technicien),
        }
    }

    fn ticket(cast: &Cast, status: TicketStatus) -> Ticket {
        let assigned = !matches!(status, EnAttenteAnalyse);
        Ticket {
            id: TicketId::new(),
            number: 1,
            title: "Imprimante HS".to_string(),
            description: "Plus rien ne sort".to_string(),
            ticket_type: TicketType::Materiel,
            priority: TicketPriority::Moyenne,
            status,
            category: None,
            creator_id: cast.requester.id,
            technician_id: assigned.then_some(cast.technician.id),
            secretary_id: assigned.then_some(cast.secretary.id),
            user_agency: None,
            attachments: None,
            created_at: Utc::now(),
            assigned_at: None,
            resolved_at: None,
            closed_at: None,
            auto_closed_at: None,
            feedback_score: None,
            feedback_comment: None,
        }
    }

    fn assert_invalid(result: DomainResult<Transition>) {
        assert!(
            matches!(result, Err(DomainError::InvalidTransition { .. })),
            "expected invalid transition, got {:?}",
            result
        );
    }

    fn assert_forbidden(result: DomainResult<Transition>) {
        assert!(
            matches!(result, Err(DomainError::Forbidden(_))),
            "expected forbidden, got {:?}",
            result
        );
    }

    fn assert_validation(result: DomainResult<Transition>) {
        assert!(
            matches!(result, Err(DomainError::Validation(_))),
            "expected validation error, got {:?}",
            result
        );
    }

    #[test]
    fn assign_moves_pending_ticket_to_technician() {
        let c = cast();
        let t = ticket(&c, EnAttenteAnalyse);
        let now = Utc::now();
        let transition = decide(
            &t,
            &c.secretary,
            &TicketAction::Assign {
                technician_id: c.technician.id,
            },
            now,
        )
        .unwrap();

        assert_eq!(transition.to, AssigneTechnicien);
        assert_eq!(transition.technician, Change::Set(c.technician.id));
        assert_eq!(transition.secretary, Change::Set(c.secretary.id));
        assert_eq!(transition.assigned_at, Change::Set(now));
    }

    #[test]
    fn requester_and_technician_cannot_assign() {
        let c = cast();
        let t = ticket(&c, EnAttenteAnalyse);
        let action = TicketAction::Assign {
            technician_id: c.technician.id,
        };
        assert_forbidden(decide(&t, &c.requester, &action, Utc::now()));
        assert_forbidden(decide(&t, &c.technician, &action, Utc::now()));
    }

    #[test]
    fn assign_is_only_legal_from_pending() {
        let c = cast();
        for status in [AssigneTechnicien, EnCours, Resolu, Rejete, Cloture] {
            let t = ticket(&c, status);
            assert_invalid(decide(
                &t,
                &c.dsi,
                &TicketAction::Assign {
                    technician_id: c.other_technician.id,
                },
                Utc::now(),
            ));
        }
    }

    #[test]
    fn reassign_keeps_in_progress_status() {
        let c = cast();
        let t = ticket(&c, EnCours);
        let transition = decide(
            &t,
            &c.adjoint,
            &TicketAction::Reassign {
                technician_id: c.other_technician.id,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(transition.to, EnCours);
        assert!(!transition.changes_status());
        assert_eq!(transition.technician, Change::Set(c.other_technician.id));
    }

    #[test]
    fn reassign_requires_a_different_existing_assignment() {
        let c = cast();
        let unassigned = ticket(&c, EnAttenteAnalyse);
        assert_validation(decide(
            &unassigned,
            &c.secretary,
            &TicketAction::Reassign {
                technician_id: c.technician.id,
            },
            Utc::now(),
        ));

        let assigned = ticket(&c, AssigneTechnicien);
        assert_validation(decide(
            &assigned,
            &c.secretary,
            &TicketAction::Reassign {
                technician_id: c.technician.id,
            },
            Utc::now(),
        ));
    }

    #[test]
    fn escalate_bumps_priority_until_critical() {
        let c = cast();
        let mut t = ticket(&c, EnCours);
        let transition = decide(&t, &c.adjoint, &TicketAction::Escalate, Utc::now()).unwrap();
        assert_eq!(transition.priority, Some(TicketPriority::Haute));
        assert!(!transition.changes_status());

        t.priority = TicketPriority::Critique;
        assert_validation(decide(&t, &c.dsi, &TicketAction::Escalate, Utc::now()));
    }

    #[test]
    fn secretary_cannot_escalate() {
        let c = cast();
        let t = ticket(&c, EnCours);
        assert_forbidden(decide(&t, &c.secretary, &TicketAction::Escalate, Utc::now()));
    }

    #[test]
    fn only_assigned_technician_starts_and_resolves() {
        let c = cast();
        let t = ticket(&c, AssigneTechnicien);
        assert_forbidden(decide(&t, &c.other_technician, &TicketAction::StartWork, Utc::now()));
        assert_forbidden(decide(&t, &c.dsi, &TicketAction::StartWork, Utc::now()));
        let started = decide(&t, &c.technician, &TicketAction::StartWork, Utc::now()).unwrap();
        assert_eq!(started.to, EnCours);

        let t = ticket(&c, EnCours);
        assert_forbidden(decide(&t, &c.other_technician, &TicketAction::Resolve, Utc::now()));
        let now = Utc::now();
        let resolved = decide(&t, &c.technician, &TicketAction::Resolve, now).unwrap();
        assert_eq!(resolved.to, Resolu);
        assert_eq!(resolved.resolved_at, Change::Set(now));
    }

    #[test]
    fn resolve_requires_work_in_progress() {
        let c = cast();
        let t = ticket(&c, AssigneTechnicien);
        assert_invalid(decide(&t, &c.technician, &TicketAction::Resolve, Utc::now()));
    }

    #[test]
    fn validation_closes_or_rejects() {
        let c = cast();
        let t = ticket(&c, Resolu);

        let accepted = decide(
            &t,
            &c.requester,
            &TicketAction::Validate {
                accepted: true,
                rejection_reason: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(accepted.to, Cloture);
        assert!(matches!(accepted.closed_at, Change::Set(_)));

        let rejected = decide(
            &t,
            &c.requester,
            &TicketAction::Validate {
                accepted: false,
                rejection_reason: Some("Toujours en panne".to_string()),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rejected.to, Rejete);
    }

    #[test]
    fn rejecting_a_resolution_needs_a_reason() {
        let c = cast();
        let t = ticket(&c, Resolu);
        for reason in [None, Some("   ".to_string())] {
            assert_validation(decide(
                &t,
                &c.requester,
                &TicketAction::Validate {
                    accepted: false,
                    rejection_reason: reason,
                },
                Utc::now(),
            ));
        }
    }

    #[test]
    fn only_creator_validates_a_resolved_ticket() {
        let c = cast();
        let action = TicketAction::Validate {
            accepted: true,
            rejection_reason: None,
        };
        assert_forbidden(decide(&ticket(&c, Resolu), &c.dsi, &action, Utc::now()));
        assert_invalid(decide(&ticket(&c, EnCours), &c.requester, &action, Utc::now()));
    }

    #[test]
    fn closing_requires_an_agent_and_a_finished_ticket() {
        let c = cast();
        let resolved = ticket(&c, Resolu);
        assert_forbidden(decide(&resolved, &c.technician, &TicketAction::Close, Utc::now()));
        assert_forbidden(decide(&resolved, &c.requester, &TicketAction::Close, Utc::now()));
        assert_eq!(
            decide(&resolved, &c.secretary, &TicketAction::Close, Utc::now())
                .unwrap()
                .to,
            Cloture
        );
        assert_eq!(
            decide(&ticket(&c, Rejete), &c.dsi, &TicketAction::Close, Utc::now())
                .unwrap()
                .to,
            Cloture
        );
        assert_invalid(decide(&ticket(&c, EnCours), &c.dsi, &TicketAction::Close, Utc::now()));
    }

    #[test]
    fn rejected_ticket_reopens_to_a_technician() {
        let c = cast();
        let t = ticket(&c, Rejete);
        let transition = decide(
            &t,
            &c.adjoint,
            &TicketAction::ReopenRejected {
                technician_id: c.other_technician.id,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(transition.to, AssigneTechnicien);
        assert_eq!(transition.resolved_at, Change::Clear);

        assert_invalid(decide(
            &ticket(&c, Resolu),
            &c.adjoint,
            &TicketAction::ReopenRejected {
                technician_id: c.technician.id,
            },
            Utc::now(),
        ));
    }

    #[test]
    fn auto_closed_ticket_reopens_within_window() {
        let c = cast();
        let now = Utc::now();
        let mut t = ticket(&c, Cloture);
        t.auto_closed_at = Some(now - Duration::days(6));

        let transition = decide(&t, &c.requester, &TicketAction::ReopenAutoClosed, now).unwrap();
        assert_eq!(transition.to, EnAttenteAnalyse);
        assert_eq!(transition.technician, Change::Clear);
        assert_eq!(transition.auto_closed_at, Change::Clear);

        t.apply(&transition);
        assert_eq!(t.technician_id, None);
        assert_eq!(t.auto_closed_at, None);
        assert_eq!(t.closed_at, None);
    }

    #[test]
    fn auto_closed_reopen_fails_after_seven_days() {
        let c = cast();
        let now = Utc::now();
        let mut t = ticket(&c, Cloture);
        t.auto_closed_at = Some(now - Duration::days(REOPEN_WINDOW_DAYS) - Duration::minutes(1));
        assert_validation(decide(&t, &c.requester, &TicketAction::ReopenAutoClosed, now));
    }

    #[test]
    fn manually_closed_ticket_cannot_be_reopened_by_user() {
        let c = cast();
        let t = ticket(&c, Cloture);
        assert_validation(decide(&t, &c.requester, &TicketAction::ReopenAutoClosed, Utc::now()));
    }

    #[test]
    fn assignment_can_be_accepted_or_refused_once() {
        let c = cast();
        let t = ticket(&c, AssigneTechnicien);
        let accepted = decide(&t, &c.technician, &TicketAction::AcceptAssignment, Utc::now()).unwrap();
        assert!(!accepted.changes_status());

        let refused = decide(&t, &c.technician, &TicketAction::RejectAssignment, Utc::now()).unwrap();
        assert_eq!(refused.to, EnAttenteAnalyse);
        assert_eq!(refused.technician, Change::Clear);

        assert_forbidden(decide(&t, &c.other_technician, &TicketAction::AcceptAssignment, Utc::now()));
        assert_invalid(decide(
            &ticket(&c, EnCours),
            &c.technician,
            &TicketAction::RejectAssignment,
            Utc::now(),
        ));
    }

    #[test]
    fn delegation_is_for_dsi_only() {
        let c = cast();
        let t = ticket(&c, AssigneTechnicien);
        let action = TicketAction::DelegateToAdjoint {
            adjoint_id: c.adjoint.id,
        };
        assert_forbidden(decide(&t, &c.adjoint, &action, Utc::now()));

        let transition = decide(&t, &c.dsi, &action, Utc::now()).unwrap();
        assert_eq!(transition.to, EnAttenteAnalyse);
        assert_eq!(transition.secretary, Change::Set(c.adjoint.id));
        assert_eq!(transition.technician, Change::Clear);

        assert_invalid(decide(&ticket(&c, Cloture), &c.dsi, &action, Utc::now()));
    }

    #[test]
    fn edits_are_locked_once_processing_starts() {
        let c = cast();
        let pending = ticket(&c, EnAttenteAnalyse);
        assert!(decide(&pending, &c.requester, &TicketAction::Edit, Utc::now()).is_ok());
        assert_forbidden(decide(&pending, &c.dsi, &TicketAction::Delete, Utc::now()));

        let mut assigned_but_pending = ticket(&c, EnAttenteAnalyse);
        assigned_but_pending.technician_id = Some(c.technician.id);
        assert_forbidden(decide(&assigned_but_pending, &c.requester, &TicketAction::Edit, Utc::now()));
        assert_forbidden(decide(&ticket(&c, EnCours), &c.requester, &TicketAction::Delete, Utc::now()));
    }

    #[test]
    fn auto_close_only_applies_to_resolved_tickets() {
        let c = cast();
        let now = Utc::now();
        let transition = decide_auto_close(&ticket(&c, Resolu), now).unwrap();
        assert_eq!(transition.to, Cloture);
        assert_eq!(transition.auto_closed_at, Change::Set(now));
        assert_invalid(decide_auto_close(&ticket(&c, Rejete), now));
    }

    /// Walk every (status, action) pair an all-powerful cast could attempt and
    /// check that each accepted move lands on a listed edge.
    #[test]
    fn accepted_moves_stay_on_the_lifecycle_graph() {
        let legal: &[(TicketStatus, TicketStatus)] = &[
            (EnAttenteAnalyse, AssigneTechnicien),
            (AssigneTechnicien, EnCours),
            (EnCours, Resolu),
            (Resolu, Cloture),
            (Resolu, Rejete),
            (Rejete, Cloture),
            (Rejete, AssigneTechnicien),
            (Cloture, EnAttenteAnalyse),
            (AssigneTechnicien, EnAttenteAnalyse),
            (EnCours, EnAttenteAnalyse),
        ];
        let c = cast();
        let now = Utc::now();
        let actions = [
            TicketAction::Assign { technician_id: c.other_technician.id },
            TicketAction::Reassign { technician_id: c.other_technician.id },
            TicketAction::Escalate,
            TicketAction::StartWork,
            TicketAction::Resolve,
            TicketAction::Validate { accepted: true, rejection_reason: None },
            TicketAction::Validate { accepted: false, rejection_reason: Some("non".into()) },
            TicketAction::Close,
            TicketAction::ReopenRejected { technician_id: c.other_technician.id },
            TicketAction::ReopenAutoClosed,
            TicketAction::AcceptAssignment,
            TicketAction::RejectAssignment,
            TicketAction::DelegateToAdjoint { adjoint_id: c.adjoint.id },
            TicketAction::Edit,
            TicketAction::Delete,
        ];
        let actors = [c.requester, c.secretary, c.adjoint, c.dsi, c.technician];

        for status in [EnAttenteAnalyse, AssigneTechnicien, EnCours, Resolu, Rejete, Cloture] {
            let mut t = ticket(&c, status);
            t.auto_closed_at = Some(now - Duration::days(1));
            for action in &actions {
                for actor in &actors {
                    if let Ok(transition) = decide(&t, actor, action, now) {
                        assert_eq!(transition.from, status);
                        if transition.changes_status() {
                            assert!(
                                legal.contains(&(transition.from, transition.to)),
                                "{:?} by {} moved {} -> {}",
                                action,
                                actor.role,
                                transition.from,
                                transition.to
                            );
                        }
                    }
                }
            }
        }
    }
}
