//! Request bodies for ticket actions.

use serde::Deserialize;

use crate::common::{DomainError, DomainResult, UserId};
use crate::domains::tickets::models::{CommentType, TicketPriority, TicketStatus, TicketType};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketInput {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    #[serde(default)]
    pub priority: TicketPriority,
    pub category: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

impl CreateTicketInput {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("Description is required"));
        }
        Ok(())
    }
}

/// Partial edit by the creator; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditTicketInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<TicketType>,
    pub priority: Option<TicketPriority>,
    pub category: Option<String>,
}

/// Body of assign, reassign and reopen.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignInput {
    pub technician_id: UserId,
    pub reason: Option<String>,
    /// Instructions forwarded to the technician
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateInput {
    pub status: TicketStatus,
    pub reason: Option<String>,
    pub resolution_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateInput {
    pub validated: bool,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelegateInput {
    pub adjoint_id: UserId,
    pub reason: Option<String>,
    /// Forwarded to the adjoint
    pub notes: Option<String>,
}

impl DelegateInput {
    /// Reason and notes joined for the history row, falling back to `default`.
    pub fn history_reason(&self, default: impl FnOnce() -> String) -> String {
        let parts: Vec<&str> = [self.reason.as_deref(), self.notes.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() {
            default()
        } else {
            parts.join(" | ")
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackInput {
    pub score: i32,
    pub comment: Option<String>,
}

impl FeedbackInput {
    pub fn validate(&self) -> DomainResult<()> {
        if !(1..=5).contains(&self.score) {
            return Err(DomainError::validation("Score must be between 1 and 5"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub content: String,
    #[serde(rename = "type", default)]
    pub comment_type: CommentType,
}

/// Trimmed text, or `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
