//! Offboarding case entity and its closed value sets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// How the leaver's position gets covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanOption {
    /// Hire a replacement
    NewHire,
    /// Cover inside the team
    InternalFill,
}

impl PlanOption {
    pub const ALL: [PlanOption; 2] = [PlanOption::NewHire, PlanOption::InternalFill];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanOption::NewHire => "new_hire",
            PlanOption::InternalFill => "internal_fill",
        }
    }
}

impl FromStr for PlanOption {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanOption::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown plan option: {}", s)))
    }
}

impl fmt::Display for PlanOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case status.
///
/// Role screens set this directly; no transition table is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Manager is still drafting
    #[default]
    Created,
    /// Sent to HR and finance
    Submitted,
    HrFinanceReview,
    /// Leaver has been asked for documents
    DocsRequested,
    DocsSubmitted,
    /// Manager final review
    ManagerReview,
    Completed,
    /// Rejected or put on hold
    Rejected,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 8] = [
        CaseStatus::Created,
        CaseStatus::Submitted,
        CaseStatus::HrFinanceReview,
        CaseStatus::DocsRequested,
        CaseStatus::DocsSubmitted,
        CaseStatus::ManagerReview,
        CaseStatus::Completed,
        CaseStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Created => "created",
            CaseStatus::Submitted => "submitted",
            CaseStatus::HrFinanceReview => "hr_finance_review",
            CaseStatus::DocsRequested => "docs_requested",
            CaseStatus::DocsSubmitted => "docs_submitted",
            CaseStatus::ManagerReview => "manager_review",
            CaseStatus::Completed => "completed",
            CaseStatus::Rejected => "rejected",
        }
    }

    /// `completed` and `rejected` end the workflow. Screens may still set any status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Completed | CaseStatus::Rejected)
    }
}

impl FromStr for CaseStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown case status: {}", s)))
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which document slot an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resignation,
    Handover,
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resignation" => Ok(DocumentKind::Resignation),
            "handover" => Ok(DocumentKind::Handover),
            other => Err(AppError::validation(format!("Unknown document kind: {}", other))),
        }
    }
}

/// Offboarding case domain entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OffboardingCase {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Choi")]
    pub leaver_name: String,
    pub leaver_department: Option<String>,
    pub desired_leave_date: Option<NaiveDate>,
    pub plan_option: Option<PlanOption>,
    pub manager_id: Option<i32>,
    pub hr_owner_id: Option<i32>,
    pub finance_owner_id: Option<i32>,
    /// Remaining annual leave in days, entered by HR
    pub hr_remaining_leave: Option<f64>,
    /// Severance amount, entered by finance
    pub finance_severance: Option<f64>,
    pub hr_approved: bool,
    pub finance_approved: bool,
    pub manager_final_approved: bool,
    pub leaver_final_approved: bool,
    pub resignation_doc_url: Option<String>,
    pub handover_doc_url: Option<String>,
    pub status: CaseStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OffboardingCase {
    /// Users who should hear about changes to this case.
    pub fn stakeholder_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = [self.manager_id, self.hr_owner_id, self.finance_owner_id]
            .into_iter()
            .flatten()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn is_fully_approved(&self) -> bool {
        self.hr_approved
            && self.finance_approved
            && self.manager_final_approved
            && self.leaver_final_approved
    }
}

/// Data for a new case, filled in by the manager screen.
#[derive(Debug, Clone, Default)]
pub struct NewCase {
    pub leaver_name: String,
    pub leaver_department: Option<String>,
    pub desired_leave_date: Option<NaiveDate>,
    pub plan_option: Option<PlanOption>,
    pub manager_id: Option<i32>,
    pub hr_owner_id: Option<i32>,
    pub finance_owner_id: Option<i32>,
    pub note: Option<String>,
}

/// Partial update of a case; `None` leaves the column untouched.
///
/// Nullable columns take `Option<Option<T>>`: `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseChanges {
    pub leaver_name: Option<String>,
    pub leaver_department: Option<Option<String>>,
    pub desired_leave_date: Option<Option<NaiveDate>>,
    pub plan_option: Option<Option<PlanOption>>,
    pub hr_owner_id: Option<Option<i32>>,
    pub finance_owner_id: Option<Option<i32>>,
    pub hr_remaining_leave: Option<f64>,
    pub finance_severance: Option<f64>,
    pub hr_approved: Option<bool>,
    pub finance_approved: Option<bool>,
    pub manager_final_approved: Option<bool>,
    pub leaver_final_approved: Option<bool>,
    pub resignation_doc_url: Option<Option<String>>,
    pub handover_doc_url: Option<Option<String>>,
    pub status: Option<CaseStatus>,
    pub note: Option<Option<String>>,
}

impl CaseChanges {
    pub fn is_empty(&self) -> bool {
        *self == CaseChanges::default()
    }

    /// Set the URL slot for an uploaded document.
    pub fn with_document(mut self, kind: DocumentKind, url: String) -> Self {
        match kind {
            DocumentKind::Resignation => self.resignation_doc_url = Some(Some(url)),
            DocumentKind::Handover => self.handover_doc_url = Some(Some(url)),
        }
        self
    }
}

/// Filter for listing cases
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_contract() {
        for status in CaseStatus::ALL {
            assert_eq!(status.as_str().parse::<CaseStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("archived".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn test_plan_string_contract() {
        for plan in PlanOption::ALL {
            assert_eq!(plan.as_str().parse::<PlanOption>().unwrap(), plan);
        }
        assert!("outsource".parse::<PlanOption>().is_err());
    }

    #[test]
    fn test_new_cases_start_created() {
        assert_eq!(CaseStatus::default(), CaseStatus::Created);
    }

    #[test]
    fn test_only_completed_and_rejected_are_terminal() {
        for status in CaseStatus::ALL {
            let expected = matches!(status, CaseStatus::Completed | CaseStatus::Rejected);
            assert_eq!(status.is_terminal(), expected, "{}", status);
        }
    }

    #[test]
    fn test_changes_with_document() {
        let changes = CaseChanges::default().with_document(DocumentKind::Handover, "u".into());
        assert_eq!(changes.handover_doc_url, Some(Some("u".to_string())));
        assert!(changes.resignation_doc_url.is_none());
        assert!(!changes.is_empty());
        assert!(CaseChanges::default().is_empty());
    }

    #[test]
    fn test_document_kind_parse() {
        assert_eq!("handover".parse::<DocumentKind>().unwrap(), DocumentKind::Handover);
        assert!("contract".parse::<DocumentKind>().is_err());
    }
}
