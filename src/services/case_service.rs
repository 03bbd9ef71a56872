//! Case service - Role screens over offboarding cases.
//!
//! Each screen is gated by role and may only touch its own fields. Status is
//! set directly by the screens; no transition table is enforced and the last
//! write wins. A status change notifies every linked stakeholder inline.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, MAX_DOCUMENT_BYTES};
use crate::domain::{
    CaseChanges, CaseFilter, DocumentKind, NewCase, OffboardingCase, Role, SessionUser,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ChatNotifier, DocumentStore, DriveFile, UnitOfWork, NO_CREDENTIALS};
use crate::types::PaginationParams;

/// A role screen that writes case rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseScreen {
    Create,
    Manager,
    Hr,
    Finance,
    Leaver,
    Documents,
}

impl CaseScreen {
    /// Roles that may use the screen (admins always may).
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            CaseScreen::Create | CaseScreen::Manager => &[Role::Manager],
            CaseScreen::Hr => &[Role::Hr],
            CaseScreen::Finance => &[Role::Finance],
            CaseScreen::Leaver => &[Role::Leaver],
            CaseScreen::Documents => &[Role::Leaver, Role::Manager, Role::Hr],
        }
    }

    pub fn authorize(&self, actor: &SessionUser) -> AppResult<()> {
        if actor.role.is_any_of(self.allowed_roles()) {
            Ok(())
        } else {
            tracing::info!(user_id = actor.id, role = %actor.role, screen = ?self, "screen denied");
            Err(AppError::Forbidden)
        }
    }

    /// True when `changes` only touches fields this screen owns.
    pub fn owns(&self, changes: &CaseChanges) -> bool {
        let CaseChanges {
            leaver_name,
            leaver_department,
            desired_leave_date,
            plan_option,
            hr_owner_id,
            finance_owner_id,
            hr_remaining_leave,
            finance_severance,
            hr_approved,
            finance_approved,
            manager_final_approved,
            leaver_final_approved,
            resignation_doc_url,
            handover_doc_url,
            status,
            note,
        } = changes;

        let case_details = leaver_name.is_some()
            || leaver_department.is_some()
            || desired_leave_date.is_some()
            || plan_option.is_some()
            || hr_owner_id.is_some()
            || finance_owner_id.is_some();
        let hr_fields = hr_remaining_leave.is_some() || hr_approved.is_some();
        let finance_fields = finance_severance.is_some() || finance_approved.is_some();
        let docs = resignation_doc_url.is_some() || handover_doc_url.is_some();

        match self {
            CaseScreen::Create => {
                !(hr_fields
                    || finance_fields
                    || docs
                    || manager_final_approved.is_some()
                    || leaver_final_approved.is_some()
                    || status.is_some())
            }
            CaseScreen::Manager => {
                !(hr_fields || finance_fields || docs || leaver_final_approved.is_some())
            }
            CaseScreen::Hr => {
                !(case_details
                    || finance_fields
                    || docs
                    || manager_final_approved.is_some()
                    || leaver_final_approved.is_some())
            }
            CaseScreen::Finance => {
                !(case_details
                    || hr_fields
                    || docs
                    || manager_final_approved.is_some()
                    || leaver_final_approved.is_some())
            }
            CaseScreen::Leaver => {
                !(case_details
                    || hr_fields
                    || finance_fields
                    || manager_final_approved.is_some()
                    || note.is_some())
            }
            CaseScreen::Documents => {
                !(case_details
                    || hr_fields
                    || finance_fields
                    || manager_final_approved.is_some()
                    || leaver_final_approved.is_some()
                    || status.is_some()
                    || note.is_some())
            }
        }
    }
}

/// An uploaded document waiting to be stored.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub kind: DocumentKind,
    pub filename: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[async_trait]
pub trait CaseService: Send + Sync {
    /// Open a new case owned by the acting manager.
    async fn create_case(&self, actor: &SessionUser, new_case: NewCase)
        -> AppResult<OffboardingCase>;

    async fn get_case(&self, id: i32) -> AppResult<OffboardingCase>;

    async fn list_cases(
        &self,
        filter: CaseFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<OffboardingCase>, u64)>;

    /// Apply a role screen's changes.
    async fn update_case(
        &self,
        actor: &SessionUser,
        id: i32,
        screen: CaseScreen,
        changes: CaseChanges,
    ) -> AppResult<OffboardingCase>;

    /// Store a document in the drive and record its link on the case.
    async fn attach_document(
        &self,
        actor: &SessionUser,
        id: i32,
        upload: DocumentUpload,
    ) -> AppResult<(OffboardingCase, DriveFile)>;

    /// Deep link that opens the case in the web app.
    fn case_link(&self, id: i32) -> String;
}

/// Concrete implementation of CaseService using Unit of Work.
pub struct CaseManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    notifier: Option<Arc<dyn ChatNotifier>>,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl<U: UnitOfWork> CaseManager<U> {
    pub fn new(
        uow: Arc<U>,
        config: Config,
        notifier: Option<Arc<dyn ChatNotifier>>,
        documents: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        Self {
            uow,
            config,
            notifier,
            documents,
        }
    }

    /// Owners must exist and hold the matching role.
    async fn check_owner(&self, id: Option<i32>, role: Role, label: &str) -> AppResult<()> {
        let Some(id) = id else {
            return Ok(());
        };

        match self.uow.users().find_by_id(id).await? {
            Some(user) if user.role.is_any_of(&[role]) => Ok(()),
            Some(_) => Err(AppError::validation(format!("{} must have the {} role", label, role))),
            None => Err(AppError::validation(format!("{} does not exist", label))),
        }
    }

    async fn check_changes(&self, changes: &CaseChanges) -> AppResult<()> {
        if let Some(name) = &changes.leaver_name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Leaver name is required"));
            }
        }
        for (value, label) in [
            (changes.hr_remaining_leave, "Remaining leave"),
            (changes.finance_severance, "Severance"),
        ] {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(AppError::validation(format!("{} must be zero or more", label)));
            }
        }

        self.check_owner(changes.hr_owner_id.flatten(), Role::Hr, "HR owner")
            .await?;
        self.check_owner(changes.finance_owner_id.flatten(), Role::Finance, "Finance owner")
            .await
    }

    async fn load(&self, id: i32) -> AppResult<OffboardingCase> {
        self.uow
            .cases()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    fn status_message(&self, case: &OffboardingCase) -> String {
        let mut text = format!(
            "[Offboarding] Case #{} ({}) is now {}.",
            case.id, case.leaver_name, case.status
        );
        if case.is_fully_approved() {
            text.push_str("\nAll approvals are in.");
        }
        if case.status.is_terminal() {
            text.push_str("\nThis case is now closed.");
        }
        text.push_str(&format!("\nOpen: {}", self.case_link(case.id)));
        text
    }

    /// Tell every linked stakeholder about the case's new status.
    ///
    /// Failures are logged; the write has already happened.
    async fn notify_status_change(&self, case: &OffboardingCase) {
        let Some(notifier) = &self.notifier else {
            tracing::debug!(case_id = case.id, "no chat notifier configured");
            return;
        };

        let text = self.status_message(case);
        for user_id in case.stakeholder_ids() {
            let chat_id = match self.uow.users().find_by_id(user_id).await {
                Ok(Some(user)) => match user.telegram_chat_id {
                    Some(chat_id) => chat_id,
                    None => continue,
                },
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(case_id = case.id, user_id, error = %e, "stakeholder lookup failed");
                    continue;
                }
            };

            match notifier.send_message(chat_id.clone(), text.clone()).await {
                Ok(()) => {
                    tracing::info!(case_id = case.id, user_id, chat_id = %chat_id, "stakeholder notified")
                }
                Err(e) => {
                    tracing::warn!(case_id = case.id, user_id, chat_id = %chat_id, error = %e, "notification failed")
                }
            }
        }
    }
}

fn stored_filename(case_id: i32, kind: DocumentKind, filename: &str) -> String {
    let kind = match kind {
        DocumentKind::Resignation => "resignation",
        DocumentKind::Handover => "handover",
    };
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("document");
    format!("case{}_{}_{}", case_id, kind, base)
}

#[async_trait]
impl<U: UnitOfWork> CaseService for CaseManager<U> {
    async fn create_case(
        &self,
        actor: &SessionUser,
        mut new_case: NewCase,
    ) -> AppResult<OffboardingCase> {
        CaseScreen::Create.authorize(actor)?;

        new_case.leaver_name = new_case.leaver_name.trim().to_string();
        if new_case.leaver_name.is_empty() {
            return Err(AppError::validation("Leaver name is required"));
        }
        self.check_owner(new_case.hr_owner_id, Role::Hr, "HR owner").await?;
        self.check_owner(new_case.finance_owner_id, Role::Finance, "Finance owner")
            .await?;

        new_case.manager_id = Some(actor.id);
        let case = self.uow.cases().create(new_case).await?;

        tracing::info!(case_id = case.id, user_id = actor.id, "case created");
        Ok(case)
    }

    async fn get_case(&self, id: i32) -> AppResult<OffboardingCase> {
        self.load(id).await
    }

    async fn list_cases(
        &self,
        filter: CaseFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<OffboardingCase>, u64)> {
        self.uow.cases().list(filter, pagination).await
    }

    async fn update_case(
        &self,
        actor: &SessionUser,
        id: i32,
        screen: CaseScreen,
        changes: CaseChanges,
    ) -> AppResult<OffboardingCase> {
        screen.authorize(actor)?;
        if !screen.owns(&changes) {
            return Err(AppError::Forbidden);
        }
        self.check_changes(&changes).await?;

        let before = self.load(id).await?;
        if changes.is_empty() {
            return Ok(before);
        }

        let case = self.uow.cases().update(id, changes).await?;
        tracing::info!(case_id = id, user_id = actor.id, screen = ?screen, status = %case.status, "case updated");

        if case.status != before.status {
            self.notify_status_change(&case).await;
        }

        Ok(case)
    }

    async fn attach_document(
        &self,
        actor: &SessionUser,
        id: i32,
        upload: DocumentUpload,
    ) -> AppResult<(OffboardingCase, DriveFile)> {
        CaseScreen::Documents.authorize(actor)?;

        if upload.content.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if upload.content.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds {} MiB",
                MAX_DOCUMENT_BYTES / (1024 * 1024)
            )));
        }

        self.load(id).await?;

        let documents = self
            .documents
            .as_ref()
            .ok_or_else(|| AppError::Credentials(NO_CREDENTIALS.to_string()))?;

        let file = documents
            .upload_bytes(
                upload.content,
                stored_filename(id, upload.kind, &upload.filename),
                upload.mime_type,
                None,
            )
            .await?;

        let changes = CaseChanges::default().with_document(upload.kind, file.link());
        let case = self.uow.cases().update(id, changes).await?;

        tracing::info!(case_id = id, user_id = actor.id, file_id = %file.id, kind = ?upload.kind, "document attached");
        Ok((case, file))
    }

    fn case_link(&self, id: i32) -> String {
        self.config.case_link(id)
    }
}
