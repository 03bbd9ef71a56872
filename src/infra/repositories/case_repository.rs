//! Offboarding case repository: plain create/read/update, last write wins.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::entities::offboarding_case::{self, ActiveModel, Entity as CaseEntity};
use crate::domain::{CaseChanges, CaseFilter, CaseStatus, NewCase, OffboardingCase};
use crate::errors::{AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Insert a case in `created` status with every approval flag cleared
    async fn create(&self, new_case: NewCase) -> AppResult<OffboardingCase>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<OffboardingCase>>;

    /// Newest first, with the total count before paging
    async fn list(
        &self,
        filter: CaseFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<OffboardingCase>, u64)>;

    /// Apply the `Some` fields of `changes` in one UPDATE
    async fn update(&self, id: i32, changes: CaseChanges) -> AppResult<OffboardingCase>;
}

pub struct CaseStore {
    db: DatabaseConnection,
}

impl CaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CaseRepository for CaseStore {
    async fn create(&self, new_case: NewCase) -> AppResult<OffboardingCase> {
        let now = Utc::now();
        let active_model = ActiveModel {
            leaver_name: Set(new_case.leaver_name.trim().to_string()),
            leaver_department: Set(tidy(new_case.leaver_department)),
            desired_leave_date: Set(new_case.desired_leave_date),
            plan_option: Set(new_case.plan_option.map(|p| p.as_str().to_string())),
            manager_id: Set(new_case.manager_id),
            hr_owner_id: Set(new_case.hr_owner_id),
            finance_owner_id: Set(new_case.finance_owner_id),
            hr_remaining_leave: Set(None),
            finance_severance: Set(None),
            hr_approved: Set(false),
            finance_approved: Set(false),
            manager_final_approved: Set(false),
            leaver_final_approved: Set(false),
            resignation_doc_url: Set(None),
            handover_doc_url: Set(None),
            status: Set(CaseStatus::Created.as_str().to_string()),
            note: Set(tidy(new_case.note)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        OffboardingCase::try_from(model)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<OffboardingCase>> {
        CaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(OffboardingCase::try_from)
            .transpose()
    }

    async fn list(
        &self,
        filter: CaseFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<OffboardingCase>, u64)> {
        let mut query = CaseEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(offboarding_case::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await?;

        let cases = query
            .order_by_desc(offboarding_case::Column::CreatedAt)
            .order_by_desc(offboarding_case::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(OffboardingCase::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((cases, total))
    }

    async fn update(&self, id: i32, changes: CaseChanges) -> AppResult<OffboardingCase> {
        let model = CaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = model.into();

        if let Some(v) = changes.leaver_name {
            active.leaver_name = Set(v.trim().to_string());
        }
        if let Some(v) = changes.leaver_department {
            active.leaver_department = Set(tidy(v));
        }
        if let Some(v) = changes.desired_leave_date {
            active.desired_leave_date = Set(v);
        }
        if let Some(v) = changes.plan_option {
            active.plan_option = Set(v.map(|p| p.as_str().to_string()));
        }
        if let Some(v) = changes.hr_owner_id {
            active.hr_owner_id = Set(v);
        }
        if let Some(v) = changes.finance_owner_id {
            active.finance_owner_id = Set(v);
        }
        if let Some(v) = changes.hr_remaining_leave {
            active.hr_remaining_leave = Set(Some(v));
        }
        if let Some(v) = changes.finance_severance {
            active.finance_severance = Set(Some(v));
        }
        if let Some(v) = changes.hr_approved {
            active.hr_approved = Set(v);
        }
        if let Some(v) = changes.finance_approved {
            active.finance_approved = Set(v);
        }
        if let Some(v) = changes.manager_final_approved {
            active.manager_final_approved = Set(v);
        }
        if let Some(v) = changes.leaver_final_approved {
            active.leaver_final_approved = Set(v);
        }
        if let Some(v) = changes.resignation_doc_url {
            active.resignation_doc_url = Set(tidy(v));
        }
        if let Some(v) = changes.handover_doc_url {
            active.handover_doc_url = Set(tidy(v));
        }
        if let Some(v) = changes.status {
            active.status = Set(v.as_str().to_string());
        }
        if let Some(v) = changes.note {
            active.note = Set(tidy(v));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        OffboardingCase::try_from(model)
    }
}

/// Trimmed text, with blank stored as NULL.
fn tidy(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
