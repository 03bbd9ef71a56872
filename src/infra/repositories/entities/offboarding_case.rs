//! Offboarding case database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::OffboardingCase;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "offboarding_cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub leaver_name: String,
    pub leaver_department: Option<String>,
    pub desired_leave_date: Option<Date>,
    pub plan_option: Option<String>,
    pub manager_id: Option<i32>,
    pub hr_owner_id: Option<i32>,
    pub finance_owner_id: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub hr_remaining_leave: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub finance_severance: Option<f64>,
    pub hr_approved: bool,
    pub finance_approved: bool,
    pub manager_final_approved: bool,
    pub leaver_final_approved: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub resignation_doc_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub handover_doc_url: Option<String>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for OffboardingCase {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let corrupt = |field: &str, value: &str| {
            AppError::internal(format!("case {} has unknown {} {:?}", id, field, value))
        };

        let status = model
            .status
            .parse()
            .map_err(|_| corrupt("status", &model.status))?;
        let plan_option = match model.plan_option.as_deref() {
            Some(plan) => Some(plan.parse().map_err(|_| corrupt("plan", plan))?),
            None => None,
        };

        Ok(OffboardingCase {
            id,
            leaver_name: model.leaver_name,
            leaver_department: model.leaver_department,
            desired_leave_date: model.desired_leave_date,
            plan_option,
            manager_id: model.manager_id,
            hr_owner_id: model.hr_owner_id,
            finance_owner_id: model.finance_owner_id,
            hr_remaining_leave: model.hr_remaining_leave,
            finance_severance: model.finance_severance,
            hr_approved: model.hr_approved,
            finance_approved: model.finance_approved,
            manager_final_approved: model.manager_final_approved,
            leaver_final_approved: model.leaver_final_approved,
            resignation_doc_url: model.resignation_doc_url,
            handover_doc_url: model.handover_doc_url,
            status,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
