//! Migration: Create offboarding_cases table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OffboardingCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OffboardingCases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OffboardingCases::LeaverName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OffboardingCases::LeaverDepartment).string_len(255).null())
                    .col(ColumnDef::new(OffboardingCases::DesiredLeaveDate).date().null())
                    .col(ColumnDef::new(OffboardingCases::PlanOption).string_len(32).null())
                    .col(ColumnDef::new(OffboardingCases::ManagerId).integer().null())
                    .col(ColumnDef::new(OffboardingCases::HrOwnerId).integer().null())
                    .col(ColumnDef::new(OffboardingCases::FinanceOwnerId).integer().null())
                    .col(ColumnDef::new(OffboardingCases::HrRemainingLeave).double().null())
                    .col(ColumnDef::new(OffboardingCases::FinanceSeverance).double().null())
                    .col(&mut flag(OffboardingCases::HrApproved))
                    .col(&mut flag(OffboardingCases::FinanceApproved))
                    .col(&mut flag(OffboardingCases::ManagerFinalApproved))
                    .col(&mut flag(OffboardingCases::LeaverFinalApproved))
                    .col(ColumnDef::new(OffboardingCases::ResignationDocUrl).text().null())
                    .col(ColumnDef::new(OffboardingCases::HandoverDocUrl).text().null())
                    .col(
                        ColumnDef::new(OffboardingCases::Status)
                            .string_len(32)
                            .not_null()
                            .default("created"),
                    )
                    .col(ColumnDef::new(OffboardingCases::Note).text().null())
                    .col(
                        ColumnDef::new(OffboardingCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OffboardingCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut owner_fk("fk_cases_manager", OffboardingCases::ManagerId))
                    .foreign_key(&mut owner_fk("fk_cases_hr_owner", OffboardingCases::HrOwnerId))
                    .foreign_key(&mut owner_fk(
                        "fk_cases_finance_owner",
                        OffboardingCases::FinanceOwnerId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offboarding_cases_status")
                    .table(OffboardingCases::Table)
                    .col(OffboardingCases::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OffboardingCases::Table).to_owned())
            .await
    }
}

fn flag(column: OffboardingCases) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(false)
        .to_owned()
}

fn owner_fk(name: &str, column: OffboardingCases) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(OffboardingCases::Table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

#[derive(Iden, Clone, Copy)]
enum OffboardingCases {
    Table,
    Id,
    LeaverName,
    LeaverDepartment,
    DesiredLeaveDate,
    PlanOption,
    ManagerId,
    HrOwnerId,
    FinanceOwnerId,
    HrRemainingLeave,
    FinanceSeverance,
    HrApproved,
    FinanceApproved,
    ManagerFinalApproved,
    LeaverFinalApproved,
    ResignationDocUrl,
    HandoverDocUrl,
    Status,
    Note,
    CreatedAt,
    UpdatedAt,
}
