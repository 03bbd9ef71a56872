//! Repository and session-gate tests against a migrated sqlite database.

mod common;

use std::sync::Arc;

use offboarding_tracker::bot::{CommandHandler, NOT_LINKED_REPLY};
use offboarding_tracker::commands::seed::seed_accounts;
use offboarding_tracker::domain::{
    do_logout, is_logged_in, set_logged_in, CaseChanges, CaseFilter, CaseStatus, NewCase,
    NewUser, Password, PlanOption, Role, Session,
};
use offboarding_tracker::errors::AppError;
use offboarding_tracker::infra::{CaseRepository, CaseStore, UserRepository, UserStore};
use offboarding_tracker::services::current_user;
use offboarding_tracker::types::PaginationParams;

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = common::memory_db().await;
    let users = UserStore::new(db.conn());

    assert_eq!(seed_accounts(&users).await.unwrap(), 5);
    assert_eq!(seed_accounts(&users).await.unwrap(), 0);

    let all = users.list().await.unwrap();
    let roles: Vec<Role> = all.iter().map(|u| u.role).collect();
    assert_eq!(
        roles,
        vec![Role::Admin, Role::Manager, Role::Hr, Role::Finance, Role::Leaver]
    );

    let hr = users.find_by_email("hr@example.com").await.unwrap().unwrap();
    assert!(Password::from_hash(hr.password_hash).verify("hr123"));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());

    let err = users
        .create(NewUser {
            email: "mgr@example.com".to_string(),
            name: "Second Manager".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Manager,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_relinking_chat_moves_it_to_the_new_user() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());

    let mgr = users.link_chat("mgr@example.com", "42").await.unwrap().unwrap();
    assert_eq!(mgr.telegram_chat_id.as_deref(), Some("42"));

    // Same call again is a no-op
    users.link_chat("mgr@example.com", "42").await.unwrap().unwrap();

    let hr = users.link_chat("hr@example.com", "42").await.unwrap().unwrap();
    assert_eq!(hr.telegram_chat_id.as_deref(), Some("42"));

    let mgr = users.find_by_email("mgr@example.com").await.unwrap().unwrap();
    assert!(mgr.telegram_chat_id.is_none());
    assert_eq!(users.find_by_chat_id("42").await.unwrap().unwrap().id, hr.id);
}

#[tokio::test]
async fn test_unknown_email_leaves_links_alone() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());
    users.link_chat("fin@example.com", "7").await.unwrap();

    assert!(users.link_chat("nobody@example.com", "7").await.unwrap().is_none());

    let fin = users.find_by_chat_id("7").await.unwrap().unwrap();
    assert_eq!(fin.email, "fin@example.com");
}

#[tokio::test]
async fn test_bot_start_then_whoami() {
    let db = common::seeded_db().await;
    let handler = CommandHandler::new(Arc::new(UserStore::new(db.conn())));

    assert_eq!(
        handler.reply(99, "/whoami", None).await.unwrap().as_deref(),
        Some(NOT_LINKED_REPLY)
    );
    assert_eq!(
        handler.reply(99, "/start nobody@example.com", None).await.unwrap().as_deref(),
        Some("Email not found: nobody@example.com")
    );
    assert_eq!(
        handler.reply(99, "/whoami", None).await.unwrap().as_deref(),
        Some(NOT_LINKED_REPLY)
    );

    handler.reply(99, "/start HR@example.com", None).await.unwrap();
    assert_eq!(
        handler.reply(99, "/whoami", None).await.unwrap().as_deref(),
        Some("name=HR Lee\nemail=hr@example.com\nrole=hr\nchat_id=99")
    );

    // Last /start wins
    handler.reply(99, "/start leaver@example.com", None).await.unwrap();
    assert_eq!(
        handler.reply(99, "/whoami", None).await.unwrap().as_deref(),
        Some("name=Leaver Choi\nemail=leaver@example.com\nrole=leaver\nchat_id=99")
    );
}

#[tokio::test]
async fn test_current_user_follows_login_and_logout() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());
    let hr = users.find_by_email("hr@example.com").await.unwrap().unwrap();

    let mut session = Session::new();
    session.insert("selected_case_id", 3);
    assert!(current_user(&session, &users).await.unwrap().is_none());

    set_logged_in(&mut session, &hr);
    assert!(is_logged_in(&session));
    assert_eq!(current_user(&session, &users).await.unwrap().unwrap().id, hr.id);

    do_logout(&mut session);
    assert!(!is_logged_in(&session));
    assert!(current_user(&session, &users).await.unwrap().is_none());
    assert!(session.contains_key("selected_case_id"));
}

#[tokio::test]
async fn test_optional_columns_can_be_cleared_and_text_is_trimmed() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());
    let cases = CaseStore::new(db.conn());
    let hr = users.find_by_email("hr@example.com").await.unwrap().unwrap();

    let case = cases
        .create(NewCase {
            leaver_name: "  Choi  ".to_string(),
            leaver_department: Some("   ".to_string()),
            hr_owner_id: Some(hr.id),
            note: Some(" handover pending ".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(case.leaver_name, "Choi");
    assert_eq!(case.leaver_department, None);
    assert_eq!(case.note.as_deref(), Some("handover pending"));

    let updated = cases
        .update(
            case.id,
            CaseChanges {
                leaver_name: Some(" Choi Minji ".to_string()),
                hr_owner_id: Some(None),
                note: Some(None),
                handover_doc_url: Some(Some("https://drive.example/h".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.leaver_name, "Choi Minji");
    assert_eq!(updated.hr_owner_id, None);
    assert_eq!(updated.note, None);
    assert_eq!(updated.handover_doc_url.as_deref(), Some("https://drive.example/h"));

    let cleared = cases
        .update(
            case.id,
            CaseChanges {
                handover_doc_url: Some(Some(" ".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.handover_doc_url, None);
    assert_eq!(cleared.leaver_name, "Choi Minji");
}

#[tokio::test]
async fn test_case_create_update_and_list() {
    let db = common::seeded_db().await;
    let users = UserStore::new(db.conn());
    let cases = CaseStore::new(db.conn());
    let mgr = users.find_by_email("mgr@example.com").await.unwrap().unwrap();
    let hr = users.find_by_email("hr@example.com").await.unwrap().unwrap();

    let first = cases
        .create(NewCase {
            leaver_name: "Choi".to_string(),
            plan_option: Some(PlanOption::NewHire),
            manager_id: Some(mgr.id),
            hr_owner_id: Some(hr.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(first.status, CaseStatus::Created);
    assert!(!first.hr_approved && !first.leaver_final_approved);

    let second = cases
        .create(NewCase {
            leaver_name: "Jung".to_string(),
            manager_id: Some(mgr.id),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = cases
        .update(
            first.id,
            CaseChanges {
                hr_remaining_leave: Some(4.5),
                hr_approved: Some(true),
                status: Some(CaseStatus::HrFinanceReview),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, CaseStatus::HrFinanceReview);
    assert_eq!(updated.hr_remaining_leave, Some(4.5));
    assert_eq!(updated.plan_option, Some(PlanOption::NewHire));
    assert_eq!(updated.hr_owner_id, Some(hr.id));

    let (all, total) = cases
        .list(CaseFilter::default(), PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(all[0].id, second.id);

    let (in_review, total) = cases
        .list(
            CaseFilter {
                status: Some(CaseStatus::HrFinanceReview),
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(in_review[0].id, first.id);

    let err = cases
        .update(9999, CaseChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert!(cases.find_by_id(9999).await.unwrap().is_none());
}
