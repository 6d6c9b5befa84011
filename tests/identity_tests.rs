//! Identity collaborator behavior: authentication and the one-time
//! passcode window.

mod test_utils;

use chrono::{Duration, Utc};
use exeats::error::RepositoryError;
use exeats::repositories::IdentityRepository;
use test_utils::*;

#[tokio::test]
async fn authenticate_accepts_only_the_right_password() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);

    let account = repo.authenticate("root", "admin-password").await.unwrap();
    assert!(account.is_some());

    assert!(repo.authenticate("root", "wrong").await.unwrap().is_none());
    assert!(
        repo.authenticate("nobody", "admin-password")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn passcode_reset_flow_works_inside_the_window() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);
    let (_, code) = repo.issue_passcode("root").await.unwrap();
    assert_eq!(code.len(), 6);

    let ttl = Duration::minutes(5);
    repo.reset_password("root", &code, "new-password", ttl)
        .await
        .unwrap();

    // Old credential is gone, new one works.
    assert!(
        repo.authenticate("root", "admin-password")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.authenticate("root", "new-password")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn passcode_is_single_use() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);
    let (_, code) = repo.issue_passcode("root").await.unwrap();
    let ttl = Duration::minutes(5);

    repo.reset_password("root", &code, "first-new", ttl)
        .await
        .unwrap();

    // The code was cleared on success; replaying it fails.
    let err = repo
        .reset_password("root", &code, "second-new", ttl)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert!(
        repo.authenticate("root", "first-new")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn expired_passcode_is_rejected_and_password_unchanged() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);
    let (account, code) = repo.issue_passcode("root").await.unwrap();

    // Shift issuance six minutes into the past, one past the window.
    backdate_passcode(&db, account, Utc::now() - Duration::minutes(6))
        .await
        .unwrap();

    let err = repo
        .reset_password("root", &code, "new-password", Duration::minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    assert!(
        repo.authenticate("root", "admin-password")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn wrong_passcode_is_rejected() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);
    let (_, code) = repo.issue_passcode("root").await.unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let err = repo
        .reset_password("root", wrong, "new-password", Duration::minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
async fn reissuing_replaces_the_outstanding_passcode() {
    let db = setup_test_db().await.unwrap();
    create_admin(&db, "root").await.unwrap();

    let repo = IdentityRepository::new(&db);
    let (_, first) = repo.issue_passcode("root").await.unwrap();
    let (_, second) = repo.issue_passcode("root").await.unwrap();

    let ttl = Duration::minutes(5);
    if first != second {
        let err = repo
            .reset_password("root", &first, "new-password", ttl)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    repo.reset_password("root", &second, "new-password", ttl)
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_username_cannot_request_a_reset() {
    let db = setup_test_db().await.unwrap();

    let repo = IdentityRepository::new(&db);
    let err = repo.issue_passcode("ghost").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}
