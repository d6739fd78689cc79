use draftbox_core::db::open_db_in_memory;
use draftbox_core::{
    parse_deadline, Access, CommentService, DraftService, EntityRef, Introduction, RepoError,
    RepositoryService, SqliteCommentStore, SqliteIntroductionStore, SqliteRepositoryStore,
    ValidationError,
};
use rusqlite::Connection;

fn setup_with_draft() -> (Connection, Introduction) {
    let conn = open_db_in_memory().unwrap();
    let draft = {
        let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
        let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
        let repository = repositories
            .create_repository("Thread", "comments", parse_deadline("2024-04-01").unwrap())
            .unwrap();
        drafts
            .create_next_draft(repository.id, "draft under review", Access::Public)
            .unwrap()
    };
    (conn, draft)
}

fn comment_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn add_comment_sets_timestamps_and_parent() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let created = service.add_comment(draft.id, "tighten the opening").unwrap();
    assert_eq!(created.introduction_id, draft.id);
    assert_eq!(created.comment, "tighten the opening");
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(service.get_comment(created.id).unwrap(), created);
}

#[test]
fn add_comment_to_missing_introduction_returns_not_found() {
    let (conn, _draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let err = service.add_comment(777, "orphan").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Introduction(777))));
    assert_eq!(comment_count(&conn), 0);
}

#[test]
fn add_comment_over_limit_fails_and_persists_nothing() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let err = service.add_comment(draft.id, &"가".repeat(201)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::CommentTooLong {
            max: 200,
            actual: 201
        })
    ));

    let err = service.add_comment(draft.id, "   ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankComment)
    ));
    assert_eq!(comment_count(&conn), 0);

    service.add_comment(draft.id, &"가".repeat(200)).unwrap();
    assert_eq!(comment_count(&conn), 1);
}

#[test]
fn update_comment_refreshes_updated_only() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());
    let created = service.add_comment(draft.id, "first pass").unwrap();
    conn.execute(
        "UPDATE comments SET created_at = 500, updated_at = 500 WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    let updated = service.update_comment(created.id, "second pass").unwrap();
    assert_eq!(updated.comment, "second pass");
    assert_eq!(updated.introduction_id, draft.id);
    assert_eq!(updated.created_at, 500);
    assert!(updated.updated_at > 500);

    let err = service.update_comment(created.id, "").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(service.get_comment(created.id).unwrap().comment, "second pass");
}

#[test]
fn missing_comment_operations_return_not_found() {
    let (conn, _draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    assert!(matches!(
        service.get_comment(5).unwrap_err(),
        RepoError::NotFound(EntityRef::Comment(5))
    ));
    assert!(matches!(
        service.update_comment(5, "text").unwrap_err(),
        RepoError::NotFound(EntityRef::Comment(5))
    ));
    assert!(matches!(
        service.delete_comment(5).unwrap_err(),
        RepoError::NotFound(EntityRef::Comment(5))
    ));
}

#[test]
fn delete_comment_removes_only_that_comment() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());
    let keep = service.add_comment(draft.id, "keep").unwrap();
    let dropped = service.add_comment(draft.id, "drop").unwrap();

    service.delete_comment(dropped.id).unwrap();

    let remaining = service.list_for_introduction(draft.id).unwrap();
    assert_eq!(remaining, vec![keep]);
}

#[test]
fn list_is_newest_first() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());
    let first = service.add_comment(draft.id, "one").unwrap();
    let second = service.add_comment(draft.id, "two").unwrap();
    let third = service.add_comment(draft.id, "three").unwrap();

    let ids: Vec<_> = service
        .list_for_introduction(draft.id)
        .unwrap()
        .into_iter()
        .map(|comment| comment.id)
        .collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    // Ordering follows created_at, not id.
    conn.execute(
        "UPDATE comments SET created_at = created_at + 60000 WHERE id = ?1;",
        [first.id],
    )
    .unwrap();
    let listed = service.list_for_introduction(draft.id).unwrap();
    assert_eq!(listed[0].id, first.id);
}

#[test]
fn list_for_missing_introduction_returns_not_found() {
    let (conn, _draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let err = service.list_for_introduction(31).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Introduction(31))));
}

#[test]
fn failed_delete_keeps_the_comment() {
    let (conn, draft) = setup_with_draft();
    let service = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());
    let created = service.add_comment(draft.id, "keep me").unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_comment_delete
         BEFORE DELETE ON comments
         BEGIN
            SELECT RAISE(ABORT, 'blocked for test');
         END;",
    )
    .unwrap();

    let err = service.delete_comment(created.id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(conn.is_autocommit());
    assert_eq!(service.get_comment(created.id).unwrap(), created);
    assert_eq!(comment_count(&conn), 1);
}
