use draftbox_core::db::open_db_in_memory;
use draftbox_core::{
    parse_deadline, Access, CommentService, DeleteReport, DraftService, EntityRef,
    NewIntroduction, RepoError, RepositoryService, SqliteCommentStore, SqliteIntroductionStore,
    SqliteRepositoryStore,
};
use rusqlite::Connection;

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn spring2024_scenario_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
    let comments = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let spring = repositories
        .create_repository(
            "Spring2024",
            "spring application round",
            parse_deadline("2024-03-01").unwrap(),
        )
        .unwrap();

    let seed = drafts.prepare_next_draft(spring.id).unwrap();
    assert_eq!((seed.version, seed.contents.as_str()), (1, ""));
    assert_eq!(seed.access, Access::Public);

    let mut first = seed.into_new_introduction();
    first.contents = "Hello".to_string();
    let v1 = drafts.create_draft(&first).unwrap();

    let seed = drafts.prepare_next_draft(spring.id).unwrap();
    assert_eq!((seed.version, seed.contents.as_str()), (2, "Hello"));
    assert_eq!(seed.access, Access::Public);

    let mut second = seed.into_new_introduction();
    second.contents = "Hello world".to_string();
    let v2 = drafts.create_draft(&second).unwrap();

    comments.add_comment(v1.id, "good start").unwrap();
    comments.add_comment(v2.id, "better").unwrap();
    comments.add_comment(v2.id, "ship it").unwrap();

    let report = repositories.delete_repository(spring.id).unwrap();
    assert_eq!(
        report,
        DeleteReport {
            introductions: 2,
            comments: 3
        }
    );

    assert!(matches!(
        repositories.get_repository(spring.id).unwrap_err(),
        RepoError::NotFound(EntityRef::Repository(_))
    ));
    assert!(matches!(
        drafts.get_draft(v1.id).unwrap_err(),
        RepoError::NotFound(EntityRef::Introduction(_))
    ));
    assert!(matches!(
        comments.list_for_introduction(v2.id).unwrap_err(),
        RepoError::NotFound(EntityRef::Introduction(_))
    ));
    assert_eq!(count(&conn, "introductions"), 0);
    assert_eq!(count(&conn, "comments"), 0);
}

#[test]
fn deleting_repository_leaves_other_repositories_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
    let comments = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());
    let deadline = parse_deadline("2024-07-01").unwrap();

    let doomed = repositories.create_repository("Doomed", "d", deadline).unwrap();
    let kept = repositories.create_repository("Kept", "k", deadline).unwrap();
    let doomed_draft = drafts
        .create_next_draft(doomed.id, "bye", Access::Public)
        .unwrap();
    let kept_draft = drafts
        .create_next_draft(kept.id, "stay", Access::Private)
        .unwrap();
    comments.add_comment(doomed_draft.id, "gone").unwrap();
    let kept_comment = comments.add_comment(kept_draft.id, "here").unwrap();

    repositories.delete_repository(doomed.id).unwrap();

    assert_eq!(repositories.list_repositories().unwrap(), vec![kept]);
    assert_eq!(drafts.get_draft(kept_draft.id).unwrap(), kept_draft);
    assert_eq!(
        comments.list_for_introduction(kept_draft.id).unwrap(),
        vec![kept_comment]
    );
}

#[test]
fn deleting_draft_removes_its_comments_and_keeps_siblings() {
    let conn = open_db_in_memory().unwrap();
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
    let comments = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let repository = repositories
        .create_repository("Siblings", "s", parse_deadline("2024-08-01").unwrap())
        .unwrap();
    let v1 = drafts
        .create_next_draft(repository.id, "v1", Access::Public)
        .unwrap();
    let v2 = drafts
        .create_next_draft(repository.id, "v2", Access::Public)
        .unwrap();
    comments.add_comment(v1.id, "on v1").unwrap();
    comments.add_comment(v1.id, "also v1").unwrap();
    let sibling_comment = comments.add_comment(v2.id, "on v2").unwrap();

    let removed = drafts.delete_draft(v1.id).unwrap();
    assert_eq!(removed, 2);

    assert_eq!(drafts.list_for_repository(repository.id).unwrap(), vec![v2.clone()]);
    assert_eq!(
        comments.list_for_introduction(v2.id).unwrap(),
        vec![sibling_comment]
    );
    assert_eq!(repositories.get_repository(repository.id).unwrap(), repository);
    assert_eq!(count(&conn, "comments"), 1);

    // The deleted version number is free again only through explicit create.
    let seed = drafts.prepare_next_draft(repository.id).unwrap();
    assert_eq!(seed.version, 3);
    let refill = drafts
        .create_draft(&NewIntroduction {
            repository_id: repository.id,
            version: 1,
            contents: "v1 again".to_string(),
            access: Access::Public,
        })
        .unwrap();
    assert_eq!(refill.version, 1);
}

#[test]
fn failed_repository_delete_rolls_back_the_whole_cascade() {
    let conn = open_db_in_memory().unwrap();
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
    let comments = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let repository = repositories
        .create_repository("Sticky", "s", parse_deadline("2024-10-01").unwrap())
        .unwrap();
    let draft = drafts
        .create_next_draft(repository.id, "body", Access::Public)
        .unwrap();
    comments.add_comment(draft.id, "note").unwrap();

    // Fail the last step of the fan-out, after children were already deleted.
    conn.execute_batch(
        "CREATE TRIGGER block_repository_delete
         BEFORE DELETE ON repositories
         BEGIN
            SELECT RAISE(ABORT, 'blocked for test');
         END;",
    )
    .unwrap();

    let err = repositories.delete_repository(repository.id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    assert_eq!(count(&conn, "repositories"), 1);
    assert_eq!(count(&conn, "introductions"), 1);
    assert_eq!(count(&conn, "comments"), 1);
}

#[test]
fn failed_draft_delete_keeps_its_comments() {
    let conn = open_db_in_memory().unwrap();
    let repositories = RepositoryService::new(SqliteRepositoryStore::try_new(&conn).unwrap());
    let drafts = DraftService::new(SqliteIntroductionStore::try_new(&conn).unwrap());
    let comments = CommentService::new(SqliteCommentStore::try_new(&conn).unwrap());

    let repository = repositories
        .create_repository("Pinned", "p", parse_deadline("2024-11-01").unwrap())
        .unwrap();
    let draft = drafts
        .create_next_draft(repository.id, "body", Access::Public)
        .unwrap();
    let first = comments.add_comment(draft.id, "first").unwrap();
    let second = comments.add_comment(draft.id, "second").unwrap();

    // Comments are removed before the draft row, so this aborts mid fan-out.
    conn.execute_batch(
        "CREATE TRIGGER block_introduction_delete
         BEFORE DELETE ON introductions
         BEGIN
            SELECT RAISE(ABORT, 'blocked for test');
         END;",
    )
    .unwrap();

    let err = drafts.delete_draft(draft.id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(conn.is_autocommit());

    assert_eq!(drafts.get_draft(draft.id).unwrap(), draft);
    assert_eq!(
        comments.list_for_introduction(draft.id).unwrap(),
        vec![second, first]
    );
    assert_eq!(count(&conn, "comments"), 2);
}
