mod support;

use momentum::board::ColumnPatch;
use momentum::error::{Entity, Error};
use momentum::goal::{GoalPatch, NewGoal};
use momentum::storage::Backend;
use momentum::task::TaskPatch;
use support::{TestEnv, INTRUDER, OWNER};

#[test]
fn boards_are_invisible_across_users() {
    let env = TestEnv::new();
    let board = env.seed_board("Private");

    assert!(env.boards().boards(INTRUDER).unwrap().is_empty());
    assert!(matches!(
        env.boards().board(&board.board.id, INTRUDER).unwrap_err(),
        Error::NotFound(Entity::Board)
    ));
}

#[test]
fn every_task_operation_reports_not_found_not_unauthorized() {
    let env = TestEnv::new();
    let board = env.seed_board("Private");
    let task = env.seed_task(&board, 0, "mine");

    let read = env.tasks().task_details(&task.id, INTRUDER).unwrap_err();
    assert!(matches!(read, Error::NotFound(Entity::Task)));

    let write = env
        .tasks()
        .update_task(
            INTRUDER,
            &task.id,
            TaskPatch {
                title: Some("stolen".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(write, Error::NotFound(Entity::Task)));

    let delete = env.tasks().delete_task(INTRUDER, &task.id).unwrap_err();
    assert!(matches!(delete, Error::NotFound(Entity::Task)));

    // And none of the attempts changed anything.
    let details = env.tasks().task_details(&task.id, OWNER).unwrap();
    assert_eq!(details.task.title, "mine");
}

#[test]
fn goal_operations_enforce_ownership_the_same_way() {
    let env = TestEnv::new();
    let goal = env.goals().create_goal(OWNER, NewGoal::new("Mine")).unwrap();

    assert!(matches!(
        env.goals().goal(&goal.goal.id, INTRUDER).unwrap_err(),
        Error::NotFound(Entity::Goal)
    ));
    assert!(matches!(
        env.goals()
            .update_goal(INTRUDER, &goal.goal.id, GoalPatch::default())
            .unwrap_err(),
        Error::NotFound(Entity::Goal)
    ));
    assert!(matches!(
        env.goals().delete_goal(INTRUDER, &goal.goal.id).unwrap_err(),
        Error::NotFound(Entity::Goal)
    ));
}

#[test]
fn columns_cannot_be_edited_across_users() {
    let env = TestEnv::new();
    let board = env.seed_board("Private");
    let column_id = board.columns[0].column.id.clone();

    let err = env
        .boards()
        .update_column(
            INTRUDER,
            &column_id,
            ColumnPatch {
                title: Some("hijacked".to_string()),
                ..ColumnPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(Entity::Column)));
}

#[test]
fn relink_cannot_capture_foreign_tasks() {
    let env = TestEnv::new();
    let board = env.seed_board("Private");
    let mine = env.seed_task(&board, 0, "mine");

    let their_goal = env
        .goals()
        .create_goal(INTRUDER, NewGoal::new("Theirs"))
        .unwrap();

    // The intruder's relink referencing the owner's task fails whole.
    let err = env
        .goals()
        .update_goal(
            INTRUDER,
            &their_goal.goal.id,
            GoalPatch {
                task_ids: Some(vec![mine.id.clone()]),
                ..GoalPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(Entity::Task)));

    let details = env.tasks().task_details(&mine.id, OWNER).unwrap();
    assert!(details.task.goal_id.is_none());
}

#[test]
fn ancestor_chain_stops_at_foreign_boards() {
    let env = TestEnv::new();
    let board = env.seed_board("Private");
    let foreign_board = env.boards().create_board(INTRUDER, "Theirs").unwrap();

    // A foreign root, then an owned child pointing at it. The child's
    // chain truncates at the ownership boundary instead of leaking the
    // foreign title.
    let foreign_root = env
        .tasks()
        .create_task(
            INTRUDER,
            momentum::task::NewTask::new(&foreign_board.columns[0].column.id, "their secret"),
        )
        .unwrap();

    let mine = env.seed_task(&board, 0, "mine");
    env.backend
        .update(|db| {
            let task = db.tasks.iter_mut().find(|task| task.id == mine.id).unwrap();
            task.parent_id = Some(foreign_root.id.clone());
            Ok(())
        })
        .unwrap();

    let details = env.tasks().task_details(&mine.id, OWNER).unwrap();
    assert!(details.parent.is_none());
}
