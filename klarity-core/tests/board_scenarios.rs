use chrono::NaiveDate;
use klarity_core::{
    Assistant, AssistantReply, Board, ChatContext, Inbox, Priority, Role, Task, TaskStatus, User,
    convert_to_task, ghosts_added_message,
};
use klarity_core::inbox::{Email, EmailCategory, InboxTab};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn alex() -> User {
    User::new("u1", "Alex Chen", Role::Manager).with_burnout(42)
}

fn lane_titles(board: &Board, status: TaskStatus) -> Vec<String> {
    board.lane(status).iter().map(|t| t.title.clone()).collect()
}

/// Empty TODO lane, one "Add Task", exactly one plain task due today.
#[test]
fn create_task_in_empty_todo_lane() {
    let mut board = Board::new();
    assert!(board.lane(TaskStatus::Todo).is_empty());

    board.create_task(TaskStatus::Todo, "Write proposal", today(), None);

    let lane = board.lane(TaskStatus::Todo);
    assert_eq!(lane.len(), 1);
    assert_eq!(lane[0].title, "Write proposal");
    assert!(!lane[0].is_ghost());
    assert_eq!(lane[0].priority, Priority::Medium);
    assert_eq!(lane[0].due_date, today());
}

/// Dragging a REVIEW task onto DONE moves it and updates both badges.
#[test]
fn drag_review_task_onto_done() {
    let mut board = Board::with_tasks(vec![
        Task::new("t1", "Polish onboarding", today()).with_status(TaskStatus::Review),
        Task::new("t2", "Fix login bug", today()).with_status(TaskStatus::Review),
        Task::new("t3", "Release notes", today()).with_status(TaskStatus::Done),
    ]);
    assert_eq!(board.lane_counts(), [0, 0, 2, 1]);

    assert!(board.move_task("t1", TaskStatus::Done));

    assert_eq!(lane_titles(&board, TaskStatus::Review), vec!["Fix login bug"]);
    assert!(lane_titles(&board, TaskStatus::Done).contains(&"Polish onboarding".to_string()));
    for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Review] {
        assert!(!lane_titles(&board, status).contains(&"Polish onboarding".to_string()));
    }
    assert_eq!(board.lane_counts(), [0, 0, 1, 2]);
}

/// Offline assistant asked for ghost tasks yields the single fallback ghost.
#[tokio::test]
async fn offline_ghost_scan_from_chat() {
    let assistant = Assistant::offline();
    let user = alex();
    let mut board = Board::new();
    board.create_task(TaskStatus::Todo, "Existing", today(), Some(user.id.clone()));

    let reply = {
        let ctx = ChatContext { tasks: board.tasks(), user: &user };
        assistant.handle_message("scan for ghost tasks please", ctx).await
    };
    let AssistantReply::Ghosts(drafts) = reply else {
        panic!("expected ghost drafts");
    };
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Review deployment logs");

    let ids = board.add_ghost_tasks(drafts, Some(user.id.clone()), today());
    assert_eq!(ghosts_added_message(ids.len()), "I've detected and added 1 ghost tasks to your board.");

    let lane = board.lane(TaskStatus::Todo);
    assert_eq!(lane[0].title, "Review deployment logs");
    assert!(lane[0].is_ghost());
    assert_eq!(lane[1].title, "Existing");

    // ghost iff confidence, across the whole board
    for t in board.tasks() {
        assert_eq!(t.is_ghost(), t.ai_confidence().is_some());
    }

    board.promote_ghost(&ids[0]);
    for t in board.tasks() {
        assert!(!t.is_ghost());
        assert!(t.ai_confidence().is_none());
    }
}

/// Inbox email becomes a TODO task and leaves the primary tab.
#[tokio::test]
async fn convert_email_into_task() {
    let assistant = Assistant::offline();
    let mut inbox = Inbox::new(vec![Email {
        id: "e1".into(),
        sender: "Sarah Jones".into(),
        subject: "Vendor contract".into(),
        preview: "Please review".into(),
        body: "Please review the vendor contract before Friday.".into(),
        date: "Yesterday".into(),
        read: false,
        archived: false,
        category: EmailCategory::Primary,
    }]);
    let mut board = Board::new();

    let body = inbox.get("e1").unwrap().body.clone();
    let summary = assistant.summarize_email_for_task(&body).await;
    let id = board.allocate_id("t-email");
    board.add_task(convert_to_task(id.clone(), &summary, Some("u1".into()), today()));
    inbox.mark_converted("e1");

    let t = board.get(&id).unwrap();
    assert_eq!(t.title, "Follow up on email");
    assert_eq!(t.status, TaskStatus::Todo);
    assert!(inbox.tab(InboxTab::Primary).is_empty());
    assert_eq!(inbox.tab(InboxTab::Cleared).len(), 1);
}

#[tokio::test]
async fn offline_reports_never_fail() {
    let assistant = Assistant::offline();
    let user = alex();
    let board = Board::new();

    let brief = assistant.generate_morning_brief(board.tasks(), &user).await;
    assert_eq!(brief.headline, "Good morning, Alex!");

    let report = assistant.generate_weekly_report(board.tasks(), &user).await;
    assert_eq!(report.work_style.len(), 5);

    let draft = assistant.generate_reflection_draft(board.tasks(), &user).await;
    assert!(draft.has_blockers);

    let ctx = ChatContext { tasks: board.tasks(), user: &user };
    let text = assistant.chat("how is my week?", ctx).await;
    assert!(text.contains("offline mode"));
}
