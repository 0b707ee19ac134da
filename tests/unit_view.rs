use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use flow::task::{Priority, Task};
use flow::view::{
    compute_stats, filter_tasks, is_overdue_on, sort_tasks, StatusFilter, TaskFilter,
};

fn task(id: u32, priority: Priority, completed: bool, created_at: DateTime<Utc>) -> Task {
    Task {
        id,
        title: format!("task {id}"),
        description: String::new(),
        priority,
        category: "work".to_string(),
        completed,
        created_at,
        due_date: None,
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap()
}

#[test]
fn sort_puts_incomplete_before_complete() {
    let mut tasks = vec![
        task(1, Priority::High, true, at(1)),
        task(2, Priority::Low, false, at(2)),
    ];
    sort_tasks(&mut tasks);
    assert_eq!(tasks[0].id, 2);
    assert_eq!(tasks[1].id, 1);
}

#[test]
fn sort_orders_by_priority_within_status() {
    let mut tasks = vec![
        task(1, Priority::Low, false, at(1)),
        task(2, Priority::High, false, at(1)),
        task(3, Priority::Medium, false, at(1)),
    ];
    sort_tasks(&mut tasks);
    let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn sort_breaks_priority_ties_newest_first() {
    let mut tasks = vec![
        task(1, Priority::Medium, false, at(1)),
        task(2, Priority::Medium, false, at(5)),
        task(3, Priority::Medium, false, at(3)),
    ];
    sort_tasks(&mut tasks);
    let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn sort_keeps_input_order_when_all_keys_tie() {
    // Same completion state, priority, and timestamp across the board:
    // the sort must leave the original order intact.
    let mut tasks = vec![
        task(1, Priority::Medium, false, at(4)),
        task(2, Priority::Medium, false, at(4)),
        task(3, Priority::Medium, false, at(4)),
        task(4, Priority::Medium, false, at(4)),
    ];
    sort_tasks(&mut tasks);
    let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn filter_conditions_compose_with_and() {
    let mut done_high = task(1, Priority::High, true, at(1));
    done_high.category = "work".to_string();
    let mut pending_high = task(2, Priority::High, false, at(1));
    pending_high.category = "Personal".to_string();
    let pending_low = task(3, Priority::Low, false, at(1));

    let tasks = vec![done_high, pending_high, pending_low];
    let filter = TaskFilter {
        status: StatusFilter::Pending,
        priority: Some(Priority::High),
        category: Some("personal".to_string()),
    };
    let matched = filter_tasks(&tasks, &filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, 2);
}

#[test]
fn category_filter_is_case_insensitive() {
    let tasks = vec![task(1, Priority::Medium, false, at(1))];
    let filter = TaskFilter {
        category: Some("WORK".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(filter_tasks(&tasks, &filter).len(), 1);
}

#[test]
fn status_filter_parses_known_values() {
    assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    assert_eq!(
        "pending".parse::<StatusFilter>().unwrap(),
        StatusFilter::Pending
    );
    assert_eq!(
        "completed".parse::<StatusFilter>().unwrap(),
        StatusFilter::Completed
    );
    assert!("done".parse::<StatusFilter>().is_err());
}

#[test]
fn stats_round_completion_rate() {
    let tasks = vec![
        task(1, Priority::High, true, at(1)),
        task(2, Priority::Medium, false, at(1)),
        task(3, Priority::High, false, at(1)),
    ];
    let stats = compute_stats(&tasks);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 2);
    // 1/3 rounds to 33.
    assert_eq!(stats.completion_rate, 33);
    assert_eq!(stats.high_priority_pending, 1);
}

#[test]
fn stats_for_empty_collection_are_zero() {
    let stats = compute_stats(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completion_rate, 0);
}

#[test]
fn stats_round_two_thirds_up() {
    let tasks = vec![
        task(1, Priority::Low, true, at(1)),
        task(2, Priority::Low, true, at(1)),
        task(3, Priority::Low, false, at(1)),
    ];
    assert_eq!(compute_stats(&tasks).completion_rate, 67);
}

// Overdue checks compare the due date in the local timezone, so build
// the fixtures in local time and store them as UTC.
fn local_eod(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(year, month, day, 23, 59, 59)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

#[test]
fn overdue_compares_date_only() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

    let mut due_yesterday = task(1, Priority::Medium, false, at(1));
    due_yesterday.due_date = Some(local_eod(2026, 3, 9));
    assert!(is_overdue_on(&due_yesterday, today));

    // Due later today is not overdue regardless of time of day.
    let mut due_today = task(2, Priority::Medium, false, at(1));
    due_today.due_date = Some(local_eod(2026, 3, 10));
    assert!(!is_overdue_on(&due_today, today));
}

#[test]
fn completed_tasks_are_never_overdue() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let mut done = task(1, Priority::Medium, true, at(1));
    done.due_date = Some(local_eod(2026, 3, 1));
    assert!(!is_overdue_on(&done, today));
}

#[test]
fn tasks_without_due_dates_are_never_overdue() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let pending = task(1, Priority::Medium, false, at(1));
    assert!(!is_overdue_on(&pending, today));
}
