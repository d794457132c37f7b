//! Derived views over the store: list, board and calendar.
//!
//! Each view is a pure function of `TaskStore::visible_tasks()`. The board is the
//! only view that writes back, through `drop_on_column`.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::fields::Status;
use crate::store::TaskStore;
use crate::task::Task;

/// Tasks shown per calendar day before the rest collapse into a count.
pub const CALENDAR_DAY_LIMIT: usize = 3;

/// One row per visible task, in stored order.
pub fn list_view(store: &TaskStore) -> Vec<&Task> {
    store.visible_tasks()
}

/// Visible tasks partitioned into the three status columns.
#[derive(Debug)]
pub struct BoardColumns<'a> {
    columns: [Vec<&'a Task>; 3],
}

impl<'a> BoardColumns<'a> {
    pub fn column(&self, status: Status) -> &[&'a Task] {
        &self.columns[status.column_index()]
    }

    /// Columns in board order with their status.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &[&'a Task])> + '_ {
        Status::ALL
            .iter()
            .map(move |&s| (s, self.columns[s.column_index()].as_slice()))
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

/// Partition the visible tasks by status, keeping stored order inside each column.
pub fn board_view(store: &TaskStore) -> BoardColumns<'_> {
    let mut columns: [Vec<&Task>; 3] = Default::default();
    for task in store.visible_tasks() {
        columns[task.status.column_index()].push(task);
    }
    BoardColumns { columns }
}

/// A task card dropped on a board column. Same as `update_status`; dropping a
/// card on its own column only refreshes `updated_at`.
pub fn drop_on_column(store: &mut TaskStore, task_id: &str, column: Status) -> bool {
    store.update_status(task_id, column)
}

/// One cell of the calendar grid.
#[derive(Debug)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    /// First `CALENDAR_DAY_LIMIT` tasks due that day, in stored order.
    pub tasks: Vec<&'a Task>,
    /// How many more tasks are due that day.
    pub overflow: usize,
}

/// A month laid out in Sunday-first weeks.
#[derive(Debug)]
pub struct CalendarMonth<'a> {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub days: Vec<CalendarDay<'a>>,
}

impl<'a> CalendarMonth<'a> {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay<'a>]> + '_ {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Bucket visible tasks by due date over the grid for the month containing
/// `month`. Tasks without a due date never appear.
pub fn calendar_view(store: &TaskStore, month: NaiveDate, today: NaiveDate) -> CalendarMonth<'_> {
    let first = first_of_month(month);
    let last = last_of_month(month);
    let grid_start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let grid_end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);

    let visible = store.visible_tasks();
    let mut days = Vec::new();
    let mut date = grid_start;
    while date <= grid_end {
        let mut due: Vec<&Task> = visible
            .iter()
            .copied()
            .filter(|t| t.due_date == Some(date))
            .collect();
        let overflow = due.len().saturating_sub(CALENDAR_DAY_LIMIT);
        due.truncate(CALENDAR_DAY_LIMIT);
        days.push(CalendarDay {
            date,
            in_month: date.month() == first.month() && date.year() == first.year(),
            is_today: date == today,
            tasks: due,
            overflow,
        });
        date += Duration::days(1);
    }

    CalendarMonth { month: first, days }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(first)
}

/// First day of the following month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// First day of the preceding month.
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, status: Status, due: Option<NaiveDate>) -> Task {
        let mut t = Task::new(id, format!("Task {id}"));
        t.status = status;
        t.due_date = due;
        t
    }

    fn mixed_store() -> TaskStore {
        TaskStore::new(vec![
            task("a", Status::Done, None),
            task("b", Status::Todo, None),
            task("c", Status::InProgress, None),
            task("d", Status::Todo, None),
            task("e", Status::Done, None),
        ])
    }

    #[test]
    fn test_list_view_is_visible_tasks_in_order() {
        let mut store = TaskStore::with_seed();
        let ids: Vec<_> = list_view(&store).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        store.set_search_query("API");
        let ids: Vec<_> = list_view(&store).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_board_is_a_strict_partition() {
        let store = mixed_store();
        let board = board_view(&store);

        let col = |s| board.column(s).iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(col(Status::Todo), vec!["b", "d"]);
        assert_eq!(col(Status::InProgress), vec!["c"]);
        assert_eq!(col(Status::Done), vec!["a", "e"]);

        let mut from_board: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, tasks) in board.iter() {
            for t in tasks {
                *from_board.entry(t.id.as_str()).or_default() += 1;
            }
        }
        let mut from_visible: BTreeMap<&str, usize> = BTreeMap::new();
        for t in store.visible_tasks() {
            *from_visible.entry(t.id.as_str()).or_default() += 1;
        }
        assert_eq!(from_board, from_visible);
        assert_eq!(board.total(), store.visible_tasks().len());
    }

    #[test]
    fn test_board_respects_search() {
        let mut store = mixed_store();
        store.set_search_query("task d");
        let board = board_view(&store);
        assert_eq!(board.total(), 1);
        assert_eq!(board.column(Status::Todo)[0].id, "d");
    }

    #[test]
    fn test_drop_moves_card_between_columns() {
        let mut store = mixed_store();
        assert!(drop_on_column(&mut store, "b", Status::Done));
        let board = board_view(&store);
        let done: Vec<_> = board.column(Status::Done).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(done, vec!["a", "b", "e"]);

        let stamp = store.get("c").unwrap().updated_at;
        assert!(drop_on_column(&mut store, "c", Status::InProgress));
        assert_eq!(store.get("c").unwrap().status, Status::InProgress);
        assert!(store.get("c").unwrap().updated_at > stamp);

        assert!(!drop_on_column(&mut store, "missing", Status::Todo));
    }

    #[test]
    fn test_calendar_grid_spans_whole_weeks() {
        let store = TaskStore::new(Vec::new());
        // October 2026 starts on a Thursday and ends on a Saturday.
        let cal = calendar_view(&store, d(2026, 10, 18), d(2026, 10, 18));
        assert_eq!(cal.month, d(2026, 10, 1));
        assert_eq!(cal.days.first().unwrap().date, d(2026, 9, 27));
        assert_eq!(cal.days.last().unwrap().date, d(2026, 10, 31));
        assert_eq!(cal.days.len() % 7, 0);
        assert!(cal.weeks().all(|w| w.len() == 7));
        assert!(!cal.day(d(2026, 9, 30)).unwrap().in_month);
        assert!(cal.day(d(2026, 10, 18)).unwrap().is_today);
        assert!(!cal.day(d(2026, 10, 17)).unwrap().is_today);
    }

    #[test]
    fn test_calendar_buckets_and_overflow() {
        let day = d(2026, 10, 20);
        let store = TaskStore::new(vec![
            task("1", Status::Todo, Some(day)),
            task("2", Status::Todo, None),
            task("3", Status::Done, Some(day)),
            task("4", Status::Todo, Some(day)),
            task("5", Status::Todo, Some(day)),
            task("6", Status::Todo, Some(day)),
            task("7", Status::Todo, Some(d(2026, 10, 21))),
        ]);
        let cal = calendar_view(&store, day, d(2026, 10, 1));

        let cell = cal.day(day).unwrap();
        let ids: Vec<_> = cell.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
        assert_eq!(cell.overflow, 2);

        let next = cal.day(d(2026, 10, 21)).unwrap();
        assert_eq!(next.tasks.len(), 1);
        assert_eq!(next.overflow, 0);

        let shown: usize = cal.days.iter().map(|c| c.tasks.len() + c.overflow).sum();
        assert_eq!(shown, 6, "undated task must not appear");
    }

    #[test]
    fn test_calendar_respects_search() {
        let day = d(2026, 10, 20);
        let mut store = TaskStore::new(vec![
            task("1", Status::Todo, Some(day)),
            task("2", Status::Todo, Some(day)),
        ]);
        store.set_search_query("task 2");
        let cal = calendar_view(&store, day, day);
        assert_eq!(cal.day(day).unwrap().tasks.len(), 1);
    }

    #[test]
    fn test_month_navigation() {
        assert_eq!(next_month(d(2026, 12, 15)), d(2027, 1, 1));
        assert_eq!(prev_month(d(2026, 1, 31)), d(2025, 12, 1));
        assert_eq!(last_of_month(d(2024, 2, 3)), d(2024, 2, 29));
        assert_eq!(first_of_month(d(2026, 10, 18)), d(2026, 10, 1));
    }
}
