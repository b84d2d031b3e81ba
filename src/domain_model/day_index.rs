use crate::domain_model::{CalendarDay, Task};
use std::collections::BTreeMap;

/// Task count per day, kept up to date on insert and remove so highlight
/// queries don't rescan the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayIndex {
    counts: BTreeMap<CalendarDay, usize>,
}

impl DayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut index = Self::new();
        for task in tasks {
            index.insert(task.date);
        }
        index
    }

    pub fn insert(&mut self, day: CalendarDay) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    pub fn remove(&mut self, day: CalendarDay) {
        if let Some(count) = self.counts.get_mut(&day) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&day);
            }
        }
    }

    pub fn count(&self, day: CalendarDay) -> usize {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.counts.contains_key(&day)
    }

    pub fn days(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.counts.keys().copied()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    #[test]
    fn day_disappears_with_its_last_task() {
        let mut index = DayIndex::new();
        index.insert(day("2024-06-01"));
        index.insert(day("2024-06-01"));
        index.insert(day("2024-06-02"));
        assert_eq!(index.count(day("2024-06-01")), 2);

        index.remove(day("2024-06-01"));
        assert!(index.contains(day("2024-06-01")));
        index.remove(day("2024-06-01"));
        assert!(!index.contains(day("2024-06-01")));
        assert_eq!(index.days().collect::<Vec<_>>(), vec![day("2024-06-02")]);
    }

    #[test]
    fn removing_an_unknown_day_is_a_no_op() {
        let mut index = DayIndex::new();
        index.remove(day("2024-06-01"));
        assert_eq!(index.days().count(), 0);
    }
}
