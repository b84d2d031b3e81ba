use crate::domain_model::{CalendarDay, DayIndex, Task, TaskKey};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryState {
    /// Added locally, the server has not acknowledged it yet.
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub task: Task,
    pub state: EntryState,
}

/// The one place personal tasks live on the client.
///
/// Local additions are tagged pending until the server confirms them, and a
/// server refetch replaces the confirmed set while absorbing any pending entry
/// it already contains. Whichever order the local append and the refetch land
/// in, a task shows up once.
#[derive(Debug, Clone, Default)]
pub struct TaskCache {
    entries: Vec<TaskEntry>,
    index: DayIndex,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_confirmed(tasks: Vec<Task>) -> Self {
        let mut cache = Self::new();
        cache.reconcile(tasks);
        cache
    }

    pub fn add_pending(&mut self, task: Task) -> TaskKey {
        let key = task.key();
        self.index.insert(task.date);
        self.entries.push(TaskEntry {
            task,
            state: EntryState::Pending,
        });
        key
    }

    /// Marks the first pending entry with `key` as confirmed. Returns false
    /// if a refetch already absorbed it.
    pub fn confirm(&mut self, key: &TaskKey) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.state == EntryState::Pending && &e.task.key() == key)
        {
            Some(entry) => {
                entry.state = EntryState::Confirmed;
                true
            }
            None => false,
        }
    }

    pub fn discard_pending(&mut self, key: &TaskKey) -> bool {
        let position = self
            .entries
            .iter()
            .position(|e| e.state == EntryState::Pending && &e.task.key() == key);
        match position {
            Some(i) => {
                let entry = self.entries.remove(i);
                self.index.remove(entry.task.date);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &TaskKey) -> Option<Task> {
        let i = self.entries.iter().position(|e| &e.task.key() == key)?;
        let entry = self.entries.remove(i);
        self.index.remove(entry.task.date);
        Some(entry.task)
    }

    pub fn reconcile(&mut self, server_tasks: Vec<Task>) {
        let known: HashSet<TaskKey> = server_tasks.iter().map(Task::key).collect();
        let still_pending: Vec<TaskEntry> = self
            .entries
            .drain(..)
            .filter(|e| e.state == EntryState::Pending && !known.contains(&e.task.key()))
            .collect();

        self.entries = server_tasks
            .into_iter()
            .map(|task| TaskEntry {
                task,
                state: EntryState::Confirmed,
            })
            .chain(still_pending)
            .collect();
        self.index = DayIndex::from_tasks(self.entries.iter().map(|e| &e.task));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn entries(&self) -> &[TaskEntry] {
        &self.entries
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.entries.iter().map(|e| e.task.clone()).collect()
    }

    pub fn tasks_on(&self, day: CalendarDay) -> Vec<Task> {
        self.entries
            .iter()
            .filter(|e| e.task.is_on(day))
            .map(|e| e.task.clone())
            .collect()
    }

    pub fn highlighted(&self) -> BTreeSet<CalendarDay> {
        self.index.days().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
