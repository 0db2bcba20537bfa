//! Daily task list with planned and completed pomodoro counts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Allowed planned-pomodoro counts for a task.
pub const PLANNED_POMODOROS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task name cannot be empty")]
    EmptyName,
    #[error("No task with id {0}")]
    NotFound(Uuid),
    #[error("No task at position {0}")]
    NoSuchPosition(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub planned_pomodoros: u32,
    pub completed_pomodoros: u32,
    pub is_completed: bool,
    /// Local date the task was added; tasks belong to that day's list.
    pub created_at: NaiveDate,
}

impl Task {
    pub fn new(name: &str, planned_pomodoros: u32, created_at: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            planned_pomodoros: clamp_planned(planned_pomodoros),
            completed_pomodoros: 0,
            is_completed: false,
            created_at,
        }
    }

    /// Done either explicitly or by reaching the planned count.
    pub fn is_done(&self) -> bool {
        self.is_completed || self.completed_pomodoros >= self.planned_pomodoros
    }
}

/// Changes to apply to an existing task. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub planned_pomodoros: Option<u32>,
    pub is_completed: Option<bool>,
}

/// All tasks plus the one currently being worked on.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    active: Option<Uuid>,
}

impl TaskList {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            active: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks created on `today`, in insertion order.
    pub fn today_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.created_at == today).collect()
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.and_then(|id| self.get(id))
    }

    /// Adds a task and returns its id.
    pub fn add(
        &mut self,
        name: &str,
        planned_pomodoros: u32,
        today: NaiveDate,
    ) -> Result<Uuid, TaskError> {
        if name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        let task = Task::new(name, planned_pomodoros, today);
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    pub fn update(&mut self, id: Uuid, update: TaskUpdate) -> Result<(), TaskError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(TaskError::EmptyName);
            }
        }

        let task = self.get_mut(id)?;
        if let Some(name) = update.name {
            task.name = name.trim().to_string();
        }
        if let Some(planned) = update.planned_pomodoros {
            task.planned_pomodoros = clamp_planned(planned);
        }
        if let Some(done) = update.is_completed {
            task.is_completed = done;
        }
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(self.tasks.remove(index))
    }

    /// Records one finished pomodoro against a task, completing it once the
    /// planned count is reached.
    pub fn increment_pomodoro(&mut self, id: Uuid) -> Result<(), TaskError> {
        let task = self.get_mut(id)?;
        task.completed_pomodoros += 1;
        task.is_completed = task.completed_pomodoros >= task.planned_pomodoros;
        Ok(())
    }

    pub fn toggle_complete(&mut self, id: Uuid) -> Result<(), TaskError> {
        let task = self.get_mut(id)?;
        task.is_completed = !task.is_completed;
        Ok(())
    }

    /// Selects the task being worked on, or clears the selection with `None`.
    pub fn set_active(&mut self, id: Option<Uuid>) -> Result<(), TaskError> {
        if let Some(id) = id {
            self.get_mut(id)?;
        }
        self.active = id;
        Ok(())
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }
}

fn clamp_planned(planned: u32) -> u32 {
    planned.clamp(*PLANNED_POMODOROS_RANGE.start(), *PLANNED_POMODOROS_RANGE.end())
}
