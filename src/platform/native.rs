//! Native platform: used by tests and the command-line stub

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::NaiveDate;
use futures_util::future::LocalBoxFuture;

use crate::persistence::Spawner;
use crate::settings::Settings;

/// Queues spawned tasks until `run_until_idle` drives them
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<LocalBoxFuture<'static, ()>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run queued tasks in submission order, including ones they spawn
    pub fn run_until_idle(&self) {
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => pollster::block_on(task),
                None => break,
            }
        }
    }
}

impl Spawner for TaskQueue {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push_back(task);
    }
}

pub fn init_logging(settings: &Settings) {
    if env_logger::Builder::new()
        .filter_level(settings.verbosity.level_filter())
        .parse_default_env()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already installed");
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
