//! Keyed fan-out/fan-in with a settle-all join.
//!
//! Every task runs to completion on the current task; a failure is recorded
//! against its key and never cancels or hides its siblings.

use std::future::Future;

use futures::future::join_all;

use crate::error::AppError;

pub struct TaskGroup<K, F> {
    tasks: Vec<(K, F)>,
}

#[derive(Debug)]
pub struct Settled<K, T, E = AppError> {
    pub succeeded: Vec<(K, T)>,
    pub failed: Vec<(K, E)>,
}

impl<K, F> Default for TaskGroup<K, F> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<K, F, T, E> TaskGroup<K, F>
where
    F: Future<Output = Result<T, E>>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: K, task: F) {
        self.tasks.push((key, task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drives every task to completion. Results keep the order tasks were pushed in.
    pub async fn settle(self) -> Settled<K, T, E> {
        let (keys, tasks): (Vec<K>, Vec<F>) = self.tasks.into_iter().unzip();
        let results = join_all(tasks).await;

        let mut settled = Settled {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (key, result) in keys.into_iter().zip(results) {
            match result {
                Ok(value) => settled.succeeded.push((key, value)),
                Err(e) => settled.failed.push((key, e)),
            }
        }
        settled
    }
}

impl<K, F> FromIterator<(K, F)> for TaskGroup<K, F> {
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}
