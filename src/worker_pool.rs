use std::sync::{Mutex, PoisonError};
use std::thread;

/// Runs `task` on every item using at most `workers` threads. Each item is
/// handed to exactly one worker. Returns once all items are done.
pub fn for_each_bounded<I, F>(items: I, workers: usize, task: F)
where
    I: IntoIterator,
    I::IntoIter: Send,
    I::Item: Send,
    F: Fn(I::Item) + Sync,
{
    let workers = workers.max(1);
    if workers == 1 {
        items.into_iter().for_each(task);
        return;
    }

    let queue = Mutex::new(items.into_iter());
    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                // Holding the lock only for `next()` keeps the work itself parallel.
                let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                match next {
                    Some(item) => task(item),
                    None => break,
                }
            });
        }
    });
}
