use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::debug;

use crate::errors::RefactorResult;

/// Fixed-size pool of workers shared by every phase of a run.
///
/// Each worker is one admission slot: a task holds it for the whole time it touches
/// the filesystem and gives it back when it returns, on success and failure alike.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    size: NonZeroUsize,
    progress: bool,
}

impl WorkerPool {
    pub fn new(size: NonZeroUsize, progress: bool) -> RefactorResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(size.get())
            .thread_name(|i| format!("refactor-worker-{}", i))
            .build()?;
        debug!("Built worker pool with {} slots", size);
        Ok(Self {
            pool,
            size,
            progress,
        })
    }

    pub fn size(&self) -> NonZeroUsize {
        self.size
    }

    /// Runs `work` on every item inside the pool while `collect` drains the results
    /// on a dedicated consumer thread.
    ///
    /// Returns only after every task and the consumer have finished. `collect` is the
    /// sole owner of whatever it accumulates into, so producers never share state.
    pub fn fan_in<I, T, W, C, R>(&self, label: &str, items: &[I], work: W, collect: C) -> R
    where
        I: Sync,
        T: Send,
        W: Fn(&I) -> T + Sync,
        C: FnOnce(Receiver<T>) -> R + Send,
        R: Send,
    {
        let bar = self.progress_bar(label, items.len());
        let (tx, rx) = mpsc::channel();

        let result = thread::scope(|scope| {
            let consumer = scope.spawn(move || collect(rx));

            self.pool.install(|| {
                items.par_iter().for_each_with(tx, |tx, item| {
                    let output = work(item);
                    bar.inc(1);
                    // The consumer only stops once every sender is gone.
                    let _ = tx.send(output);
                });
            });

            match consumer.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        });

        bar.finish_and_clear();
        result
    }

    fn progress_bar(&self, label: &str, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg:>10} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message(label.to_string());
        bar
    }
}
