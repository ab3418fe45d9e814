//! Background progress display.
//!
//! One thread, one loop: sleep a tick, sample the shared state, draw. The
//! reporter only reads [`ProgressState`]; it exits after drawing the first
//! frame whose sample shows the transfer inactive, so the final totals are
//! always on screen when the thread is joined.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::frame::{plain_line, render};
use super::state::ProgressState;
use crate::console::{Screen, SharedScreen};

pub const DEFAULT_TICK: Duration = Duration::from_millis(50);
pub const DEFAULT_PLAIN_EVERY: Duration = Duration::from_secs(5);

pub struct Reporter {
    progress: Arc<ProgressState>,
    screen: SharedScreen,
    tick: Duration,
    plain_every: u32,
}

impl Reporter {
    pub fn new(progress: Arc<ProgressState>, screen: SharedScreen, tick: Duration) -> Self {
        Self {
            progress,
            screen,
            tick,
            plain_every: 1,
        }
        .plain_every(DEFAULT_PLAIN_EVERY)
    }

    /// How often a non-interactive console gets a snapshot line.
    pub fn plain_every(mut self, every: Duration) -> Self {
        let tick = self.tick.as_millis().max(1);
        let ticks = (every.as_millis() / tick).max(1);
        self.plain_every = u32::try_from(ticks).unwrap_or(u32::MAX);
        self
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("progress".into())
            .spawn(move || self.run())
    }

    fn run(self) {
        let mut ticks: u32 = 0;
        loop {
            thread::sleep(self.tick);
            ticks = ticks.wrapping_add(1);

            // Progress lock is released before the screen lock is taken.
            let sample = self.progress.sample();
            let finished = !sample.snapshot.active;

            let mut screen = Screen::lock(&self.screen);
            // Drawing failures (closed stdout, resized pty) are cosmetic.
            if screen.is_interactive() {
                let width = screen.width();
                let _ = screen.draw(&render(&sample, width));
            } else if finished || ticks % self.plain_every == 0 {
                let _ = screen.print(&plain_line(&sample));
            }
            if finished {
                screen.release();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::Recorder;

    fn lines_of(rec: &Recorder) -> Vec<String> {
        rec.ops()
            .into_iter()
            .filter_map(|o| o.strip_prefix("line:").map(str::to_string))
            .collect()
    }

    #[test]
    fn draws_final_frame_then_exits() {
        let rec = Recorder::interactive(60);
        let screen = Screen::shared(Box::new(rec.clone()));
        let progress = Arc::new(ProgressState::new());
        progress.set_totals(2, 5);
        progress.announce("a.txt", 5);
        progress.commit(5);
        progress.commit(0);
        progress.finish();

        Reporter::new(Arc::clone(&progress), screen, Duration::from_millis(1))
            .spawn()
            .unwrap()
            .join()
            .unwrap();

        let lines = lines_of(&rec);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("100.00% (2/2 files)"));
        assert!(lines[4].contains("a.txt"));
    }

    #[test]
    fn runs_until_finished() {
        let rec = Recorder::interactive(80);
        let screen = Screen::shared(Box::new(rec.clone()));
        let progress = Arc::new(ProgressState::new());
        progress.set_totals(1, 10);

        let handle = Reporter::new(Arc::clone(&progress), screen, Duration::from_millis(1))
            .spawn()
            .unwrap();
        thread::sleep(Duration::from_millis(30));
        assert!(!handle.is_finished());
        progress.commit(10);
        progress.finish();
        handle.join().unwrap();

        let lines = lines_of(&rec);
        assert!(lines.len() >= 5);
        assert!(lines[lines.len() - 4].starts_with("100.00%"));
    }

    #[test]
    fn plain_console_prints_sparse_snapshots() {
        let rec = Recorder::plain();
        let screen = Screen::shared(Box::new(rec.clone()));
        let progress = Arc::new(ProgressState::new());
        progress.set_totals(4, 100);

        let handle = Reporter::new(Arc::clone(&progress), screen, Duration::from_millis(1))
            .plain_every(Duration::from_secs(3600))
            .spawn()
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        progress.commit(50);
        progress.finish();
        handle.join().unwrap();

        // Only the final snapshot; the interval never elapsed.
        let lines = lines_of(&rec);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("50.00% (1/4 files"));
        assert!(rec.ops().iter().all(|o| !o.starts_with("up:")));
    }

    #[test]
    fn plain_interval_is_counted_in_ticks() {
        let progress = Arc::new(ProgressState::new());
        let screen = Screen::shared(Box::new(Recorder::plain()));
        let r = Reporter::new(progress, screen, Duration::from_millis(50))
            .plain_every(Duration::from_secs(5));
        assert_eq!(r.plain_every, 100);
    }
}
