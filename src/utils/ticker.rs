use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Calls a closure at a fixed interval on its own thread until dropped.
///
/// The callback returns `false` to stop early, e.g. when its receiver is gone.
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F>(interval: Duration, mut callback: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let step = interval.min(Duration::from_millis(100)).max(Duration::from_millis(1));

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + interval;
            while !flag.load(Ordering::SeqCst) {
                let now = Instant::now();
                if now >= next {
                    if !callback() {
                        break;
                    }
                    next += interval;
                    // Skip missed beats instead of firing a burst after a stall
                    if next < now {
                        next = now + interval;
                    }
                    continue;
                }
                thread::sleep(step.min(next - now));
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
