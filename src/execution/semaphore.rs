use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A small, blocking counting semaphore bounding in-flight chunks.
///
/// Permits are returned when the [`Permit`] guard drops, so a panicking chunk cannot leak one.
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// An acquired permit. Releases on drop.
pub struct Permit<'a> {
    sem: &'a Semaphore,
    waited: Duration,
}

impl Permit<'_> {
    /// Time spent blocked before the permit was granted (zero if none).
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut g = self.sem.lock();
        *g += 1;
        self.sem.cv.notify_one();
    }
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        assert!(permits > 0, "permits must be > 0");
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    /// Acquire one permit, blocking until available.
    pub fn acquire(&self) -> Permit<'_> {
        let start = Instant::now();
        let mut waited = false;
        let mut g = self.lock();
        while *g == 0 {
            waited = true;
            g = self.cv.wait(g).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *g -= 1;
        Permit {
            sem: self,
            waited: if waited { start.elapsed() } else { Duration::ZERO },
        }
    }

    // Chunk closures never run while the lock is held, so a poisoned count is still accurate.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.permits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::Semaphore;

    #[test]
    fn uncontended_acquire_does_not_wait() {
        let sem = Semaphore::new(2);
        let a = sem.acquire();
        let b = sem.acquire();
        assert_eq!(a.waited(), Duration::ZERO);
        assert_eq!(b.waited(), Duration::ZERO);
    }

    #[test]
    fn dropping_a_permit_wakes_a_waiter() {
        let sem = Arc::new(Semaphore::new(1));
        let held = sem.acquire();

        let sem2 = Arc::clone(&sem);
        let waiter = std::thread::spawn(move || sem2.acquire().waited());

        std::thread::sleep(Duration::from_millis(20));
        drop(held);
        let waited = waiter.join().unwrap();
        assert!(waited > Duration::ZERO);
    }
}
