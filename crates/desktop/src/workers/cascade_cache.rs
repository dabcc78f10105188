use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use eyepong_core::shared::constants::{
    EYE_CASCADE_NAME, EYE_CASCADE_URL, FACE_CASCADE_NAME, FACE_CASCADE_URL,
};
use eyepong_core::shared::model_resolver;

/// Resolves the face and eye cascades in the background at startup.
/// Workers wait here instead of downloading on their own.
pub struct CascadeCache {
    face: Arc<CascadeSlot>,
    eye: Arc<CascadeSlot>,
}

struct CascadeSlot {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Arc<Mutex<(u64, u64)>>,
}

impl CascadeCache {
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            face: Arc::new(CascadeSlot::new()),
            eye: Arc::new(CascadeSlot::new()),
        });

        let face_slot = cache.face.clone();
        let eye_slot = cache.eye.clone();
        thread::spawn(move || {
            face_slot.resolve(FACE_CASCADE_NAME, FACE_CASCADE_URL);
            eye_slot.resolve(EYE_CASCADE_NAME, EYE_CASCADE_URL);
        });

        cache
    }

    /// Blocks until both cascade paths are known. `on_progress` receives
    /// `(downloaded, total)` while a download runs.
    pub fn wait_for_cascades(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<(PathBuf, PathBuf), String> {
        let face = self.face.wait(on_progress, cancelled)?;
        let eye = self.eye.wait(on_progress, cancelled)?;
        Ok((face, eye))
    }
}

impl CascadeSlot {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn resolve(&self, name: &str, url: &str) {
        let progress_mutex = self.progress.clone();
        let result = model_resolver::resolve(
            name,
            url,
            None,
            Some(Box::new(move |downloaded, total| {
                *progress_mutex.lock().unwrap_or_else(PoisonError::into_inner) =
                    (downloaded, total);
            })),
        );
        if let Err(ref e) = result {
            log::warn!("Could not resolve {name}: {e}");
        }
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(result.map_err(|e| e.to_string()));
        self.ready.notify_all();
    }

    fn wait(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        let mut guard = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err("Cancelled".into());
            }
            if let Some(ref result) = *guard {
                return result.clone();
            }
            if let Ok(progress) = self.progress.try_lock() {
                let (downloaded, total) = *progress;
                if total > 0 {
                    on_progress(downloaded, total);
                }
            }
            guard = self
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_returns_published_result() {
        let slot = CascadeSlot::new();
        *slot.result.lock().unwrap() = Some(Ok(PathBuf::from("/cache/face.xml")));
        let path = slot.wait(&|_, _| {}, &AtomicBool::new(false)).unwrap();
        assert_eq!(path, PathBuf::from("/cache/face.xml"));
    }

    #[test]
    fn test_wait_honors_cancellation() {
        let slot = CascadeSlot::new();
        let result = slot.wait(&|_, _| {}, &AtomicBool::new(true));
        assert_eq!(result, Err("Cancelled".to_string()));
    }

    #[test]
    fn test_wait_forwards_download_progress() {
        let slot = Arc::new(CascadeSlot::new());
        *slot.progress.lock().unwrap() = (10, 40);
        let cancelled = Arc::new(AtomicBool::new(false));

        let publisher = slot.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            *publisher.result.lock().unwrap() = Some(Err("offline".into()));
            publisher.ready.notify_all();
        });

        let seen = Mutex::new(Vec::new());
        let result = slot.wait(&|d, t| seen.lock().unwrap().push((d, t)), &cancelled);
        handle.join().unwrap();

        assert_eq!(result, Err("offline".to_string()));
        assert!(seen.lock().unwrap().contains(&(10, 40)));
    }
}
