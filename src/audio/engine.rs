// Audio engine abstraction and the single-owner slot that holds it

use crate::error::MediaError;
use crate::media::MediaSelection;

/// Something that must be explicitly released before it is dropped or replaced
pub trait Release {
    fn release(&mut self);
}

/// One audio decoding/playback instance
pub trait AudioEngine: Send {
    /// Attach the data source
    fn bind(&mut self, source: &MediaSelection) -> Result<(), MediaError>;
    /// Open and probe the bound source; fails for unreadable or malformed input
    fn prepare(&mut self) -> Result<(), MediaError>;
    fn start(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn stop(&mut self);
    /// Free every resource; the engine is unusable afterwards
    fn release(&mut self);
    fn is_playing(&self) -> bool;
}

impl Release for Box<dyn AudioEngine> {
    fn release(&mut self) {
        AudioEngine::release(self.as_mut());
    }
}

/// Builds fresh engine instances
pub trait EngineFactory: Send {
    fn create(&self) -> Box<dyn AudioEngine>;
}

/// Holds at most one resource; replacing or dropping releases the occupant
pub struct ResourceSlot<T: Release> {
    occupant: Option<T>,
}

impl<T: Release> ResourceSlot<T> {
    pub fn empty() -> Self {
        Self { occupant: None }
    }

    /// Release whatever is held, then build and install the new resource
    pub fn replace_with(&mut self, make: impl FnOnce() -> T) -> &mut T {
        self.clear();
        self.occupant.insert(make())
    }

    /// Release and drop the current occupant, if any
    pub fn clear(&mut self) {
        if let Some(mut old) = self.occupant.take() {
            old.release();
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.occupant.as_mut()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

impl<T: Release> Default for ResourceSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Release> Drop for ResourceSlot<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counted {
        live: Arc<AtomicUsize>,
        released: bool,
    }

    impl Counted {
        fn new(live: &Arc<AtomicUsize>, peak: &AtomicUsize) -> Self {
            let now = live.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            Self { live: live.clone(), released: false }
        }
    }

    impl Release for Counted {
        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_replace_releases_previous() {
        let live = Arc::new(AtomicUsize::new(0));
        let peak = AtomicUsize::new(0);
        let mut slot = ResourceSlot::empty();

        for _ in 0..5 {
            slot.replace_with(|| Counted::new(&live, &peak));
            assert_eq!(live.load(Ordering::SeqCst), 1);
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);

        slot.clear();
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_drop_releases_occupant() {
        let live = Arc::new(AtomicUsize::new(0));
        let peak = AtomicUsize::new(0);
        {
            let mut slot = ResourceSlot::empty();
            slot.replace_with(|| Counted::new(&live, &peak));
        }
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
