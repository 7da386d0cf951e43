use std::sync::atomic::{AtomicU32, Ordering};

/// Playback clock in seconds. Animators keep a shared handle to one of
/// these, so a single clock can drive every animation bound from it and
/// advancing it needs no locking.
#[derive(Debug, Default)]
pub struct AnimationClock {
    bits: AtomicU32,
}

impl AnimationClock {
    #[must_use]
    pub fn new(seconds: f32) -> Self {
        Self {
            bits: AtomicU32::new(seconds.to_bits()),
        }
    }

    #[must_use]
    pub fn seconds(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set_seconds(&self, seconds: f32) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    /// Moves the clock forward, or backward for a negative delta
    pub fn advance(&self, delta: f32) {
        self.set_seconds(self.seconds() + delta);
    }
}
