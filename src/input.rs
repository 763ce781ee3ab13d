use crate::geom::Vec2;

/// Keys the editor core reacts to (canvas panning). The embedding
/// application maps its own backend's key events onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Key {
    W,
    A,
    S,
    D,
}

/// Small fixed key set; one bit per `Key`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySet(u32);

impl KeySet {
    pub fn press(&mut self, key: Key) {
        self.0 |= 1 << key as u32;
    }

    pub fn release(&mut self, key: Key) {
        self.0 &= !(1 << key as u32);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.0 & (1 << key as u32) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Snapshot of the input device state for one frame. The embedding
/// application fills this in from its window backend before calling
/// `CircuitEditor::update`; the core never reads platform events itself.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Pointer position in screen space.
    pub mouse_pos: Vec2,
    /// Wheel delta accumulated since the previous frame.
    pub scroll: Vec2,
    /// Primary button held.
    pub primary_down: bool,
    pub keys: KeySet,
    /// Elapsed time of the previous frame, in seconds.
    pub frame_duration: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_set_round_trip() {
        let mut keys = KeySet::default();
        assert!(!keys.is_down(Key::W));
        keys.press(Key::W);
        keys.press(Key::D);
        assert!(keys.is_down(Key::W));
        assert!(keys.is_down(Key::D));
        assert!(!keys.is_down(Key::A));
        keys.release(Key::W);
        assert!(!keys.is_down(Key::W));
        keys.clear();
        assert!(!keys.is_down(Key::D));
    }
}
