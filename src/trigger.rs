//! Edge Detection
//!
//! Turns level-sampled button or gate signals into one-shot events.

/// Rising-edge detector with one sample of memory
///
/// Fires once on a low-to-high transition. A level held high across many
/// frames fires only on the first of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RisingEdge {
    last: bool,
}

impl RisingEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level; returns true on a rising edge
    pub fn process(&mut self, level: bool) -> bool {
        let fired = level && !self.last;
        self.last = level;
        fired
    }

    pub fn reset(&mut self) {
        self.last = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_while_held() {
        let mut edge = RisingEdge::new();
        let fired: Vec<bool> = [false, true, true, true, false, true]
            .iter()
            .map(|&level| edge.process(level))
            .collect();
        assert_eq!(fired, vec![false, true, false, false, false, true]);
    }

    #[test]
    fn test_reset_rearms() {
        let mut edge = RisingEdge::new();
        assert!(edge.process(true));
        edge.reset();
        assert!(edge.process(true));
    }
}
