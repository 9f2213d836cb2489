//! Undo/redo history of layer snapshots.
//!
//! Every completed gesture pushes a checkpoint holding a full copy of the
//! mutated layer. Undo restores the most recent earlier checkpoint of the
//! same layer (or clears the layer if there is none); redo re-applies what
//! undo took away.
//!
//! Maintains two stacks:
//! - `history`: checkpoints that can be undone (most recent at the end)
//! - `future`: snapshots that can be redone (most recent at the end)

use std::fmt;

use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::layers::LayerRegistry;
use crate::pixel_buffer::PixelBuffer;

/// Kind of gesture that produced a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Bucket fill
    BucketFill,
    /// Pen stroke
    DrawPixel,
    /// Eraser stroke
    ErasePixel,
    /// Gap drawer stroke
    AbDraw,
    /// Magnetic drawer stroke
    TabDraw,
    /// Magic wand stroke
    MagicDraw,
}

impl HistoryAction {
    /// Get a human-readable description of this action
    pub fn description(&self) -> &'static str {
        match self {
            HistoryAction::BucketFill => "Bucket fill",
            HistoryAction::DrawPixel => "Draw",
            HistoryAction::ErasePixel => "Erase",
            HistoryAction::AbDraw => "Gap draw",
            HistoryAction::TabDraw => "Magnetic draw",
            HistoryAction::MagicDraw => "Magic wand",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One snapshot of one layer.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Layer the snapshot belongs to
    pub layer: String,
    /// Undo stops at undeletable entries
    pub undeletable: bool,
    /// Full copy of the layer's pixels
    pub snapshot: PixelBuffer,
    /// Sequence letter (`a`..`z`, wrapping)
    pub letter: char,
    /// Gesture that produced the snapshot
    pub action: HistoryAction,
}

/// Configuration for the history log
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of checkpoints to keep
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Bounded checkpoint log with undo/redo.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    history: Vec<HistoryEntry>,
    future: Vec<HistoryEntry>,
    letter_index: usize,
    config: HistoryConfig,
}

impl HistoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn next_letter(&mut self) -> char {
        let letter = char::from(b'a' + (self.letter_index % 26) as u8);
        self.letter_index += 1;
        letter
    }

    /// Drop the oldest checkpoints beyond capacity.
    ///
    /// An entry is only evicted if its layer has a newer checkpoint, which
    /// then becomes the layer's baseline so undo stops at the oldest state
    /// still on record instead of clearing the layer.
    fn trim(&mut self) {
        let capacity = self.config.max_history.max(1);
        while self.history.len() > capacity {
            let evictable = self.history.iter().enumerate().find_map(|(i, entry)| {
                self.history[i + 1..]
                    .iter()
                    .position(|newer| newer.layer == entry.layer)
                    .map(|offset| (i, i + 1 + offset))
            });
            let Some((oldest, successor)) = evictable else {
                break;
            };
            self.history[successor].undeletable = true;
            let dropped = self.history.remove(oldest);
            log::debug!(
                "History: evicted '{}' ({}), next checkpoint is the new baseline",
                dropped.layer,
                dropped.letter
            );
        }
    }

    /// Record a checkpoint after a completed gesture.
    ///
    /// Skipped if the snapshot is pixel-identical to the most recent entry
    /// of the same layer on top of the stack. A recorded checkpoint
    /// invalidates the redo stack. Returns true if an entry was pushed.
    pub fn push_checkpoint(
        &mut self,
        layer: &str,
        snapshot: PixelBuffer,
        action: HistoryAction,
    ) -> bool {
        let unchanged = self
            .history
            .last()
            .is_some_and(|top| top.layer == layer && top.snapshot.same_pixels(&snapshot));
        if unchanged {
            log::debug!("History: '{}' unchanged, checkpoint skipped", layer);
            return false;
        }

        let letter = self.next_letter();
        log::debug!("📝 History: {} on '{}' ({})", action, layer, letter);
        self.history.push(HistoryEntry {
            layer: layer.to_string(),
            undeletable: false,
            snapshot,
            letter,
            action,
        });
        self.future.clear();
        self.trim();
        true
    }

    /// Record the initial state of a freshly created layer.
    ///
    /// Undo never pops this entry, so a layer can be emptied by undo but
    /// never lose its baseline.
    pub fn seed_undeletable(&mut self, layer: &str, snapshot: PixelBuffer) {
        let letter = self.next_letter();
        log::debug!("History: baseline for '{}' ({})", layer, letter);
        self.history.push(HistoryEntry {
            layer: layer.to_string(),
            undeletable: true,
            snapshot,
            letter,
            action: HistoryAction::DrawPixel,
        });
        self.trim();
    }

    /// Undo the most recent checkpoint.
    ///
    /// The layer's current content moves to the redo stack and the layer is
    /// restored from its previous checkpoint, or cleared if there is none.
    /// Returns the affected layer name, or None if nothing was undone.
    pub fn undo(&mut self, registry: &mut LayerRegistry) -> Option<String> {
        let top = self.history.last()?;
        if top.undeletable {
            log::debug!("History: '{}' is at its baseline, nothing to undo", top.layer);
            return None;
        }
        if !registry.contains(&top.layer) {
            log::warn!("History: layer '{}' no longer exists, undo skipped", top.layer);
            return None;
        }

        let entry = self.history.pop()?;
        let previous = self
            .history
            .iter()
            .rev()
            .find(|e| e.layer == entry.layer)
            .map(|e| e.snapshot.clone());

        let buffer = registry.buffer_mut(&entry.layer)?;
        self.future.push(HistoryEntry {
            layer: entry.layer.clone(),
            undeletable: false,
            snapshot: buffer.clone(),
            letter: entry.letter,
            action: entry.action,
        });
        match previous {
            Some(snapshot) => buffer.copy_from(&snapshot),
            None => buffer.clear(),
        }

        log::debug!("⏪ History: undo {} on '{}'", entry.action, entry.layer);
        registry.select(&entry.layer);
        Some(entry.layer)
    }

    /// Redo the most recently undone checkpoint.
    ///
    /// Returns the affected layer name, or None if nothing was redone.
    pub fn redo(&mut self, registry: &mut LayerRegistry) -> Option<String> {
        let entry = self.future.pop()?;
        let Some(buffer) = registry.buffer_mut(&entry.layer) else {
            log::warn!("History: layer '{}' no longer exists, redo skipped", entry.layer);
            return None;
        };
        buffer.copy_from(&entry.snapshot);

        log::debug!("⏩ History: redo {} on '{}'", entry.action, entry.layer);
        let layer = entry.layer.clone();
        self.history.push(entry);
        self.trim();
        registry.select(&layer);
        Some(layer)
    }

    /// Drop every entry of a removed layer.
    pub fn forget_layer(&mut self, layer: &str) {
        self.history.retain(|e| e.layer != layer);
        self.future.retain(|e| e.layer != layer);
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.last().is_some_and(|e| !e.undeletable)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of entries in the history stack.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of entries in the redo stack.
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Most recent checkpoint.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
        self.letter_index = 0;
        log::debug!("🗑️ History cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: &str = "Drawing Layer 1";

    fn setup() -> (LayerRegistry, HistoryLog) {
        let mut reg = LayerRegistry::new();
        reg.add_layer(LAYER, PixelBuffer::new(4, 4), false);
        let mut log = HistoryLog::new();
        log.seed_undeletable(LAYER, PixelBuffer::new(4, 4));
        (reg, log)
    }

    fn paint(reg: &mut LayerRegistry, log: &mut HistoryLog, x: i32) {
        let buf = reg.buffer_mut(LAYER).unwrap();
        buf.put(x, 0, [255, 0, 0, 255]);
        let snapshot = buf.clone();
        log.push_checkpoint(LAYER, snapshot, HistoryAction::DrawPixel);
    }

    #[test]
    fn test_undo_on_empty_log_is_noop() {
        let mut reg = LayerRegistry::new();
        let mut log = HistoryLog::new();
        assert_eq!(log.undo(&mut reg), None);
        assert_eq!(log.redo(&mut reg), None);
    }

    #[test]
    fn test_baseline_is_undeletable() {
        let (mut reg, mut log) = setup();
        assert!(!log.can_undo());
        assert_eq!(log.undo(&mut reg), None);
        assert_eq!(log.history_len(), 1);
    }

    #[test]
    fn test_push_dedups_identical_snapshot() {
        let (mut reg, mut log) = setup();
        paint(&mut reg, &mut log, 0);
        let snapshot = reg.buffer(LAYER).unwrap().clone();
        assert!(!log.push_checkpoint(LAYER, snapshot, HistoryAction::DrawPixel));
        assert_eq!(log.history_len(), 2);
    }

    #[test]
    fn test_undo_restores_previous_checkpoint() {
        let (mut reg, mut log) = setup();
        paint(&mut reg, &mut log, 0);
        paint(&mut reg, &mut log, 1);

        assert_eq!(log.undo(&mut reg).as_deref(), Some(LAYER));
        let buf = reg.buffer(LAYER).unwrap();
        assert_eq!(buf.opaque_count(), 1);
        assert!(buf.is_zero_at(1, 0));
        assert_eq!(log.future_len(), 1);
    }

    #[test]
    fn test_undo_without_earlier_entry_clears_layer() {
        let mut reg = LayerRegistry::new();
        reg.add_layer(LAYER, PixelBuffer::new(4, 4), false);
        let mut log = HistoryLog::new();
        paint(&mut reg, &mut log, 2);

        assert_eq!(log.undo(&mut reg).as_deref(), Some(LAYER));
        assert!(reg.contains(LAYER));
        assert_eq!(reg.buffer(LAYER).unwrap().opaque_count(), 0);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let (mut reg, mut log) = setup();
        for x in 0..4 {
            paint(&mut reg, &mut log, x);
        }
        let final_state = reg.buffer(LAYER).unwrap().clone();

        for _ in 0..4 {
            assert!(log.undo(&mut reg).is_some());
        }
        assert_eq!(reg.buffer(LAYER).unwrap().opaque_count(), 0);
        assert_eq!(log.undo(&mut reg), None, "stops at the baseline");

        for _ in 0..4 {
            assert!(log.redo(&mut reg).is_some());
        }
        assert!(reg.buffer(LAYER).unwrap().same_pixels(&final_state));
        assert!(!log.can_redo());
    }

    #[test]
    fn test_new_checkpoint_clears_redo() {
        let (mut reg, mut log) = setup();
        paint(&mut reg, &mut log, 0);
        log.undo(&mut reg);
        assert!(log.can_redo());
        paint(&mut reg, &mut log, 3);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_is_per_layer() {
        let (mut reg, mut log) = setup();
        reg.add_layer("Drawing Layer 2", PixelBuffer::new(4, 4), false);
        paint(&mut reg, &mut log, 0);

        let buf = reg.buffer_mut("Drawing Layer 2").unwrap();
        buf.put(3, 3, [0, 255, 0, 255]);
        let snapshot = buf.clone();
        log.push_checkpoint("Drawing Layer 2", snapshot, HistoryAction::BucketFill);

        assert_eq!(log.undo(&mut reg).as_deref(), Some("Drawing Layer 2"));
        assert_eq!(reg.buffer("Drawing Layer 2").unwrap().opaque_count(), 0);
        assert_eq!(reg.buffer(LAYER).unwrap().opaque_count(), 1);
        assert_eq!(reg.selected_drawing_layer(), Some("Drawing Layer 2"));
    }

    #[test]
    fn test_letters_wrap() {
        let (mut reg, mut log) = setup();
        for i in 0..30 {
            paint(&mut reg, &mut log, i % 4);
            reg.buffer_mut(LAYER).unwrap().clear();
        }
        let last = log.last().unwrap();
        assert!(last.letter.is_ascii_lowercase());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut reg = LayerRegistry::new();
        reg.add_layer(LAYER, PixelBuffer::new(8, 1), false);
        let mut log = HistoryLog::with_config(HistoryConfig { max_history: 3 });
        for x in 0..6 {
            paint(&mut reg, &mut log, x);
        }
        assert_eq!(log.history_len(), 3);
    }

    #[test]
    fn test_capacity_keeps_oldest_reachable_state() {
        let mut reg = LayerRegistry::new();
        reg.add_layer(LAYER, PixelBuffer::new(8, 1), false);
        let mut log = HistoryLog::with_config(HistoryConfig { max_history: 3 });
        log.seed_undeletable(LAYER, PixelBuffer::new(8, 1));
        for x in 0..5 {
            paint(&mut reg, &mut log, x);
        }
        assert_eq!(log.history_len(), 3);

        let mut undos = 0;
        while log.undo(&mut reg).is_some() {
            undos += 1;
        }
        assert_eq!(undos, 2);
        assert_eq!(reg.buffer(LAYER).unwrap().opaque_count(), 3);
    }

    #[test]
    fn test_capacity_spares_lone_baselines() {
        let mut reg = LayerRegistry::new();
        reg.add_layer(LAYER, PixelBuffer::new(8, 1), false);
        reg.add_layer("Drawing Layer 2", PixelBuffer::new(8, 1), false);
        let mut log = HistoryLog::with_config(HistoryConfig { max_history: 2 });
        log.seed_undeletable("Drawing Layer 2", PixelBuffer::new(8, 1));
        log.seed_undeletable(LAYER, PixelBuffer::new(8, 1));
        paint(&mut reg, &mut log, 0);
        paint(&mut reg, &mut log, 1);

        assert_eq!(log.history_len(), 2);
        assert_eq!(log.undo(&mut reg), None);
        assert_eq!(reg.buffer(LAYER).unwrap().opaque_count(), 2);
    }

    #[test]
    fn test_forget_layer() {
        let (mut reg, mut log) = setup();
        paint(&mut reg, &mut log, 0);
        log.forget_layer(LAYER);
        assert_eq!(log.history_len(), 0);
        assert_eq!(log.undo(&mut reg), None);
    }
}
