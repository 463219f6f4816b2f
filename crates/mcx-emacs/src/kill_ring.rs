//! The kill ring and the entities it stores.
//!
//! A kill from the editor produces one [`AppendableRegionTexts`] per cursor.
//! Consecutive kills append into the same entity, per cursor, so a run of
//! `C-k C-k C-k` yanks back as one piece. Text that arrived from the system
//! clipboard is stored flat.
//!
//! Flattening an editor entity sorts the per-cursor texts by where they
//! were killed, so a multi-cursor kill always yanks back in document order
//! whatever order the cursors were created in.

use tracing::trace;

use mcx_core::position::{Position, Range};

use crate::options::DEFAULT_KILL_RING_MAX;

/// Entity labels are cut to this many chars.
pub const MAX_LABEL_LENGTH: usize = 12000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendDirection {
    /// New text goes after the existing text (`C-k`, `M-d`).
    Forward,
    /// New text goes before it (`M-DEL`).
    Backward,
}

/// Text killed from one range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionText {
    pub text: String,
    pub range: Range,
}

impl RegionText {
    #[must_use]
    pub fn new(text: impl Into<String>, range: Range) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// The texts one cursor killed during an append run, in append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendableRegionTexts {
    region_texts: Vec<RegionText>,
}

impl AppendableRegionTexts {
    #[must_use]
    pub fn new(region_text: RegionText) -> Self {
        Self {
            region_texts: vec![region_text],
        }
    }

    pub fn append(&mut self, another: Self, direction: AppendDirection) {
        match direction {
            AppendDirection::Forward => self.region_texts.extend(another.region_texts),
            AppendDirection::Backward => {
                let mut texts = another.region_texts;
                texts.append(&mut self.region_texts);
                self.region_texts = texts;
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region_texts.iter().all(|rt| rt.text.is_empty())
    }

    #[must_use]
    pub fn appended_text(&self) -> String {
        self.region_texts.iter().map(|rt| rt.text.as_str()).collect()
    }

    /// Range of the most recently appended text.
    #[must_use]
    pub fn last_range(&self) -> Range {
        self.region_texts
            .last()
            .map_or(Range::point(Position::ZERO), |rt| rt.range)
    }
}

/// One kill ring entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillRingEntity {
    /// Killed or copied in an editor, one element per cursor.
    Editor(Vec<AppendableRegionTexts>),
    /// Picked up from the system clipboard.
    Clipboard(String),
}

impl KillRingEntity {
    /// A fresh editor entity from one region text per cursor.
    #[must_use]
    pub fn from_regions(regions: Vec<RegionText>) -> Self {
        Self::Editor(regions.into_iter().map(AppendableRegionTexts::new).collect())
    }

    /// Per-cursor texts, empty for clipboard entities.
    #[must_use]
    pub fn region_texts(&self) -> &[AppendableRegionTexts] {
        match self {
            Self::Editor(texts) => texts,
            Self::Clipboard(_) => &[],
        }
    }

    /// The entity's text, Debug-quoted and cut to [`MAX_LABEL_LENGTH`].
    #[must_use]
    pub fn label(&self) -> String {
        let quoted = format!("{:?}", flatten(self));
        match quoted.char_indices().nth(MAX_LABEL_LENGTH) {
            Some((cut, _)) => quoted[..cut].to_owned(),
            None => quoted,
        }
    }
}

/// The entity as one string.
///
/// Editor texts are ordered by the start of their last killed range. Texts
/// from the same line are joined directly, texts from different lines are
/// separated by a line break.
#[must_use]
pub fn flatten(entity: &KillRingEntity) -> String {
    let texts = match entity {
        KillRingEntity::Clipboard(text) => return text.clone(),
        KillRingEntity::Editor(texts) => texts,
    };

    let mut sorted: Vec<(Range, String)> = texts
        .iter()
        .map(|t| (t.last_range(), t.appended_text()))
        .collect();
    sorted.sort_by_key(|(range, _)| range.start);

    let mut out = String::new();
    let mut prev_line = None;
    for (range, text) in sorted {
        if prev_line.is_some_and(|line| line != range.start.line) {
            out.push('\n');
        }
        out.push_str(&text);
        prev_line = Some(range.start.line);
    }
    out
}

#[must_use]
pub fn is_empty(entity: &KillRingEntity) -> bool {
    match entity {
        KillRingEntity::Editor(texts) => texts.iter().all(AppendableRegionTexts::is_empty),
        KillRingEntity::Clipboard(text) => text.is_empty(),
    }
}

/// True when `other` can be appended into `entity`.
#[must_use]
pub fn can_append(entity: &KillRingEntity, other: &KillRingEntity) -> bool {
    match (entity, other) {
        (KillRingEntity::Editor(a), KillRingEntity::Editor(b)) => a.len() == b.len(),
        _ => false,
    }
}

/// Append `other` into `entity`, cursor by cursor.
///
/// Appending anything into a clipboard entity, or a clipboard entity into
/// anything, leaves `entity` unchanged.
///
/// # Panics
///
/// Panics when both are editor entities with different cursor counts. Check
/// with [`can_append`] first.
pub fn append(entity: &mut KillRingEntity, other: KillRingEntity, direction: AppendDirection) {
    let (KillRingEntity::Editor(texts), KillRingEntity::Editor(additional)) = (entity, other) else {
        return;
    };
    assert_eq!(
        texts.len(),
        additional.len(),
        "kill ring entities with different cursor counts are not appendable"
    );
    for (text, more) in texts.iter_mut().zip(additional) {
        text.append(more, direction);
    }
}

// ── Kill ring ────────────────────────────────────────────────────────────

/// Bounded history of kills with a rotation pointer for `yank-pop`.
#[derive(Debug, Clone)]
pub struct KillRing {
    max: usize,
    ring: Vec<KillRingEntity>,
    pointer: usize,
}

impl KillRing {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            ring: Vec::new(),
            pointer: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Add `entity` as the newest entry and point at it.
    pub fn push(&mut self, entity: KillRingEntity) {
        self.ring.insert(0, entity);
        self.ring.truncate(self.max);
        self.pointer = 0;
        trace!(len = self.ring.len(), "kill ring push");
    }

    /// The entry under the pointer.
    #[must_use]
    pub fn top(&self) -> Option<&KillRingEntity> {
        self.ring.get(self.pointer)
    }

    pub fn top_mut(&mut self) -> Option<&mut KillRingEntity> {
        self.ring.get_mut(self.pointer)
    }

    /// The most recently pushed entry, wherever the pointer is.
    #[must_use]
    pub fn newest(&self) -> Option<&KillRingEntity> {
        self.ring.first()
    }

    /// Rotate to the next older entry (wrapping) and return it.
    pub fn pop_next(&mut self) -> Option<&KillRingEntity> {
        if self.ring.is_empty() {
            return None;
        }
        self.pointer = (self.pointer + 1) % self.ring.len();
        trace!(pointer = self.pointer, "kill ring rotate");
        self.ring.get(self.pointer)
    }

    /// Point at entry `index`, counted from the newest.
    pub fn set_top(&mut self, index: usize) {
        if !self.ring.is_empty() {
            self.pointer = index % self.ring.len();
        }
    }

    /// `(index, label)` for every entry, starting at the pointer.
    #[must_use]
    pub fn labels(&self) -> Vec<(usize, String)> {
        let n = self.ring.len();
        (0..n)
            .map(|i| (self.pointer + i) % n)
            .map(|idx| (idx, self.ring[idx].label()))
            .collect()
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new(DEFAULT_KILL_RING_MAX)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
