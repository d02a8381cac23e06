use crate::item::{ActorId, ItemPayload};

/// Kind of pointer or key interaction the host reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Middle,
    /// Hotbar number key; swaps the slot with hotbar position `n`.
    NumberKey(u8),
    Drop,
}

impl ClickKind {
    pub fn is_shift(self) -> bool {
        matches!(self, ClickKind::ShiftLeft | ClickKind::ShiftRight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClickKind::Left => "left",
            ClickKind::Right => "right",
            ClickKind::ShiftLeft => "shift_left",
            ClickKind::ShiftRight => "shift_right",
            ClickKind::Middle => "middle",
            ClickKind::NumberKey(_) => "number_key",
            ClickKind::Drop => "drop",
        }
    }
}

/// Activation event delivered by the host.
///
/// `raw_slot` is the host's linear index; values past the grid's capacity
/// point at the actor's own inventory. `clicked` is the payload the host
/// believes sits in that slot and is what the identity check reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub actor: ActorId,
    pub raw_slot: i32,
    pub kind: ClickKind,
    pub clicked: Option<ItemPayload>,
    pub cursor: Option<ItemPayload>,
}

impl ClickEvent {
    pub fn new(actor: ActorId, raw_slot: i32, kind: ClickKind) -> Self {
        Self {
            actor,
            raw_slot,
            kind,
            clicked: None,
            cursor: None,
        }
    }

    pub fn left(actor: ActorId, raw_slot: i32) -> Self {
        Self::new(actor, raw_slot, ClickKind::Left)
    }

    pub fn with_clicked(mut self, payload: ItemPayload) -> Self {
        self.clicked = Some(payload);
        self
    }

    pub fn with_cursor(mut self, payload: ItemPayload) -> Self {
        self.cursor = Some(payload);
        self
    }
}
