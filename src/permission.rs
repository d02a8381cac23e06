//! Permission boundary consulted before honoring user-driven mutations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::action::{ClickEvent, ClickKind};
use crate::item::{ActorId, ItemRecord};
use crate::slot::Slot;

/// Menu-level switches restricting what viewers may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    PreventPlace,
    PreventRemove,
    PreventSwap,
    PreventClone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Place,
    Remove,
    Swap,
    Clone,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Place => "place",
            InteractionKind::Remove => "remove",
            InteractionKind::Swap => "swap",
            InteractionKind::Clone => "clone",
        }
    }
}

/// One attempted mutation, as seen by a [`PermissionGate`].
#[derive(Debug, Clone, Copy)]
pub struct Interaction<'a> {
    pub kind: InteractionKind,
    pub actor: ActorId,
    pub slot: Slot,
    pub item: Option<&'a ItemRecord>,
}

pub trait PermissionGate: Send + Sync {
    fn is_place_allowed(&self, interaction: &Interaction<'_>) -> bool;
    fn is_remove_allowed(&self, interaction: &Interaction<'_>) -> bool;
    fn is_swap_allowed(&self, interaction: &Interaction<'_>) -> bool;
    fn is_clone_allowed(&self, interaction: &Interaction<'_>) -> bool;

    fn allows(&self, interaction: &Interaction<'_>) -> bool {
        match interaction.kind {
            InteractionKind::Place => self.is_place_allowed(interaction),
            InteractionKind::Remove => self.is_remove_allowed(interaction),
            InteractionKind::Swap => self.is_swap_allowed(interaction),
            InteractionKind::Clone => self.is_clone_allowed(interaction),
        }
    }
}

/// Answers from a fixed modifier set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierGate {
    modifiers: BTreeSet<Modifier>,
}

impl ModifierGate {
    pub fn new(modifiers: BTreeSet<Modifier>) -> Self {
        Self { modifiers }
    }

    /// Every interaction denied.
    pub fn locked() -> Self {
        Self::new(
            [
                Modifier::PreventPlace,
                Modifier::PreventRemove,
                Modifier::PreventSwap,
                Modifier::PreventClone,
            ]
            .into_iter()
            .collect(),
        )
    }

    pub fn modifiers(&self) -> &BTreeSet<Modifier> {
        &self.modifiers
    }
}

impl PermissionGate for ModifierGate {
    fn is_place_allowed(&self, _: &Interaction<'_>) -> bool {
        !self.modifiers.contains(&Modifier::PreventPlace)
    }

    fn is_remove_allowed(&self, _: &Interaction<'_>) -> bool {
        !self.modifiers.contains(&Modifier::PreventRemove)
    }

    fn is_swap_allowed(&self, _: &Interaction<'_>) -> bool {
        !self.modifiers.contains(&Modifier::PreventSwap)
    }

    fn is_clone_allowed(&self, _: &Interaction<'_>) -> bool {
        !self.modifiers.contains(&Modifier::PreventClone)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn is_place_allowed(&self, _: &Interaction<'_>) -> bool {
        true
    }

    fn is_remove_allowed(&self, _: &Interaction<'_>) -> bool {
        true
    }

    fn is_swap_allowed(&self, _: &Interaction<'_>) -> bool {
        true
    }

    fn is_clone_allowed(&self, _: &Interaction<'_>) -> bool {
        true
    }
}

/// Which mutation a click would perform. `inside` is whether the click
/// landed in the menu grid rather than the actor's own inventory; `occupied`
/// whether the targeted cell holds an item. `None` means the click mutates
/// nothing.
pub fn classify(event: &ClickEvent, inside: bool, occupied: bool) -> Option<InteractionKind> {
    match event.kind {
        ClickKind::Middle if inside && occupied => Some(InteractionKind::Clone),
        ClickKind::Middle => None,
        ClickKind::NumberKey(_) if inside => Some(InteractionKind::Swap),
        ClickKind::ShiftLeft | ClickKind::ShiftRight => {
            if inside {
                occupied.then_some(InteractionKind::Remove)
            } else {
                event.clicked.as_ref().map(|_| InteractionKind::Place)
            }
        }
        _ if !inside => None,
        ClickKind::Left | ClickKind::Right => match (event.cursor.is_some(), occupied) {
            (true, true) => Some(InteractionKind::Swap),
            (true, false) => Some(InteractionKind::Place),
            (false, true) => Some(InteractionKind::Remove),
            (false, false) => None,
        },
        ClickKind::Drop => occupied.then_some(InteractionKind::Remove),
        ClickKind::NumberKey(_) => None,
    }
}
