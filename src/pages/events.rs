/// How a page change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Next,
    Previous,
    Jump,
}

impl PageMove {
    pub fn as_str(self) -> &'static str {
        match self {
            PageMove::Next => "next",
            PageMove::Previous => "previous",
            PageMove::Jump => "jump",
        }
    }
}

/// Notification sent after the current page moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub from: usize,
    pub to: usize,
    pub cause: PageMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    Allow,
    /// Roll the move back.
    Veto,
}

/// Observer of page changes that may veto them.
pub trait PageListener: Send {
    fn on_page_change(&mut self, change: &PageChange) -> PageVerdict;
}

impl<F> PageListener for F
where
    F: FnMut(&PageChange) -> PageVerdict + Send,
{
    fn on_page_change(&mut self, change: &PageChange) -> PageVerdict {
        self(change)
    }
}

/// Which navigation control a pinned slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavRole {
    Next,
    Previous,
}

impl NavRole {
    /// State tag marking a persisted record as this control.
    pub fn tag(self) -> &'static str {
        match self {
            NavRole::Next => "nav:next",
            NavRole::Previous => "nav:previous",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "nav:next" => Some(NavRole::Next),
            "nav:previous" => Some(NavRole::Previous),
            _ => None,
        }
    }
}
