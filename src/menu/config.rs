use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::grid::{GridDimensions, GridKind};
use crate::logging::Logger;
use crate::metrics::DispatchMetrics;
use crate::permission::Modifier;

/// Construction parameters for a [`super::Menu`].
#[derive(Clone)]
pub struct MenuConfig {
    pub title: String,
    pub kind: GridKind,
    /// Chest height; ignored for fixed kinds.
    pub rows: u8,
    /// Let single-grid chests grow on `add`. Pages never grow.
    pub growable: bool,
    /// Initial page count when `paginated`.
    pub pages: usize,
    pub paginated: bool,
    pub modifiers: BTreeSet<Modifier>,
    /// Optional structured logger shared with the dispatcher and pages.
    pub logger: Option<Logger>,
    pub metrics: Option<Arc<Mutex<DispatchMetrics>>>,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: GridKind::Chest,
            rows: 3,
            growable: false,
            pages: 1,
            paginated: false,
            modifiers: BTreeSet::new(),
            logger: None,
            metrics: None,
            metrics_target: "slotgrid::metrics".to_string(),
        }
    }
}

impl MenuConfig {
    pub fn chest(title: impl Into<String>, rows: u8) -> Self {
        Self {
            title: title.into(),
            rows,
            ..Self::default()
        }
    }

    pub fn fixed(title: impl Into<String>, kind: GridKind) -> Self {
        Self {
            title: title.into(),
            kind,
            rows: 1,
            ..Self::default()
        }
    }

    pub fn paged(mut self, pages: usize) -> Self {
        self.paginated = true;
        self.pages = pages;
        self
    }

    pub fn growable(mut self) -> Self {
        self.growable = true;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(DispatchMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<DispatchMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Validated grid shape described by this config.
    pub fn dimensions(&self) -> Result<GridDimensions> {
        let rows = if self.kind == GridKind::Chest { self.rows } else { 1 };
        let dims = GridDimensions::new(self.kind, rows)?;
        if self.growable && !self.paginated {
            dims.growable()
        } else {
            Ok(dims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MenuError;

    #[test]
    fn metrics_toggle() {
        let mut config = MenuConfig::default();
        assert!(config.metrics_handle().is_none());
        config.enable_metrics();
        let handle = config.metrics_handle().unwrap();
        config.enable_metrics();
        assert!(Arc::ptr_eq(&handle, &config.metrics_handle().unwrap()));
        config.disable_metrics();
        assert!(config.metrics_handle().is_none());
    }

    #[test]
    fn dimensions_follow_kind() {
        assert_eq!(MenuConfig::chest("c", 4).dimensions().unwrap().capacity(), 36);
        assert!(matches!(
            MenuConfig::chest("c", 9).dimensions(),
            Err(MenuError::InvalidRows(9))
        ));
        let hopper = MenuConfig::fixed("h", GridKind::Hopper).growable();
        assert!(hopper.dimensions().is_err());
        assert!(!MenuConfig::chest("p", 2).growable().paged(2).dimensions().unwrap().is_growable());
    }
}
