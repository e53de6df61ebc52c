//! Service container for dependency injection
//!
//! Wires the builder, controller and runtime timing from settings.

use std::sync::Arc;

use crate::application::{DemoController, Timing};
use crate::config::Settings;
use crate::domain::ForestBuilder;
use crate::infrastructure::traits::{SaltSource, SystemClockSalt};

/// Container holding the configured collaborators of one session.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Fingerprint salt source
    pub salt: Arc<dyn SaltSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(SystemClockSalt))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, salt: Arc<dyn SaltSource>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, salt }
    }

    /// Builder laid out on the configured canvas, salted for one build.
    pub fn builder(&self) -> ForestBuilder {
        ForestBuilder::new(self.settings.layout).with_salt(self.salt.next_salt())
    }

    /// Idle controller showing the configured initial forest.
    pub fn controller(&self) -> DemoController {
        DemoController::new(
            ForestBuilder::new(self.settings.layout),
            Arc::clone(&self.salt),
            self.settings.demo.options(),
        )
    }

    pub fn timing(&self) -> Timing {
        self.settings.demo.timing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DemoState;
    use crate::infrastructure::traits::FixedSalt;

    #[test]
    fn given_settings_when_wiring_controller_then_initial_forest_built() {
        let mut settings = Settings::default();
        settings.demo.initial_leaves = 6;
        let container = ServiceContainer::with_deps(settings, Arc::new(FixedSalt(3)));

        let controller = container.controller();
        assert_eq!(controller.state(), DemoState::Idle);
        assert_eq!(controller.forest().leaf_count(), 6);
        assert_eq!(controller.forest().salt(), 3);
    }
}
