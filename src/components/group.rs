//! Tag component for lookup by name.
//!
//! Pursuit agents without an explicit target search for an entity whose
//! [`Group`] matches their `target_tag` (by default `"player"`).

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group(String);

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}
