//! YAML keepout plans.
//!
//! ```yaml
//! view: { alpha: 0.5, x_shift: 0, y_shift: 0, rotation_deg: 0, scale: 1.0 }
//! zones:
//!   - [[10, 10], [60, 10], [60, 40], [10, 40]]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Vertex;
use crate::overlay::ViewTransform;
use crate::session::EditEvent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeepoutPlan {
    pub view: ViewTransform,
    /// Polygons in map pixel coordinates
    pub zones: Vec<Vec<Vertex>>,
}

impl KeepoutPlan {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let plan: Self = serde_yaml::from_str(text)?;
        plan.view.validate()?;
        Ok(plan)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let plan = Self::from_yaml_str(&text)?;
        log::info!(
            "loaded plan {} with {} zones",
            path.display(),
            plan.zones.len()
        );
        Ok(plan)
    }

    /// The view, then one click per vertex and a finish per zone.
    pub fn events(&self) -> Vec<EditEvent> {
        let mut events = vec![EditEvent::SetView(self.view)];
        for zone in &self.zones {
            events.extend(zone.iter().map(|&(x, y)| EditEvent::Click { x, y }));
            events.push(EditEvent::Finish);
        }
        events
    }
}
