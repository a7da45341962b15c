//! Short-lived attention ping.

use super::ShapeId;
use crate::clock::Timestamp;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub(crate) id: ShapeId,
    pub position: Point,
    /// When the ping was placed.
    pub created: Timestamp,
}

impl Ping {
    pub fn new(position: Point, created: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            created,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }
}
