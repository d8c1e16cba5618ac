//! World-space transform for meshes and cameras

use serde::{Deserialize, Serialize};

use crate::math::Vec3Fx;

/// Position, Euler rotation (radians, applied X then Y then Z) and
/// component-wise scale. Stand-in for the engine's transform component;
/// parent-chain resolution happens before values reach the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3Fx,
    pub rotation: Vec3Fx,
    pub scale: Vec3Fx,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3Fx::ZERO,
            rotation: Vec3Fx::ZERO,
            scale: Vec3Fx::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3Fx) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Vec3Fx {
        self.position
    }

    pub fn rotation(&self) -> Vec3Fx {
        self.rotation
    }

    pub fn scale(&self) -> Vec3Fx {
        self.scale
    }
}
