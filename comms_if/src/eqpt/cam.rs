//! # Camera Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An image acquired from the camera.
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: DynamicImage,
}

/// Result of classifying a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Name of the most likely class
    pub label: String,

    /// Confidence in the label, between 0 and 1
    pub confidence: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A camera which can acquire single frames on demand.
pub trait CamEqpt: Send {
    /// Acquire a single frame.
    fn acquire(&mut self) -> Result<CamImage, EqptError>;

    /// Stop the camera and release it.
    fn stop(&mut self) -> Result<(), EqptError>;
}

/// An image classifier.
pub trait Classifier: Send {
    /// Classify the image, returning the most likely label.
    fn classify(&mut self, image: &CamImage) -> Result<Classification, EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Create an image timestamped now.
    pub fn now(image: DynamicImage) -> Self {
        Self {
            timestamp: Utc::now(),
            image,
        }
    }
}
