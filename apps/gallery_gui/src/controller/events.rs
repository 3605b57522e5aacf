//! Backend-to-UI events and error modeling for the gallery controller.

use shared::{
    domain::{ColorKey, ColorOption, RenderedImage, Vehicle, VehicleKey},
    error::{NetworkError, NetworkResult},
};

use crate::media::PreviewImage;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    VehiclesLoaded(NetworkResult<Vec<Vehicle>>),
    ColorsLoaded {
        vehicle: VehicleKey,
        result: NetworkResult<Vec<ColorOption>>,
    },
    ImagesLoaded {
        generation: u64,
        key: ColorKey,
        result: NetworkResult<Vec<RenderedImage>>,
    },
    ImageReady {
        url: String,
        image: PreviewImage,
    },
    ImageFailed {
        url: String,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Status,
    Decode,
    Policy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    VehicleCatalog,
    ColorCatalog,
    Media,
    ImageDownload,
}

impl UiErrorContext {
    fn user_message(self) -> &'static str {
        match self {
            Self::BackendStartup => "The gallery backend could not start. Please restart the app.",
            Self::VehicleCatalog => "Failed to load cars. Please try again later.",
            Self::ColorCatalog => "Failed to load colors. Pick the car again to retry.",
            Self::Media => "Failed to load car images. Please try again later.",
            Self::ImageDownload => "Image unavailable.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    status: Option<u16>,
    message: String,
}

impl UiError {
    pub fn from_network(context: UiErrorContext, err: &NetworkError) -> Self {
        let category = match err {
            NetworkError::Transport { .. } => UiErrorCategory::Transport,
            NetworkError::Status { .. } => UiErrorCategory::Status,
            NetworkError::Decode { .. } => UiErrorCategory::Decode,
            NetworkError::DisallowedHost { .. } | NetworkError::InvalidUrl { .. } => {
                UiErrorCategory::Policy
            }
        };
        Self {
            category,
            context,
            status: err.status_code(),
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            status: None,
            message: message.into(),
        }
    }

    /// Short text meant for the screen; the detailed cause stays in [`Self::message`].
    pub fn user_message(&self) -> &'static str {
        self.context.user_message()
    }

    /// Whether repeating the same selection has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self.category {
            UiErrorCategory::Transport | UiErrorCategory::Unknown => true,
            UiErrorCategory::Status => self.status.map_or(true, |status| status >= 500),
            UiErrorCategory::Decode | UiErrorCategory::Policy => false,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
