//! Backend commands queued from UI to backend worker.

use shared::domain::{ColorKey, VehicleKey};

use crate::controller::reducer::GalleryEffect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadVehicles,
    LoadColors { vehicle: VehicleKey },
    LoadImages { generation: u64, key: ColorKey },
    FetchImage { url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadVehicles => "load_vehicles",
            Self::LoadColors { .. } => "load_colors",
            Self::LoadImages { .. } => "load_images",
            Self::FetchImage { .. } => "fetch_image",
        }
    }
}

impl From<GalleryEffect> for BackendCommand {
    fn from(effect: GalleryEffect) -> Self {
        match effect {
            GalleryEffect::FetchVehicles => Self::LoadVehicles,
            GalleryEffect::FetchImages { generation, key } => Self::LoadImages { generation, key },
        }
    }
}
