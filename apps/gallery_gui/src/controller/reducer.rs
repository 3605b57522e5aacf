//! Selection state machine for the gallery.
//!
//! The whole session lives in one [`GalleryState`] value. Every user action
//! and every backend response is a [`GalleryAction`]; [`GalleryState::apply`]
//! consumes the old state and returns the new one together with at most one
//! [`GalleryEffect`] for the backend bridge to run. Nothing here touches the
//! network or the UI, so transitions can be exercised without either.
//!
//! Image fetches are tagged with the selection generation that issued them.
//! Any selection change bumps the generation, and a response carrying an old
//! generation is dropped instead of overwriting the newer selection.

use shared::{
    domain::{ColorKey, ColorOption, RenderedImage, Vehicle, VehicleKey},
    error::NetworkResult,
};
use tracing::{debug, warn};

use super::{
    carousel::{step_filtered, visible_indices, EnvironmentFilter},
    events::{UiError, UiErrorContext},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum VehicleCatalog {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Vehicle>),
    /// Terminal for the session: nothing can be selected without a catalog.
    Failed(String),
}

#[derive(Debug)]
pub enum GalleryAction {
    Init,
    VehiclesLoaded(NetworkResult<Vec<Vehicle>>),
    SelectVehicle(Vehicle),
    SelectColor {
        vehicle: VehicleKey,
        color: ColorOption,
    },
    ImagesLoaded {
        generation: u64,
        key: ColorKey,
        result: NetworkResult<Vec<RenderedImage>>,
    },
    Navigate(isize),
    SelectImage(usize),
    SetEnvironmentFilter(EnvironmentFilter),
    ToggleZoom,
    CloseZoom,
    DismissError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEffect {
    FetchVehicles,
    FetchImages { generation: u64, key: ColorKey },
}

#[derive(Debug)]
pub struct Transition {
    pub state: GalleryState,
    pub effect: Option<GalleryEffect>,
}

impl Transition {
    fn stay(state: GalleryState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryState {
    pub vehicles: VehicleCatalog,
    pub selected_vehicle: Option<Vehicle>,
    pub selected_color: Option<ColorOption>,
    pub images: Vec<RenderedImage>,
    pub active_image_index: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub environment_filter: EnvironmentFilter,
    pub zoomed: bool,
    generation: u64,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vehicle_list(&self) -> &[Vehicle] {
        match &self.vehicles {
            VehicleCatalog::Loaded(vehicles) => vehicles,
            _ => &[],
        }
    }

    /// The vehicle catalog failed to load; only the error can be shown.
    pub fn is_halted(&self) -> bool {
        matches!(self.vehicles, VehicleCatalog::Failed(_))
    }

    pub fn active_image(&self) -> Option<&RenderedImage> {
        self.images.get(self.active_image_index)
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        visible_indices(&self.images, &self.environment_filter)
    }

    pub fn selected_key(&self) -> Option<ColorKey> {
        let vehicle = self.selected_vehicle.as_ref()?;
        let color = self.selected_color.as_ref()?;
        Some(color.key_for(&vehicle.key()))
    }

    pub fn status_line(&self) -> &'static str {
        if self.loading {
            "Loading images..."
        } else if self.selected_vehicle.is_some() {
            "Select a color to view images"
        } else {
            "Select a car and color to view images"
        }
    }

    pub fn apply(self, action: GalleryAction) -> Transition {
        if self.is_halted() {
            debug!(?action, "ignoring action after vehicle catalog failure");
            return Transition::stay(self);
        }

        match action {
            GalleryAction::Init => self.init(),
            GalleryAction::VehiclesLoaded(result) => self.vehicles_loaded(result),
            GalleryAction::SelectVehicle(vehicle) => self.select_vehicle(vehicle),
            GalleryAction::SelectColor { vehicle, color } => self.select_color(vehicle, color),
            GalleryAction::ImagesLoaded {
                generation,
                key,
                result,
            } => self.images_loaded(generation, key, result),
            GalleryAction::Navigate(delta) => self.navigate(delta),
            GalleryAction::SelectImage(index) => self.select_image(index),
            GalleryAction::SetEnvironmentFilter(filter) => self.set_environment_filter(filter),
            GalleryAction::ToggleZoom => {
                let mut state = self;
                state.zoomed = !state.zoomed && state.active_image().is_some();
                Transition::stay(state)
            }
            GalleryAction::CloseZoom => {
                let mut state = self;
                state.zoomed = false;
                Transition::stay(state)
            }
            GalleryAction::DismissError => {
                let mut state = self;
                state.error = None;
                Transition::stay(state)
            }
        }
    }

    fn init(mut self) -> Transition {
        if self.vehicles != VehicleCatalog::Idle {
            return Transition::stay(self);
        }
        self.vehicles = VehicleCatalog::Loading;
        self.loading = true;
        self.error = None;
        Transition {
            state: self,
            effect: Some(GalleryEffect::FetchVehicles),
        }
    }

    fn vehicles_loaded(mut self, result: NetworkResult<Vec<Vehicle>>) -> Transition {
        if self.vehicles != VehicleCatalog::Loading {
            debug!("dropping unexpected vehicle catalog response");
            return Transition::stay(self);
        }
        self.loading = false;
        match result {
            Ok(vehicles) => {
                debug!(count = vehicles.len(), "vehicle catalog loaded");
                self.vehicles = VehicleCatalog::Loaded(vehicles);
            }
            Err(err) => {
                let error = UiError::from_network(UiErrorContext::VehicleCatalog, &err);
                warn!("vehicle catalog failed: {}", error.message());
                self.vehicles = VehicleCatalog::Failed(error.message().to_string());
                self.error = Some(error.user_message().to_string());
            }
        }
        Transition::stay(self)
    }

    fn select_vehicle(mut self, vehicle: Vehicle) -> Transition {
        self.generation += 1;
        self.selected_vehicle = Some(vehicle);
        self.selected_color = None;
        self.clear_images();
        // Any image fetch still in flight belongs to the previous generation.
        self.loading = false;
        self.error = None;
        Transition::stay(self)
    }

    fn select_color(mut self, vehicle: VehicleKey, color: ColorOption) -> Transition {
        let Some(selected) = self.selected_vehicle.as_ref() else {
            return Transition::stay(self);
        };
        let selected = selected.key();
        if selected != vehicle {
            debug!(%vehicle, current = %selected, "ignoring color picked for another vehicle");
            return Transition::stay(self);
        }

        self.generation += 1;
        let key = color.key_for(&selected);
        self.selected_color = Some(color);
        self.clear_images();
        self.loading = true;
        self.error = None;
        Transition {
            effect: Some(GalleryEffect::FetchImages {
                generation: self.generation,
                key,
            }),
            state: self,
        }
    }

    fn images_loaded(
        mut self,
        generation: u64,
        key: ColorKey,
        result: NetworkResult<Vec<RenderedImage>>,
    ) -> Transition {
        if generation != self.generation || self.selected_key().as_ref() != Some(&key) {
            debug!(%key, generation, current = self.generation, "dropping stale media response");
            return Transition::stay(self);
        }

        self.loading = false;
        match result {
            Ok(images) => {
                debug!(%key, count = images.len(), "media loaded");
                self.clear_images();
                self.images = images;
            }
            Err(err) => {
                let error = UiError::from_network(UiErrorContext::Media, &err);
                warn!(%key, "media fetch failed: {}", error.message());
                self.clear_images();
                self.error = Some(error.user_message().to_string());
            }
        }
        Transition::stay(self)
    }

    fn navigate(mut self, delta: isize) -> Transition {
        if !self.images.is_empty() {
            self.active_image_index = step_filtered(
                &self.images,
                &self.environment_filter,
                self.active_image_index,
                delta,
            );
        }
        Transition::stay(self)
    }

    fn select_image(mut self, index: usize) -> Transition {
        if index < self.images.len() {
            self.active_image_index = index;
        }
        Transition::stay(self)
    }

    fn set_environment_filter(mut self, filter: EnvironmentFilter) -> Transition {
        let current_matches = self
            .active_image()
            .is_some_and(|image| filter.matches(image));
        if !current_matches {
            if let Some(first) = self.images.iter().position(|image| filter.matches(image)) {
                self.active_image_index = first;
            }
        }
        self.environment_filter = filter;
        Transition::stay(self)
    }

    fn clear_images(&mut self) {
        self.images.clear();
        self.active_image_index = 0;
        self.environment_filter = EnvironmentFilter::All;
        self.zoomed = false;
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
