//! State of the two-tab vehicle/color picker.
//!
//! The picker keeps its own notion of which vehicle it is showing colors for,
//! independent of the gallery selection. It never talks to the network: it
//! asks for a vehicle's colors through [`PickerOutput::fetch_colors`] and the
//! answer, served by the shared catalog cache, comes back via
//! [`PickerState::colors_loaded`].

use shared::{
    domain::{sort_colors, ColorOption, Vehicle, VehicleKey},
    error::NetworkResult,
};
use tracing::debug;

use super::events::{UiError, UiErrorContext};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickerTab {
    #[default]
    Vehicle,
    Color,
}

impl PickerTab {
    pub const ALL: [PickerTab; 2] = [PickerTab::Vehicle, PickerTab::Color];

    pub fn label(self) -> &'static str {
        match self {
            Self::Vehicle => "Car",
            Self::Color => "Color",
        }
    }

    fn position(self) -> i8 {
        match self {
            Self::Vehicle => 0,
            Self::Color => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ColorList {
    #[default]
    Empty,
    Loading(VehicleKey),
    Ready {
        vehicle: VehicleKey,
        colors: Vec<ColorOption>,
    },
    Failed {
        vehicle: VehicleKey,
        message: String,
    },
}

impl ColorList {
    fn vehicle(&self) -> Option<&VehicleKey> {
        match self {
            Self::Empty => None,
            Self::Loading(vehicle)
            | Self::Ready { vehicle, .. }
            | Self::Failed { vehicle, .. } => Some(vehicle),
        }
    }

    pub fn colors(&self) -> &[ColorOption] {
        match self {
            Self::Ready { colors, .. } => colors,
            _ => &[],
        }
    }
}

/// What a click in the picker asks the rest of the app to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerOutput {
    pub chosen_vehicle: Option<Vehicle>,
    pub fetch_colors: Option<VehicleKey>,
    pub chosen_color: Option<(VehicleKey, ColorOption)>,
}

#[derive(Debug, Clone, Default)]
pub struct PickerState {
    active_tab: PickerTab,
    local_vehicle: Option<Vehicle>,
    colors: ColorList,
    animating: bool,
    direction: i8,
    transition: u64,
}

impl PickerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> PickerTab {
        self.active_tab
    }

    pub fn local_vehicle(&self) -> Option<&Vehicle> {
        self.local_vehicle.as_ref()
    }

    pub fn color_list(&self) -> &ColorList {
        &self.colors
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Increases every time a tab transition starts.
    pub fn transition_serial(&self) -> u64 {
        self.transition
    }

    /// +1 when sliding toward a later tab, -1 toward an earlier one.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn click_vehicle(&mut self, vehicle: &Vehicle) -> PickerOutput {
        let key = vehicle.key();
        self.local_vehicle = Some(vehicle.clone());
        self.colors = ColorList::Loading(key.clone());
        // Auto-advance ignores the latch, like any programmatic tab change.
        self.start_transition(PickerTab::Color);

        PickerOutput {
            chosen_vehicle: Some(vehicle.clone()),
            fetch_colors: Some(key),
            chosen_color: None,
        }
    }

    /// Returns false when the response is for a vehicle the picker has moved away from.
    pub fn colors_loaded(
        &mut self,
        vehicle: &VehicleKey,
        result: NetworkResult<Vec<ColorOption>>,
    ) -> bool {
        if self.colors.vehicle() != Some(vehicle) {
            debug!(%vehicle, "picker dropping colors for a vehicle it no longer shows");
            return false;
        }

        self.colors = match result {
            Ok(mut colors) => {
                sort_colors(&mut colors);
                ColorList::Ready {
                    vehicle: vehicle.clone(),
                    colors,
                }
            }
            Err(err) => ColorList::Failed {
                vehicle: vehicle.clone(),
                message: UiError::from_network(UiErrorContext::ColorCatalog, &err)
                    .user_message()
                    .to_string(),
            },
        };
        true
    }

    pub fn click_color(&self, color: &ColorOption) -> PickerOutput {
        let ColorList::Ready { vehicle, colors } = &self.colors else {
            return PickerOutput::default();
        };
        if !colors.iter().any(|c| c.p0_id == color.p0_id) {
            return PickerOutput::default();
        }
        PickerOutput {
            chosen_color: Some((vehicle.clone(), color.clone())),
            ..PickerOutput::default()
        }
    }

    /// Manual tab switch; refused while the previous switch is still animating.
    pub fn click_tab(&mut self, tab: PickerTab) -> bool {
        if tab == self.active_tab || self.animating {
            return false;
        }
        self.start_transition(tab);
        true
    }

    /// Called once the outgoing tab's exit animation has completed.
    pub fn finish_transition(&mut self) {
        self.animating = false;
    }

    fn start_transition(&mut self, tab: PickerTab) {
        if tab == self.active_tab {
            return;
        }
        self.direction = if tab.position() > self.active_tab.position() {
            1
        } else {
            -1
        };
        self.active_tab = tab;
        self.animating = true;
        self.transition += 1;
    }
}

#[cfg(test)]
#[path = "tests/picker_tests.rs"]
mod tests;
