use eframe::egui;
use shared::domain::{ColorOption, Vehicle};

use crate::controller::picker::{ColorList, PickerOutput, PickerState, PickerTab};

const SWATCH_SIZE: f32 = 32.0;
const SWATCH_COLUMNS: usize = 4;
const LIST_HEIGHT: f32 = 360.0;
const SLIDE_DISTANCE: f32 = 24.0;

pub fn swatch_color(color: &ColorOption) -> egui::Color32 {
    color
        .swatch_rgb()
        .map(|[r, g, b]| egui::Color32::from_rgb(r, g, b))
        .unwrap_or(egui::Color32::from_gray(90))
}

/// Horizontal offset of the incoming tab; negative when sliding back.
fn slide_offset(progress: f32, direction: i8) -> f32 {
    (1.0 - progress) * SLIDE_DISTANCE * f32::from(direction)
}

/// Renders [`PickerState`] and times its tab transitions.
pub struct PickerView {
    state: PickerState,
    transition_started_at: Option<(u64, f64)>,
    animation_secs: f32,
}

impl PickerView {
    pub fn new(animation_secs: f32) -> Self {
        Self {
            state: PickerState::new(),
            transition_started_at: None,
            animation_secs: animation_secs.max(0.0),
        }
    }

    pub fn state_mut(&mut self) -> &mut PickerState {
        &mut self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// Advances the tab transition to `now` and returns its progress in
    /// `0.0..=1.0`. Reaching 1.0 releases the picker's latch.
    pub fn tick(&mut self, now: f64) -> f32 {
        if !self.state.is_animating() {
            self.transition_started_at = None;
            return 1.0;
        }
        let serial = self.state.transition_serial();
        let started = match self.transition_started_at {
            Some((running, started)) if running == serial => started,
            _ => {
                self.transition_started_at = Some((serial, now));
                now
            }
        };
        let progress = if self.animation_secs <= f32::EPSILON {
            1.0
        } else {
            ((now - started) as f32 / self.animation_secs).clamp(0.0, 1.0)
        };
        if progress >= 1.0 {
            self.state.finish_transition();
            self.transition_started_at = None;
        }
        progress
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        vehicles: &[Vehicle],
        selected_color: Option<&ColorOption>,
        language: &str,
    ) -> PickerOutput {
        ui.horizontal(|ui| {
            for tab in PickerTab::ALL {
                let selected = self.state.active_tab() == tab;
                if ui.selectable_label(selected, tab.label()).clicked() {
                    self.state.click_tab(tab);
                }
            }
        });
        ui.separator();

        let progress = self.tick(ui.input(|i| i.time));
        let offset = slide_offset(progress, self.state.direction());

        let rect = ui
            .available_rect_before_wrap()
            .translate(egui::vec2(offset, 0.0));
        let mut content = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(egui::Layout::top_down(egui::Align::Min)),
        );
        content.set_clip_rect(ui.clip_rect());
        content.set_opacity(progress);
        let output = match self.state.active_tab() {
            PickerTab::Vehicle => self.show_vehicle_list(&mut content, vehicles, language),
            PickerTab::Color => self.show_color_grid(&mut content, selected_color, language),
        };
        ui.advance_cursor_after_rect(content.min_rect().translate(egui::vec2(-offset, 0.0)));

        output
    }

    fn show_vehicle_list(
        &mut self,
        ui: &mut egui::Ui,
        vehicles: &[Vehicle],
        language: &str,
    ) -> PickerOutput {
        let mut output = PickerOutput::default();
        if vehicles.is_empty() {
            ui.weak("Loading cars...");
            return output;
        }

        let local = self.state.local_vehicle().map(Vehicle::key);
        egui::ScrollArea::vertical()
            .id_salt("picker_vehicles")
            .max_height(LIST_HEIGHT)
            .show(ui, |ui| {
                for vehicle in vehicles {
                    let selected = local.as_ref() == Some(&vehicle.key());
                    if ui
                        .selectable_label(selected, vehicle.display_name(language))
                        .clicked()
                    {
                        output = self.state.click_vehicle(vehicle);
                    }
                }
            });
        output
    }

    fn show_color_grid(
        &mut self,
        ui: &mut egui::Ui,
        selected_color: Option<&ColorOption>,
        language: &str,
    ) -> PickerOutput {
        let mut output = PickerOutput::default();
        match self.state.color_list() {
            ColorList::Empty => {
                ui.weak("Pick a car first.");
            }
            ColorList::Loading(_) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading colors...");
                });
            }
            ColorList::Failed { message, .. } => {
                ui.colored_label(egui::Color32::from_rgb(220, 120, 120), message);
            }
            ColorList::Ready { colors, .. } => {
                let mut clicked = None;
                egui::ScrollArea::vertical()
                    .id_salt("picker_colors")
                    .max_height(LIST_HEIGHT)
                    .show(ui, |ui| {
                        egui::Grid::new("picker_swatches")
                            .spacing(egui::vec2(8.0, 8.0))
                            .show(ui, |ui| {
                                for (index, color) in colors.iter().enumerate() {
                                    let selected = selected_color
                                        .is_some_and(|current| current.p0_id == color.p0_id);
                                    if swatch(ui, color, selected, language).clicked() {
                                        clicked = Some(color.clone());
                                    }
                                    if (index + 1) % SWATCH_COLUMNS == 0 {
                                        ui.end_row();
                                    }
                                }
                            });
                    });
                if let Some(color) = clicked {
                    output = self.state.click_color(&color);
                }
            }
        }
        output
    }
}

fn swatch(
    ui: &mut egui::Ui,
    color: &ColorOption,
    selected: bool,
    language: &str,
) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::click());
    let scale = if response.is_pointer_button_down_on() {
        0.9
    } else if response.hovered() {
        1.1
    } else {
        1.0
    };
    let radius = SWATCH_SIZE * 0.42 * scale;
    let painter = ui.painter();
    painter.circle_filled(rect.center(), radius, swatch_color(color));
    let ring = if selected {
        egui::Stroke::new(2.0, egui::Color32::WHITE)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(60))
    };
    painter.circle_stroke(rect.center(), radius, ring);

    let name = color.display_name(language).to_string();
    let finish = color.finish_label();
    response.on_hover_ui(|ui| {
        ui.label(name);
        if !finish.is_empty() {
            ui.weak(finish);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_releases_latch_after_animation_time() {
        let mut view = PickerView::new(0.4);
        assert!(view.state_mut().click_tab(PickerTab::Color));

        assert_eq!(view.tick(10.0), 0.0);
        assert!(view.is_animating());
        let halfway = view.tick(10.2);
        assert!(halfway > 0.4 && halfway < 0.6);
        assert!(!view.state_mut().click_tab(PickerTab::Vehicle));

        assert_eq!(view.tick(10.5), 1.0);
        assert!(!view.is_animating());
        assert!(view.state_mut().click_tab(PickerTab::Vehicle));
    }

    #[test]
    fn choosing_a_car_mid_slide_restarts_the_timer() {
        let mut view = PickerView::new(0.4);
        view.state_mut().click_tab(PickerTab::Color);
        view.tick(10.0);
        assert_eq!(view.tick(10.5), 1.0);
        assert!(view.state_mut().click_tab(PickerTab::Vehicle));

        assert_eq!(view.tick(11.0), 0.0);
        assert!(view.tick(11.3) < 1.0);
        view.state_mut().click_vehicle(&car());
        assert_eq!(view.state_mut().active_tab(), PickerTab::Color);

        assert_eq!(view.tick(11.35), 0.0);
        assert!(view.tick(11.6) < 1.0);
        assert!(view.is_animating());
        assert_eq!(view.tick(11.8), 1.0);
        assert!(!view.is_animating());
    }

    #[test]
    fn backward_switch_slides_from_the_left() {
        assert!(slide_offset(0.0, 1) > 0.0);
        assert!(slide_offset(0.0, -1) < 0.0);
        assert_eq!(slide_offset(0.5, -1), -SLIDE_DISTANCE / 2.0);
        assert_eq!(slide_offset(1.0, -1), 0.0);
    }

    #[test]
    fn zero_length_animation_finishes_immediately() {
        let mut view = PickerView::new(0.0);
        view.state_mut().click_tab(PickerTab::Color);
        assert_eq!(view.tick(1.0), 1.0);
        assert!(!view.is_animating());
    }

    fn car() -> Vehicle {
        serde_json::from_str(r#"{"modelRange": "G82", "typeCode": "001"}"#).expect("vehicle")
    }

    #[test]
    fn malformed_hex_falls_back_to_neutral_swatch() {
        let color = ColorOption {
            p0_id: "x".into(),
            hex_code: "not-hex".into(),
            main_color: String::new(),
            effect: String::new(),
            localized_name: Default::default(),
            sort_index: 0.0,
        };
        assert_eq!(swatch_color(&color), egui::Color32::from_gray(90));
    }
}
