use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{Vehicle, FALLBACK_LANGUAGE};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::GallerySettings;
use crate::controller::{
    carousel::{environments, EnvironmentFilter},
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
    picker::PickerOutput,
    reducer::{GalleryAction, GalleryState, Transition},
};
use crate::ui::{
    picker_view::{swatch_color, PickerView},
    textures::{TextureCache, TextureSlot},
};

pub const PREFS_STORAGE_KEY: &str = "vehicle_gallery.prefs";
const DEFAULT_LANGUAGES: [&str; 5] = ["en", "de", "fr", "it", "es"];
const THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(160.0, 90.0);
const ZOOM_WINDOW_SIZE: egui::Vec2 = egui::vec2(1280.0, 720.0);
const BACKDROP_BLEND_SECS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPrefs {
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyCommand {
    Previous,
    Next,
    CloseZoom,
    ToggleZoom,
}

impl KeyCommand {
    fn action(self) -> GalleryAction {
        match self {
            Self::Previous => GalleryAction::Navigate(-1),
            Self::Next => GalleryAction::Navigate(1),
            Self::CloseZoom => GalleryAction::CloseZoom,
            Self::ToggleZoom => GalleryAction::ToggleZoom,
        }
    }
}

/// Largest rect with `image_size`'s aspect ratio centered in `container`.
pub fn fit_rect(container: egui::Rect, image_size: egui::Vec2) -> egui::Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return egui::Rect::from_center_size(container.center(), egui::Vec2::ZERO);
    }
    let scale = (container.width() / image_size.x).min(container.height() / image_size.y);
    egui::Rect::from_center_size(container.center(), image_size * scale.max(0.0))
}

/// Stage fill that fades from the previous paint color to the current one.
#[derive(Debug, Clone, PartialEq)]
struct StageBackdrop {
    from: egui::Color32,
    to: egui::Color32,
    started_at: Option<f64>,
    blend_secs: f64,
}

impl StageBackdrop {
    fn new(blend_secs: f64) -> Self {
        Self {
            from: egui::Color32::BLACK,
            to: egui::Color32::BLACK,
            started_at: None,
            blend_secs,
        }
    }

    fn is_blending(&self) -> bool {
        self.started_at.is_some()
    }

    fn color_at(&mut self, target: egui::Color32, now: f64) -> egui::Color32 {
        if target != self.to {
            self.from = self.blend(now);
            self.to = target;
            self.started_at = Some(now);
        }
        let color = self.blend(now);
        if color == self.to {
            self.started_at = None;
        }
        color
    }

    fn blend(&self, now: f64) -> egui::Color32 {
        let Some(started) = self.started_at else {
            return self.to;
        };
        if self.blend_secs <= f64::EPSILON {
            return self.to;
        }
        let t = ((now - started) / self.blend_secs).clamp(0.0, 1.0) as f32;
        if t >= 1.0 {
            self.to
        } else {
            self.from.lerp_to_gamma(self.to, t)
        }
    }
}

pub struct GalleryApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    gallery: GalleryState,
    picker: PickerView,
    textures: TextureCache,
    backdrop: StageBackdrop,
    language: String,
    status: String,
    backend_failure: Option<UiError>,
}

impl GalleryApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &GallerySettings,
        prefs: Option<PersistedPrefs>,
    ) -> Self {
        let language = prefs
            .map(|p| p.language)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| settings.language.clone());
        let mut app = Self {
            cmd_tx,
            ui_rx,
            gallery: GalleryState::new(),
            picker: PickerView::new(settings.tab_animation_secs),
            textures: TextureCache::default(),
            backdrop: StageBackdrop::new(BACKDROP_BLEND_SECS),
            language,
            status: String::new(),
            backend_failure: None,
        };
        app.dispatch(GalleryAction::Init);
        app
    }

    fn dispatch(&mut self, action: GalleryAction) {
        tracing::trace!(?action, generation = self.gallery.generation(), "gallery action");
        let Transition { state, effect } = std::mem::take(&mut self.gallery).apply(action);
        self.gallery = state;
        if let Some(effect) = effect {
            dispatch_backend_command(&self.cmd_tx, effect.into(), &mut self.status);
        }
    }

    fn queue(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn apply_picker_output(&mut self, output: PickerOutput) {
        if let Some(vehicle) = output.chosen_vehicle {
            self.dispatch(GalleryAction::SelectVehicle(vehicle));
        }
        if let Some(vehicle) = output.fetch_colors {
            self.queue(BackendCommand::LoadColors { vehicle });
        }
        if let Some((vehicle, color)) = output.chosen_color {
            self.dispatch(GalleryAction::SelectColor { vehicle, color });
        }
        self.forget_stale_textures();
    }

    fn forget_stale_textures(&mut self) {
        let urls = self.gallery.images.iter().map(|image| image.url.as_str());
        self.textures.retain_urls(urls);
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.status = err.message().to_string();
                    self.backend_failure = Some(err);
                }
                UiEvent::VehiclesLoaded(result) => {
                    self.dispatch(GalleryAction::VehiclesLoaded(result));
                }
                UiEvent::ColorsLoaded { vehicle, result } => {
                    if let Err(err) = &result {
                        tracing::warn!(%vehicle, "color catalog failed: {err}");
                    }
                    self.picker.state_mut().colors_loaded(&vehicle, result);
                }
                UiEvent::ImagesLoaded {
                    generation,
                    key,
                    result,
                } => {
                    self.dispatch(GalleryAction::ImagesLoaded {
                        generation,
                        key,
                        result,
                    });
                    self.forget_stale_textures();
                }
                UiEvent::ImageReady { url, image } => {
                    self.textures.insert_ready(ctx, url, image);
                }
                UiEvent::ImageFailed { url, error } => {
                    tracing::debug!(%url, category = ?error.category(), "rendering unavailable");
                    self.textures.insert_failed(
                        url,
                        error.user_message().to_string(),
                        error.is_retryable(),
                    );
                }
            }
        }
    }

    fn fatal_message(&self) -> Option<String> {
        if let Some(err) = &self.backend_failure {
            return Some(err.user_message().to_string());
        }
        self.gallery
            .is_halted()
            .then(|| self.gallery.error.clone().unwrap_or_default())
    }

    fn pressed_key_commands(ctx: &egui::Context) -> Vec<KeyCommand> {
        if ctx.wants_keyboard_input() {
            return Vec::new();
        }
        ctx.input(|i| {
            [
                (egui::Key::ArrowLeft, KeyCommand::Previous),
                (egui::Key::ArrowRight, KeyCommand::Next),
                (egui::Key::Escape, KeyCommand::CloseZoom),
                (egui::Key::F, KeyCommand::ToggleZoom),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, command)| command)
            .collect()
        })
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        for command in Self::pressed_key_commands(ctx) {
            self.dispatch(command.action());
        }
    }

    fn available_languages(&self) -> Vec<String> {
        let from_vehicle: Vec<String> = self
            .gallery
            .selected_vehicle
            .as_ref()
            .map(|v| v.localized_name.languages().map(str::to_string).collect())
            .unwrap_or_default();
        if from_vehicle.is_empty() {
            DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
        } else {
            from_vehicle
        }
    }

    fn vehicle_name(&self) -> Option<&str> {
        self.gallery
            .selected_vehicle
            .as_ref()
            .map(|v| v.display_name(&self.language))
    }

    fn show_fatal_screen(ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_rgb(17, 24, 39)))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(message)
                            .size(20.0)
                            .color(egui::Color32::WHITE),
                    );
                });
            });
    }

    fn show_title_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                match self.gallery.selected_vehicle.as_ref() {
                    Some(vehicle) => {
                        ui.heading(
                            egui::RichText::new(vehicle.display_name(&self.language)).strong(),
                        );
                        if let Some(color) = &self.gallery.selected_color {
                            ui.label(
                                egui::RichText::new(color.display_name(&self.language)).size(16.0),
                            );
                        }
                    }
                    None => {
                        ui.heading("Vehicle Gallery");
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let zoom = ui.add_enabled(
                        self.gallery.active_image().is_some(),
                        egui::Button::new("⛶ Full screen"),
                    );
                    if zoom.clicked() {
                        self.dispatch(GalleryAction::ToggleZoom);
                    }

                    let languages = self.available_languages();
                    egui::ComboBox::from_id_salt("language")
                        .selected_text(self.language.clone())
                        .show_ui(ui, |ui| {
                            for language in languages {
                                let label = language.clone();
                                ui.selectable_value(&mut self.language, language, label);
                            }
                        });

                    if !self.status.is_empty() {
                        ui.weak(self.status.as_str());
                    }
                });
            });

            if let Some(vehicle) = &self.gallery.selected_vehicle {
                show_vehicle_attributes(ui, vehicle, &self.language);
            }
            ui.add_space(4.0);
        });
    }

    fn show_picker_panel(&mut self, ctx: &egui::Context) {
        let output = egui::SidePanel::right("picker")
            .resizable(false)
            .exact_width(220.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.picker.show(
                    ui,
                    self.gallery.vehicle_list(),
                    self.gallery.selected_color.as_ref(),
                    &self.language,
                )
            })
            .inner;
        self.apply_picker_output(output);
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self.gallery.error.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.dispatch(GalleryAction::DismissError);
                        }
                    });
                });
            });
    }

    fn show_thumbnail_strip(&mut self, ctx: &egui::Context) {
        if self.gallery.images.is_empty() && self.gallery.error.is_none() {
            return;
        }
        egui::TopBottomPanel::bottom("thumbnails").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_error_banner(ui);

            let scenes = environments(&self.gallery.images);
            if scenes.len() > 1 {
                ui.horizontal(|ui| {
                    let filters = std::iter::once(EnvironmentFilter::All)
                        .chain(scenes.into_iter().map(EnvironmentFilter::Only));
                    for filter in filters {
                        let selected = self.gallery.environment_filter == filter;
                        if ui.selectable_label(selected, filter.label()).clicked() {
                            self.dispatch(GalleryAction::SetEnvironmentFilter(filter));
                        }
                    }
                });
            }

            let vehicle_name = self.vehicle_name().map(str::to_string);
            let mut clicked = None;
            egui::ScrollArea::horizontal()
                .id_salt("thumbnail_strip")
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for index in self.gallery.visible_indices() {
                            let image = &self.gallery.images[index];
                            if let Some(cmd) = self.textures.request(&image.url) {
                                dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
                            }
                            let selected = index == self.gallery.active_image_index;
                            let response = match self.textures.texture(&image.url) {
                                Some(texture) => ui.add(
                                    egui::Button::image(
                                        egui::Image::new(texture).fit_to_exact_size(THUMBNAIL_SIZE),
                                    )
                                    .selected(selected),
                                ),
                                None => ui.add_sized(
                                    THUMBNAIL_SIZE,
                                    egui::Button::new(image.view_angle.as_str()).selected(selected),
                                ),
                            };
                            if response
                                .on_hover_text(image.caption(vehicle_name.as_deref()))
                                .clicked()
                            {
                                clicked = Some(index);
                            }
                        }
                    });
                });
            if let Some(index) = clicked {
                self.dispatch(GalleryAction::SelectImage(index));
            }
            ui.add_space(6.0);
        });
    }

    fn show_stage(&mut self, ctx: &egui::Context) {
        let background = self
            .gallery
            .selected_color
            .as_ref()
            .map(swatch_color)
            .unwrap_or(egui::Color32::BLACK);
        let background = self.backdrop.color_at(background, ctx.input(|i| i.time));
        if self.backdrop.is_blending() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(background))
            .show(ctx, |ui| {
                let stage = ui.max_rect();
                let Some(image) = self.gallery.active_image().cloned() else {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new(self.gallery.status_line())
                                .size(24.0)
                                .color(egui::Color32::WHITE),
                        );
                    });
                    return;
                };

                if let Some(cmd) = self.textures.request(&image.url) {
                    self.queue(cmd);
                }
                match self.textures.get(&image.url) {
                    Some(TextureSlot::Ready(texture)) => {
                        let target = fit_rect(stage, texture.size_vec2());
                        egui::Image::new(texture).paint_at(ui, target);
                    }
                    Some(TextureSlot::Failed { message, retryable }) => {
                        let retryable = *retryable;
                        let message = message.clone();
                        let mut notice = ui.new_child(
                            egui::UiBuilder::new()
                                .max_rect(stage)
                                .layout(egui::Layout::top_down(egui::Align::Center)),
                        );
                        notice.add_space((stage.height() / 2.0 - 24.0).max(0.0));
                        notice.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                        let retry = retryable && notice.button("Retry").clicked();
                        if retry {
                            if let Some(cmd) = self.textures.retry(&image.url) {
                                self.queue(cmd);
                            }
                        }
                    }
                    _ => {
                        ui.put(stage, egui::Spinner::new().size(32.0));
                    }
                }

                let caption = image.caption(self.vehicle_name());
                let caption_rect = egui::Rect::from_min_size(
                    stage.left_bottom() + egui::vec2(12.0, -36.0),
                    egui::vec2(stage.width() - 24.0, 24.0),
                );
                ui.put(
                    caption_rect,
                    egui::Label::new(
                        egui::RichText::new(caption)
                            .color(egui::Color32::WHITE)
                            .background_color(egui::Color32::from_black_alpha(128)),
                    ),
                );

                let button_size = egui::vec2(36.0, 36.0);
                let previous = egui::Rect::from_center_size(
                    egui::pos2(stage.left() + 30.0, stage.center().y),
                    button_size,
                );
                let next = egui::Rect::from_center_size(
                    egui::pos2(stage.right() - 30.0, stage.center().y),
                    button_size,
                );
                if ui.put(previous, egui::Button::new("◀")).clicked() {
                    self.dispatch(GalleryAction::Navigate(-1));
                }
                if ui.put(next, egui::Button::new("▶")).clicked() {
                    self.dispatch(GalleryAction::Navigate(1));
                }
            });
    }

    fn show_zoom_window(&mut self, ctx: &egui::Context) {
        if !self.gallery.zoomed {
            return;
        }
        let Some(image) = self.gallery.active_image().cloned() else {
            return;
        };

        let mut keep_open = true;
        egui::Window::new(image.caption(self.vehicle_name()))
            .id(egui::Id::new("zoom_window"))
            .open(&mut keep_open)
            .resizable(true)
            .collapsible(false)
            .default_size(ZOOM_WINDOW_SIZE)
            .show(ctx, |ui| match self.textures.texture(&image.url) {
                Some(texture) => {
                    let size = fit_rect(ui.available_rect_before_wrap(), texture.size_vec2()).size();
                    ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                }
                None => {
                    ui.label("Preview not available.");
                }
            });

        if !keep_open {
            self.dispatch(GalleryAction::CloseZoom);
        }
    }
}

fn show_vehicle_attributes(ui: &mut egui::Ui, vehicle: &Vehicle, language: &str) {
    let attributes = vehicle.attributes(language);
    if attributes.is_empty() {
        return;
    }
    ui.horizontal_wrapped(|ui| {
        for (label, value) in attributes {
            ui.weak(format!("{label}:"));
            ui.label(value);
            ui.add_space(10.0);
        }
    });
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        if let Some(message) = self.fatal_message() {
            Self::show_fatal_screen(ctx, &message);
            return;
        }

        self.handle_keyboard(ctx);
        self.show_title_bar(ctx);
        self.show_picker_panel(ctx);
        self.show_thumbnail_strip(ctx);
        self.show_stage(ctx);
        self.show_zoom_window(ctx);

        if self.gallery.loading || self.picker.is_animating() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let prefs = PersistedPrefs {
            language: if self.language.is_empty() {
                FALLBACK_LANGUAGE.to_string()
            } else {
                self.language.clone()
            },
        };
        if let Ok(serialized) = serde_json::to_string(&prefs) {
            storage.set_string(PREFS_STORAGE_KEY, serialized);
        }
    }
}
