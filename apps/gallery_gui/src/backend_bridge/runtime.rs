//! Runtime bridge between UI command queue and backend event intake.
//!
//! One OS thread owns a tokio runtime. Commands are read off the UI queue and
//! each runs in its own task, so a slow media request never holds up a color
//! request. Results go back as [`UiEvent`]s and wake the UI.

use std::{sync::Arc, thread};

use catalog_core::{CatalogCache, HttpCatalogClient, ImageFetcher};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    config::GallerySettings,
    controller::events::{UiError, UiErrorContext, UiEvent},
    media::decode_preview_image,
};

/// Delivers events to the UI thread and asks it to repaint.
#[derive(Clone)]
pub struct UiNotifier {
    ui_tx: Sender<UiEvent>,
    repaint: Option<egui::Context>,
}

impl UiNotifier {
    pub fn new(ui_tx: Sender<UiEvent>, repaint: Option<egui::Context>) -> Self {
        Self { ui_tx, repaint }
    }

    pub fn post(&self, event: UiEvent) {
        match self.ui_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::warn!("backend->ui event queue is full"),
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("ui event queue closed; dropping event")
            }
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

struct Backend {
    cache: CatalogCache<HttpCatalogClient>,
    images: ImageFetcher,
    max_texture_dimension: u32,
    notifier: UiNotifier,
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, notifier: UiNotifier, settings: GallerySettings) {
    thread::spawn(move || {
        notifier.post(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("gallery-backend")
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                notifier.post(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client =
            match HttpCatalogClient::new(&settings.api_base_url, settings.request_timeout()) {
                Ok(client) => client,
                Err(err) => {
                    notifier.post(UiEvent::Error(UiError::from_network(
                        UiErrorContext::BackendStartup,
                        &err,
                    )));
                    tracing::error!(api = %settings.api_base_url, "invalid catalog client settings: {err}");
                    return;
                }
            };

        let backend = Arc::new(Backend {
            images: ImageFetcher::new(client.http().clone(), settings.allowlist()),
            cache: CatalogCache::new(client),
            max_texture_dimension: settings.max_texture_dimension,
            notifier: notifier.clone(),
        });
        tracing::info!(api = %settings.api_base_url, "backend worker ready");
        notifier.post(UiEvent::Info("Backend worker ready".to_string()));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend received command");
                let backend = Arc::clone(&backend);
                tokio::spawn(async move { backend.handle(cmd).await });
            }
            tracing::info!("ui command queue closed; backend worker stopping");
        });
    });
}

impl Backend {
    async fn handle(&self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::LoadVehicles => {
                let result = self.cache.vehicles().await.map(|v| v.as_ref().clone());
                self.notifier.post(UiEvent::VehiclesLoaded(result));
            }
            BackendCommand::LoadColors { vehicle } => {
                let result = self.cache.colors(&vehicle).await.map(|c| c.as_ref().clone());
                self.notifier.post(UiEvent::ColorsLoaded { vehicle, result });
            }
            BackendCommand::LoadImages { generation, key } => {
                let result = self.cache.images(&key).await.map(|i| i.as_ref().clone());
                self.notifier.post(UiEvent::ImagesLoaded {
                    generation,
                    key,
                    result,
                });
            }
            BackendCommand::FetchImage { url } => self.fetch_image(url).await,
        }
    }

    async fn fetch_image(&self, url: String) {
        let bytes = match self.images.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%url, "rendering download failed: {err}");
                self.notifier.post(UiEvent::ImageFailed {
                    error: UiError::from_network(UiErrorContext::ImageDownload, &err),
                    url,
                });
                return;
            }
        };

        let max_dimension = self.max_texture_dimension;
        let decoded =
            tokio::task::spawn_blocking(move || decode_preview_image(&bytes, max_dimension)).await;
        let event = match decoded {
            Ok(Ok(image)) => UiEvent::ImageReady { url, image },
            Ok(Err(reason)) => {
                tracing::warn!(%url, "rendering could not be decoded: {reason}");
                UiEvent::ImageFailed {
                    error: UiError::from_message(
                        UiErrorContext::ImageDownload,
                        format!("decode failed: {reason}"),
                    ),
                    url,
                }
            }
            Err(join_err) => {
                tracing::error!(%url, "decode task failed: {join_err}");
                UiEvent::ImageFailed {
                    error: UiError::from_message(UiErrorContext::ImageDownload, join_err.to_string()),
                    url,
                }
            }
        };
        self.notifier.post(event);
    }
}
