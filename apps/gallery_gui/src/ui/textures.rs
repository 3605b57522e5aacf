use std::collections::HashMap;

use eframe::egui;
use egui::TextureHandle;

use crate::{backend_bridge::commands::BackendCommand, media::PreviewImage};

pub enum TextureSlot {
    Pending,
    Ready(TextureHandle),
    Failed { message: String, retryable: bool },
}

/// GPU textures for renderings, keyed by URL. Each URL is requested from the
/// backend at most once per image set.
#[derive(Default)]
pub struct TextureCache {
    slots: HashMap<String, TextureSlot>,
}

impl TextureCache {
    /// Returns the download command the first time `url` is seen.
    pub fn request(&mut self, url: &str) -> Option<BackendCommand> {
        if self.slots.contains_key(url) {
            return None;
        }
        self.slots.insert(url.to_string(), TextureSlot::Pending);
        Some(BackendCommand::FetchImage {
            url: url.to_string(),
        })
    }

    pub fn get(&self, url: &str) -> Option<&TextureSlot> {
        self.slots.get(url)
    }

    pub fn texture(&self, url: &str) -> Option<&TextureHandle> {
        match self.slots.get(url) {
            Some(TextureSlot::Ready(texture)) => Some(texture),
            _ => None,
        }
    }

    pub fn insert_ready(&mut self, ctx: &egui::Context, url: String, image: PreviewImage) {
        // Late arrivals for a set that was already replaced are not kept.
        if !self.slots.contains_key(&url) {
            return;
        }
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
        let texture = ctx.load_texture(
            format!("rendering:{url}"),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.slots.insert(url, TextureSlot::Ready(texture));
    }

    pub fn insert_failed(&mut self, url: String, message: String, retryable: bool) {
        if self.slots.contains_key(&url) {
            self.slots
                .insert(url, TextureSlot::Failed { message, retryable });
        }
    }

    /// Re-queues a failed download, unless the failure would just repeat.
    pub fn retry(&mut self, url: &str) -> Option<BackendCommand> {
        match self.slots.get(url) {
            Some(TextureSlot::Failed {
                retryable: true, ..
            }) => {
                self.slots.remove(url);
                self.request(url)
            }
            _ => None,
        }
    }

    /// Drops every texture whose URL is not in `keep`.
    pub fn retain_urls<'a>(&mut self, keep: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = keep.into_iter().collect();
        self.slots.retain(|url, _| keep.contains(url.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://renderings.evecp.bmw.cloud/trunks/a/G82_de_Studio_day_cam_01.jpg";

    #[test]
    fn requests_each_url_once() {
        let mut cache = TextureCache::default();
        assert_eq!(
            cache.request(URL),
            Some(BackendCommand::FetchImage { url: URL.into() })
        );
        assert_eq!(cache.request(URL), None);
        assert!(matches!(cache.get(URL), Some(TextureSlot::Pending)));
    }

    #[test]
    fn failure_is_remembered_without_refetching() {
        let mut cache = TextureCache::default();
        cache.request(URL);
        cache.insert_failed(URL.into(), "Image unavailable.".into(), true);

        assert!(matches!(cache.get(URL), Some(TextureSlot::Failed { .. })));
        assert_eq!(cache.request(URL), None);
        assert!(cache.texture(URL).is_none());
    }

    #[test]
    fn retry_requeues_only_transient_failures() {
        let mut cache = TextureCache::default();
        cache.request(URL);
        cache.insert_failed(URL.into(), "Server busy.".into(), true);
        assert_eq!(
            cache.retry(URL),
            Some(BackendCommand::FetchImage { url: URL.into() })
        );
        assert!(matches!(cache.get(URL), Some(TextureSlot::Pending)));

        let refused = "https://elsewhere.example.com/x.jpg";
        cache.request(refused);
        cache.insert_failed(refused.into(), "Blocked.".into(), false);
        assert_eq!(cache.retry(refused), None);
        assert_eq!(cache.retry("https://never-requested.example.com/"), None);
    }

    #[test]
    fn ignores_results_for_urls_no_longer_tracked() {
        let mut cache = TextureCache::default();
        cache.request(URL);
        cache.retain_urls(std::iter::empty());
        assert!(cache.get(URL).is_none());

        cache.insert_failed(URL.into(), "late".into(), true);
        assert!(cache.get(URL).is_none());
    }
}
