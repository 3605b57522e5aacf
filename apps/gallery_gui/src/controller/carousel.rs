//! Carousel index arithmetic and the environment (scene) filter.

use shared::domain::RenderedImage;

/// Steps `current` by `delta` with wraparound in both directions.
/// An empty carousel always yields 0.
pub fn wrap_index(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as i64 + delta as i64).rem_euclid(len as i64) as usize
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnvironmentFilter {
    #[default]
    All,
    Only(String),
}

impl EnvironmentFilter {
    pub fn matches(&self, image: &RenderedImage) -> bool {
        match self {
            Self::All => true,
            Self::Only(environment) => image.environment == *environment,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Only(environment) => environment,
        }
    }
}

/// Distinct scene tags in first-seen order.
pub fn environments(images: &[RenderedImage]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for image in images {
        if !image.environment.is_empty() && !seen.contains(&image.environment) {
            seen.push(image.environment.clone());
        }
    }
    seen
}

pub fn visible_indices(images: &[RenderedImage], filter: &EnvironmentFilter) -> Vec<usize> {
    images
        .iter()
        .enumerate()
        .filter(|(_, image)| filter.matches(image))
        .map(|(index, _)| index)
        .collect()
}

/// Like [`wrap_index`], but only lands on images the filter lets through.
/// If the current image is itself filtered out, the step goes to the nearest
/// match in the direction of travel.
pub fn step_filtered(
    images: &[RenderedImage],
    filter: &EnvironmentFilter,
    current: usize,
    delta: isize,
) -> usize {
    if *filter == EnvironmentFilter::All {
        return wrap_index(current, images.len(), delta);
    }
    let visible = visible_indices(images, filter);
    let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
        return current;
    };

    match visible.iter().position(|&index| index == current) {
        Some(position) => visible[wrap_index(position, visible.len(), delta)],
        None if delta >= 0 => visible
            .iter()
            .copied()
            .find(|&index| index > current)
            .unwrap_or(first),
        None => visible
            .iter()
            .rev()
            .copied()
            .find(|&index| index < current)
            .unwrap_or(last),
    }
}

#[cfg(test)]
#[path = "tests/carousel_tests.rs"]
mod tests;
