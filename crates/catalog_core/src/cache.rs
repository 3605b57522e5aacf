use std::{collections::HashMap, hash::Hash, sync::Arc};

use shared::{
    domain::{sort_colors, ColorKey, ColorOption, RenderedImage, Vehicle, VehicleKey},
    error::{NetworkError, NetworkResult},
};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::client::CatalogClient;

type Slot<T> = Arc<OnceCell<Arc<Vec<T>>>>;

/// Session-scoped memo in front of a [`CatalogClient`].
///
/// Requests for the same key share one in-flight fetch and its result, so the
/// picker and the gallery can both ask for a vehicle's colors without issuing
/// two requests. Failed fetches leave the slot empty; asking again retries.
pub struct CatalogCache<C> {
    client: C,
    vehicles: OnceCell<Arc<Vec<Vehicle>>>,
    colors: Mutex<HashMap<VehicleKey, Slot<ColorOption>>>,
    images: Mutex<HashMap<ColorKey, Slot<RenderedImage>>>,
}

impl<C: CatalogClient> CatalogCache<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            vehicles: OnceCell::new(),
            colors: Mutex::new(HashMap::new()),
            images: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn vehicles(&self) -> NetworkResult<Arc<Vec<Vehicle>>> {
        self.vehicles
            .get_or_try_init(|| async {
                debug!("fetching vehicle catalog");
                self.client.list_vehicles().await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Colors for `vehicle`, sorted ascending by `SortIndex`.
    pub async fn colors(&self, vehicle: &VehicleKey) -> NetworkResult<Arc<Vec<ColorOption>>> {
        let slot = slot_for(&self.colors, vehicle).await;
        slot.get_or_try_init(|| async {
            debug!(%vehicle, "fetching color catalog");
            let mut colors = self.client.list_colors(vehicle).await?;
            sort_colors(&mut colors);
            Ok::<_, NetworkError>(Arc::new(colors))
        })
        .await
        .cloned()
    }

    pub async fn images(&self, key: &ColorKey) -> NetworkResult<Arc<Vec<RenderedImage>>> {
        let slot = slot_for(&self.images, key).await;
        slot.get_or_try_init(|| async {
            debug!(%key, "fetching media");
            self.client.list_images(key).await.map(Arc::new)
        })
        .await
        .cloned()
    }
}

async fn slot_for<K, T>(slots: &Mutex<HashMap<K, Slot<T>>>, key: &K) -> Slot<T>
where
    K: Eq + Hash + Clone,
{
    let mut guard = slots.lock().await;
    guard.entry(key.clone()).or_default().clone()
}
