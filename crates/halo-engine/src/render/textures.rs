use std::collections::HashMap;
use std::hash::Hash;

use crate::ui::TextureId;

/// Memoizes one bind group per texture identity and hands out [`TextureId`]s.
///
/// `K` is the identity of a texture view. For `wgpu::TextureView`, `Eq`/`Hash`
/// compare the underlying resource handle, not pixel contents. Entries are
/// never evicted; UI texture sets are small and live as long as the overlay.
pub struct BindGroupCache<K, G> {
    ids: HashMap<K, TextureId>,
    groups: HashMap<TextureId, G>,
    next_id: u64,
}

impl<K, G> Default for BindGroupCache<K, G> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            groups: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<K: Eq + Hash + Clone, G> BindGroupCache<K, G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `key`, calling `create` only the first time it is seen.
    pub fn bind_with(&mut self, key: &K, create: impl FnOnce() -> G) -> TextureId {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.groups.insert(id, create());
        self.ids.insert(key.clone(), id);
        log::debug!("bound texture {:?} ({} cached)", id, self.groups.len());
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&G> {
        self.groups.get(&id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Releases every entry. Ids handed out earlier become dangling.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.ids.clear();
    }
}

/// Creates the single-binding bind group used for an image texture.
pub(crate) fn image_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("halo overlay image bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(view),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_id_without_recreating() {
        let mut cache: BindGroupCache<u32, String> = BindGroupCache::new();
        let mut created = 0;

        let a = cache.bind_with(&7, || {
            created += 1;
            "seven".to_string()
        });
        let b = cache.bind_with(&7, || {
            created += 1;
            "seven again".to_string()
        });

        assert_eq!(a, b);
        assert_eq!(created, 1);
        assert_eq!(cache.get(a).map(String::as_str), Some("seven"));
    }

    #[test]
    fn distinct_keys_get_distinct_ids() {
        let mut cache: BindGroupCache<u32, u32> = BindGroupCache::new();
        let a = cache.bind_with(&1, || 10);
        let b = cache.bind_with(&2, || 20);

        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(b), Some(&20));
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut cache: BindGroupCache<u32, u32> = BindGroupCache::new();
        let a = cache.bind_with(&1, || 10);
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(a).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut cache: BindGroupCache<u32, u32> = BindGroupCache::new();
        let a = cache.bind_with(&1, || 10);
        cache.clear();
        let b = cache.bind_with(&1, || 11);
        assert_ne!(a, b);
    }
}
