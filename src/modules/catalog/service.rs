use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::model::{Item, ItemDto, ItemFilterParams};

/// In-process catalog of items grouped by resource family.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Arc<DashMap<(String, u64), Item>>,
    next_id: Arc<AtomicU64>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, family: &str, filters: &ItemFilterParams) -> Vec<Item> {
        let needle = filters.name.as_deref().map(str::to_lowercase);

        let mut items: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| entry.key().0 == family)
            .filter(|entry| match &needle {
                Some(needle) => entry.value().name.to_lowercase().contains(needle),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();

        items.sort_by_key(|item| item.id);
        if let Some(limit) = filters.limit {
            items.truncate(limit);
        }
        items
    }

    pub fn get(&self, family: &str, id: u64) -> Option<Item> {
        self.items
            .get(&(family.to_string(), id))
            .map(|entry| entry.value().clone())
    }

    pub fn create(&self, family: &str, dto: ItemDto) -> Item {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let item = Item {
            id,
            name: dto.name,
            description: dto.description,
        };
        self.items.insert((family.to_string(), id), item.clone());
        item
    }

    pub fn update(&self, family: &str, id: u64, dto: ItemDto) -> Option<Item> {
        let mut entry = self.items.get_mut(&(family.to_string(), id))?;
        entry.name = dto.name;
        entry.description = dto.description;
        Some(entry.value().clone())
    }

    pub fn delete(&self, family: &str, id: u64) -> bool {
        self.items.remove(&(family.to_string(), id)).is_some()
    }
}
