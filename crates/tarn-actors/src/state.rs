//! The persisted game state: everything a save file remembers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Serialized wholesale on explicit save; field names match the historical
/// JSON blob so old saves keep loading.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveState {
    pub coins: u32,
    pub keys: u32,
    pub bombs: u32,
    /// Item name -> owned count.
    pub inventory: BTreeMap<String, u32>,
    pub max_hit_points: f32,
    pub has_map_by_dungeon: BTreeMap<String, bool>,
    pub has_compass_by_dungeon: BTreeMap<String, bool>,
    /// room unique name -> manifest position -> hidden.
    pub is_hidden_by_actor_count_number: BTreeMap<String, BTreeMap<u32, bool>>,
    /// Where to resume on the overworld, if a save exists.
    pub last_overworld_location: Option<[f32; 3]>,
}

impl SaveState {
    pub fn new() -> Self {
        Self {
            max_hit_points: 3.0,
            ..Self::default()
        }
    }

    /// Count view of the inventory; bombs live in their own counter.
    pub fn count(&self, item: &str) -> u32 {
        if item == "bomb" {
            return self.bombs;
        }
        self.inventory.get(item).copied().unwrap_or(0)
    }

    /// Boolean view: one consistent representation, so callers never branch
    /// on a raw count by accident.
    pub fn has(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    pub fn add_item(&mut self, item: &str) {
        *self.inventory.entry(item.to_string()).or_insert(0) += 1;
    }

    pub fn mark_hidden(&mut self, room_unique_name: &str, actor_count_number: u32) {
        self.is_hidden_by_actor_count_number
            .entry(room_unique_name.to_string())
            .or_default()
            .insert(actor_count_number, true);
    }

    pub fn is_hidden(&self, room_unique_name: &str, actor_count_number: u32) -> bool {
        self.is_hidden_by_actor_count_number
            .get(room_unique_name)
            .and_then(|m| m.get(&actor_count_number))
            .copied()
            .unwrap_or(false)
    }

    /// Forgets all hidden actors in the named rooms (overworld reset when
    /// the avatar climbs out of a cave).
    pub fn clear_hidden_in(&mut self, room_unique_names: &[String]) {
        for name in room_unique_names {
            self.is_hidden_by_actor_count_number
                .insert(name.clone(), BTreeMap::new());
        }
    }

    pub fn has_saved_location(&self) -> bool {
        self.last_overworld_location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bombs_route_through_their_own_counter() {
        let mut s = SaveState::new();
        assert!(!s.has("bomb"));
        s.bombs = 4;
        assert!(s.has("bomb"));
        assert_eq!(s.count("bomb"), 4);
        s.add_item("boomerang");
        assert_eq!(s.count("boomerang"), 1);
        assert!(s.has("boomerang"));
    }

    #[test]
    fn hidden_flags_round_trip_per_room() {
        let mut s = SaveState::new();
        s.mark_hidden("Overworld,0,0", 2);
        assert!(s.is_hidden("Overworld,0,0", 2));
        assert!(!s.is_hidden("Overworld,0,0", 1));
        assert!(!s.is_hidden("Overworld,1,0", 2));
        s.clear_hidden_in(&["Overworld,0,0".to_string()]);
        assert!(!s.is_hidden("Overworld,0,0", 2));
    }
}
