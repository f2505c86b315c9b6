//! Flat key/value projection of simulation state for narration layers.

use std::collections::BTreeMap;

use crate::state::{Survivor, World};

/// Build a deterministic, string-keyed snapshot of the survivor and
/// world. Keys are stable across releases; downstream prompt templates
/// index into this map by name.
#[must_use]
pub fn survivor_snapshot(survivor: &Survivor, world: &World) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        map.insert(key.to_string(), value);
    };

    put("survivor.name", survivor.name.clone());
    put("survivor.age", survivor.age.to_string());
    put("survivor.background", survivor.background.clone());
    put("survivor.alive", survivor.alive.to_string());
    put(
        "survivor.traits",
        survivor
            .traits
            .iter()
            .map(|t| t.key())
            .collect::<Vec<_>>()
            .join(","),
    );
    put(
        "survivor.conditions",
        survivor
            .conditions
            .iter()
            .map(|c| c.key())
            .collect::<Vec<_>>()
            .join(","),
    );
    put("survivor.group", survivor.group.key().to_string());
    put("survivor.group_size", survivor.group_size.to_string());

    put("stats.health", survivor.stats.health.to_string());
    put("stats.hunger", survivor.stats.hunger.to_string());
    put("stats.thirst", survivor.stats.thirst.to_string());
    put("stats.fatigue", survivor.stats.fatigue.to_string());
    put("stats.morale", survivor.stats.morale.to_string());

    for (skill, level) in survivor.skills.iter() {
        map.insert(format!("skills.{}", skill.key()), level.to_string());
    }
    for (item, count) in survivor.inventory.iter() {
        map.insert(format!("inventory.{item}"), count.to_string());
    }

    let env = &survivor.env;
    let mut put = |key: &str, value: String| {
        map.insert(key.to_string(), value);
    };
    put("env.world_day", env.world_day.to_string());
    put("env.time_of_day", env.time_of_day.key().to_string());
    put("env.season", env.season.key().to_string());
    put("env.weather", env.weather.key().to_string());
    put("env.temp_band", env.temp_band.key().to_string());
    put("env.region", env.region.clone());
    put("env.location", env.location.key().to_string());
    put("env.infected_present", env.infected_present.to_string());
    put("env.timezone", env.timezone.clone());

    put("world.day", world.day().to_string());
    put("world.rules_version", world.rules_version.clone());

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::RunSeed;
    use crate::state::{Condition, Skill};

    #[test]
    fn snapshot_exposes_stable_keys() {
        let world = World::generate(RunSeed::new("snapshot").unwrap(), "rules-v1");
        let mut survivor = Survivor {
            name: String::from("Katya"),
            ..Survivor::default()
        };
        survivor.skills.set_floor(Skill::Medicine, 2);
        survivor.inventory.grant("water_bottle", 2);
        survivor.add_condition(Condition::Pain);

        let snapshot = survivor_snapshot(&survivor, &world);
        assert_eq!(snapshot["survivor.name"], "Katya");
        assert_eq!(snapshot["stats.health"], "100");
        assert_eq!(snapshot["skills.medicine"], "2");
        assert_eq!(snapshot["inventory.water_bottle"], "2");
        assert_eq!(snapshot["survivor.conditions"], "pain");
        assert_eq!(snapshot["world.rules_version"], "rules-v1");
        // Never leak the hidden origin city.
        assert!(!snapshot.values().any(|value| value.contains(&world.origin.city)));
    }

    #[test]
    fn snapshot_is_deterministic() {
        let world = World::generate(RunSeed::new("snapshot determinism").unwrap(), "rules-v1");
        let survivor = Survivor::default();
        assert_eq!(
            survivor_snapshot(&survivor, &world),
            survivor_snapshot(&survivor, &world)
        );
    }
}
