//! Survivor and starting-world generation.
//!
//! Both entry points are pure functions of (stream, world): every draw
//! comes from a labelled child stream so the same seed always produces
//! the same survivor, independent of draw ordering elsewhere.

use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::arrival::derive_initial_lad;
use crate::constants::{
    FIRST_SURVIVOR_AGE_RANGE, FIRST_SURVIVOR_MAX_DISTANCE_KM, REPLACEMENT_AGE_RANGE,
    RESEARCHER_BRANCH_CHANCE, RESEARCHER_EARLIEST_DAY, TRAIT_COUNT_MAX, TRAIT_COUNT_MIN,
};
use crate::seed::Stream;
use crate::state::{
    Environment, GroupKind, LocationType, Season, Skill, StatKey, Stats, Survivor, TimeOfDay,
    TraitId, Weather, World,
};

/// Stat draw bounds plus starting grants for one background.
#[derive(Debug, Clone)]
pub struct ProfessionTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub weight: u32,
    pub stat_ranges: [(StatKey, i32, i32); 5],
    pub items: &'static [(&'static str, u32)],
    pub skill_floors: &'static [(Skill, u8)],
}

/// Weighted background table shared by both generation paths.
pub fn professions() -> &'static [ProfessionTemplate] {
    static TABLE: OnceLock<Vec<ProfessionTemplate>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            ProfessionTemplate {
                id: "field_medic",
                name: "Field Medic",
                weight: 3,
                stat_ranges: stat_ranges(70, 90, 15, 35, 15, 35, 10, 30, 55, 75),
                items: &[("first_aid_kit", 1), ("water_bottle", 1)],
                skill_floors: &[(Skill::Medicine, 2)],
            },
            ProfessionTemplate {
                id: "park_ranger",
                name: "Park Ranger",
                weight: 3,
                stat_ranges: stat_ranges(75, 95, 20, 40, 20, 40, 10, 25, 50, 70),
                items: &[("water_bottle", 2), ("map", 1)],
                skill_floors: &[(Skill::Navigation, 2), (Skill::Scavenging, 1)],
            },
            ProfessionTemplate {
                id: "electrician",
                name: "Electrician",
                weight: 3,
                stat_ranges: stat_ranges(70, 90, 20, 40, 20, 40, 15, 35, 45, 65),
                items: &[("toolkit", 1), ("flashlight", 1)],
                skill_floors: &[(Skill::Crafting, 2)],
            },
            ProfessionTemplate {
                id: "line_cook",
                name: "Line Cook",
                weight: 4,
                stat_ranges: stat_ranges(65, 85, 10, 30, 15, 35, 15, 35, 50, 70),
                items: &[("canned_food", 3), ("kitchen_knife", 1)],
                skill_floors: &[(Skill::Scavenging, 1), (Skill::Endurance, 1)],
            },
            ProfessionTemplate {
                id: "librarian",
                name: "Librarian",
                weight: 3,
                stat_ranges: stat_ranges(60, 80, 20, 40, 20, 40, 10, 30, 55, 80),
                items: &[("notebook", 1), ("flashlight", 1)],
                skill_floors: &[(Skill::Observation, 2)],
            },
            ProfessionTemplate {
                id: "social_worker",
                name: "Social Worker",
                weight: 3,
                stat_ranges: stat_ranges(65, 85, 20, 40, 20, 40, 15, 35, 55, 80),
                items: &[("water_bottle", 1), ("blanket", 1)],
                skill_floors: &[(Skill::Diplomacy, 2), (Skill::Leadership, 1)],
            },
            ProfessionTemplate {
                id: "warehouse_picker",
                name: "Warehouse Picker",
                weight: 4,
                stat_ranges: stat_ranges(75, 95, 15, 40, 20, 45, 10, 30, 45, 65),
                items: &[("duct_tape", 2), ("work_gloves", 1)],
                skill_floors: &[(Skill::Endurance, 2)],
            },
        ]
    })
}

#[allow(clippy::too_many_arguments)]
const fn stat_ranges(
    health_lo: i32,
    health_hi: i32,
    hunger_lo: i32,
    hunger_hi: i32,
    thirst_lo: i32,
    thirst_hi: i32,
    fatigue_lo: i32,
    fatigue_hi: i32,
    morale_lo: i32,
    morale_hi: i32,
) -> [(StatKey, i32, i32); 5] {
    [
        (StatKey::Health, health_lo, health_hi),
        (StatKey::Hunger, hunger_lo, hunger_hi),
        (StatKey::Thirst, thirst_lo, thirst_hi),
        (StatKey::Fatigue, fatigue_lo, fatigue_hi),
        (StatKey::Morale, morale_lo, morale_hi),
    ]
}

const FIRST_NAMES: [&str; 16] = [
    "Ada", "Bea", "Casimir", "Dara", "Elio", "Femi", "Greta", "Hale", "Imre", "Jun", "Katya",
    "Lior", "Marisol", "Noor", "Oskar", "Priya",
];

/// Coarse, non-revealing labels for the origin's country code. Unmapped
/// countries fall back to "Unknown Region" so the true origin stays
/// hidden.
fn region_for_country(country: &str) -> &'static str {
    match country {
        "RU" => "Eastern Europe",
        "JP" => "East Asia",
        "GB" | "FR" | "DE" => "Western Europe",
        "US" | "CA" => "North America",
        "BR" | "AR" => "South America",
        "ZA" => "Southern Africa",
        _ => "Unknown Region",
    }
}

/// Flat world-region labels for replacement survivors, independent of
/// the true origin.
const WORLD_REGIONS: [&str; 8] = [
    "Western Europe",
    "Eastern Europe",
    "North America",
    "South America",
    "East Asia",
    "South Asia",
    "Southern Africa",
    "Oceania",
];

fn draw_traits(stream: &mut Stream) -> SmallVec<[TraitId; 3]> {
    let span = (TRAIT_COUNT_MAX - TRAIT_COUNT_MIN + 1) as u64;
    let count = TRAIT_COUNT_MIN + stream.bounded(span) as usize;
    let mut pool: Vec<TraitId> = TraitId::POOL.to_vec();
    let mut picked = SmallVec::new();
    for _ in 0..count {
        let index = stream.bounded(pool.len() as u64) as usize;
        picked.push(pool.swap_remove(index));
    }
    picked
}

fn pick_profession(stream: &mut Stream) -> &'static ProfessionTemplate {
    let table = professions();
    let total: u32 = table.iter().map(|profession| profession.weight.max(1)).sum();
    let mut roll = stream.bounded(u64::from(total)) as u32;
    for profession in table {
        let weight = profession.weight.max(1);
        if roll < weight {
            return profession;
        }
        roll -= weight;
    }
    &table[table.len() - 1]
}

fn draw_stats(template: &ProfessionTemplate, stream: &Stream) -> Stats {
    let mut stats = Stats::zeroed();
    for (key, lo, hi) in &template.stat_ranges {
        // Independent child per stat keeps draws order-insensitive.
        let mut child = stream.child(key.key());
        let value = child.between(i64::from(*lo), i64::from(*hi)) as i32;
        match key {
            StatKey::Health => stats.health = value,
            StatKey::Hunger => stats.hunger = value,
            StatKey::Thirst => stats.thirst = value,
            StatKey::Fatigue => stats.fatigue = value,
            StatKey::Morale => stats.morale = value,
        }
    }
    stats.clamp();
    stats
}

fn draw_environment_frame(stream: &mut Stream) -> (TimeOfDay, Season, Weather) {
    let time = TimeOfDay::ALL[stream.bounded(TimeOfDay::ALL.len() as u64) as usize];
    let season = Season::ALL[stream.bounded(Season::ALL.len() as u64) as usize];
    let weather = Weather::ALL[stream.bounded(Weather::ALL.len() as u64) as usize];
    (time, season, weather)
}

fn base_survivor(template: &ProfessionTemplate, stream: &Stream, age_range: (u8, u8)) -> Survivor {
    let mut survivor = Survivor {
        background: template.name.to_string(),
        ..Survivor::default()
    };
    let mut name_stream = stream.child("name");
    survivor.name =
        FIRST_NAMES[name_stream.bounded(FIRST_NAMES.len() as u64) as usize].to_string();
    let mut age_stream = stream.child("age");
    survivor.age = age_stream.between(i64::from(age_range.0), i64::from(age_range.1)) as u8;
    survivor.traits = draw_traits(&mut stream.child("traits"));
    survivor.stats = draw_stats(template, &stream.child("stats"));
    for (item, count) in template.items {
        survivor.inventory.grant(item, *count);
    }
    for (skill, floor) in template.skill_floors {
        survivor.skills.set_floor(*skill, *floor);
    }
    survivor
}

/// Generate the run's first survivor.
///
/// Always Tier A: the survivor starts inside the arrival radius with a
/// Local Arrival Day of zero. A small researcher branch starts the run
/// before the outbreak goes public.
#[must_use]
pub fn generate_first_survivor(stream: &mut Stream, world: &World) -> Survivor {
    let researcher = stream.child("researcher").unit_f64() < RESEARCHER_BRANCH_CHANCE;
    let template = pick_profession(&mut stream.child("profession"));
    let mut survivor = base_survivor(template, stream, FIRST_SURVIVOR_AGE_RANGE);

    let (time, season, weather) = draw_environment_frame(&mut stream.child("frame"));
    let mut env = Environment {
        time_of_day: time,
        season,
        weather,
        region: region_for_country(&world.origin.country).to_string(),
        timezone: world.origin.timezone.clone(),
        ..Environment::default()
    };

    let mut distance = stream.child("distance");
    env.distance_km = Some(distance.unit_f64() * FIRST_SURVIVOR_MAX_DISTANCE_KM);
    env.set_lad(0);

    if researcher {
        env.location = LocationType::City;
        let mut day_stream = stream.child("researcher.day");
        env.sync_day(day_stream.between(i64::from(RESEARCHER_EARLIEST_DAY), 0) as i32);
        survivor.background = String::from("Outbreak Researcher");
        survivor.inventory.grant("lab_badge", 1);
        survivor.inventory.grant("field_samples", 1);
        survivor.skills.set_floor(Skill::Medicine, 2);
        survivor.skills.set_floor(Skill::Observation, 2);
    } else {
        env.location = LocationType::Suburb;
        env.sync_day(0);
    }

    survivor.env = env;
    survivor
}

/// Generate a replacement survivor after a death.
///
/// Broader randomization than the first survivor: group shape, all
/// eight location types, arrival day via the distance heuristic, and a
/// world-region label unrelated to the hidden origin.
#[must_use]
pub fn generate_replacement(stream: &mut Stream, world: &World) -> Survivor {
    let template = pick_profession(&mut stream.child("profession"));
    let mut survivor = base_survivor(template, stream, REPLACEMENT_AGE_RANGE);

    let mut group_stream = stream.child("group");
    survivor.group = GroupKind::ALL[group_stream.bounded(GroupKind::ALL.len() as u64) as usize];
    survivor.group_size = match survivor.group {
        GroupKind::Alone => 1,
        GroupKind::Pair => 2,
        GroupKind::Family => 3 + group_stream.bounded(3) as u8,
        GroupKind::SmallGroup => 4 + group_stream.bounded(5) as u8,
    };

    let mut location_stream = stream.child("location");
    let location =
        LocationType::ALL[location_stream.bounded(LocationType::ALL.len() as u64) as usize];
    let assignment = derive_initial_lad(location, &mut stream.child("arrival"));

    let (time, season, weather) = draw_environment_frame(&mut stream.child("frame"));
    let mut region_stream = stream.child("region");
    let mut env = Environment {
        time_of_day: time,
        season,
        weather,
        location,
        region: WORLD_REGIONS[region_stream.bounded(WORLD_REGIONS.len() as u64) as usize]
            .to_string(),
        distance_km: Some(assignment.distance_km),
        ..Environment::default()
    };
    env.set_lad(assignment.lad);
    env.sync_day(world.day());

    survivor.env = env;
    survivor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::RunSeed;

    fn world(text: &str) -> World {
        World::generate(RunSeed::new(text).unwrap(), "rules-v1")
    }

    #[test]
    fn first_survivor_invariants_hold() {
        for i in 0..64 {
            let world = world("first invariants");
            let label = format!("survivor.{i}");
            let mut stream = world.seed.stream(&label);
            let survivor = generate_first_survivor(&mut stream, &world);
            assert_eq!(survivor.env.lad, 0, "first survivor LAD must be 0");
            assert!(
                (-9..=0).contains(&survivor.env.world_day),
                "world day out of range: {}",
                survivor.env.world_day
            );
            assert!(survivor.env.distance_km.unwrap_or(f64::MAX) <= 100.0);
            assert!((2..=3).contains(&survivor.traits.len()));
            let mut unique = survivor.traits.to_vec();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), survivor.traits.len(), "duplicate trait");
            assert!(survivor.alive);
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let world = world("repro");
        let a = generate_first_survivor(&mut world.seed.stream("gen"), &world);
        let b = generate_first_survivor(&mut world.seed.stream("gen"), &world);
        assert_eq!(a, b);
        let c = generate_replacement(&mut world.seed.stream("repl"), &world);
        let d = generate_replacement(&mut world.seed.stream("repl"), &world);
        assert_eq!(c, d);
    }

    #[test]
    fn researcher_branch_occurs_at_configured_rate() {
        let world = world("researcher rate");
        let mut researchers = 0usize;
        const SAMPLES: usize = 2_000;
        for i in 0..SAMPLES {
            let label = format!("survivor.{i}");
            let mut stream = world.seed.stream(&label);
            let survivor = generate_first_survivor(&mut stream, &world);
            if survivor.background == "Outbreak Researcher" {
                researchers += 1;
                assert_eq!(survivor.env.location, LocationType::City);
                assert!(survivor.env.world_day <= 0);
                assert!(survivor.inventory.has("lab_badge"));
                assert!(survivor.skills.level(Skill::Medicine) >= 2);
            }
        }
        let rate = researchers as f64 / SAMPLES as f64;
        assert!(rate > 0.02 && rate < 0.09, "researcher rate drifted: {rate}");
    }

    #[test]
    fn replacement_lad_tracks_location_distance() {
        let world = world("replacement");
        for i in 0..64 {
            let label = format!("repl.{i}");
            let mut stream = world.seed.stream(&label);
            let survivor = generate_replacement(&mut stream, &world);
            assert!((0..=21).contains(&survivor.env.lad));
            assert!(survivor.group_size >= 1);
            assert!(
                WORLD_REGIONS.contains(&survivor.env.region.as_str()),
                "unexpected region {}",
                survivor.env.region
            );
            assert_eq!(
                survivor.env.infected_present,
                survivor.env.world_day >= survivor.env.lad
            );
        }
    }

    #[test]
    fn unknown_country_maps_to_unknown_region() {
        assert_eq!(region_for_country("XX"), "Unknown Region");
        assert_eq!(region_for_country("JP"), "East Asia");
    }

    #[test]
    fn profession_stats_stay_inside_template_ranges() {
        let world = world("stat ranges");
        for i in 0..64 {
            let label = format!("survivor.{i}");
            let mut stream = world.seed.stream(&label);
            let survivor = generate_first_survivor(&mut stream, &world);
            assert!((0..=100).contains(&survivor.stats.health));
            assert!((0..=100).contains(&survivor.stats.morale));
            assert!(survivor.stats.health >= 60, "template floors start health high");
        }
    }
}
