use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fr_core::host::SeededDailyRandom;
use fr_core::memory::{MemorySaveStore, RecordingLights};
use fr_core::{GameDate, Tile};
use fr_simulation::{Host, Roamer, census, compute_trigger_chance, total_units};

use super::HutSpec;

/// How far crops are planted from their hut, in tiles.
const CROP_SPREAD: i32 = 12;

pub fn run(
    days: u32,
    seed: u64,
    huts: &[HutSpec],
    crops: usize,
    config: Option<&Path>,
) -> Result<(), String> {
    let config = super::load_config(config)?;
    let mut farm = super::build_farm(huts);
    let mut store = MemorySaveStore::new();
    let mut lights = RecordingLights::new();
    let mut roamer = Roamer::new(config, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let crop_tiles = plant_crops(huts, crops, &mut rng);

    roamer.on_save_loaded(&mut Host {
        structures: &mut farm,
        lights: &mut lights,
        store: &mut store,
    });

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Chance", "Roll", "Result", "Target"]);

    let mut rolled = 0u32;
    let mut visits = 0u32;
    let mut skipped: BTreeMap<String, u32> = BTreeMap::new();
    let mut date = GameDate::FIRST;
    for _ in 0..days {
        roamer.on_day_started(&mut Host {
            structures: &mut farm,
            lights: &mut lights,
            store: &mut store,
        });
        let mut daily = SeededDailyRandom::for_day(seed, date.days_played());
        let outcome = roamer.evaluate_day(&farm, date, false, &mut daily);

        if let Some(reason) = outcome.skipped {
            *skipped.entry(reason.to_string()).or_default() += 1;
        }
        if let Some(roll) = outcome.roll {
            rolled += 1;
            let (result, target) = if roll.triggered {
                visits += 1;
                let target = match roamer.choose_target(&farm, &crop_tiles, &mut rng) {
                    Some(selection) if selection.fallback => {
                        format!("{} (uniform)", selection.candidate.tile)
                    }
                    Some(selection) => format!(
                        "{} (weight {})",
                        selection.candidate.tile, selection.candidate.weight
                    ),
                    None => "host default".to_string(),
                };
                ("visit".green().bold().to_string(), target)
            } else {
                ("quiet".dimmed().to_string(), String::new())
            };
            table.add_row(vec![
                date.to_string(),
                format!("{:.3}%", roll.chance * 100.0),
                format!("{:.4}", roll.roll),
                result,
                target,
            ]);
        }
        date = date.next_day();
    }

    // Header
    println!(
        "  {} {}",
        "Season".bold(),
        format!("({days} days, seed={seed}, {} crops)", crop_tiles.len()).dimmed()
    );
    let counts = census(&farm, &roamer.config().resource_item_id);
    let chance = compute_trigger_chance(total_units(&counts), false, roamer.config());
    println!(
        "  {} boxes ({} counted), nightly chance {:.3}%",
        chance.raw_units,
        chance.counted_units,
        chance.total() * 100.0
    );
    println!("  {rolled} nights rolled, {visits} crop fairy visits");
    for (reason, count) in &skipped {
        println!("  {}", format!("{count} nights skipped: {reason}").dimmed());
    }
    println!();

    if rolled == 0 {
        println!("  {}", "(no rolls)".dimmed());
        return Ok(());
    }
    println!("  {}", "Nightly Rolls".bold().underline());
    println!();
    println!("{table}");
    println!();

    Ok(())
}

/// Scatter crop tiles around the huts.
fn plant_crops(huts: &[HutSpec], count: usize, rng: &mut StdRng) -> Vec<Tile> {
    if huts.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| {
            let hut = huts[rng.random_range(0..huts.len())].tile;
            Tile::new(
                hut.x + rng.random_range(-CROP_SPREAD..=CROP_SPREAD),
                hut.y + rng.random_range(-CROP_SPREAD..=CROP_SPREAD),
            )
        })
        .collect()
}
