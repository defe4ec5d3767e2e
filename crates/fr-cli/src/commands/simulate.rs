use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fr_core::memory::{MemorySaveStore, RecordingLights, RecordingRenderer};
use fr_simulation::{Host, Roamer, RoamerEventKind};

use super::HutSpec;

pub fn run(
    ticks: u64,
    seed: u64,
    huts: &[HutSpec],
    config: Option<&Path>,
    save: Option<&Path>,
    verbose: bool,
) -> Result<(), String> {
    let config = super::load_config(config)?;
    let mut farm = super::build_farm(huts);
    let mut store = match save {
        Some(path) => super::load_store(path)?,
        None => MemorySaveStore::new(),
    };
    super::load_identities(&mut farm, &store);
    let mut lights = RecordingLights::new();
    let mut roamer = Roamer::new(config, seed);

    {
        let mut host = Host {
            structures: &mut farm,
            lights: &mut lights,
            store: &mut store,
        };
        roamer.on_save_loaded(&mut host);
        roamer.run(&mut host, ticks);
    }

    if let Some(path) = save {
        roamer.on_saving(&mut store);
        super::store_chests(&farm, &mut store)?;
        super::write_store(path, &store)?;
    }

    let mut renderer = RecordingRenderer::default();
    roamer.draw(&mut renderer);

    // Header
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!("({ticks} ticks, seed={seed})").dimmed()
    );
    println!(
        "  {} huts, {} companions, {} lights, {} draw calls",
        farm.len(),
        roamer.registry().companion_count(),
        lights.len(),
        renderer.intents.len()
    );
    println!(
        "  {:.2}s simulated, {} events logged",
        roamer.clock().elapsed_seconds(),
        roamer.events().len()
    );
    if let Some(path) = save {
        println!("  Saved to {}", path.display());
    }
    println!();

    // Events
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in roamer.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if roamer.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = roamer
            .events()
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    RoamerEventKind::CapacityReached { .. } | RoamerEventKind::Restored { .. }
                )
            })
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                match event.kind {
                    RoamerEventKind::CapacityReached { .. } => {
                        println!("  {}  {}", "FULL".yellow().bold(), event.description)
                    }
                    _ => println!("  {}  {}", "LOAD".cyan().bold(), event.description),
                }
            }
            println!();
        }
    }

    // Companion status table
    println!("  {}", "Companion Status".bold().underline());
    println!();

    let status = roamer.status();
    if status.is_empty() {
        println!("  {}", "(no companions)".dimmed());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Hut", "Companion", "Style", "From Home"]);
    for structure in &status {
        for companion in &structure.companions {
            table.add_row(vec![
                structure.tile.to_string(),
                companion.id.to_string(),
                companion.style.to_string(),
                format!("{:.2}", companion.distance),
            ]);
        }
    }
    println!("{table}");
    println!();

    Ok(())
}

fn colorize_event(kind: &RoamerEventKind, desc: &str) -> String {
    match kind {
        RoamerEventKind::Spawned { .. } => desc.green().to_string(),
        RoamerEventKind::Despawned { .. } | RoamerEventKind::StructureRemoved { .. } => {
            desc.red().to_string()
        }
        RoamerEventKind::CapacityReached { .. } => desc.yellow().to_string(),
        RoamerEventKind::Restored { .. } | RoamerEventKind::Saved { .. } => {
            desc.cyan().to_string()
        }
        _ => desc.to_string(),
    }
}
