use std::path::Path;

use colored::Colorize;

use fr_simulation::compute_trigger_chance;

pub fn run(boxes: u32, fairy_rose: bool, config: Option<&Path>) -> Result<(), String> {
    let config = super::load_config(config)?;
    let chance = compute_trigger_chance(boxes, fairy_rose, &config);

    println!("  {}", "Crop Fairy Chance".bold().underline());
    println!();
    for line in chance.to_string().lines() {
        println!("  {line}");
    }
    println!();

    if !config.enhanced_crop_fairy {
        println!(
            "  {}",
            "Enhanced crop fairy is disabled; the host uses its own chance.".yellow()
        );
    } else if chance.counted_units < chance.raw_units {
        println!(
            "  {}",
            format!(
                "Only {} of {} boxes count (limit {}).",
                chance.counted_units, chance.raw_units, config.max_boxes
            )
            .dimmed()
        );
    }
    Ok(())
}
