use std::path::Path;

pub fn run(config: Option<&Path>) -> Result<(), String> {
    let config = super::load_config(config)?;
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("cannot encode configuration: {e}"))?;
    println!("{json}");
    Ok(())
}
