//! `grepchat config`: show the effective configuration and where it lives.

use anyhow::Result;
use console::style;

use grepchat_infra::config::config_path;

use crate::state::AppState;

pub fn show_config(state: &AppState, json: bool) -> Result<()> {
    let path = config_path(&state.data_dir);

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": state.config,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let origin = if path.exists() { "" } else { " (not found, defaults)" };
    println!();
    println!("  {} {}{}", style("#").dim(), style(path.display()).cyan(), style(origin).dim());
    println!();
    println!("{}", toml::to_string_pretty(&state.config)?);
    Ok(())
}

pub fn config_path_command(state: &AppState, json: bool) -> Result<()> {
    let path = config_path(&state.data_dir);
    if json {
        println!("{}", serde_json::json!({"path": path.display().to_string()}));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
