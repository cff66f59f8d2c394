//! Secret management CLI commands: set, delete, status.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Password;
use serde::Serialize;

use grepchat_core::secret::KNOWN_SECRETS;
use grepchat_core::secret::service::SecretService;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct SecretStatus {
    key: &'static str,
    source: Option<String>,
    masked: Option<String>,
}

/// Store a secret with a hidden input prompt.
///
/// ```bash
/// grepchat secret set GREPTILE_API_KEY
/// grepchat secret set GREPTILE_API_KEY --value gk-...
/// ```
pub async fn set_secret(state: &AppState, key: &str, value: Option<&str>, json: bool) -> Result<()> {
    if !json && !KNOWN_SECRETS.iter().any(|k| *k == key) {
        println!(
            "  {} {} is not a key grepchat reads (expected one of {})",
            style("!").yellow().bold(),
            style(key).bold(),
            KNOWN_SECRETS.join(", ")
        );
    }

    let secret_value = match value {
        Some(v) => v.to_string(),
        None => Password::new()
            .with_prompt(format!("Enter value for {}", style(key).bold()))
            .interact()?,
    };
    if secret_value.trim().is_empty() {
        anyhow::bail!("refusing to store an empty value for {key}");
    }

    let provider = state.secret_service.set_secret(key, &secret_value).await?;
    let masked = SecretService::mask_secret(&secret_value);

    if json {
        println!(
            "{}",
            serde_json::json!({"set": true, "key": key, "provider": provider, "masked": masked})
        );
    } else {
        println!(
            "  {} Secret '{}' stored in {} ({})",
            style("*").green().bold(),
            style(key).bold(),
            provider,
            masked
        );
    }
    Ok(())
}

pub async fn delete_secret(state: &AppState, key: &str, json: bool) -> Result<()> {
    state.secret_service.delete_secret(key).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "key": key}));
    } else {
        println!("  {} Secret '{}' deleted", style("*").green().bold(), style(key).bold());
    }
    Ok(())
}

/// Show which provider supplies each secret grepchat needs.
pub async fn secret_status(state: &AppState, json: bool) -> Result<()> {
    let mut rows = Vec::with_capacity(KNOWN_SECRETS.len());
    for key in KNOWN_SECRETS {
        let source = state.secret_service.resolve_source(key).await?;
        let masked = state
            .secret_service
            .get_secret(key)
            .await?
            .map(|v| SecretService::mask_secret(&v));
        rows.push(SecretStatus { key, source, masked });
    }

    let providers = state.secret_service.provider_names();

    if json {
        let out = serde_json::json!({"providers": providers, "secrets": rows});
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Source").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    for row in &rows {
        let source = match &row.source {
            Some(name) => Cell::new(name),
            None => Cell::new("missing").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(row.key).fg(Color::Cyan),
            source,
            Cell::new(row.masked.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} Lookup order: {}",
        style("i").blue().bold(),
        providers.join(" -> ")
    );
    println!();

    let missing = rows.iter().filter(|r| r.source.is_none()).count();
    if missing > 0 {
        println!(
            "  {} {} missing. Add with: {}",
            style("i").blue().bold(),
            missing,
            style("grepchat secret set <KEY>").yellow()
        );
        println!();
    }
    Ok(())
}
