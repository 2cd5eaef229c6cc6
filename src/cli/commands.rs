//! Implementação dos comandos CLI do HaiTale.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::{CatalogProvider, FileCatalog};
use crate::recommend::RecommendationOrchestrator;
use crate::types::config::{Config, API_KEY_ENV, CONFIG_FILE_NAME};
use crate::types::Recommendation;
use crate::HaitaleResult;

/// Recommends mods for a world description.
pub async fn recommend(words: &[String], catalog_path: &Path, config: &Config) -> HaitaleResult<()> {
    let description = words.join(" ");
    let provider = FileCatalog::new(catalog_path);
    let orchestrator = RecommendationOrchestrator::from_config(config)?;

    if !orchestrator.client().has_credential() {
        tracing::info!(
            "No API key configured ({} or openrouter.api_key), using rule-based scoring",
            API_KEY_ENV
        );
    }

    let spinner = spinner(&format!("Finding mods for \"{}\"...", description));
    let recommendations = orchestrator.recommend_from(&provider, &description).await;
    spinner.finish_and_clear();

    print!("{}", render(&recommendations));
    Ok(())
}

/// Formats recommendations for the terminal.
pub fn render(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return "No matching mods found.\n".to_string();
    }

    let mut out = format!("Recommended mods ({}):\n\n", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    out
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> HaitaleResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config().save(&config_path)?;

    println!("HaiTale initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Export your OpenRouter key: export {}=...", API_KEY_ENV);
    println!("  2. Check the setup: haitale doctor");
    println!("  3. Ask for mods: haitale recommend a medieval castle with magic");

    Ok(())
}

/// Diagnoses configuration problems.
pub async fn doctor(config: &Config, catalog_path: &Path) -> HaitaleResult<()> {
    println!("Checking HaiTale configuration...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    println!("✓ Configuration loaded");

    if config.openrouter.credential().is_some() {
        println!("✓ API key configured (model: {})", config.openrouter.model);
    } else {
        warnings.push(format!(
            "No API key ({} or openrouter.api_key): only rule-based recommendations are available",
            API_KEY_ENV
        ));
    }

    if !config.cache.enabled {
        warnings.push("Response cache is disabled".to_string());
    }
    if !config.circuit.enabled {
        warnings.push("Circuit breaker is disabled".to_string());
    }
    if config.retry.max_attempts == 0 {
        warnings.push("retry.max_attempts is 0, using 1".to_string());
    }
    if !(0.0..=1.0).contains(&config.retry.jitter_fraction) {
        warnings.push(format!(
            "retry.jitter_fraction {} is outside [0, 1] and will be clamped",
            config.retry.jitter_fraction
        ));
    }

    match FileCatalog::new(catalog_path).free_catalog().await {
        Ok(entries) if entries.is_empty() => {
            warnings.push(format!("Catalog {} has no free-licensed mods", catalog_path.display()));
        }
        Ok(entries) => {
            println!("✓ Catalog {} ({} free mods)", catalog_path.display(), entries.len());
        }
        Err(e) => issues.push(format!("Catalog unavailable: {}", e)),
    }

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ All good! HaiTale is ready.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problems:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("haitale {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("AI-assisted mod recommendations for HyTale worlds");
}
