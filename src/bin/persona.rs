//! intersect-persona command-line classifier.
//!
//! Reads a profile snapshot (JSON) and prints its archetype classification
//! and chart geometry as JSON.
//!
//! # Environment Variables
//!
//! - `PERSONA_CONFIG`: Path to a YAML engine config (optional)
//! - `PERSONA_POINT_BUDGET`: Override the point budget
//! - `PERSONA_ANIMATION_MS`: Override the animation duration
//! - `RUST_LOG`: Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! persona profile.json
//! cat profile.json | persona
//! ```

use std::io::Read;

use anyhow::{Context, Result};
use serde::Serialize;

use intersect_persona::persona::animator::ManualScheduler;
use intersect_persona::persona::controller::{
    NoopSync, PersonaController, ProfileSnapshot, RenderFrame,
};
use intersect_persona::persona::trait_id::TraitId;
use intersect_persona::utilities::config::EngineConfig;

#[derive(Serialize)]
struct Voice {
    #[serde(rename = "trait")]
    trait_id: TraitId,
    name: &'static str,
    points: u8,
}

#[derive(Serialize)]
struct Report {
    profile_id: uuid::Uuid,
    voices: Vec<Voice>,
    frame: RenderFrame,
}

fn load_config() -> Result<EngineConfig> {
    let mut config = match std::env::var("PERSONA_CONFIG") {
        Ok(path) => EngineConfig::from_path(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => EngineConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("invalid PERSONA_* override")?;
    Ok(config)
}

fn read_snapshot() -> Result<ProfileSnapshot> {
    let text = match std::env::args().nth(1) {
        Some(path) if path != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read snapshot {}", path))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read snapshot from stdin")?;
            buf
        }
    };
    ProfileSnapshot::from_json(&text).context("malformed profile snapshot")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let snapshot = read_snapshot()?;

    let mut controller = PersonaController::new(
        config,
        Box::new(ManualScheduler::new()),
        Box::new(NoopSync),
    );
    controller
        .load_snapshot(&snapshot)
        .context("snapshot rejected")?;

    let frame = controller.render_frame();
    tracing::info!(
        "profile {} classified as {} ({}%)",
        controller.profile_id(),
        frame.classification.archetype_code,
        frame.classification.confidence_percent
    );

    let voices = controller
        .activation()
        .speaking_voices()
        .into_iter()
        .map(|(id, name)| Voice {
            trait_id: id,
            name,
            points: controller.allocator().current(id),
        })
        .collect();

    let report = Report {
        profile_id: controller.profile_id(),
        voices,
        frame,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
