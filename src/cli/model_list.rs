//! Model listing functionality
//!
//! This module handles listing the models the gateway advertises.

use crate::api::models::{fetch_model_ids, FALLBACK_MODELS};
use crate::core::config::Config;
use std::error::Error;

pub async fn list_models(base_url: &str) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("🤖 Available models at {base_url}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if let Some(default_model) = &config.default_model {
        println!("🎯 Default model: {default_model} (from config)");
        println!();
    }

    let client = reqwest::Client::new();
    match fetch_model_ids(&client, base_url).await {
        Ok(ids) if !ids.is_empty() => {
            println!("Found {} models:", ids.len());
            println!();
            for id in &ids {
                println!("  • {id}");
            }
        }
        Ok(_) => {
            println!("The gateway advertised no models.");
        }
        Err(e) => {
            eprintln!("⚠️  Could not fetch the model list: {e}");
            println!();
            println!("Built-in fallback list:");
            for id in FALLBACK_MODELS {
                println!("  • {id}");
            }
        }
    }

    Ok(())
}
