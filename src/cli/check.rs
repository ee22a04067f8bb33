//! Gateway connectivity check

use std::error::Error;

use serde::Deserialize;

use crate::utils::url::construct_api_url;

/// Shape of `GET /api/health`. The gateway reports its upstream and default
/// model alongside the status; both are optional here so older gateways
/// still pass the check.
#[derive(Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    ollama_url: Option<String>,
    #[serde(default)]
    default_model: Option<String>,
}

pub async fn check_gateway(base_url: &str) -> Result<(), Box<dyn Error>> {
    println!("🌐 Checking gateway at {base_url}");

    let client = reqwest::Client::new();
    let url = construct_api_url(base_url, "api/health");
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("❌ Gateway unreachable: {e}");
            std::process::exit(1);
        }
    };

    if !response.status().is_success() {
        eprintln!("❌ Gateway returned HTTP {}", response.status());
        std::process::exit(1);
    }

    let health: HealthResponse = response.json().await?;
    if health.status == "ok" {
        println!("✅ Gateway is healthy");
    } else {
        println!("⚠️  Gateway reported status: {}", health.status);
    }
    if let Some(ollama_url) = &health.ollama_url {
        println!("   Upstream: {ollama_url}");
    }
    if let Some(default_model) = &health.default_model {
        println!("   Default model: {default_model}");
    }

    Ok(())
}
