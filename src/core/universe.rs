// Declarative description of the tradable universe

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A security as declared in configuration, before its starting price is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySpec {
    pub id: String,
    pub description: String,
    pub min_price: f64,
    pub max_price: f64,
}

/// Anchor security and the securities whose prices move with it on news
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub anchor: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub headlines: Vec<String>,
    pub securities: Vec<SecuritySpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl SecuritySpec {
    pub fn new(id: &str, min_price: f64, max_price: f64, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            min_price,
            max_price,
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        let securities = vec![
            SecuritySpec::new("Asteroid Mining Co", 100.0, 300.0, "Provides mining services on asteroids."),
            SecuritySpec::new("Mars Real Estate", 150.0, 400.0, "Develops real estate on Mars."),
            SecuritySpec::new("Space Tourism", 80.0, 200.0, "Offers leisure trips to space."),
            SecuritySpec::new("Galactic Commodities", 90.0, 250.0, "Trades rare commodities across galaxies."),
            SecuritySpec::new("Lunar Energy Corp", 60.0, 150.0, "Generates energy using lunar resources."),
            SecuritySpec::new("Orbital Transport", 120.0, 350.0, "Provides transportation in orbit."),
            SecuritySpec::new("Terraform Inc", 200.0, 500.0, "Works on terraforming planets."),
            SecuritySpec::new("Deep Space Tech", 70.0, 220.0, "Develops advanced deep-space technology."),
            SecuritySpec::new("Zero-G Manufacturing", 100.0, 250.0, "Manufactures goods in zero gravity."),
            SecuritySpec::new("Quantum Computing Labs", 180.0, 400.0, "Pioneers quantum computing for space apps."),
        ];

        let group = |anchor: &str, members: &[&str]| GroupSpec {
            anchor: anchor.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        };

        let groups = vec![
            group("Asteroid Mining Co", &["Lunar Energy Corp", "Galactic Commodities"]),
            group("Terraform Inc", &["Mars Real Estate", "Space Tourism"]),
            group("Deep Space Tech", &["Orbital Transport", "Quantum Computing Labs"]),
        ];

        let headlines = [
            "Major breakthrough in quantum thrusters!",
            "Terraform Inc unveils new gene-edited seeds for Mars.",
            "Space Tourism faces safety lawsuit after rocket mishap.",
            "Asteroid Mining Co finds massive platinum deposit.",
            "Lunar Energy Corp sees record demand for Helium-3.",
            "Orbital Transport invests in next-gen propulsion.",
            "Zero-G Manufacturing perfects 3D printing for space habitats.",
            "Galactic Commodities surges on rare metal shortage.",
            "Deep Space Tech announces AI-based navigation system.",
            "Quantum Computing Labs reveals advanced entangled processor.",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        Self { securities, groups, headlines }
    }
}

impl Universe {
    /// Check ids are unique, price ranges sane and groups reference known securities
    pub fn validate(&self) -> Result<(), String> {
        if self.securities.is_empty() {
            return Err("universe must declare at least one security".to_string());
        }

        if self.headlines.is_empty() {
            return Err("universe must declare at least one headline".to_string());
        }

        let mut seen = HashSet::new();
        for spec in &self.securities {
            if spec.id.trim().is_empty() {
                return Err("security id must not be empty".to_string());
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(format!("duplicate security id: {}", spec.id));
            }
            if !(spec.min_price >= 1.0 && spec.min_price <= spec.max_price) || !spec.max_price.is_finite() {
                return Err(format!(
                    "invalid price range for {}: [{}, {}]",
                    spec.id, spec.min_price, spec.max_price
                ));
            }
        }

        for group in &self.groups {
            for id in std::iter::once(&group.anchor).chain(group.members.iter()) {
                if !seen.contains(id.as_str()) {
                    return Err(format!("group {} references unknown security: {}", group.anchor, id));
                }
            }
        }

        Ok(())
    }
}
