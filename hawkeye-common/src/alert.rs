//! Alertmanager webhook payloads and the investigation prompts built from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub status: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
}

impl Alert {
    pub fn is_firing(&self) -> bool {
        self.status == "firing"
    }

    /// Investigation prompt for this alert.
    pub fn prompt(&self) -> String {
        let name = self.labels.get("alertname").map(String::as_str).unwrap_or("None");
        let description = self.annotations.get("description").map(String::as_str).unwrap_or("None");
        format!(
            "{} - {}. Investigate from last 1 hour. Please provide a detailed report.",
            name, description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub receiver: String,
    pub status: String,
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub group_labels: HashMap<String, String>,
    #[serde(default)]
    pub common_labels: HashMap<String, String>,
    #[serde(default)]
    pub common_annotations: HashMap<String, String>,
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group_key: String,
    #[serde(default)]
    pub truncated_alerts: u32,
}

impl AlertPayload {
    /// One prompt per firing alert, in payload order.
    pub fn firing_prompts(&self) -> Vec<String> {
        self.alerts.iter().filter(|a| a.is_firing()).map(Alert::prompt).collect()
    }
}
