//! Catalog service — read-only reference data shown by the dashboard.
//!
//! DESIGN
//! ======
//! Email templates and knowledge articles are compiled in. The
//! responsible-AI fixture is embedded JSON that can be replaced by a file
//! at startup. Nothing here is ever mutated after load, so `AppState`
//! shares the catalog behind a plain `Arc`.

use std::path::Path;

use serde::{Deserialize, Serialize};

const EMBEDDED_RESPONSIBLE_AI_DATA: &str = include_str!("../../data/responsible_ai_data.json");

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid responsible AI data: {0}")]
    Parse(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "E_CATALOG_READ",
            Self::Parse(_) => "E_CATALOG_PARSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub subject: &'static str,
    pub preview: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeArticle {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: String,
    pub action: String,
    pub actor: String,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub timestamp: String,
    pub policy_id: String,
    pub severity: Severity,
    pub description: String,
    pub resolved: bool,
}

/// Parsed `responsible_ai_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsibleAiData {
    pub policies: Vec<PolicyRule>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl ResponsibleAiData {
    /// Violations that still need attention.
    pub fn open_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.resolved)
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone)]
pub struct Catalog {
    pub templates: Vec<EmailTemplate>,
    pub knowledge: Vec<KnowledgeArticle>,
    pub responsible_ai: ResponsibleAiData,
}

impl Catalog {
    /// Catalog with the compiled-in fixture.
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the embedded fixture is malformed.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_fixture(EMBEDDED_RESPONSIBLE_AI_DATA)
    }

    /// Catalog with the fixture read from `path`, or the embedded one when `None`.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the file cannot be read and `Parse` if it is not valid.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Read { path: path.display().to_string(), source })?;
        Self::from_fixture(&raw)
    }

    fn from_fixture(raw: &str) -> Result<Self, CatalogError> {
        let responsible_ai: ResponsibleAiData = serde_json::from_str(raw)?;
        Ok(Self { templates: email_templates(), knowledge: knowledge_articles(), responsible_ai })
    }

    #[must_use]
    pub fn template(&self, id: &str) -> Option<&EmailTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

fn email_templates() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            id: "template-1",
            name: "Initial Outreach",
            subject: "Quick question about {{company}}'s sales process",
            preview: "Hi {{firstName}}, I noticed {{company}} has been growing its sales team...",
        },
        EmailTemplate {
            id: "template-2",
            name: "Follow-up",
            subject: "Following up on my previous email",
            preview: "Hi {{firstName}}, I wanted to follow up on my note from last week...",
        },
        EmailTemplate {
            id: "template-3",
            name: "Case Study Share",
            subject: "How {{similarCompany}} increased replies by 40%",
            preview: "Hi {{firstName}}, teams like yours at {{similarCompany}} saw...",
        },
        EmailTemplate {
            id: "template-4",
            name: "Meeting Request",
            subject: "15 minutes next week?",
            preview: "Hi {{firstName}}, would you be open to a short call to explore...",
        },
        EmailTemplate {
            id: "template-5",
            name: "Break-up Email",
            subject: "Should I close your file?",
            preview: "Hi {{firstName}}, I haven't heard back, so I'll assume the timing isn't right...",
        },
    ]
}

fn knowledge_articles() -> Vec<KnowledgeArticle> {
    vec![
        KnowledgeArticle {
            id: "kb-pricing",
            title: "Plans and Pricing",
            category: "Billing",
            summary: "Starter, Professional and Enterprise tiers, seat limits and annual discounts.",
        },
        KnowledgeArticle {
            id: "kb-onboarding",
            title: "Getting Started Guide",
            category: "Onboarding",
            summary: "Connect your inbox, generate your first ICP and launch a sequence.",
        },
        KnowledgeArticle {
            id: "kb-security",
            title: "Security and Compliance",
            category: "Trust",
            summary: "SOC 2 Type II, GDPR and CCPA posture, encryption at rest and in transit.",
        },
        KnowledgeArticle {
            id: "kb-integrations",
            title: "CRM Integrations",
            category: "Integrations",
            summary: "Two-way sync with Salesforce and HubSpot, plus webhooks and Zapier.",
        },
        KnowledgeArticle {
            id: "kb-sequences",
            title: "Building Effective Sequences",
            category: "Best Practices",
            summary: "Step spacing, channel mix and Smart Send-Time recommendations.",
        },
        KnowledgeArticle {
            id: "kb-enrichment",
            title: "Lead Enrichment",
            category: "Data",
            summary: "How contact and firmographic data is sourced and refreshed.",
        },
    ]
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
