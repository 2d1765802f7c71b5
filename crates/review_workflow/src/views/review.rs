use shared::domain::{Provider, ProviderId, ReviewAction};

use crate::views::Intent;

pub const MISSING_VALUE_LABEL: &str = "Missing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRow {
    pub field: String,
    pub label: String,
    pub current: Option<String>,
    pub suggested: String,
}

impl CorrectionRow {
    pub fn current_display(&self) -> &str {
        self.current.as_deref().unwrap_or(MISSING_VALUE_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewModel {
    pub provider_id: ProviderId,
    pub name: String,
    pub confidence_score: u8,
    pub issues: Vec<String>,
    /// One row per suggested value, in field-name order.
    pub corrections: Vec<CorrectionRow>,
    pub details: Vec<(&'static str, String)>,
}

impl ReviewModel {
    pub fn build(provider: &Provider) -> Self {
        let corrections = provider
            .suggested_values
            .iter()
            .map(|(field, suggested)| CorrectionRow {
                field: field.clone(),
                label: field_label(field),
                current: provider.field_value(field).map(str::to_string),
                suggested: suggested.clone(),
            })
            .collect();

        let details = [
            ("Provider ID", "provider_id"),
            ("Specialty", "specialty"),
            ("Phone", "phone"),
            ("License", "license_number"),
            ("Address", "address"),
        ]
        .into_iter()
        .map(|(label, field)| {
            (
                label,
                provider.field_value(field).unwrap_or_default().to_string(),
            )
        })
        .collect();

        Self {
            provider_id: provider.provider_id.clone(),
            name: provider.field_value("name").unwrap_or_default().to_string(),
            confidence_score: provider.confidence_score,
            issues: provider.issues.clone(),
            corrections,
            details,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn decide(&self, action: ReviewAction) -> Intent {
        Intent::Decide(action)
    }
}

fn field_label(field: &str) -> String {
    field.replace('_', " ").to_uppercase()
}
