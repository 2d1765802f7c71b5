use shared::domain::{ProviderId, ProviderStatus, Run, RunId};

use crate::views::{display_timestamp, Intent, SuccessRate};

pub const NO_EMAIL_LABEL: &str = "No email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::High,
            70..=89 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRow {
    pub provider_id: ProviderId,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub phone: String,
    pub status: ProviderStatus,
    pub confidence_score: u8,
    pub confidence_band: ConfidenceBand,
    pub review_offered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsModel {
    pub run_id: RunId,
    pub created_at: String,
    pub total_providers: u32,
    pub validated: u32,
    pub flagged: u32,
    pub success_rate: SuccessRate,
    pub rows: Vec<ProviderRow>,
    run: Run,
}

impl ResultsModel {
    pub fn build(run: &Run) -> Self {
        let rows = run
            .results
            .iter()
            .map(|provider| ProviderRow {
                provider_id: provider.provider_id.clone(),
                name: provider.field_value("name").unwrap_or_default().to_string(),
                email: provider
                    .field_value("email")
                    .unwrap_or(NO_EMAIL_LABEL)
                    .to_string(),
                specialty: provider
                    .field_value("specialty")
                    .unwrap_or_default()
                    .to_string(),
                phone: provider.field_value("phone").unwrap_or_default().to_string(),
                status: provider.status,
                confidence_score: provider.confidence_score,
                confidence_band: ConfidenceBand::of(provider.confidence_score),
                review_offered: provider.is_reviewable(),
            })
            .collect();

        Self {
            run_id: run.run_id.clone(),
            created_at: display_timestamp(run),
            total_providers: run.total_providers,
            validated: run.validated,
            flagged: run.flagged,
            success_rate: SuccessRate::for_run(run),
            rows,
            run: run.clone(),
        }
    }

    /// Only flagged providers can be opened for review.
    pub fn open_provider(&self, provider_id: &ProviderId) -> Option<Intent> {
        self.run
            .provider(provider_id)
            .filter(|provider| provider.is_reviewable())
            .map(|provider| Intent::OpenProvider(provider.clone()))
    }

    pub fn back(&self) -> Intent {
        Intent::BackToDashboard
    }
}
