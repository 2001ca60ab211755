//! In-memory lead sink
//!
//! Default `LeadSink` used by the binary. Keeps confirmed consultations
//! and captured leads in process memory so the rest of the stack can be
//! exercised without a database; a real deployment swaps this for a
//! store behind the same trait.

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use intake_agent_core::{Consultation, LeadRecord, LeadSink, Result};

#[derive(Default)]
pub struct InMemoryLeadSink {
    consultations: Mutex<Vec<(String, Consultation)>>,
    leads: Mutex<Vec<(String, LeadRecord)>>,
}

impl InMemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consultation_count(&self) -> usize {
        self.consultations.lock().len()
    }

    pub fn lead_count(&self) -> usize {
        self.leads.lock().len()
    }

    pub fn leads(&self) -> Vec<LeadRecord> {
        self.leads.lock().iter().map(|(_, l)| l.clone()).collect()
    }
}

#[async_trait]
impl LeadSink for InMemoryLeadSink {
    async fn save_consultation(&self, consultation: &Consultation) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(
            consultation_id = %id,
            user = consultation.user_name.as_deref().unwrap_or("unknown"),
            date = consultation.preferred_date.as_deref().unwrap_or(""),
            time = consultation.preferred_time.as_deref().unwrap_or(""),
            "consultation saved"
        );
        self.consultations.lock().push((id.clone(), consultation.clone()));
        Ok(id)
    }

    async fn save_lead(&self, lead: &LeadRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(
            lead_id = %id,
            hotness = %lead.hotness,
            intent = %lead.intent,
            escalated = lead.escalation_reason.is_some(),
            "lead saved"
        );
        self.leads.lock().push((id.clone(), lead.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_agent_core::{Hotness, SuggestedAction, UserIntent};

    #[tokio::test]
    async fn test_saves_and_counts() {
        let sink = InMemoryLeadSink::new();
        let id = sink.save_consultation(&Consultation::default()).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(sink.consultation_count(), 1);

        let lead = LeadRecord {
            name: Some("Maria Gonzalez".to_string()),
            email: Some("maria@example.com".to_string()),
            phone: None,
            business_type: Some("bakery".to_string()),
            location: None,
            hotness: Hotness::Warm,
            hotness_factors: vec![],
            intent: UserIntent::Booking,
            suggested_action: SuggestedAction::FollowUpToday,
            escalation_reason: None,
            transcript: vec![],
        };
        sink.save_lead(&lead).await.unwrap();
        assert_eq!(sink.lead_count(), 1);
        assert_eq!(sink.leads()[0].email.as_deref(), Some("maria@example.com"));
    }
}
