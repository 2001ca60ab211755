//! Persistence trait for confirmed consultations and captured leads
//!
//! The engine awaits these writes but treats failure as log-and-continue:
//! a persistence error must never surface to the end user mid-turn.

use async_trait::async_trait;

use crate::error::Result;
use crate::lead::LeadRecord;
use crate::session::Consultation;

/// Downstream store for consultations and leads
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Persist a confirmed consultation; returns its id
    async fn save_consultation(&self, consultation: &Consultation) -> Result<String>;

    /// Persist a captured lead; returns its id
    async fn save_lead(&self, lead: &LeadRecord) -> Result<String>;
}
