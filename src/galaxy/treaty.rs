//! Treaties between planets

use serde::{Deserialize, Serialize};

use crate::core::types::TreatyId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatyType {
    NonAggression,
    Trade,
    TechShare,
}

impl TreatyType {
    pub const ALL: [TreatyType; 3] = [TreatyType::NonAggression, TreatyType::Trade, TreatyType::TechShare];

    pub fn label(&self) -> &'static str {
        match self {
            TreatyType::NonAggression => "non-aggression pact",
            TreatyType::Trade => "trade agreement",
            TreatyType::TechShare => "tech-sharing accord",
        }
    }
}

/// Parameters fixed when the treaty is signed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreatyTerms {
    /// Multiplier on conflict draws between the signatories
    pub conflict_multiplier: f32,
    /// Food and energy each signatory city gains per year
    pub resource_bonus: f32,
    /// Share of each tech gap closed per year
    pub tech_share: f32,
}

impl Default for TreatyTerms {
    fn default() -> Self {
        Self {
            conflict_multiplier: 1.0,
            resource_bonus: 0.0,
            tech_share: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Treaty {
    pub id: TreatyId,
    pub kind: TreatyType,
    /// Planet names, sorted
    pub signatories: Vec<String>,
    /// Years remaining
    pub duration: u32,
    pub terms: TreatyTerms,
}

impl Treaty {
    pub fn new(id: TreatyId, kind: TreatyType, a: &str, b: &str, duration: u32, terms: TreatyTerms) -> Self {
        let mut signatories = vec![a.to_string(), b.to_string()];
        signatories.sort();
        Self {
            id,
            kind,
            signatories,
            duration,
            terms,
        }
    }

    pub fn involves(&self, planet: &str) -> bool {
        self.signatories.iter().any(|s| s == planet)
    }

    /// Whether the treaty binds exactly this pair
    pub fn binds(&self, a: &str, b: &str) -> bool {
        self.involves(a) && self.involves(b)
    }

    /// Count down one year; returns false once the treaty has expired
    pub fn count_down(&mut self) -> bool {
        self.duration = self.duration.saturating_sub(1);
        self.duration > 0
    }
}
