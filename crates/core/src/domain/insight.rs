use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Upsell,
    Pricing,
    Marketing,
    Inventory,
    Customer,
}

impl RecommendationCategory {
    /// Case-insensitive parse of the vocabulary the prompt asks the model to
    /// use. Anything outside it maps to `None` rather than an error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("Upsell") => Some(Self::Upsell),
            s if s.eq_ignore_ascii_case("Pricing") => Some(Self::Pricing),
            s if s.eq_ignore_ascii_case("Marketing") => Some(Self::Marketing),
            s if s.eq_ignore_ascii_case("Inventory") => Some(Self::Inventory),
            s if s.eq_ignore_ascii_case("Customer") => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upsell => "Upsell",
            Self::Pricing => "Pricing",
            Self::Marketing => "Marketing",
            Self::Inventory => "Inventory",
            Self::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("High") => Some(Self::High),
            s if s.eq_ignore_ascii_case("Medium") => Some(Self::Medium),
            s if s.eq_ignore_ascii_case("Low") => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// One structured recommendation lifted out of the model's free-text reply.
/// The title is guaranteed non-empty; blocks without one are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionableRecommendation {
    pub title: String,
    pub description: String,
    pub action: String,
    pub category: Option<RecommendationCategory>,
    pub priority: Priority,
}

/// The end-to-end result of one insight run. Never persisted; generated
/// fresh per request and handed straight back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInsight {
    pub summary: String,
    pub trends: String,
    pub recommendations: String,
    pub actionable_recommendations: Vec<ActionableRecommendation>,
    pub generated_at: DateTime<Utc>,
}

impl SalesInsight {
    /// Placeholder result substituted whenever the completion call or its
    /// configuration fails. Callers always receive a well-formed insight.
    pub fn degraded(generated_at: DateTime<Utc>) -> Self {
        Self {
            summary: "Unable to generate insights at this time.".to_string(),
            trends: "Error occurred while analyzing data.".to_string(),
            recommendations: "Please check the completion service configuration.".to_string(),
            actionable_recommendations: Vec::new(),
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_vocabulary_parses_case_insensitively() {
        assert_eq!(
            RecommendationCategory::parse("upsell"),
            Some(RecommendationCategory::Upsell)
        );
        assert_eq!(
            RecommendationCategory::parse(" INVENTORY "),
            Some(RecommendationCategory::Inventory)
        );
        assert_eq!(RecommendationCategory::parse("Logistics"), None);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Priority::parse("urgent"), None);
    }
}
