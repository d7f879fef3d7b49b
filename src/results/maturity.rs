use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of the INITIAL tier
pub const INITIAL_MAX_SCORE: i64 = 40;
/// Upper bound (inclusive) of the DEVELOPING tier
pub const DEVELOPING_MAX_SCORE: i64 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaturityTier {
    Initial,
    Developing,
    Consolidated,
}

impl MaturityTier {
    /// Tier for a raw total score.
    ///
    /// Boundaries 40 and 70 belong to the lower tier; any fraction above
    /// them moves up (40.4 is DEVELOPING).
    pub fn for_score(total_score: f64) -> Self {
        if total_score <= INITIAL_MAX_SCORE as f64 {
            MaturityTier::Initial
        } else if total_score <= DEVELOPING_MAX_SCORE as f64 {
            MaturityTier::Developing
        } else {
            MaturityTier::Consolidated
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaturityTier::Initial => "Initial",
            MaturityTier::Developing => "Developing",
            MaturityTier::Consolidated => "Consolidated",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MaturityTier::Initial => {
                "The business is just starting out or has no well-defined processes yet. \
                 Planning and structure are the priorities."
            }
            MaturityTier::Developing => {
                "The business already has some organized processes but still struggles \
                 to reach stability and consistent growth."
            }
            MaturityTier::Consolidated => {
                "The business has well-established processes and sound management, and is \
                 expanding or consolidating its market position."
            }
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            MaturityTier::Initial => {
                "Build a basic strategic plan, organize the finances and define the processes \
                 the business needs to run. Consider working with a consultant to speed up \
                 this groundwork."
            }
            MaturityTier::Developing => {
                "Optimize the processes you already have, invest in training the team and \
                 tighten financial management. Look at tools that automate operations and \
                 raise efficiency."
            }
            MaturityTier::Consolidated => {
                "Concentrate on innovation, market expansion and diversifying products and \
                 services. Invest in marketing and keep strict financial control to sustain \
                 growth."
            }
        }
    }
}

impl std::fmt::Display for MaturityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maturity classification of a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maturity {
    pub tier: MaturityTier,
    pub description: &'static str,
}

pub fn classify_maturity(total_score: f64) -> Maturity {
    let tier = MaturityTier::for_score(total_score);
    Maturity {
        tier,
        description: tier.description(),
    }
}

/// Fixed recommendation text for a total score.
///
/// Uses the same tiers as [`classify_maturity`]. Pillar names are not part of
/// the template; callers add them when rendering.
pub fn recommendation_for(total_score: f64) -> &'static str {
    MaturityTier::for_score(total_score).recommendation()
}

/// Per-pillar performance band, used to colour pillar bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceBand {
    Strong,
    Good,
    Fair,
    Weak,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            PerformanceBand::Strong
        } else if percentage >= 60.0 {
            PerformanceBand::Good
        } else if percentage >= 40.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::Weak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity_boundaries() {
        assert_eq!(classify_maturity(40.0).tier, MaturityTier::Initial);
        assert_eq!(classify_maturity(41.0).tier, MaturityTier::Developing);
        assert_eq!(classify_maturity(70.0).tier, MaturityTier::Developing);
        assert_eq!(classify_maturity(71.0).tier, MaturityTier::Consolidated);
    }

    #[test]
    fn test_maturity_compares_fractional_totals_unrounded() {
        assert_eq!(classify_maturity(40.4).tier, MaturityTier::Developing);
        assert_eq!(classify_maturity(40.5).tier, MaturityTier::Developing);
        assert_eq!(classify_maturity(70.25).tier, MaturityTier::Consolidated);
        assert_eq!(classify_maturity(69.9).tier, MaturityTier::Developing);
    }

    #[test]
    fn test_maturity_extremes() {
        assert_eq!(classify_maturity(0.0).tier, MaturityTier::Initial);
        assert_eq!(classify_maturity(250.0).tier, MaturityTier::Consolidated);
    }

    #[test]
    fn test_description_matches_tier() {
        let maturity = classify_maturity(15.0);
        assert_eq!(maturity.description, MaturityTier::Initial.description());
    }

    #[test]
    fn test_recommendation_follows_tier() {
        assert_eq!(recommendation_for(40.0), MaturityTier::Initial.recommendation());
        assert_eq!(recommendation_for(55.0), MaturityTier::Developing.recommendation());
        assert_eq!(recommendation_for(90.0), MaturityTier::Consolidated.recommendation());
        assert_ne!(recommendation_for(40.0), recommendation_for(41.0));
    }

    #[test]
    fn test_performance_bands() {
        assert_eq!(PerformanceBand::from_percentage(100.0), PerformanceBand::Strong);
        assert_eq!(PerformanceBand::from_percentage(80.0), PerformanceBand::Strong);
        assert_eq!(PerformanceBand::from_percentage(79.9), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(60.0), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(40.0), PerformanceBand::Fair);
        assert_eq!(PerformanceBand::from_percentage(39.9), PerformanceBand::Weak);
        assert_eq!(PerformanceBand::from_percentage(0.0), PerformanceBand::Weak);
    }
}
