use crate::config::SpotterConfig;
use crate::error::SpottingError;
use crate::pipeline::defaults::{CombinatorialMatcher, LengthAdjustmentCorrector};
use crate::pipeline::runtime::{KeywordSpotter, KeywordSpotterParts};
use crate::pipeline::traits::{OccurrenceCorrector, QueryMatcher};

pub struct KeywordSpotterBuilder {
    config: SpotterConfig,
    matcher: Option<Box<dyn QueryMatcher>>,
    corrector: Option<Box<dyn OccurrenceCorrector>>,
}

impl KeywordSpotterBuilder {
    pub fn new(config: SpotterConfig) -> Self {
        Self {
            config,
            matcher: None,
            corrector: None,
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn QueryMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_corrector(mut self, corrector: Box<dyn OccurrenceCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn build(self) -> Result<KeywordSpotter, SpottingError> {
        self.config.validate()?;
        Ok(KeywordSpotter::from_parts(KeywordSpotterParts {
            config: self.config,
            matcher: self.matcher.unwrap_or_else(|| Box::new(CombinatorialMatcher)),
            corrector: self
                .corrector
                .unwrap_or_else(|| Box::new(LengthAdjustmentCorrector)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BestDecoding, Occurrence};

    struct KeepAll;

    impl OccurrenceCorrector for KeepAll {
        fn correct(
            &self,
            occurrences: Vec<Occurrence>,
            _best: &BestDecoding,
            _config: &SpotterConfig,
        ) -> Vec<Occurrence> {
            occurrences
        }
    }

    #[test]
    fn build_with_defaults() {
        let spotter = KeywordSpotterBuilder::new(SpotterConfig::default())
            .build()
            .expect("default config is valid");
        assert_eq!(spotter.config().word_confidence, 0.95);
    }

    #[test]
    fn build_accepts_custom_corrector() {
        let result = KeywordSpotterBuilder::new(SpotterConfig::default())
            .with_corrector(Box::new(KeepAll))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = SpotterConfig {
            word_confidence: 1.5,
            ..SpotterConfig::default()
        };
        let result = KeywordSpotterBuilder::new(config).build();
        assert!(matches!(result, Err(SpottingError::InvalidConfig { .. })));
    }

    #[test]
    fn build_rejects_zero_combination_limit() {
        let config = SpotterConfig {
            combination_limit: 0,
            ..SpotterConfig::default()
        };
        assert!(KeywordSpotterBuilder::new(config).build().is_err());
    }
}
