//! Settings threaded into the index and skillset definitions.

/// Embedding deployment used both by the skillset and the index vectorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment_id: String,
    pub model_name: String,
    /// Output width of the model. Vector fields must declare the same value.
    pub dimensions: u32,
}

impl EmbeddingSettings {
    pub const DEFAULT_DEPLOYMENT: &'static str = "embedding";
    pub const DEFAULT_DIMENSIONS: u32 = 3072;

    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment_id: Self::DEFAULT_DEPLOYMENT.to_string(),
            model_name: model_name.into(),
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }
}

/// Language and chunking parameters of the skillset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Language every indexed chunk ends up in.
    pub target_language: String,
    /// Default source language for translation when detection is inconclusive.
    pub source_language: String,
    pub page_length: u32,
    pub page_overlap: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            target_language: "ja".to_string(),
            source_language: "en".to_string(),
            page_length: 2000,
            page_overlap: 500,
        }
    }
}

impl PipelineSettings {
    /// Lucene analyzer matching the target language, e.g. `ja.lucene`.
    pub fn analyzer(&self) -> String {
        format!("{}.lucene", self.target_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_follows_target_language() {
        let mut settings = PipelineSettings::default();
        assert_eq!(settings.analyzer(), "ja.lucene");

        settings.target_language = "fr".to_string();
        assert_eq!(settings.analyzer(), "fr.lucene");
    }
}
