//! The bilingual chunking and enrichment skillset.
//!
//! Per document:
//!
//! 1. detect the document language and OCR every normalized image
//! 2. merge text and OCR output (PDFs keep only the OCR text)
//! 3. route the merged text to exactly one of two splitters, keyed on
//!    whether the document is already in the target language, and fan the
//!    two chunk lists back into `original_chunks`
//!
//! Per chunk:
//!
//! 4. detect the chunk language and translate chunks not in the target
//!    language, then select the target-language text as `chunk`
//! 5. extract entities and key phrases and embed `chunk`
//!
//! Each chunk is projected into the index as its own record, keyed back to
//! the source document through `parent_id`.

use tracing::instrument;

use search_provisioner_repository::{ProvisionError, ResourceClient};
use search_provisioner_shared::skillset::{EntityCategory, LineEnding, TextSplitMode};
use search_provisioner_shared::{
    CognitiveServices, Expr, InputSource, Outcome, ProjectionMapping, ProjectionMode,
    ProjectionSelector, Skill, SkillKind, Skillset,
};

use crate::errors::DefinitionError;
use crate::graph::paths::{self, document, each, join};
use crate::graph::SkillsetBuilder;
use crate::registrar::index_schema::field;
use crate::settings::{EmbeddingSettings, PipelineSettings};

const DESCRIPTION: &str = "Skillset to chunk documents and generate embeddings";

/// Document fields present before any skill runs.
pub const RAW_FIELDS: [&str; 8] = [
    "/document/content",
    "/document/metadata_content_type",
    "/document/metadata_storage_path",
    "/document/metadata_storage_name",
    "/document/normalized_images",
    "/document/normalized_images/*",
    "/document/normalized_images/*/contentOffset",
    "/document/title",
];

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Fan-out context of every per-chunk skill and of the projection.
pub fn chunk_context() -> String {
    each(&document("original_chunks"))
}

fn chunk_path(name: &str) -> String {
    join(&chunk_context(), name)
}

fn images() -> String {
    each(&document("normalized_images"))
}

/// Builds and declares the skillset.
pub struct PipelineDefiner {
    client: ResourceClient,
    settings: PipelineSettings,
}

impl PipelineDefiner {
    pub fn new(client: ResourceClient, settings: PipelineSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Assemble the skillset, rejecting dangling references locally.
    pub fn define(
        &self,
        name: &str,
        target_index: &str,
        embedding: &EmbeddingSettings,
        cognitive_key: &str,
    ) -> Result<Skillset, DefinitionError> {
        let target = self.settings.target_language.as_str();
        let in_target = |path: &str| Expr::field_equals(path, target);
        let language = document("language");
        let chunk_language = chunk_path("chunk_language");
        let chunk = chunk_path("chunk");

        let mut builder = SkillsetBuilder::new(name)
            .description(DESCRIPTION)
            .raw_fields(RAW_FIELDS)
            .cognitive_services(CognitiveServices::ByKey {
                description: None,
                key: cognitive_key.to_string(),
            })
            .projection_mode(ProjectionMode::SkipIndexingParentDocuments);

        // Document level
        builder = builder
            .skill(
                self.detect_language("#1.LanguageDetectionSkill", paths::DOCUMENT)
                    .input("text", document("content"))
                    .output("languageCode", "language"),
            )
            .skill(
                Skill::new("#2.OcrSkill", images(), self.ocr())
                    .input("image", images())
                    .output("text", "text_from_ocr"),
            )
            .skill(
                Skill::new("#3.1.MergeSkillnotforPDF", paths::DOCUMENT, merge())
                    .input("text", document("content"))
                    .input("itemsToInsert", join(&images(), "text_from_ocr"))
                    .input("offsets", join(&images(), "contentOffset"))
                    .output("mergedText", "merged_text_others"),
            )
            .skill(
                Skill::new("#3.2.MergeSkillForPDF", paths::DOCUMENT, merge())
                    .input("itemsToInsert", join(&images(), "text_from_ocr"))
                    .output("mergedText", "merged_text_pdf"),
            )
            .skill(conditional(
                "#3.3.MergeGoal",
                paths::DOCUMENT,
                Expr::field_equals(document("metadata_content_type"), PDF_CONTENT_TYPE),
                document("merged_text_pdf"),
                document("merged_text_others"),
                "merged_text",
            ));

        // Exactly one splitter sees non-null text.
        builder = builder
            .skill(conditional(
                "#4.1.splitForNonTarget",
                paths::DOCUMENT,
                in_target(&language),
                Expr::null(),
                document("merged_text"),
                "content_not_target",
            ))
            .skill(
                Skill::new("#4.2.SplitSkillForNonTarget", paths::DOCUMENT, self.split())
                    .with_description("Split skill to chunk documents")
                    .input("text", document("content_not_target"))
                    .input("languageCode", language.as_str())
                    .output("textItems", "original_chunks_not_target"),
            )
            .skill(conditional(
                "#4.3.splitForTarget",
                paths::DOCUMENT,
                in_target(&language),
                document("merged_text"),
                Expr::null(),
                "content_target",
            ))
            .skill(
                Skill::new("#4.4.SplitSkillForTarget", paths::DOCUMENT, self.split())
                    .with_description("Split skill to chunk documents")
                    .input("text", document("content_target"))
                    .input("languageCode", language.as_str())
                    .output("textItems", "original_chunks_target"),
            )
            .skill(conditional(
                "#4.5.mergeChunks",
                paths::DOCUMENT,
                in_target(&language),
                document("original_chunks_target"),
                document("original_chunks_not_target"),
                "original_chunks",
            ));

        // Chunk level
        let context = chunk_context();
        builder = builder
            .skill(
                self.detect_language("#5.LanguageDetectionSkill_by_chunk", &context)
                    .input("text", context.as_str())
                    .output("languageCode", "chunk_language"),
            )
            .skill(conditional(
                "#6.GetNonTargetContent",
                &context,
                in_target(&chunk_language),
                Expr::null(),
                context.as_str(),
                "content_not_target",
            ))
            .skill(
                Skill::new("#7.translateToTarget", &context, self.translation())
                    .input("fromLanguageCode", chunk_language.as_str())
                    .input("text", chunk_path("content_not_target"))
                    .output("translatedText", "chunk_translated")
                    .output("translatedToLanguageCode", "translatedToLanguageCode")
                    .output("translatedFromLanguageCode", "translatedFromLanguageCode"),
            )
            .skill(conditional(
                "#8.generateTargetChunk",
                &context,
                in_target(&chunk_language),
                context.as_str(),
                chunk_path("chunk_translated"),
                "chunk",
            ))
            .skill(
                Skill::new("#9.1.EntityRecognitionSkill", &context, self.entities())
                    .input("text", chunk.as_str())
                    .output("persons", field::PERSONS)
                    .output("urls", field::URLS)
                    .output("emails", field::EMAILS),
            )
            .skill(
                Skill::new("#9.2.KeyPhraseExtractionSkill", &context, self.key_phrases())
                    .input("text", chunk.as_str())
                    .output("keyPhrases", field::KEY_PHRASES),
            )
            .skill(
                Skill::new("#9.3.embedding", &context, embed(embedding))
                    .input("text", chunk.as_str())
                    .output("embedding", field::VECTOR),
            );

        builder.project(projection(target_index)).build()
    }

    /// Create or replace the skillset.
    ///
    /// A graph that fails local validation is reported as `InvalidDefinition`
    /// without contacting the service.
    #[instrument(skip(self, embedding, cognitive_key), fields(model = %embedding.model_name))]
    pub async fn ensure_pipeline(
        &self,
        name: &str,
        target_index: &str,
        embedding: &EmbeddingSettings,
        cognitive_key: &str,
    ) -> Result<Outcome, ProvisionError> {
        let skillset = self.define(name, target_index, embedding, cognitive_key)?;
        self.client.put(&skillset).await
    }

    fn detect_language(&self, name: &str, context: &str) -> Skill {
        Skill::new(
            name,
            context,
            SkillKind::LanguageDetection {
                default_country_hint: None,
                model_version: None,
            },
        )
        .with_description(
            "If you have multilingual content, adding a language code is useful for filtering",
        )
    }

    fn ocr(&self) -> SkillKind {
        SkillKind::Ocr {
            text_extraction_algorithm: None,
            line_ending: LineEnding::Space,
            default_language_code: self.settings.target_language.clone(),
            detect_orientation: true,
        }
    }

    fn split(&self) -> SkillKind {
        SkillKind::Split {
            default_language_code: self.settings.target_language.clone(),
            text_split_mode: TextSplitMode::Pages,
            maximum_page_length: self.settings.page_length,
            page_overlap_length: self.settings.page_overlap,
            maximum_pages_to_take: 0,
        }
    }

    fn translation(&self) -> SkillKind {
        SkillKind::Translation {
            default_from_language_code: self.settings.source_language.clone(),
            default_to_language_code: self.settings.target_language.clone(),
            suggested_from: self.settings.source_language.clone(),
        }
    }

    fn entities(&self) -> SkillKind {
        SkillKind::EntityRecognition {
            categories: vec![EntityCategory::Person, EntityCategory::Url, EntityCategory::Email],
            default_language_code: self.settings.target_language.clone(),
            minimum_precision: 0.5,
            model_version: None,
        }
    }

    fn key_phrases(&self) -> SkillKind {
        SkillKind::KeyPhraseExtraction {
            default_language_code: self.settings.target_language.clone(),
            max_key_phrase_count: None,
            model_version: None,
        }
    }
}

fn merge() -> SkillKind {
    SkillKind::Merge {
        insert_pre_tag: " ".to_string(),
        insert_post_tag: " ".to_string(),
    }
}

fn embed(embedding: &EmbeddingSettings) -> SkillKind {
    SkillKind::Embedding {
        resource_uri: embedding.endpoint.clone(),
        api_key: embedding.api_key.clone(),
        deployment_id: embedding.deployment_id.clone(),
        dimensions: embedding.dimensions,
        model_name: embedding.model_name.clone(),
    }
}

fn conditional(
    name: &str,
    context: &str,
    condition: Expr,
    when_true: impl Into<InputSource>,
    when_false: impl Into<InputSource>,
    target: &str,
) -> Skill {
    Skill::new(name, context, SkillKind::Conditional)
        .with_description("")
        .input("condition", condition)
        .input("whenTrue", when_true)
        .input("whenFalse", when_false)
        .output("output", target)
}

/// One index record per chunk.
fn projection(target_index: &str) -> ProjectionSelector {
    let mappings = [
        (field::TITLE, document("title")),
        (field::LOCATION, document("metadata_storage_path")),
        (field::ORIGINAL_CHUNK, chunk_context()),
        (field::CHUNK, chunk_path("chunk")),
        (field::VECTOR, chunk_path("vector")),
        (field::LANGUAGE, chunk_path("chunk_language")),
        (field::PERSONS, chunk_path("persons")),
        (field::URLS, chunk_path("urls")),
        (field::EMAILS, chunk_path("emails")),
        (field::KEY_PHRASES, chunk_path("key_phrases")),
        (field::METADATA_STORAGE_PATH, document("metadata_storage_path")),
    ];

    ProjectionSelector {
        target_index_name: target_index.to_string(),
        parent_key_field_name: field::PARENT_ID.to_string(),
        source_context: chunk_context(),
        mappings: mappings
            .into_iter()
            .map(|(name, source)| ProjectionMapping::new(name, source))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{simulate, EnrichmentTree, SkillStub};
    use crate::registrar::index_schema::chunk_index_fields;
    use crate::test_support::RecordingTransport;
    use search_provisioner_shared::{ResourceKind, SkillInput};
    use serde_json::{json, Value};
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;

    fn embedding() -> EmbeddingSettings {
        EmbeddingSettings::new("https://aoai.example.com", "aoai-key", "text-embedding-3-large")
    }

    fn definer(transport: Arc<RecordingTransport>) -> PipelineDefiner {
        PipelineDefiner::new(ResourceClient::new(transport), PipelineSettings::default())
    }

    fn reference_skillset() -> Skillset {
        definer(Arc::new(RecordingTransport::returning(201)))
            .define("skill1", "idx1", &embedding(), "cog-key")
            .unwrap()
    }

    /// Language is read from a `lang:` prefix, pages are separated by `|`,
    /// translation prefixes the text with the target language.
    struct FakeServices;

    fn text(inputs: &BTreeMap<String, Value>) -> Option<&str> {
        inputs.get("text").and_then(Value::as_str)
    }

    impl SkillStub for FakeServices {
        fn run(&mut self, skill: &Skill, inputs: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
            let mut out = BTreeMap::new();

            match &skill.kind {
                SkillKind::LanguageDetection { .. } => {
                    let code = text(inputs)
                        .and_then(|t| t.split_once(':'))
                        .map_or("en", |(lang, _)| lang);
                    out.insert("languageCode".to_string(), json!(code));
                }
                SkillKind::Ocr { .. } => {
                    out.insert("text".to_string(), json!(""));
                }
                SkillKind::Merge { .. } => {
                    let merged = text(inputs).unwrap_or_default();
                    out.insert("mergedText".to_string(), json!(merged));
                }
                SkillKind::Split { .. } => {
                    if let Some(t) = text(inputs) {
                        let pages: Vec<&str> = t.split('|').collect();
                        out.insert("textItems".to_string(), json!(pages));
                    }
                }
                SkillKind::Translation {
                    default_to_language_code,
                    ..
                } => {
                    if let Some(t) = text(inputs) {
                        let body = t.split_once(':').map_or(t, |(_, body)| body);
                        out.insert(
                            "translatedText".to_string(),
                            json!(format!("{}:{}", default_to_language_code, body)),
                        );
                    }
                }
                SkillKind::EntityRecognition { .. } => {
                    out.insert("persons".to_string(), json!([]));
                    out.insert("urls".to_string(), json!([]));
                    out.insert("emails".to_string(), json!([]));
                }
                SkillKind::KeyPhraseExtraction { .. } => {
                    out.insert("keyPhrases".to_string(), json!([]));
                }
                SkillKind::Embedding { dimensions, .. } => {
                    out.insert("embedding".to_string(), json!(vec![0.0; *dimensions as usize]));
                }
                SkillKind::Conditional => {}
            }

            out
        }
    }

    fn document_tree(content: &str) -> EnrichmentTree {
        EnrichmentTree::new()
            .with("/document/content", json!(content))
            .with("/document/metadata_content_type", json!("text/plain"))
            .with("/document/metadata_storage_path", json!("https://blob/doc.txt"))
            .with("/document/title", json!("doc.txt"))
            .with("/document/normalized_images", json!([]))
    }

    #[test]
    fn test_reference_graph_shape() {
        let skillset = reference_skillset();

        assert_eq!(skillset.skills.len(), 17);
        assert_eq!(skillset.skills[0].name, "#1.LanguageDetectionSkill");
        assert_eq!(skillset.skills[16].name, "#9.3.embedding");

        let selector = &skillset.index_projections.selectors[0];
        assert_eq!(selector.target_index_name, "idx1");
        assert_eq!(selector.source_context, "/document/original_chunks/*");
        assert_eq!(selector.parent_key_field_name, "parent_id");
    }

    #[test]
    fn test_target_document_takes_target_branch() {
        let skillset = reference_skillset();
        let mut services = FakeServices;

        let tree = simulate(&skillset, document_tree("ja:first|ja:second"), &mut services);

        assert_eq!(tree.get("/document/content_not_target"), Value::Null);
        assert_eq!(tree.get("/document/content_target"), json!("ja:first|ja:second"));
        assert_eq!(tree.get("/document/original_chunks_not_target"), Value::Null);
        assert_eq!(tree.get("/document/original_chunks"), json!(["ja:first", "ja:second"]));

        assert_eq!(tree.get("/document/original_chunks/0/chunk"), json!("ja:first"));
        assert_eq!(tree.get("/document/original_chunks/1/chunk"), json!("ja:second"));
        assert_eq!(
            tree.get("/document/original_chunks/0/content_not_target"),
            Value::Null
        );
    }

    #[test]
    fn test_non_target_document_takes_other_branch() {
        let skillset = reference_skillset();
        let mut services = FakeServices;

        let tree = simulate(&skillset, document_tree("en:hello|en:world"), &mut services);

        assert_eq!(tree.get("/document/content_target"), Value::Null);
        assert_eq!(tree.get("/document/content_not_target"), json!("en:hello|en:world"));
        assert_eq!(tree.get("/document/original_chunks_target"), Value::Null);
        assert_eq!(tree.get("/document/original_chunks"), json!(["en:hello", "en:world"]));
    }

    #[test]
    fn test_chunks_end_up_in_target_language() {
        let skillset = reference_skillset();
        let mut services = FakeServices;

        // Document detected as Japanese overall, second chunk in English.
        let tree = simulate(&skillset, document_tree("ja:intro|en:appendix"), &mut services);

        assert_eq!(tree.get("/document/original_chunks/0/chunk"), json!("ja:intro"));
        assert_eq!(tree.get("/document/original_chunks/1/chunk_language"), json!("en"));
        assert_eq!(tree.get("/document/original_chunks/1/chunk"), json!("ja:appendix"));
        assert_eq!(tree.get("/document/original_chunks/1"), json!("en:appendix"));
    }

    #[test]
    fn test_pdf_uses_ocr_merge() {
        let skillset = reference_skillset();
        let mut services = FakeServices;

        let tree = document_tree("ja:body").with(
            "/document/metadata_content_type",
            json!("application/pdf"),
        );
        let tree = simulate(&skillset, tree, &mut services);

        // The PDF merge has no `text` input, so the fake yields an empty string.
        assert_eq!(tree.get("/document/merged_text"), json!(""));
        assert_eq!(tree.get("/document/merged_text_others"), json!("ja:body"));
    }

    #[test]
    fn test_projection_covers_index_fields() {
        let skillset = reference_skillset();
        let fields: BTreeSet<String> = chunk_index_fields(&PipelineSettings::default(), 3072)
            .into_iter()
            .map(|f| f.name)
            .collect();

        let projected: BTreeSet<String> = skillset.index_projections.selectors[0]
            .mappings
            .iter()
            .map(|m| m.name.clone())
            .collect();

        assert!(projected.is_subset(&fields));

        // Key and parent key are filled in by the projection itself.
        let unmapped: Vec<&String> = fields.difference(&projected).collect();
        assert_eq!(unmapped, vec![field::CHUNK_ID, field::PARENT_ID]);
    }

    #[test]
    fn test_settings_flow_into_skills() {
        let settings = PipelineSettings {
            target_language: "fr".to_string(),
            source_language: "de".to_string(),
            page_length: 1000,
            page_overlap: 100,
        };
        let definer = PipelineDefiner::new(
            ResourceClient::new(Arc::new(RecordingTransport::returning(201))),
            settings,
        );
        let skillset = definer.define("s", "i", &embedding(), "k").unwrap();

        let gate = skillset.skill("#4.3.splitForTarget").unwrap();
        assert_eq!(
            gate.inputs[0],
            SkillInput::new("condition", Expr::field_equals("/document/language", "fr"))
        );

        match &skillset.skill("#4.2.SplitSkillForNonTarget").unwrap().kind {
            SkillKind::Split {
                maximum_page_length,
                page_overlap_length,
                default_language_code,
                ..
            } => {
                assert_eq!(*maximum_page_length, 1000);
                assert_eq!(*page_overlap_length, 100);
                assert_eq!(default_language_code, "fr");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_pipeline_payload() {
        let transport = Arc::new(RecordingTransport::returning(204));
        let outcome = definer(transport.clone())
            .ensure_pipeline("skill1", "idx1", &embedding(), "cog-key")
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Replaced(204));

        let calls = transport.calls().await;
        let (kind, name, body) = &calls[0];
        assert_eq!(*kind, ResourceKind::Skillset);
        assert_eq!(name, "skill1");

        assert_eq!(
            body["cognitiveServices"]["@odata.type"],
            "#Microsoft.Azure.Search.CognitiveServicesByKey"
        );
        assert_eq!(body["cognitiveServices"]["key"], "cog-key");

        let gate = &body["skills"][5];
        assert_eq!(gate["@odata.type"], "#Microsoft.Skills.Util.ConditionalSkill");
        assert_eq!(gate["inputs"][0]["source"], "= $(/document/language) == 'ja'");
        assert_eq!(gate["inputs"][1]["source"], "= null");

        let embed = &body["skills"][16];
        assert_eq!(embed["@odata.type"], "#Microsoft.Skills.Text.AzureOpenAIEmbeddingSkill");
        assert_eq!(embed["dimensions"], 3072);
        assert_eq!(embed["deploymentId"], "embedding");

        assert_eq!(
            body["indexProjections"]["parameters"]["projectionMode"],
            "skipIndexingParentDocuments"
        );
    }
}
