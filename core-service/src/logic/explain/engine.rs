use image::RgbImage;
use ndarray::Array3;

use crate::constants::{self, FEATURE_TYPE, INPUT_RESIZE, LABEL_FULLNAMES, NO_CONCEPTS};
use crate::logic::concepts::{AreaCoordinates, ConceptMasker};
use crate::logic::config::AdapterConfig;
use crate::logic::error::{ModelError, ModelResult};
use crate::logic::model::{
    artifacts, ArtifactInfo, ConceptArtifact, ConceptReducer, EngineStatus, FeatureExtractor,
    LatencyStats, OnnxBackbone, WoeArtifact,
};
use crate::logic::model::reducer;
use crate::logic::preprocess;
use crate::logic::woe::{EvidenceType, StrengthOfEvidence, WoeExplainer};
use super::types::{best_index, round2, Evidence, FeatureArea, Hypothesis, PredictionResult};

/// Concept map and pooled features of one image
#[derive(Debug, Clone)]
pub struct ConceptFeatures {
    /// `(h, w, n_concepts)`
    pub concept_map: Array3<f32>,
    pub features: Vec<f32>,
}

/// Loaded backbone + concept explainer + WOE explainer. Read-only after load,
/// safe to share between request handlers.
pub struct ExplanationModel {
    backbone: Box<dyn FeatureExtractor>,
    reducer: ConceptReducer,
    masker: ConceptMasker,
    woe: WoeExplainer,
    artifacts: Vec<ArtifactInfo>,
    loaded_at: chrono::DateTime<chrono::Utc>,
    stats: LatencyStats,
}

impl ExplanationModel {
    /// Load all three artifacts named by `config`
    pub fn load(config: &AdapterConfig) -> ModelResult<Self> {
        log::info!("Loading {} explainer for {} from {}", constants::ALGO, constants::MODEL, config.model_dir.display());

        let (concept, exp_info) = artifacts::load_json::<ConceptArtifact>(&config.exp_path())?;
        let (woe, woe_info) = artifacts::load_json::<WoeArtifact>(&config.woe_path())?;

        let backbone_path = config.backbone_path();
        let (_, backbone_info) = artifacts::read_artifact(&backbone_path)?;
        let backbone = OnnxBackbone::load(&backbone_path, config.concept_layer.as_deref())?;

        let mut model = Self::from_parts(Box::new(backbone), &concept, &woe, config.nmf_max_iter)?;
        model.artifacts = vec![backbone_info, exp_info, woe_info];
        Ok(model)
    }

    pub fn from_parts(
        backbone: Box<dyn FeatureExtractor>,
        concept: &ConceptArtifact,
        woe: &WoeArtifact,
        nmf_max_iter: usize,
    ) -> ModelResult<Self> {
        let reducer = ConceptReducer::new(concept.components_matrix()?, nmf_max_iter)?;
        if reducer.n_concepts() != NO_CONCEPTS {
            log::warn!(
                "Concept explainer has {} concepts, label table has {}",
                reducer.n_concepts(),
                NO_CONCEPTS
            );
        }

        let woe = WoeExplainer::from_artifact(woe, reducer.n_concepts())?;
        if woe.n_classes() != LABEL_FULLNAMES.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "WOE explainer has {} classes, expected {}",
                woe.n_classes(),
                LABEL_FULLNAMES.len()
            )));
        }

        let masker = ConceptMasker::new(INPUT_RESIZE as usize, concept.mask_threshold)?;

        log::info!(
            "Explanation model ready ({}, {} concepts, {} hypotheses)",
            backbone.describe(),
            reducer.n_concepts(),
            woe.n_classes()
        );

        Ok(Self {
            backbone,
            reducer,
            masker,
            woe,
            artifacts: Vec::new(),
            loaded_at: chrono::Utc::now(),
            stats: LatencyStats::default(),
        })
    }

    pub fn n_concepts(&self) -> usize {
        self.reducer.n_concepts()
    }

    /// Preprocess, run the backbone, project onto concepts and pool
    pub fn concept_features(&self, image: &RgbImage) -> ModelResult<ConceptFeatures> {
        let input = preprocess::to_input_tensor(image);
        let activations = self.backbone.extract(&input)?;
        let concept_map = self.reducer.transform(&activations)?;
        let features = reducer::pool(&concept_map, FEATURE_TYPE)?;
        Ok(ConceptFeatures { concept_map, features })
    }

    /// Decode an upload and predict
    pub fn predict_bytes(
        &self,
        bytes: &[u8],
        container_width: f64,
        container_height: f64,
    ) -> ModelResult<PredictionResult> {
        let image = preprocess::decode_rgb(bytes)?;
        self.predict_image(&image, container_width, container_height)
    }

    pub fn predict_image(
        &self,
        image: &RgbImage,
        container_width: f64,
        container_height: f64,
    ) -> ModelResult<PredictionResult> {
        let start_time = std::time::Instant::now();

        let concepts = self.concept_features(image)?;
        let features = self.feature_areas(&concepts, container_width, container_height)?;
        let hypotheses = self.hypotheses(&concepts.features)?;

        let probabilities: Vec<f64> = hypotheses.iter().map(|h| h.probability).collect();
        let best = best_index(&probabilities)
            .ok_or_else(|| ModelError::InvalidArtifact("no hypotheses".to_string()))?;
        let recommendation = LABEL_FULLNAMES
            .get(best)
            .map(|name| name.to_string())
            .unwrap_or_else(|| hypotheses[best].hypothesis_name.clone());

        let elapsed = start_time.elapsed().as_micros() as u64;
        self.stats.record(elapsed);
        log::debug!("Prediction '{}' in {} us", recommendation, elapsed);

        Ok(PredictionResult { recommendation, hypotheses, features })
    }

    fn feature_areas(
        &self,
        concepts: &ConceptFeatures,
        container_width: f64,
        container_height: f64,
    ) -> ModelResult<Vec<FeatureArea>> {
        let mut areas = Vec::new();
        for feature_id in 0..self.n_concepts() {
            let mask = self.masker.mask(&concepts.concept_map, feature_id)?;
            let Some(area_coordinates) =
                AreaCoordinates::from_mask(&mask, container_width, container_height)
            else {
                continue;
            };
            areas.push(FeatureArea {
                feature_id,
                feature_name: constants::feature_label(feature_id),
                area_coordinates,
            });
        }
        Ok(areas)
    }

    fn hypotheses(&self, features: &[f32]) -> ModelResult<Vec<Hypothesis>> {
        (0..self.woe.n_classes())
            .map(|hypothesis_id| {
                let explanation = self.woe.explain(features, hypothesis_id)?;
                let evidence = explanation.attwoes.iter().enumerate()
                    .map(|(feature_id, &woe)| Evidence {
                        feature_id,
                        feature_name: constants::feature_label(feature_id),
                        evidence_type: EvidenceType::of(woe),
                        soe: StrengthOfEvidence::of(woe),
                    })
                    .collect();

                Ok(Hypothesis {
                    hypothesis_id,
                    hypothesis_name: constants::hypothesis_display_name(hypothesis_id)
                        .unwrap_or_else(|| format!("Class {}", hypothesis_id)),
                    evidence,
                    probability: round2(explanation.probability()),
                })
            })
            .collect()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            model_loaded: true,
            backbone: self.backbone.describe(),
            artifacts: self.artifacts.clone(),
            loaded_at: self.loaded_at,
            avg_latency_ms: self.stats.avg_latency_ms(),
            inference_count: self.stats.count(),
        }
    }
}
