//! End-to-end checks of the explanation model on hand-made artifacts

use image::{Rgb, RgbImage};
use ndarray::Array3;

use crate::constants::{LABEL_FULLNAMES, NO_CONCEPTS};
use crate::logic::concepts::AreaCoordinates;
use crate::logic::woe::{EvidenceType, StrengthOfEvidence};
use super::fixtures::{demo_model, model_with, FAVOURED_CLASS, GRID};
use super::types::{best_index, round2};

fn image() -> RgbImage {
    RgbImage::from_pixel(64, 48, Rgb([180, 120, 110]))
}

#[test]
fn test_recommends_favoured_class() {
    let result = demo_model().predict_image(&image(), 224.0, 224.0).unwrap();

    assert_eq!(result.recommendation, "Melanoma");
    assert_eq!(result.hypotheses.len(), LABEL_FULLNAMES.len());
    assert_eq!(result.hypotheses[FAVOURED_CLASS].hypothesis_name, "Melanoma (MEL)");
    assert_eq!(result.probability_of(FAVOURED_CLASS), Some(0.96));
    assert_eq!(result.probability_of(0), Some(0.01));
}

#[test]
fn test_probabilities_are_rounded_and_bounded() {
    let result = demo_model().predict_image(&image(), 300.0, 200.0).unwrap();
    for hypothesis in &result.hypotheses {
        let p = hypothesis.probability;
        assert!((0.0..=1.0).contains(&p));
        assert!((p * 100.0 - (p * 100.0).round()).abs() < 1e-9, "{} not rounded", p);
    }
}

#[test]
fn test_evidence_per_concept() {
    let result = demo_model().predict_image(&image(), 224.0, 224.0).unwrap();

    let melanoma = &result.hypotheses[FAVOURED_CLASS];
    assert_eq!(melanoma.evidence.len(), NO_CONCEPTS);
    assert_eq!(melanoma.evidence[0].feature_name, "Reddish\n Structures");
    assert_eq!(melanoma.evidence[0].evidence_type, EvidenceType::Positive);
    assert_eq!(melanoma.evidence[0].soe, StrengthOfEvidence::Decisive);

    // Identical likelihoods on the other concepts carry no evidence
    for evidence in &melanoma.evidence[1..] {
        assert_eq!(evidence.evidence_type, EvidenceType::Zero);
        assert_eq!(evidence.soe, StrengthOfEvidence::NotWorthMentioning);
    }

    let akiec = &result.hypotheses[0];
    assert_eq!(akiec.evidence[0].evidence_type, EvidenceType::Negative);
    assert_eq!(akiec.evidence[0].soe, StrengthOfEvidence::Strong);
}

#[test]
fn test_feature_areas() {
    let result = demo_model().predict_image(&image(), 224.0, 224.0).unwrap();

    // Concepts 2.. never fire and are left out
    let ids: Vec<usize> = result.features.iter().map(|f| f.feature_id).collect();
    assert_eq!(ids, vec![0, 1]);

    assert_eq!(
        result.features[0].area_coordinates,
        AreaCoordinates { x: 0.0, y: 0.0, width: 224.0, height: 224.0 }
    );
    // Top-left 2 of 7 cells → 64 of 224 pixels
    assert_eq!(
        result.features[1].area_coordinates,
        AreaCoordinates { x: 0.0, y: 0.0, width: 64.0, height: 64.0 }
    );
    assert_eq!(result.features[1].feature_name, "Medium Irregular\n Pigmentation");
}

#[test]
fn test_full_concept_spans_container() {
    let result = demo_model().predict_image(&image(), 512.0, 384.0).unwrap();
    assert_eq!(
        result.features[0].area_coordinates,
        AreaCoordinates { x: 0.0, y: 0.0, width: 512.0, height: 384.0 }
    );
}

#[test]
fn test_silent_concepts_give_no_areas_and_ties_go_to_lowest_index() {
    let model = model_with(Array3::zeros((GRID, GRID, NO_CONCEPTS)));
    let result = model.predict_image(&image(), 224.0, 224.0).unwrap();

    assert!(result.features.is_empty());
    // Every class but Melanoma is equally likely
    assert_eq!(result.probability_of(0), result.probability_of(1));
    assert_eq!(result.recommendation, LABEL_FULLNAMES[0]);
    assert_eq!(result.probability_of(FAVOURED_CLASS), Some(0.0));
}

#[test]
fn test_predict_bytes_rejects_non_images() {
    assert!(demo_model().predict_bytes(b"GIF89a...", 224.0, 224.0).is_err());
}

#[test]
fn test_latency_is_tracked() {
    let model = demo_model();
    model.predict_image(&image(), 224.0, 224.0).unwrap();
    model.predict_image(&image(), 224.0, 224.0).unwrap();

    let status = model.status();
    assert_eq!(status.inference_count, 2);
    assert_eq!(status.backbone, "fixed");
}

#[test]
fn test_json_shape() {
    let result = demo_model().predict_image(&image(), 224.0, 224.0).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["recommendation"], "Melanoma");
    assert_eq!(json["hypotheses"][4]["hypothesis_id"], 4);
    assert_eq!(json["hypotheses"][4]["evidence"][0]["soe"], "Decisive");
    assert_eq!(json["hypotheses"][4]["evidence"][0]["evidence_type"], "positive");
    assert_eq!(json["features"][0]["area_coordinates"]["width"], 224.0);
}

#[test]
fn test_round_and_argmax_helpers() {
    assert_eq!(round2(0.4449), 0.44);
    assert_eq!(round2(0.996), 1.0);
    assert_eq!(best_index(&[0.2, 0.5, 0.5, 0.1]), Some(1));
    assert_eq!(best_index(&[]), None);
}
