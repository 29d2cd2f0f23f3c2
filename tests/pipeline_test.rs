//! End-to-end tests for fitting, predicting and persisting the pipeline.

use review_triage::dataset;
use review_triage::ml::BoosterParams;
use review_triage::prelude::*;
use tempfile::TempDir;

fn config() -> PipelineConfig {
    PipelineConfig {
        booster: BoosterParams {
            n_estimators: 25,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn example(id: u64, title: &str, text: &str, rating: i64, labels: &[Label]) -> TrainingExample {
    let mut set = LabelSet::empty();
    for label in labels {
        set.set(*label, true);
    }
    TrainingExample::new(ReviewRecord::new(id, title, text, rating), set)
}

fn training_set() -> Vec<TrainingExample> {
    vec![
        example(1, "Broken item", "it arrived broken and I want a refund", 1, &[Label::ProduitEndommage, Label::RetourClient]),
        example(2, "Damaged", "the bottle arrived broken and leaking", 1, &[Label::ProduitEndommage]),
        example(3, "Crushed", "box was crushed and the bottle cracked", 2, &[Label::ProduitEndommage]),
        example(4, "Refund", "I want a refund, sending it back today", 2, &[Label::RetourClient]),
        example(5, "Wrong item", "wrong color and not as pictured", 2, &[Label::ProduitNonConforme]),
        example(6, "Fake", "this is a fake, not as described", 1, &[Label::ProduitNonConforme]),
        example(7, "Useless", "does not work, no improvement at all", 2, &[Label::NonTenu]),
        example(8, "Cheap", "poor quality, cheap material", 3, &[Label::MauvaiseQualite]),
        example(9, "Rash", "gave me a rash and made me break out", 1, &[Label::ProduitDangereux]),
        example(10, "Seller", "seller never answered, no customer service", 2, &[Label::SavSallerProbleme]),
        example(11, "Great", "love it, works great", 5, &[Label::AucunProbleme]),
        example(12, "Perfect", "love the smell, great product", 5, &[Label::AucunProbleme]),
        example(13, "Nice", "great value and works well", 4, &[Label::AucunProbleme]),
        example(14, "Good", "love this product, great price", 4, &[Label::AucunProbleme]),
        example(15, "", "", 5, &[Label::AucunProbleme]),
    ]
}

#[test]
fn test_fit_predict_on_training_set() -> Result<()> {
    let pipeline = ReviewPipeline::new(config())?;
    let examples = training_set();
    let state = pipeline.fit(&examples)?;
    assert_eq!(state.metadata().documents, 14);
    assert_eq!(state.metadata().dropped, 1);

    let records: Vec<ReviewRecord> = examples.iter().map(|e| e.record.clone()).collect();
    let labeled = pipeline.predict(&records, &state)?;

    // Only the empty review is dropped, order is kept.
    assert_eq!(labeled.len(), 14);
    let expected_ids: Vec<&str> = records
        .iter()
        .filter(|r| r.revue().is_some())
        .map(|r| r.id.as_str())
        .collect();
    let ids: Vec<&str> = labeled.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(ids, expected_ids);

    for review in &labeled {
        match review.record.rating {
            4 | 5 => {
                assert!(review.labels.aucun_probleme);
                let allowed = usize::from(review.labels.retour_client) + 1;
                assert_eq!(review.labels.count(), allowed);
            }
            _ => assert!(review.labels.count() >= 1),
        }
    }
    Ok(())
}

#[test]
fn test_empty_review_is_absent_from_output() -> Result<()> {
    let pipeline = ReviewPipeline::new(config())?;
    let state = pipeline.fit(&training_set())?;
    let labeled = pipeline.predict(&[ReviewRecord::new("empty", "", "", 5)], &state)?;
    assert!(labeled.is_empty());
    Ok(())
}

#[test]
fn test_state_roundtrip_through_file() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.bin");

    let pipeline = ReviewPipeline::new(config())?;
    let state = pipeline.fit(&training_set())?;
    state.save(&path)?;
    let loaded = FittedPipelineState::load(&path)?;
    assert_eq!(loaded, state);

    let records = vec![
        ReviewRecord::new("a", "Broken", "arrived cracked and leaking", 1),
        ReviewRecord::new("b", "Love", "great product", 5),
    ];
    assert_eq!(
        pipeline.predict(&records, &state)?,
        pipeline.predict(&records, &loaded)?
    );
    Ok(())
}

#[test]
fn test_corrupt_state_file_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.bin");
    std::fs::write(&path, b"not a fitted state").unwrap();
    assert!(FittedPipelineState::load(&path).is_err());
    Ok(())
}

#[test]
fn test_state_is_shared_across_threads() -> Result<()> {
    let pipeline = ReviewPipeline::new(config())?;
    let state = pipeline.fit(&training_set())?;
    let records: Vec<ReviewRecord> = training_set().into_iter().map(|e| e.record).collect();
    let expected = pipeline.predict(&records, &state)?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| pipeline.predict(&records, &state)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
    Ok(())
}

#[test]
fn test_dataset_files_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("batch.csv");
    let output = temp_dir.path().join("predicted.jsonl");
    std::fs::write(
        &input,
        "id,title,text,rating\n1,Broken item,it arrived broken and I want a refund,1\n2,,,5\n3,Great,love it,5\n",
    )
    .unwrap();

    let pipeline = ReviewPipeline::new(config())?;
    let state = pipeline.fit(&training_set())?;
    let labeled = pipeline.predict(&dataset::read_records(&input)?, &state)?;
    dataset::write_predictions(&output, &labeled)?;

    let written = dataset::read_training(&output)?;
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].record.id.as_str(), "1");
    assert!(written[0].labels.count() >= 1);
    assert!(written[1].labels.aucun_probleme);
    Ok(())
}
