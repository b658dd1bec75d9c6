use std::fs;
use std::sync::mpsc;

use seg_eval_core::corpus::SAMPLE_TAGGED_CORPUS;
use seg_eval_core::{EvalConfig, EvalEvent, EvalPipeline, Segmenter};

/// Segmentador externo simulado: separa em espaços um texto que já vem segmentado.
struct Whitespace;

impl Segmenter for Whitespace {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|w| format!("{w}/x")).collect()
    }
}

#[test]
fn test_full_run_with_external_segmenter() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("news_a.txt"), SAMPLE_TAGGED_CORPUS).unwrap();
    fs::write(dir.path().join("dianshang_reviews.txt"), "质量 很 好 ， 物流 很 快 。").unwrap();
    fs::write(dir.path().join("bilbil_reviews.txt"), "up主 b站2233 yyds").unwrap();

    let mut config = EvalConfig::under(dir.path());
    config.tools = vec!["char_level".to_string(), "whitespace".to_string()];

    let mut pipeline = EvalPipeline::from_config(config).unwrap();
    pipeline.registry.register(Whitespace);

    let summary = pipeline.run_all();
    assert!(summary.failures.is_empty(), "falhas: {:?}", summary.failures);
    assert_eq!(summary.corpora.len(), 3);

    let (name, news) = &summary.corpora[0];
    assert_eq!(name, "news");
    assert_eq!(news.len(), 2);
    assert!(news.iter().all(|r| r.metrics.is_some()));
    // O texto restaurado não tem espaços: uma única palavra
    assert_eq!(news[1].token_count, 1);

    let (_, reviews) = &summary.corpora[1];
    assert!(reviews[1].metrics.is_none());
    assert_eq!(reviews[1].special_cases.isolated_punctuation, 2);

    let (_, bilibili) = &summary.corpora[2];
    assert_eq!(bilibili[1].special_cases.mixed_alphanumeric, 1);
}

#[test]
fn test_streaming_events_serialize_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let annotated = dir.path().join("news_a.txt");
    fs::write(&annotated, SAMPLE_TAGGED_CORPUS).unwrap();

    let mut config = EvalConfig::under(dir.path());
    config.tools = vec!["char_level".to_string()];
    let pipeline = EvalPipeline::from_config(config).unwrap();

    let (tx, rx) = mpsc::channel();
    pipeline.prepare_streaming(&annotated, &tx).unwrap();
    pipeline.evaluate_streaming(&pipeline.config.news_pair(), tx);

    let events: Vec<EvalEvent> = rx.iter().collect();
    let types: Vec<String> = events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        types,
        vec!["CorpusNormalized", "TextRestored", "PlainLoaded", "GoldParsed", "SegmenterFinished", "Done"]
    );
}
