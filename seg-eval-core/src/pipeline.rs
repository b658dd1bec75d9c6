//! # Pipeline de Avaliação
//!
//! Orquestra o fluxo completo para um corpus:
//!
//! 1. **Preparação** ([`EvalPipeline::prepare`]): normaliza o corpus anotado
//!    (sobrescrevendo-o) e grava o texto puro derivado.
//! 2. **Padrão-ouro**: extrai a sequência de palavras do corpus canônico.
//! 3. **Segmentação**: cada segmentador configurado recebe o texto puro
//!    (limitado a `max_plain_chars`) e é cronometrado.
//! 4. **Pontuação**: limpeza da saída, métricas contra o ouro, estatísticas e
//!    casos especiais.
//!
//! Cada passo emite um [`EvalEvent`] num canal `mpsc`, permitindo acompanhar o
//! progresso enquanto a avaliação corre. Tudo é síncrono: um corpus termina
//! antes do próximo começar.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use seg_eval_core::{EvalConfig, EvalPipeline};
//!
//! let mut config = EvalConfig::under("data");
//! config.tools = vec!["char_level".to_string()];
//!
//! let pipeline = EvalPipeline::from_config(config).unwrap();
//! let pair = pipeline.config.news_pair();
//! pipeline.prepare(&pair.annotated).unwrap();
//! for report in pipeline.evaluate(&pair).unwrap() {
//!     println!("{}: F1 = {:.4}", report.tool, report.metrics.unwrap().word_level.f_score);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::annotation::parse_annotated_text;
use crate::cleaner::clean_segmentation_result;
use crate::config::{CorpusPair, EvalConfig};
use crate::corpus::{Corpus, TokenSequence};
use crate::encoding::{candidate_chain, TextEncoding};
use crate::error::Result;
use crate::metrics::{evaluate_segmentation, MetricsReport};
use crate::normalizer::{truncate_chars, CorpusNormalizer, NormalizeSummary};
use crate::restorer::{RestoreSummary, TextRestorer};
use crate::segmenter::{load_dictionary, timed_segment, Segmenter, SegmenterRegistry};
use crate::statistics::{evaluate_statistics, SpecialCaseReport, StatisticsReport};

/// Tokens exibidos na prévia de cada relatório.
pub const PREVIEW_TOKENS: usize = 25;

/// Resultado de um segmentador sobre um corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolReport {
    pub tool: String,
    pub elapsed_ms: u64,
    pub chars_per_second: f64,
    /// Mesma vazão em 万字/s.
    pub wan_chars_per_second: f64,
    /// Tokens após a limpeza.
    pub token_count: usize,
    /// Ausente para corpora sem padrão-ouro.
    pub metrics: Option<MetricsReport>,
    pub statistics: StatisticsReport,
    pub special_cases: SpecialCaseReport,
    /// Primeiros tokens da saída limpa.
    pub preview: Vec<String>,
}

/// Eventos emitidos durante a avaliação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EvalEvent {
    /// Corpus anotado reescrito na forma canônica.
    CorpusNormalized { summary: NormalizeSummary },
    /// Texto puro gravado ao lado do corpus canônico.
    TextRestored { summary: RestoreSummary },
    /// Texto puro lido e truncado; é o que os segmentadores recebem.
    PlainLoaded {
        corpus: String,
        chars: usize,
        encoding: String,
    },
    /// Padrão-ouro extraído.
    GoldParsed {
        corpus: String,
        total: usize,
        preview: Vec<String>,
    },
    /// Um segmentador terminou e foi pontuado.
    SegmenterFinished { corpus: String, report: ToolReport },
    /// O corpus foi abandonado; os demais seguem.
    Failed { corpus: String, message: String },
    /// Todos os segmentadores terminaram.
    Done {
        corpus: String,
        reports: Vec<ToolReport>,
        processing_ms: u64,
    },
}

/// Resultado de [`EvalPipeline::run_all`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Relatórios por corpus, na ordem de execução.
    pub corpora: Vec<(String, Vec<ToolReport>)>,
    /// Corpora que falharam, com a mensagem de erro.
    pub failures: Vec<(String, String)>,
}

/// O avaliador.
///
/// Os campos são públicos para que o chamador registre segmentadores externos
/// em `registry` antes de avaliar.
pub struct EvalPipeline {
    pub config: EvalConfig,
    pub registry: SegmenterRegistry,
    normalizer: CorpusNormalizer,
    restorer: TextRestorer,
    candidates: Vec<TextEncoding>,
}

impl EvalPipeline {
    pub fn new(config: EvalConfig, registry: SegmenterRegistry) -> Self {
        Self {
            normalizer: CorpusNormalizer::from_config(&config),
            restorer: TextRestorer::from_config(&config),
            candidates: candidate_chain(config.encoding_hint.as_deref()),
            config,
            registry,
        }
    }

    /// Valida a configuração e registra os segmentadores de referência,
    /// carregando o dicionário de usuário se houver.
    pub fn from_config(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        let vocabulary = config.custom_dict.as_deref().map(load_dictionary).transpose()?;
        let registry = SegmenterRegistry::with_baselines(vocabulary);
        Ok(Self::new(config, registry))
    }

    /// Normaliza o corpus anotado e grava o texto puro derivado.
    pub fn prepare(&self, annotated: impl AsRef<Path>) -> Result<(NormalizeSummary, RestoreSummary)> {
        let (tx, _rx) = mpsc::channel();
        self.prepare_streaming(annotated.as_ref(), &tx)
    }

    /// Como [`prepare`](Self::prepare), emitindo `CorpusNormalized` e `TextRestored`.
    pub fn prepare_streaming(
        &self,
        annotated: &Path,
        tx: &mpsc::Sender<EvalEvent>,
    ) -> Result<(NormalizeSummary, RestoreSummary)> {
        let normalized = self.normalizer.normalize_file(annotated)?;
        let _ = tx.send(EvalEvent::CorpusNormalized {
            summary: normalized.clone(),
        });

        let restored = self.restorer.restore_file(annotated)?;
        let _ = tx.send(EvalEvent::TextRestored {
            summary: restored.clone(),
        });
        Ok((normalized, restored))
    }

    /// Lê o texto puro com a cadeia de codificações e aplica o limite de caracteres.
    pub fn load_plain(&self, path: impl AsRef<Path>) -> Result<Corpus> {
        let mut corpus = Corpus::load(path, &self.candidates)?;
        let limit = self.config.limits.max_plain_chars;
        if corpus.char_count() > limit {
            corpus.text = truncate_chars(&corpus.text, limit).to_string();
        }
        Ok(corpus)
    }

    /// Lê o corpus canônico e extrai o padrão-ouro.
    pub fn load_gold(&self, annotated: impl AsRef<Path>) -> Result<TokenSequence> {
        let corpus = Corpus::load(annotated, &self.candidates)?;
        Ok(parse_annotated_text(&corpus.text))
    }

    /// Resolve todos os segmentadores configurados antes de executar qualquer um.
    fn resolve_tools(&self) -> Result<Vec<&dyn Segmenter>> {
        self.config.tools.iter().map(|name| self.registry.get(name)).collect()
    }

    /// Executa e pontua um segmentador.
    pub fn evaluate_tool(&self, segmenter: &dyn Segmenter, plain: &str, gold: Option<&[String]>) -> ToolReport {
        let chars = plain.chars().count();
        let timed = timed_segment(segmenter, plain);
        let candidate = clean_segmentation_result(&timed.output);

        ToolReport {
            tool: segmenter.name().to_string(),
            elapsed_ms: timed.elapsed.as_millis() as u64,
            chars_per_second: timed.chars_per_second(chars),
            wan_chars_per_second: timed.wan_chars_per_second(chars),
            token_count: candidate.len(),
            metrics: gold.map(|gold| evaluate_segmentation(&candidate, gold)),
            statistics: evaluate_statistics(&candidate),
            special_cases: SpecialCaseReport::from_tokens(&candidate),
            preview: candidate.iter().take(PREVIEW_TOKENS).cloned().collect(),
        }
    }

    /// Avalia um par (ouro, texto puro). O corpus anotado já deve estar preparado.
    pub fn evaluate(&self, pair: &CorpusPair) -> Result<Vec<ToolReport>> {
        let (tx, _rx) = mpsc::channel();
        self.run_corpus(&pair.name, Some(&pair.annotated), &pair.plain, &tx)
    }

    /// Avalia um corpus sem padrão-ouro: só estatísticas e casos especiais.
    pub fn evaluate_unlabeled(&self, name: &str, plain: impl AsRef<Path>) -> Result<Vec<ToolReport>> {
        let (tx, _rx) = mpsc::channel();
        self.run_corpus(name, None, plain.as_ref(), &tx)
    }

    /// Como [`evaluate`](Self::evaluate), emitindo eventos.
    ///
    /// Sequência: `PlainLoaded`, `GoldParsed`, `SegmenterFinished` (um por
    /// ferramenta) e `Done`. Qualquer erro vira um único `Failed`.
    pub fn evaluate_streaming(&self, pair: &CorpusPair, tx: mpsc::Sender<EvalEvent>) {
        if let Err(e) = self.run_corpus(&pair.name, Some(&pair.annotated), &pair.plain, &tx) {
            error!("avaliação de {} interrompida: {e}", pair.name);
            let _ = tx.send(EvalEvent::Failed {
                corpus: pair.name.clone(),
                message: e.to_string(),
            });
        }
    }

    fn run_corpus(
        &self,
        name: &str,
        annotated: Option<&Path>,
        plain: &Path,
        tx: &mpsc::Sender<EvalEvent>,
    ) -> Result<Vec<ToolReport>> {
        let start = Instant::now();
        let tools = self.resolve_tools()?;

        let plain = self.load_plain(plain)?;
        let _ = tx.send(EvalEvent::PlainLoaded {
            corpus: name.to_string(),
            chars: plain.char_count(),
            encoding: plain.encoding.name().to_string(),
        });

        let gold = match annotated {
            Some(path) => {
                let gold = self.load_gold(path)?;
                info!("{name}: padrão-ouro com {} palavras", gold.len());
                let _ = tx.send(EvalEvent::GoldParsed {
                    corpus: name.to_string(),
                    total: gold.len(),
                    preview: gold.iter().take(PREVIEW_TOKENS).cloned().collect(),
                });
                Some(gold)
            }
            None => None,
        };

        let mut reports = Vec::with_capacity(tools.len());
        for segmenter in tools {
            let report = self.evaluate_tool(segmenter, &plain.text, gold.as_deref());
            let _ = tx.send(EvalEvent::SegmenterFinished {
                corpus: name.to_string(),
                report: report.clone(),
            });
            reports.push(report);
        }

        let _ = tx.send(EvalEvent::Done {
            corpus: name.to_string(),
            reports: reports.clone(),
            processing_ms: start.elapsed().as_millis() as u64,
        });
        Ok(reports)
    }

    /// Prepara e avalia as notícias, depois avalia os corpora de comentários.
    ///
    /// Uma falha encerra apenas o corpus afetado.
    pub fn run_all(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        let news = self.config.news_pair();
        let news_result = self.prepare(&news.annotated).and_then(|(_, restored)| {
            if restored.restored != news.plain {
                warn!(
                    "texto restaurado em {} difere do configurado {}",
                    restored.restored.display(),
                    news.plain.display()
                );
            }
            self.evaluate(&news)
        });
        record(&mut summary, &news.name, news_result);

        let reviews: [(&str, &PathBuf); 2] = [
            ("ecommerce_reviews", &self.config.paths.ecommerce_reviews),
            ("bilibili_reviews", &self.config.paths.bilibili_reviews),
        ];
        for (name, path) in reviews {
            record(&mut summary, name, self.evaluate_unlabeled(name, path));
        }

        summary
    }
}

fn record(summary: &mut RunSummary, corpus: &str, result: Result<Vec<ToolReport>>) {
    match result {
        Ok(reports) => summary.corpora.push((corpus.to_string(), reports)),
        Err(e) => {
            error!("corpus {corpus} ignorado: {e}");
            summary.failures.push((corpus.to_string(), e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SAMPLE_TAGGED_CORPUS;
    use crate::error::EvalError;
    use std::fs;

    /// Segmentador que devolve o padrão-ouro etiquetado, para obter métricas perfeitas.
    struct Oracle(Vec<String>);

    impl Segmenter for Oracle {
        fn name(&self) -> &str {
            "oracle"
        }

        fn segment(&self, _text: &str) -> Vec<String> {
            self.0.iter().map(|w| format!("{w}/x")).collect()
        }
    }

    fn setup(tools: &[&str]) -> (tempfile::TempDir, EvalPipeline) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("news_a.txt"), SAMPLE_TAGGED_CORPUS).unwrap();

        let mut config = EvalConfig::under(dir.path());
        config.tools = tools.iter().map(|t| t.to_string()).collect();
        let pipeline = EvalPipeline::from_config(config).unwrap();
        (dir, pipeline)
    }

    #[test]
    fn test_prepare_writes_canonical_and_plain() {
        let (dir, pipeline) = setup(&["char_level"]);
        let (normalized, restored) = pipeline.prepare(dir.path().join("news_a.txt")).unwrap();

        assert_eq!(normalized.output_tokens, 26);
        assert_eq!(restored.restored, dir.path().join("news_o.txt"));

        let plain = fs::read_to_string(&restored.restored).unwrap();
        assert!(plain.contains("江泽民1997年12月"));
        assert!(!plain.contains('/'));
    }

    #[test]
    fn test_evaluate_with_oracle_is_perfect() {
        let (dir, mut pipeline) = setup(&["oracle"]);
        pipeline.prepare(dir.path().join("news_a.txt")).unwrap();

        let pair = pipeline.config.news_pair();
        let gold = pipeline.load_gold(&pair.annotated).unwrap();
        pipeline.registry.register(Oracle(gold.clone()));

        let reports = pipeline.evaluate(&pair).unwrap();
        assert_eq!(reports.len(), 1);

        let metrics = reports[0].metrics.unwrap();
        assert_eq!(metrics.word_level.precision, 1.0);
        assert_eq!(metrics.word_level.recall, 1.0);
        assert_eq!(metrics.length_difference, 0);
        assert_eq!(reports[0].token_count, gold.len());
        assert_eq!(reports[0].preview.len(), PREVIEW_TOKENS);
    }

    #[test]
    fn test_char_level_scores_perfect_char_precision() {
        let (dir, pipeline) = setup(&["char_level"]);
        pipeline.prepare(dir.path().join("news_a.txt")).unwrap();

        let reports = pipeline.evaluate(&pipeline.config.news_pair()).unwrap();
        let metrics = reports[0].metrics.unwrap();
        assert!(metrics.char_level.precision > 0.0);
        assert!(metrics.word_level.precision > 0.0);
        assert_eq!(reports[0].statistics.average_token_length, 1.0);
    }

    #[test]
    fn test_unknown_tool_fails_fast() {
        let (dir, pipeline) = setup(&["char_level", "thulac"]);
        pipeline.prepare(dir.path().join("news_a.txt")).unwrap();

        let err = pipeline.evaluate(&pipeline.config.news_pair()).unwrap_err();
        assert!(matches!(err, EvalError::UnknownSegmenter(name) if name == "thulac"));
    }

    #[test]
    fn test_streaming_event_order() {
        let (dir, pipeline) = setup(&["char_level"]);
        pipeline.prepare(dir.path().join("news_a.txt")).unwrap();

        let (tx, rx) = mpsc::channel();
        pipeline.evaluate_streaming(&pipeline.config.news_pair(), tx);
        let events: Vec<EvalEvent> = rx.try_iter().collect();

        assert!(matches!(&events[0], EvalEvent::PlainLoaded { .. }));
        assert!(matches!(&events[1], EvalEvent::GoldParsed { total: 26, .. }));
        assert!(matches!(&events[2], EvalEvent::SegmenterFinished { .. }));
        assert!(matches!(events.last().unwrap(), EvalEvent::Done { .. }));
    }

    #[test]
    fn test_prepare_streaming_events() {
        let (dir, pipeline) = setup(&["char_level"]);
        let (tx, rx) = mpsc::channel();
        pipeline.prepare_streaming(&dir.path().join("news_a.txt"), &tx).unwrap();
        drop(tx);

        let events: Vec<EvalEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], EvalEvent::CorpusNormalized { summary } if summary.output_tokens == 26));
        assert!(matches!(&events[1], EvalEvent::TextRestored { .. }));
    }

    #[test]
    fn test_streaming_reports_failure() {
        let (_dir, pipeline) = setup(&["char_level"]);
        // Sem `prepare`, o texto puro não existe
        let (tx, rx) = mpsc::channel();
        pipeline.evaluate_streaming(&pipeline.config.news_pair(), tx);
        let events: Vec<EvalEvent> = rx.try_iter().collect();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], EvalEvent::Failed { corpus, .. } if corpus == "news"));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = EvalEvent::Failed {
            corpus: "news".to_string(),
            message: "x".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Failed");
        assert_eq!(json["data"]["corpus"], "news");
    }

    #[test]
    fn test_plain_text_limit() {
        let (dir, mut pipeline) = setup(&["char_level"]);
        pipeline.config.limits.max_plain_chars = 5;
        let path = dir.path().join("reviews.txt");
        fs::write(&path, "质量很好，物流很快").unwrap();

        let reports = pipeline.evaluate_unlabeled("reviews", &path).unwrap();
        assert_eq!(reports[0].token_count, 5);
        assert!(reports[0].metrics.is_none());
        assert_eq!(reports[0].special_cases.isolated_punctuation, 1);
    }

    #[test]
    fn test_run_all_continues_after_failures() {
        let (dir, pipeline) = setup(&["char_level"]);
        fs::write(dir.path().join("dianshang_reviews.txt"), "质量很好").unwrap();

        let summary = pipeline.run_all();
        let names: Vec<&str> = summary.corpora.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["news", "ecommerce_reviews"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "bilibili_reviews");
    }

    #[test]
    fn test_run_all_continues_after_news_preparation_fails() {
        let (dir, mut pipeline) = setup(&["char_level"]);
        let unmarked = dir.path().join("news.txt");
        fs::write(&unmarked, SAMPLE_TAGGED_CORPUS).unwrap();
        pipeline.config.paths.news_annotated = unmarked;
        fs::write(dir.path().join("dianshang_reviews.txt"), "质量很好").unwrap();
        fs::write(dir.path().join("bilbil_reviews.txt"), "弹幕").unwrap();

        let summary = pipeline.run_all();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "news");
        assert!(summary.failures[0].1.contains("_a."));

        let names: Vec<&str> = summary.corpora.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ecommerce_reviews", "bilibili_reviews"]);
    }

    #[test]
    fn test_custom_dictionary_registers_max_match() {
        let dir = tempfile::tempdir().unwrap();
        let dict = dir.path().join("dict.txt");
        fs::write(&dict, "中央电视台\n播发\n").unwrap();

        let mut config = EvalConfig::under(dir.path());
        config.custom_dict = Some(dict);
        config.tools = vec!["max_match".to_string()];
        let pipeline = EvalPipeline::from_config(config).unwrap();

        let plain = dir.path().join("p.txt");
        fs::write(&plain, "中央电视台播发了").unwrap();
        let reports = pipeline.evaluate_unlabeled("p", &plain).unwrap();
        assert_eq!(reports[0].preview, vec!["中央电视台", "播发", "了"]);
    }
}
