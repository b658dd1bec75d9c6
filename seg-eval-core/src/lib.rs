//! # seg-eval-core — Avaliação de Segmentadores de Palavras do Chinês
//!
//! Este crate compara segmentadores de palavras do chinês contra um corpus de notícias
//! anotado no formato PKU 1998 (`palavra/etiqueta`), medindo acerto, velocidade e o
//! perfil estatístico da saída de cada ferramenta.
//!
//! ## Arquitetura do Sistema
//!
//! O fluxo é um pipeline linear, executado um corpus por vez:
//!
//! 1.  **Normalização** ([`normalizer`]): o corpus anotado é truncado e reescrito na forma
//!     canônica (um token por linha, nomes e datas fundidos, numerais e pontuação removidos).
//! 2.  **Restauração** ([`restorer`]): as marcações são removidas, gerando o texto corrido
//!     que os segmentadores recebem.
//! 3.  **Padrão-ouro** ([`annotation`]): a sequência de palavras de referência.
//! 4.  **Segmentação** ([`segmenter`]): cada ferramenta registrada é executada e cronometrada.
//! 5.  **Limpeza** ([`cleaner`]): etiquetas e regiões entre símbolos pareados são descartadas.
//! 6.  **Pontuação** ([`metrics`], [`statistics`]): métricas por palavra e por caractere,
//!     granularidade, diversidade do vocabulário e casos especiais.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seg_eval_core::{evaluate_segmentation, parse_annotated_text, CorpusNormalizer};
//!
//! // 1. Forma canônica do corpus anotado
//! let canonical = CorpusNormalizer::default().normalize("北京/ns  大学/n  。/w");
//!
//! // 2. Padrão-ouro
//! let gold = parse_annotated_text(&canonical);
//! assert_eq!(gold, vec!["北京", "大学"]);
//!
//! // 3. Compara com a saída de um segmentador
//! let report = evaluate_segmentation(&["北京大学"], &gold);
//! println!("F1 (palavra): {:.4}", report.word_level.f_score);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios e emite eventos.
//! - [`config`]: Caminhos, limites e ferramentas de uma execução.
//! - [`corpus`]: Leitura/escrita de corpora e um trecho de demonstração.

pub mod annotation;
pub mod cleaner;
pub mod config;
pub mod corpus;
pub mod encoding;
pub mod error;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod restorer;
pub mod segmenter;
pub mod statistics;

pub use annotation::parse_annotated_text;
pub use cleaner::clean_segmentation_result;
pub use config::{CorpusPair, EvalConfig};
pub use error::{EvalError, Result};
pub use metrics::{evaluate_segmentation, LevelScores, MetricsReport};
pub use normalizer::CorpusNormalizer;
pub use pipeline::{EvalEvent, EvalPipeline, RunSummary, ToolReport};
pub use restorer::TextRestorer;
pub use segmenter::{Segmenter, SegmenterRegistry};
pub use statistics::{check_special_cases, evaluate_statistics, StatisticsReport};
