//! # Configuração da Avaliação
//!
//! Todos os componentes recebem a configuração explicitamente. Os corpora são
//! nomeados pelo papel que cumprem (notícias anotadas, notícias em texto puro,
//! avaliações de e-commerce, comentários do bilibili), em vez de ficarem num
//! dicionário indexado por string.
//!
//! ## Exemplo
//!
//! ```rust
//! use seg_eval_core::config::EvalConfig;
//!
//! let config = EvalConfig::under("data");
//! assert_eq!(config.limits.max_corpus_chars, 100_000);
//! assert!(config.paths.news_annotated.ends_with("news_a.txt"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Caminhos dos corpora, um campo por papel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusPaths {
    /// Corpus de notícias anotado (`surface/tag`), usado como padrão-ouro.
    pub news_annotated: PathBuf,
    /// Texto puro derivado do corpus de notícias (entrada dos segmentadores).
    pub news_plain: PathBuf,
    /// Avaliações de produtos de e-commerce.
    pub ecommerce_reviews: PathBuf,
    /// Comentários do bilibili.
    pub bilibili_reviews: PathBuf,
}

impl CorpusPaths {
    /// Layout padrão dentro de um diretório de dados.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            news_annotated: dir.join("news_a.txt"),
            news_plain: dir.join("news_o.txt"),
            ecommerce_reviews: dir.join("dianshang_reviews.txt"),
            bilibili_reviews: dir.join("bilbil_reviews.txt"),
        }
    }
}

impl Default for CorpusPaths {
    fn default() -> Self {
        Self::under("data")
    }
}

/// Par (corpus anotado, texto puro) a ser avaliado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusPair {
    /// Nome legível para logs e relatórios.
    pub name: String,
    pub annotated: PathBuf,
    pub plain: PathBuf,
}

/// Limites de tamanho aplicados ao ler os corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Orçamento de caracteres do corpus anotado (passo 1 da normalização).
    pub max_corpus_chars: usize,
    /// Caracteres do texto puro entregues a cada segmentador.
    pub max_plain_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_corpus_chars: 100_000,
            max_plain_chars: 90_000,
        }
    }
}

/// Marcadores de sufixo usados para derivar o caminho do texto restaurado.
///
/// `news_a.txt` → `news_o.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixMarkers {
    pub annotated: String,
    pub restored: String,
}

impl Default for SuffixMarkers {
    fn default() -> Self {
        Self {
            annotated: "_a.".to_string(),
            restored: "_o.".to_string(),
        }
    }
}

/// Configuração completa de uma execução.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub paths: CorpusPaths,
    /// Dicionário de usuário no formato do jieba (uma palavra por linha).
    pub custom_dict: Option<PathBuf>,
    pub limits: Limits,
    pub markers: SuffixMarkers,
    /// Segmentadores avaliados, na ordem em que aparecem no relatório.
    pub tools: Vec<String>,
    /// Codificação detectada externamente (rótulo WHATWG, ex: "gb18030").
    /// É a primeira candidata da cadeia de decodificação.
    pub encoding_hint: Option<String>,
}

impl EvalConfig {
    /// Configuração padrão com os corpora dentro de `data_dir`.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        Self {
            paths: CorpusPaths::under(data_dir),
            ..Self::default()
        }
    }

    /// Lê a configuração de um arquivo JSON. Campos ausentes assumem o padrão.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        let config: EvalConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Verifica invariantes simples da configuração.
    pub fn validate(&self) -> Result<()> {
        if self.markers.annotated.is_empty() {
            return Err(EvalError::config("o marcador do arquivo anotado está vazio"));
        }
        if self.markers.annotated == self.markers.restored {
            return Err(EvalError::config(
                "os marcadores anotado e restaurado são iguais; o corpus seria sobrescrito",
            ));
        }
        if self.limits.max_corpus_chars == 0 {
            return Err(EvalError::config("max_corpus_chars deve ser positivo"));
        }
        Ok(())
    }

    /// O par de notícias (anotado + texto puro), o único com padrão-ouro.
    pub fn news_pair(&self) -> CorpusPair {
        CorpusPair {
            name: "news".to_string(),
            annotated: self.paths.news_annotated.clone(),
            plain: self.paths.news_plain.clone(),
        }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            paths: CorpusPaths::default(),
            custom_dict: None,
            limits: Limits::default(),
            markers: SuffixMarkers::default(),
            tools: ["jieba", "pkuseg_news", "thulac", "hanlp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            encoding_hint: None,
        }
    }
}
