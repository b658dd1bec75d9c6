//! # Segmentadores
//!
//! Contrato comum dos segmentadores avaliados, o registro que resolve os nomes
//! configurados e dois segmentadores de referência que não dependem de
//! ferramentas externas:
//!
//! - [`CharLevelSegmenter`]: um token por caractere (limite inferior de granularidade).
//! - [`MaxMatchSegmenter`]: casamento máximo para frente sobre um dicionário.
//!
//! Ferramentas externas (jieba, pkuseg, thulac, hanlp) entram implementando
//! [`Segmenter`] e sendo registradas com o nome usado na configuração.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seg_eval_core::segmenter::{MaxMatchSegmenter, Segmenter};
//!
//! let seg = MaxMatchSegmenter::from_vocabulary(["北京", "北京大学", "学生"]);
//! assert_eq!(seg.segment("北京大学生"), vec!["北京大学", "生"]);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::corpus::surface_of;
use crate::error::{EvalError, Result};

/// Um segmentador de texto chinês.
///
/// Os tokens devolvidos podem vir etiquetados (`词/n`); a limpeza acontece depois.
pub trait Segmenter {
    /// Identificador usado na configuração e nos relatórios.
    fn name(&self) -> &str;

    fn segment(&self, text: &str) -> Vec<String>;
}

/// Segmentadores disponíveis, indexados pelo nome.
#[derive(Default)]
pub struct SegmenterRegistry {
    segmenters: BTreeMap<String, Box<dyn Segmenter>>,
}

impl SegmenterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro com os segmentadores de referência.
    ///
    /// Se houver vocabulário, o casamento máximo também é registrado.
    pub fn with_baselines(vocabulary: Option<HashSet<String>>) -> Self {
        let mut registry = Self::new();
        registry.register(CharLevelSegmenter);
        if let Some(words) = vocabulary {
            registry.register(MaxMatchSegmenter::new(words));
        }
        registry
    }

    /// Registra um segmentador. Um nome repetido substitui o anterior.
    pub fn register<S: Segmenter + 'static>(&mut self, segmenter: S) {
        let name = segmenter.name().to_string();
        if self.segmenters.insert(name.clone(), Box::new(segmenter)).is_some() {
            debug!("segmentador substituído: {name}");
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Segmenter> {
        self.segmenters
            .get(name)
            .map(|s| &**s)
            .ok_or_else(|| EvalError::UnknownSegmenter(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segmenters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segmenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segmenters.is_empty()
    }
}

/// Resultado de uma chamada cronometrada.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub elapsed: Duration,
    pub output: T,
}

impl<T> Timed<T> {
    pub fn measure(f: impl FnOnce() -> T) -> Self {
        let start = Instant::now();
        let output = f();
        Self {
            elapsed: start.elapsed(),
            output,
        }
    }

    /// Vazão em caracteres por segundo (0 se o tempo medido for nulo).
    pub fn chars_per_second(&self, chars: usize) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            chars as f64 / secs
        } else {
            0.0
        }
    }

    /// Vazão em 万字/s (dezenas de milhares de caracteres por segundo).
    pub fn wan_chars_per_second(&self, chars: usize) -> f64 {
        self.chars_per_second(chars) / 10_000.0
    }
}

/// Executa o segmentador cronometrando apenas a segmentação.
pub fn timed_segment(segmenter: &dyn Segmenter, text: &str) -> Timed<Vec<String>> {
    let timed = Timed::measure(|| segmenter.segment(text));
    info!(
        "{}: {} tokens em {:.3}s ({:.2} 万字/s)",
        segmenter.name(),
        timed.output.len(),
        timed.elapsed.as_secs_f64(),
        timed.wan_chars_per_second(text.chars().count())
    );
    timed
}

/// Um token por caractere, ignorando espaços.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharLevelSegmenter;

impl Segmenter for CharLevelSegmenter {
    fn name(&self) -> &str {
        "char_level"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string())
            .collect()
    }
}

/// Casamento máximo para frente (forward maximum matching).
///
/// Em cada posição tenta a palavra mais longa do dicionário; sem casamento,
/// emite um único caractere.
#[derive(Debug, Clone, Default)]
pub struct MaxMatchSegmenter {
    words: HashSet<String>,
    /// Comprimento da maior palavra, em caracteres.
    max_word_len: usize,
}

impl MaxMatchSegmenter {
    pub fn new(words: HashSet<String>) -> Self {
        let max_word_len = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
        Self { words, max_word_len }
    }

    pub fn from_vocabulary<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words.into_iter().map(Into::into).filter(|w: &String| !w.is_empty()).collect())
    }

    pub fn from_dictionary_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_dictionary(path)?))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }
}

impl Segmenter for MaxMatchSegmenter {
    fn name(&self) -> &str {
        "max_match"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_word_len.min(chars.len() - i);
            let mut best_len = 1;
            for window in (2..=longest).rev() {
                let candidate: String = chars[i..i + window].iter().collect();
                if self.words.contains(&candidate) {
                    best_len = window;
                    break;
                }
            }
            tokens.push(chars[i..i + best_len].iter().collect());
            i += best_len;
        }
        tokens
    }
}

/// Lê um dicionário de usuário no formato do jieba: `palavra [freq] [etiqueta]`.
///
/// Só o primeiro campo importa; linhas vazias e comentários (`#`) são ignorados.
/// Entradas etiquetadas (`词/n`) também são aceitas.
pub fn load_dictionary(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;

    let words: HashSet<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(|field| surface_of(field.trim_start_matches('\u{feff}')).to_string())
        .filter(|word| !word.is_empty())
        .collect();

    info!("dicionário carregado: {} ({} palavras)", path.display(), words.len());
    Ok(words)
}
