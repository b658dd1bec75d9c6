//! # Normalização do Corpus Anotado
//!
//! Converte o corpus bruto (formato PKU) numa forma canônica: um token
//! `superfície/etiqueta` por linha, sem numerais nem pontuação.
//!
//! ## Etapas (ordem fixa)
//!
//! 1. **Truncagem** no orçamento de caracteres.
//! 2. [`NormalizePass::MergeSplitNames`]: `江/nrf 泽民/nrg` → `江泽民/nr`.
//! 3. [`NormalizePass::MergeBracketGroups`]: `[中央/n 人民/n]nt` → `中央人民/nt`.
//! 4. [`NormalizePass::MergeDates`]: `1997年/t 12月/t` → `1997年12月/t`.
//! 5. [`NormalizePass::FoldFullWidthDigits`]: `１２` → `12`.
//! 6. [`NormalizePass::Resplit`]: um token por linha.
//! 7. [`NormalizePass::DropFillerTokens`]: remove `…/m` e `…/w`.
//!
//! Cada passo opera sobre uma lista de [`Piece`]s (tokens separados por espaço
//! com o número da linha de origem) e pode ser testado isoladamente. A linha só
//! importa para os grupos entre colchetes, que nunca atravessam quebras de linha.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seg_eval_core::normalizer::CorpusNormalizer;
//!
//! let normalizer = CorpusNormalizer::default();
//! let canonical = normalizer.normalize("江/nrf  泽民/nrg  ，/w  [中央/n  电视台/n]nt");
//! assert_eq!(canonical, "江泽民/nr\n中央电视台/nt");
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EvalConfig;
use crate::corpus::{surface_of, Corpus, TaggedToken};
use crate::encoding::{candidate_chain, TextEncoding};
use crate::error::Result;

/// Um token bruto (sem espaços) e a linha em que apareceu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    pub line: usize,
}

impl Piece {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

/// Passos de reescrita aplicados depois da truncagem, na ordem de [`NormalizePass::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizePass {
    /// Junta sobrenome (`nrf`) e nome (`nrg`) num único token `nr`.
    MergeSplitNames,
    /// Colapsa `[t1 t2 … tN]TAG` num token com a etiqueta externa.
    MergeBracketGroups,
    /// Junta `<dígitos>年/t` seguido de `<dígitos>月/t`.
    MergeDates,
    /// Dígitos de largura total (U+FF10–U+FF19) viram ASCII.
    FoldFullWidthDigits,
    /// Re-divide por espaços: um token por linha.
    Resplit,
    /// Remove numerais (`/m`) e pontuação (`/w`).
    DropFillerTokens,
}

impl NormalizePass {
    pub const ALL: [NormalizePass; 6] = [
        NormalizePass::MergeSplitNames,
        NormalizePass::MergeBracketGroups,
        NormalizePass::MergeDates,
        NormalizePass::FoldFullWidthDigits,
        NormalizePass::Resplit,
        NormalizePass::DropFillerTokens,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NormalizePass::MergeSplitNames => "merge_split_names",
            NormalizePass::MergeBracketGroups => "merge_bracket_groups",
            NormalizePass::MergeDates => "merge_dates",
            NormalizePass::FoldFullWidthDigits => "fold_full_width_digits",
            NormalizePass::Resplit => "resplit",
            NormalizePass::DropFillerTokens => "drop_filler_tokens",
        }
    }

    pub fn apply(&self, pieces: Vec<Piece>) -> Vec<Piece> {
        match self {
            NormalizePass::MergeSplitNames => merge_split_names(pieces),
            NormalizePass::MergeBracketGroups => merge_bracket_groups(pieces),
            NormalizePass::MergeDates => merge_dates(pieces),
            NormalizePass::FoldFullWidthDigits => fold_full_width_digits(pieces),
            NormalizePass::Resplit => resplit(pieces),
            NormalizePass::DropFillerTokens => drop_filler_tokens(pieces),
        }
    }
}

fn family_surface_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Prefixo não-palavra (ex: "[") fica fora do sobrenome
    RE.get_or_init(|| Regex::new(r"^(?s)(.*?)(\w+)$").expect("regex sobrenome"))
}

fn given_surface_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+$").expect("regex nome"))
}

fn given_tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // O que vem depois de "nrg" (ex: "]nt") sobrevive à fusão
    RE.get_or_init(|| Regex::new(r"^(?s)nrg((?:\W.*)?)$").expect("regex etiqueta nrg"))
}

fn year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+年$").expect("regex ano"))
}

fn month_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+月$").expect("regex mês"))
}

fn bracket_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Preguiçoso: fecha no primeiro "]" seguido de caractere de palavra
    RE.get_or_init(|| Regex::new(r"\[(.*?)\](\w+)").expect("regex colchetes"))
}

/// Corta o texto nos primeiros `max_chars` caracteres.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Divide o texto em [`Piece`]s, preservando o número da linha.
pub fn split_pieces(text: &str) -> Vec<Piece> {
    text.split('\n')
        .enumerate()
        .flat_map(|(line, content)| content.split_whitespace().map(move |t| Piece::new(t, line)))
        .collect()
}

/// Uma forma canônica: um token por linha.
pub fn render(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Funde `X/nrf` + `Y/nrg` num [`TaggedToken`] `XY/nr`, preservando prefixo e sufixo.
fn merge_name_pair(family: &Piece, given: &Piece) -> Option<String> {
    let family = TaggedToken::parse(&family.text).filter(|t| t.tag == "nrf")?;
    let given = TaggedToken::parse(&given.text)?;

    let parts = family_surface_pattern().captures(&family.surface)?;
    let suffix = given_tag_pattern().captures(&given.tag)?;
    if !given_surface_pattern().is_match(&given.surface) {
        return None;
    }

    let merged = TaggedToken::new(format!("{}{}", &parts[2], given.surface), format!("nr{}", &suffix[1]));
    Some(format!("{}{}", &parts[1], merged))
}

/// `X/nrf` seguido de `Y/nrg` vira `XY/nr`, inclusive através de quebras de linha.
///
/// Uma fusão entre linhas une as duas: o resto da linha do `nrg` passa para a
/// linha do `nrf`, e os grupos entre colchetes continuam visíveis no passo seguinte.
fn merge_split_names(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged = Vec::with_capacity(pieces.len());
    // (linha absorvida, linha que a absorveu)
    let mut absorbed: Option<(usize, usize)> = None;
    let relocate = |line: usize, absorbed: Option<(usize, usize)>| match absorbed {
        Some((from, to)) if line == from => to,
        _ => line,
    };

    let mut iter = pieces.into_iter().peekable();
    while let Some(mut piece) = iter.next() {
        piece.line = relocate(piece.line, absorbed);

        let joined = iter.peek().and_then(|next| merge_name_pair(&piece, next));
        match joined {
            Some(text) => {
                if let Some(given) = iter.next() {
                    if relocate(given.line, absorbed) != piece.line {
                        absorbed = Some((given.line, piece.line));
                    }
                }
                merged.push(Piece::new(text, piece.line));
            }
            None => merged.push(piece),
        }
    }
    merged
}

/// Colapsa grupos `[…]TAG` linha a linha.
fn merge_bracket_groups(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len());
    let mut start = 0;

    while start < pieces.len() {
        let line = pieces[start].line;
        let end = pieces[start..]
            .iter()
            .position(|p| p.line != line)
            .map_or(pieces.len(), |offset| start + offset);

        let joined = pieces[start..end]
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.contains('[') {
            let rewritten = bracket_pattern().replace_all(&joined, |caps: &Captures| {
                let surfaces: String = caps[1].split_whitespace().map(surface_of).collect();
                format!("{}/{}", surfaces, &caps[2])
            });
            out.extend(rewritten.split_whitespace().map(|t| Piece::new(t, line)));
        } else {
            out.extend_from_slice(&pieces[start..end]);
        }
        start = end;
    }
    out
}

/// `<dígitos>年/t` seguido de `<dígitos>月/t` vira `<dígitos>年<dígitos>月/t`.
fn merge_dates(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged = Vec::with_capacity(pieces.len());
    let mut iter = pieces.into_iter().peekable();

    while let Some(piece) = iter.next() {
        let joined = iter.peek().and_then(|next| {
            let year = TaggedToken::parse(&piece.text).filter(|t| t.tag == "t")?;
            let month = TaggedToken::parse(&next.text).filter(|t| t.tag == "t")?;
            if !year_pattern().is_match(&year.surface) || !month_pattern().is_match(&month.surface) {
                return None;
            }
            Some(TaggedToken::new(year.surface + &month.surface, "t").to_string())
        });

        match joined {
            Some(text) => {
                iter.next();
                merged.push(Piece::new(text, piece.line));
            }
            None => merged.push(piece),
        }
    }
    merged
}

/// Converte um dígito de largura total no equivalente ASCII.
pub fn fold_full_width_digit(c: char) -> char {
    match c {
        '\u{FF10}'..='\u{FF19}' => char::from(b'0' + (c as u32 - 0xFF10) as u8),
        _ => c,
    }
}

fn fold_full_width_digits(pieces: Vec<Piece>) -> Vec<Piece> {
    pieces
        .into_iter()
        .map(|p| Piece {
            text: p.text.chars().map(fold_full_width_digit).collect(),
            line: p.line,
        })
        .collect()
}

fn resplit(pieces: Vec<Piece>) -> Vec<Piece> {
    pieces
        .iter()
        .flat_map(|p| p.text.split_whitespace())
        .enumerate()
        .map(|(line, t)| Piece::new(t, line))
        .collect()
}

fn drop_filler_tokens(pieces: Vec<Piece>) -> Vec<Piece> {
    pieces
        .into_iter()
        .filter(|p| !p.text.ends_with("/m") && !p.text.ends_with("/w"))
        .collect()
}

/// Resumo de uma normalização em disco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeSummary {
    pub path: PathBuf,
    /// Codificação em que o arquivo original foi lido.
    pub source_encoding: String,
    pub input_chars: usize,
    /// Tokens (= linhas) da forma canônica.
    pub output_tokens: usize,
}

/// Normalizador do corpus anotado.
///
/// A normalização de arquivo é destrutiva: o conteúdo canônico sobrescreve o original.
#[derive(Debug, Clone)]
pub struct CorpusNormalizer {
    max_chars: usize,
    candidates: Vec<TextEncoding>,
}

impl CorpusNormalizer {
    pub fn new(max_chars: usize, candidates: Vec<TextEncoding>) -> Self {
        Self {
            max_chars,
            candidates,
        }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::new(
            config.limits.max_corpus_chars,
            candidate_chain(config.encoding_hint.as_deref()),
        )
    }

    /// Executa a truncagem e todos os passos sobre o texto.
    pub fn normalize(&self, raw: &str) -> String {
        let mut pieces = split_pieces(truncate_chars(raw, self.max_chars));
        for pass in NormalizePass::ALL {
            let before = pieces.len();
            pieces = pass.apply(pieces);
            debug!("passo {}: {} → {} tokens", pass.name(), before, pieces.len());
        }
        render(&pieces)
    }

    /// Normaliza um corpus em memória, substituindo seu texto.
    pub fn normalize_corpus(&self, corpus: &mut Corpus) {
        corpus.text = self.normalize(&corpus.text);
    }

    /// Lê, normaliza e sobrescreve o arquivo.
    pub fn normalize_file(&self, path: impl AsRef<Path>) -> Result<NormalizeSummary> {
        let path = path.as_ref();
        let mut corpus = Corpus::load(path, &self.candidates)?;
        let input_chars = corpus.char_count();

        self.normalize_corpus(&mut corpus);
        corpus.save()?;

        let output_tokens = corpus.text.lines().count();
        info!("corpus normalizado: {} ({} tokens)", path.display(), output_tokens);

        Ok(NormalizeSummary {
            path: path.to_path_buf(),
            source_encoding: corpus.encoding.name().to_string(),
            input_chars,
            output_tokens,
        })
    }
}

impl Default for CorpusNormalizer {
    fn default() -> Self {
        Self::from_config(&EvalConfig::default())
    }
}
