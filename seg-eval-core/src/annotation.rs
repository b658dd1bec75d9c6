//! # Extração do Padrão-Ouro
//!
//! Lê o corpus canônico e devolve a sequência de superfícies, na ordem do
//! arquivo, descartando etiquetas, tokens vazios e tokens que começam com
//! símbolos de abertura (aspas, parênteses, travessão).

use crate::corpus::{surface_of, TokenSequence};

/// Prefixos que descartam o token do padrão-ouro.
pub const GOLD_SKIP_PREFIXES: &[char] = &['-', '(', ')', '《', '》', '‘', '’', '"'];

/// Extrai o padrão-ouro do corpus canônico.
///
/// # Exemplo
/// ```rust
/// use seg_eval_core::annotation::parse_annotated_text;
///
/// let gold = parse_annotated_text("北京/ns  大学/n\n\n《/w  人民/n");
/// assert_eq!(gold, vec!["北京", "大学", "人民"]);
/// ```
pub fn parse_annotated_text(canonical: &str) -> TokenSequence {
    canonical
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(str::split_whitespace)
        .map(|annotated| surface_of(annotated).trim())
        .filter(|surface| !surface.is_empty() && !surface.starts_with(GOLD_SKIP_PREFIXES))
        .map(str::to_string)
        .collect()
}
