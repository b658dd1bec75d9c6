//! # Limpeza da Saída dos Segmentadores
//!
//! Remove etiquetas (`词/n` → `词`) e descarta o conteúdo entre símbolos
//! pareados (parênteses, aspas, títulos de obra).
//!
//! O estado "dentro da região pulada" alterna a cada ocorrência de **qualquer**
//! símbolo do conjunto, não por tipo de símbolo. Uma quantidade ímpar de
//! símbolos deixa a região aberta até o fim da chamada; a heurística é frágil,
//! mas os relatórios históricos foram produzidos assim.

use crate::corpus::{surface_of, TokenSequence};

/// Símbolos que abrem/fecham uma região descartada.
pub const SKIP_SYMBOLS: &[&str] = &["-", "(", ")", "（", "）", "《", "》", "“", "”"];

/// Limpa os tokens brutos de um segmentador.
///
/// # Exemplo
/// ```rust
/// use seg_eval_core::cleaner::clean_segmentation_result;
///
/// let raw = ["(", "foo/n", ")", "bar/n"];
/// assert_eq!(clean_segmentation_result(&raw), vec!["bar"]);
/// ```
pub fn clean_segmentation_result<S: AsRef<str>>(raw: &[S]) -> TokenSequence {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut skipping = false;

    for token in raw {
        let surface = surface_of(token.as_ref()).trim();
        if surface.is_empty() {
            continue;
        }
        if SKIP_SYMBOLS.contains(&surface) {
            skipping = !skipping;
            continue;
        }
        if !skipping {
            cleaned.push(surface.to_string());
        }
    }
    cleaned
}
