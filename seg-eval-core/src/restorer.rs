//! # Restauração do Texto Puro
//!
//! Gera, a partir do corpus canônico, o texto corrido que os segmentadores
//! recebem como entrada: remove espaços, colchetes, o separador `/` e todos os
//! códigos de etiqueta de [`TAG_CODES`].
//!
//! ## Peculiaridade conhecida
//!
//! Os códigos são removidos pela identidade dos caracteres, não pela posição
//! estrutural. Letras latinas na superfície que coincidam com algum código
//! também somem: `iPhone/nz` vira `P`. O comportamento é reproduzido de
//! propósito, porque os números históricos dependem dele.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{EvalConfig, SuffixMarkers};
use crate::corpus::{write_utf8, Corpus, TAG_SEPARATOR};
use crate::encoding::TextEncoding;
use crate::error::{EvalError, Result};

/// Códigos de etiqueta removidos, na ordem em que são aplicados.
///
/// Códigos de uma letra minúscula e os morfemas `?g` com inicial maiúscula.
/// A ordem importa: `Nag` perde o `a` antes e depois o `Ng`.
pub const TAG_CODES: &[&str] = &[
    "v", "n", "u", "t", "m", "w", "a", "r", "q", "p", "c", "d", "f", "Ng", "z", "i", "s", "Tg",
    "k", "j", "b", "l", "Vg", "y", "Dg", "Ag", "Bg", "e", "Rg", "h", "Mg", "o", "x",
];

/// Remove as marcações e devolve o texto corrido.
pub fn strip_annotations(canonical: &str) -> String {
    let mut text: String = canonical
        .chars()
        .filter(|&c| c != ' ' && c != '[' && c != ']' && c != TAG_SEPARATOR)
        .collect();

    for code in TAG_CODES {
        if text.contains(code) {
            text = text.replace(code, "");
        }
    }

    text.retain(|c| !c.is_whitespace());
    text
}

/// Deriva o caminho do texto restaurado trocando o marcador no nome do arquivo.
///
/// `data/news_a.txt` → `data/news_o.txt`.
pub fn restored_path(annotated: &Path, markers: &SuffixMarkers) -> Result<PathBuf> {
    let missing = || EvalError::MissingMarker {
        path: annotated.to_path_buf(),
        marker: markers.annotated.clone(),
    };

    let file_name = annotated.file_name().and_then(|n| n.to_str()).ok_or_else(missing)?;
    if !file_name.contains(&markers.annotated) {
        return Err(missing());
    }

    let restored = file_name.replace(&markers.annotated, &markers.restored);
    Ok(annotated.with_file_name(restored))
}

/// Resumo de uma restauração em disco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub annotated: PathBuf,
    pub restored: PathBuf,
    pub chars: usize,
}

/// Produz o arquivo de texto puro companheiro do corpus canônico.
#[derive(Debug, Clone, Default)]
pub struct TextRestorer {
    markers: SuffixMarkers,
}

impl TextRestorer {
    pub fn new(markers: SuffixMarkers) -> Self {
        Self { markers }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::new(config.markers.clone())
    }

    pub fn restore(&self, canonical: &str) -> String {
        strip_annotations(canonical)
    }

    /// Lê o corpus canônico (UTF-8), restaura e grava no caminho derivado.
    pub fn restore_file(&self, annotated: impl AsRef<Path>) -> Result<RestoreSummary> {
        let annotated = annotated.as_ref();
        let restored = restored_path(annotated, &self.markers)?;

        let corpus = Corpus::load(annotated, &[TextEncoding::Utf8])?;
        let text = self.restore(&corpus.text);
        write_utf8(&restored, &text)?;

        let chars = text.chars().count();
        info!("texto restaurado: {} ({} caracteres)", restored.display(), chars);

        Ok(RestoreSummary {
            annotated: annotated.to_path_buf(),
            restored,
            chars,
        })
    }
}
