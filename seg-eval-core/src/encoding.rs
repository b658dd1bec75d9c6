//! # Resolução de Codificação
//!
//! Corpora chineses chegam em UTF-8, GBK ou coisa pior. A leitura tenta uma
//! lista ordenada de codificações e usa a primeira que decodifica sem erro:
//!
//! 1. a codificação detectada externamente (se houver);
//! 2. UTF-8;
//! 3. GBK (codificação regional legada);
//! 4. ISO-8859-1, que aceita qualquer sequência de bytes.
//!
//! A detecção automática em si não é feita aqui: o chamador informa apenas o rótulo.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};

/// Uma codificação candidata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Codificação resolvida a partir de um rótulo externo.
    Labeled(&'static Encoding),
    Utf8,
    Gbk,
    /// Byte a byte para U+0000..U+00FF. Nunca falha.
    Latin1,
}

impl TextEncoding {
    /// Resolve um rótulo WHATWG ("gb2312", "utf-8", "big5"...).
    pub fn from_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(TextEncoding::Labeled)
    }

    /// Nome da codificação para logs.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Labeled(enc) => enc.name(),
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Gbk => "GBK",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Tenta decodificar sem substituição; `None` se houver bytes inválidos.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            TextEncoding::Gbk => encoding_rs::GBK.decode_without_bom_handling_and_without_replacement(bytes),
            TextEncoding::Labeled(enc) => enc.decode_without_bom_handling_and_without_replacement(bytes),
            TextEncoding::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cadeia padrão de candidatas, com o rótulo detectado (se válido) à frente.
pub fn candidate_chain(hint: Option<&str>) -> Vec<TextEncoding> {
    let mut chain = Vec::with_capacity(4);
    if let Some(label) = hint {
        match TextEncoding::from_label(label) {
            Some(enc) => chain.push(enc),
            None => warn!("rótulo de codificação desconhecido ignorado: {label}"),
        }
    }
    chain.extend([TextEncoding::Utf8, TextEncoding::Gbk, TextEncoding::Latin1]);
    chain
}

/// Decodifica `bytes` com a primeira candidata que não falhar.
///
/// `path` serve apenas para mensagens de log e de erro.
pub fn decode_with_fallback(
    bytes: &[u8],
    candidates: &[TextEncoding],
    path: &Path,
) -> Result<(String, TextEncoding)> {
    for enc in candidates {
        match enc.decode(bytes) {
            Some(text) => {
                debug!("{} decodificado como {}", path.display(), enc);
                return Ok((text.into_owned(), *enc));
            }
            None => warn!("falha ao decodificar {} como {}, tentando a próxima", path.display(), enc),
        }
    }

    Err(EvalError::Decode {
        path: path.to_path_buf(),
        tried: candidates.iter().map(|e| e.name()).collect::<Vec<_>>().join(", "),
    })
}
