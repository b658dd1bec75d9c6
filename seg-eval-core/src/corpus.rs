//! # Corpus Anotado e Sequências de Tokens
//!
//! O padrão-ouro segue o formato do corpus do Diário do Povo (PKU 1998):
//! tokens separados por espaço, cada um na forma `superfície/etiqueta`.
//!
//! ```text
//! 中共中央/nt  总书记/n  、/w  江/nrf  泽民/nrg
//! [中央/n  人民/n  广播/vn  电台/n]nt
//! ```
//!
//! - **Grupos entre colchetes** `[… ]TAG`: compostos cujo rótulo externo vale para o conjunto.
//! - **Nomes divididos** `nrf`/`nrg`: sobrenome e nome anotados separadamente.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoding::{decode_with_fallback, TextEncoding};
use crate::error::{EvalError, Result};

/// Separador entre superfície e etiqueta.
pub const TAG_SEPARATOR: char = '/';

/// Sequência ordenada de superfícies (duplicatas permitidas).
pub type TokenSequence = Vec<String>;

/// Parte de um token anotado antes do primeiro separador.
///
/// `"北京/ns"` → `"北京"`; `"北京"` → `"北京"`; `"//w"` → `""`.
pub fn surface_of(annotated: &str) -> &str {
    annotated
        .split_once(TAG_SEPARATOR)
        .map_or(annotated, |(surface, _)| surface)
}

/// Um token com sua etiqueta morfossintática.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Texto do token (ex: "北京").
    pub surface: String,
    /// Código da etiqueta (ex: "ns", "nrf", "t").
    pub tag: String,
}

impl TaggedToken {
    pub fn new(surface: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            tag: tag.into(),
        }
    }

    /// Separa `superfície/etiqueta` no primeiro separador.
    ///
    /// Retorna `None` se não houver separador ou se a superfície for vazia.
    pub fn parse(s: &str) -> Option<Self> {
        let (surface, tag) = s.split_once(TAG_SEPARATOR)?;
        if surface.is_empty() {
            return None;
        }
        Some(Self::new(surface, tag))
    }
}

impl fmt::Display for TaggedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.surface, TAG_SEPARATOR, self.tag)
    }
}

/// Conteúdo de um arquivo de corpus já decodificado.
///
/// A normalização sobrescreve o arquivo original: não existe versionamento.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub path: PathBuf,
    pub text: String,
    /// Codificação usada na leitura. A escrita é sempre em UTF-8.
    pub encoding: TextEncoding,
}

impl Corpus {
    /// Lê e decodifica um arquivo usando a cadeia de codificações fornecida.
    pub fn load(path: impl AsRef<Path>, candidates: &[TextEncoding]) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| EvalError::io(path, e))?;
        let (text, encoding) = decode_with_fallback(&bytes, candidates, path)?;
        info!("corpus lido: {} ({}, {} caracteres)", path.display(), encoding, text.chars().count());
        Ok(Self {
            path: path.to_path_buf(),
            text,
            encoding,
        })
    }

    /// Grava o texto atual no mesmo caminho, em UTF-8.
    pub fn save(&self) -> Result<()> {
        write_utf8(&self.path, &self.text)
    }

    /// Número de caracteres (não bytes) do texto.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Escreve texto em UTF-8 criando o diretório pai se necessário.
pub(crate) fn write_utf8(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| EvalError::io(path, e))
}

/// Trecho de demonstração no formato PKU 1998, com todos os casos tratados
/// pela normalização: nomes divididos, grupos entre colchetes, datas em
/// dígitos de largura total, numerais e pontuação.
pub const SAMPLE_TAGGED_CORPUS: &str = "\
19980101-01-001-001/m  迈向/v  充满/v  希望/n  的/u  新/a  世纪/n  ——/w  一九九八年/t  新年/t  讲话/n  （/w  附/v  图片/n  １/m  张/q  ）/w
19980101-01-001-002/m  中共中央/nt  总书记/n  、/w  国家/n  主席/n  江/nrf  泽民/nrg
19980101-01-001-003/m  （/w  １９９７年/t  １２月/t  ３１日/t  ）/w
19980101-01-001-004/m  [中央/n  人民/n  广播/vn  电台/n]nt  、/w  [中国/ns  国际/n  广播/vn  电台/n]nt  和/c  [中央/n  电视台/n]nt  播发/v  了/u  讲话/n
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::candidate_chain;

    #[test]
    fn test_surface_of() {
        assert_eq!(surface_of("北京/ns"), "北京");
        assert_eq!(surface_of("北京"), "北京");
        assert_eq!(surface_of("//w"), "");
        assert_eq!(surface_of("a/b/c"), "a");
    }

    #[test]
    fn test_tagged_token_roundtrip_display() {
        let token = TaggedToken::parse("泽民/nrg").unwrap();
        assert_eq!(token, TaggedToken::new("泽民", "nrg"));
        assert_eq!(token.to_string(), "泽民/nrg");
        assert!(TaggedToken::parse("sem_etiqueta").is_none());
        assert!(TaggedToken::parse("/w").is_none());
    }

    #[test]
    fn test_corpus_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news_a.txt");
        let (gbk, _, _) = encoding_rs::GBK.encode("北京/ns  大学/n");
        fs::write(&path, &gbk).unwrap();

        let mut corpus = Corpus::load(&path, &candidate_chain(None)).unwrap();
        assert_eq!(corpus.encoding, TextEncoding::Gbk);
        assert_eq!(corpus.char_count(), 11);

        corpus.text.push_str("\n");
        corpus.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "北京/ns  大学/n\n");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Corpus::load("/nao/existe/news_a.txt", &candidate_chain(None)).unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }
}
