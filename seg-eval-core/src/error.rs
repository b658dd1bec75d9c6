//! Tipos de erro do avaliador.

use std::path::PathBuf;

use thiserror::Error;

/// Resultado padrão das operações do crate.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Falhas possíveis durante a preparação de um corpus ou a avaliação de um segmentador.
///
/// Cada variante carrega o caminho ou o identificador envolvido, para que o chamador
/// possa registrar a falha e seguir para o próximo corpus.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EvalError {
    /// Falha de leitura ou escrita em disco.
    #[error("erro de E/S em {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nenhuma codificação candidata conseguiu decodificar o arquivo.
    #[error("não foi possível decodificar {} (tentativas: {tried})", path.display())]
    Decode { path: PathBuf, tried: String },

    /// Identificador de segmentador não registrado.
    #[error("segmentador desconhecido: {0}")]
    UnknownSegmenter(String),

    /// O nome do arquivo anotado não contém o marcador de sufixo esperado.
    #[error("o caminho {} não contém o marcador '{marker}'", path.display())]
    MissingMarker { path: PathBuf, marker: String },

    /// Configuração inválida.
    #[error("configuração inválida: {0}")]
    Config(String),

    /// Erro de (de)serialização JSON.
    #[error("erro de JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    /// Cria um erro de E/S associado a um caminho.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Cria um erro de configuração.
    pub fn config(msg: impl Into<String>) -> Self {
        EvalError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = EvalError::io(
            "data/news_a.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "sumiu"),
        );
        assert!(err.to_string().contains("data/news_a.txt"));

        let err = EvalError::UnknownSegmenter("ltp".into());
        assert_eq!(err.to_string(), "segmentador desconhecido: ltp");
    }
}
