//! # Erros do Pipeline de Anotação
//!
//! Toda operação falível do crate retorna `Result<T, Error>`. As variantes
//! correspondem às classes de falha que o orquestrador precisa distinguir:
//!
//! | Variante               | Quando ocorre                                          | Recuperável?      |
//! |------------------------|--------------------------------------------------------|-------------------|
//! | `MalformedInput`       | leitor não consegue interpretar uma linha/sentença     | aborta a leitura  |
//! | `StageUnavailable`     | o modelo não possui o componente do estágio pedido     | fatal à chamada   |
//! | `InvalidConfiguration` | opção ou método desconhecido na string de configuração | fatal à chamada   |
//! | `InvalidSentence`      | sentença fornecida viola invariantes estruturais       | fatal ao lote     |
//! | `Model`                | artefato de modelo não pôde ser lido/gravado           | fatal à chamada   |
//!
//! Um chamador que não quer diagnóstico simplesmente descarta o `Err` e
//! observa apenas o fracasso da operação.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erro estruturado do pipeline: a variante carrega a classe da falha e a
/// mensagem descreve a causa específica em termos legíveis.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Error {
    /// A entrada não segue o formato esperado (ex: linha CoNLL-U com número
    /// errado de colunas). Distinto de "entrada esgotada", que não é erro.
    #[error("entrada malformada: {0}")]
    MalformedInput(String),

    /// O estágio foi solicitado mas o modelo carregado não o contém
    /// (ex: artefato treinado sem analisador sintático).
    #[error("estágio indisponível: {0}")]
    StageUnavailable(String),

    /// Opção, formato ou método desconhecido em uma string de configuração.
    /// Opções não reconhecidas nunca são ignoradas em silêncio.
    #[error("configuração inválida: {0}")]
    InvalidConfiguration(String),

    /// Sentença com invariantes estruturais violadas (ids fora de faixa,
    /// `head` apontando para token inexistente, etc.).
    #[error("sentença inválida: {0}")]
    InvalidSentence(String),

    /// Falha ao carregar ou serializar o artefato de modelo.
    #[error("erro no artefato de modelo: {0}")]
    Model(String),
}

impl Error {
    /// Mensagem da falha, sem o prefixo da classe.
    pub fn message(&self) -> &str {
        match self {
            Error::MalformedInput(m)
            | Error::StageUnavailable(m)
            | Error::InvalidConfiguration(m)
            | Error::InvalidSentence(m)
            | Error::Model(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carrega_classe_e_mensagem() {
        let e = Error::MalformedInput("linha 3 tem 7 colunas".into());
        assert_eq!(e.to_string(), "entrada malformada: linha 3 tem 7 colunas");
        assert_eq!(e.message(), "linha 3 tem 7 colunas");
    }

    #[test]
    fn test_serializa_com_classe() {
        let e = Error::StageUnavailable("tagger".into());
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("stage_unavailable"));
        assert!(json.contains("tagger"));
    }
}
