//! # Strings de Configuração por Estágio
//!
//! Cada estágio do pipeline (tokenizador, etiquetador, analisador) e cada
//! formato recebe uma string de opções no formato `chave=valor;chave2=valor2`.
//! Chaves sem valor são tratadas como flags (`presegmented` ≡ `presegmented=1`).
//!
//! Dois valores-sentinela são reservados e **nunca** se confundem:
//! - [`NONE`]: pula o estágio por completo;
//! - [`DEFAULT`]: executa o estágio com as configurações embutidas do modelo.
//!
//! Opções desconhecidas causam erro de configuração — nunca são ignoradas em
//! silêncio.

use std::collections::BTreeMap;

use crate::error::Error;

/// Sentinela "pular este estágio".
pub const NONE: &str = "none";

/// Sentinela "usar as configurações padrão embutidas".
pub const DEFAULT: &str = "default";

/// Mapa de opções extraído de uma string `chave=valor;...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Interpreta uma string de opções. A string vazia e o sentinela
    /// [`DEFAULT`] produzem um mapa vazio.
    pub fn parse(raw: &str) -> Self {
        let mut values = BTreeMap::new();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == DEFAULT {
            return Self { values };
        }
        for item in trimmed.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match item.split_once('=') {
                Some((k, v)) => values.insert(k.trim().to_string(), v.trim().to_string()),
                None => values.insert(item.to_string(), "1".to_string()),
            };
        }
        Self { values }
    }

    /// Interpreta e valida contra o conjunto de chaves reconhecidas pelo
    /// consumidor. Qualquer chave fora do conjunto é erro.
    pub fn parse_known(raw: &str, known: &[&str], context: &str) -> Result<Self, Error> {
        let options = Self::parse(raw);
        for key in options.values.keys() {
            if !known.contains(&key.as_str()) {
                return Err(Error::InvalidConfiguration(format!(
                    "opção desconhecida `{key}` em {context} (reconhecidas: {})",
                    known.join(", ")
                )));
            }
        }
        Ok(options)
    }

    /// Valor da opção, se presente.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    /// Verdadeiro se a flag está presente (qualquer valor).
    pub fn flag(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Verdadeiro se nenhuma opção foi informada.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chave_valor_e_flag() {
        let o = Options::parse("presegmented;modelo=rapido");
        assert!(o.flag("presegmented"));
        assert_eq!(o.get("modelo"), Some("rapido"));
        assert_eq!(o.get("inexistente"), None);
    }

    #[test]
    fn test_default_e_vazio_produzem_mapa_vazio() {
        assert!(Options::parse("").is_empty());
        assert!(Options::parse(DEFAULT).is_empty());
        assert!(Options::parse("  default  ").is_empty());
    }

    #[test]
    fn test_chave_desconhecida_gera_erro() {
        let err = Options::parse_known("velocidade=9", &["presegmented"], "tokenizador")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert!(err.message().contains("velocidade"));
    }

    #[test]
    fn test_sentinelas_distintos() {
        // "none" nunca deve ser interpretado como mapa de opções válido de
        // estágio habilitado — quem decide pular é o orquestrador, comparando
        // a string bruta com o sentinela antes de chamar parse.
        assert_ne!(NONE, DEFAULT);
        let o = Options::parse(NONE);
        assert!(o.flag(NONE));
    }
}
