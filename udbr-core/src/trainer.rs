//! # Treinador — de Sentenças Anotadas a um Artefato de Modelo
//!
//! Consome coleções de [`Sentence`]s rotuladas (treino e, opcionalmente,
//! held-out) e produz o artefato serializado do modelo. Cada estágio pode
//! ser excluído do treinamento com o sentinela `none` — o artefato
//! resultante simplesmente não oferece aquele estágio.
//!
//! ## Política de Lote
//!
//! O lote de treino é validado por inteiro antes de qualquer contagem:
//! uma única sentença com invariantes violadas rejeita o lote todo
//! (exemplos problemáticos nunca são descartados em silêncio). Quando há
//! held-out, a acurácia de etiquetagem e de ligação é medida após o treino
//! e reportada pelo canal de log — nunca embutida no artefato.

use rayon::prelude::*;

use crate::error::Error;
use crate::input::Tokenizer;
use crate::model::{Model, ParserModel, TaggerModel, TokenizerResources};
use crate::options::{self, Options};
use crate::sentence::Sentence;

/// Ponto de entrada de treinamento.
pub struct Trainer;

impl Trainer {
    /// Método de treinamento padrão (e único suportado): HMM por contagem.
    pub const DEFAULT: &'static str = "hmm";
    /// Sentinela "não treinar este estágio".
    pub const NONE: &'static str = options::NONE;

    /// Treina um modelo e devolve o artefato serializado.
    ///
    /// - `method`: nome do método ([`Trainer::DEFAULT`] ou `default`);
    /// - `train`: lote de sentenças anotadas (rejeitado por inteiro se
    ///   qualquer uma violar as invariantes estruturais);
    /// - `heldout`: conjunto de validação; vazio significa "sem validação,
    ///   usar os padrões do método";
    /// - `tokenizer`/`tagger`/`parser`: configuração por estágio, onde
    ///   `none` exclui o estágio do artefato.
    pub fn train(
        method: &str,
        train: &[Sentence],
        heldout: &[Sentence],
        tokenizer: &str,
        tagger: &str,
        parser: &str,
    ) -> Result<Vec<u8>, Error> {
        if method != Self::DEFAULT && method != options::DEFAULT {
            return Err(Error::InvalidConfiguration(format!(
                "método de treinamento desconhecido: `{method}`"
            )));
        }
        if train.is_empty() {
            return Err(Error::InvalidSentence(
                "conjunto de treino vazio".to_string(),
            ));
        }
        for (i, sentence) in train.iter().enumerate() {
            sentence.validate().map_err(|e| {
                Error::InvalidSentence(format!("sentença {} do treino: {}", i + 1, e.message()))
            })?;
        }
        for (i, sentence) in heldout.iter().enumerate() {
            sentence.validate().map_err(|e| {
                Error::InvalidSentence(format!("sentença {} do held-out: {}", i + 1, e.message()))
            })?;
        }

        let model = Model {
            tokenizer: Self::train_tokenizer(train, tokenizer)?,
            tagger: Self::train_tagger(train, tagger)?,
            parser: Self::train_parser(train, parser)?,
        };

        if !heldout.is_empty() {
            Self::report_heldout(&model, heldout);
        }

        model.save_to_bytes()
    }

    /// "Treina" o tokenizador: parte da lista embutida de abreviações e
    /// acrescenta as formas com ponto final observadas no corpus.
    fn train_tokenizer(
        train: &[Sentence],
        config: &str,
    ) -> Result<Option<TokenizerResources>, Error> {
        if config == Self::NONE {
            return Ok(None);
        }
        Options::parse_known(config, &[], "treino do tokenizador")?;
        let mut abbreviations = Tokenizer::default_abbreviations();
        for sentence in train {
            for word in sentence.words.iter().skip(1) {
                if let Some(stem) = word.form.strip_suffix('.') {
                    if !stem.is_empty() && stem.chars().all(char::is_alphabetic) {
                        let lower = stem.to_lowercase();
                        if !abbreviations.contains(&lower) {
                            abbreviations.push(lower);
                        }
                    }
                }
            }
        }
        Ok(Some(TokenizerResources { abbreviations }))
    }

    fn train_tagger(train: &[Sentence], config: &str) -> Result<Option<TaggerModel>, Error> {
        if config == Self::NONE {
            return Ok(None);
        }
        Options::parse_known(config, &[], "treino do etiquetador")?;
        Ok(Some(TaggerModel::train(train)))
    }

    fn train_parser(train: &[Sentence], config: &str) -> Result<Option<ParserModel>, Error> {
        if config == Self::NONE {
            return Ok(None);
        }
        Options::parse_known(config, &[], "treino do analisador")?;
        Ok(Some(ParserModel::train(train)))
    }

    /// Mede acurácia no held-out (uma sentença por tarefa rayon) e reporta
    /// pelo canal de log.
    fn report_heldout(model: &Model, heldout: &[Sentence]) {
        if model.tagger.is_some() {
            let (corretos, total) = heldout
                .par_iter()
                .map(|gold| {
                    let mut predita = forms_only(gold);
                    if model.tag(&mut predita, Model::DEFAULT).is_err() {
                        return (0usize, gold.words.len() - 1);
                    }
                    let acertos = gold
                        .words
                        .iter()
                        .skip(1)
                        .zip(predita.words.iter().skip(1))
                        .filter(|(g, p)| g.upos == p.upos)
                        .count();
                    (acertos, gold.words.len() - 1)
                })
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
            tracing::info!(
                corretos,
                total,
                acuracia = 100.0 * corretos as f64 / total.max(1) as f64,
                "etiquetagem no held-out"
            );
        }
        if model.parser.is_some() {
            let (corretos, total) = heldout
                .par_iter()
                .map(|gold| {
                    let mut predita = gold.clone();
                    predita.unlink_all_words();
                    if model.parse(&mut predita, Model::DEFAULT).is_err() {
                        return (0usize, gold.words.len() - 1);
                    }
                    let acertos = gold
                        .words
                        .iter()
                        .skip(1)
                        .zip(predita.words.iter().skip(1))
                        .filter(|(g, p)| g.head == p.head)
                        .count();
                    (acertos, gold.words.len() - 1)
                })
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
            tracing::info!(
                corretos,
                total,
                acuracia = 100.0 * corretos as f64 / total.max(1) as f64,
                "ligação no held-out"
            );
        }
    }
}

/// Cópia da sentença contendo apenas as formas (anotações zeradas).
fn forms_only(gold: &Sentence) -> Sentence {
    let mut copy = Sentence::new();
    for word in gold.words.iter().skip(1) {
        copy.add_word(&word.form);
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::get_corpus;

    #[test]
    fn test_treina_e_usa_o_artefato() {
        let corpus = get_corpus();
        let bytes = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap();

        let model = Model::load_from_bytes(&bytes).unwrap();
        assert!(model.tokenizer.is_some());
        assert!(model.tagger.is_some());
        assert!(model.parser.is_some());

        let mut s = Sentence::new();
        for f in ["A", "casa", "é", "azul", "."] {
            s.add_word(f);
        }
        model.tag(&mut s, Model::DEFAULT).unwrap();
        assert_eq!(s.words[2].upos, "NOUN");
    }

    #[test]
    fn test_estagio_excluido_do_artefato() {
        let corpus = get_corpus();
        let bytes = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            Trainer::NONE,
        )
        .unwrap();
        let model = Model::load_from_bytes(&bytes).unwrap();
        assert!(model.parser.is_none(), "artefato sem analisador");
        assert!(model.tagger.is_some());
    }

    #[test]
    fn test_metodo_desconhecido() {
        let corpus = get_corpus();
        let err = Trainer::train(
            "rede_neural",
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_lote_invalido_rejeitado_por_inteiro() {
        let mut corpus = get_corpus();
        // Corrompe uma única sentença do lote
        corpus[3].words[1].head = Some(99);
        let err = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSentence(_)));
        assert!(err.message().contains("sentença 4"));
    }

    #[test]
    fn test_treino_vazio_rejeitado() {
        let err = Trainer::train(
            Trainer::DEFAULT,
            &[],
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSentence(_)));
    }

    #[test]
    fn test_heldout_nao_altera_artefato() {
        let corpus = get_corpus();
        let sem = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap();
        let com = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &corpus,
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap();
        assert_eq!(sem, com);
    }

    #[test]
    fn test_abreviacoes_aprendidas() {
        let mut corpus = get_corpus();
        // Injeta uma "abreviação" no treino: forma terminada em ponto
        let mut s = Sentence::new();
        let w = s.add_word("Exa.");
        w.upos = "NOUN".into();
        w.lemma = "exa.".into();
        s.set_head(1, Some(0), "root").unwrap();
        corpus.push(s);

        let bytes = Trainer::train(
            Trainer::DEFAULT,
            &corpus,
            &[],
            options::DEFAULT,
            options::DEFAULT,
            options::DEFAULT,
        )
        .unwrap();
        let model = Model::load_from_bytes(&bytes).unwrap();
        let abbrevs = &model.tokenizer.as_ref().unwrap().abbreviations;
        assert!(abbrevs.contains(&"exa".to_string()));
    }
}
