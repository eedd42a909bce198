//! # Avaliador — Acurácia do Pipeline sobre Dados Ouro
//!
//! Espelha a superfície de configuração do [`Pipeline`](crate::pipeline::Pipeline)
//! (modelo + tokenizador/etiquetador/analisador), mas em vez de texto
//! transformado produz um relatório de métricas: o pipeline é re-executado
//! sobre os próprios tokens da referência e o resultado predito é comparado
//! com a anotação ouro.
//!
//! ## Métricas
//!
//! - **Tokenização**: precisão/cobertura/F1 sobre os intervalos de
//!   caracteres dos tokens de superfície (o texto bruto é reconstruído da
//!   referência via `SpaceAfter` e re-tokenizado do zero). Pule com `none`
//!   para avaliar sobre a tokenização ouro.
//! - **Etiquetagem**: acurácia de `upos`, `lemma` e `feats`, sempre sobre os
//!   tokens ouro.
//! - **Análise**: UAS (governante correto) e LAS (governante + relação
//!   corretos), partindo dos tokens e etiquetas ouro com os vínculos
//!   desfeitos.
//!
//! O formato do relatório é estável: uma linha por estágio habilitado, com
//! percentuais de duas casas decimais.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Error;
use crate::input::InputFormat;
use crate::model::Model;
use crate::options;
use crate::sentence::Sentence;

/// O avaliador de um modelo treinado sobre dados CoNLL-U ouro.
pub struct Evaluator {
    model: Arc<Model>,
    tokenizer: String,
    tagger: String,
    parser: String,
}

impl Evaluator {
    /// Sentinela "usar os padrões embutidos".
    pub const DEFAULT: &'static str = options::DEFAULT;
    /// Sentinela "pular este estágio".
    pub const NONE: &'static str = options::NONE;

    pub fn new(model: Arc<Model>, tokenizer: &str, tagger: &str, parser: &str) -> Self {
        Self {
            model,
            tokenizer: tokenizer.to_string(),
            tagger: tagger.to_string(),
            parser: parser.to_string(),
        }
    }

    /// Troca o modelo compartilhado.
    pub fn set_model(&mut self, model: Arc<Model>) {
        self.model = model;
    }

    /// Troca a configuração do tokenizador.
    pub fn set_tokenizer(&mut self, tokenizer: &str) {
        self.tokenizer = tokenizer.to_string();
    }

    /// Troca a configuração do etiquetador.
    pub fn set_tagger(&mut self, tagger: &str) {
        self.tagger = tagger.to_string();
    }

    /// Troca a configuração do analisador.
    pub fn set_parser(&mut self, parser: &str) {
        self.parser = parser.to_string();
    }

    /// Avalia o modelo sobre `data` (CoNLL-U com anotação de referência) e
    /// devolve o relatório textual. Estágios com `none` ficam fora do
    /// relatório; falhas de estágio ou dados malformados abortam a chamada.
    pub fn evaluate(&self, data: &str) -> Result<String, Error> {
        let mut reader = InputFormat::new_conllu_input_format();
        reader.set_text(data);
        let mut gold = Vec::new();
        let mut sentence = Sentence::new();
        while reader.next_sentence(&mut sentence)? {
            sentence
                .validate()
                .map_err(|e| Error::InvalidSentence(format!("dados ouro: {}", e.message())))?;
            gold.push(sentence.clone());
        }

        let mut report = String::new();

        if self.tokenizer != Self::NONE {
            let (precisao, cobertura, f1) = self.score_tokenization(&gold)?;
            report.push_str(&format!(
                "tokenização: precisão={precisao:.2}% cobertura={cobertura:.2}% f1={f1:.2}%\n"
            ));
        }

        if self.tagger != Self::NONE {
            let (upos, lemma, feats) = self.score_tagging(&gold)?;
            report.push_str(&format!(
                "etiquetagem: upos={upos:.2}% lemma={lemma:.2}% feats={feats:.2}%\n"
            ));
        }

        if self.parser != Self::NONE {
            let (uas, las) = self.score_parsing(&gold)?;
            report.push_str(&format!("análise: uas={uas:.2}% las={las:.2}%\n"));
        }

        Ok(report)
    }

    /// Reconstrói o texto bruto da referência, re-tokeniza e compara os
    /// intervalos de caracteres dos tokens de superfície.
    fn score_tokenization(&self, gold: &[Sentence]) -> Result<(f64, f64, f64), Error> {
        let mut text = String::new();
        let mut gold_spans: HashSet<(usize, usize)> = HashSet::new();
        for sentence in gold {
            if !text.is_empty() {
                text.push(' ');
            }
            for (form, space_after) in surface_tokens(sentence) {
                let start = text.len();
                text.push_str(&form);
                gold_spans.insert((start, text.len()));
                if space_after {
                    text.push(' ');
                }
            }
            // Espaço entre sentenças entra no laço seguinte
            while text.ends_with(' ') {
                text.pop();
            }
        }

        let mut tokenizer = self.model.new_tokenizer(&self.tokenizer)?;
        tokenizer.set_text(&text);
        let mut predicted_spans: HashSet<(usize, usize)> = HashSet::new();
        let mut cursor = 0usize;
        let mut predicted = Sentence::new();
        while tokenizer.next_sentence(&mut predicted)? {
            for word in predicted.words.iter().skip(1) {
                // Tokens são substrings do texto, na ordem
                if let Some(rel) = text[cursor..].find(&word.form) {
                    let start = cursor + rel;
                    let end = start + word.form.len();
                    predicted_spans.insert((start, end));
                    cursor = end;
                }
            }
        }

        let matching = gold_spans.intersection(&predicted_spans).count();
        let precisao = pct(matching, predicted_spans.len());
        let cobertura = pct(matching, gold_spans.len());
        let f1 = if precisao + cobertura > 0.0 {
            2.0 * precisao * cobertura / (precisao + cobertura)
        } else {
            0.0
        };
        Ok((precisao, cobertura, f1))
    }

    /// Re-etiqueta uma cópia só-formas dos tokens ouro e compara coluna a
    /// coluna.
    fn score_tagging(&self, gold: &[Sentence]) -> Result<(f64, f64, f64), Error> {
        let mut total = 0usize;
        let mut upos_ok = 0usize;
        let mut lemma_ok = 0usize;
        let mut feats_ok = 0usize;
        for sentence in gold {
            let mut predicted = Sentence::new();
            for word in sentence.words.iter().skip(1) {
                predicted.add_word(&word.form);
            }
            self.model.tag(&mut predicted, &self.tagger)?;
            for (g, p) in sentence
                .words
                .iter()
                .skip(1)
                .zip(predicted.words.iter().skip(1))
            {
                total += 1;
                if g.upos == p.upos {
                    upos_ok += 1;
                }
                if g.lemma == p.lemma {
                    lemma_ok += 1;
                }
                if g.feats == p.feats {
                    feats_ok += 1;
                }
            }
        }
        Ok((pct(upos_ok, total), pct(lemma_ok, total), pct(feats_ok, total)))
    }

    /// Re-analisa os tokens ouro (com as etiquetas ouro, vínculos desfeitos)
    /// e compara governante e relação.
    fn score_parsing(&self, gold: &[Sentence]) -> Result<(f64, f64), Error> {
        let mut total = 0usize;
        let mut head_ok = 0usize;
        let mut labeled_ok = 0usize;
        for sentence in gold {
            let mut predicted = sentence.clone();
            predicted.unlink_all_words();
            self.model.parse(&mut predicted, &self.parser)?;
            for (g, p) in sentence
                .words
                .iter()
                .skip(1)
                .zip(predicted.words.iter().skip(1))
            {
                total += 1;
                if g.head == p.head {
                    head_ok += 1;
                    if g.deprel == p.deprel {
                        labeled_ok += 1;
                    }
                }
            }
        }
        Ok((pct(head_ok, total), pct(labeled_ok, total)))
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    100.0 * part as f64 / whole.max(1) as f64
}

/// Tokens de superfície da sentença: intervalos multipalavra contam como um
/// único token (a forma original, não dividida), com o `SpaceAfter` da
/// própria linha multipalavra.
fn surface_tokens(sentence: &Sentence) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut mwt_iter = sentence.multiword_tokens.iter().peekable();
    let mut id = 1usize;
    while id < sentence.words.len() {
        if let Some(mwt) = mwt_iter.peek() {
            if mwt.id_first == id {
                let glued = mwt.misc.split('|').any(|e| e == "SpaceAfter=No");
                out.push((mwt.form.clone(), !glued));
                id = mwt.id_last + 1;
                mwt_iter.next();
                continue;
            }
        }
        let word = &sentence.words[id];
        let glued = word.misc.split('|').any(|e| e == "SpaceAfter=No");
        out.push((word.form.clone(), !glued));
        id += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus;

    fn avaliador_padrao() -> Evaluator {
        Evaluator::new(
            Arc::new(Model::build()),
            Evaluator::DEFAULT,
            Evaluator::DEFAULT,
            Evaluator::DEFAULT,
        )
    }

    #[test]
    fn test_etiquetagem_memorizada_da_100_por_cento() {
        // Modelo treinado no próprio corpus, tokenização ouro (pulada):
        // predito e ouro coincidem em todos os tokens
        let mut avaliador = avaliador_padrao();
        avaliador.set_tokenizer(Evaluator::NONE);
        let relatorio = avaliador.evaluate(corpus::corpus_conllu()).unwrap();
        assert!(
            relatorio.contains("etiquetagem: upos=100.00% lemma=100.00% feats=100.00%"),
            "relatório: {relatorio}"
        );
        assert!(!relatorio.contains("tokenização"));
    }

    #[test]
    fn test_tokenizacao_do_corpus_e_exata() {
        let avaliador = avaliador_padrao();
        let relatorio = avaliador.evaluate(corpus::corpus_conllu()).unwrap();
        assert!(
            relatorio.contains("tokenização: precisão=100.00% cobertura=100.00% f1=100.00%"),
            "relatório: {relatorio}"
        );
    }

    #[test]
    fn test_relatorio_tem_secao_de_analise() {
        let avaliador = avaliador_padrao();
        let relatorio = avaliador.evaluate(corpus::corpus_conllu()).unwrap();
        let linha = relatorio
            .lines()
            .find(|l| l.starts_with("análise:"))
            .expect("seção de análise presente");
        assert!(linha.contains("uas="));
        assert!(linha.contains("las="));
    }

    #[test]
    fn test_estagios_pulados_ficam_fora_do_relatorio() {
        let mut avaliador = avaliador_padrao();
        avaliador.set_tokenizer(Evaluator::NONE);
        avaliador.set_parser(Evaluator::NONE);
        let relatorio = avaliador.evaluate(corpus::corpus_conllu()).unwrap();
        assert_eq!(relatorio.lines().count(), 1);
        assert!(relatorio.starts_with("etiquetagem:"));
    }

    #[test]
    fn test_dados_ouro_malformados_abortam() {
        let avaliador = avaliador_padrao();
        let err = avaliador.evaluate("linha que não é conllu\n\n").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_modelo_sem_estagio_aborta() {
        let modelo = Model {
            tagger: None,
            ..Model::build()
        };
        let mut avaliador = avaliador_padrao();
        avaliador.set_model(Arc::new(modelo));
        let err = avaliador.evaluate(corpus::corpus_conllu()).unwrap_err();
        assert!(matches!(err, Error::StageUnavailable(_)));
    }
}
