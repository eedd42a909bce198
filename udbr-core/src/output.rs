//! # Escritores de Formato — da Sentença ao Documento Serializado
//!
//! O caminho inverso dos leitores: cada escritor serializa uma [`Sentence`]
//! por vez, em streaming — a concatenação de todas as chamadas de
//! [`OutputFormat::write_sentence`] seguida de
//! [`OutputFormat::finish_document`] é o documento completo e válido.
//! Nenhum escritor acumula o documento inteiro; o único estado entre
//! chamadas é o enquadramento do documento (ex: o `<corpus>` do Matxin).
//!
//! ## Variantes Disponíveis
//!
//! - **Conllu**: exporta o formato tabular CoNLL-U, reproduzindo exatamente o
//!   que o leitor correspondente consome (fidelidade de ida e volta).
//! - **Horizontal**: uma linha por sentença, formas unidas por espaço
//!   (respeitando `SpaceAfter=No`).
//! - **Vertical**: uma forma por linha, linha em branco entre sentenças.
//! - **Matxin**: árvore de dependências em XML, com moldura `<corpus>`.
//! - **Eval**: projeção mínima `forma/upos/head/deprel` para comparação
//!   lado a lado de arquivos predito × ouro em ferramentas de avaliação.

use crate::error::Error;
use crate::sentence::Sentence;

/// Um escritor de formato de saída (registro fechado de variantes).
pub enum OutputFormat {
    /// Formato tabular CoNLL-U.
    Conllu(ConlluWriter),
    /// Uma sentença por linha.
    Horizontal(HorizontalWriter),
    /// Uma forma por linha.
    Vertical(VerticalWriter),
    /// XML de dependências com moldura de documento.
    Matxin(MatxinWriter),
    /// Projeção para avaliação.
    Eval(EvalWriter),
}

impl OutputFormat {
    /// Cria um escritor pelo nome do formato: `conllu`, `horizontal`,
    /// `vertical`, `matxin` ou `eval`.
    pub fn new_output_format(name: &str) -> Result<OutputFormat, Error> {
        match name {
            "conllu" => Ok(OutputFormat::Conllu(ConlluWriter)),
            "horizontal" => Ok(OutputFormat::Horizontal(HorizontalWriter)),
            "vertical" => Ok(OutputFormat::Vertical(VerticalWriter)),
            "matxin" => Ok(OutputFormat::Matxin(MatxinWriter::new())),
            "eval" => Ok(OutputFormat::Eval(EvalWriter)),
            other => Err(Error::InvalidConfiguration(format!(
                "formato de saída desconhecido: `{other}`"
            ))),
        }
    }

    /// Serializa uma sentença como o próximo trecho do documento.
    pub fn write_sentence(&mut self, sentence: &Sentence) -> String {
        match self {
            OutputFormat::Conllu(w) => w.write_sentence(sentence),
            OutputFormat::Horizontal(w) => w.write_sentence(sentence),
            OutputFormat::Vertical(w) => w.write_sentence(sentence),
            OutputFormat::Matxin(w) => w.write_sentence(sentence),
            OutputFormat::Eval(w) => w.write_sentence(sentence),
        }
    }

    /// Emite o fechamento do documento (vazio para formatos sem moldura) e
    /// reinicia o estado de enquadramento para o próximo documento.
    pub fn finish_document(&mut self) -> String {
        match self {
            OutputFormat::Matxin(w) => w.finish_document(),
            _ => String::new(),
        }
    }
}

/// Campo CoNLL-U: vazio é gravado como `_`.
fn encode_field(value: &str) -> &str {
    if value.is_empty() {
        "_"
    } else {
        value
    }
}

/// Escritor CoNLL-U. Sem estado entre sentenças.
pub struct ConlluWriter;

impl ConlluWriter {
    fn write_sentence(&mut self, sentence: &Sentence) -> String {
        let mut out = String::new();
        for comment in &sentence.comments {
            out.push_str("# ");
            out.push_str(comment);
            out.push('\n');
        }
        let mut mwt_iter = sentence.multiword_tokens.iter().peekable();
        for word in sentence.words.iter().skip(1) {
            if let Some(mwt) = mwt_iter.peek() {
                if mwt.id_first == word.id {
                    out.push_str(&format!(
                        "{}-{}\t{}\t_\t_\t_\t_\t_\t_\t_\t{}\n",
                        mwt.id_first,
                        mwt.id_last,
                        encode_field(&mwt.form),
                        encode_field(&mwt.misc)
                    ));
                    mwt_iter.next();
                }
            }
            let head = match word.head {
                Some(h) => h.to_string(),
                None => "_".to_string(),
            };
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                word.id,
                encode_field(&word.form),
                encode_field(&word.lemma),
                encode_field(&word.upos),
                encode_field(&word.xpos),
                encode_field(&word.feats),
                head,
                encode_field(&word.deprel),
                encode_field(&word.deps),
                encode_field(&word.misc)
            ));
        }
        out.push('\n');
        out
    }
}

/// Escritor horizontal: formas em uma linha, espaço suprimido quando o token
/// carrega `SpaceAfter=No`.
pub struct HorizontalWriter;

impl HorizontalWriter {
    fn write_sentence(&mut self, sentence: &Sentence) -> String {
        let mut out = String::new();
        let words: Vec<_> = sentence.words.iter().skip(1).collect();
        for (i, word) in words.iter().enumerate() {
            out.push_str(&word.form);
            let glued = word
                .misc
                .split('|')
                .any(|entry| entry == "SpaceAfter=No");
            if i + 1 < words.len() && !glued {
                out.push(' ');
            }
        }
        out.push('\n');
        out
    }
}

/// Escritor vertical: uma forma por linha, linha em branco após a sentença.
pub struct VerticalWriter;

impl VerticalWriter {
    fn write_sentence(&mut self, sentence: &Sentence) -> String {
        let mut out = String::new();
        for word in sentence.words.iter().skip(1) {
            out.push_str(&word.form);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Escritor Matxin: árvore de dependências em XML.
///
/// A moldura `<corpus>` abre na primeira sentença e fecha em
/// [`MatxinWriter::finish_document`] — o único estado entre chamadas é a
/// flag de abertura e o ordinal da sentença.
pub struct MatxinWriter {
    started: bool,
    ord: usize,
}

impl MatxinWriter {
    pub fn new() -> Self {
        Self {
            started: false,
            ord: 0,
        }
    }

    fn write_sentence(&mut self, sentence: &Sentence) -> String {
        let mut out = String::new();
        if !self.started {
            out.push_str("<corpus>\n");
            self.started = true;
        }
        self.ord += 1;
        out.push_str(&format!("<SENTENCE ord=\"{}\">\n", self.ord));
        // Tokens sem head definido são emitidos no nível da sentença,
        // junto com os dependentes diretos da raiz.
        for word in sentence.words.iter().skip(1) {
            if word.head.is_none() {
                self.write_node(sentence, word.id, 1, &mut out);
            }
        }
        for &child in &sentence.words[0].children {
            self.write_node(sentence, child, 1, &mut out);
        }
        out.push_str("</SENTENCE>\n");
        out
    }

    fn write_node(&self, sentence: &Sentence, id: usize, depth: usize, out: &mut String) {
        let word = &sentence.words[id];
        let indent = "  ".repeat(depth);
        let open = format!(
            "{indent}<NODE ord=\"{}\" form=\"{}\" lemma=\"{}\" mi=\"{}\" si=\"{}\"",
            word.id,
            escape_xml(&word.form),
            escape_xml(&word.lemma),
            escape_xml(&word.upos),
            escape_xml(&word.deprel)
        );
        if word.children.is_empty() {
            out.push_str(&open);
            out.push_str("/>\n");
            return;
        }
        out.push_str(&open);
        out.push_str(">\n");
        for &child in &word.children {
            self.write_node(sentence, child, depth + 1, out);
        }
        out.push_str(&format!("{indent}</NODE>\n"));
    }

    fn finish_document(&mut self) -> String {
        let out = if self.started {
            "</corpus>\n".to_string()
        } else {
            String::new()
        };
        self.started = false;
        self.ord = 0;
        out
    }
}

impl Default for MatxinWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Projeção para avaliação: `forma<TAB>upos<TAB>head<TAB>deprel`, uma linha
/// por token — o suficiente para alinhar predito × ouro em scripts de
/// pontuação.
pub struct EvalWriter;

impl EvalWriter {
    fn write_sentence(&mut self, sentence: &Sentence) -> String {
        let mut out = String::new();
        for word in sentence.words.iter().skip(1) {
            let head = match word.head {
                Some(h) => h.to_string(),
                None => "_".to_string(),
            };
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                encode_field(&word.form),
                encode_field(&word.upos),
                head,
                encode_field(&word.deprel)
            ));
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputFormat;
    use crate::sentence::MultiwordToken;

    fn sentenca_completa() -> Sentence {
        let mut s = Sentence::new();
        s.comments.push("sent_id = 42".into());
        for (form, lemma, upos) in [
            ("Foi", "ser", "VERB"),
            ("de", "de", "ADP"),
            ("o", "o", "DET"),
            ("lado", "lado", "NOUN"),
            (".", ".", "PUNCT"),
        ] {
            let w = s.add_word(form);
            w.lemma = lemma.to_string();
            w.upos = upos.to_string();
            w.xpos = "X".to_string();
            w.feats = "Feat=Val".to_string();
            w.deps = "0:root".to_string();
            w.misc = "M=1".to_string();
        }
        s.multiword_tokens.push(MultiwordToken {
            id_first: 2,
            id_last: 3,
            form: "do".into(),
            misc: String::new(),
        });
        s.set_head(1, Some(0), "root").unwrap();
        s.set_head(2, Some(4), "case").unwrap();
        s.set_head(3, Some(4), "det").unwrap();
        s.set_head(4, Some(1), "obl").unwrap();
        s.set_head(5, Some(1), "punct").unwrap();
        s
    }

    #[test]
    fn test_conllu_ida_e_volta() {
        let original = sentenca_completa();
        let mut writer = OutputFormat::new_output_format("conllu").unwrap();
        let text = writer.write_sentence(&original) + &writer.finish_document();

        let mut reader = InputFormat::new_conllu_input_format();
        reader.set_text(&text);
        let mut lida = Sentence::new();
        assert!(reader.next_sentence(&mut lida).unwrap());
        assert_eq!(lida, original);

        // E reescrever a sentença lida reproduz o texto byte a byte
        let mut writer2 = OutputFormat::new_output_format("conllu").unwrap();
        let text2 = writer2.write_sentence(&lida) + &writer2.finish_document();
        assert_eq!(text, text2);
    }

    #[test]
    fn test_escrita_em_streaming_e_identica_a_em_lote() {
        let a = sentenca_completa();
        let mut b = sentenca_completa();
        b.comments[0] = "sent_id = 43".into();

        // Uma chamada por sentença, concatenando
        let mut w1 = OutputFormat::new_output_format("conllu").unwrap();
        let mut streaming = String::new();
        streaming.push_str(&w1.write_sentence(&a));
        streaming.push_str(&w1.write_sentence(&b));
        streaming.push_str(&w1.finish_document());

        // "Lote": mesmo escritor lógico, passada única
        let mut w2 = OutputFormat::new_output_format("conllu").unwrap();
        let mut lote: String = [&a, &b].iter().map(|s| w2.write_sentence(s)).collect();
        lote.push_str(&w2.finish_document());

        assert_eq!(streaming, lote);
    }

    #[test]
    fn test_horizontal_respeita_space_after() {
        let mut s = Sentence::new();
        s.add_word("Olá");
        s.add_word("mundo").misc = "SpaceAfter=No".into();
        s.add_word("!");
        let mut w = OutputFormat::new_output_format("horizontal").unwrap();
        assert_eq!(w.write_sentence(&s), "Olá mundo!\n");
    }

    #[test]
    fn test_vertical_uma_forma_por_linha() {
        let mut s = Sentence::new();
        s.add_word("Olá");
        s.add_word("!");
        let mut w = OutputFormat::new_output_format("vertical").unwrap();
        assert_eq!(w.write_sentence(&s), "Olá\n!\n\n");
    }

    #[test]
    fn test_matxin_moldura_de_documento() {
        let s = sentenca_completa();
        let mut w = OutputFormat::new_output_format("matxin").unwrap();
        let parte1 = w.write_sentence(&s);
        let parte2 = w.write_sentence(&s);
        let fim = w.finish_document();

        assert!(parte1.starts_with("<corpus>\n<SENTENCE ord=\"1\">"));
        assert!(!parte2.contains("<corpus>"), "moldura abre uma única vez");
        assert!(parte2.starts_with("<SENTENCE ord=\"2\">"));
        assert_eq!(fim, "</corpus>\n");
        assert!(parte1.contains("<NODE ord=\"1\" form=\"Foi\" lemma=\"ser\" mi=\"VERB\" si=\"root\">"));
    }

    #[test]
    fn test_eval_projeta_colunas_minimas() {
        let s = sentenca_completa();
        let mut w = OutputFormat::new_output_format("eval").unwrap();
        let out = w.write_sentence(&s);
        assert!(out.starts_with("Foi\tVERB\t0\troot\n"));
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_formato_de_saida_desconhecido() {
        assert!(OutputFormat::new_output_format("json").is_err());
    }
}
