//! # Pipeline de Anotação — Orquestrador com Eventos Observáveis
//!
//! O pipeline encadeia leitor de formato → etiquetador → analisador →
//! escritor de formato em uma única transformação "texto bruto entra,
//! documento anotado sai". Cada um dos cinco aspectos (modelo, entrada,
//! etiquetador, analisador, saída) é configurável de forma independente
//! depois da construção.
//!
//! Cada estágio emite eventos por um canal Rust (`mpsc`), permitindo que o
//! servidor WebSocket transmita o progresso em tempo real para o cliente;
//! [`Pipeline::process`] é o invólucro síncrono que consome o canal e
//! devolve só o resultado final.
//!
//! ## Sentinelas de Configuração
//!
//! - [`Pipeline::NONE`] (`"none"`): **pula** o estágio. Na entrada, significa
//!   "o texto já está tokenizado em CoNLL-U".
//! - [`Pipeline::DEFAULT`] (`"default"`): executa o estágio com as
//!   configurações embutidas do modelo.
//!
//! Os dois estados nunca se confundem: desabilitar o etiquetador e ainda
//! assim rodar o analisador é uma combinação válida (o analisador consome a
//! informação de etiquetas que houver, inclusive nenhuma).
//!
//! ## Política de Falha
//!
//! A falha de qualquer estágio aborta a chamada inteira: nenhuma saída
//! parcialmente anotada é aproveitada (o erro acumulado é devolvido ao
//! chamador).

use std::sync::mpsc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::Model;
use crate::options;
use crate::output::OutputFormat;
use crate::sentence::Sentence;

/// Eventos emitidos durante o processamento, um por passo observável.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Uma sentença foi extraída da entrada.
    SentenceRead { index: usize, forms: Vec<String> },
    /// O etiquetador preencheu as anotações morfológicas da sentença.
    Tagged {
        index: usize,
        upos: Vec<String>,
        lemmas: Vec<String>,
    },
    /// O analisador construiu a árvore de dependências da sentença.
    Parsed {
        index: usize,
        heads: Vec<usize>,
        deprels: Vec<String>,
    },
    /// O escritor serializou a sentença como o próximo trecho do documento.
    Written { index: usize, chunk: String },
    /// Processamento concluído com sucesso.
    Done {
        output: String,
        total_sentences: usize,
        processing_ms: u64,
    },
    /// Falha irrecuperável — os estágios restantes foram abortados.
    Error { error: Error },
}

/// O orquestrador do pipeline de anotação.
///
/// Guarda uma referência somente-leitura ao modelo (compartilhável entre
/// vários pipelines) e as quatro strings de configuração de estágio/formato.
pub struct Pipeline {
    model: Arc<Model>,
    input: String,
    tagger: String,
    parser: String,
    output: String,
}

impl Pipeline {
    /// Sentinela "usar os padrões embutidos".
    pub const DEFAULT: &'static str = options::DEFAULT;
    /// Sentinela "pular este estágio".
    pub const NONE: &'static str = options::NONE;

    /// Cria um pipeline com as cinco configurações.
    ///
    /// `input` aceita `tokenize` (opcionalmente `tokenize=opções`, ex:
    /// `tokenize=presegmented`), um nome de formato pré-tokenizado
    /// (`conllu`, `horizontal`, `vertical`) ou os sentinelas; `output`
    /// aceita um nome de formato de saída ou [`Pipeline::DEFAULT`].
    pub fn new(model: Arc<Model>, input: &str, tagger: &str, parser: &str, output: &str) -> Self {
        Self {
            model,
            input: input.to_string(),
            tagger: tagger.to_string(),
            parser: parser.to_string(),
            output: output.to_string(),
        }
    }

    /// Troca o modelo compartilhado.
    pub fn set_model(&mut self, model: Arc<Model>) {
        self.model = model;
    }

    /// Troca a configuração de entrada/tokenização.
    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    /// Troca a configuração do etiquetador.
    pub fn set_tagger(&mut self, tagger: &str) {
        self.tagger = tagger.to_string();
    }

    /// Troca a configuração do analisador.
    pub fn set_parser(&mut self, parser: &str) {
        self.parser = parser.to_string();
    }

    /// Troca o formato de saída.
    pub fn set_output(&mut self, output: &str) {
        self.output = output.to_string();
    }

    /// Cria o leitor de formato a partir da configuração de entrada.
    fn make_reader(&self) -> Result<crate::input::InputFormat, Error> {
        let cfg = self.input.as_str();
        if cfg == Self::NONE {
            // Entrada já tokenizada: o texto bruto é CoNLL-U
            return Ok(crate::input::InputFormat::new_conllu_input_format());
        }
        if cfg == Self::DEFAULT || cfg == "tokenize" {
            return self.model.new_tokenizer(Model::DEFAULT);
        }
        if let Some(opts) = cfg.strip_prefix("tokenize=") {
            return self.model.new_tokenizer(opts);
        }
        crate::input::InputFormat::new_input_format(cfg)
    }

    /// Cria o escritor de formato a partir da configuração de saída.
    fn make_writer(&self) -> Result<OutputFormat, Error> {
        let cfg = if self.output == Self::DEFAULT {
            "conllu"
        } else {
            self.output.as_str()
        };
        OutputFormat::new_output_format(cfg)
    }

    /// Processa o documento de forma síncrona e devolve o texto serializado.
    ///
    /// Internamente consome o fluxo de eventos de
    /// [`Pipeline::process_streaming`]; o primeiro evento de erro aborta e é
    /// devolvido como `Err`.
    pub fn process(&self, text: &str) -> Result<String, Error> {
        let (tx, rx) = mpsc::channel();
        self.process_streaming(text, tx);
        let mut result = None;
        while let Ok(event) = rx.recv() {
            match event {
                PipelineEvent::Done { output, .. } => result = Some(output),
                PipelineEvent::Error { error } => return Err(error),
                _ => {}
            }
        }
        // O canal fecha sempre com Done ou Error; Done sem saída não ocorre.
        Ok(result.unwrap_or_default())
    }

    /// Executa o pipeline empurrando [`PipelineEvent`]s pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `SentenceRead` por sentença extraída;
    /// 2. `Tagged`/`Parsed` conforme os estágios habilitados;
    /// 3. `Written` com o trecho serializado;
    /// 4. `Done` com o documento completo — ou `Error` no primeiro estágio
    ///    que falhar.
    pub fn process_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = std::time::Instant::now();
        if let Err(error) = self.run_stages(text, &tx, start) {
            let _ = tx.send(PipelineEvent::Error { error });
        }
    }

    fn run_stages(
        &self,
        text: &str,
        tx: &mpsc::Sender<PipelineEvent>,
        start: std::time::Instant,
    ) -> Result<(), Error> {
        let mut reader = self.make_reader()?;
        let mut writer = self.make_writer()?;

        reader.set_text(text);
        let mut output = String::new();
        let mut sentence = Sentence::new();
        let mut index = 0usize;

        while reader.next_sentence(&mut sentence)? {
            let _ = tx.send(PipelineEvent::SentenceRead {
                index,
                forms: sentence
                    .words
                    .iter()
                    .skip(1)
                    .map(|w| w.form.clone())
                    .collect(),
            });

            if self.tagger != Self::NONE {
                self.model.tag(&mut sentence, &self.tagger)?;
                let _ = tx.send(PipelineEvent::Tagged {
                    index,
                    upos: sentence
                        .words
                        .iter()
                        .skip(1)
                        .map(|w| w.upos.clone())
                        .collect(),
                    lemmas: sentence
                        .words
                        .iter()
                        .skip(1)
                        .map(|w| w.lemma.clone())
                        .collect(),
                });
            }

            if self.parser != Self::NONE {
                self.model.parse(&mut sentence, &self.parser)?;
                let _ = tx.send(PipelineEvent::Parsed {
                    index,
                    heads: sentence
                        .words
                        .iter()
                        .skip(1)
                        .map(|w| w.head.unwrap_or(0))
                        .collect(),
                    deprels: sentence
                        .words
                        .iter()
                        .skip(1)
                        .map(|w| w.deprel.clone())
                        .collect(),
                });
            }

            let chunk = writer.write_sentence(&sentence);
            output.push_str(&chunk);
            let _ = tx.send(PipelineEvent::Written { index, chunk });
            index += 1;
        }
        output.push_str(&writer.finish_document());

        tracing::debug!(sentencas = index, "documento processado");
        let _ = tx.send(PipelineEvent::Done {
            output,
            total_sentences: index,
            processing_ms: start.elapsed().as_millis() as u64,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputFormat;

    fn pipeline_padrao() -> Pipeline {
        Pipeline::new(
            Arc::new(Model::build()),
            Pipeline::DEFAULT,
            Pipeline::DEFAULT,
            Pipeline::DEFAULT,
            Pipeline::DEFAULT,
        )
    }

    fn parse_conllu(texto: &str) -> Vec<Sentence> {
        let mut reader = InputFormat::new_conllu_input_format();
        reader.set_text(texto);
        let mut out = Vec::new();
        let mut s = Sentence::new();
        while reader.next_sentence(&mut s).unwrap() {
            out.push(s.clone());
        }
        out
    }

    #[test]
    fn test_process_hello_world() {
        let pipeline = pipeline_padrao();
        let saida = pipeline.process("Hello world.").unwrap();
        let sentencas = parse_conllu(&saida);
        assert_eq!(sentencas.len(), 1);
        let s = &sentencas[0];
        let formas: Vec<&str> = s.words.iter().skip(1).map(|w| w.form.as_str()).collect();
        assert_eq!(formas, vec!["Hello", "world", "."]);
        for w in s.words.iter().skip(1) {
            assert!(!w.upos.is_empty());
            let head = w.head.expect("head atribuído");
            assert!(head <= 3);
        }
        s.validate().unwrap();
    }

    #[test]
    fn test_pular_etiquetador_mas_analisar() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_tagger(Pipeline::NONE);
        let saida = pipeline.process("O gato dorme.").unwrap();
        let s = &parse_conllu(&saida)[0];
        for w in s.words.iter().skip(1) {
            // O tokenizador não produz anotação morfológica; com o
            // etiquetador desligado ela permanece intocada
            assert!(w.upos.is_empty());
            assert!(w.lemma.is_empty());
            // ... mas o analisador rodou mesmo assim
            assert!(w.head.is_some());
        }
    }

    #[test]
    fn test_pular_tudo_e_passar_adiante() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_tagger(Pipeline::NONE);
        pipeline.set_parser(Pipeline::NONE);
        pipeline.set_output("horizontal");
        let saida = pipeline.process("O gato dorme.").unwrap();
        assert_eq!(saida, "O gato dorme.\n");
    }

    #[test]
    fn test_entrada_none_le_conllu() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_input(Pipeline::NONE);
        pipeline.set_tagger(Pipeline::NONE);
        pipeline.set_parser(Pipeline::NONE);
        let conllu = crate::corpus::corpus_conllu();
        let saida = pipeline.process(conllu).unwrap();
        assert_eq!(saida, conllu, "leitura + escrita CoNLL-U é identidade");
    }

    #[test]
    fn test_entrada_presegmentada() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_input("tokenize=presegmented");
        pipeline.set_tagger(Pipeline::NONE);
        pipeline.set_parser(Pipeline::NONE);
        pipeline.set_output("horizontal");
        let saida = pipeline.process("Primeira linha. Ainda a primeira\nSegunda\n").unwrap();
        assert_eq!(saida.lines().count(), 2);
    }

    #[test]
    fn test_estagio_indisponivel_aborta() {
        let modelo_sem_parser = Model {
            parser: None,
            ..Model::build()
        };
        let mut pipeline = pipeline_padrao();
        pipeline.set_model(Arc::new(modelo_sem_parser));
        let err = pipeline.process("O gato dorme.").unwrap_err();
        assert!(matches!(err, Error::StageUnavailable(_)));
    }

    #[test]
    fn test_configuracao_invalida_aborta() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_output("pdf");
        assert!(matches!(
            pipeline.process("Oi.").unwrap_err(),
            Error::InvalidConfiguration(_)
        ));

        let mut pipeline = pipeline_padrao();
        pipeline.set_input("tokenize=velocidade=9");
        assert!(matches!(
            pipeline.process("Oi.").unwrap_err(),
            Error::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_eventos_em_ordem() {
        let pipeline = pipeline_padrao();
        let (tx, rx) = mpsc::channel();
        pipeline.process_streaming("O sol brilha.", tx);
        let eventos: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(eventos.first(), Some(PipelineEvent::SentenceRead { .. })));
        assert!(matches!(eventos.last(), Some(PipelineEvent::Done { .. })));
        assert!(eventos
            .iter()
            .any(|e| matches!(e, PipelineEvent::Tagged { .. })));
        assert!(eventos
            .iter()
            .any(|e| matches!(e, PipelineEvent::Parsed { .. })));
    }

    #[test]
    fn test_erro_vira_evento() {
        let mut pipeline = pipeline_padrao();
        pipeline.set_input(Pipeline::NONE);
        let (tx, rx) = mpsc::channel();
        pipeline.process_streaming("isto não é conllu\n\n", tx);
        let eventos: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(eventos.last(), Some(PipelineEvent::Error { .. })));
    }
}
