//! # udbr-core — Anotação Morfossintática e Sintática (Universal Dependencies)
//!
//! Este crate implementa um pipeline completo de anotação linguística para
//! textos em Português Brasileiro: segmenta texto bruto em sentenças e
//! tokens, atribui lema e classe gramatical a cada token e constrói a árvore
//! de dependências rotulada de cada sentença. Ele foi projetado para ser
//! didático, modular e fiel ao esquema Universal Dependencies.
//!
//! ## Arquitetura do Sistema
//!
//! O sistema segue uma arquitetura de pipeline linear, onde o dado flui e é
//! transformado passo a passo:
//!
//! 1.  **Entrada** ([`input`]): texto bruto (segmentado pelo tokenizador) ou
//!     pré-estruturado (CoNLL-U, horizontal, vertical) vira um fluxo de
//!     [`Sentence`]s.
//! 2.  **Etiquetagem** ([`model`]): um HMM com decodificação Viterbi preenche
//!     `upos`, lema, `xpos` e traços morfológicos.
//! 3.  **Análise Sintática** ([`model`]): as preferências de ligação contadas
//!     no corpus escolhem o governante e a relação de cada token, sempre
//!     produzindo uma floresta enraizada.
//! 4.  **Saída** ([`output`]): a sentença anotada é serializada em CoNLL-U,
//!     horizontal, vertical, Matxin (XML) ou na projeção de avaliação.
//!
//! O [`pipeline::Pipeline`] orquestra os quatro passos; [`trainer::Trainer`]
//! produz artefatos de modelo a partir de corpora anotados e
//! [`evaluator::Evaluator`] mede acurácia contra dados ouro.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use udbr_core::{Model, Pipeline};
//!
//! // 1. Carrega o modelo padrão (treinado no corpus embutido)
//! let model = Arc::new(Model::build());
//!
//! // 2. Monta o pipeline: tokenizar, etiquetar, analisar, emitir CoNLL-U
//! let pipeline = Pipeline::new(
//!     model,
//!     Pipeline::DEFAULT,
//!     Pipeline::DEFAULT,
//!     Pipeline::DEFAULT,
//!     Pipeline::DEFAULT,
//! );
//!
//! // 3. Processa texto bruto
//! let conllu = pipeline.process("O gato dorme. A casa é azul.").unwrap();
//! assert!(conllu.contains("gato"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`sentence`]: o modelo de dados (tokens, multipalavras, dependências).
//! - [`input`] / [`output`]: leitores e escritores de formato.
//! - [`model`]: etiquetador HMM + analisador de dependências.
//! - [`pipeline`]: orquestrador com eventos observáveis.
//! - [`trainer`] / [`evaluator`]: contratos de treino e avaliação.
//! - [`corpus`]: mini-treebank PT-BR embutido.

pub mod corpus;
pub mod error;
pub mod evaluator;
pub mod input;
pub mod model;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod sentence;
pub mod trainer;
pub mod version;

pub use error::Error;
pub use evaluator::Evaluator;
pub use input::InputFormat;
pub use model::Model;
pub use output::OutputFormat;
pub use pipeline::{Pipeline, PipelineEvent};
pub use sentence::{MultiwordToken, Sentence, Word};
pub use trainer::Trainer;
pub use version::Version;
