//! # Modelo de Anotação — Etiquetador HMM e Analisador de Dependências
//!
//! O modelo agrega os componentes estatísticos que preenchem as anotações de
//! uma [`Sentence`]:
//!
//! - **Etiquetador** ([`TaggerModel`]): um Hidden Markov Model clássico onde
//!   os estados ocultos são etiquetas UPOS e as observações são as formas.
//!   Aprende por contagem P(etiqueta|etiqueta anterior) e P(forma|etiqueta),
//!   com suavização Add-1 e recuo por sufixo para palavras desconhecidas; a
//!   decodificação é Viterbi. O léxico `(forma, etiqueta) → (lema, xpos,
//!   traços)` completa as demais colunas morfológicas.
//! - **Analisador** ([`ParserModel`]): escolhe o governante de cada token
//!   pela preferência de ligação contada no corpus — P(upos do dependente
//!   liga em upos do governante, direção e distância) — com verificação de
//!   ciclos, de modo que a saída é sempre uma floresta enraizada em 0.
//!
//! O artefato serializado é um blob JSON opaco ([`Model::save_to_bytes`]);
//! após carregado, o modelo é somente-leitura e pode ser compartilhado entre
//! pipelines e avaliadores via `Arc` sem qualquer coordenação.
//!
//! ## Probabilidades em Log-Space
//!
//! Como no HMM didático tradicional, tudo é armazenado em logaritmo para
//! evitar underflow: $\log(A \cdot B) = \log(A) + \log(B)$.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::input::{InputFormat, Tokenizer};
use crate::options::{self, Options};
use crate::sentence::Sentence;

/// Separador interno das chaves compostas dos mapas de probabilidade
/// (tabulação nunca ocorre dentro de uma forma ou etiqueta).
const SEP: char = '\t';

fn key2(a: &str, b: &str) -> String {
    format!("{a}{SEP}{b}")
}

fn key3(a: &str, b: &str, c: &str) -> String {
    format!("{a}{SEP}{b}{SEP}{c}")
}

/// Últimos três caracteres da forma, para o recuo de palavras desconhecidas.
fn suffix3(lower: &str) -> String {
    let chars: Vec<char> = lower.chars().collect();
    chars[chars.len().saturating_sub(3)..].iter().collect()
}

/// Entrada do léxico: as anotações morfológicas mais frequentes de um par
/// `(forma, upos)` no corpus de treino.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub lemma: String,
    pub xpos: String,
    pub feats: String,
}

/// Etiquetador morfológico: HMM de primeira ordem sobre etiquetas UPOS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggerModel {
    /// log P(etiqueta | etiqueta anterior), chave `anterior\tatual`.
    transition_probs: BTreeMap<String, f64>,
    /// log P(forma | etiqueta), chave `etiqueta\tforma` (forma minúscula).
    emission_probs: BTreeMap<String, f64>,
    /// log P(inicial), chave `etiqueta`.
    start_probs: BTreeMap<String, f64>,
    /// log P(sufixo | etiqueta) para formas fora do vocabulário,
    /// chave `etiqueta\tsufixo`.
    suffix_probs: BTreeMap<String, f64>,
    /// Massa de suavização por etiqueta para forma conhecida sem par contado.
    unk_emission: BTreeMap<String, f64>,
    /// Massa de suavização por etiqueta para sufixo nunca visto.
    unk_suffix: BTreeMap<String, f64>,
    /// Léxico morfológico, chave `forma\tetiqueta` (forma minúscula).
    lexicon: BTreeMap<String, LexiconEntry>,
    /// Etiquetas conhecidas, em ordem estável.
    all_tags: Vec<String>,
    /// Vocabulário de formas (minúsculas) vistas no treino.
    vocab: BTreeSet<String>,
}

impl TaggerModel {
    /// Treina por contagem sobre sentenças anotadas (aprendizado
    /// supervisionado): frequências brutas → Add-1 → log-probabilidades.
    pub fn train(corpus: &[Sentence]) -> Self {
        let mut transition_counts: HashMap<String, u32> = HashMap::new();
        let mut emission_counts: HashMap<String, u32> = HashMap::new();
        let mut start_counts: HashMap<String, u32> = HashMap::new();
        let mut suffix_counts: HashMap<String, u32> = HashMap::new();
        let mut tag_counts: HashMap<String, u32> = HashMap::new();
        let mut lexicon_counts: HashMap<String, HashMap<(String, String, String), u32>> =
            HashMap::new();
        let mut vocab: BTreeSet<String> = BTreeSet::new();
        let mut tag_order: Vec<String> = Vec::new();
        let mut suffixes: BTreeSet<String> = BTreeSet::new();

        for sentence in corpus {
            let mut prev: Option<&str> = None;
            for word in sentence.words.iter().skip(1) {
                let tag = word.upos.as_str();
                let lower = word.form.to_lowercase();
                if !tag_order.iter().any(|t| t == tag) {
                    tag_order.push(tag.to_string());
                }
                *tag_counts.entry(tag.to_string()).or_default() += 1;
                *emission_counts.entry(key2(tag, &lower)).or_default() += 1;
                let suf = suffix3(&lower);
                suffixes.insert(suf.clone());
                *suffix_counts.entry(key2(tag, &suf)).or_default() += 1;
                vocab.insert(lower.clone());
                match prev {
                    None => *start_counts.entry(tag.to_string()).or_default() += 1,
                    Some(p) => *transition_counts.entry(key2(p, tag)).or_default() += 1,
                }
                prev = Some(tag);

                *lexicon_counts
                    .entry(key2(&lower, tag))
                    .or_default()
                    .entry((word.lemma.clone(), word.xpos.clone(), word.feats.clone()))
                    .or_default() += 1;
            }
        }

        let n_tags = tag_order.len().max(1) as f64;
        let n_vocab = vocab.len() as f64;
        let n_suffixes = suffixes.len() as f64;
        let total_starts: u32 = start_counts.values().sum();

        let mut model = TaggerModel {
            all_tags: tag_order.clone(),
            vocab,
            ..TaggerModel::default()
        };

        for tag in &tag_order {
            let tag_total = *tag_counts.get(tag).unwrap_or(&0) as f64;
            // Emissão: Add-1 sobre o vocabulário (+1 para a forma desconhecida)
            let denom = tag_total + n_vocab + 1.0;
            model.unk_emission.insert(tag.clone(), (1.0 / denom).ln());
            for other in &model.vocab {
                if let Some(&c) = emission_counts.get(&key2(tag, other)) {
                    model
                        .emission_probs
                        .insert(key2(tag, other), ((c as f64 + 1.0) / denom).ln());
                }
            }
            // Sufixos: mesma suavização, sobre o inventário de sufixos
            let suf_denom = tag_total + n_suffixes + 1.0;
            model.unk_suffix.insert(tag.clone(), (1.0 / suf_denom).ln());
            for suf in &suffixes {
                if let Some(&c) = suffix_counts.get(&key2(tag, suf)) {
                    model
                        .suffix_probs
                        .insert(key2(tag, suf), ((c as f64 + 1.0) / suf_denom).ln());
                }
            }
            // Início de sentença
            let start = *start_counts.get(tag).unwrap_or(&0) as f64;
            model.start_probs.insert(
                tag.clone(),
                ((start + 1.0) / (total_starts as f64 + n_tags)).ln(),
            );
            // Transições
            for next in &tag_order {
                let c = *transition_counts.get(&key2(tag, next)).unwrap_or(&0) as f64;
                model
                    .transition_probs
                    .insert(key2(tag, next), ((c + 1.0) / (tag_total + n_tags)).ln());
            }
        }

        // Léxico: anotação mais frequente por (forma, etiqueta)
        for (key, variants) in lexicon_counts {
            let best = variants
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|((lemma, xpos, feats), _)| LexiconEntry { lemma, xpos, feats });
            if let Some(entry) = best {
                model.lexicon.insert(key, entry);
            }
        }

        model
    }

    /// log P(forma | etiqueta), com recuo por sufixo fora do vocabulário.
    fn emission(&self, tag: &str, form: &str) -> f64 {
        let lower = form.to_lowercase();
        if self.vocab.contains(&lower) {
            self.emission_probs
                .get(&key2(tag, &lower))
                .copied()
                .unwrap_or_else(|| *self.unk_emission.get(tag).unwrap_or(&-20.0))
        } else {
            let suf = suffix3(&lower);
            self.suffix_probs
                .get(&key2(tag, &suf))
                .copied()
                .unwrap_or_else(|| *self.unk_suffix.get(tag).unwrap_or(&-20.0))
        }
    }

    /// Etiqueta a sentença via Viterbi, preenchendo `upos`, `lemma`, `xpos` e
    /// `feats` de todos os tokens (sobrescreve anotações existentes).
    pub fn tag(&self, sentence: &mut Sentence) {
        let n = sentence.words.len().saturating_sub(1);
        if n == 0 || self.all_tags.is_empty() {
            return;
        }
        let t = self.all_tags.len();

        // viterbi[i][k]: melhor score terminando no token i com a etiqueta k
        let mut scores = vec![vec![f64::NEG_INFINITY; t]; n];
        let mut backptr = vec![vec![0usize; t]; n];

        for (k, tag) in self.all_tags.iter().enumerate() {
            scores[0][k] = self.start_probs.get(tag).copied().unwrap_or(-20.0)
                + self.emission(tag, &sentence.words[1].form);
        }
        for i in 1..n {
            for (k, tag) in self.all_tags.iter().enumerate() {
                let emit = self.emission(tag, &sentence.words[i + 1].form);
                for (j, prev) in self.all_tags.iter().enumerate() {
                    let trans = self
                        .transition_probs
                        .get(&key2(prev, tag))
                        .copied()
                        .unwrap_or(-20.0);
                    let candidate = scores[i - 1][j] + trans + emit;
                    if candidate > scores[i][k] {
                        scores[i][k] = candidate;
                        backptr[i][k] = j;
                    }
                }
            }
        }

        // Backtracking do caminho ótimo
        let mut best = 0;
        for k in 1..t {
            if scores[n - 1][k] > scores[n - 1][best] {
                best = k;
            }
        }
        let mut path = vec![best; n];
        for i in (1..n).rev() {
            path[i - 1] = backptr[i][path[i]];
        }

        for (i, &k) in path.iter().enumerate() {
            let tag = self.all_tags[k].clone();
            let word = &mut sentence.words[i + 1];
            let lower = word.form.to_lowercase();
            word.upos = tag.clone();
            match self.lexicon.get(&key2(&lower, &tag)) {
                Some(entry) => {
                    word.lemma = entry.lemma.clone();
                    word.xpos = entry.xpos.clone();
                    word.feats = entry.feats.clone();
                }
                None => {
                    // Fora do léxico: o lema recua para a forma minúscula
                    word.lemma = lower;
                    word.xpos.clear();
                    word.feats.clear();
                }
            }
        }
    }
}

/// Direção + distância discretizada entre dependente e governante.
fn attach_bucket(dep: usize, head: usize) -> String {
    let (dir, dist) = if head > dep {
        ("R", head - dep)
    } else {
        ("L", dep - head)
    };
    let bucket = match dist {
        1 => "1",
        2 => "2",
        3 => "3",
        _ => "4+",
    };
    format!("{dir}{bucket}")
}

/// Analisador de dependências por preferência de ligação.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserModel {
    /// Contagem log-suavizada de `dep_upos\thead_upos\tdireção+distância`.
    attach_scores: BTreeMap<String, f64>,
    /// Contagem log-suavizada de ligação à raiz, chave `dep_upos`.
    root_scores: BTreeMap<String, f64>,
    /// Relação mais frequente por `dep_upos\thead_upos\tdireção`.
    deprel_best: BTreeMap<String, String>,
    /// Relação mais frequente de ligação à raiz, chave `dep_upos`.
    root_deprel: BTreeMap<String, String>,
}

impl ParserModel {
    /// Treina contando as preferências de ligação do corpus anotado.
    pub fn train(corpus: &[Sentence]) -> Self {
        let mut attach_counts: HashMap<String, u32> = HashMap::new();
        let mut root_counts: HashMap<String, u32> = HashMap::new();
        let mut deprel_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();
        let mut root_deprel_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();

        for sentence in corpus {
            for word in sentence.words.iter().skip(1) {
                let head = match word.head {
                    Some(h) => h,
                    None => continue,
                };
                if head == 0 {
                    *root_counts.entry(word.upos.clone()).or_default() += 1;
                    *root_deprel_counts
                        .entry(word.upos.clone())
                        .or_default()
                        .entry(word.deprel.clone())
                        .or_default() += 1;
                } else {
                    let head_upos = &sentence.words[head].upos;
                    let bucket = attach_bucket(word.id, head);
                    *attach_counts
                        .entry(key3(&word.upos, head_upos, &bucket))
                        .or_default() += 1;
                    let dir = &bucket[..1];
                    *deprel_counts
                        .entry(key3(&word.upos, head_upos, dir))
                        .or_default()
                        .entry(word.deprel.clone())
                        .or_default() += 1;
                }
            }
        }

        let mut model = ParserModel::default();
        for (key, c) in attach_counts {
            model.attach_scores.insert(key, (c as f64 + 1.0).ln());
        }
        for (key, c) in root_counts {
            model.root_scores.insert(key, (c as f64 + 1.0).ln());
        }
        for (key, variants) in deprel_counts {
            if let Some(best) = variants
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            {
                model.deprel_best.insert(key, best.0);
            }
        }
        for (key, variants) in root_deprel_counts {
            if let Some(best) = variants
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            {
                model.root_deprel.insert(key, best.0);
            }
        }
        model
    }

    /// Score de ligar o token `dep` ao candidato `head` (0 = raiz).
    /// A penalidade por distância desempata a favor de governantes próximos.
    fn score(&self, sentence: &Sentence, dep: usize, head: usize) -> f64 {
        let dep_upos = &sentence.words[dep].upos;
        if head == 0 {
            return self.root_scores.get(dep_upos).copied().unwrap_or(0.0) - 0.5;
        }
        let head_upos = &sentence.words[head].upos;
        let bucket = attach_bucket(dep, head);
        let base = self
            .attach_scores
            .get(&key3(dep_upos, head_upos, &bucket))
            .copied()
            .unwrap_or(0.0);
        let dist = if head > dep { head - dep } else { dep - head };
        base - 0.1 * dist as f64
    }

    /// Analisa a sentença: desfaz os vínculos existentes e escolhe, token a
    /// token, o governante de maior score que não introduza ciclo. Como a
    /// raiz (score sempre definido) nunca forma ciclo, todo token recebe um
    /// governante e o resultado é uma floresta enraizada em 0.
    pub fn parse(&self, sentence: &mut Sentence) -> Result<(), Error> {
        sentence.unlink_all_words();
        let n = sentence.words.len();
        for dep in 1..n {
            let mut best_head = 0usize;
            let mut best_score = self.score(sentence, dep, 0);
            for head in 1..n {
                if head == dep || creates_cycle(sentence, dep, head) {
                    continue;
                }
                let s = self.score(sentence, dep, head);
                if s > best_score {
                    best_score = s;
                    best_head = head;
                }
            }
            let deprel = self.deprel_for(sentence, dep, best_head);
            sentence.set_head(dep, Some(best_head), &deprel)?;
        }
        Ok(())
    }

    fn deprel_for(&self, sentence: &Sentence, dep: usize, head: usize) -> String {
        let dep_upos = &sentence.words[dep].upos;
        if head == 0 {
            return self
                .root_deprel
                .get(dep_upos)
                .cloned()
                .unwrap_or_else(|| "root".to_string());
        }
        let head_upos = &sentence.words[head].upos;
        let dir = if head > dep { "R" } else { "L" };
        self.deprel_best
            .get(&key3(dep_upos, head_upos, dir))
            .cloned()
            .unwrap_or_else(|| "dep".to_string())
    }
}

/// Verdadeiro se ligar `dep` a `head` fecharia um ciclo com os vínculos já
/// atribuídos (segue a cadeia de governantes a partir de `head`).
fn creates_cycle(sentence: &Sentence, dep: usize, head: usize) -> bool {
    let mut current = head;
    while current != 0 {
        if current == dep {
            return true;
        }
        current = match sentence.words[current].head {
            Some(h) => h,
            None => return false,
        };
    }
    false
}

/// Recursos do segmentador/tokenizador embutidos no artefato.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerResources {
    /// Abreviações (minúsculas, sem ponto) que não encerram sentença.
    pub abbreviations: Vec<String>,
}

/// O modelo completo: tokenizador, etiquetador e analisador, cada componente
/// opcional (um artefato treinado sem determinado estágio simplesmente não o
/// oferece).
///
/// Após construído/carregado o modelo é somente-leitura; compartilhe entre
/// pipelines com `Arc<Model>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub tokenizer: Option<TokenizerResources>,
    pub tagger: Option<TaggerModel>,
    pub parser: Option<ParserModel>,
}

impl Model {
    /// Valor de opções "usar padrões embutidos do estágio".
    pub const DEFAULT: &'static str = options::DEFAULT;
    /// Opção do tokenizador: entrada já segmentada em sentenças (uma por linha).
    pub const TOKENIZER_PRESEGMENTED: &'static str = "presegmented";

    /// Constrói o modelo padrão, treinado no corpus embutido.
    pub fn build() -> Self {
        let corpus = crate::corpus::get_corpus();
        Model {
            tokenizer: Some(TokenizerResources {
                abbreviations: Tokenizer::default_abbreviations(),
            }),
            tagger: Some(TaggerModel::train(&corpus)),
            parser: Some(ParserModel::train(&corpus)),
        }
    }

    /// Carrega um artefato serializado do disco.
    pub fn load(path: &str) -> Result<Model, Error> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Model(format!("não foi possível ler `{path}`: {e}")))?;
        Self::load_from_bytes(&bytes)
    }

    /// Desserializa um artefato a partir dos bytes.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Model, Error> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Model(format!("artefato de modelo inválido: {e}")))
    }

    /// Serializa o modelo como blob opaco.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::Model(format!("falha ao serializar: {e}")))
    }

    /// Cria um tokenizador com os recursos do modelo. A única opção
    /// reconhecida é [`Model::TOKENIZER_PRESEGMENTED`].
    pub fn new_tokenizer(&self, options_raw: &str) -> Result<InputFormat, Error> {
        let resources = self.tokenizer.as_ref().ok_or_else(|| {
            Error::StageUnavailable("o modelo não contém tokenizador".to_string())
        })?;
        let opts = Options::parse_known(
            options_raw,
            &[Self::TOKENIZER_PRESEGMENTED],
            "tokenizador",
        )?;
        let tokenizer =
            Tokenizer::with_abbreviations(resources.abbreviations.iter().cloned().collect());
        if opts.flag(Self::TOKENIZER_PRESEGMENTED) {
            Ok(InputFormat::new_presegmented_tokenizer(tokenizer))
        } else {
            Ok(InputFormat::Tokenizer(tokenizer))
        }
    }

    /// Etiqueta a sentença (upos, lema, xpos, traços). O etiquetador ainda
    /// não reconhece opções além dos sentinelas.
    pub fn tag(&self, sentence: &mut Sentence, options_raw: &str) -> Result<(), Error> {
        let tagger = self.tagger.as_ref().ok_or_else(|| {
            Error::StageUnavailable("o modelo não contém etiquetador".to_string())
        })?;
        Options::parse_known(options_raw, &[], "etiquetador")?;
        tagger.tag(sentence);
        Ok(())
    }

    /// Constrói a árvore de dependências da sentença. O analisador ainda não
    /// reconhece opções além dos sentinelas.
    pub fn parse(&self, sentence: &mut Sentence, options_raw: &str) -> Result<(), Error> {
        let parser = self.parser.as_ref().ok_or_else(|| {
            Error::StageUnavailable("o modelo não contém analisador sintático".to_string())
        })?;
        Options::parse_known(options_raw, &[], "analisador")?;
        parser.parse(sentence)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::build()
    }
}
