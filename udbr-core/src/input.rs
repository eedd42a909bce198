//! # Leitores de Formato — do Texto Bruto à Sentença
//!
//! Responsáveis por transformar texto (bruto ou pré-estruturado) em um fluxo
//! de [`Sentence`]s completas, prontas para os estágios de anotação.
//!
//! ## Variantes Disponíveis
//!
//! - **Tokenizer**: segmenta texto bruto em sentenças e tokens usando
//!   heurísticas de pontuação, abreviações e fronteiras Unicode.
//! - **Conllu**: lê o formato tabular CoNLL-U (um token por linha, 10 colunas).
//! - **Horizontal**: uma sentença por linha, tokens separados por espaço.
//! - **Vertical**: um token por linha, linha em branco termina a sentença.
//! - **Presegmented**: envolve o tokenizador; cada linha da entrada já é uma
//!   sentença e o tokenizador interno só divide os tokens (nunca re-segmenta).
//!
//! ## Contrato do Fluxo
//!
//! 1. [`InputFormat::reset_document`] descarta qualquer estado pendente.
//! 2. [`InputFormat::set_text`] apenas acumula texto no buffer do documento.
//! 3. [`InputFormat::next_sentence`] extrai a próxima sentença: `Ok(true)` com
//!    a sentença preenchida, `Ok(false)` quando o buffer se esgotou, `Err(..)`
//!    quando a entrada é malformada (nunca para simples esgotamento).
//!
//! Política de recuperação: os leitores `Conllu` e `Vertical` **abortam** a
//! leitura inteira na primeira linha malformada; `Horizontal` e o tokenizador
//! aceitam qualquer texto.

use std::collections::HashSet;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Error;
use crate::sentence::{MultiwordToken, Sentence};

/// Abreviações comuns em PT-BR cujo ponto final não encerra a sentença.
const ABBREVIATIONS: &[&str] = &[
    "dr", "dra", "sr", "sra", "srta", "prof", "profa", "gov", "dep", "sen",
    "min", "gen", "cap", "sgt", "cel", "adm", "des", "pres", "eng", "arq",
    "etc", "av", "tel", "fax", "art", "pág", "pag", "núm", "vol", "op",
    "ibid", "obs", "ref", "cia", "ltda",
];

/// Pontuações que encerram sentença.
const TERMINATORS: &[char] = &['.', '!', '?', '…'];

/// Fechamentos que podem seguir o terminador sem sair da sentença.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '»', '”', '’'];

/// Um leitor de formato de entrada (registro fechado de variantes).
///
/// Construa pelo nome com [`InputFormat::new_input_format`] ou pelas fábricas
/// específicas; o conjunto de variantes é fixo e enumerável.
#[derive(Debug)]
pub enum InputFormat {
    /// Segmentador de texto bruto.
    Tokenizer(Tokenizer),
    /// Leitor do formato tabular CoNLL-U.
    Conllu(ConlluReader),
    /// Uma sentença por linha, tokens separados por espaço.
    Horizontal(HorizontalReader),
    /// Um token por linha, linha em branco termina a sentença.
    Vertical(VerticalReader),
    /// Tokenizador envolto: cada linha da entrada é uma sentença.
    Presegmented(PresegmentedReader),
}

impl InputFormat {
    /// Cria um leitor pelo nome do formato: `conllu`, `horizontal`,
    /// `vertical` ou `generic_tokenizer`.
    pub fn new_input_format(name: &str) -> Result<InputFormat, Error> {
        match name {
            "conllu" => Ok(Self::new_conllu_input_format()),
            "horizontal" => Ok(Self::new_horizontal_input_format()),
            "vertical" => Ok(Self::new_vertical_input_format()),
            "generic_tokenizer" => Ok(InputFormat::Tokenizer(Tokenizer::new())),
            other => Err(Error::InvalidConfiguration(format!(
                "formato de entrada desconhecido: `{other}`"
            ))),
        }
    }

    /// Leitor CoNLL-U.
    pub fn new_conllu_input_format() -> InputFormat {
        InputFormat::Conllu(ConlluReader::new())
    }

    /// Leitor horizontal.
    pub fn new_horizontal_input_format() -> InputFormat {
        InputFormat::Horizontal(HorizontalReader::new())
    }

    /// Leitor vertical.
    pub fn new_vertical_input_format() -> InputFormat {
        InputFormat::Vertical(VerticalReader::new())
    }

    /// Envolve um tokenizador em modo pré-segmentado: cada linha já é uma
    /// sentença; o tokenizador interno apenas divide tokens dentro da linha.
    pub fn new_presegmented_tokenizer(inner: Tokenizer) -> InputFormat {
        InputFormat::Presegmented(PresegmentedReader::new(inner))
    }

    /// Descarta o estado de documento (texto pendente, contadores de linha).
    pub fn reset_document(&mut self) {
        match self {
            InputFormat::Tokenizer(r) => r.reset_document(),
            InputFormat::Conllu(r) => r.reset_document(),
            InputFormat::Horizontal(r) => r.reset_document(),
            InputFormat::Vertical(r) => r.reset_document(),
            InputFormat::Presegmented(r) => r.reset_document(),
        }
    }

    /// Acumula texto no buffer do documento corrente. Não produz sentenças.
    pub fn set_text(&mut self, text: &str) {
        match self {
            InputFormat::Tokenizer(r) => r.set_text(text),
            InputFormat::Conllu(r) => r.set_text(text),
            InputFormat::Horizontal(r) => r.set_text(text),
            InputFormat::Vertical(r) => r.set_text(text),
            InputFormat::Presegmented(r) => r.set_text(text),
        }
    }

    /// Extrai a próxima sentença do buffer para `sentence` (que é limpa
    /// antes). `Ok(false)` indica esgotamento, sem erro.
    pub fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        match self {
            InputFormat::Tokenizer(r) => r.next_sentence(sentence),
            InputFormat::Conllu(r) => r.next_sentence(sentence),
            InputFormat::Horizontal(r) => r.next_sentence(sentence),
            InputFormat::Vertical(r) => r.next_sentence(sentence),
            InputFormat::Presegmented(r) => r.next_sentence(sentence),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizador de texto bruto
// ---------------------------------------------------------------------------

/// Segmentador de texto bruto em sentenças e tokens.
///
/// A segmentação de sentenças procura um terminador (`.`, `!`, `?`, `…`) que
/// não pertença a uma abreviação conhecida, a uma inicial ("J.") nem a um
/// número decimal, seguido de espaço e de um começo plausível de sentença
/// (maiúscula, dígito ou abertura de citação). A tokenização usa fronteiras
/// de palavra Unicode, protegendo e-mails e URLs de serem divididos, e
/// registra `SpaceAfter=No` em `misc` quando não há espaço após o token.
#[derive(Debug)]
pub struct Tokenizer {
    buffer: String,
    abbreviations: HashSet<String>,
    email_re: Regex,
    url_re: Regex,
}

impl Tokenizer {
    /// Tokenizador com a lista embutida de abreviações PT-BR.
    pub fn new() -> Self {
        Self::with_abbreviations(ABBREVIATIONS.iter().map(|a| a.to_string()).collect())
    }

    /// A lista embutida de abreviações (minúsculas, sem o ponto), para quem
    /// monta recursos de tokenização próprios.
    pub fn default_abbreviations() -> Vec<String> {
        ABBREVIATIONS.iter().map(|a| a.to_string()).collect()
    }

    /// Tokenizador com lista própria de abreviações (minúsculas, sem ponto).
    pub fn with_abbreviations(abbreviations: HashSet<String>) -> Self {
        Self {
            buffer: String::new(),
            abbreviations,
            email_re: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("regex de e-mail válida"),
            url_re: Regex::new(r"(?:https?://|www\.)[^\s]+").expect("regex de URL válida"),
        }
    }

    fn reset_document(&mut self) {
        self.buffer.clear();
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        sentence.clear();
        loop {
            let rest = self.buffer.trim_start();
            if rest.is_empty() {
                self.buffer.clear();
                return Ok(false);
            }
            let skipped = self.buffer.len() - rest.len();
            let end = self
                .find_sentence_end(rest)
                .unwrap_or(rest.len());
            let chunk_range = skipped..skipped + end;
            let tokens = self.tokenize_chunk(&self.buffer[chunk_range.clone()]);
            self.buffer.drain(..chunk_range.end);

            if tokens.is_empty() {
                continue;
            }
            for (form, space_after) in tokens {
                let word = sentence.add_word(&form);
                if !space_after {
                    word.misc = "SpaceAfter=No".to_string();
                }
            }
            // O último token da sentença é seguido por fronteira de sentença,
            // não por colagem — nunca carrega SpaceAfter=No.
            if let Some(last) = sentence.words.last_mut() {
                if last.misc == "SpaceAfter=No" {
                    last.misc.clear();
                }
            }
            return Ok(true);
        }
    }

    /// Índice de byte logo após o fim da primeira sentença de `text`, ou
    /// `None` se nenhum terminador de sentença foi encontrado.
    fn find_sentence_end(&self, text: &str) -> Option<usize> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut i = 0;
        while i < chars.len() {
            let (_, ch) = chars[i];
            if !TERMINATORS.contains(&ch) {
                i += 1;
                continue;
            }
            if ch == '.' && !self.dot_ends_sentence(text, &chars, i) {
                i += 1;
                continue;
            }
            // Consome a sequência de terminadores ("...", "?!") e fechamentos
            let mut j = i + 1;
            while j < chars.len() && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1)) {
                j += 1;
            }
            let end = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
            // Fim do texto: fronteira garantida
            if j >= chars.len() {
                return Some(end);
            }
            // Senão, exige espaço e um começo plausível de sentença
            if chars[j].1.is_whitespace() {
                let mut k = j;
                while k < chars.len() && chars[k].1.is_whitespace() {
                    k += 1;
                }
                if k >= chars.len() {
                    return Some(end);
                }
                let next = chars[k].1;
                if next.is_uppercase()
                    || next.is_numeric()
                    || CLOSERS.contains(&next)
                    || "\"'«“‘([-—".contains(next)
                {
                    return Some(end);
                }
            }
            i = j;
        }
        None
    }

    /// Decide se o ponto na posição `i` encerra a sentença, olhando a palavra
    /// imediatamente anterior (abreviação? inicial? número decimal?).
    fn dot_ends_sentence(&self, text: &str, chars: &[(usize, char)], i: usize) -> bool {
        // Ponto entre dígitos: decimal ou milhar ("1.234")
        let prev = i.checked_sub(1).and_then(|p| chars.get(p)).map(|(_, c)| *c);
        let next = chars.get(i + 1).map(|(_, c)| *c);
        if prev.map(|c| c.is_numeric()).unwrap_or(false)
            && next.map(|c| c.is_numeric()).unwrap_or(false)
        {
            return false;
        }
        // Palavra anterior: volta sobre caracteres alfanuméricos
        let mut start = i;
        while start > 0 && chars[start - 1].1.is_alphanumeric() {
            start -= 1;
        }
        if start == i {
            return true; // ponto sem palavra colada (ex: reticências já tratadas)
        }
        let word = &text[chars[start].0..chars[i].0];
        let mut word_chars = word.chars();
        let first = word_chars.next().unwrap_or(' ');
        let is_initial = word_chars.next().is_none() && first.is_uppercase();
        if is_initial {
            return false; // inicial de nome: "J. Silva"
        }
        !self.abbreviations.contains(&word.to_lowercase())
    }

    /// Divide um trecho de sentença em formas, registrando se há espaço após
    /// cada uma. E-mails e URLs são protegidos como tokens atômicos;
    /// abreviações e iniciais re-absorvem o ponto que as segue.
    fn tokenize_chunk(&self, chunk: &str) -> Vec<(String, bool)> {
        // Spans protegidos (e-mail primeiro; URLs que não os sobreponham)
        let mut protected: Vec<(usize, usize)> = self
            .email_re
            .find_iter(chunk)
            .map(|m| (m.start(), m.end()))
            .collect();
        for m in self.url_re.find_iter(chunk) {
            let (s, mut e) = (m.start(), m.end());
            // Pontuação final não faz parte da URL
            while e > s && ".,;:!?)".contains(&chunk[e - 1..e]) {
                e -= 1;
            }
            if e > s && !protected.iter().any(|&(ps, pe)| s < pe && ps < e) {
                protected.push((s, e));
            }
        }
        protected.sort_unstable();

        // Segmentação por fronteiras Unicode nos trechos não protegidos
        let mut raw: Vec<(usize, usize)> = Vec::new();
        let mut cursor = 0;
        for &(ps, pe) in protected.iter().chain(std::iter::once(&(chunk.len(), chunk.len()))) {
            for (off, seg) in chunk[cursor..ps].split_word_bound_indices() {
                if seg.trim().is_empty() {
                    continue;
                }
                raw.push((cursor + off, cursor + off + seg.len()));
            }
            if ps < pe {
                raw.push((ps, pe));
            }
            cursor = pe;
        }

        // Reabsorve "Dr" + "." → "Dr." e "J" + "." → "J."
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in raw {
            if &chunk[start..end] == "." {
                if let Some(prev) = merged.last_mut() {
                    let prev_text = &chunk[prev.0..prev.1];
                    let first = prev_text.chars().next().unwrap_or(' ');
                    let is_initial = prev_text.chars().count() == 1 && first.is_uppercase();
                    if prev.1 == start
                        && (is_initial || self.abbreviations.contains(&prev_text.to_lowercase()))
                    {
                        prev.1 = end;
                        continue;
                    }
                }
            }
            merged.push((start, end));
        }

        merged
            .iter()
            .map(|&(start, end)| {
                let space_after = chunk[end..]
                    .chars()
                    .next()
                    .map(|c| c.is_whitespace())
                    .unwrap_or(true);
                (chunk[start..end].to_string(), space_after)
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Leitor CoNLL-U
// ---------------------------------------------------------------------------

/// Leitor do formato tabular CoNLL-U.
///
/// Um bloco de sentença é: linhas de comentário `# ...`, linhas de token com
/// exatamente 10 colunas separadas por tabulação, linhas multipalavra com id
/// `primeiro-último`, e uma linha em branco encerrando o bloco. Qualquer
/// linha fora desse esquema aborta a leitura inteira com erro; nós vazios
/// (ids decimais `i.j`) não são suportados pelo modelo de sentença e também
/// são rejeitados.
#[derive(Debug)]
pub struct ConlluReader {
    buffer: String,
    pos: usize,
    line_no: usize,
}

impl ConlluReader {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            pos: 0,
            line_no: 0,
        }
    }

    fn reset_document(&mut self) {
        self.buffer.clear();
        self.pos = 0;
        self.line_no = 0;
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn take_line(&mut self) -> Option<String> {
        if self.pos >= self.buffer.len() {
            return None;
        }
        let rest = &self.buffer[self.pos..];
        let (line, advance) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        self.line_no += 1;
        Some(line.trim_end_matches('\r').to_string())
    }

    fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        sentence.clear();
        let mut saw_content = false;

        while let Some(line) = self.take_line() {
            if line.trim().is_empty() {
                if saw_content {
                    break;
                }
                continue; // linhas em branco antes do bloco são ignoradas
            }
            saw_content = true;

            if let Some(comment) = line.strip_prefix('#') {
                if !sentence.empty() {
                    return Err(Error::MalformedInput(format!(
                        "linha {}: comentário após linhas de token",
                        self.line_no
                    )));
                }
                sentence.comments.push(comment.trim_start().to_string());
                continue;
            }

            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() != 10 {
                return Err(Error::MalformedInput(format!(
                    "linha {}: esperadas 10 colunas, encontradas {}",
                    self.line_no,
                    cols.len()
                )));
            }

            let next_id = sentence.words.len();
            if let Some((first, last)) = cols[0].split_once('-') {
                let id_first: usize = first.parse().map_err(|_| {
                    Error::MalformedInput(format!("linha {}: id `{}` inválido", self.line_no, cols[0]))
                })?;
                let id_last: usize = last.parse().map_err(|_| {
                    Error::MalformedInput(format!("linha {}: id `{}` inválido", self.line_no, cols[0]))
                })?;
                if id_first != next_id || id_last < id_first {
                    return Err(Error::MalformedInput(format!(
                        "linha {}: intervalo multipalavra {}-{} fora de ordem",
                        self.line_no, id_first, id_last
                    )));
                }
                sentence.multiword_tokens.push(MultiwordToken {
                    id_first,
                    id_last,
                    form: decode_field(cols[1]),
                    misc: decode_field(cols[9]),
                });
                continue;
            }
            if cols[0].contains('.') {
                return Err(Error::MalformedInput(format!(
                    "linha {}: nós vazios (id `{}`) não são suportados",
                    self.line_no, cols[0]
                )));
            }

            let id: usize = cols[0].parse().map_err(|_| {
                Error::MalformedInput(format!("linha {}: id `{}` inválido", self.line_no, cols[0]))
            })?;
            if id != next_id {
                return Err(Error::MalformedInput(format!(
                    "linha {}: id {} fora de sequência (esperado {})",
                    self.line_no, id, next_id
                )));
            }

            let head = match cols[6] {
                "_" | "" => None,
                raw => Some(raw.parse::<usize>().map_err(|_| {
                    Error::MalformedInput(format!(
                        "linha {}: head `{}` inválido",
                        self.line_no, raw
                    ))
                })?),
            };

            let word = sentence.add_word(&decode_field(cols[1]));
            word.lemma = decode_field(cols[2]);
            word.upos = decode_field(cols[3]);
            word.xpos = decode_field(cols[4]);
            word.feats = decode_field(cols[5]);
            word.head = head;
            word.deprel = decode_field(cols[7]);
            word.deps = decode_field(cols[8]);
            word.misc = decode_field(cols[9]);
        }

        if !saw_content {
            return Ok(false);
        }
        if sentence.empty() {
            return Err(Error::MalformedInput(format!(
                "linha {}: bloco de sentença sem linhas de token",
                self.line_no
            )));
        }
        link_children(sentence).map_err(|e| {
            Error::MalformedInput(format!(
                "bloco terminando na linha {}: {}",
                self.line_no,
                e.message()
            ))
        })?;
        Ok(true)
    }
}

impl Default for ConlluReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Campo CoNLL-U: `_` representa "não anotado".
fn decode_field(raw: &str) -> String {
    if raw == "_" {
        String::new()
    } else {
        raw.to_string()
    }
}

/// Reconstrói o índice `children` a partir dos `head` lidos (que podem
/// referenciar ids à frente) e valida a estrutura resultante.
fn link_children(sentence: &mut Sentence) -> Result<(), Error> {
    let len = sentence.words.len();
    for word in &mut sentence.words {
        word.children.clear();
    }
    for id in 1..len {
        if let Some(h) = sentence.words[id].head {
            if h >= len {
                return Err(Error::InvalidSentence(format!(
                    "token {id} tem head {h} fora da sentença"
                )));
            }
            sentence.words[h].children.push(id);
        }
    }
    sentence.validate()
}

// ---------------------------------------------------------------------------
// Leitores horizontal e vertical
// ---------------------------------------------------------------------------

/// Uma sentença por linha, tokens separados por espaço em branco.
/// Qualquer linha não vazia é uma sentença válida — este leitor nunca falha.
#[derive(Debug)]
pub struct HorizontalReader {
    buffer: String,
    pos: usize,
}

impl HorizontalReader {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            pos: 0,
        }
    }

    fn reset_document(&mut self) {
        self.buffer.clear();
        self.pos = 0;
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        sentence.clear();
        while self.pos < self.buffer.len() {
            let rest = &self.buffer[self.pos..];
            let (line, advance) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            for form in line.split_whitespace() {
                sentence.add_word(form);
            }
            return Ok(true);
        }
        Ok(false)
    }
}

impl Default for HorizontalReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Um token por linha (apenas a forma); linha em branco encerra a sentença.
/// Linhas com tabulação indicam um arquivo tabular desviado para o leitor
/// errado e abortam a leitura.
#[derive(Debug)]
pub struct VerticalReader {
    buffer: String,
    pos: usize,
    line_no: usize,
}

impl VerticalReader {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            pos: 0,
            line_no: 0,
        }
    }

    fn reset_document(&mut self) {
        self.buffer.clear();
        self.pos = 0;
        self.line_no = 0;
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        sentence.clear();
        while self.pos < self.buffer.len() {
            let rest = &self.buffer[self.pos..];
            let (line, advance) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            self.line_no += 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                if !sentence.empty() {
                    return Ok(true);
                }
                continue;
            }
            if line.contains('\t') {
                return Err(Error::MalformedInput(format!(
                    "linha {}: tabulação em entrada vertical (arquivo tabular?)",
                    self.line_no
                )));
            }
            sentence.add_word(line.trim());
        }
        Ok(!sentence.empty())
    }
}

impl Default for VerticalReader {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Leitor pré-segmentado
// ---------------------------------------------------------------------------

/// Envolve um [`Tokenizer`]: cada linha da entrada já é uma sentença inteira.
///
/// A segmentação de sentenças é delegada às quebras de linha pré-existentes;
/// o tokenizador interno roda sobre cada linha isolada e todas as sentenças
/// que ele porventura produza são fundidas de volta em uma só — fronteiras
/// já marcadas pelo chamador nunca são re-segmentadas.
#[derive(Debug)]
pub struct PresegmentedReader {
    inner: Tokenizer,
    buffer: String,
    pos: usize,
}

impl PresegmentedReader {
    pub fn new(inner: Tokenizer) -> Self {
        Self {
            inner,
            buffer: String::new(),
            pos: 0,
        }
    }

    fn reset_document(&mut self) {
        self.inner.reset_document();
        self.buffer.clear();
        self.pos = 0;
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn next_sentence(&mut self, sentence: &mut Sentence) -> Result<bool, Error> {
        sentence.clear();
        while self.pos < self.buffer.len() {
            let rest = &self.buffer[self.pos..];
            let (line, advance) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            if line.trim().is_empty() {
                continue;
            }

            self.inner.reset_document();
            self.inner.set_text(line);
            let mut part = Sentence::new();
            while self.inner.next_sentence(&mut part)? {
                for word in part.words.iter().skip(1) {
                    let merged = sentence.add_word(&word.form);
                    merged.misc = word.misc.clone();
                }
            }
            if sentence.empty() {
                continue;
            }
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(reader: &mut InputFormat, text: &str) -> Vec<Sentence> {
        reader.reset_document();
        reader.set_text(text);
        let mut out = Vec::new();
        let mut s = Sentence::new();
        while reader.next_sentence(&mut s).unwrap() {
            out.push(s.clone());
        }
        out
    }

    fn forms(s: &Sentence) -> Vec<&str> {
        s.words.iter().skip(1).map(|w| w.form.as_str()).collect()
    }

    #[test]
    fn test_entrada_vazia_retorna_false_sem_erro() {
        for name in ["conllu", "horizontal", "vertical", "generic_tokenizer"] {
            let mut reader = InputFormat::new_input_format(name).unwrap();
            let mut s = Sentence::new();
            assert_eq!(reader.next_sentence(&mut s).unwrap(), false, "{name}");
            reader.set_text("");
            assert_eq!(reader.next_sentence(&mut s).unwrap(), false, "{name}");
        }
    }

    #[test]
    fn test_tokenizer_hello_world() {
        let mut reader = InputFormat::new_input_format("generic_tokenizer").unwrap();
        let sentences = read_all(&mut reader, "Hello world.");
        assert_eq!(sentences.len(), 1);
        assert_eq!(forms(&sentences[0]), vec!["Hello", "world", "."]);
        // "world" é colado ao ponto: SpaceAfter=No
        assert_eq!(sentences[0].words[2].misc, "SpaceAfter=No");
    }

    #[test]
    fn test_tokenizer_duas_sentencas() {
        let mut reader = InputFormat::new_input_format("generic_tokenizer").unwrap();
        let sentences = read_all(&mut reader, "O gato dorme. A casa é azul!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(forms(&sentences[0]), vec!["O", "gato", "dorme", "."]);
        assert_eq!(forms(&sentences[1]), vec!["A", "casa", "é", "azul", "!"]);
    }

    #[test]
    fn test_tokenizer_abreviacao_nao_quebra() {
        let mut reader = InputFormat::new_input_format("generic_tokenizer").unwrap();
        let sentences = read_all(&mut reader, "O Dr. Silva chegou. Todos saíram.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(forms(&sentences[0]), vec!["O", "Dr.", "Silva", "chegou", "."]);
    }

    #[test]
    fn test_tokenizer_numero_decimal_e_email() {
        let mut reader = InputFormat::new_input_format("generic_tokenizer").unwrap();
        let sentences = read_all(&mut reader, "Pagou 1.234,56 via ana.silva@exemplo.com.br hoje.");
        assert_eq!(sentences.len(), 1);
        let f = forms(&sentences[0]);
        assert!(f.contains(&"1.234,56"));
        assert!(f.contains(&"ana.silva@exemplo.com.br"));
    }

    #[test]
    fn test_tokenizer_texto_sem_terminador() {
        let mut reader = InputFormat::new_input_format("generic_tokenizer").unwrap();
        let sentences = read_all(&mut reader, "sem pontuação final");
        assert_eq!(sentences.len(), 1);
        assert_eq!(forms(&sentences[0]), vec!["sem", "pontuação", "final"]);
    }

    #[test]
    fn test_horizontal_uma_sentenca_por_linha() {
        let mut reader = InputFormat::new_input_format("horizontal").unwrap();
        let sentences = read_all(&mut reader, "O gato dorme .\n\nA casa é azul .\n");
        assert_eq!(sentences.len(), 2);
        assert_eq!(forms(&sentences[0]), vec!["O", "gato", "dorme", "."]);
    }

    #[test]
    fn test_vertical_token_por_linha() {
        let mut reader = InputFormat::new_input_format("vertical").unwrap();
        let sentences = read_all(&mut reader, "O\ngato\ndorme\n.\n\nSim\n.\n");
        assert_eq!(sentences.len(), 2);
        assert_eq!(forms(&sentences[0]), vec!["O", "gato", "dorme", "."]);
        assert_eq!(forms(&sentences[1]), vec!["Sim", "."]);
    }

    #[test]
    fn test_vertical_rejeita_tabulacao() {
        let mut reader = InputFormat::new_input_format("vertical").unwrap();
        reader.set_text("1\tgato\n");
        let mut s = Sentence::new();
        let err = reader.next_sentence(&mut s).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_conllu_basico_com_comentario_e_multipalavra() {
        let data = "# sent_id = 1\n# text = Foi do lado.\n\
                    1\tFoi\tser\tVERB\t_\t_\t0\troot\t_\t_\n\
                    2-3\tdo\t_\t_\t_\t_\t_\t_\t_\t_\n\
                    2\tde\tde\tADP\t_\t_\t4\tcase\t_\t_\n\
                    3\to\to\tDET\t_\t_\t4\tdet\t_\t_\n\
                    4\tlado\tlado\tNOUN\t_\t_\t1\tobl\t_\tSpaceAfter=No\n\
                    5\t.\t.\tPUNCT\t_\t_\t1\tpunct\t_\t_\n\n";
        let mut reader = InputFormat::new_input_format("conllu").unwrap();
        let sentences = read_all(&mut reader, data);
        assert_eq!(sentences.len(), 1);
        let s = &sentences[0];
        assert_eq!(s.comments.len(), 2);
        assert_eq!(s.multiword_tokens.len(), 1);
        assert_eq!(s.multiword_tokens[0].form, "do");
        assert_eq!(forms(s), vec!["Foi", "de", "o", "lado", "."]);
        assert_eq!(s.words[1].head, Some(0));
        assert_eq!(s.words[4].head, Some(1));
        // children reconstruído: raiz governa 1; 1 governa 4 e 5; 4 governa 2 e 3
        assert_eq!(s.words[0].children, vec![1]);
        assert_eq!(s.words[1].children, vec![4, 5]);
        assert_eq!(s.words[4].children, vec![2, 3]);
    }

    #[test]
    fn test_conllu_linha_malformada_aborta() {
        let mut reader = InputFormat::new_input_format("conllu").unwrap();
        reader.set_text("1\tgato\tgato\n\n");
        let mut s = Sentence::new();
        let err = reader.next_sentence(&mut s).unwrap_err();
        assert!(err.message().contains("colunas"));
    }

    #[test]
    fn test_conllu_no_vazio_rejeitado() {
        let mut reader = InputFormat::new_input_format("conllu").unwrap();
        reader.set_text("1\tgato\t_\t_\t_\t_\t0\troot\t_\t_\n1.1\tfantasma\t_\t_\t_\t_\t_\t_\t_\t_\n\n");
        let mut s = Sentence::new();
        let err = reader.next_sentence(&mut s).unwrap_err();
        assert!(err.message().contains("vazios"));
    }

    #[test]
    fn test_presegmentado_nao_resegmenta() {
        let tokenizer = Tokenizer::new();
        let mut reader = InputFormat::new_presegmented_tokenizer(tokenizer);
        // A primeira linha contém dois "pontos finais" mas é UMA sentença
        let sentences = read_all(&mut reader, "Sim. Não. Tudo junto aqui\nSegunda linha.\n");
        assert_eq!(sentences.len(), 2);
        assert_eq!(
            forms(&sentences[0]),
            vec!["Sim", ".", "Não", ".", "Tudo", "junto", "aqui"]
        );
        assert_eq!(forms(&sentences[1]), vec!["Segunda", "linha", "."]);
    }

    #[test]
    fn test_nome_de_formato_desconhecido() {
        let err = InputFormat::new_input_format("xml").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
