//! # Modelo de Sentença — Tokens, Tokens Multipalavra e Árvore de Dependências
//!
//! Define as estruturas centrais do pipeline: a [`Word`] (token anotado), o
//! [`MultiwordToken`] (contrações como "do" = "de" + "o") e a [`Sentence`]
//! que os agrupa junto com comentários de metadados.
//!
//! ## Esquema de Ids
//!
//! - `0`: raiz artificial da árvore (sempre presente, forma `<root>`).
//! - `1..N`: tokens reais, na ordem em que aparecem no texto.
//! - `head = Some(0)`: o token liga-se diretamente à raiz.
//! - `head = None`: vínculo ainda não definido (sentença não analisada).
//!
//! ## Invariantes Estruturais
//!
//! 1. Ids são atribuídos sequencialmente por [`Sentence::add_word`] — o único
//!    caminho de criação de tokens — logo são sempre `1..N` sem buracos.
//! 2. `children` é um índice derivado: para todo token `t`, `t.children`
//!    contém exatamente os ids cujo `head` é `t.id`. Toda mutação de `head`
//!    passa por [`Sentence::set_head`], que atualiza o índice na mesma
//!    operação (nunca há estado intermediário inconsistente observável).
//! 3. Intervalos de tokens multipalavra não se sobrepõem e referenciam ids
//!    existentes (verificado por [`Sentence::validate`]).

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Um token da sentença com suas anotações morfológicas e sintáticas.
///
/// Campos de texto vazios significam "não anotado"; os leitores e escritores
/// CoNLL-U convertem entre vazio e o marcador `_` do formato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Id do token na sentença (1-based; 0 é a raiz artificial).
    pub id: usize,
    /// Forma de superfície, exatamente como aparece no texto.
    pub form: String,
    /// Lema (forma canônica). Ex: "comeram" → "comer".
    pub lemma: String,
    /// Etiqueta universal de classe gramatical (UPOS). Ex: "NOUN", "VERB".
    pub upos: String,
    /// Etiqueta de classe gramatical específica da língua (XPOS).
    pub xpos: String,
    /// Lista serializada de traços morfológicos. Ex: "Gender=Masc|Number=Sing".
    pub feats: String,
    /// Id do token governante: `Some(0)` = raiz, `None` = não definido.
    pub head: Option<usize>,
    /// Relação de dependência com o governante. Ex: "nsubj", "obj".
    pub deprel: String,
    /// Dependências secundárias/estendidas, serializadas.
    pub deps: String,
    /// Anotações auxiliares livres. Ex: "SpaceAfter=No".
    pub misc: String,
    /// Ids dos dependentes imediatos, em ordem crescente.
    /// Índice derivado de `head` — nunca edite diretamente.
    pub children: Vec<usize>,
}

impl Word {
    /// Cria um token com a forma dada e todos os demais campos não anotados.
    pub fn new(id: usize, form: &str) -> Self {
        Self {
            id,
            form: form.to_string(),
            lemma: String::new(),
            upos: String::new(),
            xpos: String::new(),
            feats: String::new(),
            head: None,
            deprel: String::new(),
            deps: String::new(),
            misc: String::new(),
            children: Vec::new(),
        }
    }
}

/// Marca que os tokens no intervalo `[id_first, id_last]` vieram da divisão
/// de uma única forma de superfície.
///
/// Ex: a contração "do" gera os tokens "de" (id 3) e "o" (id 4) com um
/// `MultiwordToken { id_first: 3, id_last: 4, form: "do", .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiwordToken {
    /// Primeiro id do intervalo (inclusivo).
    pub id_first: usize,
    /// Último id do intervalo (inclusivo).
    pub id_last: usize,
    /// Forma de superfície original, não dividida.
    pub form: String,
    /// Anotações auxiliares da linha multipalavra.
    pub misc: String,
}

/// Uma sentença: sequência de tokens, sobreposições multipalavra e
/// comentários de metadados preservados verbatim.
///
/// `words[0]` é sempre a raiz artificial (id 0, forma [`Sentence::ROOT_FORM`]),
/// de modo que `words[id]` indexa diretamente o token de id `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Tokens da sentença, indexados pelo próprio id (posição 0 = raiz).
    pub words: Vec<Word>,
    /// Sobreposições multipalavra, em ordem de `id_first`.
    pub multiword_tokens: Vec<MultiwordToken>,
    /// Linhas de comentário (sem o prefixo `#`), na ordem original.
    pub comments: Vec<String>,
}

impl Sentence {
    /// Forma reservada da raiz artificial.
    pub const ROOT_FORM: &'static str = "<root>";

    /// Cria uma sentença vazia (apenas a raiz artificial).
    pub fn new() -> Self {
        Self {
            words: vec![Word::new(0, Self::ROOT_FORM)],
            multiword_tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Verdadeiro se a sentença não contém nenhum token real.
    pub fn empty(&self) -> bool {
        self.words.len() <= 1
    }

    /// Remove todos os tokens, sobreposições e comentários, restaurando o
    /// estado recém-construído (a raiz permanece, sem dependentes).
    pub fn clear(&mut self) {
        self.words.truncate(1);
        self.words[0].children.clear();
        self.multiword_tokens.clear();
        self.comments.clear();
    }

    /// Adiciona um token ao fim da sentença e devolve uma referência mutável
    /// para preenchimento dos demais campos.
    ///
    /// Este é o único caminho de criação de tokens: o id é sempre o próximo
    /// da sequência, o que garante a invariante `ids == 1..N`.
    pub fn add_word(&mut self, form: &str) -> &mut Word {
        let id = self.words.len();
        self.words.push(Word::new(id, form));
        &mut self.words[id]
    }

    /// Token de id `id` (0 devolve a raiz artificial).
    pub fn word(&self, id: usize) -> Option<&Word> {
        self.words.get(id)
    }

    /// Versão mutável de [`Sentence::word`].
    pub fn word_mut(&mut self, id: usize) -> Option<&mut Word> {
        self.words.get_mut(id)
    }

    /// Define o governante de `id` como `head`, com a relação `deprel`,
    /// mantendo o índice `children` consistente no mesmo passo.
    ///
    /// - `head = Some(0)` liga o token à raiz;
    /// - `head = None` desfaz o vínculo (deixa o token sem governante).
    ///
    /// Falha com [`Error::InvalidSentence`] se `id` não é um token real da
    /// sentença, se `head` referencia um id inexistente ou se `head == id`
    /// (laço trivial).
    pub fn set_head(&mut self, id: usize, head: Option<usize>, deprel: &str) -> Result<(), Error> {
        if id == 0 || id >= self.words.len() {
            return Err(Error::InvalidSentence(format!(
                "set_head: id {id} não existe na sentença"
            )));
        }
        if let Some(h) = head {
            if h >= self.words.len() {
                return Err(Error::InvalidSentence(format!(
                    "set_head: head {h} não existe na sentença"
                )));
            }
            if h == id {
                return Err(Error::InvalidSentence(format!(
                    "set_head: token {id} não pode governar a si mesmo"
                )));
            }
        }

        // Remove do índice do governante anterior, se havia
        if let Some(old) = self.words[id].head {
            self.words[old].children.retain(|&c| c != id);
        }

        self.words[id].head = head;
        self.words[id].deprel = deprel.to_string();

        // Insere no índice do novo governante, preservando ordem crescente
        if let Some(new) = head {
            let children = &mut self.words[new].children;
            match children.binary_search(&id) {
                Ok(_) => {}
                Err(pos) => children.insert(pos, id),
            }
        }
        Ok(())
    }

    /// Desfaz todos os vínculos de dependência: todo `head` volta a `None` e
    /// todo `children` fica vazio. Os tokens e suas anotações morfológicas
    /// permanecem — usado para re-analisar uma sentença já etiquetada.
    pub fn unlink_all_words(&mut self) {
        for word in &mut self.words {
            word.head = None;
            word.children.clear();
        }
    }

    /// Verifica as invariantes estruturais da sentença.
    ///
    /// Checa ids sequenciais, faixas de `head`, consistência do índice
    /// `children` e intervalos multipalavra válidos e sem sobreposição.
    /// Usada pelo treinador e pelo avaliador antes de consumir sentenças
    /// vindas de fora do crate.
    pub fn validate(&self) -> Result<(), Error> {
        for (pos, word) in self.words.iter().enumerate() {
            if word.id != pos {
                return Err(Error::InvalidSentence(format!(
                    "token na posição {pos} tem id {}",
                    word.id
                )));
            }
            if let Some(h) = word.head {
                if h >= self.words.len() {
                    return Err(Error::InvalidSentence(format!(
                        "token {} tem head {h} fora da sentença",
                        word.id
                    )));
                }
            }
        }
        // children deve ser exatamente o inverso de head
        for word in &self.words {
            for &child in &word.children {
                if child >= self.words.len() || self.words[child].head != Some(word.id) {
                    return Err(Error::InvalidSentence(format!(
                        "índice children do token {} inconsistente com head",
                        word.id
                    )));
                }
            }
        }
        for word in self.words.iter().skip(1) {
            if let Some(h) = word.head {
                if !self.words[h].children.contains(&word.id) {
                    return Err(Error::InvalidSentence(format!(
                        "token {} ausente do children de seu head {h}",
                        word.id
                    )));
                }
            }
        }
        // Intervalos multipalavra: dentro da sentença e sem sobreposição
        let mut last_end = 0usize;
        for mwt in &self.multiword_tokens {
            if mwt.id_first == 0 || mwt.id_first > mwt.id_last || mwt.id_last >= self.words.len() {
                return Err(Error::InvalidSentence(format!(
                    "intervalo multipalavra {}-{} inválido",
                    mwt.id_first, mwt.id_last
                )));
            }
            if mwt.id_first <= last_end {
                return Err(Error::InvalidSentence(format!(
                    "intervalo multipalavra {}-{} sobrepõe o anterior",
                    mwt.id_first, mwt.id_last
                )));
            }
            last_end = mwt.id_last;
        }
        Ok(())
    }
}

impl Default for Sentence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentenca_nova_vazia() {
        let s = Sentence::new();
        assert!(s.empty());
        assert_eq!(s.words.len(), 1);
        assert_eq!(s.words[0].form, Sentence::ROOT_FORM);
    }

    #[test]
    fn test_ids_sequenciais() {
        let mut s = Sentence::new();
        for form in ["O", "gato", "dorme", "."] {
            s.add_word(form);
        }
        let ids: Vec<usize> = s.words.iter().skip(1).map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(!s.empty());
    }

    #[test]
    fn test_set_head_atualiza_children() {
        let mut s = Sentence::new();
        s.add_word("O");
        s.add_word("gato");
        s.add_word("dorme");

        s.set_head(1, Some(2), "det").unwrap();
        s.set_head(2, Some(3), "nsubj").unwrap();
        s.set_head(3, Some(0), "root").unwrap();

        assert_eq!(s.words[2].children, vec![1]);
        assert_eq!(s.words[3].children, vec![2]);
        assert_eq!(s.words[0].children, vec![3]);

        // Re-vincula: o índice do head antigo deve ser atualizado
        s.set_head(1, Some(3), "dep").unwrap();
        assert!(s.words[2].children.is_empty());
        assert_eq!(s.words[3].children, vec![1, 2]);
    }

    #[test]
    fn test_set_head_valida_ids() {
        let mut s = Sentence::new();
        s.add_word("só");
        assert!(s.set_head(2, Some(0), "root").is_err());
        assert!(s.set_head(1, Some(9), "dep").is_err());
        assert!(s.set_head(1, Some(1), "dep").is_err());
        assert!(s.set_head(0, Some(1), "dep").is_err());
        assert!(s.set_head(1, Some(0), "root").is_ok());
    }

    #[test]
    fn test_unlink_all_words() {
        let mut s = Sentence::new();
        s.add_word("a");
        s.add_word("b");
        s.set_head(1, Some(2), "dep").unwrap();
        s.set_head(2, Some(0), "root").unwrap();

        s.unlink_all_words();
        for w in &s.words {
            assert_eq!(w.head, None);
            assert!(w.children.is_empty());
        }
        assert_eq!(s.words.len(), 3, "tokens permanecem após unlink");
    }

    #[test]
    fn test_clear_restaura_estado_inicial() {
        let mut s = Sentence::new();
        s.comments.push("sent_id = 1".into());
        s.add_word("palavra");
        s.set_head(1, Some(0), "root").unwrap();
        s.multiword_tokens.push(MultiwordToken {
            id_first: 1,
            id_last: 1,
            form: "palavra".into(),
            misc: String::new(),
        });

        s.clear();
        assert!(s.empty());
        assert!(s.multiword_tokens.is_empty());
        assert!(s.comments.is_empty());
        assert!(s.words[0].children.is_empty());
    }

    #[test]
    fn test_validate_detecta_sobreposicao_multipalavra() {
        let mut s = Sentence::new();
        for f in ["de", "o", "a"] {
            s.add_word(f);
        }
        s.multiword_tokens.push(MultiwordToken {
            id_first: 1,
            id_last: 2,
            form: "do".into(),
            misc: String::new(),
        });
        assert!(s.validate().is_ok());

        s.multiword_tokens.push(MultiwordToken {
            id_first: 2,
            id_last: 3,
            form: "da".into(),
            misc: String::new(),
        });
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_detecta_head_fora_da_faixa() {
        let mut s = Sentence::new();
        s.add_word("x");
        // Corrompe diretamente, contornando set_head
        s.words[1].head = Some(7);
        assert!(s.validate().is_err());
    }
}
