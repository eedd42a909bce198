//! # Corpus Embutido em Português Brasileiro (formato CoNLL-U)
//!
//! Mini-treebank anotado manualmente, usado para treinar o modelo padrão e
//! para demonstração. Cada sentença carrega lema, UPOS, traços morfológicos
//! e a árvore de dependências no esquema Universal Dependencies.
//!
//! As sentenças foram escolhidas para cobrir os padrões sintáticos mais
//! frequentes do português: sujeito-verbo-objeto, predicado nominal com
//! cópula, contrações preposição+artigo (tokens multipalavra "do", "no"),
//! advérbios e coordenação.

use crate::input::InputFormat;
use crate::sentence::Sentence;

/// O corpus anotado, no exato formato que o leitor CoNLL-U consome.
const CORPUS_CONLLU: &str = concat!(
    "# sent_id = corpus-1\n",
    "# text = O gato dorme.\n",
    "1\tO\to\tDET\t_\tGender=Masc|Number=Sing\t2\tdet\t_\t_\n",
    "2\tgato\tgato\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\tdorme\tdormir\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\tSpaceAfter=No\n",
    "4\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-2\n",
    "# text = A casa é azul.\n",
    "1\tA\ta\tDET\t_\tGender=Fem|Number=Sing\t2\tdet\t_\t_\n",
    "2\tcasa\tcasa\tNOUN\t_\tGender=Fem|Number=Sing\t4\tnsubj\t_\t_\n",
    "3\té\tser\tAUX\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t4\tcop\t_\t_\n",
    "4\tazul\tazul\tADJ\t_\tNumber=Sing\t0\troot\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t4\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-3\n",
    "# text = Maria comprou um livro.\n",
    "1\tMaria\tMaria\tPROPN\t_\tGender=Fem|Number=Sing\t2\tnsubj\t_\t_\n",
    "2\tcomprou\tcomprar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Past\t0\troot\t_\t_\n",
    "3\tum\tum\tDET\t_\tGender=Masc|Number=Sing\t4\tdet\t_\t_\n",
    "4\tlivro\tlivro\tNOUN\t_\tGender=Masc|Number=Sing\t2\tobj\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-4\n",
    "# text = O menino gosta do cachorro.\n",
    "1\tO\to\tDET\t_\tGender=Masc|Number=Sing\t2\tdet\t_\t_\n",
    "2\tmenino\tmenino\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\tgosta\tgostar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "4-5\tdo\t_\t_\t_\t_\t_\t_\t_\t_\n",
    "4\tde\tde\tADP\t_\t_\t6\tcase\t_\t_\n",
    "5\to\to\tDET\t_\tGender=Masc|Number=Sing\t6\tdet\t_\t_\n",
    "6\tcachorro\tcachorro\tNOUN\t_\tGender=Masc|Number=Sing\t3\tobl\t_\tSpaceAfter=No\n",
    "7\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-5\n",
    "# text = Pedro viu a menina.\n",
    "1\tPedro\tPedro\tPROPN\t_\tGender=Masc|Number=Sing\t2\tnsubj\t_\t_\n",
    "2\tviu\tver\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Past\t0\troot\t_\t_\n",
    "3\ta\ta\tDET\t_\tGender=Fem|Number=Sing\t4\tdet\t_\t_\n",
    "4\tmenina\tmenina\tNOUN\t_\tGender=Fem|Number=Sing\t2\tobj\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-6\n",
    "# text = O cachorro corre no parque.\n",
    "1\tO\to\tDET\t_\tGender=Masc|Number=Sing\t2\tdet\t_\t_\n",
    "2\tcachorro\tcachorro\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\tcorre\tcorrer\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "4-5\tno\t_\t_\t_\t_\t_\t_\t_\t_\n",
    "4\tem\tem\tADP\t_\t_\t6\tcase\t_\t_\n",
    "5\to\to\tDET\t_\tGender=Masc|Number=Sing\t6\tdet\t_\t_\n",
    "6\tparque\tparque\tNOUN\t_\tGender=Masc|Number=Sing\t3\tobl\t_\tSpaceAfter=No\n",
    "7\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-7\n",
    "# text = Ana leu o jornal hoje.\n",
    "1\tAna\tAna\tPROPN\t_\tGender=Fem|Number=Sing\t2\tnsubj\t_\t_\n",
    "2\tleu\tler\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Past\t0\troot\t_\t_\n",
    "3\to\to\tDET\t_\tGender=Masc|Number=Sing\t4\tdet\t_\t_\n",
    "4\tjornal\tjornal\tNOUN\t_\tGender=Masc|Number=Sing\t2\tobj\t_\t_\n",
    "5\thoje\thoje\tADV\t_\t_\t2\tadvmod\t_\tSpaceAfter=No\n",
    "6\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-8\n",
    "# text = Nós moramos em Lisboa.\n",
    "1\tNós\tnós\tPRON\t_\tNumber=Plur|Person=1|PronType=Prs\t2\tnsubj\t_\t_\n",
    "2\tmoramos\tmorar\tVERB\t_\tMood=Ind|Number=Plur|Person=1|Tense=Pres\t0\troot\t_\t_\n",
    "3\tem\tem\tADP\t_\t_\t4\tcase\t_\t_\n",
    "4\tLisboa\tLisboa\tPROPN\t_\tGender=Fem|Number=Sing\t2\tobl\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-9\n",
    "# text = O professor explicou a lição.\n",
    "1\tO\to\tDET\t_\tGender=Masc|Number=Sing\t2\tdet\t_\t_\n",
    "2\tprofessor\tprofessor\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\texplicou\texplicar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Past\t0\troot\t_\t_\n",
    "4\ta\ta\tDET\t_\tGender=Fem|Number=Sing\t5\tdet\t_\t_\n",
    "5\tlição\tlição\tNOUN\t_\tGender=Fem|Number=Sing\t3\tobj\t_\tSpaceAfter=No\n",
    "6\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-10\n",
    "# text = Ela canta bem.\n",
    "1\tEla\tela\tPRON\t_\tGender=Fem|Number=Sing|Person=3|PronType=Prs\t2\tnsubj\t_\t_\n",
    "2\tcanta\tcantar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "3\tbem\tbem\tADV\t_\t_\t2\tadvmod\t_\tSpaceAfter=No\n",
    "4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-11\n",
    "# text = Meu irmão trabalha muito.\n",
    "1\tMeu\tmeu\tDET\t_\tGender=Masc|Number=Sing|Poss=Yes\t2\tdet\t_\t_\n",
    "2\tirmão\tirmão\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\ttrabalha\ttrabalhar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "4\tmuito\tmuito\tADV\t_\t_\t3\tadvmod\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-12\n",
    "# text = A menina bebe água.\n",
    "1\tA\ta\tDET\t_\tGender=Fem|Number=Sing\t2\tdet\t_\t_\n",
    "2\tmenina\tmenina\tNOUN\t_\tGender=Fem|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\tbebe\tbeber\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "4\tágua\tágua\tNOUN\t_\tGender=Fem|Number=Sing\t3\tobj\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-13\n",
    "# text = João e Maria chegaram.\n",
    "1\tJoão\tJoão\tPROPN\t_\tGender=Masc|Number=Sing\t4\tnsubj\t_\t_\n",
    "2\te\te\tCCONJ\t_\t_\t3\tcc\t_\t_\n",
    "3\tMaria\tMaria\tPROPN\t_\tGender=Fem|Number=Sing\t1\tconj\t_\t_\n",
    "4\tchegaram\tchegar\tVERB\t_\tMood=Ind|Number=Plur|Person=3|Tense=Past\t0\troot\t_\tSpaceAfter=No\n",
    "5\t.\t.\tPUNCT\t_\t_\t4\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-14\n",
    "# text = O sol brilha.\n",
    "1\tO\to\tDET\t_\tGender=Masc|Number=Sing\t2\tdet\t_\t_\n",
    "2\tsol\tsol\tNOUN\t_\tGender=Masc|Number=Sing\t3\tnsubj\t_\t_\n",
    "3\tbrilha\tbrilhar\tVERB\t_\tMood=Ind|Number=Sing|Person=3|Tense=Pres\t0\troot\t_\tSpaceAfter=No\n",
    "4\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_\n",
    "\n",
    "# sent_id = corpus-15\n",
    "# text = Eles comem pão.\n",
    "1\tEles\tele\tPRON\t_\tGender=Masc|Number=Plur|Person=3|PronType=Prs\t2\tnsubj\t_\t_\n",
    "2\tcomem\tcomer\tVERB\t_\tMood=Ind|Number=Plur|Person=3|Tense=Pres\t0\troot\t_\t_\n",
    "3\tpão\tpão\tNOUN\t_\tGender=Masc|Number=Sing\t2\tobj\t_\tSpaceAfter=No\n",
    "4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_\n",
    "\n",
);

/// O corpus cru, no formato CoNLL-U.
pub fn corpus_conllu() -> &'static str {
    CORPUS_CONLLU
}

/// Corpus interpretado como sentenças, via o próprio leitor CoNLL-U do crate.
pub fn get_corpus() -> Vec<Sentence> {
    let mut reader = InputFormat::new_conllu_input_format();
    reader.set_text(CORPUS_CONLLU);
    let mut sentences = Vec::new();
    let mut sentence = Sentence::new();
    while reader
        .next_sentence(&mut sentence)
        .expect("corpus embutido é CoNLL-U válido")
    {
        sentences.push(sentence.clone());
    }
    sentences
}

/// Textos de demonstração para a interface web.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Cotidiano",
            "O gato dorme no sofá da sala. A menina bebe água depois da aula. \
             Meu irmão trabalha muito hoje.",
        ),
        (
            "Narrativa",
            "Maria comprou um livro na feira. Pedro viu a menina no parque e \
             chegou em casa feliz.",
        ),
        (
            "Abreviações",
            "O Dr. Silva chegou cedo. A Sra. Souza explicou a lição aos alunos.",
        ),
        (
            "Tokenização",
            "Pagou 1.234,56 pelo ingresso e avisou ana.silva@exemplo.com.br \
             pelo site www.exemplo.com.br. Tudo certo?",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_carrega_e_valida() {
        let corpus = get_corpus();
        assert_eq!(corpus.len(), 15);
        for sentence in &corpus {
            sentence.validate().unwrap();
            assert!(!sentence.empty());
            // Toda sentença do corpus tem exatamente uma raiz sintática
            let raizes = sentence
                .words
                .iter()
                .skip(1)
                .filter(|w| w.head == Some(0))
                .count();
            assert_eq!(raizes, 1);
        }
    }

    #[test]
    fn test_corpus_tem_multipalavras() {
        let corpus = get_corpus();
        let com_mwt = corpus
            .iter()
            .filter(|s| !s.multiword_tokens.is_empty())
            .count();
        assert_eq!(com_mwt, 2, "contrações `do` e `no`");
    }

    #[test]
    fn test_corpus_anotacao_completa() {
        for sentence in get_corpus() {
            for word in sentence.words.iter().skip(1) {
                assert!(!word.lemma.is_empty(), "lema de `{}`", word.form);
                assert!(!word.upos.is_empty(), "upos de `{}`", word.form);
                assert!(word.head.is_some(), "head de `{}`", word.form);
                assert!(!word.deprel.is_empty(), "deprel de `{}`", word.form);
            }
        }
    }
}
