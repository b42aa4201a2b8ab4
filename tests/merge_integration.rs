use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use segdex::{
    Analyzer, DeltaVarLenCompressor, Document, IndexConfig, InvertedIndex, NaiveCompressor,
    PunctuationAnalyzer,
};

fn open(tmp: &TempDir, flush_threshold: usize, merge_threshold: usize) -> InvertedIndex {
    let config = IndexConfig::default()
        .with_flush_threshold(flush_threshold)
        .with_merge_threshold(merge_threshold);
    InvertedIndex::open_with_config(
        tmp.path(),
        PunctuationAnalyzer::without_stopwords(),
        NaiveCompressor,
        config,
    )
    .unwrap()
}

fn sorted_texts(iter: impl Iterator<Item = Document>) -> Vec<String> {
    let mut texts: Vec<String> = iter.map(|doc| doc.text).collect();
    texts.sort();
    texts
}

const CORPUS: [&str; 7] = [
    "cat dog cat dog",
    "apple dog",
    "cat smile",
    "dog park",
    "apple pie",
    "cat nap dog",
    "smile wide",
];

#[test]
fn merge_preserves_query_results() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 2, 100);
    for text in CORPUS {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();
    assert_eq!(index.num_segments(), 4);

    let before_and = sorted_texts(index.search_and_query(&["cat", "dog"]).unwrap());
    let before_or = sorted_texts(index.search_or_query(&["apple", "smile"]).unwrap());
    let before_all = sorted_texts(index.document_iterator().unwrap());

    index.merge_all_segments().unwrap();
    assert_eq!(index.num_segments(), 2);
    assert_eq!(sorted_texts(index.search_and_query(&["cat", "dog"]).unwrap()), before_and);
    assert_eq!(sorted_texts(index.search_or_query(&["apple", "smile"]).unwrap()), before_or);
    assert_eq!(sorted_texts(index.document_iterator().unwrap()), before_all);
    assert_eq!(index.manifest().total_doc_count(), CORPUS.len() as u64);

    // renumbered ids are dense within each merged segment
    let first = index.index_segment(0).unwrap().unwrap();
    assert_eq!(first.documents.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(first.inverted_lists["cat"], vec![0, 2]);
    assert_eq!(first.inverted_lists["dog"], vec![0, 1, 3]);
}

#[test]
fn merge_physically_drops_deleted_terms() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 2, 100);
    for text in CORPUS {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();

    index.delete_documents("dog").unwrap();
    index.merge_all_segments().unwrap();

    assert!(index.manifest().deleted_terms.is_empty());
    for n in 0..index.num_segments() {
        let snapshot = index.index_segment(n).unwrap().unwrap();
        assert!(!snapshot.inverted_lists.contains_key("dog"));
    }
    assert_eq!(index.search_query("dog").unwrap().len(), 0);
    // documents themselves stay stored and reachable through other terms
    assert_eq!(
        sorted_texts(index.search_query("cat").unwrap()),
        vec!["cat dog cat dog", "cat nap dog", "cat smile"]
    );
    assert_eq!(index.document_iterator().unwrap().len(), CORPUS.len());
}

#[test]
fn odd_segment_count_keeps_trailing_segment() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 1, 100);
    for text in &CORPUS[..3] {
        index.add_document(Document::new(*text)).unwrap();
    }
    assert_eq!(index.num_segments(), 3);

    index.merge_all_segments().unwrap();
    assert_eq!(index.num_segments(), 2);
    let trailing = index.index_segment(1).unwrap().unwrap();
    assert_eq!(trailing.documents[&0], Document::new("cat smile"));
    assert_eq!(index.search_query("cat").unwrap().len(), 2);
}

#[test]
fn odd_trailing_segment_is_purged_too() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 1, 100);
    for text in &CORPUS[..3] {
        index.add_document(Document::new(*text)).unwrap();
    }
    index.delete_documents("smile").unwrap();
    index.merge_all_segments().unwrap();

    let trailing = index.index_segment(1).unwrap().unwrap();
    assert!(!trailing.inverted_lists.contains_key("smile"));
    assert_eq!(trailing.inverted_lists["cat"], vec![0]);
}

#[test]
fn single_segment_merge() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 100, 100);
    for text in CORPUS {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();

    // nothing to purge: untouched
    index.merge_all_segments().unwrap();
    assert_eq!(index.num_segments(), 1);

    index.delete_documents("apple").unwrap();
    index.merge_all_segments().unwrap();
    assert_eq!(index.num_segments(), 1);
    let snapshot = index.index_segment(0).unwrap().unwrap();
    assert!(!snapshot.inverted_lists.contains_key("apple"));
    assert_eq!(snapshot.documents.len(), CORPUS.len());
}

#[test]
fn automatic_merge_keeps_count_below_threshold() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 1, 3);
    for i in 0..20 {
        index.add_document(Document::new(format!("doc{} common", i))).unwrap();
        assert!(index.num_segments() < 3);
    }
    assert_eq!(index.search_query("common").unwrap().len(), 20);
    assert_eq!(index.search_query("doc13").unwrap().len(), 1);
}

#[test]
fn merge_while_documents_are_buffered() {
    let tmp = TempDir::new().unwrap();
    let mut index = open(&tmp, 2, 100);
    for text in &CORPUS[..4] {
        index.add_document(Document::new(*text)).unwrap();
    }
    index.add_document(Document::new("buffered cat")).unwrap();
    assert_eq!(index.num_segments(), 2);

    index.merge_all_segments().unwrap();
    assert_eq!(index.num_segments(), 1);
    index.flush().unwrap();
    assert_eq!(index.num_segments(), 2);
    assert_eq!(
        sorted_texts(index.search_query("cat").unwrap()),
        vec!["buffered cat", "cat dog cat dog", "cat smile"]
    );
}

#[test]
fn randomized_queries_match_a_linear_scan() {
    const VOCABULARY: [&str; 8] = ["ant", "bee", "cow", "doe", "elk", "fox", "gnu", "hen"];

    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::positional()
        .with_flush_threshold(7)
        .with_merge_threshold(3);
    let mut index = InvertedIndex::open_with_config(
        tmp.path(),
        PunctuationAnalyzer::without_stopwords(),
        DeltaVarLenCompressor,
        config,
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let mut corpus = Vec::new();
    for _ in 0..120 {
        let len = rng.gen_range(1..8);
        let text = (0..len)
            .map(|_| VOCABULARY[rng.gen_range(0..VOCABULARY.len())])
            .collect::<Vec<_>>()
            .join(" ");
        index.add_document(Document::new(text.clone())).unwrap();
        corpus.push(text);
    }
    index.flush().unwrap();

    let analyzer = PunctuationAnalyzer::without_stopwords();
    let scan = |pred: &dyn Fn(&[String]) -> bool| {
        let mut hits: Vec<String> = corpus
            .iter()
            .filter(|text| pred(&analyzer.analyze(text)))
            .cloned()
            .collect();
        hits.sort();
        hits
    };

    for _ in 0..25 {
        let a = VOCABULARY[rng.gen_range(0..VOCABULARY.len())];
        let b = VOCABULARY[rng.gen_range(0..VOCABULARY.len())];
        let has = |terms: &[String], t: &str| terms.iter().any(|x| x == t);

        assert_eq!(
            sorted_texts(index.search_and_query(&[a, b]).unwrap()),
            scan(&|terms| has(terms, a) && has(terms, b))
        );
        assert_eq!(
            sorted_texts(index.search_or_query(&[a, b]).unwrap()),
            scan(&|terms| has(terms, a) || has(terms, b))
        );
        assert_eq!(
            sorted_texts(index.search_phrase_query(&[a, b]).unwrap()),
            scan(&|terms| terms.windows(2).any(|w| w[0] == a && w[1] == b))
        );
    }

    index.merge_all_segments().unwrap();
    assert_eq!(
        sorted_texts(index.search_phrase_query(&["ant", "bee"]).unwrap()),
        scan(&|terms| terms.windows(2).any(|w| w[0] == "ant" && w[1] == "bee"))
    );
}
