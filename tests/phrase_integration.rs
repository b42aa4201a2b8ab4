use tempfile::TempDir;

use segdex::{
    Compressor, DeltaVarLenCompressor, Document, IndexConfig, InvertedIndex, NaiveCompressor,
    PunctuationAnalyzer, SegdexError,
};

fn open_positional(
    tmp: &TempDir,
    compressor: impl Compressor + 'static,
    config: IndexConfig,
) -> InvertedIndex {
    InvertedIndex::open_with_config(
        tmp.path(),
        PunctuationAnalyzer::without_stopwords(),
        compressor,
        config,
    )
    .unwrap()
}

fn texts(iter: impl Iterator<Item = Document>) -> Vec<String> {
    iter.map(|doc| doc.text).collect()
}

const CITIES: [&str; 5] = [
    "I love New York",
    "york is new to me",
    "new jersey and new york city",
    "new new york",
    "york, new york!",
];

#[test]
fn phrase_requires_consecutive_terms_in_order() {
    let tmp = TempDir::new().unwrap();
    let mut index = open_positional(&tmp, DeltaVarLenCompressor, IndexConfig::positional());
    for text in CITIES {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();

    assert_eq!(
        texts(index.search_phrase_query(&["new", "york"]).unwrap()),
        vec![
            "I love New York",
            "new jersey and new york city",
            "new new york",
            "york, new york!"
        ]
    );
    assert_eq!(
        texts(index.search_phrase_query(&["york", "new"]).unwrap()),
        vec!["york, new york!"]
    );
    assert_eq!(
        texts(index.search_phrase_query(&["new", "york", "city"]).unwrap()),
        vec!["new jersey and new york city"]
    );
    // AND ignores order and adjacency
    assert_eq!(index.search_and_query(&["york", "new"]).unwrap().len(), 5);
}

#[test]
fn phrase_keyword_may_hold_several_words() {
    let tmp = TempDir::new().unwrap();
    let mut index = open_positional(&tmp, DeltaVarLenCompressor, IndexConfig::positional());
    for text in CITIES {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();

    assert_eq!(
        texts(index.search_phrase_query(&["new york city"]).unwrap()),
        vec!["new jersey and new york city"]
    );
    assert_eq!(index.search_phrase_query(&["new", ",", "york"]).unwrap().len(), 0);
    assert_eq!(index.search_phrase_query(&["boston"]).unwrap().len(), 0);
}

#[test]
fn phrase_on_non_positional_index_is_unsupported() {
    let tmp = TempDir::new().unwrap();
    let mut index =
        InvertedIndex::create_or_open(tmp.path(), PunctuationAnalyzer::without_stopwords()).unwrap();
    index.add_document(Document::new("new york")).unwrap();
    index.flush().unwrap();

    let err = index.search_phrase_query(&["new", "york"]).unwrap_err();
    assert!(matches!(err, SegdexError::Unsupported(_)));
    assert!(tmp.path().join("segment0_words").exists());
    assert!(!tmp.path().join("segment0_positions").exists());
}

#[test]
fn deleted_term_masks_phrase() {
    let tmp = TempDir::new().unwrap();
    let mut index = open_positional(&tmp, DeltaVarLenCompressor, IndexConfig::positional());
    for text in CITIES {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();

    index.delete_documents("jersey").unwrap();
    assert_eq!(index.search_phrase_query(&["new", "jersey"]).unwrap().len(), 0);
    assert_eq!(index.search_phrase_query(&["new", "york"]).unwrap().len(), 4);
}

#[test]
fn long_lists_span_pages() {
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::positional().with_flush_threshold(10_000);
    let mut index = open_positional(&tmp, NaiveCompressor, config);

    // one document whose position lists alone exceed a page
    let long = vec!["alpha beta"; 3_000].join(" ");
    index.add_document(Document::new(long.clone())).unwrap();
    for i in 0..2_000 {
        index
            .add_document(Document::new(format!("alpha filler{} beta", i)))
            .unwrap();
    }
    index.add_document(Document::new("beta alpha")).unwrap();
    index.flush().unwrap();

    let hits = texts(index.search_phrase_query(&["alpha", "beta"]).unwrap());
    assert_eq!(hits, vec![long]);
    assert_eq!(index.search_and_query(&["alpha", "beta"]).unwrap().len(), 2_002);
    assert_eq!(index.search_phrase_query(&["beta", "alpha"]).unwrap().len(), 2);

    let snapshot = index.positional_segment(0).unwrap().unwrap();
    let alpha = &snapshot.positions[&("alpha".to_string(), 0)];
    assert_eq!(alpha.len(), 3_000);
    assert_eq!(alpha[2_999], 5_998);
    assert_eq!(snapshot.positions[&("beta".to_string(), 2_001)], vec![0]);
    assert_eq!(snapshot.inverted_lists["alpha"].len(), 2_002);
}

#[test]
fn phrase_survives_merges() {
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::positional()
        .with_flush_threshold(2)
        .with_merge_threshold(2);
    let mut index = open_positional(&tmp, DeltaVarLenCompressor, config);
    for text in CITIES {
        index.add_document(Document::new(text)).unwrap();
    }
    index.flush().unwrap();
    assert_eq!(index.num_segments(), 1);

    assert_eq!(index.search_phrase_query(&["new", "york"]).unwrap().len(), 4);
    let snapshot = index.positional_segment(0).unwrap().unwrap();
    assert_eq!(snapshot.positions[&("new".to_string(), 3)], vec![0, 1]);
    assert_eq!(snapshot.positions[&("york".to_string(), 4)], vec![0, 2]);
}

#[test]
fn reopened_positional_index_answers_phrases() {
    let tmp = TempDir::new().unwrap();
    {
        let mut index = InvertedIndex::create_or_open_positional(
            tmp.path(),
            PunctuationAnalyzer::without_stopwords(),
            DeltaVarLenCompressor,
        )
        .unwrap();
        for text in CITIES {
            index.add_document(Document::new(text)).unwrap();
        }
        index.flush().unwrap();
    }

    let index = InvertedIndex::create_or_open_positional(
        tmp.path(),
        PunctuationAnalyzer::without_stopwords(),
        DeltaVarLenCompressor,
    )
    .unwrap();
    assert_eq!(index.search_phrase_query(&["new", "york"]).unwrap().len(), 4);
}
