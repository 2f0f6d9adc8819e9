//! End-to-End Tests for the Page Translation Pipeline
//!
//! The offline tests run a whole page through [`PageTranslator`] against a
//! [`MemoryStore`] and a [`MockTranslator`]. The live test needs a page shared
//! with the integration and both API tokens:
//!
//! ```bash
//! export NOTION_API_TOKEN=... DEEPL_API_TOKEN=... NOTION_TEST_PAGE=<page url>
//! cargo test --lib pipeline::integration_tests -- --ignored --nocapture
//! ```

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::block::{Block, BlockType};
    use crate::mt::{MockMode, MockTranslator};
    use crate::notion::MemoryStore;
    use crate::pipeline::rules::{IMAGE_REMOVED_NOTICE, TABLE_REMOVED_NOTICE};
    use serde_json::{Value, json};

    const PAGE_ID: &str = "0123456789abcdef0123456789abcdef";

    fn text_run(text: &str) -> Value {
        json!({
            "type": "text",
            "text": {"content": text, "link": null},
            "annotations": {"bold": false, "italic": false, "color": "default"},
            "plain_text": text,
            "href": null
        })
    }

    fn text_block(id: &str, kind: &str, text: &str, has_children: bool) -> Value {
        json!({
            "object": "block",
            "id": id,
            "type": kind,
            "created_time": "2023-01-01T00:00:00.000Z",
            "last_edited_time": "2023-01-02T00:00:00.000Z",
            "has_children": has_children,
            kind: {"rich_text": [text_run(text)], "color": "default"}
        })
    }

    fn paragraph(id: &str, text: &str) -> Value {
        text_block(id, "paragraph", text, false)
    }

    fn first_text(block: &Block) -> &str {
        block.payload["rich_text"][0]["plain_text"]
            .as_str()
            .unwrap_or_default()
    }

    fn translator(store: &Arc<MemoryStore>, mock: &MockTranslator) -> PageTranslator {
        PageTranslator::new(store.clone(), Arc::new(mock.clone()), TranslationPolicy::default())
    }

    fn fixed() -> LanguageMode {
        LanguageMode::Fixed(LanguagePair::new("EN", "JA"))
    }

    fn submitted(store: &MemoryStore) -> Vec<Block> {
        store
            .appended()
            .into_iter()
            .flat_map(|(_, batch)| batch)
            .collect()
    }

    // ============================================================================
    // Whole-page runs
    // ============================================================================

    #[tokio::test]
    async fn test_full_page_fixed_pair() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Notes")
                .with_page("linked", "Linked page")
                .with_children(
                    PAGE_ID,
                    vec![
                        text_block("h1", "heading_1", "Agenda", false),
                        json!({"id": "u1", "type": "unsupported", "unsupported": {}, "has_children": false}),
                        text_block("tg", "toggle", "Details", true),
                        json!({
                            "id": "img",
                            "type": "image",
                            "has_children": false,
                            "image": {"type": "file", "file": {"url": "https://s3.example/i.png"}, "caption": []}
                        }),
                        json!({"id": "linked", "type": "child_page", "has_children": true, "child_page": {"title": "Linked page"}}),
                        json!({"id": "missing", "type": "child_page", "has_children": false, "child_page": {"title": "Gone"}}),
                        paragraph("p1", "Bye"),
                    ],
                )
                .with_children("tg", vec![paragraph("p2", "Inside")]),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock)
            .translate_page(&format!("https://www.notion.so/team/Notes-{}", PAGE_ID), fixed())
            .await
            .unwrap();

        assert_eq!(outcome.page_id, "created-1");
        assert_eq!(outcome.url.as_deref(), Some("https://www.notion.so/created-1"));
        assert_eq!(outcome.pair, LanguagePair::new("EN", "JA"));
        assert_eq!(mock.detection_count(), 0);

        let draft = &store.created_pages()[0];
        assert_eq!(draft.parent, json!({"page_id": PAGE_ID}));
        assert_eq!(draft.properties["title"]["title"][0]["plain_text"], "Notes (JA)");

        let blocks = submitted(&store);
        let kinds: Vec<&BlockType> = blocks.iter().map(|block| &block.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &BlockType::Heading1,
                &BlockType::Toggle,
                &BlockType::Paragraph,
                &BlockType::LinkToPage,
                &BlockType::Paragraph,
            ]
        );
        assert_eq!(first_text(&blocks[0]), "Agenda_JA");
        assert_eq!(first_text(&blocks[1].children()[0]), "Inside_JA");
        assert_eq!(first_text(&blocks[2]), format!("{}_JA", IMAGE_REMOVED_NOTICE));
        assert_eq!(blocks[3].payload["page_id"], "linked");
        assert_eq!(first_text(&blocks[4]), "Bye_JA");

        for block in blocks.iter().chain(blocks[1].children()) {
            assert_eq!(block.id, None);
            assert!(block.audit.is_empty());
        }

        assert_eq!(outcome.walk.dropped_for(&DropReason::Unsupported), 1);
        assert!(matches!(
            outcome.walk.dropped.last().map(|drop| &drop.reason),
            Some(DropReason::UnresolvedPage(_))
        ));
        assert_eq!(outcome.walk.notices, 1);
        assert_eq!(outcome.walk.links, 1);
        assert_eq!(outcome.submit, SubmitReport { batches: 1, blocks: 5 });
    }

    #[tokio::test]
    async fn test_batches_of_ten() {
        let children = (0..25).map(|i| paragraph(&format!("p{}", i), &format!("Line {}", i))).collect();
        let store = Arc::new(MemoryStore::new().with_page(PAGE_ID, "Long").with_children(PAGE_ID, children));
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await.unwrap();

        let sizes: Vec<usize> = store.appended().iter().map(|(_, batch)| batch.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(outcome.submit.blocks, 25);
        let texts: Vec<String> = submitted(&store).iter().map(|b| first_text(b).to_string()).collect();
        let expected: Vec<String> = (0..25).map(|i| format!("Line {}_JA", i)).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_empty_page_creates_title_only() {
        let store = Arc::new(MemoryStore::new().with_page(PAGE_ID, "Blank"));
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock)
            .translate_page(PAGE_ID, LanguageMode::Detect)
            .await
            .unwrap();

        assert_eq!(outcome.pair, LanguagePair::new("EN", "JA"));
        assert_eq!(mock.detection_count(), 1);
        assert_eq!(mock.calls()[0].texts, vec!["Blank".to_string()]);
        assert!(store.appended().is_empty());
        assert_eq!(store.created_pages().len(), 1);
    }

    // ============================================================================
    // Language pinning
    // ============================================================================

    #[tokio::test]
    async fn test_detects_once_per_run() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Notes")
                .with_children(
                    PAGE_ID,
                    vec![
                        paragraph("p1", "First"),
                        text_block("tg", "toggle", "Toggle", true),
                        paragraph("p3", "Last"),
                    ],
                )
                .with_children("tg", vec![paragraph("p2", "Nested")]),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock)
            .translate_page(PAGE_ID, LanguageMode::Detect)
            .await
            .unwrap();

        assert_eq!(mock.detection_count(), 1);
        assert_eq!(outcome.pair, LanguagePair::new("EN", "JA"));

        let calls = mock.calls();
        assert_eq!(calls[0].source_locale, None);
        assert_eq!(calls[0].target_locale, "en-US");
        for call in &calls[1..] {
            assert_eq!(call.source_locale.as_deref(), Some("EN"));
            assert_eq!(call.target_locale, "JA");
        }
    }

    #[tokio::test]
    async fn test_non_english_page_goes_to_english() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Notizen")
                .with_children(
                    PAGE_ID,
                    vec![
                        paragraph("p1", "Hallo"),
                        json!({
                            "id": "img",
                            "type": "image",
                            "has_children": false,
                            "image": {"type": "file", "file": {"url": "https://s3.example/i.png"}}
                        }),
                    ],
                ),
        );
        let mock = MockTranslator::new(MockMode::Suffix).detecting("DE");

        let outcome = translator(&store, &mock)
            .translate_page(PAGE_ID, LanguageMode::Detect)
            .await
            .unwrap();

        assert_eq!(outcome.pair, LanguagePair::new("DE", "en-US"));
        let blocks = submitted(&store);
        assert_eq!(first_text(&blocks[0]), "Hallo_en-US");
        // English notices need no translation into English
        assert_eq!(first_text(&blocks[1]), IMAGE_REMOVED_NOTICE);
        assert!(mock.calls().iter().all(|call| call.source_locale.as_deref() != Some("EN")));
        assert_eq!(
            store.created_pages()[0].properties["title"]["title"][0]["plain_text"],
            "Notizen (en-US)"
        );
    }

    #[tokio::test]
    async fn test_notice_before_any_text_pins_from_title() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Quarterly report")
                .with_children(
                    PAGE_ID,
                    vec![json!({
                        "id": "t1",
                        "type": "table",
                        "has_children": true,
                        "table": {"table_width": 1, "has_column_header": false, "has_row_header": false}
                    })],
                ),
        );
        let mock = MockTranslator::new(MockMode::Suffix);
        let policy = TranslationPolicy::default().with_table_mode(TableMode::Notice);
        let pipeline = PageTranslator::new(store.clone(), Arc::new(mock.clone()), policy);

        pipeline.translate_page(PAGE_ID, LanguageMode::Detect).await.unwrap();

        assert_eq!(mock.detection_count(), 1);
        assert_eq!(mock.calls()[0].texts, vec!["Quarterly report".to_string()]);
        assert_eq!(
            first_text(&submitted(&store)[0]),
            format!("{}_JA", TABLE_REMOVED_NOTICE)
        );
    }

    #[tokio::test]
    async fn test_leading_whitespace_run_in_detect_mode() {
        let store = Arc::new(
            MemoryStore::new().with_page(PAGE_ID, "").with_children(
                PAGE_ID,
                vec![
                    paragraph("blank", " "),
                    json!({
                        "id": "p1",
                        "type": "paragraph",
                        "has_children": false,
                        "paragraph": {"rich_text": [text_run(" "), text_run("Hello")]}
                    }),
                ],
            ),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock)
            .translate_page(PAGE_ID, LanguageMode::Detect)
            .await
            .unwrap();

        assert_eq!(outcome.pair, LanguagePair::new("EN", "JA"));
        assert_eq!(mock.detection_count(), 1);
        assert_eq!(mock.calls()[0].texts, vec!["Hello".to_string()]);

        let blocks = submitted(&store);
        assert_eq!(first_text(&blocks[0]), " ");
        assert_eq!(blocks[1].payload["rich_text"][1]["plain_text"], "Hello_JA");
    }

    // ============================================================================
    // Depth constraints
    // ============================================================================

    #[tokio::test]
    async fn test_deep_nesting_is_flattened() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Deep")
                .with_children(PAGE_ID, vec![text_block("l0", "bulleted_list_item", "Level 0", true)])
                .with_children("l0", vec![text_block("l1", "bulleted_list_item", "Level 1", true)])
                .with_children("l1", vec![text_block("l2", "bulleted_list_item", "Level 2", true)])
                .with_children("l2", vec![paragraph("l3", "Level 3")]),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        translator(&store, &mock).translate_page(PAGE_ID, fixed()).await.unwrap();

        let blocks = submitted(&store);
        let level2 = &blocks[0].children()[0].children()[0];
        assert_eq!(first_text(level2), "Level 2_JA");
        assert!(!level2.has_children);
        assert!(level2.children().is_empty());

        let listed: Vec<String> = store.list_calls().into_iter().map(|call| call.block_id).collect();
        assert_eq!(listed, vec![PAGE_ID.to_string(), "l0".to_string(), "l1".to_string()]);
    }

    #[tokio::test]
    async fn test_column_list_below_top_level_yields_nothing() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Columns")
                .with_children(
                    PAGE_ID,
                    vec![
                        json!({"id": "cl0", "type": "column_list", "has_children": true, "column_list": {}}),
                        text_block("tg", "toggle", "Toggle", true),
                    ],
                )
                .with_children(
                    "cl0",
                    vec![json!({"id": "c0", "type": "column", "has_children": true, "column": {}})],
                )
                .with_children("c0", vec![paragraph("in-col", "Column text")])
                .with_children(
                    "tg",
                    vec![json!({"id": "cl1", "type": "column_list", "has_children": true, "column_list": {}})],
                ),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        let outcome = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await.unwrap();

        let blocks = submitted(&store);
        assert_eq!(blocks[0].kind, BlockType::ColumnList);
        assert_eq!(first_text(&blocks[0].children()[0].children()[0]), "Column text_JA");
        assert!(blocks[1].children().is_empty());
        assert_eq!(outcome.walk.dropped_for(&DropReason::NestedColumnList), 1);
        assert!(!store.list_calls().iter().any(|call| call.block_id == "cl1"));
    }

    // ============================================================================
    // Failures
    // ============================================================================

    #[tokio::test]
    async fn test_database_is_rejected() {
        let store = Arc::new(MemoryStore::new().with_database(PAGE_ID));
        let mock = MockTranslator::new(MockMode::Suffix);

        let result = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await;

        assert!(matches!(result, Err(PipelineError::NotAPage(id)) if id == PAGE_ID));
        assert!(store.created_pages().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_page_is_unreadable() {
        let store = Arc::new(MemoryStore::new());
        let mock = MockTranslator::new(MockMode::Suffix);

        let result = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await;
        assert!(matches!(result, Err(PipelineError::Unreadable { .. })));

        let result = translator(&store, &mock).translate_page("  ", fixed()).await;
        assert!(matches!(result, Err(PipelineError::InvalidPageRef(_))));
    }

    #[tokio::test]
    async fn test_translation_failure_creates_nothing() {
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Notes")
                .with_children(PAGE_ID, vec![paragraph("p1", "Hello")]),
        );
        let mock = MockTranslator::new(MockMode::Error("quota exceeded".to_string()));

        let result = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await;

        assert!(matches!(result, Err(PipelineError::Translation(_))));
        assert!(store.created_pages().is_empty());
        assert!(store.appended().is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_reports_accepted_batches() {
        let children = (0..15).map(|i| paragraph(&format!("p{}", i), "Text")).collect();
        let store = Arc::new(
            MemoryStore::new()
                .with_page(PAGE_ID, "Notes")
                .with_children(PAGE_ID, children)
                .failing_append(1),
        );
        let mock = MockTranslator::new(MockMode::Suffix);

        let result = translator(&store, &mock).translate_page(PAGE_ID, fixed()).await;

        assert!(matches!(result, Err(PipelineError::Submission { accepted: 1, .. })));
        assert_eq!(store.appended().len(), 1);
    }

    // ============================================================================
    // Live run
    // ============================================================================

    #[tokio::test]
    #[ignore]
    async fn test_e2e_real_page() {
        use crate::mt::DeeplTranslator;
        use crate::notion::NotionClient;

        let Ok(page) = std::env::var("NOTION_TEST_PAGE") else {
            eprintln!("Skipping: NOTION_TEST_PAGE not set");
            return;
        };
        let (Ok(store), Ok(mt)) = (NotionClient::from_env(), DeeplTranslator::from_env()) else {
            eprintln!("Skipping: API tokens not set");
            return;
        };

        let pipeline = PageTranslator::new(Arc::new(store), Arc::new(mt), TranslationPolicy::default())
            .with_progress(Arc::new(LogProgress));
        let outcome = pipeline.translate_page(&page, LanguageMode::Detect).await.unwrap();

        println!("New page: {:?}", outcome.url);
        println!("Pair: {:?}", outcome.pair);
        println!("Report: {:?}", outcome.walk);
        assert!(outcome.url.is_some());
    }
}
