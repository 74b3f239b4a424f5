use speculate2::speculate;

speculate! {
    use chrono::Duration;
    use notekeeper::services::{NoteSearch, SearchCache};
    use notekeeper_core::models::{CreateNoteInput, Note, UpdateNoteInput};
    use notekeeper_core::search::SearchWeights;
    use notekeeper_core::{Database, Error, ManualClock};
    use std::sync::Arc;
    use tokio_test::block_on;

    struct Fixture {
        db: Database,
        clock: Arc<ManualClock>,
        search: NoteSearch,
    }

    fn setup() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        let cache = Arc::new(SearchCache::new(Duration::seconds(30), clock.clone()));
        let search = NoteSearch::new(db.clone(), cache, SearchWeights::default());
        Fixture { db, clock, search }
    }

    fn create(db: &Database, title: &str, content: Option<&str>) -> Note {
        db.create_note(CreateNoteInput {
            title: title.into(),
            content: content.map(Into::into),
        })
        .expect("Failed to create note")
        .note
    }

    fn ids(results: &[notekeeper_core::models::SearchHit]) -> Vec<uuid::Uuid> {
        results.iter().map(|h| h.note.id).collect()
    }

    describe "search" {
        it "ranks a title match above a content-only match" {
            let f = setup();
            let content_only = create(&f.db, "Banana bread", Some("one apple"));
            let titled = create(&f.db, "Apple pie", None);

            let results = block_on(f.search.search("apple")).unwrap();
            assert_eq!(ids(&results), vec![titled.id, content_only.id]);
            assert!(results[0].score > results[1].score);
        }

        it "rejects a query that is blank after normalization" {
            let f = setup();
            let result = block_on(f.search.search("  \t "));
            assert!(matches!(result, Err(Error::Validation(_))));
            assert_eq!(f.search.scan_count(), 0);
        }

        it "serves repeat queries from the cache without rescanning" {
            let f = setup();
            create(&f.db, "Apple pie", None);
            create(&f.db, "Apple crumble", Some("apple and oats"));

            let first = block_on(f.search.search("Apple")).unwrap();
            let second = block_on(f.search.search("  apple ")).unwrap();

            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(f.search.scan_count(), 1);
            assert_eq!(f.search.cache().stats().hits, 1);
        }

        it "rescans once the cache entry expires" {
            let f = setup();
            create(&f.db, "Apple pie", None);

            block_on(f.search.search("apple")).unwrap();
            f.clock.advance(Duration::seconds(30));
            block_on(f.search.search("apple")).unwrap();

            assert_eq!(f.search.scan_count(), 2);
        }

        it "sees mutations after the cache is invalidated" {
            let f = setup();
            let note = create(&f.db, "Apple pie", None);
            assert_eq!(block_on(f.search.search("apple")).unwrap().len(), 1);

            f.db
                .update_note(note.id, UpdateNoteInput { title: Some("Pear tart".into()), content: None })
                .unwrap();
            block_on(f.search.cache().invalidate_all());

            assert!(block_on(f.search.search("apple")).unwrap().is_empty());
            assert_eq!(f.search.scan_count(), 2);
        }

        it "never returns soft-deleted notes" {
            let f = setup();
            let gone = create(&f.db, "Apple pie", None);
            let kept = create(&f.db, "Apple tart", None);
            f.db.soft_delete_note(gone.id).unwrap();

            let results = block_on(f.search.search("apple")).unwrap();
            assert_eq!(ids(&results), vec![kept.id]);
        }
    }
}
