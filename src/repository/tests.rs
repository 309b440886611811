//! Repository Integration Tests
//!
//! The same store contract is exercised against every backend, plus
//! backend-specific initialization behavior.

#[cfg(test)]
mod tests {
    use crate::domain::{
        DomainError, Field, IdGenerator, ItemInput, NameMatch, Quote, SequentialIdGenerator, ValidationError,
        ValidationRules,
    };
    use crate::repository::{
        InMemoryQuoteStore, ItemRepository, JsonFileStore, QuoteStore, SqliteQuoteStore, IN_MEMORY,
    };
    use chrono::NaiveDate;
    use rusqlite::params;
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn quote(id: &str) -> Quote {
        Quote::new(id.to_string(), NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
    }

    fn ids(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.quote_id.as_str()).collect()
    }

    async fn check_store_contract(store: &dyn QuoteStore) {
        assert!(store.list().await.expect("List failed").is_empty());

        store.upsert(&quote("Q1")).await.expect("Upsert failed");
        store.upsert(&quote("Q2")).await.expect("Upsert failed");
        store.upsert(&quote("Q3")).await.expect("Upsert failed");

        // Replacing keeps the original position
        let mut changed = quote("Q1");
        changed.created_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        store.upsert(&changed).await.expect("Upsert failed");

        let listed = store.list().await.unwrap();
        assert_eq!(ids(&listed), vec!["Q1", "Q2", "Q3"]);
        assert_eq!(listed[0].created_date, changed.created_date);

        let found = store.get_by_id("Q2").await.expect("Find failed");
        assert_eq!(found, Some(quote("Q2")));
        assert_eq!(store.get_by_id("nope").await.unwrap(), None);

        store.delete("Q2").await.expect("Delete failed");
        assert!(matches!(store.delete("Q2").await, Err(DomainError::NotFound(_))));
        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q1", "Q3"]);

        store.save_all(&[quote("Q9"), quote("Q1")]).await.expect("Save failed");
        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q9", "Q1"]);
    }

    #[tokio::test]
    async fn test_json_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("quotes.json"));
        check_store_contract(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_contract() {
        let store = SqliteQuoteStore::open(Path::new(IN_MEMORY)).expect("Failed to open test DB");
        check_store_contract(&store).await;
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        check_store_contract(&InMemoryQuoteStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_list_initializes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("quotes.json");
        let store = JsonFileStore::new(&path);

        assert!(store.list().await.unwrap().is_empty());
        let content = std::fs::read_to_string(&path).expect("file should exist after list");
        assert_eq!(serde_json::from_str::<Vec<Quote>>(&content).unwrap(), Vec::<Quote>::new());

        // Still a valid empty collection for the next call
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_corrupt_file_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
        assert!(dir.path().join("quotes.json.corrupt").exists());

        // A second corruption does not replace the first copy
        std::fs::write(&path, "also broken").unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("quotes.json.corrupt")).unwrap(), "{ not json");
        assert_eq!(std::fs::read_to_string(dir.path().join("quotes.json.corrupt.1")).unwrap(), "also broken");
    }

    #[tokio::test]
    async fn test_json_unreadable_file_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        let original: &[u8] = &[0xff, 0xfe, b'[', b']'];
        std::fs::write(&path, original).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
        store.save_all(&[quote("Q-new")]).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("quotes.json.corrupt")).unwrap(), original);
        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q-new"]);
    }

    #[tokio::test]
    async fn test_json_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        let store = JsonFileStore::new(&path);
        store.upsert(&quote("Q1")).await.unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["quoteId"], "Q1");
        assert_eq!(raw[0]["createdDate"], "2024-05-17");
        assert_eq!(raw[0]["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        {
            let store = SqliteQuoteStore::open(&path).unwrap();
            store.upsert(&quote("Q1")).await.unwrap();
        }

        let store = SqliteQuoteStore::open(&path).unwrap();
        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q1"]);
    }

    #[tokio::test]
    async fn test_sqlite_unreadable_rows_survive_save_all() {
        let conn = Arc::new(Mutex::new(crate::repository::open_db(Path::new(IN_MEMORY)).unwrap()));
        let store = SqliteQuoteStore::new(conn.clone());
        store.upsert(&quote("Q1")).await.unwrap();
        conn.lock()
            .await
            .execute(
                "INSERT INTO quotes (quote_id, created_date, total_price, items) VALUES (?1, ?2, ?3, ?4)",
                params!["Q-legacy", "12/01/2024", 10.0, "[]"],
            )
            .unwrap();

        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q1"]);
        store.save_all(&[quote("Q1"), quote("Q-new")]).await.unwrap();

        let conn = conn.lock().await;
        let kept: (String, String) = conn
            .query_row("SELECT quote_id, created_date FROM quotes_quarantine", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(kept, ("Q-legacy".to_string(), "12/01/2024".to_string()));
    }

    #[tokio::test]
    async fn test_store_revision_counts_writes() {
        let store = SqliteQuoteStore::open(Path::new(IN_MEMORY)).unwrap();
        assert_eq!(store.revision(), 0);

        store.upsert(&quote("Q1")).await.unwrap();
        store.save_all(&[quote("Q1")]).await.unwrap();
        assert!(store.delete("nope").await.is_err());
        store.list().await.unwrap();
        assert_eq!(store.revision(), 2);

        let dir = tempfile::tempdir().unwrap();
        let json = JsonFileStore::new(dir.path().join("quotes.json"));
        json.list().await.unwrap();
        assert_eq!(json.revision(), 0);
        json.upsert(&quote("Q1")).await.unwrap();
        json.delete("Q1").await.unwrap();
        assert_eq!(json.revision(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_failing_writes() {
        let store = InMemoryQuoteStore::with_quotes(vec![quote("Q1")]);
        store.set_fail_writes(true);

        assert!(matches!(store.upsert(&quote("Q2")).await, Err(DomainError::Storage(_))));
        assert!(matches!(store.delete("Q1").await, Err(DomainError::Storage(_))));
        assert_eq!(ids(&store.list().await.unwrap()), vec!["Q1"]);
        assert_eq!(store.write_count(), 0);
    }

    async fn setup_item_repo(rules: ValidationRules) -> (Arc<InMemoryQuoteStore>, ItemRepository) {
        let store = Arc::new(InMemoryQuoteStore::with_quotes(vec![quote("Q1")]));
        let repo = ItemRepository::new(store.clone(), Arc::new(SequentialIdGenerator::new()), rules);
        (store, repo)
    }

    #[tokio::test]
    async fn test_item_create_and_list() {
        let (store, repo) = setup_item_repo(ValidationRules::default()).await;

        let paint = repo.create("Q1", &ItemInput::new("Paint", "2 gallons", 40.0)).await.expect("Failed to create");
        assert_eq!(paint.id, "item1");
        repo.create("Q1", &ItemInput::new("Labor", "4 hours", 100.0)).await.unwrap();

        let items = repo.list("Q1").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Paint");

        let stored = store.get_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored.total_price, 140.0);
    }

    #[tokio::test]
    async fn test_item_duplicate_name_rejected() {
        let (store, repo) = setup_item_repo(ValidationRules::default()).await;
        repo.create("Q1", &ItemInput::new("Labor", "4 hours", 100.0)).await.unwrap();

        let err = repo.create("Q1", &ItemInput::new("Labor", "again", 5.0)).await.unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::DuplicateName("Labor".to_string())));

        let stored = store.get_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.total_price, 100.0);
    }

    #[tokio::test]
    async fn test_item_case_insensitive_policy() {
        let rules = ValidationRules { name_match: NameMatch::CaseInsensitive, ..Default::default() };
        let (_store, repo) = setup_item_repo(rules).await;
        repo.create("Q1", &ItemInput::new("Labor", "4 hours", 100.0)).await.unwrap();

        let err = repo.create("Q1", &ItemInput::new("labor", "again", 5.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_item_update_and_delete() {
        let (store, repo) = setup_item_repo(ValidationRules::default()).await;
        let paint = repo.create("Q1", &ItemInput::new("Paint", "2 gallons", 40.0)).await.unwrap();
        repo.create("Q1", &ItemInput::new("Labor", "4 hours", 100.0)).await.unwrap();

        // Keeping its own name is fine, taking another item's is not
        let updated = repo.update("Q1", &paint.id, &ItemInput::new("Paint", "3 gallons", 60.0)).await.unwrap();
        assert_eq!(updated.description, "3 gallons");
        let err = repo.update("Q1", &paint.id, &ItemInput::new("Labor", "x", 1.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationError::DuplicateName(_))));

        repo.delete("Q1", &paint.id).await.expect("Delete failed");
        let stored = store.get_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.total_price, 100.0);

        assert!(matches!(repo.delete("Q1", &paint.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_item_reused_id_is_conflict() {
        struct SameItemId;

        impl IdGenerator for SameItemId {
            fn quote_id(&self) -> String {
                "Q-unused".to_string()
            }

            fn item_id(&self) -> String {
                "item-same".to_string()
            }
        }

        let store = Arc::new(InMemoryQuoteStore::with_quotes(vec![quote("Q1")]));
        let repo = ItemRepository::new(store.clone(), Arc::new(SameItemId), ValidationRules::default());
        repo.create("Q1", &ItemInput::new("Paint", "2 gallons", 40.0)).await.unwrap();

        let err = repo.create("Q1", &ItemInput::new("Labor", "4 hours", 100.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.get_by_id("Q1").await.unwrap().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_item_errors() {
        let (_store, repo) = setup_item_repo(ValidationRules::default()).await;

        assert!(matches!(repo.list("missing").await, Err(DomainError::NotFound(_))));

        let blank = ItemInput { description: Some("  ".to_string()), ..ItemInput::new("Paint", "", 1.0) };
        assert_eq!(
            repo.create("Q1", &blank).await,
            Err(DomainError::Validation(ValidationError::MissingField(Field::Description)))
        );
    }
}
