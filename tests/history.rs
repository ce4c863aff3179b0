use omnicalc::history::{
    History, HistoryError, HistoryItem, HistoryStore, MemoryStorage, SharedHistory, Storage,
    HISTORY_KEY, MAX_HISTORY,
};
use omnicalc::session::Calculator;
use omnicalc::Engine;
use std::sync::Arc;

fn init() {
    let _ = pretty_env_logger::try_init();
}

fn shared(storage: &Arc<MemoryStorage>) -> SharedHistory {
    SharedHistory::new(History::open(HistoryStore::new(Arc::clone(storage))))
}

/// Storage whose writes always fail.
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, HistoryError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), HistoryError> {
        Err(HistoryError::storage("read-only"))
    }

    fn remove(&self, _key: &str) -> Result<(), HistoryError> {
        Err(HistoryError::storage("read-only"))
    }
}

#[test]
fn test_keeps_the_fifty_most_recent_evaluations() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    let mut calculator = Calculator::new(Engine::new(), shared(&storage));

    let total = MAX_HISTORY + 10;
    for i in 1..=total {
        calculator.handle_input("AC");
        calculator.handle_input(&format!("{}+0", i));
        calculator.handle_input("=");
    }

    let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
    let persisted: Vec<HistoryItem> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.len(), MAX_HISTORY);

    let results: Vec<String> = persisted.iter().map(|item| item.result.clone()).collect();
    let expected: Vec<String> = (total - MAX_HISTORY + 1..=total)
        .rev()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(results, expected);
    assert_eq!(calculator.history().items(), persisted);
}

#[test]
fn test_failed_and_empty_evaluations_are_not_recorded() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    let mut calculator = Calculator::new(Engine::new(), shared(&storage));

    for keys in [&["="][..], &["sqrt(-4)", "="][..], &["AC", "1+", "="][..]] {
        for key in keys {
            calculator.handle_input(key);
        }
    }
    assert!(calculator.history().is_empty());
    assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
}

#[test]
fn test_history_survives_reopen() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    {
        let history = shared(&storage);
        history.record("6×7", "42").unwrap();
        history.record("2^10", "1024").unwrap();
    }

    let reopened = shared(&storage);
    let expressions: Vec<String> = reopened
        .items()
        .into_iter()
        .map(|item| item.expression)
        .collect();
    assert_eq!(expressions, vec!["2^10", "6×7"]);
}

#[test]
fn test_corrupt_storage_starts_empty() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(HISTORY_KEY, "[{\"id\":\"1\",\"expression\":".to_string())
        .unwrap();

    let history = shared(&storage);
    assert!(history.is_empty());

    history.record("1+1", "2").unwrap();
    assert_eq!(shared(&storage).len(), 1);
}

#[test]
fn test_clear_history_empties_storage() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    let mut calculator = Calculator::new(Engine::new(), shared(&storage));
    for key in ["9", "=", "AC", "8", "="] {
        calculator.handle_input(key);
    }
    assert_eq!(calculator.history().len(), 2);

    calculator.clear_history().unwrap();
    assert!(calculator.history().is_empty());
    assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
    assert!(shared(&storage).is_empty());
}

#[test]
fn test_concurrent_writers_do_not_lose_updates() {
    init();
    let storage = Arc::new(MemoryStorage::new());
    let history = shared(&storage);

    std::thread::scope(|scope| {
        for t in 0..4 {
            let history = history.clone();
            scope.spawn(move || {
                for i in 0..10 {
                    history.record(format!("{}-{}", t, i), "0").unwrap();
                }
            });
        }
    });

    assert_eq!(history.len(), 40);
    assert_eq!(shared(&storage).len(), 40);
}

#[test]
fn test_storage_failure_keeps_session_usable() {
    init();
    let history = SharedHistory::new(History::open(HistoryStore::new(ReadOnlyStorage)));
    assert!(matches!(
        history.record("1", "1"),
        Err(HistoryError::Storage(_))
    ));
    assert_eq!(history.len(), 1);

    let mut calculator = Calculator::new(Engine::new(), history);
    for key in ["2", "+", "2", "="] {
        calculator.handle_input(key);
    }
    assert_eq!(calculator.result(), "4");
    assert_eq!(calculator.history().len(), 2);
}
