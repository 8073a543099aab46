use std::collections::BTreeMap;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, Result};

use super::migrations::run_migrations;
use super::traits::{StoredUser, WordStore};
use crate::core::error::AppResult;
use crate::vocab::VocabularyEntry;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a pool of up to 10 connections with foreign keys enabled and
/// applies schema migrations on the first connection.
///
/// # Example
///
/// ```no_run
/// use lexibot::storage::db;
///
/// let pool = db::create_pool("lexibot.sqlite")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn create_pool(database_path: &str) -> anyhow::Result<DbPool> {
    let manager =
        SqliteConnectionManager::file(database_path).with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

pub fn create_user(conn: &Connection, chat_id: i64, delay_minutes: u32) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO users (chat_id, delay_minutes, sender_active, created_at) VALUES (?1, ?2, 0, ?3)",
        params![chat_id, delay_minutes, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Loads every user with their words and translations.
pub fn get_all_users(conn: &Connection) -> Result<Vec<StoredUser>> {
    let mut users: BTreeMap<i64, StoredUser> = BTreeMap::new();

    let mut stmt = conn.prepare("SELECT chat_id, delay_minutes, sender_active FROM users")?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredUser {
            chat_id: row.get(0)?,
            delay_minutes: row.get(1)?,
            sender_active: row.get(2)?,
            words: Vec::new(),
        })
    })?;
    for row in rows {
        let user = row?;
        users.insert(user.chat_id, user);
    }

    let mut words: BTreeMap<(i64, String), VocabularyEntry> = BTreeMap::new();
    let mut stmt = conn.prepare("SELECT chat_id, word, usage_count FROM words")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, u32>(2)?))
    })?;
    for row in rows {
        let (chat_id, word, usage_count) = row?;
        words.insert(
            (chat_id, word.clone()),
            VocabularyEntry {
                word,
                translations: Vec::new(),
                usage_count,
            },
        );
    }

    let mut stmt =
        conn.prepare("SELECT chat_id, word, translation FROM translations ORDER BY chat_id, word, position")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (chat_id, word, translation) = row?;
        if let Some(entry) = words.get_mut(&(chat_id, word)) {
            entry.translations.push(translation);
        }
    }

    for ((chat_id, word), entry) in words {
        if entry.translations.is_empty() {
            log::warn!("Skipping word '{}' of user {}: no translations stored", word, chat_id);
            continue;
        }
        match users.get_mut(&chat_id) {
            Some(user) => user.words.push(entry),
            None => log::warn!("Skipping word '{}': user {} does not exist", word, chat_id),
        }
    }

    Ok(users.into_values().collect())
}

/// Inserts a word with its translations in one transaction.
pub fn insert_word(conn: &mut Connection, chat_id: i64, entry: &VocabularyEntry) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO words (chat_id, word, usage_count, added_at) VALUES (?1, ?2, ?3, ?4)",
        params![chat_id, entry.word, entry.usage_count, chrono::Utc::now().to_rfc3339()],
    )?;
    for (position, translation) in entry.translations.iter().enumerate() {
        tx.execute(
            "INSERT INTO translations (chat_id, word, position, translation) VALUES (?1, ?2, ?3, ?4)",
            params![chat_id, entry.word, position as i64, translation],
        )?;
    }
    tx.commit()
}

/// Removes a word and its translations. Returns the number of words deleted.
pub fn remove_word(conn: &mut Connection, chat_id: i64, word: &str) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM translations WHERE chat_id = ?1 AND word = ?2",
        params![chat_id, word],
    )?;
    let deleted = tx.execute("DELETE FROM words WHERE chat_id = ?1 AND word = ?2", params![chat_id, word])?;
    tx.commit()?;
    Ok(deleted)
}

pub fn set_user_delay(conn: &Connection, chat_id: i64, minutes: u32) -> Result<usize> {
    conn.execute(
        "UPDATE users SET delay_minutes = ?1 WHERE chat_id = ?2",
        params![minutes, chat_id],
    )
}

pub fn increment_word_usage(conn: &Connection, chat_id: i64, word: &str) -> Result<usize> {
    conn.execute(
        "UPDATE words SET usage_count = usage_count + 1 WHERE chat_id = ?1 AND word = ?2",
        params![chat_id, word],
    )
}

pub fn set_user_sender_active(conn: &Connection, chat_id: i64, active: bool) -> Result<usize> {
    conn.execute(
        "UPDATE users SET sender_active = ?1 WHERE chat_id = ?2",
        params![active, chat_id],
    )
}

/// `WordStore` backed by the SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

fn expect_row(affected: usize, what: &str) -> Result<()> {
    if affected == 0 {
        log::warn!("{}: no matching row", what);
        return Err(rusqlite::Error::QueryReturnedNoRows);
    }
    Ok(())
}

impl WordStore for SqliteStore {
    fn load_all_users(&self) -> AppResult<Vec<StoredUser>> {
        let conn = self.conn()?;
        Ok(get_all_users(&conn)?)
    }

    fn create_user(&self, chat_id: i64, delay_minutes: u32) -> AppResult<()> {
        let conn = self.conn()?;
        Ok(create_user(&conn, chat_id, delay_minutes)?)
    }

    fn save_word(&self, chat_id: i64, entry: &VocabularyEntry) -> AppResult<()> {
        let mut conn = self.conn()?;
        Ok(insert_word(&mut conn, chat_id, entry)?)
    }

    fn delete_word(&self, chat_id: i64, word: &str) -> AppResult<()> {
        let mut conn = self.conn()?;
        let deleted = remove_word(&mut conn, chat_id, word)?;
        Ok(expect_row(deleted, "delete_word")?)
    }

    fn update_delay(&self, chat_id: i64, minutes: u32) -> AppResult<()> {
        let conn = self.conn()?;
        let updated = set_user_delay(&conn, chat_id, minutes)?;
        Ok(expect_row(updated, "update_delay")?)
    }

    fn increment_usage(&self, chat_id: i64, word: &str) -> AppResult<()> {
        let conn = self.conn()?;
        let updated = increment_word_usage(&conn, chat_id, word)?;
        Ok(expect_row(updated, "increment_usage")?)
    }

    fn set_sender_active(&self, chat_id: i64, active: bool) -> AppResult<()> {
        let conn = self.conn()?;
        let updated = set_user_sender_active(&conn, chat_id, active)?;
        Ok(expect_row(updated, "set_sender_active")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, SqliteStore::new(Arc::new(pool)))
    }

    fn entry(word: &str, translations: &[&str]) -> VocabularyEntry {
        VocabularyEntry::new(word, translations.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_create_and_load_user() {
        let (_dir, store) = test_store();
        store.create_user(100, 60).unwrap();
        // Second create is ignored
        store.create_user(100, 30).unwrap();

        let users = store.load_all_users().unwrap();
        assert_eq!(
            users,
            vec![StoredUser {
                chat_id: 100,
                delay_minutes: 60,
                sender_active: false,
                words: vec![],
            }]
        );
    }

    #[test]
    fn test_save_and_load_words_keep_translation_order() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.save_word(1, &entry("cat", &["חתול", "חתולה"])).unwrap();
        store.save_word(1, &entry("dog", &["כלב"])).unwrap();

        let users = store.load_all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].words, vec![entry("cat", &["חתול", "חתולה"]), entry("dog", &["כלב"])]);
    }

    #[test]
    fn test_duplicate_word_fails() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.save_word(1, &entry("cat", &["חתול"])).unwrap();
        let err = store.save_word(1, &entry("cat", &["חתול"])).unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn test_word_for_unknown_user_fails() {
        let (_dir, store) = test_store();
        assert!(store.save_word(42, &entry("cat", &["חתול"])).is_err());
    }

    #[test]
    fn test_delete_word() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.save_word(1, &entry("cat", &["חתול"])).unwrap();

        store.delete_word(1, "cat").unwrap();
        assert!(store.load_all_users().unwrap()[0].words.is_empty());
        assert!(store.delete_word(1, "cat").is_err());
    }

    #[test]
    fn test_update_delay_and_sender() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.update_delay(1, 15).unwrap();
        store.set_sender_active(1, true).unwrap();

        let user = &store.load_all_users().unwrap()[0];
        assert_eq!(user.delay_minutes, 15);
        assert!(user.sender_active);

        assert!(store.update_delay(999, 15).is_err());
    }

    #[test]
    fn test_increment_usage() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.save_word(1, &entry("cat", &["חתול"])).unwrap();
        store.increment_usage(1, "cat").unwrap();
        store.increment_usage(1, "cat").unwrap();

        let users = store.load_all_users().unwrap();
        assert_eq!(users[0].words[0].usage_count, 2);
        assert!(store.increment_usage(1, "dog").is_err());
    }

    #[test]
    fn test_users_are_isolated() {
        let (_dir, store) = test_store();
        store.create_user(1, 60).unwrap();
        store.create_user(2, 60).unwrap();
        store.save_word(1, &entry("cat", &["חתול"])).unwrap();
        store.save_word(2, &entry("cat", &["gato"])).unwrap();
        store.delete_word(1, "cat").unwrap();

        let users = store.load_all_users().unwrap();
        assert!(users[0].words.is_empty());
        assert_eq!(users[1].words, vec![entry("cat", &["gato"])]);
    }
}
