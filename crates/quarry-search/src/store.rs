//! SQLite block store.
//!
//! The store holds one row per block in `blocks`, two FTS5 mirrors of it (case-sensitive and
//! case-insensitive trigram tokenizers, kept in sync by triggers) and the `refs` table of
//! block references. A `REGEXP` function is registered on every connection.

use std::{
    collections::{HashMap, HashSet},
    convert::Infallible,
    path::Path,
};

use quarry_query::is_block_id;
use quarry_tree::{NodeKind, Tree, WalkStatus, ial_to_string};
use regex::Regex;
use rusqlite::{
    Connection, OptionalExtension, Row, params, params_from_iter,
    functions::{Context, FunctionFlags},
    types::{Value, ValueRef},
};
use tracing::debug;

use crate::error::SearchError;

/// Case-sensitive full-text table.
pub const FTS_TABLE: &str = "blocks_fts";

/// Case-insensitive full-text table.
pub const FTS_TABLE_CASE_INSENSITIVE: &str = "blocks_fts_case_insensitive";

/// Most definition blocks returned by the recent-reference lookup.
pub const RECENT_REFS_LIMIT: usize = 32;

/// Schema of the block store.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS blocks (
    id TEXT NOT NULL UNIQUE,
    parent_id TEXT NOT NULL DEFAULT '',
    root_id TEXT NOT NULL DEFAULT '',
    hash TEXT NOT NULL DEFAULT '',
    box TEXT NOT NULL DEFAULT '',
    path TEXT NOT NULL DEFAULT '',
    hpath TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    alias TEXT NOT NULL DEFAULT '',
    memo TEXT NOT NULL DEFAULT '',
    tag TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    fcontent TEXT NOT NULL DEFAULT '',
    markdown TEXT NOT NULL DEFAULT '',
    length INTEGER NOT NULL DEFAULT 0,
    type TEXT NOT NULL DEFAULT '',
    subtype TEXT NOT NULL DEFAULT '',
    ial TEXT NOT NULL DEFAULT '',
    sort INTEGER NOT NULL DEFAULT 0,
    created TEXT NOT NULL DEFAULT '',
    updated TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_blocks_root_id ON blocks(root_id);
CREATE INDEX IF NOT EXISTS idx_blocks_box_hpath ON blocks(box, hpath);

CREATE VIRTUAL TABLE IF NOT EXISTS blocks_fts USING fts5(
    id UNINDEXED, parent_id UNINDEXED, root_id UNINDEXED, hash UNINDEXED, box UNINDEXED,
    path UNINDEXED, hpath, name, alias, memo, tag, content, fcontent, markdown UNINDEXED,
    length UNINDEXED, type UNINDEXED, subtype UNINDEXED, ial, sort UNINDEXED,
    created UNINDEXED, updated UNINDEXED,
    tokenize = 'trigram case_sensitive 1'
);
CREATE VIRTUAL TABLE IF NOT EXISTS blocks_fts_case_insensitive USING fts5(
    id UNINDEXED, parent_id UNINDEXED, root_id UNINDEXED, hash UNINDEXED, box UNINDEXED,
    path UNINDEXED, hpath, name, alias, memo, tag, content, fcontent, markdown UNINDEXED,
    length UNINDEXED, type UNINDEXED, subtype UNINDEXED, ial, sort UNINDEXED,
    created UNINDEXED, updated UNINDEXED,
    tokenize = 'trigram case_sensitive 0'
);

CREATE TRIGGER IF NOT EXISTS blocks_ai AFTER INSERT ON blocks BEGIN
    INSERT INTO blocks_fts(rowid, id, parent_id, root_id, hash, box, path, hpath, name, alias,
        memo, tag, content, fcontent, markdown, length, type, subtype, ial, sort, created, updated)
    VALUES (new.rowid, new.id, new.parent_id, new.root_id, new.hash, new.box, new.path,
        new.hpath, new.name, new.alias, new.memo, new.tag, new.content, new.fcontent,
        new.markdown, new.length, new.type, new.subtype, new.ial, new.sort, new.created,
        new.updated);
    INSERT INTO blocks_fts_case_insensitive(rowid, id, parent_id, root_id, hash, box, path,
        hpath, name, alias, memo, tag, content, fcontent, markdown, length, type, subtype, ial,
        sort, created, updated)
    VALUES (new.rowid, new.id, new.parent_id, new.root_id, new.hash, new.box, new.path,
        new.hpath, new.name, new.alias, new.memo, new.tag, new.content, new.fcontent,
        new.markdown, new.length, new.type, new.subtype, new.ial, new.sort, new.created,
        new.updated);
END;
CREATE TRIGGER IF NOT EXISTS blocks_ad AFTER DELETE ON blocks BEGIN
    DELETE FROM blocks_fts WHERE rowid = old.rowid;
    DELETE FROM blocks_fts_case_insensitive WHERE rowid = old.rowid;
END;
CREATE TRIGGER IF NOT EXISTS blocks_au AFTER UPDATE ON blocks BEGIN
    DELETE FROM blocks_fts WHERE rowid = old.rowid;
    DELETE FROM blocks_fts_case_insensitive WHERE rowid = old.rowid;
    INSERT INTO blocks_fts(rowid, id, parent_id, root_id, hash, box, path, hpath, name, alias,
        memo, tag, content, fcontent, markdown, length, type, subtype, ial, sort, created, updated)
    VALUES (new.rowid, new.id, new.parent_id, new.root_id, new.hash, new.box, new.path,
        new.hpath, new.name, new.alias, new.memo, new.tag, new.content, new.fcontent,
        new.markdown, new.length, new.type, new.subtype, new.ial, new.sort, new.created,
        new.updated);
    INSERT INTO blocks_fts_case_insensitive(rowid, id, parent_id, root_id, hash, box, path,
        hpath, name, alias, memo, tag, content, fcontent, markdown, length, type, subtype, ial,
        sort, created, updated)
    VALUES (new.rowid, new.id, new.parent_id, new.root_id, new.hash, new.box, new.path,
        new.hpath, new.name, new.alias, new.memo, new.tag, new.content, new.fcontent,
        new.markdown, new.length, new.type, new.subtype, new.ial, new.sort, new.created,
        new.updated);
END;

CREATE TABLE IF NOT EXISTS refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    def_block_id TEXT NOT NULL,
    def_block_parent_id TEXT NOT NULL DEFAULT '',
    def_block_root_id TEXT NOT NULL DEFAULT '',
    def_block_path TEXT NOT NULL DEFAULT '',
    block_id TEXT NOT NULL,
    root_id TEXT NOT NULL DEFAULT '',
    box TEXT NOT NULL DEFAULT '',
    path TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    markdown TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_refs_def_block_id ON refs(def_block_id);
"#;

/// Row of the `blocks` relation.
///
/// Rows produced by arbitrary statements may select any subset of columns; missing columns
/// keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRecord {
    /// Block ID.
    pub id: String,
    /// Parent block ID.
    pub parent_id: String,
    /// Owning document ID.
    pub root_id: String,
    /// Content hash.
    pub hash: String,
    /// Box (notebook) ID.
    pub box_id: String,
    /// Storage path of the owning document.
    pub path: String,
    /// Human readable path of the owning document.
    pub hpath: String,
    /// Block name.
    pub name: String,
    /// Block alias.
    pub alias: String,
    /// Block memo.
    pub memo: String,
    /// Block tags.
    pub tag: String,
    /// Plain text content.
    pub content: String,
    /// Content of the first child, for containers.
    pub fcontent: String,
    /// Markdown source.
    pub markdown: String,
    /// Content length in characters.
    pub length: i64,
    /// Block type code.
    pub kind: String,
    /// Block subtype.
    pub sub_kind: String,
    /// Serialized inline attribute list.
    pub ial: String,
    /// Document-order sort key.
    pub sort: i64,
    /// Creation timestamp.
    pub created: String,
    /// Last update timestamp.
    pub updated: String,
}

impl BlockRecord {
    /// Reads a row, mapping columns by name.
    fn from_row(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Self> {
        let mut record = Self::default();
        for (i, column) in columns.iter().enumerate() {
            let value = row.get_ref(i)?;
            match column.as_str() {
                "id" => record.id = text_value(value),
                "parent_id" => record.parent_id = text_value(value),
                "root_id" => record.root_id = text_value(value),
                "hash" => record.hash = text_value(value),
                "box" => record.box_id = text_value(value),
                "path" => record.path = text_value(value),
                "hpath" => record.hpath = text_value(value),
                "name" => record.name = text_value(value),
                "alias" => record.alias = text_value(value),
                "memo" => record.memo = text_value(value),
                "tag" => record.tag = text_value(value),
                "content" => record.content = text_value(value),
                "fcontent" => record.fcontent = text_value(value),
                "markdown" => record.markdown = text_value(value),
                "length" => record.length = int_value(value),
                "type" => record.kind = text_value(value),
                "subtype" => record.sub_kind = text_value(value),
                "ial" => record.ial = text_value(value),
                "sort" => record.sort = int_value(value),
                "created" => record.created = text_value(value),
                "updated" => record.updated = text_value(value),
                _ => {}
            }
        }
        Ok(record)
    }
}

/// Row of the `refs` relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRecord {
    /// Referenced (definition) block.
    pub def_block_id: String,
    /// Parent of the definition block.
    pub def_block_parent_id: String,
    /// Document of the definition block.
    pub def_block_root_id: String,
    /// Storage path of the definition block's document.
    pub def_block_path: String,
    /// Block holding the reference.
    pub block_id: String,
    /// Document of the referencing block.
    pub root_id: String,
    /// Box of the referencing block.
    pub box_id: String,
    /// Storage path of the referencing block's document.
    pub path: String,
    /// Anchor text.
    pub content: String,
    /// Markdown of the reference.
    pub markdown: String,
    /// Reference type.
    pub kind: String,
}

/// Reads a column as text. NULL reads as empty.
fn text_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Reads a column as an integer. Non-numeric values read as zero.
fn int_value(value: ValueRef<'_>) -> i64 {
    match value {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).trim().parse().unwrap_or(0),
        ValueRef::Null | ValueRef::Blob(_) => 0,
    }
}

/// Pattern matcher cached per statement by the `REGEXP` function.
#[derive(Debug)]
enum Matcher {
    /// A compiled pattern.
    Regex(Regex),
    /// A pattern that failed to compile, matched as a literal substring.
    Literal(String),
}

impl Matcher {
    /// Compiles a pattern, falling back to literal matching.
    fn compile(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => Self::Regex(re),
            Err(e) => {
                debug!(pattern, error = %e, "invalid REGEXP pattern, matching literally");
                Self::Literal(pattern.to_string())
            }
        }
    }

    /// Tests `text` against the pattern.
    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(text),
            Self::Literal(s) => text.contains(s.as_str()),
        }
    }
}

/// Implements `X REGEXP Y`, which SQLite calls as `regexp(Y, X)`.
fn regexp(ctx: &Context<'_>) -> rusqlite::Result<bool> {
    let matcher = ctx.get_or_create_aux(0, |pattern| -> Result<Matcher, Infallible> {
        Ok(Matcher::compile(&text_value(pattern)))
    })?;
    let text = match ctx.get_raw(1) {
        ValueRef::Null => return Ok(false),
        value => text_value(value),
    };
    Ok(matcher.is_match(&text))
}

/// Returns the sort key for a block type code.
fn type_sort(code: &str) -> i64 {
    match code {
        "d" => 0,
        "h" => 5,
        "p" => 10,
        "c" | "m" | "t" | "html" | "query_embed" => 20,
        _ => 30,
    }
}

/// Connection to a block database.
#[derive(Debug)]
pub struct BlockStore {
    /// Underlying SQLite connection.
    conn: Connection,
}

impl BlockStore {
    /// Opens or creates a block database at `path`.
    pub fn open(path: &Path) -> Result<Self, SearchError> {
        let conn = Connection::open(path).map_err(|source| SearchError::OpenStore {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn).map_err(|source| SearchError::OpenStore {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Creates an empty in-memory block database.
    pub fn open_in_memory() -> Result<Self, SearchError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::init(conn)?)
    }

    /// Registers functions and creates the schema.
    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.create_scalar_function(
            "regexp",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            regexp,
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts a block, replacing any block with the same ID.
    pub fn insert_block(&self, block: &BlockRecord) -> Result<(), SearchError> {
        self.conn
            .execute("DELETE FROM blocks WHERE id = ?1", params![block.id])?;
        self.conn.execute(
            "INSERT INTO blocks (id, parent_id, root_id, hash, box, path, hpath, name, alias, \
             memo, tag, content, fcontent, markdown, length, type, subtype, ial, sort, created, \
             updated) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
             ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                block.id,
                block.parent_id,
                block.root_id,
                block.hash,
                block.box_id,
                block.path,
                block.hpath,
                block.name,
                block.alias,
                block.memo,
                block.tag,
                block.content,
                block.fcontent,
                block.markdown,
                block.length,
                block.kind,
                block.sub_kind,
                block.ial,
                block.sort,
                block.created,
                block.updated,
            ],
        )?;
        Ok(())
    }

    /// Records a reference.
    pub fn insert_ref(&self, r: &RefRecord) -> Result<(), SearchError> {
        self.conn.execute(
            "INSERT INTO refs (def_block_id, def_block_parent_id, def_block_root_id, \
             def_block_path, block_id, root_id, box, path, content, markdown, type) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                r.def_block_id,
                r.def_block_parent_id,
                r.def_block_root_id,
                r.def_block_path,
                r.block_id,
                r.root_id,
                r.box_id,
                r.path,
                r.content,
                r.markdown,
                r.kind,
            ],
        )?;
        Ok(())
    }

    /// Replaces every block of a document with rows derived from its tree.
    ///
    /// Returns the number of blocks written.
    pub fn index_tree(&self, tree: &Tree) -> Result<usize, SearchError> {
        let records = tree_records(tree);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM blocks WHERE root_id = ?1", params![tree.id])?;
        for record in &records {
            self.insert_block(record)?;
        }
        tx.commit()?;
        debug!(id = %tree.id, blocks = records.len(), "indexed tree");
        Ok(records.len())
    }

    /// Looks up a block by ID.
    pub fn get_block(&self, id: &str) -> Result<Option<BlockRecord>, SearchError> {
        let params = [Value::from(id.to_string())];
        let rows = self.query_blocks("SELECT * FROM blocks WHERE id = ?1", &params)?;
        Ok(rows.into_iter().next())
    }

    /// Looks up blocks by ID, in the order requested. Unknown IDs are skipped.
    pub fn get_blocks(&self, ids: &[String]) -> Result<Vec<BlockRecord>, SearchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT * FROM blocks WHERE id IN ({placeholders})");
        let params: Vec<Value> = ids.iter().map(|id| Value::from(id.clone())).collect();
        let mut by_id: HashMap<String, BlockRecord> = self
            .query_blocks(&sql, &params)?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Runs a statement returning block rows.
    pub fn query_blocks(&self, sql: &str, params: &[Value]) -> Result<Vec<BlockRecord>, SearchError> {
        debug!(sql, "querying blocks");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            BlockRecord::from_row(row, &columns)
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Runs a statement whose first row holds a block count and a document count.
    pub fn query_counts(&self, sql: &str, params: &[Value]) -> Result<(usize, usize), SearchError> {
        debug!(sql, "counting blocks");
        let counts = self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| {
                Ok((int_value(row.get_ref(0)?), int_value(row.get_ref(1)?)))
            })
            .optional()?
            .unwrap_or((0, 0));
        Ok((
            usize::try_from(counts.0).unwrap_or(0),
            usize::try_from(counts.1).unwrap_or(0),
        ))
    }

    /// Returns definition blocks referenced most recently, newest first.
    pub fn recent_ref_defs(&self) -> Result<Vec<String>, SearchError> {
        let mut stmt = self.conn.prepare(
            "SELECT def_block_id FROM refs GROUP BY def_block_id ORDER BY MAX(id) DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![RECENT_REFS_LIMIT as i64], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Returns the anchor text for a block: its name, else its content.
    pub fn ref_text(&self, id: &str) -> Result<String, SearchError> {
        let text = self
            .conn
            .query_row(
                "SELECT name, content FROM blocks WHERE id = ?1",
                params![id],
                |row| {
                    let name: String = row.get(0)?;
                    let content: String = row.get(1)?;
                    Ok(if name.is_empty() { content } else { name })
                },
            )
            .optional()?;
        Ok(text.unwrap_or_default())
    }

    /// Checks whether a document exists at a human readable path in a box.
    pub fn doc_exists_at(&self, box_id: &str, hpath: &str) -> Result<bool, SearchError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM blocks WHERE type = 'd' AND box = ?1 AND hpath = ?2 LIMIT 1",
                params![box_id, hpath],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Derives block rows from a tree.
fn tree_records(tree: &Tree) -> Vec<BlockRecord> {
    let mut records = Vec::new();
    tree.walk(tree.root(), |nid, node| {
        let Some(code) = node.kind.type_code() else {
            return WalkStatus::SkipChildren;
        };
        let Some(id) = node.id.clone() else {
            return WalkStatus::Continue;
        };
        let parent_id = tree
            .ancestors(nid)
            .into_iter()
            .rev()
            .find_map(|a| tree.node(a).id.clone())
            .unwrap_or_default();
        let content = match node.kind {
            NodeKind::Document => tree.title().to_string(),
            _ => tree.text_content(nid),
        };
        let fcontent = if node.kind.is_container() {
            tree.first_child(nid)
                .map(|c| tree.text_content(c))
                .unwrap_or_default()
        } else {
            String::new()
        };
        let sub_kind = match node.kind {
            NodeKind::Heading { level } => format!("h{level}"),
            _ => String::new(),
        };
        let created = if is_block_id(&id) {
            id[..14].to_string()
        } else {
            String::new()
        };
        let updated = node.attr("updated").map_or_else(|| created.clone(), str::to_string);
        records.push(BlockRecord {
            parent_id,
            root_id: tree.id.clone(),
            box_id: tree.box_id.clone(),
            path: tree.path.clone(),
            hpath: tree.hpath.clone(),
            name: node.attr("name").unwrap_or_default().to_string(),
            alias: node.attr("alias").unwrap_or_default().to_string(),
            memo: node.attr("memo").unwrap_or_default().to_string(),
            tag: node.attr("tags").unwrap_or_default().to_string(),
            length: content.chars().count() as i64,
            markdown: content.clone(),
            content,
            fcontent,
            kind: code.to_string(),
            sub_kind,
            ial: ial_to_string(&node.ial),
            sort: type_sort(code),
            created,
            updated,
            hash: String::new(),
            id,
        });
        WalkStatus::Continue
    });
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.id.clone()));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a block row with the given ID, type and content.
    fn record(id: &str, kind: &str, content: &str) -> BlockRecord {
        BlockRecord {
            id: id.to_string(),
            root_id: "20230101120000-rootaaa".to_string(),
            box_id: "box1".to_string(),
            kind: kind.to_string(),
            content: content.to_string(),
            ..BlockRecord::default()
        }
    }

    #[test]
    fn test_insert_and_get_block() {
        let store = BlockStore::open_in_memory().unwrap();
        store
            .insert_block(&record("20230101120000-aaaaaaa", "p", "hello"))
            .unwrap();
        let got = store.get_block("20230101120000-aaaaaaa").unwrap().unwrap();
        assert_eq!(got.content, "hello");
        assert_eq!(got.kind, "p");
        assert!(store.get_block("20230101120000-zzzzzzz").unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces_and_keeps_fts_in_sync() {
        let store = BlockStore::open_in_memory().unwrap();
        store
            .insert_block(&record("20230101120000-aaaaaaa", "p", "old words"))
            .unwrap();
        store
            .insert_block(&record("20230101120000-aaaaaaa", "p", "new words"))
            .unwrap();
        let (blocks, _) = store
            .query_counts(
                "SELECT COUNT(id), COUNT(DISTINCT root_id) FROM blocks_fts WHERE blocks_fts MATCH ?1",
                &[Value::from("\"old\"".to_string())],
            )
            .unwrap();
        assert_eq!(blocks, 0);
        let (blocks, roots) = store
            .query_counts(
                "SELECT COUNT(id), COUNT(DISTINCT root_id) FROM blocks_fts_case_insensitive \
                 WHERE blocks_fts_case_insensitive MATCH ?1",
                &[Value::from("\"NEW\"".to_string())],
            )
            .unwrap();
        assert_eq!((blocks, roots), (1, 1));
    }

    #[test]
    fn test_get_blocks_preserves_request_order() {
        let store = BlockStore::open_in_memory().unwrap();
        for id in ["20230101120000-aaaaaaa", "20230101120000-bbbbbbb"] {
            store.insert_block(&record(id, "p", "x")).unwrap();
        }
        let ids = vec![
            "20230101120000-bbbbbbb".to_string(),
            "20230101120000-missing".to_string(),
            "20230101120000-aaaaaaa".to_string(),
        ];
        let got: Vec<String> = store
            .get_blocks(&ids)
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(got, vec!["20230101120000-bbbbbbb", "20230101120000-aaaaaaa"]);
    }

    #[test]
    fn test_regexp_function() {
        let store = BlockStore::open_in_memory().unwrap();
        store
            .insert_block(&record("20230101120000-aaaaaaa", "p", "version 1.2.3"))
            .unwrap();
        let hits = |pattern: &str| {
            store
                .query_blocks(
                    "SELECT * FROM blocks WHERE content REGEXP ?1",
                    &[Value::from(pattern.to_string())],
                )
                .unwrap()
                .len()
        };
        assert_eq!(hits(r"\d+\.\d+"), 1);
        assert_eq!(hits("^nothing"), 0);
        assert_eq!(hits("version 1.2.3"), 1);
    }

    #[test]
    fn test_regexp_invalid_pattern_matches_literally() {
        let store = BlockStore::open_in_memory().unwrap();
        store
            .insert_block(&record("20230101120000-aaaaaaa", "p", "call f(x"))
            .unwrap();
        let rows = store
            .query_blocks(
                "SELECT * FROM blocks WHERE content REGEXP ?1",
                &[Value::from("f(x".to_string())],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_recent_refs_newest_first() {
        let store = BlockStore::open_in_memory().unwrap();
        for def in ["def-a", "def-b", "def-a"] {
            store
                .insert_ref(&RefRecord {
                    def_block_id: def.to_string(),
                    block_id: "src".to_string(),
                    ..RefRecord::default()
                })
                .unwrap();
        }
        assert_eq!(store.recent_ref_defs().unwrap(), vec!["def-a", "def-b"]);
    }

    #[test]
    fn test_ref_text_prefers_name() {
        let store = BlockStore::open_in_memory().unwrap();
        let mut named = record("20230101120000-aaaaaaa", "p", "content");
        named.name = "Named".to_string();
        store.insert_block(&named).unwrap();
        store
            .insert_block(&record("20230101120000-bbbbbbb", "p", "plain"))
            .unwrap();
        assert_eq!(store.ref_text("20230101120000-aaaaaaa").unwrap(), "Named");
        assert_eq!(store.ref_text("20230101120000-bbbbbbb").unwrap(), "plain");
        assert_eq!(store.ref_text("missing").unwrap(), "");
    }

    #[test]
    fn test_index_tree() {
        let mut tree = Tree::new("20230101120000-rootaaa", "box1", "/20230101120000-rootaaa.sy", "/Notes");
        tree.set_title("Notes");
        let root = tree.root();
        let p = tree.append_new(root, NodeKind::Paragraph, Some("20230101120000-ppppppp"));
        tree.append_new(p, NodeKind::text("hello world"), None);
        tree.node_mut(p).set_attr("name", "greeting");

        let store = BlockStore::open_in_memory().unwrap();
        assert_eq!(store.index_tree(&tree).unwrap(), 2);

        let doc = store.get_block("20230101120000-rootaaa").unwrap().unwrap();
        assert_eq!(doc.kind, "d");
        assert_eq!(doc.content, "Notes");
        let para = store.get_block("20230101120000-ppppppp").unwrap().unwrap();
        assert_eq!(para.parent_id, "20230101120000-rootaaa");
        assert_eq!(para.content, "hello world");
        assert_eq!(para.name, "greeting");
        assert_eq!(para.created, "20230101120000");
        assert!(store.doc_exists_at("box1", "/Notes").unwrap());
        assert!(!store.doc_exists_at("box1", "/Other").unwrap());
    }
}
