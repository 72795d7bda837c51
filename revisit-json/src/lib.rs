use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use revisit_core::{Card, CardId, CardStore, CoreError, Review, ReviewId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;

pub mod paths;

const FILE_VERSION: u32 = 1;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: Vec<Card>,
    reviews: Vec<Review>,
}

#[derive(Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: HashMap<CardId, Card>,
    reviews: Vec<Review>,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            cards: HashMap::new(),
            reviews: Vec::new(),
        }
    }

    fn to_image(&self) -> FileImage {
        let mut cards: Vec<Card> = self.cards.values().cloned().collect();
        cards.sort_by_key(|c| (c.created_at, c.id));
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            cards,
            reviews: self.reviews.clone(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            cards: img.cards.into_iter().map(|c| (c.id, c)).collect(),
            reviews: img.reviews,
        }
    }
}

/// Card store backed by a single JSON document.
///
/// Every change is applied to a copy of the state, written to disk, and
/// only then made visible. A failed write leaves the store as it was.
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    state: RwLock<State>,
    write_gate: Mutex<()>,
}

impl JsonStore {
    pub async fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_store_file();
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS).await
    }

    pub async fn open_file(path: PathBuf) -> Result<Self, CoreError> {
        let backups = paths::backups_beside(&path);
        Self::open_with(path, backups, DEFAULT_MAX_BACKUPS).await
    }

    pub async fn open_with(
        path: PathBuf,
        backups_dir: PathBuf,
        max_backups: usize,
    ) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let max_backups = max_backups.max(1);
        let state = load_or_init(&path, &backups_dir, max_backups).await?;
        log::debug!("opened {} with {} cards", path.display(), state.cards.len());
        Ok(Self {
            path,
            backups_dir,
            max_backups,
            state: RwLock::new(state),
            write_gate: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut State) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _gate = self.write_gate.lock().await;
        let mut next = self.state.read().clone();
        let out = change(&mut next)?;
        next.updated_at = Utc::now();

        let image = next.to_image();
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;
        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &image))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|e| {
                log::warn!("writing {} failed: {e}", self.path.display());
                CoreError::Storage("io")
            })?;

        *self.state.write() = next;
        Ok(out)
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

async fn load_or_init(path: &Path, backups_dir: &Path, keep: usize) -> Result<State, CoreError> {
    if path.exists() {
        let p = path.to_path_buf();
        let img = task::spawn_blocking(move || -> Result<FileImage, CoreError> {
            let buf = fs::read_to_string(&p).map_err(|_| CoreError::Storage("io"))?;
            serde_json::from_str::<FileImage>(&buf).map_err(|_| CoreError::Storage("corrupt store file"))
        })
        .await
        .map_err(|_| CoreError::Storage("io"))??;
        if img.version != FILE_VERSION {
            return Err(CoreError::Storage("unsupported store file version"));
        }
        Ok(State::from_image(img))
    } else {
        let st = State::new_empty();
        write_with_backup(path, backups_dir, keep, &st.to_image())
            .map_err(|_| CoreError::Storage("io"))?;
        Ok(st)
    }
}

fn write_with_backup(
    path: &Path,
    backups_dir: &Path,
    max_backups: usize,
    img: &FileImage,
) -> Result<(), std::io::Error> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let json = serde_json::to_vec_pretty(img)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // The store file is committed at this point; backups are best effort.
    if let Err(e) = write_backup(backups_dir, max_backups, &json) {
        log::warn!("backup in {} failed: {e}", backups_dir.display());
    }
    Ok(())
}

fn write_backup(backups_dir: &Path, max_backups: usize, json: &[u8]) -> Result<(), std::io::Error> {
    fs::create_dir_all(backups_dir)?;
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup_path = backups_dir.join(format!("revisit-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // Names embed the timestamp, so lexical order is age order.
    entries.sort();
    if entries.len() > keep {
        for p in &entries[..entries.len() - keep] {
            let _ = fs::remove_file(p);
        }
    }
    Ok(())
}

#[async_trait]
impl CardStore for JsonStore {
    async fn add_card(&self, front: &str, back: &str) -> Result<Card, CoreError> {
        let card = Card::new(front, back);
        self.commit(|s| {
            s.cards.insert(card.id, card.clone());
            Ok(())
        })
        .await?;
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        let s = self.state.read();
        s.cards.get(&id).cloned().ok_or(CoreError::NotFound("card"))
    }

    async fn load_due(&self, before: DateTime<Utc>) -> Result<Vec<Card>, CoreError> {
        let s = self.state.read();
        Ok(s.cards.values().filter(|c| c.is_due(before)).cloned().collect())
    }

    async fn load_all(&self) -> Result<Vec<Card>, CoreError> {
        let s = self.state.read();
        Ok(s.cards.values().cloned().collect())
    }

    async fn persist(&self, id: CardId, card: &Card) -> Result<(), CoreError> {
        self.commit(|s| {
            let Some(slot) = s.cards.get_mut(&id) else {
                return Err(CoreError::NotFound("card"));
            };
            *slot = card.clone();
            Ok(())
        })
        .await
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.commit(|s| {
            if s.cards.remove(&id).is_none() {
                return Err(CoreError::NotFound("card"));
            }
            s.reviews.retain(|r| r.card_id != id);
            Ok(())
        })
        .await
    }

    async fn insert_review(&self, review: &Review) -> Result<(), CoreError> {
        self.commit(|s| {
            s.reviews.push(review.clone());
            Ok(())
        })
        .await
    }

    async fn delete_review(&self, id: ReviewId) -> Result<(), CoreError> {
        self.commit(|s| {
            let before = s.reviews.len();
            s.reviews.retain(|r| r.id != id);
            if s.reviews.len() == before {
                return Err(CoreError::NotFound("review"));
            }
            Ok(())
        })
        .await
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, CoreError> {
        Ok(self.state.read().reviews.clone())
    }
}
