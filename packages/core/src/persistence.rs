//! Opaque load/save contract for workspace graphs, keyed by owner identity.

use crate::workspace::WorkspaceGraph;
use canvas_like_types::{Result, anyhow, async_trait, json, sync::DashMap, sync::Mutex, tokio};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn load(&self, owner_id: &str) -> Result<Option<WorkspaceGraph>>;
    async fn save(&self, owner_id: &str, graph: &WorkspaceGraph) -> Result<()>;
}

/// Volatile store for tests and previews.
#[derive(Default)]
pub struct InMemoryStore {
    graphs: DashMap<String, WorkspaceGraph>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryStore {
    async fn load(&self, owner_id: &str) -> Result<Option<WorkspaceGraph>> {
        Ok(self.graphs.get(owner_id).map(|graph| graph.clone()))
    }

    async fn save(&self, owner_id: &str, graph: &WorkspaceGraph) -> Result<()> {
        self.graphs.insert(owner_id.to_string(), graph.clone());
        Ok(())
    }
}

/// One JSON document per owner under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    fn path_for(&self, owner_id: &str) -> PathBuf {
        self.root.join(format!("{owner_id}.workspace.json"))
    }
}

#[async_trait]
impl WorkspaceStore for FileStore {
    async fn load(&self, owner_id: &str) -> Result<Option<WorkspaceGraph>> {
        let path = self.path_for(owner_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(anyhow!("reading {}: {}", path.display(), error)),
        };
        let graph = json::from_slice(&bytes)?;
        Ok(Some(graph))
    }

    async fn save(&self, owner_id: &str, graph: &WorkspaceGraph) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let bytes = json::to_vec(graph)?;
        tokio::fs::write(self.path_for(owner_id), bytes).await?;
        Ok(())
    }
}

/// Coalesces save-after-every-mutation at the persistence boundary. The
/// graph logic itself never debounces; only the latest queued snapshot is
/// written.
pub struct DebouncedSaver {
    store: Arc<dyn WorkspaceStore>,
    delay: Duration,
    pending: Arc<Mutex<Option<(String, WorkspaceGraph)>>>,
}

impl DebouncedSaver {
    pub fn new(store: Arc<dyn WorkspaceStore>, delay: Duration) -> Self {
        DebouncedSaver {
            store,
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a snapshot. Supersedes any snapshot still waiting for the same
    /// flush window.
    pub async fn queue(&self, owner_id: &str, graph: WorkspaceGraph) {
        let mut pending = self.pending.lock().await;
        let flush_scheduled = pending.is_some();
        *pending = Some((owner_id.to_string(), graph));
        drop(pending);

        if flush_scheduled {
            return;
        }

        let store = self.store.clone();
        let slot = self.pending.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let taken = slot.lock().await.take();
            if let Some((owner_id, graph)) = taken
                && let Err(error) = store.save(&owner_id, &graph).await
            {
                tracing::error!(owner_id = %owner_id, error = %error, "debounced save failed");
            }
        });
    }

    /// Write any pending snapshot immediately.
    pub async fn flush(&self) -> Result<()> {
        let taken = self.pending.lock().await.take();
        if let Some((owner_id, graph)) = taken {
            self.store.save(&owner_id, &graph).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{Board, BoardType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn graph_with_board(title: &str) -> WorkspaceGraph {
        let mut graph = WorkspaceGraph::new();
        graph.upsert_board(Board::new(BoardType::Image, title));
        graph
    }

    #[tokio::test]
    async fn in_memory_round_trip() {
        let store = InMemoryStore::new();
        assert!(store.load("owner").await.unwrap().is_none());

        let graph = graph_with_board("Assets");
        store.save("owner", &graph).await.unwrap();
        assert_eq!(store.load("owner").await.unwrap(), Some(graph));
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load("owner").await.unwrap().is_none());
        let graph = graph_with_board("Assets");
        store.save("owner", &graph).await.unwrap();
        assert_eq!(store.load("owner").await.unwrap(), Some(graph));
    }

    struct CountingStore {
        saves: AtomicUsize,
        inner: InMemoryStore,
    }

    #[async_trait]
    impl WorkspaceStore for CountingStore {
        async fn load(&self, owner_id: &str) -> Result<Option<WorkspaceGraph>> {
            self.inner.load(owner_id).await
        }

        async fn save(&self, owner_id: &str, graph: &WorkspaceGraph) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(owner_id, graph).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_mutations_coalesce_into_one_save() {
        let store = Arc::new(CountingStore {
            saves: AtomicUsize::new(0),
            inner: InMemoryStore::new(),
        });
        let saver = DebouncedSaver::new(store.clone(), Duration::from_millis(500));

        saver.queue("owner", graph_with_board("first")).await;
        saver.queue("owner", graph_with_board("second")).await;
        saver.queue("owner", graph_with_board("third")).await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        // Let the spawned flush run.
        tokio::task::yield_now().await;

        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        let saved = store.load("owner").await.unwrap().unwrap();
        assert_eq!(saved.boards[0].title, "third");
    }

    #[tokio::test]
    async fn flush_writes_immediately() {
        let store = Arc::new(CountingStore {
            saves: AtomicUsize::new(0),
            inner: InMemoryStore::new(),
        });
        let saver = DebouncedSaver::new(store.clone(), Duration::from_secs(60));

        saver.queue("owner", graph_with_board("draft")).await;
        saver.flush().await.unwrap();

        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert!(store.load("owner").await.unwrap().is_some());
    }
}
