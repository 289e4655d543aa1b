use crate::error::{RemixError, RemixResult};
use crate::persistence::{DebouncedSaver, WorkspaceStore};
use crate::remix::{
    analyze::enrich_board, context::resolve, director::plan, executor::execute,
    palette::generate_palette, progress::ProgressCallback, summarize, video::generate_video,
};
use crate::workspace::{Board, Element, ImageElement, VideoElement, WorkspaceGraph};
use crate::workspace::element::{find_element_mut, walk_elements};
use canvas_like_model_provider::{GenerativeModel, InlineImage, VideoPayload};
use canvas_like_types::{
    Result,
    sync::{CancellationToken, DashMap, RwLock},
};
use std::sync::Arc;
use std::time::Duration;

const SAVE_DEBOUNCE: Duration = Duration::from_millis(750);
const RESULT_GAP: f32 = 24.0;
const RESULT_COLUMNS: usize = 2;

/// One user's workspace: the graph, its store, and the per-board generation
/// locks. The single shared mutable resource is the graph; every mutation is
/// whole-field replacement followed by a (debounced) save.
pub struct CanvasWorkspace {
    owner_id: String,
    graph: RwLock<WorkspaceGraph>,
    saver: DebouncedSaver,
    busy: DashMap<String, ()>,
}

/// Releases the board's generation lock on drop.
struct BusyGuard<'a> {
    busy: &'a DashMap<String, ()>,
    board_id: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.remove(&self.board_id);
    }
}

impl CanvasWorkspace {
    /// Load the owner's workspace, starting empty when nothing is stored
    /// yet.
    #[tracing::instrument(name = "CanvasWorkspace::load", skip(store), level = "debug")]
    pub async fn load(owner_id: &str, store: Arc<dyn WorkspaceStore>) -> Result<Self> {
        let owner_id = owner_id.to_string();
        let graph = store.load(&owner_id).await?.unwrap_or_default();

        Ok(CanvasWorkspace {
            owner_id,
            graph: RwLock::new(graph),
            saver: DebouncedSaver::new(store, SAVE_DEBOUNCE),
            busy: DashMap::new(),
        })
    }

    pub async fn snapshot(&self) -> WorkspaceGraph {
        self.graph.read().await.clone()
    }

    /// Apply a mutation to the graph and queue a save.
    pub async fn mutate<F, R>(&self, mutation: F) -> R
    where
        F: FnOnce(&mut WorkspaceGraph) -> R,
    {
        let mut graph = self.graph.write().await;
        let result = mutation(&mut graph);
        let snapshot = graph.clone();
        drop(graph);

        self.saver.queue(&self.owner_id, snapshot).await;
        result
    }

    /// Write any pending save immediately.
    pub async fn flush(&self) -> Result<()> {
        self.saver.flush().await
    }

    pub fn is_busy(&self, board_id: &str) -> bool {
        self.busy.contains_key(board_id)
    }

    /// Acquire the board's generation lock. Overlapping requests against the
    /// same board are rejected, not queued.
    fn try_acquire(&self, board_id: &str) -> RemixResult<BusyGuard<'_>> {
        if self.busy.insert(board_id.to_string(), ()).is_some() {
            return Err(RemixError::Busy(board_id.to_string()));
        }
        Ok(BusyGuard {
            busy: &self.busy,
            board_id: board_id.to_string(),
        })
    }

    /// The full remix pipeline for one board: resolve the connector graph,
    /// enrich missing analyses, summarize, plan, fan out execution, and lay
    /// the results out in the target board.
    #[tracing::instrument(name = "CanvasWorkspace::remix", skip(self, model, cancel), level = "debug")]
    pub async fn remix(
        &self,
        board_id: &str,
        user_goal: &str,
        model: &dyn GenerativeModel,
        cancel: &CancellationToken,
    ) -> RemixResult<Vec<InlineImage>> {
        let _guard = self.try_acquire(board_id)?;

        let mut context = {
            let graph = self.graph.read().await;
            resolve(&graph, board_id).ok_or_else(|| RemixError::UnknownBoard(board_id.to_string()))?
        };
        if context.is_empty() {
            return Err(RemixError::EmptyContext);
        }

        for board in &mut context.content_boards {
            enrich_board(model, board).await;
        }
        self.mutate(|graph| apply_analyses(graph, &context.content_boards))
            .await;

        let summary = summarize(&context.content_boards, context.brand_info.as_ref());
        let image_count = context
            .all_elements()
            .iter()
            .filter(|element| matches!(element, Element::Image(_)))
            .count();

        let tasks = plan(model, user_goal, &summary, image_count).await?;

        let elements = context.all_elements();
        let results = execute(
            model,
            &tasks,
            &elements,
            context.brand_info.as_ref(),
            cancel,
        )
        .await?;

        self.mutate(|graph| {
            if let Some(board) = graph.board_mut(board_id) {
                board.remix_prompt = Some(user_goal.to_string());
                board.elements = layout_results(board.width, &results);
            }
        })
        .await;

        tracing::info!(board_id = %board_id, results = results.len(), "remix finished");
        Ok(results)
    }

    /// Animate an image element into a video clip and place the result next
    /// to it.
    #[tracing::instrument(name = "CanvasWorkspace::animate", skip(self, model, on_progress, cancel), level = "debug")]
    pub async fn animate(
        &self,
        board_id: &str,
        element_id: &str,
        prompt: &str,
        model: &dyn GenerativeModel,
        on_progress: &ProgressCallback,
        cancel: &CancellationToken,
    ) -> RemixResult<VideoPayload> {
        let _guard = self.try_acquire(board_id)?;

        let (seed, placement) = {
            let graph = self.graph.read().await;
            let board = graph
                .board(board_id)
                .ok_or_else(|| RemixError::UnknownBoard(board_id.to_string()))?;
            let Some(Element::Image(image)) = board.element(element_id) else {
                return Err(RemixError::UnknownElement(element_id.to_string()));
            };
            let seed = InlineImage::from_data_url(&image.src)
                .map_err(|_| RemixError::UnknownElement(element_id.to_string()))?;
            (
                seed,
                (image.x + image.width + RESULT_GAP, image.y, image.width, image.height),
            )
        };

        let payload = generate_video(model, prompt, Some(&seed), on_progress, cancel).await?;

        let (x, y, width, height) = placement;
        self.mutate(|graph| {
            if let Some(board) = graph.board_mut(board_id) {
                let mut clip = VideoElement::new(&payload.uri);
                clip.x = x;
                clip.y = y;
                clip.width = width;
                clip.height = height;
                board.push_element(Element::Video(clip));
            }
        })
        .await;

        Ok(payload)
    }

    /// Suggest and store a palette for a board.
    pub async fn suggest_palette(
        &self,
        board_id: &str,
        model: &dyn GenerativeModel,
    ) -> RemixResult<Vec<String>> {
        let board = {
            let graph = self.graph.read().await;
            graph
                .board(board_id)
                .cloned()
                .ok_or_else(|| RemixError::UnknownBoard(board_id.to_string()))?
        };

        let colors = generate_palette(model, &board).await?;
        if !colors.is_empty() {
            let stored = colors.clone();
            self.mutate(|graph| {
                if let Some(board) = graph.board_mut(board_id) {
                    board.colors = Some(stored);
                }
            })
            .await;
        }
        Ok(colors)
    }
}

/// Copy analyses computed on reduced board copies back onto the graph's own
/// elements.
fn apply_analyses(graph: &mut WorkspaceGraph, enriched: &[Board]) {
    for board in enriched {
        let Some(target) = graph.board_mut(&board.id) else {
            continue;
        };
        walk_elements(&board.elements, (0.0, 0.0), &|_| true, &mut |element, _| {
            match element {
                Element::Image(image) if image.analysis.is_some() => {
                    if let Some(Element::Image(stored)) =
                        find_element_mut(&mut target.elements, &image.id)
                    {
                        stored.analysis = image.analysis.clone();
                    }
                }
                Element::Text(text) if text.analysis.is_some() => {
                    if let Some(Element::Text(stored)) =
                        find_element_mut(&mut target.elements, &text.id)
                    {
                        stored.analysis = text.analysis.clone();
                    }
                }
                _ => {}
            }
            true
        });
    }
}

/// Lay generated variants out in a fixed grid inside the target board.
fn layout_results(board_width: f32, results: &[InlineImage]) -> Vec<Element> {
    let cell_width = ((board_width - RESULT_GAP * (RESULT_COLUMNS + 1) as f32)
        / RESULT_COLUMNS as f32)
        .max(64.0);
    let cell_height = cell_width;

    results
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let column = (index % RESULT_COLUMNS) as f32;
            let row = (index / RESULT_COLUMNS) as f32;
            let mut element = ImageElement::new(image.to_data_url());
            element
                .set_label(format!("variant{}", index + 1))
                .set_position(
                    RESULT_GAP + column * (cell_width + RESULT_GAP),
                    RESULT_GAP + row * (cell_height + RESULT_GAP),
                )
                .set_size(cell_width, cell_height);
            Element::Image(element)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryStore;
    use crate::remix::director::SOCIAL_TEMPLATE_TASK;
    use crate::workspace::{BoardType, Connector};
    use canvas_like_model_provider::{
        MediaResponse, OperationHandle, OperationStatus, Part, ProviderError,
    };
    use canvas_like_types::{Value, async_trait, json::json};
    use tokio::sync::Notify;

    /// Answers planning and generation; optionally parks planning until
    /// released.
    struct PipelineModel {
        gate: Option<Arc<Notify>>,
    }

    fn plan_value() -> Value {
        let tasks: Vec<Value> = (0..4)
            .map(|index| {
                json!({
                    "id": format!("t{index}"),
                    "type": SOCIAL_TEMPLATE_TASK,
                    "description": format!("variant {index}"),
                    "prompt": format!("Variant {index} using @hero"),
                    "dependencies": []
                })
            })
            .collect();
        json!({ "tasks": tasks })
    }

    #[async_trait]
    impl GenerativeModel for PipelineModel {
        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<Value, ProviderError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(plan_value())
        }

        async fn generate_media(&self, parts: &[Part]) -> Result<MediaResponse, ProviderError> {
            let marker = parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text.clone()),
                    _ => None,
                })
                .collect::<String>();
            Ok(MediaResponse {
                images: vec![InlineImage::new("image/png", format!("img:{marker}"))],
                text: None,
            })
        }

        async fn start_video(
            &self,
            _prompt: &str,
            _seed_image: Option<&InlineImage>,
        ) -> Result<OperationHandle, ProviderError> {
            Ok(OperationHandle {
                name: "operations/anim".to_string(),
            })
        }

        async fn poll_operation(
            &self,
            _handle: &OperationHandle,
        ) -> Result<OperationStatus, ProviderError> {
            Ok(OperationStatus {
                done: true,
                error: None,
                result: Some(VideoPayload {
                    uri: "https://cdn.example/clip.mp4".to_string(),
                    mime_type: Some("video/mp4".to_string()),
                }),
            })
        }
    }

    async fn seeded_workspace() -> (Arc<CanvasWorkspace>, String) {
        let store = Arc::new(InMemoryStore::new());
        let workspace = CanvasWorkspace::load("owner", store).await.unwrap();

        let mut source = Board::new(BoardType::Image, "Assets");
        let mut hero = ImageElement::new("data:image/png;base64,QQ==");
        hero.set_label("hero");
        hero.analysis = Some(Default::default());
        source.push_element(Element::Image(hero));
        let source_id = source.id.clone();

        let remix = Board::new(BoardType::Remix, "Remix");
        let remix_id = remix.id.clone();

        workspace
            .mutate(|graph| {
                graph.upsert_board(source);
                graph.upsert_board(remix);
                graph.upsert_connector(Connector::new(&source_id, &remix_id));
            })
            .await;

        (Arc::new(workspace), remix_id)
    }

    #[tokio::test]
    async fn remix_requires_a_known_remix_board() {
        let (workspace, _) = seeded_workspace().await;
        let model = PipelineModel { gate: None };
        let cancel = CancellationToken::new();

        let error = workspace
            .remix("missing", "goal", &model, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(error, RemixError::UnknownBoard(_)));
    }

    #[tokio::test]
    async fn remix_rejects_an_unconnected_board() {
        let (workspace, _) = seeded_workspace().await;
        let model = PipelineModel { gate: None };
        let cancel = CancellationToken::new();

        let lonely = Board::new(BoardType::Remix, "Lonely");
        let lonely_id = lonely.id.clone();
        workspace.mutate(|graph| graph.upsert_board(lonely)).await;

        let error = workspace
            .remix(&lonely_id, "goal", &model, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(error, RemixError::EmptyContext));
    }

    #[tokio::test]
    async fn overlapping_remixes_on_one_board_are_rejected() {
        let (workspace, remix_id) = seeded_workspace().await;
        let gate = Arc::new(Notify::new());
        let model = Arc::new(PipelineModel {
            gate: Some(gate.clone()),
        });
        let cancel = CancellationToken::new();

        let first = {
            let workspace = workspace.clone();
            let model = model.clone();
            let remix_id = remix_id.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                workspace
                    .remix(&remix_id, "goal", model.as_ref(), &cancel)
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(workspace.is_busy(&remix_id));

        let second = workspace
            .remix(&remix_id, "goal", model.as_ref(), &cancel)
            .await;
        assert!(matches!(second, Err(RemixError::Busy(_))));

        gate.notify_one();
        let results = first.await.unwrap().unwrap();
        assert_eq!(results.len(), 4);
        assert!(!workspace.is_busy(&remix_id));
    }

    #[tokio::test]
    async fn remix_replaces_the_board_contents_wholesale() {
        let (workspace, remix_id) = seeded_workspace().await;
        let model = PipelineModel { gate: None };
        let cancel = CancellationToken::new();

        let results = workspace
            .remix(&remix_id, "spring launch", &model, &cancel)
            .await
            .unwrap();
        assert_eq!(results.len(), 4);

        let graph = workspace.snapshot().await;
        let board = graph.board(&remix_id).unwrap();
        assert_eq!(board.remix_prompt.as_deref(), Some("spring launch"));
        assert_eq!(board.elements.len(), 4);
        assert!(board.elements.iter().all(|element| matches!(element, Element::Image(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn animate_appends_a_video_element() {
        let (workspace, _) = seeded_workspace().await;
        let model = PipelineModel { gate: None };
        let cancel = CancellationToken::new();
        let on_progress: ProgressCallback = Arc::new(|_message: &str| {});

        let graph = workspace.snapshot().await;
        let board = graph
            .boards
            .iter()
            .find(|board| board.board_type == BoardType::Image)
            .unwrap();
        let element_id = board.elements[0].id().to_string();
        let board_id = board.id.clone();

        let payload = workspace
            .animate(&board_id, &element_id, "slow zoom", &model, &on_progress, &cancel)
            .await
            .unwrap();
        assert_eq!(payload.uri, "https://cdn.example/clip.mp4");

        let graph = workspace.snapshot().await;
        let board = graph.board(&board_id).unwrap();
        assert!(board
            .elements
            .iter()
            .any(|element| matches!(element, Element::Video(_))));
    }

    #[tokio::test]
    async fn mutations_survive_a_flush_round_trip() {
        let store = Arc::new(InMemoryStore::new());
        let workspace = CanvasWorkspace::load("owner", store.clone()).await.unwrap();

        workspace
            .mutate(|graph| graph.upsert_board(Board::new(BoardType::Image, "Assets")))
            .await;
        workspace.flush().await.unwrap();

        let reloaded = CanvasWorkspace::load("owner", store).await.unwrap();
        assert_eq!(reloaded.snapshot().await.boards.len(), 1);
    }
}
