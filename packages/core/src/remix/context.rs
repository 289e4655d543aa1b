use crate::workspace::{Board, BoardType, Element, ImageElement, WorkspaceGraph};
use crate::workspace::element::flatten_elements;

/// Logo and palette pulled from the designated brand board; propagated into
/// every downstream generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandInfo {
    pub colors: Vec<String>,
    pub logo: Option<ImageElement>,
}

/// The resolved, concrete set of boards/elements/brand metadata feeding one
/// synthesis request. Derived from the connector graph, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemixContext {
    /// Contributing boards, each reduced to its effective element subset.
    pub content_boards: Vec<Board>,
    pub brand_board: Option<Board>,
    pub brand_info: Option<BrandInfo>,
}

impl RemixContext {
    pub fn is_empty(&self) -> bool {
        self.content_boards.is_empty()
    }

    /// Every contributing element in document order, groups flattened.
    pub fn all_elements(&self) -> Vec<&Element> {
        self.content_boards
            .iter()
            .flat_map(|board| flatten_elements(&board.elements))
            .collect()
    }
}

/// One resolution record per distinct source board. An "all assets"
/// connector supersedes any partial one for the same source.
struct SourceRecord {
    board_id: String,
    use_all: bool,
    element_ids: Vec<String>,
}

/// Resolve the inbound connector graph of a remix board into a concrete
/// asset set. Returns `None` when the target does not exist or is not a
/// remix board. Pure function of graph state: cheap and safe to call on
/// every keystroke.
pub fn resolve(graph: &WorkspaceGraph, target_board_id: &str) -> Option<RemixContext> {
    let target = graph.board(target_board_id)?;
    if target.board_type != BoardType::Remix {
        return None;
    }

    let mut records: Vec<SourceRecord> = Vec::new();
    for connector in graph.inbound_connectors(target_board_id) {
        if graph.board(&connector.from_board).is_none() {
            continue;
        }

        let index = match records
            .iter()
            .position(|record| record.board_id == connector.from_board)
        {
            Some(index) => index,
            None => {
                records.push(SourceRecord {
                    board_id: connector.from_board.clone(),
                    use_all: false,
                    element_ids: Vec::new(),
                });
                records.len() - 1
            }
        };
        let record = &mut records[index];

        if connector.covers_all() {
            record.use_all = true;
            record.element_ids.clear();
        } else if !record.use_all
            && let Some(ids) = &connector.element_ids
        {
            for id in ids {
                if !record.element_ids.contains(id) {
                    record.element_ids.push(id.clone());
                }
            }
        }
    }

    let mut contributing: Vec<Board> = Vec::new();
    for record in &records {
        let Some(board) = graph.board(&record.board_id) else {
            continue;
        };

        let effective: Vec<Element> = if record.use_all {
            board.elements.clone()
        } else {
            let filtered: Vec<Element> = board
                .elements
                .iter()
                .filter(|element| record.element_ids.iter().any(|id| id == element.id()))
                .cloned()
                .collect();
            if filtered.is_empty() {
                // Every requested id is stale: degrade to full inclusion,
                // never to silent exclusion.
                board.elements.clone()
            } else {
                filtered
            }
        };

        if effective.is_empty() {
            continue;
        }

        let mut reduced = board.clone();
        reduced.elements = effective;
        contributing.push(reduced);
    }

    // Exactly one brand board: prefer a contributing one, else any brand
    // board with a recorded inbound connector.
    let brand_board = match contributing
        .iter()
        .position(|board| board.board_type == BoardType::Brand)
    {
        Some(index) => Some(contributing.remove(index)),
        None => records
            .iter()
            .filter_map(|record| graph.board(&record.board_id))
            .find(|board| board.board_type == BoardType::Brand)
            .cloned(),
    };

    let brand_info = brand_board.as_ref().map(|board| BrandInfo {
        colors: board.colors.clone().unwrap_or_default(),
        logo: board.first_image().cloned(),
    });

    Some(RemixContext {
        content_boards: contributing,
        brand_board,
        brand_info,
    })
}
