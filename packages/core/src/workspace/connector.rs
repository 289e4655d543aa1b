use canvas_like_types::{
    JsonSchema, create_id,
    json::{Deserialize, Serialize},
};

/// Directed edge between two boards: "these assets feed this synthesis".
/// Edge identity is the ordered `(from_board, to_board)` pair, not the
/// connector id.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: String,
    pub from_board: String,
    pub to_board: String,
    /// Subset of the source board's top-level element ids. Absent or empty
    /// means the whole board. Not pruned when elements are deleted; stale
    /// ids are tolerated downstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_ids: Option<Vec<String>>,
}

impl Connector {
    pub fn new(from_board: impl Into<String>, to_board: impl Into<String>) -> Self {
        Connector {
            id: create_id(),
            from_board: from_board.into(),
            to_board: to_board.into(),
            element_ids: None,
        }
    }

    pub fn with_elements(
        from_board: impl Into<String>,
        to_board: impl Into<String>,
        element_ids: Vec<String>,
    ) -> Self {
        Connector {
            id: create_id(),
            from_board: from_board.into(),
            to_board: to_board.into(),
            element_ids: Some(element_ids),
        }
    }

    /// Whether the connector contributes the whole source board.
    pub fn covers_all(&self) -> bool {
        match &self.element_ids {
            None => true,
            Some(ids) => ids.is_empty(),
        }
    }
}
