use super::{board::Board, connector::Connector, element::Element};
use canvas_like_types::{
    JsonSchema,
    json::{Deserialize, Serialize},
};

/// The whole workspace: insertion-ordered boards and connectors. Mutation is
/// whole-field replacement; concurrent multi-writer editing is out of scope.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct WorkspaceGraph {
    pub boards: Vec<Board>,
    pub connectors: Vec<Connector>,
}

impl WorkspaceGraph {
    pub fn new() -> Self {
        WorkspaceGraph::default()
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|board| board.id == board_id)
    }

    /// Insert the board, or replace the existing board with the same id in
    /// place.
    pub fn upsert_board(&mut self, board: Board) {
        match self.boards.iter_mut().find(|existing| existing.id == board.id) {
            Some(existing) => *existing = board,
            None => self.boards.push(board),
        }
    }

    /// Remove a board and every connector touching it.
    pub fn remove_board(&mut self, board_id: &str) -> bool {
        let before = self.boards.len();
        self.boards.retain(|board| board.id != board_id);
        if self.boards.len() == before {
            return false;
        }
        self.connectors
            .retain(|connector| connector.from_board != board_id && connector.to_board != board_id);
        true
    }

    /// Insert the connector, or replace the connector for the same ordered
    /// `(from_board, to_board)` pair in place: a second connector on an edge
    /// is an update, not an additional edge.
    pub fn upsert_connector(&mut self, connector: Connector) {
        match self.connectors.iter_mut().find(|existing| {
            existing.from_board == connector.from_board && existing.to_board == connector.to_board
        }) {
            Some(existing) => *existing = connector,
            None => self.connectors.push(connector),
        }
    }

    pub fn remove_connector(&mut self, from_board: &str, to_board: &str) -> bool {
        let before = self.connectors.len();
        self.connectors.retain(|connector| {
            connector.from_board != from_board || connector.to_board != to_board
        });
        self.connectors.len() != before
    }

    /// Connectors feeding the given board, in insertion order.
    pub fn inbound_connectors(&self, to_board: &str) -> impl Iterator<Item = &Connector> {
        self.connectors
            .iter()
            .filter(move |connector| connector.to_board == to_board)
    }

    /// Remove an element from a board; removing a group removes its whole
    /// subtree.
    pub fn remove_element(&mut self, board_id: &str, element_id: &str) -> Option<Element> {
        let board = self.board_mut(board_id)?;
        super::element::remove_element(&mut board.elements, element_id)
    }

    /// Replace a board's element array wholesale.
    pub fn replace_elements(&mut self, board_id: &str, elements: Vec<Element>) -> bool {
        match self.board_mut(board_id) {
            Some(board) => {
                board.elements = elements;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::board::BoardType;
    use crate::workspace::element::{Element, ImageElement};

    fn graph_with_edge() -> (WorkspaceGraph, String, String) {
        let mut graph = WorkspaceGraph::new();
        let source = Board::new(BoardType::Image, "Assets");
        let target = Board::new(BoardType::Remix, "Remix");
        let (source_id, target_id) = (source.id.clone(), target.id.clone());
        graph.upsert_board(source);
        graph.upsert_board(target);
        graph.upsert_connector(Connector::new(&source_id, &target_id));
        (graph, source_id, target_id)
    }

    #[test]
    fn removing_a_board_cascades_to_connectors() {
        let (mut graph, source_id, target_id) = graph_with_edge();
        assert!(graph.remove_board(&source_id));
        assert!(graph.inbound_connectors(&target_id).next().is_none());
        assert!(graph.connectors.is_empty());
    }

    #[test]
    fn connector_upsert_replaces_the_edge() {
        let (mut graph, source_id, target_id) = graph_with_edge();
        graph.upsert_connector(Connector::with_elements(
            &source_id,
            &target_id,
            vec!["e1".to_string()],
        ));

        assert_eq!(graph.connectors.len(), 1);
        assert_eq!(
            graph.connectors[0].element_ids,
            Some(vec!["e1".to_string()])
        );
    }

    #[test]
    fn elements_can_be_removed_through_the_graph() {
        let (mut graph, source_id, _) = graph_with_edge();
        let element = Element::Image(ImageElement::new("data:image/png;base64,QQ=="));
        let element_id = element.id().to_string();
        graph.board_mut(&source_id).unwrap().push_element(element);

        assert!(graph.remove_element(&source_id, &element_id).is_some());
        assert!(graph.board(&source_id).unwrap().elements.is_empty());
        assert!(graph.remove_element(&source_id, &element_id).is_none());
        assert!(graph.remove_element("missing", &element_id).is_none());
    }

    #[test]
    fn replace_elements_is_wholesale() {
        let (mut graph, source_id, _) = graph_with_edge();
        graph
            .board_mut(&source_id)
            .unwrap()
            .push_element(Element::Image(ImageElement::new("data:image/png;base64,QQ==")));

        let replacement = vec![Element::Image(ImageElement::new(
            "data:image/png;base64,Qg==",
        ))];
        assert!(graph.replace_elements(&source_id, replacement.clone()));
        assert_eq!(graph.board(&source_id).unwrap().elements, replacement);
        assert!(!graph.replace_elements("missing", Vec::new()));
    }
}
