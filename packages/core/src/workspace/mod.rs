pub mod board;
pub mod connector;
pub mod element;
pub mod graph;

pub use board::{Board, BoardType};
pub use connector::Connector;
pub use element::{
    BoundingBox, Element, GroupElement, ImageAnalysis, ImageElement, TEXT_ELEMENT_HEIGHT,
    TextAnalysis, TextElement, VideoElement,
};
pub use graph::WorkspaceGraph;
