use super::element::{Element, ImageElement, walk_elements};
use canvas_like_types::{
    JsonSchema, create_id,
    json::{Deserialize, Serialize},
};
use std::fmt;

/// The board type governs how a board participates in orchestration.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    Image,
    Text,
    Remix,
    Brand,
    Product,
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoardType::Image => "image",
            BoardType::Text => "text",
            BoardType::Remix => "remix",
            BoardType::Brand => "brand",
            BoardType::Product => "product",
        };
        write!(f, "{}", name)
    }
}

/// A titled container of elements. Owns its elements exclusively.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Board {
    pub id: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
    /// Brand palette, hex strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Last prompt used to populate this board, for remix boards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remix_prompt: Option<String>,
}

impl Board {
    pub fn new(board_type: BoardType, title: impl Into<String>) -> Self {
        Board {
            id: create_id(),
            board_type,
            title: title.into(),
            x: 0.0,
            y: 0.0,
            width: 720.0,
            height: 540.0,
            elements: Vec::new(),
            colors: None,
            remix_prompt: None,
        }
    }

    pub fn push_element(&mut self, element: Element) -> &mut Self {
        self.elements.push(element);
        self
    }

    pub fn set_colors(&mut self, colors: Vec<String>) -> &mut Self {
        self.colors = Some(colors);
        self
    }

    /// Deep lookup, descending into groups.
    pub fn element(&self, element_id: &str) -> Option<&Element> {
        super::element::find_element(&self.elements, element_id)
    }

    /// First image element in document order, nested groups included.
    pub fn first_image(&self) -> Option<&ImageElement> {
        let mut found = None;
        walk_elements(&self.elements, (0.0, 0.0), &|_| true, &mut |element, _| {
            if let Element::Image(image) = element {
                found = Some(image);
                return false;
            }
            true
        });
        found
    }
}
