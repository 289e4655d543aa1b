use canvas_like_types::{
    JsonSchema, create_id,
    json::{Deserialize, Serialize},
};

/// Text elements are laid out dynamically and store no height; bounding-box
/// math substitutes this fixed value.
pub const TEXT_ELEMENT_HEIGHT: f32 = 80.0;

/// Structured description of an image asset. Product imagery fills the
/// product fields, mood/reference imagery fills the style fields.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<String>,
}

impl ImageAnalysis {
    pub fn is_product(&self) -> bool {
        self.product_name.is_some()
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Data URL of the bitmap.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ImageAnalysis>,
}

impl ImageElement {
    pub fn new(src: impl Into<String>) -> Self {
        ImageElement {
            id: create_id(),
            x: 0.0,
            y: 0.0,
            width: 320.0,
            height: 240.0,
            rotation: 0.0,
            label: None,
            src: src.into(),
            analysis: None,
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TextElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TextAnalysis>,
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        TextElement {
            id: create_id(),
            x: 0.0,
            y: 0.0,
            width: 320.0,
            rotation: 0.0,
            label: None,
            content: content.into(),
            analysis: None,
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct VideoElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub src: String,
}

impl VideoElement {
    pub fn new(src: impl Into<String>) -> Self {
        VideoElement {
            id: create_id(),
            x: 0.0,
            y: 0.0,
            width: 320.0,
            height: 240.0,
            rotation: 0.0,
            label: None,
            src: src.into(),
        }
    }
}

/// A group owns its children exclusively; child coordinates are relative to
/// the group origin.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct GroupElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub children: Vec<Element>,
}

impl GroupElement {
    pub fn new(children: Vec<Element>) -> Self {
        GroupElement {
            id: create_id(),
            x: 0.0,
            y: 0.0,
            width: 320.0,
            height: 240.0,
            rotation: 0.0,
            label: None,
            children,
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Image(ImageElement),
    Text(TextElement),
    Group(GroupElement),
    Video(VideoElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Image(image) => &image.id,
            Element::Text(text) => &text.id,
            Element::Group(group) => &group.id,
            Element::Video(video) => &video.id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Element::Image(image) => image.label.as_deref(),
            Element::Text(text) => text.label.as_deref(),
            Element::Group(group) => group.label.as_deref(),
            Element::Video(video) => video.label.as_deref(),
        }
    }

    /// Token used for `@mention` addressing: the label when present, else
    /// the first four characters of the id.
    pub fn mention_token(&self) -> String {
        match self.label() {
            Some(label) => label.to_string(),
            None => self.id().chars().take(4).collect(),
        }
    }

    pub fn x(&self) -> f32 {
        match self {
            Element::Image(image) => image.x,
            Element::Text(text) => text.x,
            Element::Group(group) => group.x,
            Element::Video(video) => video.x,
        }
    }

    pub fn y(&self) -> f32 {
        match self {
            Element::Image(image) => image.y,
            Element::Text(text) => text.y,
            Element::Group(group) => group.y,
            Element::Video(video) => video.y,
        }
    }

    pub fn width(&self) -> f32 {
        match self {
            Element::Image(image) => image.width,
            Element::Text(text) => text.width,
            Element::Group(group) => group.width,
            Element::Video(video) => video.width,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            Element::Image(image) => image.height,
            Element::Text(_) => TEXT_ELEMENT_HEIGHT,
            Element::Group(group) => group.height,
            Element::Video(video) => video.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Depth-first walk over an element tree. `visit` receives each element and
/// its absolute origin (group offsets applied); returning `false` stops the
/// walk. `descend` gates recursion into a group's children.
pub fn walk_elements<'a>(
    elements: &'a [Element],
    origin: (f32, f32),
    descend: &impl Fn(&GroupElement) -> bool,
    visit: &mut impl FnMut(&'a Element, (f32, f32)) -> bool,
) -> bool {
    for element in elements {
        let position = (origin.0 + element.x(), origin.1 + element.y());
        if !visit(element, position) {
            return false;
        }
        if let Element::Group(group) = element
            && descend(group)
            && !walk_elements(&group.children, position, descend, visit)
        {
            return false;
        }
    }
    true
}

pub fn find_element<'a>(elements: &'a [Element], id: &str) -> Option<&'a Element> {
    let mut found = None;
    walk_elements(elements, (0.0, 0.0), &|_| true, &mut |element, _| {
        if element.id() == id {
            found = Some(element);
            return false;
        }
        true
    });
    found
}

pub fn find_element_mut<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for element in elements.iter_mut() {
        if element.id() == id {
            return Some(element);
        }
        if let Element::Group(group) = element
            && let Some(found) = find_element_mut(&mut group.children, id)
        {
            return Some(found);
        }
    }
    None
}

/// All elements in document order, group containers included.
pub fn flatten_elements<'a>(elements: &'a [Element]) -> Vec<&'a Element> {
    let mut flat = Vec::new();
    walk_elements(elements, (0.0, 0.0), &|_| true, &mut |element, _| {
        flat.push(element);
        true
    });
    flat
}

pub fn absolute_position(elements: &[Element], id: &str) -> Option<(f32, f32)> {
    let mut found = None;
    walk_elements(elements, (0.0, 0.0), &|_| true, &mut |element, position| {
        if element.id() == id {
            found = Some(position);
            return false;
        }
        true
    });
    found
}

pub fn bounding_box(elements: &[Element]) -> Option<BoundingBox> {
    let mut bounds: Option<BoundingBox> = None;
    walk_elements(elements, (0.0, 0.0), &|_| true, &mut |element, position| {
        let (x, y) = position;
        let (right, bottom) = (x + element.width(), y + element.height());
        bounds = Some(match bounds {
            None => BoundingBox {
                x,
                y,
                width: element.width(),
                height: element.height(),
            },
            Some(current) => {
                let min_x = current.x.min(x);
                let min_y = current.y.min(y);
                let max_x = (current.x + current.width).max(right);
                let max_y = (current.y + current.height).max(bottom);
                BoundingBox {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                }
            }
        });
        true
    });
    bounds
}

/// Remove an element anywhere in the tree. Removing a group removes its
/// whole subtree with it.
pub fn remove_element(elements: &mut Vec<Element>, id: &str) -> Option<Element> {
    if let Some(index) = elements.iter().position(|element| element.id() == id) {
        return Some(elements.remove(index));
    }
    for element in elements.iter_mut() {
        if let Element::Group(group) = element
            && let Some(removed) = remove_element(&mut group.children, id)
        {
            return Some(removed);
        }
    }
    None
}
