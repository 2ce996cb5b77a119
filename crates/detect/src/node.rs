//! Snapshot of the foreground accessibility tree.

use serde::{Deserialize, Serialize};

/// Screen-space bounds of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Display size used when the root node reports empty bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub width: i32,
    pub height: i32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 2400,
        }
    }
}

/// One node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentNode {
    pub text: Option<String>,
    pub content_description: Option<String>,
    pub selected: bool,
    pub checked: bool,
    pub visible: bool,
    pub bounds: Rect,
    pub children: Vec<ContentNode>,
}

impl Default for ContentNode {
    fn default() -> Self {
        Self {
            text: None,
            content_description: None,
            selected: false,
            checked: false,
            visible: true,
            bounds: Rect::default(),
            children: Vec::new(),
        }
    }
}

impl ContentNode {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            content_description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn at(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Text or content description contains `keyword`.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.text.as_deref().is_some_and(|t| t.contains(keyword))
            || self
                .content_description
                .as_deref()
                .is_some_and(|d| d.contains(keyword))
    }

    /// First visible node (depth-first) mentioning `keyword`.
    ///
    /// Invisible nodes hide their whole subtree.
    pub fn find(&self, keyword: &str) -> Option<&ContentNode> {
        if !self.visible {
            return None;
        }
        if self.mentions(keyword) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(keyword))
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.find(keyword).is_some()
    }

    /// A node mentioning `keyword` is selected or checked.
    ///
    /// Unselected tab buttons of the same name do not count.
    pub fn has_selected_tab(&self, keyword: &str) -> bool {
        if self.mentions(keyword) && (self.selected || self.checked) {
            return true;
        }
        self.children
            .iter()
            .any(|child| child.has_selected_tab(keyword))
    }

    /// Screen size from the root bounds, or `fallback` per empty dimension.
    pub fn screen(&self, fallback: Screen) -> Screen {
        let width = self.bounds.width();
        let height = self.bounds.height();
        Screen {
            width: if width == 0 { fallback.width } else { width },
            height: if height == 0 { fallback.height } else { height },
        }
    }
}
