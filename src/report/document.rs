use super::chart::Chart;

/// A navigable report: one tab per page.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    /// Light markdown: `#` headings, `**bold**`, `*italic*`, `![](url)` images.
    Text(String),
    BigNumber(BigNumber),
    Group(Group),
    /// Dropdown showing one group at a time, keyed by the group label.
    Select(Vec<Group>),
    Divider,
    Chart(Chart),
    DataTable(DataTable),
}

#[derive(Debug, Clone, Default)]
pub struct BigNumber {
    pub heading: String,
    pub value: String,
    pub prev_value: Option<String>,
    pub change: Option<String>,
    pub is_upward_change: Option<bool>,
    pub label: Option<String>,
}

impl BigNumber {
    pub fn new(heading: impl Into<String>, value: impl ToString) -> Self {
        Self {
            heading: heading.into(),
            value: value.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub blocks: Vec<Block>,
    pub columns: usize,
    pub label: Option<String>,
}

impl Group {
    pub fn new(blocks: Vec<Block>, columns: usize) -> Self {
        Self {
            blocks,
            columns: columns.max(1),
            label: None,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct DataTable {
    pub caption: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Document {
    pub fn new(title: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }

    /// Wraps loose blocks in a single page named after the document.
    pub fn single(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        let title = title.into();
        Self {
            pages: vec![Page {
                title: title.clone(),
                blocks,
            }],
            title,
        }
    }
}

impl Page {
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            blocks,
        }
    }
}

pub fn text(markdown: impl Into<String>) -> Block {
    Block::Text(markdown.into())
}

pub fn group(blocks: Vec<Block>, columns: usize) -> Block {
    Block::Group(Group::new(blocks, columns))
}
