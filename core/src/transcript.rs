use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Key of one transcript row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry_{}", self.0.simple())
    }
}

/// Who a row is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Tool(ToolKind),
    System,
    Error,
    Pending,
}

impl Author {
    /// Prompt-style lead shown in front of the row
    pub fn prompt(&self) -> &'static str {
        match self {
            Author::User => "user@hostname:~$",
            Author::Tool(kind) => kind.label(),
            Author::System => "root@wasp:~#",
            Author::Error => "❌ Error:",
            Author::Pending => "🐇",
        }
    }
}

/// A run of text inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Plain(String),
    Link(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub label: String,
    pub url: String,
}

/// Structured content of a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// Body text; may span several lines
    Text(String),
    /// Text with embedded hyperlinks
    Rich(Vec<Inline>),
    /// Highlighted single line
    Headline(String),
    /// Caption introducing the block after it
    Caption(String),
    Bullets(Vec<String>),
    /// Numbered entries, each made of one or more lines
    Numbered(Vec<Vec<String>>),
    /// Options labelled A, B, C, ...
    Lettered(Vec<String>),
    Tiles(Vec<Tile>),
    Notice(String),
    Error(String),
}

impl Block {
    pub fn links(&self) -> Vec<&str> {
        match self {
            Block::Rich(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Inline::Link(url) => Some(url.as_str()),
                    Inline::Plain(_) => None,
                })
                .collect(),
            Block::Tiles(tiles) => tiles.iter().map(|tile| tile.url.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Plain-text lines of this block
    pub fn lines(&self) -> Vec<String> {
        match self {
            Block::Text(text) | Block::Headline(text) | Block::Caption(text) => {
                text.lines().map(str::to_string).collect()
            }
            Block::Notice(text) => vec![format!("⚠️ {}", text)],
            Block::Error(text) => vec![format!("❌ Error: {}", text)],
            Block::Rich(parts) => {
                let joined: String = parts
                    .iter()
                    .map(|part| match part {
                        Inline::Plain(text) | Inline::Link(text) => text.as_str(),
                    })
                    .collect();
                joined.lines().map(str::to_string).collect()
            }
            Block::Bullets(items) => items.iter().map(|item| format!("  • {}", item)).collect(),
            Block::Numbered(items) => items
                .iter()
                .enumerate()
                .flat_map(|(idx, lines)| {
                    lines.iter().enumerate().map(move |(n, line)| {
                        if n == 0 {
                            format!("{}. {}", idx + 1, line)
                        } else {
                            format!("   {}", line)
                        }
                    })
                })
                .collect(),
            Block::Lettered(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| format!("{}. {}", letter(idx), item))
                .collect(),
            Block::Tiles(tiles) => tiles
                .iter()
                .map(|tile| format!("[{}] {}", tile.label, tile.url))
                .collect(),
        }
    }
}

/// Option letter for position `idx` (A..Z, then AA, AB, ...)
pub fn letter(idx: usize) -> String {
    let mut n = idx;
    let mut out = Vec::new();
    loop {
        out.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.iter().rev().collect()
}

/// A single row of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub author: Author,
    pub blocks: Vec<Block>,
    pub timestamp_secs: u64, // Unix timestamp in seconds for serialization
}

impl Entry {
    pub fn new(author: Author, blocks: Vec<Block>) -> Self {
        let timestamp_secs = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0u64, |d| d.as_secs());
        Self {
            id: EntryId::new(),
            author,
            blocks,
            timestamp_secs,
        }
    }

    pub fn user(line: String) -> Self {
        Self::new(Author::User, vec![Block::Text(line)])
    }

    pub fn system(text: String) -> Self {
        Self::new(Author::System, vec![Block::Text(text)])
    }

    pub fn loading() -> Self {
        Self::new(Author::Pending, vec![Block::Text("Loading...".to_string())])
    }

    pub fn is_pending(&self) -> bool {
        self.author == Author::Pending
    }

    /// Render as plain text: the prompt, then each block's lines
    pub fn to_plain_text(&self) -> String {
        let lines: Vec<String> = self.blocks.iter().flat_map(Block::lines).collect();
        match lines.split_first() {
            Some((first, rest)) if rest.is_empty() => format!("{} {}", self.author.prompt(), first),
            Some(_) => format!("{}\n{}", self.author.prompt(), lines.join("\n")),
            None => self.author.prompt().to_string(),
        }
    }
}

/// Content that replaces a placeholder row
#[derive(Debug, Clone, PartialEq)]
pub struct EntryContent {
    pub author: Author,
    pub blocks: Vec<Block>,
}

/// Ordered chat transcript. Rows are only ever appended, or rewritten in
/// place by key.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and return its key
    pub fn append(&mut self, entry: Entry) -> EntryId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Replace the row keyed by `id`. Returns false when no such row exists.
    pub fn replace(&mut self, id: EntryId, content: EntryContent) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.author = content.author;
                entry.blocks = content.blocks;
                true
            }
            None => false,
        }
    }

    /// Add a block to the end of the row keyed by `id`
    pub fn amend(&mut self, id: EntryId, block: Block) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.blocks.push(block);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recent hyperlink anywhere in the transcript
    pub fn last_link(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .flat_map(|entry| entry.blocks.iter().rev())
            .find_map(|block| block.links().last().copied())
    }

    pub fn to_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(Entry::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
