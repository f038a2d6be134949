//! Recognized page-level modules and the selection set built on them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Heuristic page-type label. AI analysis may produce labels outside the
/// known set; those are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageType {
    #[default]
    Unknown,
    List,
    Detail,
    Create,
    Edit,
    Dialog,
    Other(String),
}

impl PageType {
    pub fn label(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::List => "列表页",
            Self::Detail => "详情页",
            Self::Create => "创建页",
            Self::Edit => "编辑页",
            Self::Dialog => "弹窗",
            Self::Other(label) => label,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<String> for PageType {
    fn from(s: String) -> Self {
        match s.trim() {
            "" => Self::Unknown,
            "列表页" => Self::List,
            "详情页" => Self::Detail,
            "创建页" => Self::Create,
            "编辑页" => Self::Edit,
            "弹窗" => Self::Dialog,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<PageType> for String {
    fn from(t: PageType) -> Self {
        t.label().to_string()
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recognized page or feature unit of a requirements document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Stable identifier, assigned at recognition time and never reassigned.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub page_type: PageType,
    /// Heading depth: 2 is a primary module boundary, 3 a sub-module.
    pub level: u8,
    /// Only ever changed by the selection collaborator.
    #[serde(default)]
    pub selected: bool,
}

impl Module {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        page_type: PageType,
        level: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            page_type,
            level,
            selected: false,
        }
    }

    /// A bare module descriptor, as supplied by callers that only know a name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = module_id(&format!("named:{name}"));
        Self::new(id, name, "", PageType::Unknown, 2)
    }
}

/// Derive a 16-hex-character identifier from a seed string.
pub fn module_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// An ordered list of recognized modules with selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSet {
    modules: Vec<Module>,
}

impl ModuleSet {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn select_all(&mut self) {
        for m in &mut self.modules {
            m.selected = true;
        }
    }

    pub fn deselect_all(&mut self) {
        for m in &mut self.modules {
            m.selected = false;
        }
    }

    /// Flip the selection of the module with `id`. Returns the new state, or
    /// `None` when no such module exists.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let module = self.modules.iter_mut().find(|m| m.id == id)?;
        module.selected = !module.selected;
        Some(module.selected)
    }

    /// Select exactly the modules whose name appears in `names`.
    pub fn select_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let mut count = 0;
        for m in &mut self.modules {
            m.selected = names.iter().any(|n| n.as_ref() == m.name);
            if m.selected {
                count += 1;
            }
        }
        count
    }

    /// Selected modules, in document order.
    pub fn selected(&self) -> Vec<Module> {
        self.modules.iter().filter(|m| m.selected).cloned().collect()
    }

    /// Modules whose name or description contains `keyword`, case-insensitively.
    /// An empty keyword matches everything.
    pub fn filter(&self, keyword: &str) -> Vec<&Module> {
        let needle = keyword.trim().to_lowercase();
        self.modules
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
