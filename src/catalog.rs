use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoiceModelId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Blue,
    Purple,
    Indigo,
    Violet,
    Slate,
}

/// Presentation classes for one colour tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub dot: &'static str,
    pub selected: &'static str,
    pub idle: &'static str,
}

const IDLE: &str = "border-gray-700 bg-gray-800/30 text-gray-200";

pub const NEUTRAL_STYLE: StyleDescriptor = StyleDescriptor {
    dot: "bg-gray-500",
    selected: "bg-gray-800/30 border-gray-700/50 text-gray-200",
    idle: IDLE,
};

const STYLES: [(ColorTag, StyleDescriptor); 5] = [
    (
        ColorTag::Blue,
        StyleDescriptor {
            dot: "bg-blue-500",
            selected: "bg-blue-900/30 border-blue-700/50 text-blue-200",
            idle: IDLE,
        },
    ),
    (
        ColorTag::Purple,
        StyleDescriptor {
            dot: "bg-purple-500",
            selected: "bg-purple-900/30 border-purple-700/50 text-purple-200",
            idle: IDLE,
        },
    ),
    (
        ColorTag::Indigo,
        StyleDescriptor {
            dot: "bg-indigo-500",
            selected: "bg-indigo-900/30 border-indigo-700/50 text-indigo-200",
            idle: IDLE,
        },
    ),
    (
        ColorTag::Violet,
        StyleDescriptor {
            dot: "bg-violet-500",
            selected: "bg-violet-900/30 border-violet-700/50 text-violet-200",
            idle: IDLE,
        },
    ),
    (
        ColorTag::Slate,
        StyleDescriptor {
            dot: "bg-slate-400",
            selected: "bg-slate-800/30 border-slate-700/50 text-slate-200",
            idle: IDLE,
        },
    ),
];

impl ColorTag {
    pub fn style(self) -> &'static StyleDescriptor {
        STYLES
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, style)| style)
            .unwrap_or(&NEUTRAL_STYLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceModel {
    pub id: VoiceModelId,
    pub name: String,
    pub description: String,
    pub color: ColorTag,
}

impl VoiceModel {
    pub fn new(id: u32, name: &str, description: &str, color: ColorTag) -> Self {
        Self {
            id: VoiceModelId(id),
            name: name.to_string(),
            description: description.to_string(),
            color,
        }
    }
}

/// Ordered, read-only list of voice models.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    models: Vec<VoiceModel>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VoiceCatalog {
    pub fn new(models: Vec<VoiceModel>) -> Self {
        Self { models }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            VoiceModel::new(1, "Male Voice 1", "Deep male voice with American accent", ColorTag::Blue),
            VoiceModel::new(2, "Female Voice 1", "Soft female voice with British accent", ColorTag::Purple),
            VoiceModel::new(3, "Male Voice 2", "Young male voice with Australian accent", ColorTag::Indigo),
            VoiceModel::new(4, "Female Voice 2", "Professional female voice with neutral accent", ColorTag::Violet),
            VoiceModel::new(5, "Robotic Voice", "AI-generated robotic voice effect", ColorTag::Slate),
            VoiceModel::new(6, "Child Voice", "Young child voice with clear pronunciation", ColorTag::Blue),
        ])
    }

    pub fn all(&self) -> &[VoiceModel] {
        &self.models
    }

    pub fn get(&self, id: VoiceModelId) -> Option<&VoiceModel> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Case-insensitive match on name or description. Empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&VoiceModel> {
        let needle = query.trim().to_lowercase();
        self.models
            .iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
