use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Travel,
    Food,
    Clothes,
    Experiences,
    Books,
    Wellness,
    Tech,
    Movies,
    Finance,
    Misc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Travel,
        Self::Food,
        Self::Clothes,
        Self::Experiences,
        Self::Books,
        Self::Wellness,
        Self::Tech,
        Self::Movies,
        Self::Finance,
        Self::Misc,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Food => "food",
            Self::Clothes => "clothes",
            Self::Experiences => "experiences",
            Self::Books => "books",
            Self::Wellness => "wellness",
            Self::Tech => "tech",
            Self::Movies => "movies",
            Self::Finance => "finance",
            Self::Misc => "misc",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_key() == s)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Travel => "🌍",
            Self::Food => "🍔",
            Self::Clothes => "👚",
            Self::Experiences => "🎉",
            Self::Books => "📚",
            Self::Wellness => "🧘",
            Self::Tech => "💻",
            Self::Movies => "🎬",
            Self::Finance => "💸",
            Self::Misc => "📝",
        }
    }
}

/// Icon for a stored category key. Unknown keys get the `misc` icon.
pub fn icon_for(key: &str) -> &'static str {
    Category::from_key(key).unwrap_or(Category::Misc).icon()
}
