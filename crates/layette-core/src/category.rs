//! Closed category taxonomy and the keyword-based resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The catalog taxonomy. Closed set; resolution never produces anything
/// outside it.
///
/// `Uncategorized` is an explicit escape value used by call sites that have
/// no category text at all (e.g. external registry imports); the resolver
/// itself never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nursery,
    Gear,
    Postpartum,
    Uncategorized,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Nursery => "nursery",
            Category::Gear => "gear",
            Category::Postpartum => "postpartum",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nursery" => Ok(Category::Nursery),
            "gear" => Ok(Category::Gear),
            "postpartum" => Ok(Category::Postpartum),
            "uncategorized" => Ok(Category::Uncategorized),
            other => Err(UnknownCategory(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized category label.
#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Keyword table, iterated in declaration order.
///
/// Inputs matching keywords from more than one category resolve to the first
/// matching category in this order, not to the most specific keyword. The
/// ambiguous cases are pinned in tests.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Nursery,
        &[
            "nursery",
            "sleep",
            "atmosphere",
            "lighting",
            "furniture",
            "space",
            "storage",
            "decor",
            "ambience",
        ],
    ),
    (
        Category::Gear,
        &[
            "gear",
            "travel",
            "stroller",
            "carrier",
            "on-the-go",
            "transport",
            "tech",
            "monitor",
        ],
    ),
    (
        Category::Postpartum,
        &[
            "postpartum",
            "trimester",
            "support",
            "wellness",
            "feeding",
            "care",
            "emotional",
            "parent",
            "recovery",
            "ritual",
        ],
    ),
];

/// Maps free-text category/description input to a taxonomy bucket.
///
/// Two passes over the lower-cased input:
/// 1. substring match against [`CATEGORY_KEYWORDS`], table order;
/// 2. a direct whole-string check for the common raw labels
///    (`"gear"`, `"nursery"`, `"support"`, `"wellness"`).
///
/// Unresolved, empty, or absent input defaults to [`Category::Gear`].
/// Total: never panics, never returns a value outside the taxonomy.
#[must_use]
pub fn resolve_category(input: Option<&str>) -> Category {
    let Some(raw) = input else {
        return Category::Gear;
    };
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return Category::Gear;
    }

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *category;
        }
    }

    // Direct fallback for bare single-word labels; shadowed by the keyword
    // table for its current contents.
    match lower.as_str() {
        "gear" => Category::Gear,
        "nursery" => Category::Nursery,
        "support" | "wellness" => Category::Postpartum,
        _ => Category::Gear,
    }
}
