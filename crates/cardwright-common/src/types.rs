//! Template catalog data model.
//!
//! These are the mapped, read-only records the editor works from. The raw
//! snake_case API shape lives in [`crate::catalog::raw`].

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The four kinds of card the catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Ancestry,
    Community,
    Subclass,
    DomainCard,
}

impl TemplateCategory {
    /// Catalog fetch order.
    pub const ALL: [TemplateCategory; 4] = [
        TemplateCategory::Subclass,
        TemplateCategory::Ancestry,
        TemplateCategory::Community,
        TemplateCategory::DomainCard,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Ancestry => "ancestry",
            TemplateCategory::Community => "community",
            TemplateCategory::Subclass => "subclass",
            TemplateCategory::DomainCard => "domain-card",
        }
    }

    /// Path segment of the catalog endpoint for this category.
    pub const fn endpoint(&self) -> &'static str {
        self.as_str()
    }

    /// Localized group title.
    pub const fn title(&self) -> &'static str {
        match self {
            TemplateCategory::Ancestry => "Родословная",
            TemplateCategory::Community => "Сообщество",
            TemplateCategory::Subclass => "Подкласс",
            TemplateCategory::DomainCard => "Карта Домена",
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ancestry" => Ok(TemplateCategory::Ancestry),
            "community" => Ok(TemplateCategory::Community),
            "subclass" => Ok(TemplateCategory::Subclass),
            "domain-card" => Ok(TemplateCategory::DomainCard),
            other => Err(format!("unknown template category: {other}")),
        }
    }
}

/// Feature identifiers come back from the API as either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(SmolStr),
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

/// One named ability or trait of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFeature {
    pub id: FeatureId,
    pub name: String,
    pub text: String,
    /// Tier bucket ("Основа", "Специализация", ...), subclass cards only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Category-specific payload of a [`TemplateCard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum CardKind {
    Ancestry,
    Community,
    #[serde(rename_all = "camelCase")]
    Subclass {
        #[serde(default)]
        class_slug: Option<String>,
        #[serde(default)]
        class_name: Option<String>,
        #[serde(default)]
        spellcast_trait: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    DomainCard {
        #[serde(default)]
        domain_slug: Option<String>,
        #[serde(default)]
        domain_name: Option<String>,
        #[serde(default)]
        card_type: Option<String>,
        #[serde(default)]
        stress_cost: Option<i64>,
        #[serde(default)]
        level: Option<i64>,
    },
}

impl CardKind {
    pub const fn category(&self) -> TemplateCategory {
        match self {
            CardKind::Ancestry => TemplateCategory::Ancestry,
            CardKind::Community => TemplateCategory::Community,
            CardKind::Subclass { .. } => TemplateCategory::Subclass,
            CardKind::DomainCard { .. } => TemplateCategory::DomainCard,
        }
    }
}

/// A catalog entry. `features` keeps the source order; for subclasses
/// index 0 is the first tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCard {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub features: Vec<TemplateFeature>,
    #[serde(default)]
    pub art_attribution: Option<String>,
    #[serde(flatten)]
    pub kind: CardKind,
}

impl TemplateCard {
    pub const fn category(&self) -> TemplateCategory {
        self.kind.category()
    }

    pub fn class_slug(&self) -> Option<&str> {
        match &self.kind {
            CardKind::Subclass { class_slug, .. } => class_slug.as_deref(),
            _ => None,
        }
    }

    pub fn domain_slug(&self) -> Option<&str> {
        match &self.kind {
            CardKind::DomainCard { domain_slug, .. } => domain_slug.as_deref(),
            _ => None,
        }
    }

    pub fn card_type(&self) -> Option<&str> {
        match &self.kind {
            CardKind::DomainCard { card_type, .. } => card_type.as_deref(),
            _ => None,
        }
    }
}

/// All templates of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateGroup {
    pub id: TemplateCategory,
    pub title: String,
    pub items: Vec<TemplateCard>,
}

/// The whole catalog, as fetched at `fetched_at` (RFC 3339).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCollection {
    pub template_groups: Vec<TemplateGroup>,
    pub fetched_at: String,
}
