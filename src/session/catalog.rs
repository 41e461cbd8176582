use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketId(pub u64);

impl fmt::Display for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BasketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub id: KeywordId,
    pub name: String,
    #[serde(default)]
    pub assigned_basket: Option<BasketId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub id: BasketId,
    pub name: String,
    /// Display-only; the controller never reads it.
    #[serde(default)]
    pub color: String,
}

/// Monotonic id source. Ids follow wall-clock milliseconds but never repeat,
/// even when several items are created within the same millisecond.
#[derive(Clone, Debug, Default)]
struct IdSource {
    last: u64,
}

impl IdSource {
    fn seeded_past(floor: u64) -> Self {
        Self { last: floor }
    }

    /// `None` once the id space is used up.
    fn next(&mut self) -> Option<u64> {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last.checked_add(1)?);
        Some(self.last)
    }
}

/// Keywords, baskets and the assignment mapping between them.
///
/// Every `assigned_basket` held here refers to a basket that is present in
/// `baskets`; all mutators preserve that.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    keywords: Vec<Keyword>,
    baskets: Vec<Basket>,
    ids: IdSource,
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.keywords == other.keywords && self.baskets == other.baskets
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded parts. Assignments pointing at baskets that
    /// are not part of `baskets` are cleared; the number cleared is returned
    /// alongside so callers can report the repair.
    pub fn from_parts(mut keywords: Vec<Keyword>, baskets: Vec<Basket>) -> (Self, usize) {
        let basket_ids: HashSet<BasketId> = baskets.iter().map(|b| b.id).collect();
        let mut cleared = 0;
        for keyword in &mut keywords {
            if let Some(b) = keyword.assigned_basket
                && !basket_ids.contains(&b)
            {
                keyword.assigned_basket = None;
                cleared += 1;
            }
        }

        let floor = keywords
            .iter()
            .map(|k| k.id.0)
            .chain(baskets.iter().map(|b| b.id.0))
            .max()
            .unwrap_or(0);

        (
            Self {
                keywords,
                baskets,
                ids: IdSource::seeded_past(floor),
            },
            cleared,
        )
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.baskets.is_empty()
    }

    pub fn keyword(&self, id: KeywordId) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.id == id)
    }

    pub fn basket(&self, id: BasketId) -> Option<&Basket> {
        self.baskets.iter().find(|b| b.id == id)
    }

    pub fn keywords_in(&self, basket: BasketId) -> impl Iterator<Item = &Keyword> {
        self.keywords
            .iter()
            .filter(move |k| k.assigned_basket == Some(basket))
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().filter(|k| k.assigned_basket.is_none())
    }

    pub fn assigned(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().filter(|k| k.assigned_basket.is_some())
    }

    /// Returns `None` when the trimmed name is empty or no id is left.
    pub fn add_keyword(&mut self, name: &str) -> Option<KeywordId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = KeywordId(self.ids.next()?);
        self.keywords.push(Keyword {
            id,
            name: name.to_string(),
            assigned_basket: None,
        });
        Some(id)
    }

    /// Returns `None` when the trimmed name is empty or no id is left.
    pub fn add_basket(&mut self, name: &str, color: String) -> Option<BasketId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = BasketId(self.ids.next()?);
        self.baskets.push(Basket {
            id,
            name: name.to_string(),
            color,
        });
        Some(id)
    }

    pub fn delete_keyword(&mut self, id: KeywordId) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k.id != id);
        self.keywords.len() != before
    }

    /// Removes the basket and unassigns every keyword that pointed at it.
    pub fn delete_basket(&mut self, id: BasketId) -> bool {
        let before = self.baskets.len();
        self.baskets.retain(|b| b.id != id);
        if self.baskets.len() == before {
            return false;
        }
        for keyword in &mut self.keywords {
            if keyword.assigned_basket == Some(id) {
                keyword.assigned_basket = None;
            }
        }
        true
    }

    /// Point `keyword` at `basket` (or unassign it with `None`). Refuses
    /// unknown keywords and unknown baskets.
    pub fn assign(&mut self, keyword: KeywordId, basket: Option<BasketId>) -> bool {
        if let Some(b) = basket
            && self.basket(b).is_none()
        {
            return false;
        }
        match self.keywords.iter_mut().find(|k| k.id == keyword) {
            Some(k) => {
                k.assigned_basket = basket;
                true
            }
            None => false,
        }
    }
}
