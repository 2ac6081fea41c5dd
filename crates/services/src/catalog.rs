//! Catalog sources for question material.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use quiz_core::model::{Entry, EntryId};

use crate::error::CatalogError;

/// One page of catalog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<Entry>,
    pub total: u32,
}

/// Contract for fetching candidate entries to build questions from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch up to `limit` entries starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the request fails or the payload cannot
    /// be turned into typed entries.
    async fn fetch_entries(&self, limit: u32, offset: u32) -> Result<CatalogPage, CatalogError>;
}

//
// ─── POKEAPI CLIENT ───────────────────────────────────────────────────────────
//

const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Catalog source backed by the public PokéAPI.
///
/// The list endpoint only returns names and resource URLs; the numeric id
/// is extracted from the trailing URL segment and the sprite URL is derived
/// from it, so a single request covers a whole candidate pool.
#[derive(Clone)]
pub struct PokeApiCatalog {
    client: Client,
    base_url: String,
    sprite_base_url: String,
}

impl Default for PokeApiCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PokeApiCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_urls(POKEAPI_BASE_URL, SPRITE_BASE_URL)
    }

    #[must_use]
    pub fn with_base_urls(base_url: impl Into<String>, sprite_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            sprite_base_url: sprite_base_url.into(),
        }
    }

    fn sprite_url(&self, id: EntryId) -> String {
        format!("{}/{id}.png", self.sprite_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CatalogSource for PokeApiCatalog {
    async fn fetch_entries(&self, limit: u32, offset: u32) -> Result<CatalogPage, CatalogError> {
        let url = format!(
            "{}/pokemon?limit={limit}&offset={offset}",
            self.base_url.trim_end_matches('/')
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }

        let body: NamedResourceList = response.json().await?;

        let mut entries = Vec::with_capacity(body.results.len());
        for resource in body.results {
            let id = extract_entry_id(&resource.url)
                .ok_or_else(|| CatalogError::MalformedEntry(resource.url.clone()))?;
            let entry = Entry::new(id, capitalize(&resource.name), self.sprite_url(id))?;
            entries.push(entry);
        }

        Ok(CatalogPage {
            entries,
            total: body.count,
        })
    }
}

/// The numeric id is the last non-empty path segment of the resource URL.
fn extract_entry_id(url: &str) -> Option<EntryId> {
    url.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()?
        .parse()
        .ok()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct NamedResourceList {
    count: u32,
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

//
// ─── STATIC CATALOG ───────────────────────────────────────────────────────────
//

/// Fixed-list catalog for tests and offline play.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<Entry>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_entries(&self, limit: u32, offset: u32) -> Result<CatalogPage, CatalogError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(CatalogPage {
            entries,
            total: u32::try_from(self.entries.len()).unwrap_or(u32::MAX),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_resource_url() {
        assert_eq!(
            extract_entry_id("https://pokeapi.co/api/v2/pokemon/25/"),
            Some(EntryId::new(25))
        );
        assert_eq!(
            extract_entry_id("https://pokeapi.co/api/v2/pokemon/151"),
            Some(EntryId::new(151))
        );
        assert_eq!(extract_entry_id("https://pokeapi.co/api/v2/pokemon/"), None);
    }

    #[test]
    fn capitalizes_display_names() {
        assert_eq!(capitalize("pikachu"), "Pikachu");
        assert_eq!(capitalize("mr-mime"), "Mr-mime");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn decodes_named_resource_list_payload() {
        let payload = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;

        let list: NamedResourceList = serde_json::from_str(payload).unwrap();
        assert_eq!(list.count, 1302);
        assert_eq!(list.results.len(), 2);
        assert_eq!(
            extract_entry_id(&list.results[0].url),
            Some(EntryId::new(1))
        );
        assert_eq!(capitalize(&list.results[1].name), "Ivysaur");
    }

    #[test]
    fn sprite_url_is_derived_from_id() {
        let catalog = PokeApiCatalog::new();
        assert_eq!(
            catalog.sprite_url(EntryId::new(25)),
            format!("{SPRITE_BASE_URL}/25.png")
        );
    }

    #[tokio::test]
    async fn static_catalog_pages_entries() {
        let entries: Vec<Entry> = (1..=5)
            .map(|id| {
                Entry::new(
                    EntryId::new(id),
                    format!("Entry {id}"),
                    format!("https://img.example/{id}.png"),
                )
                .unwrap()
            })
            .collect();
        let catalog = StaticCatalog::new(entries);

        let page = catalog.fetch_entries(2, 1).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].id(), EntryId::new(2));
    }
}
