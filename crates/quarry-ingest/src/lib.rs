//! Producer registry and triplification pipeline (boundary layer).
//!
//! Concrete format readers live *outside* this workspace; they are handed
//! in as producer functions. This crate owns only the dispatch: a closed
//! registry keyed by media type and file extension, and the
//! producer → filter → builder pipeline entry point. The planning core
//! stays format-agnostic; nothing downstream may branch on producer
//! identity.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};

use quarry_core::FacadeBuilder;

/// A producer streams one source into the builder. The builder's filter
/// (when present) gates every write; producers just describe the source.
pub type Producer = Box<dyn Fn(&str, &[u8], &mut FacadeBuilder) -> Result<()> + Send + Sync>;

/// Closed registry of producers keyed by media type and file extension.
///
/// Keys are fixed at construction time; lookups never fall back to content
/// sniffing.
#[derive(Default)]
pub struct ProducerRegistry {
    producers: Vec<Producer>,
    by_media_type: BTreeMap<String, usize>,
    by_extension: BTreeMap<String, usize>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one producer under its media types and extensions.
    ///
    /// Re-registering an already claimed key is an error: the registry is
    /// closed and first-come ambiguity would make dispatch order-dependent.
    /// A rejected registration leaves the registry unchanged.
    pub fn register(
        &mut self,
        media_types: &[&str],
        extensions: &[&str],
        producer: Producer,
    ) -> Result<()> {
        let media_keys: Vec<String> = media_types.iter().map(|mt| normalize_media_type(mt)).collect();
        let extension_keys: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        for (i, key) in media_keys.iter().enumerate() {
            if self.by_media_type.contains_key(key) || media_keys[..i].contains(key) {
                bail!("media type `{key}` is already registered");
            }
        }
        for (i, key) in extension_keys.iter().enumerate() {
            if self.by_extension.contains_key(key) || extension_keys[..i].contains(key) {
                bail!("extension `.{key}` is already registered");
            }
        }

        let index = self.producers.len();
        for key in media_keys {
            self.by_media_type.insert(key, index);
        }
        for key in extension_keys {
            self.by_extension.insert(key, index);
        }
        self.producers.push(producer);
        Ok(())
    }

    pub fn for_media_type(&self, media_type: &str) -> Option<&Producer> {
        let key = normalize_media_type(media_type);
        self.by_media_type.get(&key).map(|i| &self.producers[*i])
    }

    /// Resolve by the file extension of a source locator.
    pub fn for_path(&self, path: &str) -> Option<&Producer> {
        let extension = path.rsplit('.').next()?.to_ascii_lowercase();
        self.by_extension.get(&extension).map(|i| &self.producers[*i])
    }

    /// Stream `bytes` of `source` into `builder` via the producer
    /// registered for `media_type`.
    pub fn triplify(
        &self,
        source: &str,
        media_type: &str,
        bytes: &[u8],
        builder: &mut FacadeBuilder,
    ) -> Result<()> {
        let producer = self
            .for_media_type(media_type)
            .ok_or_else(|| anyhow!("unsupported media type: {media_type}"))?;
        producer(source, bytes, builder)
    }

    /// As [`Self::triplify`], dispatching on the locator's extension.
    pub fn triplify_path(
        &self,
        source: &str,
        bytes: &[u8],
        builder: &mut FacadeBuilder,
    ) -> Result<()> {
        let producer = self
            .for_path(source)
            .ok_or_else(|| anyhow!("unsupported source format: {source}"))?;
        producer(source, bytes, builder)
    }
}

/// Lowercase and strip parameters: `Text/CSV; charset=utf-8` → `text/csv`.
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{FacadeConfig, SlotKey};
    use quarry_model::Literal;

    fn noop_producer() -> Producer {
        Box::new(|_, _, _| Ok(()))
    }

    fn line_producer() -> Producer {
        Box::new(|source, bytes, builder| {
            builder.add_root(source);
            let text = std::str::from_utf8(bytes)?;
            for (i, line) in text.lines().filter(|l| !l.is_empty()).enumerate() {
                let row = format!("/{}", i + 1);
                builder.add_container(source, "/", SlotKey::Index(i as u32 + 1), &row);
                builder.add_value(source, &row, SlotKey::Index(1), Literal::string(line));
            }
            Ok(())
        })
    }

    #[test]
    fn media_type_lookup_normalizes_case_and_parameters() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(&["text/csv"], &["csv"], noop_producer())
            .expect("register");

        assert!(registry.for_media_type("Text/CSV; charset=utf-8").is_some());
        assert!(registry.for_media_type("text/csv").is_some());
        assert!(registry.for_media_type("application/json").is_none());
    }

    #[test]
    fn extension_lookup_ignores_case() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(&["text/csv"], &["csv"], noop_producer())
            .expect("register");

        assert!(registry.for_path("file:///data/report.CSV").is_some());
        assert!(registry.for_path("file:///data/report.json").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(&["text/csv"], &["csv"], noop_producer())
            .expect("register");
        let err = registry
            .register(&["text/csv"], &["tsv"], noop_producer())
            .expect_err("duplicate");
        assert!(err.to_string().contains("already registered"));

        // The failed registration left nothing behind.
        assert!(registry.for_path("data.tsv").is_none());
        assert!(registry.for_media_type("text/csv").is_some());
    }

    #[test]
    fn unregistered_media_type_errors_at_triplify() {
        let registry = ProducerRegistry::new();
        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        let err = registry
            .triplify("mem://x", "application/x-unknown", b"", &mut builder)
            .expect_err("unsupported");
        assert!(err.to_string().contains("unsupported media type"));
    }

    #[test]
    fn triplify_streams_through_the_registered_producer() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(&["text/plain"], &["txt"], line_producer())
            .expect("register");

        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        registry
            .triplify("mem://lines", "text/plain", b"alpha\nbeta\n", &mut builder)
            .expect("triplify");
        // root typing + 2 row links + 2 values
        assert_eq!(builder.len(), 5);
    }
}
