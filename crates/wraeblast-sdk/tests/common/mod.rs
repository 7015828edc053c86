//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;
use wraeblast_sdk::{FilterLoader, FilterLoaderBuilder, ItemFilter, ItemFilterContext, ItemTable};

/// Ten currencies, one of them unpriced
pub fn currencies() -> ItemTable {
    ItemTable::from_prices([
        ("Orb of Transmutation", 0.0),
        ("Orb of Alteration", 0.2),
        ("Chromatic Orb", 0.3),
        ("Jeweller's Orb", 0.4),
        ("Orb of Fusing", 0.6),
        ("Orb of Alchemy", 0.8),
        ("Chaos Orb", 1.0),
        ("Vaal Orb", 1.5),
        ("Orb of Annulment", 20.0),
        ("Exalted Orb", 150.0),
    ])
}

pub fn fragments() -> ItemTable {
    ItemTable::from_prices([
        ("Chayula's Breachstone", 30.0),
        ("Splinter of Xoph", 0.5),
        ("Sacrifice at Dusk", 0.3),
        ("Mortal Grief", 1.5),
    ])
}

pub fn context() -> ItemFilterContext {
    ItemFilterContext::new()
        .with_table("currencies", currencies())
        .with_table("fragments", fragments())
}

/// Loader over the fixture context with template files in a temporary directory
pub struct TestLoader {
    dir: TempDir,
}

impl TestLoader {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create template dir"),
        }
    }

    /// Add a template file that others can include
    pub fn with_template(self, name: &str, source: &str) -> Self {
        std::fs::write(self.dir.path().join(name), source.trim_start())
            .expect("Failed to write template");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn loader(&self) -> FilterLoader {
        FilterLoaderBuilder::new()
            .with_context(context())
            .with_search_path(self.dir.path())
            .build()
            .expect("Failed to build loader")
    }

    pub fn render(&self, template: &str) -> String {
        self.loader().render(template).expect("Render failed")
    }

    pub fn load(&self, template: &str) -> ItemFilter {
        self.loader().loads(template, false).expect("Load failed")
    }
}
