//! Temporary source trees.
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use psr4::planner::PlannerConfig;
use psr4::project::{ProjectResult, WalkOptions, plan_project};

use super::source_fixtures::*;

pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// The legacy shop tree used by most end-to-end tests
    pub fn shop() -> Self {
        let fixture = Self::new();
        fixture.write("src/Shop/Model/Base.php", LEGACY_CLASS);
        fixture.write("src/Shop/Model/Product.php", LEGACY_CHILD);
        fixture.write("src/Shop/Db/Adapter.php", LEGACY_ADAPTER);
        fixture.write("src/functions.php", LEGACY_FUNCTIONS);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn plan(&self, config: &PlannerConfig) -> ProjectResult {
        plan_project(&self.path("src"), config, &WalkOptions::default()).unwrap()
    }
}

pub fn shop_config() -> PlannerConfig {
    PlannerConfig {
        underscore_conversion: true,
        ..PlannerConfig::new("Acme")
    }
}
