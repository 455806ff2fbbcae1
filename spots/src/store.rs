use std::{fs::File, io::{BufReader, BufWriter, Write as _}, path::{Path, PathBuf}};

use anyhow::Context;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{Region, DEFAULT_REGION_HEIGHT, DEFAULT_REGION_WIDTH};

/// On-disk form of a region. Files written before regions had a size
/// carry no width or height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRegion {
    pub center_x: i32,
    pub center_y: i32,
    pub angle: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl StoredRegion {
    pub fn legacy(center_x: i32, center_y: i32, angle: i32) -> Self {
        Self {
            center_x,
            center_y,
            angle,
            width: None,
            height: None,
        }
    }

    /// Upgrades the record to a full region, filling a missing size with the defaults.
    pub fn migrate(self) -> Region {
        Region::new(
            Vector2::new(self.center_x, self.center_y),
            Vector2::new(
                self.width.unwrap_or(DEFAULT_REGION_WIDTH),
                self.height.unwrap_or(DEFAULT_REGION_HEIGHT),
            ),
            self.angle,
        )
    }
}

impl From<&Region> for StoredRegion {
    fn from(region: &Region) -> Self {
        Self {
            center_x: region.center.x,
            center_y: region.center.y,
            angle: region.angle,
            width: Some(region.size.x),
            height: Some(region.size.y),
        }
    }
}

/// Region set persisted as a bincode encoded list.
pub struct RegionStore {
    path: PathBuf,
}

impl RegionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the region set. A missing or unreadable file means no regions have been annotated yet.
    pub fn load(&self) -> Vec<Region> {
        match self.read_records() {
            Ok(records) => {
                let regions: Vec<Region> = records.into_iter().map(StoredRegion::migrate).collect();
                log::info!("Loaded {} regions from {}", regions.len(), self.path.display());
                regions
            }
            Err(e) => {
                log::warn!("No regions loaded from {}, starting empty: {e:#}", self.path.display());
                Vec::new()
            }
        }
    }

    pub fn save(&self, regions: &[Region]) -> anyhow::Result<()> {
        let records: Vec<StoredRegion> = regions.iter().map(StoredRegion::from).collect();
        self.write_records(&records)
    }

    pub fn read_records(&self) -> anyhow::Result<Vec<StoredRegion>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let records = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to decode regions in {}", self.path.display()))?;

        Ok(records)
    }

    pub fn write_records(&self, records: &[StoredRegion]) -> anyhow::Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, records)?;
        writer.flush()?;

        Ok(())
    }
}
