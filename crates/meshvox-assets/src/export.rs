//! Grid Export
//!
//! Writes the occupied voxels of a grid, in z, then y, then x order, either
//! as one placement command per line or as a JSON document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use meshvox_core::VoxelGrid;
use serde::{Deserialize, Serialize};

use crate::AssetResult;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `setblock ~x ~y ~z <block>` per occupied voxel
    #[default]
    Commands,
    /// Dimensions plus the list of occupied coordinates
    Json,
}

/// Export options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Block placed at every occupied voxel
    pub block: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            block: "minecraft:stone".to_string(),
        }
    }
}

/// Serializable snapshot of an occupancy grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridExport {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub occupied: Vec<[usize; 3]>,
}

impl GridExport {
    pub fn from_grid(grid: &VoxelGrid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            depth: grid.depth(),
            occupied: grid.iter_occupied().collect(),
        }
    }
}

/// Write `grid` to `writer`, returning the number of voxels written
pub fn export_grid<W: Write>(
    grid: &VoxelGrid,
    writer: &mut W,
    format: ExportFormat,
    options: &ExportOptions,
) -> AssetResult<usize> {
    let count = match format {
        ExportFormat::Commands => {
            let mut count = 0;
            for [x, y, z] in grid.iter_occupied() {
                writeln!(writer, "setblock ~{} ~{} ~{} {}", x, y, z, options.block)?;
                count += 1;
            }
            count
        }
        ExportFormat::Json => {
            let export = GridExport::from_grid(grid);
            serde_json::to_writer(&mut *writer, &export)?;
            writeln!(writer)?;
            export.occupied.len()
        }
    };

    Ok(count)
}

/// Write `grid` to a file, replacing any existing content
pub fn export_grid_to_path(
    grid: &VoxelGrid,
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: &ExportOptions,
) -> AssetResult<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let count = export_grid(grid, &mut writer, format, options)?;
    writer.flush()?;

    log::info!("Wrote {} voxels to {} ({:?})", count, path.display(), format);
    Ok(count)
}
