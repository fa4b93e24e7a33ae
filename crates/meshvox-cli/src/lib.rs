//! # Meshvox CLI
//!
//! Command-line interface for Meshvox.
//!
//! ## Commands
//! - `voxelize` - Voxelize a mesh document and export the occupied voxels
//! - `info` - Print mesh statistics

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshvox_assets::{export_grid_to_path, ExportFormat, ExportOptions, MeshDocument};
use meshvox_core::{voxelize, Execution, Mesh, Strategy, VoxelizeConfig};

/// Meshvox mesh voxelizer
#[derive(Parser)]
#[command(name = "meshvox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Voxelize a mesh document
    Voxelize {
        /// Input mesh document (JSON)
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "commands.txt")]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Commands)]
        format: FormatArg,

        /// Block placed at every occupied voxel
        #[arg(short, long, default_value = "minecraft:stone")]
        block: String,

        /// Index of the mesh to voxelize
        #[arg(short, long, default_value_t = 0, conflicts_with = "merge")]
        mesh: usize,

        /// Voxelize every mesh in the document together
        #[arg(long)]
        merge: bool,

        /// Voxelization config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Print mesh statistics
    Info {
        /// Input mesh document (JSON)
        input: PathBuf,
    },
}

/// Grid overrides applied on top of the config file
#[derive(Debug, Default, clap::Args)]
pub struct GridArgs {
    /// Voxels along every axis
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Voxels along X
    #[arg(long)]
    pub width: Option<usize>,

    /// Voxels along Y
    #[arg(long)]
    pub height: Option<usize>,

    /// Voxels along Z
    #[arg(long)]
    pub depth: Option<usize>,

    /// Traversal strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Run on all cores
    #[arg(short, long)]
    pub parallel: bool,
}

impl GridArgs {
    /// Apply the overrides to `config`
    pub fn apply(&self, mut config: VoxelizeConfig) -> VoxelizeConfig {
        if let Some(size) = self.size {
            config.grid_width = size;
            config.grid_height = size;
            config.grid_depth = size;
        }
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(depth) = self.depth {
            config.grid_depth = depth;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if self.parallel {
            config.execution = Execution::Parallel;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    PerTriangle,
    PerVoxel,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PerTriangle => Strategy::PerTriangle,
            StrategyArg::PerVoxel => Strategy::PerVoxel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Commands,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Commands => ExportFormat::Commands,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Load a config file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<VoxelizeConfig> {
    let Some(path) = path else {
        return Ok(VoxelizeConfig::default());
    };

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

fn load_mesh(input: &Path, mesh: usize, merge: bool) -> Result<Mesh> {
    let document = MeshDocument::load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let mesh = if merge {
        document.to_merged_mesh()?
    } else {
        document.to_mesh(mesh)?
    };
    Ok(mesh)
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Voxelize {
            input,
            output,
            format,
            block,
            mesh,
            merge,
            config,
            grid,
        } => {
            let config = grid.apply(load_config(config.as_deref())?);
            config.validate()?;

            let mesh = load_mesh(&input, mesh, merge)?.normalize()?;
            let bounds = mesh.source_bounds();
            log::debug!("Source bounds: {} .. {}", bounds.min, bounds.max);

            let voxels = voxelize(&mesh, &config)?;

            let options = ExportOptions { block };
            export_grid_to_path(&voxels, &output, format.into(), &options)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }

        Commands::Info { input } => {
            let document = MeshDocument::load(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;

            log::info!("Meshes: {}", document.mesh_count());
            for (index, entry) in document.meshes.iter().enumerate() {
                log::info!("  [{}] {} triangles", index, entry.indices.len() / 3);
            }

            let mesh = document.to_merged_mesh()?;
            let bounds = mesh.bounds();
            log::info!("Vertices: {}", mesh.vertex_count());
            log::info!("Triangles: {}", mesh.triangle_count());
            if !bounds.is_empty() {
                log::info!("Bounds: {} .. {} (size {})", bounds.min, bounds.max, bounds.size());
            }
        }
    }

    Ok(())
}
