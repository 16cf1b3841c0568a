//! 样式引擎命令行宿主
//!
//! 加载配置中的图层，从标准输入或文件读取要素列表，
//! 输出每个要素解析后的样式（JSON）。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geomap_shared::observability;
use std::io::Read;
use std::path::PathBuf;
use style_engine::layer::GEOJSON_SOURCE_OPTIONS;
use style_engine::{EngineSettings, Feature, GEOJSON_MAPPER, LayerStore};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "style-engine")]
#[command(version, about = "geomap 要素样式解析工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 为要素列表解析样式
    Resolve {
        /// 图层名
        #[arg(short, long)]
        layer: String,

        /// 要素 JSON 文件，缺省读取标准输入
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 输出评估追踪
        #[arg(long)]
        trace: bool,
    },

    /// 列出已加载的图层
    Layers,

    /// 打印图层注册信息
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 配置错误直接退出
    let settings = EngineSettings::load().context("failed to load style-engine configuration")?;

    let obs_config = settings
        .observability
        .clone()
        .with_service_name(&settings.service_name);
    observability::init(&obs_config)?;

    let (store, loaded) = settings.build_store();
    if loaded.len() < settings.layers.len() {
        warn!(
            configured = settings.layers.len(),
            loaded = loaded.len(),
            "部分图层加载失败"
        );
    }
    info!("Loaded {} layers", loaded.len());

    match cli.command {
        Command::Resolve {
            layer,
            input,
            trace,
        } => resolve(&store, &layer, input, trace),
        Command::Layers => list_layers(&store),
        Command::Info => print_info(),
    }
}

fn resolve(store: &LayerStore, layer: &str, input: Option<PathBuf>, trace: bool) -> Result<()> {
    let layer = store
        .get(layer)
        .with_context(|| format!("layer '{}' is not configured", layer))?;

    let raw = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let features: Vec<Feature> =
        serde_json::from_str(&raw).context("input must be a JSON array of features")?;

    let output = if trace {
        let resolutions: Vec<_> = features
            .iter()
            .map(|f| layer.resolve_with_trace(f))
            .collect();
        serde_json::to_string_pretty(&resolutions)?
    } else {
        let styles: Vec<_> = features.iter().map(|f| layer.style(f)).collect();
        serde_json::to_string_pretty(&styles)?
    };

    println!("{}", output);
    Ok(())
}

fn list_layers(store: &LayerStore) -> Result<()> {
    for name in store.list_ids() {
        if let Some(layer) = store.get(&name) {
            println!("{}\t{}\t{} styles", name, layer.src(), layer.styles().len());
        }
    }

    let stats = store.stats();
    println!(
        "{} layers, {} styles total",
        stats.layers_count, stats.total_styles
    );
    Ok(())
}

fn print_info() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&GEOJSON_MAPPER)?);
    println!("sources (custom values allowed):");
    for src in GEOJSON_SOURCE_OPTIONS {
        println!("  {}", src);
    }
    Ok(())
}
