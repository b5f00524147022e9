use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;

use skin_compositor::foundation::logging;
use skin_compositor::prelude::*;

const DEFAULT_OUTPUT: &str = "preview.png";
const DEFAULT_SIZE: &str = "256";

#[derive(Debug)]
struct PreviewConfig {
    asset_root: PathBuf,
    identifier: String,
    output: PathBuf,
    size: u32,
    config_file: Option<PathBuf>,
    tables_file: Option<PathBuf>,
    describe_only: bool,
}

fn main() -> Result<()> {
    logging::init();

    let matches = Command::new("skin_preview")
        .about("Resolves a skin material from a local asset tree and bakes a flat preview")
        .arg(
            Arg::new("root")
                .value_name("DIR")
                .help("Directory that contains the textures/ tree")
                .required(true),
        )
        .arg(
            Arg::new("identifier")
                .value_name("SKIN")
                .help("Skin identifier, e.g. cu_ak47_asiimov")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Where to write the baked PNG")
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_name("PIXELS")
                .help("Edge length of the square preview")
                .default_value(DEFAULT_SIZE),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Pipeline configuration (.toml or .ron)"),
        )
        .arg(
            Arg::new("tables")
                .short('t')
                .long("tables")
                .value_name("FILE")
                .help("Extra weapon lookup tables merged over the built-in ones (.toml or .ron)"),
        )
        .arg(
            Arg::new("describe")
                .long("describe")
                .help("Print the resolved material without baking")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let size_arg = matches.get_one::<String>("size").map_or(DEFAULT_SIZE, String::as_str);
    let config = PreviewConfig {
        asset_root: matches.get_one::<String>("root").map(PathBuf::from).context("Missing asset root")?,
        identifier: matches.get_one::<String>("identifier").cloned().context("Missing skin identifier")?,
        output: PathBuf::from(matches.get_one::<String>("output").map_or(DEFAULT_OUTPUT, String::as_str)),
        size: size_arg.parse().context("Invalid preview size")?,
        config_file: matches.get_one::<String>("config").map(PathBuf::from),
        tables_file: matches.get_one::<String>("tables").map(PathBuf::from),
        describe_only: matches.get_flag("describe"),
    };

    run(&config)
}

fn run(config: &PreviewConfig) -> Result<()> {
    let skin_config = match &config.config_file {
        Some(path) => SkinConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SkinConfig::default(),
    };
    if let Err(e) = skin_config.validate() {
        log::warn!("Configuration problem: {}", e);
    }

    let mut resolver = MaterialResolver::from_directory(&config.asset_root, skin_config);
    if let Some(path) = &config.tables_file {
        let extra = LookupTables::load_from_file(path)
            .with_context(|| format!("Failed to load lookup tables {}", path.display()))?;
        let mut tables = LookupTables::builtin().as_ref().clone();
        tables.merge(extra);
        resolver = resolver.with_tables(Arc::new(tables));
    }

    let material = resolver.resolve_material(&config.identifier);
    describe(&material);

    let shader = material.shader(resolver.compositor());
    if shader.decision() != material.decision {
        log::warn!(
            "Selected {} shader could not be built, using {}",
            material.decision.name(),
            shader.decision().name()
        );
    }
    for binding in shader.bindings(&material.channels()) {
        println!("  bind {:<16} {}", binding.channel, binding.texture.canonical_path);
    }

    if config.describe_only {
        return Ok(());
    }

    let preview = shader.bake(config.size, config.size);
    let png = preview.to_png_bytes().context("Failed to encode preview")?;
    std::fs::write(&config.output, png)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    log::info!(
        "Wrote {}x{} preview of '{}' to {}",
        preview.width,
        preview.height,
        config.identifier,
        config.output.display()
    );
    Ok(())
}

fn describe(material: &ResolvedMaterial) {
    println!("Material: {}", material.identifier);
    match &material.source {
        Some(source) => println!("  source   {}", source),
        None => println!("  source   (none)"),
    }
    println!("  shader   {}", material.decision.name());
    if let Some(style) = material.definition.paint_style() {
        println!("  style    {:?}", style);
    }
    if let Some(wear) = material.definition.wear_amount() {
        println!("  wear     {:.3}", wear);
    }
    for (channel, texture) in &material.textures {
        match texture {
            Some(texture) => println!("  {:<16} {}", channel, texture.canonical_path),
            None => println!("  {:<16} (unresolved)", channel),
        }
    }
}
