use std::io::Write;

use abg_ascii::Compositor;
use abg_core::config::{ConvertConfig, load_config};
use abg_core::frame::AsciiFrame;
use abg_export::{ImageOptions, OutputFormat, write_ansi, write_output};
use abg_source::image::load_image;
use anyhow::{Context, Result};

use crate::cli::Cli;

/// Config file (if any) with the command-line flags laid over it.
///
/// # Errors
/// Returns an error if the config file can't be read or parsed.
pub fn build_config(cli: &Cli) -> Result<ConvertConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConvertConfig::default(),
    };
    cli.apply(&mut config);
    Ok(config)
}

/// Une invocation complète : config → image → frame → sorties.
///
/// Terminal output goes to `out`: always when no `--output` is given, and in
/// addition to the file with `--terminal`.
///
/// # Errors
/// Any configuration, decoding, conversion or output failure, with context.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<AsciiFrame> {
    let config = build_config(cli)?;
    let resolved = config.resolve().context("Configuration invalide")?;

    let image = load_image(&cli.image).with_context(|| format!("Chargement de {}", cli.image.display()))?;
    let frame = Compositor::new(&resolved)
        .convert(&image)
        .with_context(|| format!("Conversion de {}", cli.image.display()))?;

    match &cli.output {
        Some(path) => {
            let format = match cli.format {
                Some(format) => format,
                None => OutputFormat::from_path(path)?,
            };
            write_output(&frame, path, format, &ImageOptions::from_config(&resolved))
                .with_context(|| format!("Export vers {}", path.display()))?;
        }
        None => {
            if cli.format.is_some() {
                log::warn!("--format ignoré sans --output");
            }
        }
    }

    if cli.output.is_none() || cli.terminal {
        if cli.plain {
            writeln!(out, "{}", frame.to_plain_text())?;
        } else {
            write_ansi(&frame, out)?;
        }
    }
    Ok(frame)
}
