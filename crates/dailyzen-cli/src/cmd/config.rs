use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dailyzen_core::config::{EffectiveConfig, user_config_path};
use serde::Serialize;
use std::path::PathBuf;

use super::AppContext;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
}

#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    config_path: Option<PathBuf>,
    data_dir: &'a PathBuf,
    output: &'a str,
    settings: &'a dailyzen_core::config::UserConfig,
}

pub fn run_config(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => run_show(ctx, &ctx.config),
    }
}

fn run_show(ctx: &AppContext, effective: &EffectiveConfig) -> Result<()> {
    let settings = toml::to_string_pretty(&effective.user).context("Failed to encode config")?;
    let view = ConfigView {
        config_path: user_config_path(),
        data_dir: &effective.data_dir,
        output: &effective.resolved_output,
        settings: &effective.user,
    };
    let path_label = |v: &ConfigView<'_>| {
        v.config_path
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    };
    render_mode(
        ctx.output,
        &view,
        |v, w| {
            writeln!(w, "config_path\t{}", path_label(v))?;
            writeln!(w, "data_dir\t{}", v.data_dir.display())?;
            writeln!(w, "output\t{}", v.output)?;
            write!(w, "{settings}")
        },
        |v, w| {
            pretty_section(w, "Effective configuration")?;
            pretty_kv(w, "Config", path_label(v))?;
            pretty_kv(w, "Data dir", v.data_dir.display().to_string())?;
            pretty_kv(w, "Output", v.output)?;
            writeln!(w)?;
            write!(w, "{settings}")
        },
    )
}
