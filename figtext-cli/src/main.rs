//! Renders text as ASCII art using FIGfonts.
//!
//! ```text
//! figtext --font small.flf "Hello"
//! figtext --font-dir fonts/ --layout kerning "Hello"
//! ```
//!
//! Font warnings and debugging output go to stderr through `env_logger`; set `RUST_LOG` to adjust
//! the level (default `warn`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use enumset::EnumSet;
use figtext::font::Font;
use figtext::render::{LayoutMode, Renderer, SmushRule};
use log::debug;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    if let Some(dir) = &cli.font_dir {
        return cli.render_dir(dir);
    }
    if let Some(path) = &cli.font {
        let font = Font::from_path(path)
            .with_context(|| format!("could not load font {}", path.display()))?;
        println!("{}", cli.render(&font)?);
    }
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Renders text as ASCII art using FIGfonts")]
struct Cli {
    /// Text to render (printable ASCII only)
    text: String,
    /// Font file to use
    #[arg(
        short,
        long,
        value_name = "PATH",
        required_unless_present = "font_dir",
        conflicts_with = "font_dir"
    )]
    font: Option<PathBuf>,
    /// Render with every `.flf` font in this directory instead
    #[arg(long, value_name = "DIR")]
    font_dir: Option<PathBuf>,
    /// Layout to use; defaults to the tightest one the font supports
    #[arg(short, long)]
    layout: Option<Layout>,
    /// Smushing rules to turn off (comma separated or repeated)
    #[arg(long, value_name = "RULE", value_delimiter = ',')]
    no_rules: Vec<Rule>,
}

impl Cli {
    fn renderer<'font>(&self, font: &'font Font) -> Result<Renderer<'font>> {
        let mut renderer = Renderer::new(font);
        if let Some(layout) = self.layout {
            renderer = renderer.layout_mode(layout.into())?;
        }
        let rules = self
            .no_rules
            .iter()
            .fold(EnumSet::<SmushRule>::all(), |rules, &rule| rules - SmushRule::from(rule));
        Ok(renderer.smush_rules(rules))
    }

    fn render(&self, font: &Font) -> Result<String> {
        Ok(self.renderer(font)?.render::<String>(&self.text)?)
    }

    fn render_dir(&self, dir: &Path) -> Result<()> {
        let mut paths = fs::read_dir(dir)
            .with_context(|| format!("could not read font directory {}", dir.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.retain(|path| path.extension().is_some_and(|extension| extension == "flf"));
        paths.sort();
        debug!("found {} fonts in {}", paths.len(), dir.display());

        for path in paths {
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |name| name.display().to_string());
            let rendered = Font::from_path(&path)
                .map_err(anyhow::Error::from)
                .and_then(|font| self.render(&font));
            match rendered {
                Ok(rendered) => println!("{name}:\n{rendered}\n"),
                Err(err) => eprintln!("skipping {name}: {err:#}"),
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Layout {
    FullWidth,
    Kerning,
    Smushed,
}

impl From<Layout> for LayoutMode {
    fn from(value: Layout) -> Self {
        match value {
            Layout::FullWidth => Self::FullSize,
            Layout::Kerning => Self::Fitting,
            Layout::Smushed => Self::Smushing,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Rule {
    EqualCharacter,
    Underscore,
    Hierarchy,
    OppositePair,
    BigX,
}

impl From<Rule> for SmushRule {
    fn from(value: Rule) -> Self {
        match value {
            Rule::EqualCharacter => Self::EqualCharacter,
            Rule::Underscore => Self::Underscore,
            Rule::Hierarchy => Self::Hierarchy,
            Rule::OppositePair => Self::OppositePair,
            Rule::BigX => Self::BigX,
        }
    }
}
