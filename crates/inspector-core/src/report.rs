//! Checklist output
//!
//! Human mode streams one pass line or one fail block per item as it
//! completes. JSON mode prints nothing per item; the driver emits a
//! single document when the run is done.

use std::io::{IsTerminal, Write};

use colored::{Color, Colorize};
use serde::Serialize;
use serde_json::Value;

use crate::config::OutputFormat;
use crate::diff::{DiffMap, DiffTree};
use crate::item::{Discrepancy, Item};
use crate::{Error, Result};

/// Indentation depth of an item's discrepancies
const BASE_DEPTH: usize = 2;

/// Terminal capabilities used by human output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    pub color: bool,
    pub glyphs: bool,
}

impl OutputStyle {
    /// Colors and glyphs when stdout is an interactive terminal.
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Self::terminal()
        } else {
            Self::plain()
        }
    }

    pub fn terminal() -> Self {
        Self {
            color: true,
            glyphs: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            glyphs: false,
        }
    }
}

/// Reporting mode, fixed once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human(OutputStyle),
    Json,
}

impl OutputMode {
    pub fn detect(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => Self::Human(OutputStyle::detect()),
            OutputFormat::Json => Self::Json,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Renders items as pass lines and indented fail blocks
#[derive(Debug, Clone, Copy)]
pub struct HumanReporter {
    style: OutputStyle,
}

impl HumanReporter {
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }

    pub fn banner<W: Write>(&self, out: &mut W, title: &str) -> Result<()> {
        let rule = "-".repeat(title.chars().count());
        let title = if self.style.color {
            title.bold().to_string()
        } else {
            title.to_string()
        };
        writeln!(out, "{title}").map_err(Error::Output)?;
        writeln!(out, "{rule}").map_err(Error::Output)
    }

    pub fn report_item<W: Write>(&self, out: &mut W, item: &Item) -> Result<()> {
        self.write_item(out, item).map_err(Error::Output)
    }

    fn write_item<W: Write>(&self, out: &mut W, item: &Item) -> std::io::Result<()> {
        if item.passed() {
            let marker = if self.style.glyphs { "✓" } else { "[PASS]" };
            return writeln!(out, "{} {}", self.paint(marker, Color::Green), item.name);
        }

        let marker = if self.style.glyphs { "✗" } else { "[FAIL]" };
        writeln!(out, "{} {}", self.paint(marker, Color::Red), item.name)?;
        for discrepancy in &item.errors {
            match discrepancy {
                Discrepancy::Message(message) => {
                    writeln!(out, "{}{}", indent(BASE_DEPTH), self.paint(message, Color::Red))?;
                }
                Discrepancy::Diff(diff) => self.write_diff(out, diff, BASE_DEPTH)?,
            }
        }
        Ok(())
    }

    fn write_diff<W: Write>(
        &self,
        out: &mut W,
        diff: &DiffMap,
        depth: usize,
    ) -> std::io::Result<()> {
        for (key, tree) in diff {
            writeln!(out, "{}{} {}", indent(depth), self.paint("-", Color::Yellow), key)?;
            match tree {
                DiffTree::Leaf { server, local } => {
                    let pad = indent(depth + 1);
                    writeln!(
                        out,
                        "{pad}{} = {}",
                        self.paint("server value", Color::Red),
                        display_value(server)
                    )?;
                    writeln!(
                        out,
                        "{pad}{}  = {}",
                        self.paint("local value", Color::Green),
                        display_value(local)
                    )?;
                    writeln!(out)?;
                }
                DiffTree::Node(children) => self.write_diff(out, children, depth + 1)?,
            }
        }
        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.style.color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Write a value as a pretty-printed JSON document followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    let document = serde_json::to_string_pretty(value)?;
    writeln!(out, "{document}").map_err(Error::Output)
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
