//! `libjson from`: generate a marker document.

use super::Context;
use libjson::AncestorOptions;

pub fn node_modules(ctx: &Context) -> anyhow::Result<()> {
    let doc = libjson::from_node_modules(&ctx.cwd)?;
    println!("{}", doc.to_string_pretty());
    Ok(())
}

pub fn ancestors(
    ctx: &Context,
    lookups: &[(String, String)],
    max_levels: Option<usize>,
    sub_path: Option<String>,
) -> anyhow::Result<()> {
    let options = AncestorOptions {
        max_levels,
        sub_path,
    };
    let doc = libjson::from_ancestors(&ctx.cwd, lookups, &options)?;
    println!("{}", doc.to_string_pretty());
    Ok(())
}

/// Parse a `FILE=CATEGORY` lookup argument
pub fn parse_lookup(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((file, category)) if !file.is_empty() && !category.is_empty() => {
            Ok((file.to_string(), category.to_string()))
        }
        _ => Err(format!("expected FILE=CATEGORY, got '{}'", arg)),
    }
}
