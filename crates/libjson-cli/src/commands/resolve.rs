//! `libjson resolve.bin`, `libjson resolve.js`, `libjson node-path`

use super::Context;
use libjson::Lib;

pub fn bin(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let lib = Lib::for_dir(&ctx.cwd, ctx.options.clone())?;
    let path = lib.bin.resolve(name)?;
    println!("{}", path.display());
    Ok(())
}

pub fn js(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let lib = Lib::for_dir(&ctx.cwd, ctx.options.clone())?;
    let path = lib.js.resolve(name)?;
    println!("{}", path.display());
    Ok(())
}

pub fn node_path(ctx: &Context) -> anyhow::Result<()> {
    let lib = Lib::for_dir(&ctx.cwd, ctx.options.clone())?;
    let joined = std::env::join_paths(lib.js.node_path())?;
    println!("{}", joined.to_string_lossy());
    Ok(())
}
