//! Build script for `push-guard`.
//!
//! `--version` shows the build date, rustc version and target triple; this
//! emits exactly those as `VERGEN_*` variables. Any failure only leaves the
//! fields out of `--version`.

use std::error::Error;
use vergen_gix::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};

fn emit_version_metadata() -> Result<(), Box<dyn Error>> {
    let timestamp = BuildBuilder::default().build_timestamp(true).build()?;
    let target = CargoBuilder::default().target_triple(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    Emitter::default()
        .add_instructions(&timestamp)?
        .add_instructions(&target)?
        .add_instructions(&rustc)?
        .emit()?;
    Ok(())
}

fn main() {
    if let Err(e) = emit_version_metadata() {
        println!("cargo:warning=version metadata unavailable: {e}");
    }
}
