use anyhow::Result;
use vergen::EmitBuilder;

// Exposes VERGEN_GIT_SHA to the CLI start-up log.
fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .emit()?;
    Ok(())
}
