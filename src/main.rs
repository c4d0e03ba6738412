fn main() -> anyhow::Result<()> {
    noteboard::run()?;
    Ok(())
}
