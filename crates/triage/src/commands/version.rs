pub fn run() -> anyhow::Result<()> {
    println!("triage {}", env!("CARGO_PKG_VERSION"));
    println!("Multi-tier routing of problem descriptions to specialist handlers");
    Ok(())
}
