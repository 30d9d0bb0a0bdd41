use std::path::Path;
use triage_core::HandlerCapabilityProfile;

fn describe(profile: &HandlerCapabilityProfile) -> String {
    let coordination: Vec<&str> = profile.coordination.iter().map(|c| c.as_str()).collect();
    format!(
        "{:<28} {:<10} domains: {}  coordination: {}",
        profile.name,
        format!("{:?}", profile.performance).to_lowercase(),
        profile.domains.join(","),
        coordination.join(",")
    )
}

pub fn run(profiles: Option<&Path>) -> anyhow::Result<()> {
    let registry = super::load_registry(profiles)?;
    for profile in registry.profiles() {
        println!("{}", describe(profile));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::CapabilityRegistry;

    #[test]
    fn test_describe_profile() {
        let registry = CapabilityRegistry::builtin();
        let line = describe(registry.get("security-auditor").unwrap());
        assert!(line.starts_with("security-auditor"));
        assert!(line.contains("medium"));
        assert!(line.contains("domains: security"));
        assert!(line.contains("single,sequential,hybrid"));
    }
}
