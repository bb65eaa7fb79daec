//! Show the variables a plan produces.

use anyhow::Result;
use colored::Colorize;
use filler_secrets::GenerationPlan;
use filler_types::RequestKind;
use std::path::Path;

pub fn execute(path: Option<&Path>, check: bool) -> Result<()> {
    let plan = super::load_plan(path)?;
    plan.validate()?;

    if check {
        println!(
            "{} Plan is valid ({} variables)",
            "✓".green().bold(),
            plan.expected_len()
        );
        return Ok(());
    }

    for (kind, names) in group_by_kind(&plan) {
        println!("{} ({})", kind.to_string().bold(), names.len());
        for name in names {
            println!("  {}", name.cyan());
        }
    }

    if !plan.parameters.is_empty() {
        println!("\n{} {}", "Parameters:".bold(), plan.parameters.join(", "));
    }
    println!("{} {}", "Total:".bold(), plan.expected_len());

    Ok(())
}

/// Output names grouped by category, in run order.
fn group_by_kind(plan: &GenerationPlan) -> Vec<(RequestKind, Vec<String>)> {
    let mut groups: Vec<(RequestKind, Vec<String>)> = Vec::new();

    for (kind, name) in plan.output_names() {
        match groups.last_mut() {
            Some((last, names)) if *last == kind => names.push(name),
            _ => groups.push((kind, vec![name])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_kind() {
        let plan = GenerationPlan::from_yaml(
            "passwords: [a, b]\nkey_pairs:\n  - private_key: k\n    public_key: p\nderived:\n  d: \"${a}\"\n",
        )
        .unwrap();

        let groups = group_by_kind(&plan);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], (RequestKind::Password, vec!["a".to_string(), "b".to_string()]));
        assert_eq!(groups[1].1, vec!["k".to_string(), "p".to_string()]);
        assert_eq!(groups[2].0, RequestKind::Derived);
    }

    #[test]
    fn test_check_bundled_plan() {
        assert!(execute(None, true).is_ok());
    }

    #[test]
    fn test_invalid_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yml");
        std::fs::write(&path, "passwords: [a, a]\n").unwrap();
        assert!(execute(Some(&path), true).is_err());
    }
}
