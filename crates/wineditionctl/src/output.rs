//! Text rendering for classification reports and rule tables

use winedition::rules::Discriminator;
use winedition::{Classification, RuleTable, ServerRole};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn join_roles(roles: &[ServerRole]) -> String {
    if roles.is_empty() {
        "none".to_string()
    } else {
        roles
            .iter()
            .map(ServerRole::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Multi-line report for `classify`
pub fn format_classification(report: &Classification) -> String {
    let snapshot = &report.snapshot;
    let sku = match report.sku_name {
        Some(name) => format!("{:#010x} {}", snapshot.sku(), name),
        None => format!("{:#010x}", snapshot.sku()),
    };
    let also = if report.matching_editions.is_empty() {
        "none".to_string()
    } else {
        report.matching_editions.join(", ")
    };

    let mut lines = vec![
        report.summary(),
        format!("  Product type:      {}", report.product_type),
        format!("  Suite mask:        {:#06x}", snapshot.suite_mask().bits()),
        format!("  SKU:               {}", sku),
        format!("  Server roles:      {}", join_roles(&report.server_roles)),
        format!("  Matching editions: {}", also),
        format!(
            "  Creators Update+:  {}",
            yes_no(report.windows10_creators_or_later)
        ),
    ];
    if report.marketing_name.is_none() {
        lines.push("  (version not in rule table)".to_string());
    }
    lines.join("\n")
}

pub fn describe_discriminator(discriminator: &Discriminator) -> String {
    match discriminator {
        Discriminator::Workstation => "workstation".to_string(),
        Discriminator::NotWorkstation => "not workstation".to_string(),
        Discriminator::BuildAtLeast { build } => format!("build >= {}", build),
        Discriminator::BuildAtMost { build } => format!("build <= {}", build),
        Discriminator::SuiteAny { mask } => format!("suite & {:#06x}", mask.bits()),
        Discriminator::SystemMetric { metric, nonzero } => {
            format!("metric {} {}", metric, if *nonzero { "!= 0" } else { "== 0" })
        }
        Discriminator::All { of } => of
            .iter()
            .map(describe_discriminator)
            .collect::<Vec<_>>()
            .join(" & "),
    }
}

/// One line per rule, in evaluation order
pub fn format_rules(table: &RuleTable) -> String {
    table
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let condition = rule
                .discriminator
                .as_ref()
                .map(describe_discriminator)
                .unwrap_or_else(|| "always".to_string());
            format!(
                "{:>2}. {:<24} {}.{:<3} {}",
                i + 1,
                rule.name,
                rule.major,
                rule.minor,
                condition
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use winedition::{
        EditionClassifier, ExtendedVersionInfo, ProductType, VersionSnapshot, VersionTriple,
    };

    #[test]
    fn test_describe_composite() {
        let d = Discriminator::all([
            Discriminator::NotWorkstation,
            Discriminator::BuildAtLeast { build: 20348 },
        ]);
        assert_eq!(describe_discriminator(&d), "not workstation & build >= 20348");
    }

    #[test]
    fn test_rules_listing_order() {
        let listing = format_rules(&RuleTable::builtin());
        let first = listing.lines().next().unwrap();
        assert!(first.contains("Windows Server 2022"));
        assert!(first.contains("build >= 20348"));
        let last = listing.lines().last().unwrap();
        assert!(last.contains("Windows 2000"));
        assert!(last.contains("always"));
    }

    #[test]
    fn test_classification_text() {
        let snap = VersionSnapshot::new(
            VersionTriple::new(10, 0, 20348),
            ExtendedVersionInfo::new(ProductType::OtherServer),
            0x0C,
        );
        let text = format_classification(&EditionClassifier::new().classify(snap));
        assert!(text.starts_with("Windows Server 2022 (10.0.20348)"));
        assert!(text.contains("core, datacenter"));
        assert!(text.contains("PRODUCT_DATACENTER_SERVER_CORE"));
        assert!(text.contains("Windows Server 2022, Windows Server 2019"));
    }
}
