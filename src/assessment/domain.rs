use crate::ui::Style;

/// A competency domain scored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Single-letter key used on the wire (`A`..`G`).
    pub key: &'static str,
    /// Human-readable name.
    pub label: &'static str,
}

/// All scored domains, in display order.
pub const DOMAINS: [Domain; 7] = [
    Domain {
        key: "A",
        label: "AI fundamentals",
    },
    Domain {
        key: "B",
        label: "Use case framing",
    },
    Domain {
        key: "C",
        label: "Data safety",
    },
    Domain {
        key: "D",
        label: "Responsible AI",
    },
    Domain {
        key: "E",
        label: "Prompting",
    },
    Domain {
        key: "F",
        label: "Validation",
    },
    Domain {
        key: "G",
        label: "Governance",
    },
];

/// Maturity levels and their labels.
pub const LEVELS: [(i64, &str); 4] = [
    (0, "Unaware / misconceptions"),
    (1, "Aware / basic"),
    (2, "Practicing with checks"),
    (3, "Proficient / sets standards"),
];

/// Returns the label for a maturity level, if it is one of the known levels.
pub fn level_label(level: i64) -> Option<&'static str> {
    LEVELS
        .iter()
        .find(|(value, _)| *value == level)
        .map(|(_, label)| *label)
}

/// Prints the domain and level tables to stdout.
pub fn print_domains() {
    println!("{}", Style::header("Domains"));
    for domain in &DOMAINS {
        println!("  {}  {}", Style::code(domain.key), domain.label);
    }
    println!();
    println!("{}", Style::header("Levels"));
    for (level, label) in &LEVELS {
        println!("  {}  {}", Style::code(level), label);
    }
}
