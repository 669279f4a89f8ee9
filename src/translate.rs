//! Turns raw backend rejection text into something a user can act on.

/// One entry of the rule table. `matches` receives the lowercased raw text.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub message: &'static str,
}

fn any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn app_name(e: &str) -> bool {
    e.contains("app_name")
}

fn storage(e: &str) -> bool {
    any(e, &["persistent_volume_size", "storage"])
}

fn mount_path(e: &str) -> bool {
    any(e, &["persistent_volume_mount_path", "mount"])
}

/// Ordered rule table, first match wins. Within a family the specific rules
/// come before the family's catch-all.
pub static RULES: &[Rule] = &[
    Rule {
        name: "app-name-too-short",
        matches: |e| app_name(e) && e.contains("at least 3 characters"),
        message: "App name must be at least 3 characters long. Use --name to specify one (e.g., --name my-app)",
    },
    Rule {
        name: "app-name-too-long",
        matches: |e| app_name(e) && any(e, &["at most 30 characters", "no more than 30"]),
        message: "App name must be no more than 30 characters long",
    },
    Rule {
        name: "app-name-characters",
        matches: |e| app_name(e) && any(e, &["lowercase", "letters", "hyphens"]),
        message: "App name must contain only lowercase letters, numbers, and hyphens",
    },
    Rule {
        name: "app-name",
        matches: app_name,
        message: "Invalid app name. Use --name to specify one (3-30 chars, lowercase letters/numbers/hyphens only)",
    },
    Rule {
        name: "both-ports",
        matches: |e| any(e, &["both http_port and tcp_port", "both ports"]),
        message: "Cannot specify both --http-port and --tcp-port. Choose one type of port",
    },
    Rule {
        name: "port-range",
        matches: |e| any(e, &["http_port", "tcp_port", "port"]),
        message: "Port must be a valid number between 1 and 65535",
    },
    Rule {
        name: "cpu-format",
        matches: |e| e.contains("cpu") && any(e, &["invalid", "format"]),
        message: "Invalid CPU value. Use format like '100m' or '0.5'",
    },
    Rule {
        name: "memory-format",
        matches: |e| e.contains("memory") && any(e, &["invalid", "format"]),
        message: "Invalid memory value. Use format like '128Mi' or '1Gi'",
    },
    Rule {
        name: "empty-image",
        matches: |e| e.contains("image") && e.contains("at least 1"),
        message: "Image name cannot be empty",
    },
    Rule {
        name: "storage-pairing",
        matches: |e| storage(e) && e.contains("together"),
        message: "When using persistent storage, both --storage-size and --storage-path are required",
    },
    Rule {
        name: "storage-size-format",
        matches: |e| storage(e) && any(e, &["format", "10gi", "500mi"]),
        message: "Storage size must be in format like '1Gi', '500Mi', '10Gi'",
    },
    Rule {
        name: "storage",
        matches: storage,
        message: "Invalid storage configuration. Use --storage-size and --storage-path together",
    },
    Rule {
        name: "mount-path-absolute",
        matches: |e| mount_path(e) && any(e, &["absolute", "starting with"]),
        message: "Storage path must be an absolute path starting with '/' (e.g., '/data', '/var/lib/mysql')",
    },
    Rule {
        name: "mount-path",
        matches: mount_path,
        message: "Invalid storage path. Must be absolute path like '/data' or '/var/lib/mysql'",
    },
    Rule {
        name: "validation",
        matches: |e| any(e, &["422", "validation"]),
        message: "Validation error: Please check your input parameters",
    },
];

/// Returns the rule that classifies `raw`, if any.
pub fn classify(raw: &str) -> Option<&'static Rule> {
    let lower = raw.to_lowercase();
    RULES.iter().find(|rule| (rule.matches)(&lower))
}

/// Friendly rendering of a backend error. Unrecognized text comes back unchanged.
pub fn translate(raw: &str) -> String {
    match classify(raw) {
        Some(rule) => {
            log::debug!("translated backend error via rule '{}'", rule.name);
            rule.message.to_string()
        }
        None => raw.to_string(),
    }
}
