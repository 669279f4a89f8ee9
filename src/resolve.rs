use anyhow::Result;
use uuid::Uuid;

/// Resources that can be looked up by ID, name, or ID prefix.
pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> Option<&str>;
}

impl<T: Identifiable> Identifiable for &T {
    fn id(&self) -> &str {
        (*self).id()
    }
    fn name(&self) -> Option<&str> {
        (*self).name()
    }
}

/// Resolve a user-provided identifier to a resource ID.
///
/// In order:
/// 1. a full UUID is taken as-is
/// 2. an exact ID or name match
/// 3. a unique ID prefix
pub fn resolve_id<T: Identifiable>(input: &str, items: &[T], entity_name: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow::anyhow!("{entity_name} identifier cannot be empty"));
    }

    if let Ok(parsed) = Uuid::parse_str(input) {
        return Ok(parsed.hyphenated().to_string());
    }

    if let Some(item) = items
        .iter()
        .find(|item| item.id() == input || item.name() == Some(input))
    {
        return Ok(item.id().to_string());
    }

    let matches: Vec<_> = items
        .iter()
        .filter(|item| item.id().starts_with(input))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.id().to_string()),
        [] => Err(anyhow::anyhow!(
            "No {entity_name} found with name or ID '{input}'"
        )),
        many => Err(anyhow::anyhow!(
            "Ambiguous: {} {entity_name}s match prefix '{input}'. Be more specific.",
            many.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str, Option<&'static str>);

    impl Identifiable for Item {
        fn id(&self) -> &str {
            self.0
        }
        fn name(&self) -> Option<&str> {
            self.1
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item("3f2a9c1e-0000-4000-8000-000000000001", Some("web")),
            Item("3f2b0000-0000-4000-8000-000000000002", Some("cache")),
            Item("a1000000-0000-4000-8000-000000000003", None),
        ]
    }

    #[test]
    fn full_uuid_passes_through() {
        let id = "0d9e2b4c-1111-4222-8333-444455556666";
        assert_eq!(resolve_id(id, &items(), "deployment").unwrap(), id);
    }

    #[test]
    fn name_and_prefix() {
        let items = items();
        assert_eq!(
            resolve_id("cache", &items, "deployment").unwrap(),
            "3f2b0000-0000-4000-8000-000000000002"
        );
        assert_eq!(
            resolve_id("a1", &items, "deployment").unwrap(),
            "a1000000-0000-4000-8000-000000000003"
        );
    }

    #[test]
    fn ambiguous_and_missing() {
        let items = items();
        let err = resolve_id("3f2", &items, "deployment").unwrap_err();
        assert!(err.to_string().contains("Ambiguous: 2 deployments"));

        let err = resolve_id("nope", &items, "deployment").unwrap_err();
        assert!(err.to_string().contains("No deployment found"));

        assert!(resolve_id("  ", &items, "deployment").is_err());
    }
}
