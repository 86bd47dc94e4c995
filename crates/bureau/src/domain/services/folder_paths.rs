//! Folder path derivation and cycle detection
//!
//! Paths are `/`-joined folder names from the root, e.g. `Contracts/2026`.

use std::collections::HashMap;

use uuid::Uuid;

pub const PATH_SEPARATOR: char = '/';

/// Path of a folder named `name` placed under `parent_path`
pub fn join_path(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        Some(parent) if !parent.is_empty() => format!("{parent}{PATH_SEPARATOR}{name}"),
        _ => name.to_string(),
    }
}

/// Replace the last segment of `path` with `name`
pub fn rename_leaf(path: &str, name: &str) -> String {
    match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, _)) => join_path(Some(parent), name),
        None => name.to_string(),
    }
}

/// Rewrite a descendant path after its ancestor moved from `old_prefix` to `new_prefix`
///
/// Returns `None` when `path` does not live under `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(old_prefix)?;
    if rest.is_empty() {
        return Some(new_prefix.to_string());
    }
    let rest = rest.strip_prefix(PATH_SEPARATOR)?;
    Some(join_path(Some(new_prefix), rest))
}

/// Whether re-parenting `moving` under `new_parent` would make it its own ancestor
///
/// `parents` maps every known folder id to its parent id.
pub fn would_create_cycle(
    moving: Uuid,
    new_parent: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> bool {
    let mut cursor = Some(new_parent);
    let mut steps = 0usize;
    while let Some(current) = cursor {
        if current == moving {
            return true;
        }
        // A corrupted map could itself contain a loop; never walk more than every node once
        steps += 1;
        if steps > parents.len() {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_rename() {
        assert_eq!(join_path(None, "Contracts"), "Contracts");
        assert_eq!(join_path(Some("Contracts"), "2026"), "Contracts/2026");
        assert_eq!(rename_leaf("Contracts/2026", "2027"), "Contracts/2027");
        assert_eq!(rename_leaf("Contracts", "Archive"), "Archive");
    }

    #[test]
    fn test_rebase_only_rewrites_descendants() {
        assert_eq!(
            rebase("Contracts/2026/Q1", "Contracts", "Contracts-Archive"),
            Some("Contracts-Archive/2026/Q1".to_string())
        );
        assert_eq!(rebase("Contracts", "Contracts", "Legal"), Some("Legal".to_string()));
        // Sibling sharing a name prefix is not a descendant
        assert_eq!(rebase("Contracts-Old/x", "Contracts", "Legal"), None);
    }

    #[test]
    fn test_cycle_detection() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        let parents = HashMap::from([(a, None), (b, Some(a)), (c, Some(b))]);

        assert!(would_create_cycle(a, c, &parents));
        assert!(would_create_cycle(a, a, &parents));
        assert!(!would_create_cycle(c, a, &parents));
    }
}
