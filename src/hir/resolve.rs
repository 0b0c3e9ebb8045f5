//! Address resolution against the metadata map.
//!
//! Recorded addresses are not always metadata keys. A dotted reference is
//! kept raw (`orders.total`, `user_id.name`) and a property declaration is
//! recorded under its written path (`local.user_id.name`) while the model
//! stores it under its short name (`local.name`).

use super::metadata::{MetadataMap, SymbolMetadata};
use crate::semantic::DEFAULT_NAMESPACE;

/// Resolve a recorded address to its metadata. First match wins:
///
/// 1. the address as a key;
/// 2. nothing, if it has a single segment;
/// 3. split into namespace and path: the first segment if it is a known
///    namespace, otherwise `local` and the whole address;
/// 4. `{namespace}.{path}`;
/// 5. for paths with two or more segments, `{namespace}.{last}` and then
///    the compound `{namespace}.{path}` (for names like `key.count`).
///
/// Step 5 does not consider which parent a property belongs to, so two
/// parents declaring the same property name resolve to the same entry.
pub fn resolve<'m>(address: &str, metadata: &'m MetadataMap) -> Option<&'m SymbolMetadata> {
    if let Some(found) = metadata.get(address) {
        return Some(found);
    }

    let parts: Vec<&str> = address.split('.').collect();
    if parts.len() < 2 {
        return None;
    }

    let first = parts[0];
    let prefix = format!("{first}.");
    let (namespace, path) = if metadata.keys().any(|k| k.starts_with(&prefix)) {
        (first, &address[prefix.len()..])
    } else {
        (DEFAULT_NAMESPACE, address)
    };

    let qualified = format!("{namespace}.{path}");
    if let Some(found) = metadata.get(&qualified) {
        return Some(found);
    }

    if path.contains('.') {
        let last = path.rsplit('.').next().unwrap_or(path);
        if let Some(found) = metadata.get(&format!("{namespace}.{last}")) {
            return Some(found);
        }
        // Compound auto-derived names such as `user_id.count`
        if let Some(found) = metadata.get(&qualified) {
            return Some(found);
        }
    }
    None
}

/// Canonical address for a recorded address, if it resolves.
pub fn resolve_address(address: &str, metadata: &MetadataMap) -> Option<String> {
    resolve(address, metadata).map(|m| m.canonical_address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::metadata::Role;
    use rstest::rstest;

    fn metadata(addresses: &[&str]) -> MetadataMap {
        addresses
            .iter()
            .map(|address| {
                let (namespace, name) = address.split_once('.').unwrap();
                (
                    address.to_string(),
                    SymbolMetadata::new(name, *address, "int", Role::Key, namespace),
                )
            })
            .collect()
    }

    #[rstest]
    #[case("local.user_id", Some("local.user_id"))]
    #[case("user_id", None)]
    #[case("orders.total", Some("orders.total"))]
    #[case("local.user_id.name", Some("local.name"))]
    #[case("user_id.name", Some("local.name"))]
    #[case("orders.customer.total", Some("orders.total"))]
    #[case("local.user_id.count", Some("local.user_id.count"))]
    #[case("local.missing", None)]
    fn test_resolution_order(#[case] address: &str, #[case] expected: Option<&str>) {
        let map = metadata(&[
            "local.user_id",
            "local.name",
            "local.user_id.count",
            "orders.total",
        ]);
        assert_eq!(
            resolve(address, &map).map(|m| m.canonical_address.as_str()),
            expected
        );
    }

    #[test]
    fn test_unknown_namespace_falls_back_to_local() {
        let map = metadata(&["local.revenue"]);
        assert_eq!(
            resolve_address("sales.revenue", &map).as_deref(),
            Some("local.revenue")
        );
    }
}
