use sysdoc_core::models::{EntityKind, EntityRef};

use crate::normalize::{endpoint_resource, normalize_endpoint};
use crate::patterns::{RE_ENDPOINT_INLINE, RE_ENDPOINT_LINE_START};

/// Find `METHOD /path` mentions. With `link_resources`, the resource segment
/// of each path is also recorded as a table reference.
pub(crate) fn extract(text: &str, link_resources: bool, out: &mut Vec<EntityRef>) {
    for pattern in [&RE_ENDPOINT_LINE_START, &RE_ENDPOINT_INLINE] {
        let Some(re) = pattern.as_ref() else {
            continue;
        };
        for caps in re.captures_iter(text) {
            let (Some(method), Some(path)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Some(canonical) = normalize_endpoint(method.as_str(), path.as_str()) else {
                continue;
            };
            let raw = &text[method.start()..path.end()];
            out.push(EntityRef::new(EntityKind::ApiEndpoint, canonical.clone(), raw));

            if link_resources {
                let canonical_path = canonical.split_once(' ').map(|(_, p)| p).unwrap_or("");
                if let Some(resource) = endpoint_resource(canonical_path) {
                    out.push(EntityRef::new(EntityKind::TableName, resource, path.as_str()));
                }
            }
        }
    }
}
