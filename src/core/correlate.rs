//! Match edited documents back to the documents they were decrypted from.
//!
//! The only stable identity a document has is its namespace and name, so
//! unnamed documents never match. A document with no match is new: it has
//! no baseline and every value in it gets sealed fresh.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::manifest::{Manifest, Object};

/// Copy key ids and baselines from `original` into matching objects of
/// `edited`. Returns the number of objects matched.
pub fn correlate(edited: &mut Manifest, original: &Manifest) -> usize {
    let mut by_identity: HashMap<(&str, &str), &Object> = HashMap::new();
    for obj in original.secrets() {
        let Some(id) = identity(obj) else { continue };
        if by_identity.insert(id, obj).is_some() {
            warn!(object = %obj.display_name(), "duplicate document in original manifest, using the last one");
        }
    }

    let mut matched = 0;
    for obj in edited.objects_mut().iter_mut().filter(|o| !o.is_foreign()) {
        let Some(previous) = identity(obj).and_then(|id| by_identity.get(&id).copied()) else {
            debug!(object = %obj.display_name(), "no original document, treating as new");
            continue;
        };
        obj.key_id = previous.key_id.clone();
        obj.baseline = previous.baseline.clone();
        matched += 1;
    }

    debug!(matched, "correlated manifests");
    matched
}

fn identity(obj: &Object) -> Option<(&str, &str)> {
    let meta = obj.meta();
    (!meta.name.is_empty()).then_some((meta.namespace.as_str(), meta.name.as_str()))
}
