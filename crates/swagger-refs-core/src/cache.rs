//! Per-pass memoization of external documents and merged definitions.
//!
//! One [`ResolverCache`] belongs to one resolution pass over one root
//! document. It guarantees that each external location is fetched and parsed
//! at most once (failures included) and remembers which local name every
//! merged `(location, fragment)` pair received.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde_json::Value;
use url::Url;

use crate::document::load_value;
use crate::error::ResolveError;
use crate::fetch::Fetch;
use crate::ref_utils::TargetKey;

pub struct ResolverCache<'f> {
    fetcher: &'f dyn Fetch,
    root: Url,
    documents: HashMap<String, Result<Value, ResolveError>>,
    local_names: HashMap<TargetKey, String>,
    in_progress: HashSet<TargetKey>,
    reserved: HashSet<String>,
    fetches: usize,
}

impl<'f> ResolverCache<'f> {
    /// `root` is the location of the document being resolved; references
    /// back into it are never fetched.
    pub fn new(fetcher: &'f dyn Fetch, root: Url) -> Self {
        Self {
            fetcher,
            root,
            documents: HashMap::new(),
            local_names: HashMap::new(),
            in_progress: HashSet::new(),
            reserved: HashSet::new(),
            fetches: 0,
        }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The parsed document at `location`, fetching it on first use.
    ///
    /// A failed fetch or parse is cached too and replayed on later calls.
    pub fn get_or_load(&mut self, location: &Url) -> Result<&Value, ResolveError> {
        let fetcher = self.fetcher;
        let fetches = &mut self.fetches;
        let loaded = match self.documents.entry(location.to_string()) {
            Entry::Occupied(entry) => {
                tracing::trace!(%location, "external document cache hit");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                *fetches += 1;
                entry.insert(load(fetcher, location))
            }
        };
        loaded.as_ref().map_err(Clone::clone)
    }

    /// Local name already assigned to an external fragment.
    pub fn local_name(&self, key: &TargetKey) -> Option<&str> {
        self.local_names.get(key).map(String::as_str)
    }

    /// Remember (and reserve) the local name of an external fragment.
    pub fn record_local_name(&mut self, key: TargetKey, local_name: String) {
        self.reserved.insert(local_name.clone());
        self.local_names.insert(key, local_name);
    }

    /// Mark a fragment as being merged. Returns `false` if it already is,
    /// i.e. the request is re-entrant.
    pub fn mark_in_progress(&mut self, key: &TargetKey) -> bool {
        self.in_progress.insert(key.clone())
    }

    /// Clear the in-progress mark, on success or failure.
    pub fn finish(&mut self, key: &TargetKey) {
        self.in_progress.remove(key);
    }

    /// Whether `name` was handed out to an external fragment.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Number of fetch attempts made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }
}

fn load(fetcher: &dyn Fetch, location: &Url) -> Result<Value, ResolveError> {
    tracing::debug!(%location, "fetching external document");
    let bytes = fetcher
        .fetch(location)
        .map_err(|e| ResolveError::Fetch {
            location: location.to_string(),
            message: e.to_string(),
        })?;
    load_value(&bytes).map_err(|e| ResolveError::Parse {
        location: location.to_string(),
        message: e.to_string(),
    })
}
