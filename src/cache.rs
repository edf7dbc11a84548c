/*!
The process-global cache of loaded time zones.

Zones are immutable and expensive enough to build (a file read plus a
parse) that every lookup path goes through here. The cache has two tiers:

* A weak map from key to zone. An entry lives exactly as long as somebody
  outside the cache still holds the zone; it costs nothing to keep and
  guarantees that concurrent users of one key share one instance.
* A bounded strong queue (default capacity 8) of the most recently used
  zones. This is what keeps a zone alive across the common pattern of
  repeatedly constructing and dropping handles to the same few keys,
  where the weak tier alone would re-read the file every time. When the
  queue is full the oldest entry is dropped; a hit moves its entry to the
  back.

One mutex guards both tiers, and every critical section is a handful of
map operations. File I/O happens with the lock released; when two threads
race to load one key, the loser drops its freshly parsed zone and adopts
the winner's.
*/

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, OnceLock, Weak},
};

use crate::{error::Error, timezone::ZoneInner};

/// The default capacity of the strong tier.
pub(crate) const DEFAULT_STRONG_CAPACITY: usize = 8;

struct Cache {
    weak: HashMap<String, Weak<ZoneInner>>,
    strong: VecDeque<Arc<ZoneInner>>,
    capacity: usize,
}

impl Cache {
    /// Moves the given zone to the most-recently-used end of the strong
    /// queue, evicting from the front when over capacity.
    fn promote(&mut self, zone: &Arc<ZoneInner>) {
        if let Some(pos) =
            self.strong.iter().position(|entry| Arc::ptr_eq(entry, zone))
        {
            let _ = self.strong.remove(pos);
        }
        self.strong.push_back(Arc::clone(zone));
        while self.strong.len() > self.capacity {
            self.strong.pop_front();
        }
    }

    /// Drops weak entries whose zones are gone.
    fn sweep(&mut self) {
        self.weak.retain(|_, weak| weak.strong_count() > 0);
    }

    fn lookup(&self, key: &str) -> Option<Arc<ZoneInner>> {
        self.weak.get(key).and_then(Weak::upgrade)
    }
}

fn cache() -> &'static Mutex<Cache> {
    static CACHE: OnceLock<Mutex<Cache>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(Cache {
            weak: HashMap::new(),
            strong: VecDeque::new(),
            capacity: DEFAULT_STRONG_CAPACITY,
        })
    })
}

/// Returns the cached zone for `key`, loading it when absent.
///
/// Get-or-construct is atomic per key: a second caller for the same key
/// gets the same instance without a double parse, no matter how the calls
/// interleave.
pub(crate) fn get(key: &str) -> Result<Arc<ZoneInner>, Error> {
    {
        let mut cache = cache().lock().unwrap();
        if let Some(zone) = cache.lookup(key) {
            cache.promote(&zone);
            return Ok(zone);
        }
    }
    // Miss. Do the file I/O with the lock released.
    let fresh = Arc::new(ZoneInner::load(key, true)?);
    let mut cache = cache().lock().unwrap();
    if let Some(winner) = cache.lookup(key) {
        // Somebody else loaded the same key while we were reading the
        // file. Drop ours and take theirs, preserving the one-instance
        // guarantee.
        cache.promote(&winner);
        return Ok(winner);
    }
    cache.sweep();
    cache.weak.insert(key.to_string(), Arc::downgrade(&fresh));
    cache.promote(&fresh);
    Ok(fresh)
}

/// Empties both tiers.
pub(crate) fn clear() {
    let mut cache = cache().lock().unwrap();
    cache.weak.clear();
    cache.strong.clear();
}

/// Removes only the named keys from both tiers.
pub(crate) fn clear_only(keys: &[&str]) {
    let mut cache = cache().lock().unwrap();
    for &key in keys {
        if let Some(weak) = cache.weak.remove(key) {
            if let Some(zone) = weak.upgrade() {
                if let Some(pos) = cache
                    .strong
                    .iter()
                    .position(|entry| Arc::ptr_eq(entry, &zone))
                {
                    let _ = cache.strong.remove(pos);
                }
            }
        }
    }
}

/// Sets the capacity of the strong tier, evicting immediately when the
/// new capacity is smaller than the current occupancy.
pub(crate) fn set_capacity(capacity: usize) {
    let mut cache = cache().lock().unwrap();
    cache.capacity = capacity;
    while cache.strong.len() > capacity {
        cache.strong.pop_front();
    }
}
