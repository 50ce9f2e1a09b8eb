use rustc_hash::FxHashMap;

use pool4::{Ipv4TransportAddr, Protocol};

use crate::entry::BibEntry;
use crate::error::{Error, Result};
use crate::types::{BibId, Ipv6TransportAddr, SessionId};

/// One protocol's worth of bindings: a single owning arena plus two
/// non-owning hash indices over it.
///
/// The arena is the only place a `BibEntry` actually lives; `by_v6` and
/// `by_v4` just map a lookup key to the `BibId` that owns the matching
/// entry. Keeping them separate (rather than a bidirectional map of the
/// transport addresses themselves) is what lets a `BibEntry` carry a
/// `sessions: Vec<SessionId>` and a stable id for the session table to
/// reference back.
#[derive(Debug, Default)]
pub struct BibTable {
    arena: FxHashMap<BibId, BibEntry>,
    by_v6: FxHashMap<Ipv6TransportAddr, BibId>,
    by_v4: FxHashMap<Ipv4TransportAddr, BibId>,
    next_id: u64,
}

impl BibTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> BibId {
        let id = BibId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts a new binding between `v6` and `v4`. The caller has already
    /// drawn `v4` from pool4 (for dynamic entries) or taken it from static
    /// configuration; this table only tracks the result.
    #[profiling::function]
    pub fn insert(
        &mut self,
        protocol: Protocol,
        v6: Ipv6TransportAddr,
        v4: Ipv4TransportAddr,
        is_static: bool,
    ) -> Result<BibId> {
        if self.by_v6.contains_key(&v6) {
            return Err(Error::AlreadyExists(v6));
        }
        if self.by_v4.contains_key(&v4) {
            return Err(Error::AlreadyExists(v6));
        }

        let id = self.alloc_id();
        let entry = BibEntry::new(id, protocol, v6, v4, is_static);
        self.arena.insert(id, entry);
        self.by_v6.insert(v6, id);
        self.by_v4.insert(v4, id);

        log::debug!("BIB[{protocol}]: bound {v6} <-> {v4} ({id:?})");
        Ok(id)
    }

    /// Removes a binding entirely. Callers are responsible for returning
    /// `entry.v4()` to pool4 and for having already detached any sessions.
    pub fn remove(&mut self, id: BibId) -> Result<BibEntry> {
        let entry = self.arena.remove(&id).ok_or(Error::NotFoundById(id))?;
        self.by_v6.remove(&entry.v6());
        self.by_v4.remove(&entry.v4());
        log::debug!(
            "BIB[{}]: unbound {} <-> {} ({id:?})",
            entry.protocol(),
            entry.v6(),
            entry.v4()
        );
        Ok(entry)
    }

    #[must_use]
    pub fn get(&self, id: BibId) -> Option<&BibEntry> {
        self.arena.get(&id)
    }

    pub fn get_mut(&mut self, id: BibId) -> Option<&mut BibEntry> {
        self.arena.get_mut(&id)
    }

    #[must_use]
    pub fn lookup_by_v6(&self, v6: Ipv6TransportAddr) -> Option<&BibEntry> {
        self.by_v6.get(&v6).and_then(|id| self.arena.get(id))
    }

    #[must_use]
    pub fn lookup_by_v4(&self, v4: Ipv4TransportAddr) -> Option<&BibEntry> {
        self.by_v4.get(&v4).and_then(|id| self.arena.get(id))
    }

    pub fn attach_session(&mut self, id: BibId, session: SessionId) -> Result<()> {
        let entry = self.arena.get_mut(&id).ok_or(Error::NotFoundById(id))?;
        entry.attach_session(session);
        Ok(())
    }

    pub fn detach_session(&mut self, id: BibId, session: SessionId) -> Result<()> {
        let entry = self.arena.get_mut(&id).ok_or(Error::NotFoundById(id))?;
        entry.detach_session(session);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All current entries, for the admin introspection interface.
    pub fn iter(&self) -> impl Iterator<Item = &BibEntry> {
        self.arena.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn v6(port: u16) -> Ipv6TransportAddr {
        Ipv6TransportAddr::new("2001:db8::1".parse::<Ipv6Addr>().unwrap(), port)
    }

    fn v4(port: u16) -> Ipv4TransportAddr {
        Ipv4TransportAddr::new("198.51.100.1".parse::<Ipv4Addr>().unwrap(), port)
    }

    #[test]
    fn insert_is_visible_through_both_indices() {
        let mut table = BibTable::new();
        let id = table.insert(Protocol::Udp, v6(1234), v4(40000), false).unwrap();

        assert_eq!(table.lookup_by_v6(v6(1234)).unwrap().id(), id);
        assert_eq!(table.lookup_by_v4(v4(40000)).unwrap().id(), id);
    }

    #[test]
    fn duplicate_v6_endpoint_is_rejected() {
        let mut table = BibTable::new();
        table.insert(Protocol::Udp, v6(1234), v4(40000), false).unwrap();
        let err = table
            .insert(Protocol::Udp, v6(1234), v4(40001), false)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn duplicate_v4_endpoint_is_rejected() {
        let mut table = BibTable::new();
        table.insert(Protocol::Udp, v6(1234), v4(40000), false).unwrap();
        let err = table
            .insert(Protocol::Udp, v6(5678), v4(40000), false)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        // The by_v6 index must not have picked up a partial insert either.
        assert!(table.lookup_by_v6(v6(5678)).is_none());
    }

    #[test]
    fn remove_drops_both_indices() {
        let mut table = BibTable::new();
        let id = table.insert(Protocol::Udp, v6(1234), v4(40000), false).unwrap();
        table.remove(id).unwrap();

        assert!(table.lookup_by_v6(v6(1234)).is_none());
        assert!(table.lookup_by_v4(v4(40000)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn session_attach_and_detach_are_idempotent() {
        let mut table = BibTable::new();
        let id = table.insert(Protocol::Udp, v6(1234), v4(40000), false).unwrap();

        table.attach_session(id, SessionId(1)).unwrap();
        table.attach_session(id, SessionId(1)).unwrap();
        assert_eq!(table.get(id).unwrap().sessions(), &[SessionId(1)]);

        table.detach_session(id, SessionId(1)).unwrap();
        assert!(!table.get(id).unwrap().has_sessions());
    }

    #[test]
    fn remove_of_unknown_id_is_not_found() {
        let mut table = BibTable::new();
        let err = table.remove(BibId(999)).unwrap_err();
        assert!(matches!(err, Error::NotFoundById(_)));
    }
}
