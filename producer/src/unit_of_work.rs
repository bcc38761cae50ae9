//! Scoped unit of work over a store session.

use crate::ProducerResult;
use relgraph_store::StoreSession;

/// Begins work on creation and rolls it back on drop unless committed.
pub struct UnitOfWork<'s> {
    session: &'s mut dyn StoreSession,
    committed: bool,
}

impl<'s> UnitOfWork<'s> {
    pub fn begin(session: &'s mut dyn StoreSession) -> ProducerResult<Self> {
        session.begin()?;
        Ok(Self {
            session,
            committed: false,
        })
    }

    /// The session the work runs in.
    pub fn session(&mut self) -> &mut dyn StoreSession {
        &mut *self.session
    }

    pub fn commit(mut self) -> ProducerResult<()> {
        self.session.commit()?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if self.committed || !self.session.is_active() {
            return;
        }
        log::warn!("rolling back unit of work");
        if let Err(e) = self.session.rollback() {
            log::warn!("rollback failed: {}", e);
        }
    }
}
