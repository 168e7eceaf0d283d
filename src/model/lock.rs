/// Advisory, non-blocking lock guarding batch operations on one image.
///
/// Acquiring never waits: a held lock makes `try_lock` return false and the
/// caller reports the image as busy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyLock {
    owner: Option<String>,
}

impl BusyLock {
    pub fn try_lock(&mut self, owner: &str) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(owner.to_string());
        true
    }

    /// Releases the lock if `owner` holds it.
    pub fn unlock(&mut self, owner: &str) -> bool {
        if self.owner.as_deref() == Some(owner) {
            self.owner = None;
            return true;
        }
        false
    }

    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}
