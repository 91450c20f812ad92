use crate::model::Session;

type Observer = Box<dyn FnMut(&Session)>;

pub struct SessionStore {
    current: Session,
    observers: Vec<Observer>,
}

impl SessionStore {
    pub fn new(network_id: &str) -> Self {
        Self {
            current: Session::anonymous(network_id),
            observers: Vec::new(),
        }
    }

    /// Point-in-time snapshot.
    pub fn get(&self) -> Session {
        self.current.clone()
    }

    pub fn set(&mut self, session: Session) {
        if session == self.current {
            return;
        }
        tracing::debug!(
            authenticated = session.authenticated(),
            account_id = session.account_id().map(|a| a.as_str()),
            "session changed"
        );
        self.current = session;
        for observer in &mut self.observers {
            observer(&self.current);
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Session) + 'static) {
        self.observers.push(Box::new(observer));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
