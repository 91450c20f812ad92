use std::cell::RefCell;

use url::Url;

pub trait Navigator {
    /// Full navigation away; nothing after this call runs in the same load.
    fn navigate(&self, url: &Url);

    /// Rewrites the current location without navigating.
    fn replace_url(&self, url: &Url);
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    navigations: RefCell<Vec<Url>>,
    current: RefCell<Option<Url>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<Url> {
        self.navigations.borrow().clone()
    }

    pub fn last_navigation(&self) -> Option<Url> {
        self.navigations.borrow().last().cloned()
    }

    pub fn current_url(&self) -> Option<Url> {
        self.current.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) {
        self.navigations.borrow_mut().push(url.clone());
    }

    fn replace_url(&self, url: &Url) {
        *self.current.borrow_mut() = Some(url.clone());
    }
}
