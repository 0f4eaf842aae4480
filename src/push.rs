/// Push notification flag. Registration itself happens in the host; the core only
/// tracks what the host reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushState {
    pub supported: bool,
    pub subscribed: bool,
    pub pending: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushRequest {
    /// Host should run the registration flow.
    Subscribe,
    AlreadySubscribed,
    Unsupported,
    InFlight,
}

impl PushState {
    pub const fn new() -> Self {
        Self {
            supported: false,
            subscribed: false,
            pending: false,
            last_error: None,
        }
    }

    pub fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
    }

    pub fn request(&mut self) -> PushRequest {
        if self.subscribed {
            return PushRequest::AlreadySubscribed;
        }
        if !self.supported {
            self.last_error = Some("Push notifications are not supported in this browser.".into());
            return PushRequest::Unsupported;
        }
        if self.pending {
            return PushRequest::InFlight;
        }
        self.pending = true;
        self.last_error = None;
        PushRequest::Subscribe
    }

    /// Outcome of the host registration. The subscription payload stays opaque.
    pub fn resolve(&mut self, outcome: Result<(), String>) {
        self.pending = false;
        match outcome {
            Ok(()) => {
                self.subscribed = true;
                self.last_error = None;
            }
            Err(err) => {
                log::warn!("push subscription failed: {err}");
                self.subscribed = false;
                self.last_error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_flow_marks_subscribed() {
        let mut push = PushState::new();
        push.set_supported(true);
        assert_eq!(push.request(), PushRequest::Subscribe);
        assert_eq!(push.request(), PushRequest::InFlight);
        push.resolve(Ok(()));
        assert!(push.subscribed);
        assert_eq!(push.request(), PushRequest::AlreadySubscribed);
    }

    #[test]
    fn unsupported_host_records_error() {
        let mut push = PushState::new();
        assert_eq!(push.request(), PushRequest::Unsupported);
        assert!(push.last_error.is_some());
        assert!(!push.pending);
    }

    #[test]
    fn failure_allows_retry() {
        let mut push = PushState::new();
        push.set_supported(true);
        push.request();
        push.resolve(Err("permission denied".into()));
        assert!(!push.subscribed);
        assert_eq!(push.last_error.as_deref(), Some("permission denied"));
        assert_eq!(push.request(), PushRequest::Subscribe);
    }
}
