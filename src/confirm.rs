/// Two-phase confirmation for a destructive action.
///
/// `{closed} -> request(target) -> {open(target)} -> confirm|cancel -> {closed}`
///
/// The gate only defers the action; it never performs it. `take_confirmed`
/// hands the target back to the caller and returns to closed
/// unconditionally, so the gate is closed even when the caller's action
/// subsequently fails. One pending target at a time; a second `request`
/// replaces the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmationGate<T> {
    target: Option<T>,
}

impl<T> ConfirmationGate<T> {
    pub fn new() -> Self {
        Self { target: None }
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn request(&mut self, target: T) {
        self.target = Some(target);
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Close the gate and yield the pending target, if any.
    pub fn take_confirmed(&mut self) -> Option<T> {
        self.target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_confirm_cycle() {
        let mut gate: ConfirmationGate<String> = ConfirmationGate::new();
        assert!(!gate.is_open());
        assert!(gate.take_confirmed().is_none());

        gate.request("42".to_string());
        assert!(gate.is_open());
        assert_eq!(gate.target().map(String::as_str), Some("42"));

        assert_eq!(gate.take_confirmed().as_deref(), Some("42"));
        assert!(!gate.is_open());
    }

    #[test]
    fn cancel_discards_target() {
        let mut gate = ConfirmationGate::new();
        gate.request(7u32);
        gate.cancel();
        assert!(!gate.is_open());
        assert!(gate.take_confirmed().is_none());
    }

    #[test]
    fn second_request_replaces_first() {
        let mut gate = ConfirmationGate::new();
        gate.request("a");
        gate.request("b");
        assert_eq!(gate.take_confirmed(), Some("b"));
    }
}
