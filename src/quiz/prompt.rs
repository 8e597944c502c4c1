/// Yes/no confirmation supplied by the host.
///
/// `with_cancel` false means the message is a notice and only "ok" is
/// offered; the return value is then ignored by callers.
pub trait ConfirmPrompt {
    fn ask(&mut self, message: &str, with_cancel: bool) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str, bool) -> bool,
{
    fn ask(&mut self, message: &str, with_cancel: bool) -> bool {
        self(message, with_cancel)
    }
}
