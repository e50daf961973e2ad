use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Action {
    /// Open the login dialog, or refresh when already logged in.
    LoginOrRefresh,
    SubmitLogin,
    Logout,
    OpenSettings,
    SubmitSettings,
    Refresh,
    ToggleDay,
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
