/// One module per screen. Each screen owns its state and messages and
/// exposes `update` returning an [`Action`] for the top-level application.
pub mod books;
pub mod home;
pub mod login;
pub mod transactions;

use iced::Task;

/// What a screen asks of the application after handling a message.
pub enum Action<M> {
    None,
    Run(Task<M>),
    /// A request came back 401; the session must be torn down and the user
    /// returned to the login screen.
    SessionExpired,
}
