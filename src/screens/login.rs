/// Login screen: exchanges credentials for a session token.
use iced::widget::{button, center, column, container, text, text_input};
use iced::{Alignment, Element, Length, Task};

use crate::api::types::User;
use crate::api::{Api, ApiError};
use crate::session::Session;
use crate::ui;

#[derive(Debug, Default)]
pub struct Login {
    username: String,
    password: String,
    busy: bool,
    error: Option<String>,
    /// Shown when the user lands here because a session expired.
    notice: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    UsernameChanged(String),
    PasswordChanged(String),
    Submitted,
    Finished(Result<(String, User), ApiError>),
}

pub enum Action {
    None,
    Run(Task<Message>),
    LoggedIn(Session),
}

impl Login {
    pub fn with_notice(notice: impl Into<String>) -> Self {
        Login {
            notice: Some(notice.into()),
            ..Login::default()
        }
    }

    pub fn update(&mut self, message: Message, api: &Api) -> Action {
        match message {
            Message::UsernameChanged(value) => {
                self.username = value;
                Action::None
            }
            Message::PasswordChanged(value) => {
                self.password = value;
                Action::None
            }
            Message::Submitted => {
                if self.busy || self.username.is_empty() || self.password.is_empty() {
                    return Action::None;
                }
                self.busy = true;
                self.error = None;
                self.notice = None;
                let api = api.clone();
                let username = self.username.clone();
                let password = self.password.clone();
                Action::Run(Task::perform(
                    async move { api.login(&username, &password).await },
                    Message::Finished,
                ))
            }
            Message::Finished(Ok((token, user))) => {
                self.busy = false;
                log::info!("signed in as {}", user.username);
                Action::LoggedIn(Session { token, user })
            }
            Message::Finished(Err(err)) => {
                self.busy = false;
                self.error = Some(err.user_message());
                Action::None
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut content = column![
            text("Library Management System").size(24),
            text("Sign in to manage your library").size(14).style(text::secondary),
        ]
        .spacing(8)
        .align_x(Alignment::Center);

        if let Some(notice) = &self.notice {
            content = content.push(ui::notice_banner(notice));
        }
        if let Some(error) = &self.error {
            content = content.push(ui::error_banner(error));
        }

        let submit_label = if self.busy { "Signing In..." } else { "Sign In" };

        content = content
            .push(ui::field(
                "Username",
                text_input("Enter your username", &self.username)
                    .on_input(Message::UsernameChanged)
                    .padding(10),
            ))
            .push(ui::field(
                "Password",
                text_input("Enter your password", &self.password)
                    .secure(true)
                    .on_input(Message::PasswordChanged)
                    .on_submit(Message::Submitted)
                    .padding(10),
            ))
            .push(
                button(text(submit_label).size(16))
                    .width(Length::Fill)
                    .padding(10)
                    .on_press_maybe((!self.busy).then_some(Message::Submitted)),
            );

        let card = container(content.spacing(16))
            .padding(32)
            .width(380)
            .style(container::rounded_box);

        center(card).into()
    }
}
