use clap::Parser;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length, Task, Theme};

mod api;
mod screens;
mod session;
mod state;
mod ui;

use api::types::User;
use api::Api;
use screens::{books, home, login, transactions};
use session::Session;

/// Native desktop client for the LMS library management API
#[derive(Parser, Debug)]
#[command(name = "lms-desk", version, about)]
struct Args {
    /// Base address of the LMS API
    #[arg(long, env = "LMS_API_URL", default_value = api::LOCAL_API)]
    api_url: String,
}

/// Top-level application state: the API client, and whichever screen the
/// user is on. The session is an explicit value; it is loaded once at
/// startup, written on login, and cleared on logout or expiry.
struct App {
    api: Api,
    screen: Screen,
}

enum Screen {
    Login(login::Login),
    Dashboard(Dashboard),
}

struct Dashboard {
    user: User,
    page: Page,
}

enum Page {
    Home(home::Home),
    Books(books::Books),
    Transactions(transactions::Transactions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Home,
    Books,
    Transactions,
}

impl Nav {
    const ALL: [Nav; 3] = [Nav::Home, Nav::Books, Nav::Transactions];

    fn label(self) -> &'static str {
        match self {
            Nav::Home => "Dashboard",
            Nav::Books => "Books",
            Nav::Transactions => "Transactions",
        }
    }
}

impl Dashboard {
    fn nav(&self) -> Nav {
        match self.page {
            Page::Home(_) => Nav::Home,
            Page::Books(_) => Nav::Books,
            Page::Transactions(_) => Nav::Transactions,
        }
    }
}

#[derive(Debug, Clone)]
enum Message {
    Login(login::Message),
    Home(home::Message),
    Books(books::Message),
    Transactions(transactions::Message),
    NavSelected(Nav),
    LogoutPressed,
    LoggedOut,
}

impl App {
    fn new(api_url: String) -> (Self, Task<Message>) {
        let session = Session::load();
        let api = Api::new(api_url).with_token(session.as_ref().map(|s| s.token.clone()));

        match session {
            Some(session) => {
                log::info!("resuming session for {}", session.user.username);
                let (page, task) = home::Home::new(&api);
                let app = App {
                    api,
                    screen: Screen::Dashboard(Dashboard {
                        user: session.user,
                        page: Page::Home(page),
                    }),
                };
                (app, task.map(Message::Home))
            }
            None => (
                App {
                    api,
                    screen: Screen::Login(login::Login::default()),
                },
                Task::none(),
            ),
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Login(message) => {
                let Screen::Login(screen) = &mut self.screen else {
                    return Task::none();
                };
                match screen.update(message, &self.api) {
                    login::Action::None => Task::none(),
                    login::Action::Run(task) => task.map(Message::Login),
                    login::Action::LoggedIn(session) => {
                        session.save();
                        self.api.set_token(Some(session.token.clone()));
                        let (page, task) = home::Home::new(&self.api);
                        self.screen = Screen::Dashboard(Dashboard {
                            user: session.user,
                            page: Page::Home(page),
                        });
                        task.map(Message::Home)
                    }
                }
            }
            Message::Home(message) => {
                let Screen::Dashboard(dashboard) = &mut self.screen else {
                    return Task::none();
                };
                let Page::Home(screen) = &mut dashboard.page else {
                    return Task::none();
                };
                match screen.update(message, &self.api) {
                    screens::Action::None => Task::none(),
                    screens::Action::Run(task) => task.map(Message::Home),
                    screens::Action::SessionExpired => self.expire_session(),
                }
            }
            Message::Books(message) => {
                let Screen::Dashboard(dashboard) = &mut self.screen else {
                    return Task::none();
                };
                let Page::Books(screen) = &mut dashboard.page else {
                    return Task::none();
                };
                match screen.update(message, &self.api) {
                    screens::Action::None => Task::none(),
                    screens::Action::Run(task) => task.map(Message::Books),
                    screens::Action::SessionExpired => self.expire_session(),
                }
            }
            Message::Transactions(message) => {
                let Screen::Dashboard(dashboard) = &mut self.screen else {
                    return Task::none();
                };
                let Page::Transactions(screen) = &mut dashboard.page else {
                    return Task::none();
                };
                match screen.update(message, &self.api) {
                    screens::Action::None => Task::none(),
                    screens::Action::Run(task) => task.map(Message::Transactions),
                    screens::Action::SessionExpired => self.expire_session(),
                }
            }
            Message::NavSelected(nav) => {
                let Screen::Dashboard(dashboard) = &mut self.screen else {
                    return Task::none();
                };
                if dashboard.nav() == nav {
                    return Task::none();
                }
                // Switching tabs rebuilds the screen and refetches its data.
                match nav {
                    Nav::Home => {
                        let (page, task) = home::Home::new(&self.api);
                        dashboard.page = Page::Home(page);
                        task.map(Message::Home)
                    }
                    Nav::Books => {
                        let (page, task) = books::Books::new(&self.api);
                        dashboard.page = Page::Books(page);
                        task.map(Message::Books)
                    }
                    Nav::Transactions => {
                        let (page, task) = transactions::Transactions::new(&self.api);
                        dashboard.page = Page::Transactions(page);
                        task.map(Message::Transactions)
                    }
                }
            }
            Message::LogoutPressed => {
                // Best-effort server-side invalidation; the local session is
                // torn down regardless of the outcome.
                let api = self.api.clone();
                Session::clear();
                self.api.set_token(None);
                self.screen = Screen::Login(login::Login::default());
                Task::perform(async move { api.logout().await }, |_| Message::LoggedOut)
            }
            Message::LoggedOut => Task::none(),
        }
    }

    fn expire_session(&mut self) -> Task<Message> {
        log::info!("session expired; returning to login");
        Session::clear();
        self.api.set_token(None);
        self.screen = Screen::Login(login::Login::with_notice(
            "Your session has expired. Please sign in again.",
        ));
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        match &self.screen {
            Screen::Login(screen) => screen.view().map(Message::Login),
            Screen::Dashboard(dashboard) => {
                let content = match &dashboard.page {
                    Page::Home(screen) => screen.view().map(Message::Home),
                    Page::Books(screen) => screen.view().map(Message::Books),
                    Page::Transactions(screen) => screen.view().map(Message::Transactions),
                };
                row![self.sidebar(dashboard), content]
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
        }
    }

    fn sidebar<'a>(&'a self, dashboard: &'a Dashboard) -> Element<'a, Message> {
        let mut nav = column![
            text("Library System").size(18),
            text(format!("Welcome, {}", dashboard.user.username))
                .size(13)
                .style(text::secondary),
        ]
        .spacing(6);

        nav = nav.push(Space::with_height(16));
        for item in Nav::ALL {
            let style = if dashboard.nav() == item {
                button::primary
            } else {
                button::text
            };
            nav = nav.push(
                button(text(item.label()).size(14))
                    .style(style)
                    .width(Length::Fill)
                    .padding([8.0, 12.0])
                    .on_press(Message::NavSelected(item)),
            );
        }

        nav = nav.push(Space::with_height(Length::Fill));
        nav = nav.push(
            button(text("Logout").size(14))
                .style(button::secondary)
                .width(Length::Fill)
                .padding([8.0, 12.0])
                .on_press(Message::LogoutPressed),
        );

        container(nav.align_x(Alignment::Start))
            .padding(16)
            .width(220)
            .height(Length::Fill)
            .style(container::bordered_box)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    env_logger::init();
    let args = Args::parse();
    log::info!("using API at {}", args.api_url);

    iced::application("Library Management System", App::update, App::view)
        .theme(App::theme)
        .window_size((1200.0, 780.0))
        .centered()
        .run_with(move || App::new(args.api_url))
}
