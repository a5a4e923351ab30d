/// Books screen: paginated catalog list with search, category filter, a
/// modal create/edit dialog (multipart, optional cover image) and archive.
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{
    button, column, container, horizontal_rule, pick_list, row, scrollable, text, text_input, Space,
};
use iced::{Alignment, Element, Length, Task};

use crate::api::types::{Book, BookStatus, CategoryOption, Page};
use crate::api::{Api, ApiError, BookPayload};
use crate::screens::Action;
use crate::state::form::{date_input, Confirm, FormState, Outcome};
use crate::state::list::{Applied, ListState, SEARCH_SETTLE_MS};
use crate::ui;

/// Category filter choice; `All` is the sentinel that omits the filter.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryChoice {
    All,
    One(CategoryOption),
}

impl fmt::Display for CategoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryChoice::All => f.write_str("All categories"),
            CategoryChoice::One(option) => f.write_str(&option.category_name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub category: Option<CategoryOption>,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date_published: String,
    pub book_link: String,
    pub status: BookStatus,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Books {
    list: ListState<Book>,
    form: FormState<BookDraft>,
    confirm: Confirm,
    categories: Vec<CategoryOption>,
    filter: Option<CategoryOption>,
}

#[derive(Debug, Clone)]
pub enum Message {
    SearchChanged(String),
    SearchSettled(u64),
    FilterChanged(CategoryChoice),
    PageChanged(u32),
    PerPageChanged(u32),
    Fetched(u64, Result<Page<Book>, ApiError>),
    CategoriesLoaded(Result<Vec<CategoryOption>, ApiError>),
    NewPressed,
    EditPressed(Book),
    DialogDismissed,
    CategorySelected(CategoryOption),
    TitleChanged(String),
    DescriptionChanged(String),
    AuthorChanged(String),
    DatePublishedChanged(String),
    LinkChanged(String),
    StatusSelected(BookStatus),
    PickImage,
    ImagePicked(Option<PathBuf>),
    ClearImage,
    SubmitPressed,
    Submitted(Result<(), ApiError>),
    ArchivePressed(i64),
    ArchiveConfirmed,
    ArchiveDeclined,
    Archived(Result<(), ApiError>),
}

impl Books {
    pub fn new(api: &Api) -> (Self, Task<Message>) {
        let mut screen = Books::default();
        let fetch = screen.refetch(api);
        let options = {
            let api = api.clone();
            Task::perform(
                async move { api.category_options().await },
                Message::CategoriesLoaded,
            )
        };
        (screen, Task::batch([fetch, options]))
    }

    pub fn update(&mut self, message: Message, api: &Api) -> Action<Message> {
        match message {
            Message::SearchChanged(value) => {
                let seq = self.list.search_input(value);
                Action::Run(Task::perform(
                    async move {
                        tokio::time::sleep(Duration::from_millis(SEARCH_SETTLE_MS)).await;
                        seq
                    },
                    Message::SearchSettled,
                ))
            }
            Message::SearchSettled(seq) => {
                if self.list.search_settled(seq) {
                    Action::Run(self.refetch(api))
                } else {
                    Action::None
                }
            }
            Message::FilterChanged(choice) => {
                let (filter, selected) = match choice {
                    CategoryChoice::All => (None, None),
                    CategoryChoice::One(option) => {
                        (Some(option.id.to_string()), Some(option))
                    }
                };
                self.filter = selected;
                self.list.filter_changed(filter);
                Action::Run(self.refetch(api))
            }
            Message::PageChanged(page) => {
                self.list.page_changed(page);
                Action::Run(self.refetch(api))
            }
            Message::PerPageChanged(per_page) => {
                self.list.per_page_changed(per_page);
                Action::Run(self.refetch(api))
            }
            Message::Fetched(seq, result) => match self.list.apply(seq, result) {
                Applied::Expired => Action::SessionExpired,
                _ => Action::None,
            },
            Message::CategoriesLoaded(Ok(options)) => {
                self.categories = options;
                Action::None
            }
            Message::CategoriesLoaded(Err(ApiError::Unauthorized)) => Action::SessionExpired,
            Message::CategoriesLoaded(Err(err)) => {
                log::warn!("could not load category options: {err}");
                Action::None
            }
            Message::NewPressed => {
                self.form.open_create();
                Action::None
            }
            Message::EditPressed(book) => {
                let draft = draft_from(&book, &self.categories);
                self.form.open_edit(book.id, draft);
                Action::None
            }
            Message::DialogDismissed => {
                if !self.form.busy {
                    self.form.close();
                }
                Action::None
            }
            Message::CategorySelected(option) => {
                self.form.draft.category = Some(option);
                Action::None
            }
            Message::TitleChanged(value) => {
                self.form.draft.title = value;
                Action::None
            }
            Message::DescriptionChanged(value) => {
                self.form.draft.description = value;
                Action::None
            }
            Message::AuthorChanged(value) => {
                self.form.draft.author = value;
                Action::None
            }
            Message::DatePublishedChanged(value) => {
                self.form.draft.date_published = value;
                Action::None
            }
            Message::LinkChanged(value) => {
                self.form.draft.book_link = value;
                Action::None
            }
            Message::StatusSelected(status) => {
                self.form.draft.status = status;
                Action::None
            }
            Message::PickImage => Action::Run(Task::perform(
                async {
                    rfd::AsyncFileDialog::new()
                        .set_title("Select Book Cover")
                        .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
                        .pick_file()
                        .await
                        .map(|file| file.path().to_path_buf())
                },
                Message::ImagePicked,
            )),
            Message::ImagePicked(path) => {
                if path.is_some() {
                    self.form.draft.image = path;
                }
                Action::None
            }
            Message::ClearImage => {
                self.form.draft.image = None;
                Action::None
            }
            Message::SubmitPressed => {
                if self.form.busy {
                    return Action::None;
                }
                self.form.submit();
                let payload = payload_from(&self.form.draft);
                let api = api.clone();
                let task = match self.form.editing {
                    Some(id) => Task::perform(
                        async move { api.update_book(id, &payload).await },
                        Message::Submitted,
                    ),
                    None => Task::perform(
                        async move { api.create_book(&payload).await },
                        Message::Submitted,
                    ),
                };
                Action::Run(task)
            }
            Message::Submitted(result) => match self.form.finish(result) {
                Outcome::Saved => Action::Run(self.refetch(api)),
                Outcome::Expired => Action::SessionExpired,
                Outcome::Rejected => Action::None,
            },
            Message::ArchivePressed(id) => {
                self.confirm.ask(id);
                Action::None
            }
            Message::ArchiveDeclined => {
                self.confirm.decline();
                Action::None
            }
            Message::ArchiveConfirmed => match self.confirm.accept() {
                Some(id) => {
                    let api = api.clone();
                    Action::Run(Task::perform(
                        async move { api.archive_book(id).await },
                        Message::Archived,
                    ))
                }
                None => Action::None,
            },
            Message::Archived(Ok(())) => Action::Run(self.refetch(api)),
            Message::Archived(Err(ApiError::Unauthorized)) => Action::SessionExpired,
            Message::Archived(Err(err)) => {
                self.list.error = Some(err.user_message());
                Action::None
            }
        }
    }

    fn refetch(&mut self, api: &Api) -> Task<Message> {
        let (seq, query) = self.list.begin_fetch();
        let api = api.clone();
        Task::perform(async move { api.books(query).await }, move |result| {
            Message::Fetched(seq, result)
        })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            column![
                text("Books Management").size(24),
                text("Manage your library collection")
                    .size(14)
                    .style(text::secondary),
            ]
            .spacing(4),
            Space::with_width(Length::Fill),
            button(text("Add Book").size(14)).on_press(Message::NewPressed),
        ]
        .align_y(Alignment::Center);

        let filter_choices: Vec<CategoryChoice> = std::iter::once(CategoryChoice::All)
            .chain(
                self.categories
                    .iter()
                    .cloned()
                    .map(CategoryChoice::One),
            )
            .collect();
        let selected_filter = match &self.filter {
            Some(option) => CategoryChoice::One(option.clone()),
            None => CategoryChoice::All,
        };

        let toolbar = row![
            text_input("Search books by title or author...", &self.list.search)
                .on_input(Message::SearchChanged)
                .padding(8)
                .width(Length::Fill),
            pick_list(filter_choices, Some(selected_filter), Message::FilterChanged)
                .text_size(14)
                .padding(8),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let mut panel = column![toolbar].spacing(12);
        if let Some(error) = &self.list.error {
            panel = panel.push(ui::error_banner(error));
        }
        panel = panel.push(self.table());
        panel = panel.push(ui::pagination_bar(
            &self.list.pagination,
            self.list.page,
            self.list.window(),
            self.list.per_page,
            Message::PageChanged,
            Message::PerPageChanged,
        ));

        let base: Element<'_, Message> = scrollable(
            column![
                header,
                container(panel)
                    .padding(16)
                    .width(Length::Fill)
                    .style(container::rounded_box),
            ]
            .spacing(24)
            .padding(24),
        )
        .height(Length::Fill)
        .into();

        if self.form.open {
            ui::modal(base, self.dialog(), Message::DialogDismissed)
        } else if self.confirm.pending().is_some() {
            ui::modal(
                base,
                ui::confirm_dialog(
                    "Are you sure you want to archive this book? It will no longer appear in the catalog.",
                    Message::ArchiveConfirmed,
                    Message::ArchiveDeclined,
                ),
                Message::ArchiveDeclined,
            )
        } else {
            base
        }
    }

    fn table(&self) -> Element<'_, Message> {
        let header = row![
            header_cell("ID", 1),
            header_cell("Title", 3),
            header_cell("Category", 2),
            header_cell("Author", 2),
            header_cell("Published", 2),
            header_cell("Status", 2),
            header_cell("Modified", 2),
            header_cell("Actions", 2),
        ]
        .spacing(8);

        let mut table = column![header].spacing(8);

        if self.list.loading && self.list.items.is_empty() {
            table = table.push(text("Loading books...").size(14).style(text::secondary));
        } else if self.list.items.is_empty() {
            table = table.push(
                text("No books found. Add your first book to get started.")
                    .size(14)
                    .style(text::secondary),
            );
        } else {
            for book in &self.list.items {
                table = table.push(horizontal_rule(1));
                table = table.push(self.book_row(book));
            }
        }

        table.into()
    }

    fn book_row<'a>(&'a self, book: &'a Book) -> Element<'a, Message> {
        let title = column![text(&book.title).size(14)].spacing(2);
        let title = if book.description.is_empty() {
            title
        } else {
            title.push(text(&book.description).size(12).style(text::secondary))
        };

        row![
            cell(text(book.id.to_string()).size(14), 1),
            cell(title, 3),
            cell(text(self.category_name(book.category_id)).size(14), 2),
            cell(text(&book.author).size(14), 2),
            cell(text(date_input(&book.date_published)).size(14), 2),
            cell(ui::book_status_badge(book.status), 2),
            cell(text(date_input(&book.updated_at)).size(14), 2),
            cell(
                row![
                    button(text("Edit").size(13))
                        .style(button::secondary)
                        .on_press(Message::EditPressed(book.clone())),
                    button(text("Archive").size(13))
                        .style(button::danger)
                        .on_press(Message::ArchivePressed(book.id)),
                ]
                .spacing(6),
                2
            ),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    }

    fn dialog(&self) -> Element<'_, Message> {
        let draft = &self.form.draft;
        let title = if self.form.is_editing() {
            "Edit Book"
        } else {
            "Add New Book"
        };

        let mut form = column![text(title).size(18)].spacing(12);
        if let Some(error) = &self.form.error {
            form = form.push(ui::error_banner(error));
        }

        let image_label = draft
            .image
            .as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file selected".to_string());

        let submit_label = if self.form.busy {
            "Saving..."
        } else if self.form.is_editing() {
            "Update Book"
        } else {
            "Add Book"
        };

        form = form
            .push(ui::field(
                "Category",
                pick_list(
                    self.categories.as_slice(),
                    draft.category.clone(),
                    Message::CategorySelected,
                )
                .placeholder("Select a category")
                .text_size(14)
                .width(Length::Fill),
            ))
            .push(ui::field(
                "Title",
                text_input("", &draft.title)
                    .on_input(Message::TitleChanged)
                    .padding(8),
            ))
            .push(ui::field(
                "Description",
                text_input("", &draft.description)
                    .on_input(Message::DescriptionChanged)
                    .padding(8),
            ))
            .push(
                row![
                    ui::field(
                        "Author",
                        text_input("", &draft.author)
                            .on_input(Message::AuthorChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Date Published",
                        text_input("YYYY-MM-DD", &draft.date_published)
                            .on_input(Message::DatePublishedChanged)
                            .padding(8),
                    ),
                ]
                .spacing(12),
            )
            .push(
                row![
                    ui::field(
                        "Book Link",
                        text_input("https://example.com/book", &draft.book_link)
                            .on_input(Message::LinkChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Status",
                        pick_list(BookStatus::ALL, Some(draft.status), Message::StatusSelected)
                            .text_size(14)
                            .width(Length::Fill),
                    ),
                ]
                .spacing(12),
            )
            .push(ui::field(
                "Cover Image",
                row![
                    button(text("Choose File...").size(13))
                        .style(button::secondary)
                        .on_press(Message::PickImage),
                    text(image_label).size(13).style(text::secondary),
                    Space::with_width(Length::Fill),
                    button(text("Clear").size(13))
                        .style(button::text)
                        .on_press_maybe(draft.image.is_some().then_some(Message::ClearImage)),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            ))
            .push(
                row![
                    Space::with_width(Length::Fill),
                    button(text("Cancel").size(14))
                        .style(button::secondary)
                        .on_press(Message::DialogDismissed),
                    button(text(submit_label).size(14))
                        .on_press_maybe((!self.form.busy).then_some(Message::SubmitPressed)),
                ]
                .spacing(8),
            );

        form.width(480).into()
    }

    fn category_name(&self, category_id: i64) -> &str {
        self.categories
            .iter()
            .find(|option| option.id == category_id)
            .map(|option| option.category_name.as_str())
            .unwrap_or("Unknown")
    }
}

fn draft_from(book: &Book, categories: &[CategoryOption]) -> BookDraft {
    BookDraft {
        category: categories
            .iter()
            .find(|option| option.id == book.category_id)
            .cloned(),
        title: book.title.clone(),
        description: book.description.clone(),
        author: book.author.clone(),
        date_published: date_input(&book.date_published),
        book_link: book.book_link.clone().unwrap_or_default(),
        status: book.status,
        // An existing cover stays on the server unless a new file is picked.
        image: None,
    }
}

fn payload_from(draft: &BookDraft) -> BookPayload {
    BookPayload {
        category_id: draft.category.as_ref().map(|option| option.id),
        title: draft.title.clone(),
        description: draft.description.clone(),
        author: draft.author.clone(),
        date_published: draft.date_published.clone(),
        book_link: draft.book_link.clone(),
        status: draft.status,
        image: draft.image.clone(),
    }
}

fn header_cell<'a, M: 'a>(label: &'a str, portion: u16) -> Element<'a, M> {
    container(text(label).size(13).style(text::secondary))
        .width(Length::FillPortion(portion))
        .into()
}

fn cell<'a, M: 'a>(content: impl Into<Element<'a, M>>, portion: u16) -> Element<'a, M> {
    container(content)
        .width(Length::FillPortion(portion))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            id: 12,
            category_id: 3,
            title: "Dune".to_string(),
            description: "Desert planet".to_string(),
            author: "Frank Herbert".to_string(),
            date_published: "2020-05-01T00:00:00Z".to_string(),
            book_image: None,
            book_link: None,
            status: BookStatus::Available,
            is_archived: false,
            updated_at: "2024-02-01T12:30:00Z".to_string(),
        }
    }

    #[test]
    fn editing_prepopulates_a_date_only_draft() {
        let categories = vec![CategoryOption {
            id: 3,
            category_name: "Fiction".to_string(),
        }];
        let draft = draft_from(&sample_book(), &categories);
        assert_eq!(draft.date_published, "2020-05-01");
        assert_eq!(draft.category.as_ref().map(|c| c.id), Some(3));
        assert_eq!(draft.image, None);
    }

    #[test]
    fn unknown_category_leaves_the_select_empty() {
        let draft = draft_from(&sample_book(), &[]);
        assert_eq!(draft.category, None);
    }
}
