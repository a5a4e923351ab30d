/// Transactions screen: paginated borrow/return list with search, status
/// filter, a modal create/edit dialog and archive.
use std::fmt;
use std::time::Duration;

use iced::widget::{
    button, column, container, horizontal_rule, pick_list, row, scrollable, text, text_input, Space,
};
use iced::{Alignment, Element, Length, Task};

use crate::api::types::{BookOption, Page, Transaction, TxStatus};
use crate::api::{Api, ApiError, TransactionPayload};
use crate::screens::Action;
use crate::state::form::{date_input, parse_date, today, Confirm, FormState, Outcome};
use crate::state::list::{Applied, ListState, SEARCH_SETTLE_MS};
use crate::ui;

/// Status filter choice; `All` is the sentinel that omits the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusChoice {
    #[default]
    All,
    Borrowed,
    Returned,
    Overdue,
}

impl StatusChoice {
    const ALL: [StatusChoice; 4] = [
        StatusChoice::All,
        StatusChoice::Borrowed,
        StatusChoice::Returned,
        StatusChoice::Overdue,
    ];

    fn param(self) -> Option<String> {
        match self {
            StatusChoice::All => None,
            StatusChoice::Borrowed => Some("borrowed".to_string()),
            StatusChoice::Returned => Some("returned".to_string()),
            StatusChoice::Overdue => Some("overdue".to_string()),
        }
    }
}

impl fmt::Display for StatusChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusChoice::All => "All statuses",
            StatusChoice::Borrowed => "Borrowed",
            StatusChoice::Returned => "Returned",
            StatusChoice::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub book: Option<BookOption>,
    pub borrower_name: String,
    pub borrower_email: String,
    pub borrow_date: String,
    pub due_date: String,
    pub return_date: String,
    pub status: TxStatus,
}

impl TransactionDraft {
    /// Picking "returned" with no return date on file defaults it to
    /// `today`; an existing value is left untouched.
    pub fn set_status(&mut self, status: TxStatus, today: &str) {
        if status == TxStatus::Returned && self.return_date.is_empty() {
            self.return_date = today.to_string();
        }
        self.status = status;
    }

    /// The due date must not precede the borrow date. Only checked when
    /// both fields parse; anything else is left to server validation.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(borrow), Some(due)) = (parse_date(&self.borrow_date), parse_date(&self.due_date))
        {
            if due < borrow {
                return Err("Due date must be on or after the borrow date".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Transactions {
    list: ListState<Transaction>,
    form: FormState<TransactionDraft>,
    confirm: Confirm,
    books: Vec<BookOption>,
    filter: StatusChoice,
}

#[derive(Debug, Clone)]
pub enum Message {
    SearchChanged(String),
    SearchSettled(u64),
    FilterChanged(StatusChoice),
    PageChanged(u32),
    PerPageChanged(u32),
    Fetched(u64, Result<Page<Transaction>, ApiError>),
    BooksLoaded(Result<Vec<BookOption>, ApiError>),
    NewPressed,
    EditPressed(Transaction),
    DialogDismissed,
    BookSelected(BookOption),
    BorrowerNameChanged(String),
    BorrowerEmailChanged(String),
    BorrowDateChanged(String),
    DueDateChanged(String),
    ReturnDateChanged(String),
    StatusSelected(TxStatus),
    SubmitPressed,
    Submitted(Result<(), ApiError>),
    ArchivePressed(i64),
    ArchiveConfirmed,
    ArchiveDeclined,
    Archived(Result<(), ApiError>),
}

impl Transactions {
    pub fn new(api: &Api) -> (Self, Task<Message>) {
        let mut screen = Transactions::default();
        let fetch = screen.refetch(api);
        let options = {
            let api = api.clone();
            Task::perform(async move { api.book_options().await }, Message::BooksLoaded)
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
                self.filter = choice;
                self.list.filter_changed(choice.param());
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
            Message::BooksLoaded(Ok(options)) => {
                self.books = options;
                Action::None
            }
            Message::BooksLoaded(Err(ApiError::Unauthorized)) => Action::SessionExpired,
            Message::BooksLoaded(Err(err)) => {
                log::warn!("could not load book options: {err}");
                Action::None
            }
            Message::NewPressed => {
                self.form.open_create();
                Action::None
            }
            Message::EditPressed(transaction) => {
                let draft = draft_from(&transaction, &self.books);
                self.form.open_edit(transaction.id, draft);
                Action::None
            }
            Message::DialogDismissed => {
                if !self.form.busy {
                    self.form.close();
                }
                Action::None
            }
            Message::BookSelected(option) => {
                self.form.draft.book = Some(option);
                Action::None
            }
            Message::BorrowerNameChanged(value) => {
                self.form.draft.borrower_name = value;
                Action::None
            }
            Message::BorrowerEmailChanged(value) => {
                self.form.draft.borrower_email = value;
                Action::None
            }
            Message::BorrowDateChanged(value) => {
                self.form.draft.borrow_date = value;
                Action::None
            }
            Message::DueDateChanged(value) => {
                self.form.draft.due_date = value;
                Action::None
            }
            Message::ReturnDateChanged(value) => {
                self.form.draft.return_date = value;
                Action::None
            }
            Message::StatusSelected(status) => {
                self.form.draft.set_status(status, &today());
                Action::None
            }
            Message::SubmitPressed => {
                if self.form.busy {
                    return Action::None;
                }
                if let Err(message) = self.form.draft.validate() {
                    self.form.fail(message);
                    return Action::None;
                }
                self.form.submit();
                let payload = payload_from(&self.form.draft);
                let api = api.clone();
                let task = match self.form.editing {
                    Some(id) => Task::perform(
                        async move { api.update_transaction(id, &payload).await },
                        Message::Submitted,
                    ),
                    None => Task::perform(
                        async move { api.create_transaction(&payload).await },
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
                        async move { api.archive_transaction(id).await },
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
        Task::perform(async move { api.transactions(query).await }, move |result| {
            Message::Fetched(seq, result)
        })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            column![
                text("Transactions").size(24),
                text("Track book borrowing and returns")
                    .size(14)
                    .style(text::secondary),
            ]
            .spacing(4),
            Space::with_width(Length::Fill),
            button(text("New Transaction").size(14)).on_press(Message::NewPressed),
        ]
        .align_y(Alignment::Center);

        let toolbar = row![
            text_input(
                "Search by book, borrower name or email...",
                &self.list.search
            )
            .on_input(Message::SearchChanged)
            .padding(8)
            .width(Length::Fill),
            pick_list(StatusChoice::ALL, Some(self.filter), Message::FilterChanged)
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
                    "Are you sure you want to archive this transaction?",
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
            header_cell("Book", 3),
            header_cell("Borrower", 3),
            header_cell("Borrowed", 2),
            header_cell("Due", 2),
            header_cell("Returned", 2),
            header_cell("Status", 2),
            header_cell("Actions", 2),
        ]
        .spacing(8);

        let mut table = column![header].spacing(8);

        if self.list.loading && self.list.items.is_empty() {
            table = table.push(
                text("Loading transactions...")
                    .size(14)
                    .style(text::secondary),
            );
        } else if self.list.items.is_empty() {
            table = table.push(
                text("No transactions found. Create your first transaction to get started.")
                    .size(14)
                    .style(text::secondary),
            );
        } else {
            for transaction in &self.list.items {
                table = table.push(horizontal_rule(1));
                table = table.push(self.transaction_row(transaction));
            }
        }

        table.into()
    }

    fn transaction_row<'a>(&'a self, transaction: &'a Transaction) -> Element<'a, Message> {
        let mut borrower = column![text(&transaction.borrower_name).size(14)].spacing(2);
        if !transaction.borrower_email.is_empty() {
            borrower = borrower.push(
                text(&transaction.borrower_email)
                    .size(12)
                    .style(text::secondary),
            );
        }

        let returned = transaction
            .return_date
            .as_deref()
            .map(date_input)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "-".to_string());

        row![
            cell(text(transaction.id.to_string()).size(14), 1),
            cell(text(self.book_title(transaction.book_id)).size(14), 3),
            cell(borrower, 3),
            cell(text(date_input(&transaction.borrow_date)).size(14), 2),
            cell(text(date_input(&transaction.due_date)).size(14), 2),
            cell(text(returned).size(14), 2),
            cell(ui::tx_status_badge(transaction.status), 2),
            cell(
                row![
                    button(text("Edit").size(13))
                        .style(button::secondary)
                        .on_press(Message::EditPressed(transaction.clone())),
                    button(text("Archive").size(13))
                        .style(button::danger)
                        .on_press(Message::ArchivePressed(transaction.id)),
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
            "Edit Transaction"
        } else {
            "New Transaction"
        };

        let mut form = column![text(title).size(18)].spacing(12);
        if let Some(error) = &self.form.error {
            form = form.push(ui::error_banner(error));
        }

        let submit_label = if self.form.busy {
            "Saving..."
        } else if self.form.is_editing() {
            "Update Transaction"
        } else {
            "Create Transaction"
        };

        form = form
            .push(ui::field(
                "Book",
                pick_list(
                    self.books.as_slice(),
                    draft.book.clone(),
                    Message::BookSelected,
                )
                .placeholder("Select a book")
                .text_size(14)
                .width(Length::Fill),
            ))
            .push(
                row![
                    ui::field(
                        "Borrower Name",
                        text_input("", &draft.borrower_name)
                            .on_input(Message::BorrowerNameChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Borrower Email",
                        text_input("", &draft.borrower_email)
                            .on_input(Message::BorrowerEmailChanged)
                            .padding(8),
                    ),
                ]
                .spacing(12),
            )
            .push(
                row![
                    ui::field(
                        "Borrow Date",
                        text_input("YYYY-MM-DD", &draft.borrow_date)
                            .on_input(Message::BorrowDateChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Due Date",
                        text_input("YYYY-MM-DD", &draft.due_date)
                            .on_input(Message::DueDateChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Return Date",
                        text_input("YYYY-MM-DD", &draft.return_date)
                            .on_input(Message::ReturnDateChanged)
                            .padding(8),
                    ),
                ]
                .spacing(12),
            )
            .push(ui::field(
                "Status",
                pick_list(TxStatus::ALL, Some(draft.status), Message::StatusSelected)
                    .text_size(14)
                    .width(Length::Fill),
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

    fn book_title(&self, book_id: i64) -> String {
        self.books
            .iter()
            .find(|option| option.id == book_id)
            .map(|option| option.title.clone())
            .unwrap_or_else(|| format!("Book #{book_id}"))
    }
}

fn draft_from(transaction: &Transaction, books: &[BookOption]) -> TransactionDraft {
    TransactionDraft {
        book: books
            .iter()
            .find(|option| option.id == transaction.book_id)
            .cloned(),
        borrower_name: transaction.borrower_name.clone(),
        borrower_email: transaction.borrower_email.clone(),
        borrow_date: date_input(&transaction.borrow_date),
        due_date: date_input(&transaction.due_date),
        return_date: transaction
            .return_date
            .as_deref()
            .map(date_input)
            .unwrap_or_default(),
        status: transaction.status,
    }
}

fn payload_from(draft: &TransactionDraft) -> TransactionPayload {
    TransactionPayload {
        book_id: draft.book.as_ref().map(|option| option.id),
        borrower_name: draft.borrower_name.clone(),
        borrower_email: draft.borrower_email.clone(),
        borrow_date: draft.borrow_date.clone(),
        due_date: draft.due_date.clone(),
        return_date: draft.return_date.clone(),
        status: draft.status,
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

    #[test]
    fn returned_status_autofills_an_empty_return_date() {
        let mut draft = TransactionDraft::default();
        draft.set_status(TxStatus::Returned, "2024-03-15");
        assert_eq!(draft.status, TxStatus::Returned);
        assert_eq!(draft.return_date, "2024-03-15");
    }

    #[test]
    fn returned_status_keeps_an_existing_return_date() {
        let mut draft = TransactionDraft {
            return_date: "2024-03-01".to_string(),
            ..TransactionDraft::default()
        };
        draft.set_status(TxStatus::Returned, "2024-03-15");
        assert_eq!(draft.return_date, "2024-03-01");
    }

    #[test]
    fn other_statuses_never_touch_the_return_date() {
        let mut draft = TransactionDraft::default();
        draft.set_status(TxStatus::Overdue, "2024-03-15");
        assert_eq!(draft.return_date, "");
    }

    #[test]
    fn due_date_must_not_precede_the_borrow_date() {
        let draft = TransactionDraft {
            borrow_date: "2024-03-10".to_string(),
            due_date: "2024-03-01".to_string(),
            ..TransactionDraft::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn matching_dates_and_unparseable_dates_pass_validation() {
        let same_day = TransactionDraft {
            borrow_date: "2024-03-10".to_string(),
            due_date: "2024-03-10".to_string(),
            ..TransactionDraft::default()
        };
        assert!(same_day.validate().is_ok());

        let unparsed = TransactionDraft {
            borrow_date: "not a date".to_string(),
            due_date: "2024-03-01".to_string(),
            ..TransactionDraft::default()
        };
        assert!(unparsed.validate().is_ok());
    }

    #[test]
    fn editing_prepopulates_date_only_fields() {
        let transaction = Transaction {
            id: 4,
            book_id: 7,
            borrower_name: "Ada".to_string(),
            borrower_email: "ada@example.com".to_string(),
            borrow_date: "2024-01-10T00:00:00Z".to_string(),
            due_date: "2024-01-24T00:00:00Z".to_string(),
            return_date: None,
            status: TxStatus::Borrowed,
            is_archived: false,
        };
        let books = vec![BookOption {
            id: 7,
            title: "Dune".to_string(),
        }];
        let draft = draft_from(&transaction, &books);
        assert_eq!(draft.borrow_date, "2024-01-10");
        assert_eq!(draft.due_date, "2024-01-24");
        assert_eq!(draft.return_date, "");
        assert_eq!(draft.book.as_ref().map(|b| b.id), Some(7));
    }
}
